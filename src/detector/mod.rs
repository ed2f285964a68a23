pub mod excerpt;
pub mod matcher;
pub mod pipeline;
pub mod text_index;

pub use pipeline::DetectionPipeline;
