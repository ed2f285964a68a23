pub mod flexibility;

pub use flexibility::{confidence_adjustment, revenue_multiplier, score, Score};
