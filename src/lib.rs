//! Scans script text for commercial-placement opportunities and rolls
//! accepted ones up into a budget impact report.
//!
//! The core is pure: [`detector::DetectionPipeline`] and
//! [`budget::calculate_budget`] take plain values and return plain values.
//! [`db`] and [`api`] are the persistence and HTTP layers around it.

pub mod api;
pub mod budget;
pub mod catalog;
pub mod config;
pub mod db;
pub mod detector;
pub mod error;
pub mod scorer;
pub mod state;
pub mod types;

pub use budget::calculate_budget;
pub use catalog::Catalog;
pub use detector::DetectionPipeline;
pub use error::{AppError, Result};
