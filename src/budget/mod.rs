pub mod aggregator;

pub use aggregator::{baseline_revenue, calculate_budget, calculate_budget_at};
