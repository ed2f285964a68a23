//! Shared health counters for the /health endpoint.
//! Updated by the request handlers after each analysis or budget run.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct HealthState {
    /// Scripts run through detection since startup.
    pub scripts_analyzed: AtomicU64,
    /// Opportunities produced since startup.
    pub opportunities_detected: AtomicU64,
    /// Budget reports computed since startup.
    pub budgets_calculated: AtomicU64,
    /// Nanosecond timestamp of the last detection run (0 = none).
    pub last_analysis_at_ns: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_analysis(&self, opportunities: usize, at_ns: u64) {
        self.scripts_analyzed.fetch_add(1, Ordering::Relaxed);
        self.opportunities_detected
            .fetch_add(opportunities as u64, Ordering::Relaxed);
        self.last_analysis_at_ns.store(at_ns, Ordering::Relaxed);
    }

    pub fn record_budget(&self) {
        self.budgets_calculated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn scripts_analyzed(&self) -> u64 {
        self.scripts_analyzed.load(Ordering::Relaxed)
    }

    pub fn opportunities_detected(&self) -> u64 {
        self.opportunities_detected.load(Ordering::Relaxed)
    }

    pub fn budgets_calculated(&self) -> u64 {
        self.budgets_calculated.load(Ordering::Relaxed)
    }

    pub fn last_analysis_at_ns(&self) -> u64 {
        self.last_analysis_at_ns.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let h = HealthState::new();
        h.record_analysis(3, 10);
        h.record_analysis(2, 20);
        h.record_budget();
        assert_eq!(h.scripts_analyzed(), 2);
        assert_eq!(h.opportunities_detected(), 5);
        assert_eq!(h.budgets_calculated(), 1);
        assert_eq!(h.last_analysis_at_ns(), 20);
    }
}
