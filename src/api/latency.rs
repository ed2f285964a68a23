//! Request latency per scanner operation, kept in memory for `/stats/latency`.

use std::sync::Mutex;
use std::time::Duration;

use hdrhistogram::Histogram;
use serde::Serialize;

/// 1us to 100s, 3 significant figures.
const MAX_TRACKED_US: u64 = 100_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Detection plus replacement of the stored opportunity set.
    Analyze,
    /// Roll-up of accepted opportunities plus the report upsert.
    Budget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LatencySummary {
    pub samples: u64,
    pub p50_us: Option<u64>,
    pub p95_us: Option<u64>,
    pub p99_us: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LatencyReport {
    pub analyze: LatencySummary,
    pub budget: LatencySummary,
}

pub struct LatencyStats {
    analyze: Mutex<Histogram<u64>>,
    budget: Mutex<Histogram<u64>>,
}

fn histogram() -> Mutex<Histogram<u64>> {
    Mutex::new(Histogram::new_with_bounds(1, MAX_TRACKED_US, 3).expect("valid histogram bounds"))
}

impl LatencyStats {
    pub fn new() -> Self {
        Self {
            analyze: histogram(),
            budget: histogram(),
        }
    }

    fn histogram_for(&self, op: Operation) -> &Mutex<Histogram<u64>> {
        match op {
            Operation::Analyze => &self.analyze,
            Operation::Budget => &self.budget,
        }
    }

    pub fn record(&self, op: Operation, elapsed: Duration) {
        let us = elapsed.as_micros().clamp(1, u128::from(MAX_TRACKED_US)) as u64;
        if let Ok(mut h) = self.histogram_for(op).lock() {
            let _ = h.record(us);
        }
    }

    pub fn summary(&self, op: Operation) -> LatencySummary {
        let empty = LatencySummary {
            samples: 0,
            p50_us: None,
            p95_us: None,
            p99_us: None,
        };
        let Ok(h) = self.histogram_for(op).lock() else {
            return empty;
        };
        if h.len() == 0 {
            return empty;
        }
        LatencySummary {
            samples: h.len(),
            p50_us: Some(h.value_at_quantile(0.5)),
            p95_us: Some(h.value_at_quantile(0.95)),
            p99_us: Some(h.value_at_quantile(0.99)),
        }
    }

    pub fn report(&self) -> LatencyReport {
        LatencyReport {
            analyze: self.summary(Operation::Analyze),
            budget: self.summary(Operation::Budget),
        }
    }
}

impl Default for LatencyStats {
    fn default() -> Self {
        Self::new()
    }
}
