use std::path::PathBuf;

use crate::error::{AppError, Result};

/// Characters of script text kept on each side of a match in an excerpt.
pub const EXCERPT_CONTEXT_CHARS: usize = 50;

/// Minimum target audience length after trimming.
pub const MIN_AUDIENCE_CHARS: usize = 3;

/// Minimum script text length after trimming.
pub const MIN_SCRIPT_TEXT_CHARS: usize = 10;

/// Generated titles take this many leading characters of the script text.
pub const GENERATED_TITLE_CHARS: usize = 50;

/// Heuristic constants for the budget report.
pub mod budget_heuristics {
    pub const BASELINE_DEFAULT: f64 = 50_000.0;
    /// Audience mentions "young".
    pub const BASELINE_YOUNG: f64 = 60_000.0;
    /// Audience mentions "tech". Checked after "young".
    pub const BASELINE_TECH: f64 = 75_000.0;

    pub const BRAND_SAFETY_START: u8 = 95;
    pub const BRAND_SAFETY_PRODUCT_PENALTY: u8 = 5;
    /// Product revenue strictly above this triggers the penalty.
    pub const BRAND_SAFETY_PRODUCT_THRESHOLD: f64 = 10_000.0;

    /// Sponsorship above this share of the production budget earns the extra tip.
    pub const HIGH_SPONSORSHIP_RATIO: f64 = 0.5;
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub db_path: String,
    pub api_port: u16,
    /// Optional JSON term catalog replacing the built-in one (CATALOG_PATH)
    pub catalog_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "scanner.db".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            catalog_path: std::env::var("CATALOG_PATH")
                .ok()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        })
    }
}
