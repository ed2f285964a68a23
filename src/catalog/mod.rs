//! Ordered, immutable list of commercial terms.
//!
//! Each term is compiled once into a case-insensitive whole-word regex.
//! Catalog order is significant: detection output lists all matches of an
//! earlier entry before any match of a later one.

mod builtin;

use std::path::Path;
use std::sync::Arc;

use regex::Regex;
use tracing::info;

use crate::error::{AppError, Result};
use crate::types::TermDefinition;

#[derive(Debug)]
pub struct CatalogEntry {
    pub definition: TermDefinition,
    pattern: Regex,
}

impl CatalogEntry {
    fn compile(mut definition: TermDefinition) -> Result<Self> {
        definition.term = definition.term.trim().to_string();
        let term = definition.term.as_str();
        if term.is_empty() {
            return Err(AppError::Catalog("term text must not be empty".to_string()));
        }
        if definition.base_confidence > 100 {
            return Err(AppError::Catalog(format!(
                "base confidence for '{term}' must be within 0-100, got {}",
                definition.base_confidence
            )));
        }
        if !definition.base_revenue.is_finite() || definition.base_revenue < 0.0 {
            return Err(AppError::Catalog(format!(
                "base revenue for '{term}' must be a non-negative number"
            )));
        }
        let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term)))
            .map_err(|e| AppError::Catalog(format!("bad pattern for '{term}': {e}")))?;
        Ok(Self { definition, pattern })
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

#[derive(Debug)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(definitions: Vec<TermDefinition>) -> Result<Self> {
        if definitions.is_empty() {
            return Err(AppError::Catalog("catalog has no terms".to_string()));
        }
        let entries = definitions
            .into_iter()
            .map(CatalogEntry::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// The terms shipped with the scanner.
    pub fn builtin() -> Self {
        let definitions = builtin::BUILTIN_TERMS
            .iter()
            .map(|&(term, category, reason, base_revenue, base_confidence)| TermDefinition {
                term: term.to_string(),
                category,
                reason: reason.to_string(),
                base_revenue,
                base_confidence,
            })
            .collect();
        Self::new(definitions).expect("built-in catalog is valid")
    }

    /// Parses a JSON array of term definitions.
    pub fn from_json(json: &str) -> Result<Self> {
        let definitions: Vec<TermDefinition> = serde_json::from_str(json)?;
        Self::new(definitions)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        info!(path = %path.display(), terms = catalog.len(), "Loaded term catalog");
        Ok(catalog)
    }

    /// Loads `path` if given, otherwise the built-in catalog.
    pub fn load_shared(path: Option<&Path>) -> Result<Arc<Self>> {
        let catalog = match path {
            Some(p) => Self::load(p)?,
            None => Self::builtin(),
        };
        Ok(Arc::new(catalog))
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
