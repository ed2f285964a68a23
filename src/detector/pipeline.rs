use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::EXCERPT_CONTEXT_CHARS;
use crate::detector::excerpt::excerpt_from;
use crate::detector::matcher::find_matches;
use crate::detector::text_index::TextIndex;
use crate::scorer;
use crate::types::{DetectedOpportunity, OpportunityStatus, ScriptParameters};

/// Matcher → scorer → excerpt over one script.
///
/// Stateless apart from the shared catalog; safe to call from many tasks at once.
#[derive(Debug, Clone)]
pub struct DetectionPipeline {
    catalog: Arc<Catalog>,
    context_chars: usize,
}

impl DetectionPipeline {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            context_chars: EXCERPT_CONTEXT_CHARS,
        }
    }

    pub fn with_context_chars(mut self, context_chars: usize) -> Self {
        self.context_chars = context_chars;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Fresh opportunity set for a script, stamped with the current time and
    /// random ids. Callers replace whatever was stored before.
    pub fn detect(
        &self,
        script_id: &str,
        text: &str,
        params: &ScriptParameters,
    ) -> Vec<DetectedOpportunity> {
        self.detect_at(script_id, text, params, Utc::now(), || Uuid::new_v4().to_string())
    }

    /// Same as [`detect`](Self::detect) with the clock and id source supplied.
    pub fn detect_at(
        &self,
        script_id: &str,
        text: &str,
        params: &ScriptParameters,
        now: DateTime<Utc>,
        mut next_id: impl FnMut() -> String,
    ) -> Vec<DetectedOpportunity> {
        let started = Instant::now();
        let index = TextIndex::new(text);
        let matches = find_matches(&self.catalog, &index);

        let opportunities: Vec<DetectedOpportunity> = matches
            .into_iter()
            .map(|m| {
                let def = m.definition;
                let s = scorer::score(def.base_revenue, def.base_confidence, params.creative_flexibility);
                DetectedOpportunity {
                    id: next_id(),
                    script_id: script_id.to_string(),
                    matched_text: m.matched_text,
                    category: def.category,
                    reason: def.reason.clone(),
                    estimated_revenue: s.estimated_revenue,
                    status: OpportunityStatus::Pending,
                    excerpt: excerpt_from(&index, m.start, m.end, self.context_chars),
                    start_index: m.start,
                    end_index: m.end,
                    confidence_score: s.confidence_score,
                    created_at: now,
                    updated_at: now,
                }
            })
            .collect();

        debug!(
            script_id,
            chars = index.char_len(),
            terms = self.catalog.len(),
            opportunities = opportunities.len(),
            flexibility = %params.creative_flexibility,
            elapsed_us = started.elapsed().as_micros() as u64,
            "detection scan complete"
        );

        opportunities
    }
}
