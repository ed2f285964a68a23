use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::config::{GENERATED_TITLE_CHARS, MIN_AUDIENCE_CHARS, MIN_SCRIPT_TEXT_CHARS};
use crate::error::{AppError, Result};

// ---------------------------------------------------------------------------
// Categories and status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Product,
    Environment,
    Situation,
    Thematic,
}

impl Category {
    /// Capitalised name used as the key of a budget category breakdown.
    pub fn label(self) -> &'static str {
        match self {
            Category::Product => "Product",
            Category::Environment => "Environment",
            Category::Situation => "Situation",
            Category::Thematic => "Thematic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "product" => Some(Category::Product),
            "environment" => Some(Category::Environment),
            "situation" => Some(Category::Situation),
            "thematic" => Some(Category::Thematic),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Category::Product => "product",
            Category::Environment => "environment",
            Category::Situation => "situation",
            Category::Thematic => "thematic",
        };
        write!(f, "{s}")
    }
}

/// Curation state of an opportunity. Any transition is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpportunityStatus {
    Pending,
    Accepted,
    Rejected,
}

impl OpportunityStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OpportunityStatus::Pending),
            "accepted" => Some(OpportunityStatus::Accepted),
            "rejected" => Some(OpportunityStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for OpportunityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OpportunityStatus::Pending => "pending",
            OpportunityStatus::Accepted => "accepted",
            OpportunityStatus::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Creative flexibility
// ---------------------------------------------------------------------------

/// How much the script may be altered to fit a placement.
///
/// Deserialising an unrecognised value yields `MinorDialogueChanges`, the
/// neutral setting, instead of failing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum CreativeFlexibility {
    NoChanges,
    #[default]
    MinorDialogueChanges,
    SceneLevelChanges,
}

impl CreativeFlexibility {
    pub fn as_str(self) -> &'static str {
        match self {
            CreativeFlexibility::NoChanges => "no-changes",
            CreativeFlexibility::MinorDialogueChanges => "minor-dialogue-changes",
            CreativeFlexibility::SceneLevelChanges => "scene-level-changes",
        }
    }

    /// Lenient parse: anything unrecognised maps to the neutral default.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim() {
            "no-changes" => CreativeFlexibility::NoChanges,
            "minor-dialogue-changes" => CreativeFlexibility::MinorDialogueChanges,
            "scene-level-changes" => CreativeFlexibility::SceneLevelChanges,
            other => {
                warn!(value = other, "unrecognised creative flexibility, using minor-dialogue-changes");
                CreativeFlexibility::default()
            }
        }
    }
}

impl From<String> for CreativeFlexibility {
    fn from(s: String) -> Self {
        Self::parse_lenient(&s)
    }
}

impl From<CreativeFlexibility> for &'static str {
    fn from(f: CreativeFlexibility) -> Self {
        f.as_str()
    }
}

impl std::fmt::Display for CreativeFlexibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Script input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptParameters {
    #[serde(alias = "targetProductionBudget")]
    pub production_budget: f64,
    pub target_audience: String,
    pub creative_flexibility: CreativeFlexibility,
    #[serde(default, alias = "creativeDirectionNotes", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ScriptParameters {
    /// Checks the parameters the core relies on and returns a normalised copy
    /// (audience trimmed). The core never re-validates.
    pub fn validate(mut self) -> Result<Self> {
        if !self.production_budget.is_finite() || self.production_budget < 0.0 {
            return Err(AppError::Validation(
                "productionBudget must be >= 0".to_string(),
            ));
        }
        self.target_audience = self.target_audience.trim().to_string();
        if self.target_audience.chars().count() < MIN_AUDIENCE_CHARS {
            return Err(AppError::Validation(format!(
                "targetAudience must be at least {MIN_AUDIENCE_CHARS} characters"
            )));
        }
        Ok(self)
    }
}

/// Script submission as received from a client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScript {
    #[serde(default)]
    pub title: Option<String>,
    pub text: String,
    pub params: ScriptParameters,
}

impl NewScript {
    /// Validates text and parameters; fills in a title when none is given.
    pub fn validate(self) -> Result<(String, String, ScriptParameters)> {
        let text = self.text.trim().to_string();
        if text.chars().count() < MIN_SCRIPT_TEXT_CHARS {
            return Err(AppError::Validation(format!(
                "text must be at least {MIN_SCRIPT_TEXT_CHARS} characters"
            )));
        }
        let params = self.params.validate()?;
        let title = self
            .title
            .or_else(|| params.title.clone())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| title_from_text(&text));
        Ok((title, text, params))
    }
}

/// First characters of the text, with an ellipsis when the text was longer.
pub fn title_from_text(text: &str) -> String {
    let head: String = text.chars().take(GENERATED_TITLE_CHARS).collect();
    let mut title = head.trim().to_string();
    if text.chars().count() > GENERATED_TITLE_CHARS {
        title.push_str("...");
    }
    title
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    pub id: String,
    pub title: String,
    pub text: String,
    pub params: ScriptParameters,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Catalog terms and detected opportunities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermDefinition {
    pub term: String,
    pub category: Category,
    pub reason: String,
    pub base_revenue: f64,
    /// 0–100.
    pub base_confidence: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedOpportunity {
    pub id: String,
    pub script_id: String,
    /// Literal text found in the script, original casing.
    pub matched_text: String,
    pub category: Category,
    pub reason: String,
    pub estimated_revenue: f64,
    pub status: OpportunityStatus,
    pub excerpt: String,
    /// Half-open character range into the script text.
    pub start_index: usize,
    pub end_index: usize,
    pub confidence_score: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Budget report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetReport {
    pub script_id: String,
    pub baseline_adsense_revenue: f64,
    pub potential_sponsorship_revenue: f64,
    pub total_projected_revenue: f64,
    pub production_budget: f64,
    pub net_impact: f64,
    /// Keyed by `Category::label`. Only categories with accepted opportunities appear.
    pub category_breakdown: BTreeMap<String, f64>,
    pub brand_safety_score: u8,
    pub monetization_tips: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One entry of a batch status update. Entries missing either field, naming an
/// unknown status, or pointing at another script's opportunity are skipped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusChange {
    pub id: Option<String>,
    pub status: Option<String>,
}

impl StatusChange {
    pub fn resolve(&self) -> Option<(&str, OpportunityStatus)> {
        let id = self.id.as_deref()?;
        let status = OpportunityStatus::parse(self.status.as_deref()?)?;
        Some((id, status))
    }
}

/// A script that has a budget report, with its opportunities in detection order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptAnalysis {
    pub script: Script,
    pub opportunities: Vec<DetectedOpportunity>,
    pub budget: BudgetReport,
}
