//! Row types for the SQLite schema in `migrations/`, plus conversion into
//! the domain types.

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::types::{BudgetReport, Category, DetectedOpportunity, OpportunityStatus, Script};

fn corrupt(what: String) -> AppError {
    AppError::Database(sqlx::Error::Decode(what.into()))
}

#[derive(Debug, sqlx::FromRow)]
pub struct ScriptRow {
    pub id: String,
    pub title: String,
    pub text: String,
    /// JSON-encoded `ScriptParameters`
    pub params: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ScriptRow> for Script {
    type Error = AppError;

    fn try_from(row: ScriptRow) -> Result<Self> {
        Ok(Script {
            id: row.id,
            title: row.title,
            text: row.text,
            params: serde_json::from_str(&row.params)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct OpportunityRow {
    pub id: String,
    pub script_id: String,
    pub matched_text: String,
    pub category: String,
    pub reason: String,
    pub estimated_revenue: f64,
    pub status: String,
    pub excerpt: String,
    pub start_index: i64,
    pub end_index: i64,
    pub confidence_score: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<OpportunityRow> for DetectedOpportunity {
    type Error = AppError;

    fn try_from(row: OpportunityRow) -> Result<Self> {
        let category = Category::parse(&row.category)
            .ok_or_else(|| corrupt(format!("unknown category '{}'", row.category)))?;
        let status = OpportunityStatus::parse(&row.status)
            .ok_or_else(|| corrupt(format!("unknown status '{}'", row.status)))?;
        Ok(DetectedOpportunity {
            id: row.id,
            script_id: row.script_id,
            matched_text: row.matched_text,
            category,
            reason: row.reason,
            estimated_revenue: row.estimated_revenue,
            status,
            excerpt: row.excerpt,
            start_index: row.start_index as usize,
            end_index: row.end_index as usize,
            confidence_score: row.confidence_score.clamp(0, 100) as u8,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct BudgetRow {
    pub script_id: String,
    pub baseline_adsense_revenue: f64,
    pub potential_sponsorship_revenue: f64,
    pub total_projected_revenue: f64,
    pub production_budget: f64,
    pub net_impact: f64,
    pub category_breakdown: String,
    pub brand_safety_score: i64,
    pub monetization_tips: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BudgetRow> for BudgetReport {
    type Error = AppError;

    fn try_from(row: BudgetRow) -> Result<Self> {
        Ok(BudgetReport {
            script_id: row.script_id,
            baseline_adsense_revenue: row.baseline_adsense_revenue,
            potential_sponsorship_revenue: row.potential_sponsorship_revenue,
            total_projected_revenue: row.total_projected_revenue,
            production_budget: row.production_budget,
            net_impact: row.net_impact,
            category_breakdown: serde_json::from_str(&row.category_breakdown)?,
            brand_safety_score: row.brand_safety_score.clamp(0, 100) as u8,
            monetization_tips: serde_json::from_str(&row.monetization_tips)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
