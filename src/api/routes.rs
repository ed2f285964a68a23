use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::health::HealthState;
use crate::api::latency::{LatencyReport, LatencyStats, Operation};
use crate::budget::calculate_budget;
use crate::db::Store;
use crate::detector::DetectionPipeline;
use crate::error::{AppError, Result};
use crate::types::{
    BudgetReport, DetectedOpportunity, NewScript, OpportunityStatus, Script, ScriptAnalysis,
    StatusChange,
};

#[derive(Clone)]
pub struct ApiState {
    pub store: Store,
    pub pipeline: DetectionPipeline,
    pub health: Arc<HealthState>,
    pub latency: Arc<LatencyStats>,
}

impl ApiState {
    pub fn new(store: Store, pipeline: DetectionPipeline) -> Self {
        Self {
            store,
            pipeline,
            health: Arc::new(HealthState::new()),
            latency: Arc::new(LatencyStats::new()),
        }
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/scripts", post(create_script).get(list_scripts))
        .route("/scripts/:id", get(get_script).delete(delete_script))
        .route("/scripts/:id/analyze", post(analyze_script))
        .route(
            "/scripts/:id/opportunities",
            get(get_opportunities).patch(update_opportunity_statuses),
        )
        .route(
            "/scripts/:id/opportunities/:opportunity_id",
            patch(update_opportunity_status),
        )
        .route("/scripts/:id/budget", post(calculate_script_budget).get(get_budget))
        .route("/analyses", get(list_analyses))
        .route("/stats/latency", get(get_stats_latency))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: OpportunityStatus,
}

#[derive(Deserialize)]
pub struct BatchStatusUpdate {
    #[serde(default)]
    pub updates: Vec<StatusChange>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStatusResponse {
    pub updated_count: usize,
    pub opportunities: Vec<DetectedOpportunity>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptAnalysisResponse {
    pub script: Script,
    pub opportunities: Vec<DetectedOpportunity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetReport>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptSummary {
    pub id: String,
    pub title: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub catalog_terms: usize,
    pub scripts_analyzed: u64,
    pub opportunities_detected: u64,
    pub budgets_calculated: u64,
    pub last_analysis_at_ns: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn create_script(
    State(state): State<ApiState>,
    Json(body): Json<NewScript>,
) -> Result<(StatusCode, Json<ScriptAnalysisResponse>)> {
    let (title, text, params) = body.validate()?;
    let script = state.store.insert_script(title, text, params).await?;
    let opportunities = run_detection(&state, &script).await?;

    Ok((
        StatusCode::CREATED,
        Json(ScriptAnalysisResponse {
            script,
            opportunities,
            budget: None,
        }),
    ))
}

async fn list_scripts(State(state): State<ApiState>) -> Result<Json<Vec<ScriptSummary>>> {
    let scripts = state
        .store
        .list_scripts()
        .await?
        .into_iter()
        .map(|s| ScriptSummary {
            id: s.id,
            title: s.title,
            created_at: s.created_at,
        })
        .collect();
    Ok(Json(scripts))
}

async fn get_script(
    State(state): State<ApiState>,
    Path(script_id): Path<String>,
) -> Result<Json<ScriptAnalysisResponse>> {
    let script = state.store.get_script(&script_id).await?;
    let opportunities = state.store.list_opportunities(&script_id).await?;
    let budget = state.store.get_budget(&script_id).await?;
    Ok(Json(ScriptAnalysisResponse {
        script,
        opportunities,
        budget,
    }))
}

async fn delete_script(
    State(state): State<ApiState>,
    Path(script_id): Path<String>,
) -> Result<StatusCode> {
    state.store.delete_script(&script_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Re-runs detection; the previous opportunity set (and its curation) is discarded.
async fn analyze_script(
    State(state): State<ApiState>,
    Path(script_id): Path<String>,
) -> Result<Json<Vec<DetectedOpportunity>>> {
    let script = state.store.get_script(&script_id).await?;
    let opportunities = run_detection(&state, &script).await?;
    Ok(Json(opportunities))
}

async fn get_opportunities(
    State(state): State<ApiState>,
    Path(script_id): Path<String>,
) -> Result<Json<Vec<DetectedOpportunity>>> {
    // 404 for unknown scripts rather than an empty list
    state.store.get_script(&script_id).await?;
    Ok(Json(state.store.list_opportunities(&script_id).await?))
}

async fn update_opportunity_status(
    State(state): State<ApiState>,
    Path((script_id, opportunity_id)): Path<(String, String)>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<DetectedOpportunity>> {
    let updated = state
        .store
        .set_status(&script_id, &opportunity_id, body.status)
        .await?;
    info!(
        opportunity_id = %updated.id,
        script_id = %updated.script_id,
        status = %updated.status,
        "opportunity status updated"
    );
    Ok(Json(updated))
}

async fn update_opportunity_statuses(
    State(state): State<ApiState>,
    Path(script_id): Path<String>,
    Json(body): Json<BatchStatusUpdate>,
) -> Result<Json<BatchStatusResponse>> {
    let updated_count = state.store.batch_set_status(&script_id, &body.updates).await?;
    let opportunities = state.store.list_opportunities(&script_id).await?;
    info!(
        script_id = %script_id,
        requested = body.updates.len(),
        updated = updated_count,
        "opportunity statuses updated"
    );
    Ok(Json(BatchStatusResponse {
        updated_count,
        opportunities,
    }))
}

async fn calculate_script_budget(
    State(state): State<ApiState>,
    Path(script_id): Path<String>,
) -> Result<Json<BudgetReport>> {
    let started = Instant::now();
    let script = state.store.get_script(&script_id).await?;
    let accepted = state.store.accepted_opportunities(&script_id).await?;
    let existing = state.store.get_budget(&script_id).await?;

    let report = calculate_budget(&script_id, &script.params, &accepted, existing.as_ref());
    state.store.upsert_budget(&report).await?;
    state.latency.record(Operation::Budget, started.elapsed());
    state.health.record_budget();

    info!(
        script_id = %script_id,
        accepted = accepted.len(),
        sponsorship = report.potential_sponsorship_revenue,
        net_impact = report.net_impact,
        brand_safety = report.brand_safety_score,
        "budget report saved"
    );
    Ok(Json(report))
}

async fn get_budget(
    State(state): State<ApiState>,
    Path(script_id): Path<String>,
) -> Result<Json<BudgetReport>> {
    state.store.get_script(&script_id).await?;
    state
        .store
        .get_budget(&script_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("budget for script {script_id}")))
}

async fn list_analyses(State(state): State<ApiState>) -> Result<Json<Vec<ScriptAnalysis>>> {
    Ok(Json(state.store.list_analyses().await?))
}

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    let h = &state.health;
    Json(HealthResponse {
        status: "ok",
        catalog_terms: state.pipeline.catalog().len(),
        scripts_analyzed: h.scripts_analyzed(),
        opportunities_detected: h.opportunities_detected(),
        budgets_calculated: h.budgets_calculated(),
        last_analysis_at_ns: h.last_analysis_at_ns(),
    })
}

async fn get_stats_latency(State(state): State<ApiState>) -> Json<LatencyReport> {
    Json(state.latency.report())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Detects opportunities for `script` and replaces the stored set.
async fn run_detection(state: &ApiState, script: &Script) -> Result<Vec<DetectedOpportunity>> {
    let started = Instant::now();
    let opportunities = state.pipeline.detect(&script.id, &script.text, &script.params);
    state.store.replace_opportunities(&script.id, &opportunities).await?;
    state.latency.record(Operation::Analyze, started.elapsed());
    state.health.record_analysis(opportunities.len(), now_ns());

    info!(
        script_id = %script.id,
        opportunities = opportunities.len(),
        flexibility = %script.params.creative_flexibility,
        elapsed_us = started.elapsed().as_micros() as u64,
        "script analyzed"
    );
    Ok(opportunities)
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}
