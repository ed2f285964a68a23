use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::models::{BudgetRow, OpportunityRow, ScriptRow};
use crate::error::{AppError, Result};
use crate::state::ScriptLocks;
use crate::types::{
    BudgetReport, DetectedOpportunity, OpportunityStatus, Script, ScriptAnalysis, ScriptParameters,
    StatusChange,
};

const OPPORTUNITY_COLUMNS: &str = "id, script_id, matched_text, category, reason, estimated_revenue, \
     status, excerpt, start_index, end_index, confidence_score, created_at, updated_at";

/// SQLite persistence for scripts, their opportunities and budget reports.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
    locks: Arc<ScriptLocks>,
}

impl Store {
    /// Opens (creating if needed) the database file and runs migrations.
    pub async fn connect(db_path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        let store = Self::from_pool(pool).await?;
        info!("Database ready at {db_path}");
        Ok(store)
    }

    /// Single-connection in-memory database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self {
            pool,
            locks: ScriptLocks::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Scripts
    // -----------------------------------------------------------------------

    pub async fn insert_script(
        &self,
        title: String,
        text: String,
        params: ScriptParameters,
    ) -> Result<Script> {
        let now = Utc::now();
        let script = Script {
            id: Uuid::new_v4().to_string(),
            title,
            text,
            params,
            created_at: now,
            updated_at: now,
        };
        let params_json = serde_json::to_string(&script.params)?;

        sqlx::query(
            r#"
            INSERT INTO scripts (id, title, text, params, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&script.id)
        .bind(&script.title)
        .bind(&script.text)
        .bind(params_json)
        .bind(script.created_at)
        .bind(script.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(script)
    }

    pub async fn get_script(&self, script_id: &str) -> Result<Script> {
        let row: Option<ScriptRow> = sqlx::query_as(
            "SELECT id, title, text, params, created_at, updated_at FROM scripts WHERE id = ?",
        )
        .bind(script_id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| AppError::NotFound(format!("script {script_id}")))?
            .try_into()
    }

    /// Newest first.
    pub async fn list_scripts(&self) -> Result<Vec<Script>> {
        let rows: Vec<ScriptRow> = sqlx::query_as(
            "SELECT id, title, text, params, created_at, updated_at FROM scripts ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Script::try_from).collect()
    }

    /// Removes the script together with its opportunities and budget report.
    pub async fn delete_script(&self, script_id: &str) -> Result<()> {
        let lock = self.locks.lock_for(script_id);
        let deleted = {
            let _guard = lock.write().await;
            sqlx::query("DELETE FROM scripts WHERE id = ?")
                .bind(script_id)
                .execute(&self.pool)
                .await?
                .rows_affected()
        };
        self.locks.forget(script_id);

        if deleted == 0 {
            return Err(AppError::NotFound(format!("script {script_id}")));
        }
        info!(script_id, "script deleted");
        Ok(())
    }

    /// Every script with a budget report, newest script first.
    pub async fn list_analyses(&self) -> Result<Vec<ScriptAnalysis>> {
        let rows: Vec<ScriptRow> = sqlx::query_as(
            r#"
            SELECT s.id, s.title, s.text, s.params, s.created_at, s.updated_at
            FROM scripts s
            JOIN budget_reports b ON b.script_id = s.id
            ORDER BY s.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut analyses = Vec::with_capacity(rows.len());
        for row in rows {
            let script = Script::try_from(row)?;
            let opportunities = self.list_opportunities(&script.id).await?;
            // deleted since the listing query
            let Some(budget) = self.get_budget(&script.id).await? else {
                continue;
            };
            analyses.push(ScriptAnalysis {
                script,
                opportunities,
                budget,
            });
        }
        Ok(analyses)
    }

    // -----------------------------------------------------------------------
    // Opportunities
    // -----------------------------------------------------------------------

    /// Deletes every stored opportunity of the script and inserts `opportunities`
    /// in their given order, atomically.
    pub async fn replace_opportunities(
        &self,
        script_id: &str,
        opportunities: &[DetectedOpportunity],
    ) -> Result<()> {
        let lock = self.locks.lock_for(script_id);
        let _guard = lock.write().await;

        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM opportunities WHERE script_id = ?")
            .bind(script_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        for (position, o) in opportunities.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO opportunities (
                    id, script_id, position, matched_text, category, reason,
                    estimated_revenue, status, excerpt, start_index, end_index,
                    confidence_score, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&o.id)
            .bind(script_id)
            .bind(position as i64)
            .bind(&o.matched_text)
            .bind(o.category.to_string())
            .bind(&o.reason)
            .bind(o.estimated_revenue)
            .bind(o.status.to_string())
            .bind(&o.excerpt)
            .bind(o.start_index as i64)
            .bind(o.end_index as i64)
            .bind(i64::from(o.confidence_score))
            .bind(o.created_at)
            .bind(o.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(script_id, removed, inserted = opportunities.len(), "opportunities replaced");
        Ok(())
    }

    /// Detection order.
    pub async fn list_opportunities(&self, script_id: &str) -> Result<Vec<DetectedOpportunity>> {
        let lock = self.locks.lock_for(script_id);
        let _guard = lock.read().await;

        let rows: Vec<OpportunityRow> = sqlx::query_as(&format!(
            "SELECT {OPPORTUNITY_COLUMNS} FROM opportunities WHERE script_id = ? ORDER BY position"
        ))
        .bind(script_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DetectedOpportunity::try_from).collect()
    }

    pub async fn accepted_opportunities(&self, script_id: &str) -> Result<Vec<DetectedOpportunity>> {
        let all = self.list_opportunities(script_id).await?;
        Ok(all
            .into_iter()
            .filter(|o| o.status == OpportunityStatus::Accepted)
            .collect())
    }

    /// Any status may follow any other. The opportunity must belong to `script_id`.
    pub async fn set_status(
        &self,
        script_id: &str,
        opportunity_id: &str,
        status: OpportunityStatus,
    ) -> Result<DetectedOpportunity> {
        let row: Option<OpportunityRow> = sqlx::query_as(&format!(
            "UPDATE opportunities SET status = ?, updated_at = ? \
             WHERE id = ? AND script_id = ? RETURNING {OPPORTUNITY_COLUMNS}"
        ))
        .bind(status.to_string())
        .bind(Utc::now())
        .bind(opportunity_id)
        .bind(script_id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| {
            AppError::NotFound(format!("opportunity {opportunity_id} of script {script_id}"))
        })?
        .try_into()
    }

    /// Applies every resolvable change in one transaction and returns how many
    /// rows changed. Changes for other scripts' opportunities match nothing.
    pub async fn batch_set_status(&self, script_id: &str, changes: &[StatusChange]) -> Result<usize> {
        self.get_script(script_id).await?;

        let lock = self.locks.lock_for(script_id);
        let _guard = lock.write().await;

        let now = Utc::now();
        let mut updated = 0;
        let mut tx = self.pool.begin().await?;
        for (opportunity_id, status) in changes.iter().filter_map(StatusChange::resolve) {
            updated += sqlx::query(
                "UPDATE opportunities SET status = ?, updated_at = ? WHERE id = ? AND script_id = ?",
            )
            .bind(status.to_string())
            .bind(now)
            .bind(opportunity_id)
            .bind(script_id)
            .execute(&mut *tx)
            .await?
            .rows_affected() as usize;
        }
        tx.commit().await?;

        debug!(script_id, requested = changes.len(), updated, "batch status update");
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Budget reports
    // -----------------------------------------------------------------------

    /// One report per script; a recompute overwrites everything except `created_at`.
    pub async fn upsert_budget(&self, report: &BudgetReport) -> Result<()> {
        let breakdown = serde_json::to_string(&report.category_breakdown)?;
        let tips = serde_json::to_string(&report.monetization_tips)?;

        sqlx::query(
            r#"
            INSERT INTO budget_reports (
                script_id, baseline_adsense_revenue, potential_sponsorship_revenue,
                total_projected_revenue, production_budget, net_impact,
                category_breakdown, brand_safety_score, monetization_tips,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(script_id) DO UPDATE SET
                baseline_adsense_revenue = excluded.baseline_adsense_revenue,
                potential_sponsorship_revenue = excluded.potential_sponsorship_revenue,
                total_projected_revenue = excluded.total_projected_revenue,
                production_budget = excluded.production_budget,
                net_impact = excluded.net_impact,
                category_breakdown = excluded.category_breakdown,
                brand_safety_score = excluded.brand_safety_score,
                monetization_tips = excluded.monetization_tips,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&report.script_id)
        .bind(report.baseline_adsense_revenue)
        .bind(report.potential_sponsorship_revenue)
        .bind(report.total_projected_revenue)
        .bind(report.production_budget)
        .bind(report.net_impact)
        .bind(breakdown)
        .bind(i64::from(report.brand_safety_score))
        .bind(tips)
        .bind(report.created_at)
        .bind(report.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_budget(&self, script_id: &str) -> Result<Option<BudgetReport>> {
        let row: Option<BudgetRow> = sqlx::query_as(
            r#"
            SELECT script_id, baseline_adsense_revenue, potential_sponsorship_revenue,
                   total_projected_revenue, production_budget, net_impact,
                   category_breakdown, brand_safety_score, monetization_tips,
                   created_at, updated_at
            FROM budget_reports
            WHERE script_id = ?
            "#,
        )
        .bind(script_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(BudgetReport::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::calculate_budget_at;
    use crate::types::{Category, CreativeFlexibility};
    use chrono::{DateTime, TimeZone};

    fn params() -> ScriptParameters {
        ScriptParameters {
            production_budget: 40_000.0,
            target_audience: "young professionals".to_string(),
            creative_flexibility: CreativeFlexibility::SceneLevelChanges,
            notes: Some("Urban".to_string()),
            title: None,
        }
    }

    fn opp(id: &str, script_id: &str, start: usize, at: DateTime<Utc>) -> DetectedOpportunity {
        DetectedOpportunity {
            id: id.to_string(),
            script_id: script_id.to_string(),
            matched_text: "Coffee".to_string(),
            category: Category::Product,
            reason: "CPG category; high advertiser demand".to_string(),
            estimated_revenue: 6500.0,
            status: OpportunityStatus::Pending,
            excerpt: "...a Coffee...".to_string(),
            start_index: start,
            end_index: start + 6,
            confidence_score: 90,
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn script_round_trip() {
        let store = Store::in_memory().await.unwrap();
        let script = store
            .insert_script("Scene".to_string(), "INT. CAFE - DAY".to_string(), params())
            .await
            .unwrap();

        let loaded = store.get_script(&script.id).await.unwrap();
        assert_eq!(loaded.title, "Scene");
        assert_eq!(loaded.params, params());
        assert_eq!(store.list_scripts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_script_is_not_found() {
        let store = Store::in_memory().await.unwrap();
        assert!(matches!(store.get_script("nope").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn replace_drops_previous_set_and_keeps_order() {
        let store = Store::in_memory().await.unwrap();
        let script = store
            .insert_script("t".to_string(), "text text text".to_string(), params())
            .await
            .unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();

        store
            .replace_opportunities(&script.id, &[opp("a", &script.id, 0, at), opp("b", &script.id, 10, at)])
            .await
            .unwrap();
        // later position first: stored order must follow the given order
        store
            .replace_opportunities(&script.id, &[opp("d", &script.id, 40, at), opp("c", &script.id, 20, at)])
            .await
            .unwrap();

        let stored = store.list_opportunities(&script.id).await.unwrap();
        let ids: Vec<_> = stored.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "c"]);
        assert_eq!(stored[0], opp("d", &script.id, 40, at));
    }

    #[tokio::test]
    async fn status_updates_are_unconstrained() {
        let store = Store::in_memory().await.unwrap();
        let script = store
            .insert_script("t".to_string(), "text text text".to_string(), params())
            .await
            .unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        store
            .replace_opportunities(&script.id, &[opp("a", &script.id, 0, at), opp("b", &script.id, 10, at)])
            .await
            .unwrap();

        let id = script.id.as_str();
        let updated = store.set_status(id, "a", OpportunityStatus::Rejected).await.unwrap();
        assert_eq!(updated.status, OpportunityStatus::Rejected);
        assert!(updated.updated_at > at);
        store.set_status(id, "a", OpportunityStatus::Accepted).await.unwrap();
        store.set_status(id, "b", OpportunityStatus::Accepted).await.unwrap();
        store.set_status(id, "b", OpportunityStatus::Pending).await.unwrap();

        let accepted = store.accepted_opportunities(&script.id).await.unwrap();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].id, "a");

        assert!(matches!(
            store.set_status(id, "missing", OpportunityStatus::Accepted).await,
            Err(AppError::NotFound(_))
        ));
    }

    async fn seeded(store: &Store, at: DateTime<Utc>, ids: &[&str]) -> Script {
        let script = store
            .insert_script("t".to_string(), "text text text".to_string(), params())
            .await
            .unwrap();
        let opps: Vec<_> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| opp(id, &script.id, i * 10, at))
            .collect();
        store.replace_opportunities(&script.id, &opps).await.unwrap();
        script
    }

    #[tokio::test]
    async fn status_update_is_scoped_to_script() {
        let store = Store::in_memory().await.unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let first = seeded(&store, at, &["a"]).await;
        let second = seeded(&store, at, &["b"]).await;

        assert!(matches!(
            store.set_status(&second.id, "a", OpportunityStatus::Accepted).await,
            Err(AppError::NotFound(_))
        ));
        let untouched = store.list_opportunities(&first.id).await.unwrap();
        assert_eq!(untouched[0].status, OpportunityStatus::Pending);
    }

    #[tokio::test]
    async fn batch_update_skips_foreign_and_invalid_entries() {
        let store = Store::in_memory().await.unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let mine = seeded(&store, at, &["a", "b", "c"]).await;
        let other = seeded(&store, at, &["x"]).await;

        let changes: Vec<StatusChange> = serde_json::from_value(serde_json::json!([
            {"id": "a", "status": "accepted"},
            {"id": "b", "status": "rejected"},
            {"id": "c", "status": "archived"},
            {"id": "x", "status": "accepted"},
            {"id": "ghost", "status": "accepted"},
            {"status": "accepted"}
        ]))
        .unwrap();
        let updated = store.batch_set_status(&mine.id, &changes).await.unwrap();
        assert_eq!(updated, 2);

        let statuses: Vec<_> = store
            .list_opportunities(&mine.id)
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.status)
            .collect();
        assert_eq!(
            statuses,
            vec![OpportunityStatus::Accepted, OpportunityStatus::Rejected, OpportunityStatus::Pending]
        );
        let foreign = store.list_opportunities(&other.id).await.unwrap();
        assert_eq!(foreign[0].status, OpportunityStatus::Pending);

        assert_eq!(store.batch_set_status(&mine.id, &[]).await.unwrap(), 0);
        assert!(matches!(
            store.batch_set_status("nope", &changes).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_cascades_and_forgets_lock() {
        let store = Store::in_memory().await.unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let script = seeded(&store, at, &["a", "b"]).await;
        let report = calculate_budget_at(&script.id, &params(), &[], None, at);
        store.upsert_budget(&report).await.unwrap();
        assert_eq!(store.locks.tracked_scripts(), 1);

        store.delete_script(&script.id).await.unwrap();

        assert!(matches!(store.get_script(&script.id).await, Err(AppError::NotFound(_))));
        assert!(store.get_budget(&script.id).await.unwrap().is_none());
        let (orphans,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM opportunities")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(orphans, 0);
        assert_eq!(store.locks.tracked_scripts(), 0);

        assert!(matches!(store.delete_script(&script.id).await, Err(AppError::NotFound(_))));
        assert_eq!(store.locks.tracked_scripts(), 0);
    }

    #[tokio::test]
    async fn analyses_list_only_budgeted_scripts_newest_first() {
        let store = Store::in_memory().await.unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let older = seeded(&store, at, &["a"]).await;
        let unbudgeted = seeded(&store, at, &["b"]).await;
        let newer = seeded(&store, at, &["c", "d"]).await;
        for script in [&older, &newer] {
            let report = calculate_budget_at(&script.id, &params(), &[], None, at);
            store.upsert_budget(&report).await.unwrap();
        }

        let analyses = store.list_analyses().await.unwrap();
        let ids: Vec<_> = analyses.iter().map(|a| a.script.id.as_str()).collect();
        assert_eq!(ids, vec![newer.id.as_str(), older.id.as_str()]);
        assert!(!ids.contains(&unbudgeted.id.as_str()));
        assert_eq!(analyses[0].opportunities.len(), 2);
        assert_eq!(analyses[0].budget.script_id, newer.id);
    }

    #[tokio::test]
    async fn budget_upsert_keeps_created_at() {
        let store = Store::in_memory().await.unwrap();
        let script = store
            .insert_script("t".to_string(), "text text text".to_string(), params())
            .await
            .unwrap();
        assert!(store.get_budget(&script.id).await.unwrap().is_none());

        let first_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let mut accepted = opp("a", &script.id, 0, first_at);
        accepted.status = OpportunityStatus::Accepted;

        let first = calculate_budget_at(&script.id, &params(), &[accepted], None, first_at);
        store.upsert_budget(&first).await.unwrap();

        // stale created_at in the second report must not overwrite the stored one
        let mut second = calculate_budget_at(&script.id, &params(), &[], Some(&first), later);
        second.created_at = later;
        store.upsert_budget(&second).await.unwrap();

        let stored = store.get_budget(&script.id).await.unwrap().unwrap();
        assert_eq!(stored.created_at, first_at);
        assert_eq!(stored.updated_at, later);
        assert_eq!(stored.potential_sponsorship_revenue, 0.0);
        assert!(stored.category_breakdown.is_empty());
        assert_eq!(stored.monetization_tips.len(), 2);
    }
}
