use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::budget_heuristics::*;
use crate::types::{BudgetReport, Category, DetectedOpportunity, OpportunityStatus, ScriptParameters};

const TIP_SEAMLESS: &str = "Focus on seamless integration to maintain viewer retention.";
const TIP_BUNDLE: &str = "Consider bundling multiple placements for a single brand partner.";
const TIP_HIGH_SPONSORSHIP: &str =
    "High sponsorship potential! Consider hiring a dedicated brand partnership manager.";
const TIP_LOCATION: &str =
    "Location-based sponsorships detected. Research local tax incentives or tourism board grants.";
const TIP_CLEARANCE: &str =
    "Product placement rights clearance is essential. Ensure all agreements are in writing.";

/// Financial summary for a script from its accepted opportunities.
///
/// Opportunities that are not `Accepted` are skipped. When `existing` is
/// given its `created_at` is kept; every other field is recomputed.
pub fn calculate_budget(
    script_id: &str,
    params: &ScriptParameters,
    opportunities: &[DetectedOpportunity],
    existing: Option<&BudgetReport>,
) -> BudgetReport {
    calculate_budget_at(script_id, params, opportunities, existing, Utc::now())
}

pub fn calculate_budget_at(
    script_id: &str,
    params: &ScriptParameters,
    opportunities: &[DetectedOpportunity],
    existing: Option<&BudgetReport>,
    now: DateTime<Utc>,
) -> BudgetReport {
    let baseline = baseline_revenue(&params.target_audience);

    let mut sponsorship = 0.0;
    let mut by_category: BTreeMap<Category, f64> = BTreeMap::new();
    for opp in opportunities
        .iter()
        .filter(|o| o.status == OpportunityStatus::Accepted)
    {
        sponsorship += opp.estimated_revenue;
        *by_category.entry(opp.category).or_insert(0.0) += opp.estimated_revenue;
    }

    let total = baseline + sponsorship;
    let net_impact = total - params.production_budget;
    let brand_safety = brand_safety_score(&by_category);
    let tips = monetization_tips(sponsorship, params.production_budget, &by_category);

    debug!(
        script_id,
        baseline,
        sponsorship,
        net_impact,
        brand_safety,
        categories = by_category.len(),
        "budget calculated"
    );

    BudgetReport {
        script_id: script_id.to_string(),
        baseline_adsense_revenue: baseline,
        potential_sponsorship_revenue: sponsorship,
        total_projected_revenue: total,
        production_budget: params.production_budget,
        net_impact,
        category_breakdown: by_category
            .into_iter()
            .map(|(c, v)| (c.label().to_string(), v))
            .collect(),
        brand_safety_score: brand_safety,
        monetization_tips: tips,
        created_at: existing.map_or(now, |r| r.created_at),
        updated_at: now,
    }
}

/// First rule to match wins; "young" is checked before "tech".
pub fn baseline_revenue(target_audience: &str) -> f64 {
    let audience = target_audience.to_lowercase();
    if audience.contains("young") {
        BASELINE_YOUNG
    } else if audience.contains("tech") {
        BASELINE_TECH
    } else {
        BASELINE_DEFAULT
    }
}

/// Placeholder heuristic: only heavy product placement is penalised.
fn brand_safety_score(by_category: &BTreeMap<Category, f64>) -> u8 {
    let product = by_category.get(&Category::Product).copied().unwrap_or(0.0);
    if product > BRAND_SAFETY_PRODUCT_THRESHOLD {
        BRAND_SAFETY_START - BRAND_SAFETY_PRODUCT_PENALTY
    } else {
        BRAND_SAFETY_START
    }
}

fn monetization_tips(
    sponsorship: f64,
    production_budget: f64,
    by_category: &BTreeMap<Category, f64>,
) -> Vec<String> {
    let revenue_for = |c: Category| by_category.get(&c).copied().unwrap_or(0.0);

    let mut tips = vec![TIP_SEAMLESS.to_string(), TIP_BUNDLE.to_string()];
    if sponsorship > production_budget * HIGH_SPONSORSHIP_RATIO {
        tips.push(TIP_HIGH_SPONSORSHIP.to_string());
    }
    if revenue_for(Category::Environment) > 0.0 {
        tips.push(TIP_LOCATION.to_string());
    }
    if revenue_for(Category::Product) > 0.0 {
        tips.push(TIP_CLEARANCE.to_string());
    }
    tips
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CreativeFlexibility;
    use chrono::TimeZone;

    fn params(budget: f64, audience: &str) -> ScriptParameters {
        ScriptParameters {
            production_budget: budget,
            target_audience: audience.to_string(),
            creative_flexibility: CreativeFlexibility::MinorDialogueChanges,
            notes: None,
            title: None,
        }
    }

    fn opp(category: Category, revenue: f64, status: OpportunityStatus) -> DetectedOpportunity {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        DetectedOpportunity {
            id: format!("{category}-{revenue}"),
            script_id: "s1".to_string(),
            matched_text: "x".to_string(),
            category,
            reason: "r".to_string(),
            estimated_revenue: revenue,
            status,
            excerpt: "x".to_string(),
            start_index: 0,
            end_index: 1,
            confidence_score: 80,
            created_at: now,
            updated_at: now,
        }
    }

    fn accepted(category: Category, revenue: f64) -> DetectedOpportunity {
        opp(category, revenue, OpportunityStatus::Accepted)
    }

    #[test]
    fn rollup_for_tech_audience() {
        let opps = vec![
            accepted(Category::Product, 5000.0),
            accepted(Category::Product, 6000.0),
            accepted(Category::Environment, 3000.0),
        ];
        let r = calculate_budget("s1", &params(50_000.0, "tech professionals"), &opps, None);

        assert_eq!(r.baseline_adsense_revenue, 75_000.0);
        assert_eq!(r.potential_sponsorship_revenue, 14_000.0);
        assert_eq!(r.total_projected_revenue, 89_000.0);
        assert_eq!(r.net_impact, 39_000.0);
        assert_eq!(r.category_breakdown.len(), 2);
        assert_eq!(r.category_breakdown["Product"], 11_000.0);
        assert_eq!(r.category_breakdown["Environment"], 3_000.0);
        assert_eq!(r.brand_safety_score, 90);
        assert!(r.monetization_tips.contains(&TIP_CLEARANCE.to_string()));
        assert!(r.monetization_tips.contains(&TIP_LOCATION.to_string()));
        assert!(!r.monetization_tips.contains(&TIP_HIGH_SPONSORSHIP.to_string()));
    }

    #[test]
    fn nothing_accepted_still_reports_baseline() {
        let r = calculate_budget("s1", &params(20_000.0, "families"), &[], None);
        assert_eq!(r.baseline_adsense_revenue, 50_000.0);
        assert_eq!(r.potential_sponsorship_revenue, 0.0);
        assert_eq!(r.net_impact, 30_000.0);
        assert!(r.category_breakdown.is_empty());
        assert_eq!(r.brand_safety_score, 95);
        assert_eq!(r.monetization_tips, vec![TIP_SEAMLESS.to_string(), TIP_BUNDLE.to_string()]);
    }

    #[test]
    fn young_checked_before_tech() {
        assert_eq!(baseline_revenue("Young TECH enthusiasts"), 60_000.0);
        assert_eq!(baseline_revenue("FinTech buyers"), 75_000.0);
        assert_eq!(baseline_revenue("retirees"), 50_000.0);
    }

    #[test]
    fn pending_and_rejected_are_ignored() {
        let opps = vec![
            accepted(Category::Situation, 2000.0),
            opp(Category::Product, 9000.0, OpportunityStatus::Pending),
            opp(Category::Environment, 4000.0, OpportunityStatus::Rejected),
        ];
        let r = calculate_budget("s1", &params(1_000_000.0, "everyone"), &opps, None);
        assert_eq!(r.potential_sponsorship_revenue, 2000.0);
        assert_eq!(r.category_breakdown.keys().collect::<Vec<_>>(), vec!["Situation"]);
        assert_eq!(r.monetization_tips.len(), 2);
    }

    #[test]
    fn tips_in_fixed_order() {
        let opps = vec![
            accepted(Category::Product, 4000.0),
            accepted(Category::Environment, 2000.0),
        ];
        let r = calculate_budget("s1", &params(10_000.0, "everyone"), &opps, None);
        assert_eq!(
            r.monetization_tips,
            vec![
                TIP_SEAMLESS.to_string(),
                TIP_BUNDLE.to_string(),
                TIP_HIGH_SPONSORSHIP.to_string(),
                TIP_LOCATION.to_string(),
                TIP_CLEARANCE.to_string(),
            ]
        );
    }

    #[test]
    fn product_exactly_at_threshold_keeps_score() {
        let opps = vec![accepted(Category::Product, 10_000.0)];
        let r = calculate_budget("s1", &params(0.0, "everyone"), &opps, None);
        assert_eq!(r.brand_safety_score, 95);
    }

    #[test]
    fn recompute_preserves_created_at() {
        let first_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let p = params(10_000.0, "everyone");

        let first = calculate_budget_at("s1", &p, &[accepted(Category::Product, 9000.0)], None, first_at);
        assert_eq!(first.created_at, first_at);
        assert_eq!(first.updated_at, first_at);

        let second = calculate_budget_at("s1", &p, &[], Some(&first), later);
        assert_eq!(second.created_at, first_at);
        assert_eq!(second.updated_at, later);
        assert_eq!(second.potential_sponsorship_revenue, 0.0);
        assert_eq!(second.monetization_tips.len(), 2);
    }
}
