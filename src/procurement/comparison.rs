//! Project-level procurement comparison

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::config::ScoringConfig;
use crate::core::entity::{Id, QuoteFreshness, Strategy};
use crate::procurement::consolidation::VendorConsolidation;
use crate::procurement::coverage::BomItemAnalysis;
use crate::procurement::index::QuoteIndex;
use crate::procurement::recommend::RecommendationPlan;
use crate::procurement::risk::{self, ProjectRiskAssessment};
use crate::procurement::Snapshot;

/// Age distribution of every quote for the project's specifications
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuoteFreshnessStats {
    pub total: usize,
    pub fresh: usize,
    pub stale: usize,
    pub expired: usize,
    pub average_age_days: i64,
}

impl QuoteFreshnessStats {
    /// Count each indexed quote once
    pub fn from_index(index: &QuoteIndex, now: DateTime<Utc>, fresh_within_days: i64) -> Self {
        let mut stats = Self::default();
        let mut total_age = 0i64;

        for quote in index.iter() {
            stats.total += 1;
            total_age += quote.age_days(now);
            match quote.freshness(now, fresh_within_days) {
                QuoteFreshness::Fresh => stats.fresh += 1,
                QuoteFreshness::Stale => stats.stale += 1,
                QuoteFreshness::Expired => stats.expired += 1,
            }
        }

        if stats.total > 0 {
            stats.average_age_days = total_age / stats.total as i64;
        }
        stats
    }
}

/// Everything known about procuring one project's BOM
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectComparison {
    pub project_id: Id,
    pub project_name: String,
    pub strategy: Strategy,

    pub total_bom_items: usize,
    pub fully_covered_items: usize,
    pub partially_covered_items: usize,
    pub uncovered_items: usize,

    pub project_budget: f64,
    pub total_target_cost: f64,
    pub best_case_cost: f64,
    pub recommended_cost: f64,
    pub worst_case_cost: f64,
    pub savings_vs_budget: f64,
    pub savings_vs_target: f64,
    /// Savings vs budget as a share of the budget
    pub savings_percent: f64,

    pub bom_item_analyses: Vec<BomItemAnalysis>,
    pub vendor_consolidation: Vec<VendorConsolidation>,
    /// Assignment under the project's stored strategy
    pub vendor_recommendations: RecommendationPlan,
    pub total_vendors_needed: usize,

    pub risk_assessment: ProjectRiskAssessment,
    pub quote_freshness: QuoteFreshnessStats,
    pub analysis_date: DateTime<Utc>,
}

pub(crate) fn build(snapshot: &Snapshot, scoring: &ScoringConfig, now: DateTime<Utc>) -> ProjectComparison {
    let project = &snapshot.project;
    let analyses = &snapshot.analyses;

    let mut comparison = ProjectComparison {
        project_id: project.id,
        project_name: project.name.clone(),
        strategy: snapshot.strategy.strategy,
        total_bom_items: analyses.len(),
        fully_covered_items: 0,
        partially_covered_items: 0,
        uncovered_items: 0,
        project_budget: project.budget,
        total_target_cost: 0.0,
        best_case_cost: 0.0,
        recommended_cost: 0.0,
        worst_case_cost: 0.0,
        savings_vs_budget: 0.0,
        savings_vs_target: 0.0,
        savings_percent: 0.0,
        bom_item_analyses: analyses.clone(),
        vendor_consolidation: snapshot.consolidation.clone(),
        vendor_recommendations: snapshot.plan.clone(),
        total_vendors_needed: snapshot.plan.vendor_count,
        risk_assessment: risk::assess_project(analyses),
        quote_freshness: QuoteFreshnessStats::from_index(
            &snapshot.index,
            now,
            scoring.fresh_within_days,
        ),
        analysis_date: now,
    };

    for analysis in analyses {
        if !analysis.has_sufficient_quotes {
            comparison.uncovered_items += 1;
        } else if analysis.coverage_percent >= 100.0 {
            comparison.fully_covered_items += 1;
        } else {
            comparison.partially_covered_items += 1;
        }

        comparison.total_target_cost += analysis.target_total_cost;
        comparison.best_case_cost += analysis.best_total_cost;
        comparison.recommended_cost += analysis.recommended_total_cost;
        comparison.worst_case_cost += analysis.worst_price() * f64::from(analysis.total_quantity_needed);
    }

    if comparison.project_budget > 0.0 {
        comparison.savings_vs_budget = comparison.project_budget - comparison.recommended_cost;
        comparison.savings_percent = comparison.savings_vs_budget / comparison.project_budget * 100.0;
    }
    if comparison.total_target_cost > 0.0 {
        comparison.savings_vs_target = comparison.total_target_cost - comparison.recommended_cost;
    }

    comparison
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Quote;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn quote(id: Id, age_days: i64, valid_until: Option<i64>) -> Quote {
        Quote {
            id,
            vendor_id: 1,
            vendor_name: "vendor1".to_string(),
            product_id: 1,
            product_name: "Widget".to_string(),
            specification_id: Some(1),
            price: 10.0,
            currency: "USD".to_string(),
            converted_price: 10.0,
            conversion_rate: 1.0,
            quote_date: now() - Duration::days(age_days),
            valid_until: valid_until.map(|d| now() + Duration::days(d)),
            created_at: now() - Duration::days(age_days),
        }
    }

    #[test]
    fn test_freshness_buckets() {
        let index = QuoteIndex::new(
            vec![quote(1, 10, None), quote(2, 100, None), quote(3, 200, Some(-50))],
            now(),
        );
        let stats = QuoteFreshnessStats::from_index(&index, now(), 30);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.fresh, 1);
        assert_eq!(stats.stale, 1);
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.average_age_days, (10 + 100 + 200) / 3);
    }

    #[test]
    fn test_no_quotes_average_is_zero() {
        let stats = QuoteFreshnessStats::from_index(&QuoteIndex::default(), now(), 30);
        assert_eq!(stats, QuoteFreshnessStats::default());
    }
}
