//! Project risk assessment
//!
//! Two views: a quick factor list attached to every comparison, and the
//! enhanced assessment that scores five weighted categories on the fixed
//! 25/50/75/100 ladder and derives mitigation actions from them.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::core::config::{RiskWeights, ScoringConfig};
use crate::core::entity::{Id, RiskLevel};
use crate::entities::RatingSummary;
use crate::procurement::comparison::ProjectComparison;
use crate::procurement::coverage::BomItemAnalysis;

/// Scored risk category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    QuoteCoverage,
    Timeline,
    Budget,
    SupplyChain,
    Quality,
}

impl RiskCategory {
    pub fn all() -> &'static [RiskCategory] {
        &[
            RiskCategory::QuoteCoverage,
            RiskCategory::Timeline,
            RiskCategory::Budget,
            RiskCategory::SupplyChain,
            RiskCategory::Quality,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskCategory::QuoteCoverage => "quote_coverage",
            RiskCategory::Timeline => "timeline",
            RiskCategory::Budget => "budget",
            RiskCategory::SupplyChain => "supply_chain",
            RiskCategory::Quality => "quality",
        }
    }

    /// Weight of this category in the overall score
    pub fn weight(self, weights: &RiskWeights) -> f64 {
        match self {
            RiskCategory::QuoteCoverage => weights.quote_coverage,
            RiskCategory::Timeline => weights.timeline,
            RiskCategory::Budget => weights.budget,
            RiskCategory::SupplyChain => weights.supply_chain,
            RiskCategory::Quality => weights.quality,
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Quick assessment
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskFactor {
    pub category: String,
    pub severity: RiskLevel,
    pub description: String,
    pub affected_bom_items: Vec<Id>,
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRiskAssessment {
    pub overall_risk: RiskLevel,
    pub risk_factors: Vec<RiskFactor>,
    pub mitigation_actions: Vec<String>,
}

/// Factor list from uncovered and single-source BOM items
pub fn assess_project(analyses: &[BomItemAnalysis]) -> ProjectRiskAssessment {
    let uncovered: Vec<Id> = analyses
        .iter()
        .filter(|a| !a.has_sufficient_quotes)
        .map(|a| a.bom_item_id)
        .collect();
    let single_source: Vec<Id> = analyses
        .iter()
        .filter(|a| a.is_single_source())
        .map(|a| a.bom_item_id)
        .collect();

    let mut assessment = ProjectRiskAssessment {
        overall_risk: RiskLevel::Low,
        risk_factors: Vec::new(),
        mitigation_actions: Vec::new(),
    };

    if !uncovered.is_empty() {
        assessment.risk_factors.push(RiskFactor {
            category: "quote_coverage".to_string(),
            severity: RiskLevel::Critical,
            description: format!("{} BOM items have no available quotes", uncovered.len()),
            affected_bom_items: uncovered,
            impact: "Cannot proceed with procurement for these items".to_string(),
        });
        assessment
            .mitigation_actions
            .push("Request quotes from vendors for uncovered items".to_string());
    }

    if !single_source.is_empty() {
        assessment.risk_factors.push(RiskFactor {
            category: "vendor_capacity".to_string(),
            severity: RiskLevel::Medium,
            description: format!("{} BOM items have only one vendor option", single_source.len()),
            affected_bom_items: single_source,
            impact: "Limited negotiation leverage and supply chain risk".to_string(),
        });
        assessment
            .mitigation_actions
            .push("Identify additional vendor sources for single-source items".to_string());
    }

    let worst = assessment.risk_factors.iter().map(|f| f.severity).max();
    assessment.overall_risk = match worst {
        Some(RiskLevel::Critical) => RiskLevel::Critical,
        Some(RiskLevel::High) => RiskLevel::High,
        Some(_) => RiskLevel::Medium,
        None => RiskLevel::Low,
    };

    assessment
}

// ============================================================================
// Enhanced assessment
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRisk {
    pub level: RiskLevel,
    pub score: f64,
    pub issues: Vec<String>,
    pub affected_items: usize,
    pub estimated_impact: String,
}

impl CategoryRisk {
    fn new(level: RiskLevel, issues: Vec<String>, affected_items: usize, estimated_impact: &str) -> Self {
        Self {
            level,
            score: level.score(),
            issues,
            affected_items,
            estimated_impact: estimated_impact.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRisk {
    pub level: RiskLevel,
    pub quotes_expiring_soon: usize,
    pub quotes_expired: usize,
    pub average_quote_age_days: i64,
    pub lead_time_risks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetRisk {
    pub level: RiskLevel,
    pub projected_overrun: f64,
    pub overrun_percent: f64,
    pub items_over_budget: usize,
    pub contingency_needed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplyChainRisk {
    pub level: RiskLevel,
    pub single_source_items: usize,
    pub no_quote_items: usize,
    pub low_vendor_diversity: bool,
    pub vendor_capacity_issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityRisk {
    pub level: RiskLevel,
    pub low_rated_vendors: usize,
    pub unrated_vendors: usize,
    pub quality_issues: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionWindow {
    Immediate,
    ShortTerm,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MitigationAction {
    pub priority: RiskLevel,
    pub category: RiskCategory,
    pub action: String,
    pub impact: String,
    pub effort: Effort,
    pub timeline: ActionWindow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhancedRiskAssessment {
    pub overall_risk: RiskLevel,
    /// Weighted 0-100 score
    pub risk_score: f64,
    pub category_risks: BTreeMap<RiskCategory, CategoryRisk>,
    pub timeline_risk: TimelineRisk,
    pub budget_risk: BudgetRisk,
    pub supply_chain_risk: SupplyChainRisk,
    pub quality_risk: QualityRisk,
    pub mitigation_actions: Vec<MitigationAction>,
    /// Action texts of critical and high priority actions
    pub high_priority_actions: Vec<String>,
}

/// Weighted sum of the category ladder scores, clamped to 0-100
pub fn weighted_score(levels: &BTreeMap<RiskCategory, RiskLevel>, weights: &RiskWeights) -> f64 {
    levels
        .iter()
        .map(|(category, level)| level.score() * category.weight(weights))
        .sum::<f64>()
        .clamp(0.0, 100.0)
}

/// Overall label for a weighted score
pub fn level_for_score(score: f64) -> RiskLevel {
    if score >= 75.0 {
        RiskLevel::Critical
    } else if score >= 50.0 {
        RiskLevel::High
    } else if score >= 25.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Score every category of a comparison
///
/// `ratings` must hold the summaries of the recommended vendors; a vendor
/// missing from it counts as unrated.
pub fn assess(
    comparison: &ProjectComparison,
    ratings: &BTreeMap<Id, RatingSummary>,
    scoring: &ScoringConfig,
) -> EnhancedRiskAssessment {
    let coverage = quote_coverage_risk(&comparison.bom_item_analyses);
    let timeline = timeline_risk(comparison);
    let budget = budget_risk(comparison, scoring);
    let supply_chain = supply_chain_risk(comparison);
    let quality = quality_risk(comparison, ratings, scoring);

    let mut category_risks = BTreeMap::new();
    category_risks.insert(RiskCategory::QuoteCoverage, coverage);
    category_risks.insert(
        RiskCategory::Timeline,
        CategoryRisk::new(
            timeline.level,
            timeline.lead_time_risks.clone(),
            timeline.quotes_expired + timeline.quotes_expiring_soon,
            timeline_impact(timeline.level),
        ),
    );
    category_risks.insert(RiskCategory::Budget, budget_category(&budget));
    category_risks.insert(
        RiskCategory::SupplyChain,
        CategoryRisk::new(
            supply_chain.level,
            supply_chain.vendor_capacity_issues.clone(),
            supply_chain.no_quote_items + supply_chain.single_source_items,
            supply_chain_impact(supply_chain.level),
        ),
    );
    category_risks.insert(
        RiskCategory::Quality,
        CategoryRisk::new(
            quality.level,
            quality.quality_issues.clone(),
            quality.low_rated_vendors,
            quality_impact(quality.level),
        ),
    );

    let levels: BTreeMap<RiskCategory, RiskLevel> = category_risks
        .iter()
        .map(|(category, risk)| (*category, risk.level))
        .collect();
    let risk_score = weighted_score(&levels, &scoring.weights);

    let mut assessment = EnhancedRiskAssessment {
        overall_risk: level_for_score(risk_score),
        risk_score,
        category_risks,
        timeline_risk: timeline,
        budget_risk: budget,
        supply_chain_risk: supply_chain,
        quality_risk: quality,
        mitigation_actions: Vec::new(),
        high_priority_actions: Vec::new(),
    };
    assessment.mitigation_actions = mitigation_actions(&assessment);
    assessment.high_priority_actions = assessment
        .mitigation_actions
        .iter()
        .filter(|a| a.priority >= RiskLevel::High)
        .map(|a| a.action.clone())
        .collect();

    debug!(
        "Project {} risk score {:.1} ({})",
        comparison.project_id,
        assessment.risk_score,
        assessment.overall_risk
    );
    assessment
}

fn quote_coverage_risk(analyses: &[BomItemAnalysis]) -> CategoryRisk {
    let mut issues = Vec::new();
    let mut uncovered = 0;
    let mut single_source = 0;

    for analysis in analyses {
        if !analysis.has_sufficient_quotes {
            uncovered += 1;
            issues.push(format!("{} has no quotes", analysis.specification.name));
        } else if analysis.is_single_source() {
            single_source += 1;
        }
    }

    let (level, impact) = if uncovered > 0 {
        (RiskLevel::Critical, "Project cannot proceed without quotes for all items")
    } else if single_source * 2 > analyses.len() {
        (RiskLevel::High, "Limited negotiation leverage and supply chain vulnerability")
    } else if single_source > 0 {
        (RiskLevel::Medium, "Some items have limited vendor options")
    } else {
        (RiskLevel::Low, "Good vendor diversity and quote coverage")
    };

    CategoryRisk::new(level, issues, uncovered + single_source, impact)
}

fn timeline_risk(comparison: &ProjectComparison) -> TimelineRisk {
    let freshness = &comparison.quote_freshness;
    let mut risk = TimelineRisk {
        level: RiskLevel::Low,
        quotes_expiring_soon: freshness.stale,
        quotes_expired: freshness.expired,
        average_quote_age_days: freshness.average_age_days,
        lead_time_risks: Vec::new(),
    };

    if risk.quotes_expired > 0 {
        risk.level = RiskLevel::High;
        risk.lead_time_risks.push(format!(
            "{} quotes have expired and need renewal",
            risk.quotes_expired
        ));
    } else if risk.quotes_expiring_soon > 0 {
        risk.level = RiskLevel::Medium;
        risk.lead_time_risks.push(format!(
            "{} quotes are becoming stale",
            risk.quotes_expiring_soon
        ));
    }

    risk
}

fn budget_risk(comparison: &ProjectComparison, scoring: &ScoringConfig) -> BudgetRisk {
    let mut risk = BudgetRisk {
        level: RiskLevel::Low,
        projected_overrun: 0.0,
        overrun_percent: 0.0,
        items_over_budget: comparison
            .bom_item_analyses
            .iter()
            .filter(|a| a.target_total_cost > 0.0 && a.recommended_total_cost > a.target_total_cost)
            .count(),
        contingency_needed: 0.0,
    };

    // No budget, nothing to overrun
    if comparison.project_budget <= 0.0 {
        return risk;
    }

    risk.projected_overrun = comparison.recommended_cost - comparison.project_budget;
    risk.overrun_percent = risk.projected_overrun / comparison.project_budget * 100.0;

    let contingency = &scoring.contingency;
    let (level, multiplier) = if risk.overrun_percent > 20.0 {
        (RiskLevel::Critical, contingency.critical)
    } else if risk.overrun_percent > 10.0 {
        (RiskLevel::High, contingency.high)
    } else if risk.overrun_percent > 0.0 {
        (RiskLevel::Medium, contingency.medium)
    } else {
        (RiskLevel::Low, 0.0)
    };
    risk.level = level;
    risk.contingency_needed = risk.projected_overrun.max(0.0) * multiplier;

    risk
}

fn budget_category(risk: &BudgetRisk) -> CategoryRisk {
    let mut issues = Vec::new();
    if risk.projected_overrun > 0.0 {
        issues.push(format!(
            "Projected overrun of ${:.2} ({:.1}% over budget)",
            risk.projected_overrun, risk.overrun_percent
        ));
    }
    if risk.items_over_budget > 0 {
        issues.push(format!(
            "{} items cost more than their target",
            risk.items_over_budget
        ));
    }

    let impact = match risk.level {
        RiskLevel::Critical => "Project cannot be completed within the current budget",
        RiskLevel::High => "Significant additional funding required",
        RiskLevel::Medium => "Minor budget adjustment required",
        RiskLevel::Low => "Recommended cost fits within budget",
    };
    CategoryRisk::new(risk.level, issues, risk.items_over_budget, impact)
}

fn supply_chain_risk(comparison: &ProjectComparison) -> SupplyChainRisk {
    let analyses = &comparison.bom_item_analyses;
    let no_quote_items = analyses.iter().filter(|a| !a.has_sufficient_quotes).count();
    let single_source_items = analyses.iter().filter(|a| a.is_single_source()).count();
    let low_vendor_diversity =
        comparison.vendor_recommendations.vendor_count < 2 && analyses.len() > 5;

    let mut issues = Vec::new();
    if no_quote_items > 0 {
        issues.push(format!("{} items have no vendor", no_quote_items));
    }
    if single_source_items > 0 {
        issues.push(format!("{} items depend on a single vendor", single_source_items));
    }
    if low_vendor_diversity {
        issues.push(format!(
            "{} items concentrated on {} vendor",
            analyses.len(),
            comparison.vendor_recommendations.vendor_count
        ));
    }

    let level = if no_quote_items > 0 {
        RiskLevel::Critical
    } else if single_source_items * 2 > analyses.len() {
        RiskLevel::High
    } else if low_vendor_diversity {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    SupplyChainRisk {
        level,
        single_source_items,
        no_quote_items,
        low_vendor_diversity,
        vendor_capacity_issues: issues,
    }
}

fn quality_risk(
    comparison: &ProjectComparison,
    ratings: &BTreeMap<Id, RatingSummary>,
    scoring: &ScoringConfig,
) -> QualityRisk {
    let recommendations = &comparison.vendor_recommendations.recommendations;
    let mut risk = QualityRisk {
        level: RiskLevel::Low,
        low_rated_vendors: 0,
        unrated_vendors: 0,
        quality_issues: Vec::new(),
    };

    for rec in recommendations {
        match ratings.get(&rec.vendor_id).filter(|r| r.is_rated()) {
            Some(rating) if rating.overall < scoring.low_rating_threshold => {
                risk.low_rated_vendors += 1;
                risk.quality_issues.push(format!(
                    "{} has low average rating ({:.1}/5.0)",
                    rec.vendor_name, rating.overall
                ));
            }
            Some(_) => {}
            None => risk.unrated_vendors += 1,
        }
    }

    risk.level = if risk.low_rated_vendors > 0 {
        RiskLevel::High
    } else if risk.unrated_vendors * 2 > recommendations.len() {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };
    risk
}

fn timeline_impact(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Critical | RiskLevel::High => "Pricing and availability must be reconfirmed before ordering",
        RiskLevel::Medium => "Some pricing may change before ordering",
        RiskLevel::Low => "Quotes are current",
    }
}

fn supply_chain_impact(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Critical => "Items cannot be sourced from any vendor",
        RiskLevel::High => "Most items depend on a single vendor",
        RiskLevel::Medium => "Spend is concentrated on too few vendors",
        RiskLevel::Low => "Sourcing is diversified",
    }
}

fn quality_impact(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Critical | RiskLevel::High => "Recommended vendors have a poor track record",
        RiskLevel::Medium => "Most recommended vendors have no track record",
        RiskLevel::Low => "Recommended vendors are well rated",
    }
}

fn mitigation_actions(assessment: &EnhancedRiskAssessment) -> Vec<MitigationAction> {
    let mut actions = Vec::new();

    let coverage = assessment
        .category_risks
        .get(&RiskCategory::QuoteCoverage)
        .map(|r| r.level);
    if coverage.is_some_and(|l| l >= RiskLevel::High) {
        actions.push(MitigationAction {
            priority: RiskLevel::Critical,
            category: RiskCategory::QuoteCoverage,
            action: "Request quotes from additional vendors for items with no or limited quotes"
                .to_string(),
            impact: "Enables procurement and improves negotiation leverage".to_string(),
            effort: Effort::Medium,
            timeline: ActionWindow::Immediate,
        });
    }

    if assessment.timeline_risk.quotes_expired > 0 {
        actions.push(MitigationAction {
            priority: RiskLevel::High,
            category: RiskCategory::Timeline,
            action: format!(
                "Renew {} expired quotes before proceeding with procurement",
                assessment.timeline_risk.quotes_expired
            ),
            impact: "Ensures current pricing and availability".to_string(),
            effort: Effort::Low,
            timeline: ActionWindow::Immediate,
        });
    }

    if assessment.budget_risk.level >= RiskLevel::High {
        actions.push(MitigationAction {
            priority: RiskLevel::High,
            category: RiskCategory::Budget,
            action: format!(
                "Secure additional budget of ${:.2} or negotiate better pricing",
                assessment.budget_risk.contingency_needed
            ),
            impact: "Prevents project delays due to funding shortfall".to_string(),
            effort: Effort::High,
            timeline: ActionWindow::ShortTerm,
        });
    }

    if assessment.supply_chain_risk.single_source_items > 0 {
        actions.push(MitigationAction {
            priority: RiskLevel::Medium,
            category: RiskCategory::SupplyChain,
            action: format!(
                "Identify backup vendors for {} single-source items",
                assessment.supply_chain_risk.single_source_items
            ),
            impact: "Reduces supply chain risk and improves resilience".to_string(),
            effort: Effort::Medium,
            timeline: ActionWindow::ShortTerm,
        });
    }

    if assessment.quality_risk.low_rated_vendors > 0 {
        actions.push(MitigationAction {
            priority: RiskLevel::Medium,
            category: RiskCategory::Quality,
            action: "Review low-rated vendors and consider alternatives with better track records"
                .to_string(),
            impact: "Reduces risk of quality issues and delays".to_string(),
            effort: Effort::Low,
            timeline: ActionWindow::Immediate,
        });
    }

    actions
}
