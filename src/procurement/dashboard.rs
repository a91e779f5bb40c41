//! Project dashboard aggregation

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::core::config::ScoringConfig;
use crate::core::entity::{Id, OrderStatus, RiskLevel};
use crate::entities::{Project, PurchaseOrder, RatingSummary};
use crate::procurement::comparison::{ProjectComparison, QuoteFreshnessStats};
use crate::procurement::index::QuoteIndex;
use crate::procurement::risk::{EnhancedRiskAssessment, RiskCategory};
use crate::procurement::savings::SavingsSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineStatus {
    OnTrack,
    AtRisk,
    Delayed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetHealth {
    Healthy,
    Warning,
    Critical,
}

/// Aggregate freshness of a project's quotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FreshnessBucket {
    Fresh,
    Aging,
    Stale,
    None,
}

impl FreshnessBucket {
    fn from_stats(stats: &QuoteFreshnessStats) -> Self {
        if stats.total == 0 {
            return FreshnessBucket::None;
        }
        let total = stats.total as f64;
        if stats.fresh as f64 / total > 0.7 {
            FreshnessBucket::Fresh
        } else if stats.stale as f64 / total > 0.5 {
            FreshnessBucket::Stale
        } else {
            FreshnessBucket::Aging
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorStatus {
    Active,
    Pending,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    QuoteAdded,
    OrderPlaced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityImpact {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectProgress {
    /// Share of BOM items with at least one quote
    pub bom_coverage: f64,
    pub requisitions_complete: usize,
    pub requisitions_total: usize,
    pub orders_placed: usize,
    pub orders_received: usize,
    pub timeline_status: TimelineStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_to_deadline: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialOverview {
    pub budget: f64,
    /// Value of orders that are not cancelled
    pub committed: f64,
    /// Best available price for quantity not yet ordered
    pub estimated: f64,
    pub remaining: f64,
    pub utilization_percent: f64,
    pub savings: f64,
    pub savings_percent: f64,
    pub budget_health: BudgetHealth,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcurementProgress {
    pub total_items: usize,
    pub items_with_quotes: usize,
    pub items_ordered: usize,
    pub items_received: usize,
    pub average_lead_time_days: i64,
    pub vendors_engaged: usize,
    pub quote_freshness: FreshnessBucket,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorPerformance {
    pub vendor_id: Id,
    pub vendor_name: String,
    pub items_supplied: usize,
    pub total_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    /// Share of received orders delivered by their expected date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_time_delivery: Option<f64>,
    pub status: VendorStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskIndicator {
    pub category: RiskCategory,
    pub level: RiskLevel,
    pub count: usize,
    pub top_issue: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityItem {
    pub timestamp: DateTime<Utc>,
    pub kind: ActivityKind,
    pub description: String,
    pub impact: ActivityImpact,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ChartPoint {
    fn new(label: impl Into<String>, value: f64, color: Option<&str>) -> Self {
        Self {
            label: label.into(),
            value,
            color: color.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GanttItem {
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartsData {
    pub budget_utilization: Vec<ChartPoint>,
    pub cost_comparison: Vec<ChartPoint>,
    pub vendor_distribution: Vec<ChartPoint>,
    pub savings_by_category: Vec<ChartPoint>,
    pub timeline_gantt: Vec<GanttItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectDashboard {
    pub project_id: Id,
    pub project_name: String,
    pub progress: ProjectProgress,
    pub financial: FinancialOverview,
    pub procurement: ProcurementProgress,
    pub vendor_performance: Vec<VendorPerformance>,
    pub risks: Vec<RiskIndicator>,
    pub recent_activity: Vec<ActivityItem>,
    pub charts: ChartsData,
}

/// Inputs already computed for the project
pub(crate) struct DashboardSources<'a> {
    pub project: &'a Project,
    pub index: &'a QuoteIndex,
    pub orders: &'a [PurchaseOrder],
    pub ratings: &'a BTreeMap<Id, RatingSummary>,
    pub comparison: &'a ProjectComparison,
    pub savings: &'a SavingsSummary,
    pub risks: &'a EnhancedRiskAssessment,
}

pub(crate) fn build(
    sources: &DashboardSources<'_>,
    scoring: &ScoringConfig,
    now: DateTime<Utc>,
) -> ProjectDashboard {
    let progress = progress(sources, scoring, now);
    let financial = financial(sources);
    let procurement = procurement(sources);
    let vendor_performance = vendor_performance(sources);
    let risks = risk_indicators(sources.risks);
    let recent_activity = recent_activity(sources, scoring);
    let charts = charts(sources, &financial, &vendor_performance, scoring);

    ProjectDashboard {
        project_id: sources.project.id,
        project_name: sources.project.name.clone(),
        progress,
        financial,
        procurement,
        vendor_performance,
        risks,
        recent_activity,
        charts,
    }
}

fn items_with_quotes(sources: &DashboardSources<'_>) -> usize {
    sources
        .project
        .bom_items()
        .iter()
        .filter(|item| !sources.index.quotes(item.specification.id).is_empty())
        .count()
}

fn committed_orders<'a>(orders: &'a [PurchaseOrder]) -> impl Iterator<Item = &'a PurchaseOrder> {
    orders.iter().filter(|o| o.status.is_committed())
}

fn progress(sources: &DashboardSources<'_>, scoring: &ScoringConfig, now: DateTime<Utc>) -> ProjectProgress {
    let project = sources.project;
    let total = project.bom_items().len();
    let bom_coverage = if total == 0 {
        0.0
    } else {
        items_with_quotes(sources) as f64 / total as f64 * 100.0
    };

    let days_to_deadline = project.deadline.map(|deadline| (deadline - now).num_days());
    let timeline_status = match days_to_deadline {
        Some(days) if days < 0 => TimelineStatus::Delayed,
        Some(days)
            if days < scoring.at_risk_window_days && bom_coverage < scoring.at_risk_coverage_percent =>
        {
            TimelineStatus::AtRisk
        }
        _ => TimelineStatus::OnTrack,
    };

    ProjectProgress {
        bom_coverage,
        requisitions_complete: project.requisitions.iter().filter(|r| r.is_complete()).count(),
        requisitions_total: project.requisitions.len(),
        orders_placed: committed_orders(sources.orders).count(),
        orders_received: sources
            .orders
            .iter()
            .filter(|o| o.status == OrderStatus::Received)
            .count(),
        timeline_status,
        days_to_deadline,
    }
}

fn financial(sources: &DashboardSources<'_>) -> FinancialOverview {
    let budget = sources.project.budget;
    let committed: f64 = committed_orders(sources.orders).map(PurchaseOrder::value).sum();

    let mut ordered: BTreeMap<Id, u64> = BTreeMap::new();
    for order in committed_orders(sources.orders) {
        if let Some(spec_id) = order.specification_id {
            *ordered.entry(spec_id).or_insert(0) += u64::from(order.quantity);
        }
    }

    let estimated: f64 = sources
        .project
        .bom_items()
        .iter()
        .filter_map(|item| {
            let already = ordered.get(&item.specification.id).copied().unwrap_or(0);
            let remaining = u64::from(item.quantity).saturating_sub(already);
            let best = sources.index.available(item.specification.id).first()?;
            (remaining > 0).then(|| best.converted_price * remaining as f64)
        })
        .sum();

    let spend = committed + estimated;
    let utilization_percent = if budget > 0.0 {
        spend / budget * 100.0
    } else if spend > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };
    let budget_health = if utilization_percent > 100.0 {
        BudgetHealth::Critical
    } else if utilization_percent > 90.0 {
        BudgetHealth::Warning
    } else {
        BudgetHealth::Healthy
    };

    FinancialOverview {
        budget,
        committed,
        estimated,
        remaining: budget - spend,
        // Infinity does not survive JSON
        utilization_percent: if utilization_percent.is_finite() { utilization_percent } else { 100.0 },
        savings: sources.savings.total_savings,
        savings_percent: sources.savings.savings_percent,
        budget_health,
    }
}

fn procurement(sources: &DashboardSources<'_>) -> ProcurementProgress {
    let items = sources.project.bom_items();

    let ordered_specs: BTreeSet<Id> = committed_orders(sources.orders)
        .filter_map(|o| o.specification_id)
        .collect();
    let received_specs: BTreeSet<Id> = sources
        .orders
        .iter()
        .filter(|o| o.status == OrderStatus::Received)
        .filter_map(|o| o.specification_id)
        .collect();

    let lead_times: Vec<i64> = sources.orders.iter().filter_map(PurchaseOrder::lead_time_days).collect();
    let average_lead_time_days = if lead_times.is_empty() {
        0
    } else {
        lead_times.iter().sum::<i64>() / lead_times.len() as i64
    };

    ProcurementProgress {
        total_items: items.len(),
        items_with_quotes: items_with_quotes(sources),
        items_ordered: items
            .iter()
            .filter(|i| ordered_specs.contains(&i.specification.id))
            .count(),
        items_received: items
            .iter()
            .filter(|i| received_specs.contains(&i.specification.id))
            .count(),
        average_lead_time_days,
        vendors_engaged: sources.index.vendors().len(),
        quote_freshness: FreshnessBucket::from_stats(&sources.comparison.quote_freshness),
    }
}

fn vendor_performance(sources: &DashboardSources<'_>) -> Vec<VendorPerformance> {
    let mut by_vendor: BTreeMap<Id, Vec<&PurchaseOrder>> = BTreeMap::new();
    for order in sources.orders {
        by_vendor.entry(order.vendor_id).or_default().push(order);
    }

    // Recommended vendors show up before their first order as pending
    let planned: BTreeMap<Id, &str> = sources
        .comparison
        .vendor_recommendations
        .recommendations
        .iter()
        .map(|r| (r.vendor_id, r.vendor_name.as_str()))
        .collect();
    for vendor_id in planned.keys() {
        by_vendor.entry(*vendor_id).or_default();
    }

    by_vendor
        .into_iter()
        .filter_map(|(vendor_id, orders)| {
            let committed: Vec<&PurchaseOrder> =
                orders.iter().copied().filter(|o| o.status.is_committed()).collect();
            let vendor_name = match committed.first() {
                Some(order) => order.vendor_name.clone(),
                None => planned.get(&vendor_id)?.to_string(),
            };

            let delivered: Vec<bool> = orders
                .iter()
                .filter(|o| o.status == OrderStatus::Received)
                .filter_map(|o| o.delivered_on_time())
                .collect();
            let on_time_delivery = (!delivered.is_empty()).then(|| {
                delivered.iter().filter(|on_time| **on_time).count() as f64 / delivered.len() as f64
                    * 100.0
            });

            let status = if orders.iter().any(|o| o.status.is_open()) {
                VendorStatus::Active
            } else if orders.iter().any(|o| o.status == OrderStatus::Received) {
                VendorStatus::Completed
            } else {
                VendorStatus::Pending
            };

            Some(VendorPerformance {
                vendor_id,
                vendor_name,
                items_supplied: committed.len(),
                total_value: committed.iter().map(|o| o.value()).sum(),
                average_rating: sources
                    .ratings
                    .get(&vendor_id)
                    .filter(|r| r.is_rated())
                    .map(|r| r.overall),
                on_time_delivery,
                status,
            })
        })
        .collect()
}

fn risk_indicators(risks: &EnhancedRiskAssessment) -> Vec<RiskIndicator> {
    risks
        .category_risks
        .iter()
        .map(|(category, risk)| RiskIndicator {
            category: *category,
            level: risk.level,
            count: risk.affected_items,
            top_issue: risk
                .issues
                .first()
                .cloned()
                .unwrap_or_else(|| risk.estimated_impact.clone()),
        })
        .collect()
}

fn recent_activity(sources: &DashboardSources<'_>, scoring: &ScoringConfig) -> Vec<ActivityItem> {
    let mut quotes: Vec<_> = sources.index.iter().collect();
    quotes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    let mut orders: Vec<&PurchaseOrder> = sources.orders.iter().collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    let mut activity: Vec<ActivityItem> = quotes
        .into_iter()
        .take(scoring.activity_source_limit)
        .map(|q| ActivityItem {
            timestamp: q.created_at,
            kind: ActivityKind::QuoteAdded,
            description: format!(
                "New quote from {} for {} at ${:.2}",
                q.vendor_name, q.product_name, q.converted_price
            ),
            impact: ActivityImpact::Positive,
        })
        .chain(orders.into_iter().take(scoring.activity_source_limit).map(|o| ActivityItem {
            timestamp: o.created_at,
            kind: ActivityKind::OrderPlaced,
            description: format!(
                "Order {} placed with {} for {} units",
                o.po_number, o.vendor_name, o.quantity
            ),
            impact: ActivityImpact::Positive,
        }))
        .collect();

    // Stable, so quotes stay ahead of orders on equal timestamps
    activity.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    activity.truncate(scoring.activity_limit);
    activity
}

fn charts(
    sources: &DashboardSources<'_>,
    financial: &FinancialOverview,
    vendors: &[VendorPerformance],
    scoring: &ScoringConfig,
) -> ChartsData {
    let lead_time = Duration::days(scoring.default_lead_time_days);

    ChartsData {
        budget_utilization: vec![
            ChartPoint::new("Committed", financial.committed, Some("#4CAF50")),
            ChartPoint::new("Estimated", financial.estimated, Some("#FFC107")),
            ChartPoint::new("Remaining", financial.remaining, Some("#2196F3")),
        ],
        cost_comparison: vec![
            ChartPoint::new("Budget", financial.budget, Some("#9E9E9E")),
            ChartPoint::new(
                "Estimated Total",
                financial.committed + financial.estimated,
                Some("#FF9800"),
            ),
            ChartPoint::new("Committed", financial.committed, Some("#4CAF50")),
        ],
        vendor_distribution: vendors
            .iter()
            .map(|v| ChartPoint::new(v.vendor_name.clone(), v.total_value, None))
            .collect(),
        savings_by_category: sources
            .savings
            .savings_by_category
            .iter()
            .filter(|(_, savings)| **savings > 0.0)
            .map(|(category, savings)| ChartPoint::new(category.clone(), *savings, None))
            .collect(),
        timeline_gantt: sources
            .project
            .requisitions
            .iter()
            .map(|r| GanttItem {
                name: r.name.clone(),
                start_date: r.created_at,
                end_date: r.created_at + lead_time,
                status: if r.is_complete() { "complete" } else { "active" }.to_string(),
            })
            .collect(),
    }
}
