//! BOM coverage analysis and item risk scoring

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::config::ScoringConfig;
use crate::core::entity::{Id, ProcurementStatus, RiskLevel};
use crate::entities::{BomItem, ProjectRequisition, Quote, Specification};
use crate::procurement::index::price_order;

/// One requisition line that draws on a BOM item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequisitionDemand {
    pub requisition_id: Id,
    pub requisition_name: String,
    pub requisition_item_id: Id,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_unit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_quote_id: Option<Id>,
    pub status: ProcurementStatus,
}

/// Coverage of one BOM line by requisition demand and available quotes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BomItemAnalysis {
    pub bom_item_id: Id,
    pub specification: Specification,

    pub total_quantity_needed: u32,
    pub total_quantity_planned: u32,
    /// Planned quantity beyond what the BOM needs
    pub over_planned_quantity: u32,
    /// Planned over needed, clamped to 0-100
    pub coverage_percent: f64,
    pub has_gaps: bool,

    /// Sum of target price times quantity over lines that carry a target
    pub target_total_cost: f64,
    pub requisition_items: Vec<RequisitionDemand>,

    pub available_quotes: Vec<Quote>,
    pub has_sufficient_quotes: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_quote: Option<Quote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_quote: Option<Quote>,
    pub best_total_cost: f64,
    pub recommended_total_cost: f64,
    pub savings_vs_target: f64,

    pub risk_level: RiskLevel,
}

impl BomItemAnalysis {
    pub fn quote_count(&self) -> usize {
        self.available_quotes.len()
    }

    pub fn is_single_source(&self) -> bool {
        self.available_quotes.len() == 1
    }

    /// Highest available USD price, 0 without quotes
    pub fn worst_price(&self) -> f64 {
        self.available_quotes
            .iter()
            .map(|q| q.converted_price)
            .fold(0.0, f64::max)
    }
}

/// Merge requisition demand for `item` with its available quotes
pub fn analyze_item(
    item: &BomItem,
    requisitions: &[ProjectRequisition],
    available: &[Quote],
    scoring: &ScoringConfig,
    now: DateTime<Utc>,
) -> BomItemAnalysis {
    let mut demand = Vec::new();
    let mut planned: u32 = 0;
    let mut target_total_cost = 0.0;

    for requisition in requisitions {
        for line in requisition.items.iter().filter(|l| l.bom_item_id == item.id) {
            planned = planned.saturating_add(line.quantity_requested);
            if let Some(target) = line.target_unit_price.filter(|t| *t > 0.0) {
                target_total_cost += target * f64::from(line.quantity_requested);
            }
            demand.push(RequisitionDemand {
                requisition_id: requisition.id,
                requisition_name: requisition.name.clone(),
                requisition_item_id: line.id,
                quantity: line.quantity_requested,
                target_unit_price: line.target_unit_price,
                selected_quote_id: line.selected_quote_id,
                status: line.procurement_status,
            });
        }
    }

    let needed = item.quantity;
    let coverage_percent = if needed == 0 {
        100.0
    } else {
        (f64::from(planned) / f64::from(needed) * 100.0).clamp(0.0, 100.0)
    };

    let best_quote = available.iter().min_by(|a, b| price_order(a, b)).cloned();
    let best_total_cost = best_quote
        .as_ref()
        .map(|q| q.converted_price * f64::from(needed))
        .unwrap_or(0.0);
    let recommended_total_cost = best_total_cost;

    let savings_vs_target = if target_total_cost > 0.0 && recommended_total_cost > 0.0 {
        target_total_cost - recommended_total_cost
    } else {
        0.0
    };

    let mut analysis = BomItemAnalysis {
        bom_item_id: item.id,
        specification: item.specification.clone(),
        total_quantity_needed: needed,
        total_quantity_planned: planned,
        over_planned_quantity: planned.saturating_sub(needed),
        coverage_percent,
        has_gaps: planned < needed,
        target_total_cost,
        requisition_items: demand,
        available_quotes: available.to_vec(),
        has_sufficient_quotes: !available.is_empty(),
        recommended_quote: best_quote.clone(),
        best_quote,
        best_total_cost,
        recommended_total_cost,
        savings_vs_target,
        risk_level: RiskLevel::Low,
    };
    analysis.risk_level = item_risk(&analysis, scoring, now);
    analysis
}

/// Risk label of one analysis from quote depth, demand gaps and staleness
pub fn item_risk(analysis: &BomItemAnalysis, scoring: &ScoringConfig, now: DateTime<Utc>) -> RiskLevel {
    let mut score = 0;

    match analysis.quote_count() {
        0 => score += 3,
        1 => score += 2,
        _ => {}
    }

    if analysis.has_gaps {
        score += 2;
    } else if analysis.coverage_percent < 50.0 {
        score += 1;
    }

    let count = analysis.quote_count();
    if count > 0 {
        let stale = analysis
            .available_quotes
            .iter()
            .filter(|q| q.is_stale(now, scoring.stale_after_days))
            .count();
        if stale == count {
            score += 2;
        } else if stale * 2 > count {
            score += 1;
        }
    }

    match score {
        s if s >= 5 => RiskLevel::Critical,
        s if s >= 3 => RiskLevel::High,
        s if s >= 1 => RiskLevel::Medium,
        _ => RiskLevel::Low,
    }
}
