//! Savings against requisition target prices

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::config::ScoringConfig;
use crate::core::entity::Id;
use crate::procurement::coverage::BomItemAnalysis;

/// Savings for a single BOM line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsLineItem {
    pub bom_item_id: Id,
    pub specification_name: String,
    /// Planned quantity when a target exists, otherwise the BOM quantity
    pub quantity: u32,
    pub target_price: f64,
    pub recommended_price: f64,
    pub best_price: f64,
    pub savings_per_unit: f64,
    pub total_savings: f64,
    pub savings_percent: f64,
}

impl SavingsLineItem {
    /// Both a target and a recommended price are known
    pub fn is_priced(&self) -> bool {
        self.target_price > 0.0 && self.recommended_price > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsSummary {
    pub total_savings: f64,
    pub savings_percent: f64,
    pub total_target_cost: f64,
    pub total_recommended_cost: f64,
    /// Keyed by specification name
    pub savings_by_category: BTreeMap<String, f64>,
    /// Keyed by vendor name of the recommended quote
    pub savings_by_vendor: BTreeMap<String, f64>,
    /// Administrative overhead avoided by engaging fewer vendors
    pub consolidation_savings: f64,
    pub line_items: Vec<SavingsLineItem>,
}

/// Compare target prices with recommended prices
///
/// Only lines with both a target and a recommended price contribute to the
/// totals, so a project without targets reports zero savings.
pub fn calculate(
    analyses: &[BomItemAnalysis],
    potential_vendor_count: usize,
    recommended_vendor_count: usize,
    scoring: &ScoringConfig,
) -> SavingsSummary {
    let mut summary = SavingsSummary {
        total_savings: 0.0,
        savings_percent: 0.0,
        total_target_cost: 0.0,
        total_recommended_cost: 0.0,
        savings_by_category: BTreeMap::new(),
        savings_by_vendor: BTreeMap::new(),
        consolidation_savings: 0.0,
        line_items: Vec::with_capacity(analyses.len()),
    };

    for analysis in analyses {
        let mut line = SavingsLineItem {
            bom_item_id: analysis.bom_item_id,
            specification_name: analysis.specification.name.clone(),
            quantity: analysis.total_quantity_needed,
            target_price: 0.0,
            recommended_price: analysis
                .recommended_quote
                .as_ref()
                .map_or(0.0, |q| q.converted_price),
            best_price: analysis.best_quote.as_ref().map_or(0.0, |q| q.converted_price),
            savings_per_unit: 0.0,
            total_savings: 0.0,
            savings_percent: 0.0,
        };

        if analysis.target_total_cost > 0.0 && analysis.total_quantity_planned > 0 {
            line.target_price = analysis.target_total_cost / f64::from(analysis.total_quantity_planned);
            line.quantity = analysis.total_quantity_planned;
        }

        if line.is_priced() {
            let quantity = f64::from(line.quantity);
            line.savings_per_unit = line.target_price - line.recommended_price;
            line.total_savings = line.savings_per_unit * quantity;
            line.savings_percent = line.savings_per_unit / line.target_price * 100.0;

            summary.total_target_cost += line.target_price * quantity;
            summary.total_recommended_cost += line.recommended_price * quantity;

            *summary
                .savings_by_category
                .entry(line.specification_name.clone())
                .or_insert(0.0) += line.total_savings;
            if let Some(quote) = &analysis.recommended_quote {
                *summary
                    .savings_by_vendor
                    .entry(quote.vendor_name.clone())
                    .or_insert(0.0) += line.total_savings;
            }
        }

        summary.line_items.push(line);
    }

    summary.total_savings = summary.total_target_cost - summary.total_recommended_cost;
    if summary.total_target_cost > 0.0 {
        summary.savings_percent = summary.total_savings / summary.total_target_cost * 100.0;
    }

    if recommended_vendor_count > 0 && potential_vendor_count > recommended_vendor_count {
        let avoided = potential_vendor_count - recommended_vendor_count;
        summary.consolidation_savings = avoided as f64 * scoring.per_vendor_admin_cost;
    }

    summary
}
