//! Vendor consolidation analysis
//!
//! Builds the vendor -> specification -> best price capability map over a
//! project's BOM and ranks vendors by breadth, then cost.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::core::entity::Id;
use crate::entities::{BomItem, RatingSummary};
use crate::procurement::index::QuoteIndex;

/// What one vendor could supply for a project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorConsolidation {
    pub vendor_id: Id,
    pub vendor_name: String,
    /// BOM items this vendor has an available quote for, in BOM order
    pub bom_items_available: Vec<Id>,
    /// Best USD unit price per specification
    pub capabilities: BTreeMap<Id, f64>,
    pub specifications_count: usize,
    pub total_quantity: u64,
    /// Cost if this vendor supplied everything it can
    pub total_cost_if_used: f64,
    /// Mean 1-based price position across the vendor's specifications
    pub average_price_rank: f64,
    /// Covers more than half of the BOM's distinct specifications
    pub shipping_advantage: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<RatingSummary>,
}

impl VendorConsolidation {
    /// Best unit price for a specification, if the vendor quotes it
    pub fn price_for(&self, specification_id: Id) -> Option<f64> {
        self.capabilities.get(&specification_id).copied()
    }
}

/// Rank every vendor with an available quote for any BOM specification
pub fn analyze(
    items: &[BomItem],
    index: &QuoteIndex,
    ratings: &BTreeMap<Id, RatingSummary>,
) -> Vec<VendorConsolidation> {
    let distinct_specs: BTreeSet<Id> = items.iter().map(|i| i.specification.id).collect();

    let mut capabilities: BTreeMap<Id, (String, BTreeMap<Id, f64>)> = BTreeMap::new();
    for spec_id in &distinct_specs {
        for quote in index.available(*spec_id) {
            let (_, prices) = capabilities
                .entry(quote.vendor_id)
                .or_insert_with(|| (quote.vendor_name.clone(), BTreeMap::new()));
            prices
                .entry(*spec_id)
                .and_modify(|p: &mut f64| *p = p.min(quote.converted_price))
                .or_insert(quote.converted_price);
        }
    }

    let mut analyses: Vec<VendorConsolidation> = capabilities
        .into_iter()
        .map(|(vendor_id, (vendor_name, prices))| {
            let mut bom_items_available = Vec::new();
            let mut total_quantity = 0u64;
            let mut total_cost_if_used = 0.0;
            for item in items {
                if let Some(price) = prices.get(&item.specification.id) {
                    bom_items_available.push(item.id);
                    total_quantity += u64::from(item.quantity);
                    total_cost_if_used += price * f64::from(item.quantity);
                }
            }

            let ranks: Vec<f64> = prices
                .iter()
                .map(|(spec_id, price)| price_rank(index, *spec_id, *price))
                .collect();
            let average_price_rank = if ranks.is_empty() {
                0.0
            } else {
                ranks.iter().sum::<f64>() / ranks.len() as f64
            };

            VendorConsolidation {
                vendor_id,
                vendor_name,
                bom_items_available,
                specifications_count: prices.len(),
                total_quantity,
                total_cost_if_used,
                average_price_rank,
                shipping_advantage: prices.len() * 2 > distinct_specs.len(),
                rating: ratings.get(&vendor_id).cloned(),
                capabilities: prices,
            }
        })
        .collect();

    analyses.sort_by(|a, b| {
        b.specifications_count
            .cmp(&a.specifications_count)
            .then(a.total_cost_if_used.total_cmp(&b.total_cost_if_used))
            .then(a.vendor_id.cmp(&b.vendor_id))
    });

    debug!("Consolidation ranked {} vendors", analyses.len());
    analyses
}

/// 1 + number of available quotes for the specification priced below `price`
fn price_rank(index: &QuoteIndex, specification_id: Id, price: f64) -> f64 {
    let cheaper = index
        .available(specification_id)
        .iter()
        .filter(|q| q.converted_price < price)
        .count();
    (cheaper + 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Quote, Specification};
    use chrono::{DateTime, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn item(id: Id, spec: Id, quantity: u32) -> BomItem {
        BomItem {
            id,
            bill_of_materials_id: 1,
            specification: Specification {
                id: spec,
                name: format!("Spec {}", spec),
                description: None,
            },
            quantity,
            notes: None,
        }
    }

    fn quote(id: Id, vendor_id: Id, spec: Id, price: f64) -> Quote {
        Quote {
            id,
            vendor_id,
            vendor_name: format!("vendor{}", vendor_id),
            product_id: id,
            product_name: format!("P{}", id),
            specification_id: Some(spec),
            price,
            currency: "USD".to_string(),
            converted_price: price,
            conversion_rate: 1.0,
            quote_date: now(),
            valid_until: None,
            created_at: now(),
        }
    }

    #[test]
    fn test_capabilities_keep_best_price_and_rank() {
        let items = vec![item(1, 1, 10), item(2, 2, 5), item(3, 3, 1)];
        let index = QuoteIndex::new(
            vec![
                quote(1, 1, 1, 12.0),
                quote(2, 1, 1, 9.0),
                quote(3, 2, 1, 10.0),
                quote(4, 2, 2, 20.0),
                quote(5, 1, 2, 25.0),
            ],
            now(),
        );

        let ranked = analyze(&items, &index, &BTreeMap::new());
        assert_eq!(ranked.len(), 2);

        let v1 = ranked.iter().find(|v| v.vendor_id == 1).unwrap();
        assert_eq!(v1.price_for(1), Some(9.0));
        assert_eq!(v1.specifications_count, 2);
        assert_eq!(v1.total_quantity, 15);
        assert_eq!(v1.total_cost_if_used, 9.0 * 10.0 + 25.0 * 5.0);
        // rank 1 for spec 1, rank 2 for spec 2
        assert_eq!(v1.average_price_rank, 1.5);
        assert!(v1.shipping_advantage);
        assert_eq!(v1.bom_items_available, vec![1, 2]);
    }

    #[test]
    fn test_order_by_breadth_then_cost_then_id() {
        let items = vec![item(1, 1, 1), item(2, 2, 1)];
        let index = QuoteIndex::new(
            vec![
                quote(1, 3, 1, 5.0),
                quote(2, 2, 1, 5.0),
                quote(3, 1, 1, 1.0),
                quote(4, 1, 2, 1.0),
            ],
            now(),
        );

        let order: Vec<Id> = analyze(&items, &index, &BTreeMap::new())
            .iter()
            .map(|v| v.vendor_id)
            .collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_bom_has_no_vendors() {
        let index = QuoteIndex::new(vec![quote(1, 1, 1, 1.0)], now());
        assert!(analyze(&[], &index, &BTreeMap::new()).is_empty());
    }
}
