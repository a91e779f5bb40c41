//! Vendor recommendation strategies and what-if scenarios

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::core::config::ScoringConfig;
use crate::core::entity::{Id, Strategy};
use crate::entities::BomItem;
use crate::procurement::consolidation::VendorConsolidation;

/// Items assigned to one vendor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorRecommendation {
    pub vendor_id: Id,
    pub vendor_name: String,
    pub bom_items: Vec<Id>,
    pub total_cost: f64,
    pub item_count: usize,
    pub rationale: String,
    /// 1 = most items
    pub priority: usize,
}

/// A complete assignment under one strategy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationPlan {
    pub strategy: Strategy,
    pub recommendations: Vec<VendorRecommendation>,
    pub total_cost: f64,
    pub vendor_count: usize,
    /// BOM items no candidate vendor can supply
    pub unassigned_bom_items: Vec<Id>,
}

impl RecommendationPlan {
    pub fn vendor_ids(&self) -> BTreeSet<Id> {
        self.recommendations.iter().map(|r| r.vendor_id).collect()
    }

    /// vendor id -> assigned BOM items
    pub fn assignments(&self) -> BTreeMap<Id, Vec<Id>> {
        self.recommendations
            .iter()
            .map(|r| (r.vendor_id, r.bom_items.clone()))
            .collect()
    }
}

/// A strategy presented as a named what-if scenario
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcurementScenario {
    pub strategy: Strategy,
    pub name: String,
    pub description: String,
    pub vendor_count: usize,
    pub total_cost: f64,
    pub savings_vs_budget: f64,
    pub tradeoffs: String,
    pub vendor_assignments: BTreeMap<Id, Vec<Id>>,
}

/// Working assignment before it becomes a plan
#[derive(Debug, Default)]
struct Assignment {
    per_vendor: BTreeMap<Id, (String, Vec<Id>, f64)>,
}

impl Assignment {
    fn assign(&mut self, vendor: &VendorConsolidation, item: &BomItem, unit_price: f64) {
        let entry = self
            .per_vendor
            .entry(vendor.vendor_id)
            .or_insert_with(|| (vendor.vendor_name.clone(), Vec::new(), 0.0));
        entry.1.push(item.id);
        entry.2 += unit_price * f64::from(item.quantity);
    }

    fn total_cost(&self) -> f64 {
        self.per_vendor.values().map(|(_, _, cost)| cost).sum()
    }

    fn vendor_count(&self) -> usize {
        self.per_vendor.len()
    }

    fn into_plan(
        self,
        strategy: Strategy,
        items: &[BomItem],
        rationale: impl Fn(Id, usize) -> String,
    ) -> RecommendationPlan {
        let assigned: BTreeSet<Id> = self
            .per_vendor
            .values()
            .flat_map(|(_, items, _)| items.iter().copied())
            .collect();
        let unassigned_bom_items = items
            .iter()
            .map(|i| i.id)
            .filter(|id| !assigned.contains(id))
            .collect();
        let total_cost = self.total_cost();

        let mut recommendations: Vec<VendorRecommendation> = self
            .per_vendor
            .into_iter()
            .map(|(vendor_id, (vendor_name, bom_items, total_cost))| VendorRecommendation {
                rationale: rationale(vendor_id, bom_items.len()),
                item_count: bom_items.len(),
                vendor_id,
                vendor_name,
                bom_items,
                total_cost,
                priority: 0,
            })
            .collect();

        recommendations.sort_by(|a, b| {
            b.item_count
                .cmp(&a.item_count)
                .then(b.total_cost.total_cmp(&a.total_cost))
                .then(a.vendor_id.cmp(&b.vendor_id))
        });
        for (i, rec) in recommendations.iter_mut().enumerate() {
            rec.priority = i + 1;
        }

        RecommendationPlan {
            strategy,
            vendor_count: recommendations.len(),
            recommendations,
            total_cost,
            unassigned_bom_items,
        }
    }
}

/// Cheapest vendor per item; ties go to the lower vendor id
fn lowest_cost(items: &[BomItem], pool: &[&VendorConsolidation]) -> Assignment {
    let mut assignment = Assignment::default();
    for item in items {
        let best = pool
            .iter()
            .filter_map(|v| v.price_for(item.specification.id).map(|p| (*v, p)))
            .min_by(|(va, pa), (vb, pb)| pa.total_cmp(pb).then(va.vendor_id.cmp(&vb.vendor_id)));
        if let Some((vendor, price)) = best {
            assignment.assign(vendor, item, price);
        }
    }
    assignment
}

/// Greedy set cover over `pool` in its given order
fn greedy_cover(items: &[BomItem], pool: &[&VendorConsolidation]) -> Assignment {
    let mut assignment = Assignment::default();
    let mut covered: BTreeSet<Id> = BTreeSet::new();
    let mut used: BTreeSet<Id> = BTreeSet::new();

    while covered.len() < items.len() {
        let mut best: Option<(&VendorConsolidation, usize)> = None;
        for vendor in pool.iter().filter(|v| !used.contains(&v.vendor_id)) {
            let gain = items
                .iter()
                .filter(|i| !covered.contains(&i.id))
                .filter(|i| vendor.price_for(i.specification.id).is_some())
                .count();
            if gain > best.map_or(0, |(_, g)| g) {
                best = Some((*vendor, gain));
            }
        }

        let Some((vendor, _)) = best else { break };
        used.insert(vendor.vendor_id);
        for item in items {
            if covered.contains(&item.id) {
                continue;
            }
            if let Some(price) = vendor.price_for(item.specification.id) {
                assignment.assign(vendor, item, price);
                covered.insert(item.id);
            }
        }
    }

    assignment
}

/// Greedy cover that never needs more vendors than the per-item cheapest plan
fn fewest_vendors(items: &[BomItem], pool: &[&VendorConsolidation]) -> Assignment {
    let greedy = greedy_cover(items, pool);
    let cheapest = lowest_cost(items, pool);
    if greedy.vendor_count() <= cheapest.vendor_count() {
        return greedy;
    }

    // Greedy overshot: cover again using only the cheapest plan's vendors
    let restricted: Vec<&VendorConsolidation> = pool
        .iter()
        .copied()
        .filter(|v| cheapest.per_vendor.contains_key(&v.vendor_id))
        .collect();
    greedy_cover(items, &restricted)
}

/// Assign BOM items to vendors under a strategy
///
/// `consolidation` must be in consolidation order; the fewest-vendors
/// heuristic prefers earlier vendors on ties.
pub fn recommend(
    strategy: Strategy,
    items: &[BomItem],
    consolidation: &[VendorConsolidation],
    scoring: &ScoringConfig,
) -> RecommendationPlan {
    let pool: Vec<&VendorConsolidation> = consolidation.iter().collect();

    let plan = match strategy {
        Strategy::LowestCost => lowest_cost(items, &pool).into_plan(strategy, items, |_, _| {
            "Selected for lowest cost on assigned items".to_string()
        }),
        Strategy::FewestVendors => fewest_vendors(items, &pool).into_plan(strategy, items, |_, n| {
            format!("Selected to minimize vendor count (covers {} items)", n)
        }),
        Strategy::Balanced => {
            let cheapest = lowest_cost(items, &pool);
            let fewest = fewest_vendors(items, &pool);
            let ceiling = cheapest.total_cost() * (1.0 + scoring.balanced_cost_tolerance);
            if fewest.total_cost() <= ceiling {
                fewest.into_plan(strategy, items, |_, _| {
                    "Balanced approach: minimizes vendors with acceptable cost".to_string()
                })
            } else {
                cheapest.into_plan(strategy, items, |_, _| {
                    "Balanced approach: prioritizes cost optimization".to_string()
                })
            }
        }
        Strategy::QualityFocused => {
            let qualified: Vec<&VendorConsolidation> = pool
                .iter()
                .copied()
                .filter(|v| {
                    v.rating
                        .as_ref()
                        .is_some_and(|r| r.is_rated() && r.overall >= scoring.quality_min_rating)
                })
                .collect();

            if qualified.is_empty() {
                lowest_cost(items, &pool).into_plan(strategy, items, |_, _| {
                    "Selected for lowest cost on assigned items".to_string()
                })
            } else {
                let overall: BTreeMap<Id, f64> = qualified
                    .iter()
                    .filter_map(|v| v.rating.as_ref().map(|r| (v.vendor_id, r.overall)))
                    .collect();
                fewest_vendors(items, &qualified).into_plan(strategy, items, |vendor_id, _| {
                    let rating = overall
                        .get(&vendor_id)
                        .map(|r| format!("{:.1}/5.0", r))
                        .unwrap_or_else(|| "N/A".to_string());
                    format!("Quality-focused: highly-rated vendor (rating: {})", rating)
                })
            }
        }
    };

    debug!(
        "{} plan: {} vendors, total {:.2}",
        strategy,
        plan.vendor_count,
        plan.total_cost
    );
    plan
}

/// Run every strategy and describe each as a scenario
pub fn scenarios(
    items: &[BomItem],
    consolidation: &[VendorConsolidation],
    budget: f64,
    scoring: &ScoringConfig,
) -> Vec<ProcurementScenario> {
    Strategy::all()
        .iter()
        .map(|&strategy| {
            let plan = recommend(strategy, items, consolidation, scoring);
            let (name, description, tradeoffs) = scenario_text(strategy);
            ProcurementScenario {
                strategy,
                name: name.to_string(),
                description: description.to_string(),
                vendor_count: plan.vendor_count,
                total_cost: plan.total_cost,
                savings_vs_budget: budget - plan.total_cost,
                tradeoffs: tradeoffs.to_string(),
                vendor_assignments: plan.assignments(),
            }
        })
        .collect()
}

fn scenario_text(strategy: Strategy) -> (&'static str, &'static str, &'static str) {
    match strategy {
        Strategy::LowestCost => (
            "Lowest Cost",
            "Minimizes total cost by selecting cheapest vendor for each item independently",
            "Highest savings, but may involve many vendors (increased admin overhead)",
        ),
        Strategy::FewestVendors => (
            "Fewest Vendors",
            "Minimizes number of vendors to reduce administrative complexity",
            "Simplifies ordering/management, but may cost slightly more than lowest cost",
        ),
        Strategy::Balanced => (
            "Balanced",
            "Optimizes both cost and vendor count for best overall value",
            "Good balance between savings and simplicity",
        ),
        Strategy::QualityFocused => (
            "Quality Focused",
            "Prioritizes vendors with highest quality ratings (4.0+)",
            "Higher quality/reliability, may have higher costs",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{RatingSummary, Specification};

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

    fn vendor(id: Id, prices: &[(Id, f64)], rating: Option<f64>) -> VendorConsolidation {
        VendorConsolidation {
            vendor_id: id,
            vendor_name: format!("vendor{}", id),
            bom_items_available: Vec::new(),
            capabilities: prices.iter().copied().collect(),
            specifications_count: prices.len(),
            total_quantity: 0,
            total_cost_if_used: 0.0,
            average_price_rank: 1.0,
            shipping_advantage: false,
            rating: rating.map(|overall| RatingSummary {
                vendor_id: id,
                total_ratings: 1,
                overall,
                ..RatingSummary::default()
            }),
        }
    }

    /// Six items where the widest vendor forces greedy into three vendors
    fn overshoot() -> (Vec<BomItem>, Vec<VendorConsolidation>) {
        let items = (1..=6).map(|i| item(i, i, 1)).collect();
        let pool = vec![
            vendor(1, &[(1, 10.0), (2, 10.0), (3, 10.0), (4, 10.0)], None),
            vendor(2, &[(1, 1.0), (2, 1.0), (5, 1.0)], None),
            vendor(3, &[(3, 1.0), (4, 1.0), (6, 1.0)], None),
        ];
        (items, pool)
    }

    #[test]
    fn test_lowest_cost_picks_cheapest_with_id_tiebreak() {
        let items = vec![item(1, 1, 10), item(2, 2, 10)];
        let pool = vec![
            vendor(5, &[(1, 2.0), (2, 3.0)], None),
            vendor(4, &[(1, 2.0)], None),
        ];
        let plan = recommend(Strategy::LowestCost, &items, &pool, &ScoringConfig::default());
        assert_eq!(plan.assignments().get(&4), Some(&vec![1]));
        assert_eq!(plan.assignments().get(&5), Some(&vec![2]));
        assert_eq!(plan.total_cost, 50.0);
    }

    #[test]
    fn test_fewest_vendors_greedy_cover() {
        let items = vec![item(1, 1, 1), item(2, 2, 1), item(3, 3, 1)];
        let pool = vec![
            vendor(1, &[(1, 5.0), (2, 5.0), (3, 5.0)], None),
            vendor(2, &[(1, 1.0)], None),
        ];
        let plan = recommend(Strategy::FewestVendors, &items, &pool, &ScoringConfig::default());
        assert_eq!(plan.vendor_count, 1);
        assert_eq!(plan.recommendations[0].vendor_id, 1);
        assert_eq!(
            plan.recommendations[0].rationale,
            "Selected to minimize vendor count (covers 3 items)"
        );
    }

    #[test]
    fn test_fewest_never_exceeds_lowest_vendor_count() {
        let (items, pool) = overshoot();
        let scoring = ScoringConfig::default();
        let cheapest = recommend(Strategy::LowestCost, &items, &pool, &scoring);
        let fewest = recommend(Strategy::FewestVendors, &items, &pool, &scoring);

        assert_eq!(cheapest.vendor_count, 2);
        assert!(fewest.vendor_count <= cheapest.vendor_count);
        assert!(fewest.unassigned_bom_items.is_empty());
    }

    #[test]
    fn test_greedy_cover_assigns_each_item_once() {
        let items = vec![item(1, 1, 1), item(2, 2, 1), item(3, 3, 1), item(4, 4, 1)];
        let pool = vec![
            vendor(1, &[(1, 5.0), (2, 5.0)], None),
            vendor(2, &[(2, 1.0), (3, 1.0)], None),
        ];
        let scoring = ScoringConfig::default();
        let cheapest = recommend(Strategy::LowestCost, &items, &pool, &scoring);
        let fewest = recommend(Strategy::FewestVendors, &items, &pool, &scoring);

        assert_eq!(fewest.assignments().get(&1), Some(&vec![1, 2]));
        assert_eq!(fewest.assignments().get(&2), Some(&vec![3]));
        assert_eq!(fewest.total_cost, 11.0);
        assert_eq!(fewest.unassigned_bom_items, vec![4]);
        assert_eq!(fewest.unassigned_bom_items, cheapest.unassigned_bom_items);
        assert!(fewest.vendor_count <= cheapest.vendor_count);
    }

    #[test]
    fn test_balanced_prefers_fewest_within_tolerance() {
        let items = vec![item(1, 1, 10), item(2, 2, 10)];
        let scoring = ScoringConfig::default();

        let close = vec![
            vendor(1, &[(1, 10.5), (2, 10.5)], None),
            vendor(2, &[(1, 10.0)], None),
            vendor(3, &[(2, 10.0)], None),
        ];
        let plan = recommend(Strategy::Balanced, &items, &close, &scoring);
        assert_eq!(plan.vendor_count, 1);
        assert!(plan.recommendations[0].rationale.contains("minimizes vendors"));

        let far = vec![
            vendor(1, &[(1, 20.0), (2, 20.0)], None),
            vendor(2, &[(1, 10.0)], None),
            vendor(3, &[(2, 10.0)], None),
        ];
        let plan = recommend(Strategy::Balanced, &items, &far, &scoring);
        assert_eq!(plan.vendor_count, 2);
        assert_eq!(plan.total_cost, 200.0);
        assert!(plan.recommendations[0].rationale.contains("cost optimization"));
    }

    #[test]
    fn test_quality_focused_restricts_pool() {
        let items = vec![item(1, 1, 1), item(2, 2, 1)];
        let pool = vec![
            vendor(1, &[(1, 1.0), (2, 1.0)], Some(2.5)),
            vendor(2, &[(1, 3.0)], Some(4.5)),
        ];
        let plan = recommend(Strategy::QualityFocused, &items, &pool, &ScoringConfig::default());
        assert_eq!(plan.vendor_count, 1);
        assert_eq!(plan.recommendations[0].vendor_id, 2);
        assert_eq!(
            plan.recommendations[0].rationale,
            "Quality-focused: highly-rated vendor (rating: 4.5/5.0)"
        );
        assert_eq!(plan.unassigned_bom_items, vec![2]);
    }

    #[test]
    fn test_quality_focused_falls_back_to_lowest_cost() {
        let items = vec![item(1, 1, 1)];
        let pool = vec![vendor(1, &[(1, 2.0)], None), vendor(2, &[(1, 1.0)], Some(3.9))];
        let plan = recommend(Strategy::QualityFocused, &items, &pool, &ScoringConfig::default());
        assert_eq!(plan.recommendations[0].vendor_id, 2);
        assert_eq!(plan.strategy, Strategy::QualityFocused);
    }

    #[test]
    fn test_priority_follows_item_count() {
        let items = vec![item(1, 1, 1), item(2, 2, 1), item(3, 3, 1)];
        let pool = vec![
            vendor(1, &[(1, 1.0)], None),
            vendor(2, &[(2, 1.0), (3, 1.0)], None),
        ];
        let plan = recommend(Strategy::LowestCost, &items, &pool, &ScoringConfig::default());
        assert_eq!(plan.recommendations[0].vendor_id, 2);
        assert_eq!(plan.recommendations[0].priority, 1);
        assert_eq!(plan.recommendations[1].priority, 2);
    }

    #[test]
    fn test_empty_pool_leaves_everything_unassigned() {
        let items = vec![item(1, 1, 1)];
        for &strategy in Strategy::all() {
            let plan = recommend(strategy, &items, &[], &ScoringConfig::default());
            assert!(plan.recommendations.is_empty());
            assert_eq!(plan.unassigned_bom_items, vec![1]);
            assert_eq!(plan.total_cost, 0.0);
        }
    }

    #[test]
    fn test_scenarios_cover_every_strategy() {
        let (items, pool) = overshoot();
        let scenarios = scenarios(&items, &pool, 100.0, &ScoringConfig::default());
        let names: Vec<&str> = scenarios.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Lowest Cost", "Fewest Vendors", "Balanced", "Quality Focused"]);
        assert_eq!(scenarios[0].total_cost, 6.0);
        assert_eq!(scenarios[0].savings_vs_budget, 94.0);
    }
}
