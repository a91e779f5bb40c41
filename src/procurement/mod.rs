//! Project procurement optimization and risk engine
//!
//! Every operation loads one consistent snapshot of a project through a
//! [`ProcurementStore`], indexes the quotes for its BOM specifications once,
//! and computes the result in memory.

pub mod comparison;
pub mod consolidation;
pub mod coverage;
pub mod dashboard;
pub mod index;
pub mod recommend;
pub mod risk;
pub mod savings;

pub use comparison::{ProjectComparison, QuoteFreshnessStats};
pub use consolidation::VendorConsolidation;
pub use coverage::{BomItemAnalysis, RequisitionDemand};
pub use dashboard::ProjectDashboard;
pub use index::QuoteIndex;
pub use recommend::{ProcurementScenario, RecommendationPlan, VendorRecommendation};
pub use risk::{EnhancedRiskAssessment, ProjectRiskAssessment, RiskCategory};
pub use savings::{SavingsLineItem, SavingsSummary};

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core::config::ScoringConfig;
use crate::core::entity::{Id, Strategy};
use crate::core::store::ProcurementStore;
use crate::core::Result;
use crate::entities::{ProcurementStrategy, Project, PurchaseOrder, RatingSummary};

/// Project state every analysis is computed from
pub(crate) struct Snapshot {
    pub project: Project,
    pub strategy: ProcurementStrategy,
    pub index: QuoteIndex,
    pub orders: Vec<PurchaseOrder>,
    /// Summaries for every quoting or ordered vendor
    pub ratings: BTreeMap<Id, RatingSummary>,
    pub analyses: Vec<BomItemAnalysis>,
    pub consolidation: Vec<VendorConsolidation>,
    /// Plan under the stored strategy
    pub plan: RecommendationPlan,
}

/// Read-side entry points of the engine
pub struct ProcurementService<'a, S: ProcurementStore + ?Sized> {
    store: &'a S,
    scoring: ScoringConfig,
    now: DateTime<Utc>,
}

impl<'a, S: ProcurementStore + ?Sized> ProcurementService<'a, S> {
    pub fn new(store: &'a S, scoring: ScoringConfig) -> Self {
        Self {
            store,
            scoring,
            now: Utc::now(),
        }
    }

    /// Evaluate freshness and deadlines against a fixed instant
    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    fn snapshot(&self, project_id: Id) -> Result<Snapshot> {
        let project = self.store.project(project_id)?;
        let strategy = self.store.get_or_create_strategy(project_id)?;

        let spec_ids = project.specification_ids();
        let index = QuoteIndex::new(self.store.quotes_for_specifications(&spec_ids)?, self.now);
        let orders = self.store.purchase_orders_for_specifications(&spec_ids)?;
        debug!(
            "Project {}: {} BOM items, {} quotes, {} orders",
            project.id,
            project.bom_items().len(),
            index.len(),
            orders.len()
        );

        let mut vendor_ids: BTreeSet<Id> = index.vendors().into_keys().collect();
        vendor_ids.extend(orders.iter().map(|o| o.vendor_id));
        let mut ratings = BTreeMap::new();
        for vendor_id in vendor_ids {
            let rows = self.store.vendor_ratings(vendor_id)?;
            ratings.insert(vendor_id, RatingSummary::from_ratings(vendor_id, &rows));
        }

        let analyses: Vec<BomItemAnalysis> = project
            .bom_items()
            .iter()
            .map(|item| {
                coverage::analyze_item(
                    item,
                    &project.requisitions,
                    index.available(item.specification.id),
                    &self.scoring,
                    self.now,
                )
            })
            .collect();
        let consolidation = consolidation::analyze(project.bom_items(), &index, &ratings);
        let plan = recommend::recommend(
            strategy.strategy,
            project.bom_items(),
            &consolidation,
            &self.scoring,
        );

        Ok(Snapshot {
            project,
            strategy,
            index,
            orders,
            ratings,
            analyses,
            consolidation,
            plan,
        })
    }

    /// Full comparison of a project under its stored strategy
    pub fn comparison(&self, project_id: Id) -> Result<ProjectComparison> {
        let snapshot = self.snapshot(project_id)?;
        Ok(comparison::build(&snapshot, &self.scoring, self.now))
    }

    /// Coverage of a single BOM line
    pub fn analyze_bom_item(&self, bom_item_id: Id) -> Result<BomItemAnalysis> {
        let (item, project_id) = self.store.bom_item(bom_item_id)?;
        let project = self.store.project(project_id)?;
        let quotes = self
            .store
            .quotes_for_specification(item.specification.id, self.now)?;
        Ok(coverage::analyze_item(
            &item,
            &project.requisitions,
            &quotes,
            &self.scoring,
            self.now,
        ))
    }

    pub fn consolidation(&self, project_id: Id) -> Result<Vec<VendorConsolidation>> {
        Ok(self.snapshot(project_id)?.consolidation)
    }

    /// Assignment of BOM items to vendors under `strategy`
    pub fn recommendations(&self, project_id: Id, strategy: Strategy) -> Result<RecommendationPlan> {
        let snapshot = self.snapshot(project_id)?;
        if strategy == snapshot.plan.strategy {
            return Ok(snapshot.plan);
        }
        Ok(recommend::recommend(
            strategy,
            snapshot.project.bom_items(),
            &snapshot.consolidation,
            &self.scoring,
        ))
    }

    /// Every strategy side by side
    pub fn scenarios(&self, project_id: Id) -> Result<Vec<ProcurementScenario>> {
        let snapshot = self.snapshot(project_id)?;
        Ok(recommend::scenarios(
            snapshot.project.bom_items(),
            &snapshot.consolidation,
            snapshot.project.budget,
            &self.scoring,
        ))
    }

    pub fn savings(&self, project_id: Id) -> Result<SavingsSummary> {
        let snapshot = self.snapshot(project_id)?;
        Ok(savings::calculate(
            &snapshot.analyses,
            snapshot.consolidation.len(),
            snapshot.plan.vendor_count,
            &self.scoring,
        ))
    }

    pub fn enhanced_risks(&self, project_id: Id) -> Result<EnhancedRiskAssessment> {
        let snapshot = self.snapshot(project_id)?;
        let comparison = comparison::build(&snapshot, &self.scoring, self.now);
        Ok(risk::assess(&comparison, &snapshot.ratings, &self.scoring))
    }

    pub fn dashboard(&self, project_id: Id) -> Result<ProjectDashboard> {
        let snapshot = self.snapshot(project_id)?;
        let comparison = comparison::build(&snapshot, &self.scoring, self.now);
        let savings = savings::calculate(
            &snapshot.analyses,
            snapshot.consolidation.len(),
            snapshot.plan.vendor_count,
            &self.scoring,
        );
        let risks = risk::assess(&comparison, &snapshot.ratings, &self.scoring);

        let sources = dashboard::DashboardSources {
            project: &snapshot.project,
            index: &snapshot.index,
            orders: &snapshot.orders,
            ratings: &snapshot.ratings,
            comparison: &comparison,
            savings: &savings,
            risks: &risks,
        };
        Ok(dashboard::build(&sources, &self.scoring, self.now))
    }

    /// Stored strategy, created with the default on first access
    pub fn strategy(&self, project_id: Id) -> Result<ProcurementStrategy> {
        self.store.get_or_create_strategy(project_id)
    }
}
