//! Project entity with its bill of materials and requisitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Id, ProcurementStatus, Strategy};
use crate::entities::quote::Specification;

/// A project with budget, deadline and one bill of materials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Id,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Overall budget in USD (0 when unset)
    #[serde(default)]
    pub budget: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,

    /// planning, active, completed, cancelled
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_of_materials: Option<BillOfMaterials>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requisitions: Vec<ProjectRequisition>,

    pub created_at: DateTime<Utc>,
}

impl Project {
    /// BOM lines, empty when the project has no BOM
    pub fn bom_items(&self) -> &[BomItem] {
        self.bill_of_materials
            .as_ref()
            .map(|bom| bom.items.as_slice())
            .unwrap_or(&[])
    }

    /// Distinct specification ids referenced by the BOM, in BOM order
    pub fn specification_ids(&self) -> Vec<Id> {
        let mut ids: Vec<Id> = Vec::new();
        for item in self.bom_items() {
            if !ids.contains(&item.specification.id) {
                ids.push(item.specification.id);
            }
        }
        ids
    }
}

/// The itemized list of specifications a project needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillOfMaterials {
    pub id: Id,
    pub project_id: Id,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<BomItem>,
}

/// One BOM line; unique per (BOM, specification)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomItem {
    pub id: Id,
    pub bill_of_materials_id: Id,
    pub specification: Specification,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A procurement request created from a project's BOM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRequisition {
    pub id: Id,
    pub project_id: Id,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    #[serde(default)]
    pub budget: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<RequisitionItem>,
    pub created_at: DateTime<Utc>,
}

impl ProjectRequisition {
    /// Every line has been ordered or received
    pub fn is_complete(&self) -> bool {
        !self.items.is_empty()
            && self.items.iter().all(|item| {
                matches!(
                    item.procurement_status,
                    ProcurementStatus::Ordered | ProcurementStatus::Received
                )
            })
    }
}

/// A requisition line referencing one BOM item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequisitionItem {
    pub id: Id,
    pub requisition_id: Id,
    pub bom_item_id: Id,
    /// Never more than the BOM item's quantity (enforced upstream)
    pub quantity_requested: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_unit_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_quote_id: Option<Id>,
    #[serde(default)]
    pub procurement_status: ProcurementStatus,
}

/// The selected recommendation strategy of a project (one row per project)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcurementStrategy {
    pub id: Id,
    pub project_id: Id,
    pub strategy: Strategy,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: Id, spec: Id) -> BomItem {
        BomItem {
            id,
            bill_of_materials_id: 1,
            specification: Specification {
                id: spec,
                name: format!("Spec {}", spec),
                description: None,
            },
            quantity: 10,
            notes: None,
        }
    }

    #[test]
    fn test_project_without_bom_has_no_items() {
        let project = Project {
            id: 1,
            name: "Empty".to_string(),
            description: None,
            budget: 0.0,
            deadline: None,
            status: "planning".to_string(),
            bill_of_materials: None,
            requisitions: Vec::new(),
            created_at: Utc::now(),
        };
        assert!(project.bom_items().is_empty());
        assert!(project.specification_ids().is_empty());
    }

    #[test]
    fn test_specification_ids_keep_bom_order() {
        let project = Project {
            id: 1,
            name: "Rollout".to_string(),
            description: None,
            budget: 1000.0,
            deadline: None,
            status: "active".to_string(),
            bill_of_materials: Some(BillOfMaterials {
                id: 1,
                project_id: 1,
                items: vec![item(1, 3), item(2, 1), item(3, 2)],
            }),
            requisitions: Vec::new(),
            created_at: Utc::now(),
        };
        assert_eq!(project.specification_ids(), vec![3, 1, 2]);
    }

    #[test]
    fn test_requisition_completion() {
        let line = |status| RequisitionItem {
            id: 1,
            requisition_id: 1,
            bom_item_id: 1,
            quantity_requested: 5,
            target_unit_price: None,
            selected_quote_id: None,
            procurement_status: status,
        };
        let mut req = ProjectRequisition {
            id: 1,
            project_id: 1,
            name: "Phase 1".to_string(),
            justification: None,
            budget: 0.0,
            items: vec![line(ProcurementStatus::Ordered), line(ProcurementStatus::Received)],
            created_at: Utc::now(),
        };
        assert!(req.is_complete());
        req.items.push(line(ProcurementStatus::Pending));
        assert!(!req.is_complete());
        req.items.clear();
        assert!(!req.is_complete());
    }
}
