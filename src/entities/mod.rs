//! Persisted procurement records
//!
//! - [`Project`] - budget, deadline, one [`BillOfMaterials`] and its requisitions
//! - [`Quote`] - a vendor's price for a product, normalized to USD
//! - [`VendorRating`] - 1-5 ratings aggregated into a [`RatingSummary`]
//! - [`PurchaseOrder`] - an ordered quote, the basis of committed spend

pub mod project;
pub mod purchase_order;
pub mod quote;
pub mod vendor;

pub use project::{
    BillOfMaterials, BomItem, ProcurementStrategy, Project, ProjectRequisition, RequisitionItem,
};
pub use purchase_order::PurchaseOrder;
pub use quote::{Quote, Specification};
pub use vendor::{RatingSummary, Vendor, VendorRating};
