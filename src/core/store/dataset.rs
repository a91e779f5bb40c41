//! YAML seed datasets
//!
//! A dataset describes vendors, catalog, quotes and projects by name; loading
//! resolves every name to a row id inside a single transaction, so a dataset
//! with a dangling reference leaves the database untouched.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Transaction};
use serde::{Deserialize, Serialize};

use super::SqliteStore;
use crate::core::entity::{Id, OrderStatus, ProcurementStatus};
use crate::core::{ProcurementError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub vendors: Vec<DatasetVendor>,
    pub specifications: Vec<DatasetSpecification>,
    pub products: Vec<DatasetProduct>,
    pub quotes: Vec<DatasetQuote>,
    pub projects: Vec<DatasetProject>,
    pub purchase_orders: Vec<DatasetOrder>,
    pub ratings: Vec<DatasetRating>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetVendor {
    pub name: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetSpecification {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetProduct {
    pub name: String,
    #[serde(default = "default_brand")]
    pub brand: String,
    #[serde(default)]
    pub specification: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetQuote {
    pub vendor: String,
    pub product: String,
    pub price: f64,
    /// Defaults to the vendor's currency
    #[serde(default)]
    pub currency: Option<String>,
    /// Multiplier to USD
    #[serde(default)]
    pub conversion_rate: Option<f64>,
    /// Defaults to the load time
    #[serde(default)]
    pub quote_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetProject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default = "default_project_status")]
    pub status: String,
    #[serde(default)]
    pub bom: Vec<DatasetBomItem>,
    #[serde(default)]
    pub requisitions: Vec<DatasetRequisition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetBomItem {
    pub specification: String,
    pub quantity: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetRequisition {
    pub name: String,
    #[serde(default)]
    pub justification: Option<String>,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub items: Vec<DatasetRequisitionItem>,
}

/// A requisition line; `specification` names the project's BOM line
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetRequisitionItem {
    pub specification: String,
    pub quantity: u32,
    #[serde(default)]
    pub target_unit_price: Option<f64>,
    #[serde(default)]
    pub status: ProcurementStatus,
}

/// A purchase order placed against the quote of `vendor` for `product`
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetOrder {
    pub po_number: String,
    pub vendor: String,
    pub product: String,
    pub quantity: u32,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expected_delivery: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actual_delivery: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetRating {
    pub vendor: String,
    #[serde(default)]
    pub po_number: Option<String>,
    #[serde(default)]
    pub price: Option<u8>,
    #[serde(default)]
    pub quality: Option<u8>,
    #[serde(default)]
    pub delivery: Option<u8>,
    #[serde(default)]
    pub service: Option<u8>,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_brand() -> String {
    "Generic".to_string()
}

fn default_project_status() -> String {
    "planning".to_string()
}

/// Row counts written by a dataset load
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub vendors: usize,
    pub specifications: usize,
    pub products: usize,
    pub quotes: usize,
    pub projects: usize,
    pub purchase_orders: usize,
    pub ratings: usize,
}

impl Dataset {
    pub fn from_yaml(contents: &str) -> Result<Self> {
        Ok(serde_yml::from_str(contents)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }
}

impl SqliteStore {
    /// Insert a dataset, resolving references by name, all or nothing
    pub fn load_dataset(&mut self, dataset: &Dataset, now: DateTime<Utc>) -> Result<DatasetSummary> {
        let tx = self.conn.transaction()?;
        let stamp = now.to_rfc3339();

        for vendor in &dataset.vendors {
            tx.execute(
                "INSERT INTO vendors (name, currency) VALUES (?1, ?2)",
                params![vendor.name, vendor.currency],
            )?;
        }

        for spec in &dataset.specifications {
            tx.execute(
                "INSERT INTO specifications (name, description) VALUES (?1, ?2)",
                params![spec.name, spec.description],
            )?;
        }

        for product in &dataset.products {
            tx.execute(
                "INSERT OR IGNORE INTO brands (name) VALUES (?1)",
                params![product.brand],
            )?;
            let brand_id = lookup(&tx, "brands", "brand", &product.brand)?;
            let spec_id = product
                .specification
                .as_deref()
                .map(|name| lookup(&tx, "specifications", "specification", name))
                .transpose()?;
            tx.execute(
                "INSERT INTO products (brand_id, name, specification_id) VALUES (?1, ?2, ?3)",
                params![brand_id, product.name, spec_id],
            )?;
        }

        for quote in &dataset.quotes {
            let vendor_id = lookup(&tx, "vendors", "vendor", &quote.vendor)?;
            let product_id = lookup(&tx, "products", "product", &quote.product)?;
            let currency = match &quote.currency {
                Some(currency) => currency.clone(),
                None => tx.query_row(
                    "SELECT currency FROM vendors WHERE id = ?1",
                    params![vendor_id],
                    |row| row.get(0),
                )?,
            };
            let rate = quote.conversion_rate.unwrap_or(1.0);
            tx.execute(
                r#"INSERT INTO quotes (vendor_id, product_id, price, currency, converted_price,
                                       conversion_rate, quote_date, valid_until, notes, created_at)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
                params![
                    vendor_id,
                    product_id,
                    quote.price,
                    currency,
                    quote.price * rate,
                    rate,
                    quote.quote_date.unwrap_or(now).to_rfc3339(),
                    quote.valid_until.map(|d| d.to_rfc3339()),
                    quote.notes,
                    quote.quote_date.unwrap_or(now).to_rfc3339(),
                ],
            )?;
        }

        for project in &dataset.projects {
            load_project(&tx, project, &stamp)?;
        }

        for order in &dataset.purchase_orders {
            let quote_id = quote_for(&tx, &order.vendor, &order.product)?;
            let order_date = order.order_date.unwrap_or(now).to_rfc3339();
            tx.execute(
                r#"INSERT INTO purchase_orders (quote_id, po_number, status, order_date,
                                                expected_delivery, actual_delivery, quantity, created_at)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
                params![
                    quote_id,
                    order.po_number,
                    order.status.as_str(),
                    order_date,
                    order.expected_delivery.map(|d| d.to_rfc3339()),
                    order.actual_delivery.map(|d| d.to_rfc3339()),
                    order.quantity,
                    order_date,
                ],
            )?;
        }

        for rating in &dataset.ratings {
            let vendor_id = lookup(&tx, "vendors", "vendor", &rating.vendor)?;
            let po_id: Option<Id> = match &rating.po_number {
                Some(number) => Some(
                    tx.query_row(
                        "SELECT id FROM purchase_orders WHERE po_number = ?1",
                        params![number],
                        |row| row.get(0),
                    )
                    .optional()?
                    .ok_or_else(|| {
                        ProcurementError::dataset(format!("unknown purchase order '{}'", number))
                    })?,
                ),
                None => None,
            };
            tx.execute(
                r#"INSERT INTO vendor_ratings (vendor_id, purchase_order_id, price_rating,
                                               quality_rating, delivery_rating, service_rating, created_at)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
                params![
                    vendor_id,
                    po_id,
                    rating.price,
                    rating.quality,
                    rating.delivery,
                    rating.service,
                    stamp,
                ],
            )?;
        }

        tx.commit()?;

        let summary = DatasetSummary {
            vendors: dataset.vendors.len(),
            specifications: dataset.specifications.len(),
            products: dataset.products.len(),
            quotes: dataset.quotes.len(),
            projects: dataset.projects.len(),
            purchase_orders: dataset.purchase_orders.len(),
            ratings: dataset.ratings.len(),
        };
        tracing::info!(
            "Loaded dataset: {} vendors, {} quotes, {} projects",
            summary.vendors,
            summary.quotes,
            summary.projects
        );
        Ok(summary)
    }
}

fn load_project(tx: &Transaction<'_>, project: &DatasetProject, stamp: &str) -> Result<()> {
    tx.execute(
        r#"INSERT INTO projects (name, description, budget, deadline, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
        params![
            project.name,
            project.description,
            project.budget,
            project.deadline.map(|d| d.to_rfc3339()),
            project.status,
            stamp,
        ],
    )?;
    let project_id = tx.last_insert_rowid();

    tx.execute(
        "INSERT INTO bills_of_materials (project_id) VALUES (?1)",
        params![project_id],
    )?;
    let bom_id = tx.last_insert_rowid();

    for item in &project.bom {
        let spec_id = lookup(tx, "specifications", "specification", &item.specification)?;
        tx.execute(
            r#"INSERT INTO bom_items (bill_of_materials_id, specification_id, quantity, notes)
               VALUES (?1, ?2, ?3, ?4)"#,
            params![bom_id, spec_id, item.quantity, item.notes],
        )?;
    }

    for requisition in &project.requisitions {
        tx.execute(
            r#"INSERT INTO project_requisitions (project_id, name, justification, budget, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5)"#,
            params![
                project_id,
                requisition.name,
                requisition.justification,
                requisition.budget,
                stamp,
            ],
        )?;
        let requisition_id = tx.last_insert_rowid();

        for item in &requisition.items {
            let bom_item_id: Id = tx
                .query_row(
                    r#"SELECT bi.id FROM bom_items bi
                       JOIN specifications s ON s.id = bi.specification_id
                       WHERE bi.bill_of_materials_id = ?1 AND s.name = ?2"#,
                    params![bom_id, item.specification],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or_else(|| {
                    ProcurementError::dataset(format!(
                        "project '{}' has no BOM line for '{}'",
                        project.name, item.specification
                    ))
                })?;
            tx.execute(
                r#"INSERT INTO requisition_items (requisition_id, bom_item_id, quantity_requested,
                                                  target_unit_price, procurement_status)
                   VALUES (?1, ?2, ?3, ?4, ?5)"#,
                params![
                    requisition_id,
                    bom_item_id,
                    item.quantity,
                    item.target_unit_price,
                    item.status.as_str(),
                ],
            )?;
        }
    }

    Ok(())
}

/// Id of the row in `table` named `name`
fn lookup(tx: &Transaction<'_>, table: &str, kind: &str, name: &str) -> Result<Id> {
    tx.query_row(
        &format!("SELECT id FROM {} WHERE name = ?1", table),
        params![name],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| ProcurementError::dataset(format!("unknown {} '{}'", kind, name)))
}

/// Latest quote of a vendor for a product
fn quote_for(tx: &Transaction<'_>, vendor: &str, product: &str) -> Result<Id> {
    tx.query_row(
        r#"SELECT q.id FROM quotes q
           JOIN vendors v ON v.id = q.vendor_id
           JOIN products p ON p.id = q.product_id
           WHERE v.name = ?1 AND p.name = ?2
           ORDER BY q.quote_date DESC, q.id DESC LIMIT 1"#,
        params![vendor, product],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| {
        ProcurementError::dataset(format!("no quote from '{}' for '{}'", vendor, product))
    })
}
