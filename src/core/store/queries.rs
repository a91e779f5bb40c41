//! Query methods backing the `ProcurementStore` implementation

use rusqlite::{params, params_from_iter, OptionalExtension, Row};

use super::{parse_datetime, parse_enum, parse_optional_datetime, placeholders, SqliteStore};
use crate::core::entity::Id;
use crate::core::{ProcurementError, Result};
use crate::entities::{
    BillOfMaterials, BomItem, ProcurementStrategy, Project, ProjectRequisition, PurchaseOrder,
    Quote, RequisitionItem, Specification, VendorRating,
};

const QUOTE_COLUMNS: &str = r#"q.id, q.vendor_id, v.name, q.product_id, p.name, p.specification_id,
    q.price, q.currency, q.converted_price, q.conversion_rate, q.quote_date, q.valid_until,
    q.created_at"#;

const BOM_ITEM_COLUMNS: &str = r#"bi.id, bi.bill_of_materials_id, s.id, s.name, s.description,
    bi.quantity, bi.notes"#;

fn quote_from_row(row: &Row<'_>) -> rusqlite::Result<Quote> {
    Ok(Quote {
        id: row.get(0)?,
        vendor_id: row.get(1)?,
        vendor_name: row.get(2)?,
        product_id: row.get(3)?,
        product_name: row.get(4)?,
        specification_id: row.get(5)?,
        price: row.get(6)?,
        currency: row.get(7)?,
        converted_price: row.get(8)?,
        conversion_rate: row.get(9)?,
        quote_date: parse_datetime(10, row.get(10)?)?,
        valid_until: parse_optional_datetime(11, row.get(11)?)?,
        created_at: parse_datetime(12, row.get(12)?)?,
    })
}

fn bom_item_from_row(row: &Row<'_>) -> rusqlite::Result<BomItem> {
    Ok(BomItem {
        id: row.get(0)?,
        bill_of_materials_id: row.get(1)?,
        specification: Specification {
            id: row.get(2)?,
            name: row.get(3)?,
            description: row.get(4)?,
        },
        quantity: row.get(5)?,
        notes: row.get(6)?,
    })
}

impl SqliteStore {
    pub(super) fn ensure_project(&self, id: Id) -> Result<()> {
        let exists = self
            .conn
            .query_row("SELECT 1 FROM projects WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?;
        exists.ok_or_else(|| ProcurementError::not_found("Project", id))
    }

    pub(super) fn load_project(&self, id: Id) -> Result<Project> {
        let project = self
            .conn
            .query_row(
                r#"SELECT id, name, description, budget, deadline, status, created_at
                   FROM projects WHERE id = ?1"#,
                params![id],
                |row| {
                    Ok(Project {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        budget: row.get(3)?,
                        deadline: parse_optional_datetime(4, row.get(4)?)?,
                        status: row.get(5)?,
                        bill_of_materials: None,
                        requisitions: Vec::new(),
                        created_at: parse_datetime(6, row.get(6)?)?,
                    })
                },
            )
            .optional()?;
        let mut project = project.ok_or_else(|| ProcurementError::not_found("Project", id))?;

        let bom_id: Option<Id> = self
            .conn
            .query_row(
                "SELECT id FROM bills_of_materials WHERE project_id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(bom_id) = bom_id {
            let mut stmt = self.conn.prepare(&format!(
                r#"SELECT {} FROM bom_items bi
                   JOIN specifications s ON s.id = bi.specification_id
                   WHERE bi.bill_of_materials_id = ?1
                   ORDER BY bi.id"#,
                BOM_ITEM_COLUMNS
            ))?;
            let items = stmt
                .query_map(params![bom_id], bom_item_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            project.bill_of_materials = Some(BillOfMaterials {
                id: bom_id,
                project_id: id,
                items,
            });
        }

        project.requisitions = self.load_requisitions(id)?;
        Ok(project)
    }

    fn load_requisitions(&self, project_id: Id) -> Result<Vec<ProjectRequisition>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, project_id, name, justification, budget, created_at
               FROM project_requisitions WHERE project_id = ?1 ORDER BY id"#,
        )?;
        let mut requisitions = stmt
            .query_map(params![project_id], |row| {
                Ok(ProjectRequisition {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    name: row.get(2)?,
                    justification: row.get(3)?,
                    budget: row.get(4)?,
                    items: Vec::new(),
                    created_at: parse_datetime(5, row.get(5)?)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut items_stmt = self.conn.prepare(
            r#"SELECT id, requisition_id, bom_item_id, quantity_requested, target_unit_price,
                      selected_quote_id, procurement_status
               FROM requisition_items WHERE requisition_id = ?1 ORDER BY id"#,
        )?;
        for requisition in &mut requisitions {
            requisition.items = items_stmt
                .query_map(params![requisition.id], |row| {
                    Ok(RequisitionItem {
                        id: row.get(0)?,
                        requisition_id: row.get(1)?,
                        bom_item_id: row.get(2)?,
                        quantity_requested: row.get(3)?,
                        target_unit_price: row.get(4)?,
                        selected_quote_id: row.get(5)?,
                        procurement_status: parse_enum(6, row.get(6)?)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
        }

        Ok(requisitions)
    }

    pub(super) fn load_bom_item(&self, id: Id) -> Result<(BomItem, Id)> {
        let found = self
            .conn
            .query_row(
                &format!(
                    r#"SELECT {}, b.project_id FROM bom_items bi
                       JOIN specifications s ON s.id = bi.specification_id
                       JOIN bills_of_materials b ON b.id = bi.bill_of_materials_id
                       WHERE bi.id = ?1"#,
                    BOM_ITEM_COLUMNS
                ),
                params![id],
                |row| Ok((bom_item_from_row(row)?, row.get::<_, Id>(7)?)),
            )
            .optional()?;
        found.ok_or_else(|| ProcurementError::not_found("BOM item", id))
    }

    pub(super) fn load_quotes(&self, specification_ids: &[Id]) -> Result<Vec<Quote>> {
        if specification_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            r#"SELECT {} FROM quotes q
               JOIN vendors v ON v.id = q.vendor_id
               JOIN products p ON p.id = q.product_id
               WHERE p.specification_id IN ({})
               ORDER BY q.converted_price ASC, q.vendor_id ASC, q.id ASC"#,
            QUOTE_COLUMNS,
            placeholders(specification_ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let quotes = stmt
            .query_map(params_from_iter(specification_ids.iter()), quote_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(quotes)
    }

    pub(super) fn load_vendor_ratings(&self, vendor_id: Id) -> Result<Vec<VendorRating>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, vendor_id, purchase_order_id, price_rating, quality_rating,
                      delivery_rating, service_rating, created_at
               FROM vendor_ratings WHERE vendor_id = ?1 ORDER BY id"#,
        )?;
        let ratings = stmt
            .query_map(params![vendor_id], |row| {
                Ok(VendorRating {
                    id: row.get(0)?,
                    vendor_id: row.get(1)?,
                    purchase_order_id: row.get(2)?,
                    price_rating: row.get(3)?,
                    quality_rating: row.get(4)?,
                    delivery_rating: row.get(5)?,
                    service_rating: row.get(6)?,
                    created_at: parse_datetime(7, row.get(7)?)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ratings)
    }

    pub(super) fn strategy_row(&self, project_id: Id) -> Result<ProcurementStrategy> {
        let row = self
            .conn
            .query_row(
                r#"SELECT id, project_id, strategy, created_at
                   FROM procurement_strategies WHERE project_id = ?1"#,
                params![project_id],
                |row| {
                    Ok(ProcurementStrategy {
                        id: row.get(0)?,
                        project_id: row.get(1)?,
                        strategy: parse_enum(2, row.get(2)?)?,
                        created_at: parse_datetime(3, row.get(3)?)?,
                    })
                },
            )
            .optional()?;
        row.ok_or_else(|| ProcurementError::not_found("Procurement strategy", project_id))
    }

    pub(super) fn load_purchase_orders(&self, specification_ids: &[Id]) -> Result<Vec<PurchaseOrder>> {
        if specification_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            r#"SELECT po.id, po.quote_id, q.vendor_id, v.name, q.product_id, p.name,
                      p.specification_id, po.po_number, po.status, po.order_date,
                      po.expected_delivery, po.actual_delivery, po.quantity,
                      q.converted_price, po.created_at
               FROM purchase_orders po
               JOIN quotes q ON q.id = po.quote_id
               JOIN vendors v ON v.id = q.vendor_id
               JOIN products p ON p.id = q.product_id
               WHERE p.specification_id IN ({})
               ORDER BY po.order_date ASC, po.id ASC"#,
            placeholders(specification_ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let orders = stmt
            .query_map(params_from_iter(specification_ids.iter()), |row| {
                Ok(PurchaseOrder {
                    id: row.get(0)?,
                    quote_id: row.get(1)?,
                    vendor_id: row.get(2)?,
                    vendor_name: row.get(3)?,
                    product_id: row.get(4)?,
                    product_name: row.get(5)?,
                    specification_id: row.get(6)?,
                    po_number: row.get(7)?,
                    status: parse_enum(8, row.get(8)?)?,
                    order_date: parse_datetime(9, row.get(9)?)?,
                    expected_delivery: parse_optional_datetime(10, row.get(10)?)?,
                    actual_delivery: parse_optional_datetime(11, row.get(11)?)?,
                    quantity: row.get(12)?,
                    unit_price_usd: row.get(13)?,
                    created_at: parse_datetime(14, row.get(14)?)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(orders)
    }

    /// Project ids and names, for listings
    pub fn list_projects(&self) -> Result<Vec<(Id, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM projects ORDER BY id")?;
        let projects = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(projects)
    }
}
