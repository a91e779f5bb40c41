//! Database schema initialization

use rusqlite::params;

use super::{SqliteStore, SCHEMA_VERSION};
use crate::core::Result;

impl SqliteStore {
    /// Create every table if missing; safe to run on each open
    pub(super) fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS vendors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                currency TEXT NOT NULL DEFAULT 'USD'
            );

            CREATE TABLE IF NOT EXISTS brands (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS specifications (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                description TEXT
            );

            CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                brand_id INTEGER NOT NULL REFERENCES brands(id),
                name TEXT NOT NULL UNIQUE,
                specification_id INTEGER REFERENCES specifications(id)
            );
            CREATE INDEX IF NOT EXISTS idx_products_spec ON products(specification_id);

            CREATE TABLE IF NOT EXISTS quotes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                vendor_id INTEGER NOT NULL REFERENCES vendors(id),
                product_id INTEGER NOT NULL REFERENCES products(id),
                price REAL NOT NULL,
                currency TEXT NOT NULL,
                converted_price REAL NOT NULL,
                conversion_rate REAL NOT NULL DEFAULT 1.0,
                quote_date TEXT NOT NULL,
                valid_until TEXT,
                notes TEXT,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_quotes_product ON quotes(product_id);
            CREATE INDEX IF NOT EXISTS idx_quotes_vendor ON quotes(vendor_id);

            CREATE TABLE IF NOT EXISTS vendor_ratings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                vendor_id INTEGER NOT NULL REFERENCES vendors(id),
                purchase_order_id INTEGER REFERENCES purchase_orders(id),
                price_rating INTEGER CHECK (price_rating BETWEEN 1 AND 5),
                quality_rating INTEGER CHECK (quality_rating BETWEEN 1 AND 5),
                delivery_rating INTEGER CHECK (delivery_rating BETWEEN 1 AND 5),
                service_rating INTEGER CHECK (service_rating BETWEEN 1 AND 5),
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_vendor_ratings_vendor ON vendor_ratings(vendor_id);

            CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                description TEXT,
                budget REAL NOT NULL DEFAULT 0,
                deadline TEXT,
                status TEXT NOT NULL DEFAULT 'planning',
                created_at TEXT NOT NULL
            );

            -- One BOM per project
            CREATE TABLE IF NOT EXISTS bills_of_materials (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL UNIQUE REFERENCES projects(id)
            );

            -- One line per (BOM, specification)
            CREATE TABLE IF NOT EXISTS bom_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                bill_of_materials_id INTEGER NOT NULL REFERENCES bills_of_materials(id),
                specification_id INTEGER NOT NULL REFERENCES specifications(id),
                quantity INTEGER NOT NULL CHECK (quantity >= 0),
                notes TEXT,
                UNIQUE (bill_of_materials_id, specification_id)
            );

            CREATE TABLE IF NOT EXISTS project_requisitions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL REFERENCES projects(id),
                name TEXT NOT NULL,
                justification TEXT,
                budget REAL NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_requisitions_project ON project_requisitions(project_id);

            CREATE TABLE IF NOT EXISTS requisition_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                requisition_id INTEGER NOT NULL REFERENCES project_requisitions(id),
                bom_item_id INTEGER NOT NULL REFERENCES bom_items(id),
                quantity_requested INTEGER NOT NULL CHECK (quantity_requested >= 0),
                target_unit_price REAL,
                selected_quote_id INTEGER REFERENCES quotes(id),
                procurement_status TEXT NOT NULL DEFAULT 'pending'
            );
            CREATE INDEX IF NOT EXISTS idx_requisition_items_req ON requisition_items(requisition_id);

            CREATE TABLE IF NOT EXISTS purchase_orders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                quote_id INTEGER NOT NULL REFERENCES quotes(id),
                po_number TEXT NOT NULL UNIQUE,
                status TEXT NOT NULL DEFAULT 'pending',
                order_date TEXT NOT NULL,
                expected_delivery TEXT,
                actual_delivery TEXT,
                quantity INTEGER NOT NULL CHECK (quantity >= 0),
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_purchase_orders_quote ON purchase_orders(quote_id);

            -- Selected strategy; the unique project_id backs get-or-create
            CREATE TABLE IF NOT EXISTS procurement_strategies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL UNIQUE REFERENCES projects(id),
                strategy TEXT NOT NULL DEFAULT 'lowest_cost',
                created_at TEXT NOT NULL
            );
            "#,
        )?;

        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }

    /// Stored schema version, 0 for a blank database
    pub fn schema_version(&self) -> Result<i32> {
        let version = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )?;
        Ok(version)
    }
}
