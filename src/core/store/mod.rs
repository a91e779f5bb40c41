//! SQLite-backed procurement store
//!
//! The engine reads everything through [`ProcurementStore`]; [`SqliteStore`]
//! is the bundled implementation. The only write on the analysis path is the
//! strategy get-or-create, which is an atomic insert-if-absent.

mod dataset;
mod queries;
mod schema;

pub use dataset::{
    Dataset, DatasetBomItem, DatasetOrder, DatasetProduct, DatasetProject, DatasetQuote,
    DatasetRating, DatasetRequisition, DatasetRequisitionItem, DatasetSpecification,
    DatasetSummary, DatasetVendor,
};

use std::fs;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Connection;

use crate::core::entity::{Id, Strategy};
use crate::core::Result;
use crate::entities::{
    BomItem, ProcurementStrategy, Project, PurchaseOrder, Quote, VendorRating,
};

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

const BUSY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Read access the procurement engine needs from persisted state
pub trait ProcurementStore {
    /// Project with BOM items, requisitions and requisition items loaded
    fn project(&self, id: Id) -> Result<Project>;

    /// A BOM line together with the id of the project that owns it
    fn bom_item(&self, id: Id) -> Result<(BomItem, Id)>;

    /// Non-expired quotes for products of a specification, cheapest first
    fn quotes_for_specification(&self, specification_id: Id, now: DateTime<Utc>)
        -> Result<Vec<Quote>>;

    /// Every quote (expired included) for any of the specifications, cheapest first
    fn quotes_for_specifications(&self, specification_ids: &[Id]) -> Result<Vec<Quote>>;

    fn vendor_ratings(&self, vendor_id: Id) -> Result<Vec<VendorRating>>;

    /// Selected strategy; the first read creates the default row
    fn get_or_create_strategy(&self, project_id: Id) -> Result<ProcurementStrategy>;

    /// Orders placed against quotes for any of the specifications
    fn purchase_orders_for_specifications(
        &self,
        specification_ids: &[Id],
    ) -> Result<Vec<PurchaseOrder>>;
}

/// The procurement database backed by SQLite
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a database file
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        // Other connections may hold the write lock
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let store = Self::with_connection(conn)?;
        tracing::debug!("Opened store at {}", path.display());
        Ok(store)
    }

    /// A private database that lives as long as the store
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Replace the selected strategy of a project
    pub fn set_strategy(&self, project_id: Id, strategy: Strategy) -> Result<ProcurementStrategy> {
        self.ensure_project(project_id)?;
        self.conn.execute(
            r#"INSERT INTO procurement_strategies (project_id, strategy, created_at)
               VALUES (?1, ?2, ?3)
               ON CONFLICT(project_id) DO UPDATE SET strategy = excluded.strategy"#,
            rusqlite::params![project_id, strategy.as_str(), Utc::now().to_rfc3339()],
        )?;
        tracing::info!("Project {} strategy set to {}", project_id, strategy);
        self.strategy_row(project_id)
    }
}

impl ProcurementStore for SqliteStore {
    fn project(&self, id: Id) -> Result<Project> {
        self.load_project(id)
    }

    fn bom_item(&self, id: Id) -> Result<(BomItem, Id)> {
        self.load_bom_item(id)
    }

    fn quotes_for_specification(
        &self,
        specification_id: Id,
        now: DateTime<Utc>,
    ) -> Result<Vec<Quote>> {
        let quotes = self.load_quotes(&[specification_id])?;
        Ok(quotes.into_iter().filter(|q| !q.is_expired(now)).collect())
    }

    fn quotes_for_specifications(&self, specification_ids: &[Id]) -> Result<Vec<Quote>> {
        self.load_quotes(specification_ids)
    }

    fn vendor_ratings(&self, vendor_id: Id) -> Result<Vec<VendorRating>> {
        self.load_vendor_ratings(vendor_id)
    }

    fn get_or_create_strategy(&self, project_id: Id) -> Result<ProcurementStrategy> {
        self.ensure_project(project_id)?;
        let inserted = self.conn.execute(
            r#"INSERT INTO procurement_strategies (project_id, strategy, created_at)
               VALUES (?1, ?2, ?3)
               ON CONFLICT(project_id) DO NOTHING"#,
            rusqlite::params![
                project_id,
                Strategy::default().as_str(),
                Utc::now().to_rfc3339()
            ],
        )?;
        if inserted > 0 {
            tracing::info!(
                "Created default {} strategy for project {}",
                Strategy::default(),
                project_id
            );
        }
        self.strategy_row(project_id)
    }

    fn purchase_orders_for_specifications(
        &self,
        specification_ids: &[Id],
    ) -> Result<Vec<PurchaseOrder>> {
        self.load_purchase_orders(specification_ids)
    }
}

/// Parse an RFC 3339 column
fn parse_datetime(idx: usize, s: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_optional_datetime(idx: usize, s: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    s.map(|s| parse_datetime(idx, s)).transpose()
}

/// Parse a text column through the enum's `FromStr`
fn parse_enum<T: FromStr<Err = String>>(idx: usize, s: String) -> rusqlite::Result<T> {
    s.parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

/// `?1, ?2, ...` for an `IN (...)` list
fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests;
