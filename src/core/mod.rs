//! Core module - configuration, errors, shared enums and the SQLite store

pub mod config;
pub mod entity;
pub mod error;
pub mod store;

pub use config::{Config, ScoringConfig};
pub use entity::{Id, OrderStatus, ProcurementStatus, QuoteFreshness, RiskLevel, Strategy};
pub use error::{ProcurementError, Result};
pub use store::{Dataset, ProcurementStore, SqliteStore};
