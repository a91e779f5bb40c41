//! Buyer: project procurement optimization
//!
//! Analyzes a project's bill of materials against vendor quotes, recommends
//! vendor assignments under four strategies, and reports savings, risk and a
//! dashboard summary from a local SQLite database.

pub mod cli;
pub mod core;
pub mod entities;
pub mod procurement;
