//! CLI command implementations

pub mod analyze;
pub mod completions;
pub mod dashboard;
pub mod init;
pub mod item;
pub mod recommend;
pub mod risks;
pub mod savings;
pub mod scenarios;
pub mod seed;
pub mod strategy;
