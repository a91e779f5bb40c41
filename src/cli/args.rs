//! CLI argument definitions using clap derive

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    analyze::AnalyzeArgs, completions::CompletionsArgs, dashboard::DashboardArgs, init::InitArgs,
    item::ItemArgs, recommend::RecommendArgs, risks::RisksArgs, savings::SavingsArgs,
    scenarios::ScenariosArgs, seed::SeedArgs, strategy::StrategyCommands,
};

#[derive(Parser)]
#[command(name = "buyer")]
#[command(author, version, about = "Project procurement optimizer")]
#[command(long_about = "Analyzes a project's bill of materials against vendor quotes and recommends who to buy from.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// SQLite database (default: from config, then the user data directory)
    #[arg(long, global = true, env = "BUYER_DATABASE")]
    pub database: Option<PathBuf>,

    /// Evaluate quote freshness and deadlines as of this RFC 3339 instant
    #[arg(long, global = true, value_name = "TIMESTAMP")]
    pub as_of: Option<DateTime<Utc>>,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the procurement database
    Init(InitArgs),

    /// Load vendors, quotes, projects and orders from a YAML dataset
    Seed(SeedArgs),

    /// Full procurement comparison for a project
    Analyze(AnalyzeArgs),

    /// Coverage and quotes for a single BOM item
    Item(ItemArgs),

    /// Vendor assignment under a strategy
    Recommend(RecommendArgs),

    /// Compare all four strategies side by side
    Scenarios(ScenariosArgs),

    /// Savings against requisition target prices
    Savings(SavingsArgs),

    /// Weighted multi-category risk assessment
    Risks(RisksArgs),

    /// Project dashboard (progress, financials, vendors, activity)
    Dashboard(DashboardArgs),

    /// Show or change a project's procurement strategy
    #[command(subcommand)]
    Strategy(StrategyCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Styled tables for the terminal
    #[default]
    Auto,
    /// JSON format (for programming)
    Json,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// Markdown tables
    Md,
}
