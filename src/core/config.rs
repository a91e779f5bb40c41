//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Buyer configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database path
    pub database: Option<PathBuf>,

    /// Default output format
    pub default_format: Option<String>,

    /// Scoring model overrides; unset keys keep their defaults
    pub scoring: ScoringOverrides,
}

/// Tunable constants of the procurement scoring model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Quotes older than this are stale for item risk scoring
    pub stale_after_days: i64,

    /// Quotes younger than this are fresh
    pub fresh_within_days: i64,

    /// Administrative cost avoided per vendor not engaged
    pub per_vendor_admin_cost: f64,

    /// Minimum overall rating for the quality-focused vendor pool
    pub quality_min_rating: f64,

    /// Rated vendors below this raise quality risk
    pub low_rating_threshold: f64,

    /// Balanced strategy accepts fewest-vendors when within this fraction of lowest cost
    pub balanced_cost_tolerance: f64,

    /// Days before deadline when low coverage marks a project at risk
    pub at_risk_window_days: i64,

    /// BOM coverage below this is at risk inside the window
    pub at_risk_coverage_percent: f64,

    /// Maximum entries in the dashboard activity feed
    pub activity_limit: usize,

    /// Maximum quotes and orders each contributing to the activity feed
    pub activity_source_limit: usize,

    /// Assumed requisition duration for the timeline chart
    pub default_lead_time_days: i64,

    pub weights: RiskWeights,

    pub contingency: ContingencyMultipliers,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            stale_after_days: 90,
            fresh_within_days: 30,
            per_vendor_admin_cost: 250.0,
            quality_min_rating: 4.0,
            low_rating_threshold: 3.0,
            balanced_cost_tolerance: 0.10,
            at_risk_window_days: 30,
            at_risk_coverage_percent: 80.0,
            activity_limit: 20,
            activity_source_limit: 10,
            default_lead_time_days: 30,
            weights: RiskWeights::default(),
            contingency: ContingencyMultipliers::default(),
        }
    }
}

/// Category weights of the overall risk score (sum to 1.0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub quote_coverage: f64,
    pub timeline: f64,
    pub budget: f64,
    pub supply_chain: f64,
    pub quality: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            quote_coverage: 0.30,
            timeline: 0.15,
            budget: 0.25,
            supply_chain: 0.20,
            quality: 0.10,
        }
    }
}

/// Budget contingency multipliers applied to a projected overrun
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContingencyMultipliers {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
}

impl Default for ContingencyMultipliers {
    fn default() -> Self {
        Self {
            critical: 1.20,
            high: 1.15,
            medium: 1.10,
        }
    }
}

/// Scoring keys set by one configuration layer
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringOverrides {
    pub stale_after_days: Option<i64>,
    pub fresh_within_days: Option<i64>,
    pub per_vendor_admin_cost: Option<f64>,
    pub quality_min_rating: Option<f64>,
    pub low_rating_threshold: Option<f64>,
    pub balanced_cost_tolerance: Option<f64>,
    pub at_risk_window_days: Option<i64>,
    pub at_risk_coverage_percent: Option<f64>,
    pub activity_limit: Option<usize>,
    pub activity_source_limit: Option<usize>,
    pub default_lead_time_days: Option<i64>,
    pub weights: WeightOverrides,
    pub contingency: ContingencyOverrides,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WeightOverrides {
    pub quote_coverage: Option<f64>,
    pub timeline: Option<f64>,
    pub budget: Option<f64>,
    pub supply_chain: Option<f64>,
    pub quality: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContingencyOverrides {
    pub critical: Option<f64>,
    pub high: Option<f64>,
    pub medium: Option<f64>,
}

impl ScoringOverrides {
    /// Merge another layer into this one (other takes precedence per key)
    fn merge(&mut self, other: ScoringOverrides) {
        self.stale_after_days = other.stale_after_days.or(self.stale_after_days);
        self.fresh_within_days = other.fresh_within_days.or(self.fresh_within_days);
        self.per_vendor_admin_cost = other.per_vendor_admin_cost.or(self.per_vendor_admin_cost);
        self.quality_min_rating = other.quality_min_rating.or(self.quality_min_rating);
        self.low_rating_threshold = other.low_rating_threshold.or(self.low_rating_threshold);
        self.balanced_cost_tolerance = other
            .balanced_cost_tolerance
            .or(self.balanced_cost_tolerance);
        self.at_risk_window_days = other.at_risk_window_days.or(self.at_risk_window_days);
        self.at_risk_coverage_percent = other
            .at_risk_coverage_percent
            .or(self.at_risk_coverage_percent);
        self.activity_limit = other.activity_limit.or(self.activity_limit);
        self.activity_source_limit = other.activity_source_limit.or(self.activity_source_limit);
        self.default_lead_time_days = other.default_lead_time_days.or(self.default_lead_time_days);

        let w = other.weights;
        self.weights.quote_coverage = w.quote_coverage.or(self.weights.quote_coverage);
        self.weights.timeline = w.timeline.or(self.weights.timeline);
        self.weights.budget = w.budget.or(self.weights.budget);
        self.weights.supply_chain = w.supply_chain.or(self.weights.supply_chain);
        self.weights.quality = w.quality.or(self.weights.quality);

        let c = other.contingency;
        self.contingency.critical = c.critical.or(self.contingency.critical);
        self.contingency.high = c.high.or(self.contingency.high);
        self.contingency.medium = c.medium.or(self.contingency.medium);
    }

    /// Defaults with every set key applied
    pub fn resolve(&self) -> ScoringConfig {
        let d = ScoringConfig::default();
        ScoringConfig {
            stale_after_days: self.stale_after_days.unwrap_or(d.stale_after_days),
            fresh_within_days: self.fresh_within_days.unwrap_or(d.fresh_within_days),
            per_vendor_admin_cost: self.per_vendor_admin_cost.unwrap_or(d.per_vendor_admin_cost),
            quality_min_rating: self.quality_min_rating.unwrap_or(d.quality_min_rating),
            low_rating_threshold: self.low_rating_threshold.unwrap_or(d.low_rating_threshold),
            balanced_cost_tolerance: self
                .balanced_cost_tolerance
                .unwrap_or(d.balanced_cost_tolerance),
            at_risk_window_days: self.at_risk_window_days.unwrap_or(d.at_risk_window_days),
            at_risk_coverage_percent: self
                .at_risk_coverage_percent
                .unwrap_or(d.at_risk_coverage_percent),
            activity_limit: self.activity_limit.unwrap_or(d.activity_limit),
            activity_source_limit: self.activity_source_limit.unwrap_or(d.activity_source_limit),
            default_lead_time_days: self
                .default_lead_time_days
                .unwrap_or(d.default_lead_time_days),
            weights: RiskWeights {
                quote_coverage: self.weights.quote_coverage.unwrap_or(d.weights.quote_coverage),
                timeline: self.weights.timeline.unwrap_or(d.weights.timeline),
                budget: self.weights.budget.unwrap_or(d.weights.budget),
                supply_chain: self.weights.supply_chain.unwrap_or(d.weights.supply_chain),
                quality: self.weights.quality.unwrap_or(d.weights.quality),
            },
            contingency: ContingencyMultipliers {
                critical: self.contingency.critical.unwrap_or(d.contingency.critical),
                high: self.contingency.high.unwrap_or(d.contingency.high),
                medium: self.contingency.medium.unwrap_or(d.contingency.medium),
            },
        }
    }
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Global user config (~/.config/buyer/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 2. Explicit config file
        if let Ok(path) = std::env::var("BUYER_CONFIG") {
            if let Some(explicit) = Self::read_file(Path::new(&path)) {
                config.merge(explicit);
            }
        }

        // 3. Environment variables
        if let Ok(database) = std::env::var("BUYER_DATABASE") {
            config.database = Some(PathBuf::from(database));
        }
        if let Ok(format) = std::env::var("BUYER_FORMAT") {
            config.default_format = Some(format);
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!("Cannot read config {}: {}", path.display(), e);
                return None;
            }
        };
        match Self::parse(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("Ignoring invalid config {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Parse a YAML configuration document
    pub fn parse(contents: &str) -> Result<Config, serde_yml::Error> {
        serde_yml::from_str(contents)
    }

    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "buyer")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        self.scoring.merge(other.scoring);
    }

    /// Database path, falling back to the per-user data directory
    pub fn database_path(&self) -> PathBuf {
        if let Some(ref path) = self.database {
            return path.clone();
        }
        directories::ProjectDirs::from("", "", "buyer")
            .map(|dirs| dirs.data_dir().join("buyer.db"))
            .unwrap_or_else(|| PathBuf::from("buyer.db"))
    }

    /// Scoring model with every layer's overrides applied
    pub fn scoring(&self) -> ScoringConfig {
        self.scoring.resolve()
    }
}
