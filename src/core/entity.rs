//! Value enums shared across entities and the procurement engine

use serde::{Deserialize, Serialize};

/// Row identifier used by every persisted record
pub type Id = i64;

/// Qualitative risk label
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Fixed 0-100 ladder used by the weighted project score
    pub fn score(self) -> f64 {
        match self {
            RiskLevel::Critical => 100.0,
            RiskLevel::High => 75.0,
            RiskLevel::Medium => 50.0,
            RiskLevel::Low => 25.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            _ => Err(format!("Unknown risk level: {}", s)),
        }
    }
}

/// Vendor selection policy for a project
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Default,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    #[value(name = "lowest_cost")]
    LowestCost,
    #[value(name = "fewest_vendors")]
    FewestVendors,
    #[value(name = "balanced")]
    Balanced,
    #[value(name = "quality_focused")]
    QualityFocused,
}

impl Strategy {
    pub fn all() -> &'static [Strategy] {
        &[
            Strategy::LowestCost,
            Strategy::FewestVendors,
            Strategy::Balanced,
            Strategy::QualityFocused,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::LowestCost => "lowest_cost",
            Strategy::FewestVendors => "fewest_vendors",
            Strategy::Balanced => "balanced",
            Strategy::QualityFocused => "quality_focused",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lowest_cost" => Ok(Strategy::LowestCost),
            "fewest_vendors" => Ok(Strategy::FewestVendors),
            "balanced" => Ok(Strategy::Balanced),
            "quality_focused" => Ok(Strategy::QualityFocused),
            _ => Err(format!("Unknown strategy: {}", s)),
        }
    }
}

/// Age bucket of a quote, derived at read time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteFreshness {
    Fresh,
    Stale,
    Expired,
}

impl std::fmt::Display for QuoteFreshness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuoteFreshness::Fresh => write!(f, "fresh"),
            QuoteFreshness::Stale => write!(f, "stale"),
            QuoteFreshness::Expired => write!(f, "expired"),
        }
    }
}

/// Purchase order lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Approved,
    Ordered,
    Shipped,
    Received,
    Cancelled,
}

impl OrderStatus {
    /// Orders that still count as committed spend
    pub fn is_committed(self) -> bool {
        self != OrderStatus::Cancelled
    }

    /// Orders placed but not yet delivered
    pub fn is_open(self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Approved | OrderStatus::Ordered | OrderStatus::Shipped
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Approved => "approved",
            OrderStatus::Ordered => "ordered",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Received => "received",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "approved" => Ok(OrderStatus::Approved),
            "ordered" => Ok(OrderStatus::Ordered),
            "shipped" => Ok(OrderStatus::Shipped),
            "received" => Ok(OrderStatus::Received),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(format!("Unknown order status: {}", s)),
        }
    }
}

/// Procurement progress of a single requisition line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProcurementStatus {
    #[default]
    Pending,
    Quoted,
    Ordered,
    Received,
    Cancelled,
}

impl ProcurementStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcurementStatus::Pending => "pending",
            ProcurementStatus::Quoted => "quoted",
            ProcurementStatus::Ordered => "ordered",
            ProcurementStatus::Received => "received",
            ProcurementStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ProcurementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProcurementStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ProcurementStatus::Pending),
            "quoted" => Ok(ProcurementStatus::Quoted),
            "ordered" => Ok(ProcurementStatus::Ordered),
            "received" => Ok(ProcurementStatus::Received),
            "cancelled" => Ok(ProcurementStatus::Cancelled),
            _ => Err(format!("Unknown procurement status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_ordering_matches_ladder() {
        let levels = [
            RiskLevel::Low,
            RiskLevel::Medium,
            RiskLevel::High,
            RiskLevel::Critical,
        ];
        for pair in levels.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].score() < pair[1].score());
        }
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("balanced".parse::<Strategy>().unwrap(), Strategy::Balanced);
        assert_eq!(
            "QUALITY_FOCUSED".parse::<Strategy>().unwrap(),
            Strategy::QualityFocused
        );
        assert!("cheapest".parse::<Strategy>().is_err());
        assert_eq!(Strategy::default(), Strategy::LowestCost);
    }

    #[test]
    fn test_strategy_serialization() {
        let json = serde_json::to_string(&Strategy::FewestVendors).unwrap();
        assert_eq!(json, "\"fewest_vendors\"");
    }

    #[test]
    fn test_order_status_committed() {
        assert!(OrderStatus::Received.is_committed());
        assert!(!OrderStatus::Cancelled.is_committed());
        assert!(OrderStatus::Shipped.is_open());
        assert!(!OrderStatus::Received.is_open());
    }
}
