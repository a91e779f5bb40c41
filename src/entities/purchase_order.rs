//! Purchase order entity - an accepted quote that has been ordered

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Id, OrderStatus};

/// A purchase order, joined with the quote it was placed against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: Id,
    pub quote_id: Id,

    pub vendor_id: Id,
    pub vendor_name: String,

    pub product_id: Id,
    pub product_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specification_id: Option<Id>,

    pub po_number: String,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_delivery: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_delivery: Option<DateTime<Utc>>,

    pub quantity: u32,

    /// USD unit price taken from the quote's converted price
    pub unit_price_usd: f64,

    pub created_at: DateTime<Utc>,
}

impl PurchaseOrder {
    /// Order value in USD
    pub fn value(&self) -> f64 {
        self.unit_price_usd * f64::from(self.quantity)
    }

    /// Delivered on or before the expected date; `None` until delivered
    pub fn delivered_on_time(&self) -> Option<bool> {
        let actual = self.actual_delivery?;
        Some(self.expected_delivery.map_or(true, |expected| actual <= expected))
    }

    /// Days between ordering and delivery
    pub fn lead_time_days(&self) -> Option<i64> {
        self.actual_delivery
            .map(|actual| (actual - self.order_date).num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn order() -> PurchaseOrder {
        let placed = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();
        PurchaseOrder {
            id: 1,
            quote_id: 1,
            vendor_id: 1,
            vendor_name: "Acme".to_string(),
            product_id: 1,
            product_name: "Widget".to_string(),
            specification_id: Some(1),
            po_number: "PO-1".to_string(),
            status: OrderStatus::Received,
            order_date: placed,
            expected_delivery: Some(placed + Duration::days(14)),
            actual_delivery: Some(placed + Duration::days(12)),
            quantity: 4,
            unit_price_usd: 25.0,
            created_at: placed,
        }
    }

    #[test]
    fn test_order_value_and_delivery() {
        let po = order();
        assert_eq!(po.value(), 100.0);
        assert_eq!(po.delivered_on_time(), Some(true));
        assert_eq!(po.lead_time_days(), Some(12));
    }

    #[test]
    fn test_late_and_undelivered_orders() {
        let mut late = order();
        late.actual_delivery = late.expected_delivery.map(|d| d + Duration::days(1));
        assert_eq!(late.delivered_on_time(), Some(false));

        let mut open = order();
        open.actual_delivery = None;
        assert_eq!(open.delivered_on_time(), None);
        assert_eq!(open.lead_time_days(), None);
    }
}
