//! Quote entity - a vendor's price observation for a product

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{Id, QuoteFreshness};

/// A named category of interchangeable products (e.g. "Laptop Model")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    pub id: Id,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A Quote entity, joined with its vendor and product names
///
/// Quotes are immutable once created; freshness is derived from the
/// clock passed in by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: Id,

    pub vendor_id: Id,
    pub vendor_name: String,

    pub product_id: Id,
    pub product_name: String,

    /// Specification of the quoted product, if it has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specification_id: Option<Id>,

    /// Price in the quote currency
    pub price: f64,

    /// ISO 4217 currency code
    pub currency: String,

    /// Price normalized to USD
    pub converted_price: f64,

    pub conversion_rate: f64,

    pub quote_date: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl Quote {
    /// Past its `valid_until` date
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.valid_until.is_some_and(|until| now > until)
    }

    /// Expired, or older than `stale_after_days`
    pub fn is_stale(&self, now: DateTime<Utc>, stale_after_days: i64) -> bool {
        self.is_expired(now) || now - self.quote_date > Duration::days(stale_after_days)
    }

    /// Whole days since the quote date (never negative)
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.quote_date).num_days().max(0)
    }

    /// Bucket the quote by age and validity
    pub fn freshness(&self, now: DateTime<Utc>, fresh_within_days: i64) -> QuoteFreshness {
        if self.is_expired(now) {
            QuoteFreshness::Expired
        } else if now - self.quote_date > Duration::days(fresh_within_days) {
            QuoteFreshness::Stale
        } else {
            QuoteFreshness::Fresh
        }
    }

    /// Whole days until expiry, `None` when open-ended
    pub fn days_until_expiration(&self, now: DateTime<Utc>) -> Option<i64> {
        self.valid_until.map(|until| (until - now).num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn quote(age_days: i64, valid_until: Option<DateTime<Utc>>) -> Quote {
        Quote {
            id: 1,
            vendor_id: 1,
            vendor_name: "Acme".to_string(),
            product_id: 1,
            product_name: "Widget".to_string(),
            specification_id: Some(1),
            price: 10.0,
            currency: "USD".to_string(),
            converted_price: 10.0,
            conversion_rate: 1.0,
            quote_date: now() - Duration::days(age_days),
            valid_until,
            created_at: now() - Duration::days(age_days),
        }
    }

    #[test]
    fn test_freshness_buckets() {
        let fresh = quote(10, None);
        let stale = quote(100, Some(now() + Duration::days(5)));
        let expired = quote(200, Some(now() - Duration::days(20)));

        assert_eq!(fresh.freshness(now(), 30), QuoteFreshness::Fresh);
        assert_eq!(stale.freshness(now(), 30), QuoteFreshness::Stale);
        assert_eq!(expired.freshness(now(), 30), QuoteFreshness::Expired);
    }

    #[test]
    fn test_open_ended_old_quote_is_stale_not_expired() {
        let q = quote(100, None);
        assert!(!q.is_expired(now()));
        assert!(q.is_stale(now(), 90));
        assert_eq!(q.freshness(now(), 30), QuoteFreshness::Stale);
    }

    #[test]
    fn test_is_stale_threshold() {
        assert!(!quote(60, None).is_stale(now(), 90));
        assert!(quote(91, None).is_stale(now(), 90));
        assert!(quote(1, Some(now() - Duration::days(1))).is_stale(now(), 90));
    }

    #[test]
    fn test_age_and_expiry_days() {
        let q = quote(12, Some(now() + Duration::days(3)));
        assert_eq!(q.age_days(now()), 12);
        assert_eq!(q.days_until_expiration(now()), Some(3));
        assert_eq!(quote(1, None).days_until_expiration(now()), None);
    }
}
