//! Vendor entity and performance ratings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Id;

/// A selling entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: Id,
    pub name: String,
    /// ISO 4217 currency code the vendor quotes in
    pub currency: String,
}

/// One rating of a vendor on a 1-5 scale; every dimension is optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorRating {
    pub id: Id,
    pub vendor_id: Id,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_order_id: Option<Id>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_rating: Option<u8>,

    pub created_at: DateTime<Utc>,
}

/// Ratings aggregated on read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub vendor_id: Id,
    pub total_ratings: usize,
    pub avg_price: Option<f64>,
    pub avg_quality: Option<f64>,
    pub avg_delivery: Option<f64>,
    pub avg_service: Option<f64>,
    /// Mean of the dimension averages that are present
    pub overall: f64,
}

impl RatingSummary {
    /// Aggregate a vendor's ratings
    pub fn from_ratings(vendor_id: Id, ratings: &[VendorRating]) -> Self {
        fn mean(values: impl Iterator<Item = u8>) -> Option<f64> {
            let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + f64::from(v), c + 1));
            (count > 0).then(|| sum / count as f64)
        }

        let avg_price = mean(ratings.iter().filter_map(|r| r.price_rating));
        let avg_quality = mean(ratings.iter().filter_map(|r| r.quality_rating));
        let avg_delivery = mean(ratings.iter().filter_map(|r| r.delivery_rating));
        let avg_service = mean(ratings.iter().filter_map(|r| r.service_rating));

        let present: Vec<f64> = [avg_price, avg_quality, avg_delivery, avg_service]
            .into_iter()
            .flatten()
            .collect();
        let overall = if present.is_empty() {
            0.0
        } else {
            present.iter().sum::<f64>() / present.len() as f64
        };

        Self {
            vendor_id,
            total_ratings: ratings.len(),
            avg_price,
            avg_quality,
            avg_delivery,
            avg_service,
            overall,
        }
    }

    pub fn is_rated(&self) -> bool {
        self.total_ratings > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(price: Option<u8>, quality: Option<u8>, delivery: Option<u8>) -> VendorRating {
        VendorRating {
            id: 0,
            vendor_id: 7,
            purchase_order_id: None,
            price_rating: price,
            quality_rating: quality,
            delivery_rating: delivery,
            service_rating: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_averages_present_dimensions() {
        let summary = RatingSummary::from_ratings(
            7,
            &[rating(Some(4), Some(5), None), rating(Some(2), None, Some(3))],
        );
        assert_eq!(summary.total_ratings, 2);
        assert_eq!(summary.avg_price, Some(3.0));
        assert_eq!(summary.avg_quality, Some(5.0));
        assert_eq!(summary.avg_delivery, Some(3.0));
        assert_eq!(summary.avg_service, None);
        assert!((summary.overall - 11.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_unrated() {
        let summary = RatingSummary::from_ratings(7, &[]);
        assert!(!summary.is_rated());
        assert_eq!(summary.overall, 0.0);
    }
}
