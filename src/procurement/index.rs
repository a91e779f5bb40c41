//! In-memory quote index for one project snapshot

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::core::entity::Id;
use crate::entities::Quote;

/// Quotes of a project's specifications, grouped by specification
///
/// Every group is ordered by USD price, then vendor id, then quote id, so the
/// first available quote of a specification is always its best quote.
#[derive(Debug, Clone, Default)]
pub struct QuoteIndex {
    all: BTreeMap<Id, Vec<Quote>>,
    available: BTreeMap<Id, Vec<Quote>>,
}

/// Total order used wherever quotes compete on price
pub fn price_order(a: &Quote, b: &Quote) -> Ordering {
    a.converted_price
        .total_cmp(&b.converted_price)
        .then(a.vendor_id.cmp(&b.vendor_id))
        .then(a.id.cmp(&b.id))
}

impl QuoteIndex {
    /// Group quotes by specification and split off the non-expired ones
    pub fn new(quotes: Vec<Quote>, now: DateTime<Utc>) -> Self {
        let mut all: BTreeMap<Id, Vec<Quote>> = BTreeMap::new();
        for quote in quotes {
            if let Some(spec_id) = quote.specification_id {
                all.entry(spec_id).or_default().push(quote);
            }
        }

        let mut available = BTreeMap::new();
        for (spec_id, quotes) in all.iter_mut() {
            quotes.sort_by(price_order);
            let live: Vec<Quote> = quotes
                .iter()
                .filter(|q| !q.is_expired(now))
                .cloned()
                .collect();
            available.insert(*spec_id, live);
        }

        Self { all, available }
    }

    /// Non-expired quotes for a specification, best first
    pub fn available(&self, specification_id: Id) -> &[Quote] {
        self.available
            .get(&specification_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every quote for a specification, expired included
    pub fn quotes(&self, specification_id: Id) -> &[Quote] {
        self.all
            .get(&specification_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every indexed quote, each exactly once
    pub fn iter(&self) -> impl Iterator<Item = &Quote> {
        self.all.values().flatten()
    }

    /// Vendors that quoted any indexed specification, by id
    pub fn vendors(&self) -> BTreeMap<Id, String> {
        self.iter()
            .map(|q| (q.vendor_id, q.vendor_name.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.all.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn quote(id: Id, vendor_id: Id, spec: Option<Id>, price: f64, expired: bool) -> Quote {
        Quote {
            id,
            vendor_id,
            vendor_name: format!("vendor{}", vendor_id),
            product_id: id,
            product_name: format!("P{}", id),
            specification_id: spec,
            price,
            currency: "USD".to_string(),
            converted_price: price,
            conversion_rate: 1.0,
            quote_date: now() - Duration::days(5),
            valid_until: expired.then(|| now() - Duration::days(1)),
            created_at: now() - Duration::days(5),
        }
    }

    #[test]
    fn test_groups_sorted_with_vendor_tiebreak() {
        let index = QuoteIndex::new(
            vec![
                quote(1, 3, Some(1), 10.0, false),
                quote(2, 2, Some(1), 10.0, false),
                quote(3, 1, Some(1), 12.0, false),
                quote(4, 1, Some(2), 5.0, false),
            ],
            now(),
        );

        let vendors: Vec<Id> = index.available(1).iter().map(|q| q.vendor_id).collect();
        assert_eq!(vendors, vec![2, 3, 1]);
        assert_eq!(index.available(2).len(), 1);
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_expired_quotes_kept_out_of_available() {
        let index = QuoteIndex::new(
            vec![
                quote(1, 1, Some(1), 1.0, true),
                quote(2, 2, Some(1), 9.0, false),
            ],
            now(),
        );
        assert_eq!(index.quotes(1).len(), 2);
        assert_eq!(index.available(1).len(), 1);
        assert_eq!(index.available(1)[0].id, 2);
    }

    #[test]
    fn test_quotes_without_specification_are_ignored() {
        let index = QuoteIndex::new(vec![quote(1, 1, None, 1.0, false)], now());
        assert!(index.is_empty());
        assert!(index.available(99).is_empty());
        assert!(index.vendors().is_empty());
    }
}
