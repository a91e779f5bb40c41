use super::*;
use crate::core::entity::{OrderStatus, ProcurementStatus};
use crate::core::ProcurementError;
use chrono::{Duration, TimeZone};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

const DATASET: &str = r#"
vendors:
  - name: Acme
  - name: Globex
    currency: EUR
specifications:
  - name: Widget A
  - name: Widget B
products:
  - name: A-100
    brand: Acme Brand
    specification: Widget A
  - name: A-200
    specification: Widget A
  - name: B-100
    specification: Widget B
quotes:
  - vendor: Acme
    product: A-100
    price: 10.0
    quote_date: 2025-05-20T00:00:00Z
  - vendor: Globex
    product: A-200
    price: 8.0
    conversion_rate: 1.1
    quote_date: 2025-05-25T00:00:00Z
  - vendor: Globex
    product: A-100
    price: 5.0
    quote_date: 2024-01-01T00:00:00Z
    valid_until: 2024-03-01T00:00:00Z
  - vendor: Acme
    product: B-100
    price: 20.0
projects:
  - name: Rollout
    budget: 5000
    deadline: 2025-09-01T00:00:00Z
    status: active
    bom:
      - specification: Widget A
        quantity: 100
      - specification: Widget B
        quantity: 10
    requisitions:
      - name: Phase 1
        items:
          - specification: Widget A
            quantity: 40
            target_unit_price: 12.0
            status: ordered
purchase_orders:
  - po_number: PO-1
    vendor: Acme
    product: A-100
    quantity: 40
    status: received
    order_date: 2025-05-21T00:00:00Z
ratings:
  - vendor: Acme
    po_number: PO-1
    quality: 5
    delivery: 4
"#;

fn seeded() -> SqliteStore {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let dataset = Dataset::from_yaml(DATASET).unwrap();
    store.load_dataset(&dataset, now()).unwrap();
    store
}

#[test]
fn test_schema_version_recorded() {
    let store = SqliteStore::open_in_memory().unwrap();
    assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
}

#[test]
fn test_open_file_database_is_reusable() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nested").join("buyer.db");
    {
        let mut store = SqliteStore::open(&path).unwrap();
        let dataset = Dataset::from_yaml(DATASET).unwrap();
        store.load_dataset(&dataset, now()).unwrap();
    }
    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(store.list_projects().unwrap(), vec![(1, "Rollout".to_string())]);
}

#[test]
fn test_project_loads_bom_and_requisitions() {
    let store = seeded();
    let project = store.project(1).unwrap();

    assert_eq!(project.name, "Rollout");
    assert_eq!(project.budget, 5000.0);
    assert_eq!(project.bom_items().len(), 2);
    assert_eq!(project.bom_items()[0].specification.name, "Widget A");
    assert_eq!(project.requisitions.len(), 1);

    let line = &project.requisitions[0].items[0];
    assert_eq!(line.quantity_requested, 40);
    assert_eq!(line.target_unit_price, Some(12.0));
    assert_eq!(line.procurement_status, ProcurementStatus::Ordered);
    assert_eq!(line.bom_item_id, project.bom_items()[0].id);
}

#[test]
fn test_unknown_ids_are_not_found() {
    let store = seeded();
    assert!(store.project(99).unwrap_err().is_not_found());
    assert!(store.bom_item(99).unwrap_err().is_not_found());
    assert!(store.get_or_create_strategy(99).unwrap_err().is_not_found());
}

#[test]
fn test_bom_item_reports_owner() {
    let store = seeded();
    let (item, project_id) = store.bom_item(2).unwrap();
    assert_eq!(item.specification.name, "Widget B");
    assert_eq!(item.quantity, 10);
    assert_eq!(project_id, 1);
}

#[test]
fn test_available_quotes_skip_expired_and_sort_by_usd() {
    let store = seeded();
    let quotes = store.quotes_for_specification(1, now()).unwrap();

    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes[0].vendor_name, "Globex");
    assert!((quotes[0].converted_price - 8.8).abs() < 1e-9);
    assert_eq!(quotes[0].currency, "EUR");
    assert_eq!(quotes[1].vendor_name, "Acme");

    let all = store.quotes_for_specifications(&[1, 2]).unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(all[0].converted_price, 5.0);
    assert!(store.quotes_for_specifications(&[]).unwrap().is_empty());
}

#[test]
fn test_quote_date_defaults_to_load_time() {
    let store = seeded();
    let quotes = store.quotes_for_specification(2, now()).unwrap();
    assert_eq!(quotes[0].quote_date, now());
    assert_eq!(quotes[0].valid_until, None);
}

#[test]
fn test_purchase_orders_priced_from_quote() {
    let store = seeded();
    let orders = store.purchase_orders_for_specifications(&[1, 2]).unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::Received);
    assert_eq!(orders[0].vendor_name, "Acme");
    assert_eq!(orders[0].value(), 400.0);
}

#[test]
fn test_vendor_ratings() {
    let store = seeded();
    let ratings = store.vendor_ratings(1).unwrap();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0].quality_rating, Some(5));
    assert_eq!(ratings[0].price_rating, None);
    assert_eq!(ratings[0].purchase_order_id, Some(1));
    assert!(store.vendor_ratings(2).unwrap().is_empty());
}

#[test]
fn test_get_or_create_strategy_is_idempotent() {
    let store = seeded();
    let first = store.get_or_create_strategy(1).unwrap();
    let second = store.get_or_create_strategy(1).unwrap();

    assert_eq!(first.strategy, Strategy::LowestCost);
    assert_eq!(first.id, second.id);

    let count: i64 = store
        .conn
        .query_row("SELECT COUNT(*) FROM procurement_strategies", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_get_or_create_strategy_across_connections() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("buyer.db");
    {
        let mut store = SqliteStore::open(&path).unwrap();
        store
            .load_dataset(&Dataset::from_yaml(DATASET).unwrap(), now())
            .unwrap();
    }

    let barrier = std::sync::Barrier::new(2);
    let (first, second) = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let path = &path;
                let barrier = &barrier;
                scope.spawn(move || {
                    let store = SqliteStore::open(path).unwrap();
                    barrier.wait();
                    store.get_or_create_strategy(1).unwrap()
                })
            })
            .collect();
        let mut results = handles.into_iter().map(|h| h.join().unwrap());
        (results.next().unwrap(), results.next().unwrap())
    });

    assert_eq!(first, second);
    assert_eq!(first.strategy, Strategy::LowestCost);

    let store = SqliteStore::open(&path).unwrap();
    let count: i64 = store
        .conn
        .query_row(
            "SELECT COUNT(*) FROM procurement_strategies WHERE project_id = 1",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_set_strategy_replaces_selection() {
    let store = seeded();
    let created = store.get_or_create_strategy(1).unwrap();
    let updated = store.set_strategy(1, Strategy::Balanced).unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.strategy, Strategy::Balanced);
    assert_eq!(
        store.get_or_create_strategy(1).unwrap().strategy,
        Strategy::Balanced
    );
    assert!(store.set_strategy(42, Strategy::Balanced).is_err());
}

#[test]
fn test_dangling_reference_rolls_back() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let dataset = Dataset::from_yaml(
        r#"
vendors:
  - name: Acme
quotes:
  - vendor: Acme
    product: Missing
    price: 1.0
"#,
    )
    .unwrap();

    let err = store.load_dataset(&dataset, now()).unwrap_err();
    assert!(matches!(err, ProcurementError::Dataset { .. }));
    assert!(err.to_string().contains("Missing"));

    let vendors: i64 = store
        .conn
        .query_row("SELECT COUNT(*) FROM vendors", [], |row| row.get(0))
        .unwrap();
    assert_eq!(vendors, 0);
}

#[test]
fn test_requisition_must_reference_bom_line() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let dataset = Dataset::from_yaml(
        r#"
specifications:
  - name: Widget A
projects:
  - name: P
    bom:
      - specification: Widget A
        quantity: 1
    requisitions:
      - name: R
        items:
          - specification: Widget Z
            quantity: 1
"#,
    )
    .unwrap();
    let err = store.load_dataset(&dataset, now() - Duration::days(1)).unwrap_err();
    assert!(err.to_string().contains("Widget Z"));
}
