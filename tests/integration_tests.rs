//! Integration tests for the buyer CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const AS_OF: &str = "2025-06-01T12:00:00Z";

const DATASET: &str = r#"
vendors:
  - name: vendor1
  - name: vendor2
  - name: vendor3
specifications:
  - name: Widget A
  - name: Widget B
  - name: Widget C
  - name: Gadget
products:
  - { name: A-1, specification: Widget A }
  - { name: B-1, specification: Widget B }
  - { name: C-1, specification: Widget C }
  - { name: G-1, specification: Gadget }
quotes:
  - { vendor: vendor1, product: A-1, price: 100.0 }
  - { vendor: vendor2, product: B-1, price: 200.0 }
  - { vendor: vendor2, product: C-1, price: 75.0 }
  - { vendor: vendor3, product: A-1, price: 110.0 }
  - { vendor: vendor3, product: B-1, price: 210.0 }
  - { vendor: vendor3, product: C-1, price: 80.0 }
  - { vendor: vendor1, product: G-1, price: 10.0, quote_date: 2025-05-22T12:00:00Z }
projects:
  - name: Rollout
    budget: 40000
    deadline: 2025-09-01T00:00:00Z
    bom:
      - { specification: Widget A, quantity: 100 }
      - { specification: Widget B, quantity: 50 }
      - { specification: Widget C, quantity: 200 }
    requisitions:
      - name: Phase 1
        items:
          - { specification: Widget A, quantity: 50, target_unit_price: 120.0 }
  - name: Lab
    budget: 10
    bom:
      - { specification: Gadget, quantity: 5 }
purchase_orders:
  - po_number: PO-1
    vendor: vendor1
    product: A-1
    quantity: 40
    status: received
    order_date: 2025-05-01T00:00:00Z
    expected_delivery: 2025-05-20T00:00:00Z
    actual_delivery: 2025-05-15T00:00:00Z
ratings:
  - { vendor: vendor1, po_number: PO-1, quality: 5, delivery: 4 }
"#;

/// Helper to get a buyer command isolated from the caller's environment
fn buyer() -> Command {
    let mut cmd = Command::cargo_bin("buyer").unwrap();
    cmd.env_remove("BUYER_DATABASE")
        .env_remove("BUYER_FORMAT")
        .env_remove("BUYER_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

/// A temp directory holding a seeded database
struct Fixture {
    _tmp: TempDir,
    db: PathBuf,
}

impl Fixture {
    fn seeded() -> Self {
        let tmp = TempDir::new().unwrap();
        let db = tmp.path().join("buyer.db");
        let dataset = tmp.path().join("dataset.yaml");
        fs::write(&dataset, DATASET).unwrap();

        buyer()
            .arg("--database")
            .arg(&db)
            .args(["--as-of", AS_OF, "seed"])
            .arg(&dataset)
            .assert()
            .success()
            .stdout(predicate::str::contains("Rollout"));

        Self { _tmp: tmp, db }
    }

    fn cmd(&self) -> Command {
        let mut cmd = buyer();
        cmd.arg("--database").arg(&self.db).args(["--as-of", AS_OF]);
        cmd
    }

    fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.cmd().args(["-f", "json"]).args(args).output().unwrap();
        assert!(
            output.status.success(),
            "{}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    buyer()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("recommend"))
        .stdout(predicate::str::contains("dashboard"));
}

#[test]
fn test_version_displays() {
    buyer()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("buyer"));
}

#[test]
fn test_init_creates_database() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("nested").join("buyer.db");

    buyer()
        .arg("--database")
        .arg(&db)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized procurement database"));

    assert!(db.exists());
}

#[test]
fn test_completions_bash() {
    buyer()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("buyer"));
}

// ============================================================================
// Seeding
// ============================================================================

#[test]
fn test_seed_json_reports_counts() {
    let tmp = TempDir::new().unwrap();
    let dataset = tmp.path().join("dataset.yaml");
    fs::write(&dataset, DATASET).unwrap();

    let output = buyer()
        .arg("--database")
        .arg(tmp.path().join("buyer.db"))
        .args(["-f", "json", "seed"])
        .arg(&dataset)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["loaded"]["vendors"], 3);
    assert_eq!(report["loaded"]["quotes"], 7);
    assert_eq!(report["projects"][0]["name"], "Rollout");
    assert_eq!(report["projects"][1]["id"], 2);
}

#[test]
fn test_seed_unknown_vendor_fails() {
    let tmp = TempDir::new().unwrap();
    let dataset = tmp.path().join("bad.yaml");
    fs::write(
        &dataset,
        "specifications:\n  - name: S\nproducts:\n  - { name: P, specification: S }\nquotes:\n  - { vendor: ghost, product: P, price: 1.0 }\n",
    )
    .unwrap();

    buyer()
        .arg("--database")
        .arg(tmp.path().join("buyer.db"))
        .arg("seed")
        .arg(&dataset)
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost"));
}

// ============================================================================
// Analysis Commands
// ============================================================================

#[test]
fn test_analyze_json() {
    let fx = Fixture::seeded();
    let comparison = fx.json(&["analyze", "1"]);

    assert_eq!(comparison["project_name"], "Rollout");
    assert_eq!(comparison["strategy"], "lowest_cost");
    assert_eq!(comparison["total_bom_items"], 3);
    assert_eq!(comparison["recommended_cost"], 35000.0);
    assert_eq!(comparison["worst_case_cost"], 37500.0);
    assert_eq!(comparison["savings_vs_budget"], 5000.0);
    assert_eq!(comparison["total_vendors_needed"], 2);
}

#[test]
fn test_analyze_human_output() {
    let fx = Fixture::seeded();
    fx.cmd()
        .args(["analyze", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Procurement Analysis: Rollout"))
        .stdout(predicate::str::contains("$35,000.00"))
        .stdout(predicate::str::contains("Widget B"));
}

#[test]
fn test_analyze_tsv_is_one_row_per_item() {
    let fx = Fixture::seeded();
    let output = fx.cmd().args(["-f", "tsv", "analyze", "1"]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("ID\tSPECIFICATION"));
    assert!(lines[1].contains("Widget A"));
}

#[test]
fn test_analyze_unknown_project_fails() {
    let fx = Fixture::seeded();
    fx.cmd()
        .args(["analyze", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_item_json() {
    let fx = Fixture::seeded();
    let analysis = fx.json(&["item", "1"]);

    assert_eq!(analysis["specification"]["name"], "Widget A");
    assert_eq!(analysis["total_quantity_planned"], 50);
    assert_eq!(analysis["coverage_percent"], 50.0);
    assert_eq!(analysis["available_quotes"].as_array().unwrap().len(), 2);
    assert_eq!(analysis["best_quote"]["vendor_name"], "vendor1");
}

#[test]
fn test_recommend_with_strategy() {
    let fx = Fixture::seeded();
    let plan = fx.json(&["recommend", "1", "--strategy", "fewest_vendors"]);

    assert_eq!(plan["strategy"], "fewest_vendors");
    assert_eq!(plan["vendor_count"], 1);
    assert_eq!(plan["total_cost"], 37500.0);
    assert_eq!(plan["recommendations"][0]["vendor_name"], "vendor3");
}

#[test]
fn test_recommend_markdown() {
    let fx = Fixture::seeded();
    fx.cmd()
        .args(["-f", "md", "recommend", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("| PRIORITY"))
        .stdout(predicate::str::contains("vendor2"));
}

#[test]
fn test_scenarios_cover_every_strategy() {
    let fx = Fixture::seeded();
    let scenarios = fx.json(&["scenarios", "1"]);
    let scenarios = scenarios.as_array().unwrap();

    assert_eq!(scenarios.len(), 4);
    let strategies: Vec<&str> = scenarios
        .iter()
        .map(|s| s["strategy"].as_str().unwrap())
        .collect();
    assert_eq!(
        strategies,
        ["lowest_cost", "fewest_vendors", "balanced", "quality_focused"]
    );
    assert_eq!(scenarios[0]["savings_vs_budget"], 5000.0);
}

#[test]
fn test_savings_json() {
    let fx = Fixture::seeded();
    let savings = fx.json(&["savings", "1"]);

    assert_eq!(savings["total_savings"], 1000.0);
    assert_eq!(savings["savings_by_vendor"]["vendor1"], 1000.0);
    assert_eq!(savings["line_items"].as_array().unwrap().len(), 3);
}

#[test]
fn test_risks_json_has_every_category() {
    let fx = Fixture::seeded();
    let risks = fx.json(&["risks", "1"]);

    let categories = risks["category_risks"].as_object().unwrap();
    for key in ["quote_coverage", "timeline", "budget", "supply_chain", "quality"] {
        assert!(categories.contains_key(key), "missing {}", key);
    }
    let score = risks["risk_score"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&score));
}

#[test]
fn test_dashboard_json() {
    let fx = Fixture::seeded();
    let dashboard = fx.json(&["dashboard", "1"]);

    assert_eq!(dashboard["project_name"], "Rollout");
    assert_eq!(dashboard["progress"]["days_to_deadline"], 91);
    assert_eq!(dashboard["financial"]["committed"], 4000.0);
    assert_eq!(dashboard["procurement"]["average_lead_time_days"], 14);
}

#[test]
fn test_dashboard_human_output() {
    let fx = Fixture::seeded();
    fx.cmd()
        .args(["dashboard", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dashboard: Lab"))
        .stdout(predicate::str::contains("FINANCIAL"));
}

// ============================================================================
// Strategy Management
// ============================================================================

#[test]
fn test_strategy_defaults_then_set() {
    let fx = Fixture::seeded();

    let shown = fx.json(&["strategy", "show", "1"]);
    assert_eq!(shown["strategy"], "lowest_cost");

    fx.cmd()
        .args(["strategy", "set", "1", "balanced"])
        .assert()
        .success()
        .stdout(predicate::str::contains("balanced"));

    let comparison = fx.json(&["analyze", "1"]);
    assert_eq!(comparison["strategy"], "balanced");
    assert_eq!(comparison["total_vendors_needed"], 1);
}

#[test]
fn test_strategy_rejects_unknown_value() {
    let fx = Fixture::seeded();
    fx.cmd()
        .args(["strategy", "set", "1", "cheapest"])
        .assert()
        .failure();
}
