use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

const STATEMENT: &str = "\
Date,Details,Amount,Debit/Credit
03 Jan 2024,Coffee Shop,10,Debit
05 Feb 2024,Coffee Shop,20,Debit
07 Mar 2024,Coffee Shop,30,Debit
08 Mar 2024,Monthly Salary,\"1,500.00\",Credit
09 Mar 2024,Bookstore,12.50,Debit
";

struct Sandbox {
    home: tempfile::TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let sandbox = Self {
            home: tempfile::tempdir().unwrap(),
        };
        let data_dir = sandbox.data_dir();
        sandbox
            .cmd()
            .args(["init", "--data-dir", data_dir.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("Initialized spendsight"));
        sandbox
    }

    fn data_dir(&self) -> PathBuf {
        self.home.path().join("data")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("spendsight").unwrap();
        cmd.env("HOME", self.home.path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }

    fn statement(&self, body: &str) -> PathBuf {
        let path = self.home.path().join("statement.csv");
        std::fs::write(&path, body).unwrap();
        path
    }
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_init_writes_empty_category_file() {
    let sb = Sandbox::new();
    let content = std::fs::read_to_string(sb.data_dir().join("categories.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json, serde_json::json!({ "Uncategorized": [] }));
}

#[test]
fn test_categories_add_and_learn() {
    let sb = Sandbox::new();
    sb.cmd()
        .args(["categories", "add", "Food"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added category: Food"));
    sb.cmd()
        .args(["categories", "learn", "Food", "coffee shop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Learned"));
    sb.cmd()
        .args(["categories", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("coffee shop"));
}

#[test]
fn test_duplicate_category_fails() {
    let sb = Sandbox::new();
    sb.cmd().args(["categories", "add", "Food"]).assert().success();
    sb.cmd()
        .args(["categories", "add", "Food"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Category already exists: Food"));
}

#[test]
fn test_budget_and_forecast_end_to_end() {
    let sb = Sandbox::new();
    let file = sb.statement(STATEMENT);
    sb.cmd().args(["categories", "add", "Food"]).assert().success();
    sb.cmd()
        .args(["categories", "learn", "Food", "coffee shop"])
        .assert()
        .success();

    sb.cmd()
        .args(["budget", path_arg(&file)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Overspending"))
        .stdout(predicate::str::contains("Reduce expenses in Food."))
        .stdout(predicate::str::contains("+50.0%"));

    sb.cmd()
        .args(["forecast", path_arg(&file)])
        .assert()
        .success()
        .stdout(predicate::str::contains("40.00 PKR"))
        .stdout(predicate::str::contains("Bookstore").not());
}

#[test]
fn test_payments_total() {
    let sb = Sandbox::new();
    let file = sb.statement(STATEMENT);
    sb.cmd()
        .args(["payments", path_arg(&file)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Payments: 1,500.00 PKR"));
}

#[test]
fn test_recategorize_learns_keyword() {
    let sb = Sandbox::new();
    let file = sb.statement(STATEMENT);
    sb.cmd().args(["categories", "add", "Books"]).assert().success();
    sb.cmd()
        .args(["recategorize", path_arg(&file), "--set", "5=Books"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 row(s) recategorized"));

    let content = std::fs::read_to_string(sb.data_dir().join("categories.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json["Books"], serde_json::json!(["Bookstore"]));
}

#[test]
fn test_recategorize_notes_row_kept_by_earlier_category() {
    let sb = Sandbox::new();
    let file = sb.statement(STATEMENT);
    sb.cmd().args(["categories", "add", "Food"]).assert().success();
    sb.cmd()
        .args(["categories", "learn", "Food", "coffee shop"])
        .assert()
        .success();
    sb.cmd().args(["categories", "add", "Drinks"]).assert().success();
    sb.cmd()
        .args(["recategorize", path_arg(&file), "--set", "1=Drinks"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 row(s) recategorized"))
        .stdout(predicate::str::contains(
            "Note: row 1 is classified as Food, not Drinks",
        ));
}

#[test]
fn test_recategorize_unknown_category_fails() {
    let sb = Sandbox::new();
    let file = sb.statement(STATEMENT);
    sb.cmd()
        .args(["recategorize", path_arg(&file), "--set", "1=Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown category: Nope"));
}

#[test]
fn test_malformed_batch_reports_single_error() {
    let sb = Sandbox::new();
    let file = sb.statement("Date,Details,Amount,Debit/Credit\n03 Jan 2024,Coffee Shop,ten,Debit\n");
    sb.cmd()
        .args(["expenses", path_arg(&file)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed amount on row 1"));
}

#[test]
fn test_missing_column_reported() {
    let sb = Sandbox::new();
    let file = sb.statement("Date,Details,Amount\n03 Jan 2024,Coffee Shop,10\n");
    sb.cmd()
        .args(["expenses", path_arg(&file)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing column: Debit/Credit"));
}

#[test]
fn test_forecast_needs_two_months() {
    let sb = Sandbox::new();
    let file = sb.statement("Date,Details,Amount,Debit/Credit\n03 Jan 2024,Coffee Shop,10,Debit\n");
    sb.cmd()
        .args(["forecast", path_arg(&file)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Need at least 2 months"));
}

#[test]
fn test_export_writes_tables() {
    let sb = Sandbox::new();
    let file = sb.statement(STATEMENT);
    let out = sb.home.path().join("out");
    sb.cmd()
        .args(["export", path_arg(&file), "--out-dir", path_arg(&out)])
        .assert()
        .success();
    for name in ["transactions.csv", "totals.csv", "budget.csv", "forecast.csv"] {
        assert!(out.join(name).exists(), "missing {name}");
    }
    let txns = std::fs::read_to_string(out.join("transactions.csv")).unwrap();
    assert!(txns.starts_with("row,date,details,amount,flow,category"));
    assert_eq!(txns.lines().count(), 6);
}

#[test]
fn test_export_single_month_keeps_forecast_header() {
    let sb = Sandbox::new();
    let file = sb.statement("Date,Details,Amount,Debit/Credit\n03 Jan 2024,Coffee Shop,10,Debit\n");
    let out = sb.home.path().join("out");
    sb.cmd()
        .args(["export", path_arg(&file), "--out-dir", path_arg(&out)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Forecast: need at least 2 months"));
    let forecast = std::fs::read_to_string(out.join("forecast.csv")).unwrap();
    assert_eq!(forecast, "category,predicted_amount\n");
}

#[test]
fn test_sqlite_store_persists_categories() {
    let sb = Sandbox::new();
    let data_dir = sb.data_dir();
    sb.cmd()
        .args(["init", "--data-dir", path_arg(&data_dir), "--store", "sqlite"])
        .assert()
        .success();
    sb.cmd().args(["categories", "add", "Travel"]).assert().success();
    assert!(data_dir.join("categories.db").exists());
    sb.cmd()
        .args(["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sqlite"))
        .stdout(predicate::str::contains("Travel"));
}
