use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::budget;
use crate::cli::{load_batch, open_categorizer};
use crate::error::Result;
use crate::forecast;
use crate::models::{DeviationRow, Flow, ForecastRow, Report, Transaction};
use crate::reports;
use crate::settings::load_settings;

#[derive(Serialize)]
struct TransactionRecord<'a> {
    row: usize,
    date: String,
    details: &'a str,
    amount: f64,
    flow: &'a str,
    category: &'a str,
}

impl<'a> From<&'a Transaction> for TransactionRecord<'a> {
    fn from(t: &'a Transaction) -> Self {
        Self {
            row: t.index,
            date: t.date.format("%Y-%m-%d").to_string(),
            details: &t.details,
            amount: t.amount,
            flow: t.flow.as_str(),
            category: &t.category,
        }
    }
}

#[derive(Serialize)]
struct TotalRecord<'a> {
    category: &'a str,
    amount: f64,
}

#[derive(Serialize)]
struct BudgetRecord<'a> {
    category: &'a str,
    last_month_amount: f64,
    average_amount: f64,
    deviation_pct: Option<f64>,
    suggested_budget: f64,
    status: &'a str,
    recommendation: &'a str,
}

impl<'a> From<&'a DeviationRow> for BudgetRecord<'a> {
    fn from(r: &'a DeviationRow) -> Self {
        Self {
            category: &r.category,
            last_month_amount: r.last_month_amount,
            average_amount: r.average_amount,
            deviation_pct: r.deviation_pct,
            suggested_budget: r.suggested_budget,
            status: r.status.label(),
            recommendation: &r.recommendation,
        }
    }
}

#[derive(Serialize)]
struct ForecastRecord<'a> {
    category: &'a str,
    predicted_amount: f64,
}

impl<'a> From<&'a ForecastRow> for ForecastRecord<'a> {
    fn from(r: &'a ForecastRow) -> Self {
        Self {
            category: &r.category,
            predicted_amount: r.predicted_amount,
        }
    }
}

const TRANSACTION_HEADER: &[&str] = &["row", "date", "details", "amount", "flow", "category"];
const TOTAL_HEADER: &[&str] = &["category", "amount"];
const BUDGET_HEADER: &[&str] = &[
    "category",
    "last_month_amount",
    "average_amount",
    "deviation_pct",
    "suggested_budget",
    "status",
    "recommendation",
];
const FORECAST_HEADER: &[&str] = &["category", "predicted_amount"];

/// Write `header` then one line per record, so an empty table still names its columns.
fn write_csv<T: Serialize>(
    path: &Path,
    header: &[&str],
    records: impl IntoIterator<Item = T>,
) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    wtr.write_record(header)?;
    let mut count = 0usize;
    for record in records {
        wtr.serialize(record)?;
        count += 1;
    }
    wtr.flush()?;
    println!("Wrote {} ({count} rows)", path.display());
    Ok(count)
}

pub fn run(file: &str, out_dir: Option<String>) -> Result<()> {
    let settings = load_settings();
    let engine = open_categorizer(&settings)?;
    let transactions = load_batch(file, &engine)?;
    let debits = reports::filter_flow(&transactions, Flow::Debit);
    let summary = reports::summarize(&debits);

    let dir = out_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&settings.data_dir).join("exports"));
    std::fs::create_dir_all(&dir)?;

    write_csv(
        &dir.join("transactions.csv"),
        TRANSACTION_HEADER,
        transactions.iter().map(TransactionRecord::from),
    )?;

    let totals = reports::category_totals(&debits);
    write_csv(
        &dir.join("totals.csv"),
        TOTAL_HEADER,
        totals.iter().map(|t| TotalRecord {
            category: &t.category,
            amount: t.amount,
        }),
    )?;

    let deviations = budget::analyze(&summary);
    write_csv(
        &dir.join("budget.csv"),
        BUDGET_HEADER,
        deviations.rows().iter().map(BudgetRecord::from),
    )?;

    let predictions = forecast::forecast(&summary);
    write_csv(
        &dir.join("forecast.csv"),
        FORECAST_HEADER,
        predictions.rows().iter().map(ForecastRecord::from),
    )?;

    if matches!(deviations, Report::InsufficientData) {
        println!("Budget: not enough data to generate recommendations.");
    }
    if matches!(predictions, Report::InsufficientData) {
        println!("Forecast: need at least {} months of data per category.", forecast::MIN_MONTHS);
    }
    Ok(())
}
