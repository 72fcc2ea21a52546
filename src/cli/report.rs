use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::budget;
use crate::cli::{load_batch, open_categorizer};
use crate::error::Result;
use crate::fmt::{money, pct};
use crate::forecast;
use crate::models::{BudgetStatus, Flow, Report, UNCATEGORIZED};
use crate::reports;
use crate::settings::load_settings;

const DISPLAY_DATE: &str = "%d/%m/%Y";

pub fn expenses(file: &str) -> Result<()> {
    let settings = load_settings();
    let engine = open_categorizer(&settings)?;
    let debits = reports::filter_flow(&load_batch(file, &engine)?, Flow::Debit);

    if debits.is_empty() {
        println!("No expenses in this file.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Row", "Date", "Details", "Amount", "Category"]);
    for t in &debits {
        let category = if t.category == UNCATEGORIZED {
            Cell::new(t.category.as_str().yellow())
        } else {
            Cell::new(&t.category)
        };
        table.add_row(vec![
            Cell::new(t.index),
            Cell::new(t.date.format(DISPLAY_DATE)),
            Cell::new(&t.details),
            Cell::new(money(t.amount, &settings.currency)),
            category,
        ]);
    }
    println!("Your Expenses\n{table}");

    let mut summary = Table::new();
    summary.set_header(vec!["Category", "Amount"]);
    for total in reports::category_totals(&debits) {
        summary.add_row(vec![
            Cell::new(&total.category),
            Cell::new(money(total.amount, &settings.currency)),
        ]);
    }
    summary.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(money(reports::total_amount(&debits), &settings.currency)),
    ]);
    println!("\nExpense Summary\n{summary}");
    Ok(())
}

pub fn payments(file: &str) -> Result<()> {
    let settings = load_settings();
    let engine = open_categorizer(&settings)?;
    let credits = reports::filter_flow(&load_batch(file, &engine)?, Flow::Credit);

    println!(
        "Total Payments: {}",
        money(reports::total_amount(&credits), &settings.currency).green().bold()
    );
    if credits.is_empty() {
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Row", "Date", "Details", "Amount", "Category"]);
    for t in &credits {
        table.add_row(vec![
            Cell::new(t.index),
            Cell::new(t.date.format(DISPLAY_DATE)),
            Cell::new(&t.details),
            Cell::new(money(t.amount, &settings.currency)),
            Cell::new(&t.category),
        ]);
    }
    println!("\nPayments Summary\n{table}");
    Ok(())
}

pub fn budget(file: &str) -> Result<()> {
    let settings = load_settings();
    let engine = open_categorizer(&settings)?;
    let debits = reports::filter_flow(&load_batch(file, &engine)?, Flow::Debit);
    let summary = reports::summarize(&debits);

    let rows = match budget::analyze(&summary) {
        Report::InsufficientData => {
            println!("Not enough data to generate recommendations.");
            return Ok(());
        }
        Report::Rows(rows) => rows,
    };

    let mut table = Table::new();
    table.set_header(vec![
        "Category",
        "Last Month",
        "Average",
        "Deviation",
        "Suggested Budget",
        "Status",
        "Recommendation",
    ]);
    for r in &rows {
        let status = match r.status {
            BudgetStatus::Overspending => r.status.label().red().bold(),
            BudgetStatus::SpendingLess => r.status.label().green(),
            BudgetStatus::WithinRange => r.status.label().normal(),
        };
        table.add_row(vec![
            Cell::new(&r.category),
            Cell::new(money(r.last_month_amount, &settings.currency)),
            Cell::new(money(r.average_amount, &settings.currency)),
            Cell::new(pct(r.deviation_pct)),
            Cell::new(money(r.suggested_budget, &settings.currency)),
            Cell::new(status),
            Cell::new(&r.recommendation),
        ]);
    }
    println!("Budget Recommendations\n{table}");
    println!(
        "\nWithin Range: deviation between -{t}% and +{t}%. Overspending: above +{t}%. Spending Less: below -{t}%.",
        t = budget::DEVIATION_THRESHOLD
    );
    Ok(())
}

pub fn forecast(file: &str) -> Result<()> {
    let settings = load_settings();
    let engine = open_categorizer(&settings)?;
    let debits = reports::filter_flow(&load_batch(file, &engine)?, Flow::Debit);
    let summary = reports::summarize(&debits);

    if summary.is_empty() {
        println!("Not enough data to forecast.");
        return Ok(());
    }
    let rows = match forecast::forecast(&summary) {
        Report::InsufficientData => {
            println!(
                "Need at least {} months of data per category to forecast.",
                forecast::MIN_MONTHS
            );
            return Ok(());
        }
        Report::Rows(rows) => rows,
    };

    let mut table = Table::new();
    table.set_header(vec!["Category", "Predicted Amount"]);
    for r in &rows {
        table.add_row(vec![
            Cell::new(&r.category),
            Cell::new(money(r.predicted_amount, &settings.currency)),
        ]);
    }
    println!("Predicted Spending for Next Month\n{table}");
    Ok(())
}
