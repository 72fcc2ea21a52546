use std::collections::BTreeMap;

use tracing::debug;

use crate::fmt::round2;
use crate::models::{BudgetStatus, DeviationRow, MonthlySummary, Report};

/// Deviation (in percent) beyond which a category is flagged either way.
pub const DEVIATION_THRESHOLD: f64 = 20.0;

/// Suggested budget as a share of the category's monthly average.
pub const BUDGET_FACTOR: f64 = 0.9;

/// Percentage change of `recent` against `average`; `None` when the average is zero.
pub fn deviation_pct(recent: f64, average: f64) -> Option<f64> {
    if average == 0.0 {
        return None;
    }
    Some((recent - average) / average * 100.0)
}

pub fn status_for(deviation: Option<f64>) -> BudgetStatus {
    match deviation {
        Some(d) if d > DEVIATION_THRESHOLD => BudgetStatus::Overspending,
        Some(d) if d < -DEVIATION_THRESHOLD => BudgetStatus::SpendingLess,
        _ => BudgetStatus::WithinRange,
    }
}

pub fn recommendation(status: BudgetStatus, category: &str) -> String {
    match status {
        BudgetStatus::Overspending => format!("Reduce expenses in {category}."),
        BudgetStatus::SpendingLess => format!("Good control in {category}."),
        BudgetStatus::WithinRange => format!("Maintain this level in {category}."),
    }
}

/// Compare the latest month's spend per category with that category's
/// average over every month in the summary, the latest one included.
///
/// Expects a summary of debit transactions only. Categories that did not
/// appear in the latest month are left out.
pub fn analyze(summary: &[MonthlySummary]) -> Report<DeviationRow> {
    let Some(recent) = summary.iter().map(|s| s.month).max() else {
        return Report::InsufficientData;
    };

    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for row in summary {
        let entry = sums.entry(row.category.as_str()).or_default();
        entry.0 += row.total_amount;
        entry.1 += 1;
    }

    let mut last_month: Vec<&MonthlySummary> = summary.iter().filter(|s| s.month == recent).collect();
    last_month.sort_by(|a, b| a.category.cmp(&b.category));

    let rows: Vec<DeviationRow> = last_month
        .into_iter()
        .map(|row| {
            let (sum, months) = sums[row.category.as_str()];
            let average = sum / months as f64;
            let deviation = deviation_pct(row.total_amount, average);
            let status = status_for(deviation);
            DeviationRow {
                category: row.category.clone(),
                last_month_amount: row.total_amount,
                average_amount: average,
                deviation_pct: deviation,
                suggested_budget: round2(average * BUDGET_FACTOR),
                status,
                recommendation: recommendation(status, &row.category),
            }
        })
        .collect();

    debug!(month = %recent, categories = rows.len(), "Computed budget deviations");
    Report::Rows(rows)
}
