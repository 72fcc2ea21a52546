use std::collections::BTreeMap;

use crate::models::{CategoryTotal, Flow, MonthlySummary, Transaction, YearMonth};

// ---------------------------------------------------------------------------
// Flow split
// ---------------------------------------------------------------------------

pub fn filter_flow(transactions: &[Transaction], flow: Flow) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| t.flow == flow)
        .cloned()
        .collect()
}

pub fn total_amount(transactions: &[Transaction]) -> f64 {
    transactions.iter().map(|t| t.amount).sum()
}

// ---------------------------------------------------------------------------
// Monthly summary
// ---------------------------------------------------------------------------

/// Sum amounts per (month, category), ordered by month then category.
pub fn summarize(transactions: &[Transaction]) -> Vec<MonthlySummary> {
    let mut totals: BTreeMap<(YearMonth, &str), f64> = BTreeMap::new();
    for txn in transactions {
        *totals
            .entry((YearMonth::of(txn.date), txn.category.as_str()))
            .or_default() += txn.amount;
    }
    totals
        .into_iter()
        .map(|((month, category), total_amount)| MonthlySummary {
            month,
            category: category.to_string(),
            total_amount,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Category totals
// ---------------------------------------------------------------------------

/// Total per category, largest first.
pub fn category_totals(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for txn in transactions {
        *totals.entry(txn.category.as_str()).or_default() += txn.amount;
    }
    let mut rows: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, amount)| CategoryTotal {
            category: category.to_string(),
            amount,
        })
        .collect();
    rows.sort_by(|a, b| b.amount.total_cmp(&a.amount).then_with(|| a.category.cmp(&b.category)));
    rows
}
