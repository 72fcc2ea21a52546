use comfy_table::{Cell, Table};

use crate::cli::{load_batch, open_categorizer};
use crate::error::Result;
use crate::models::Transaction;
use crate::settings::load_settings;

/// Overrides that did not survive reclassification: `(row, requested, actual)`.
/// A category earlier in the map that already matches the row's details wins.
fn overridden<'a>(
    transactions: &'a [Transaction],
    overrides: &'a [(usize, String)],
) -> Vec<(usize, &'a str, &'a str)> {
    overrides
        .iter()
        .filter_map(|(index, requested)| {
            let txn = transactions.iter().find(|t| t.index == *index)?;
            (txn.category != *requested).then_some((*index, requested.as_str(), txn.category.as_str()))
        })
        .collect()
}

pub fn run(file: &str, overrides: &[(usize, String)]) -> Result<()> {
    let mut engine = open_categorizer(&load_settings())?;
    let mut transactions = load_batch(file, &engine)?;

    let changed = engine.recategorize(&mut transactions, overrides)?;
    if changed == 0 {
        println!("No changes: every row already had the requested category.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Row", "Details", "Category"]);
    for (index, _) in overrides {
        if let Some(t) = transactions.iter().find(|t| t.index == *index) {
            table.add_row(vec![Cell::new(t.index), Cell::new(&t.details), Cell::new(&t.category)]);
        }
    }
    println!("{changed} row(s) recategorized\n{table}");

    // Rows sharing the learned details follow on the next classification.
    let result = engine.classify(&mut transactions);
    println!(
        "{} categorized, {} still uncategorized",
        result.categorized, result.uncategorized
    );
    for (index, requested, actual) in overridden(&transactions, overrides) {
        println!(
            "Note: row {index} is classified as {actual}, not {requested}; {actual} matches its details first."
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::categorizer::Categorizer;
    use crate::models::{CategoryMap, Flow, UNCATEGORIZED};
    use crate::store::MemoryStore;

    fn txn(index: usize, details: &str) -> Transaction {
        Transaction {
            index,
            date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            details: details.to_string(),
            amount: 10.0,
            flow: Flow::Debit,
            category: UNCATEGORIZED.to_string(),
        }
    }

    #[test]
    fn test_earlier_category_takes_row_back() {
        let map = CategoryMap::from_entries(vec![
            ("Food".to_string(), vec!["coffee shop".to_string()]),
            ("Drinks".to_string(), vec![]),
        ]);
        let mut engine = Categorizer::open(MemoryStore { map: Some(map), saves: 0 }).unwrap();
        let mut txns = vec![txn(1, "Coffee Shop"), txn(2, "Bookstore")];
        engine.classify(&mut txns);

        let overrides = vec![(1, "Drinks".to_string()), (2, "Drinks".to_string())];
        assert_eq!(engine.recategorize(&mut txns, &overrides).unwrap(), 2);
        assert!(overridden(&txns, &overrides).is_empty());

        engine.classify(&mut txns);
        assert_eq!(overridden(&txns, &overrides), vec![(1, "Drinks", "Food")]);
        assert_eq!(txns[1].category, "Drinks");
    }
}
