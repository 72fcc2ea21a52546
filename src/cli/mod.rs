pub mod categories;
pub mod export;
pub mod init;
pub mod recategorize;
pub mod report;
pub mod status;

use std::path::Path;

use clap::{Parser, Subcommand};

use crate::categorizer::Categorizer;
use crate::error::Result;
use crate::importer::load_file;
use crate::models::Transaction;
use crate::settings::{Settings, StoreKind};
use crate::store::{open_store, CategoryStore};

pub(crate) type Engine = Categorizer<Box<dyn CategoryStore>>;

pub(crate) fn open_categorizer(settings: &Settings) -> Result<Engine> {
    Categorizer::open(open_store(settings))
}

/// Normalize and classify one uploaded batch.
pub(crate) fn load_batch(file: &str, engine: &Engine) -> Result<Vec<Transaction>> {
    let mut transactions = load_file(Path::new(file))?;
    engine.classify(&mut transactions);
    Ok(transactions)
}

/// Parse a `ROW=CATEGORY` override, e.g. `3=Food`.
pub(crate) fn parse_override(raw: &str) -> std::result::Result<(usize, String), String> {
    let (row, category) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ROW=CATEGORY, got {raw:?}"))?;
    let row: usize = row
        .trim()
        .parse()
        .map_err(|_| format!("row must be a positive number, got {:?}", row.trim()))?;
    if row == 0 {
        return Err("rows are numbered from 1".to_string());
    }
    let category = category.trim();
    if category.is_empty() {
        return Err(format!("missing category in {raw:?}"));
    }
    Ok((row, category.to_string()))
}

#[derive(Parser)]
#[command(
    name = "spendsight",
    about = "Categorize, budget and forecast personal spending from a bank CSV."
)]
pub struct Cli {
    /// Show debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up spendsight: choose a data directory and category store.
    Init {
        /// Path for spendsight data (default: ~/.local/share/spendsight)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Where categories and keywords are kept
        #[arg(long, value_enum)]
        store: Option<StoreKind>,
        /// Currency label shown next to amounts
        #[arg(long)]
        currency: Option<String>,
    },
    /// Show settings and category store summary.
    Status,
    /// Manage categories and their keywords.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Categorized expenses (debits) and per-category totals.
    Expenses {
        /// Transaction CSV with Date, Details, Amount, Debit/Credit columns
        file: String,
    },
    /// Incoming payments (credits) and their total.
    Payments {
        /// Transaction CSV with Date, Details, Amount, Debit/Credit columns
        file: String,
    },
    /// Latest month vs. average per category, with suggested budgets.
    Budget {
        /// Transaction CSV with Date, Details, Amount, Debit/Credit columns
        file: String,
    },
    /// Predicted spending per category for next month.
    Forecast {
        /// Transaction CSV with Date, Details, Amount, Debit/Credit columns
        file: String,
    },
    /// Move transactions to another category and learn their details as keywords.
    Recategorize {
        /// Transaction CSV with Date, Details, Amount, Debit/Credit columns
        file: String,
        /// Override as ROW=CATEGORY (row numbers as shown by `expenses`); repeatable
        #[arg(long = "set", value_parser = parse_override, required = true)]
        overrides: Vec<(usize, String)>,
    },
    /// Write categorized transactions, totals, budget and forecast tables as CSV.
    Export {
        /// Transaction CSV with Date, Details, Amount, Debit/Credit columns
        file: String,
        /// Output directory (default: <data_dir>/exports)
        #[arg(long = "out-dir")]
        out_dir: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// List categories and their keywords.
    List,
    /// Add a new, empty category.
    Add {
        /// Category name (case-sensitive)
        name: String,
    },
    /// Teach a category a keyword (an exact transaction Details value).
    Learn {
        /// Existing category name
        category: String,
        /// Keyword to add
        keyword: String,
    },
}
