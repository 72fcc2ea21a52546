use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{Result, SpendError};
use crate::models::{Flow, Transaction, UNCATEGORIZED};

pub const DATE_FORMAT: &str = "%d %b %Y";

const COL_DATE: &str = "Date";
const COL_DETAILS: &str = "Details";
const COL_AMOUNT: &str = "Amount";
const COL_FLOW: &str = "Debit/Credit";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an amount such as `1,234.56`. Thousands separators are dropped;
/// anything left that is not a finite number is rejected.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace(',', "");
    let value: f64 = s.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

/// Parse a `DD Mon YYYY` date, e.g. `03 Jan 2024`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

fn column_index(headers: &[String], name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| SpendError::MissingColumn(name.to_string()))
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Turn a raw CSV batch into typed transactions. Fails on the first bad
/// value; a failed batch yields no transactions at all.
pub fn normalize<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let idx_date = column_index(&headers, COL_DATE)?;
    let idx_details = column_index(&headers, COL_DETAILS)?;
    let idx_amount = column_index(&headers, COL_AMOUNT)?;
    let idx_flow = column_index(&headers, COL_FLOW)?;

    let mut transactions = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 1;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let date = parse_date(field(idx_date)).ok_or_else(|| SpendError::MalformedDate {
            row,
            value: field(idx_date).to_string(),
        })?;
        let amount = parse_amount(field(idx_amount)).ok_or_else(|| SpendError::MalformedAmount {
            row,
            value: field(idx_amount).to_string(),
        })?;
        let flow = Flow::parse(field(idx_flow)).ok_or_else(|| SpendError::MalformedFlow {
            row,
            value: field(idx_flow).to_string(),
        })?;

        transactions.push(Transaction {
            index: row,
            date,
            details: field(idx_details).to_string(),
            amount,
            flow,
            category: UNCATEGORIZED.to_string(),
        });
    }

    debug!(columns = headers.len(), "Parsed header row");
    Ok(transactions)
}

pub fn load_file(file_path: &Path) -> Result<Vec<Transaction>> {
    let file = std::fs::File::open(file_path)?;
    let transactions = normalize(std::io::BufReader::new(file))?;
    info!(
        file = %file_path.display(),
        rows = transactions.len(),
        "Normalized transaction batch"
    );
    Ok(transactions)
}
