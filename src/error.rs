use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpendError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Malformed amount on row {row}: {value:?}")]
    MalformedAmount { row: usize, value: String },

    #[error("Malformed date on row {row}: {value:?} (expected e.g. \"03 Jan 2024\")")]
    MalformedDate { row: usize, value: String },

    #[error("Malformed Debit/Credit value on row {row}: {value:?}")]
    MalformedFlow { row: usize, value: String },

    #[error("Category already exists: {0}")]
    DuplicateCategory(String),

    #[error("Invalid category name: {0:?}")]
    InvalidCategoryName(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("No transaction on row {0}")]
    UnknownRow(usize),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, SpendError>;
