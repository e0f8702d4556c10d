use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrateError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Missing required CSV header: {0}")]
    MissingHeader(String),

    #[error("Missing field for column '{column}' at row {row}")]
    MissingField { column: String, row: usize },

    #[error("Failed to parse taxonomy lookup: {0}")]
    TaxonomyParseError(#[from] serde_json::Error),

    #[error("Failed to write JSON output: {0}")]
    JsonWriteError(serde_json::Error),

    #[error("Row {row} has a non-integer id '{value}'; cannot sort by id")]
    InvalidRowId { row: usize, value: String },

    #[error("Invalid progress bar template: {0}")]
    ProgressTemplateError(#[from] indicatif::style::TemplateError),
}

pub type Result<T> = std::result::Result<T, CrateError>;
