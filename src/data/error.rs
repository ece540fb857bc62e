//! Data layer error types
//!
//! Everything that can go wrong while fetching and reshaping the
//! indicator tables. All of these abort startup.

use chrono::NaiveDate;
use thiserror::Error;

use super::types::IndicatorKind;

/// Errors that can occur while loading indicator data
#[derive(Error, Debug)]
pub enum DataError {
    /// HTTP request failed (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote answered with a non-success status
    #[error("Fetching {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Local file access failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV framing error (ragged rows, bad quoting)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required header column is absent
    #[error("{kind} table is missing column '{column}'")]
    MissingColumn { kind: IndicatorKind, column: String },

    /// A count cell is not a non-negative integer
    #[error("{kind} table has invalid count '{value}' for {country} on {column}")]
    InvalidCount {
        kind: IndicatorKind,
        country: String,
        column: String,
        value: String,
    },

    /// Summing rows into one country overflowed the count type
    #[error("{kind} total for {country} on {date} overflows")]
    CountOverflow {
        kind: IndicatorKind,
        country: String,
        date: NaiveDate,
    },

    /// A date column header could not be parsed
    #[error("Invalid date column '{header}'")]
    InvalidDate { header: String },

    /// A source has no table for the requested kind
    #[error("No data available for {0}")]
    Missing(IndicatorKind),
}

/// Result type for data operations
pub type DataResult<T> = Result<T, DataError>;
