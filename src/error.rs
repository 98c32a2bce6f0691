//! Error types for the projection engine.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while loading inputs or running a projection.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to open or read an input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Scenario file is not valid JSON for the expected shape
    #[error("Scenario parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid ledger record
    #[error("Invalid ledger entry at row {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    /// Duplicate ledger entry ID
    #[error("Duplicate ledger entry ID {id} at row {row}")]
    DuplicateEntryId { id: u32, row: usize },

    /// A recurring rule names a day that does not exist in some month of the window
    #[error("Configuration error: day {day} does not exist in {year}-{month:02}")]
    InvalidDayOfMonth { day: u32, year: i32, month: u32 },

    /// A recurring rule is outside the accepted range
    #[error("Configuration error: {0}")]
    InvalidRule(String),

    /// Projection window with a negative number of days
    #[error("Invalid window: days must be >= 0, got {0}")]
    NegativeWindow(i64),

    /// Projection window longer than the configured maximum
    #[error("Invalid window: {days} days exceeds the maximum of {max}")]
    WindowTooLong { days: i64, max: i64 },

    /// Projection window runs past the last representable date
    #[error("Invalid window: {days} days from {start} is out of range")]
    WindowOutOfRange { start: NaiveDate, days: i64 },

    /// Scenario has no primary account to receive salary and pay the card
    #[error("Scenario has no primary account")]
    MissingPrimaryAccount,

    /// Scenario has more than one primary account
    #[error("Scenario has more than one primary account: {0:?}")]
    MultiplePrimaryAccounts(Vec<u32>),

    /// Ledger entry targets a benefit that is not configured
    #[error("Ledger entry {id} targets unknown benefit '{key}'")]
    UnknownBenefit { id: u32, key: String },

    /// Missing scenario file argument
    #[error("Missing scenario file argument. Usage: balance-projection <scenario.json> [ledger.csv] [--events]")]
    MissingArgument,
}
