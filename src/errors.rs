//! Unified error types and result handling.

use crate::models::Collection;
use rust_decimal::Decimal;
use thiserror::Error;

/// Every failure the crate reports. Aggregation itself never fails; these come
/// from validation, configuration and the record store.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read, parsed or is incomplete
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The record store rejected or failed an operation
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// An expense amount was negative or had sub-cent precision
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// A budget limit was zero, negative or had sub-cent precision
    #[error("Invalid budget limit: {limit}")]
    InvalidLimit {
        /// The rejected limit
        limit: Decimal,
    },

    /// A required field was empty
    #[error("Missing required field: {field}")]
    MissingField {
        /// Field name as persisted
        field: &'static str,
    },

    /// A date string could not be understood
    #[error("Invalid date: {value:?}")]
    InvalidDate {
        /// The raw value that failed to parse
        value: String,
    },

    /// The record does not exist or belongs to another owner
    #[error("No record {id} in {collection}")]
    RecordNotFound {
        /// Collection that was searched
        collection: Collection,
        /// Record id that was requested
        id: i64,
    },

    /// A month key was not `YYYY-MM` or was out of range
    #[error("Invalid month: {value:?}")]
    InvalidMonth {
        /// The raw value that failed to parse
        value: String,
    },

    /// A CSV file could not be read
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A CSV import was structurally unusable
    #[error("Import error: {message}")]
    Import {
        /// What was wrong with the file
        message: String,
    },

    /// I/O error while touching local files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable missing or not unicode
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
