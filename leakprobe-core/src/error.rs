//! Error types for the leakprobe-core crate.

use thiserror::Error;

/// Top-level error type for leakage detection operations.
///
/// Precondition violations (`InvalidDirection`, `MissingInputColumn`,
/// `MissingOutputColumn`, `InvalidSplitRow`, `InvalidInput`) are raised
/// before any table is poisoned, so the caller's data is never touched on
/// failure. Black-box feature function failures propagate unmodified inside
/// `FeatureFn`.
#[derive(Debug, Error)]
pub enum LeakError {
    #[error("Invalid direction {0:?}: expected \"upward\" or \"downward\"")]
    InvalidDirection(String),

    #[error("Column '{column}' in '{argument}' is not present in the input table")]
    MissingInputColumn { column: String, argument: &'static str },

    #[error(
        "Column '{column}' in '{argument}' is not present in the table returned by the feature function"
    )]
    MissingOutputColumn { column: String, argument: &'static str },

    #[error(
        "Invalid split row {split_row}: must leave at least one row outside the poisoned region of a {rows}-row table"
    )]
    InvalidSplitRow { split_row: usize, rows: usize },

    #[error("Table error: {0}")]
    Table(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Feature function error: {0}")]
    FeatureFn(#[from] anyhow::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl LeakError {
    pub fn table(msg: impl Into<String>) -> Self {
        Self::Table(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
