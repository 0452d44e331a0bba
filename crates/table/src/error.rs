//! Error types for tabular sources.

use bayesnet_core::{CoreError, ErrorClass, Kind};
use thiserror::Error;

/// Errors raised while building or projecting a table.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TableError {
    /// A column name the table does not have.
    #[error("Unknown column '{name}'")]
    UnknownColumn { name: String },

    /// Two columns share a header.
    #[error("Duplicate column '{name}'")]
    DuplicateColumn { name: String },

    /// A row has the wrong number of cells.
    #[error("Row {row} has {got} cells, expected {expected}")]
    Arity {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// A cell's kind does not match its column.
    #[error("Column '{column}' holds {expected} values, got {got}")]
    KindMismatch {
        column: String,
        expected: Kind,
        got: Kind,
    },

    /// A text cell could not be parsed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl TableError {
    pub fn class(&self) -> ErrorClass {
        match self {
            TableError::UnknownColumn { .. }
            | TableError::DuplicateColumn { .. }
            | TableError::Arity { .. } => ErrorClass::Structural,
            TableError::KindMismatch { .. } => ErrorClass::Range,
            TableError::Core(e) => e.class(),
        }
    }
}
