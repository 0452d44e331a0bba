//! # Error Types
//!
//! Errors in the value and graph layer are first-class: a kind mismatch,
//! a conflicting pair of events or an edge that would close a cycle is
//! an undefined operation, not a recoverable runtime hiccup.
//!
//! Every error reports its [`ErrorClass`] so callers can apply one policy
//! per class (structural and conflict errors surface, range errors are
//! confined to the node being trained).

use thiserror::Error;

use crate::range::ContinuousFamily;
use crate::value::Kind;

/// The broad failure categories shared by every crate in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Cycle, parallel edge, self loop or unknown vertex.
    Structural,
    /// Two events bind the same variable incompatibly.
    Conflict,
    /// Data outside a declared support, empty ranges, kind mismatches.
    Range,
    /// Non-finite probabilities or a table that is not a distribution.
    Distribution,
    /// Text could not be read as a value of the requested kind.
    Parse,
}

/// Core errors for values, ranges, events and the DAG.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// Text could not be parsed as the requested kind.
    #[error("Cannot parse '{text}' as {kind}: {reason}")]
    Parse {
        kind: Kind,
        text: String,
        reason: String,
    },

    /// A value of the wrong kind was offered to a typed container.
    #[error("Kind mismatch for value {value}: expected {expected}, got {got}")]
    KindMismatch {
        value: String,
        expected: Kind,
        got: Kind,
    },

    /// Discrete values were offered to a continuous range.
    #[error("Cannot add {value} to a continuous {family} range")]
    NotDiscrete {
        value: String,
        family: ContinuousFamily,
    },

    /// Interval bounds are out of order.
    #[error("Invalid interval: lower bound {lo} exceeds upper bound {hi}")]
    InvalidInterval { lo: String, hi: String },

    /// Two events bind the same variable to incompatible values.
    #[error("Conflicting events for '{name}': {left} vs {right}")]
    Conflict {
        name: String,
        left: String,
        right: String,
    },

    /// The edge would close a directed cycle.
    #[error("Edge {from} -> {to} would create a cycle")]
    Cycle { from: String, to: String },

    /// A second edge between the same endpoints in no-parallel mode.
    #[error("Edge {from} -> {to} is parallel to an existing edge")]
    ParallelEdge { from: String, to: String },

    /// Self loops are disabled.
    #[error("Self loop on '{node}' is not allowed")]
    SelfLoop { node: String },

    /// A vertex name that the graph does not know.
    #[error("Unknown vertex '{name}'")]
    UnknownVertex { name: String },

    /// A variable is missing from the order handed to the chain rule.
    #[error("Variable '{name}' does not appear in the chain-rule order")]
    MissingFromOrder { name: String },
}

impl CoreError {
    /// The failure category of this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            CoreError::Parse { .. } => ErrorClass::Parse,
            CoreError::KindMismatch { .. }
            | CoreError::NotDiscrete { .. }
            | CoreError::InvalidInterval { .. } => ErrorClass::Range,
            CoreError::Conflict { .. } => ErrorClass::Conflict,
            CoreError::Cycle { .. }
            | CoreError::ParallelEdge { .. }
            | CoreError::SelfLoop { .. }
            | CoreError::UnknownVertex { .. }
            | CoreError::MissingFromOrder { .. } => ErrorClass::Structural,
        }
    }
}
