//! Error types for probability operations.

use bayesnet_core::{CoreError, ErrorClass};
use bayesnet_table::TableError;
use thiserror::Error;

/// Errors that can occur while building, training or querying a net.
#[derive(Debug, Clone, Error)]
pub enum ProbError {
    /// Value, event or graph error from the core layer.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Training data could not be read or projected.
    #[error(transparent)]
    Table(#[from] TableError),

    /// A variable name the net does not know.
    #[error("Unknown variable '{name}'")]
    UnknownVariable { name: String },

    /// A range needed for the operation has no values.
    #[error("Variable '{variable}' has an empty range")]
    EmptyRange { variable: String },

    /// Training was asked to fit nothing.
    #[error("No samples to train '{variable}'")]
    EmptySample { variable: String },

    /// A sample outside a continuous family's support.
    #[error("Sample {value} of '{variable}' lies outside the support {support}")]
    OutOfSupport {
        variable: String,
        value: f64,
        support: String,
    },

    /// A discrete value outside its variable's declared range.
    #[error("Value {value} is not in the range of '{variable}'")]
    ValueNotInRange { variable: String, value: String },

    /// No value of a condition variable satisfies the query.
    #[error("No value of '{variable}' satisfies the condition")]
    EmptyCondition { variable: String },

    /// A probability outside `[0, 1]` or not finite.
    #[error("Invalid probability {value} for '{variable}'")]
    InvalidProbability { variable: String, value: f64 },

    /// Invalid distribution or configuration parameter.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Continuous variables can only be leaves.
    #[error("Continuous variable '{name}' cannot be a cause")]
    ContinuousParent { name: String },

    /// The node was never trained or initialised.
    #[error("Variable '{name}' has no distribution")]
    NoDistribution { name: String },

    /// The node's table does not sum to one per condition.
    #[error("Table of '{name}' is not a distribution")]
    NotADistribution { name: String },

    /// Arithmetic produced NaN or infinity.
    #[error("Non-finite probability for {query}")]
    NonFinite { query: String },

    /// A single node failed to train; the rest of the net is untouched.
    #[error("Training '{variable}' failed: {source}")]
    Training {
        variable: String,
        #[source]
        source: Box<ProbError>,
    },
}

impl ProbError {
    /// The failure category of this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            ProbError::Core(e) => e.class(),
            ProbError::Table(e) => e.class(),
            ProbError::UnknownVariable { .. } | ProbError::ContinuousParent { .. } => {
                ErrorClass::Structural
            }
            ProbError::EmptyRange { .. }
            | ProbError::EmptySample { .. }
            | ProbError::OutOfSupport { .. }
            | ProbError::ValueNotInRange { .. }
            | ProbError::EmptyCondition { .. }
            | ProbError::InvalidParameter { .. } => ErrorClass::Range,
            ProbError::InvalidProbability { .. }
            | ProbError::NoDistribution { .. }
            | ProbError::NotADistribution { .. }
            | ProbError::NonFinite { .. } => ErrorClass::Distribution,
            ProbError::Training { source, .. } => source.class(),
        }
    }

    pub(crate) fn training(variable: &str, source: ProbError) -> Self {
        ProbError::Training {
            variable: variable.to_string(),
            source: Box::new(source),
        }
    }
}
