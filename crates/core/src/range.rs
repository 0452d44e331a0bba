//! Value ranges: what a variable is allowed to take.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::interval::Interval;
use crate::value::{Kind, Value};

/// The continuous families a leaf variable can follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContinuousFamily {
    /// Uniform on a finite interval.
    Uniform,
    /// Exponential with rate λ.
    Exponential,
    /// Normal N(μ, σ²).
    Gaussian,
}

impl ContinuousFamily {
    /// The admissible set implied by the family.
    pub fn support(&self) -> Interval<f64> {
        match self {
            ContinuousFamily::Exponential => Interval::at_least(0.0),
            ContinuousFamily::Uniform | ContinuousFamily::Gaussian => Interval::full(),
        }
    }
}

impl fmt::Display for ContinuousFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContinuousFamily::Uniform => write!(f, "float-uniform"),
            ContinuousFamily::Exponential => write!(f, "exponential"),
            ContinuousFamily::Gaussian => write!(f, "gaussian"),
        }
    }
}

/// Permissible values of one variable.
///
/// A discrete range is an ordered sequence of unique values sharing one
/// kind; a continuous range only names its family.
///
/// # Example
///
/// ```rust
/// use bayesnet_core::{Kind, Value, ValueRange};
///
/// let mut rain = ValueRange::discrete(Kind::String);
/// rain.add(Value::from("heavy")).unwrap();
/// rain.add(Value::from("none")).unwrap();
/// rain.add(Value::from("heavy")).unwrap(); // idempotent
/// assert_eq!(rain.len(), 2);
/// assert!(rain.add(Value::Int(1)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueRange {
    Discrete { kind: Kind, values: Vec<Value> },
    Continuous(ContinuousFamily),
}

impl ValueRange {
    /// An empty discrete range of `kind`.
    pub fn discrete(kind: Kind) -> Self {
        ValueRange::Discrete {
            kind,
            values: Vec::new(),
        }
    }

    /// A discrete range holding `values` (duplicates collapse).
    pub fn with_values(
        kind: Kind,
        values: impl IntoIterator<Item = Value>,
    ) -> Result<Self, CoreError> {
        let mut range = Self::discrete(kind);
        range.set_values(values)?;
        Ok(range)
    }

    /// The boolean range `{false, true}`.
    pub fn boolean() -> Self {
        ValueRange::Discrete {
            kind: Kind::Bool,
            values: vec![Value::Bool(false), Value::Bool(true)],
        }
    }

    pub fn continuous(family: ContinuousFamily) -> Self {
        ValueRange::Continuous(family)
    }

    /// The kind of every value in the range. Continuous ranges are floats.
    pub fn kind(&self) -> Kind {
        match self {
            ValueRange::Discrete { kind, .. } => *kind,
            ValueRange::Continuous(_) => Kind::Float,
        }
    }

    pub fn family(&self) -> Option<ContinuousFamily> {
        match self {
            ValueRange::Continuous(family) => Some(*family),
            ValueRange::Discrete { .. } => None,
        }
    }

    pub fn is_discrete(&self) -> bool {
        matches!(self, ValueRange::Discrete { .. })
    }

    /// Add one value. Returns `false` when it was already present.
    pub fn add(&mut self, value: Value) -> Result<bool, CoreError> {
        match self {
            ValueRange::Continuous(family) => Err(CoreError::NotDiscrete {
                value: value.to_string(),
                family: *family,
            }),
            ValueRange::Discrete { kind, values } => {
                if value.kind() != *kind {
                    return Err(CoreError::KindMismatch {
                        value: value.to_string(),
                        expected: *kind,
                        got: value.kind(),
                    });
                }
                if values.contains(&value) {
                    return Ok(false);
                }
                values.push(value);
                Ok(true)
            }
        }
    }

    /// Replace the values. On error the range is left unchanged.
    pub fn set_values(&mut self, new_values: impl IntoIterator<Item = Value>) -> Result<(), CoreError> {
        let mut staged = match self {
            ValueRange::Discrete { kind, .. } => Self::discrete(*kind),
            ValueRange::Continuous(family) => ValueRange::Continuous(*family),
        };
        for value in new_values {
            staged.add(value)?;
        }
        *self = staged;
        Ok(())
    }

    /// Continuous ranges are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            ValueRange::Discrete { values, .. } => values.is_empty(),
            ValueRange::Continuous(_) => false,
        }
    }

    /// Number of discrete values (0 for continuous ranges).
    pub fn len(&self) -> usize {
        self.values().len()
    }

    /// The discrete values in insertion order.
    pub fn values(&self) -> &[Value] {
        match self {
            ValueRange::Discrete { values, .. } => values,
            ValueRange::Continuous(_) => &[],
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values().iter()
    }

    /// Position of `value` in a discrete range.
    pub fn index_of(&self, value: &Value) -> Option<usize> {
        self.values().iter().position(|v| v == value)
    }

    pub fn contains(&self, value: &Value) -> bool {
        match self {
            ValueRange::Discrete { values, .. } => values.contains(value),
            ValueRange::Continuous(family) => value
                .as_f64()
                .map(|x| family.support().contains(&x))
                .unwrap_or(false),
        }
    }
}

impl<'a> IntoIterator for &'a ValueRange {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueRange::Discrete { kind, values } => {
                write!(f, "{}{{", kind)?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "}}")
            }
            ValueRange::Continuous(family) => write!(f, "{}", family),
        }
    }
}
