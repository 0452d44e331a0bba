//! Net configuration.

use serde::{Deserialize, Serialize};

use crate::error::ProbError;
use crate::DEFAULT_EPSILON;

/// Options recognised by [`crate::BayesNet::with_config`].
///
/// # Example
///
/// ```rust
/// use bayesnet_prob::NetConfig;
///
/// let config = NetConfig::from_json(r#"{ "numerical_epsilon": 1e-8 }"#).unwrap();
/// assert!(!config.allow_parallel_edges);
/// assert_eq!(config.numerical_epsilon, 1e-8);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Accept a second edge between the same two nodes.
    pub allow_parallel_edges: bool,
    /// Accept an edge from a node to itself.
    pub allow_self_loops: bool,
    /// Tolerance used when checking that rows sum to one.
    pub numerical_epsilon: f64,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            allow_parallel_edges: false,
            allow_self_loops: false,
            numerical_epsilon: DEFAULT_EPSILON,
        }
    }
}

impl NetConfig {
    /// Parse and validate a JSON object; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ProbError> {
        let config: NetConfig =
            serde_json::from_str(text).map_err(|e| ProbError::InvalidParameter {
                name: "config".to_string(),
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ProbError> {
        if !(self.numerical_epsilon.is_finite() && self.numerical_epsilon > 0.0) {
            return Err(ProbError::InvalidParameter {
                name: "numerical_epsilon".to_string(),
                reason: format!("must be positive and finite, got {}", self.numerical_epsilon),
            });
        }
        Ok(())
    }
}
