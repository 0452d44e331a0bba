//! # Prob - Discrete Bayesian Networks
//!
//! Nodes are random variables over discrete value ranges; edges say which
//! variables condition which. Each discrete node carries a conditional
//! probability table trained from a [`bayesnet_table::TableSource`], and a
//! parentless node may instead be a continuous leaf (uniform, exponential
//! or Gaussian) fitted to a numeric column.
//!
//! ## Core Concepts
//!
//! - **A table is a function**: `cells[parents][x]` = P(node=x | parents)
//! - **Queries factor along the DAG**: the chain rule in breadth-first order,
//!   each factor read from one node's table
//! - **Absent parents are averaged**: weighted by their a-priori marginals
//! - **Irrelevant evidence is dropped first**: Bayes-Ball decides which
//!   conditions a query cannot depend on
//!
//! ## Example: Cloud and Rain
//!
//! ```rust
//! use bayesnet_core::{CondEvent, Event, Kind, ValueRange};
//! use bayesnet_prob::BayesNet;
//! use bayesnet_table::Table;
//!
//! let mut net = BayesNet::new();
//! net.add_node("Cloud", Some(ValueRange::boolean()), None);
//! net.add_node("Rain", Some(ValueRange::boolean()), Some("rain today"));
//! net.add_cause_effect("Cloud", "Rain").unwrap();
//!
//! let observations = Table::from_text(
//!     &[("Cloud", Kind::Bool), ("Rain", Kind::Bool)],
//!     &[
//!         &["true", "true"],
//!         &["true", "true"],
//!         &["true", "false"],
//!         &["false", "false"],
//!     ],
//! )
//! .unwrap();
//! let report = net.train_with_table(&observations, false).unwrap();
//! assert!(report.is_complete());
//!
//! let rain_if_cloudy =
//!     CondEvent::given(Event::equals("Rain", true), [Event::equals("Cloud", true)]).unwrap();
//! assert!((net.p(&rain_if_cloudy) - 2.0 / 3.0).abs() < 1e-10);
//! ```

mod bayes_ball;
mod config;
pub mod continuous;
mod cpt;
mod error;
mod net;
mod node;

pub use bayes_ball::{bayes_ball, Reachability};
pub use config::NetConfig;
pub use continuous::{ContinuousLeaf, Exponential, Gaussian, Uniform};
pub use cpt::{ConditionWeights, DiscreteProbability, Marginal, TableState, UniformWeights};
pub use error::ProbError;
pub use net::{BayesNet, TrainingReport};
pub use node::{Distribution, Node};

/// Default tolerance for "sums to one" checks.
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;
    use bayesnet_core::{CondEvent, Event, Kind, Value, ValueRange};

    #[test]
    fn test_uniform_net_is_fully_defined() {
        let mut net = BayesNet::new();
        net.add_node(
            "A",
            Some(ValueRange::with_values(Kind::UInt, (1..=3u64).map(Value::UInt)).unwrap()),
            None,
        );
        net.add_node("B", Some(ValueRange::boolean()), None);
        net.add_cause_effect("A", "B").unwrap();
        net.make_uniform().unwrap();
        assert!(net.fully_defined());

        let q = CondEvent::given(Event::equals("A", 2u64), []).unwrap();
        assert!((net.p(&q) - 1.0 / 3.0).abs() < DEFAULT_EPSILON);
    }

    #[test]
    fn test_empty_net_is_not_fully_defined() {
        assert!(!BayesNet::new().fully_defined());
    }
}
