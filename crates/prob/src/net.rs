//! The Bayesian network façade.
//!
//! A [`BayesNet`] owns a name-keyed DAG of [`Node`]s. Structure is built
//! with `add_node` / `add_cause_effect`, distributions come from
//! `train_with_table` or from `make_uniform` / `canonise`, and queries go
//! through [`BayesNet::p`]:
//!
//! 1. Bayes-Ball drops the conditions the query cannot depend on
//! 2. the chain rule splits the query along the breadth-first order
//! 3. each factor is restricted to its variable's parents and evaluated by
//!    that node, absent parents averaged under their a-priori marginals
//! 4. the factors are multiplied in log space
//!
//! `P` is total: every failure is logged and reported as 0.

use std::collections::BTreeSet;

use bayesnet_core::{CondEvent, Dag, Value, ValueRange};
use bayesnet_table::TableSource;
use tracing::{debug, warn};

use crate::bayes_ball::bayes_ball;
use crate::config::NetConfig;
use crate::cpt::ConditionWeights;
use crate::error::ProbError;
use crate::node::{Distribution, Node};

/// Outcome of [`BayesNet::train_with_table`].
#[derive(Debug, Clone, Default)]
pub struct TrainingReport {
    /// Nodes whose distribution was replaced, in training order.
    pub trained: Vec<String>,
    /// Nodes that kept their previous distribution, with the reason.
    pub failed: Vec<(String, ProbError)>,
}

impl TrainingReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Weights absent parents by their a-priori marginals.
struct AprioriWeights<'a> {
    graph: &'a Dag<Node>,
}

impl ConditionWeights for AprioriWeights<'_> {
    fn weight(&self, variable: &str, value: &Value) -> f64 {
        self.graph
            .vertex(variable)
            .and_then(Node::apriori)
            .map_or(1.0, |m| m.get(value))
    }
}

/// A discrete Bayesian network with optional continuous leaves.
///
/// # Example
///
/// ```rust
/// use bayesnet_core::{CondEvent, Event, ValueRange};
/// use bayesnet_prob::BayesNet;
///
/// let mut net = BayesNet::new();
/// net.add_node("Cloud", Some(ValueRange::boolean()), None);
/// net.add_node("Rain", Some(ValueRange::boolean()), None);
/// net.add_cause_effect("Cloud", "Rain").unwrap();
/// net.canonise().unwrap();
/// net.normalise().unwrap();
/// assert!(net.fully_defined());
///
/// let q = CondEvent::given(Event::equals("Rain", true), [Event::equals("Cloud", true)]).unwrap();
/// assert!((net.p(&q) - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct BayesNet {
    config: NetConfig,
    graph: Dag<Node>,
}

impl Default for BayesNet {
    fn default() -> Self {
        Self::new()
    }
}

impl BayesNet {
    pub fn new() -> Self {
        let config = NetConfig::default();
        Self {
            graph: Dag::with_policy(config.allow_parallel_edges, config.allow_self_loops),
            config,
        }
    }

    pub fn with_config(config: NetConfig) -> Result<Self, ProbError> {
        config.validate()?;
        Ok(Self {
            graph: Dag::with_policy(config.allow_parallel_edges, config.allow_self_loops),
            config,
        })
    }

    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// Add a node. Returns `false` if the name exists (the node is unchanged).
    ///
    /// A discrete node added without a range takes its range from the
    /// training table.
    pub fn add_node(
        &mut self,
        name: &str,
        range: Option<ValueRange>,
        description: Option<&str>,
    ) -> bool {
        let node = Node::new(name, range, description).with_epsilon(self.config.numerical_epsilon);
        let added = self.graph.add_vertex(name, node);
        if added {
            debug!(node = name, "node added");
        }
        added
    }

    /// Add the edge `cause -> effect`.
    ///
    /// The effect's distribution is dropped because its conditions changed.
    pub fn add_cause_effect(&mut self, cause: &str, effect: &str) -> Result<(), ProbError> {
        if self.graph.vertex(cause).is_some_and(Node::is_continuous) {
            return Err(ProbError::ContinuousParent {
                name: cause.to_string(),
            });
        }
        self.graph.add_edge(cause, effect, ())?;
        if let Some(node) = self.graph.vertex_mut(effect) {
            node.invalidate();
        }
        debug!(cause, effect, "edge added");
        Ok(())
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.graph.vertex(name)
    }

    pub fn parents(&self, name: &str) -> Vec<String> {
        self.graph.parents(name)
    }

    pub fn children(&self, name: &str) -> Vec<String> {
        self.graph.children(name)
    }

    pub fn len(&self) -> usize {
        self.graph.vertex_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Remove every node and edge; the configuration is kept.
    pub fn clear(&mut self) {
        self.graph.clear();
    }

    /// Topological order: fewest parents first, ties broken by name.
    pub fn breadth_first_node_names(&self) -> Vec<String> {
        self.graph.breadth_first_enumerate()
    }

    /// True iff the net has nodes and every node carries a valid
    /// probability function.
    pub fn fully_defined(&self) -> bool {
        !self.graph.is_empty() && self.graph.vertices().all(|(_, n)| n.is_distribution())
    }

    /// The parents of `name` with their ranges, in name order.
    fn parent_ranges(&self, name: &str) -> Result<Vec<(String, ValueRange)>, ProbError> {
        self.graph
            .parents(name)
            .into_iter()
            .map(|p| {
                let range = self
                    .graph
                    .vertex(&p)
                    .and_then(Node::range)
                    .cloned()
                    .ok_or_else(|| ProbError::EmptyRange {
                        variable: p.clone(),
                    })?;
                Ok((p, range))
            })
            .collect()
    }

    /// Train every node on its projection of `table`: its own column, its
    /// parents' columns and, with `has_value_column`, the table's last column.
    ///
    /// A node that fails keeps its previous distribution; the failure is
    /// recorded in the report and the other nodes still train.
    pub fn train_with_table<S: TableSource + ?Sized>(
        &mut self,
        table: &S,
        has_value_column: bool,
    ) -> Result<TrainingReport, ProbError> {
        let value_column = if has_value_column {
            let last = table.columns().checked_sub(1).and_then(|i| table.header(i));
            Some(
                last.ok_or_else(|| ProbError::InvalidParameter {
                    name: "table".to_string(),
                    reason: "a value column was requested but the table has no columns"
                        .to_string(),
                })?
                .to_string(),
            )
        } else {
            None
        };

        let mut report = TrainingReport::default();
        for name in self.breadth_first_node_names() {
            match self.train_node(table, &name, value_column.as_deref()) {
                Ok(()) => report.trained.push(name),
                Err(e) => {
                    warn!(node = %name, error = %e, "training failed");
                    report.failed.push((name, e));
                }
            }
        }
        self.refresh_apriori();
        debug!(
            trained = report.trained.len(),
            failed = report.failed.len(),
            "training pass finished"
        );
        Ok(report)
    }

    fn train_node<S: TableSource + ?Sized>(
        &mut self,
        table: &S,
        name: &str,
        value_column: Option<&str>,
    ) -> Result<(), ProbError> {
        let needs_range = self.graph.vertex(name).is_some_and(|n| n.range().is_none());
        if needs_range {
            let range = table
                .sub_range(name)
                .map_err(|e| ProbError::training(name, e.into()))?;
            if let Some(node) = self.graph.vertex_mut(name) {
                node.set_range(range);
            }
        }

        let parents = self
            .parent_ranges(name)
            .map_err(|e| ProbError::training(name, e))?;
        let mut columns: Vec<&str> = vec![name];
        columns.extend(parents.iter().map(|(p, _)| p.as_str()));
        columns.extend(value_column);
        let projected = table
            .project(&columns)
            .map_err(|e| ProbError::training(name, e.into()))?;

        let node = self
            .graph
            .vertex_mut(name)
            .ok_or_else(|| ProbError::UnknownVariable {
                name: name.to_string(),
            })?;
        node.train(&projected, &parents, value_column.is_some())
    }

    /// Apply `step` to every node in breadth-first order, then refresh the
    /// a-priori marginals.
    fn for_each_node(
        &mut self,
        step: impl Fn(&mut Node, &[(String, ValueRange)]) -> Result<(), ProbError>,
    ) -> Result<(), ProbError> {
        for name in self.breadth_first_node_names() {
            let parents = self.parent_ranges(&name)?;
            if let Some(node) = self.graph.vertex_mut(&name) {
                step(node, &parents)?;
            }
        }
        self.refresh_apriori();
        Ok(())
    }

    /// Replace every discrete distribution with the uniform table.
    pub fn make_uniform(&mut self) -> Result<(), ProbError> {
        self.for_each_node(|node, parents| node.make_uniform(parents))
    }

    /// Materialise every table over its declared ranges; untrained nodes
    /// become uniform.
    pub fn canonise(&mut self) -> Result<(), ProbError> {
        self.for_each_node(|node, parents| node.canonise(parents))
    }

    /// Normalise every table.
    pub fn normalise(&mut self) -> Result<(), ProbError> {
        self.for_each_node(|node, _| {
            node.normalise();
            Ok(())
        })
    }

    /// Recompute each discrete node's a-priori marginal by forward
    /// marginalisation over its parents' marginals.
    fn refresh_apriori(&mut self) {
        for name in self.breadth_first_node_names() {
            let marginal = match self.graph.vertex(&name).and_then(Node::distribution) {
                Some(Distribution::Discrete(cpt)) if cpt.is_distribution() => {
                    let weights = AprioriWeights { graph: &self.graph };
                    match cpt.marginal(&weights) {
                        Ok(m) => Some(m),
                        Err(e) => {
                            warn!(node = %name, error = %e, "a-priori marginal unavailable");
                            None
                        }
                    }
                }
                _ => None,
            };
            if let Some(node) = self.graph.vertex_mut(&name) {
                node.set_apriori(marginal);
            }
        }
    }

    /// The observed conditions `query` does not depend on.
    pub fn irrelevant(&self, query: &CondEvent) -> BTreeSet<String> {
        bayes_ball(&self.graph, query).irrelevant
    }

    /// `P(query)`. Failures are logged and reported as 0.
    pub fn p(&self, query: &CondEvent) -> f64 {
        match self.evaluate(query, true) {
            Ok(p) => p,
            Err(e) => {
                warn!(query = %query, error = %e, "probability reported as 0");
                0.0
            }
        }
    }

    /// `P(query)` with errors surfaced.
    pub fn try_p(&self, query: &CondEvent) -> Result<f64, ProbError> {
        self.evaluate(query, true)
    }

    /// `P(query)`, optionally skipping the Bayes-Ball pass. Both paths
    /// give the same value; pruning only shrinks the factors.
    pub fn evaluate(&self, query: &CondEvent, prune: bool) -> Result<f64, ProbError> {
        if query.events().is_empty() {
            return Ok(1.0);
        }
        if let Some(unknown) = query.events().names().find(|n| !self.graph.contains(n)) {
            return Err(ProbError::UnknownVariable {
                name: unknown.to_string(),
            });
        }

        let query = if prune {
            let irrelevant = self.irrelevant(query);
            query.filter_conditions(|n| !irrelevant.contains(n), &[] as &[&str])?
        } else {
            query.clone()
        };

        let order = self.breadth_first_node_names();
        let weights = AprioriWeights { graph: &self.graph };
        let mut log_p = 0.0;
        for factor in query.chain_rule(&order)? {
            let Some(variable) = factor.events().names().next() else {
                continue;
            };
            let node = self
                .graph
                .vertex(variable)
                .ok_or_else(|| ProbError::UnknownVariable {
                    name: variable.to_string(),
                })?;
            let parents = self.graph.parents(variable);
            let local = factor.filter_conditions(|n| parents.iter().any(|p| p == n), &parents)?;
            let p = node.probability(&local, &weights)?;
            if !p.is_finite() {
                return Err(ProbError::NonFinite {
                    query: local.to_string(),
                });
            }
            if p <= 0.0 {
                return Ok(0.0);
            }
            log_p += p.ln();
        }
        Ok(log_p.exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bayesnet_core::{ErrorClass, Event, EventCatenation, Kind};
    use bayesnet_table::Table;

    const TOL: f64 = 1e-10;

    fn chain() -> BayesNet {
        let mut net = BayesNet::new();
        for v in ["X", "Y", "Z"] {
            net.add_node(v, Some(ValueRange::boolean()), None);
        }
        net.add_cause_effect("X", "Y").unwrap();
        net.add_cause_effect("Y", "Z").unwrap();
        net
    }

    fn trained_chain() -> BayesNet {
        let mut net = chain();
        let rows: &[&[&str]] = &[
            &["true", "true", "true"],
            &["true", "true", "false"],
            &["true", "false", "false"],
            &["false", "false", "false"],
            &["false", "false", "true"],
            &["false", "true", "true"],
            &["false", "false", "false"],
        ];
        let table = Table::from_text(
            &[("X", Kind::Bool), ("Y", Kind::Bool), ("Z", Kind::Bool)],
            rows,
        )
        .unwrap();
        let report = net.train_with_table(&table, false).unwrap();
        assert!(report.is_complete());
        net
    }

    fn cond(events: Vec<Event>, conditions: Vec<Event>) -> CondEvent {
        CondEvent::new(
            EventCatenation::from_events(events).unwrap(),
            EventCatenation::from_events(conditions).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_add_node_idempotent() {
        let mut net = BayesNet::new();
        assert!(net.add_node("A", Some(ValueRange::boolean()), Some("first")));
        assert!(!net.add_node("A", None, Some("second")));
        assert_eq!(net.node("A").unwrap().description(), Some("first"));
        assert_eq!(net.len(), 1);
    }

    #[test]
    fn test_cycle_surfaces_as_structural() {
        let mut net = chain();
        let err = net.add_cause_effect("Z", "X").unwrap_err();
        assert_eq!(err.class(), ErrorClass::Structural);
    }

    #[test]
    fn test_continuous_cause_rejected() {
        let mut net = chain();
        net.add_node(
            "T",
            Some(ValueRange::continuous(bayesnet_core::ContinuousFamily::Gaussian)),
            None,
        );
        assert!(matches!(
            net.add_cause_effect("T", "X"),
            Err(ProbError::ContinuousParent { .. })
        ));
        net.add_cause_effect("X", "T").unwrap();
    }

    #[test]
    fn test_edge_invalidates_effect() {
        let mut net = chain();
        net.canonise().unwrap();
        assert!(net.fully_defined());
        net.add_node("W", Some(ValueRange::boolean()), None);
        net.add_cause_effect("W", "Z").unwrap();
        assert!(net.node("Z").unwrap().distribution().is_none());
        assert!(!net.fully_defined());
    }

    #[test]
    fn test_training_computes_apriori() {
        let net = trained_chain();
        let x = net.node("X").unwrap().apriori().unwrap();
        assert!((x.get(&Value::Bool(true)) - 3.0 / 7.0).abs() < TOL);
        let y = net.node("Y").unwrap().apriori().unwrap();
        assert!((y.total() - 1.0).abs() < TOL);
    }

    #[test]
    fn test_pruning_keeps_value() {
        let net = trained_chain();
        let q = cond(
            vec![Event::equals("Z", true)],
            vec![Event::equals("X", true), Event::equals("Y", true)],
        );
        assert_eq!(net.irrelevant(&q).into_iter().collect::<Vec<_>>(), vec!["X"]);
        let pruned = net.evaluate(&q, true).unwrap();
        let full = net.evaluate(&q, false).unwrap();
        assert!((pruned - full).abs() < TOL);
        // Z=true given Y=true: 2 of 3 rows
        assert!((pruned - 2.0 / 3.0).abs() < TOL);
    }

    #[test]
    fn test_chain_rule_product() {
        let net = trained_chain();
        let joint = net.p(&cond(
            vec![
                Event::equals("X", true),
                Event::equals("Y", true),
                Event::equals("Z", false),
            ],
            vec![],
        ));
        let px = net.p(&cond(vec![Event::equals("X", true)], vec![]));
        let py = net.p(&cond(vec![Event::equals("Y", true)], vec![Event::equals("X", true)]));
        let pz = net.p(&cond(
            vec![Event::equals("Z", false)],
            vec![Event::equals("X", true), Event::equals("Y", true)],
        ));
        assert!((joint - px * py * pz).abs() < TOL);
        assert!(joint > 0.0);
    }

    #[test]
    fn test_p_is_total() {
        let net = chain();
        // untrained
        assert_eq!(net.p(&cond(vec![Event::equals("X", true)], vec![])), 0.0);
        assert!(matches!(
            net.try_p(&cond(vec![Event::equals("X", true)], vec![])),
            Err(ProbError::NoDistribution { .. })
        ));
        // unknown variable
        assert_eq!(net.p(&cond(vec![Event::equals("Q", true)], vec![])), 0.0);
        // empty event list
        assert_eq!(net.p(&CondEvent::default()), 1.0);
    }

    #[test]
    fn test_range_discovery() {
        let mut net = BayesNet::new();
        net.add_node("Colour", None, None);
        let table = Table::from_text(
            &[("Colour", Kind::String)],
            &[&["red"], &["blue"], &["red"], &["red"]],
        )
        .unwrap();
        net.train_with_table(&table, false).unwrap();
        assert_eq!(net.node("Colour").unwrap().range().unwrap().len(), 2);
        let p = net.p(&cond(vec![Event::equals("Colour", "red")], vec![]));
        assert!((p - 0.75).abs() < TOL);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let mut net = chain();
        let table = Table::from_text(&[("X", Kind::Bool)], &[&["true"]]).unwrap();
        let report = net.train_with_table(&table, false).unwrap();
        assert_eq!(report.trained, vec!["X"]);
        assert_eq!(report.failed.len(), 2);
        assert!(net.node("X").unwrap().is_distribution());
    }

    #[test]
    fn test_with_config_validates() {
        let config = NetConfig {
            numerical_epsilon: 0.0,
            ..NetConfig::default()
        };
        assert!(BayesNet::with_config(config).is_err());

        let mut net = BayesNet::with_config(NetConfig {
            allow_parallel_edges: true,
            ..NetConfig::default()
        })
        .unwrap();
        net.add_node("A", Some(ValueRange::boolean()), None);
        net.add_node("B", Some(ValueRange::boolean()), None);
        net.add_cause_effect("A", "B").unwrap();
        net.add_cause_effect("A", "B").unwrap();
        assert_eq!(net.parents("B"), vec!["A"]);
    }

    #[test]
    fn test_clear() {
        let mut net = trained_chain();
        net.clear();
        assert!(net.is_empty());
        assert!(!net.fully_defined());
    }
}
