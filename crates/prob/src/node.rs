//! Nodes of a Bayesian network.
//!
//! A node is one random variable: its range, its distribution given its
//! parents, and the a-priori marginal the net derives after training.

use std::fmt;

use bayesnet_core::{CondEvent, ValueRange};
use bayesnet_table::TableSource;
use tracing::debug;

use crate::continuous::ContinuousLeaf;
use crate::cpt::{ConditionWeights, DiscreteProbability, Marginal};
use crate::error::ProbError;

/// The distribution attached to a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Distribution {
    Discrete(DiscreteProbability),
    Continuous(ContinuousLeaf),
}

impl Distribution {
    pub fn is_distribution(&self) -> bool {
        match self {
            Distribution::Discrete(cpt) => cpt.is_distribution(),
            Distribution::Continuous(_) => true,
        }
    }

    pub fn as_discrete(&self) -> Option<&DiscreteProbability> {
        match self {
            Distribution::Discrete(cpt) => Some(cpt),
            Distribution::Continuous(_) => None,
        }
    }
}

/// A random variable of the net.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    description: Option<String>,
    range: Option<ValueRange>,
    distribution: Option<Distribution>,
    apriori: Option<Marginal>,
    epsilon: f64,
}

impl Node {
    pub fn new(name: &str, range: Option<ValueRange>, description: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            description: description.map(str::to_string),
            range,
            distribution: None,
            apriori: None,
            epsilon: crate::DEFAULT_EPSILON,
        }
    }

    pub(crate) fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn range(&self) -> Option<&ValueRange> {
        self.range.as_ref()
    }

    pub fn distribution(&self) -> Option<&Distribution> {
        self.distribution.as_ref()
    }

    /// The a-priori marginal, once the net has derived it.
    pub fn apriori(&self) -> Option<&Marginal> {
        self.apriori.as_ref()
    }

    pub fn is_continuous(&self) -> bool {
        self.range.as_ref().is_some_and(|r| !r.is_discrete())
    }

    /// Carries a probability function with valid probabilities.
    pub fn is_distribution(&self) -> bool {
        self.distribution
            .as_ref()
            .is_some_and(Distribution::is_distribution)
    }

    pub(crate) fn set_range(&mut self, range: ValueRange) {
        self.range = Some(range);
        self.invalidate();
    }

    pub(crate) fn set_apriori(&mut self, apriori: Option<Marginal>) {
        self.apriori = apriori;
    }

    /// Drop the distribution and the a-priori marginal.
    pub(crate) fn invalidate(&mut self) {
        self.distribution = None;
        self.apriori = None;
    }

    fn fresh_table(&self, parents: &[(String, ValueRange)]) -> Result<DiscreteProbability, ProbError> {
        let range = self.range.clone().ok_or_else(|| ProbError::EmptyRange {
            variable: self.name.clone(),
        })?;
        Ok(DiscreteProbability::new(&self.name, range, parents.to_vec())?.with_epsilon(self.epsilon))
    }

    /// Train on `table`, which must hold this node's column and one column
    /// per parent (plus the value column when `has_value_column`).
    ///
    /// On error the previous distribution is kept.
    pub fn train<S: TableSource + ?Sized>(
        &mut self,
        table: &S,
        parents: &[(String, ValueRange)],
        has_value_column: bool,
    ) -> Result<(), ProbError> {
        match self.fit(table, parents, has_value_column) {
            Ok(distribution) => {
                debug!(node = %self.name, parents = parents.len(), "node trained");
                self.distribution = Some(distribution);
                Ok(())
            }
            Err(e) => Err(ProbError::training(&self.name, e)),
        }
    }

    fn fit<S: TableSource + ?Sized>(
        &self,
        table: &S,
        parents: &[(String, ValueRange)],
        has_value_column: bool,
    ) -> Result<Distribution, ProbError> {
        match &self.range {
            Some(ValueRange::Continuous(family)) => {
                let column = table
                    .column_index(&self.name)
                    .ok_or_else(|| ProbError::UnknownVariable {
                        name: self.name.clone(),
                    })?;
                let samples = (0..table.rows())
                    .filter_map(|row| table.cell(column, row))
                    .map(|v| {
                        v.as_f64().ok_or_else(|| ProbError::ValueNotInRange {
                            variable: self.name.clone(),
                            value: v.to_string(),
                        })
                    })
                    .collect::<Result<Vec<f64>, _>>()?;
                Ok(Distribution::Continuous(ContinuousLeaf::fit(
                    *family, &self.name, &samples,
                )?))
            }
            _ => {
                let mut cpt = self.fresh_table(parents)?;
                cpt.train(table, has_value_column)?;
                Ok(Distribution::Discrete(cpt))
            }
        }
    }

    /// Replace a discrete distribution with the uniform table over `parents`.
    pub fn make_uniform(&mut self, parents: &[(String, ValueRange)]) -> Result<(), ProbError> {
        if self.is_continuous() {
            return Ok(());
        }
        let mut cpt = self.fresh_table(parents)?;
        cpt.uniform()?;
        self.distribution = Some(Distribution::Discrete(cpt));
        Ok(())
    }

    /// Canonise the table, creating a fresh (hence uniform) one if the node
    /// has none yet.
    pub fn canonise(&mut self, parents: &[(String, ValueRange)]) -> Result<(), ProbError> {
        if self.is_continuous() {
            return Ok(());
        }
        match &mut self.distribution {
            Some(Distribution::Discrete(cpt)) => cpt.canonise(),
            _ => {
                let mut cpt = self.fresh_table(parents)?;
                cpt.canonise()?;
                self.distribution = Some(Distribution::Discrete(cpt));
                Ok(())
            }
        }
    }

    pub fn normalise(&mut self) {
        if let Some(Distribution::Discrete(cpt)) = &mut self.distribution {
            cpt.normalise();
        }
    }

    /// Evaluate a single-variable query whose conditions are this node's
    /// parents.
    pub fn probability(
        &self,
        query: &CondEvent,
        weights: &dyn ConditionWeights,
    ) -> Result<f64, ProbError> {
        let distribution = self
            .distribution
            .as_ref()
            .ok_or_else(|| ProbError::NoDistribution {
                name: self.name.clone(),
            })?;
        if !distribution.is_distribution() {
            return Err(ProbError::NotADistribution {
                name: self.name.clone(),
            });
        }
        match distribution {
            Distribution::Discrete(cpt) => cpt.p_with(query, weights),
            Distribution::Continuous(leaf) => match query.events().get(&self.name) {
                Some(event) => leaf.probability(event),
                None => Ok(1.0),
            },
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(range) = &self.range {
            write!(f, " ∈ {}", range)?;
        }
        if let Some(desc) = &self.description {
            write!(f, " ({})", desc)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpt::UniformWeights;
    use bayesnet_core::{ContinuousFamily, Event, EventCatenation, Interval, Kind};
    use bayesnet_table::Table;

    #[test]
    fn test_train_continuous_leaf() {
        let table = Table::from_text(
            &[("Wait", Kind::Float)],
            &[&["1"], &["0.5"], &["0.1"], &["1"], &["0.2"], &["5.7"], &["7"]],
        )
        .unwrap();
        let mut node = Node::new(
            "Wait",
            Some(ValueRange::continuous(ContinuousFamily::Exponential)),
            None,
        );
        node.train(&table, &[], false).unwrap();
        assert!(node.is_distribution());

        let q = CondEvent::marginal(EventCatenation::single(Event::element_of(
            "Wait",
            Interval::at_least(15.5 * std::f64::consts::LN_2 / 7.0),
        )));
        let p = node.probability(&q, &UniformWeights).unwrap();
        assert!((p - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_failed_training_keeps_previous_distribution() {
        let mut node = Node::new(
            "Wait",
            Some(ValueRange::continuous(ContinuousFamily::Exponential)),
            Some("minutes"),
        );
        let good = Table::from_text(&[("Wait", Kind::Float)], &[&["2"]]).unwrap();
        node.train(&good, &[], false).unwrap();
        let before = node.distribution().cloned();

        let bad = Table::from_text(&[("Wait", Kind::Float)], &[&["-2"]]).unwrap();
        let err = node.train(&bad, &[], false).unwrap_err();
        assert!(matches!(err, ProbError::Training { ref variable, .. } if variable == "Wait"));
        assert_eq!(err.class(), bayesnet_core::ErrorClass::Range);
        assert_eq!(node.distribution().cloned(), before);
    }

    #[test]
    fn test_canonise_without_range_fails() {
        let mut node = Node::new("X", None, None);
        assert!(matches!(
            node.canonise(&[]),
            Err(ProbError::EmptyRange { .. })
        ));
    }

    #[test]
    fn test_untrained_probability() {
        let node = Node::new("X", Some(ValueRange::boolean()), None);
        let q = CondEvent::given(Event::equals("X", true), []).unwrap();
        assert!(matches!(
            node.probability(&q, &UniformWeights),
            Err(ProbError::NoDistribution { .. })
        ));
    }

    #[test]
    fn test_make_uniform_with_parent() {
        let mut node = Node::new("X", Some(ValueRange::boolean()), None);
        node.make_uniform(&[("P".to_string(), ValueRange::boolean())])
            .unwrap();
        let q = CondEvent::given(Event::equals("X", false), [Event::equals("P", true)]).unwrap();
        assert!((node.probability(&q, &UniformWeights).unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(node.to_string(), "X ∈ bool{false, true}");
    }
}
