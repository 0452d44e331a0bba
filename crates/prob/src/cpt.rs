//! Conditional probability tables.
//!
//! A [`DiscreteProbability`] is `P(event | conditions)` for one discrete
//! event variable and zero or more discrete condition variables, stored as
//! a nested mapping
//!
//! ```text
//! condition-assignment -> event-value -> probability
//! ```
//!
//! Rows are keyed by the condition values in the table's condition order.
//!
//! ## Lifecycle
//!
//! `Fresh -> Trained -> Canonised -> Normalised`. Setting a cell or
//! extending a range drops a table back to `Trained`.
//!
//! ## Marginalisation
//!
//! A query that leaves a condition variable unbound (or only restricts it
//! with a predicate) is answered as the weighted average of the admissible
//! rows. The weights come from a [`ConditionWeights`]; [`UniformWeights`]
//! gives the plain average over the range.

use std::collections::BTreeMap;

use bayesnet_core::{CondEvent, Event, EventCatenation, Value, ValueRange};
use bayesnet_table::TableSource;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ProbError;
use crate::DEFAULT_EPSILON;

/// Where a table is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TableState {
    /// No data and no initialisation yet.
    Fresh,
    /// Holds trained or hand-set cells.
    Trained,
    /// Every cell of the declared product exists.
    Canonised,
    /// Every non-zero row sums to one.
    Normalised,
}

/// Weight of each value of a condition variable when it is marginalised.
pub trait ConditionWeights {
    fn weight(&self, variable: &str, value: &Value) -> f64;
}

/// Every value weighs the same.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformWeights;

impl ConditionWeights for UniformWeights {
    fn weight(&self, _variable: &str, _value: &Value) -> f64 {
        1.0
    }
}

/// The marginal distribution `P(variable = x)` of one discrete variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Marginal {
    variable: String,
    probabilities: BTreeMap<Value, f64>,
}

impl Marginal {
    pub fn new(variable: &str, probabilities: BTreeMap<Value, f64>) -> Self {
        Self {
            variable: variable.to_string(),
            probabilities,
        }
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// `P(variable = value)`, 0 for values outside the range.
    pub fn get(&self, value: &Value) -> f64 {
        self.probabilities.get(value).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, f64)> {
        self.probabilities.iter().map(|(v, p)| (v, *p))
    }

    pub fn total(&self) -> f64 {
        self.probabilities.values().sum()
    }
}

/// A conditional probability table over discrete variables.
///
/// # Example
///
/// ```rust
/// use bayesnet_core::{CondEvent, Event, ValueRange};
/// use bayesnet_prob::DiscreteProbability;
///
/// let mut cpt = DiscreteProbability::new(
///     "Rain",
///     ValueRange::boolean(),
///     vec![("Cloud".to_string(), ValueRange::boolean())],
/// )
/// .unwrap();
/// cpt.uniform().unwrap();
///
/// let q = CondEvent::given(Event::equals("Rain", true), [Event::equals("Cloud", false)]).unwrap();
/// assert!((cpt.p(&q).unwrap() - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteProbability {
    event: String,
    event_range: ValueRange,
    conditions: Vec<(String, ValueRange)>,
    cells: BTreeMap<Vec<Value>, BTreeMap<Value, f64>>,
    state: TableState,
    presumed_normalised: bool,
    epsilon: f64,
}

impl DiscreteProbability {
    /// An empty table. Every range must be discrete.
    pub fn new(
        event: &str,
        event_range: ValueRange,
        conditions: Vec<(String, ValueRange)>,
    ) -> Result<Self, ProbError> {
        if !event_range.is_discrete() {
            return Err(ProbError::InvalidParameter {
                name: event.to_string(),
                reason: format!("a table needs a discrete range, got {}", event_range),
            });
        }
        if let Some((name, _)) = conditions.iter().find(|(_, r)| !r.is_discrete()) {
            return Err(ProbError::ContinuousParent { name: name.clone() });
        }
        Ok(Self {
            event: event.to_string(),
            event_range,
            conditions,
            cells: BTreeMap::new(),
            state: TableState::Fresh,
            presumed_normalised: false,
            epsilon: DEFAULT_EPSILON,
        })
    }

    /// Tolerance for row sums.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn event_name(&self) -> &str {
        &self.event
    }

    pub fn event_range(&self) -> &ValueRange {
        &self.event_range
    }

    pub fn conditions(&self) -> &[(String, ValueRange)] {
        &self.conditions
    }

    pub fn condition_names(&self) -> impl Iterator<Item = &str> {
        self.conditions.iter().map(|(n, _)| n.as_str())
    }

    pub fn state(&self) -> TableState {
        self.state
    }

    /// Trained from a probability column rather than from frequencies.
    pub fn presumed_normalised(&self) -> bool {
        self.presumed_normalised
    }

    /// Number of stored cells.
    pub fn len(&self) -> usize {
        self.cells.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn touch(&mut self) {
        if self.state > TableState::Trained {
            self.state = TableState::Trained;
        }
    }

    fn check_in_range(variable: &str, range: &ValueRange, value: &Value) -> Result<(), ProbError> {
        if range.contains(value) {
            Ok(())
        } else {
            Err(ProbError::ValueNotInRange {
                variable: variable.to_string(),
                value: value.to_string(),
            })
        }
    }

    fn check_conditions(&self, condition_values: &[Value]) -> Result<(), ProbError> {
        if condition_values.len() != self.conditions.len() {
            return Err(ProbError::InvalidParameter {
                name: self.event.clone(),
                reason: format!(
                    "expected {} condition values, got {}",
                    self.conditions.len(),
                    condition_values.len()
                ),
            });
        }
        for ((name, range), value) in self.conditions.iter().zip(condition_values) {
            Self::check_in_range(name, range, value)?;
        }
        Ok(())
    }

    /// Set one cell.
    pub fn set(
        &mut self,
        event_value: Value,
        condition_values: &[Value],
        probability: f64,
    ) -> Result<(), ProbError> {
        Self::check_in_range(&self.event, &self.event_range, &event_value)?;
        self.check_conditions(condition_values)?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(ProbError::InvalidProbability {
                variable: self.event.clone(),
                value: probability,
            });
        }
        self.cells
            .entry(condition_values.to_vec())
            .or_default()
            .insert(event_value, probability);
        if self.state == TableState::Fresh {
            self.state = TableState::Trained;
        }
        self.touch();
        Ok(())
    }

    /// The stored cell, if any.
    pub fn get(&self, event_value: &Value, condition_values: &[Value]) -> Option<f64> {
        self.cells
            .get(condition_values)
            .and_then(|row| row.get(event_value))
            .copied()
    }

    /// Add a value to the range of the event or of a condition.
    pub fn extend_range(&mut self, variable: &str, value: Value) -> Result<bool, ProbError> {
        let range = if variable == self.event {
            &mut self.event_range
        } else {
            self.conditions
                .iter_mut()
                .find(|(n, _)| n == variable)
                .map(|(_, r)| r)
                .ok_or_else(|| ProbError::UnknownVariable {
                    name: variable.to_string(),
                })?
        };
        let added = range.add(value)?;
        if added {
            self.touch();
        }
        Ok(added)
    }

    /// Replace the table with one trained on `table`.
    ///
    /// Without a value column every row is one observation; counts are
    /// normalised per condition assignment at the end. With a value column
    /// (the last column) each row sets its cell directly. On error the
    /// table is left unchanged.
    pub fn train<S: TableSource + ?Sized>(
        &mut self,
        table: &S,
        has_value_column: bool,
    ) -> Result<(), ProbError> {
        if table.rows() == 0 {
            return Err(ProbError::EmptySample {
                variable: self.event.clone(),
            });
        }
        self.require_ranges()?;

        let column = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| ProbError::UnknownVariable {
                    name: name.to_string(),
                })
        };
        let event_column = column(&self.event)?;
        let condition_columns = self
            .conditions
            .iter()
            .map(|(name, _)| column(name))
            .collect::<Result<Vec<_>, _>>()?;
        let value_column = if has_value_column {
            Some(table.columns().checked_sub(1).ok_or_else(|| {
                ProbError::InvalidParameter {
                    name: self.event.clone(),
                    reason: "table has no value column".to_string(),
                }
            })?)
        } else {
            None
        };

        let read = |col: usize, row: usize, variable: &str| {
            table.cell(col, row).ok_or_else(|| ProbError::UnknownVariable {
                name: variable.to_string(),
            })
        };

        let mut cells: BTreeMap<Vec<Value>, BTreeMap<Value, f64>> = BTreeMap::new();
        for row in 0..table.rows() {
            let event_value = read(event_column, row, &self.event)?;
            Self::check_in_range(&self.event, &self.event_range, &event_value)?;
            let mut condition_values = Vec::with_capacity(condition_columns.len());
            for ((name, range), &col) in self.conditions.iter().zip(&condition_columns) {
                let value = read(col, row, name)?;
                Self::check_in_range(name, range, &value)?;
                condition_values.push(value);
            }

            let slot = cells
                .entry(condition_values)
                .or_default()
                .entry(event_value)
                .or_insert(0.0);
            match value_column {
                Some(col) => {
                    let cell = read(col, row, &self.event)?;
                    let p = cell.as_f64().filter(|p| (0.0..=1.0).contains(p)).ok_or_else(|| {
                        ProbError::InvalidProbability {
                            variable: self.event.clone(),
                            value: cell.as_f64().unwrap_or(f64::NAN),
                        }
                    })?;
                    *slot = p;
                }
                None => *slot += 1.0,
            }
        }

        if value_column.is_none() {
            for row in cells.values_mut() {
                let total: f64 = row.values().sum();
                for p in row.values_mut() {
                    *p /= total;
                }
            }
        }

        self.cells = cells;
        self.state = TableState::Trained;
        self.presumed_normalised = has_value_column;
        debug!(
            variable = %self.event,
            rows = table.rows(),
            cells = self.len(),
            "trained table"
        );
        if has_value_column && !self.rows_sum_to_one() {
            warn!(
                variable = %self.event,
                "probability column does not sum to one per condition; call normalise"
            );
        }
        Ok(())
    }

    fn require_ranges(&self) -> Result<(), ProbError> {
        if self.event_range.is_empty() {
            return Err(ProbError::EmptyRange {
                variable: self.event.clone(),
            });
        }
        if let Some((name, _)) = self.conditions.iter().find(|(_, r)| r.is_empty()) {
            return Err(ProbError::EmptyRange {
                variable: name.clone(),
            });
        }
        Ok(())
    }

    /// Every condition assignment of the declared ranges, in range order.
    fn condition_assignments(&self) -> Vec<Vec<Value>> {
        let ranges: Vec<Vec<Value>> = self
            .conditions
            .iter()
            .map(|(_, r)| r.values().to_vec())
            .collect();
        cartesian(&ranges)
    }

    /// `1 / |range|` for every cell.
    pub fn uniform(&mut self) -> Result<(), ProbError> {
        self.require_ranges()?;
        let p = 1.0 / self.event_range.len() as f64;
        let row: BTreeMap<Value, f64> = self.event_range.iter().map(|v| (v.clone(), p)).collect();
        self.cells = self
            .condition_assignments()
            .into_iter()
            .map(|c| (c, row.clone()))
            .collect();
        self.state = TableState::Normalised;
        self.presumed_normalised = false;
        Ok(())
    }

    /// Materialise the full product of ranges, missing cells becoming 0.
    ///
    /// A fresh table has no cells to keep and becomes uniform instead.
    pub fn canonise(&mut self) -> Result<(), ProbError> {
        if self.state == TableState::Fresh {
            return self.uniform();
        }
        self.require_ranges()?;
        for assignment in self.condition_assignments() {
            let row = self.cells.entry(assignment).or_default();
            for v in self.event_range.iter() {
                row.entry(v.clone()).or_insert(0.0);
            }
        }
        if self.state < TableState::Canonised {
            self.state = TableState::Canonised;
        }
        Ok(())
    }

    /// Scale every row whose sum exceeds epsilon to sum to one.
    pub fn normalise(&mut self) {
        if self.state == TableState::Fresh {
            return;
        }
        for row in self.cells.values_mut() {
            let total: f64 = row.values().sum();
            if total > self.epsilon {
                for p in row.values_mut() {
                    *p /= total;
                }
            }
        }
        self.state = TableState::Normalised;
    }

    /// Sum of each stored row.
    pub fn row_sums(&self) -> BTreeMap<Vec<Value>, f64> {
        self.cells
            .iter()
            .map(|(c, row)| (c.clone(), row.values().sum()))
            .collect()
    }

    fn rows_sum_to_one(&self) -> bool {
        self.cells
            .values()
            .all(|row| (row.values().sum::<f64>() - 1.0).abs() <= self.epsilon)
    }

    /// Holds valid probabilities: cells in `[0, 1]`, and every row sums to
    /// 1 (or to 0, for condition assignments never observed), with at least
    /// one row summing to 1.
    pub fn is_distribution(&self) -> bool {
        if self.cells.is_empty() {
            return false;
        }
        let cells_valid = self
            .cells
            .values()
            .flat_map(BTreeMap::values)
            .all(|p| p.is_finite() && (0.0..=1.0).contains(p));
        let sums: Vec<f64> = self.cells.values().map(|row| row.values().sum()).collect();
        let one = |s: &f64| (s - 1.0).abs() <= self.epsilon;
        cells_valid && sums.iter().all(|s| one(s) || *s == 0.0) && sums.iter().any(one)
    }

    /// `P(query)` with unbound conditions averaged uniformly.
    pub fn p(&self, query: &CondEvent) -> Result<f64, ProbError> {
        self.p_with(query, &UniformWeights)
    }

    /// `P(query)` with unbound or predicate-restricted conditions averaged
    /// under `weights`.
    ///
    /// The query's events may only name the table's event variable; a
    /// missing or placeholder event admits the whole range. Conditions on
    /// variables the table does not know are ignored.
    pub fn p_with(
        &self,
        query: &CondEvent,
        weights: &dyn ConditionWeights,
    ) -> Result<f64, ProbError> {
        if let Some(other) = query.events().names().find(|n| *n != self.event) {
            return Err(ProbError::UnknownVariable {
                name: other.to_string(),
            });
        }
        let event_filter = query.events().get(&self.event);
        let admitted_events: Vec<&Value> = self
            .event_range
            .iter()
            .filter(|v| event_filter.map_or(true, |e| e.admits(v)))
            .collect();

        // Admissible values of each condition with their weights.
        let mut admitted: Vec<Vec<(Value, f64)>> = Vec::with_capacity(self.conditions.len());
        let mut denominator = 1.0;
        for (name, range) in &self.conditions {
            let filter: Option<&Event> = query.conditions().get(name);
            let values: Vec<(Value, f64)> = range
                .iter()
                .filter(|v| filter.map_or(true, |e| e.admits(v)))
                .map(|v| (v.clone(), weights.weight(name, v)))
                .collect();
            let total: f64 = values.iter().map(|(_, w)| w).sum();
            if !(total > 0.0) {
                return Err(ProbError::EmptyCondition {
                    variable: name.clone(),
                });
            }
            denominator *= total;
            admitted.push(values);
        }

        let mut numerator = 0.0;
        for combo in cartesian(&admitted) {
            let (key, weight): (Vec<Value>, f64) = combo
                .into_iter()
                .fold((Vec::new(), 1.0), |(mut key, w), (v, vw)| {
                    key.push(v);
                    (key, w * vw)
                });
            if let Some(row) = self.cells.get(&key) {
                let mass: f64 = admitted_events
                    .iter()
                    .filter_map(|v| row.get(*v))
                    .sum();
                numerator += weight * mass;
            }
        }

        let p = numerator / denominator;
        if !p.is_finite() {
            return Err(ProbError::NonFinite {
                query: query.to_string(),
            });
        }
        Ok(p)
    }

    /// `P(event = x)` for every `x`, averaging the conditions under `weights`.
    pub fn marginal(&self, weights: &dyn ConditionWeights) -> Result<Marginal, ProbError> {
        let mut probabilities = BTreeMap::new();
        for x in self.event_range.iter() {
            let query = CondEvent::marginal(EventCatenation::single(Event::equals(
                self.event.as_str(),
                x.clone(),
            )));
            probabilities.insert(x.clone(), self.p_with(&query, weights)?);
        }
        Ok(Marginal::new(&self.event, probabilities))
    }
}

/// Cartesian product of `sets`; one empty tuple for no sets.
fn cartesian<T: Clone>(sets: &[Vec<T>]) -> Vec<Vec<T>> {
    sets.iter().fold(vec![Vec::new()], |acc, set| {
        acc.iter()
            .flat_map(|prefix| {
                set.iter().map(move |item| {
                    let mut next = prefix.clone();
                    next.push(item.clone());
                    next
                })
            })
            .collect()
    })
}
