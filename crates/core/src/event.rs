//! # Events - Propositions over Named Variables
//!
//! - [`Event`]: binds one variable to a value through a [`Predicate`]
//! - [`EventCatenation`]: a conjunction of events over distinct variables
//! - [`CondEvent`]: `P(events | conditions)`
//!
//! Catenations keep their events sorted by name, so two catenations built
//! from the same events compare and hash equal regardless of input order.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::value::Value;

/// How an event's reference value is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Predicate {
    Equals,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    /// The reference value is an interval; candidates must lie inside it.
    ElementOf,
    /// Names the variable without constraining it.
    Placeholder,
}

impl Predicate {
    fn symbol(&self) -> &'static str {
        match self {
            Predicate::Equals => "=",
            Predicate::Less => "<",
            Predicate::LessEqual => "<=",
            Predicate::Greater => ">",
            Predicate::GreaterEqual => ">=",
            Predicate::ElementOf => "∈",
            Predicate::Placeholder => "=?",
        }
    }
}

/// A proposition about one variable. Immutable once built.
///
/// Field order gives the derived lexicographic order `(name, predicate, value)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Event {
    name: String,
    predicate: Predicate,
    value: Value,
}

impl Event {
    pub fn new(name: impl Into<String>, value: Value, predicate: Predicate) -> Self {
        Self {
            name: name.into(),
            predicate,
            value,
        }
    }

    pub fn equals(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(name, value.into(), Predicate::Equals)
    }

    pub fn less(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(name, value.into(), Predicate::Less)
    }

    pub fn less_equal(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(name, value.into(), Predicate::LessEqual)
    }

    pub fn greater(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(name, value.into(), Predicate::Greater)
    }

    pub fn greater_equal(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(name, value.into(), Predicate::GreaterEqual)
    }

    /// `name ∈ interval`
    pub fn element_of(name: impl Into<String>, interval: impl Into<Value>) -> Self {
        Self::new(name, interval.into(), Predicate::ElementOf)
    }

    pub fn placeholder(name: impl Into<String>) -> Self {
        Self::new(name, Value::String(String::new()), Predicate::Placeholder)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn predicate(&self) -> Predicate {
        self.predicate
    }

    pub fn is_placeholder(&self) -> bool {
        self.predicate == Predicate::Placeholder
    }

    /// Does `candidate` satisfy this event's predicate?
    ///
    /// Ordering predicates require matching kinds. Placeholders admit
    /// everything.
    pub fn admits(&self, candidate: &Value) -> bool {
        let same_kind = candidate.kind() == self.value.kind();
        match self.predicate {
            Predicate::Equals => candidate == &self.value,
            Predicate::Less => same_kind && candidate < &self.value,
            Predicate::LessEqual => same_kind && candidate <= &self.value,
            Predicate::Greater => same_kind && candidate > &self.value,
            Predicate::GreaterEqual => same_kind && candidate >= &self.value,
            Predicate::ElementOf => self.value.contains(candidate),
            Predicate::Placeholder => true,
        }
    }

    /// Evaluate this event's value against `reference`'s predicate.
    ///
    /// `false` when the names differ, when the kinds do not line up, or
    /// when `self` is a placeholder (it carries no value to test).
    pub fn matches(&self, reference: &Event) -> bool {
        if self.name != reference.name || self.is_placeholder() {
            return false;
        }
        if reference.is_placeholder() {
            return true;
        }
        match self.predicate {
            Predicate::Equals => reference.admits(&self.value),
            Predicate::ElementOf => match reference.predicate {
                Predicate::ElementOf => self.value.is_sub(&reference.value),
                _ => self == reference,
            },
            _ => self == reference,
        }
    }

    /// Two events on the same variable can be held together.
    fn compatible(&self, other: &Event) -> bool {
        self.is_placeholder() || other.is_placeholder() || self == other
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_placeholder() {
            write!(f, "{}{}", self.name, self.predicate.symbol())
        } else {
            write!(f, "{}{}{}", self.name, self.predicate.symbol(), self.value)
        }
    }
}

/// An ordered conjunction of events with pairwise distinct names.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventCatenation {
    events: Vec<Event>,
}

impl EventCatenation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(event: Event) -> Self {
        Self {
            events: vec![event],
        }
    }

    /// Build from events, failing on two incompatible bindings of one name.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bayesnet_core::{Event, EventCatenation};
    ///
    /// let ok = EventCatenation::from_events([
    ///     Event::equals("Cloud", true),
    ///     Event::equals("Rain", "heavy"),
    /// ]);
    /// assert!(ok.is_ok());
    ///
    /// let clash = EventCatenation::from_events([
    ///     Event::equals("Cloud", true),
    ///     Event::equals("Cloud", false),
    /// ]);
    /// assert!(clash.is_err());
    /// ```
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Result<Self, CoreError> {
        let mut cat = Self::new();
        for event in events {
            cat.insert(event)?;
        }
        Ok(cat)
    }

    /// Insert one event. A real event replaces a placeholder of the same
    /// name; a placeholder never replaces anything.
    pub fn insert(&mut self, event: Event) -> Result<(), CoreError> {
        match self.events.binary_search_by(|e| e.name.as_str().cmp(&event.name)) {
            Ok(i) => {
                let existing = &self.events[i];
                if !existing.compatible(&event) {
                    return Err(CoreError::Conflict {
                        name: event.name.clone(),
                        left: existing.to_string(),
                        right: event.to_string(),
                    });
                }
                if existing.is_placeholder() {
                    self.events[i] = event;
                }
                Ok(())
            }
            Err(i) => {
                self.events.insert(i, event);
                Ok(())
            }
        }
    }

    /// Widen with a placeholder for `name` unless it is already bound.
    pub fn insert_placeholder(&mut self, name: &str) {
        if !self.contains(name) {
            // A placeholder is compatible with anything.
            let _ = self.insert(Event::placeholder(name));
        }
    }

    /// The conjunction of `self` and `other`.
    pub fn and(&self, other: &EventCatenation) -> Result<EventCatenation, CoreError> {
        let mut out = self.clone();
        for event in &other.events {
            out.insert(event.clone())?;
        }
        Ok(out)
    }

    /// True iff every shared name is bound identically (placeholders excepted).
    pub fn not_conflicting(&self, other: &EventCatenation) -> bool {
        other.events.iter().all(|e| match self.get(&e.name) {
            Some(mine) => mine.compatible(e),
            None => true,
        })
    }

    /// True iff every event in `other` is satisfied by the event of the
    /// same name in `self`.
    pub fn matches(&self, other: &EventCatenation) -> bool {
        other.events.iter().all(|reference| {
            reference.is_placeholder()
                || self
                    .get(&reference.name)
                    .map(|mine| mine.matches(reference))
                    .unwrap_or(false)
        })
    }

    pub fn get(&self, name: &str) -> Option<&Event> {
        self.events
            .binary_search_by(|e| e.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.events[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The bound (non-placeholder) event for `name`.
    pub fn binding(&self, name: &str) -> Option<&Event> {
        self.get(name).filter(|e| !e.is_placeholder())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(|e| e.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Keep only the events whose name passes `keep`.
    pub fn retain(&self, keep: impl Fn(&str) -> bool) -> EventCatenation {
        EventCatenation {
            events: self
                .events
                .iter()
                .filter(|e| keep(&e.name))
                .cloned()
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a EventCatenation {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for EventCatenation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.events.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", e)?;
        }
        Ok(())
    }
}

/// A conditional event `P(events | conditions)`. Empty conditions denote a
/// marginal.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CondEvent {
    events: EventCatenation,
    conditions: EventCatenation,
}

impl CondEvent {
    /// Pair events with conditions; a variable bound differently on both
    /// sides is a conflict.
    pub fn new(events: EventCatenation, conditions: EventCatenation) -> Result<Self, CoreError> {
        if let Some(clash) = events
            .iter()
            .find(|e| conditions.get(&e.name).is_some_and(|c| !c.compatible(e)))
        {
            let other = conditions.get(&clash.name).map(|c| c.to_string());
            return Err(CoreError::Conflict {
                name: clash.name.clone(),
                left: clash.to_string(),
                right: other.unwrap_or_default(),
            });
        }
        Ok(Self { events, conditions })
    }

    pub fn marginal(events: EventCatenation) -> Self {
        Self {
            events,
            conditions: EventCatenation::new(),
        }
    }

    /// `P(event | conditions)` from single events.
    pub fn given(
        event: Event,
        conditions: impl IntoIterator<Item = Event>,
    ) -> Result<Self, CoreError> {
        Self::new(
            EventCatenation::single(event),
            EventCatenation::from_events(conditions)?,
        )
    }

    pub fn events(&self) -> &EventCatenation {
        &self.events
    }

    pub fn conditions(&self) -> &EventCatenation {
        &self.conditions
    }

    pub fn is_marginal(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Chain-rule decomposition along `order`.
    ///
    /// For events `e₁..eₖ` sorted by their position in `order`, emits
    /// `P(e₁ | C), P(e₂ | e₁, C), …, P(eₖ | e₁..eₖ₋₁, C)`. Every event name must
    /// appear in `order`.
    pub fn chain_rule<S: AsRef<str>>(&self, order: &[S]) -> Result<Vec<CondEvent>, CoreError> {
        let position = |name: &str| order.iter().position(|o| o.as_ref() == name);

        let mut ranked = Vec::with_capacity(self.events.len());
        for event in &self.events {
            let rank = position(&event.name).ok_or_else(|| CoreError::MissingFromOrder {
                name: event.name.clone(),
            })?;
            ranked.push((rank, event));
        }
        ranked.sort_by_key(|(rank, _)| *rank);

        let mut factors = Vec::with_capacity(ranked.len());
        let mut known = self.conditions.clone();
        for (_, event) in ranked {
            factors.push(CondEvent {
                events: EventCatenation::single(event.clone()),
                conditions: known.clone(),
            });
            known.insert(event.clone())?;
        }
        Ok(factors)
    }

    /// Drop conditions whose names fail `keep`, then add placeholders for
    /// every `required` name that is left unbound.
    pub fn filter_conditions<S: AsRef<str>>(
        &self,
        keep: impl Fn(&str) -> bool,
        required: &[S],
    ) -> Result<CondEvent, CoreError> {
        let mut conditions = self.conditions.retain(keep);
        for name in required {
            conditions.insert_placeholder(name.as_ref());
        }
        CondEvent::new(self.events.clone(), conditions)
    }

    /// Every variable named on either side, placeholders included.
    pub fn variables(&self) -> BTreeSet<&str> {
        self.events.names().chain(self.conditions.names()).collect()
    }
}

impl fmt::Display for CondEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conditions.is_empty() {
            write!(f, "P({})", self.events)
        } else {
            write!(f, "P({} | {})", self.events, self.conditions)
        }
    }
}
