//! # Core - Values, Events and Graphs for Discrete Bayesian Networks
//!
//! This crate provides the vocabulary the inference engine is written in:
//!
//! - **Values**: tagged scalars and intervals with a total order ([`Value`], [`Kind`])
//! - **Intervals**: open/closed/infinite bounds over any [`Scalar`]
//! - **Ranges**: the permissible values of a variable ([`ValueRange`])
//! - **Events**: propositions, conjunctions and conditionals ([`CondEvent`])
//! - **DAG**: a name-keyed acyclic graph with cycle rejection ([`Dag`])
//! - **Errors**: one error type with a shared [`ErrorClass`]
//!
//! ## Design Philosophy
//!
//! Everything here is a plain value: events hash and order consistently,
//! so they can key tables, and every structural mistake is reported as an
//! error rather than silently repaired.

pub mod dag;
pub mod error;
pub mod event;
pub mod interval;
pub mod range;
pub mod value;

// Re-export key types at crate root for convenience
pub use dag::{Dag, Vertex};
pub use error::{CoreError, ErrorClass};
pub use event::{CondEvent, Event, EventCatenation, Predicate};
pub use interval::{Boundary, Interval, Scalar};
pub use range::{ContinuousFamily, ValueRange};
pub use value::{Kind, Value};
