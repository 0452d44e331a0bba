//! # Table - Training Data Adapter
//!
//! The Bayes-net engine consumes training data through the narrow
//! [`TableSource`] trait: headers, column kinds, typed cells, projection
//! onto a subset of columns, and discovery of a column's distinct values.
//!
//! [`Table`] is the in-memory implementation. It parses text cells with
//! [`bayesnet_core::Value::parse_as`] once, at construction; after that
//! every cell is a typed [`bayesnet_core::Value`].

mod error;
mod source;
mod table;

pub use error::TableError;
pub use source::TableSource;
pub use table::{Column, Table};
