//! # Tabular Sources
//!
//! The engine never reads files. Whatever produced the data implements
//! [`TableSource`]; the engine only asks for headers, kinds and cells.
//!
//! Required methods resolve columns by position. Name-based lookup,
//! projection and range discovery are provided on top of them.

use std::collections::BTreeSet;

use bayesnet_core::{Kind, Value, ValueRange};

use crate::error::TableError;
use crate::table::Table;

/// A read-only view over typed, already-parsed tabular data.
pub trait TableSource {
    /// Number of columns.
    fn columns(&self) -> usize;

    /// Number of rows.
    fn rows(&self) -> usize;

    /// Header of column `i`.
    fn header(&self, i: usize) -> Option<&str>;

    /// Kind of every cell in column `i`.
    fn column_kind(&self, i: usize) -> Option<Kind>;

    /// The cell at (`column`, `row`).
    fn cell(&self, column: usize, row: usize) -> Option<Value>;

    fn column_index(&self, name: &str) -> Option<usize> {
        (0..self.columns()).find(|&i| self.header(i) == Some(name))
    }

    fn headers(&self) -> Vec<&str> {
        (0..self.columns()).filter_map(|i| self.header(i)).collect()
    }

    /// The cell in the column named `column`.
    fn get(&self, column: &str, row: usize) -> Option<Value> {
        self.column_index(column)
            .and_then(|i| self.cell(i, row))
    }

    /// A new table holding only `names`, in the given order. Repeated names
    /// are kept once.
    fn project(&self, names: &[&str]) -> Result<Table, TableError> {
        let mut seen = BTreeSet::new();
        let mut picked = Vec::with_capacity(names.len());
        for &name in names {
            if !seen.insert(name) {
                continue;
            }
            let i = self
                .column_index(name)
                .ok_or_else(|| TableError::UnknownColumn {
                    name: name.to_string(),
                })?;
            let kind = self
                .column_kind(i)
                .ok_or_else(|| TableError::UnknownColumn {
                    name: name.to_string(),
                })?;
            picked.push((i, name, kind));
        }

        let mut table = Table::new(picked.iter().map(|&(_, name, kind)| (name, kind)))?;
        for row in 0..self.rows() {
            let cells = picked
                .iter()
                .map(|&(i, name, _)| {
                    self.cell(i, row).ok_or_else(|| TableError::UnknownColumn {
                        name: name.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            table.push_row(cells)?;
        }
        tracing::debug!(columns = ?names, rows = table.rows(), "projected table");
        Ok(table)
    }

    /// The distinct values of a column as a discrete range, sorted.
    fn sub_range(&self, column: &str) -> Result<ValueRange, TableError> {
        let i = self
            .column_index(column)
            .ok_or_else(|| TableError::UnknownColumn {
                name: column.to_string(),
            })?;
        let kind = self
            .column_kind(i)
            .ok_or_else(|| TableError::UnknownColumn {
                name: column.to_string(),
            })?;
        let distinct: BTreeSet<Value> = (0..self.rows()).filter_map(|r| self.cell(i, r)).collect();
        Ok(ValueRange::with_values(kind, distinct)?)
    }
}
