//! An in-memory typed table.

use bayesnet_core::{Kind, Value};
use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::source::TableSource;

/// A column header with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: Kind,
}

/// Rows of typed cells under named, typed columns.
///
/// # Example
///
/// ```rust
/// use bayesnet_core::{Kind, Value};
/// use bayesnet_table::{Table, TableSource};
///
/// let table = Table::from_text(
///     &[("Cloud", Kind::Bool), ("Rain", Kind::String)],
///     &[&["true", "heavy"], &["false", "none"]],
/// )
/// .unwrap();
/// assert_eq!(table.rows(), 2);
/// assert_eq!(table.get("Rain", 1), Some(Value::from("none")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// An empty table with the given columns.
    pub fn new<S: Into<String>>(
        columns: impl IntoIterator<Item = (S, Kind)>,
    ) -> Result<Self, TableError> {
        let mut out: Vec<Column> = Vec::new();
        for (name, kind) in columns {
            let name = name.into();
            if out.iter().any(|c| c.name == name) {
                return Err(TableError::DuplicateColumn { name });
            }
            out.push(Column { name, kind });
        }
        Ok(Self {
            columns: out,
            rows: Vec::new(),
        })
    }

    /// Parse every row of `text` against the column kinds.
    pub fn from_text(columns: &[(&str, Kind)], text: &[&[&str]]) -> Result<Self, TableError> {
        let mut table = Self::new(columns.iter().copied())?;
        for row in text {
            table.push_text_row(row)?;
        }
        Ok(table)
    }

    /// Append one row of typed cells.
    pub fn push_row(&mut self, cells: Vec<Value>) -> Result<(), TableError> {
        if cells.len() != self.columns.len() {
            return Err(TableError::Arity {
                row: self.rows.len(),
                expected: self.columns.len(),
                got: cells.len(),
            });
        }
        for (column, cell) in self.columns.iter().zip(&cells) {
            if cell.kind() != column.kind {
                return Err(TableError::KindMismatch {
                    column: column.name.clone(),
                    expected: column.kind,
                    got: cell.kind(),
                });
            }
        }
        self.rows.push(cells);
        Ok(())
    }

    /// Append one row of text cells, parsed with [`Value::parse_as`].
    pub fn push_text_row(&mut self, cells: &[&str]) -> Result<(), TableError> {
        if cells.len() != self.columns.len() {
            return Err(TableError::Arity {
                row: self.rows.len(),
                expected: self.columns.len(),
                got: cells.len(),
            });
        }
        let parsed = self
            .columns
            .iter()
            .zip(cells)
            .map(|(column, text)| Value::parse_as(column.kind, text))
            .collect::<Result<Vec<_>, _>>()?;
        self.rows.push(parsed);
        Ok(())
    }

    pub fn row(&self, i: usize) -> Option<&[Value]> {
        self.rows.get(i).map(Vec::as_slice)
    }

    pub fn column_defs(&self) -> &[Column] {
        &self.columns
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl TableSource for Table {
    fn columns(&self) -> usize {
        self.columns.len()
    }

    fn rows(&self) -> usize {
        self.rows.len()
    }

    fn header(&self, i: usize) -> Option<&str> {
        self.columns.get(i).map(|c| c.name.as_str())
    }

    fn column_kind(&self, i: usize) -> Option<Kind> {
        self.columns.get(i).map(|c| c.kind)
    }

    fn cell(&self, column: usize, row: usize) -> Option<Value> {
        self.rows.get(row).and_then(|r| r.get(column)).cloned()
    }
}
