use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::error::{Result, SpendError};

/// Format used when a table is serialized to records.
pub const RECORD_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One value of a transaction table. Sources are loosely typed, so every
/// column may hold any variant and operations coerce what they need.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    #[cfg(test)]
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Cell::Null => Value::Null,
            Cell::Text(s) => Value::String(s.clone()),
            Cell::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Cell::DateTime(dt) => Value::String(dt.format(RECORD_DATETIME_FORMAT).to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(dt: NaiveDateTime) -> Self {
        Cell::DateTime(dt)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Cell::Null)
    }
}

/// An ordered set of labelled columns and the rows beneath them.
///
/// There is no fixed schema: each analysis asks for the columns it needs via
/// [`Table::require_columns`] and fails with [`SpendError::Schema`] when any
/// are absent. Operations never mutate a table they are handed; they build a
/// new one with [`Table::with_rows`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row, padding short rows with nulls and cutting long ones.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Null);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Resolve column indices in the order given, or report every missing name.
    pub fn require_columns(&self, names: &[&str]) -> Result<Vec<usize>> {
        let missing: Vec<String> = names
            .iter()
            .filter(|n| !self.has_column(n))
            .map(|n| n.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SpendError::Schema(missing));
        }
        Ok(names.iter().filter_map(|n| self.column_index(n)).collect())
    }

    /// A table with the same columns and the given rows.
    pub fn with_rows(&self, rows: Vec<Vec<Cell>>) -> Table {
        let mut out = Table::new(self.columns.iter().cloned());
        for row in rows {
            out.push_row(row);
        }
        out
    }

    /// Column label to JSON value, in column order, one map per row.
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(col, cell)| (col.clone(), cell.to_json()))
                    .collect()
            })
            .collect()
    }
}
