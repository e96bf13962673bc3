//! Table storage for sqlstash
//!
//! This module combines a schema and an in-memory row sequence to provide
//! table operations. Rows are kept in insertion order; deletions compact the
//! sequence.

use super::row::{Row, RowId};
use super::value::Value;
use crate::catalog::{ColumnType, Schema};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A table combining schema and row storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableData", into = "TableData")]
pub struct Table {
    /// Table name
    name: String,
    /// Column definitions
    schema: Schema,
    /// Row data, every row holds every column in schema order
    rows: Vec<Row>,
}

impl Table {
    /// Create a new empty table
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            rows: Vec::new(),
        }
    }

    /// Get table name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Get table schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> Vec<String> {
        self.schema.column_names()
    }

    /// All rows in storage order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Fail with UNKNOWN_FIELD unless the column exists
    pub fn check_column(&self, column: &str) -> Result<()> {
        if self.schema.has_column(column) {
            Ok(())
        } else {
            Err(Error::UnknownField(column.to_string(), self.name.clone()))
        }
    }

    fn column_type(&self, column: &str) -> Result<ColumnType> {
        self.schema
            .get_column(column)
            .map(|c| c.column_type)
            .ok_or_else(|| Error::UnknownField(column.to_string(), self.name.clone()))
    }

    /// Insert one or more rows.
    ///
    /// `columns` names the target column of each tuple position; `None`
    /// means all columns in declaration order. Every tuple is validated and
    /// coerced before any is stored, so a failure leaves the table unchanged.
    pub fn insert(&mut self, columns: Option<&[String]>, tuples: Vec<Vec<Value>>) -> Result<usize> {
        let columns = match columns {
            Some(columns) => columns.to_vec(),
            None => self.column_names(),
        };
        let types = columns
            .iter()
            .map(|c| self.column_type(c))
            .collect::<Result<Vec<_>>>()?;

        let mut staged = Vec::with_capacity(tuples.len());
        for tuple in tuples {
            if tuple.len() != columns.len() {
                return Err(Error::WrongValueCount);
            }

            let mut row = self.empty_row();
            for ((column, column_type), value) in columns.iter().zip(&types).zip(tuple) {
                row.set(column.as_str(), column_type.coerce(value));
            }
            staged.push(row);
        }

        let count = staged.len();
        self.rows.extend(staged);
        Ok(count)
    }

    /// Apply `column = value` assignments to the given rows. Returns the
    /// number of rows updated.
    pub fn update(&mut self, handles: &[RowId], assignments: &[(String, Value)]) -> Result<usize> {
        let coerced = assignments
            .iter()
            .map(|(column, value)| {
                let column_type = self.column_type(column)?;
                Ok((column.clone(), column_type.coerce(value.clone())))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut updated = 0;
        for handle in handles {
            if let Some(row) = self.rows.get_mut(handle.0) {
                for (column, value) in &coerced {
                    row.set(column.as_str(), value.clone());
                }
                updated += 1;
            }
        }
        Ok(updated)
    }

    /// Remove the given rows and compact the rest, preserving order.
    /// Returns the number of rows removed.
    pub fn delete(&mut self, handles: &[RowId]) -> usize {
        let doomed: HashSet<usize> = handles.iter().map(|h| h.0).collect();
        let before = self.rows.len();

        let mut index = 0;
        self.rows.retain(|_| {
            let keep = !doomed.contains(&index);
            index += 1;
            keep
        });

        before - self.rows.len()
    }

    fn empty_row(&self) -> Row {
        self.schema
            .columns()
            .iter()
            .map(|c| (c.name.clone(), Value::Null))
            .collect()
    }
}

/// Serializable proxy for Table, using the `_cols`/`_defs`/`_data` layout
#[derive(Serialize, Deserialize)]
struct TableData {
    #[serde(rename = "_cols")]
    cols: Vec<String>,
    #[serde(rename = "_defs")]
    defs: IndexMap<String, ColumnType>,
    #[serde(rename = "_data", default)]
    data: Vec<IndexMap<String, Value>>,
}

impl TryFrom<TableData> for Table {
    type Error = String;

    fn try_from(data: TableData) -> std::result::Result<Self, Self::Error> {
        if data.cols.is_empty() {
            return Err("table has no columns".to_string());
        }

        let mut schema = Schema::new();
        for col in &data.cols {
            let column_type = data
                .defs
                .get(col)
                .ok_or_else(|| format!("column '{}' has no type definition", col))?;
            schema
                .add_column(col.as_str(), *column_type)
                .map_err(|_| format!("duplicate column '{}'", col))?;
        }

        let mut table = Table::new(String::new(), schema);
        for mut record in data.data {
            let mut row = table.empty_row();
            for column in table.schema.columns() {
                if let Some(value) = record.shift_remove(&column.name) {
                    row.set(column.name.as_str(), column.column_type.coerce(value));
                }
            }
            for extra in record.keys() {
                tracing::warn!(column = %extra, "ignoring value for undeclared column");
            }
            table.rows.push(row);
        }

        Ok(table)
    }
}

impl From<Table> for TableData {
    fn from(table: Table) -> Self {
        let cols = table.column_names();
        let defs = table
            .schema
            .columns()
            .iter()
            .map(|c| (c.name.clone(), c.column_type))
            .collect();
        let data = table
            .rows
            .into_iter()
            .map(|row| {
                row.iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect()
            })
            .collect();

        Self { cols, defs, data }
    }
}
