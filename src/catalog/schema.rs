//! Schema definitions for sqlstash
//!
//! This module defines table schemas and column metadata.

use super::types::ColumnType;
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Column definition in a table
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Declared type
    pub column_type: ColumnType,
    /// Column position (0-indexed)
    pub position: usize,
}

impl Column {
    /// Create a new column
    pub fn new(name: impl Into<String>, column_type: ColumnType, position: usize) -> Self {
        Self {
            name: name.into(),
            column_type,
            position,
        }
    }
}

/// Table schema - the ordered, immutable column set of a table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// Ordered list of columns
    columns: Vec<Column>,
    /// Column name to index mapping
    name_to_index: HashMap<String, usize>,
}

impl Schema {
    /// Create a new empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a schema from (name, type) pairs
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, ColumnType)>,
        S: Into<String>,
    {
        let mut schema = Self::new();
        for (name, column_type) in columns {
            schema.add_column(name, column_type)?;
        }
        Ok(schema)
    }

    /// Append a column. Column names must be unique within a table.
    pub fn add_column(&mut self, name: impl Into<String>, column_type: ColumnType) -> Result<()> {
        let name = name.into();
        if self.name_to_index.contains_key(&name) {
            return Err(Error::syntax(name));
        }
        let position = self.columns.len();
        self.name_to_index.insert(name.clone(), position);
        self.columns.push(Column::new(name, column_type, position));
        Ok(())
    }

    /// Get column by name
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.name_to_index.get(name).map(|&idx| &self.columns[idx])
    }

    /// Get all columns
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Check if column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// Get column names in declaration order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(spec: &str) -> ColumnType {
        ColumnType::parse(spec).unwrap()
    }

    #[test]
    fn test_schema_creation() {
        let schema =
            Schema::from_columns([("id", ty("INT(10)")), ("name", ty("VARCHAR(10)"))]).unwrap();

        assert_eq!(schema.column_count(), 2);
        assert!(schema.has_column("id"));
        assert!(!schema.has_column("unknown"));
        assert_eq!(schema.column_names(), vec!["id", "name"]);

        let name_col = schema.get_column("name").unwrap();
        assert_eq!(name_col.position, 1);
        assert_eq!(name_col.column_type.size, Some(10));
    }

    #[test]
    fn test_duplicate_column() {
        let result = Schema::from_columns([("id", ty("INT")), ("id", ty("CHAR(1)"))]);
        assert!(matches!(result, Err(Error::SyntaxError { .. })));
    }
}
