//! Database catalog for sqlstash
//!
//! This module manages the set of databases and the tables inside each of
//! them. The whole catalog serializes to a nested JSON object of the form
//! `{ "<db>": { "<table>": { "_cols": .., "_defs": .., "_data": .. } } }`.

use super::schema::Schema;
use super::types::ColumnType;
use crate::error::{Error, Result};
use crate::storage::Table;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Check that a database or table name is made of `[A-Za-z0-9_]`
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A named collection of tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "IndexMap<String, Table>",
    into = "IndexMap<String, Table>"
)]
pub struct Database {
    tables: IndexMap<String, Table>,
}

impl Database {
    /// Create a new empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from (column name, type spec) pairs.
    ///
    /// Column definitions whose type spec does not parse are dropped; the
    /// table is only created if at least one column survives.
    pub fn create_table(&mut self, name: &str, columns: &[(String, String)]) -> Result<&Table> {
        if !is_valid_name(name) {
            return Err(Error::syntax(name));
        }
        if self.tables.contains_key(name) {
            return Err(Error::TableExists(name.to_string()));
        }

        let mut schema = Schema::new();
        for (column, spec) in columns {
            match ColumnType::parse(spec) {
                Some(column_type) if is_valid_name(column) => {
                    schema.add_column(column.as_str(), column_type)?;
                }
                _ => {
                    tracing::warn!(table = name, column = %column, spec = %spec, "dropping invalid column definition");
                }
            }
        }
        if schema.column_count() == 0 {
            return Err(Error::syntax(name));
        }

        let table = self
            .tables
            .entry(name.to_string())
            .or_insert_with(|| Table::new(name, schema));
        Ok(table)
    }

    /// Drop a table
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        self.tables
            .shift_remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::CantDropTable(name.to_string()))
    }

    /// Get a table by name
    pub fn get_table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    /// Get a mutable table by name
    pub fn get_table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    /// List table names in creation order
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl From<IndexMap<String, Table>> for Database {
    fn from(mut tables: IndexMap<String, Table>) -> Self {
        for (name, table) in tables.iter_mut() {
            table.set_name(name.as_str());
        }
        Self { tables }
    }
}

impl From<Database> for IndexMap<String, Table> {
    fn from(db: Database) -> Self {
        db.tables
    }
}

/// Catalog - every database known to a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    databases: IndexMap<String, Database>,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a database
    pub fn create_database(&mut self, name: &str) -> Result<()> {
        if !is_valid_name(name) {
            return Err(Error::syntax(name));
        }
        if self.databases.contains_key(name) {
            return Err(Error::CantCreateDb(name.to_string()));
        }
        self.databases.insert(name.to_string(), Database::new());
        Ok(())
    }

    /// Drop a database and all its tables
    pub fn drop_database(&mut self, name: &str) -> Result<()> {
        self.databases
            .shift_remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::CantDropDb(name.to_string()))
    }

    /// Check if a database exists
    pub fn has_database(&self, name: &str) -> bool {
        self.databases.contains_key(name)
    }

    /// Get a database by name
    pub fn get_database(&self, name: &str) -> Result<&Database> {
        self.databases
            .get(name)
            .ok_or_else(|| Error::UnknownDb(name.to_string()))
    }

    /// Get a mutable database by name
    pub fn get_database_mut(&mut self, name: &str) -> Result<&mut Database> {
        self.databases
            .get_mut(name)
            .ok_or_else(|| Error::UnknownDb(name.to_string()))
    }

    /// List database names in creation order
    pub fn database_names(&self) -> Vec<String> {
        self.databases.keys().cloned().collect()
    }

    /// Parse a catalog from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Catalog =
            serde_json::from_str(json).map_err(|e| Error::InvalidImport(e.to_string()))?;
        if let Some(bad) = catalog.databases.keys().find(|name| !is_valid_name(name)) {
            return Err(Error::InvalidImport(format!("invalid database name '{}'", bad)));
        }
        Ok(catalog)
    }

    /// Render the catalog as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidImport(e.to_string()))
    }

    /// Load a catalog from a JSON file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Save the catalog as a JSON file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
