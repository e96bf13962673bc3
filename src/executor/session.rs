//! Statement dispatcher
//!
//! A [`Session`] owns the database catalog, the active-database pointer and
//! the query log. It parses each statement, routes it to the catalog, the
//! row store or the evaluator, and returns a [`QueryResult`] or an error.

use super::evaluator::evaluate;
use super::result::QueryResult;
use crate::catalog::{Catalog, Database};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::sql::ast::{
    CreateTableStatement, DeleteStatement, InsertStatement, Projection, SelectStatement,
    UpdateStatement,
};
use crate::sql::{self, split_statements, Statement};
use crate::storage::{Row, Value};
use serde::Serialize;
use std::collections::VecDeque;
use std::path::Path;
use std::time::{Instant, SystemTime};

/// One statement as received by the session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryLogEntry {
    pub query: String,
    pub time: SystemTime,
}

/// A single-user session over an in-memory catalog
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    /// `None` until storage is created or imported
    catalog: Option<Catalog>,
    active_db: Option<String>,
    query_log: VecDeque<QueryLogEntry>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a session with an empty catalog and default settings
    pub fn new() -> Self {
        let config = SessionConfig::default();
        Self {
            catalog: config.create_storage.then(Catalog::new),
            config,
            active_db: None,
            query_log: VecDeque::new(),
        }
    }

    /// Create a session from a config. Fails if the default database name
    /// is invalid.
    pub fn with_config(config: SessionConfig) -> Result<Self> {
        let mut session = Self {
            catalog: config.create_storage.then(Catalog::new),
            config,
            active_db: None,
            query_log: VecDeque::new(),
        };

        if let (Some(name), Some(catalog)) =
            (session.config.default_database.clone(), session.catalog.as_mut())
        {
            catalog.create_database(&name)?;
            session.active_db = Some(name);
        }

        Ok(session)
    }

    // ========== Storage ==========

    /// Install a catalog as the session's storage. The active database is
    /// cleared.
    pub fn import_database(&mut self, catalog: Catalog) {
        tracing::info!(databases = ?catalog.database_names(), "imported catalog");
        self.catalog = Some(catalog);
        self.active_db = None;
    }

    /// Import a catalog from its JSON form
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        self.import_database(Catalog::from_json(json)?);
        Ok(())
    }

    /// Import a catalog from a JSON file
    pub fn import_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.import_database(Catalog::load_from_file(path)?);
        Ok(())
    }

    /// Render the current catalog as JSON
    pub fn export_json(&self) -> Result<String> {
        self.catalog.as_ref().ok_or(Error::NoDbExist)?.to_json()
    }

    /// The session's catalog, if storage exists
    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    /// Name of the active database
    pub fn active_database(&self) -> Option<&str> {
        self.active_db.as_deref()
    }

    /// Statements received so far, oldest first
    pub fn query_log(&self) -> &VecDeque<QueryLogEntry> {
        &self.query_log
    }

    // ========== Execution ==========

    /// Parse and execute one statement
    pub fn execute(&mut self, sql: &str) -> Result<QueryResult> {
        self.log_query(sql);

        let stmt = match sql::parse(sql) {
            Ok(stmt) => stmt,
            Err(err) => {
                tracing::debug!(sql, code = err.code(), error = %err, "statement rejected");
                return Err(err);
            }
        };

        let kind = stmt.kind();
        let result = self.execute_statement(stmt);
        match &result {
            Ok(res) => tracing::debug!(kind, elapsed = ?res.elapsed(), "statement ok"),
            Err(err) => tracing::debug!(kind, code = err.code(), error = %err, "statement failed"),
        }
        result
    }

    /// Split input on `;` and `\g` and execute each statement in turn
    pub fn execute_batch(&mut self, input: &str) -> Vec<Result<QueryResult>> {
        split_statements(input)
            .iter()
            .map(|stmt| self.execute(stmt))
            .collect()
    }

    /// Execute a parsed statement
    pub fn execute_statement(&mut self, stmt: Statement) -> Result<QueryResult> {
        let start = Instant::now();

        let result = match stmt {
            Statement::CreateDatabase(name) => self.create_database(&name),
            Statement::DropDatabase(name) => self.drop_database(&name),
            Statement::Use(name) => self.use_database(name),
            Statement::ShowDatabases => self.show_databases(),
            Statement::ShowTables => self.show_tables(),
            Statement::CreateTable(create) => self.create_table(create),
            Statement::DropTable(name) => self.drop_table(&name),
            Statement::Describe(name) => self.describe(&name),
            Statement::Insert(insert) => self.insert(insert),
            Statement::Select(select) => self.select(select),
            Statement::Update(update) => self.update(update),
            Statement::Delete(delete) => self.delete(delete),
        }?;

        Ok(result.with_elapsed(start.elapsed()))
    }

    fn log_query(&mut self, sql: &str) {
        self.query_log.push_back(QueryLogEntry {
            query: sql.to_string(),
            time: SystemTime::now(),
        });
        if let Some(capacity) = self.config.query_log_capacity {
            while self.query_log.len() > capacity {
                self.query_log.pop_front();
            }
        }
    }

    fn active_db(&self) -> Result<&Database> {
        let name = self.active_db.as_deref().ok_or(Error::NoDbSelected)?;
        self.catalog
            .as_ref()
            .ok_or(Error::NoDbSelected)?
            .get_database(name)
    }

    fn active_db_mut(&mut self) -> Result<&mut Database> {
        let name = self.active_db.as_deref().ok_or(Error::NoDbSelected)?;
        self.catalog
            .as_mut()
            .ok_or(Error::NoDbSelected)?
            .get_database_mut(name)
    }

    // ========== Databases ==========

    fn create_database(&mut self, name: &str) -> Result<QueryResult> {
        let catalog = self.catalog.as_mut().ok_or(Error::NoDbSelected)?;
        catalog.create_database(name)?;
        tracing::info!(database = name, "created database");
        Ok(QueryResult::affected(1))
    }

    fn drop_database(&mut self, name: &str) -> Result<QueryResult> {
        let catalog = self
            .catalog
            .as_mut()
            .ok_or_else(|| Error::CantDropDb(name.to_string()))?;
        let tables = catalog.get_database(name).map_or(0, |db| db.table_names().len());
        catalog.drop_database(name)?;

        if self.active_db.as_deref() == Some(name) {
            self.active_db = None;
        }
        tracing::info!(database = name, "dropped database");
        Ok(QueryResult::affected(tables))
    }

    fn use_database(&mut self, name: String) -> Result<QueryResult> {
        match &self.catalog {
            Some(catalog) if catalog.has_database(&name) => {
                tracing::info!(database = %name, "switched database");
                self.active_db = Some(name);
                Ok(QueryResult::affected(0))
            }
            _ => Err(Error::UnknownDb(name)),
        }
    }

    fn show_databases(&self) -> Result<QueryResult> {
        let catalog = self.catalog.as_ref().ok_or(Error::NoDbExist)?;
        let rows = catalog
            .database_names()
            .into_iter()
            .map(|name| Row::from_iter([("Database", Value::String(name))]))
            .collect();
        Ok(QueryResult::row_set(vec!["Database".to_string()], rows))
    }

    fn show_tables(&self) -> Result<QueryResult> {
        let db = self.active_db()?;
        if db.is_empty() {
            return Err(Error::NoTablesUsed);
        }

        let column = format!("Tables_in_{}", self.active_db.as_deref().unwrap_or(""));
        let rows = db
            .table_names()
            .into_iter()
            .map(|name| Row::from_iter([(column.clone(), Value::String(name))]))
            .collect();
        Ok(QueryResult::row_set(vec![column], rows))
    }

    // ========== Tables ==========

    fn create_table(&mut self, create: CreateTableStatement) -> Result<QueryResult> {
        let columns: Vec<(String, String)> = create
            .columns
            .into_iter()
            .map(|c| (c.name, c.type_spec))
            .collect();

        let table = self.active_db_mut()?.create_table(&create.table_name, &columns)?;
        tracing::info!(table = table.name(), columns = ?table.column_names(), "created table");
        Ok(QueryResult::affected(0))
    }

    fn drop_table(&mut self, name: &str) -> Result<QueryResult> {
        self.active_db_mut()?.drop_table(name)?;
        tracing::info!(table = name, "dropped table");
        Ok(QueryResult::affected(0))
    }

    fn describe(&self, name: &str) -> Result<QueryResult> {
        let table = self.active_db()?.get_table(name)?;
        let rows = table
            .schema()
            .columns()
            .iter()
            .map(|c| {
                Row::from_iter([
                    ("Field", Value::String(c.name.clone())),
                    ("Type", Value::String(c.column_type.to_string())),
                ])
            })
            .collect();
        Ok(QueryResult::row_set(
            vec!["Field".to_string(), "Type".to_string()],
            rows,
        ))
    }

    // ========== Rows ==========

    fn insert(&mut self, insert: InsertStatement) -> Result<QueryResult> {
        let table = self.active_db_mut()?.get_table_mut(&insert.table_name)?;
        let tuples: Vec<Vec<Value>> = insert
            .values
            .into_iter()
            .map(|tuple| tuple.into_iter().map(Value::from).collect())
            .collect();

        let count = table.insert(insert.columns.as_deref(), tuples)?;
        Ok(QueryResult::affected(count))
    }

    fn select(&self, select: SelectStatement) -> Result<QueryResult> {
        let table = self.active_db()?.get_table(&select.table_name)?;
        let selection = evaluate(table, &select.projection, &select.clause)?;
        Ok(QueryResult::row_set(selection.columns, selection.rows))
    }

    fn update(&mut self, update: UpdateStatement) -> Result<QueryResult> {
        let table = self.active_db_mut()?.get_table_mut(&update.table_name)?;
        let assignments: Vec<(String, Value)> = update
            .assignments
            .into_iter()
            .map(|a| (a.column, Value::from(a.value)))
            .collect();
        for (column, _) in &assignments {
            table.check_column(column)?;
        }

        let selection = evaluate(table, &Projection::Wildcard, &update.clause)?;
        let count = table.update(&selection.handles, &assignments)?;
        Ok(QueryResult::affected(count))
    }

    fn delete(&mut self, delete: DeleteStatement) -> Result<QueryResult> {
        let table = self.active_db_mut()?.get_table_mut(&delete.table_name)?;
        let selection = evaluate(table, &Projection::Wildcard, &delete.clause)?;
        let count = table.delete(&selection.handles);
        Ok(QueryResult::affected(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_db() -> Session {
        Session::with_config(SessionConfig::new().default_database("app")).unwrap()
    }

    #[test]
    fn test_create_and_use_database() {
        let mut session = Session::new();
        session.execute("CREATE DATABASE shop").unwrap();
        assert_eq!(session.active_database(), None);

        session.execute("USE shop").unwrap();
        assert_eq!(session.active_database(), Some("shop"));

        let result = session.execute("USE nowhere");
        assert!(matches!(result, Err(Error::UnknownDb(name)) if name == "nowhere"));
    }

    #[test]
    fn test_no_storage() {
        let mut session = Session::with_config(SessionConfig::new().create_storage(false)).unwrap();

        assert!(matches!(session.execute("CREATE DATABASE a"), Err(Error::NoDbSelected)));
        assert!(matches!(session.execute("SHOW DATABASES"), Err(Error::NoDbExist)));
        assert!(matches!(session.execute("USE a"), Err(Error::UnknownDb(_))));
        assert!(matches!(session.execute("DROP DATABASE a"), Err(Error::CantDropDb(_))));
        assert!(matches!(session.execute("SELECT * FROM t"), Err(Error::NoDbSelected)));
    }

    #[test]
    fn test_no_database_selected() {
        let mut session = Session::new();
        assert!(matches!(
            session.execute("CREATE TABLE t (id INT)"),
            Err(Error::NoDbSelected)
        ));
        assert!(matches!(session.execute("SHOW TABLES"), Err(Error::NoDbSelected)));
    }

    #[test]
    fn test_show_tables_and_describe() {
        let mut session = session_with_db();
        assert!(matches!(session.execute("SHOW TABLES"), Err(Error::NoTablesUsed)));

        session
            .execute("CREATE TABLE user (id INT(10), name VARCHAR(10))")
            .unwrap();

        let tables = session.execute("SHOW TABLES").unwrap();
        assert_eq!(tables.columns(), ["Tables_in_app".to_string()]);
        assert_eq!(tables.rows()[0].get("Tables_in_app"), &Value::from("user"));

        let described = session.execute("DESCRIBE user").unwrap();
        assert_eq!(described.rows().len(), 2);
        assert_eq!(described.rows()[1].get("Field"), &Value::from("name"));
        assert_eq!(described.rows()[1].get("Type"), &Value::from("VARCHAR(10)"));
    }

    #[test]
    fn test_drop_active_database() {
        let mut session = session_with_db();
        session.execute("DROP DATABASE app").unwrap();

        assert_eq!(session.active_database(), None);
        assert!(matches!(session.execute("SHOW TABLES"), Err(Error::NoDbSelected)));
        let dbs = session.execute("SHOW DATABASES").unwrap();
        assert!(dbs.rows().is_empty());
    }

    #[test]
    fn test_update_validates_assignments() {
        let mut session = session_with_db();
        session.execute("CREATE TABLE t (id INT)").unwrap();

        let result = session.execute("UPDATE t SET age = 1");
        assert!(matches!(result, Err(Error::UnknownField(c, _)) if c == "age"));
    }

    #[test]
    fn test_query_log() {
        let mut session = Session::with_config(SessionConfig::new().query_log_capacity(Some(2)))
            .unwrap();
        session.execute("SHOW DATABASES").ok();
        session.execute("BOGUS").ok();
        session.execute("CREATE DATABASE x").ok();

        let queries: Vec<&str> = session.query_log().iter().map(|e| e.query.as_str()).collect();
        assert_eq!(queries, vec!["BOGUS", "CREATE DATABASE x"]);
    }

    #[test]
    fn test_execute_batch() {
        let mut session = Session::new();
        let results = session.execute_batch("CREATE DATABASE a; USE a\\g CREATE DATABASE a;");

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(matches!(results[2], Err(Error::CantCreateDb(_))));
    }

    #[test]
    fn test_import_resets_active_database() {
        let mut session = session_with_db();
        session
            .import_json(r#"{"other": {"t": {"_cols": ["id"], "_defs": {"id": "INT"}, "_data": [{"id": 7}]}}}"#)
            .unwrap();

        assert_eq!(session.active_database(), None);
        session.execute("USE other").unwrap();
        let result = session.execute("SELECT id FROM t").unwrap();
        assert_eq!(result.rows()[0].get("id"), &Value::Integer(7));
    }

    #[test]
    fn test_invalid_default_database() {
        let result = Session::with_config(SessionConfig::new().default_database("no good"));
        assert!(matches!(result, Err(Error::SyntaxError { .. })));
    }
}
