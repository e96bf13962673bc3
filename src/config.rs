//! Session configuration

/// Default number of statements kept in the query log
pub const DEFAULT_QUERY_LOG_CAPACITY: usize = 1000;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Start with an empty database catalog. When false the session has no
    /// storage until a catalog is imported.
    pub create_storage: bool,
    /// Maximum query log length; `None` keeps every statement
    pub query_log_capacity: Option<usize>,
    /// Database to create and select on startup
    pub default_database: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            create_storage: true,
            query_log_capacity: Some(DEFAULT_QUERY_LOG_CAPACITY),
            default_database: None,
        }
    }
}

impl SessionConfig {
    /// Create a new session config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the session starts with an empty catalog
    pub fn create_storage(mut self, create_storage: bool) -> Self {
        self.create_storage = create_storage;
        self
    }

    /// Set the query log capacity
    pub fn query_log_capacity(mut self, capacity: Option<usize>) -> Self {
        self.query_log_capacity = capacity;
        self
    }

    /// Set the database created and selected on startup
    pub fn default_database(mut self, name: impl Into<String>) -> Self {
        self.default_database = Some(name.into());
        self
    }
}
