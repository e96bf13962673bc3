//! Statement results

use crate::storage::Row;
use serde::Serialize;
use std::time::Duration;

/// Result of executing one statement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryResult {
    /// A mutation or session change succeeded
    Ok {
        affected_rows: usize,
        elapsed: Duration,
    },
    /// An ordered row set (SELECT, SHOW, DESCRIBE)
    Rows {
        columns: Vec<String>,
        rows: Vec<Row>,
        elapsed: Duration,
    },
}

impl QueryResult {
    /// Create a success result with an affected row count
    pub fn affected(count: usize) -> Self {
        QueryResult::Ok {
            affected_rows: count,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a row set result
    pub fn row_set(columns: Vec<String>, rows: Vec<Row>) -> Self {
        QueryResult::Rows {
            columns,
            rows,
            elapsed: Duration::ZERO,
        }
    }

    /// Attach the time the statement took
    pub fn with_elapsed(mut self, duration: Duration) -> Self {
        match &mut self {
            QueryResult::Ok { elapsed, .. } | QueryResult::Rows { elapsed, .. } => {
                *elapsed = duration;
            }
        }
        self
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            QueryResult::Ok { elapsed, .. } | QueryResult::Rows { elapsed, .. } => *elapsed,
        }
    }

    /// Rows changed by a mutation; zero for row sets
    pub fn affected_rows(&self) -> usize {
        match self {
            QueryResult::Ok { affected_rows, .. } => *affected_rows,
            QueryResult::Rows { .. } => 0,
        }
    }

    /// Result columns; empty for mutations
    pub fn columns(&self) -> &[String] {
        match self {
            QueryResult::Rows { columns, .. } => columns,
            QueryResult::Ok { .. } => &[],
        }
    }

    /// Result rows; empty for mutations
    pub fn rows(&self) -> &[Row] {
        match self {
            QueryResult::Rows { rows, .. } => rows,
            QueryResult::Ok { .. } => &[],
        }
    }

    pub fn is_row_set(&self) -> bool {
        matches!(self, QueryResult::Rows { .. })
    }
}
