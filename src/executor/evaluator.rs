//! Query evaluator
//!
//! Implements the WHERE / ORDER BY / LIMIT / projection semantics shared by
//! SELECT, UPDATE and DELETE. Rows are visited once, in storage order.

use crate::error::{Error, Result};
use crate::sql::ast::{Clause, ComparisonOp, Condition, Literal, Projection, SortOrder};
use crate::storage::{Row, RowId, Table, Value};
use regex::Regex;
use std::cmp::Ordering;

/// Result of evaluating a clause against a table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Result column names, with a wildcard expanded
    pub columns: Vec<String>,
    /// Handle of the stored row behind each result row
    pub handles: Vec<RowId>,
    /// Projected rows
    pub rows: Vec<Row>,
}

impl Selection {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Outcome of testing one condition against one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Excluded,
    Included,
    /// The condition cannot apply to this column (LIKE on a number)
    Invalid,
}

/// A condition checked against the table and ready to run
struct Predicate<'a> {
    condition: &'a Condition,
    string_column: bool,
    pattern: Option<Regex>,
}

impl<'a> Predicate<'a> {
    fn compile(table: &Table, condition: &'a Condition) -> Result<Self> {
        table.check_column(&condition.column)?;
        let string_column = table
            .schema()
            .get_column(&condition.column)
            .is_some_and(|c| c.column_type.is_string());

        let pattern = match (condition.op, &condition.literal) {
            (ComparisonOp::Like, Literal::Null) => None,
            (ComparisonOp::Like, literal) => Some(like_pattern(&literal_text(literal))?),
            _ => None,
        };

        Ok(Self {
            condition,
            string_column,
            pattern,
        })
    }

    fn test(&self, value: &Value) -> Verdict {
        let op = self.condition.op;

        if op == ComparisonOp::Like && !self.string_column {
            return Verdict::Invalid;
        }

        let matched = match (&self.condition.literal, value) {
            (Literal::Null, value) => match op {
                ComparisonOp::Eq => value.is_null(),
                ComparisonOp::NotEq => !value.is_null(),
                _ => false,
            },
            (_, Value::Null) => op == ComparisonOp::NotEq,
            (literal, value) => match &self.pattern {
                Some(pattern) => pattern.is_match(&value.to_string()),
                None => satisfies(op, compare(value, literal)),
            },
        };

        if matched {
            Verdict::Included
        } else {
            Verdict::Excluded
        }
    }
}

/// Evaluate a projection and clause against a table.
///
/// Unknown projection, condition and ORDER BY columns fail with
/// UNKNOWN_FIELD before any row is read. Conditions are AND-ed and stop at
/// the first one that excludes a row. LIMIT stops the scan once enough rows
/// matched. A descending ORDER BY stably sorts the limited result by the
/// stored value of the column; ascending keeps scan order.
pub fn evaluate(table: &Table, projection: &Projection, clause: &Clause) -> Result<Selection> {
    let columns = match projection {
        Projection::Wildcard => table.column_names(),
        Projection::Columns(columns) => {
            for column in columns {
                table.check_column(column)?;
            }
            columns.clone()
        }
    };

    let predicates = clause
        .conditions
        .iter()
        .map(|c| Predicate::compile(table, c))
        .collect::<Result<Vec<_>>>()?;

    if let Some(order_by) = &clause.order_by {
        table.check_column(order_by)?;
    }

    let mut handles = Vec::new();
    'rows: for (index, row) in table.rows().iter().enumerate() {
        if clause.limit.is_some_and(|limit| handles.len() >= limit) {
            break;
        }

        for predicate in &predicates {
            match predicate.test(row.get(&predicate.condition.column)) {
                Verdict::Included => {}
                Verdict::Excluded => continue 'rows,
                Verdict::Invalid => return Err(Error::syntax(predicate.condition.op.to_string())),
            }
        }

        handles.push(RowId(index));
    }

    if let (Some(order_by), SortOrder::Desc) = (&clause.order_by, clause.sort) {
        let rows = table.rows();
        handles.sort_by(|a, b| rows[b.0].get(order_by).compare(rows[a.0].get(order_by)));
    }

    let rows = handles
        .iter()
        .map(|h| table.rows()[h.0].project(&columns))
        .collect();

    tracing::trace!(
        table = table.name(),
        scanned = table.row_count(),
        matched = handles.len(),
        "evaluated clause"
    );

    Ok(Selection {
        columns,
        handles,
        rows,
    })
}

fn literal_text(literal: &Literal) -> String {
    match literal {
        Literal::Null => String::new(),
        Literal::Integer(n) => n.to_string(),
        Literal::String(s) => s.clone(),
    }
}

/// Compare a stored value with a literal: numerically when both sides read
/// as integers, otherwise as case-insensitive strings.
fn compare(value: &Value, literal: &Literal) -> Ordering {
    let literal_number = match literal {
        Literal::Integer(n) => Some(*n),
        Literal::String(s) => s.trim().parse().ok(),
        Literal::Null => None,
    };

    match (value.as_integer(), literal_number) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => value
            .to_string()
            .to_lowercase()
            .cmp(&literal_text(literal).to_lowercase()),
    }
}

fn satisfies(op: ComparisonOp, ordering: Ordering) -> bool {
    match op {
        ComparisonOp::Eq => ordering == Ordering::Equal,
        ComparisonOp::NotEq => ordering != Ordering::Equal,
        ComparisonOp::Lt => ordering == Ordering::Less,
        ComparisonOp::Gt => ordering == Ordering::Greater,
        ComparisonOp::LtEq => ordering != Ordering::Greater,
        ComparisonOp::GtEq => ordering != Ordering::Less,
        ComparisonOp::Like => ordering == Ordering::Equal,
    }
}

/// Build a whole-string, case-insensitive matcher where `%` matches any run
/// of characters.
fn like_pattern(pattern: &str) -> Result<Regex> {
    let body = pattern
        .split('%')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("(?is)^{}$", body)).map_err(|_| Error::syntax(pattern))
}
