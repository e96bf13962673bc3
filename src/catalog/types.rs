//! Column types for sqlstash
//!
//! Tables declare each column with a textual type spec such as `INT(10)`,
//! `CHAR(2)` or `VARCHAR(255)`. Values are coerced into the declared type
//! on their way into storage.

use crate::storage::Value;
use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, digit1, multispace0},
    combinator::{all_consuming, map, map_res, opt},
    sequence::{delimited, pair, preceded},
    IResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base kind of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Integer column
    Int,
    /// Fixed-length character column
    Char,
    /// Variable-length character column
    Varchar,
}

/// A declared column type: kind plus optional size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColumnType {
    pub kind: ColumnKind,
    /// Maximum length for character columns, display width for INT
    pub size: Option<usize>,
}

impl ColumnType {
    pub fn new(kind: ColumnKind, size: Option<usize>) -> Self {
        Self { kind, size }
    }

    /// Parse a type spec like `VARCHAR(10)`. Returns `None` for anything
    /// that is not `INT`, `CHAR` or `VARCHAR` with an optional positive size.
    pub fn parse(spec: &str) -> Option<Self> {
        let (_, (kind, size)) = all_consuming(column_type)(spec.trim()).ok()?;
        if size == Some(0) {
            return None;
        }
        Some(Self { kind, size })
    }

    /// Check if this type stores strings
    pub fn is_string(&self) -> bool {
        matches!(self.kind, ColumnKind::Char | ColumnKind::Varchar)
    }

    /// Convert a value into the stored representation for this type.
    ///
    /// Character columns keep at most `size` characters and turn an empty
    /// result into NULL. INT columns read a leading integer out of strings
    /// and store NULL when there is none.
    pub fn coerce(&self, value: Value) -> Value {
        match (self.kind, value) {
            (_, Value::Null) => Value::Null,
            (ColumnKind::Int, Value::Integer(n)) => Value::Integer(n),
            (ColumnKind::Int, Value::String(s)) => {
                parse_int_prefix(&s).map_or(Value::Null, Value::Integer)
            }
            (ColumnKind::Char | ColumnKind::Varchar, value) => {
                let text = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                let text: String = match self.size {
                    Some(size) => text.chars().take(size).collect(),
                    None => text,
                };
                if text.is_empty() {
                    Value::Null
                } else {
                    Value::String(text)
                }
            }
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.kind {
            ColumnKind::Int => "INT",
            ColumnKind::Char => "CHAR",
            ColumnKind::Varchar => "VARCHAR",
        };
        match self.size {
            Some(size) => write!(f, "{}({})", name, size),
            None => write!(f, "{}", name),
        }
    }
}

impl TryFrom<String> for ColumnType {
    type Error = String;

    fn try_from(spec: String) -> std::result::Result<Self, Self::Error> {
        ColumnType::parse(&spec).ok_or_else(|| format!("invalid column type '{}'", spec))
    }
}

impl From<ColumnType> for String {
    fn from(column_type: ColumnType) -> Self {
        column_type.to_string()
    }
}

// ========== Type spec grammar ==========

fn column_kind(input: &str) -> IResult<&str, ColumnKind> {
    alt((
        map(tag_no_case("VARCHAR"), |_| ColumnKind::Varchar),
        map(tag_no_case("CHAR"), |_| ColumnKind::Char),
        map(tag_no_case("INT"), |_| ColumnKind::Int),
    ))(input)
}

fn column_size(input: &str) -> IResult<&str, usize> {
    delimited(
        pair(char('('), multispace0),
        map_res(digit1, str::parse::<usize>),
        pair(multispace0, char(')')),
    )(input)
}

fn column_type(input: &str) -> IResult<&str, (ColumnKind, Option<usize>)> {
    pair(column_kind, opt(preceded(multispace0, column_size)))(input)
}

/// Leading `[+-]?digits` of a string, after leading whitespace
fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let sign_len = usize::from(s.starts_with(['+', '-']));
    let digits = s[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len() - sign_len);
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_type_specs() {
        assert_eq!(
            ColumnType::parse("VARCHAR(10)"),
            Some(ColumnType::new(ColumnKind::Varchar, Some(10)))
        );
        assert_eq!(
            ColumnType::parse("char(2)"),
            Some(ColumnType::new(ColumnKind::Char, Some(2)))
        );
        assert_eq!(
            ColumnType::parse("INT"),
            Some(ColumnType::new(ColumnKind::Int, None))
        );
        assert_eq!(
            ColumnType::parse("INT (11)"),
            Some(ColumnType::new(ColumnKind::Int, Some(11)))
        );
    }

    #[test]
    fn test_reject_bad_specs() {
        assert_eq!(ColumnType::parse("TEXT"), None);
        assert_eq!(ColumnType::parse("INTEGER"), None);
        assert_eq!(ColumnType::parse("VARCHAR(abc)"), None);
        assert_eq!(ColumnType::parse("VARCHAR(0)"), None);
        assert_eq!(ColumnType::parse("VARCHAR(10"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ColumnType::parse("varchar(3)").unwrap().to_string(), "VARCHAR(3)");
        assert_eq!(ColumnType::parse("int").unwrap().to_string(), "INT");
    }

    #[test]
    fn test_coerce_strings() {
        let ty = ColumnType::parse("VARCHAR(3)").unwrap();
        assert_eq!(ty.coerce(Value::from("Jackson")), Value::from("Jac"));
        assert_eq!(ty.coerce(Value::Integer(12345)), Value::from("123"));
        assert_eq!(ty.coerce(Value::from("")), Value::Null);

        let unbounded = ColumnType::parse("CHAR").unwrap();
        assert_eq!(unbounded.coerce(Value::from("Jackson")), Value::from("Jackson"));
    }

    #[test]
    fn test_coerce_integers() {
        let ty = ColumnType::parse("INT(1)").unwrap();
        assert_eq!(ty.coerce(Value::Integer(12345)), Value::Integer(12345));
        assert_eq!(ty.coerce(Value::from(" 42")), Value::Integer(42));
        assert_eq!(ty.coerce(Value::from("-7px")), Value::Integer(-7));
        assert_eq!(ty.coerce(Value::from("abc")), Value::Null);
        assert_eq!(ty.coerce(Value::Null), Value::Null);
    }

    #[test]
    fn test_serde_as_string() {
        let ty = ColumnType::parse("VARCHAR(10)").unwrap();
        assert_eq!(serde_json::to_string(&ty).unwrap(), "\"VARCHAR(10)\"");
        let back: ColumnType = serde_json::from_str("\"int(4)\"").unwrap();
        assert_eq!(back, ColumnType::new(ColumnKind::Int, Some(4)));
        assert!(serde_json::from_str::<ColumnType>("\"BLOB\"").is_err());
    }
}
