//! Value type for sqlstash
//!
//! This module defines how cell values are represented in memory.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A value stored in a row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL value, also used for columns a row has no value for
    Null,
    /// Integer value
    Integer(i64),
    /// String value
    String(String),
}

impl Value {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Read this value as an integer. Strings qualify when their trimmed
    /// text is a whole integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::String(s) => s.trim().parse().ok(),
            Value::Null => None,
        }
    }

    /// Total ordering used for sorting: NULL first, then integers, then
    /// strings. Strings order case-insensitively, ties broken by exact text.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Integer(_), Value::String(_)) => Ordering::Less,
            (Value::String(_), Value::Integer(_)) => Ordering::Greater,
            (Value::String(a), Value::String(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_comparison() {
        assert_eq!(Value::Integer(1).compare(&Value::Integer(2)), Ordering::Less);
        assert_eq!(Value::from("b").compare(&Value::from("a")), Ordering::Greater);
        assert_eq!(Value::Null.compare(&Value::Integer(-100)), Ordering::Less);
        assert_eq!(Value::Integer(9).compare(&Value::from("1")), Ordering::Less);
    }

    #[test]
    fn test_string_comparison_folds_case() {
        assert_eq!(Value::from("Zed").compare(&Value::from("apple")), Ordering::Greater);
        assert_eq!(Value::from("apple").compare(&Value::from("Banana")), Ordering::Less);
        assert_eq!(Value::from("abc").compare(&Value::from("abc")), Ordering::Equal);
    }

    #[test]
    fn test_as_integer() {
        assert_eq!(Value::Integer(3).as_integer(), Some(3));
        assert_eq!(Value::from(" 12 ").as_integer(), Some(12));
        assert_eq!(Value::from("12a").as_integer(), None);
        assert_eq!(Value::Null.as_integer(), None);
    }

    #[test]
    fn test_json_shape() {
        let values = vec![Value::Null, Value::Integer(1), Value::from("x")];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[null,1,"x"]"#);
        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Integer(-4).to_string(), "-4");
        assert_eq!(Value::from(None::<i64>).to_string(), "NULL");
    }
}
