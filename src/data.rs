use std::{cmp::Ordering, fmt};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::schema::ColumnType;

pub const INTEGER_SENTINEL: i64 = -1;
pub const FLOAT_SENTINEL: f64 = -1.0;
pub const TEXT_SENTINEL: &str = "";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// The reserved "missing or uncomputable" marker for a field of kind `ty`.
    pub fn sentinel(ty: ColumnType) -> Self {
        match ty {
            ColumnType::Integer => Value::Integer(INTEGER_SENTINEL),
            ColumnType::Float => Value::Float(FLOAT_SENTINEL),
            ColumnType::Text => Value::Text(TEXT_SENTINEL.to_string()),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        match self {
            Value::Integer(i) => *i == INTEGER_SENTINEL,
            Value::Float(f) => *f == FLOAT_SENTINEL,
            Value::Text(s) => s == TEXT_SENTINEL,
        }
    }

    pub fn kind(&self) -> ColumnType {
        match self {
            Value::Integer(_) => ColumnType::Integer,
            Value::Float(_) => ColumnType::Float,
            Value::Text(_) => ColumnType::Text,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => s.clone(),
        }
    }

    /// Total order used by extremal queries. Numbers compare numerically across
    /// integer and float, floats use `total_cmp`, and every number sorts before
    /// any text.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Text(_), _) => Ordering::Greater,
            (_, Value::Text(_)) => Ordering::Less,
            (left, right) => {
                let a = left.as_f64().unwrap_or(FLOAT_SENTINEL);
                let b = right.as_f64().unwrap_or(FLOAT_SENTINEL);
                a.total_cmp(&b)
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Canonical form used for case-insensitive column matching.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().trim_matches('"').trim().to_lowercase()
}

/// Parses a raw cell. Empty cells yield `None`, which callers bind to the
/// sentinel. Numeric cells are trimmed before conversion; text is kept as is.
pub fn parse_typed_value(value: &str, ty: ColumnType) -> Result<Option<Value>> {
    let parsed = match ty {
        ColumnType::Text => {
            if value.is_empty() {
                return Ok(None);
            }
            Value::Text(value.to_string())
        }
        ColumnType::Integer => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            let parsed: i64 = trimmed
                .parse()
                .with_context(|| format!("Failed to parse '{value}' as integer"))?;
            Value::Integer(parsed)
        }
        ColumnType::Float => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            let parsed: f64 = trimmed
                .parse()
                .with_context(|| format!("Failed to parse '{value}' as float"))?;
            Value::Float(parsed)
        }
    };
    Ok(Some(parsed))
}
