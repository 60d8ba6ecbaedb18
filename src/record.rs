//! Decoded records and the typed-record seam.
//!
//! A [`Record`] is the schema-shaped result of decoding one row: stored fields
//! in schema column order followed by derived fields. Domain types implement
//! [`MappedRecord`] to be built from a `Record`.

use std::sync::Arc;

use itertools::Itertools;

use crate::{
    data::{INTEGER_SENTINEL, TEXT_SENTINEL, Value, normalize_column_name},
    schema::Schema,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    names: Arc<[String]>,
    values: Vec<Value>,
}

impl Record {
    pub(crate) fn new(names: Arc<[String]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    pub fn field_names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names.iter().map(|n| n.as_str()).zip(self.values.iter())
    }

    /// Looks a field up by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let key = normalize_column_name(name);
        self.names
            .iter()
            .position(|n| normalize_column_name(n) == key)
            .map(|idx| &self.values[idx])
    }

    pub fn integer(&self, name: &str) -> i64 {
        self.get(name)
            .and_then(Value::as_i64)
            .unwrap_or(INTEGER_SENTINEL)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn text(&self, name: &str) -> &str {
        self.get(name)
            .and_then(Value::as_str)
            .unwrap_or(TEXT_SENTINEL)
    }

    /// True when the field is missing or holds its sentinel.
    pub fn is_sentinel(&self, name: &str) -> bool {
        self.get(name).is_none_or(Value::is_sentinel)
    }

    /// Renders the stored fields as one delimited line in schema column order.
    /// Derived fields are not written; decoding recomputes them.
    pub fn to_line(&self, schema: &Schema) -> String {
        let delimiter = schema.delimiter().to_string();
        schema
            .columns()
            .iter()
            .map(|column| {
                let raw = self
                    .get(&column.name)
                    .map(Value::as_display)
                    .unwrap_or_default();
                quote_if_needed(raw, schema.delimiter())
            })
            .join(&delimiter)
    }
}

fn quote_if_needed(raw: String, delimiter: char) -> String {
    if raw.contains([delimiter, '"']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw
    }
}

/// Conversion from a decoded [`Record`]. Fields absent from the record fall
/// back to sentinels.
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> Self;
}

impl FromRecord for Record {
    fn from_record(record: &Record) -> Self {
        record.clone()
    }
}

/// A domain type that declares its own schema, so a mapper can be built for it
/// without the caller spelling out columns.
pub trait MappedRecord: FromRecord {
    fn schema() -> Schema;
}
