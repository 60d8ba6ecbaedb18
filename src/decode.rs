//! Per-row decoding.
//!
//! [`RowDecoder::decode`] turns one raw line into a [`DecodeOutcome`]. Row-level
//! problems are values here, not errors: a malformed row becomes
//! [`DecodeOutcome::Skipped`] and the file mapper carries on.

use std::{fmt, sync::Arc};

use crate::{
    data::{Value, parse_typed_value},
    header::HeaderLayout,
    io_utils,
    record::Record,
    schema::{ColumnType, Schema},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Blank or whitespace-only line. Dropped silently, never reported.
    BlankLine,
    FieldCountMismatch {
        expected: usize,
        found: usize,
    },
    TypeMismatch {
        column: String,
        value: String,
        expected: ColumnType,
    },
    /// Line bytes are not valid in the input encoding.
    Undecodable { encoding: String },
}

impl SkipReason {
    pub fn code(&self) -> &'static str {
        match self {
            SkipReason::BlankLine => "blank_line",
            SkipReason::FieldCountMismatch { .. } => "field_count_mismatch",
            SkipReason::TypeMismatch { .. } => "type_mismatch",
            SkipReason::Undecodable { .. } => "undecodable",
        }
    }

    pub fn is_reported(&self) -> bool {
        !matches!(self, SkipReason::BlankLine)
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::BlankLine => write!(f, "blank line"),
            SkipReason::FieldCountMismatch { expected, found } => write!(
                f,
                "number of data fields ({found}) does not match number of headers ({expected})"
            ),
            SkipReason::TypeMismatch {
                column,
                value,
                expected,
            } => write!(f, "column '{column}' value '{value}' is not a valid {expected}"),
            SkipReason::Undecodable { encoding } => {
                write!(f, "line is not valid {encoding} text")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub line_number: usize,
    pub raw_line: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    Decoded(Record),
    Skipped(SkippedRow),
}

impl DecodeOutcome {
    pub fn into_record(self) -> Option<Record> {
        match self {
            DecodeOutcome::Decoded(record) => Some(record),
            DecodeOutcome::Skipped(_) => None,
        }
    }
}

/// Decodes rows of one file. The header layout is fixed for the whole file.
#[derive(Debug, Clone)]
pub struct RowDecoder<'a> {
    schema: &'a Schema,
    layout: HeaderLayout,
    names: Arc<[String]>,
}

impl<'a> RowDecoder<'a> {
    pub fn new(schema: &'a Schema, layout: HeaderLayout) -> Self {
        Self {
            schema,
            layout,
            names: schema.field_names().into(),
        }
    }

    pub fn layout(&self) -> &HeaderLayout {
        &self.layout
    }

    pub fn decode(&self, raw_line: &str, line_number: usize) -> DecodeOutcome {
        let skip = |reason| {
            DecodeOutcome::Skipped(SkippedRow {
                line_number,
                raw_line: raw_line.to_string(),
                reason,
            })
        };

        if raw_line.trim().is_empty() {
            return skip(SkipReason::BlankLine);
        }

        let fields = io_utils::split_line(raw_line, self.schema.delimiter_byte());
        if fields.len() != self.layout.field_count() {
            return skip(SkipReason::FieldCountMismatch {
                expected: self.layout.field_count(),
                found: fields.len(),
            });
        }

        let columns = self.schema.columns();
        let mut values = Vec::with_capacity(self.names.len());
        for (idx, column) in columns.iter().enumerate() {
            let Some(position) = self.layout.position(idx) else {
                values.push(Value::sentinel(column.datatype));
                continue;
            };
            let cell = fields[position].as_str();
            match parse_typed_value(cell, column.datatype) {
                Ok(Some(value)) => values.push(value),
                Ok(None) => values.push(Value::sentinel(column.datatype)),
                Err(_) => {
                    return skip(SkipReason::TypeMismatch {
                        column: column.name.clone(),
                        value: cell.to_string(),
                        expected: column.datatype,
                    });
                }
            }
        }

        for field in self.schema.derived() {
            let [left, right] = field.rule.inputs().map(|input| {
                self.schema
                    .column_index(input)
                    .map(|idx| values[idx].clone())
            });
            let kind = self.schema.derived_kind(field);
            let value = match (left, right) {
                (Some(left), Some(right)) => field.rule.evaluate(&left, &right, kind),
                _ => Value::sentinel(kind),
            };
            values.push(value);
        }

        DecodeOutcome::Decoded(Record::new(Arc::clone(&self.names), values))
    }
}
