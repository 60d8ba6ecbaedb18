//! Structural pre-checks run before any row is decoded.
//!
//! [`validate`] rejects files with the wrong extension, files that cannot be
//! opened, and files whose first line shares no column with the schema. The
//! check is permissive: columns may come in any order, extra columns are
//! allowed, and a single recognised column is enough.
//!
//! [`HeaderLayout`] is the per-file column-name-to-position mapping the row
//! decoder works from.

use std::path::Path;

use encoding_rs::Encoding;
use itertools::Itertools;
use log::debug;

use crate::{
    data::normalize_column_name,
    error::{FormatError, MapperError, MapperResult},
    io_utils,
    schema::Schema,
};

pub fn validate(path: &Path, schema: &Schema, encoding: &'static Encoding) -> MapperResult<()> {
    if path.as_os_str().is_empty() {
        return Err(MapperError::InvalidArgument(
            "The file path cannot be empty".to_string(),
        ));
    }
    if !io_utils::has_extension(path, schema.extension()) {
        return Err(FormatError::WrongExtension {
            path: path.to_path_buf(),
            expected: schema.extension().to_string(),
        }
        .into());
    }

    let header = io_utils::read_first_line(path, encoding)?;
    let layout = header
        .as_deref()
        .filter(|line| !line.trim().is_empty())
        .map(|line| HeaderLayout::from_line(line, schema))
        .filter(HeaderLayout::has_recognised_column);

    match layout {
        Some(layout) => {
            let missing = layout.missing_columns(schema);
            if !missing.is_empty() {
                debug!(
                    "Header of {:?} lacks schema column(s) {}; those fields will hold sentinels",
                    path,
                    missing.iter().join(", ")
                );
            }
            Ok(())
        }
        None => Err(FormatError::InvalidHeader {
            path: path.to_path_buf(),
            separator: schema.delimiter(),
            expected: schema.expected_columns(),
        }
        .into()),
    }
}

/// Positions of schema columns within one file's header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLayout {
    field_count: usize,
    positions: Vec<Option<usize>>,
}

impl HeaderLayout {
    pub fn from_line(line: &str, schema: &Schema) -> Self {
        let headers = io_utils::split_line(line, schema.delimiter_byte());
        Self::from_headers(&headers, schema)
    }

    pub fn from_headers(headers: &[String], schema: &Schema) -> Self {
        let normalized = headers
            .iter()
            .map(|h| normalize_column_name(h))
            .collect::<Vec<_>>();
        let positions = schema
            .columns()
            .iter()
            .map(|column| {
                let key = normalize_column_name(&column.name);
                normalized.iter().position(|h| *h == key)
            })
            .collect();
        Self {
            field_count: headers.len(),
            positions,
        }
    }

    pub fn field_count(&self) -> usize {
        self.field_count
    }

    /// Header position of the schema column at `column_index`, if present.
    pub fn position(&self, column_index: usize) -> Option<usize> {
        self.positions.get(column_index).copied().flatten()
    }

    pub fn has_recognised_column(&self) -> bool {
        self.positions.iter().any(Option::is_some)
    }

    pub fn missing_columns<'a>(&self, schema: &'a Schema) -> Vec<&'a str> {
        schema
            .columns()
            .iter()
            .zip(&self.positions)
            .filter(|(_, position)| position.is_none())
            .map(|(column, _)| column.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnMeta, ColumnType};
    use encoding_rs::UTF_8;
    use tempfile::tempdir;

    fn schema() -> Schema {
        Schema::new(
            vec![
                ColumnMeta::new("A", ColumnType::Integer),
                ColumnMeta::new("B", ColumnType::Integer),
            ],
            Vec::new(),
        )
        .unwrap()
    }

    #[test]
    fn layout_maps_columns_in_any_order_and_ignores_extras() {
        let layout = HeaderLayout::from_line("extra,b,a", &schema());
        assert_eq!(layout.field_count(), 3);
        assert_eq!(layout.position(0), Some(2));
        assert_eq!(layout.position(1), Some(1));
        assert!(layout.missing_columns(&schema()).is_empty());
    }

    #[test]
    fn layout_reports_missing_columns() {
        let layout = HeaderLayout::from_line("A,C", &schema());
        assert_eq!(layout.position(1), None);
        assert_eq!(layout.missing_columns(&schema()), vec!["B"]);
    }

    #[test]
    fn validate_accepts_a_single_matching_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "x,B,y\n1,2,3\n").unwrap();
        assert!(validate(&path, &schema(), UTF_8).is_ok());
    }

    #[test]
    fn validate_rejects_header_with_wrong_separator() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "A;B\n1;2\n").unwrap();
        let err = validate(&path, &schema(), UTF_8).unwrap_err();
        match err {
            MapperError::Format(FormatError::InvalidHeader {
                separator,
                expected,
                ..
            }) => {
                assert_eq!(separator, ',');
                assert_eq!(expected, "A, B");
            }
            other => panic!("expected InvalidHeader, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_blank_first_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "   \nA,B\n").unwrap();
        assert!(validate(&path, &schema(), UTF_8).unwrap_err().is_format_error());
    }

    #[test]
    fn validate_checks_extension_before_existence() {
        let err = validate(Path::new("/missing/data.json"), &schema(), UTF_8).unwrap_err();
        assert!(matches!(
            err,
            MapperError::Format(FormatError::WrongExtension { .. })
        ));
        let err = validate(Path::new("/missing/data.csv"), &schema(), UTF_8).unwrap_err();
        assert!(matches!(err, MapperError::NotFound { .. }));
    }

    #[test]
    fn validate_rejects_empty_path() {
        let err = validate(Path::new(""), &schema(), UTF_8).unwrap_err();
        assert!(matches!(err, MapperError::InvalidArgument(_)));
    }
}
