#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv_extremes::schema::{ColumnMeta, ColumnType, DerivedField, DerivedRule, Schema};
use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    /// Like [`TestWorkspace::write`], for contents that are not UTF-8.
    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents).expect("write temp file contents");
        path
    }
}

/// Two integer columns `A` and `B`, comma separated.
pub fn ab_schema() -> Schema {
    Schema::new(
        vec![
            ColumnMeta::new("A", ColumnType::Integer),
            ColumnMeta::new("B", ColumnType::Integer),
        ],
        Vec::new(),
    )
    .expect("valid schema")
}

/// Month/day/temperature/label columns used by the mapper tests.
pub fn reading_schema() -> Schema {
    Schema::new(
        vec![
            ColumnMeta::new("Month", ColumnType::Text),
            ColumnMeta::new("Day", ColumnType::Integer),
            ColumnMeta::new("Temp", ColumnType::Float),
        ],
        Vec::new(),
    )
    .expect("valid schema")
}

/// Temperature range columns with a derived spread.
pub fn spread_schema() -> Schema {
    Schema::new(
        vec![
            ColumnMeta::new("Day", ColumnType::Integer),
            ColumnMeta::new("Min", ColumnType::Integer),
            ColumnMeta::new("Max", ColumnType::Integer),
        ],
        vec![DerivedField::new(
            "Spread",
            DerivedRule::Spread {
                high: "Max".to_string(),
                low: "Min".to_string(),
            },
        )],
    )
    .expect("valid schema")
}
