//! Error taxonomy for mapping and querying.
//!
//! File-level structural problems abort a call through [`MapperError`]. Row-level
//! problems never show up here; they are [`crate::decode::SkipReason`] values
//! collected into a diagnostic report.

use std::{io, path::PathBuf};

use thiserror::Error;

pub type MapperResult<T> = Result<T, MapperError>;

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("File {path:?} could not be found or read: {source}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("File {path:?} is invalid. The file must be a .{expected} file")]
    WrongExtension { path: PathBuf, expected: String },

    #[error(
        "The header of {path:?} is not valid. It needs at least one column matching the schema ({expected}) separated by '{separator}'"
    )]
    InvalidHeader {
        path: PathBuf,
        separator: char,
        expected: String,
    },
}

impl MapperError {
    pub(crate) fn not_found(path: impl Into<PathBuf>, source: io::Error) -> Self {
        MapperError::NotFound {
            path: path.into(),
            source,
        }
    }

    pub fn is_format_error(&self) -> bool {
        matches!(self, MapperError::Format(_))
    }
}
