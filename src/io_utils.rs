//! I/O utilities for line-oriented reading, encoding, and tokenizing.
//!
//! All file access in csv-extremes flows through this module:
//!
//! - **Encoding**: input decoding via `encoding_rs`, defaulting to UTF-8.
//! - **Line reading**: [`LineReader`] yields decoded physical lines together
//!   with their 1-based line numbers, trailing `\r\n`/`\n` stripped.
//! - **Tokenizing**: [`split_line`] splits one line on the schema separator
//!   with the `csv` crate, so quoted separators stay inside their field.
//! - **Extensions**: [`has_extension`] compares file extensions ignoring case.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use encoding_rs::{Encoding, UTF_8};

use crate::error::{MapperError, MapperResult};

pub fn resolve_encoding(label: Option<&str>) -> MapperResult<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| MapperError::Encoding(format!("Unknown encoding '{value}'")))
    } else {
        Ok(UTF_8)
    }
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> MapperResult<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(MapperError::Encoding(format!(
            "Failed to decode text with encoding {}",
            encoding.name()
        )))
    } else {
        Ok(text.into_owned())
    }
}

pub fn has_extension(path: &Path, expected: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.rsplit_once('.'))
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(expected))
}

/// Buffered reader over the raw lines of one file. Dropping it closes the file.
pub struct LineReader {
    inner: BufReader<File>,
    line_number: usize,
    buffer: Vec<u8>,
}

impl LineReader {
    pub fn open(path: &Path) -> MapperResult<Self> {
        let file = File::open(path).map_err(|err| MapperError::not_found(path, err))?;
        Ok(Self {
            inner: BufReader::new(file),
            line_number: 0,
            buffer: Vec::new(),
        })
    }

    /// Reads the next line. `Ok(None)` at end of file; read failures surface
    /// as `io::Error` for the caller to classify.
    pub fn next_line(&mut self) -> std::io::Result<Option<RawLine>> {
        self.buffer.clear();
        let read = self.inner.read_until(b'\n', &mut self.buffer)?;
        if read == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        while matches!(self.buffer.last(), Some(b'\n' | b'\r')) {
            self.buffer.pop();
        }
        Ok(Some(RawLine {
            number: self.line_number,
            bytes: std::mem::take(&mut self.buffer),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct RawLine {
    pub number: usize,
    pub bytes: Vec<u8>,
}

impl RawLine {
    pub fn decode(&self, encoding: &'static Encoding) -> MapperResult<String> {
        decode_bytes(&self.bytes, encoding)
    }

    /// Decodes with replacement characters in place of malformed sequences.
    pub fn decode_lossy(&self, encoding: &'static Encoding) -> String {
        encoding.decode(&self.bytes).0.into_owned()
    }
}

/// Reads only the first line of `path`; `None` for an empty file.
pub fn read_first_line(path: &Path, encoding: &'static Encoding) -> MapperResult<Option<String>> {
    let mut reader = LineReader::open(path)?;
    match reader
        .next_line()
        .map_err(|err| MapperError::not_found(path, err))?
    {
        Some(line) => Ok(Some(line.decode(encoding)?)),
        None => Ok(None),
    }
}

/// Splits one line into fields. Quoted fields may contain the separator.
/// Returns an empty vector for an empty line.
pub fn split_line(line: &str, delimiter: u8) -> Vec<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(line.as_bytes());
    let mut record = csv::StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => record.iter().map(|field| field.to_string()).collect(),
        Ok(false) => Vec::new(),
        // Tokenizer rejected the line; a plain split still gives the decoder
        // a field count to judge.
        Err(_) => line
            .split(delimiter as char)
            .map(|field| field.to_string())
            .collect(),
    }
}
