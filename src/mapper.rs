//! File-to-records orchestration.
//!
//! [`FileMapper::map_file`] validates the file, establishes the header layout,
//! decodes every following line, and collects the decoded records in file
//! order. Validation failures abort the call before any row is read; row
//! failures are reported to the configured [`DiagnosticSink`] and the call
//! still succeeds.

use std::path::Path;

use encoding_rs::{Encoding, UTF_8};
use log::{debug, info};

use crate::{
    decode::{DecodeOutcome, RowDecoder, SkipReason, SkippedRow},
    diagnostics::{DiagnosticReport, DiagnosticSink, LogSink},
    error::{MapperError, MapperResult},
    header::{self, HeaderLayout},
    io_utils::LineReader,
    record::{FromRecord, MappedRecord, Record},
    schema::Schema,
};

pub struct FileMapper<S = LogSink> {
    schema: Schema,
    encoding: &'static Encoding,
    sink: S,
}

impl FileMapper<LogSink> {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            encoding: UTF_8,
            sink: LogSink,
        }
    }

    /// Mapper for a typed record, using the schema the type declares.
    pub fn for_record<T: MappedRecord>() -> Self {
        Self::new(T::schema())
    }
}

impl<S: DiagnosticSink> FileMapper<S> {
    pub fn with_sink<N: DiagnosticSink>(self, sink: N) -> FileMapper<N> {
        FileMapper {
            schema: self.schema,
            encoding: self.encoding,
            sink,
        }
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Replaces the separator, e.g. for a file that uses `;` with a schema
    /// declared for `,`.
    pub fn with_delimiter(mut self, delimiter: char) -> MapperResult<Self> {
        self.schema = self.schema.with_delimiter(delimiter)?;
        Ok(self)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn validate(&self, path: &Path) -> MapperResult<()> {
        header::validate(path, &self.schema, self.encoding)
    }

    pub fn map_file(&self, path: &Path) -> MapperResult<Vec<Record>> {
        self.validate(path)?;

        let not_found = |err| MapperError::not_found(path, err);
        let mut reader = LineReader::open(path)?;
        let Some(header_line) = reader.next_line().map_err(not_found)? else {
            // Validation saw a header, so the file changed underneath us.
            return Err(MapperError::not_found(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "header disappeared after validation",
                ),
            ));
        };
        let header_text = header_line.decode(self.encoding)?;
        let layout = HeaderLayout::from_line(&header_text, &self.schema);
        let decoder = RowDecoder::new(&self.schema, layout);
        debug!(
            "Mapping {:?} with {} header column(s)",
            path,
            decoder.layout().field_count()
        );

        let mut records = Vec::new();
        let mut report = DiagnosticReport::new(path);
        let mut blank_lines = 0usize;
        while let Some(line) = reader.next_line().map_err(not_found)? {
            let Ok(text) = line.decode(self.encoding) else {
                report.push(SkippedRow {
                    line_number: line.number,
                    raw_line: line.decode_lossy(self.encoding),
                    reason: SkipReason::Undecodable {
                        encoding: self.encoding.name().to_string(),
                    },
                });
                continue;
            };
            match decoder.decode(&text, line.number) {
                DecodeOutcome::Decoded(record) => records.push(record),
                DecodeOutcome::Skipped(row) if row.reason.is_reported() => report.push(row),
                DecodeOutcome::Skipped(_) => blank_lines += 1,
            }
        }

        if !report.is_empty() {
            self.sink.report(&report);
        }
        info!(
            "Mapped {} record(s) from {:?} ({} skipped, {} blank)",
            records.len(),
            path,
            report.len(),
            blank_lines
        );
        Ok(records)
    }

    pub fn map_file_as<T: FromRecord>(&self, path: &Path) -> MapperResult<Vec<T>> {
        Ok(self
            .map_file(path)?
            .iter()
            .map(T::from_record)
            .collect())
    }
}
