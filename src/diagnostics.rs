//! Side-channel reporting of skipped rows.
//!
//! The file mapper never fails a call because of bad rows. Instead it hands a
//! [`DiagnosticReport`] to a [`DiagnosticSink`]: [`LogSink`] writes it through
//! the `log` facade, [`CollectingSink`] keeps reports in memory for callers
//! that want to inspect them.

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use log::warn;

use crate::decode::SkippedRow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticReport {
    pub path: PathBuf,
    pub entries: Vec<SkippedRow>,
}

impl DiagnosticReport {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, row: SkippedRow) {
        self.entries.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn line_numbers(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.line_number).collect()
    }
}

pub trait DiagnosticSink {
    fn report(&self, report: &DiagnosticReport);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, report: &DiagnosticReport) {
        warn!(
            "Skipped {} row(s) while mapping {:?}; they will not be mapped to records",
            report.len(),
            report.path
        );
        for entry in &report.entries {
            warn!(
                "  line {} [{}]: {} | {}",
                entry.line_number,
                entry.reason.code(),
                entry.reason,
                entry.raw_line
            );
        }
    }
}

#[derive(Debug, Default)]
pub struct CollectingSink {
    reports: Mutex<Vec<DiagnosticReport>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<DiagnosticReport> {
        self.reports
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn skipped_lines(&self) -> Vec<usize> {
        self.reports()
            .iter()
            .flat_map(DiagnosticReport::line_numbers)
            .collect()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, report: &DiagnosticReport) {
        if let Ok(mut guard) = self.reports.lock() {
            guard.push(report.clone());
        }
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn report(&self, report: &DiagnosticReport) {
        (**self).report(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::SkipReason;

    fn skipped(line_number: usize) -> SkippedRow {
        SkippedRow {
            line_number,
            raw_line: "1,2,3".to_string(),
            reason: SkipReason::FieldCountMismatch {
                expected: 2,
                found: 3,
            },
        }
    }

    #[test]
    fn collecting_sink_keeps_reports_in_order() {
        let sink = CollectingSink::new();
        let mut first = DiagnosticReport::new(Path::new("a.csv"));
        first.push(skipped(3));
        first.push(skipped(7));
        let mut second = DiagnosticReport::new(Path::new("b.csv"));
        second.push(skipped(2));

        sink.report(&first);
        sink.report(&second);

        assert_eq!(sink.reports().len(), 2);
        assert_eq!(sink.reports()[0].path, PathBuf::from("a.csv"));
        assert_eq!(sink.skipped_lines(), vec![3, 7, 2]);
    }
}
