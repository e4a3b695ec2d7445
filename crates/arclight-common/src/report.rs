//! Diagnostic sink for the readers.
//!
//! Warnings and errors are numbered, carry file+line context, and are
//! forwarded to `tracing`. The sink keeps counts and (optionally) the
//! rendered messages so tests can assert on the diagnostics a parse
//! produced without installing a subscriber.

use tracing::{error, warn};

#[derive(Debug, Default)]
pub struct Report {
    warn_count: usize,
    error_count: usize,
    capture: bool,
    captured: Vec<String>,
}

impl Report {
    pub fn new() -> Self {
        Report::default()
    }

    /// Keep rendered messages for later inspection. Used by the test-suite.
    pub fn capturing() -> Self {
        Report {
            capture: true,
            ..Report::default()
        }
    }

    pub fn warn(&mut self, id: u32, msg: &str) {
        warn!(id, "{msg}");
        self.record(format!("Warning {id}: {msg}"));
        self.warn_count += 1;
    }

    pub fn error(&mut self, id: u32, msg: &str) {
        error!(id, "{msg}");
        self.record(format!("Error {id}: {msg}"));
        self.error_count += 1;
    }

    pub fn file_warn(&mut self, id: u32, filename: &str, line: u32, msg: &str) {
        warn!(id, file = filename, line, "{msg}");
        self.record(format!("Warning {id}: {filename} line {line}, {msg}"));
        self.warn_count += 1;
    }

    pub fn file_error(&mut self, id: u32, filename: &str, line: u32, msg: &str) {
        error!(id, file = filename, line, "{msg}");
        self.record(format!("Error {id}: {filename} line {line}, {msg}"));
        self.error_count += 1;
    }

    fn record(&mut self, msg: String) {
        if self.capture {
            self.captured.push(msg);
        }
    }

    pub fn warn_count(&self) -> usize {
        self.warn_count
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn messages(&self) -> &[String] {
        &self.captured
    }

    pub fn clear(&mut self) {
        self.warn_count = 0;
        self.error_count = 0;
        self.captured.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_capture() {
        let mut report = Report::capturing();
        report.file_warn(101, "lib.lib", 12, "pin q not found.");
        report.file_error(102, "lib.lib", 30, "syntax error.");
        assert_eq!(report.warn_count(), 1);
        assert_eq!(report.error_count(), 1);
        assert!(report.messages()[0].contains("lib.lib line 12"));
        assert!(report.messages()[1].contains("syntax error"));
        report.clear();
        assert_eq!(report.warn_count(), 0);
        assert!(report.messages().is_empty());
    }

    #[test]
    fn non_capturing_keeps_nothing() {
        let mut report = Report::new();
        report.warn(1, "whatever");
        assert_eq!(report.warn_count(), 1);
        assert!(report.messages().is_empty());
    }
}
