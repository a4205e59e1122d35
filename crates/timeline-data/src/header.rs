//! Device identity extraction.
//!
//! The firmware prints identity variables (meter ID, battery, modem and SIM
//! identifiers, board type) during boot and sometimes again later with
//! updated values, so every line is scanned and the last match wins.

use regex::Regex;
use timeline_core::models::{HeaderField, HeaderInfo};
use tracing::debug;

/// Compiled header field patterns.
pub struct HeaderExtractor {
    patterns: Vec<(HeaderField, Regex)>,
}

impl Default for HeaderExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderExtractor {
    pub fn new() -> Self {
        let patterns = HeaderField::ALL
            .iter()
            .map(|field| {
                (
                    *field,
                    Regex::new(field.pattern()).expect("header pattern is valid"),
                )
            })
            .collect();
        Self { patterns }
    }

    /// Apply every field pattern to one line, overwriting matched fields.
    pub fn scan_line(&self, line: &str, header: &mut HeaderInfo) {
        for (field, re) in &self.patterns {
            if let Some(value) = re.captures(line).and_then(|caps| caps.get(1)) {
                header.set(*field, value.as_str());
            }
        }
    }

    /// Extract header values from all `lines`.
    pub fn extract<S: AsRef<str>>(&self, lines: &[S]) -> HeaderInfo {
        let mut header = HeaderInfo::new();
        for line in lines {
            self.scan_line(line.as_ref(), &mut header);
        }
        debug!("Header: {} of 6 fields found", header.found_count());
        header
    }
}
