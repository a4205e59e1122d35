//! Lifecycle event extraction.
//!
//! One pass over the log lines: each line carrying a `[HH:MM:SS.mmm]` clock
//! token contributes its timestamp to the file-wide list and, when its text
//! matches a catalog step, to that step's list. A line is attributed to at
//! most one step, the earliest matching one in catalog order.

use std::path::Path;

use chrono::NaiveTime;
use regex::{Regex, RegexSet};
use timeline_core::catalog::{self, LifecycleStep};
use timeline_core::error::Result;
use timeline_core::models::{LogTimeline, TimestampLog};
use timeline_core::time_utils;
use tracing::{debug, info};

use crate::header::HeaderExtractor;
use crate::reader;

/// Bracketed firmware clock token.
pub const TIMESTAMP_PATTERN: &str = r"\[\d{2}:\d{2}:\d{2}\.\d{3}\]";

// ── StepMatcher ───────────────────────────────────────────────────────────────

/// Classifies a log line into a lifecycle step.
pub struct StepMatcher {
    steps: Vec<(LifecycleStep, RegexSet)>,
}

impl Default for StepMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl StepMatcher {
    pub fn new() -> Self {
        let steps = catalog::steps()
            .map(|step| {
                (
                    step,
                    RegexSet::new(step.patterns()).expect("catalog pattern is valid"),
                )
            })
            .collect();
        Self { steps }
    }

    /// The first step in catalog order with any keyword matching `line`.
    pub fn classify(&self, line: &str) -> Option<LifecycleStep> {
        self.steps
            .iter()
            .find(|(_, set)| set.is_match(line))
            .map(|(step, _)| *step)
    }
}

// ── TimelineExtractor ─────────────────────────────────────────────────────────

/// Builds a [`LogTimeline`] from a log file or its lines.
pub struct TimelineExtractor {
    header: HeaderExtractor,
    steps: StepMatcher,
    timestamp: Regex,
}

impl Default for TimelineExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineExtractor {
    pub fn new() -> Self {
        Self {
            header: HeaderExtractor::new(),
            steps: StepMatcher::new(),
            timestamp: Regex::new(TIMESTAMP_PATTERN).expect("regex is valid"),
        }
    }

    /// The first valid clock token in `line`, if any. Tokens that look like
    /// a clock but are out of range are skipped.
    pub fn line_timestamp(&self, line: &str) -> Option<NaiveTime> {
        self.timestamp
            .find_iter(line)
            .find_map(|m| time_utils::parse_log_timestamp(m.as_str()))
    }

    /// Extract header, per-step timestamps and the file-wide timestamp list.
    pub fn extract_lines<S: AsRef<str>>(&self, lines: &[S]) -> LogTimeline {
        let header = self.header.extract(lines);
        let mut steps = TimestampLog::new();
        let mut timestamps = Vec::new();

        for line in lines {
            let line = line.as_ref();
            let Some(ts) = self.line_timestamp(line) else {
                continue;
            };
            timestamps.push(ts);
            if let Some(step) = self.steps.classify(line) {
                steps.record(step, ts);
            }
        }

        debug!(
            "Extracted {} step events from {} timestamped lines",
            steps.total(),
            timestamps.len()
        );

        LogTimeline {
            header,
            steps,
            timestamps,
        }
    }

    /// Read and extract the log at `path`.
    ///
    /// A missing file yields [`TimelineError::FileNotFound`](timeline_core::error::TimelineError::FileNotFound).
    pub fn extract_file(&self, path: &Path) -> Result<LogTimeline> {
        let lines = reader::read_log_lines(path)?;
        let timeline = self.extract_lines(&lines);
        info!(
            "{}: {} events, {} timestamps",
            path.display(),
            timeline.steps.total(),
            timeline.timestamps.len()
        );
        Ok(timeline)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use timeline_core::models::HeaderField;

    fn t(h: u32, m: u32, s: u32, ms: u32) -> NaiveTime {
        NaiveTime::from_hms_milli_opt(h, m, s, ms).unwrap()
    }

    fn extract(lines: &[&str]) -> LogTimeline {
        TimelineExtractor::new().extract_lines(lines)
    }

    // ── StepMatcher ───────────────────────────────────────────────────────────

    #[test]
    fn test_classify_each_step() {
        let m = StepMatcher::new();
        let cases = [
            ("rst:0x5 (DEEPSLEEP_RESET)", LifecycleStep::MeterWakesUp),
            ("resetModem()", LifecycleStep::AttachesToGsmNetwork),
            ("get network status: 1", LifecycleStep::AttachesToGsmNetwork),
            ("Modem Connect to PPP Server", LifecycleStep::OpensProtocol),
            ("MQTT ACK received", LifecycleStep::OpensProtocol),
            ("get_cacert ok", LifecycleStep::AuthenticatesToServer),
            (
                "handleIncomePublish topic $aws/things/m1/jobs/get/accepted",
                LifecycleStep::ChecksForJobs,
            ),
            ("AdjustCredit done", LifecycleStep::FinishesCommand),
            ("aws_Publish telemetry successed", LifecycleStep::SendsTelemetry),
            ("topic meter-status", LifecycleStep::SendsTelemetry),
            ("aws_Disconnect", LifecycleStep::DisconnectsFromServer),
            ("PPP state changed event 5", LifecycleStep::DisconnectsFromGsm),
            ("going into low power", LifecycleStep::DeepSleep),
        ];
        for (line, expected) in cases {
            assert_eq!(m.classify(line), Some(expected), "line: {}", line);
        }
    }

    #[test]
    fn test_classify_requires_ordered_keywords() {
        let m = StepMatcher::new();
        assert_eq!(m.classify("jobs/get/accepted then handleIncomePublish"), None);
        assert_eq!(m.classify("successed before aws_Publish"), None);
        assert_eq!(m.classify("aws_Publish failed"), None);
    }

    #[test]
    fn test_classify_no_match() {
        assert_eq!(StepMatcher::new().classify("heap free: 120000"), None);
    }

    #[test]
    fn test_classify_earliest_catalog_step_wins() {
        let m = StepMatcher::new();
        assert_eq!(
            m.classify("aws_Disconnect then into low power"),
            Some(LifecycleStep::DisconnectsFromServer)
        );
        assert_eq!(
            m.classify("into low power after DEEPSLEEP_RESET"),
            Some(LifecycleStep::MeterWakesUp)
        );
    }

    // ── line_timestamp ────────────────────────────────────────────────────────

    #[test]
    fn test_line_timestamp_anywhere_in_line() {
        let ex = TimelineExtractor::new();
        assert_eq!(
            ex.line_timestamp("I (123) boot: [00:00:01.500] start"),
            Some(t(0, 0, 1, 500))
        );
    }

    #[test]
    fn test_line_timestamp_requires_millis() {
        let ex = TimelineExtractor::new();
        assert_eq!(ex.line_timestamp("[00:00:01] DEEPSLEEP_RESET"), None);
        assert_eq!(ex.line_timestamp("00:00:01.500 DEEPSLEEP_RESET"), None);
    }

    #[test]
    fn test_line_timestamp_invalid_clock_is_skipped() {
        let ex = TimelineExtractor::new();
        assert_eq!(ex.line_timestamp("[99:00:00.000] DEEPSLEEP_RESET"), None);
    }

    #[test]
    fn test_line_timestamp_falls_through_invalid_token() {
        let ex = TimelineExtractor::new();
        assert_eq!(
            ex.line_timestamp("[99:00:00.000] [00:00:01.000] DEEPSLEEP_RESET"),
            Some(t(0, 0, 1, 0))
        );

        let timeline = extract(&["[99:00:00.000] [00:00:01.000] DEEPSLEEP_RESET"]);
        assert_eq!(timeline.timestamps, vec![t(0, 0, 1, 0)]);
        assert_eq!(
            timeline.steps.timestamps(LifecycleStep::MeterWakesUp),
            &[t(0, 0, 1, 0)]
        );
    }

    // ── extract_lines ─────────────────────────────────────────────────────────

    #[test]
    fn test_wake_up_example() {
        let timeline = extract(&["[00:01:23.456] DEEPSLEEP_RESET triggered"]);
        assert_eq!(
            timeline.steps.timestamps(LifecycleStep::MeterWakesUp),
            &[t(0, 1, 23, 456)]
        );
        assert_eq!(timeline.timestamps, vec![t(0, 1, 23, 456)]);
    }

    #[test]
    fn test_keyword_without_timestamp_contributes_nothing() {
        let timeline = extract(&["DEEPSLEEP_RESET triggered", "into low power"]);
        assert!(timeline.steps.is_empty());
        assert!(timeline.timestamps.is_empty());
    }

    #[test]
    fn test_unmatched_timestamped_lines_still_counted() {
        let timeline = extract(&[
            "[00:00:00.000] boot",
            "[00:00:02.000] DEEPSLEEP_RESET",
        ]);
        assert_eq!(timeline.timestamps.len(), 2);
        assert_eq!(timeline.steps.total(), 1);
    }

    #[test]
    fn test_line_attributed_to_one_step_only() {
        let timeline = extract(&["[00:00:05.000] aws_Disconnect; into low power"]);
        assert_eq!(
            timeline.steps.timestamps(LifecycleStep::DisconnectsFromServer),
            &[t(0, 0, 5, 0)]
        );
        assert!(timeline.steps.timestamps(LifecycleStep::DeepSleep).is_empty());
        assert_eq!(timeline.steps.total(), 1);
    }

    #[test]
    fn test_repeated_step_keeps_line_order_without_sorting() {
        let timeline = extract(&[
            "[00:00:10.000] meter-status sent",
            "[00:00:04.000] meter-status sent",
            "[00:00:12.000] aws_Publish #3 successed",
        ]);
        assert_eq!(
            timeline.steps.timestamps(LifecycleStep::SendsTelemetry),
            &[t(0, 0, 10, 0), t(0, 0, 4, 0), t(0, 0, 12, 0)]
        );
        let elapsed = timeline.elapsed_series();
        assert_eq!(elapsed, vec![0.0, -6.0, 2.0]);
    }

    #[test]
    fn test_first_elapsed_is_zero() {
        let timeline = extract(&[
            "[12:00:00.250] boot",
            "[12:00:01.000] DEEPSLEEP_RESET",
        ]);
        assert_eq!(timeline.elapsed_series()[0], 0.0);
    }

    #[test]
    fn test_header_and_timeline_are_independent() {
        let timeline = extract(&[
            "g_meterId : 12345",
            "[00:00:01.000] resetModem",
        ]);
        assert_eq!(timeline.header.get(HeaderField::MeterId), Some("12345"));
        assert_eq!(
            timeline.steps.timestamps(LifecycleStep::AttachesToGsmNetwork),
            &[t(0, 0, 1, 0)]
        );
    }

    #[test]
    fn test_full_cycle() {
        let log = [
            "ets Jun  8 2016 00:22:57",
            "[00:00:00.012] rst:0x5 (DEEPSLEEP_RESET),boot:0x13 (SPI_FAST_FLASH_BOOT)",
            "[00:00:00.140] g_meterId : 100200",
            "[00:00:00.141] g_mAhRemain : 3120",
            "[00:00:00.150] PCB Type is GSM Board!",
            "[00:00:01.020] resetModem",
            "[00:00:03.500] modemIMEI : \"867000000000001\"",
            "[00:00:03.510] modemIMSI : \"234000000000001\"",
            "[00:00:03.600] g_stIccid.iccid_nu : 8944000000000000042",
            "[00:00:05.000] get network status 1",
            "[00:00:07.250] Modem Connect to PPP Server",
            "[00:00:08.000] get_cacert len 1188",
            "[00:00:09.100] MQTT ACK",
            "[00:00:09.900] handleIncomePublish $aws/things/100200/jobs/get/accepted",
            "[00:00:10.300] AdjustCredit amount=500",
            "[00:00:11.000] aws_Publish meter-status",
            "[00:00:11.400] aws_Publish(12) successed",
            "[00:00:12.000] aws_Disconnect",
            "[00:00:12.800] PPP state changed event 5",
            "[00:00:13.000] Going into low power mode",
        ];
        let timeline = extract(&log);

        assert_eq!(timeline.header.found_count(), 6);
        assert_eq!(timeline.header.iccid(), Some("8944000000000000042"));
        assert_eq!(timeline.timestamps.len(), 19);

        let per_step: Vec<usize> = timeline.steps.iter().map(|(_, ts)| ts.len()).collect();
        assert_eq!(per_step, vec![1, 2, 2, 1, 1, 1, 2, 1, 1, 1]);

        let rows = timeline.event_rows();
        assert_eq!(rows.len(), 13);
        assert_eq!(rows[0].0.step, LifecycleStep::MeterWakesUp);
        assert_eq!(rows[0].1, 0.0);
        let last = rows.last().unwrap();
        assert_eq!(last.0.step, LifecycleStep::DeepSleep);
        assert!((last.1 - 12.988).abs() < 1e-9);
    }

    // ── extract_file ──────────────────────────────────────────────────────────

    #[test]
    fn test_extract_file_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = TimelineExtractor::new()
            .extract_file(&dir.path().join("nope.txt"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_extract_file_reads_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("meter.txt");
        std::fs::write(&path, "[00:00:01.000] DEEPSLEEP_RESET\n[00:00:02.000] into low power\n")
            .unwrap();
        let timeline = TimelineExtractor::new().extract_file(&path).unwrap();
        assert_eq!(timeline.steps.total(), 2);
        assert_eq!(timeline.header.found_count(), 0);
    }
}
