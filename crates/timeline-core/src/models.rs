use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{self, LifecycleStep, STEP_CATALOG};
use crate::time_utils;

// ── Header fields ─────────────────────────────────────────────────────────────

/// A device identity value printed by the meter firmware during boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeaderField {
    MeterId,
    RemainingCharge,
    ModemImei,
    ModemImsi,
    Iccid,
    PcbType,
}

impl HeaderField {
    /// All header fields in report order.
    pub const ALL: [HeaderField; 6] = [
        HeaderField::MeterId,
        HeaderField::RemainingCharge,
        HeaderField::ModemImei,
        HeaderField::ModemImsi,
        HeaderField::Iccid,
        HeaderField::PcbType,
    ];

    /// Firmware variable name, also used as the key in CSV exports.
    pub fn key(&self) -> &'static str {
        match self {
            HeaderField::MeterId => "g_meterId",
            HeaderField::RemainingCharge => "g_mAhRemain",
            HeaderField::ModemImei => "modemIMEI",
            HeaderField::ModemImsi => "modemIMSI",
            HeaderField::Iccid => "g_stIccid.iccid_nu",
            HeaderField::PcbType => "PCB Type",
        }
    }

    /// Human-readable label for the header panel.
    pub fn label(&self) -> &'static str {
        match self {
            HeaderField::MeterId => "Meter ID",
            HeaderField::RemainingCharge => "Remaining Charge (mAh)",
            HeaderField::ModemImei => "Modem IMEI",
            HeaderField::ModemImsi => "Modem IMSI",
            HeaderField::Iccid => "ICCID",
            HeaderField::PcbType => "PCB Type",
        }
    }

    /// Regex whose first capture group is the field value.
    pub fn pattern(&self) -> &'static str {
        match self {
            HeaderField::MeterId => r"g_meterId\s*:\s*(\d+)",
            HeaderField::RemainingCharge => r"g_mAhRemain\s*:\s*(\d+)",
            HeaderField::ModemImei => r#"modemIMEI\s*:\s*"(\d+)""#,
            HeaderField::ModemImsi => r#"modemIMSI\s*:\s*"(\d+)""#,
            HeaderField::Iccid => r"g_stIccid\.iccid_nu\s*:\s*(\d+)",
            HeaderField::PcbType => r"PCB Type is ([A-Z]+ Board!)",
        }
    }

    fn index(&self) -> usize {
        match self {
            HeaderField::MeterId => 0,
            HeaderField::RemainingCharge => 1,
            HeaderField::ModemImei => 2,
            HeaderField::ModemImsi => 3,
            HeaderField::Iccid => 4,
            HeaderField::PcbType => 5,
        }
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Device identity extracted from one log. Every field starts absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderInfo {
    values: [Option<String>; 6],
}

impl HeaderInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: HeaderField) -> Option<&str> {
        self.values[field.index()].as_deref()
    }

    /// Overwrite the field; later matches replace earlier ones.
    pub fn set(&mut self, field: HeaderField, value: impl Into<String>) {
        self.values[field.index()] = Some(value.into());
    }

    pub fn iccid(&self) -> Option<&str> {
        self.get(HeaderField::Iccid)
    }

    /// `(field, value)` pairs in [`HeaderField::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (HeaderField, Option<&str>)> + '_ {
        HeaderField::ALL.iter().map(move |f| (*f, self.get(*f)))
    }

    /// Number of fields that were found.
    pub fn found_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

// ── Step timestamps ───────────────────────────────────────────────────────────

/// A single lifecycle occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepEvent {
    pub step: LifecycleStep,
    pub timestamp: NaiveTime,
}

/// Timestamps recorded per lifecycle step, keyed in catalog order.
///
/// Within a step, timestamps keep the order of the lines they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampLog {
    entries: Vec<(LifecycleStep, Vec<NaiveTime>)>,
}

impl Default for TimestampLog {
    fn default() -> Self {
        Self {
            entries: STEP_CATALOG.iter().map(|def| (def.step, Vec::new())).collect(),
        }
    }
}

impl TimestampLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `timestamp` to the list of `step`.
    pub fn record(&mut self, step: LifecycleStep, timestamp: NaiveTime) {
        if let Some((_, times)) = self.entries.iter_mut().find(|(s, _)| *s == step) {
            times.push(timestamp);
        }
    }

    pub fn timestamps(&self, step: LifecycleStep) -> &[NaiveTime] {
        self.entries
            .iter()
            .find(|(s, _)| *s == step)
            .map(|(_, times)| times.as_slice())
            .unwrap_or(&[])
    }

    /// `(step, timestamps)` pairs in catalog order, including empty steps.
    pub fn iter(&self) -> impl Iterator<Item = (LifecycleStep, &[NaiveTime])> + '_ {
        self.entries.iter().map(|(s, t)| (*s, t.as_slice()))
    }

    /// Flatten to one event per timestamp: steps in catalog order, each
    /// step's timestamps in line order.
    pub fn events(&self) -> Vec<StepEvent> {
        self.iter()
            .flat_map(|(step, times)| {
                times.iter().map(move |&timestamp| StepEvent { step, timestamp })
            })
            .collect()
    }

    /// Total number of recorded timestamps across all steps.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, t)| t.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Steps that were seen at least once, in catalog order.
    pub fn observed_steps(&self) -> Vec<LifecycleStep> {
        self.iter()
            .filter(|(_, t)| !t.is_empty())
            .map(|(s, _)| s)
            .collect()
    }

    /// Earliest and latest recorded timestamp over all steps.
    pub fn time_bounds(&self) -> Option<(NaiveTime, NaiveTime)> {
        let mut all = self.entries.iter().flat_map(|(_, t)| t.iter().copied());
        let first = all.next()?;
        Some(all.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }
}

// ── Per-file result ───────────────────────────────────────────────────────────

/// Everything extracted from one log file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogTimeline {
    pub header: HeaderInfo,
    pub steps: TimestampLog,
    /// Every timestamp found in the file, in line order, whether or not the
    /// line matched a step.
    pub timestamps: Vec<NaiveTime>,
}

impl LogTimeline {
    /// First timestamp in the file, the reference point for elapsed times.
    pub fn start(&self) -> Option<NaiveTime> {
        self.timestamps.first().copied()
    }

    /// Seconds since the file's first timestamp for every timestamp found.
    pub fn elapsed_series(&self) -> Vec<f64> {
        time_utils::elapsed_series(&self.timestamps)
    }

    /// Seconds between the file's first timestamp and `timestamp`.
    pub fn elapsed_since_start(&self, timestamp: NaiveTime) -> Option<f64> {
        self.start()
            .map(|start| time_utils::elapsed_seconds(start, timestamp))
    }

    /// Step events paired with their elapsed time, in catalog order.
    pub fn event_rows(&self) -> Vec<(StepEvent, f64)> {
        self.steps
            .events()
            .into_iter()
            .map(|ev| {
                let elapsed = self.elapsed_since_start(ev.timestamp).unwrap_or(0.0);
                (ev, elapsed)
            })
            .collect()
    }
}

// ── Batch results ─────────────────────────────────────────────────────────────

/// A step occurrence annotated with the file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedEvent {
    /// File name (no directory) of the source log.
    pub file: String,
    pub step: LifecycleStep,
    pub timestamp: NaiveTime,
}

/// Number of tagged events per step, in catalog order.
pub fn count_by_step(events: &[TaggedEvent]) -> Vec<(LifecycleStep, usize)> {
    catalog::steps()
        .map(|step| (step, events.iter().filter(|e| e.step == step).count()))
        .collect()
}
