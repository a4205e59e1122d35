use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

// ── Log clock timestamps ──────────────────────────────────────────────────────

/// strftime layout of the bracketed firmware clock, e.g. `00:01:23.456`.
pub const LOG_TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// Parse the inside of a `[HH:MM:SS.mmm]` token into a clock time.
///
/// Surrounding brackets are tolerated. Returns `None` when the token is not a
/// valid 24-hour clock time (for example hour `25`).
pub fn parse_log_timestamp(token: &str) -> Option<NaiveTime> {
    let inner = token
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(token);

    match NaiveTime::parse_from_str(inner, LOG_TIME_FORMAT) {
        Ok(t) => Some(t),
        Err(e) => {
            debug!("Ignoring malformed log timestamp \"{}\": {}", token, e);
            None
        }
    }
}

// ── Elapsed time ──────────────────────────────────────────────────────────────

/// Seconds from `start` to `t`, negative when the log went backwards.
pub fn elapsed_seconds(start: NaiveTime, t: NaiveTime) -> f64 {
    t.signed_duration_since(start).num_milliseconds() as f64 / 1000.0
}

/// Seconds since the first entry for every entry of `times`.
///
/// The first value is always `0.0`; an empty input yields an empty series.
pub fn elapsed_series(times: &[NaiveTime]) -> Vec<f64> {
    let Some(&first) = times.first() else {
        return Vec::new();
    };
    times.iter().map(|&t| elapsed_seconds(first, t)).collect()
}

// ── Date anchoring ────────────────────────────────────────────────────────────

/// Date given to clock-only timestamps when a full date-time is needed.
/// The firmware clock carries no date, so the conventional 1900-01-01 is used.
pub fn log_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or_default()
}

/// Anchor a clock time to [`log_epoch`].
pub fn to_datetime(t: NaiveTime) -> NaiveDateTime {
    log_epoch().and_time(t)
}
