use chrono::NaiveTime;

use crate::time_utils;

/// Format a clock time as shown in the events table, e.g. `"00:01:23"`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use timeline_core::formatting::format_clock;
///
/// let t = NaiveTime::from_hms_milli_opt(0, 1, 23, 456).unwrap();
/// assert_eq!(format_clock(t), "00:01:23");
/// ```
pub fn format_clock(t: NaiveTime) -> String {
    t.format("%H:%M:%S").to_string()
}

/// Format a clock time with milliseconds, the way the firmware prints it.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use timeline_core::formatting::format_log_time;
///
/// let t = NaiveTime::from_hms_milli_opt(13, 5, 9, 7).unwrap();
/// assert_eq!(format_log_time(t), "13:05:09.007");
/// ```
pub fn format_log_time(t: NaiveTime) -> String {
    t.format(time_utils::LOG_TIME_FORMAT).to_string()
}

/// Format a clock time as a full date-time anchored to 1900-01-01.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use timeline_core::formatting::format_datetime;
///
/// let t = NaiveTime::from_hms_milli_opt(0, 1, 23, 456).unwrap();
/// assert_eq!(format_datetime(t), "1900-01-01 00:01:23.456");
/// ```
pub fn format_datetime(t: NaiveTime) -> String {
    time_utils::to_datetime(t)
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string()
}

/// Format elapsed seconds with millisecond resolution.
///
/// # Examples
///
/// ```
/// use timeline_core::formatting::format_elapsed;
///
/// assert_eq!(format_elapsed(0.0), "0.000");
/// assert_eq!(format_elapsed(12.5), "12.500");
/// assert_eq!(format_elapsed(-3.25), "-3.250");
/// ```
pub fn format_elapsed(seconds: f64) -> String {
    format!("{:.3}", seconds)
}

/// Quote a value for a comma-separated file when it contains a delimiter,
/// a quote or a line break. Embedded quotes are doubled.
///
/// # Examples
///
/// ```
/// use timeline_core::formatting::csv_field;
///
/// assert_eq!(csv_field("Deep Sleep"), "Deep Sleep");
/// assert_eq!(csv_field("a,b"), "\"a,b\"");
/// assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
/// ```
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Escape text for use inside SVG/XML character data and attributes.
///
/// # Examples
///
/// ```
/// use timeline_core::formatting::xml_escape;
///
/// assert_eq!(xml_escape("A & <B>"), "A &amp; &lt;B&gt;");
/// ```
pub fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Render an optional header value; absent values become an empty string.
pub fn header_value(value: Option<&str>) -> &str {
    value.unwrap_or("")
}
