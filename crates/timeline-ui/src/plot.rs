//! Event timeline scatter plot, written as SVG.
//!
//! One marker per (step, timestamp): x is the clock time, y the step label.
//! Steps are listed top to bottom in catalog order; only steps that occurred
//! get a row.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, NaiveTime};
use timeline_core::catalog::LifecycleStep;
use timeline_core::error::Result;
use timeline_core::formatting::{self, xml_escape};
use timeline_core::models::TimestampLog;
use timeline_core::time_utils;

use crate::export;

/// Marker colours, one per catalog step.
const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 600.0;
const MARGIN_LEFT: f64 = 280.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 110.0;
const X_TICKS: usize = 6;

/// Plot file that accompanies `csv_path`: same stem, `.svg` extension.
pub fn plot_path_for(csv_path: &Path) -> PathBuf {
    csv_path.with_extension("svg")
}

/// Horizontal time scale. Zero-width ranges are widened by a second on
/// each side so a single event lands in the middle.
///
/// Works on anchored date-times so the widening never wraps at midnight.
struct TimeAxis {
    start: NaiveDateTime,
    span: f64,
}

impl TimeAxis {
    fn new(lo: NaiveTime, hi: NaiveTime) -> Self {
        let span = time_utils::elapsed_seconds(lo, hi);
        let lo = time_utils::to_datetime(lo);
        if span <= 0.0 {
            let start = lo - chrono::Duration::seconds(1);
            Self { start, span: 2.0 }
        } else {
            Self { start: lo, span }
        }
    }

    fn x(&self, t: NaiveTime) -> f64 {
        self.x_at(time_utils::to_datetime(t))
    }

    fn x_at(&self, at: NaiveDateTime) -> f64 {
        let frac = (at - self.start).num_milliseconds() as f64 / 1000.0 / self.span;
        MARGIN_LEFT + frac * (WIDTH - MARGIN_LEFT - MARGIN_RIGHT)
    }

    fn ticks(&self) -> Vec<NaiveDateTime> {
        (0..X_TICKS)
            .map(|i| {
                let offset_ms = (self.span * 1000.0 * i as f64 / (X_TICKS - 1) as f64) as i64;
                self.start + chrono::Duration::milliseconds(offset_ms)
            })
            .collect()
    }
}

fn row_y(index: usize, rows: usize) -> f64 {
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    MARGIN_TOP + plot_h * (index as f64 + 0.5) / rows as f64
}

fn color_for(step: LifecycleStep) -> &'static str {
    PALETTE[step.ordinal() % PALETTE.len()]
}

/// Boxed legend in the top-right corner of the plot area.
fn write_legend(svg: &mut String, observed: &[LifecycleStep]) {
    const ROW: f64 = 16.0;
    const BOX_W: f64 = 240.0;
    let x = WIDTH - MARGIN_RIGHT - BOX_W - 8.0;
    let y = MARGIN_TOP + 8.0;

    let _ = writeln!(
        svg,
        r##"<rect x="{x}" y="{y}" width="{BOX_W}" height="{h}" fill="white" fill-opacity="0.8" stroke="#999999"/>"##,
        h = ROW * observed.len() as f64 + 8.0
    );
    for (i, step) in observed.iter().enumerate() {
        let cy = y + 4.0 + ROW * (i as f64 + 0.5);
        let _ = writeln!(
            svg,
            r#"<circle cx="{cx}" cy="{cy:.1}" r="4" fill="{fill}"/><text x="{tx}" y="{cy:.1}" dominant-baseline="middle">{label}</text>"#,
            cx = x + 12.0,
            fill = color_for(*step),
            tx = x + 24.0,
            label = xml_escape(step.label())
        );
    }
}

/// Render the timeline of `steps` as an SVG document.
pub fn render_timeline_svg(steps: &TimestampLog) -> String {
    let mut svg = String::new();
    let plot_right = WIDTH - MARGIN_RIGHT;
    let plot_bottom = HEIGHT - MARGIN_BOTTOM;

    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="12">"#,
        w = WIDTH,
        h = HEIGHT
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="30" text-anchor="middle" font-size="16">Event Timeline</text>"#,
        (MARGIN_LEFT + plot_right) / 2.0
    );

    let observed = steps.observed_steps();
    match steps.time_bounds() {
        Some((lo, hi)) if !observed.is_empty() => {
            let axis = TimeAxis::new(lo, hi);

            for tick in axis.ticks() {
                let x = axis.x_at(tick);
                let _ = writeln!(
                    svg,
                    r##"<line x1="{x:.1}" y1="{MARGIN_TOP}" x2="{x:.1}" y2="{plot_bottom}" stroke="#dddddd"/>"##
                );
                let _ = writeln!(
                    svg,
                    r#"<text x="{x:.1}" y="{y:.1}" text-anchor="end" transform="rotate(-45 {x:.1} {y:.1})">{label}</text>"#,
                    y = plot_bottom + 16.0,
                    label = formatting::format_clock(tick.time())
                );
            }

            for (i, step) in observed.iter().enumerate() {
                let y = row_y(i, observed.len());
                let _ = writeln!(
                    svg,
                    r##"<line x1="{MARGIN_LEFT}" y1="{y:.1}" x2="{plot_right}" y2="{y:.1}" stroke="#dddddd"/>"##
                );
                let _ = writeln!(
                    svg,
                    r#"<text x="{x}" y="{y:.1}" text-anchor="end" dominant-baseline="middle">{label}</text>"#,
                    x = MARGIN_LEFT - 8.0,
                    label = xml_escape(step.label())
                );
                for &t in steps.timestamps(*step) {
                    let _ = writeln!(
                        svg,
                        r#"<circle cx="{cx:.1}" cy="{y:.1}" r="5" fill="{fill}"><title>{title}</title></circle>"#,
                        cx = axis.x(t),
                        fill = color_for(*step),
                        title = xml_escape(&format!(
                            "{} @ {}",
                            step.label(),
                            formatting::format_log_time(t)
                        ))
                    );
                }
            }
            write_legend(&mut svg, &observed);
        }
        _ => {
            let _ = writeln!(
                svg,
                r#"<text x="{}" y="{}" text-anchor="middle">No lifecycle events</text>"#,
                (MARGIN_LEFT + plot_right) / 2.0,
                (MARGIN_TOP + plot_bottom) / 2.0
            );
        }
    }

    // Axes frame and labels.
    let _ = writeln!(
        svg,
        r#"<rect x="{MARGIN_LEFT}" y="{MARGIN_TOP}" width="{}" height="{}" fill="none" stroke="black"/>"#,
        plot_right - MARGIN_LEFT,
        plot_bottom - MARGIN_TOP
    );
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle" font-size="14">Time</text>"#,
        (MARGIN_LEFT + plot_right) / 2.0,
        HEIGHT - 12.0
    );
    let _ = writeln!(
        svg,
        r#"<text x="16" y="{y}" text-anchor="middle" font-size="14" transform="rotate(-90 16 {y})">Event</text>"#,
        y = (MARGIN_TOP + plot_bottom) / 2.0
    );
    svg.push_str("</svg>\n");
    svg
}

/// Write the timeline plot next to `csv_path` and return its path.
pub fn save_timeline_plot(csv_path: &Path, steps: &TimestampLog) -> Result<PathBuf> {
    let path = plot_path_for(csv_path);
    export::write_text(&path, &render_timeline_svg(steps))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn t(h: u32, m: u32, s: u32, ms: u32) -> NaiveTime {
        NaiveTime::from_hms_milli_opt(h, m, s, ms).unwrap()
    }

    fn sample_steps() -> TimestampLog {
        let mut steps = TimestampLog::new();
        steps.record(LifecycleStep::MeterWakesUp, t(0, 0, 0, 0));
        steps.record(LifecycleStep::SendsTelemetry, t(0, 0, 5, 0));
        steps.record(LifecycleStep::SendsTelemetry, t(0, 0, 7, 0));
        steps.record(LifecycleStep::DeepSleep, t(0, 0, 10, 0));
        steps
    }

    #[test]
    fn test_plot_path_for() {
        assert_eq!(
            plot_path_for(Path::new("/out/8944.csv")),
            PathBuf::from("/out/8944.svg")
        );
    }

    #[test]
    fn test_svg_has_one_marker_per_event() {
        let svg = render_timeline_svg(&sample_steps());
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches(r#"r="5""#).count(), 4);
        assert!(svg.contains(r#"r="4""#), "legend swatches");
        assert!(svg.contains("Event Timeline"));
        assert!(svg.contains(">Time<"));
        assert!(svg.contains(">Event<"));
    }

    #[test]
    fn test_svg_labels_only_observed_steps() {
        let svg = render_timeline_svg(&sample_steps());
        assert!(svg.contains(">Send Telemetry Data<"));
        assert!(!svg.contains(">Authenticates to Server<"));
    }

    #[test]
    fn test_svg_rows_follow_catalog_order() {
        let svg = render_timeline_svg(&sample_steps());
        let wake = svg.find(">Meter Wakes up<").unwrap();
        let telemetry = svg.find(">Send Telemetry Data<").unwrap();
        let sleep = svg.find(">Deep Sleep<").unwrap();
        assert!(wake < telemetry && telemetry < sleep);
    }

    #[test]
    fn test_axis_endpoints() {
        let axis = TimeAxis::new(t(0, 0, 0, 0), t(0, 0, 10, 0));
        assert!((axis.x(t(0, 0, 0, 0)) - MARGIN_LEFT).abs() < 1e-9);
        assert!((axis.x(t(0, 0, 10, 0)) - (WIDTH - MARGIN_RIGHT)).abs() < 1e-9);
        let ticks = axis.ticks();
        assert_eq!(ticks.len(), X_TICKS);
        assert_eq!(ticks[0].time(), t(0, 0, 0, 0));
        assert_eq!(ticks[X_TICKS - 1].time(), t(0, 0, 10, 0));
    }

    #[test]
    fn test_single_event_is_centered() {
        let axis = TimeAxis::new(t(0, 0, 5, 0), t(0, 0, 5, 0));
        let mid = (MARGIN_LEFT + WIDTH - MARGIN_RIGHT) / 2.0;
        assert!((axis.x(t(0, 0, 5, 0)) - mid).abs() < 1e-9);
    }

    #[test]
    fn test_single_event_at_midnight_stays_on_canvas() {
        let midnight = t(0, 0, 0, 0);
        let axis = TimeAxis::new(midnight, midnight);
        let mid = (MARGIN_LEFT + WIDTH - MARGIN_RIGHT) / 2.0;
        assert!((axis.x(midnight) - mid).abs() < 1e-9);

        let ticks = axis.ticks();
        assert_eq!(formatting::format_clock(ticks[0].time()), "23:59:59");
        assert_eq!(formatting::format_clock(ticks[X_TICKS - 1].time()), "00:00:01");
        for tick in &ticks {
            let x = axis.x_at(*tick);
            assert!((MARGIN_LEFT..=WIDTH - MARGIN_RIGHT).contains(&x));
        }
    }

    #[test]
    fn test_svg_legend_lists_observed_steps() {
        let svg = render_timeline_svg(&sample_steps());
        assert_eq!(svg.matches(r#"r="4""#).count(), 3);
        assert_eq!(svg.matches(">Send Telemetry Data<").count(), 2);
    }

    #[test]
    fn test_svg_empty_timeline() {
        let svg = render_timeline_svg(&TimestampLog::new());
        assert!(svg.contains("No lifecycle events"));
        assert_eq!(svg.matches("<circle").count(), 0);
    }

    #[test]
    fn test_save_timeline_plot() {
        let tmp = TempDir::new().unwrap();
        let csv = tmp.path().join("meter.csv");
        let path = save_timeline_plot(&csv, &sample_steps()).unwrap();
        assert_eq!(path, tmp.path().join("meter.svg"));
        assert!(std::fs::read_to_string(path).unwrap().contains("<circle"));
    }
}
