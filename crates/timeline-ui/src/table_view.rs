//! Event tables for the console.
//!
//! Tables are built from [`ratatui`] widgets and rendered into an off-screen
//! [`Buffer`], which is then printed as plain text. This keeps the output
//! usable between interactive prompts and when stdout is redirected.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};
use unicode_width::UnicodeWidthStr;

use timeline_core::formatting;
use timeline_core::models::{HeaderInfo, LogTimeline, TaggedEvent};

/// Fallback width when the terminal size is unknown.
pub const DEFAULT_WIDTH: u16 = 100;

/// Width of the attached terminal, or [`DEFAULT_WIDTH`].
pub fn terminal_width() -> u16 {
    crossterm::terminal::size()
        .map(|(w, _)| w)
        .unwrap_or(DEFAULT_WIDTH)
        .clamp(40, 400)
}

// ── Row data ──────────────────────────────────────────────────────────────────

/// One line of the single-file events table.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub event: String,
    /// Clock time, `HH:MM:SS`.
    pub timestamp: String,
    /// Seconds since the file's first timestamp.
    pub elapsed: f64,
}

impl EventRow {
    /// Rows for every step event, steps in catalog order.
    pub fn from_timeline(timeline: &LogTimeline) -> Vec<EventRow> {
        timeline
            .event_rows()
            .into_iter()
            .map(|(ev, elapsed)| EventRow {
                event: ev.step.label().to_string(),
                timestamp: formatting::format_clock(ev.timestamp),
                elapsed,
            })
            .collect()
    }
}

/// One line of the batch table.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRow {
    pub file: String,
    pub event: String,
    /// Full date-time, `1900-01-01 HH:MM:SS.mmm`.
    pub timestamp: String,
}

impl BatchRow {
    pub fn from_events(events: &[TaggedEvent]) -> Vec<BatchRow> {
        events
            .iter()
            .map(|e| BatchRow {
                file: e.file.clone(),
                event: e.step.label().to_string(),
                timestamp: formatting::format_datetime(e.timestamp),
            })
            .collect()
    }
}

// ── Widgets ───────────────────────────────────────────────────────────────────

fn header_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

/// Display width of the widest of `header` and `values`.
fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> u16 {
    values
        .map(UnicodeWidthStr::width)
        .chain(std::iter::once(header.width()))
        .max()
        .unwrap_or(0) as u16
}

/// Bordered two-column panel listing the device identity fields.
pub fn header_panel(header: &HeaderInfo) -> Paragraph<'static> {
    let label_width = header
        .iter()
        .map(|(f, _)| f.label().width())
        .max()
        .unwrap_or(0);

    let lines: Vec<Line> = header
        .iter()
        .map(|(field, value)| {
            let value = match value {
                Some(v) => Span::raw(v.to_string()),
                None => Span::styled("not found", Style::default().add_modifier(Modifier::DIM)),
            };
            Line::from(vec![
                Span::styled(
                    format!("{:<width$}  ", field.label(), width = label_width),
                    header_style(),
                ),
                value,
            ])
        })
        .collect();

    Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Header Information "),
    )
}

/// `Event | Timestamp | Elapsed Time (s)` table.
pub fn events_table(rows: &[EventRow]) -> Table<'static> {
    let elapsed: Vec<String> = rows
        .iter()
        .map(|r| formatting::format_elapsed(r.elapsed))
        .collect();

    let widths = [
        Constraint::Length(column_width("Event", rows.iter().map(|r| r.event.as_str()))),
        Constraint::Length(column_width(
            "Timestamp",
            rows.iter().map(|r| r.timestamp.as_str()),
        )),
        Constraint::Length(column_width(
            "Elapsed Time (s)",
            elapsed.iter().map(String::as_str),
        )),
    ];

    let header = Row::new(["Event", "Timestamp", "Elapsed Time (s)"]).style(header_style());

    let body: Vec<Row> = rows
        .iter()
        .zip(elapsed)
        .map(|(row, elapsed)| {
            Row::new(vec![
                Cell::from(row.event.clone()),
                Cell::from(row.timestamp.clone()),
                Cell::from(Line::from(elapsed).right_aligned()),
            ])
        })
        .collect();

    Table::new(body, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Extracted Timestamps "),
    )
}

/// `File | Event | Timestamp` table for directory mode.
pub fn batch_table(rows: &[BatchRow]) -> Table<'static> {
    let widths = [
        Constraint::Length(column_width("File", rows.iter().map(|r| r.file.as_str()))),
        Constraint::Length(column_width("Event", rows.iter().map(|r| r.event.as_str()))),
        Constraint::Length(column_width(
            "Timestamp",
            rows.iter().map(|r| r.timestamp.as_str()),
        )),
    ];

    let header = Row::new(["File", "Event", "Timestamp"]).style(header_style());

    let body: Vec<Row> = rows
        .iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(row.file.clone()),
                Cell::from(row.event.clone()),
                Cell::from(row.timestamp.clone()),
            ])
        })
        .collect();

    Table::new(body, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Extracted Timestamps from Directory "),
    )
}

/// Placeholder shown when a log yields no step events.
pub fn no_events(message: &str) -> Paragraph<'static> {
    Paragraph::new(Line::from(message.to_string()))
        .block(Block::default().borders(Borders::ALL).title(" Meter Timeline "))
}

// ── Text rendering ────────────────────────────────────────────────────────────

/// Render `widget` into a `width` × `height` buffer and return its text,
/// one line per buffer row with trailing blanks removed.
pub fn render_to_text<W: Widget>(widget: W, width: u16, height: u16) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    widget.render(area, &mut buf);
    buffer_text(&buf)
}

fn buffer_text(buf: &Buffer) -> String {
    let area = buf.area;
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        let mut line = String::new();
        for x in area.left()..area.right() {
            line.push_str(buf[(x, y)].symbol());
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Header panel followed by the events table, sized for `width` columns.
pub fn render_single_report(header: &HeaderInfo, rows: &[EventRow], width: u16) -> String {
    let mut out = render_to_text(header_panel(header), width, 6 + 2);
    if rows.is_empty() {
        out.push_str(&render_to_text(
            no_events("No lifecycle events found in this log."),
            width,
            3,
        ));
    } else {
        out.push_str(&render_to_text(events_table(rows), width, table_height(rows.len())));
    }
    out
}

/// Batch table sized for `width` columns.
pub fn render_batch_report(rows: &[BatchRow], width: u16) -> String {
    if rows.is_empty() {
        return render_to_text(no_events("No lifecycle events found."), width, 3);
    }
    render_to_text(batch_table(rows), width, table_height(rows.len()))
}

/// Buffer height for a bordered table with a header row, capped at
/// `u16::MAX` rows.
fn table_height(rows: usize) -> u16 {
    u16::try_from(rows).unwrap_or(u16::MAX).saturating_add(3)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
