//! CSV export of extracted timelines.

use std::path::{Path, PathBuf};

use timeline_core::error::{Result, TimelineError};
use timeline_core::formatting::{self, csv_field};
use timeline_core::models::HeaderInfo;
use tracing::info;

use crate::table_view::{BatchRow, EventRow};

/// Default CSV path for a single log: `<log dir>/<iccid>.csv`, or
/// `<log dir>/output.csv` when the ICCID is unknown.
pub fn suggest_output_path(log_path: &Path, iccid: Option<&str>) -> PathBuf {
    let dir = log_path.parent().unwrap_or_else(|| Path::new(""));
    let name = match iccid {
        Some(id) if !id.is_empty() => format!("{}.csv", id),
        _ => "output.csv".to_string(),
    };
    dir.join(name)
}

/// Header block followed by the events table.
pub fn single_csv(header: &HeaderInfo, rows: &[EventRow]) -> String {
    let mut out = String::from("Header Information:\n");
    for (field, value) in header.iter() {
        out.push_str(&format!(
            "{}: {}\n",
            field.key(),
            formatting::header_value(value)
        ));
    }
    out.push('\n');

    out.push_str("Event,Timestamp,Elapsed Time (s)\n");
    for row in rows {
        out.push_str(&format!(
            "{},{},{}\n",
            csv_field(&row.event),
            csv_field(&row.timestamp),
            formatting::format_elapsed(row.elapsed)
        ));
    }
    out
}

/// `File,Event,Timestamp` table for directory mode.
pub fn batch_csv(rows: &[BatchRow]) -> String {
    let mut out = String::from("File,Event,Timestamp\n");
    for row in rows {
        out.push_str(&format!(
            "{},{},{}\n",
            csv_field(&row.file),
            csv_field(&row.event),
            csv_field(&row.timestamp)
        ));
    }
    out
}

/// Write `contents` to `path`, creating missing parent directories.
pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    let export_err = |source| TimelineError::Export {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(export_err)?;
    }
    std::fs::write(path, contents).map_err(export_err)?;
    info!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

pub fn write_single_csv(path: &Path, header: &HeaderInfo, rows: &[EventRow]) -> Result<()> {
    write_text(path, &single_csv(header, rows))
}

pub fn write_batch_csv(path: &Path, rows: &[BatchRow]) -> Result<()> {
    write_text(path, &batch_csv(rows))
}
