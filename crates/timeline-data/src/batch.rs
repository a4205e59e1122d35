//! Directory batch mode.
//!
//! Runs the timeline extractor over every log in a flat directory and
//! flattens the per-step timestamps into file-tagged events.

use std::path::Path;

use timeline_core::error::Result;
use timeline_core::models::TaggedEvent;
use tracing::{info, warn};

use crate::reader;
use crate::timeline::TimelineExtractor;

/// Outcome of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Events of all files, grouped by file, steps in catalog order.
    pub events: Vec<TaggedEvent>,
    /// Number of files that were extracted.
    pub files_processed: usize,
    /// Files that could not be read and were skipped.
    pub files_skipped: Vec<String>,
}

/// Extract every file in `dir` whose name ends with `suffix`.
///
/// Files that fail to open are skipped with a warning. Header values are not
/// carried into the result. Fails only when `dir` is not a directory.
pub fn process_directory(
    dir: &Path,
    suffix: &str,
    extractor: &TimelineExtractor,
) -> Result<BatchResult> {
    let files = reader::find_log_files(dir, suffix)?;
    let mut result = BatchResult::default();

    for path in &files {
        info!("Processing file: {}", path.display());
        let file = reader::file_label(path);

        let timeline = match extractor.extract_file(path) {
            Ok(t) => t,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                result.files_skipped.push(file);
                continue;
            }
        };

        result.files_processed += 1;
        result
            .events
            .extend(timeline.steps.events().into_iter().map(|ev| TaggedEvent {
                file: file.clone(),
                step: ev.step,
                timestamp: ev.timestamp,
            }));
    }

    info!(
        "Batch: {} events from {} files ({} skipped)",
        result.events.len(),
        result.files_processed,
        result.files_skipped.len()
    );
    Ok(result)
}
