//! Interactive session for Meter Timeline.
//!
//! [`App`] asks for a log file or directory, prints the extracted timeline
//! and walks the user through saving it as CSV (plus an SVG plot for single
//! files). All interaction goes through a [`Console`].

use std::path::{Path, PathBuf};

use timeline_core::error::{Result, TimelineError};
use timeline_core::models::count_by_step;
use timeline_core::settings::Settings;
use timeline_data::batch;
use timeline_data::timeline::TimelineExtractor;
use tracing::{debug, info};

use crate::console::Console;
use crate::export;
use crate::plot;
use crate::table_view::{self, BatchRow, EventRow};

const INPUT_PROMPT: &str = "Please enter the full path to your log file or directory: ";
const SAVE_PROMPT: &str =
    "\nDo you want to save the extracted timestamps to a CSV file? (yes/no): ";
const BATCH_OUTPUT_PROMPT: &str =
    "Enter the full path and filename for the output CSV (e.g., /path/to/output.csv): ";

// ── Outcome ───────────────────────────────────────────────────────────────────

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The single log file does not exist.
    FileNotFound,
    /// Directory mode found no events at all.
    NoEvents,
    /// Results were shown but not written.
    NotSaved,
    /// Results were written to `csv`, with the plot at `plot` if one was made.
    Saved { csv: PathBuf, plot: Option<PathBuf> },
}

/// Input path of a session together with its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub input: PathBuf,
    pub outcome: RunOutcome,
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    settings: Settings,
    extractor: TimelineExtractor,
    width: u16,
    last_path: Option<PathBuf>,
}

impl App {
    /// `last_path` is offered as the default answer to the input prompt.
    pub fn new(settings: Settings, last_path: Option<PathBuf>) -> Self {
        let width = settings.width.unwrap_or_else(table_view::terminal_width);
        Self {
            settings,
            extractor: TimelineExtractor::new(),
            width,
            last_path,
        }
    }

    /// Run one session: resolve the input, then dispatch to directory or
    /// single-file mode.
    pub fn run<C: Console>(&self, console: &mut C) -> Result<SessionReport> {
        let input = self.input_path(console)?;
        let outcome = if input.is_dir() {
            info!("Directory mode: {}", input.display());
            self.run_batch(&input, console)?
        } else {
            info!("Single file mode: {}", input.display());
            self.run_single(&input, console)?
        };
        debug!("Session finished: {:?}", outcome);
        Ok(SessionReport { input, outcome })
    }

    fn input_path<C: Console>(&self, console: &mut C) -> Result<PathBuf> {
        if let Some(path) = &self.settings.path {
            return Ok(path.clone());
        }

        let answer = match &self.last_path {
            Some(last) => {
                let last = last.display().to_string();
                console.prompt_with_default(
                    &format!("{}[{}] ", INPUT_PROMPT, last),
                    &last,
                )?
            }
            None => console.prompt(INPUT_PROMPT)?,
        };

        if answer.is_empty() {
            return Err(TimelineError::Config("no log path given".to_string()));
        }
        Ok(PathBuf::from(answer))
    }

    /// `--no-save` and `--yes` answer the save question without asking.
    fn wants_save<C: Console>(&self, console: &mut C) -> Result<bool> {
        if self.settings.no_save {
            return Ok(false);
        }
        if self.settings.yes {
            return Ok(true);
        }
        console.confirm(SAVE_PROMPT)
    }

    // ── Single file ───────────────────────────────────────────────────────────

    fn run_single<C: Console>(&self, path: &Path, console: &mut C) -> Result<RunOutcome> {
        let timeline = match self.extractor.extract_file(path) {
            Ok(t) => t,
            Err(e) if e.is_not_found() => {
                console.print(&format!("Error: {}", e))?;
                return Ok(RunOutcome::FileNotFound);
            }
            Err(e) => return Err(e),
        };

        let rows = EventRow::from_timeline(&timeline);
        console.print("\nExtracted Timestamps:")?;
        console.print(&table_view::render_single_report(
            &timeline.header,
            &rows,
            self.width,
        ))?;

        let suggested = export::suggest_output_path(path, timeline.header.iccid());
        console.print(&format!("Suggested output file path: {}", suggested.display()))?;

        if !self.wants_save(console)? {
            console.print("Timestamps not saved.")?;
            return Ok(RunOutcome::NotSaved);
        }

        let csv = match &self.settings.output {
            Some(out) => out.clone(),
            None => {
                let suggested = suggested.display().to_string();
                PathBuf::from(console.prompt_with_default(
                    &format!(
                        "Enter the full path and filename for the output CSV (press Enter to use suggested: {}): ",
                        suggested
                    ),
                    &suggested,
                )?)
            }
        };

        if let Err(e) = export::write_single_csv(&csv, &timeline.header, &rows) {
            console.print(&format!("Error: {}", e))?;
            return Ok(RunOutcome::NotSaved);
        }
        console.print(&format!("Timestamps saved to {}", csv.display()))?;

        let plot = if self.settings.no_plot {
            None
        } else {
            match plot::save_timeline_plot(&csv, &timeline.steps) {
                Ok(p) => {
                    console.print(&format!("Plot saved to {}", p.display()))?;
                    Some(p)
                }
                Err(e) => {
                    console.print(&format!("Error: {}", e))?;
                    None
                }
            }
        };

        Ok(RunOutcome::Saved { csv, plot })
    }

    // ── Directory ─────────────────────────────────────────────────────────────

    fn run_batch<C: Console>(&self, dir: &Path, console: &mut C) -> Result<RunOutcome> {
        let suffix = self.settings.normalized_suffix();
        let result = batch::process_directory(dir, &suffix, &self.extractor)?;

        if result.events.is_empty() {
            console.print(&format!(
                "No lifecycle events found in {} files in {}.",
                suffix,
                dir.display()
            ))?;
            return Ok(RunOutcome::NoEvents);
        }

        let rows = BatchRow::from_events(&result.events);
        console.print("\nExtracted Timestamps from Directory:")?;
        console.print(&table_view::render_batch_report(&rows, self.width))?;
        console.print(&format!(
            "Events per step across {} files:",
            result.files_processed
        ))?;
        for (step, count) in count_by_step(&result.events) {
            if count > 0 {
                console.print(&format!("  {}: {}", step, count))?;
            }
        }

        if !self.wants_save(console)? {
            console.print("Timestamps not saved.")?;
            return Ok(RunOutcome::NotSaved);
        }

        let csv = match &self.settings.output {
            Some(out) => out.clone(),
            None => {
                let answer = console.prompt(BATCH_OUTPUT_PROMPT)?;
                if answer.is_empty() {
                    console.print("Timestamps not saved.")?;
                    return Ok(RunOutcome::NotSaved);
                }
                PathBuf::from(answer)
            }
        };

        if let Err(e) = export::write_batch_csv(&csv, &rows) {
            console.print(&format!("Error: {}", e))?;
            return Ok(RunOutcome::NotSaved);
        }
        console.print(&format!("Timestamps saved to {}", csv.display()))?;
        Ok(RunOutcome::Saved { csv, plot: None })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
