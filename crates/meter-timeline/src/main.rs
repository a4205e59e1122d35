mod bootstrap;

use anyhow::Result;
use timeline_core::settings::{LastUsedParams, Settings};
use timeline_ui::app::{App, RunOutcome};
use timeline_ui::console;

fn main() -> Result<()> {
    let (settings, last_used) = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Meter Timeline v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::debug!(
        "Suffix: {}, width: {:?}, output: {:?}",
        settings.suffix,
        settings.width,
        settings.output
    );

    let app = App::new(settings, last_used.last_path);
    let mut console = console::stdio();
    let report = app.run(&mut console)?;

    if report.outcome != RunOutcome::FileNotFound {
        LastUsedParams::remember_path(&report.input, &LastUsedParams::config_path());
    }

    match &report.outcome {
        RunOutcome::Saved { csv, plot } => {
            tracing::info!("Saved {} (plot: {:?})", csv.display(), plot)
        }
        outcome => tracing::info!("Finished without saving: {:?}", outcome),
    }

    Ok(())
}
