use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Extract lifecycle timelines from cellular meter logs
#[derive(Parser, Debug, Clone)]
#[command(
    name = "meter-timeline",
    about = "Extract lifecycle timelines from cellular meter logs",
    version
)]
pub struct Settings {
    /// Log file or directory of logs (prompted for when omitted)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Output CSV path (skips the output path prompt)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Save results without asking
    #[arg(short, long, conflicts_with = "no_save")]
    pub yes: bool,

    /// Never save results
    #[arg(long)]
    pub no_save: bool,

    /// Do not write the timeline plot next to the CSV
    #[arg(long)]
    pub no_plot: bool,

    /// File suffix selected in directory mode
    #[arg(long, default_value = ".txt")]
    pub suffix: String,

    /// Table width in columns (defaults to the terminal width)
    #[arg(long, value_parser = clap::value_parser!(u16).range(40..=400))]
    pub width: Option<u16>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.meter-timeline/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u16>,
}

impl LastUsedParams {
    /// Default path of the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".meter-timeline").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to `path`, creating parent directories.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at `path` if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Record the input path chosen in this run.
    pub fn remember_path(path: &std::path::Path, config_path: &std::path::Path) {
        let mut params = Self::load_from(config_path);
        params.last_path = Some(path.to_path_buf());
        if let Err(e) = params.save_to(config_path) {
            tracing::debug!("Could not persist last-used path: {}", e);
        }
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and merge last-used params.
    pub fn load_with_last_used() -> (Self, LastUsedParams) {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Parse `args`, fill options not given on the command line from the
    /// params stored at `config_path`, and persist the merged result.
    ///
    /// Returns the settings together with the params that were loaded, so the
    /// caller can offer the previous input path as a prompt default.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> (Self, LastUsedParams) {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return (Self::apply_debug(settings), LastUsedParams::default());
        }

        let last = LastUsedParams::load_from(config_path);

        if !is_arg_explicitly_set(&matches, "suffix") {
            if let Some(v) = last.suffix.clone() {
                settings.suffix = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "width") && settings.width.is_none() {
            settings.width = last.width;
        }

        settings = Self::apply_debug(settings);

        let mut params = LastUsedParams::from(&settings);
        params.last_path = settings.path.clone().or_else(|| last.last_path.clone());
        let _ = params.save_to(config_path);

        (settings, last)
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Suffix normalised to start with a dot, e.g. `"txt"` → `".txt"`.
    pub fn normalized_suffix(&self) -> String {
        if self.suffix.starts_with('.') {
            self.suffix.clone()
        } else {
            format!(".{}", self.suffix)
        }
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            last_path: s.path.clone(),
            suffix: Some(s.suffix.clone()),
            width: s.width,
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
