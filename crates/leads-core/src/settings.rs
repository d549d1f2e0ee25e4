use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Lead and contract dashboard reports from CSV exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "leads-dashboard",
    about = "Lead and contract dashboard reports from CSV exports",
    version
)]
pub struct Settings {
    /// Event-level CSV (one row per lead event)
    #[arg(long, default_value = "master_data.csv")]
    pub master_data: PathBuf,

    /// Contracts CSV
    #[arg(long, default_value = "qualified_contracts.csv")]
    pub contracts: PathBuf,

    /// View to print
    #[arg(long, default_value = "daily", value_parser = ["raw", "daily", "pipeline", "contracts", "companies", "series"])]
    pub view: String,

    /// First day to include (inclusive)
    #[arg(long)]
    pub start: Option<String>,

    /// Last day to include (inclusive)
    #[arg(long)]
    pub end: Option<String>,

    /// Comma-separated metrics charted by the series view (default: all charted metrics)
    #[arg(long)]
    pub metric: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", value_parser = ["table", "json", "csv"])]
    pub format: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.leads-dashboard/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_data: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contracts: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl LastUsedParams {
    /// Default location: `~/.leads-dashboard/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".leads-dashboard").join("last_used.json")
    }

    /// Load persisted params; `Default` when the file is absent or unreadable.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!("Ignoring unreadable {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Atomically write params to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
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
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments, merge last-used params for flags not given
    /// on the command line, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] with explicit arguments and
    /// config path.
    pub fn load_with_last_used_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!("Failed to clear {}: {}", config_path.display(), e);
            }
            return settings;
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins. Date bounds are per-run and never persisted.
        if !is_arg_explicitly_set(&matches, "master_data") {
            if let Some(v) = last.master_data {
                settings.master_data = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "contracts") {
            if let Some(v) = last.contracts {
                settings.contracts = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format {
                settings.format = v;
            }
        }

        if let Err(e) = LastUsedParams::from(&settings).save_to(config_path) {
            tracing::debug!("Could not persist {}: {}", config_path.display(), e);
        }

        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            master_data: Some(s.master_data.clone()),
            contracts: Some(s.contracts.clone()),
            view: Some(s.view.clone()),
            format: Some(s.format.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
