//! Loading the spreadsheet configuration from TOML.

use anyhow::{Context, Result};
use cascade_core::SpreadsheetConfig;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Default location: `<config_dir>/cascade/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "cascade")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

/// Read the config at `explicit`, or the default location if there is one.
/// A missing default file yields the defaults; a missing explicit file or
/// malformed TOML is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<SpreadsheetConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(SpreadsheetConfig::default()),
        },
    };
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config '{}'", path.display()))?;
    let config = toml::from_str::<SpreadsheetConfig>(&content)
        .with_context(|| format!("Failed to parse config '{}'", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}
