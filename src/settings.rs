use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{BookkeeperError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_large_amount_threshold")]
    pub large_amount_threshold: Decimal,
    #[serde(default = "default_outlier_fence")]
    pub outlier_fence: Option<Decimal>,
    #[serde(default)]
    pub top_categories: Option<i64>,
    #[serde(default)]
    pub skip_invalid_rows: bool,
}

fn default_large_amount_threshold() -> Decimal {
    Decimal::from(1000)
}

fn default_outlier_fence() -> Option<Decimal> {
    Some(Decimal::from(3))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            large_amount_threshold: default_large_amount_threshold(),
            outlier_fence: default_outlier_fence(),
            top_categories: None,
            skip_invalid_rows: false,
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("bookkeeper")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Settings from an explicit path, or from the default location when `path` is `None`.
///
/// A missing default file yields defaults; a missing explicit file is an error.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (settings_path(), false),
    };
    if !explicit && !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(&path).map_err(|source| BookkeeperError::Read {
        path: path.clone(),
        source,
    })?;
    parse_settings(&content)
        .map_err(|e| BookkeeperError::Settings(format!("{}: {e}", path.display())))
}

fn parse_settings(content: &str) -> std::result::Result<Settings, serde_json::Error> {
    serde_json::from_str(content)
}
