//! Constants and the on-disk settings file.
//!
//! Settings live in a small TOML document:
//!
//! ```toml
//! [api]
//! key = "..."
//! token = "..."
//!
//! [project]
//! board = "My Project"
//! data_dir = "/var/lib/board-trend"   # optional, defaults to "."
//! unestimated_days = 1.0               # optional
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, TrendError};

pub const API_BASE: &str = "https://api.trello.com/1";

pub const TREND_FILE: &str = "trend.dat";
pub const ESTIMATE_FILE: &str = "estimate.dat";
pub const TREND_CHART: &str = "figure";
pub const ESTIMATE_CHART: &str = "estimate";

pub const REPORT_CARD_NAME: &str = "Weekly Report";
pub const EXCLUDE_LABEL: &str = "exclude";
pub const COMPLETE_LIST: &str = "complete";
pub const REMAINING_FIELD: &str = "remaining";

pub const DEFAULT_WEEKLY_DECREMENT: i64 = 4;
/// Days assumed for a card that carries no remaining estimate.
pub const DEFAULT_UNESTIMATED_DAYS: f64 = 1.0;

pub const CHART_WIDTH: u32 = 1920;
pub const CHART_HEIGHT: u32 = 1080;
pub const MARKER_SIZE: u32 = 9;
pub const Y_MARGIN_RATIO: f64 = 0.05;

pub const KEY_ENV: &str = "TRELLO_KEY";
pub const TOKEN_ENV: &str = "TRELLO_TOKEN";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    pub project: ProjectSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiSettings {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSettings {
    pub board: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_unestimated_days")]
    pub unestimated_days: f64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_unestimated_days() -> f64 {
    DEFAULT_UNESTIMATED_DAYS
}

impl Settings {
    /// Parse settings from TOML text and validate them.
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `path`, then apply the credential environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            TrendError::InvalidArgument(format!(
                "Cannot read settings file {}: {}",
                path.display(),
                e
            ))
        })?;
        let mut settings: Settings = toml::from_str(&text)?;
        if let Ok(key) = std::env::var(KEY_ENV) {
            settings.api.key = key;
        }
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            settings.api.token = token;
        }
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.api.key.trim().is_empty() {
            return Err(TrendError::InvalidArgument(format!(
                "Missing API key: set [api] key or {}",
                KEY_ENV
            )));
        }
        if self.api.token.trim().is_empty() {
            return Err(TrendError::InvalidArgument(format!(
                "Missing API token: set [api] token or {}",
                TOKEN_ENV
            )));
        }
        if self.project.board.trim().is_empty() {
            return Err(TrendError::InvalidArgument(
                "Missing board name: set [project] board".into(),
            ));
        }
        if !self.project.unestimated_days.is_finite() || self.project.unestimated_days < 0.0 {
            return Err(TrendError::InvalidArgument(format!(
                "unestimated_days must be a non-negative number, got {}",
                self.project.unestimated_days
            )));
        }
        Ok(())
    }
}

pub fn default_config_path() -> PathBuf {
    if let Some(config) = dirs::config_dir() {
        config.join("board-trend").join("trend.toml")
    } else {
        PathBuf::from("trend.toml")
    }
}
