use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::util::expand_tilde;

pub const DEFAULT_TOTAL_PAGES: u32 = 300;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const ENDPOINT_ENV: &str = "READQUEST_ENDPOINT";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Log store URL. Records stay in memory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// The log store does not keep book lengths, so hydrated books get this.
    #[serde(default = "default_total_pages")]
    pub default_total_pages: u32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
}

fn default_version() -> u32 {
    1
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_total_pages() -> u32 {
    DEFAULT_TOTAL_PAGES
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            endpoint: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_total_pages: DEFAULT_TOTAL_PAGES,
            log_level: default_log_level(),
            data_dir: None,
        }
    }
}

impl TrackerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }

    /// Where session logs live: `data_dir` if set, else `~/.readquest`.
    pub fn data_dir(&self) -> Option<PathBuf> {
        match self.data_dir.as_deref() {
            Some(dir) => Some(PathBuf::from(expand_tilde(dir))),
            None => default_data_dir(),
        }
    }

    pub fn logs_dir(&self) -> Option<PathBuf> {
        self.data_dir().map(|d| d.join("logs"))
    }

    /// A non-empty override replaces the configured endpoint.
    pub fn with_endpoint_override(mut self, endpoint: Option<String>) -> Self {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            self.endpoint = Some(endpoint.trim().to_string());
        }
        self
    }
}

fn default_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".readquest"))
}

pub fn config_path() -> Option<PathBuf> {
    default_data_dir().map(|d| d.join("config.json"))
}

/// Reads `path`, falling back to defaults for a missing or unreadable file.
pub fn load_config_from(path: &Path) -> TrackerConfig {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return TrackerConfig::default(),
    };
    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Ignoring malformed config {}: {e}", path.display());
            TrackerConfig::default()
        }
    }
}

/// Like [`load_config_from`], but a missing file is first written with
/// defaults so there is something to edit.
pub fn load_or_create(path: &Path) -> TrackerConfig {
    if path.exists() {
        return load_config_from(path);
    }
    let config = TrackerConfig::default();
    if let Err(e) = save_config_to(path, &config) {
        log::warn!("Could not write default config {}: {e}", path.display());
    }
    config
}

/// Loads `~/.readquest/config.json` and applies `READQUEST_ENDPOINT`.
pub fn load_config() -> TrackerConfig {
    let config = config_path()
        .map(|p| load_or_create(&p))
        .unwrap_or_default();
    config.with_endpoint_override(std::env::var(ENDPOINT_ENV).ok())
}

pub fn save_config_to(path: &Path, config: &TrackerConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}
