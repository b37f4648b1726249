use anyhow::{anyhow, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::PathBuf;

use crate::calendar::Range;

/// Overrides `[backend] base_url` when set.
pub const API_URL_ENV: &str = "COURSEBOARD_API_URL";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_base_url() -> String { "http://localhost:8000".to_owned() }
fn default_timeout()  -> u64    { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url:        String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self { base_url: default_base_url(), timeout_seconds: default_timeout() }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct DisplayConfig {
    /// IANA zone name, e.g. "America/Chicago". Unset means the system zone.
    pub timezone:      Option<String>,
    /// day | 3d | 7d | month
    pub default_range: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let path = config_dir().join("config.toml");
        let mut cfg = if path.exists() {
            Self::from_toml(&std::fs::read_to_string(&path)?)?
        } else {
            AppConfig::default()
        };
        cfg.apply_api_url_override(std::env::var(API_URL_ENV).ok());
        Ok(cfg)
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn apply_api_url_override(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.backend.base_url = url.trim().to_owned();
        }
    }

    /// Reference time zone for day bucketing and display.
    pub fn zone(&self) -> Result<Option<Tz>> {
        match self.display.timezone.as_deref() {
            None    => Ok(None),
            Some(s) => s.parse::<Tz>()
                .map(Some)
                .map_err(|e| anyhow!("invalid [display] timezone '{s}': {e}")),
        }
    }

    pub fn default_range(&self) -> Result<Range> {
        match self.display.default_range.as_deref() {
            None    => Ok(Range::default()),
            Some(s) => s.parse(),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.storage.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("courseboard")
        })
    }
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("courseboard")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = AppConfig::from_toml("").expect("parse");
        assert_eq!(cfg.backend.base_url, "http://localhost:8000");
        assert_eq!(cfg.backend.timeout_seconds, 30);
        assert!(cfg.zone().expect("zone").is_none());
        assert_eq!(cfg.default_range().expect("range"), Range::SevenDay);
    }

    #[test]
    fn reads_all_sections() {
        let cfg = AppConfig::from_toml(r#"
            [backend]
            base_url = "https://dash.example.edu"

            [display]
            timezone = "America/Chicago"
            default_range = "month"

            [storage]
            data_dir = "/tmp/cb"
        "#).expect("parse");
        assert_eq!(cfg.backend.base_url, "https://dash.example.edu");
        assert_eq!(cfg.backend.timeout_seconds, 30);
        assert_eq!(cfg.zone().expect("zone"), Some(chrono_tz::America::Chicago));
        assert_eq!(cfg.default_range().expect("range"), Range::Month);
        assert_eq!(cfg.data_dir(), PathBuf::from("/tmp/cb"));
    }

    #[test]
    fn bad_values_are_reported() {
        let cfg = AppConfig::from_toml("[display]\ntimezone = \"Mars/Olympus\"\ndefault_range = \"year\"")
            .expect("parse");
        assert!(cfg.zone().is_err());
        assert!(cfg.default_range().is_err());
        assert!(AppConfig::from_toml("[backend]\ntimeout_seconds = \"soon\"").is_err());
    }

    #[test]
    fn env_override_replaces_base_url_unless_blank() {
        let mut cfg = AppConfig::default();
        cfg.apply_api_url_override(Some("  ".into()));
        assert_eq!(cfg.backend.base_url, "http://localhost:8000");
        cfg.apply_api_url_override(Some("http://10.0.0.5:9000".into()));
        assert_eq!(cfg.backend.base_url, "http://10.0.0.5:9000");
    }
}
