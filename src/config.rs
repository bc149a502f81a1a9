//!
//! # Client configuration
//!
//! Where the cleaning/prediction service lives and how the HTTP client talks to it.
//! Values come from defaults, a JSON file, or environment variables.
//!
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Service address used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

pub const ENV_BASE_URL: &str = "CLEANER_API_BASE";
pub const ENV_TIMEOUT_SECS: &str = "CLEANER_TIMEOUT_SECS";

/// Where a [`ClientConfig`] was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// In-memory defaults
    Default,
    /// JSON file
    File,
    /// Environment variables
    Environment,
}

/// HTTP client settings for the cleaning/prediction service.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL without a trailing slash, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: format!("sandeul-cleaner/{}", crate::VERSION),
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at `base_url`, everything else defaulted.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.set_base_url(base_url);
        config
    }

    /// Loads a JSON configuration file. Missing fields keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let mut config: ClientConfig = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.as_ref().display(), e)))?;
        let base_url = std::mem::take(&mut config.base_url);
        config.set_base_url(base_url);
        Ok(config)
    }

    /// Reads `CLEANER_API_BASE` and `CLEANER_TIMEOUT_SECS` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] but with an injectable variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_BASE_URL) {
            config.set_base_url(value);
        }

        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            if let Ok(secs) = value.trim().parse::<u64>() {
                config.timeout_secs = secs;
            }
        }

        config
    }

    /// Sets the base URL, trimming whitespace and one trailing slash.
    /// An empty value falls back to [`DEFAULT_BASE_URL`].
    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        let raw = base_url.into();
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        self.base_url = if trimmed.is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            trimmed.to_string()
        };
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Joins `path` onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_to_local_service() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.url("/clean"), "http://localhost:8000/clean");
    }

    #[test]
    fn lookup_overrides_and_trims_trailing_slash() {
        let vars: HashMap<&str, &str> = [
            (ENV_BASE_URL, "https://cleaner.example.org/"),
            (ENV_TIMEOUT_SECS, "5"),
        ]
        .into_iter()
        .collect();
        let config = ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.base_url, "https://cleaner.example.org");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn empty_base_url_and_bad_timeout_are_ignored() {
        let config = ClientConfig::from_lookup(|k| match k {
            ENV_BASE_URL => Some("   ".to_string()),
            ENV_TIMEOUT_SECS => Some("soon".to_string()),
            _ => None,
        });
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn file_with_partial_fields_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "base_url": "http://10.0.0.7:9000/" }}"#).unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base_url, "http://10.0.0.7:9000");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "base_url = nope").unwrap();

        let err = ClientConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
