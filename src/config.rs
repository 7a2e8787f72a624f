// Analyzer connection settings
// Resolution order: CLI flags > environment > config file > defaults

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const URL_ENV: &str = "PARSESCOPE_URL";
pub const TIMEOUT_ENV: &str = "PARSESCOPE_TIMEOUT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine a configuration directory")]
    NoConfigDir,
    #[error("Invalid configuration file {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AnalyzerConfig {
    /// Get the config file path
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|dir| dir.join("parsescope").join("config.json"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(URL_ENV) {
            self.base_url = url;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            self.timeout_secs = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: TIMEOUT_ENV,
                value: raw.clone(),
            })?;
        }
        Ok(self)
    }

    pub fn with_overrides(mut self, url: Option<String>, timeout_secs: Option<u64>) -> Self {
        if let Some(url) = url {
            self.base_url = url;
        }
        if let Some(timeout) = timeout_secs {
            self.timeout_secs = timeout;
        }
        self
    }

    /// Defaults, then config file, then environment.
    pub fn resolve() -> Result<Self, ConfigError> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)?.with_env(|name| std::env::var(name).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AnalyzerConfig::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = AnalyzerConfig {
            base_url: "http://analyzer:9000".to_string(),
            timeout_secs: 3,
        };
        config.save_to(&path).unwrap();
        assert_eq!(AnalyzerConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AnalyzerConfig::load_from(&path),
            Err(ConfigError::Malformed { .. })
        ));
    }

    #[test]
    fn test_precedence() {
        let env: HashMap<&str, &str> =
            [(URL_ENV, "http://from-env:1"), (TIMEOUT_ENV, "7")].into_iter().collect();
        let config = AnalyzerConfig::default()
            .with_env(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.base_url, "http://from-env:1");
        assert_eq!(config.timeout_secs, 7);

        let config = config.with_overrides(Some("http://from-flag:2".to_string()), None);
        assert_eq!(config.base_url, "http://from-flag:2");
        assert_eq!(config.timeout_secs, 7);
    }

    #[test]
    fn test_bad_timeout_env() {
        let result = AnalyzerConfig::default().with_env(|name| {
            (name == TIMEOUT_ENV).then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(ConfigError::InvalidEnv { .. })));
    }
}
