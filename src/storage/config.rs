//! Configuration handling
//!
//! Configuration is stored in `~/.config/taskline/config.toml` (or the
//! platform equivalent). Every key is optional.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::DEFAULT_PAGE_SIZE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Output format for command replies
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Task file location (defaults to the platform data directory)
    pub data_file: Option<PathBuf>,

    /// Tasks shown per page
    pub page_size: usize,

    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            page_size: DEFAULT_PAGE_SIZE,
            default_format: OutputFormat::Text,
        }
    }
}

impl Config {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("dev", "taskline", "taskline")
    }

    /// Returns the config directory
    pub fn config_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads configuration from the default location
    pub fn load() -> Result<Self> {
        match Self::config_dir() {
            Some(dir) => Self::load_from(&dir.join("config.toml")),
            None => Ok(Self::default()),
        }
    }

    /// Loads configuration from a specific file; a missing file means defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Failed to load config: {}", path.display()))
    }

    /// Parses and validates TOML configuration text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse config")?;

        if config.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".to_string()).into());
        }
        Ok(config)
    }

    /// Resolves the task file: explicit override, then config, then data dir
    pub fn resolve_data_file(&self, override_path: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = override_path {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = &self.data_file {
            return Ok(path.clone());
        }
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().join("tasks.jsonl"))
            .ok_or_else(|| anyhow::anyhow!("Could not determine a data directory; pass --file"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.default_format, OutputFormat::Text);
        assert!(config.data_file.is_none());
    }

    #[test]
    fn parse_config() {
        let toml = r#"
data_file = "/tmp/my-tasks.jsonl"
page_size = 25
default_format = "json"
"#;

        let config = Config::parse(toml).unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.default_format, OutputFormat::Json);
        assert_eq!(config.data_file, Some(PathBuf::from("/tmp/my-tasks.jsonl")));
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config = Config::parse("page_size = 3").unwrap();
        assert_eq!(config.page_size, 3);
        assert_eq!(config.default_format, OutputFormat::Text);
    }

    #[test]
    fn zero_page_size_is_invalid() {
        let err = Config::parse("page_size = 0").unwrap_err();
        assert!(format!("{:#}", err).contains("page_size"));
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn override_wins_over_config() {
        let config = Config {
            data_file: Some(PathBuf::from("from-config.jsonl")),
            ..Config::default()
        };
        let resolved = config
            .resolve_data_file(Some(Path::new("from-flag.jsonl")))
            .unwrap();
        assert_eq!(resolved, PathBuf::from("from-flag.jsonl"));
        assert_eq!(
            config.resolve_data_file(None).unwrap(),
            PathBuf::from("from-config.jsonl")
        );
    }
}
