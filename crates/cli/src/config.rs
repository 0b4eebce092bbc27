//! Configuration management for the CLI
//!
//! Settings come from `~/.config/wlt/config.json` (optional), overridden by
//! `WLT_*` environment variables, overridden in turn by command-line flags.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Backend base URL
    pub api_url: Option<String>,
    /// Bearer token for the template endpoint
    pub token: Option<String>,
    /// Local catalog YAML used instead of the backend
    pub catalog_path: Option<String>,
    /// Default output format (`table` or `json`)
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from the default file and environment
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path` (if it exists) and environment
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Json)
                    .required(false),
            )
            .add_source(config::Environment::with_prefix("WLT"))
            .build()
            .context("Failed to read config file")?;

        settings
            .try_deserialize()
            .context("Failed to parse config file")
    }

    /// Resolve the API URL, preferring an explicit flag
    pub fn api_url(&self, flag: Option<&str>) -> String {
        flag.map(str::to_string)
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Resolve the output format, preferring an explicit flag
    pub fn format(&self, flag: Option<OutputFormat>) -> OutputFormat {
        flag.or_else(|| {
            self.default_format
                .as_deref()
                .and_then(|f| match f.to_lowercase().as_str() {
                    "json" => Some(OutputFormat::Json),
                    "table" => Some(OutputFormat::Table),
                    _ => None,
                })
        })
        .unwrap_or_default()
    }

    /// Get the configuration file path
    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("wlt").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();

        assert_eq!(config.token, None);
        assert_eq!(config.catalog_path, None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"token": "abc", "catalog_path": "/etc/wlt/catalog.yaml", "default_format": "json"}"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.catalog_path.as_deref(), Some("/etc/wlt/catalog.yaml"));
        assert!(matches!(config.format(None), OutputFormat::Json));
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            api_url: Some("http://driver:8000".to_string()),
            default_format: Some("json".to_string()),
            ..Config::default()
        };

        assert_eq!(config.api_url(None), "http://driver:8000");
        assert_eq!(config.api_url(Some("http://other:1")), "http://other:1");
        assert!(matches!(
            config.format(Some(OutputFormat::Table)),
            OutputFormat::Table
        ));
        assert_eq!(Config::default().api_url(None), DEFAULT_API_URL);
    }
}
