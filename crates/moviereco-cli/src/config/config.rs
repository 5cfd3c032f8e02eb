//! `AppConfig` struct and TOML read/write.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `[tmdb] api_token`.
pub const TMDB_TOKEN_ENV: &str = "TMDB_API_TOKEN";

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Backend settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// TMDB discovery settings.
    #[serde(default)]
    pub tmdb: TmdbConfig,
}

/// Backend configuration.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    /// Host the client pretends to run on; selects local or deployed backend.
    #[serde(default = "default_hostname")]
    pub hostname: String,
    /// Explicit backend URL, overriding `hostname`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            base_url: None,
        }
    }
}

fn default_hostname() -> String {
    String::from("localhost")
}

/// TMDB configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TmdbConfig {
    /// Bearer token for `discover/movie`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Response language (e.g. `en-US`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Saves config to a TOML file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config to TOML")?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }

    /// TMDB token: a non-blank `env_token` wins over the configured one.
    #[must_use]
    pub fn tmdb_token(&self, env_token: Option<String>) -> Option<String> {
        let non_blank = |t: &String| !t.trim().is_empty();
        env_token
            .filter(non_blank)
            .or_else(|| self.tmdb.api_token.clone().filter(non_blank))
    }
}
