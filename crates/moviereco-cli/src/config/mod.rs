//! Application configuration module.
//!
//! Manages the TOML config file (backend host, TMDB token) and the session
//! file that stands in for browser storage.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{AppConfig, TMDB_TOKEN_ENV};
pub use paths::{resolve_config_path, resolve_session_path};
