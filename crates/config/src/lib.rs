//! Configuration management for the API agent
//!
//! Supports loading configuration from:
//! - YAML/TOML files
//! - Environment variables (`API_AGENT__` prefix)
//! - Defaults documented on each section
//!
//! The domain enumeration and per-domain tool assignment are configuration:
//! loaded once at startup, read-only thereafter.

pub mod settings;

pub use settings::{
    default_domains, load_settings, DomainSettings, ExecutorSettings, RetrievalSettings,
    RouterSettings, Settings, WorkflowSettings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
