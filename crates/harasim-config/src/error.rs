//! Error types for configuration loading and lookup

use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading or reading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file does not exist
    #[error("Config file was not found: {}", .0.display())]
    NotFound(PathBuf),

    /// I/O error reading the configuration file
    #[error("I/O error: {0}")]
    Io(String),

    /// TOML parsing error
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// Requested section is absent
    #[error("Section '{0}' was not found in the config file")]
    MissingSection(String),

    /// Requested key is absent from an existing section
    #[error("Key '{key}' was not found in section '{section}' of the config file")]
    MissingKey { section: String, key: String },

    /// Entry exists but cannot be read as the requested type
    #[error(
        "Invalid config entry '{value}' in section '{section}', key '{key}'. \
         The type of the value has to be {expected}"
    )]
    InvalidType {
        section: String,
        key: String,
        value: String,
        expected: &'static str,
    },

    /// Value shape that cannot be represented as a single entry
    #[error("Unsupported config value at '{0}': {1}")]
    UnsupportedValue(String, String),
}
