//! harasim configuration loading and typed lookup
//!
//! The configuration is a set of named sections, each mapping keys to the
//! string form of a value. Typed accessors convert on demand, so a malformed
//! entry only fails the lookup that actually needs it.

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{ConfigError, Result};

use std::path::Path;

/// Load a configuration from a TOML file
pub fn from_path(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        let shown = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        return Err(ConfigError::NotFound(shown));
    }
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
    from_str(&contents)
}

/// Parse a configuration from a TOML string
pub fn from_str(s: &str) -> Result<Config> {
    let table: toml::Table = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
    Config::from_table(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_config_parse() {
        let toml = r#"
            [Slope]
            flat = 0.0
            uphill = "12.5"

            [Speed]
            low = [10, 20]
        "#;

        let config = from_str(toml).unwrap();
        assert_eq!(config.float("Slope", "flat").unwrap(), 0.0);
        assert_eq!(config.float("Slope", "uphill").unwrap(), 12.5);
        assert_eq!(config.entry("Speed", "low").unwrap(), "[10, 20]");
    }

    #[test]
    fn test_invalid_toml() {
        let err = from_str("[Slope\nflat = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = from_path("definitely/not/here/config.toml").unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
