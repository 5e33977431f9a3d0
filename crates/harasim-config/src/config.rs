//! Sectioned configuration store

use crate::error::{ConfigError, Result};
use indexmap::IndexMap;
use serde::Serialize;

/// Section/key configuration
///
/// Loaded from TOML or assembled with [`Config::set`]. Expansion and the
/// sheets only ever borrow it shared, so it does not change during a run.
/// Every entry is kept as the string it was written as. Numeric readings
/// happen at lookup time through [`Config::float`], [`Config::int`],
/// [`Config::index`] and [`Config::float_list`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Config {
    sections: IndexMap<String, IndexMap<String, String>>,
}

impl Config {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from a parsed TOML document
    ///
    /// Each top-level table becomes a section. Scalars are stored with their
    /// TOML text and flat arrays become a bracketed comma-separated list.
    pub fn from_table(table: toml::Table) -> Result<Self> {
        let mut sections = IndexMap::new();

        for (section, value) in table {
            let toml::Value::Table(entries) = value else {
                return Err(ConfigError::UnsupportedValue(
                    section,
                    "top-level entries must be sections".to_string(),
                ));
            };

            let mut keys = IndexMap::new();
            for (key, value) in entries {
                let rendered = render_value(&value).ok_or_else(|| {
                    ConfigError::UnsupportedValue(
                        format!("{}.{}", section, key),
                        "nested tables and arrays are not allowed".to_string(),
                    )
                })?;
                keys.insert(key, rendered);
            }
            sections.insert(section, keys);
        }

        Ok(Self { sections })
    }

    /// Insert or replace an entry, creating the section when needed
    pub fn set(
        &mut self,
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.sections
            .entry(section.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Whether the section exists
    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Section names in declaration order
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Raw string entry
    pub fn entry(&self, section: &str, key: &str) -> Result<&str> {
        let entries = self
            .sections
            .get(section)
            .ok_or_else(|| ConfigError::MissingSection(section.to_string()))?;
        entries
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::MissingKey {
                section: section.to_string(),
                key: key.to_string(),
            })
    }

    /// Entry read as a float
    pub fn float(&self, section: &str, key: &str) -> Result<f64> {
        let raw = self.entry(section, key)?;
        raw.trim()
            .parse::<f64>()
            .map_err(|_| invalid(section, key, raw, "float"))
    }

    /// Entry read as an integer
    pub fn int(&self, section: &str, key: &str) -> Result<i64> {
        let raw = self.entry(section, key)?;
        raw.trim()
            .parse::<i64>()
            .map_err(|_| invalid(section, key, raw, "int"))
    }

    /// Entry read as a non-negative count (header sizes)
    pub fn count(&self, section: &str, key: &str) -> Result<usize> {
        let raw = self.entry(section, key)?;
        raw.trim()
            .parse::<usize>()
            .map_err(|_| invalid(section, key, raw, "non-negative int"))
    }

    /// Entry read as a 1-based column index
    pub fn index(&self, section: &str, key: &str) -> Result<usize> {
        let raw = self.entry(section, key)?;
        match raw.trim().parse::<usize>() {
            Ok(idx) if idx >= 1 => Ok(idx),
            _ => Err(invalid(section, key, raw, "column index >= 1")),
        }
    }

    /// Entry read as a bracketed list of floats, e.g. `[0, 30, 50]`
    ///
    /// A bare number is accepted as a one-element list.
    pub fn float_list(&self, section: &str, key: &str) -> Result<Vec<f64>> {
        let raw = self.entry(section, key)?;
        parse_float_list(raw).ok_or_else(|| invalid(section, key, raw, "list of floats"))
    }
}

fn invalid(section: &str, key: &str, value: &str, expected: &'static str) -> ConfigError {
    ConfigError::InvalidType {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        expected,
    }
}

/// Parse `[a, b, c]` into floats; every element must parse
pub fn parse_float_list(raw: &str) -> Option<Vec<f64>> {
    let inner = raw.trim().trim_start_matches('[').trim_end_matches(']');
    inner
        .split(',')
        .map(|item| item.trim().parse::<f64>().ok())
        .collect()
}

fn render_value(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::Array(items) => {
            let rendered: Option<Vec<String>> = items.iter().map(render_scalar).collect();
            Some(format!("[{}]", rendered?.join(", ")))
        }
        other => render_scalar(other),
    }
}

fn render_scalar(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        let mut config = Config::new();
        config
            .set("Speed", "low", "[10, 20, 30]")
            .set("Speed", "broken", "[10, fast]")
            .set("Hara_Sheet", "idx_id", "1")
            .set("Hara_Sheet", "idx_bad", "0")
            .set("Hara_Sheet", "header_size", "4")
            .set("Road_friction", "mu-split", "0.8/0.2");
        config
    }

    #[test]
    fn test_missing_section_and_key() {
        let config = sample();
        assert!(matches!(
            config.entry("Slope", "flat"),
            Err(ConfigError::MissingSection(s)) if s == "Slope"
        ));
        assert!(matches!(
            config.entry("Speed", "high"),
            Err(ConfigError::MissingKey { key, .. }) if key == "high"
        ));
    }

    #[test]
    fn test_typed_lookup() {
        let config = sample();
        assert_eq!(config.int("Hara_Sheet", "header_size").unwrap(), 4);
        assert_eq!(config.count("Hara_Sheet", "header_size").unwrap(), 4);
        assert_eq!(config.index("Hara_Sheet", "idx_id").unwrap(), 1);
        assert!(config.index("Hara_Sheet", "idx_bad").is_err());
        assert!(matches!(
            config.float("Road_friction", "mu-split"),
            Err(ConfigError::InvalidType { expected: "float", .. })
        ));
    }

    #[test]
    fn test_float_list() {
        let config = sample();
        assert_eq!(
            config.float_list("Speed", "low").unwrap(),
            vec![10.0, 20.0, 30.0]
        );
        assert!(config.float_list("Speed", "broken").is_err());
        assert_eq!(parse_float_list("42"), Some(vec![42.0]));
        assert_eq!(parse_float_list("[]"), None);
    }

    #[test]
    fn test_nested_table_rejected() {
        let table: toml::Table = toml::from_str("[Outer.inner]\nkey = 1").unwrap();
        assert!(matches!(
            Config::from_table(table),
            Err(ConfigError::UnsupportedValue(..))
        ));
    }

    #[test]
    fn test_set_replaces_loaded_entry() {
        let table: toml::Table = toml::from_str("[Speed]\nlow = [10, 20]").unwrap();
        let mut config = Config::from_table(table).unwrap();
        config.set("Speed", "low", "[5]").set("Slope", "flat", "0");
        assert_eq!(config.float_list("Speed", "low").unwrap(), vec![5.0]);
        assert_eq!(config.float("Slope", "flat").unwrap(), 0.0);
        let names: Vec<&str> = config.sections().collect();
        assert_eq!(names, vec!["Speed", "Slope"]);
    }

    #[test]
    fn test_sections_listed() {
        let table: toml::Table = toml::from_str("[B]\nx = 1\n[A]\ny = 2").unwrap();
        let config = Config::from_table(table).unwrap();
        let names: Vec<&str> = config.sections().collect();
        assert_eq!(names, vec!["B", "A"]);
    }
}
