//! Configuration parsing for co2viz
//!
//! Parses an optional YAML file. Every field has a default, so an absent or
//! empty file gives the stock OWID dataset, filters and chart settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Public OWID CO2 dataset
pub const DEFAULT_DATA_URL: &str =
    "https://raw.githubusercontent.com/owid/co2-data/master/owid-co2-data.csv";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Where the dataset comes from
    #[serde(default)]
    pub source: SourceConfig,

    /// Row filters
    #[serde(default)]
    pub cleaning: CleaningConfig,

    /// Chart settings
    #[serde(default)]
    pub charts: ChartsConfig,
}

/// Dataset location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// HTTP(S) URL or local CSV path
    #[serde(default = "default_url")]
    pub url: String,
}

/// Cleaning settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Country labels that are aggregates (continents, income groups, unions)
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

/// Per-chart settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartsConfig {
    /// Countries drawn on the line chart
    #[serde(default = "default_line_countries")]
    pub line_countries: Vec<String>,

    /// Number of bars in the cumulative emissions chart
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// First year shown on the animated map
    #[serde(default = "default_map_start_year")]
    pub map_start_year: i32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { url: default_url() }
    }
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self { exclude: default_exclude() }
    }
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            line_countries: default_line_countries(),
            top_n: default_top_n(),
            map_start_year: default_map_start_year(),
        }
    }
}

fn default_url() -> String {
    DEFAULT_DATA_URL.to_string()
}

fn default_exclude() -> Vec<String> {
    crate::clean::AGGREGATE_REGIONS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_line_countries() -> Vec<String> {
    ["United States", "China", "India", "Russia", "Japan", "Germany"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_top_n() -> usize {
    15
}

fn default_map_start_year() -> i32 {
    1950
}

impl Config {
    /// Load configuration from YAML file
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        // serde_yaml rejects an empty document, treat it as all defaults
        let config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Load from an optional path, falling back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_yaml(p),
            None => Ok(Self::default()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.source.url.trim().is_empty() {
            anyhow::bail!("source.url must not be empty");
        }

        if self.charts.top_n == 0 {
            anyhow::bail!("charts.top_n must be at least 1");
        }

        if self.charts.line_countries.is_empty() {
            anyhow::bail!("charts.line_countries must list at least one country");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.source.url, DEFAULT_DATA_URL);
        assert_eq!(config.cleaning.exclude.len(), 13);
        assert_eq!(config.charts.top_n, 15);
        assert_eq!(config.charts.map_start_year, 1950);
        assert_eq!(config.charts.line_countries.len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
charts:
  top_n: 5
  line_countries: [France, Brazil]
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.charts.top_n, 5);
        assert_eq!(config.charts.line_countries, vec!["France", "Brazil"]);
        // Untouched sections keep their defaults
        assert_eq!(config.charts.map_start_year, 1950);
        assert_eq!(config.source.url, DEFAULT_DATA_URL);
        assert!(config.cleaning.exclude.contains(&"World".to_string()));
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "source:\n  url: data/owid.csv\ncleaning:\n  exclude: [World]").unwrap();

        let config = Config::from_yaml(file.path()).unwrap();
        assert_eq!(config.source.url, "data/owid.csv");
        assert_eq!(config.cleaning.exclude, vec!["World"]);
    }

    #[test]
    fn test_empty_file_is_default() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = Config::from_yaml(file.path()).unwrap();
        assert_eq!(config.charts.top_n, 15);
    }

    #[test]
    fn test_validate_rejects_zero_top_n() {
        let mut config = Config::default();
        config.charts.top_n = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let config: Config = serde_yaml::from_str(include_str!("../co2viz.example.yaml")).unwrap();
        let defaults = Config::default();
        assert_eq!(config.source.url, defaults.source.url);
        assert_eq!(config.cleaning.exclude, defaults.cleaning.exclude);
        assert_eq!(config.charts.line_countries, defaults.charts.line_countries);
        assert_eq!(config.charts.top_n, defaults.charts.top_n);
    }

    #[test]
    fn test_missing_file() {
        assert!(Config::from_yaml("/nonexistent/co2viz.yaml").is_err());
    }
}
