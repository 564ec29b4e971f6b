//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.casefeed.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Loader settings.
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Source loader settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Zero-based index of the physical line holding the header row.
    #[serde(default = "default_header_row")]
    pub header_row: usize,

    /// Field delimiter.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Header labels of the recognized columns.
    #[serde(default)]
    pub columns: ColumnsConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            header_row: default_header_row(),
            delimiter: default_delimiter(),
            columns: ColumnsConfig::default(),
        }
    }
}

fn default_header_row() -> usize {
    18
}

fn default_delimiter() -> char {
    ','
}

/// Header labels of the recognized columns. Compared after trimming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default = "default_case_number_label")]
    pub case_number: String,

    #[serde(default = "default_subject_label")]
    pub subject: String,

    #[serde(default = "default_description_label")]
    pub description: String,

    #[serde(default = "default_status_label")]
    pub status: String,

    #[serde(default = "default_priority_label")]
    pub priority: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            case_number: default_case_number_label(),
            subject: default_subject_label(),
            description: default_description_label(),
            status: default_status_label(),
            priority: default_priority_label(),
        }
    }
}

fn default_case_number_label() -> String {
    "Case Number".to_string()
}

fn default_subject_label() -> String {
    "Subject".to_string()
}

fn default_description_label() -> String {
    "Description".to_string()
}

fn default_status_label() -> String {
    "Status".to_string()
}

fn default_priority_label() -> String {
    "Priority".to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Default report output path.
    #[serde(default = "default_report_output")]
    pub output: String,

    /// Default report format (markdown, json, html).
    #[serde(default = "default_report_format")]
    pub format: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_report_output(),
            format: default_report_format(),
        }
    }
}

fn default_report_output() -> String {
    "case_report.md".to_string()
}

fn default_report_format() -> String {
    "markdown".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".casefeed.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings and only
    /// override when explicitly provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(header_row) = args.header_row {
            self.loader.header_row = header_row;
        }
        if let Some(delimiter) = args.delimiter {
            self.loader.delimiter = delimiter;
        }
        if let Some(ref output) = args.output {
            self.report.output = output.display().to_string();
        }
        if let Some(format) = args.format {
            self.report.format = format.name().to_string();
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.loader.header_row, 18);
        assert_eq!(config.loader.delimiter, ',');
        assert_eq!(config.loader.columns.case_number, "Case Number");
        assert_eq!(config.report.format, "markdown");
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true

[loader]
header_row = 0
delimiter = ";"

[loader.columns]
case_number = "Ticket ID"

[report]
output = "weekly.html"
format = "html"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.loader.header_row, 0);
        assert_eq!(config.loader.delimiter, ';');
        assert_eq!(config.loader.columns.case_number, "Ticket ID");
        // Unset labels keep their defaults.
        assert_eq!(config.loader.columns.subject, "Subject");
        assert_eq!(config.report.output, "weekly.html");
        assert_eq!(config.report.format, "html");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[loader]"));
        assert!(toml_str.contains("[loader.columns]"));
        assert!(toml_str.contains("[report]"));
    }
}
