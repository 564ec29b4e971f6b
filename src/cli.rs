//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Casefeed - case export reconstruction and summary views
///
/// Loads a fragmented case export (one logical case split across several
/// physical rows), reconstructs one canonical record per case, and serves
/// summary views either interactively or as a static report.
///
/// Examples:
///   casefeed casefeed.csv
///   casefeed casefeed.csv --header-row 0
///   casefeed casefeed.csv --report --format html --output case_report.html
///   casefeed --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the case export to load
    ///
    /// A delimited-text file with a fixed preamble above the header row.
    /// Not required when using --init-config.
    #[arg(value_name = "FILE", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Generate a static report and exit instead of the query loop
    #[arg(short, long)]
    pub report: bool,

    /// Output file path for the report
    ///
    /// Defaults to the config file setting (case_report.md).
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Report format (markdown, json, html)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Zero-based line index of the header row
    ///
    /// Lines above it are preamble and skipped. Defaults to the config
    /// file setting (18, the fixed offset of the upstream export).
    #[arg(long, value_name = "ROW", env = "CASEFEED_HEADER_ROW")]
    pub header_row: Option<usize>,

    /// Field delimiter
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .casefeed.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .casefeed.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
    /// Single-page HTML format
    Html,
}

impl OutputFormat {
    /// Canonical lowercase name, as stored in the config file.
    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
            OutputFormat::Html => "html",
        }
    }

    /// Parse a config-file format name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "markdown" | "md" => Some(OutputFormat::Markdown),
            "json" => Some(OutputFormat::Json),
            "html" => Some(OutputFormat::Html),
            _ => None,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.input.is_none() {
            return Err("An input file is required".to_string());
        }

        // The double quote is reserved for field quoting
        if self.delimiter == Some('"') {
            return Err("The delimiter cannot be a double quote".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            input: Some(PathBuf::from("casefeed.csv")),
            report: false,
            output: None,
            format: None,
            header_row: None,
            delimiter: None,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_accepts_defaults() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_requires_input() {
        let mut args = make_args();
        args.input = None;
        assert!(args.validate().is_err());

        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_quote_delimiter() {
        let mut args = make_args();
        args.delimiter = Some('"');
        assert!(args.validate().is_err());

        args.delimiter = Some(';');
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_format_names_round_trip() {
        for format in [OutputFormat::Markdown, OutputFormat::Json, OutputFormat::Html] {
            assert_eq!(OutputFormat::from_name(format.name()), Some(format));
        }
        assert_eq!(OutputFormat::from_name("md"), Some(OutputFormat::Markdown));
        assert_eq!(OutputFormat::from_name("pdf"), None);
    }
}
