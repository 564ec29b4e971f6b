//! Source loading and schema resolution.
//!
//! This module turns a raw delimited-text export into an ordered sequence
//! of [`RawRow`]s: it skips the fixed preamble above the header row,
//! trims incidental whitespace from header labels, resolves the column
//! layout, and validates that every required column is present. All
//! schema checking happens here, once, so downstream components can
//! assume the required columns exist.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::PipelineError;
use crate::models::RawRow;

/// Configuration for loading a source file.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Zero-based index of the physical line holding the header row.
    /// Everything above it is preamble and skipped.
    pub header_row: usize,
    /// Field delimiter.
    pub delimiter: char,
    /// Header labels to resolve columns by (compared after trimming).
    pub columns: ColumnLabels,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            header_row: 18,
            delimiter: ',',
            columns: ColumnLabels::default(),
        }
    }
}

impl From<&crate::config::LoaderConfig> for LoadConfig {
    fn from(config: &crate::config::LoaderConfig) -> Self {
        Self {
            header_row: config.header_row,
            delimiter: config.delimiter,
            columns: ColumnLabels {
                case_number: config.columns.case_number.clone(),
                subject: config.columns.subject.clone(),
                description: config.columns.description.clone(),
                status: config.columns.status.clone(),
                priority: config.columns.priority.clone(),
            },
        }
    }
}

/// Header labels of the recognized columns.
#[derive(Debug, Clone)]
pub struct ColumnLabels {
    pub case_number: String,
    pub subject: String,
    pub description: String,
    pub status: String,
    pub priority: String,
}

impl Default for ColumnLabels {
    fn default() -> Self {
        Self {
            case_number: "Case Number".to_string(),
            subject: "Subject".to_string(),
            description: "Description".to_string(),
            status: "Status".to_string(),
            priority: "Priority".to_string(),
        }
    }
}

/// Resolved positions of the recognized columns in the header.
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    pub case_number: usize,
    pub subject: usize,
    pub description: usize,
    pub status: usize,
    /// Present only when the source carries a priority column.
    pub priority: Option<usize>,
}

impl ColumnLayout {
    /// Resolve the layout from trimmed header labels. Collects every
    /// missing required label so the diagnostic names them all at once.
    fn resolve(headers: &[String], labels: &ColumnLabels) -> Result<Self, PipelineError> {
        let position = |label: &str| headers.iter().position(|h| h == label);

        let case_number = position(&labels.case_number);
        let subject = position(&labels.subject);
        let description = position(&labels.description);
        let status = position(&labels.status);

        if let (Some(case_number), Some(subject), Some(description), Some(status)) =
            (case_number, subject, description, status)
        {
            return Ok(Self {
                case_number,
                subject,
                description,
                status,
                priority: position(&labels.priority),
            });
        }

        let mut missing = Vec::new();
        for (found, label) in [
            (case_number, &labels.case_number),
            (subject, &labels.subject),
            (description, &labels.description),
            (status, &labels.status),
        ] {
            if found.is_none() {
                missing.push(label.clone());
            }
        }
        Err(PipelineError::SchemaViolation { missing })
    }

    /// True when the source carries a priority column.
    pub fn has_priority(&self) -> bool {
        self.priority.is_some()
    }
}

/// A loaded source: resolved layout plus rows in source order.
#[derive(Debug)]
pub struct LoadedSource {
    pub layout: ColumnLayout,
    pub rows: Vec<RawRow>,
}

/// Reads one delimited-text source in a single pass.
pub struct SourceLoader {
    path: PathBuf,
    config: LoadConfig,
}

impl SourceLoader {
    /// Create a loader for the given path.
    pub fn new(path: PathBuf, config: LoadConfig) -> Self {
        Self { path, config }
    }

    /// Load the source: skip the preamble, resolve the header, parse
    /// every data row. The file handle is dropped as soon as this
    /// returns.
    pub fn load(&self) -> Result<LoadedSource, PipelineError> {
        let file = File::open(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PipelineError::SourceNotFound {
                path: self.path.clone(),
            },
            _ => PipelineError::Io(e),
        })?;
        let reader = BufReader::new(file);

        let mut header: Option<Vec<String>> = None;
        let mut raw_lines: Vec<String> = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| match e.kind() {
                ErrorKind::InvalidData => PipelineError::MalformedSource {
                    reason: format!("line {} is not valid UTF-8", index + 1),
                },
                _ => PipelineError::Io(e),
            })?;

            if index < self.config.header_row {
                continue; // preamble
            }
            if index == self.config.header_row {
                let labels = split_delimited(&line, self.config.delimiter).map_err(|reason| {
                    PipelineError::MalformedSource {
                        reason: format!("header line: {}", reason),
                    }
                })?;
                header = Some(labels.iter().map(|h| h.trim().to_string()).collect());
                continue;
            }
            if line.trim().is_empty() {
                continue; // blank lines carry nothing
            }
            raw_lines.push(line);
        }

        let Some(header) = header else {
            return Err(PipelineError::EmptySource {
                reason: format!(
                    "no header line at offset {} in {}",
                    self.config.header_row,
                    self.path.display()
                ),
            });
        };

        if raw_lines.is_empty() {
            return Err(PipelineError::EmptySource {
                reason: format!("no data rows after the header in {}", self.path.display()),
            });
        }

        let layout = ColumnLayout::resolve(&header, &self.config.columns)?;
        debug!("Resolved column layout: {:?}", layout);

        let mut rows = Vec::with_capacity(raw_lines.len());
        for (ordinal, line) in raw_lines.iter().enumerate() {
            let cells = split_delimited(line, self.config.delimiter).map_err(|reason| {
                PipelineError::MalformedSource {
                    reason: format!("data row {}: {}", ordinal + 1, reason),
                }
            })?;
            rows.push(self.row_from_cells(ordinal, &cells, &layout));
        }

        info!(
            "Loaded {} data rows from {} (priority column: {})",
            rows.len(),
            self.path.display(),
            if layout.has_priority() { "yes" } else { "no" }
        );

        Ok(LoadedSource { layout, rows })
    }

    /// Build a raw row from parsed cells. Short rows are padded with
    /// blanks; cells beyond the header width are ignored.
    fn row_from_cells(&self, ordinal: usize, cells: &[String], layout: &ColumnLayout) -> RawRow {
        let cell = |index: usize| -> Option<String> {
            let value = cells.get(index)?.trim();
            if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        };

        RawRow {
            ordinal,
            case_number: cell(layout.case_number),
            subject: cell(layout.subject),
            status: cell(layout.status),
            priority: layout.priority.and_then(cell),
            description: cells
                .get(layout.description)
                .cloned()
                .unwrap_or_default(),
        }
    }
}

/// Split one line into fields. Double quotes wrap fields that contain
/// the delimiter; `""` inside a quoted field is a literal quote. An
/// unclosed quote is a structural error.
fn split_delimited(line: &str, delimiter: char) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else if c == '"' {
            in_quotes = true;
        } else if c == delimiter {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }

    if in_quotes {
        return Err("unclosed quoted field".to_string());
    }

    fields.push(current);
    Ok(fields)
}
