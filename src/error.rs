//! Pipeline error taxonomy.
//!
//! Every variant is a load-time, fatal failure: the pipeline aborts
//! before any query can be served and the process exits non-zero.
//! Query-time problems (unknown command, missing optional view) are
//! handled locally by the dispatcher and never surface here.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures raised while loading and reconstructing the source.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The source path does not exist or could not be opened.
    #[error("source file not found: {}", .path.display())]
    SourceNotFound { path: PathBuf },

    /// The source has no header line at the configured offset, or a
    /// header but no data rows at all.
    #[error("source is empty: {reason}")]
    EmptySource { reason: String },

    /// The source could not be parsed structurally.
    #[error("malformed source: {reason}")]
    MalformedSource { reason: String },

    /// One or more required column labels are absent after trimming.
    #[error("required column(s) missing from header: {}", .missing.join(", "))]
    SchemaViolation { missing: Vec<String> },

    /// A case identifier could not be converted to an integer.
    #[error("case identifier is not numeric: '{value}'")]
    TypeConversionError { value: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl PipelineError {
    /// Short machine-friendly name of the error kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::SourceNotFound { .. } => "source-not-found",
            PipelineError::EmptySource { .. } => "empty-source",
            PipelineError::MalformedSource { .. } => "malformed-source",
            PipelineError::SchemaViolation { .. } => "schema-violation",
            PipelineError::TypeConversionError { .. } => "type-conversion",
            PipelineError::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_violation_lists_all_missing_columns() {
        let err = PipelineError::SchemaViolation {
            missing: vec!["Case Number".to_string(), "Status".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Case Number"));
        assert!(msg.contains("Status"));
    }

    #[test]
    fn test_kind_names() {
        let err = PipelineError::TypeConversionError {
            value: "abc".to_string(),
        };
        assert_eq!(err.kind(), "type-conversion");

        let err = PipelineError::EmptySource {
            reason: "no data rows".to_string(),
        };
        assert_eq!(err.kind(), "empty-source");
    }
}
