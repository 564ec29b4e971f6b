//! The reconstruction pipeline.
//!
//! Load, normalize, merge, and aggregate run once at startup, in strict
//! sequence; the output is immutable for the remainder of the run and is
//! only ever read by the query dispatcher and the report renderers.

pub mod merge;
pub mod normalize;

pub use merge::merge_records;
pub use normalize::forward_fill;

use std::path::Path;

use tracing::info;

use crate::analysis;
use crate::error::PipelineError;
use crate::loader::{LoadConfig, SourceLoader};
use crate::models::{Aggregates, CanonicalRecord};

/// Everything one pipeline run produces.
#[derive(Debug)]
pub struct PipelineOutput {
    /// Display form of the source path.
    pub source: String,
    /// Data rows read from the source.
    pub rows_loaded: usize,
    /// Rows dropped for preceding the first case identifier.
    pub rows_dropped: usize,
    /// Whether the source carried a priority column.
    pub has_priority: bool,
    /// Canonical records in group-first-seen order.
    pub records: Vec<CanonicalRecord>,
    /// Derived views over the records.
    pub aggregates: Aggregates,
}

/// Run the full pipeline over one source file.
pub fn run(path: &Path, config: LoadConfig) -> Result<PipelineOutput, PipelineError> {
    let loader = SourceLoader::new(path.to_path_buf(), config);
    let loaded = loader.load()?;
    let rows_loaded = loaded.rows.len();
    let has_priority = loaded.layout.has_priority();

    let normalized = forward_fill(&loaded.rows);
    let records = merge_records(&normalized.rows)?;
    let aggregates = analysis::compute(&records, has_priority);

    info!(
        "Reconstructed {} cases from {} rows ({} dropped)",
        records.len(),
        rows_loaded,
        normalized.dropped
    );

    Ok(PipelineOutput {
        source: path.display().to_string(),
        rows_loaded,
        rows_dropped: normalized.dropped,
        has_priority,
        records,
        aggregates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRow;

    fn raw(
        ordinal: usize,
        case_number: Option<&str>,
        subject: Option<&str>,
        status: Option<&str>,
        description: &str,
    ) -> RawRow {
        RawRow {
            ordinal,
            case_number: case_number.map(String::from),
            subject: subject.map(String::from),
            status: status.map(String::from),
            priority: None,
            description: description.to_string(),
        }
    }

    // The canonical reconstruction scenario: one case split across three
    // rows (with a stray missing-value token), one whole case.
    #[test]
    fn test_fragmented_export_reconstructs() {
        let rows = vec![
            raw(0, Some("1"), Some("Login issue"), Some("Open"), ""),
            raw(1, None, None, None, "cannot log in"),
            raw(2, None, None, None, "nan still broken"),
            raw(3, Some("2"), Some("Billing"), Some("Closed"), "invoice wrong"),
        ];

        let normalized = forward_fill(&rows);
        assert_eq!(normalized.dropped, 0);

        let records = merge_records(&normalized.rows).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].case_number, 1);
        assert_eq!(records[0].subject, "Login issue");
        assert_eq!(records[0].description, "cannot log in still broken");
        assert_eq!(records[0].status, "Open");

        assert_eq!(records[1].case_number, 2);
        assert_eq!(records[1].subject, "Billing");
        assert_eq!(records[1].description, "invoice wrong");
        assert_eq!(records[1].status, "Closed");

        let aggregates = analysis::compute(&records, false);
        assert_eq!(aggregates.status_summary.count("Open"), 1);
        assert_eq!(aggregates.status_summary.count("Closed"), 1);
        assert_eq!(aggregates.status_summary.len(), 2);
    }

    // Count conservation: status counts sum to the record count, which
    // equals the number of distinct identifiers in the normalized rows.
    #[test]
    fn test_count_conservation() {
        let rows = vec![
            raw(0, Some("1"), Some("A"), Some("Open"), "x"),
            raw(1, None, None, None, "y"),
            raw(2, Some("2"), Some("B"), Some("Closed"), "z"),
            raw(3, Some("3"), Some("C"), Some("Open"), "w"),
        ];

        let normalized = forward_fill(&rows);
        let distinct_count = {
            let mut ids: Vec<&str> = normalized
                .rows
                .iter()
                .map(|r| r.case_number.as_str())
                .collect();
            ids.sort_unstable();
            ids.dedup();
            ids.len()
        };

        let records = merge_records(&normalized.rows).unwrap();
        let aggregates = analysis::compute(&records, false);

        assert_eq!(aggregates.status_summary.total(), records.len());
        assert_eq!(records.len(), distinct_count);
    }

    // Full run over the bundled sample export: preamble, header at
    // offset 18, fragmented case, stray missing-value token, blank
    // priority cell.
    #[test]
    fn test_run_over_sample_export() {
        let path = Path::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/fixtures/casefeed.csv"
        ));

        let output = run(path, LoadConfig::default()).unwrap();
        assert_eq!(output.rows_loaded, 6);
        assert_eq!(output.rows_dropped, 0);
        assert!(output.has_priority);

        assert_eq!(output.records.len(), 4);
        assert_eq!(output.records[0].case_number, 1001);
        assert_eq!(output.records[0].description, "cannot log in still broken");
        assert_eq!(output.records[0].status, "Open");
        assert_eq!(output.records[0].priority.as_deref(), Some("High"));

        let aggregates = &output.aggregates;
        assert_eq!(aggregates.status_summary.count("Open"), 2);
        assert_eq!(aggregates.status_summary.count("Closed"), 2);
        assert_eq!(aggregates.efficiency_rate, 50.0);
        assert_eq!(aggregates.urgent_count, 1);

        let matrix = aggregates.priority_matrix.as_ref().unwrap();
        assert_eq!(matrix.count("High", "Open"), 1);
        assert_eq!(matrix.count("Low", "Closed"), 1);
        assert_eq!(matrix.count("Medium", "Open"), 1);
        // Case 1003 has a blank priority cell and stays out of the grid.
        assert_eq!(matrix.row_total("High") + matrix.row_total("Low") + matrix.row_total("Medium"), 3);
    }
}
