//! Data models for the case pipeline.
//!
//! This module contains the core data structures used throughout the
//! application: the row shapes produced by loading and normalization,
//! the canonical per-case record, and the derived aggregation views.

use indexmap::IndexMap;
use serde::Serialize;

/// A physical row as read from the source, before any reconstruction.
///
/// Only the first row of a case carries its identifying fields; fragment
/// rows leave them blank and contribute a piece of the description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// Position in source order (0 = first data row).
    #[allow(dead_code)] // Metadata for diagnostics
    pub ordinal: usize,
    /// Case identifier cell, if non-blank.
    pub case_number: Option<String>,
    /// Subject cell, if non-blank.
    pub subject: Option<String>,
    /// Status cell, if non-blank.
    pub status: Option<String>,
    /// Priority cell, if non-blank. Absent when the source has no
    /// priority column.
    pub priority: Option<String>,
    /// Description fragment (possibly empty).
    pub description: String,
}

/// A row after forward fill. The case identifier is guaranteed non-empty;
/// subject and status carry the propagated values but stay `None` for
/// rows occurring before any value has ever been seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    /// Position in source order, preserved from the raw row.
    #[allow(dead_code)] // Metadata for diagnostics
    pub ordinal: usize,
    /// Forward-filled case identifier, never empty.
    pub case_number: String,
    /// Forward-filled subject.
    pub subject: Option<String>,
    /// Forward-filled status.
    pub status: Option<String>,
    /// Priority is not forward-filled; fragment rows keep it blank.
    pub priority: Option<String>,
    /// Description fragment (possibly empty).
    pub description: String,
}

/// The single reconstructed representation of a case after merging all
/// its fragment rows. Built once per run and immutable afterward.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    /// Numeric case identifier.
    pub case_number: i64,
    /// Subject from the first row of the group.
    pub subject: String,
    /// Description fragments joined in row order, with missing-value
    /// tokens stripped and whitespace trimmed.
    pub description: String,
    /// Status from the first row of the group.
    pub status: String,
    /// First non-blank priority in the group, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl CanonicalRecord {
    /// True iff the description mentions "urgent", case-insensitively.
    pub fn is_urgent(&self) -> bool {
        self.description.to_lowercase().contains("urgent")
    }
}

/// Count of canonical records per status label, in first-seen order.
///
/// Covers every status value present in the record set; statuses with no
/// records simply have no entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StatusSummary {
    counts: IndexMap<String, usize>,
}

impl StatusSummary {
    /// Tally statuses over a record set.
    pub fn from_records(records: &[CanonicalRecord]) -> Self {
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for record in records {
            *counts.entry(record.status.clone()).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Count for one status label, zero if absent.
    #[allow(dead_code)] // Utility accessor
    pub fn count(&self, status: &str) -> usize {
        self.counts.get(status).copied().unwrap_or(0)
    }

    /// Iterate `(status, count)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(s, c)| (s.as_str(), *c))
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of distinct status labels.
    #[allow(dead_code)] // Utility accessor
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when no records were tallied.
    #[allow(dead_code)] // Utility accessor
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Dense priority × status cross-tab.
///
/// Every observed priority row carries an entry (possibly zero) for every
/// observed status column; both axes are kept in first-seen order.
/// Records with a blank priority cell do not contribute a row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriorityStatusMatrix {
    statuses: Vec<String>,
    rows: IndexMap<String, IndexMap<String, usize>>,
}

impl PriorityStatusMatrix {
    /// Build the cross-tab over a record set.
    pub fn from_records(records: &[CanonicalRecord]) -> Self {
        let mut statuses: Vec<String> = Vec::new();
        for record in records {
            if !statuses.contains(&record.status) {
                statuses.push(record.status.clone());
            }
        }

        let mut rows: IndexMap<String, IndexMap<String, usize>> = IndexMap::new();
        for record in records {
            let Some(priority) = record.priority.as_ref() else {
                continue;
            };
            let row = rows
                .entry(priority.clone())
                .or_insert_with(|| statuses.iter().map(|s| (s.clone(), 0)).collect());
            *row.entry(record.status.clone()).or_insert(0) += 1;
        }

        Self { statuses, rows }
    }

    /// Observed status labels, first-seen order.
    pub fn statuses(&self) -> &[String] {
        &self.statuses
    }

    /// Observed priority labels, first-seen order.
    pub fn priorities(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// Count for one (priority, status) cell, zero for any combination
    /// not observed.
    pub fn count(&self, priority: &str, status: &str) -> usize {
        self.rows
            .get(priority)
            .and_then(|row| row.get(status))
            .copied()
            .unwrap_or(0)
    }

    /// Total records for one priority across all statuses.
    pub fn row_total(&self, priority: &str) -> usize {
        self.rows
            .get(priority)
            .map(|row| row.values().sum())
            .unwrap_or(0)
    }

    /// True when no record carried a priority.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Derived views over the canonical record set, computed once after the
/// merge. Read-only and recomputable at any time; never mutates records.
#[derive(Debug, Clone, Serialize)]
pub struct Aggregates {
    /// Records per status label.
    pub status_summary: StatusSummary,
    /// Priority × status cross-tab; `None` when the source had no
    /// priority column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_matrix: Option<PriorityStatusMatrix>,
    /// Records whose description mentions "urgent".
    pub urgent_count: usize,
    /// Percentage of records with status exactly "Closed", rounded to
    /// two decimals. Zero for an empty record set.
    pub efficiency_rate: f64,
    /// Total number of canonical records.
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(case_number: i64, status: &str, priority: Option<&str>) -> CanonicalRecord {
        CanonicalRecord {
            case_number,
            subject: format!("Case {}", case_number),
            description: "details".to_string(),
            status: status.to_string(),
            priority: priority.map(String::from),
        }
    }

    #[test]
    fn test_status_summary_counts_and_order() {
        let records = vec![
            record(1, "Open", None),
            record(2, "Closed", None),
            record(3, "Open", None),
        ];

        let summary = StatusSummary::from_records(&records);
        assert_eq!(summary.count("Open"), 2);
        assert_eq!(summary.count("Closed"), 1);
        assert_eq!(summary.count("Pending"), 0);
        assert_eq!(summary.total(), 3);

        let order: Vec<&str> = summary.iter().map(|(s, _)| s).collect();
        assert_eq!(order, vec!["Open", "Closed"]);
    }

    #[test]
    fn test_matrix_is_dense_over_observed_axes() {
        let records = vec![
            record(1, "Open", Some("High")),
            record(2, "Closed", Some("Low")),
            record(3, "Open", Some("High")),
        ];

        let matrix = PriorityStatusMatrix::from_records(&records);
        assert_eq!(matrix.count("High", "Open"), 2);
        assert_eq!(matrix.count("High", "Closed"), 0);
        assert_eq!(matrix.count("Low", "Closed"), 1);
        assert_eq!(matrix.count("Low", "Open"), 0);
        assert_eq!(matrix.row_total("High"), 2);
        assert_eq!(matrix.row_total("Low"), 1);
    }

    #[test]
    fn test_matrix_skips_blank_priority() {
        let records = vec![record(1, "Open", Some("High")), record(2, "Open", None)];

        let matrix = PriorityStatusMatrix::from_records(&records);
        let priorities: Vec<&str> = matrix.priorities().collect();
        assert_eq!(priorities, vec!["High"]);
        assert_eq!(matrix.row_total("High"), 1);
    }

    #[test]
    fn test_urgent_flag_is_case_insensitive() {
        let mut rec = record(1, "Open", None);
        rec.description = "URGENT: cannot log in".to_string();
        assert!(rec.is_urgent());

        rec.description = "all quiet".to_string();
        assert!(!rec.is_urgent());
    }
}
