//! Aggregation views over the canonical record set.
//!
//! Every function here is a pure read over the records: counts per
//! status, the priority × status cross-tab, urgent keyword flagging, and
//! the closed-case ratio metric. Nothing mutates a record.

use crate::models::{Aggregates, CanonicalRecord, PriorityStatusMatrix, StatusSummary};

/// Status value a case must carry, exactly, to count as resolved.
const CLOSED_STATUS: &str = "Closed";

/// Compute every derived view in one pass bundle.
///
/// `has_priority` reflects whether the source carried a priority column;
/// without one the cross-tab is not meaningful and stays `None`.
pub fn compute(records: &[CanonicalRecord], has_priority: bool) -> Aggregates {
    Aggregates {
        status_summary: StatusSummary::from_records(records),
        priority_matrix: has_priority.then(|| PriorityStatusMatrix::from_records(records)),
        urgent_count: urgent_count(records),
        efficiency_rate: efficiency_rate(records),
        total: records.len(),
    }
}

/// Number of records whose description mentions "urgent".
pub fn urgent_count(records: &[CanonicalRecord]) -> usize {
    records.iter().filter(|r| r.is_urgent()).count()
}

/// Percentage of records with status exactly "Closed", rounded to two
/// decimal places. Zero for an empty record set.
pub fn efficiency_rate(records: &[CanonicalRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }

    let closed = records.iter().filter(|r| r.status == CLOSED_STATUS).count();
    let rate = (closed as f64 / records.len() as f64) * 100.0;
    (rate * 100.0).round() / 100.0
}
