//! Identifier propagation across fragment rows.
//!
//! Fragment rows carry only a description piece; their identifying
//! cells are blank. Normalization walks the rows once, in source order,
//! copying the last seen non-blank value of each identifier column down
//! into the blanks, then drops the rows that still have no case
//! identifier (rows occurring before the first case was ever seen).

use tracing::debug;

use crate::models::{NormalizedRow, RawRow};

/// One "last seen non-blank value" slot per identifier column.
///
/// The columns fill independently; priority is deliberately not part of
/// this state and never propagates.
#[derive(Debug, Default)]
struct FillState {
    case_number: Option<String>,
    subject: Option<String>,
    status: Option<String>,
}

impl FillState {
    /// Update one slot from a cell and return the effective value:
    /// the cell itself when non-blank, otherwise the remembered value.
    fn fill(slot: &mut Option<String>, cell: &Option<String>) -> Option<String> {
        if cell.is_some() {
            slot.clone_from(cell);
        }
        slot.clone()
    }
}

/// Result of the forward-fill pass.
#[derive(Debug)]
pub struct Normalized {
    /// Surviving rows, in source order, each with a non-empty case
    /// identifier.
    pub rows: Vec<NormalizedRow>,
    /// Rows dropped for preceding the first case identifier.
    pub dropped: usize,
}

/// Forward-fill identifier columns and drop leading identifier-less rows.
///
/// This is a stateful single pass; it must see the rows in original
/// order to be correct. Total over any well-formed row sequence.
pub fn forward_fill(rows: &[RawRow]) -> Normalized {
    let mut state = FillState::default();
    let mut out = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for row in rows {
        let case_number = FillState::fill(&mut state.case_number, &row.case_number);
        let subject = FillState::fill(&mut state.subject, &row.subject);
        let status = FillState::fill(&mut state.status, &row.status);

        let Some(case_number) = case_number else {
            // No case identifier seen yet; the row belongs to no case.
            dropped += 1;
            continue;
        };

        out.push(NormalizedRow {
            ordinal: row.ordinal,
            case_number,
            subject,
            status,
            priority: row.priority.clone(),
            description: row.description.clone(),
        });
    }

    if dropped > 0 {
        debug!("Dropped {} leading rows without a case identifier", dropped);
    }

    Normalized { rows: out, dropped }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_fill_propagates_until_next_value() {
        let rows = vec![
            raw(0, Some("1"), Some("Login issue"), Some("Open"), ""),
            raw(1, None, None, None, "cannot log in"),
            raw(2, None, None, None, "still broken"),
            raw(3, Some("2"), Some("Billing"), Some("Closed"), "invoice wrong"),
        ];

        let normalized = forward_fill(&rows);
        assert_eq!(normalized.dropped, 0);
        assert_eq!(normalized.rows.len(), 4);

        assert_eq!(normalized.rows[1].case_number, "1");
        assert_eq!(normalized.rows[1].subject.as_deref(), Some("Login issue"));
        assert_eq!(normalized.rows[2].status.as_deref(), Some("Open"));
        assert_eq!(normalized.rows[3].case_number, "2");
        assert_eq!(normalized.rows[3].status.as_deref(), Some("Closed"));
    }

    #[test]
    fn test_columns_fill_independently() {
        // Subject appears one row before the status changes; each column
        // must carry its own last-seen value.
        let rows = vec![
            raw(0, Some("1"), Some("First"), Some("Open"), ""),
            raw(1, None, Some("Renamed"), None, "a"),
            raw(2, None, None, Some("Closed"), "b"),
        ];

        let normalized = forward_fill(&rows);
        assert_eq!(normalized.rows[1].subject.as_deref(), Some("Renamed"));
        assert_eq!(normalized.rows[1].status.as_deref(), Some("Open"));
        assert_eq!(normalized.rows[2].subject.as_deref(), Some("Renamed"));
        assert_eq!(normalized.rows[2].status.as_deref(), Some("Closed"));
    }

    #[test]
    fn test_leading_rows_without_identifier_are_dropped() {
        let rows = vec![
            raw(0, None, None, None, "stray preamble fragment"),
            raw(1, None, None, None, "another stray"),
            raw(2, Some("5"), Some("Real case"), Some("Open"), "details"),
            raw(3, None, None, None, "more details"),
        ];

        let normalized = forward_fill(&rows);
        assert_eq!(normalized.dropped, 2);
        assert_eq!(normalized.rows.len(), 2);
        assert!(normalized.rows.iter().all(|r| r.case_number == "5"));
    }

    #[test]
    fn test_every_surviving_row_has_identifier() {
        let rows = vec![
            raw(0, None, None, None, "dropped"),
            raw(1, Some("9"), None, None, "kept"),
            raw(2, None, None, None, "kept too"),
        ];

        let normalized = forward_fill(&rows);
        assert!(normalized.rows.iter().all(|r| !r.case_number.is_empty()));
    }

    #[test]
    fn test_priority_does_not_propagate() {
        let mut first = raw(0, Some("1"), Some("S"), Some("Open"), "");
        first.priority = Some("High".to_string());
        let rows = vec![first, raw(1, None, None, None, "fragment")];

        let normalized = forward_fill(&rows);
        assert_eq!(normalized.rows[0].priority.as_deref(), Some("High"));
        assert_eq!(normalized.rows[1].priority, None);
    }

    #[test]
    fn test_empty_input_is_total() {
        let normalized = forward_fill(&[]);
        assert!(normalized.rows.is_empty());
        assert_eq!(normalized.dropped, 0);
    }
}
