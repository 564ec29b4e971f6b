//! Folding normalized rows into canonical records.
//!
//! Rows are grouped by case identifier in an ordered map so the output
//! follows the order in which each distinct case was first encountered.
//! Grouping does not assume fragments for one case are contiguous —
//! forward fill normally makes them so, but correctness does not depend
//! on it.

use indexmap::IndexMap;

use crate::error::PipelineError;
use crate::models::{CanonicalRecord, NormalizedRow};

/// Literal token a stringified absent value leaves behind in description
/// cells; stripped case-insensitively.
const MISSING_TOKEN: &str = "nan";

/// Accumulates one case's rows during grouping.
#[derive(Debug)]
struct Group {
    subject: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    fragments: Vec<String>,
}

impl Group {
    /// Open a group from the first row seen for a case. Subject and
    /// status are fixed here; forward fill makes them uniform across
    /// the group anyway.
    fn open(row: &NormalizedRow) -> Self {
        Self {
            subject: row.subject.clone(),
            status: row.status.clone(),
            priority: None,
            fragments: Vec::new(),
        }
    }

    fn push(&mut self, row: &NormalizedRow) {
        // Priority is the first non-blank value in row order, since
        // fragment rows never carry one.
        if self.priority.is_none() {
            self.priority.clone_from(&row.priority);
        }
        self.fragments.push(row.description.clone());
    }
}

/// Group normalized rows by case identifier and fold each group into a
/// canonical record, in group-first-seen order.
///
/// Fails with `TypeConversionError` on the first case identifier that is
/// not numeric; that is fatal for the run.
pub fn merge_records(rows: &[NormalizedRow]) -> Result<Vec<CanonicalRecord>, PipelineError> {
    let mut groups: IndexMap<String, Group> = IndexMap::new();

    for row in rows {
        groups
            .entry(row.case_number.clone())
            .or_insert_with(|| Group::open(row))
            .push(row);
    }

    let mut records = Vec::with_capacity(groups.len());
    for (identifier, group) in groups {
        records.push(CanonicalRecord {
            case_number: parse_case_number(&identifier)?,
            subject: group.subject.unwrap_or_default(),
            description: join_fragments(&group.fragments),
            status: group.status.unwrap_or_default(),
            priority: group.priority,
        });
    }

    Ok(records)
}

/// Parse a case identifier to an integer.
///
/// Accepts integral float spellings such as "1001.0" — spreadsheet
/// exports stringify numeric cells that way.
fn parse_case_number(value: &str) -> Result<i64, PipelineError> {
    let trimmed = value.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(n);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() && f.fract() == 0.0 && (i64::MIN as f64..=i64::MAX as f64).contains(&f) {
            return Ok(f as i64);
        }
    }
    Err(PipelineError::TypeConversionError {
        value: value.to_string(),
    })
}

/// Join description fragments in row order with a single space, after
/// stripping the missing-value token from each fragment and dropping
/// fragments that end up empty.
fn join_fragments(fragments: &[String]) -> String {
    let cleaned: Vec<String> = fragments
        .iter()
        .map(|f| strip_missing_token(f).trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();
    cleaned.join(" ")
}

/// Remove every case-insensitive occurrence of the missing-value token.
fn strip_missing_token(fragment: &str) -> String {
    let token = MISSING_TOKEN.as_bytes();
    let mut out = String::with_capacity(fragment.len());
    let mut rest = fragment;

    while !rest.is_empty() {
        if rest.len() >= token.len() && rest.as_bytes()[..token.len()].eq_ignore_ascii_case(token) {
            rest = &rest[token.len()..];
            continue;
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }

    out
}
