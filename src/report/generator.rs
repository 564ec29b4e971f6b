//! Static report generation.
//!
//! Renders the canonical record sequence and the aggregation views as a
//! self-contained report in Markdown, JSON, or HTML. Renderers only read
//! the pipeline output; presentation choices here never feed back into
//! the core.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Aggregates, CanonicalRecord};
use crate::pipeline::PipelineOutput;

/// Metadata block emitted at the top of every report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Display form of the source path.
    pub source: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Data rows read from the source.
    pub rows_loaded: usize,
    /// Rows dropped for preceding the first case identifier.
    pub rows_dropped: usize,
    /// Number of reconstructed cases.
    pub total_cases: usize,
}

impl ReportMetadata {
    /// Snapshot the run counters with the current timestamp.
    pub fn from_output(output: &PipelineOutput) -> Self {
        Self {
            source: output.source.clone(),
            generated_at: Utc::now(),
            rows_loaded: output.rows_loaded,
            rows_dropped: output.rows_dropped,
            total_cases: output.records.len(),
        }
    }
}

/// The full document shape serialized by the JSON renderer.
#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    metadata: &'a ReportMetadata,
    cases: &'a [CanonicalRecord],
    aggregates: &'a Aggregates,
}

/// Generate a JSON report.
pub fn generate_json_report(output: &PipelineOutput) -> Result<String> {
    let metadata = ReportMetadata::from_output(output);
    let document = ReportDocument {
        metadata: &metadata,
        cases: &output.records,
        aggregates: &output.aggregates,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(output: &PipelineOutput) -> String {
    let metadata = ReportMetadata::from_output(output);
    let mut report = String::new();

    report.push_str("# Case Data Report\n\n");
    report.push_str(&generate_metadata_section(&metadata));
    report.push_str(&generate_summary_section(&output.aggregates));
    report.push_str(&generate_matrix_section(&output.aggregates));
    report.push_str(&generate_cases_section(&output.records));

    report
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Rows Loaded:** {}\n", metadata.rows_loaded));
    if metadata.rows_dropped > 0 {
        section.push_str(&format!("- **Rows Dropped:** {}\n", metadata.rows_dropped));
    }
    section.push_str(&format!("- **Total Cases:** {}\n", metadata.total_cases));
    section.push('\n');

    section
}

/// Generate the status summary and ratio metrics section.
fn generate_summary_section(aggregates: &Aggregates) -> String {
    let mut section = String::new();

    section.push_str("## Case Status Summary\n\n");
    section.push_str("| Status | Total Cases |\n");
    section.push_str("|:---|:---:|\n");
    for (status, count) in aggregates.status_summary.iter() {
        section.push_str(&format!("| {} | {} |\n", status, count));
    }
    section.push('\n');

    section.push_str(&format!(
        "- **Urgent cases:** {}\n- **Efficiency rate:** {:.2}% closed\n\n",
        aggregates.urgent_count, aggregates.efficiency_rate
    ));

    section
}

/// Generate the priority × status cross-tab section, when available.
fn generate_matrix_section(aggregates: &Aggregates) -> String {
    let Some(matrix) = aggregates.priority_matrix.as_ref() else {
        return String::new();
    };
    if matrix.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Priority × Status\n\n");

    section.push_str("| Priority |");
    for status in matrix.statuses() {
        section.push_str(&format!(" {} |", status));
    }
    section.push_str(" Total |\n|:---|");
    for _ in matrix.statuses() {
        section.push_str(":---:|");
    }
    section.push_str(":---:|\n");

    for priority in matrix.priorities() {
        section.push_str(&format!("| {} |", priority));
        for status in matrix.statuses() {
            section.push_str(&format!(" {} |", matrix.count(priority, status)));
        }
        section.push_str(&format!(" {} |\n", matrix.row_total(priority)));
    }
    section.push('\n');

    section
}

/// Generate the main case table.
fn generate_cases_section(records: &[CanonicalRecord]) -> String {
    let mut section = String::new();

    section.push_str("## Cases\n\n");
    if records.is_empty() {
        section.push_str("No cases were reconstructed from the source.\n\n");
        return section;
    }

    section.push_str("| Case Number | Subject | Description | Status | Priority |\n");
    section.push_str("|:---|:---|:---|:---|:---|\n");
    for record in records {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            record.case_number,
            record.subject,
            record.description,
            record.status,
            record.priority.as_deref().unwrap_or("-")
        ));
    }
    section.push('\n');

    section
}

/// Single-page HTML shell; placeholders are substituted, not formatted,
/// so the embedded CSS and JS braces stay literal.
const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Case Data Report</title>
    <link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.2/dist/css/bootstrap.min.css" rel="stylesheet">
    <style>
        body { padding: 2rem; }
        h1 { margin-bottom: 1.5rem; }
        .table { table-layout: fixed; width: 100%; }
        th { white-space: nowrap; }
        td { word-break: break-word; }
        #summary-container { max-width: 600px; }
    </style>
</head>
<body>
    <div class="container-fluid">
        <h1>Case Data Report</h1>
        <p>Total cases found: __TOTAL_CASES__</p>
        <button id="toggle-summary-btn" class="btn btn-primary mb-3">Show Case Status Summary</button>
        <div id="summary-container" style="display: none;">
            <h2>Case Status Summary</h2>
            __SUMMARY_TABLE__
        </div>
        <hr>
        <div class="table-responsive">__MAIN_TABLE__</div>
    </div>
    <script>
        const toggleBtn = document.getElementById('toggle-summary-btn');
        const summaryContainer = document.getElementById('summary-container');
        toggleBtn.addEventListener('click', () => {
            const isHidden = summaryContainer.style.display === 'none';
            summaryContainer.style.display = isHidden ? 'block' : 'none';
            toggleBtn.textContent = isHidden ? 'Hide Case Status Summary' : 'Show Case Status Summary';
        });
    </script>
</body>
</html>
"#;

/// Generate the single-page HTML report.
pub fn generate_html_report(output: &PipelineOutput) -> String {
    HTML_TEMPLATE
        .replace("__TOTAL_CASES__", &output.records.len().to_string())
        .replace(
            "__SUMMARY_TABLE__",
            &html_summary_table(&output.aggregates),
        )
        .replace("__MAIN_TABLE__", &html_case_table(&output.records))
}

fn html_summary_table(aggregates: &Aggregates) -> String {
    let mut table = String::new();
    table.push_str("<table class=\"table table-bordered mt-3\">\n");
    table.push_str("<thead><tr><th>Status</th><th>Total Cases</th></tr></thead>\n<tbody>\n");
    for (status, count) in aggregates.status_summary.iter() {
        table.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            html_escape(status),
            count
        ));
    }
    table.push_str("</tbody>\n</table>");
    table
}

fn html_case_table(records: &[CanonicalRecord]) -> String {
    let mut table = String::new();
    table.push_str("<table class=\"table table-striped table-hover\">\n");
    table.push_str(
        "<thead><tr><th>Case Number</th><th>Subject</th><th>Description</th><th>Status</th><th>Priority</th></tr></thead>\n<tbody>\n",
    );
    for record in records {
        table.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            record.case_number,
            html_escape(&record.subject),
            html_escape(&record.description),
            html_escape(&record.status),
            html_escape(record.priority.as_deref().unwrap_or("")),
        ));
    }
    table.push_str("</tbody>\n</table>");
    table
}

/// Escape text for embedding in HTML.
fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
