//! Report rendering modules.
//!
//! Static renderers over the finished pipeline output.

pub mod generator;

pub use generator::{generate_html_report, generate_json_report, generate_markdown_report};
