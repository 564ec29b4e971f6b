//! Casefeed - case export reconstruction and summary views
//!
//! A CLI tool that loads a fragmented case export, reconstructs one
//! canonical record per case, and serves summary views either through
//! an interactive query loop or as a static report.
//!
//! Exit codes:
//!   0 - Graceful exit (exit command, end of input, or report written)
//!   1 - Fatal load-time error (missing source, empty source, malformed
//!       source, missing required column, non-numeric case identifier)

mod analysis;
mod cli;
mod config;
mod error;
mod loader;
mod models;
mod pipeline;
mod query;
mod report;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::Config;
use loader::LoadConfig;
use std::io;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Casefeed v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .casefeed.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".casefeed.toml");

    if path.exists() {
        eprintln!("⚠️  .casefeed.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .casefeed.toml")?;

    println!("✅ Created .casefeed.toml with default settings.");
    println!("   Edit it to customize the header offset, delimiter, and column labels.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the pipeline and then either the report renderer or the query
/// loop. Returns the process exit code.
fn run(args: Args) -> Result<i32> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let input = args
        .input
        .clone()
        .context("An input file is required")?;

    // Load, normalize, merge, aggregate — once, in strict sequence.
    println!("📥 Loading case export: {}", input.display());
    let output = match pipeline::run(&input, LoadConfig::from(&config.loader)) {
        Ok(output) => output,
        Err(e) => {
            error!("Pipeline failed ({}): {}", e.kind(), e);
            return Err(e.into());
        }
    };

    println!(
        "🧩 Reconstructed {} cases from {} rows ({} dropped)",
        output.records.len(),
        output.rows_loaded,
        output.rows_dropped
    );
    if !output.has_priority {
        debug!("Source has no priority column; the priority view is unavailable");
    }

    if args.report {
        return write_report(&args, &config, &output);
    }

    run_query_loop(&output)
}

/// Render the report in the resolved format and write it out.
fn write_report(args: &Args, config: &Config, output: &pipeline::PipelineOutput) -> Result<i32> {
    let format = resolve_format(args, config);
    let rendered = match format {
        OutputFormat::Markdown => report::generate_markdown_report(output),
        OutputFormat::Json => report::generate_json_report(output)?,
        OutputFormat::Html => report::generate_html_report(output),
    };

    let path = &config.report.output;
    std::fs::write(path, &rendered)
        .with_context(|| format!("Failed to write report to {}", path))?;

    print_console_summary(output);
    println!("✅ Report saved to: {}", path);
    Ok(0)
}

/// Resolve the report format: CLI wins, then config, then markdown.
fn resolve_format(args: &Args, config: &Config) -> OutputFormat {
    if let Some(format) = args.format {
        return format;
    }
    OutputFormat::from_name(&config.report.format).unwrap_or_else(|| {
        warn!(
            "Unknown report format '{}' in config, using markdown",
            config.report.format
        );
        OutputFormat::default()
    })
}

/// Print the status summary to the console, mirroring the report.
fn print_console_summary(output: &pipeline::PipelineOutput) {
    println!("\n📊 Case Status Summary:");
    for (status, count) in output.aggregates.status_summary.iter() {
        println!("   {}: {}", status, count);
    }
    println!("   Total: {}", output.aggregates.total);
    println!(
        "   Urgent: {} | Efficiency: {:.2}% closed",
        output.aggregates.urgent_count, output.aggregates.efficiency_rate
    );
}

/// Run the interactive query loop over stdin/stdout until the exit
/// command or end of input.
fn run_query_loop(output: &pipeline::PipelineOutput) -> Result<i32> {
    println!("💬 Commands: status, priority, subject, exit\n");

    let mut session = query::QuerySession::new(output);
    let stdin = io::stdin();
    query::run_loop(&mut session, stdin.lock(), io::stdout())
        .context("Query loop I/O failed")?;

    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .casefeed.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
