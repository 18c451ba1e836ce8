//! Bench Report Studio CLI
//!
//! A reporting tool for benchmark metric exports.
//! Generates Markdown comparison tables and flamegraphs.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use bench_report_studio::commands::{
    execute_flamegraph, execute_report, validate_flamegraph_args, validate_report_args,
    FlamegraphArgs, ReportArgs,
};
use bench_report_studio::db::{MetricDb, MetricValue};
use bench_report_studio::parser::load_export;
use bench_report_studio::utils::config::DEFAULT_SPAN_KEY;

/// Bench Report Studio - reports and flamegraphs for benchmark metrics
#[derive(Parser, Debug)]
#[command(name = "bench-report")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a Markdown report, optionally diffed against a previous run
    Report {
        /// Path to the metrics export JSON
        #[arg(value_name = "METRICS_JSON")]
        metrics_json: PathBuf,

        /// Path to the previous metrics export for diff generation
        #[arg(long)]
        prev: Option<PathBuf>,

        /// Path to a JSON file with aggregation rules
        #[arg(long, value_name = "AGGREGATION_JSON")]
        aggregations: Option<PathBuf>,

        /// Comma-separated label keys to exclude from the tables
        #[arg(long, value_delimiter = ',')]
        excluded_labels: Vec<String>,

        /// Output path for the report (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Collapse stack-labelled samples into a flamegraph
    Flamegraph {
        /// Path to the metrics export JSON
        #[arg(value_name = "METRICS_JSON")]
        metrics_json: PathBuf,

        /// Metric supplying the weights
        #[arg(long)]
        metric: Option<String>,

        /// Comma-separated metrics whose weights are summed
        #[arg(long, value_delimiter = ',')]
        sum: Vec<String>,

        /// Required key=value label pair (repeatable)
        #[arg(long)]
        filter: Vec<String>,

        /// Comma-separated ordered label keys forming the stack
        #[arg(long, value_delimiter = ',', required = true)]
        stack_keys: Vec<String>,

        /// Label key holding span frames
        #[arg(long, default_value = DEFAULT_SPAN_KEY)]
        span_key: String,

        /// Path to a symbol table blob for span resolution
        #[arg(long)]
        symbols: Option<PathBuf>,

        /// Output path for folded stacks
        #[arg(long)]
        folded: Option<PathBuf>,

        /// Output path for the SVG flamegraph
        #[arg(long)]
        svg: Option<PathBuf>,

        /// Flamegraph title
        #[arg(long)]
        title: Option<String>,
    },

    /// Validate a metrics export file
    Validate {
        /// Path to the metrics export JSON
        #[arg(short, long)]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Report {
            metrics_json,
            prev,
            aggregations,
            excluded_labels,
            output,
        } => {
            let args = ReportArgs {
                metrics_json,
                prev,
                aggregations,
                excluded_labels,
                output,
            };

            validate_report_args(&args)?;
            execute_report(args)?;
        }

        Commands::Flamegraph {
            metrics_json,
            metric,
            sum,
            filter,
            stack_keys,
            span_key,
            symbols,
            folded,
            svg,
            title,
        } => {
            let args = FlamegraphArgs {
                metrics_json,
                metric,
                sum,
                filter,
                stack_keys,
                span_key,
                symbols,
                folded,
                svg,
                title,
            };

            validate_flamegraph_args(&args)?;
            execute_flamegraph(args)?;
        }

        Commands::Validate { file } => {
            validate_export_file(file)?;
        }
    }

    Ok(())
}

/// Validate a metrics export file
///
/// **Private** - internal command implementation
fn validate_export_file(file_path: PathBuf) -> Result<()> {
    println!("Validating export: {}", file_path.display());

    let records = load_export(&file_path)?;
    let counters = records
        .iter()
        .filter(|r| matches!(r.value, MetricValue::Int(_)))
        .count();
    let gauges = records.len() - counters;

    // Ingestion catches duplicate metrics per label set
    let db = MetricDb::from_records(records)?;

    println!("✓ Valid metrics export");
    println!("  Counters: {counters}");
    println!("  Gauges: {gauges}");
    println!("  Label sets: {}", db.flat().len());
    println!("  Retained metrics: {}", db.metric_count());

    Ok(())
}
