//! Report command implementation.
//!
//! The report command:
//! 1. Loads the metrics export into the database
//! 2. Applies aggregation rules (current and previous run alike)
//! 3. Diffs against the previous run's export
//! 4. Renders Markdown tables to a file or stdout

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::aggregate::{apply_aggregations, load_aggregations, Aggregation};
use crate::db::MetricDb;
use crate::diff::diff_metrics;
use crate::output::{render_report, report_footer, write_report};
use crate::parser::load_export;

/// Arguments for the report command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone, Default)]
pub struct ReportArgs {
    /// Path to the metrics export JSON
    pub metrics_json: PathBuf,

    /// Path to the previous run's export, for diff generation
    pub prev: Option<PathBuf>,

    /// Path to the aggregation rule JSON
    pub aggregations: Option<PathBuf>,

    /// Label keys whose tables are left out of the report
    pub excluded_labels: Vec<String>,

    /// Output path for the Markdown report; stdout if unset
    pub output: Option<PathBuf>,
}

/// Validate report arguments before execution
///
/// **Public** - can be called before execute_report for early validation
pub fn validate_report_args(args: &ReportArgs) -> Result<()> {
    if args.metrics_json.as_os_str().is_empty() {
        anyhow::bail!("Metrics export path cannot be empty");
    }

    if args.excluded_labels.iter().any(|label| label.is_empty()) {
        anyhow::bail!("Excluded label names cannot be empty");
    }

    Ok(())
}

/// Execute the report command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Export loading/parse errors (fatal, no partial report)
/// * Aggregation rule errors
/// * File write errors
pub fn execute_report(args: ReportArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Step 1/4: Loading metrics export...");
    let mut db = load_database(&args.metrics_json)?;

    let aggregations: Vec<Aggregation> = match &args.aggregations {
        Some(path) => load_aggregations(path).context("Failed to load aggregation rules")?,
        None => Vec::new(),
    };

    if aggregations.is_empty() {
        info!("Step 2/4: No aggregation rules to apply");
    } else {
        info!("Step 2/4: Applying {} aggregation rules...", aggregations.len());
        apply_aggregations(&mut db, &aggregations)
            .context("Failed to apply aggregation rules")?;
    }

    if let Some(prev_path) = &args.prev {
        info!("Step 3/4: Diffing against previous run...");
        let mut prev_db = load_database(prev_path)?;
        if !aggregations.is_empty() {
            apply_aggregations(&mut prev_db, &aggregations)
                .context("Failed to apply aggregation rules to previous run")?;
        }
        diff_metrics(&mut db, &prev_db);
    } else {
        info!("Step 3/4: No previous export; skipping diff");
    }

    info!("Step 4/4: Rendering report...");
    let report = render_report(&db, &aggregations, &args.excluded_labels);

    match &args.output {
        Some(path) => {
            let mut contents = report;
            contents.push_str(&report_footer());
            write_report(&contents, path).context("Failed to write report")?;
            info!("✓ Report written to: {}", path.display());
        }
        None => println!("{report}"),
    }

    let elapsed = start_time.elapsed();
    info!("Report completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

/// Load one export file into a fresh database.
fn load_database(path: &Path) -> Result<MetricDb> {
    let records = load_export(path)
        .with_context(|| format!("Failed to load metrics export {}", path.display()))?;
    let db = MetricDb::from_records(records)
        .with_context(|| format!("Failed to ingest metrics export {}", path.display()))?;

    debug!(
        "Loaded {} metrics across {} label sets from {}",
        db.metric_count(),
        db.flat().len(),
        path.display()
    );

    Ok(db)
}
