//! Flamegraph command implementation.
//!
//! The flamegraph command:
//! 1. Loads the metrics export
//! 2. Collapses the selected records into weighted stack paths
//! 3. Writes folded stacks and/or an SVG (or prints folded lines)
//!
//! An export with no matching non-zero-weight records produces no output
//! files at all - an empty flamegraph carries no signal.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;
use std::time::Instant;

use crate::output::{render_svg, write_folded, write_svg};
use crate::parser::load_export;
use crate::stacks::{collapse, CollapseOptions, MetricSelector, SymbolTable};
use crate::utils::config::DEFAULT_SPAN_KEY;

/// Arguments for the flamegraph command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct FlamegraphArgs {
    /// Path to the metrics export JSON
    pub metrics_json: PathBuf,

    /// Single metric supplying the weights
    pub metric: Option<String>,

    /// Set of metrics whose weights are summed (alternative to `metric`)
    pub sum: Vec<String>,

    /// `key=value` pairs a record must carry to participate
    pub filter: Vec<String>,

    /// Ordered label keys forming the stack
    pub stack_keys: Vec<String>,

    /// Label key holding span frames
    pub span_key: String,

    /// Path to a symbol table blob for span resolution
    pub symbols: Option<PathBuf>,

    /// Output path for folded stacks
    pub folded: Option<PathBuf>,

    /// Output path for the SVG flamegraph
    pub svg: Option<PathBuf>,

    /// Flamegraph title
    pub title: Option<String>,
}

impl Default for FlamegraphArgs {
    fn default() -> Self {
        Self {
            metrics_json: PathBuf::new(),
            metric: None,
            sum: Vec::new(),
            filter: Vec::new(),
            stack_keys: Vec::new(),
            span_key: DEFAULT_SPAN_KEY.to_string(),
            symbols: None,
            folded: None,
            svg: None,
            title: None,
        }
    }
}

/// Validate flamegraph arguments before execution
///
/// **Public** - can be called before execute_flamegraph for early validation
pub fn validate_flamegraph_args(args: &FlamegraphArgs) -> Result<()> {
    if args.metrics_json.as_os_str().is_empty() {
        anyhow::bail!("Metrics export path cannot be empty");
    }

    match (&args.metric, args.sum.is_empty()) {
        (None, true) => anyhow::bail!("Either --metric or --sum must be given"),
        (Some(_), false) => anyhow::bail!("--metric and --sum are mutually exclusive"),
        _ => {}
    }

    if args.stack_keys.is_empty() {
        anyhow::bail!("At least one stack key is required");
    }

    for pair in &args.filter {
        if parse_filter_pair(pair).is_none() {
            anyhow::bail!("Invalid filter '{pair}' (expected key=value)");
        }
    }

    Ok(())
}

/// Execute the flamegraph command
///
/// **Public** - main entry point called from main.rs
pub fn execute_flamegraph(args: FlamegraphArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Step 1/3: Loading metrics export...");
    let records = load_export(&args.metrics_json)
        .with_context(|| format!("Failed to load metrics export {}", args.metrics_json.display()))?;

    let symbols = match &args.symbols {
        Some(path) => {
            let table = SymbolTable::from_file(path)
                .with_context(|| format!("Failed to load symbol table {}", path.display()))?;
            debug!("Loaded symbol table ({} bytes)", table.len());
            Some(table)
        }
        None => None,
    };

    info!("Step 2/3: Collapsing stacks...");
    let selector = match &args.metric {
        Some(name) => MetricSelector::Name(name.clone()),
        None => MetricSelector::Sum(args.sum.clone()),
    };

    let options = CollapseOptions {
        filter: args.filter.iter().filter_map(|p| parse_filter_pair(p)).collect(),
        stack_keys: args.stack_keys.clone(),
        span_key: args.span_key.clone(),
        selector,
    };

    let lines = collapse(&records, &options, symbols.as_ref());

    if lines.is_empty() {
        info!("No non-zero-weight stacks; skipping flamegraph output");
        return Ok(());
    }

    info!("Step 3/3: Writing output...");

    if let Some(path) = &args.folded {
        write_folded(&lines, path).context("Failed to write folded stacks")?;
        info!("✓ Folded stacks written to: {}", path.display());
    }

    if let Some(path) = &args.svg {
        let title = args.title.as_deref().unwrap_or("Benchmark Flamegraph");
        let count_name = match &args.metric {
            Some(name) => name.as_str(),
            None => "samples",
        };
        let svg = render_svg(&lines, title, count_name).context("Failed to render flamegraph")?;
        write_svg(&svg, path).context("Failed to write flamegraph SVG")?;
        info!("✓ Flamegraph written to: {}", path.display());
    }

    if args.folded.is_none() && args.svg.is_none() {
        for line in &lines {
            println!("{}", line.folded());
        }
    }

    let elapsed = start_time.elapsed();
    info!("Flamegraph completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

fn parse_filter_pair(pair: &str) -> Option<(String, String)> {
    let (key, value) = pair.split_once('=')?;
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.to_string()))
}
