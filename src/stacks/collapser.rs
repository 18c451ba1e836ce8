//! Build collapsed stack format from parsed metric records.
//!
//! Collapsed stacks are the input format for flamegraph generation.
//! Format: "parent;child;grandchild weight"
//!
//! Records are selected by metric name and filter pairs, their stack-key
//! values are concatenated into a path, and records collapsing to the same
//! path have their weights summed.

use log::{debug, warn};
use std::collections::BTreeMap;

use super::symbols::SymbolTable;
use crate::db::{LabelSet, MetricRecord};
use crate::utils::config::{DEFAULT_SPAN_KEY, FRAME_SEPARATOR};

/// Which metric(s) contribute weight to the flamegraph
#[derive(Debug, Clone)]
pub enum MetricSelector {
    /// Exactly one metric by name
    Name(String),
    /// Sum every metric whose name is in the set
    Sum(Vec<String>),
}

impl MetricSelector {
    fn matches(&self, name: &str) -> bool {
        match self {
            MetricSelector::Name(wanted) => wanted == name,
            MetricSelector::Sum(names) => names.iter().any(|n| n == name),
        }
    }
}

/// Options for one collapse pass
#[derive(Debug, Clone)]
pub struct CollapseOptions {
    /// (key, value) pairs a record must carry exactly to participate
    pub filter: Vec<(String, String)>,

    /// Ordered label keys whose values form the stack
    pub stack_keys: Vec<String>,

    /// The stack key whose values are span frames (symbol-resolved when a
    /// table is supplied)
    pub span_key: String,

    /// Metric selection
    pub selector: MetricSelector,
}

impl CollapseOptions {
    pub fn new(selector: MetricSelector, stack_keys: Vec<String>) -> Self {
        Self {
            filter: Vec::new(),
            stack_keys,
            span_key: DEFAULT_SPAN_KEY.to_string(),
            selector,
        }
    }
}

/// A single collapsed stack entry
///
/// **Public** - consumed by the folded/SVG writers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackLine {
    /// Stack trace as semicolon-separated string
    pub path: String,

    /// Weight (metric units consumed by this stack)
    pub weight: u64,
}

impl StackLine {
    /// Render in folded format, as fed to flamegraph tooling.
    pub fn folded(&self) -> String {
        format!("{} {}", self.path, self.weight)
    }
}

/// Collapse records into weighted flamegraph paths
///
/// **Public** - main entry point for stack building
///
/// # Arguments
/// * `records` - parsed export records
/// * `options` - filter pairs, stack keys, span key, metric selection
/// * `symbols` - optional table for resolving span offsets
///
/// # Returns
/// One line per non-zero-weight path, sorted by path for reproducible
/// output. An all-zero collapse returns no lines at all, so callers can
/// suppress empty flamegraphs entirely.
pub fn collapse(
    records: &[MetricRecord],
    options: &CollapseOptions,
    symbols: Option<&SymbolTable>,
) -> Vec<StackLine> {
    // path -> total weight; BTreeMap keeps emission order stable
    let mut weights: BTreeMap<String, u64> = BTreeMap::new();
    let mut selected = 0usize;

    for record in records {
        if !options.selector.matches(&record.name) {
            continue;
        }
        if !options
            .filter
            .iter()
            .all(|(key, value)| record.labels.contains(key, value))
        {
            continue;
        }
        // Records missing a stack key belong to some other view
        let Some(path) = build_path(&record.labels, options, symbols) else {
            continue;
        };

        selected += 1;
        *weights.entry(path).or_insert(0) += record.value.as_weight();
    }

    debug!("Collapsed {selected} records into {} unique paths", weights.len());

    weights
        .into_iter()
        .filter(|(_, weight)| *weight > 0)
        .map(|(path, weight)| StackLine { path, weight })
        .collect()
}

/// Concatenate stack-key values into one path, or None if a key is absent.
fn build_path(
    labels: &LabelSet,
    options: &CollapseOptions,
    symbols: Option<&SymbolTable>,
) -> Option<String> {
    let mut segments = Vec::with_capacity(options.stack_keys.len());

    for key in &options.stack_keys {
        let value = labels.get(key)?;
        if *key == options.span_key {
            if let Some(table) = symbols {
                segments.push(resolve_span_frames(value, table));
                continue;
            }
        }
        segments.push(value.to_string());
    }

    Some(segments.join(&FRAME_SEPARATOR.to_string()))
}

/// Resolve a span value of `;`-joined offsets against the symbol table.
///
/// An unresolvable frame keeps its raw text - resolution failures are
/// reported, never fatal.
fn resolve_span_frames(value: &str, table: &SymbolTable) -> String {
    value
        .split(FRAME_SEPARATOR)
        .map(|frame| match frame.trim().parse::<usize>() {
            Ok(offset) => match table.resolve(offset) {
                Ok(symbol) => symbol.to_string(),
                Err(err) => {
                    warn!("Symbol resolution failed: {err}; keeping raw offset '{frame}'");
                    frame.to_string()
                }
            },
            Err(_) => {
                warn!("Span frame '{frame}' is not a numeric offset; keeping raw text");
                frame.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(&FRAME_SEPARATOR.to_string())
}
