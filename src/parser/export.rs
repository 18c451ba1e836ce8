//! Export loading.
//!
//! Turns the raw wire schema into `MetricRecord`s: counters become integer
//! values, gauges floating point. Structural problems are fatal for the
//! whole export.

use log::debug;
use std::path::Path;

use super::schema::{RawExport, RawSample};
use crate::db::{LabelSet, MetricRecord, MetricValue};
use crate::utils::error::ParseError;

/// Load and parse a metrics export file
///
/// **Public** - main entry point for ingestion
///
/// # Errors
/// * `ParseError::IoError` - the file cannot be read
/// * `ParseError::JsonError` - the document is not valid export JSON
/// * `ParseError::InvalidValue` - a sample value fails to parse
pub fn load_export(path: impl AsRef<Path>) -> Result<Vec<MetricRecord>, ParseError> {
    let path = path.as_ref();
    debug!("Reading metrics export from: {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    parse_export(&contents)
}

/// Parse export JSON into metric records.
pub fn parse_export(json: &str) -> Result<Vec<MetricRecord>, ParseError> {
    let export: RawExport = serde_json::from_str(json)?;

    let mut records = Vec::with_capacity(export.counter.len() + export.gauge.len());

    for sample in &export.counter {
        let value = sample.value.as_counter().ok_or_else(|| invalid(sample, "counter"))?;
        records.push(to_record(sample, MetricValue::Int(value)));
    }

    for sample in &export.gauge {
        let value = sample.value.as_gauge().ok_or_else(|| invalid(sample, "gauge"))?;
        records.push(to_record(sample, MetricValue::Float(value)));
    }

    debug!(
        "Parsed {} counter and {} gauge samples",
        export.counter.len(),
        export.gauge.len()
    );

    Ok(records)
}

fn to_record(sample: &RawSample, value: MetricValue) -> MetricRecord {
    MetricRecord {
        name: sample.metric.clone(),
        value,
        labels: LabelSet::from_pairs(sample.labels.clone()),
    }
}

fn invalid(sample: &RawSample, kind: &'static str) -> ParseError {
    ParseError::InvalidValue {
        kind,
        metric: sample.metric.clone(),
        value: sample.value.to_string(),
    }
}
