//! Aggregation rule file.
//!
//! Rules are declared in a JSON document:
//!
//! ```json
//! {
//!   "aggregations": [
//!     {
//!       "name": "total_cycles",
//!       "group_by": ["group"],
//!       "metrics": ["cycles"],
//!       "operation": "sum"
//!     }
//!   ]
//! }
//! ```

use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::utils::error::AggregateError;

/// The only supported aggregation operation.
pub const SUM_OPERATION: &str = "sum";

/// A declarative grouped-sum rule
///
/// For every distinct projection of existing rows onto `group_by`, the
/// engine sums the metrics named in `metrics` and records the total under
/// a new row consisting exactly of the `group_by` pairs, as a metric
/// named `name`.
///
/// `operation` stays a plain string so an unknown operation surfaces as a
/// dedicated error rather than a generic deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aggregation {
    pub name: String,
    pub group_by: Vec<String>,
    pub metrics: Vec<String>,
    pub operation: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct AggregationFile {
    aggregations: Vec<Aggregation>,
}

/// Load aggregation rules from a JSON file
///
/// # Errors
/// * `AggregateError::IoError` - the file cannot be read
/// * `AggregateError::JsonError` - the document is malformed
pub fn load_aggregations(path: impl AsRef<Path>) -> Result<Vec<Aggregation>, AggregateError> {
    let path = path.as_ref();
    debug!("Reading aggregation rules from: {}", path.display());

    let contents = std::fs::read_to_string(path)?;
    let file: AggregationFile = serde_json::from_str(&contents)?;

    debug!("Loaded {} aggregation rules", file.aggregations.len());
    Ok(file.aggregations)
}
