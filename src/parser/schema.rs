//! Wire schema for the metrics export file.
//!
//! The export is produced by an external benchmark harness: a JSON document
//! with top-level `counter` and `gauge` arrays, each entry carrying a label
//! pair list, a metric name, and a value that may arrive as a JSON number
//! or as a string.

use serde::Deserialize;
use std::fmt;

/// Top-level export document
///
/// Both arrays are optional; an absent section is simply empty.
#[derive(Debug, Deserialize)]
pub struct RawExport {
    #[serde(default)]
    pub counter: Vec<RawSample>,

    #[serde(default)]
    pub gauge: Vec<RawSample>,
}

/// One exported sample
///
/// Missing fields are a deserialization error - exports with partial
/// entries abort the report rather than producing partial output.
#[derive(Debug, Deserialize)]
pub struct RawSample {
    /// Dimension pairs, as `[key, value]` arrays
    pub labels: Vec<(String, String)>,

    /// Metric name
    pub metric: String,

    /// Sample value, number or numeric string
    pub value: RawValue,
}

/// A value that the harness may serialize either way
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(serde_json::Number),
    Text(String),
}

impl RawValue {
    /// Counter parse: integer, from a JSON integer or an integer string.
    pub fn as_counter(&self) -> Option<i64> {
        match self {
            RawValue::Number(n) => n.as_i64(),
            RawValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Gauge parse: floating point, from any JSON number or numeric string.
    pub fn as_gauge(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => n.as_f64(),
            RawValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{n}"),
            RawValue::Text(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_accepts_string_and_number() {
        let n: RawValue = serde_json::from_str("42").unwrap();
        let s: RawValue = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(n.as_counter(), Some(42));
        assert_eq!(s.as_counter(), Some(42));
    }

    #[test]
    fn test_counter_rejects_fractional() {
        let v: RawValue = serde_json::from_str("1.5").unwrap();
        assert_eq!(v.as_counter(), None);
        let v: RawValue = serde_json::from_str("\"1.5\"").unwrap();
        assert_eq!(v.as_counter(), None);
    }

    #[test]
    fn test_gauge_accepts_string_and_number() {
        let n: RawValue = serde_json::from_str("1.25").unwrap();
        let s: RawValue = serde_json::from_str("\"1.25\"").unwrap();
        assert_eq!(n.as_gauge(), Some(1.25));
        assert_eq!(s.as_gauge(), Some(1.25));
    }

    #[test]
    fn test_missing_field_is_an_error() {
        let result: Result<RawSample, _> =
            serde_json::from_str(r#"{"labels": [], "metric": "cycles"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_labels_parse_as_pair_arrays() {
        let sample: RawSample = serde_json::from_str(
            r#"{"labels": [["group", "fib"], ["op", "add"]], "metric": "cycles", "value": "3"}"#,
        )
        .unwrap();
        assert_eq!(sample.labels.len(), 2);
        assert_eq!(sample.labels[0], ("group".to_string(), "fib".to_string()));
    }
}
