//! Metric value objects.
//!
//! Counters carry integer values, gauges floating point. Arithmetic
//! stays integral when both operands are integral so counter deltas
//! render without a fractional part.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

use super::labels::LabelSet;

/// The value of a single metric sample
///
/// **Public** - used throughout the database, diff, and aggregation layers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// A counter observation, 64 bits wide
    Int(i64),
    /// A gauge observation, 64 bits wide
    Float(f64),
}

impl MetricValue {
    /// Get an f64 representation of this value. Extremely large integers
    /// will be truncated.
    pub fn as_f64(&self) -> f64 {
        match self {
            MetricValue::Int(int) => *int as f64,
            MetricValue::Float(float) => *float,
        }
    }

    /// Get a non-negative integer representation, for flamegraph weights.
    ///
    /// Floats truncate toward zero; negative values clamp to zero.
    pub fn as_weight(&self) -> u64 {
        match self {
            MetricValue::Int(int) => (*int).max(0) as u64,
            MetricValue::Float(float) => {
                if *float > 0.0 {
                    float.trunc() as u64
                } else {
                    0
                }
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            MetricValue::Int(int) => *int == 0,
            MetricValue::Float(float) => *float == 0.0,
        }
    }
}

impl Add for MetricValue {
    type Output = MetricValue;

    fn add(self, rhs: MetricValue) -> MetricValue {
        match (self, rhs) {
            (MetricValue::Int(a), MetricValue::Int(b)) => MetricValue::Int(a + b),
            (a, b) => MetricValue::Float(a.as_f64() + b.as_f64()),
        }
    }
}

impl Sub for MetricValue {
    type Output = MetricValue;

    fn sub(self, rhs: MetricValue) -> MetricValue {
        match (self, rhs) {
            (MetricValue::Int(a), MetricValue::Int(b)) => MetricValue::Int(a - b),
            (a, b) => MetricValue::Float(a.as_f64() - b.as_f64()),
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Int(int) => write!(f, "{int}"),
            MetricValue::Float(float) => write!(f, "{float}"),
        }
    }
}

/// A named metric with optional run-over-run diff annotations
///
/// `diff_value` and `diff_percent` stay unset until the diff engine
/// runs; read paths never recompute them.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: String,
    pub value: MetricValue,
    pub diff_value: Option<MetricValue>,
    pub diff_percent: Option<f64>,
}

impl Metric {
    pub fn new(name: impl Into<String>, value: MetricValue) -> Self {
        Self {
            name: name.into(),
            value,
            diff_value: None,
            diff_percent: None,
        }
    }
}

/// One parsed export entry: a metric sample plus its label coordinates
///
/// **Public** - consumed by both the database and the stack collapser
#[derive(Debug, Clone)]
pub struct MetricRecord {
    pub name: String,
    pub value: MetricValue,
    pub labels: LabelSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_arithmetic_stays_integral() {
        let a = MetricValue::Int(10);
        let b = MetricValue::Int(4);
        assert_eq!(a - b, MetricValue::Int(6));
        assert_eq!(a + b, MetricValue::Int(14));
    }

    #[test]
    fn test_mixed_arithmetic_widens() {
        let a = MetricValue::Int(10);
        let b = MetricValue::Float(2.5);
        assert_eq!(a - b, MetricValue::Float(7.5));
        assert_eq!(a + b, MetricValue::Float(12.5));
    }

    #[test]
    fn test_as_weight() {
        assert_eq!(MetricValue::Int(5).as_weight(), 5);
        assert_eq!(MetricValue::Int(-5).as_weight(), 0);
        assert_eq!(MetricValue::Float(3.9).as_weight(), 3);
        assert_eq!(MetricValue::Float(-1.0).as_weight(), 0);
    }

    #[test]
    fn test_is_zero() {
        assert!(MetricValue::Int(0).is_zero());
        assert!(MetricValue::Float(0.0).is_zero());
        assert!(!MetricValue::Float(0.1).is_zero());
    }
}
