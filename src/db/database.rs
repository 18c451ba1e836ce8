//! The in-memory metric database.
//!
//! Owns two views over one metric set:
//! - the *flat index*, keyed by exact label-set identity, holding metrics
//!   in insertion order;
//! - the *shaped index*, keyed by label-key shape then label-value tuple,
//!   a derived projection used by aggregation and table rendering.
//!
//! The shaped index is a pure function of the flat index at the moment of
//! the last rebuild. Every mutation (ingestion, diff annotation, aggregation
//! injection) must be followed by `rebuild_shaped_view` before a shaped read.

use log::{debug, warn};
use std::collections::HashMap;

use super::labels::LabelSet;
use super::metric::{Metric, MetricRecord, MetricValue};
use crate::utils::error::ParseError;

/// Canonical key tuple of one logical table.
pub type Shape = Vec<String>;

/// Label values of one row, ordered to match its shape.
pub type ValueTuple = Vec<String>;

/// shape -> value tuple -> metrics of that row
pub type ShapedView = HashMap<Shape, HashMap<ValueTuple, Vec<Metric>>>;

/// Multi-dimensional metric database for a single benchmark run
///
/// **Public** - built once per export, mutated in-process, discarded
/// after the report
#[derive(Debug, Clone, Default)]
pub struct MetricDb {
    flat: HashMap<LabelSet, Vec<Metric>>,
    by_shape: ShapedView,
}

impl MetricDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a database from parsed records and rebuild the shaped view.
    ///
    /// # Errors
    /// * `ParseError::DuplicateMetric` - two same-named metrics under one
    ///   label-set identity
    pub fn from_records(records: Vec<MetricRecord>) -> Result<Self, ParseError> {
        let mut db = MetricDb::new();
        db.ingest(records)?;
        db.rebuild_shaped_view();
        Ok(db)
    }

    /// Append records to the flat index.
    ///
    /// Counters with value `0` are silently dropped: they are no-op spans
    /// that would dilute the report. Gauges are retained regardless of
    /// value. Callers must `rebuild_shaped_view` before the next shaped
    /// read.
    pub fn ingest(&mut self, records: Vec<MetricRecord>) -> Result<(), ParseError> {
        let mut dropped = 0usize;
        for record in records {
            if let MetricValue::Int(0) = record.value {
                dropped += 1;
                continue;
            }
            let MetricRecord { name, value, labels } = record;
            // A duplicate would make the diff lookup ambiguous.
            if let Some(metrics) = self.flat.get(&labels) {
                if metrics.iter().any(|m| m.name == name) {
                    return Err(ParseError::DuplicateMetric {
                        metric: name,
                        labels: labels.to_string(),
                    });
                }
            }
            self.flat.entry(labels).or_default().push(Metric::new(name, value));
        }
        if dropped > 0 {
            debug!("Dropped {dropped} zero-valued counters");
        }
        Ok(())
    }

    /// Recompute the shaped index from the current flat index.
    ///
    /// O(total metrics). Must be called after every mutating operation
    /// before any shaped read.
    pub fn rebuild_shaped_view(&mut self) {
        self.by_shape.clear();

        for (labels, metrics) in &self.flat {
            self.by_shape
                .entry(labels.shape())
                .or_default()
                .entry(labels.values())
                .or_default()
                .extend(metrics.iter().cloned());
        }
    }

    /// Set `name` to `value` under `labels`, overwriting in place if the
    /// metric already exists.
    ///
    /// A differing overwrite is a repeatability signal - either the
    /// upstream measurement is non-deterministic or an aggregation rule is
    /// mis-specified - so it is logged. The latest value wins.
    pub fn inject_or_overwrite(&mut self, labels: LabelSet, name: &str, value: MetricValue) {
        let metrics = self.flat.entry(labels).or_default();
        if let Some(existing) = metrics.iter_mut().find(|m| m.name == name) {
            if existing.value != value {
                warn!(
                    "Overwriting {name}: previous value = {}, new value = {value}",
                    existing.value
                );
            }
            existing.value = value;
        } else {
            metrics.push(Metric::new(name, value));
        }
    }

    /// The flat index, for diff traversal.
    pub fn flat(&self) -> &HashMap<LabelSet, Vec<Metric>> {
        &self.flat
    }

    pub(crate) fn flat_mut(&mut self) -> &mut HashMap<LabelSet, Vec<Metric>> {
        &mut self.flat
    }

    /// The shaped view as of the last rebuild.
    pub fn by_shape(&self) -> &ShapedView {
        &self.by_shape
    }

    /// Metrics under an exact label-set identity, if any.
    pub fn get(&self, labels: &LabelSet) -> Option<&[Metric]> {
        self.flat.get(labels).map(|m| m.as_slice())
    }

    /// Shapes in sorted order, for deterministic table output.
    pub fn shapes_sorted(&self) -> Vec<&Shape> {
        let mut shapes: Vec<&Shape> = self.by_shape.keys().collect();
        shapes.sort();
        shapes
    }

    /// Total number of metrics in the flat index.
    pub fn metric_count(&self) -> usize {
        self.flat.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(raw: &[(&str, &str)]) -> LabelSet {
        LabelSet::from_pairs(
            raw.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn record(name: &str, value: MetricValue, raw: &[(&str, &str)]) -> MetricRecord {
        MetricRecord {
            name: name.to_string(),
            value,
            labels: labels(raw),
        }
    }

    #[test]
    fn test_zero_counters_dropped_zero_gauges_kept() {
        let db = MetricDb::from_records(vec![
            record("cells", MetricValue::Int(0), &[("group", "fib")]),
            record("cpu_load", MetricValue::Float(0.0), &[("group", "fib")]),
        ])
        .unwrap();

        let metrics = db.get(&labels(&[("group", "fib")])).unwrap();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].name, "cpu_load");
    }

    #[test]
    fn test_duplicate_metric_rejected() {
        let result = MetricDb::from_records(vec![
            record("cycles", MetricValue::Int(3), &[("group", "fib")]),
            record("cycles", MetricValue::Int(7), &[("group", "fib")]),
        ]);
        assert!(matches!(result, Err(ParseError::DuplicateMetric { .. })));
    }

    #[test]
    fn test_same_name_different_identity_allowed() {
        let db = MetricDb::from_records(vec![
            record("cycles", MetricValue::Int(3), &[("group", "fib")]),
            record("cycles", MetricValue::Int(7), &[("group", "sha")]),
        ])
        .unwrap();
        assert_eq!(db.metric_count(), 2);
    }

    #[test]
    fn test_shaped_view_groups_by_shape() {
        let db = MetricDb::from_records(vec![
            record("cycles", MetricValue::Int(3), &[("group", "fib"), ("seg", "0")]),
            record("cycles", MetricValue::Int(7), &[("seg", "1"), ("group", "fib")]),
            record("cycles", MetricValue::Int(9), &[("group", "sha")]),
        ])
        .unwrap();

        let shape = vec!["group".to_string(), "seg".to_string()];
        let rows = db.by_shape().get(&shape).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.contains_key(&vec!["fib".to_string(), "0".to_string()]));
        assert!(rows.contains_key(&vec!["fib".to_string(), "1".to_string()]));

        assert!(db.by_shape().contains_key(&vec!["group".to_string()]));
    }

    #[test]
    fn test_shaped_view_requires_rebuild() {
        let mut db = MetricDb::from_records(vec![record(
            "cycles",
            MetricValue::Int(3),
            &[("group", "fib")],
        )])
        .unwrap();

        db.inject_or_overwrite(labels(&[("group", "fib")]), "total", MetricValue::Int(10));
        // Stale until rebuilt
        let shape = vec!["group".to_string()];
        assert_eq!(db.by_shape()[&shape][&vec!["fib".to_string()]].len(), 1);

        db.rebuild_shaped_view();
        assert_eq!(db.by_shape()[&shape][&vec!["fib".to_string()]].len(), 2);
    }

    #[test]
    fn test_inject_overwrites_in_place() {
        let mut db = MetricDb::new();
        db.inject_or_overwrite(labels(&[("group", "fib")]), "total", MetricValue::Int(10));
        db.inject_or_overwrite(labels(&[("group", "fib")]), "total", MetricValue::Int(12));

        let metrics = db.get(&labels(&[("group", "fib")])).unwrap();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].value, MetricValue::Int(12));
    }

    #[test]
    fn test_fresh_databases_do_not_alias() {
        let mut a = MetricDb::new();
        let b = MetricDb::new();
        a.inject_or_overwrite(labels(&[]), "total", MetricValue::Int(1));
        assert!(b.is_empty());
    }
}
