//! Grouped-sum aggregation.
//!
//! Each rule scans the shaped view, projects every qualifying row onto the
//! rule's `group_by` keys, sums the selected metrics per projection, and
//! injects the totals back into the database as synthetic rows.

use log::debug;
use std::collections::HashMap;

use super::rules::{Aggregation, SUM_OPERATION};
use crate::db::{LabelSet, MetricDb, MetricValue, ValueTuple};
use crate::utils::error::AggregateError;

/// Apply aggregation rules to a database
///
/// **Public** - main entry point for aggregation
///
/// Rules are applied independently and in order against the shaped view as
/// of the start of this call; the view is rebuilt once at the end. A later
/// rule therefore only sees an earlier rule's injected rows across separate
/// `apply_aggregations` calls.
///
/// Re-applying an identical rule set to identical data overwrites every
/// total with the same value and warns nothing. A differing overwrite is
/// logged by the database (repeatability signal).
///
/// # Errors
/// * `AggregateError::UnsupportedOperation` - a rule names an operation
///   other than `sum`
pub fn apply_aggregations(
    db: &mut MetricDb,
    aggregations: &[Aggregation],
) -> Result<(), AggregateError> {
    for aggregation in aggregations {
        if aggregation.operation != SUM_OPERATION {
            return Err(AggregateError::UnsupportedOperation(
                aggregation.operation.clone(),
            ));
        }

        let totals = sum_by_projection(db, aggregation);
        debug!(
            "Rule '{}' produced {} grouped totals",
            aggregation.name,
            totals.len()
        );

        // Sorted injection order keeps logs reproducible.
        let mut totals: Vec<_> = totals.into_iter().collect();
        totals.sort_by(|a, b| a.0.cmp(&b.0));

        for (group_values, total) in totals {
            let labels = LabelSet::from_pairs(
                aggregation
                    .group_by
                    .iter()
                    .cloned()
                    .zip(group_values)
                    .collect(),
            );
            db.inject_or_overwrite(labels, &aggregation.name, total);
        }
    }

    db.rebuild_shaped_view();
    Ok(())
}

/// Sum the rule's metrics across all rows, keyed by the rule's projection.
///
/// Only shapes whose key set is a superset of `group_by` participate.
fn sum_by_projection(db: &MetricDb, aggregation: &Aggregation) -> HashMap<ValueTuple, MetricValue> {
    let mut totals: HashMap<ValueTuple, MetricValue> = HashMap::new();

    for (shape, rows) in db.by_shape() {
        let Some(positions) = projection_positions(shape, &aggregation.group_by) else {
            continue;
        };

        for (values, metrics) in rows {
            let group_values: ValueTuple =
                positions.iter().map(|&i| values[i].clone()).collect();

            for metric in metrics {
                if aggregation.metrics.contains(&metric.name) {
                    let entry = totals
                        .entry(group_values.clone())
                        .or_insert(MetricValue::Int(0));
                    *entry = *entry + metric.value;
                }
            }
        }
    }

    totals
}

/// Index of each `group_by` key within `shape`, or None if any is missing.
fn projection_positions(shape: &[String], group_by: &[String]) -> Option<Vec<usize>> {
    group_by
        .iter()
        .map(|key| shape.iter().position(|k| k == key))
        .collect()
}
