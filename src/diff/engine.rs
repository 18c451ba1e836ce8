//! Run-over-run delta annotation.
//!
//! Matches metric series by label-set identity across two databases and
//! writes the deltas into the current database in place. Rows absent from
//! the previous run are new and keep their diff fields unset.

use log::debug;

use crate::db::MetricDb;

/// Annotate every metric in `db` with its delta against `previous`
///
/// **Public** - main entry point for diffing
///
/// For each matched metric: `diff_value = current - previous`, and
/// `diff_percent = diff_value / previous` only when the previous value is
/// nonzero (a zero baseline renders as an absolute delta with no
/// percentage). Rebuilds the shaped view when done.
pub fn diff_metrics(db: &mut MetricDb, previous: &MetricDb) {
    let mut matched = 0usize;

    for (labels, metrics) in db.flat_mut() {
        let Some(prev_metrics) = previous.flat().get(labels) else {
            continue;
        };
        for metric in metrics {
            // Same-named metrics are unique per identity (enforced on
            // ingest), so the first match is the only match.
            let Some(prev) = prev_metrics.iter().find(|m| m.name == metric.name) else {
                continue;
            };
            let delta = metric.value - prev.value;
            metric.diff_value = Some(delta);
            if !prev.value.is_zero() {
                metric.diff_percent = Some(delta.as_f64() / prev.value.as_f64());
            }
            matched += 1;
        }
    }

    debug!("Diffed {matched} metrics against the previous run");

    db.rebuild_shaped_view();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{LabelSet, MetricRecord, MetricValue};

    fn labels(raw: &[(&str, &str)]) -> LabelSet {
        LabelSet::from_pairs(
            raw.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn db_with(entries: &[(&str, MetricValue, &[(&str, &str)])]) -> MetricDb {
        let records = entries
            .iter()
            .map(|(name, value, raw)| MetricRecord {
                name: name.to_string(),
                value: *value,
                labels: labels(raw),
            })
            .collect();
        MetricDb::from_records(records).unwrap()
    }

    #[test]
    fn test_diff_value_and_percent() {
        let mut current = db_with(&[("cycles", MetricValue::Int(10), &[("group", "fib")])]);
        let previous = db_with(&[("cycles", MetricValue::Int(4), &[("group", "fib")])]);

        diff_metrics(&mut current, &previous);

        let metric = &current.get(&labels(&[("group", "fib")])).unwrap()[0];
        assert_eq!(metric.diff_value, Some(MetricValue::Int(6)));
        assert_eq!(metric.diff_percent, Some(1.5));
    }

    #[test]
    fn test_diff_zero_baseline_has_no_percent() {
        let mut current = db_with(&[("cycles", MetricValue::Int(5), &[("group", "fib")])]);
        let previous = db_with(&[("cycles", MetricValue::Float(0.0), &[("group", "fib")])]);

        diff_metrics(&mut current, &previous);

        let metric = &current.get(&labels(&[("group", "fib")])).unwrap()[0];
        assert_eq!(metric.diff_value, Some(MetricValue::Float(5.0)));
        assert_eq!(metric.diff_percent, None);
    }

    #[test]
    fn test_new_row_keeps_diff_unset() {
        let mut current = db_with(&[("cycles", MetricValue::Int(5), &[("group", "new")])]);
        let previous = db_with(&[("cycles", MetricValue::Int(4), &[("group", "old")])]);

        diff_metrics(&mut current, &previous);

        let metric = &current.get(&labels(&[("group", "new")])).unwrap()[0];
        assert_eq!(metric.diff_value, None);
        assert_eq!(metric.diff_percent, None);
    }

    #[test]
    fn test_identity_match_is_order_independent() {
        let mut current = db_with(&[(
            "cycles",
            MetricValue::Int(8),
            &[("op", "add"), ("group", "fib")],
        )]);
        let previous = db_with(&[(
            "cycles",
            MetricValue::Int(2),
            &[("group", "fib"), ("op", "add")],
        )]);

        diff_metrics(&mut current, &previous);

        let metric = &current
            .get(&labels(&[("group", "fib"), ("op", "add")]))
            .unwrap()[0];
        assert_eq!(metric.diff_value, Some(MetricValue::Int(6)));
        assert_eq!(metric.diff_percent, Some(3.0));
    }
}
