//! Markdown table rendering.
//!
//! One table per label-key shape, rows keyed by the label values, one
//! column per metric name. Diffed metrics get a colored delta span in
//! front of the value: red for an increase, green for a decrease.
//!
//! Shapes, rows, and metric columns are all sorted so that two runs over
//! the same data produce byte-identical reports.

use chrono::Utc;
use std::collections::BTreeMap;

use crate::aggregate::Aggregation;
use crate::db::{Metric, MetricDb, MetricValue};
use crate::utils::config::GROUP_LABEL;

/// Render the full report body
///
/// **Public** - main entry point for tabular output
///
/// With aggregation rules applied, the report leads with a summary table
/// of the aggregated metrics per group and tucks the per-shape tables
/// into a collapsible section. Without rules it is just the tables.
pub fn render_report(
    db: &MetricDb,
    aggregations: &[Aggregation],
    excluded_labels: &[String],
) -> String {
    let mut out = String::new();

    if aggregations.is_empty() {
        out.push_str(&render_tables(db, excluded_labels));
        return out;
    }

    out.push_str(&render_summary(db, aggregations));
    out.push_str("\n<details>\n<summary>Detailed Metrics</summary>\n\n");
    out.push_str(&render_tables(db, excluded_labels));
    out.push_str("</details>\n\n");
    out
}

/// One table per shape, skipping shapes that carry an excluded label.
pub fn render_tables(db: &MetricDb, excluded_labels: &[String]) -> String {
    let mut out = String::new();

    for shape in db.shapes_sorted() {
        if shape.iter().any(|key| excluded_labels.contains(key)) {
            continue;
        }

        // Sort rows for reproducible output
        let rows: BTreeMap<Vec<String>, Vec<Metric>> = db.by_shape()[shape]
            .iter()
            .map(|(values, metrics)| (values.clone(), metrics.clone()))
            .collect();

        out.push_str(&render_table(shape, &rows));
        out.push('\n');
    }

    out
}

/// Summary table: the group-only shape restricted to aggregated metrics.
///
/// Empty when no group rows carry an aggregated metric.
pub fn render_summary(db: &MetricDb, aggregations: &[Aggregation]) -> String {
    let group_shape = vec![GROUP_LABEL.to_string()];
    let Some(rows) = db.by_shape().get(&group_shape) else {
        return String::new();
    };

    let mut summary_rows: BTreeMap<Vec<String>, Vec<Metric>> = BTreeMap::new();
    for (values, metrics) in rows {
        let aggregated: Vec<Metric> = metrics
            .iter()
            .filter(|metric| aggregations.iter().any(|a| a.name == metric.name))
            .cloned()
            .collect();
        if !aggregated.is_empty() {
            summary_rows.insert(values.clone(), aggregated);
        }
    }

    if summary_rows.is_empty() {
        return String::new();
    }

    let mut out = render_table(&group_shape, &summary_rows);
    out.push('\n');
    out
}

/// Footer appended to reports written to disk.
pub fn report_footer() -> String {
    format!("\n_Generated at {}_\n", Utc::now().to_rfc3339())
}

fn render_table(shape: &[String], rows: &BTreeMap<Vec<String>, Vec<Metric>>) -> String {
    // Union of metric names across all rows, one column each
    let mut metric_names: Vec<&str> = rows
        .values()
        .flat_map(|metrics| metrics.iter().map(|m| m.name.as_str()))
        .collect();
    metric_names.sort_unstable();
    metric_names.dedup();

    let mut out = String::new();

    let mut header: Vec<&str> = shape.iter().map(String::as_str).collect();
    header.extend(&metric_names);
    out.push_str("| ");
    out.push_str(&header.join(" | "));
    out.push_str(" |\n");

    out.push_str("| ");
    out.push_str(&vec!["---"; header.len()].join(" | "));
    out.push_str(" |\n");

    for (values, metrics) in rows {
        let mut cells: Vec<String> = values.clone();
        for name in &metric_names {
            let cell = metrics
                .iter()
                .find(|m| m.name == *name)
                .map(render_cell)
                .unwrap_or_default();
            cells.push(cell);
        }
        out.push_str("| ");
        out.push_str(&cells.join(" | "));
        out.push_str(" |\n");
    }

    out
}

/// One metric cell: optional delta span, then the right-aligned value.
fn render_cell(metric: &Metric) -> String {
    let mut cell = String::new();

    if let Some(delta) = metric.diff_value {
        if !delta.is_zero() {
            let color = if delta.as_f64() > 0.0 { "red" } else { "green" };
            let percent = metric
                .diff_percent
                .map(|p| format!(" [{:+.1}%]", p * 100.0))
                .unwrap_or_default();
            cell.push_str(&format!(
                "<span style=\"color: {color}\">({}{percent})</span> ",
                format_delta(delta)
            ));
        }
    }

    cell.push_str(&format!(
        "<div style='text-align: right'>{}</div>",
        format_value(metric.value)
    ));
    cell
}

/// Thousands-separated rendering of a metric value.
pub fn format_value(value: MetricValue) -> String {
    match value {
        MetricValue::Int(int) => format_int(int),
        MetricValue::Float(float) => format_float(float),
    }
}

fn format_delta(value: MetricValue) -> String {
    let formatted = format_value(value);
    if value.as_f64() >= 0.0 {
        format!("+{formatted}")
    } else {
        formatted
    }
}

fn format_int(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let grouped = group_digits(&digits);
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn format_float(f: f64) -> String {
    let text = format!("{f}");
    match text.split_once('.') {
        Some((int_part, frac)) => {
            let negative = int_part.starts_with('-');
            let grouped = group_digits(int_part.trim_start_matches('-'));
            if negative {
                format!("-{grouped}.{frac}")
            } else {
                format!("{grouped}.{frac}")
            }
        }
        None => format_int(f as i64),
    }
}

fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - offset) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{LabelSet, MetricRecord};

    fn record(name: &str, value: MetricValue, raw: &[(&str, &str)]) -> MetricRecord {
        MetricRecord {
            name: name.to_string(),
            value,
            labels: LabelSet::from_pairs(
                raw.iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
        }
    }

    #[test]
    fn test_format_value_groups_digits() {
        assert_eq!(format_value(MetricValue::Int(1_234_567)), "1,234,567");
        assert_eq!(format_value(MetricValue::Int(-1_234)), "-1,234");
        assert_eq!(format_value(MetricValue::Int(999)), "999");
        assert_eq!(format_value(MetricValue::Float(1234.5)), "1,234.5");
        assert_eq!(format_value(MetricValue::Float(2.0)), "2");
    }

    #[test]
    fn test_render_tables_layout() {
        let db = MetricDb::from_records(vec![
            record("cycles", MetricValue::Int(1500), &[("group", "fib")]),
            record("cpu_load", MetricValue::Float(0.5), &[("group", "fib")]),
        ])
        .unwrap();

        let out = render_tables(&db, &[]);
        assert!(out.starts_with("| group | cpu_load | cycles |\n| --- | --- | --- |\n"));
        assert!(out.contains("| fib | "));
        assert!(out.contains("1,500"));
    }

    #[test]
    fn test_excluded_labels_skip_tables() {
        let db = MetricDb::from_records(vec![
            record("cycles", MetricValue::Int(1), &[("group", "fib")]),
            record("cycles", MetricValue::Int(2), &[("group", "fib"), ("span", "f")]),
        ])
        .unwrap();

        let out = render_tables(&db, &["span".to_string()]);
        assert!(out.contains("| group |"));
        assert!(!out.contains("| group | span |"));
    }

    #[test]
    fn test_diff_cell_renders_colored_span() {
        let mut db = MetricDb::from_records(vec![record(
            "cycles",
            MetricValue::Int(10),
            &[("group", "fib")],
        )])
        .unwrap();
        let previous = MetricDb::from_records(vec![record(
            "cycles",
            MetricValue::Int(4),
            &[("group", "fib")],
        )])
        .unwrap();
        crate::diff::diff_metrics(&mut db, &previous);

        let out = render_tables(&db, &[]);
        assert!(out.contains("<span style=\"color: red\">(+6 [+150.0%])</span>"));
    }

    #[test]
    fn test_zero_delta_renders_plain() {
        let mut db = MetricDb::from_records(vec![record(
            "cycles",
            MetricValue::Int(4),
            &[("group", "fib")],
        )])
        .unwrap();
        let previous = db.clone();
        crate::diff::diff_metrics(&mut db, &previous);

        let out = render_tables(&db, &[]);
        assert!(!out.contains("span style"));
    }

    #[test]
    fn test_summary_restricted_to_aggregated_metrics() {
        let mut db = MetricDb::from_records(vec![
            record("cycles", MetricValue::Int(3), &[("group", "a"), ("seg", "0")]),
            record("cycles", MetricValue::Int(7), &[("group", "a"), ("seg", "1")]),
        ])
        .unwrap();

        let rules = vec![Aggregation {
            name: "total_cycles".to_string(),
            group_by: vec!["group".to_string()],
            metrics: vec!["cycles".to_string()],
            operation: "sum".to_string(),
        }];
        crate::aggregate::apply_aggregations(&mut db, &rules).unwrap();

        let summary = render_summary(&db, &rules);
        assert!(summary.contains("| group | total_cycles |"));
        assert!(summary.contains("10"));
        assert!(!summary.contains("| cycles |"));
    }

    #[test]
    fn test_summary_empty_without_group_rows() {
        let db = MetricDb::from_records(vec![record(
            "cycles",
            MetricValue::Int(3),
            &[("other", "x")],
        )])
        .unwrap();

        let rules = vec![Aggregation {
            name: "total_cycles".to_string(),
            group_by: vec!["group".to_string()],
            metrics: vec!["cycles".to_string()],
            operation: "sum".to_string(),
        }];
        assert_eq!(render_summary(&db, &rules), "");
    }

    #[test]
    fn test_report_wraps_details_when_aggregating() {
        let mut db = MetricDb::from_records(vec![
            record("cycles", MetricValue::Int(3), &[("group", "a"), ("seg", "0")]),
        ])
        .unwrap();
        let rules = vec![Aggregation {
            name: "total_cycles".to_string(),
            group_by: vec!["group".to_string()],
            metrics: vec!["cycles".to_string()],
            operation: "sum".to_string(),
        }];
        crate::aggregate::apply_aggregations(&mut db, &rules).unwrap();

        let report = render_report(&db, &rules, &[]);
        assert!(report.contains("<details>"));
        assert!(report.contains("Detailed Metrics"));

        let plain = render_report(&db, &[], &[]);
        assert!(!plain.contains("<details>"));
    }
}
