//! Metric database: label sets, metric values, and the two-view index.

mod database;
mod labels;
mod metric;

pub use database::{MetricDb, Shape, ShapedView, ValueTuple};
pub use labels::LabelSet;
pub use metric::{Metric, MetricRecord, MetricValue};
