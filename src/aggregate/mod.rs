//! User-defined aggregations over the metric database.

mod engine;
mod rules;

pub use engine::apply_aggregations;
pub use rules::{load_aggregations, Aggregation, SUM_OPERATION};
