//! Stack collapsing and symbol resolution for flamegraphs.

mod collapser;
mod symbols;

pub use collapser::{collapse, CollapseOptions, MetricSelector, StackLine};
pub use symbols::SymbolTable;
