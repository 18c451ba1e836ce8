//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod flamegraph;
pub mod report;

// Re-export main command functions
pub use flamegraph::{execute_flamegraph, validate_flamegraph_args, FlamegraphArgs};
pub use report::{execute_report, validate_report_args, ReportArgs};
