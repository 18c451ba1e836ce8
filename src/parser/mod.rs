//! Export file parsing.

pub mod export;
pub mod schema;

pub use export::{load_export, parse_export};
