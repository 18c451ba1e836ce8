//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while parsing a metrics export
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to read export file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid {kind} value for metric '{metric}': {value}")]
    InvalidValue {
        kind: &'static str,
        metric: String,
        value: String,
    },

    #[error("Duplicate metric '{metric}' under labels [{labels}]")]
    DuplicateMetric { metric: String, labels: String },
}

/// Errors that can occur while loading or applying aggregation rules
#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Failed to read aggregation file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unsupported aggregation operation '{0}' (only \"sum\" is supported)")]
    UnsupportedOperation(String),
}

/// Non-fatal symbol table resolution failures
///
/// The stack collapser logs these and falls back to the literal
/// offset text, so they never abort a batch.
#[derive(Error, Debug)]
pub enum SymbolError {
    #[error("Offset {0} is past the end of the symbol table ({1} bytes)")]
    OffsetOutOfBounds(usize, usize),

    #[error("No null terminator after offset {0}")]
    MissingTerminator(usize),

    #[error("Symbol at offset {0} is not valid UTF-8")]
    InvalidUtf8(usize),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Errors that can occur during flamegraph generation
#[derive(Error, Debug)]
pub enum FlamegraphError {
    #[error("Empty stack data")]
    EmptyStacks,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to render SVG: {0}")]
    RenderFailed(String),
}
