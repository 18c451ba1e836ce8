//! Report and flamegraph output.

pub mod folded;
pub mod markdown;

pub use folded::{render_svg, write_folded, write_svg};
pub use markdown::{render_report, report_footer};

use log::debug;
use std::path::Path;

use crate::utils::error::OutputError;

/// Write a rendered Markdown report to disk.
pub fn write_report(contents: &str, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    prepare_output_path(output_path)?;
    std::fs::write(output_path, contents)?;
    Ok(())
}

/// Validate an output path and create parent directories if needed.
pub(crate) fn prepare_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}
