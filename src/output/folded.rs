//! Folded-stack and SVG flamegraph writers.
//!
//! Folded files are the `"seg1;seg2;... weight"` interchange format; SVGs
//! are rendered in-process with inferno.

use log::{debug, info};
use std::path::Path;

use super::prepare_output_path;
use crate::stacks::StackLine;
use crate::utils::error::{FlamegraphError, OutputError};

/// Write stack lines in folded format
///
/// **Public** - main entry point for folded output
///
/// # Errors
/// * `OutputError::InvalidPath` - empty path or path is a directory
/// * `OutputError::WriteFailed` - I/O error during write
pub fn write_folded(lines: &[StackLine], output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing {} folded stacks to: {}", lines.len(), output_path.display());

    prepare_output_path(output_path)?;

    let mut contents = String::new();
    for line in lines {
        contents.push_str(&line.folded());
        contents.push('\n');
    }
    std::fs::write(output_path, contents)?;

    Ok(())
}

/// Render an SVG flamegraph from stack lines
///
/// # Arguments
/// * `lines` - collapsed stacks (must be non-empty)
/// * `title` - graph title
/// * `count_name` - unit label shown in frame tooltips (the metric name)
///
/// # Errors
/// * `FlamegraphError::EmptyStacks` - no lines to render
/// * `FlamegraphError::RenderFailed` - inferno rejected the input
pub fn render_svg(
    lines: &[StackLine],
    title: &str,
    count_name: &str,
) -> Result<Vec<u8>, FlamegraphError> {
    if lines.is_empty() {
        return Err(FlamegraphError::EmptyStacks);
    }

    let mut options = inferno::flamegraph::Options::default();
    options.title = title.to_string();
    options.count_name = count_name.to_string();

    let folded: Vec<String> = lines.iter().map(StackLine::folded).collect();

    let mut svg = Vec::new();
    inferno::flamegraph::from_lines(&mut options, folded.iter().map(String::as_str), &mut svg)
        .map_err(|e| FlamegraphError::RenderFailed(e.to_string()))?;

    debug!("Rendered SVG flamegraph ({} bytes)", svg.len());
    Ok(svg)
}

/// Write rendered SVG bytes to disk.
pub fn write_svg(svg: &[u8], output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing flamegraph to: {}", output_path.display());

    prepare_output_path(output_path)?;
    std::fs::write(output_path, svg)?;

    Ok(())
}
