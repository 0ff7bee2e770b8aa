//! CLI logic for the Foundry layout tool.
//!
//! Reads a JSON-serialized canvas, lays it out and writes the laid-out canvas
//! back as pretty-printed JSON.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{fs, io};

use log::{debug, info};

use foundry::{FoundryError, LayoutBuilder, canvas::Canvas};

/// Run the Foundry CLI application
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `FoundryError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed input JSON
/// - Validation and layout errors
pub fn run(args: &Args) -> Result<(), FoundryError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing canvas"
    );

    let mut app_config = config::load_config(args.config.as_ref())?;
    args.apply_overrides(app_config.layout_mut());
    debug!(config:? = app_config; "Effective configuration");

    let source = fs::read_to_string(&args.input)?;
    let canvas = decode_canvas(&source)?;

    let builder = LayoutBuilder::new(app_config);
    let canvas = builder.layout(canvas)?;

    let json = serde_json::to_string_pretty(&canvas).map_err(io::Error::from)?;
    fs::write(&args.output, json)?;

    info!(output_file = args.output; "Canvas written successfully");

    Ok(())
}

/// Decodes a canvas, pointing decode errors at the failing byte.
fn decode_canvas(source: &str) -> Result<Canvas, FoundryError> {
    serde_json::from_str(source).map_err(|err| {
        let offset = byte_offset(source, err.line(), err.column());
        FoundryError::new_decode_error(err.to_string(), offset, source)
    })
}

/// Converts serde_json's one-based line and column into a byte offset.
fn byte_offset(source: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }

    let line_start: usize = source
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    let mut offset = (line_start + column.saturating_sub(1)).min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    Some(offset)
}
