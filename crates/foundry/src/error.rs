//! Error types for Foundry operations.
//!
//! This module provides the main error type [`FoundryError`] which wraps
//! the conditions that can stop a layout run. Layout itself degrades
//! gracefully on cycles, dangling references and unresolved collisions, so
//! most variants describe malformed input rather than algorithm failures.

use std::io;

use thiserror::Error;

use crate::validate::ValidationError;

/// The main error type for Foundry operations.
///
/// # Diagnostic Variants
///
/// The `Decode` variant keeps the offending source text and the byte offset
/// of the failure so callers can point at the exact location.
#[derive(Debug, Error)]
pub enum FoundryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid canvas: {0}")]
    Validation(#[from] ValidationError),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Decode error: {message}")]
    Decode {
        message: String,
        offset: Option<usize>,
        src: String,
    },
}

impl FoundryError {
    /// Create a new `Decode` error for `src`, optionally pointing at a byte offset.
    pub fn new_decode_error(
        message: impl Into<String>,
        offset: Option<usize>,
        src: impl Into<String>,
    ) -> Self {
        Self::Decode {
            message: message.into(),
            offset,
            src: src.into(),
        }
    }
}
