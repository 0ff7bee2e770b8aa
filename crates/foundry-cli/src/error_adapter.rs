//! Error adapter for converting FoundryError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI. Decode errors keep
//! the input text, so they render with a snippet pointing at the failure.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use foundry::FoundryError;

/// Adapter implementing [`MietteDiagnostic`] for [`FoundryError`].
pub struct ErrorAdapter<'a>(pub &'a FoundryError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            FoundryError::Io(_) => "foundry::io",
            FoundryError::Validation(_) => "foundry::validation",
            FoundryError::Layout(_) => "foundry::layout",
            FoundryError::Decode { .. } => "foundry::decode",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            FoundryError::Io(_) => {
                "check that the input exists and the output location is writable"
            }
            FoundryError::Validation(_) => {
                "node ids must be unique and non-blank, and size hints finite and positive"
            }
            FoundryError::Layout(_) => return None,
            FoundryError::Decode { .. } => "the input must be a JSON-serialized canvas",
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self.0 {
            FoundryError::Decode { src, .. } => Some(src as &dyn miette::SourceCode),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let FoundryError::Decode {
            offset: Some(offset),
            src,
            ..
        } = self.0
        else {
            return None;
        };

        let span = SourceSpan::new((*offset).into(), char_len_at(src, *offset));
        let label = LabeledSpan::new_primary_with_span(Some("here".to_string()), span);
        Some(Box::new(std::iter::once(label)))
    }
}

/// Byte length of the character starting at `offset`, or zero at the end.
fn char_len_at(src: &str, offset: usize) -> usize {
    src.get(offset..)
        .and_then(|rest| rest.chars().next())
        .map_or(0, char::len_utf8)
}
