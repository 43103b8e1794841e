// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scantext.

use thiserror::Error;

/// Top-level error type for all Scantext operations.
#[derive(Debug, Error)]
pub enum ScantextError {
    // -- Rasterization --
    #[error("{0}")]
    Rasterize(String),

    #[error("No images found in file {source_name}")]
    NoPages { source_name: String },

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    // -- Recognition --
    /// Per-page OCR failure. `page` is the user-facing page number and
    /// `message` holds the first line of the engine's diagnostic output.
    #[error("(page {page}) {message}")]
    Ocr { page: u32, message: String },

    // -- Filters --
    #[error("{}", rule_spec_message(.source_name, .line, .message))]
    RuleSpec {
        source_name: String,
        line: Option<usize>,
        message: String,
    },

    // -- Output --
    #[error("output write failed: {0}")]
    OutputWrite(#[source] std::io::Error),

    // -- Engine --
    /// An engine invariant was broken. Always a defect, never bad input.
    #[error("internal error: {0}")]
    Internal(String),

    #[error("Interrupted")]
    Interrupted,

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn rule_spec_message(source_name: &str, line: &Option<usize>, message: &str) -> String {
    match line {
        Some(line) => format!("filter {source_name}, line {line}: {message}"),
        None => format!("filter {source_name}: {message}"),
    }
}

impl ScantextError {
    /// Build a rule-specification error that is not tied to a particular line.
    pub fn rule_source(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RuleSpec {
            source_name: source_name.into(),
            line: None,
            message: message.into(),
        }
    }

    /// Build a rule-specification error pointing at a 1-based line.
    pub fn rule_line(
        source_name: impl Into<String>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::RuleSpec {
            source_name: source_name.into(),
            line: Some(line),
            message: message.into(),
        }
    }

    /// Whether this error signals a defect in Scantext itself.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScantextError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ocr_error_carries_page_context() {
        let err = ScantextError::Ocr {
            page: 7,
            message: "Error opening data file".into(),
        };
        assert_eq!(err.to_string(), "(page 7) Error opening data file");
    }

    #[test]
    fn rule_error_names_source_and_line() {
        let err = ScantextError::rule_line("headers.filter", 3, "unknown scope `foo`");
        assert_eq!(
            err.to_string(),
            "filter headers.filter, line 3: unknown scope `foo`"
        );

        let err = ScantextError::rule_source("missing.filter", "file not found");
        assert_eq!(err.to_string(), "filter missing.filter: file not found");
    }

    #[test]
    fn only_internal_errors_are_defects() {
        assert!(ScantextError::Internal("gap".into()).is_internal());
        assert!(!ScantextError::Interrupted.is_internal());
    }
}
