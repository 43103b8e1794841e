// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR engine abstraction.
//
// Engines are shared by every worker thread of the pool, so implementations
// must be `Send + Sync` and must not keep per-call mutable state.

use std::path::Path;

use thiserror::Error;

pub mod tesseract;

#[cfg(feature = "ocrs")]
pub mod ocrs;

/// Diagnostic returned by an engine that could not recognise a page.
///
/// Engines tend to print long multi-line complaints; only the first
/// non-blank line is kept, which is what gets shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{diagnostic}")]
pub struct OcrFailure {
    pub diagnostic: String,
}

impl OcrFailure {
    pub fn new(diagnostic: impl AsRef<str>) -> Self {
        let first = diagnostic
            .as_ref()
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default();
        Self {
            diagnostic: first.to_owned(),
        }
    }
}

/// Recognises the text on one page image.
pub trait OcrEngine: Send + Sync {
    /// Short engine name for logs and reports.
    fn name(&self) -> &str;

    /// Recognise `image` in `language` and return the text bytes.
    ///
    /// Blocks until the engine is done. There is no timeout.
    fn recognize(&self, image: &Path, language: &str) -> Result<Vec<u8>, OcrFailure>;
}
