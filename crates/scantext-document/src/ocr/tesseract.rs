// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `tesseract` command-line driver.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, instrument};

use super::{OcrEngine, OcrFailure};

/// Runs `tesseract IMAGE - -l LANG` once per page and reads text from stdout.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    program: PathBuf,
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl TesseractEngine {
    /// Use the given executable (a bare name is looked up on `PATH`).
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, image: &Path, language: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(image).arg("-").arg("-l").arg(language);
        cmd
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    #[instrument(skip_all, fields(image = %image.display(), language = %language))]
    fn recognize(&self, image: &Path, language: &str) -> Result<Vec<u8>, OcrFailure> {
        let output = self.command(image, language).output().map_err(|e| {
            OcrFailure::new(format!("cannot run {}: {e}", self.program.display()))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.trim().is_empty() {
                return Err(OcrFailure::new(format!(
                    "{} exited with {}",
                    self.program.display(),
                    output.status
                )));
            }
            return Err(OcrFailure::new(stderr));
        }

        debug!(bytes = output.stdout.len(), "page recognised");
        Ok(output.stdout)
    }
}
