// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JSON summary of one extraction run.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use scantext_core::error::Result;
use scantext_core::types::{OcrBackend, RasterizerKind};

/// What was extracted, from where, and how.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// The scanned document.
    pub source: PathBuf,
    /// Lowercase hex SHA-256 of the source file, taken before extraction;
    /// only computed when a report file was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_sha256: Option<String>,
    pub first_page: u32,
    pub last_page: u32,
    /// Page images recognised.
    pub pages: usize,
    pub workers: usize,
    pub language: String,
    pub engine: OcrBackend,
    pub rasterizer: RasterizerKind,
    /// Number of `line` rules applied.
    pub line_rules: usize,
    /// Number of `text` rules applied.
    pub text_rules: usize,
    /// Size of the final document in bytes.
    pub output_bytes: usize,
}

impl ExtractionReport {
    /// Wall-clock duration of the run in milliseconds.
    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json + "\n")?;
        info!(path = %path.display(), run_id = %self.run_id, "run report written");
        Ok(())
    }
}
