// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extraction configuration. Built once (defaults, then an optional JSON file,
// then command-line overrides) and passed by value into the pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScantextError};
use crate::types::{OcrBackend, RasterizerKind};

/// Settings for one extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Scanned PDF to extract text from.
    pub input: PathBuf,
    /// First page to rasterize (1-based).
    pub first_page: u32,
    /// Last page to rasterize; `None` means the last page of the document.
    pub last_page: Option<u32>,
    /// Document language passed to the OCR engine (tesseract code, e.g. `eng`).
    pub language: String,
    /// Filter rule files, applied in the order given.
    pub filters: Vec<PathBuf>,
    /// Number of parallel OCR workers.
    pub workers: usize,
    /// Tool used to produce page images.
    pub rasterizer: RasterizerKind,
    /// Render resolution used by the `pdftoppm` rasterizer.
    pub dpi: u32,
    /// OCR engine.
    pub engine: OcrBackend,
    /// Path or name of the `tesseract` executable.
    pub tesseract: PathBuf,
    /// Directory holding the `ocrs` model files; `None` uses the ocrs cache.
    pub model_dir: Option<PathBuf>,
    /// Write the text here instead of standard output.
    pub output: Option<PathBuf>,
    /// Write a JSON run report here.
    pub report: Option<PathBuf>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            first_page: 1,
            last_page: None,
            language: "eng".into(),
            filters: Vec::new(),
            workers: default_workers(),
            rasterizer: RasterizerKind::default(),
            dpi: 300,
            engine: OcrBackend::default(),
            tesseract: PathBuf::from("tesseract"),
            model_dir: None,
            output: None,
            report: None,
        }
    }
}

/// One worker per available processing unit.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl ExtractConfig {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ScantextError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Check the settings before any external tool is started.
    pub fn validate(&self) -> Result<()> {
        if self.input.as_os_str().is_empty() {
            return Err(ScantextError::Config("Input file is not specified".into()));
        }
        if self.first_page == 0 {
            return Err(ScantextError::Config("first page number must be at least 1".into()));
        }
        if let Some(last) = self.last_page {
            if last < self.first_page {
                return Err(ScantextError::Config(format!(
                    "last page {last} is before first page {}",
                    self.first_page
                )));
            }
        }
        if self.language.trim().is_empty() {
            return Err(ScantextError::Config("document language is empty".into()));
        }
        if self.workers == 0 {
            return Err(ScantextError::Config("worker count must be at least 1".into()));
        }
        if self.dpi == 0 {
            return Err(ScantextError::Config("render resolution must be positive".into()));
        }
        for filter in &self.filters {
            check_regular_file(filter)?;
        }
        Ok(())
    }
}

fn check_regular_file(path: &Path) -> Result<()> {
    let name = path.display().to_string();
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(ScantextError::rule_source(name, "not a regular file")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ScantextError::rule_source(name, "file not found"))
        }
        Err(e) => Err(ScantextError::rule_source(name, e.to_string())),
    }
}
