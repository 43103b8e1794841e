// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments and their merge onto `ExtractConfig`.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use scantext_core::config::ExtractConfig;
use scantext_core::error::Result;
use scantext_core::types::{OcrBackend, RasterizerKind};

/// Extract text from the scanned PDF document FILE; output goes to stdout.
#[derive(Debug, Parser)]
#[command(name = "scantext", version, about, long_about = None)]
pub struct Args {
    /// Scanned PDF document
    pub file: Option<PathBuf>,

    /// First page number [default: 1]
    #[arg(long, value_name = "N")]
    pub first: Option<u32>,

    /// Last page number [default: last page of the document]
    #[arg(long, value_name = "N")]
    pub last: Option<u32>,

    /// Filter specification file; may be given multiple times
    #[arg(long = "filter", value_name = "FILE")]
    pub filters: Vec<PathBuf>,

    /// Document language [default: eng]
    #[arg(long = "lang", value_name = "LANG")]
    pub language: Option<String>,

    /// Number of parallel OCR workers [default: number of CPUs]
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Page image source: pdfimages or pdftoppm [default: pdfimages]
    #[arg(long, value_name = "TOOL")]
    pub rasterizer: Option<RasterizerKind>,

    /// Render resolution for pdftoppm [default: 300]
    #[arg(long, value_name = "DPI")]
    pub dpi: Option<u32>,

    /// OCR engine: tesseract or ocrs [default: tesseract]
    #[arg(long, value_name = "ENGINE")]
    pub engine: Option<OcrBackend>,

    /// Path of the tesseract executable
    #[arg(long, value_name = "PATH")]
    pub tesseract: Option<PathBuf>,

    /// Directory containing the ocrs model files
    #[arg(long, value_name = "DIR")]
    pub model_dir: Option<PathBuf>,

    /// Write the text to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write a JSON run report to FILE
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Load settings from a JSON file; flags override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Build the run configuration: defaults, then `--config`, then flags.
    pub fn into_config(self) -> Result<ExtractConfig> {
        let mut config = match &self.config {
            Some(path) => ExtractConfig::load(path)?,
            None => ExtractConfig::default(),
        };

        if let Some(file) = self.file {
            config.input = file;
        }
        if let Some(first) = self.first {
            config.first_page = first;
        }
        if self.last.is_some() {
            config.last_page = self.last;
        }
        if !self.filters.is_empty() {
            config.filters = self.filters;
        }
        if let Some(language) = self.language {
            config.language = language;
        }
        if let Some(jobs) = self.jobs {
            config.workers = jobs;
        }
        if let Some(rasterizer) = self.rasterizer {
            config.rasterizer = rasterizer;
        }
        if let Some(dpi) = self.dpi {
            config.dpi = dpi;
        }
        if let Some(engine) = self.engine {
            config.engine = engine;
        }
        if let Some(tesseract) = self.tesseract {
            config.tesseract = tesseract;
        }
        if self.model_dir.is_some() {
            config.model_dir = self.model_dir;
        }
        if self.output.is_some() {
            config.output = self.output;
        }
        if self.report.is_some() {
            config.report = self.report;
        }
        Ok(config)
    }

    /// Default tracing filter for the `-v` count.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
