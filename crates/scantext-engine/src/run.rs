// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end run: validate, compile rules, rasterize, recognise, filter.

use std::io::Write;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use scantext_core::config::ExtractConfig;
use scantext_core::error::{Result, ScantextError};
use scantext_core::types::OcrBackend;
use scantext_document::integrity::hash_file;
use scantext_document::ocr::OcrEngine;
use scantext_document::ocr::tesseract::TesseractEngine;
use scantext_document::rasterize::{RasterRequest, page_count, rasterizer_for, resolve_page_range};
use scantext_document::scratch::ScratchDir;
use scantext_filter::compile_files;

use crate::extract::{ExtractOptions, extract_and_filter};
use crate::report::ExtractionReport;

/// Construct the OCR engine selected in `config`.
pub fn build_engine(config: &ExtractConfig) -> Result<Arc<dyn OcrEngine>> {
    match config.engine {
        OcrBackend::Tesseract => Ok(Arc::new(TesseractEngine::new(config.tesseract.clone()))),
        #[cfg(feature = "ocrs")]
        OcrBackend::Ocrs => {
            let engine = scantext_document::ocr::ocrs::OcrsEngine::from_model_dir(
                config.model_dir.as_deref(),
            )?;
            Ok(Arc::new(engine))
        }
        #[cfg(not(feature = "ocrs"))]
        OcrBackend::Ocrs => Err(ScantextError::Config(
            "this build has no ocrs support; rebuild with `--features ocrs`".into(),
        )),
    }
}

/// Extract the text of `config.input` into `sink`.
///
/// Page images are written to `scratch`; the caller owns the directory so
/// it can still be removed if the run is interrupted.
#[instrument(skip_all, fields(input = %config.input.display()))]
pub fn run<W: Write + ?Sized>(
    config: &ExtractConfig,
    scratch: &ScratchDir,
    sink: &mut W,
) -> Result<ExtractionReport> {
    let started_at = Utc::now();
    config.validate()?;

    // Rules and engine are checked before the slow rasterization step.
    let rules = compile_files(&config.filters)?;
    let (line_rules, text_rules) = (rules.line.len(), rules.document.len());
    let engine = build_engine(config)?;

    let total = page_count(&config.input)?;
    let (first_page, last_page) = resolve_page_range(total, config.first_page, config.last_page)?;
    let source_sha256 = source_digest(config)?;

    let rasterizer = rasterizer_for(config.rasterizer, config.dpi);
    rasterizer.rasterize(&RasterRequest {
        document: &config.input,
        first_page,
        last_page: Some(last_page),
        output_dir: scratch.path(),
    })?;

    let images = scratch.page_images()?;
    if images.is_empty() {
        return Err(ScantextError::NoPages {
            source_name: config.input.display().to_string(),
        });
    }
    info!(
        images = images.len(),
        rasterizer = rasterizer.name(),
        first_page,
        last_page,
        "page images ready"
    );

    let options = ExtractOptions {
        language: config.language.clone(),
        workers: config.workers,
        first_page,
    };
    let extracted = extract_and_filter(images, &options, rules, engine, sink)?;

    Ok(ExtractionReport {
        run_id: Uuid::new_v4(),
        started_at,
        finished_at: Utc::now(),
        source: config.input.clone(),
        source_sha256,
        first_page,
        last_page,
        pages: extracted.pages,
        workers: config.workers,
        language: config.language.clone(),
        engine: config.engine,
        rasterizer: config.rasterizer,
        line_rules,
        text_rules,
        output_bytes: extracted.text.len(),
    })
}

/// Digest of the input for the run report; skipped when no report is wanted.
fn source_digest(config: &ExtractConfig) -> Result<Option<String>> {
    match config.report {
        Some(_) => hash_file(&config.input).map(Some),
        None => Ok(None),
    }
}
