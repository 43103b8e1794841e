// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extraction driver — fan page images out to the worker pool and fold the
// results back into one filtered document.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use scantext_core::config::default_workers;
use scantext_core::error::{Result, ScantextError};
use scantext_core::types::{PageJob, PageResult};
use scantext_document::ocr::OcrEngine;
use scantext_filter::{FilterPipeline, RuleSet};

use crate::assemble::DocumentAssembler;
use crate::pool::{PoolSettings, WorkerPool};
use crate::reorder::ReorderBuffer;

/// Per-run settings for [`extract_text`].
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub language: String,
    pub workers: usize,
    /// Page number of the first image, for error messages.
    pub first_page: u32,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            language: "eng".into(),
            workers: default_workers(),
            first_page: 1,
        }
    }
}

/// The filtered document and how many pages went into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub text: Vec<u8>,
    pub pages: usize,
}

/// Recognise `images` in parallel and assemble them in order.
///
/// The first failed page, in page order, aborts the run: the pool is
/// cancelled and anything completed after it is discarded.
#[instrument(skip_all, fields(pages = images.len(), workers = options.workers))]
pub fn extract_text(
    images: Vec<PathBuf>,
    options: &ExtractOptions,
    line_filter: &FilterPipeline,
    document_filter: &FilterPipeline,
    engine: Arc<dyn OcrEngine>,
) -> Result<Extracted> {
    let settings = PoolSettings {
        workers: options.workers,
        language: options.language.clone(),
        first_page: options.first_page,
    };
    let pool = WorkerPool::start(PageJob::enumerate(images), engine, &settings)?;

    let mut assembler = DocumentAssembler::new(line_filter);
    let drained = drain_in_order(pool.results().iter(), &mut assembler);
    if drained.is_err() {
        pool.cancel();
    }
    pool.join();
    drained?;

    let pages = assembler.pages();
    let lines = assembler.lines();
    let text = assembler.finish(document_filter);
    info!(pages, lines, bytes = text.len(), "document assembled");
    Ok(Extracted { text, pages })
}

/// [`extract_text`] with compiled rules, writing the result to `sink`.
///
/// Nothing reaches the sink unless every page succeeded.
pub fn extract_and_filter<W: Write + ?Sized>(
    images: Vec<PathBuf>,
    options: &ExtractOptions,
    rules: RuleSet,
    engine: Arc<dyn OcrEngine>,
    sink: &mut W,
) -> Result<Extracted> {
    let (line_filter, document_filter) = rules.into_pipelines();
    let extracted = extract_text(images, options, &line_filter, &document_filter, engine)?;

    sink.write_all(&extracted.text)
        .and_then(|()| sink.flush())
        .map_err(ScantextError::OutputWrite)?;
    Ok(extracted)
}

/// Feed unordered results through a reorder buffer into `assembler`.
///
/// Returns the first error in page order. Once the stream ends the buffer
/// must be empty, otherwise a page was lost.
pub(crate) fn drain_in_order<I>(results: I, assembler: &mut DocumentAssembler<'_>) -> Result<()>
where
    I: IntoIterator<Item = PageResult>,
{
    let mut reorder = ReorderBuffer::new();

    for result in results {
        let mut ready = reorder.accept(result)?.into_iter();
        while let Some(page) = ready.next() {
            match page.outcome {
                Ok(text) => {
                    debug!(index = page.index, bytes = text.len(), "page released");
                    assembler.push_page(&text);
                }
                Err(err) => {
                    let mut discarded: Vec<_> = ready.map(|r| r.index).collect();
                    discarded.extend(reorder.pending_indices());
                    if !discarded.is_empty() {
                        warn!(
                            failed = page.index,
                            ?discarded,
                            "discarding pages completed after a failed page"
                        );
                    }
                    return Err(err);
                }
            }
        }
    }

    reorder.finish()
}
