// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scantext-engine — Parallel OCR with strictly ordered reassembly.
//
// A fixed pool of worker threads recognises page images in any order; the
// consumer side restores page order with a min-heap, filters each page's
// lines as it is released, and filters the whole document once at the end.

pub mod assemble;
pub mod extract;
pub mod pool;
pub mod reorder;
pub mod report;
pub mod run;

pub use assemble::DocumentAssembler;
pub use extract::{ExtractOptions, Extracted, extract_and_filter, extract_text};
pub use pool::{PoolSettings, WorkerPool};
pub use reorder::ReorderBuffer;
pub use report::ExtractionReport;
pub use run::{build_engine, run};
