// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scantext-document — Everything Scantext hands off to the outside world.
//
// Drives the external rasterizers (`pdfimages`, `pdftoppm`) and OCR engines
// (`tesseract`, or `ocrs` in-process), owns the scratch directory the page
// images live in, and fingerprints the source document for run reports.

pub mod integrity;
pub mod ocr;
pub mod rasterize;
pub mod scratch;

pub use ocr::tesseract::TesseractEngine;
pub use ocr::{OcrEngine, OcrFailure};
pub use rasterize::{PdfImagesRasterizer, PdfToPpmRasterizer, RasterRequest, Rasterizer};
pub use scratch::ScratchDir;

#[cfg(feature = "ocrs")]
pub use ocr::ocrs::OcrsEngine;
