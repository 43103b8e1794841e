// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scantext extractor.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ScantextError;

/// Zero-based position of a page image among the enumerated images.
pub type PageIndex = usize;

/// One page image awaiting recognition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageJob {
    /// Assigned at enumeration time; unique within a run.
    pub index: PageIndex,
    /// Rasterized image of the page.
    pub image_path: PathBuf,
}

impl PageJob {
    pub fn new(index: PageIndex, image_path: impl Into<PathBuf>) -> Self {
        Self {
            index,
            image_path: image_path.into(),
        }
    }

    /// Assign contiguous indices `0..n` to `images`, preserving their order.
    pub fn enumerate<I, P>(images: I) -> Vec<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        images
            .into_iter()
            .enumerate()
            .map(|(index, path)| Self::new(index, path))
            .collect()
    }
}

/// Outcome of recognising one [`PageJob`]. Produced exactly once per job.
#[derive(Debug)]
pub struct PageResult {
    /// Index of the originating job.
    pub index: PageIndex,
    /// Recognised text, or the failure that prevented recognition.
    pub outcome: std::result::Result<Vec<u8>, ScantextError>,
}

impl PageResult {
    pub fn success(index: PageIndex, text: impl Into<Vec<u8>>) -> Self {
        Self {
            index,
            outcome: Ok(text.into()),
        }
    }

    pub fn failure(index: PageIndex, error: ScantextError) -> Self {
        Self {
            index,
            outcome: Err(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }
}

/// External tool used to turn the source document into page images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterizerKind {
    /// `pdfimages`: extracts the embedded scan images as-is.
    #[default]
    PdfImages,
    /// `pdftoppm`: renders each page at a fixed resolution.
    PdfToPpm,
}

impl RasterizerKind {
    /// Name of the executable driving this rasterizer.
    pub fn program(&self) -> &'static str {
        match self {
            Self::PdfImages => "pdfimages",
            Self::PdfToPpm => "pdftoppm",
        }
    }
}

impl std::str::FromStr for RasterizerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdfimages" => Ok(Self::PdfImages),
            "pdftoppm" => Ok(Self::PdfToPpm),
            other => Err(format!("unknown rasterizer `{other}` (expected pdfimages or pdftoppm)")),
        }
    }
}

/// OCR engine used to recognise page images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackend {
    /// The `tesseract` command-line tool.
    #[default]
    Tesseract,
    /// The in-process `ocrs` engine (requires the `ocrs` feature).
    Ocrs,
}

impl std::str::FromStr for OcrBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tesseract" => Ok(Self::Tesseract),
            "ocrs" => Ok(Self::Ocrs),
            other => Err(format!("unknown OCR engine `{other}` (expected tesseract or ocrs)")),
        }
    }
}
