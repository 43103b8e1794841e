// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-process OCR backend built on the `ocrs` crate, a pure-Rust OCR engine
// backed by neural network models executed via `rten`.
//
// # Feature Gate
//
// Only available with the `ocrs` feature:
//
// ```toml
// scantext-document = { path = "crates/scantext-document", features = ["ocrs"] }
// ```
//
// # Model Setup
//
// Two model files are required:
//
// - **Detection model** (`text-detection.rten`): locates text regions.
// - **Recognition model** (`text-recognition.rten`): decodes characters.
//
// Running `ocrs-cli` once downloads both into `$XDG_CACHE_HOME/ocrs`
// (typically `~/.cache/ocrs`), which is where we look by default.
//
// ocrs only recognises Latin script. The language code is accepted for
// interface compatibility with tesseract and otherwise ignored.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use ocrs::{ImageSource, OcrEngine as OcrsBackend, OcrEngineParams};
use rten::Model;
use tracing::{debug, info, instrument, warn};

use scantext_core::error::{Result, ScantextError};

use super::{OcrEngine, OcrFailure};

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Default directory for cached model files: `$XDG_CACHE_HOME/ocrs`, falling
/// back to `~/.cache/ocrs`.
fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Where to find the two model files.
#[derive(Debug, Clone)]
pub struct OcrsConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl Default for OcrsConfig {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrsConfig {
    /// Expect `text-detection.rten` and `text-recognition.rten` in `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// Verify that both model files exist.
    pub fn validate(&self) -> Result<()> {
        for path in [&self.detection_model_path, &self.recognition_model_path] {
            if !path.exists() {
                return Err(ScantextError::Config(format!(
                    "OCR model not found at {}; run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// OCR engine running the `ocrs` models inside the process.
///
/// Model loading is the expensive step; one engine is built per run and
/// shared by all workers.
pub struct OcrsEngine {
    engine: OcrsBackend,
    language_warned: AtomicBool,
}

impl OcrsEngine {
    /// Load the models named in `config`.
    #[instrument(skip_all, fields(
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: OcrsConfig) -> Result<Self> {
        config.validate()?;

        info!("Loading OCR detection model");
        let detection_model = Model::load_file(&config.detection_model_path).map_err(|err| {
            ScantextError::Config(format!(
                "failed to load detection model from {}: {err}",
                config.detection_model_path.display()
            ))
        })?;

        info!("Loading OCR recognition model");
        let recognition_model =
            Model::load_file(&config.recognition_model_path).map_err(|err| {
                ScantextError::Config(format!(
                    "failed to load recognition model from {}: {err}",
                    config.recognition_model_path.display()
                ))
            })?;

        let engine = OcrsBackend::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| ScantextError::Config(format!("failed to initialise OCR engine: {err}")))?;

        info!("OCR engine initialised");
        Ok(Self {
            engine,
            language_warned: AtomicBool::new(false),
        })
    }

    /// Load models from `dir`, or from the default cache when `None`.
    pub fn from_model_dir(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::new(OcrsConfig::from_dir(dir)),
            None => Self::new(OcrsConfig::default()),
        }
    }
}

impl OcrEngine for OcrsEngine {
    fn name(&self) -> &str {
        "ocrs"
    }

    #[instrument(skip_all, fields(image = %image.display()))]
    fn recognize(&self, image: &Path, language: &str) -> std::result::Result<Vec<u8>, OcrFailure> {
        if language != "eng" && !self.language_warned.swap(true, Ordering::Relaxed) {
            warn!(language, "ocrs recognises Latin script only; language is ignored");
        }

        let rgb = image::open(image)
            .map_err(|err| OcrFailure::new(format!("cannot open {}: {err}", image.display())))?
            .into_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
            OcrFailure::new(format!("failed to create image source ({width}x{height}): {err}"))
        })?;

        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| OcrFailure::new(format!("OCR preprocessing failed: {err}")))?;

        let text = self
            .engine
            .get_text(&input)
            .map_err(|err| OcrFailure::new(format!("OCR text recognition failed: {err}")))?;

        debug!(lines = text.lines().count(), "page recognised");
        Ok(text.into_bytes())
    }
}
