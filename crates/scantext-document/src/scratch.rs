// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scratch directory holding the rasterized page images of one run.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use scantext_core::error::Result;

/// Extensions (lower-case) the rasterizers are known to produce.
const IMAGE_EXTENSIONS: &[&str] = &["tif", "tiff", "png", "pbm", "pgm", "ppm"];

/// A temporary directory removed when dropped or closed.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create a fresh `scantext-*` directory under the system temp dir.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("scantext-").tempdir()?;
        debug!(path = %dir.path().display(), "scratch directory created");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Page images currently in the directory, in page order.
    pub fn page_images(&self) -> Result<Vec<PathBuf>> {
        list_page_images(self.path())
    }

    /// Remove the directory now, reporting any failure.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!(path = %path.display(), "scratch directory removed");
        Ok(())
    }
}

/// Best-effort removal of a scratch directory, for use from signal handlers
/// where the owning [`ScratchDir`] is out of reach.
pub fn remove_best_effort(path: &Path) {
    if let Err(e) = std::fs::remove_dir_all(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "failed to remove scratch directory");
        }
    }
}

/// Image files directly inside `dir`, in page order.
///
/// Rasterizers pad page numbers to a fixed width (three digits for
/// `pdfimages`) that longer documents outgrow, so images are ordered by the
/// trailing number of the file stem and then by name.
pub fn list_page_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if is_page_image(&path) {
            images.push(path);
        }
    }
    images.sort_by_cached_key(|path| page_sort_key(path));
    Ok(images)
}

/// `(trailing page number, file name)`; names without a number sort first.
fn page_sort_key(path: &Path) -> (Option<u64>, PathBuf) {
    let number = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| {
            let digits = stem.len() - stem.trim_end_matches(|c: char| c.is_ascii_digit()).len();
            stem[stem.len() - digits..].parse().ok()
        });
    (number, path.to_path_buf())
}

fn is_page_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_only_images_in_page_order() {
        let scratch = ScratchDir::new().unwrap();
        for name in ["page-010.tif", "page-002.TIF", "page-001.png", "notes.txt"] {
            std::fs::write(scratch.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(scratch.path().join("nested.tif")).unwrap();

        let names: Vec<_> = scratch
            .page_images()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["page-001.png", "page-002.TIF", "page-010.tif"]);
    }

    #[test]
    fn page_numbers_past_the_padding_width_stay_in_order() {
        let scratch = ScratchDir::new().unwrap();
        for name in ["page-999.tif", "page-1000.tif", "page-101.tif", "page-002.tif"] {
            std::fs::write(scratch.path().join(name), b"").unwrap();
        }

        let names: Vec<_> = scratch
            .page_images()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            ["page-002.tif", "page-101.tif", "page-999.tif", "page-1000.tif"]
        );
    }

    #[test]
    fn pdftoppm_style_names_sort_numerically() {
        let scratch = ScratchDir::new().unwrap();
        for name in ["page-10.tif", "page-9.tif", "page-100.tif"] {
            std::fs::write(scratch.path().join(name), b"").unwrap();
        }
        let names: Vec<_> = scratch
            .page_images()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["page-9.tif", "page-10.tif", "page-100.tif"]);
    }

    #[test]
    fn close_removes_the_directory() {
        let scratch = ScratchDir::new().unwrap();
        let path = scratch.path().to_path_buf();
        std::fs::write(path.join("page-000.tif"), b"II*").unwrap();
        scratch.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn best_effort_removal_ignores_missing_dirs() {
        let scratch = ScratchDir::new().unwrap();
        let path = scratch.path().to_path_buf();
        remove_best_effort(&path);
        assert!(!path.exists());
        remove_best_effort(&path);
    }
}
