// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rasterizer drivers — turn the source PDF into one image file per page.
//
// Both drivers shell out to poppler-utils. Before running them the document
// is opened with `lopdf` so that page bounds are checked against the real
// page count instead of surfacing as an obscure tool error.

use std::path::{Path, PathBuf};
use std::process::Command;

use lopdf::Document;
use tracing::{debug, info, instrument, warn};

use scantext_core::error::{Result, ScantextError};
use scantext_core::types::RasterizerKind;

/// File-name root for page images inside the output directory.
const IMAGE_ROOT: &str = "page";

/// What to rasterize and where to put it.
#[derive(Debug, Clone, Copy)]
pub struct RasterRequest<'a> {
    pub document: &'a Path,
    /// First page, 1-based.
    pub first_page: u32,
    /// Last page, inclusive; `None` means the end of the document.
    pub last_page: Option<u32>,
    pub output_dir: &'a Path,
}

/// Produces page images for a [`RasterRequest`].
pub trait Rasterizer: Send + Sync {
    fn name(&self) -> &str;

    /// Write one image per page into `request.output_dir`.
    ///
    /// Blocks until the tool exits. There is no timeout.
    fn rasterize(&self, request: &RasterRequest<'_>) -> Result<()>;
}

/// Build the rasterizer selected in the configuration.
pub fn rasterizer_for(kind: RasterizerKind, dpi: u32) -> Box<dyn Rasterizer> {
    match kind {
        RasterizerKind::PdfImages => Box::new(PdfImagesRasterizer::default()),
        RasterizerKind::PdfToPpm => Box::new(PdfToPpmRasterizer::new(dpi)),
    }
}

/// `pdfimages -tiff`: extracts the embedded scan images without resampling.
#[derive(Debug, Clone)]
pub struct PdfImagesRasterizer {
    program: PathBuf,
}

impl Default for PdfImagesRasterizer {
    fn default() -> Self {
        Self {
            program: PathBuf::from(RasterizerKind::PdfImages.program()),
        }
    }
}

impl PdfImagesRasterizer {
    fn command(&self, request: &RasterRequest<'_>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-tiff");
        page_range_args(&mut cmd, request);
        cmd.arg(request.document)
            .arg(request.output_dir.join(IMAGE_ROOT));
        cmd
    }
}

impl Rasterizer for PdfImagesRasterizer {
    fn name(&self) -> &str {
        "pdfimages"
    }

    #[instrument(skip_all, fields(document = %request.document.display(), first = request.first_page))]
    fn rasterize(&self, request: &RasterRequest<'_>) -> Result<()> {
        run_tool(&self.program, self.command(request))
    }
}

/// `pdftoppm -tiff -r DPI`: renders every page at a fixed resolution.
#[derive(Debug, Clone)]
pub struct PdfToPpmRasterizer {
    program: PathBuf,
    dpi: u32,
}

impl PdfToPpmRasterizer {
    pub fn new(dpi: u32) -> Self {
        Self {
            program: PathBuf::from(RasterizerKind::PdfToPpm.program()),
            dpi,
        }
    }

    fn command(&self, request: &RasterRequest<'_>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-tiff").arg("-r").arg(self.dpi.to_string());
        page_range_args(&mut cmd, request);
        cmd.arg(request.document)
            .arg(request.output_dir.join(IMAGE_ROOT));
        cmd
    }
}

impl Rasterizer for PdfToPpmRasterizer {
    fn name(&self) -> &str {
        "pdftoppm"
    }

    #[instrument(skip_all, fields(document = %request.document.display(), dpi = self.dpi))]
    fn rasterize(&self, request: &RasterRequest<'_>) -> Result<()> {
        run_tool(&self.program, self.command(request))
    }
}

fn page_range_args(cmd: &mut Command, request: &RasterRequest<'_>) {
    cmd.arg("-f").arg(request.first_page.to_string());
    if let Some(last) = request.last_page {
        cmd.arg("-l").arg(last.to_string());
    }
}

/// Run a poppler tool; on failure surface its stderr verbatim.
fn run_tool(program: &Path, mut cmd: Command) -> Result<()> {
    debug!(?cmd, "running rasterizer");
    let output = cmd.output().map_err(|e| {
        ScantextError::Rasterize(format!("cannot run {}: {e}", program.display()))
    })?;

    if output.status.success() {
        info!(program = %program.display(), "page images extracted");
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        Err(ScantextError::Rasterize(format!(
            "{} exited with {}",
            program.display(),
            output.status
        )))
    } else {
        Err(ScantextError::Rasterize(stderr.to_owned()))
    }
}

/// Number of pages in the PDF at `path`.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn page_count(path: impl AsRef<Path>) -> Result<u32> {
    let path = path.as_ref();
    let document = Document::load(path).map_err(|err| {
        ScantextError::PdfError(format!("failed to open {}: {err}", path.display()))
    })?;
    let pages = document.get_pages().len() as u32;
    debug!(pages, "PDF loaded");
    Ok(pages)
}

/// Check `first..=last` against a document of `pages` pages.
///
/// A last page beyond the end is clamped; a first page beyond the end is an
/// error. Returns the effective inclusive range.
pub fn resolve_page_range(pages: u32, first: u32, last: Option<u32>) -> Result<(u32, u32)> {
    if pages == 0 {
        return Err(ScantextError::PdfError("document has no pages".into()));
    }
    if first == 0 || first > pages {
        return Err(ScantextError::Config(format!(
            "first page {first} is outside the document (1-{pages})"
        )));
    }
    let last = match last {
        Some(last) if last > pages => {
            warn!(last, pages, "last page beyond end of document; clamping");
            pages
        }
        Some(last) if last < first => {
            return Err(ScantextError::Config(format!(
                "last page {last} is before first page {first}"
            )));
        }
        Some(last) => last,
        None => pages,
    };
    Ok((first, last))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn pdfimages_command_line() {
        let request = RasterRequest {
            document: Path::new("scan.pdf"),
            first_page: 3,
            last_page: Some(9),
            output_dir: Path::new("/tmp/work"),
        };
        let cmd = PdfImagesRasterizer::default().command(&request);
        assert_eq!(cmd.get_program(), "pdfimages");
        assert_eq!(
            args(&cmd),
            ["-tiff", "-f", "3", "-l", "9", "scan.pdf", "/tmp/work/page"]
        );
    }

    #[test]
    fn pdftoppm_command_line_without_last_page() {
        let request = RasterRequest {
            document: Path::new("scan.pdf"),
            first_page: 1,
            last_page: None,
            output_dir: Path::new("/tmp/work"),
        };
        let cmd = PdfToPpmRasterizer::new(200).command(&request);
        assert_eq!(cmd.get_program(), "pdftoppm");
        assert_eq!(
            args(&cmd),
            ["-tiff", "-r", "200", "-f", "1", "scan.pdf", "/tmp/work/page"]
        );
    }

    #[test]
    fn missing_tool_is_a_rasterize_error() {
        let rasterizer = PdfImagesRasterizer {
            program: PathBuf::from("/nonexistent/pdfimages"),
        };
        let request = RasterRequest {
            document: Path::new("scan.pdf"),
            first_page: 1,
            last_page: None,
            output_dir: Path::new("/tmp"),
        };
        let err = rasterizer.rasterize(&request).unwrap_err();
        assert!(matches!(err, ScantextError::Rasterize(_)), "{err}");
    }

    #[test]
    fn page_range_resolution() {
        assert_eq!(resolve_page_range(10, 1, None).unwrap(), (1, 10));
        assert_eq!(resolve_page_range(10, 4, Some(6)).unwrap(), (4, 6));
        assert_eq!(resolve_page_range(10, 4, Some(60)).unwrap(), (4, 10));
        assert!(resolve_page_range(10, 11, None).is_err());
        assert!(resolve_page_range(10, 5, Some(4)).is_err());
        assert!(resolve_page_range(0, 1, None).is_err());
    }

    #[test]
    fn non_pdf_is_rejected_by_page_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not.pdf");
        std::fs::write(&path, b"plain text, not a PDF").unwrap();
        assert!(matches!(page_count(&path), Err(ScantextError::PdfError(_))));
    }
}
