// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Actionable hints for command-line users.
//
// Every error is reported once as `ERROR: <message>`; the hint printed after
// it says what to try next. Exit codes separate bad input from defects.

use crate::error::ScantextError;

/// Exit status for errors caused by input, tools or environment.
pub const EXIT_FAILURE: i32 = 1;

/// Exit status for broken engine invariants.
pub const EXIT_INTERNAL: i32 = 2;

/// A user-facing rendering of a [`ScantextError`].
#[derive(Debug, Clone)]
pub struct HumanError {
    /// The error itself, as printed after `ERROR:`.
    pub message: String,
    /// What the user should try, if anything useful can be said.
    pub suggestion: Option<String>,
    /// Process exit status.
    pub exit_code: i32,
}

/// Convert an error into the message, hint and exit code shown to the user.
pub fn humanize_error(err: &ScantextError) -> HumanError {
    let suggestion = match err {
        ScantextError::Rasterize(_) => Some(
            "Check that poppler-utils (pdfimages / pdftoppm) is installed and the file is a readable PDF.",
        ),
        ScantextError::NoPages { .. } => Some(
            "The page range may contain no scanned images; try `--rasterizer pdftoppm` to render pages instead.",
        ),
        ScantextError::PdfError(_) => Some("The file may be damaged or not a PDF."),
        ScantextError::Ocr { .. } => Some(
            "Check that tesseract is installed and the language data for `--lang` is available.",
        ),
        ScantextError::RuleSpec { .. } => Some("Fix the filter file and run again."),
        ScantextError::OutputWrite(_) => Some("Check free space and permissions of the output destination."),
        ScantextError::Internal(_) => Some("This is a bug in scantext; please report it with the command line used."),
        ScantextError::Config(_) => Some("Run with --help to see the accepted options."),
        ScantextError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
            Some("A file or program could not be found; check the path and your PATH.")
        }
        ScantextError::Interrupted
        | ScantextError::Io(_)
        | ScantextError::Serialization(_) => None,
    };

    HumanError {
        message: err.to_string(),
        suggestion: suggestion.map(str::to_owned),
        exit_code: if err.is_internal() {
            EXIT_INTERNAL
        } else {
            EXIT_FAILURE
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ocr_failure_keeps_page_number() {
        let human = humanize_error(&ScantextError::Ocr {
            page: 3,
            message: "Failed loading language 'xyz'".into(),
        });
        assert_eq!(human.message, "(page 3) Failed loading language 'xyz'");
        assert_eq!(human.exit_code, EXIT_FAILURE);
        assert!(human.suggestion.unwrap().contains("tesseract"));
    }

    #[test]
    fn internal_errors_use_distinct_exit_code() {
        let human = humanize_error(&ScantextError::Internal("reorder gap".into()));
        assert_eq!(human.exit_code, EXIT_INTERNAL);
    }

    #[test]
    fn interrupt_has_no_hint() {
        let human = humanize_error(&ScantextError::Interrupted);
        assert_eq!(human.message, "Interrupted");
        assert!(human.suggestion.is_none());
    }
}
