// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable diagnostics.
//
// Every error is mapped to a plain message with a concrete suggestion. The
// severity taxonomy decides how far an error reaches: a single command, a
// single page, the predict sub-mode, or the whole run.

use serde::{Deserialize, Serialize};

use crate::error::FolioError;

/// How far the effect of an error reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Rejected input; the session keeps its state and continues.
    Recoverable,
    /// The page keeps its original box; the batch continues.
    PageSkipped,
    /// Prediction is unavailable; the user places the crop by hand.
    ModeFallback,
    /// The run cannot continue.
    Fatal,
}

/// A human-readable error with a plain message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain summary (shown first).
    pub message: String,
    /// What the user should try next.
    pub suggestion: String,
    pub severity: Severity,
}

/// A degraded outcome attached to one page of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDiagnostic {
    pub page_index: usize,
    pub severity: Severity,
    pub message: String,
}

impl PageDiagnostic {
    pub fn from_error(page_index: usize, err: &FolioError) -> Self {
        Self {
            page_index,
            severity: humanize_error(err).severity,
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for PageDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "page {}: {} ({:?})",
            self.page_index + 1,
            self.message,
            self.severity
        )
    }
}

/// Convert a `FolioError` into a `HumanError`.
pub fn humanize_error(err: &FolioError) -> HumanError {
    match err {
        FolioError::InvalidCommandSyntax(detail) => HumanError {
            message: format!("That command was not understood: {detail}"),
            suggestion: "Use 'l5', 'r -2.5', 'o10' for all pages, '5r4' for a single page, \
                         'reset', or 'exit'."
                .into(),
            severity: Severity::Recoverable,
        },

        FolioError::SessionExited => HumanError {
            message: "The session has already ended.".into(),
            suggestion: "Start a new session to make further adjustments.".into(),
            severity: Severity::Recoverable,
        },

        FolioError::PageOutOfRange {
            page_index,
            page_count,
        } => HumanError {
            message: format!("There is no page {}.", page_index + 1),
            suggestion: format!("Choose a page between 1 and {page_count}."),
            severity: Severity::Recoverable,
        },

        FolioError::EmptyDetectionResult { page_index } => HumanError {
            message: format!("No body text was found on page {}.", page_index + 1),
            suggestion: "The page keeps its original size. Image-only pages are expected here."
                .into(),
            severity: Severity::PageSkipped,
        },

        FolioError::EmptyRegion { page_index } => HumanError {
            message: format!(
                "The crop for page {} would leave nothing visible.",
                page_index + 1
            ),
            suggestion: "The page keeps its original size. Reduce the margin adjustments.".into(),
            severity: Severity::PageSkipped,
        },

        FolioError::MissingTemplate => HumanError {
            message: "No reference band has been captured, so the crop cannot be predicted."
                .into(),
            suggestion: "Click the crop position on this page by hand.".into(),
            severity: Severity::ModeFallback,
        },

        FolioError::PdfError(detail) => HumanError {
            message: "The PDF could not be read or written.".into(),
            suggestion: format!("Check that the file is a valid, unencrypted PDF. ({detail})"),
            severity: Severity::Fatal,
        },

        FolioError::ImageError(detail) => HumanError {
            message: "A page image could not be loaded.".into(),
            suggestion: format!("Re-render the page images and try again. ({detail})"),
            severity: Severity::Fatal,
        },

        FolioError::GeometryError(detail) => HumanError {
            message: "The word positions for this document could not be loaded.".into(),
            suggestion: format!("Re-run the text extractor on the same PDF. ({detail})"),
            severity: Severity::Fatal,
        },

        FolioError::InvalidConfig(detail) => HumanError {
            message: "The configuration is not valid.".into(),
            suggestion: format!("Fix the configuration file and try again. ({detail})"),
            severity: Severity::Fatal,
        },

        FolioError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "A file could not be found.".into(),
                suggestion: "Check the path and try again.".into(),
                severity: Severity::Fatal,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "Folio is not allowed to access a file.".into(),
                suggestion: "Check the file permissions or choose another output location."
                    .into(),
                severity: Severity::Fatal,
            },
            _ => HumanError {
                message: "A file operation failed.".into(),
                suggestion: format!("Try again. ({io_err})"),
                severity: Severity::Fatal,
            },
        },

        FolioError::Serialization(detail) => HumanError {
            message: "A data file is malformed.".into(),
            suggestion: format!("Check the JSON syntax. ({detail})"),
            severity: Severity::Fatal,
        },
    }
}
