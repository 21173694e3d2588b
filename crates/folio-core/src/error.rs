// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Folio.

use thiserror::Error;

/// Top-level error type for all Folio operations.
#[derive(Debug, Error)]
pub enum FolioError {
    // -- Session errors --
    #[error("invalid command: {0}")]
    InvalidCommandSyntax(String),

    #[error("session has exited; no further commands are accepted")]
    SessionExited,

    #[error("page {} is out of range (document has {page_count} pages)", .page_index + 1)]
    PageOutOfRange { page_index: usize, page_count: usize },

    // -- Geometry errors --
    #[error("no main-text words found on page {}", .page_index + 1)]
    EmptyDetectionResult { page_index: usize },

    #[error("crop region for page {} has no area after clamping", .page_index + 1)]
    EmptyRegion { page_index: usize },

    #[error("no template band has been captured yet")]
    MissingTemplate,

    // -- Collaborator errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("page geometry unavailable: {0}")]
    GeometryError(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FolioError>;
