// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// folio-document — File-facing collaborators of the cropping engine.
//
// Reads page boxes from PDFs and writes crop boxes back (lopdf), loads word
// geometry produced by an external text extractor, scales page rasters onto
// the display canvas, and fingerprints documents for crop reports.

pub mod geometry;
pub mod image;
pub mod integrity;
pub mod pdf;

// Re-export the primary structs so callers can use `folio_document::PdfReader` etc.
pub use geometry::json::WordGeometryFile;
pub use crate::image::processor::ImageDirectory;
pub use pdf::reader::PdfReader;
pub use pdf::writer::PdfCropWriter;
