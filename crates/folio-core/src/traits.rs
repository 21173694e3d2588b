// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Collaborator seams. The engine never opens or writes files itself: page
// geometry comes in through `GeometrySource` and finished crops go out through
// `CropSink`.

use crate::error::{FolioError, Result};
use crate::types::{CropBatch, PageGeometry};

/// Supplies per-page geometry (media box and word boxes).
pub trait GeometrySource {
    /// Number of pages in the document. Zero is valid.
    fn page_count(&self) -> usize;

    /// Geometry of the page at zero-based `page_index`.
    fn page(&self, page_index: usize) -> Result<PageGeometry>;

    /// Geometry of every page, in page order.
    fn pages(&self) -> Result<Vec<PageGeometry>> {
        (0..self.page_count()).map(|index| self.page(index)).collect()
    }
}

/// Persists a finished set of crop assignments.
pub trait CropSink {
    /// Store crop boxes for all pages of `batch`. Called once per apply cycle.
    fn save(&mut self, batch: &CropBatch) -> Result<()>;
}

/// A sink that keeps every saved batch in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub saved: Vec<CropBatch>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&CropBatch> {
        self.saved.last()
    }
}

impl CropSink for RecordingSink {
    fn save(&mut self, batch: &CropBatch) -> Result<()> {
        self.saved.push(batch.clone());
        Ok(())
    }
}

/// Geometry held in memory, e.g. already parsed by a caller.
impl GeometrySource for Vec<PageGeometry> {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page(&self, page_index: usize) -> Result<PageGeometry> {
        self.get(page_index)
            .cloned()
            .ok_or(FolioError::PageOutOfRange {
                page_index,
                page_count: self.len(),
            })
    }
}
