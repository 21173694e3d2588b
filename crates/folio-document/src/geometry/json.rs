// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Word geometry JSON, as written by an external text extractor:
//
//   { "pages": [ { "page_index": 0,
//                  "media_box": { "x0": 0, "y0": 0, "x1": 612, "y1": 792 },
//                  "words": [ { "x0": 72, "y0": 700, "x1": 110, "y1": 712,
//                               "text": "Chapter", "font_size": 12 } ],
//                  "rules": [] } ] }
//
// Coordinates use the PDF convention (origin bottom-left).

use std::path::Path;

use folio_core::error::{FolioError, Result};
use folio_core::{GeometrySource, PageGeometry};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Word geometry for every page of one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WordGeometryFile {
    pub pages: Vec<PageGeometry>,
}

impl WordGeometryFile {
    /// Load and validate a geometry file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let file = Self::from_json(&data)?;
        debug!(pages = file.pages.len(), "word geometry loaded");
        Ok(file)
    }

    /// Parse geometry JSON. Pages may appear in any order but must cover the
    /// indices `0..n` exactly once.
    pub fn from_json(data: &str) -> Result<Self> {
        let mut file: Self = serde_json::from_str(data)?;
        file.pages.sort_by_key(|page| page.page_index);
        for (expected, page) in file.pages.iter().enumerate() {
            if page.page_index != expected {
                return Err(FolioError::GeometryError(format!(
                    "page indices must run from 0 without gaps; found {} where {} was expected",
                    page.page_index, expected
                )));
            }
            if page.media_box.is_empty() {
                return Err(FolioError::GeometryError(format!(
                    "page {} has an empty media box",
                    expected + 1
                )));
            }
        }
        Ok(file)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replace every page's media and crop box with those of `boxes`
    /// (usually the PDF itself), keeping the extracted words and rules.
    pub fn with_page_boxes(mut self, boxes: &impl GeometrySource) -> Result<Self> {
        if boxes.page_count() != self.pages.len() {
            return Err(FolioError::GeometryError(format!(
                "word geometry covers {} pages but the document has {}",
                self.pages.len(),
                boxes.page_count()
            )));
        }
        for page in &mut self.pages {
            let source = boxes.page(page.page_index)?;
            page.media_box = source.media_box;
            page.crop_box = source.crop_box;
        }
        Ok(self)
    }
}

impl GeometrySource for WordGeometryFile {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, page_index: usize) -> Result<PageGeometry> {
        self.pages.page(page_index)
    }
}
