// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Folio: page geometry supplied by the text-extraction
// collaborator, crop candidates and results, and the adjustment state carried
// by interactive sessions.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::diagnostics::PageDiagnostic;
use crate::geometry::Rect;

/// Unique identifier for one cropping run or interactive session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One word (or glyph span) detected on a page by the text extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    #[serde(default)]
    pub text: String,
    /// Font size in points, when the extractor reports one.
    #[serde(default)]
    pub font_size: Option<f64>,
}

impl WordBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64, text: impl Into<String>) -> Self {
        Self {
            x0,
            y0,
            x1,
            y1,
            text: text.into(),
            font_size: None,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_corners((self.x0, self.y0), (self.x1, self.y1))
    }

    /// Glyph height of the word, used as a proxy for its font size.
    pub fn height(&self) -> f64 {
        (self.y1 - self.y0).abs()
    }
}

/// Everything the engine knows about one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Zero-based page index.
    pub page_index: usize,
    /// Full physical page rectangle.
    pub media_box: Rect,
    /// The page's original crop box, if it differs from the media box.
    #[serde(default)]
    pub crop_box: Option<Rect>,
    /// Detected words; may be empty.
    #[serde(default)]
    pub words: Vec<WordBox>,
    /// Horizontal rules (separator lines) drawn on the page.
    #[serde(default)]
    pub rules: Vec<Rect>,
}

impl PageGeometry {
    /// A page with no text, only a media box.
    pub fn blank(page_index: usize, media_box: Rect) -> Self {
        Self {
            page_index,
            media_box,
            crop_box: None,
            words: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn with_words(mut self, words: Vec<WordBox>) -> Self {
        self.words = words;
        self
    }

    /// The untouched rectangle every adjustment is computed from.
    pub fn base_box(&self) -> Rect {
        self.crop_box.unwrap_or(self.media_box)
    }

    pub fn height(&self) -> f64 {
        self.media_box.height()
    }

    pub fn parity(&self) -> PageParity {
        PageParity::of(self.page_index)
    }
}

/// Even/odd page index, the usual grouping key for facing pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PageParity {
    Even,
    Odd,
}

impl PageParity {
    pub fn of(page_index: usize) -> Self {
        if page_index % 2 == 0 {
            Self::Even
        } else {
            Self::Odd
        }
    }
}

/// A per-page main-text rectangle proposed by detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropCandidate {
    pub page_index: usize,
    pub bbox: Rect,
}

/// One edge of the crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'l' => Some(Self::Left),
            'r' => Some(Self::Right),
            't' => Some(Self::Top),
            'b' => Some(Self::Bottom),
            _ => None,
        }
    }
}

/// Cumulative inward deltas (in points) for each edge.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MarginAdjustment {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl MarginAdjustment {
    pub const ZERO: Self = Self {
        left: 0.0,
        right: 0.0,
        top: 0.0,
        bottom: 0.0,
    };

    /// Accumulate `value` onto one edge.
    pub fn add(&mut self, side: Side, value: f64) {
        match side {
            Side::Left => self.left += value,
            Side::Right => self.right += value,
            Side::Top => self.top += value,
            Side::Bottom => self.bottom += value,
        }
    }

    pub fn get(&self, side: Side) -> f64 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
            Side::Top => self.top,
            Side::Bottom => self.bottom,
        }
    }

    /// Edge-wise sum of two adjustments.
    pub fn combined(&self, other: &Self) -> Self {
        Self {
            left: self.left + other.left,
            right: self.right + other.right,
            top: self.top + other.top,
            bottom: self.bottom + other.bottom,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

/// Adjustments keyed by zero-based page index, for non-uniform corrections.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerPageAdjustment(HashMap<usize, MarginAdjustment>);

impl PerPageAdjustment {
    pub fn new() -> Self {
        Self::default()
    }

    /// The adjustment for `page_index`, zero when none has been recorded.
    pub fn get(&self, page_index: usize) -> MarginAdjustment {
        self.0.get(&page_index).copied().unwrap_or_default()
    }

    pub fn add(&mut self, page_index: usize, side: Side, value: f64) {
        self.0.entry(page_index).or_default().add(side, value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// The complete adjustment state of an interactive session: uniform deltas,
/// per-page deltas, and the horizontal shift applied to odd pages.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AdjustmentSet {
    pub global: MarginAdjustment,
    pub per_page: PerPageAdjustment,
    pub odd_offset: f64,
}

impl AdjustmentSet {
    /// Global and per-page deltas summed for one page.
    pub fn for_page(&self, page_index: usize) -> MarginAdjustment {
        self.global.combined(&self.per_page.get(page_index))
    }

    pub fn is_zero(&self) -> bool {
        self.global.is_zero() && self.per_page.is_empty() && self.odd_offset == 0.0
    }
}

/// The final rectangle to apply as a page's crop box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropResult {
    pub page_index: usize,
    pub crop_box: Rect,
}

/// Crop assignments for every page of a document plus the per-page
/// diagnostics produced while computing them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CropBatch {
    /// One result per page, in page order.
    pub results: Vec<CropResult>,
    pub diagnostics: Vec<PageDiagnostic>,
}

impl CropBatch {
    pub fn page_count(&self) -> usize {
        self.results.len()
    }

    /// Number of pages whose crop box was actually computed (not skipped).
    pub fn cropped_count(&self) -> usize {
        let skipped: HashSet<usize> = self.diagnostics.iter().map(|d| d.page_index).collect();
        self.results
            .iter()
            .filter(|r| !skipped.contains(&r.page_index))
            .count()
    }

    pub fn result_for(&self, page_index: usize) -> Option<&CropResult> {
        self.results.iter().find(|r| r.page_index == page_index)
    }
}

/// A persisted summary of one cropping run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropReport {
    pub session_id: SessionId,
    /// File name of the source document.
    pub source_name: String,
    /// SHA-256 of the source document bytes.
    pub source_sha256: String,
    pub generated_at: DateTime<Utc>,
    /// Which strategy produced the crops (e.g. "auto", "uniform", "manual").
    pub strategy: String,
    pub pages: Vec<CropResult>,
    pub diagnostics: Vec<PageDiagnostic>,
}

impl CropReport {
    pub fn new(
        session_id: SessionId,
        source_name: String,
        source_sha256: String,
        strategy: impl Into<String>,
        batch: &CropBatch,
    ) -> Self {
        Self {
            session_id,
            source_name,
            source_sha256,
            generated_at: Utc::now(),
            strategy: strategy.into(),
            pages: batch.results.clone(),
            diagnostics: batch.diagnostics.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjustments_accumulate_additively() {
        let mut twice = MarginAdjustment::ZERO;
        twice.add(Side::Left, 5.0);
        twice.add(Side::Left, 5.0);

        let mut once = MarginAdjustment::ZERO;
        once.add(Side::Left, 10.0);

        assert_eq!(twice, once);
    }

    #[test]
    fn per_page_adjustment_defaults_to_zero() {
        let mut per_page = PerPageAdjustment::new();
        per_page.add(4, Side::Right, 4.0);

        assert_eq!(per_page.get(4).right, 4.0);
        assert!(per_page.get(3).is_zero());
        assert_eq!(per_page.len(), 1);
    }

    #[test]
    fn pages_with_diagnostics_are_not_counted_as_cropped() {
        let media = Rect::new(0.0, 0.0, 600.0, 800.0);
        let results = (0..4)
            .map(|page_index| CropResult {
                page_index,
                crop_box: media,
            })
            .collect();
        let skipped = |page_index| {
            PageDiagnostic::from_error(page_index, &crate::FolioError::EmptyRegion { page_index })
        };
        let batch = CropBatch {
            results,
            diagnostics: vec![skipped(1), skipped(3), skipped(3)],
        };

        assert_eq!(batch.page_count(), 4);
        assert_eq!(batch.cropped_count(), 2);
    }

    #[test]
    fn parity_of_page_indices() {
        assert_eq!(PageParity::of(0), PageParity::Even);
        assert_eq!(PageParity::of(1), PageParity::Odd);
        assert_eq!(PageParity::of(2), PageParity::Even);
        assert_eq!(PageParity::of(3), PageParity::Odd);
    }

    #[test]
    fn base_box_falls_back_to_media_box() {
        let media = Rect::new(0.0, 0.0, 600.0, 800.0);
        let mut page = PageGeometry::blank(0, media);
        assert_eq!(page.base_box(), media);

        let crop = Rect::new(10.0, 10.0, 590.0, 790.0);
        page.crop_box = Some(crop);
        assert_eq!(page.base_box(), crop);
    }

    #[test]
    fn page_geometry_deserialises_with_defaults() {
        let json = r#"{"page_index": 2, "media_box": {"x0": 0, "y0": 0, "x1": 612, "y1": 792}}"#;
        let page: PageGeometry = serde_json::from_str(json).expect("valid geometry JSON");
        assert_eq!(page.page_index, 2);
        assert!(page.words.is_empty());
        assert!(page.rules.is_empty());
        assert!(page.crop_box.is_none());
    }
}
