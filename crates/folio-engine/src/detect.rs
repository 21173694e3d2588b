// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Main-text detection from word boxes.
//
// Headers and footers are removed by position (bands at the top and bottom of
// the page), footnotes by glyph height (words noticeably smaller than the
// page's median word). What survives is unioned into the main-text box.

use folio_core::config::DetectionConfig;
use folio_core::error::{FolioError, Result};
use folio_core::{CropCandidate, PageGeometry, Rect, WordBox};
use tracing::{debug, instrument, trace};

use crate::aggregate::median;

/// Words that belong to the main text block of `page`.
pub fn main_text_words<'a>(page: &'a PageGeometry, config: &DetectionConfig) -> Vec<&'a WordBox> {
    let heights: Vec<f64> = page.words.iter().map(WordBox::height).collect();
    let Some(median_height) = median(&heights) else {
        return Vec::new();
    };

    let media = page.media_box;
    let page_height = media.height();
    // Words must end below the header band and start above the footer band.
    let upper_limit = media.y1 - page_height * config.top_margin_fraction;
    let lower_limit = media.y0 + page_height * config.bottom_margin_fraction;
    let min_height = config.min_relative_word_height * median_height;

    page.words
        .iter()
        .filter(|word| {
            let rect = word.rect();
            rect.y0 > lower_limit && rect.y1 < upper_limit && word.height() >= min_height
        })
        .collect()
}

/// Bounding box of the main text on `page`, padded by the configured edge
/// margin.
///
/// Returns `None` when the page has no words or every word was filtered out;
/// the caller then keeps the page's original box.
#[instrument(skip_all, fields(page = page.page_index, words = page.words.len()))]
pub fn detect_main_text_box(page: &PageGeometry, config: &DetectionConfig) -> Option<Rect> {
    let kept = main_text_words(page, config);
    let raw = Rect::union_all(kept.iter().map(|word| word.rect()).collect::<Vec<_>>().iter())?;
    trace!(kept = kept.len(), %raw, "main-text words unioned");

    let padded = raw.expand(config.edge_margin).clamp_to(&page.media_box);
    debug!(%padded, "main-text box detected");
    Some(padded)
}

/// Like [`detect_main_text_box`], but reports an empty result as an error
/// carrying the page index.
pub fn detect_candidate(page: &PageGeometry, config: &DetectionConfig) -> Result<CropCandidate> {
    detect_main_text_box(page, config)
        .map(|bbox| CropCandidate {
            page_index: page.page_index,
            bbox,
        })
        .ok_or(FolioError::EmptyDetectionResult {
            page_index: page.page_index,
        })
}
