// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Crop policy: turns a base rectangle plus adjustments (or a single split
// ratio) into the final crop box for one page, always clamped to the page's
// media box.

use folio_core::config::SplitMode;
use folio_core::error::{FolioError, Result};
use folio_core::{MarginAdjustment, Rect};
use tracing::trace;

/// Compute the crop box for one page.
///
/// `adjustment` is applied as inward deltas from `base`: left and right move
/// the vertical edges towards the centre, top lowers the top edge and bottom
/// raises the bottom edge. Odd pages are then shifted horizontally by
/// `odd_offset`. The result is intersected with `media`.
///
/// Fails with [`FolioError::EmptyRegion`] if nothing of the page would remain.
pub fn compute_crop_box(
    page_index: usize,
    media: &Rect,
    base: &Rect,
    adjustment: &MarginAdjustment,
    odd_offset: f64,
    is_odd_page: bool,
) -> Result<Rect> {
    let mut adjusted = Rect::new(
        base.x0 + adjustment.left,
        base.y0 + adjustment.bottom,
        base.x1 - adjustment.right,
        base.y1 - adjustment.top,
    );
    if is_odd_page {
        adjusted = adjusted.shift_x(odd_offset);
    }
    trace!(page = page_index, %adjusted, "adjusted before clamping");

    if adjusted.is_empty() {
        return Err(FolioError::EmptyRegion { page_index });
    }
    adjusted
        .intersection(media)
        .ok_or(FolioError::EmptyRegion { page_index })
}

/// Keep one horizontal slice of `media`, split at `ratio` of its height.
///
/// With `cut_bottom` the split line lies `ratio * height` above the bottom
/// edge, otherwise `ratio * height` below the top edge. `keep_top` keeps the
/// part above the line, otherwise the part below it. The ratio is clamped to
/// `[0, 1]`.
pub fn split_by_ratio(page_index: usize, media: &Rect, ratio: f64, mode: SplitMode) -> Result<Rect> {
    let ratio = ratio.clamp(0.0, 1.0);
    let height = media.height();
    let split = if mode.cut_bottom {
        media.y0 + height * ratio
    } else {
        media.y1 - height * ratio
    };

    let kept = if mode.keep_top {
        Rect::new(media.x0, split, media.x1, media.y1)
    } else {
        Rect::new(media.x0, media.y0, media.x1, split)
    };
    if kept.is_empty() {
        return Err(FolioError::EmptyRegion { page_index });
    }
    Ok(kept)
}
