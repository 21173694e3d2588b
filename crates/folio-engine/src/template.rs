// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Template band capture and matching.
//
// A band is a full-width horizontal strip of a display-scaled page image,
// captured around the row the user clicked. On later pages the band is
// located with normalized cross-correlation and the matched row becomes the
// proposed crop position.

use folio_core::error::{FolioError, Result};
use image::GrayImage;
use image::imageops;
use imageproc::template_matching::{MatchTemplateMethod, find_extremes, match_template};
use tracing::{debug, instrument};

/// A horizontal image strip used as a reference pattern.
#[derive(Debug, Clone)]
pub struct TemplateBand {
    patch: GrayImage,
    /// First image row of the strip on the page it was captured from.
    source_y: u32,
    /// Row of the click inside the strip.
    center_offset: u32,
}

/// Where a band was found on a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandMatch {
    /// Image row corresponding to the captured click row.
    pub center_y: u32,
    /// Normalized correlation score of the best match, at most 1.
    pub score: f32,
}

impl TemplateBand {
    /// Capture the strip of rows `[center_y - half_height, center_y + half_height)`
    /// from `image`, moved inward where it would cross the top or bottom
    /// edge.
    pub fn capture(image: &GrayImage, center_y: u32, half_height: u32) -> Result<Self> {
        let (width, height) = image.dimensions();
        let band_height = half_height.saturating_mul(2);
        if band_height == 0 || band_height > height || width == 0 {
            return Err(FolioError::ImageError(format!(
                "cannot capture a {band_height}px band from a {width}x{height} image"
            )));
        }

        let center_y = center_y.min(height - 1);
        let top = center_y.saturating_sub(half_height).min(height - band_height);
        let patch = imageops::crop_imm(image, 0, top, width, band_height).to_image();
        debug!(top, band_height, "template band captured");

        Ok(Self {
            patch,
            source_y: top,
            center_offset: center_y - top,
        })
    }

    pub fn patch(&self) -> &GrayImage {
        &self.patch
    }

    pub fn source_y(&self) -> u32 {
        self.source_y
    }

    /// Find the best match of the band on `image`.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn locate(&self, image: &GrayImage) -> Result<BandMatch> {
        let (band_width, band_height) = self.patch.dimensions();
        if image.width() < band_width || image.height() < band_height {
            return Err(FolioError::ImageError(format!(
                "page image {}x{} is smaller than the {band_width}x{band_height} band",
                image.width(),
                image.height()
            )));
        }

        let scores = match_template(
            image,
            &self.patch,
            MatchTemplateMethod::CrossCorrelationNormalized,
        );
        let extremes = find_extremes(&scores);
        let (_, best_top) = extremes.max_value_location;

        let found = BandMatch {
            center_y: best_top + self.center_offset,
            score: extremes.max_value,
        };
        debug!(center_y = found.center_y, score = found.score, "band located");
        Ok(found)
    }
}
