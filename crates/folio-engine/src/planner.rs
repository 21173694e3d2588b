// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch planning: compute a crop box for every page of a document.
//
// Pages are independent, so each batch is computed with rayon and collected
// back in page order. A page that cannot be cropped keeps its original box
// and contributes a diagnostic; it never aborts the batch.

use std::collections::BTreeMap;

use folio_core::config::{AggregationConfig, DetectionConfig, FootnoteConfig, Grouping, SplitMode};
use folio_core::diagnostics::PageDiagnostic;
use folio_core::error::{FolioError, Result};
use folio_core::{AdjustmentSet, CropBatch, CropResult, PageGeometry, PageParity, Rect};
use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::aggregate::aggregate_by_group;
use crate::detect::detect_candidate;
use crate::footnote::detect_footnote_boundary;
use crate::policy::{compute_crop_box, split_by_ratio};

/// How the crop boxes of a batch are derived.
#[derive(Debug, Clone, PartialEq)]
pub enum CropStrategy {
    /// Every page is cropped to its own detected main-text box.
    PerPage(DetectionConfig),
    /// Detection on a leading sample, median box per group applied to all
    /// pages.
    Uniform {
        detection: DetectionConfig,
        aggregation: AggregationConfig,
    },
    /// Everything below the footnote boundary is cut.
    Footnotes(FootnoteConfig),
    /// One split ratio per page; pages beyond the list stay unchanged.
    Ratios { ratios: Vec<f64>, split: SplitMode },
}

impl CropStrategy {
    /// Short name recorded in crop reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PerPage(_) => "auto",
            Self::Uniform { .. } => "uniform",
            Self::Footnotes(_) => "footnotes",
            Self::Ratios { .. } => "split",
        }
    }
}

/// Compute crop boxes for `pages` with `strategy`.
#[instrument(skip_all, fields(pages = pages.len(), strategy = strategy.name()))]
pub fn plan(pages: &[PageGeometry], strategy: &CropStrategy) -> CropBatch {
    let batch = match strategy {
        CropStrategy::PerPage(detection) => collect_batch(pages, |page| {
            let candidate = detect_candidate(page, detection)?;
            clamp_to_media(page, &candidate.bbox).map(Some)
        }),

        CropStrategy::Uniform {
            detection,
            aggregation,
        } => {
            let groups = uniform_boxes(pages, detection, aggregation);
            collect_batch(pages, |page| {
                let key = group_key(aggregation.grouping, page.page_index);
                let group_box = groups.get(&key).ok_or(FolioError::EmptyDetectionResult {
                    page_index: page.page_index,
                })?;
                clamp_to_media(page, group_box).map(Some)
            })
        }

        CropStrategy::Footnotes(footnote) => {
            collect_batch(pages, |page| Ok(detect_footnote_boundary(page, footnote)))
        }

        CropStrategy::Ratios { ratios, split } => collect_batch(pages, |page| {
            ratios
                .get(page.page_index)
                .map(|ratio| split_by_ratio(page.page_index, &page.media_box, *ratio, *split))
                .transpose()
        }),
    };

    info!(
        cropped = batch.cropped_count(),
        skipped = batch.diagnostics.len(),
        "batch planned"
    );
    batch
}

/// Apply the adjustment state of an interactive session to every page.
///
/// Each page starts from its pristine base box, so repeated apply cycles do
/// not compound.
#[instrument(skip_all, fields(pages = pages.len()))]
pub fn apply_adjustments(pages: &[PageGeometry], adjustments: &AdjustmentSet) -> CropBatch {
    collect_batch(pages, |page| {
        compute_crop_box(
            page.page_index,
            &page.media_box,
            &page.base_box(),
            &adjustments.for_page(page.page_index),
            adjustments.odd_offset,
            page.parity() == PageParity::Odd,
        )
        .map(Some)
    })
}

/// Median boxes from detection on the first `sample_size` pages.
fn uniform_boxes(
    pages: &[PageGeometry],
    detection: &DetectionConfig,
    aggregation: &AggregationConfig,
) -> BTreeMap<PageParity, Rect> {
    let sample = &pages[..pages.len().min(aggregation.sample_size)];
    let candidates: Vec<_> = sample
        .par_iter()
        .filter_map(|page| detect_candidate(page, detection).ok())
        .collect();
    info!(
        sampled = sample.len(),
        detected = candidates.len(),
        "sample detection finished"
    );

    aggregate_by_group(&candidates, |c| group_key(aggregation.grouping, c.page_index))
}

fn group_key(grouping: Grouping, page_index: usize) -> PageParity {
    match grouping {
        Grouping::Parity => PageParity::of(page_index),
        Grouping::Single => PageParity::Even,
    }
}

fn clamp_to_media(page: &PageGeometry, rect: &Rect) -> Result<Rect> {
    rect.intersection(&page.media_box)
        .ok_or(FolioError::EmptyRegion {
            page_index: page.page_index,
        })
}

/// Run `crop_fn` on every page. `Ok(None)` keeps the base box silently,
/// `Err` keeps it and records a diagnostic.
fn collect_batch<F>(pages: &[PageGeometry], crop_fn: F) -> CropBatch
where
    F: Fn(&PageGeometry) -> Result<Option<Rect>> + Sync,
{
    let outcomes: Vec<(CropResult, Option<PageDiagnostic>)> = pages
        .par_iter()
        .map(|page| {
            let (crop_box, diagnostic) = match crop_fn(page) {
                Ok(Some(rect)) => (rect, None),
                Ok(None) => (page.base_box(), None),
                Err(err) => {
                    warn!(page = page.page_index, error = %err, "page left at its original box");
                    (
                        page.base_box(),
                        Some(PageDiagnostic::from_error(page.page_index, &err)),
                    )
                }
            };
            (
                CropResult {
                    page_index: page.page_index,
                    crop_box,
                },
                diagnostic,
            )
        })
        .collect();

    let mut batch = CropBatch::default();
    for (result, diagnostic) in outcomes {
        batch.results.push(result);
        batch.diagnostics.extend(diagnostic);
    }
    batch
}
