// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Statistical aggregation: coordinate-wise medians of crop candidates,
// grouped by a caller-supplied key (usually page parity).

use std::collections::BTreeMap;

use folio_core::{CropCandidate, PageParity, Rect};
use tracing::{debug, instrument};

/// Median of `values`. An even count averages the two middle values.
///
/// Returns `None` for an empty slice. The input order does not matter.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Coordinate-wise median of a set of rectangles.
pub fn median_box(rects: &[Rect]) -> Option<Rect> {
    let coord = |f: fn(&Rect) -> f64| median(&rects.iter().map(f).collect::<Vec<_>>());
    Some(Rect::new(
        coord(|r| r.x0)?,
        coord(|r| r.y0)?,
        coord(|r| r.x1)?,
        coord(|r| r.y1)?,
    ))
}

/// Group `candidates` by `group_fn` and compute one median box per group.
///
/// Only groups with at least one candidate appear in the output.
#[instrument(skip_all, fields(candidates = candidates.len()))]
pub fn aggregate_by_group<K, F>(candidates: &[CropCandidate], group_fn: F) -> BTreeMap<K, Rect>
where
    K: Ord,
    F: Fn(&CropCandidate) -> K,
{
    let mut groups: BTreeMap<K, Vec<Rect>> = BTreeMap::new();
    for candidate in candidates {
        groups
            .entry(group_fn(candidate))
            .or_default()
            .push(candidate.bbox);
    }

    let medians: BTreeMap<K, Rect> = groups
        .into_iter()
        .filter_map(|(key, rects)| median_box(&rects).map(|rect| (key, rect)))
        .collect();
    debug!(groups = medians.len(), "median boxes computed");
    medians
}

/// Median boxes for even and odd pages.
pub fn aggregate_by_parity(candidates: &[CropCandidate]) -> BTreeMap<PageParity, Rect> {
    aggregate_by_group(candidates, |c| PageParity::of(c.page_index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(page_index: usize, x0: f64, y0: f64, x1: f64, y1: f64) -> CropCandidate {
        CropCandidate {
            page_index,
            bbox: Rect::new(x0, y0, x1, y1),
        }
    }

    #[test]
    fn median_of_odd_and_even_counts() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn median_box_ignores_single_outlier() {
        let rects = [
            Rect::new(50.0, 80.0, 550.0, 700.0),
            Rect::new(52.0, 82.0, 548.0, 702.0),
            // Title page with a tiny centred heading.
            Rect::new(200.0, 380.0, 400.0, 420.0),
        ];
        assert_eq!(
            median_box(&rects),
            Some(Rect::new(52.0, 82.0, 548.0, 700.0))
        );
    }

    #[test]
    fn groups_by_parity() {
        let candidates = [
            candidate(0, 60.0, 80.0, 540.0, 700.0),
            candidate(1, 40.0, 80.0, 520.0, 700.0),
            candidate(2, 62.0, 82.0, 542.0, 702.0),
            candidate(3, 42.0, 82.0, 522.0, 702.0),
        ];
        let medians = aggregate_by_parity(&candidates);

        assert_eq!(medians.len(), 2);
        assert_eq!(
            medians[&PageParity::Even],
            Rect::new(61.0, 81.0, 541.0, 701.0)
        );
        assert_eq!(
            medians[&PageParity::Odd],
            Rect::new(41.0, 81.0, 521.0, 701.0)
        );
    }

    #[test]
    fn empty_groups_produce_no_entry() {
        let candidates = [candidate(0, 0.0, 0.0, 10.0, 10.0), candidate(2, 0.0, 0.0, 20.0, 20.0)];
        let medians = aggregate_by_parity(&candidates);
        assert!(medians.contains_key(&PageParity::Even));
        assert!(!medians.contains_key(&PageParity::Odd));
        assert!(aggregate_by_parity(&[]).is_empty());
    }

    #[test]
    fn result_is_independent_of_input_order() {
        let forward = [
            candidate(0, 50.0, 70.0, 540.0, 690.0),
            candidate(2, 55.0, 80.0, 560.0, 700.0),
            candidate(4, 48.0, 90.0, 530.0, 710.0),
            candidate(6, 51.0, 75.0, 545.0, 705.0),
        ];
        let mut reversed = forward;
        reversed.reverse();
        let mut rotated = forward;
        rotated.rotate_left(1);

        let expected = aggregate_by_parity(&forward);
        assert_eq!(aggregate_by_parity(&reversed), expected);
        assert_eq!(aggregate_by_parity(&rotated), expected);
    }
}
