// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Footnote boundary detection.
//
// Words are grouped into text lines; the widest vertical gap between two
// successive lines is taken as the start of the footnote block. When no gap
// is wide enough, a horizontal separator rule between body and footnotes is
// used instead.

use std::cmp::Ordering;

use folio_core::config::FootnoteConfig;
use folio_core::{PageGeometry, Rect, WordBox};
use tracing::{debug, instrument};

/// Group words into text lines, ordered from the top of the page down.
///
/// A word joins the current line when its vertical overlap with the line
/// exceeds `min_overlap` of the smaller of the two heights.
pub fn text_lines(words: &[WordBox], min_overlap: f64) -> Vec<Rect> {
    let mut rects: Vec<Rect> = words.iter().map(WordBox::rect).collect();
    rects.sort_by(|a, b| b.y1.total_cmp(&a.y1).then(a.x0.total_cmp(&b.x0)));

    let mut lines: Vec<Rect> = Vec::new();
    for rect in rects {
        match lines.last_mut() {
            Some(line)
                if line.vertical_overlap(&rect) > min_overlap * line.height().min(rect.height()) =>
            {
                *line = line.union(&rect);
            }
            _ => lines.push(rect),
        }
    }
    lines
}

/// The crop that removes the footnote block from `page`: full page width,
/// from the detected boundary up to the top edge.
///
/// Returns `None` when no boundary can be found, in which case the page keeps
/// its original box.
#[instrument(skip_all, fields(page = page.page_index))]
pub fn detect_footnote_boundary(page: &PageGeometry, config: &FootnoteConfig) -> Option<Rect> {
    let media = page.media_box;
    let lines = text_lines(&page.words, config.line_overlap);

    let widest_gap = lines
        .windows(2)
        .map(|pair| (pair[0].y0 - pair[1].y1, pair[1].y1))
        .fold(None::<(f64, f64)>, |best, gap| match best {
            Some(b) if b.0.total_cmp(&gap.0) != Ordering::Less => Some(b),
            _ => Some(gap),
        });

    let boundary = match widest_gap {
        Some((gap, boundary)) if gap >= config.min_gap => {
            debug!(gap, boundary, "footnote gap found");
            boundary
        }
        _ => {
            let rule = separator_rule(page, &lines, config)?;
            debug!(%rule, "footnote separator rule found");
            rule.y1
        }
    };

    let crop = Rect::new(media.x0, boundary, media.x1, media.y1);
    crop.intersection(&media)
}

/// The lowest wide rule that has text both above and below it.
fn separator_rule(page: &PageGeometry, lines: &[Rect], config: &FootnoteConfig) -> Option<Rect> {
    let (first, last) = (lines.first()?, lines.last()?);
    let min_width = page.media_box.width() * config.rule_width_fraction;

    page.rules
        .iter()
        .filter(|rule| rule.width() > min_width)
        .filter(|rule| rule.y1 <= first.y0 && rule.y0 >= last.y1)
        .min_by(|a, b| a.y0.total_cmp(&b.y0))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEDIA: Rect = Rect::new(0.0, 0.0, 600.0, 800.0);

    fn line(y0: f64) -> Vec<WordBox> {
        vec![
            WordBox::new(50.0, y0, 280.0, y0 + 12.0, "left"),
            WordBox::new(290.0, y0 + 1.0, 550.0, y0 + 12.0, "right"),
        ]
    }

    /// Four lines spaced by 6pt gaps, the first starting at y=420.
    fn dense_page() -> PageGeometry {
        let words = [420.0, 402.0, 384.0, 366.0].into_iter().flat_map(line).collect();
        PageGeometry::blank(0, MEDIA).with_words(words)
    }

    #[test]
    fn words_on_one_baseline_form_one_line() {
        let lines = text_lines(&line(100.0), 0.5);
        assert_eq!(lines, vec![Rect::new(50.0, 100.0, 550.0, 112.0)]);
    }

    #[test]
    fn lines_are_ordered_top_down() {
        let page = dense_page();
        let lines = text_lines(&page.words, 0.5);
        assert_eq!(lines.len(), 4);
        assert!(lines.windows(2).all(|pair| pair[0].y0 > pair[1].y1));
    }

    #[test]
    fn widest_gap_marks_the_footnotes() {
        let words = [700.0, 680.0, 100.0].into_iter().flat_map(line).collect();
        let page = PageGeometry::blank(0, MEDIA).with_words(words);

        let crop = detect_footnote_boundary(&page, &FootnoteConfig::default())
            .expect("boundary found");
        assert_eq!(crop, Rect::new(0.0, 112.0, 600.0, 800.0));
    }

    #[test]
    fn separator_rule_is_used_when_gaps_are_small() {
        let mut page = dense_page();
        page.rules = vec![
            // Separator between the second and third line.
            Rect::new(30.0, 398.0, 570.0, 399.0),
            // Short rule, not a separator.
            Rect::new(30.0, 380.0, 100.0, 381.0),
            // Footer rule with no text below it.
            Rect::new(0.0, 40.0, 600.0, 41.0),
        ];
        let crop = detect_footnote_boundary(&page, &FootnoteConfig::default())
            .expect("boundary found");
        assert_eq!(crop, Rect::new(0.0, 399.0, 600.0, 800.0));
    }

    #[test]
    fn small_gaps_without_rules_yield_none() {
        assert!(detect_footnote_boundary(&dense_page(), &FootnoteConfig::default()).is_none());
    }

    #[test]
    fn single_line_and_empty_pages_yield_none() {
        let config = FootnoteConfig::default();
        let page = PageGeometry::blank(0, MEDIA).with_words(line(400.0));
        assert!(detect_footnote_boundary(&page, &config).is_none());
        assert!(detect_footnote_boundary(&PageGeometry::blank(1, MEDIA), &config).is_none());
    }
}
