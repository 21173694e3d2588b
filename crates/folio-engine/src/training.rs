// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Train-then-predict session.
//
// The first `training_pages` pages each receive one click; the click row is
// stored as a ratio of the display height and the first click also captures
// a template band. Afterwards the mean training ratio is proposed for every
// page, together with the position where the template band matches. The user
// confirms the running average or overrides it with a new click, which
// blends as `(average + click) / 2`.

use folio_core::config::TrainingConfig;
use folio_core::error::{FolioError, Result};
use image::GrayImage;
use tracing::{debug, info, instrument, warn};

use crate::template::{BandMatch, TemplateBand};

/// Supplies page rasters already scaled to the display canvas.
pub trait PageImageSource {
    fn page_count(&self) -> usize;

    /// The image of page `page_index`, `display_width x display_height`.
    fn page_image(&self, page_index: usize) -> Result<GrayImage>;
}

/// Which part of the session the current page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingPhase {
    Training,
    Predicting,
    Finished,
}

/// One input event of the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrainingEvent {
    /// Click at this row of the display canvas.
    Click(f64),
    /// Accept the current prediction.
    Confirm,
    Exit,
}

impl TrainingEvent {
    /// Parse `click <y>`, `confirm` (or an empty line) and `exit`.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim().to_ascii_lowercase();
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (None, _, _) | (Some("confirm" | "c"), None, _) => Ok(Self::Confirm),
            (Some("exit" | "quit"), None, _) => Ok(Self::Exit),
            (Some("click"), Some(y), None) => y
                .parse::<f64>()
                .ok()
                .filter(|y| y.is_finite() && *y >= 0.0)
                .map(Self::Click)
                .ok_or_else(|| FolioError::InvalidCommandSyntax(format!("bad click row '{y}'"))),
            _ => Err(FolioError::InvalidCommandSyntax(format!(
                "'{line}': expected 'click <y>', 'confirm' or 'exit'"
            ))),
        }
    }
}

/// What the session proposes for the current predicted page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub page_index: usize,
    /// Running average ratio; what `confirm` accepts.
    pub ratio: f64,
    /// Where the template band matched on this page, as a ratio of the
    /// display height.
    pub matched_ratio: f64,
    pub score: f32,
}

pub struct TrainPredictSession<S> {
    source: S,
    config: TrainingConfig,
    page_count: usize,
    current: usize,
    ratios: Vec<f64>,
    average: Option<f64>,
    template: Option<TemplateBand>,
    exited: bool,
}

impl<S: PageImageSource> TrainPredictSession<S> {
    pub fn new(source: S, config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        let page_count = source.page_count();
        info!(
            pages = page_count,
            training_pages = config.training_pages,
            "train-then-predict session started"
        );
        Ok(Self {
            source,
            config,
            page_count,
            current: 0,
            ratios: Vec::with_capacity(page_count),
            average: None,
            template: None,
            exited: false,
        })
    }

    pub fn phase(&self) -> TrainingPhase {
        if self.exited || self.current >= self.page_count {
            TrainingPhase::Finished
        } else if self.average.is_none() {
            TrainingPhase::Training
        } else {
            TrainingPhase::Predicting
        }
    }

    /// Zero-based index of the page awaiting input.
    pub fn current_page(&self) -> Option<usize> {
        (self.phase() != TrainingPhase::Finished).then_some(self.current)
    }

    pub fn average(&self) -> Option<f64> {
        self.average
    }

    pub fn has_template(&self) -> bool {
        self.template.is_some()
    }

    /// Ratios recorded so far, one per handled page.
    pub fn ratios(&self) -> &[f64] {
        &self.ratios
    }

    /// Record a click at display row `y` on the current page.
    ///
    /// During training the ratio is stored as-is; afterwards it overrides the
    /// prediction and is blended into the running average.
    #[instrument(skip(self), fields(page = self.current))]
    pub fn click(&mut self, y: f64) -> Result<()> {
        let ratio = (y / f64::from(self.config.display_height)).clamp(0.0, 1.0);
        match self.phase() {
            TrainingPhase::Finished => return Err(FolioError::SessionExited),
            TrainingPhase::Training => {
                if self.template.is_none() {
                    self.capture_template(y);
                }
                self.ratios.push(ratio);
                debug!(ratio, "training click recorded");
            }
            TrainingPhase::Predicting => {
                let blended = (self.average.unwrap_or(ratio) + ratio) / 2.0;
                self.average = Some(blended);
                self.ratios.push(blended);
                debug!(ratio, average = blended, "prediction overridden");
            }
        }
        self.advance();
        Ok(())
    }

    /// Propose a crop position for the current page by matching the
    /// template band.
    ///
    /// Fails with [`FolioError::MissingTemplate`] when no band was captured;
    /// the page then needs a manual click.
    pub fn predict(&self) -> Result<Prediction> {
        let ratio = match self.phase() {
            TrainingPhase::Predicting => self.average.unwrap_or_default(),
            TrainingPhase::Training => {
                return Err(FolioError::InvalidCommandSyntax(
                    "no prediction is available while training".into(),
                ));
            }
            TrainingPhase::Finished => return Err(FolioError::SessionExited),
        };
        let template = self.template.as_ref().ok_or(FolioError::MissingTemplate)?;

        let image = self.source.page_image(self.current)?;
        let BandMatch { center_y, score } = template.locate(&image)?;
        Ok(Prediction {
            page_index: self.current,
            ratio,
            matched_ratio: f64::from(center_y) / f64::from(self.config.display_height),
            score,
        })
    }

    /// Accept the running average for the current page.
    pub fn confirm(&mut self) -> Result<f64> {
        let average = match self.phase() {
            TrainingPhase::Predicting => self.average.unwrap_or_default(),
            TrainingPhase::Training => {
                return Err(FolioError::InvalidCommandSyntax(
                    "pages must be clicked while training".into(),
                ));
            }
            TrainingPhase::Finished => return Err(FolioError::SessionExited),
        };
        self.ratios.push(average);
        debug!(page = self.current, ratio = average, "prediction confirmed");
        self.advance();
        Ok(average)
    }

    /// Dispatch one parsed event.
    pub fn handle(&mut self, event: TrainingEvent) -> Result<()> {
        match event {
            TrainingEvent::Click(y) => self.click(y),
            TrainingEvent::Confirm => self.confirm().map(|_| ()),
            TrainingEvent::Exit => {
                self.exited = true;
                info!(handled = self.ratios.len(), "train-then-predict session exited");
                Ok(())
            }
        }
    }

    /// The ratio of every handled page, in page order.
    pub fn finish(self) -> Vec<f64> {
        self.ratios
    }

    // -- Internals ----------------------------------------------------------

    fn advance(&mut self) {
        self.current += 1;
        let trained = self.ratios.len();
        if self.average.is_none() && trained == self.config.training_pages {
            let mean = self.ratios.iter().sum::<f64>() / trained as f64;
            self.average = Some(mean);
            info!(average = mean, "training finished");
        }
    }

    fn capture_template(&mut self, y: f64) {
        let band = self.source.page_image(self.current).and_then(|image| {
            TemplateBand::capture(&image, y.round() as u32, self.config.band_half_height)
        });
        match band {
            Ok(band) => self.template = Some(band),
            Err(err) => warn!(error = %err, "template band not captured"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::tests::striped_page;

    /// Pages with a textured stripe whose top row moves with the page index.
    struct StripedPages {
        tops: Vec<u32>,
    }

    impl PageImageSource for StripedPages {
        fn page_count(&self) -> usize {
            self.tops.len()
        }

        fn page_image(&self, page_index: usize) -> Result<GrayImage> {
            let top = self
                .tops
                .get(page_index)
                .ok_or(FolioError::PageOutOfRange {
                    page_index,
                    page_count: self.tops.len(),
                })?;
            Ok(striped_page(32, 100, *top, 10))
        }
    }

    struct NoImages(usize);

    impl PageImageSource for NoImages {
        fn page_count(&self) -> usize {
            self.0
        }

        fn page_image(&self, _page_index: usize) -> Result<GrayImage> {
            Err(FolioError::ImageError("not rendered".into()))
        }
    }

    fn config(training_pages: usize) -> TrainingConfig {
        TrainingConfig {
            training_pages,
            display_width: 32,
            display_height: 100,
            band_half_height: 5,
            ..TrainingConfig::default()
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn training_average_then_override_then_confirm() {
        let source = StripedPages {
            tops: vec![20, 70, 40, 40],
        };
        let mut session = TrainPredictSession::new(source, config(2)).expect("session");
        assert_eq!(session.phase(), TrainingPhase::Training);

        session.click(25.0).expect("click");
        session.click(75.0).expect("click");
        assert_eq!(session.phase(), TrainingPhase::Predicting);
        assert!(approx(session.average().expect("trained"), 0.5));

        session.click(90.0).expect("override");
        assert!(approx(session.average().expect("trained"), 0.7));

        let confirmed = session.confirm().expect("confirm");
        assert!(approx(confirmed, 0.7));
        assert_eq!(session.phase(), TrainingPhase::Finished);

        let ratios = session.finish();
        assert_eq!(ratios.len(), 4);
        assert!(approx(ratios[0], 0.25));
        assert!(approx(ratios[1], 0.75));
        assert!(approx(ratios[2], 0.7));
        assert!(approx(ratios[3], 0.7));
    }

    #[test]
    fn prediction_follows_the_template() {
        let source = StripedPages {
            tops: vec![20, 20, 47],
        };
        let mut session = TrainPredictSession::new(source, config(2)).expect("session");
        session.click(25.0).expect("click");
        session.click(25.0).expect("click");

        let prediction = session.predict().expect("prediction");
        assert_eq!(prediction.page_index, 2);
        assert!(approx(prediction.ratio, 0.25));
        assert!(approx(prediction.matched_ratio, 0.52));
    }

    #[test]
    fn missing_template_falls_back_to_clicks() {
        let mut session = TrainPredictSession::new(NoImages(3), config(1)).expect("session");
        session.click(40.0).expect("click still recorded");
        assert!(!session.has_template());
        assert!(matches!(session.predict(), Err(FolioError::MissingTemplate)));

        session.click(60.0).expect("manual click");
        assert!(approx(session.average().expect("trained"), 0.5));
    }

    #[test]
    fn confirm_is_rejected_while_training() {
        let source = StripedPages { tops: vec![20, 20] };
        let mut session = TrainPredictSession::new(source, config(2)).expect("session");
        assert!(matches!(
            session.confirm(),
            Err(FolioError::InvalidCommandSyntax(_))
        ));
        assert!(session.ratios().is_empty());
    }

    #[test]
    fn exit_ends_the_session_early() {
        let source = StripedPages { tops: vec![20; 5] };
        let mut session = TrainPredictSession::new(source, config(2)).expect("session");
        session.handle(TrainingEvent::Click(30.0)).expect("click");
        session.handle(TrainingEvent::Exit).expect("exit");

        assert_eq!(session.phase(), TrainingPhase::Finished);
        assert_eq!(session.current_page(), None);
        assert!(matches!(session.click(10.0), Err(FolioError::SessionExited)));
        assert_eq!(session.finish().len(), 1);
    }

    #[test]
    fn more_training_pages_than_pages_is_all_manual() {
        let source = StripedPages { tops: vec![20, 30] };
        let mut session = TrainPredictSession::new(source, config(12)).expect("session");
        session.click(10.0).expect("click");
        session.click(20.0).expect("click");
        assert_eq!(session.phase(), TrainingPhase::Finished);
        assert_eq!(session.average(), None);
    }

    #[test]
    fn zero_training_pages_is_rejected() {
        let source = StripedPages { tops: vec![20] };
        assert!(matches!(
            TrainPredictSession::new(source, config(0)),
            Err(FolioError::InvalidConfig(_))
        ));
    }

    #[test]
    fn event_parsing() {
        assert_eq!(TrainingEvent::parse("click 120").expect("valid"), TrainingEvent::Click(120.0));
        assert_eq!(TrainingEvent::parse("").expect("valid"), TrainingEvent::Confirm);
        assert_eq!(TrainingEvent::parse("confirm").expect("valid"), TrainingEvent::Confirm);
        assert_eq!(TrainingEvent::parse("EXIT").expect("valid"), TrainingEvent::Exit);
        for bad in ["click", "click -4", "click x", "click 1 2", "jump"] {
            assert!(TrainingEvent::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }
}
