// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{FolioError, Result};

/// All tunables of the cropping engine, persisted as JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    pub detection: DetectionConfig,
    pub aggregation: AggregationConfig,
    pub footnote: FootnoteConfig,
    pub training: TrainingConfig,
}

impl FolioConfig {
    /// Load a configuration file. Missing sections fall back to defaults.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.detection.validate()?;
        self.aggregation.validate()?;
        self.footnote.validate()?;
        self.training.validate()
    }
}

/// Parameters of main-text detection from word boxes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Fraction of the page height treated as header band.
    pub top_margin_fraction: f64,
    /// Fraction of the page height treated as footer band.
    pub bottom_margin_fraction: f64,
    /// Words shorter than this multiple of the median word height are
    /// treated as footnote text.
    pub min_relative_word_height: f64,
    /// Padding (points) added around the detected text box.
    pub edge_margin: f64,
}

impl DetectionConfig {
    /// 10% header, 10% footer, small-font filtering, 3pt padding.
    pub fn standard() -> Self {
        Self {
            top_margin_fraction: 0.10,
            bottom_margin_fraction: 0.10,
            min_relative_word_height: 0.8,
            edge_margin: 3.0,
        }
    }

    /// 5% header so a first line close to the top edge is kept; no font
    /// filtering and no padding.
    pub fn relaxed_header() -> Self {
        Self {
            top_margin_fraction: 0.05,
            bottom_margin_fraction: 0.10,
            min_relative_word_height: 0.0,
            edge_margin: 0.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let fractions = [self.top_margin_fraction, self.bottom_margin_fraction];
        if fractions.iter().any(|f| !(0.0..1.0).contains(f)) {
            return Err(FolioError::InvalidConfig(
                "margin fractions must lie in [0, 1)".into(),
            ));
        }
        if self.top_margin_fraction + self.bottom_margin_fraction >= 1.0 {
            return Err(FolioError::InvalidConfig(
                "header and footer bands cover the whole page".into(),
            ));
        }
        if self.min_relative_word_height < 0.0 || self.edge_margin < 0.0 {
            return Err(FolioError::InvalidConfig(
                "word height factor and edge margin must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// How candidates are grouped before taking the median.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    /// Separate boxes for even and odd pages.
    #[default]
    Parity,
    /// One box for the whole document.
    Single,
}

/// Parameters of the cross-page median crop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Number of leading pages sampled for detection.
    pub sample_size: usize,
    pub grouping: Grouping,
}

impl AggregationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_size == 0 {
            return Err(FolioError::InvalidConfig(
                "sample size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            sample_size: 30,
            grouping: Grouping::Parity,
        }
    }
}

/// Parameters of footnote boundary detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FootnoteConfig {
    /// Smallest inter-line gap (points) accepted as a footnote separator.
    pub min_gap: f64,
    /// Minimum width of a separator rule, as a fraction of page width.
    pub rule_width_fraction: f64,
    /// Words whose vertical spans overlap by more than this fraction of the
    /// smaller height belong to the same line.
    pub line_overlap: f64,
}

impl FootnoteConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_gap < 0.0 || !(0.0..=1.0).contains(&self.rule_width_fraction) {
            return Err(FolioError::InvalidConfig(
                "footnote gap must be non-negative and rule width a fraction".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.line_overlap) {
            return Err(FolioError::InvalidConfig(
                "line overlap must be a fraction".into(),
            ));
        }
        Ok(())
    }
}

impl Default for FootnoteConfig {
    fn default() -> Self {
        Self {
            min_gap: 20.0,
            rule_width_fraction: 0.8,
            line_overlap: 0.5,
        }
    }
}

/// Which part of the page a single ratio keeps.
///
/// `cut_bottom` chooses the reference edge the ratio is measured from (the
/// bottom edge when set, the top edge otherwise); `keep_top` chooses whether
/// the part above or below the split line survives. The default measures
/// from the top edge, like click rows on a page image, and keeps the part
/// above the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitMode {
    pub cut_bottom: bool,
    pub keep_top: bool,
}

impl Default for SplitMode {
    fn default() -> Self {
        Self {
            cut_bottom: false,
            keep_top: true,
        }
    }
}

/// Parameters of the click-driven train-then-predict session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of pages clicked by hand before prediction starts.
    pub training_pages: usize,
    /// Width of the virtual canvas page images are displayed on.
    pub display_width: u32,
    /// Height of the virtual canvas; click ratios are `y / display_height`.
    pub display_height: u32,
    /// Half height (pixels) of the template band captured around a click.
    pub band_half_height: u32,
    pub split: SplitMode,
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.training_pages == 0 {
            return Err(FolioError::InvalidConfig(
                "at least one training page is required".into(),
            ));
        }
        if self.display_width == 0 || self.display_height == 0 {
            return Err(FolioError::InvalidConfig(
                "display canvas must be non-empty".into(),
            ));
        }
        if self.band_half_height == 0 || 2 * self.band_half_height > self.display_height {
            return Err(FolioError::InvalidConfig(
                "template band must fit inside the display canvas".into(),
            ));
        }
        Ok(())
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            training_pages: 12,
            display_width: 600,
            display_height: 800,
            band_half_height: 15,
            split: SplitMode::default(),
        }
    }
}
