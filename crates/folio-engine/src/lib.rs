// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// folio-engine — The cropping engine.
//
// Detects the main text block from word geometry, aggregates per-page boxes
// into stable medians, turns boxes, adjustments and split ratios into clamped
// crop boxes, and drives the interactive adjustment and train-then-predict
// sessions.

pub mod aggregate;
pub mod command;
pub mod detect;
pub mod footnote;
pub mod planner;
pub mod policy;
pub mod session;
pub mod template;
pub mod training;

pub use planner::{CropStrategy, apply_adjustments, plan};
pub use session::{AdjustmentSession, CommandOutcome, SessionState};
pub use template::{BandMatch, TemplateBand};
pub use training::{PageImageSource, TrainPredictSession, TrainingEvent, TrainingPhase};
