// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Folio — Core types, geometry, and error definitions shared across all crates.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod geometry;
pub mod traits;
pub mod types;

pub use config::FolioConfig;
pub use error::FolioError;
pub use geometry::Rect;
pub use traits::{CropSink, GeometrySource};
pub use types::*;
