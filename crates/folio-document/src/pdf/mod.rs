// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF page boxes: reading media/crop boxes and writing crop boxes.

pub mod reader;
pub mod writer;

#[cfg(test)]
pub(crate) mod fixtures;
