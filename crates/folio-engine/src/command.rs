// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line grammar of the interactive adjustment session.
//
//   <side> <value>                 global delta, side in l r t b
//   o <value>                      odd-page horizontal offset
//   <page> <side> <value>          delta for one page (1-indexed)
//   reset | exit
//
// Whitespace between the parts is optional; values follow [-+]?\d*\.?\d+.

use std::io::BufRead;

use folio_core::Side;
use folio_core::error::{FolioError, Result};

/// One parsed session command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Adjust { side: Side, value: f64 },
    OddOffset(f64),
    /// `page_index` is zero-based.
    AdjustPage { page_index: usize, side: Side, value: f64 },
    Reset,
    Exit,
}

/// Parse one command line. Case-insensitive; surrounding whitespace ignored.
pub fn parse_command(line: &str) -> Result<Command> {
    let input = line.trim().to_ascii_lowercase();
    match input.as_str() {
        "exit" | "quit" => return Ok(Command::Exit),
        "reset" => return Ok(Command::Reset),
        "" => return Err(invalid(line, "empty command")),
        _ => {}
    }

    let digits_end = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (page, rest) = input.split_at(digits_end);
    let rest = rest.trim_start();

    let mut chars = rest.chars();
    let key = chars.next().ok_or_else(|| invalid(line, "missing side"))?;
    let value = parse_value(chars.as_str().trim()).ok_or_else(|| invalid(line, "bad value"))?;

    if page.is_empty() {
        return match key {
            'o' => Ok(Command::OddOffset(value)),
            other => Side::from_char(other)
                .map(|side| Command::Adjust { side, value })
                .ok_or_else(|| invalid(line, "side must be one of l, r, t, b, o")),
        };
    }

    let page_number: usize = page
        .parse()
        .map_err(|_| invalid(line, "page number too large"))?;
    if page_number == 0 {
        return Err(invalid(line, "pages are numbered from 1"));
    }
    let side = Side::from_char(key)
        .ok_or_else(|| invalid(line, "per-page side must be one of l, r, t, b"))?;
    Ok(Command::AdjustPage {
        page_index: page_number - 1,
        side,
        value,
    })
}

/// A finite number matching `[-+]?\d*\.?\d+`.
fn parse_value(text: &str) -> Option<f64> {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => ("", unsigned),
    };
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if frac_part.is_empty() || !all_digits(int_part) || !all_digits(frac_part) {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Read the next input line, or `None` at end of input.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, so a
/// garbled line reaches the parser as a malformed command.
pub fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut buf = Vec::new();
    if input.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

fn invalid(line: &str, reason: &str) -> FolioError {
    FolioError::InvalidCommandSyntax(format!("'{}': {reason}", line.trim()))
}
