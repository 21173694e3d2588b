// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Interactive adjustment session.
//
// A line-driven state machine: each accepted command updates the cumulative
// adjustment state, recomputes every page from its original box and hands the
// batch to a `CropSink`. A command that fails at any point leaves the state
// exactly as it was before the command.

use std::io::{BufRead, Write};

use folio_core::diagnostics::humanize_error;
use folio_core::error::{FolioError, Result};
use folio_core::{AdjustmentSet, CropBatch, CropSink, PageGeometry, SessionId};
use tracing::{debug, info, instrument, warn};

use crate::command::{Command, parse_command, read_line};
use crate::planner::apply_adjustments;

/// Where the session is in its command cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingCommand,
    Applying,
    Saved,
    Exited,
}

/// Result of one successfully handled command line.
#[derive(Debug, Clone)]
pub enum CommandOutcome {
    /// The command was applied and the batch handed to the sink.
    Saved(CropBatch),
    /// The session ended; no state is retained.
    Exited,
}

pub struct AdjustmentSession {
    id: SessionId,
    pages: Vec<PageGeometry>,
    adjustments: AdjustmentSet,
    state: SessionState,
}

impl AdjustmentSession {
    pub fn new(pages: Vec<PageGeometry>) -> Self {
        let id = SessionId::new();
        info!(session = %id, pages = pages.len(), "adjustment session started");
        Self {
            id,
            pages,
            adjustments: AdjustmentSet::default(),
            state: SessionState::AwaitingCommand,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn adjustments(&self) -> &AdjustmentSet {
        &self.adjustments
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Parse and execute one command line.
    #[instrument(skip(self, sink), fields(session = %self.id))]
    pub fn handle(&mut self, line: &str, sink: &mut dyn CropSink) -> Result<CommandOutcome> {
        match self.state {
            SessionState::Exited => return Err(FolioError::SessionExited),
            SessionState::Saved => self.state = SessionState::AwaitingCommand,
            SessionState::AwaitingCommand | SessionState::Applying => {}
        }

        let command = parse_command(line)?;
        debug!(?command, "command parsed");

        if command == Command::Exit {
            self.adjustments = AdjustmentSet::default();
            self.state = SessionState::Exited;
            info!("adjustment session exited");
            return Ok(CommandOutcome::Exited);
        }

        let snapshot = self.adjustments.clone();
        self.apply_command(command)?;
        self.state = SessionState::Applying;

        let batch = apply_adjustments(&self.pages, &self.adjustments);
        if let Err(err) = sink.save(&batch) {
            warn!(error = %err, "saving failed, adjustment rolled back");
            self.adjustments = snapshot;
            self.state = SessionState::AwaitingCommand;
            return Err(err);
        }

        self.state = SessionState::Saved;
        info!(
            cropped = batch.cropped_count(),
            skipped = batch.diagnostics.len(),
            "adjustment applied and saved"
        );
        Ok(CommandOutcome::Saved(batch))
    }

    /// Drive the session from `input` until `exit` or end of input, writing
    /// feedback to `output`. Command errors are reported and the loop
    /// continues; so does a line that is not valid UTF-8.
    pub fn run<R, W>(&mut self, mut input: R, sink: &mut dyn CropSink, mut output: W) -> Result<()>
    where
        R: BufRead,
        W: Write,
    {
        while let Some(line) = read_line(&mut input)? {
            if line.trim().is_empty() {
                continue;
            }
            match self.handle(&line, sink) {
                Ok(CommandOutcome::Exited) => break,
                Ok(CommandOutcome::Saved(batch)) => {
                    writeln!(
                        output,
                        "saved {} of {} pages",
                        batch.cropped_count(),
                        batch.page_count()
                    )?;
                    for diagnostic in &batch.diagnostics {
                        writeln!(output, "  {diagnostic}")?;
                    }
                }
                Err(err) => {
                    let human = humanize_error(&err);
                    writeln!(output, "{} {}", human.message, human.suggestion)?;
                }
            }
        }

        if self.state != SessionState::Exited {
            self.adjustments = AdjustmentSet::default();
            self.state = SessionState::Exited;
        }
        Ok(())
    }

    // -- Command application ------------------------------------------------

    fn apply_command(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Adjust { side, value } => self.adjustments.global.add(side, value),
            Command::OddOffset(value) => self.adjustments.odd_offset += value,
            Command::AdjustPage {
                page_index,
                side,
                value,
            } => {
                if page_index >= self.pages.len() {
                    return Err(FolioError::PageOutOfRange {
                        page_index,
                        page_count: self.pages.len(),
                    });
                }
                self.adjustments.per_page.add(page_index, side, value);
            }
            Command::Reset => self.adjustments = AdjustmentSet::default(),
            Command::Exit => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::traits::RecordingSink;
    use folio_core::Rect;

    const MEDIA: Rect = Rect::new(0.0, 0.0, 600.0, 800.0);

    fn session(page_count: usize) -> AdjustmentSession {
        AdjustmentSession::new((0..page_count).map(|i| PageGeometry::blank(i, MEDIA)).collect())
    }

    struct FailingSink;

    impl CropSink for FailingSink {
        fn save(&mut self, _batch: &CropBatch) -> Result<()> {
            Err(FolioError::PdfError("disk full".into()))
        }
    }

    #[test]
    fn repeated_commands_accumulate() {
        let mut sink = RecordingSink::new();
        let mut twice = session(2);
        twice.handle("l5", &mut sink).expect("applied");
        twice.handle("l5", &mut sink).expect("applied");
        let after_twice = sink.last().expect("saved").results.clone();

        let mut once = session(2);
        once.handle("l10", &mut sink).expect("applied");
        let after_once = sink.last().expect("saved").results.clone();

        assert_eq!(after_twice, after_once);
        assert_eq!(twice.adjustments(), once.adjustments());
        assert_eq!(after_once[0].crop_box.x0, 10.0);
    }

    #[test]
    fn per_page_command_touches_one_page() {
        let mut sink = RecordingSink::new();
        let mut s = session(6);
        s.handle("5r4", &mut sink).expect("applied");

        assert_eq!(s.adjustments().per_page.get(4).right, 4.0);
        for page in (0..6).filter(|&p| p != 4) {
            assert!(s.adjustments().for_page(page).is_zero());
        }
        let batch = sink.last().expect("saved");
        assert_eq!(batch.results[4].crop_box.x1, 596.0);
        assert_eq!(batch.results[3].crop_box, MEDIA);
    }

    #[test]
    fn every_command_saves_all_pages() {
        let mut sink = RecordingSink::new();
        let mut s = session(3);
        s.handle("o10", &mut sink).expect("applied");
        s.handle("t 20", &mut sink).expect("applied");

        assert_eq!(sink.saved.len(), 2);
        assert!(sink.saved.iter().all(|batch| batch.page_count() == 3));
        assert_eq!(s.state(), SessionState::Saved);
    }

    #[test]
    fn malformed_command_leaves_state_unchanged() {
        let mut sink = RecordingSink::new();
        let mut s = session(2);
        s.handle("l5", &mut sink).expect("applied");
        let before = s.adjustments().clone();

        assert!(matches!(
            s.handle("l5x", &mut sink),
            Err(FolioError::InvalidCommandSyntax(_))
        ));
        assert!(matches!(
            s.handle("9l5", &mut sink),
            Err(FolioError::PageOutOfRange { page_index: 8, page_count: 2 })
        ));
        assert_eq!(s.adjustments(), &before);
        assert_eq!(sink.saved.len(), 1);
    }

    #[test]
    fn failed_save_rolls_back() {
        let mut s = session(2);
        assert!(s.handle("l5", &mut FailingSink).is_err());
        assert!(s.adjustments().is_zero());
        assert_eq!(s.state(), SessionState::AwaitingCommand);
    }

    #[test]
    fn reset_clears_every_adjustment() {
        let mut sink = RecordingSink::new();
        let mut s = session(2);
        s.handle("l5", &mut sink).expect("applied");
        s.handle("o3", &mut sink).expect("applied");
        s.handle("2b7", &mut sink).expect("applied");
        s.handle("reset", &mut sink).expect("applied");

        assert!(s.adjustments().is_zero());
        assert!(sink.last().expect("saved").results.iter().all(|r| r.crop_box == MEDIA));
    }

    #[test]
    fn exit_is_terminal() {
        let mut sink = RecordingSink::new();
        let mut s = session(1);
        s.handle("b4", &mut sink).expect("applied");
        assert!(matches!(s.handle("exit", &mut sink), Ok(CommandOutcome::Exited)));
        assert_eq!(s.state(), SessionState::Exited);
        assert!(s.adjustments().is_zero());
        assert!(matches!(s.handle("l5", &mut sink), Err(FolioError::SessionExited)));
        assert_eq!(sink.saved.len(), 1);
    }

    #[test]
    fn run_reports_errors_and_continues() {
        let mut sink = RecordingSink::new();
        let mut s = session(2);
        let input = "l5\nbogus\n\nr 2\nexit\nl9\n";
        let mut output = Vec::new();
        s.run(input.as_bytes(), &mut sink, &mut output).expect("run");

        let text = String::from_utf8(output).expect("utf8");
        assert_eq!(sink.saved.len(), 2);
        assert!(text.contains("not understood"));
        assert_eq!(s.state(), SessionState::Exited);
        let last = sink.last().expect("saved");
        assert_eq!(last.results[0].crop_box, Rect::new(5.0, 0.0, 598.0, 800.0));
    }

    #[test]
    fn undecodable_line_is_reported_and_skipped() {
        let mut sink = RecordingSink::new();
        let mut s = session(1);
        let input: &[u8] = b"l5\n\xff\xfe\nr2\nexit\n";
        let mut output = Vec::new();
        s.run(input, &mut sink, &mut output).expect("run");

        assert_eq!(sink.saved.len(), 2);
        assert_eq!(s.state(), SessionState::Exited);
        assert!(String::from_utf8_lossy(&output).contains("not understood"));
        assert_eq!(
            sink.last().expect("saved").results[0].crop_box,
            Rect::new(5.0, 0.0, 598.0, 800.0)
        );
    }

    #[test]
    fn zero_page_document_is_accepted() {
        let mut sink = RecordingSink::new();
        let mut s = session(0);
        let outcome = s.handle("l5", &mut sink).expect("applied");
        assert!(matches!(outcome, CommandOutcome::Saved(batch) if batch.page_count() == 0));
    }
}
