// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document fingerprints and crop reports.

use std::path::Path;

use folio_core::error::Result;
use folio_core::{CropBatch, CropReport, SessionId};
use sha2::{Digest, Sha256};
use tracing::{info, instrument};

/// Compute the SHA-256 hash of `data` and return it as a lowercase hex string.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Build a report for `batch`, fingerprinting the source document at
/// `source`.
pub fn build_report(
    session_id: SessionId,
    source: &Path,
    strategy: &str,
    batch: &CropBatch,
) -> Result<CropReport> {
    let bytes = std::fs::read(source)?;
    let source_name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(CropReport::new(
        session_id,
        source_name,
        hash_bytes(&bytes),
        strategy,
        batch,
    ))
}

/// Write `report` as pretty-printed JSON.
#[instrument(skip_all, fields(path = %path.as_ref().display(), pages = report.pages.len()))]
pub fn write_report(report: &CropReport, path: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path.as_ref(), json)?;
    info!(session = %report.session_id, "crop report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::diagnostics::PageDiagnostic;
    use folio_core::{CropResult, FolioError, Rect};

    /// SHA-256 of the empty byte slice (well-known constant).
    const EMPTY_SHA256: &str =
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn hash_empty_input() {
        assert_eq!(hash_bytes(b""), EMPTY_SHA256);
    }

    #[test]
    fn hash_known_value() {
        let expected = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";
        assert_eq!(hash_bytes(b"hello"), expected);
    }

    #[test]
    fn report_round_trips_through_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("book.pdf");
        std::fs::write(&source, b"hello").expect("write");

        let batch = CropBatch {
            results: vec![
                CropResult {
                    page_index: 0,
                    crop_box: Rect::new(47.0, 77.0, 553.0, 703.0),
                },
                CropResult {
                    page_index: 1,
                    crop_box: Rect::new(0.0, 0.0, 600.0, 800.0),
                },
            ],
            diagnostics: vec![PageDiagnostic::from_error(
                1,
                &FolioError::EmptyDetectionResult { page_index: 1 },
            )],
        };
        let report = build_report(SessionId::new(), &source, "auto", &batch).expect("report");
        assert_eq!(report.source_name, "book.pdf");
        assert_eq!(report.source_sha256, hash_bytes(b"hello"));

        let path = dir.path().join("report.json");
        write_report(&report, &path).expect("written");
        let loaded: CropReport =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("parse");
        assert_eq!(loaded.session_id, report.session_id);
        assert_eq!(loaded.strategy, "auto");
        assert_eq!(loaded.pages, batch.results);
        assert_eq!(loaded.diagnostics, batch.diagnostics);
    }

    #[test]
    fn missing_source_is_an_io_error() {
        let result = build_report(
            SessionId::new(),
            Path::new("/definitely/not/here.pdf"),
            "auto",
            &CropBatch::default(),
        );
        assert!(matches!(result, Err(FolioError::Io(_))));
    }
}
