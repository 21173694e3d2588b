// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF crop writer: sets /CropBox on every page of a batch and saves the
// document with `lopdf`.

use std::path::{Path, PathBuf};

use folio_core::error::{FolioError, Result};
use folio_core::{CropBatch, CropSink, Rect};
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, info, instrument};

use crate::pdf::reader::PdfReader;

/// Persists crop batches into a copy of the source PDF.
///
/// Each save rewrites the output file, so the file on disk always reflects
/// the most recent batch.
pub struct PdfCropWriter {
    document: Document,
    page_ids: Vec<ObjectId>,
    output_path: PathBuf,
}

impl PdfCropWriter {
    pub fn new(reader: PdfReader, output_path: impl Into<PathBuf>) -> Self {
        let (document, page_ids) = reader.into_parts();
        Self {
            document,
            page_ids,
            output_path: output_path.into(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Set the CropBox of page `page_index`.
    pub fn set_crop_box(&mut self, page_index: usize, crop_box: &Rect) -> Result<()> {
        let page_id = *self
            .page_ids
            .get(page_index)
            .ok_or(FolioError::PageOutOfRange {
                page_index,
                page_count: self.page_ids.len(),
            })?;

        let dict = self.document.get_dictionary_mut(page_id).map_err(|err| {
            FolioError::PdfError(format!("failed to get page dictionary: {err}"))
        })?;
        let array: Vec<Object> = crop_box
            .to_array()
            .iter()
            .map(|value| Object::Real(*value as f32))
            .collect();
        dict.set("CropBox", array);
        Ok(())
    }

    /// Serialise the document to bytes without touching the output file.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.document.save_to(&mut output).map_err(|err| {
            FolioError::PdfError(format!("failed to serialise cropped PDF: {err}"))
        })?;
        Ok(output)
    }
}

impl CropSink for PdfCropWriter {
    #[instrument(skip_all, fields(pages = batch.page_count(), path = %self.output_path.display()))]
    fn save(&mut self, batch: &CropBatch) -> Result<()> {
        for result in &batch.results {
            self.set_crop_box(result.page_index, &result.crop_box)?;
        }
        debug!("crop boxes set");

        self.document.save(&self.output_path).map_err(|err| {
            FolioError::PdfError(format!(
                "failed to write {}: {}",
                self.output_path.display(),
                err
            ))
        })?;
        info!(cropped = batch.cropped_count(), "cropped PDF saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::sample_pdf;
    use folio_core::{CropResult, GeometrySource};

    fn batch(rects: &[Rect]) -> CropBatch {
        CropBatch {
            results: rects
                .iter()
                .enumerate()
                .map(|(page_index, crop_box)| CropResult {
                    page_index,
                    crop_box: *crop_box,
                })
                .collect(),
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn saved_crop_boxes_read_back_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("book_cropped.pdf");
        let reader = PdfReader::from_bytes(&sample_pdf(3)).expect("valid PDF");
        let mut writer = PdfCropWriter::new(reader, &output);

        let rects = [
            Rect::new(47.0, 77.0, 553.0, 703.0),
            Rect::new(20.5, 30.25, 480.0, 650.0),
            Rect::new(0.0, 640.0, 600.0, 800.0),
        ];
        writer.save(&batch(&rects)).expect("saved");

        let reread = PdfReader::open(&output).expect("reopen");
        for (index, rect) in rects.iter().enumerate() {
            assert_eq!(reread.crop_box(index).expect("crop box"), Some(*rect));
        }
        assert_eq!(
            reread.media_box(0).expect("media box"),
            Rect::new(0.0, 0.0, 600.0, 800.0)
        );
    }

    #[test]
    fn later_saves_replace_earlier_ones() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("out.pdf");
        let reader = PdfReader::from_bytes(&sample_pdf(1)).expect("valid PDF");
        let mut writer = PdfCropWriter::new(reader, &output);

        writer.save(&batch(&[Rect::new(10.0, 10.0, 590.0, 790.0)])).expect("saved");
        writer.save(&batch(&[Rect::new(20.0, 20.0, 580.0, 780.0)])).expect("saved");

        let reread = PdfReader::open(&output).expect("reopen");
        assert_eq!(
            reread.page(0).expect("page").crop_box,
            Some(Rect::new(20.0, 20.0, 580.0, 780.0))
        );
    }

    #[test]
    fn unknown_page_is_rejected() {
        let reader = PdfReader::from_bytes(&sample_pdf(1)).expect("valid PDF");
        let mut writer = PdfCropWriter::new(reader, "unused.pdf");
        assert!(matches!(
            writer.set_crop_box(4, &Rect::new(0.0, 0.0, 10.0, 10.0)),
            Err(FolioError::PageOutOfRange { page_index: 4, page_count: 1 })
        ));
    }

    #[test]
    fn unwritable_output_is_a_pdf_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("missing").join("out.pdf");
        let reader = PdfReader::from_bytes(&sample_pdf(1)).expect("valid PDF");
        let mut writer = PdfCropWriter::new(reader, output);
        assert!(matches!(
            writer.save(&batch(&[Rect::new(0.0, 0.0, 10.0, 10.0)])),
            Err(FolioError::PdfError(_))
        ));
    }

    #[test]
    fn serialises_to_bytes() {
        let reader = PdfReader::from_bytes(&sample_pdf(2)).expect("valid PDF");
        let mut writer = PdfCropWriter::new(reader, "unused.pdf");
        writer.set_crop_box(0, &Rect::new(5.0, 5.0, 100.0, 100.0)).expect("set");
        let bytes = writer.to_bytes().expect("bytes");

        let reread = PdfReader::from_bytes(&bytes).expect("reload");
        assert_eq!(
            reread.crop_box(0).expect("crop box"),
            Some(Rect::new(5.0, 5.0, 100.0, 100.0))
        );
    }
}
