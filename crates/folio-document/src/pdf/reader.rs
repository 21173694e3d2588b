// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: open a document with `lopdf` and expose each page's media box
// and existing crop box as page geometry.

use std::path::Path;

use folio_core::error::{FolioError, Result};
use folio_core::{GeometrySource, PageGeometry, Rect};
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, info, instrument};

/// Read-only view of a PDF's page boxes.
///
/// Word lists are always empty: text extraction is done by an external tool
/// (see [`crate::WordGeometryFile`]).
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
    /// Page object ids in page order.
    page_ids: Vec<ObjectId>,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<String>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        let document = Document::load(path_ref).map_err(|err| {
            FolioError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        let reader = Self::from_document(document, Some(path_ref.display().to_string()))?;
        info!(pages = reader.page_count(), "PDF opened");
        Ok(reader)
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            FolioError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;
        Self::from_document(document, None)
    }

    fn from_document(document: Document, source_path: Option<String>) -> Result<Self> {
        if document.is_encrypted() {
            return Err(FolioError::PdfError("encrypted PDFs are not supported".into()));
        }
        // get_pages is keyed by 1-based page number, so values are in page order.
        let page_ids: Vec<ObjectId> = document.get_pages().values().copied().collect();
        debug!(pages = page_ids.len(), "page tree read");
        Ok(Self {
            document,
            page_ids,
            source_path,
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Return the source path if the reader was created via [`PdfReader::open`].
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    /// The page's MediaBox, inherited from the page tree if not set on the
    /// page itself.
    pub fn media_box(&self, page_index: usize) -> Result<Rect> {
        let page_id = self.page_id(page_index)?;
        self.inherited_box(page_id, b"MediaBox")?.ok_or_else(|| {
            FolioError::PdfError(format!("page {} has no MediaBox", page_index + 1))
        })
    }

    /// The page's CropBox, if one is set on the page or an ancestor.
    pub fn crop_box(&self, page_index: usize) -> Result<Option<Rect>> {
        let page_id = self.page_id(page_index)?;
        self.inherited_box(page_id, b"CropBox")
    }

    pub(crate) fn into_parts(self) -> (Document, Vec<ObjectId>) {
        (self.document, self.page_ids)
    }

    // -- Helpers --------------------------------------------------------------

    fn page_id(&self, page_index: usize) -> Result<ObjectId> {
        self.page_ids
            .get(page_index)
            .copied()
            .ok_or(FolioError::PageOutOfRange {
                page_index,
                page_count: self.page_ids.len(),
            })
    }

    /// Look up a box on the page dictionary, walking up the page tree via
    /// /Parent when the page does not set it.
    fn inherited_box(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<Rect>> {
        let mut current = page_id;
        // Bounded walk; a malformed tree may contain a /Parent cycle.
        for _ in 0..64 {
            let dict = self.document.get_dictionary(current).map_err(|err| {
                FolioError::PdfError(format!("failed to get page dictionary: {err}"))
            })?;

            if let Ok(value) = dict.get(key) {
                return self.parse_box(value).map(Some);
            }

            match dict.get(b"Parent").and_then(Object::as_reference) {
                Ok(parent) => current = parent,
                Err(_) => return Ok(None),
            }
        }
        Err(FolioError::PdfError("page tree is nested too deeply".into()))
    }

    fn parse_box(&self, value: &Object) -> Result<Rect> {
        let array = self
            .resolve(value)?
            .as_array()
            .map_err(|err| FolioError::PdfError(format!("page box is not an array: {err}")))?;
        if array.len() != 4 {
            return Err(FolioError::PdfError(format!(
                "page box has {} entries, expected 4",
                array.len()
            )));
        }

        let mut coords = [0.0f64; 4];
        for (slot, item) in coords.iter_mut().zip(array) {
            let number = self.resolve(item)?.as_float().map_err(|err| {
                FolioError::PdfError(format!("page box entry is not a number: {err}"))
            })?;
            *slot = f64::from(number);
        }
        Ok(Rect::from_corners((coords[0], coords[1]), (coords[2], coords[3])))
    }

    fn resolve<'a>(&'a self, value: &'a Object) -> Result<&'a Object> {
        match value {
            Object::Reference(id) => self.document.get_object(*id).map_err(|err| {
                FolioError::PdfError(format!("cannot resolve reference {id:?}: {err}"))
            }),
            other => Ok(other),
        }
    }
}

impl GeometrySource for PdfReader {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn page(&self, page_index: usize) -> Result<PageGeometry> {
        let media_box = self.media_box(page_index)?;
        // A crop box equal to the media box carries no information; one that
        // extends past it is clipped as PDF viewers do.
        let crop_box = self
            .crop_box(page_index)?
            .and_then(|crop| crop.intersection(&media_box))
            .filter(|crop| *crop != media_box);

        Ok(PageGeometry {
            crop_box,
            ..PageGeometry::blank(page_index, media_box)
        })
    }
}
