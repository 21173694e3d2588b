// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: load page rasters and scale them onto the fixed display
// canvas used for click positions and template matching.

use std::path::{Path, PathBuf};

use folio_core::error::{FolioError, Result};
use folio_engine::PageImageSource;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};
use tracing::{debug, info, instrument};

/// File extensions recognised as page rasters.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp", "gif", "webp"];

/// A single in-memory page image.
///
/// Operations consume `self` and return a new processor, enabling chaining:
///
/// ```ignore
/// let canvas = ImageProcessor::open("page-001.png")?
///     .resize_exact(600, 800)
///     .into_luma();
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let img = image::open(path.as_ref()).map_err(|err| {
            FolioError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        debug!(width = img.width(), height = img.height(), "image loaded");
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Resize the image to exactly `width` x `height`, ignoring aspect ratio.
    pub fn resize_exact(self, width: u32, height: u32) -> Self {
        let resized = self.image.resize_exact(width, height, FilterType::Triangle);
        Self { image: resized }
    }

    /// Consume the processor and return an 8-bit grayscale image.
    pub fn into_luma(self) -> GrayImage {
        self.image.into_luma8()
    }
}

/// One raster per page, read from a directory in file-name order and scaled
/// to the display canvas.
pub struct ImageDirectory {
    paths: Vec<PathBuf>,
    width: u32,
    height: u32,
}

impl ImageDirectory {
    /// Index the page images in `dir`. Files with other extensions are
    /// ignored.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn open(dir: impl AsRef<Path>, width: u32, height: u32) -> Result<Self> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
            if path.is_file() && is_image {
                paths.push(path);
            }
        }
        paths.sort();

        info!(pages = paths.len(), width, height, "page images indexed");
        Ok(Self {
            paths,
            width,
            height,
        })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl PageImageSource for ImageDirectory {
    fn page_count(&self) -> usize {
        self.paths.len()
    }

    fn page_image(&self, page_index: usize) -> Result<GrayImage> {
        let path = self.paths.get(page_index).ok_or(FolioError::PageOutOfRange {
            page_index,
            page_count: self.paths.len(),
        })?;
        Ok(ImageProcessor::open(path)?
            .resize_exact(self.width, self.height)
            .into_luma())
    }
}
