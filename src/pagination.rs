//! Paginator: slices one tall raster image into fixed-size pages.
//!
//! The image is scaled to the page width; its height in document units
//! follows from the aspect ratio. Every page draws the *whole* image, shifted
//! up by a vertical offset so that exactly one page-high band is visible.

use crate::rendering::RasterImage;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Largest document the paginator produces
pub const MAX_PAGES: usize = 100_000;

/// Page size in document units (millimeters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_width: f64,
    pub page_height: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 295.0,
        }
    }
}

impl PageGeometry {
    /// Number of pages an image of this size needs, counting the trailing
    /// blank page added at exact multiples.
    pub fn page_count(&self, width: u32, height: u32) -> Result<usize> {
        paginate(width, height, *self).map(|(_, frames)| frames.len())
    }
}

/// One page of the output document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    /// 1-based page number
    pub number: usize,
    /// Vertical position of the image top relative to the page top. Zero or negative.
    pub offset: f64,
}

impl PageFrame {
    /// The band of the scaled image `[start, end)` visible on this page
    pub fn visible_band(&self, geometry: &PageGeometry) -> (f64, f64) {
        let start = -self.offset;
        (start, start + geometry.page_height)
    }
}

/// A paginated document, not yet persisted
#[derive(Debug, Clone)]
pub struct OutputDocument {
    pub geometry: PageGeometry,
    /// Height of the image in document units after fitting it to the page width
    pub image_height: f64,
    pub image: Arc<RasterImage>,
    pub frames: Vec<PageFrame>,
}

impl OutputDocument {
    pub fn page_count(&self) -> usize {
        self.frames.len()
    }

    pub fn offsets(&self) -> Vec<f64> {
        self.frames.iter().map(|f| f.offset).collect()
    }
}

/// Compute the page frames for `image`.
///
/// The first page shows the image at offset 0. Each following page is
/// added while the remaining height is non-negative, so an image whose
/// scaled height is an exact multiple of the page height gets one trailing
/// blank page.
///
/// The document shares the image; pass an `Arc` to avoid copying the pixels.
pub fn assemble(image: impl Into<Arc<RasterImage>>, geometry: PageGeometry) -> Result<OutputDocument> {
    let image = image.into();
    let (image_height, frames) = paginate(image.width, image.height, geometry)?;
    Ok(OutputDocument {
        geometry,
        image_height,
        image,
        frames,
    })
}

/// Page frames for an image of `width` x `height` pixels, together with the
/// image height in document units.
pub fn paginate(width: u32, height: u32, geometry: PageGeometry) -> Result<(f64, Vec<PageFrame>)> {
    if !(geometry.page_width > 0.0 && geometry.page_height > 0.0) {
        return Err(Error::AssemblyError(format!(
            "page geometry must be positive, got {}x{}",
            geometry.page_width, geometry.page_height
        )));
    }
    if width == 0 {
        return Err(Error::AssemblyError("captured image has zero width".into()));
    }
    let image_height = height as f64 * geometry.page_width / width as f64;
    let page_height = geometry.page_height;
    if image_height / page_height >= MAX_PAGES as f64 {
        return Err(Error::AssemblyError(format!(
            "{}x{} image would need more than {} pages",
            width, height, MAX_PAGES
        )));
    }

    let mut frames = vec![PageFrame {
        number: 1,
        offset: 0.0,
    }];
    let mut remaining = image_height - page_height;

    while remaining >= 0.0 {
        frames.push(PageFrame {
            number: frames.len() + 1,
            offset: remaining - image_height,
        });
        remaining -= page_height;
    }

    Ok((image_height, frames))
}
