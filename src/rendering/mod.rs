//! Rendering pipeline: layout of document blocks, display list, rasterization

pub mod layout;
pub mod paint;
pub mod raster;

use crate::{Error, Result};
use image::{ImageFormat, RgbaImage};
use sha2::{Digest, Sha256};
use std::io::Cursor;

/// A captured bitmap of a surface.
///
/// `width` and `height` are device pixels, i.e. the surface size multiplied
/// by the capture scale.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub scale: u32,
    pub pixels: RgbaImage,
}

impl RasterImage {
    pub fn new(pixels: RgbaImage, scale: u32) -> Self {
        Self {
            width: pixels.width(),
            height: pixels.height(),
            scale,
            pixels,
        }
    }

    /// PNG encoding of the pixels
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        self.pixels
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| Error::CaptureError(format!("PNG encoding failed: {}", e)))?;
        Ok(buf.into_inner())
    }

    /// Hex SHA-256 over the dimensions and raw pixels
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.width.to_be_bytes());
        hasher.update(self.height.to_be_bytes());
        hasher.update(self.pixels.as_raw());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_encoding_has_signature() {
        let img = RasterImage::new(RgbaImage::from_pixel(4, 3, image::Rgba([255, 0, 0, 255])), 1);
        let png = img.encode_png().unwrap();
        assert_eq!(&png[0..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn digest_depends_on_pixels() {
        let a = RasterImage::new(RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 0, 255])), 1);
        let b = RasterImage::new(RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 1, 255])), 1);
        assert_eq!(a.digest(), a.clone().digest());
        assert_ne!(a.digest(), b.digest());
    }
}
