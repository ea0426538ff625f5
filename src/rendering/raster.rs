//! Surface capture: rasterize a surface snapshot into a bitmap

use crate::rendering::layout::{CHAR_WIDTH, LINE_HEIGHT};
use crate::rendering::paint::PaintCommand;
use crate::rendering::RasterImage;
use crate::surface::{RenderSurface, SurfaceSnapshot};
use crate::{Error, Result, Rgba, WHITE};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use log::{debug, warn};
use url::Url;

/// Upper bound on captured pixels; larger surfaces fail instead of exhausting memory.
const MAX_PIXELS: u64 = 1 << 28;

/// Settings recognized by [`capture`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Device pixel multiplier, at least 1
    pub scale: u32,
    /// Fill for transparent regions
    pub background: Rgba,
    /// Rasterize images served from another origin. Unreadable ones then fail the capture.
    pub allow_external_content: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            scale: 2,
            background: WHITE,
            allow_external_content: true,
        }
    }
}

/// Snapshot `surface` and rasterize it. The surface itself is left untouched.
pub fn capture(surface: &dyn RenderSurface, options: &CaptureOptions) -> Result<RasterImage> {
    let snapshot = surface.snapshot()?;
    rasterize(&snapshot, options)
}

/// Rasterize a snapshot at `options.scale`.
pub fn rasterize(snapshot: &SurfaceSnapshot, options: &CaptureOptions) -> Result<RasterImage> {
    let s = options.scale;
    if s == 0 {
        return Err(Error::CaptureError("scale must be at least 1".into()));
    }
    let (width, height) = match (snapshot.width.checked_mul(s), snapshot.height.checked_mul(s)) {
        (Some(w), Some(h)) if (w as u64) * (h as u64) <= MAX_PIXELS => (w, h),
        _ => {
            return Err(Error::CaptureError(format!(
                "surface {}x{} at scale {} is too large to rasterize",
                snapshot.width, snapshot.height, s
            )))
        }
    };

    let mut canvas = RgbaImage::from_pixel(width, height, image::Rgba(options.background));
    for cmd in &snapshot.commands {
        match cmd {
            PaintCommand::SolidRect {
                x,
                y,
                width,
                height,
                rgba,
            } => fill_rect(
                &mut canvas,
                *x as i64 * s as i64,
                *y as i64 * s as i64,
                *width as i64 * s as i64,
                *height as i64 * s as i64,
                *rgba,
            ),
            PaintCommand::Text {
                x,
                y,
                text,
                size,
                rgba,
            } => draw_text(&mut canvas, *x, *y, text, *size, *rgba, s),
            PaintCommand::Image {
                x,
                y,
                width,
                height,
                source,
                pixels,
            } => {
                if is_cross_origin(source, snapshot.origin.as_ref()) {
                    if !options.allow_external_content {
                        debug!("leaving out cross-origin image {}", source);
                        continue;
                    }
                    if pixels.is_none() {
                        return Err(Error::CaptureError(format!(
                            "cross-origin image {} could not be read",
                            source
                        )));
                    }
                }
                match pixels {
                    Some(px) => draw_image(&mut canvas, *x, *y, *width, *height, px, s)?,
                    None => warn!("image {} has no pixel data, skipping", source),
                }
            }
        }
    }

    debug!(
        "rasterized {}x{} surface into {}x{} image ({} commands)",
        snapshot.width,
        snapshot.height,
        width,
        height,
        snapshot.commands.len()
    );
    Ok(RasterImage::new(canvas, s))
}

fn is_cross_origin(source: &str, origin: Option<&Url>) -> bool {
    if source.starts_with("data:") {
        return false;
    }
    match origin {
        Some(base) => match base.join(source) {
            Ok(resolved) => resolved.origin() != base.origin(),
            Err(_) => true,
        },
        // Without a document origin only absolute URLs point elsewhere.
        None => Url::parse(source).is_ok(),
    }
}

fn blend(dst: &mut image::Rgba<u8>, src: Rgba) {
    let a = src[3] as u32;
    if a == 255 {
        dst.0 = src;
        return;
    }
    if a == 0 {
        return;
    }
    let inv = 255 - a;
    for c in 0..3 {
        dst.0[c] = ((src[c] as u32 * a + dst.0[c] as u32 * inv) / 255) as u8;
    }
    dst.0[3] = (a + dst.0[3] as u32 * inv / 255) as u8;
}

fn fill_rect(canvas: &mut RgbaImage, x: i64, y: i64, width: i64, height: i64, rgba: Rgba) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + width).min(canvas.width() as i64);
    let y1 = (y + height).min(canvas.height() as i64);
    for py in y0..y1 {
        for px in x0..x1 {
            blend(canvas.get_pixel_mut(px as u32, py as u32), rgba);
        }
    }
}

/// Text is drawn greeked: each visible character becomes a filled glyph cell.
fn draw_text(canvas: &mut RgbaImage, x: i32, y: i32, text: &str, size: u32, rgba: Rgba, scale: u32) {
    let s = scale as i64;
    let size = size.max(1) as i64;
    let cell_w = CHAR_WIDTH as i64 * size;
    let line_h = LINE_HEIGHT as i64 * size;
    for (row, line) in text.lines().enumerate() {
        for (col, ch) in line.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let gx = x as i64 + col as i64 * cell_w + size;
            let gy = y as i64 + row as i64 * line_h + 2 * size;
            fill_rect(
                canvas,
                gx * s,
                gy * s,
                (cell_w - 2 * size) * s,
                (line_h - 4 * size) * s,
                rgba,
            );
        }
    }
}

fn draw_image(
    canvas: &mut RgbaImage,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    pixels: &RgbaImage,
    scale: u32,
) -> Result<()> {
    let (w, h) = match (width.checked_mul(scale), height.checked_mul(scale)) {
        (Some(w), Some(h)) if (w as u64) * (h as u64) <= MAX_PIXELS => (w, h),
        _ => {
            return Err(Error::CaptureError(format!(
                "image {}x{} at scale {} is too large to rasterize",
                width, height, scale
            )))
        }
    };
    if w == 0 || h == 0 || pixels.width() == 0 || pixels.height() == 0 {
        return Ok(());
    }
    let (left, top) = (x as i64 * scale as i64, y as i64 * scale as i64);
    if left >= canvas.width() as i64
        || top >= canvas.height() as i64
        || left + w as i64 <= 0
        || top + h as i64 <= 0
    {
        return Ok(());
    }
    let resized = imageops::resize(pixels, w, h, FilterType::Triangle);
    imageops::overlay(canvas, &resized, left, top);
    Ok(())
}
