//! Rendering the live preview into export artifacts.
//!
//! The editor keeps an [`SvgPreview`] in sync with the recolored markup.
//! A [`Rasterizer`] turns that preview into a [`RasterImage`]; the
//! [`pdf`] module wraps a raster into a single-page document. The raster
//! engine sits behind a trait so the recoloring and export logic can be
//! exercised without it.

pub mod pdf;
pub mod svg;

pub use pdf::{Orientation, document_from_raster};
pub use svg::{ResvgRasterizer, SvgPreview};

use std::io::Cursor;

use image::{ImageFormat, RgbImage, RgbaImage};

use crate::error::ExportError;

/// Oversampling factor used for raster exports.
pub const DEFAULT_PIXEL_RATIO: f32 = 2.0;

/// MIME type of verbatim SVG exports.
pub const SVG_MIME: &str = "image/svg+xml";

/// A 2D size in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Multiplies both dimensions by `ratio`, rounding up.
    pub fn scaled(&self, ratio: f32) -> SizePx {
        SizePx::new(
            (self.width as f32 * ratio).ceil() as u32,
            (self.height as f32 * ratio).ceil() as u32,
        )
    }
}

// ============================================================================
// RasterImage
// ============================================================================

/// A rasterized preview.
///
/// `data` holds `css_size * pixel_ratio` pixels; `css_size` is the size of the
/// preview element the raster was taken from.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    /// Straight (non-premultiplied) RGBA pixels.
    pub data: RgbaImage,

    /// Layout size of the source element in CSS pixels.
    pub css_size: SizePx,

    /// Device pixels per CSS pixel.
    pub pixel_ratio: f32,
}

impl RasterImage {
    pub fn new(data: RgbaImage, css_size: SizePx, pixel_ratio: f32) -> Self {
        Self {
            data,
            css_size,
            pixel_ratio,
        }
    }

    /// Returns the pixel dimensions of the image.
    pub fn dimensions(&self) -> SizePx {
        SizePx::new(self.data.width(), self.data.height())
    }

    /// Encodes the image as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, ExportError> {
        let mut bytes = Vec::new();
        self.data
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| ExportError::Encode(e.to_string()))?;
        Ok(bytes)
    }

    /// Composites the image over an opaque background color.
    pub fn flatten(&self, background: [u8; 3]) -> RgbImage {
        let mut out = RgbImage::new(self.data.width(), self.data.height());
        for (dst, src) in out.pixels_mut().zip(self.data.pixels()) {
            let [r, g, b, a] = src.0;
            let alpha = a as u32;
            let mix = |fg: u8, bg: u8| -> u8 {
                ((fg as u32 * alpha + bg as u32 * (255 - alpha) + 127) / 255) as u8
            };
            dst.0 = [
                mix(r, background[0]),
                mix(g, background[1]),
                mix(b, background[2]),
            ];
        }
        out
    }
}

// ============================================================================
// Rasterizer
// ============================================================================

/// Renders a preview element into pixels.
///
/// Implementations must fail with [`ExportError::EmptyRenderTarget`] when the
/// preview has no layout size, and with [`ExportError::Rasterization`] for
/// engine failures.
pub trait Rasterizer {
    fn rasterize(&self, preview: &SvgPreview, pixel_ratio: f32) -> Result<RasterImage, ExportError>;
}

impl<R: Rasterizer + ?Sized> Rasterizer for &R {
    fn rasterize(&self, preview: &SvgPreview, pixel_ratio: f32) -> Result<RasterImage, ExportError> {
        (**self).rasterize(preview, pixel_ratio)
    }
}

/// Returns `svg` as the bytes of a verbatim SVG export.
///
/// No rasterization is involved, so this works regardless of layout. The
/// only failure is markup that is empty or whitespace.
pub fn svg_bytes(svg: &str) -> Result<Vec<u8>, ExportError> {
    if svg.trim().is_empty() {
        return Err(ExportError::EmptyDocument);
    }
    Ok(svg.as_bytes().to_vec())
}
