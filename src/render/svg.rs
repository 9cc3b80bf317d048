//! SVG preview and rasterization using resvg/usvg.

use image::{Rgba, RgbaImage};
use log::debug;
use resvg::tiny_skia::{Color, Pixmap, Transform};
use resvg::usvg::{Options, Tree};

use super::{RasterImage, Rasterizer, SizePx};
use crate::color::HexColor;
use crate::error::ExportError;

// ============================================================================
// SvgPreview
// ============================================================================

/// The element that displays the recolored diagram.
///
/// Holds the markup currently shown and its layout size in CSS pixels. By
/// default the layout size is the SVG's intrinsic size, re-measured whenever
/// the markup changes. Markup that cannot be parsed displays nothing and
/// lays out to 0x0. A host that controls the element's box can pin the size
/// with [`resize`](Self::resize).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgPreview {
    markup: String,
    size: SizePx,
    pinned: bool,
}

impl SvgPreview {
    /// Creates a preview laid out at the markup's intrinsic size.
    pub fn new(markup: impl Into<String>) -> Self {
        let markup = markup.into();
        let size = measure(&markup);
        Self {
            markup,
            size,
            pinned: false,
        }
    }

    /// Creates a preview with a fixed layout size.
    pub fn with_size(markup: impl Into<String>, size: SizePx) -> Self {
        Self {
            markup: markup.into(),
            size,
            pinned: true,
        }
    }

    /// Replaces the displayed markup.
    ///
    /// The layout size is re-measured unless it was pinned.
    pub fn set_markup(&mut self, markup: impl Into<String>) {
        self.markup = markup.into();
        if !self.pinned {
            self.size = measure(&self.markup);
        }
    }

    /// Pins the layout size, as when the hosting box is resized.
    pub fn resize(&mut self, size: SizePx) {
        self.size = size;
        self.pinned = true;
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Layout size in CSS pixels.
    pub fn size(&self) -> SizePx {
        self.size
    }

    /// Returns true once the preview occupies a non-empty box.
    pub fn is_laid_out(&self) -> bool {
        !self.size.is_empty()
    }
}

/// Intrinsic size of `markup`, or 0x0 if it cannot be parsed.
fn measure(markup: &str) -> SizePx {
    match Tree::from_str(markup, &Options::default()) {
        Ok(tree) => {
            let size = tree.size();
            SizePx::new(size.width().ceil() as u32, size.height().ceil() as u32)
        }
        Err(err) => {
            debug!(error = err.to_string(); "Preview markup did not parse, laying out empty");
            SizePx::default()
        }
    }
}

// ============================================================================
// ResvgRasterizer
// ============================================================================

/// Largest canvas the rasterizer allocates, in device pixels (256 MiB of RGBA).
const MAX_CANVAS_PIXELS: u64 = 64 * 1024 * 1024;

/// Rasterizes previews with resvg.
///
/// The SVG is scaled to fit the preview box, centered, and drawn onto a
/// transparent canvas unless a background color is set.
#[derive(Debug, Clone, Default)]
pub struct ResvgRasterizer {
    background: Option<HexColor>,
}

impl ResvgRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills the canvas with `color` before drawing.
    pub fn with_background(mut self, color: Option<HexColor>) -> Self {
        self.background = color;
        self
    }
}

impl Rasterizer for ResvgRasterizer {
    fn rasterize(&self, preview: &SvgPreview, pixel_ratio: f32) -> Result<RasterImage, ExportError> {
        let css_size = preview.size();
        if css_size.is_empty() {
            return Err(ExportError::EmptyRenderTarget);
        }
        if !pixel_ratio.is_finite() || pixel_ratio <= 0.0 {
            return Err(ExportError::Rasterization(format!(
                "invalid pixel ratio {pixel_ratio}"
            )));
        }

        let target = css_size.scaled(pixel_ratio);
        let pixels = u64::from(target.width) * u64::from(target.height);
        if pixels > MAX_CANVAS_PIXELS {
            return Err(ExportError::Rasterization(format!(
                "a {}x{} canvas exceeds the {MAX_CANVAS_PIXELS} pixel limit",
                target.width, target.height
            )));
        }

        let tree = Tree::from_str(preview.markup(), &Options::default())
            .map_err(|e| ExportError::Rasterization(e.to_string()))?;

        let mut pixmap = Pixmap::new(target.width, target.height).ok_or_else(|| {
            ExportError::Rasterization(format!(
                "cannot allocate a {}x{} canvas",
                target.width, target.height
            ))
        })?;

        if let Some(background) = &self.background {
            let rgb = background.to_rgb();
            pixmap.fill(Color::from_rgba8(rgb.red, rgb.green, rgb.blue, 255));
        }

        // Fit within the target while preserving aspect ratio, then center
        let svg_size = tree.size();
        let scale = (target.width as f32 / svg_size.width())
            .min(target.height as f32 / svg_size.height());
        let dx = (target.width as f32 - svg_size.width() * scale) / 2.0;
        let dy = (target.height as f32 - svg_size.height() * scale) / 2.0;
        let transform = Transform::from_row(scale, 0.0, 0.0, scale, dx, dy);
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        debug!(
            width = target.width,
            height = target.height,
            pixel_ratio = pixel_ratio;
            "Rasterized preview"
        );

        Ok(RasterImage::new(
            pixmap_to_rgba_image(&pixmap),
            css_size,
            pixel_ratio,
        ))
    }
}

/// Converts a tiny-skia pixmap (premultiplied) into straight RGBA.
fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    img
}
