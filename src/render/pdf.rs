//! Single-page PDF documents built from a rasterized preview.

use log::debug;
use printpdf::{Image, ImageTransform, Mm, PdfDocument, image_crate};

use super::{RasterImage, SizePx};
use crate::error::ExportError;

/// CSS reference resolution.
const CSS_DPI: f32 = 96.0;
const MM_PER_INCH: f32 = 25.4;

/// Page background used where the raster is transparent.
const PAPER_WHITE: [u8; 3] = [255, 255, 255];

/// Page orientation of an exported document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Landscape when the element is wider than tall, portrait otherwise.
    pub fn for_size(size: SizePx) -> Self {
        if size.width > size.height {
            Self::Landscape
        } else {
            Self::Portrait
        }
    }

    /// Page width and height for an element of `size` in this orientation.
    fn page_size(self, size: SizePx) -> (u32, u32) {
        let long = size.width.max(size.height);
        let short = size.width.min(size.height);
        match self {
            Self::Landscape => (long, short),
            Self::Portrait => (short, long),
        }
    }
}

fn px_to_mm(px: u32) -> f32 {
    px as f32 * MM_PER_INCH / CSS_DPI
}

/// Wraps `raster` into a one-page PDF the size of the element it was taken from.
///
/// The page measures `raster.css_size` CSS pixels and the image fills it from
/// the origin. Transparent areas are composited over white.
pub fn document_from_raster(raster: &RasterImage, title: &str) -> Result<Vec<u8>, ExportError> {
    let css_size = raster.css_size;
    if css_size.is_empty() {
        return Err(ExportError::EmptyRenderTarget);
    }

    let orientation = Orientation::for_size(css_size);
    let (page_width, page_height) = orientation.page_size(css_size);
    debug!(
        width = page_width,
        height = page_height,
        landscape = orientation == Orientation::Landscape;
        "Creating PDF page"
    );

    let (doc, page, layer) = PdfDocument::new(
        title,
        Mm(px_to_mm(page_width).into()),
        Mm(px_to_mm(page_height).into()),
        "Diagram",
    );

    let flat = raster.flatten(PAPER_WHITE);
    let (width, height) = flat.dimensions();
    let pixels = image_crate::RgbImage::from_raw(width, height, flat.into_raw())
        .ok_or_else(|| ExportError::Encode("raster buffer has the wrong length".into()))?;
    let image = Image::from_dynamic_image(&image_crate::DynamicImage::ImageRgb8(pixels));

    // At this DPI the raster's device pixels span exactly the page.
    let dpi = CSS_DPI * raster.pixel_ratio;
    image.add_to_layer(
        doc.get_page(page).get_layer(layer),
        ImageTransform {
            translate_x: Some(Mm(0.0_f32.into())),
            translate_y: Some(Mm(0.0_f32.into())),
            dpi: Some(dpi.into()),
            ..Default::default()
        },
    );

    doc.save_to_bytes()
        .map_err(|e| ExportError::Encode(format!("{e:?}")))
}
