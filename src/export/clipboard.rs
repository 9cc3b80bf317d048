//! Copying the rasterized preview to a clipboard.

use log::{info, warn};
use thiserror::Error;

use crate::error::ExportError;
use crate::render::{Rasterizer, SvgPreview};

/// Why a clipboard refused an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClipboardError {
    #[error("clipboard access was denied")]
    PermissionDenied,

    #[error("clipboard does not accept images")]
    Unsupported,
}

/// A platform clipboard that can hold a PNG image.
pub trait Clipboard {
    fn write_image(&self, png: &[u8]) -> Result<(), ClipboardError>;
}

impl<C: Clipboard + ?Sized> Clipboard for &C {
    fn write_image(&self, png: &[u8]) -> Result<(), ClipboardError> {
        (**self).write_image(png)
    }
}

/// Rasterizes `preview` and writes it to `clipboard` as PNG.
///
/// Rasterization problems are reported as such; only a refusal by the
/// clipboard itself becomes [`ExportError::ClipboardUnavailable`].
pub fn copy_image<R, C>(
    rasterizer: &R,
    clipboard: &C,
    preview: &SvgPreview,
    pixel_ratio: f32,
) -> Result<(), ExportError>
where
    R: Rasterizer + ?Sized,
    C: Clipboard + ?Sized,
{
    let raster = rasterizer.rasterize(preview, pixel_ratio)?;
    let png = raster.encode_png()?;

    clipboard.write_image(&png).map_err(|err| {
        warn!(error = err.to_string(); "Clipboard rejected image");
        ExportError::ClipboardUnavailable(err.to_string())
    })?;

    info!(bytes = png.len(); "Copied preview to clipboard");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RasterImage, SizePx};
    use image::{Rgba, RgbaImage};
    use std::cell::RefCell;

    struct SolidRasterizer;

    impl Rasterizer for SolidRasterizer {
        fn rasterize(&self, preview: &SvgPreview, pixel_ratio: f32) -> Result<RasterImage, ExportError> {
            if !preview.is_laid_out() {
                return Err(ExportError::EmptyRenderTarget);
            }
            let size = preview.size().scaled(pixel_ratio);
            let data = RgbaImage::from_pixel(size.width, size.height, Rgba([0, 0, 0, 255]));
            Ok(RasterImage::new(data, preview.size(), pixel_ratio))
        }
    }

    #[derive(Default)]
    struct RecordingClipboard {
        refuse: Option<ClipboardError>,
        written: RefCell<Vec<Vec<u8>>>,
    }

    impl Clipboard for RecordingClipboard {
        fn write_image(&self, png: &[u8]) -> Result<(), ClipboardError> {
            if let Some(err) = self.refuse {
                return Err(err);
            }
            self.written.borrow_mut().push(png.to_vec());
            Ok(())
        }
    }

    fn preview() -> SvgPreview {
        SvgPreview::with_size("<svg/>", SizePx::new(4, 4))
    }

    #[test]
    fn writes_png_to_clipboard() {
        let clipboard = RecordingClipboard::default();
        copy_image(&SolidRasterizer, &clipboard, &preview(), 2.0).unwrap();

        let written = clipboard.written.borrow();
        assert_eq!(written.len(), 1);
        assert!(written[0].starts_with(b"\x89PNG"));
    }

    #[test]
    fn permission_denied_is_clipboard_unavailable() {
        let clipboard = RecordingClipboard {
            refuse: Some(ClipboardError::PermissionDenied),
            ..Default::default()
        };
        let err = copy_image(&SolidRasterizer, &clipboard, &preview(), 2.0).unwrap_err();
        assert!(matches!(err, ExportError::ClipboardUnavailable(_)));
    }

    #[test]
    fn unsupported_clipboard_is_clipboard_unavailable() {
        let clipboard = RecordingClipboard {
            refuse: Some(ClipboardError::Unsupported),
            ..Default::default()
        };
        let err = copy_image(&SolidRasterizer, &clipboard, &preview(), 2.0).unwrap_err();
        assert_eq!(
            err,
            ExportError::ClipboardUnavailable("clipboard does not accept images".into())
        );
    }

    #[test]
    fn rasterization_failure_is_not_a_clipboard_failure() {
        let clipboard = RecordingClipboard::default();
        let empty = SvgPreview::with_size("<svg/>", SizePx::new(0, 0));
        let err = copy_image(&SolidRasterizer, &clipboard, &empty, 2.0).unwrap_err();
        assert_eq!(err, ExportError::EmptyRenderTarget);
        assert!(clipboard.written.borrow().is_empty());
    }
}
