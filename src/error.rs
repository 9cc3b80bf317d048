//! Errors raised by the export pipeline.

use thiserror::Error;

/// A failed export, download or clipboard copy.
///
/// These never escape as panics: the download orchestrator turns them into a
/// failed outcome carrying [`user_message`](Self::user_message).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// The preview has no layout size yet. Retry once layout has settled.
    #[error("preview has zero width or height")]
    EmptyRenderTarget,

    /// The raster engine could not produce an image.
    #[error("rasterization failed: {0}")]
    Rasterization(String),

    /// The clipboard refused the image or cannot hold images at all.
    #[error("clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    /// There is no SVG markup to export.
    #[error("SVG document is empty")]
    EmptyDocument,

    /// Encoding the artifact (PNG or PDF) failed.
    #[error("encoding failed: {0}")]
    Encode(String),

    /// The finished artifact could not be saved.
    #[error("saving failed: {0}")]
    Save(String),
}

impl ExportError {
    /// The message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::ClipboardUnavailable(_) => {
                "Copying is not available here. Allow clipboard access or use a download instead."
                    .to_string()
            }
            other => format!("Download failed: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_messages_include_the_cause() {
        let msg = ExportError::Rasterization("tainted canvas".into()).user_message();
        assert!(msg.starts_with("Download failed"));
        assert!(msg.contains("tainted canvas"));
    }

    #[test]
    fn clipboard_message_suggests_download() {
        let msg = ExportError::ClipboardUnavailable("denied".into()).user_message();
        assert!(!msg.starts_with("Download failed"));
        assert!(msg.contains("download"));
    }
}
