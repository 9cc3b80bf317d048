//! Export artifacts and the actions that produce them.
//!
//! - [`download`]: per-format downloads through a [`FileSaver`]
//! - [`clipboard`]: copying the rasterized preview to a [`Clipboard`]

pub mod clipboard;
pub mod download;

pub use clipboard::{Clipboard, ClipboardError, copy_image};
pub use download::{DirectorySaver, Download, DownloadState, Exporter, FileSaver};

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// A downloadable format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Svg,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [Self::Png, Self::Svg, Self::Pdf];

    /// Lowercase name, also used as the file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Svg => crate::render::SVG_MIME,
            Self::Pdf => "application/pdf",
        }
    }

    /// Returns true if producing this format needs a laid-out preview.
    pub fn needs_layout(self) -> bool {
        !matches!(self, Self::Svg)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            "pdf" => Ok(Self::Pdf),
            other => Err(format!("unknown export format {other:?} (expected png, svg or pdf)")),
        }
    }
}

/// File name for a download: `<title>_<format>.<format>` with every run of
/// whitespace in the title replaced by a single underscore.
///
/// ```
/// use diagram_studio::{ExportFormat, export_filename};
///
/// assert_eq!(export_filename("Diagram  Title", ExportFormat::Svg), "Diagram_Title_svg.svg");
/// ```
pub fn export_filename(title: &str, format: ExportFormat) -> String {
    let stem = WHITESPACE_RUN.replace_all(title, "_");
    let ext = format.extension();
    format!("{stem}_{ext}.{ext}")
}

/// A finished export, alive only for the duration of one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn new(title: &str, format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self {
            filename: export_filename(title, format),
            mime_type: format.mime_type(),
            bytes,
        }
    }
}
