//! diagram-studio: SVG diagram catalog with a recoloring editor
//!
//! This crate recolors SVG diagrams by rewriting their hex color tokens and
//! exports the result as PNG, SVG or PDF, or copies it to a clipboard. A small
//! catalog layer handles uploads, AI-proposed metadata and the gallery.
//!
//! # Example
//!
//! ```
//! use diagram_studio::{RecolorSession, extract_colors};
//!
//! let svg = r##"<svg><rect fill="#ff0000"/><path stroke="#00f"/></svg>"##;
//! assert_eq!(extract_colors(svg).len(), 2);
//!
//! let mut session = RecolorSession::load(svg);
//! session.set_color(&"#00f".parse().unwrap(), "#00ff00".parse().unwrap());
//! assert!(session.derived_svg().contains(r##"stroke="#00ff00""##));
//! ```
//!
//! # Exporting
//!
//! An [`Editor`] keeps a [`SvgPreview`] in sync with the recolored markup.
//! An [`Exporter`] renders that preview through a [`Rasterizer`] for PNG and
//! PDF, takes the recolored markup verbatim for SVG, and hands the artifact
//! to a [`FileSaver`]:
//!
//! ```no_run
//! use diagram_studio::catalog::{Diagram, DiagramId};
//! use diagram_studio::{DirectorySaver, Editor, ExportFormat, Exporter, ResvgRasterizer};
//!
//! # let diagram = Diagram {
//! #     id: DiagramId::new("1"), title: "Flow".into(), description: String::new(),
//! #     tags: Vec::new(), colors: Vec::new(), svg_url: String::new(),
//! #     created_at: 0, updated_at: 0,
//! # };
//! let editor = Editor::open(diagram, std::fs::read_to_string("flow.svg").unwrap());
//! let exporter = Exporter::new(ResvgRasterizer::new(), DirectorySaver::new("out"));
//!
//! let download = editor.download(&exporter, ExportFormat::Pdf);
//! if let Some(message) = download.message() {
//!     eprintln!("{message}");
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod export;
pub mod recolor;
pub mod render;

#[cfg(feature = "clap")]
pub mod cli;

mod color;
mod editor;
mod error;
mod profile;

pub use color::{ColorParseError, HexColor, extract_colors};
pub use config::{ConfigError, StudioConfig};
pub use editor::{Configurable, Editor};
pub use error::ExportError;
pub use export::{
    Clipboard, ClipboardError, DirectorySaver, Download, DownloadState, ExportArtifact,
    ExportFormat, Exporter, FileSaver, copy_image, export_filename,
};
pub use profile::{ColorReplacement, RecolorProfile};
pub use recolor::{ColorMapping, RecolorSession, substitute};
pub use render::{
    DEFAULT_PIXEL_RATIO, Orientation, RasterImage, Rasterizer, ResvgRasterizer, SizePx, SvgPreview,
};
