//! Per-diagram editing: recoloring, live preview and export.

use log::{debug, warn};

use crate::catalog::Diagram;
use crate::color::HexColor;
use crate::error::ExportError;
use crate::export::{Clipboard, Download, ExportFormat, Exporter, FileSaver, copy_image};
use crate::profile::{ColorReplacement, RecolorProfile};
use crate::recolor::RecolorSession;
use crate::render::{Rasterizer, SvgPreview};

// ============================================================================
// Configurable Trait
// ============================================================================

/// Trait for types whose colors can be set from a [`RecolorProfile`].
pub trait Configurable {
    /// Applies a profile's replacements to this instance.
    fn apply_profile(&mut self, profile: &RecolorProfile);

    /// Exports the current replacements as a profile.
    fn export_profile(&self) -> RecolorProfile;
}

impl Configurable for RecolorSession {
    /// Resets the session, then applies each replacement in order.
    ///
    /// Replacements for colors the diagram does not contain are skipped.
    fn apply_profile(&mut self, profile: &RecolorProfile) {
        self.reset();
        for entry in &profile.replacements {
            if self.current_color(&entry.original).is_none() {
                warn!(color = entry.original.as_str(); "Skipping profile color not in diagram");
                continue;
            }
            self.set_color(&entry.original, entry.replacement.clone());
        }
    }

    /// Records only the colors that differ from their original.
    fn export_profile(&self) -> RecolorProfile {
        RecolorProfile {
            diagram_id: None,
            replacements: self
                .mapping()
                .changed()
                .map(|(original, replacement)| {
                    ColorReplacement::new(original.clone(), replacement.clone())
                })
                .collect(),
        }
    }
}

// ============================================================================
// Editor
// ============================================================================

/// One editing session for one diagram.
///
/// `Editor` keeps the recoloring state and the preview in sync: every color
/// change pushes the recolored markup into the preview, which is what PNG
/// and PDF exports rasterize. Exports borrow the editor immutably.
///
/// # Example
///
/// ```
/// use diagram_studio::catalog::{Diagram, DiagramId};
/// use diagram_studio::Editor;
///
/// let diagram = Diagram {
///     id: DiagramId::new("1"),
///     title: "Flow".into(),
///     description: String::new(),
///     tags: Vec::new(),
///     colors: Vec::new(),
///     svg_url: String::new(),
///     created_at: 0,
///     updated_at: 0,
/// };
/// let mut editor = Editor::open(diagram, r##"<svg><rect fill="#ff0000"/></svg>"##);
///
/// editor.set_color(&"#ff0000".parse().unwrap(), "#00ff00".parse().unwrap());
/// assert!(editor.preview().markup().contains("#00ff00"));
/// ```
#[derive(Debug, Clone)]
pub struct Editor {
    diagram: Diagram,
    session: RecolorSession,
    preview: SvgPreview,
}

impl Editor {
    /// Opens `svg` for editing. The preview starts out showing it unchanged.
    pub fn open(diagram: Diagram, svg: impl Into<String>) -> Self {
        let session = RecolorSession::load(svg);
        let preview = SvgPreview::new(session.derived_svg());
        debug!(
            id = diagram.id.as_str(),
            colors = session.original_colors().len();
            "Opened editor"
        );
        Self {
            diagram,
            session,
            preview,
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// Title used for export file names.
    pub fn title(&self) -> &str {
        &self.diagram.title
    }

    pub fn session(&self) -> &RecolorSession {
        &self.session
    }

    pub fn preview(&self) -> &SvgPreview {
        &self.preview
    }

    /// Mutable access to the preview, for hosts that size it.
    pub fn preview_mut(&mut self) -> &mut SvgPreview {
        &mut self.preview
    }

    /// Replaces `original` with `replacement`. Returns true if anything changed.
    pub fn set_color(&mut self, original: &HexColor, replacement: HexColor) -> bool {
        let changed = self.session.set_color(original, replacement);
        if changed {
            self.sync_preview();
        }
        changed
    }

    /// Restores every color to its original.
    pub fn reset(&mut self) {
        self.session.reset();
        self.sync_preview();
    }

    /// Exports the current state as `format` and saves it.
    pub fn download<R, S>(&self, exporter: &Exporter<R, S>, format: ExportFormat) -> Download
    where
        R: Rasterizer,
        S: FileSaver,
    {
        exporter.download(
            format,
            self.title(),
            self.session.derived_svg(),
            &self.preview,
        )
    }

    /// Copies the rendered preview to `clipboard` as PNG.
    pub fn copy_image<R, C>(
        &self,
        rasterizer: &R,
        clipboard: &C,
        pixel_ratio: f32,
    ) -> Result<(), ExportError>
    where
        R: Rasterizer + ?Sized,
        C: Clipboard + ?Sized,
    {
        copy_image(rasterizer, clipboard, &self.preview, pixel_ratio)
    }

    fn sync_preview(&mut self) {
        self.preview.set_markup(self.session.derived_svg());
    }
}

impl Configurable for Editor {
    fn apply_profile(&mut self, profile: &RecolorProfile) {
        if let Some(id) = profile
            .diagram_id
            .as_deref()
            .filter(|id| *id != self.diagram.id.as_str())
        {
            debug!(from = id, to = self.diagram.id.as_str(); "Applying profile from another diagram");
        }
        self.session.apply_profile(profile);
        self.sync_preview();
    }

    fn export_profile(&self) -> RecolorProfile {
        let mut profile = self.session.export_profile();
        profile.diagram_id = Some(self.diagram.id.to_string());
        profile
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DiagramId;
    use crate::export::DownloadState;
    use crate::render::{RasterImage, SizePx};
    use image::{Rgba, RgbaImage};
    use std::cell::RefCell;

    const SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="30" height="20"><rect width="30" height="20" fill="#ff0000"/><circle r="2" fill="#00ff00"/></svg>"##;

    fn hex(s: &str) -> HexColor {
        s.parse().unwrap()
    }

    fn diagram() -> Diagram {
        Diagram {
            id: DiagramId::new("7"),
            title: "My Diagram".into(),
            description: String::new(),
            tags: Vec::new(),
            colors: Vec::new(),
            svg_url: String::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    struct MarkupRasterizer {
        seen: RefCell<Vec<String>>,
    }

    impl Rasterizer for MarkupRasterizer {
        fn rasterize(&self, preview: &SvgPreview, pixel_ratio: f32) -> Result<RasterImage, ExportError> {
            self.seen.borrow_mut().push(preview.markup().to_string());
            let size = preview.size().scaled(pixel_ratio);
            let data = RgbaImage::from_pixel(size.width, size.height, Rgba([1, 2, 3, 255]));
            Ok(RasterImage::new(data, preview.size(), pixel_ratio))
        }
    }

    #[derive(Default)]
    struct MemorySaver {
        saved: RefCell<Vec<crate::export::ExportArtifact>>,
    }

    impl FileSaver for MemorySaver {
        fn save(&self, artifact: &crate::export::ExportArtifact) -> Result<(), ExportError> {
            self.saved.borrow_mut().push(artifact.clone());
            Ok(())
        }
    }

    #[test]
    fn preview_follows_color_changes() {
        let mut editor = Editor::open(diagram(), SVG);
        assert_eq!(editor.preview().markup(), SVG);
        assert_eq!(editor.preview().size(), SizePx::new(30, 20));

        assert!(editor.set_color(&hex("#ff0000"), hex("#0000ff")));
        assert!(editor.preview().markup().contains("#0000ff"));
        assert_eq!(editor.preview().markup(), editor.session().derived_svg());

        editor.reset();
        assert_eq!(editor.preview().markup(), SVG);
    }

    #[test]
    fn unknown_color_leaves_preview_alone() {
        let mut editor = Editor::open(diagram(), SVG);
        assert!(!editor.set_color(&hex("#123456"), hex("#000000")));
        assert_eq!(editor.preview().markup(), SVG);
    }

    #[test]
    fn png_export_rasterizes_the_recolored_preview() {
        let mut editor = Editor::open(diagram(), SVG);
        editor.set_color(&hex("#00ff00"), hex("#ffff00"));

        let rasterizer = MarkupRasterizer {
            seen: RefCell::new(Vec::new()),
        };
        let saver = MemorySaver::default();
        let exporter = Exporter::new(&rasterizer, &saver);

        let download = editor.download(&exporter, ExportFormat::Png);
        assert_eq!(download.state(), DownloadState::Success);
        assert_eq!(download.filename(), "My_Diagram_png.png");
        assert!(rasterizer.seen.borrow()[0].contains("#ffff00"));
    }

    #[test]
    fn failed_export_keeps_editor_state() {
        let mut editor = Editor::open(diagram(), SVG);
        editor.set_color(&hex("#ff0000"), hex("#0000ff"));
        editor.preview_mut().resize(SizePx::new(0, 0));
        let before = editor.session().derived_svg().to_string();

        let rasterizer = MarkupRasterizer {
            seen: RefCell::new(Vec::new()),
        };
        let exporter = Exporter::new(&rasterizer, MemorySaver::default());
        let download = editor.download(&exporter, ExportFormat::Pdf);

        assert_eq!(download.error(), Some(&ExportError::EmptyRenderTarget));
        assert!(rasterizer.seen.borrow().is_empty());
        assert_eq!(editor.session().derived_svg(), before);
        assert_eq!(editor.session().current_color(&hex("#ff0000")), Some(&hex("#0000ff")));
    }

    #[test]
    fn profile_export_includes_only_changes() {
        let mut editor = Editor::open(diagram(), SVG);
        editor.set_color(&hex("#00ff00"), hex("#abcdef"));

        let profile = editor.export_profile();
        assert_eq!(profile.diagram_id.as_deref(), Some("7"));
        assert_eq!(
            profile.replacements,
            [ColorReplacement::new(hex("#00ff00"), hex("#abcdef"))]
        );
    }

    #[test]
    fn profile_apply_resets_and_skips_unknown_colors() {
        let mut editor = Editor::open(diagram(), SVG);
        editor.set_color(&hex("#ff0000"), hex("#111111"));

        let profile = RecolorProfile::new()
            .with_replacement(ColorReplacement::new(hex("#00ff00"), hex("#222222")))
            .with_replacement(ColorReplacement::new(hex("#999999"), hex("#333333")));
        editor.apply_profile(&profile);

        let session = editor.session();
        assert_eq!(session.current_color(&hex("#ff0000")), Some(&hex("#ff0000")));
        assert_eq!(session.current_color(&hex("#00ff00")), Some(&hex("#222222")));
        assert!(editor.preview().markup().contains("#222222"));
        assert!(!editor.preview().markup().contains("#333333"));
    }

    #[test]
    fn profile_round_trips_between_sessions() {
        let mut first = RecolorSession::load(SVG);
        first.set_color(&hex("#ff0000"), hex("#0a0a0a"));
        let json = first.export_profile().to_json().unwrap();

        let mut second = RecolorSession::load(SVG);
        second.apply_profile(&RecolorProfile::from_json(&json).unwrap());
        assert_eq!(second.derived_svg(), first.derived_svg());
    }
}
