//! Recoloring state for one editing session.

use log::{debug, warn};

use super::mapping::{ColorMapping, substitute};
use crate::color::{HexColor, extract_colors};

/// Owns the editable state of one diagram: the raw markup, the colors found
/// in it, the current color mapping and the recolored markup derived from
/// them.
///
/// The raw markup and the original colors are fixed by [`load`](Self::load).
/// The derived markup is recomputed on every mapping change and is never
/// edited directly.
///
/// # Example
///
/// ```
/// use diagram_studio::RecolorSession;
///
/// let mut session = RecolorSession::load(r##"<svg><rect fill="#ff0000"/></svg>"##);
/// let red = session.original_colors()[0].clone();
///
/// session.set_color(&red, "#0000ff".parse().unwrap());
/// assert_eq!(session.derived_svg(), r##"<svg><rect fill="#0000ff"/></svg>"##);
///
/// session.reset();
/// assert_eq!(session.derived_svg(), session.raw_svg());
/// ```
#[derive(Debug, Clone)]
pub struct RecolorSession {
    raw: String,
    originals: Vec<HexColor>,
    mapping: ColorMapping,
    derived: String,
}

impl RecolorSession {
    /// Starts a session on `svg`, mapping every color found to itself.
    pub fn load(svg: impl Into<String>) -> Self {
        let raw = svg.into();
        let originals = extract_colors(&raw);
        let mapping = ColorMapping::identity(&originals);
        debug!(colors = originals.len(); "Loaded SVG for recoloring");

        Self {
            derived: raw.clone(),
            raw,
            originals,
            mapping,
        }
    }

    /// The markup the session was loaded with.
    pub fn raw_svg(&self) -> &str {
        &self.raw
    }

    /// The markup with the current mapping applied.
    pub fn derived_svg(&self) -> &str {
        &self.derived
    }

    /// The distinct colors found at load time, in first-seen order.
    pub fn original_colors(&self) -> &[HexColor] {
        &self.originals
    }

    pub fn mapping(&self) -> &ColorMapping {
        &self.mapping
    }

    /// Returns the replacement currently assigned to `original`.
    pub fn current_color(&self, original: &HexColor) -> Option<&HexColor> {
        self.mapping.get(original)
    }

    /// Replaces `original` with `replacement` and recomputes the derived markup.
    ///
    /// Returns true if the mapping changed. A color that was not found at
    /// load time leaves the session untouched.
    pub fn set_color(&mut self, original: &HexColor, replacement: HexColor) -> bool {
        if !self.mapping.contains(original) {
            warn!(color = original.as_str(); "Ignoring color not present in the diagram");
            return false;
        }

        let changed = self.mapping.set(original, replacement);
        if changed {
            self.recompute();
        }
        changed
    }

    /// Maps every color back to itself.
    pub fn reset(&mut self) {
        self.mapping.reset();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.derived = substitute(&self.raw, &self.mapping);
        debug!(
            changed = self.mapping.changed().count(),
            bytes = self.derived.len();
            "Recomputed derived SVG"
        );
    }
}
