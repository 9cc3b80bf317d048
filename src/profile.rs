//! Serializable recolor profile.
//!
//! A [`RecolorProfile`] captures the color replacements of an editing session
//! in a format that can be saved as JSON and re-applied later, to the same
//! diagram or to another one that shares some of its colors.
//!
//! # Example
//!
//! ```
//! use diagram_studio::{ColorReplacement, RecolorProfile};
//!
//! let profile = RecolorProfile::new()
//!     .with_diagram_id("42")
//!     .with_replacement(ColorReplacement::new("#ff0000".parse().unwrap(), "#0000ff".parse().unwrap()));
//!
//! let json = profile.to_json().unwrap();
//! let restored = RecolorProfile::from_json(&json).unwrap();
//! assert_eq!(restored, profile);
//! ```

use serde::{Deserialize, Serialize};

use crate::color::HexColor;

// ============================================================================
// ColorReplacement
// ============================================================================

/// One entry of a profile: every `original` token becomes `replacement`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorReplacement {
    pub original: HexColor,
    pub replacement: HexColor,
}

impl ColorReplacement {
    pub fn new(original: HexColor, replacement: HexColor) -> Self {
        Self {
            original,
            replacement,
        }
    }
}

// ============================================================================
// RecolorProfile
// ============================================================================

/// A serializable snapshot of a color mapping.
///
/// Only colors that were actually changed are recorded. Replacements are
/// kept in the order they were applied, which matters because substitution
/// is sequential.
///
/// # JSON Format
///
/// ```json
/// {
///   "diagramId": "42",
///   "replacements": [
///     { "original": "#ff0000", "replacement": "#0000ff" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecolorProfile {
    /// The diagram the profile was exported from, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagram_id: Option<String>,

    #[serde(default)]
    pub replacements: Vec<ColorReplacement>,
}

impl RecolorProfile {
    /// Creates an empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_diagram_id(mut self, id: impl Into<String>) -> Self {
        self.diagram_id = Some(id.into());
        self
    }

    /// Appends a replacement.
    pub fn with_replacement(mut self, replacement: ColorReplacement) -> Self {
        self.replacements.push(replacement);
        self
    }

    /// Returns true if the profile changes no color.
    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }

    /// Serializes the profile to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the profile to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a profile from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> HexColor {
        s.parse().unwrap()
    }

    #[test]
    fn profile_json_format() {
        let profile = RecolorProfile::new()
            .with_diagram_id("7")
            .with_replacement(ColorReplacement::new(hex("#ff0000"), hex("#00f")));

        let json = profile.to_json_pretty().unwrap();
        assert!(json.contains("\"diagramId\""));
        assert!(json.contains("\"replacements\""));
        assert!(json.contains("\"#00f\""));
    }

    #[test]
    fn diagram_id_is_optional() {
        let json = RecolorProfile::new().to_json().unwrap();
        assert_eq!(json, r#"{"replacements":[]}"#);
    }

    #[test]
    fn empty_profile_deserializes() {
        let profile = RecolorProfile::from_json("{}").unwrap();
        assert!(profile.is_empty());
        assert!(profile.diagram_id.is_none());
    }

    #[test]
    fn invalid_colors_are_rejected() {
        let json = r##"{"replacements":[{"original":"red","replacement":"#000"}]}"##;
        assert!(RecolorProfile::from_json(json).is_err());
    }
}
