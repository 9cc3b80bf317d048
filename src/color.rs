//! Hex color tokens and their extraction from SVG markup.
//!
//! Only literal hex colors (`#rgb` and `#rrggbb`) are recognized. Named
//! colors, `rgb()` functions and CSS variables are left alone: they are not
//! offered for recoloring and are never rewritten.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use indexmap::IndexSet;
use palette::Srgb;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Matches a color token anywhere in the text. The six-digit alternative is
/// tried first, and there is no word boundary: `#abcd` yields `#abc`.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[0-9a-fA-F]{6}|#[0-9a-fA-F]{3}").expect("valid token regex"));

/// Matches a complete, standalone color token.
static EXACT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid exact regex")
});

// ============================================================================
// HexColor
// ============================================================================

/// Error returned when a string is not a `#rgb` or `#rrggbb` token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex color {0:?}: expected #rgb or #rrggbb")]
pub struct ColorParseError(pub String);

/// A single hex color token, kept exactly as written.
///
/// The original spelling matters: substitution is textual, so `#FF0000` and
/// `#ff0000` are different tokens even though they name the same color.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Returns the token as written, including the leading `#`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the token to an 8-bit sRGB color.
    pub fn to_rgb(&self) -> Srgb<u8> {
        // Validated on construction, so palette's hex parser always accepts it.
        Srgb::from_str(&self.0).unwrap_or_else(|_| Srgb::new(0, 0, 0))
    }

    /// Builds a lowercase six-digit token from an sRGB color.
    pub fn from_rgb(rgb: Srgb<u8>) -> Self {
        Self(format!(
            "#{:02x}{:02x}{:02x}",
            rgb.red, rgb.green, rgb.blue
        ))
    }

    /// Returns the lowercase six-digit spelling of this color.
    ///
    /// `#F0a` normalizes to `#ff00aa`.
    pub fn normalized(&self) -> Self {
        Self::from_rgb(self.to_rgb())
    }
}

impl FromStr for HexColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if EXACT_PATTERN.is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(ColorParseError(s.to_string()))
        }
    }
}

impl TryFrom<String> for HexColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if EXACT_PATTERN.is_match(&value) {
            Ok(Self(value))
        } else {
            Err(ColorParseError(value))
        }
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}

impl AsRef<str> for HexColor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// Returns the distinct hex color tokens of `svg` in first-seen order.
///
/// # Example
///
/// ```
/// use diagram_studio::extract_colors;
///
/// let colors = extract_colors(r##"<rect fill="#ff0000"/><circle fill="#0f0" stroke="#ff0000"/>"##);
/// let tokens: Vec<&str> = colors.iter().map(|c| c.as_str()).collect();
/// assert_eq!(tokens, ["#ff0000", "#0f0"]);
/// ```
pub fn extract_colors(svg: &str) -> Vec<HexColor> {
    let unique: IndexSet<&str> = TOKEN_PATTERN.find_iter(svg).map(|m| m.as_str()).collect();
    unique
        .into_iter()
        .map(|token| HexColor(token.to_string()))
        .collect()
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    fn hex_token_strategy() -> impl Strategy<Value = String> {
        "#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})"
    }

    /// Tokens drawn from a small pool so that repeats and case variants are common.
    fn repeating_token_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            prop::sample::select(vec!["#fff", "#FFF", "#ffffff", "#ff0000", "#00ff00", "#123"])
                .prop_map(String::from),
            hex_token_strategy(),
        ]
    }

    /// Markup where every token sits in its own attribute, so the expected
    /// extraction is known.
    fn delimited_svg_strategy() -> impl Strategy<Value = (String, Vec<String>)> {
        prop::collection::vec(repeating_token_strategy(), 0..16).prop_map(|tokens| {
            let body: String = tokens
                .iter()
                .map(|t| format!(r#"<rect fill="{t}"/>"#))
                .collect();
            (format!("<svg>{body}</svg>"), tokens)
        })
    }

    /// Arbitrary text dense in `#` and hex digits.
    fn noisy_text_strategy() -> impl Strategy<Value = String> {
        "[#0-9a-fA-Fgxz <>=\"/]{0,64}"
    }

    // ===================
    // Property Test Functions
    // ===================

    fn check_extraction_is_well_formed_and_unique(text: &str) -> Result<(), TestCaseError> {
        let colors = extract_colors(text);
        for (i, color) in colors.iter().enumerate() {
            prop_assert!(
                color.as_str().parse::<HexColor>().is_ok(),
                "malformed token {color}"
            );
            prop_assert!(text.contains(color.as_str()), "{color} not in text");
            prop_assert!(!colors[..i].contains(color), "duplicate token {color}");
        }
        Ok(())
    }

    fn check_extraction_follows_first_seen_order(
        svg: &str,
        tokens: &[String],
    ) -> Result<(), TestCaseError> {
        let mut expected: Vec<&str> = Vec::new();
        for token in tokens {
            if !expected.contains(&token.as_str()) {
                expected.push(token);
            }
        }

        let actual: Vec<String> = extract_colors(svg).into_iter().map(String::from).collect();
        prop_assert_eq!(actual, expected);
        Ok(())
    }

    // ===================
    // Property Tests
    // ===================

    proptest! {
        #[test]
        fn extracted_tokens_are_well_formed_and_unique(text in noisy_text_strategy()) {
            check_extraction_is_well_formed_and_unique(&text)?;
        }

        #[test]
        fn extraction_follows_first_seen_order((svg, tokens) in delimited_svg_strategy()) {
            check_extraction_follows_first_seen_order(&svg, &tokens)?;
        }
    }
}
