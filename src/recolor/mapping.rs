//! Color mapping and textual substitution.

use indexmap::IndexMap;

use crate::color::HexColor;

/// Assignment of a replacement color to every original color of a diagram.
///
/// The domain is fixed when the mapping is created: entries can be changed
/// but never added or removed, so every original color always has a value.
/// Iteration follows the order the originals were given in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColorMapping {
    entries: IndexMap<HexColor, HexColor>,
}

impl ColorMapping {
    /// Creates a mapping where every color maps to itself.
    pub fn identity(originals: &[HexColor]) -> Self {
        Self {
            entries: originals.iter().map(|c| (c.clone(), c.clone())).collect(),
        }
    }

    /// Returns the replacement currently assigned to `original`.
    pub fn get(&self, original: &HexColor) -> Option<&HexColor> {
        self.entries.get(original)
    }

    /// Returns true if `original` is part of the mapping's domain.
    pub fn contains(&self, original: &HexColor) -> bool {
        self.entries.contains_key(original)
    }

    /// Assigns a replacement to an existing original color.
    ///
    /// Returns true if the mapping changed. Colors outside the domain are
    /// ignored and return false.
    pub fn set(&mut self, original: &HexColor, replacement: HexColor) -> bool {
        match self.entries.get_mut(original) {
            Some(current) if *current != replacement => {
                *current = replacement;
                true
            }
            _ => false,
        }
    }

    /// Maps every original color back to itself.
    pub fn reset(&mut self) {
        for (original, replacement) in self.entries.iter_mut() {
            replacement.clone_from(original);
        }
    }

    /// Returns true if no color has been changed.
    pub fn is_identity(&self) -> bool {
        self.entries.iter().all(|(o, r)| o == r)
    }

    /// Iterates over `(original, replacement)` pairs in domain order.
    pub fn iter(&self) -> impl Iterator<Item = (&HexColor, &HexColor)> {
        self.entries.iter()
    }

    /// Iterates over the entries whose replacement differs from the original.
    pub fn changed(&self) -> impl Iterator<Item = (&HexColor, &HexColor)> {
        self.entries.iter().filter(|(o, r)| o != r)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Applies `mapping` to `base` and returns the recolored markup.
///
/// Entries are applied one after another, in mapping order, each replacing
/// every literal occurrence of its original token in the text produced so
/// far. The replacement is purely textual: tokens inside ids, comments or
/// unrelated strings are rewritten too.
///
/// Because each entry sees the output of the previous ones, a replacement
/// that equals a later original is rewritten again. Mapping `#ff0000` to
/// `#00ff00` while `#00ff00` maps to `#0000ff` turns both into `#0000ff`.
/// Likewise a short token such as `#fff` also matches the prefix of
/// `#ffffff`. Both effects are kept on purpose; callers that need
/// independent replacements must pick colors that do not collide.
///
/// # Example
///
/// ```
/// use diagram_studio::{extract_colors, substitute, ColorMapping};
///
/// let svg = r##"<rect fill="#ff0000"/>"##;
/// let originals = extract_colors(svg);
/// let mut mapping = ColorMapping::identity(&originals);
/// mapping.set(&originals[0], "#0000ff".parse().unwrap());
///
/// assert_eq!(substitute(svg, &mapping), r##"<rect fill="#0000ff"/>"##);
/// ```
pub fn substitute(base: &str, mapping: &ColorMapping) -> String {
    let mut result = base.to_string();
    for (original, replacement) in mapping.changed() {
        result = result.replace(original.as_str(), replacement.as_str());
    }
    result
}


#[cfg(test)]
mod proptest_tests {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;
    use crate::color::extract_colors;

    // ===================
    // Strategies
    // ===================

    fn hex_strategy() -> impl Strategy<Value = HexColor> {
        prop_oneof![
            prop::sample::select(vec!["#fff", "#ffffff", "#ff0000", "#00ff00", "#0000ff", "#123"])
                .prop_map(String::from),
            "#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})",
        ]
        .prop_map(|s: String| s.parse::<HexColor>().unwrap())
    }

    fn svg_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec(hex_strategy(), 0..12).prop_map(|colors| {
            let body: String = colors
                .iter()
                .map(|c| format!(r#"<path fill="{c}" d="M0 0"/>"#))
                .collect();
            format!("<svg>{body}<!-- #fff --></svg>")
        })
    }

    fn assignments_strategy() -> impl Strategy<Value = Vec<(prop::sample::Index, HexColor)>> {
        prop::collection::vec((any::<prop::sample::Index>(), hex_strategy()), 0..10)
    }

    // ===================
    // Property Test Functions
    // ===================

    fn check_identity_round_trips(svg: &str, extra: &[HexColor]) -> Result<(), TestCaseError> {
        let mut domain = extract_colors(svg);
        domain.extend(extra.iter().cloned());
        let mapping = ColorMapping::identity(&domain);

        prop_assert!(mapping.is_identity());
        prop_assert_eq!(substitute(svg, &mapping), svg);
        Ok(())
    }

    fn check_substitution_is_deterministic(
        svg: &str,
        assignments: &[(prop::sample::Index, HexColor)],
    ) -> Result<(), TestCaseError> {
        let originals = extract_colors(svg);
        if originals.is_empty() {
            return Ok(());
        }

        // The same edits, once in call order and once as final values only,
        // applied back to front.
        let mut in_order = ColorMapping::identity(&originals);
        let mut last_value: HashMap<usize, HexColor> = HashMap::new();
        for (index, color) in assignments {
            let i = index.index(originals.len());
            in_order.set(&originals[i], color.clone());
            last_value.insert(i, color.clone());
        }

        let mut final_only = ColorMapping::identity(&originals);
        let mut indices: Vec<usize> = last_value.keys().copied().collect();
        indices.sort_unstable_by(|a, b| b.cmp(a));
        for i in indices {
            final_only.set(&originals[i], last_value[&i].clone());
        }

        prop_assert_eq!(&in_order, &final_only);
        let first = substitute(svg, &in_order);
        prop_assert_eq!(&first, &substitute(svg, &in_order));
        prop_assert_eq!(&first, &substitute(svg, &in_order.clone()));
        prop_assert_eq!(&first, &substitute(svg, &final_only));
        Ok(())
    }

    // ===================
    // Property Tests
    // ===================

    proptest! {
        #[test]
        fn identity_mapping_leaves_text_unchanged(
            svg in svg_strategy(),
            extra in prop::collection::vec(hex_strategy(), 0..4),
        ) {
            check_identity_round_trips(&svg, &extra)?;
        }

        #[test]
        fn substitution_depends_only_on_the_mapping(
            svg in svg_strategy(),
            assignments in assignments_strategy(),
        ) {
            check_substitution_is_deterministic(&svg, &assignments)?;
        }
    }
}
