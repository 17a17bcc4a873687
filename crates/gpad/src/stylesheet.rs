//! Style sheets: named or inline bags of decoded properties.
//!
//! A sheet maps Gpad property names to [`AttributeMap`]s in insertion order.
//! The reset marker (`"~"`) inside a property's map means "clear to default,
//! then apply the remaining keys".
//!
//! # Merge semantics
//!
//! When several sheets apply to one statement they are merged left to
//! right with [`StyleSheet::merge_from`]:
//!
//! - a property whose incoming map carries the marker replaces the existing
//!   one wholesale
//! - any other property merges key by key, leaving unset keys untouched
//!
//! ```rust
//! use gpad::{attrs, StyleSheet};
//!
//! let mut base = StyleSheet::new("base");
//! base.set_property("lineStyle", attrs::from_pairs(&[("type", "1"), ("thickness", "5")]));
//!
//! let mut over = StyleSheet::inline();
//! over.set_property("lineStyle", attrs::from_pairs(&[("~", ""), ("type", "2")]));
//!
//! base.merge_from(&over);
//! let line = base.get_property("lineStyle").unwrap();
//! assert_eq!(line.len(), 2);
//! assert!(!line.contains_key("thickness"));
//! ```

use indexmap::IndexMap;

use crate::attrs::{self, AttributeMap, RESET_MARKER};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    name: String,
    properties: IndexMap<String, AttributeMap>,
}

impl StyleSheet {
    /// Creates an empty sheet. The name is stored without the `@`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: IndexMap::new(),
        }
    }

    /// Creates an empty anonymous sheet, as written inline in `{...}`.
    pub fn inline() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_inline(&self) -> bool {
        self.name.is_empty()
    }

    pub fn get_property(&self, name: &str) -> Option<&AttributeMap> {
        self.properties.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Properties in insertion order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &AttributeMap)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Sets a property's attributes.
    ///
    /// If the property already carries the reset marker, the marker is kept
    /// and `attrs` is put over it. Otherwise `attrs` replaces the old map.
    pub fn set_property(&mut self, name: impl Into<String>, attrs: AttributeMap) {
        let name = name.into();
        match self.properties.get_mut(&name) {
            Some(existing) if attrs::has_reset(existing) => existing.extend(attrs),
            Some(existing) => *existing = attrs,
            None => {
                self.properties.insert(name, attrs);
            }
        }
    }

    /// Marks a property for reset, creating it if absent.
    pub fn reset_property(&mut self, name: impl Into<String>) {
        self.properties
            .entry(name.into())
            .or_default()
            .insert(RESET_MARKER.to_string(), String::new());
    }

    pub fn remove_property(&mut self, name: &str) -> Option<AttributeMap> {
        self.properties.shift_remove(name)
    }

    /// Merges `other` into this sheet; see the module docs for the rules.
    pub fn merge_from(&mut self, other: &StyleSheet) {
        for (name, incoming) in &other.properties {
            match self.properties.get_mut(name) {
                Some(existing) if attrs::has_reset(incoming) => *existing = incoming.clone(),
                Some(existing) => {
                    existing.extend(incoming.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                None => {
                    self.properties.insert(name.clone(), incoming.clone());
                }
            }
        }
    }

    /// Merges `sheets` left to right into a new inline sheet.
    pub fn merged<'a>(sheets: impl IntoIterator<Item = &'a StyleSheet>) -> StyleSheet {
        let mut out = StyleSheet::inline();
        for sheet in sheets {
            out.merge_from(sheet);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::from_pairs;

    // =========================================================================
    // set / reset
    // =========================================================================

    #[test]
    fn test_set_replaces_without_marker() {
        let mut sheet = StyleSheet::new("s");
        sheet.set_property("pointSize", from_pairs(&[("val", "5")]));
        sheet.set_property("pointSize", from_pairs(&[("val", "8")]));
        assert_eq!(sheet.get_property("pointSize").unwrap()["val"], "8");
        assert_eq!(sheet.len(), 1);
    }

    #[test]
    fn test_reset_then_set_keeps_marker() {
        let mut sheet = StyleSheet::new("s");
        sheet.reset_property("pointSize");
        sheet.set_property("pointSize", from_pairs(&[("val", "8")]));
        let attrs = sheet.get_property("pointSize").unwrap();
        assert_eq!(attrs, &from_pairs(&[("~", ""), ("val", "8")]));
    }

    #[test]
    fn test_set_then_reset_adds_marker() {
        let mut sheet = StyleSheet::new("s");
        sheet.set_property("pointSize", from_pairs(&[("val", "8")]));
        sheet.reset_property("pointSize");
        let attrs = sheet.get_property("pointSize").unwrap();
        assert!(attrs::has_reset(attrs));
        assert_eq!(attrs["val"], "8");
    }

    // =========================================================================
    // merge
    // =========================================================================

    #[test]
    fn test_merge_with_marker_replaces_wholesale() {
        let mut base = StyleSheet::new("a");
        base.set_property("lineStyle", from_pairs(&[("type", "1"), ("thickness", "5")]));
        let mut over = StyleSheet::new("b");
        over.set_property("lineStyle", from_pairs(&[("~", ""), ("type", "2")]));

        base.merge_from(&over);
        assert_eq!(
            base.get_property("lineStyle").unwrap(),
            &from_pairs(&[("~", ""), ("type", "2")])
        );
    }

    #[test]
    fn test_merge_without_marker_is_key_by_key() {
        let mut base = StyleSheet::new("a");
        base.set_property("lineStyle", from_pairs(&[("type", "1"), ("thickness", "5")]));
        let mut over = StyleSheet::new("b");
        over.set_property("lineStyle", from_pairs(&[("type", "2")]));

        base.merge_from(&over);
        assert_eq!(
            base.get_property("lineStyle").unwrap(),
            &from_pairs(&[("type", "2"), ("thickness", "5")])
        );
    }

    #[test]
    fn test_merge_keeps_property_positions() {
        let mut base = StyleSheet::new("a");
        base.set_property("objColor", from_pairs(&[("r", "1")]));
        base.set_property("pointSize", from_pairs(&[("val", "5")]));
        let mut over = StyleSheet::new("b");
        over.set_property("layer", from_pairs(&[("val", "2")]));
        over.set_property("objColor", from_pairs(&[("g", "2")]));

        base.merge_from(&over);
        let names: Vec<_> = base.properties().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["objColor", "pointSize", "layer"]);
    }

    #[test]
    fn test_merged_left_to_right() {
        let mut a = StyleSheet::new("a");
        a.set_property("pointSize", from_pairs(&[("val", "3")]));
        let mut b = StyleSheet::new("b");
        b.set_property("pointSize", from_pairs(&[("val", "7")]));

        let merged = StyleSheet::merged([&a, &b]);
        assert!(merged.is_inline());
        assert_eq!(merged.get_property("pointSize").unwrap()["val"], "7");
    }
}
