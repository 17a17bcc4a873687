//! Attribute maps: the ordered string maps every codec produces and consumes.

use indexmap::IndexMap;

/// One decoded property: ordered attribute name → value.
pub type AttributeMap = IndexMap<String, String>;

/// Element name → attributes, as extracted from (or replayed into) the host's
/// XML style protocol.
pub type StyleMap = IndexMap<String, AttributeMap>;

/// Key marking "reset to default, then apply the remaining keys".
pub const RESET_MARKER: &str = "~";

/// Builds an [`AttributeMap`] from string pairs.
///
/// ```rust
/// use gpad::attrs;
///
/// let map = attrs::from_pairs(&[("r", "255"), ("g", "0")]);
/// assert_eq!(map.get("r").map(String::as_str), Some("255"));
/// ```
pub fn from_pairs(pairs: &[(&str, &str)]) -> AttributeMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Whether `attrs` carries the reset marker.
pub fn has_reset(attrs: &AttributeMap) -> bool {
    attrs.contains_key(RESET_MARKER)
}

/// Copy of `attrs` without the reset marker.
pub fn without_reset(attrs: &AttributeMap) -> AttributeMap {
    attrs
        .iter()
        .filter(|(k, _)| k.as_str() != RESET_MARKER)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Overlays `attrs` on `defaults`, keeping the defaults' key order first.
pub fn complete(defaults: &AttributeMap, attrs: &AttributeMap) -> AttributeMap {
    let mut out = defaults.clone();
    for (k, v) in attrs {
        out.insert(k.clone(), v.clone());
    }
    out
}

/// Splits a flattened indexed key such as `"3.fillType"` into `(3, "fillType")`.
pub fn split_indexed(key: &str) -> Option<(u32, &str)> {
    let (index, attr) = key.split_once('.')?;
    let index = index.parse().ok()?;
    Some((index, attr))
}

/// Groups a flattened indexed map by index, in ascending index order.
pub fn group_indexed(attrs: &AttributeMap) -> Vec<(u32, AttributeMap)> {
    let mut groups: IndexMap<u32, AttributeMap> = IndexMap::new();
    for (key, value) in attrs {
        if let Some((index, attr)) = split_indexed(key) {
            groups
                .entry(index)
                .or_default()
                .insert(attr.to_string(), value.clone());
        }
    }
    let mut groups: Vec<_> = groups.into_iter().collect();
    groups.sort_by_key(|(index, _)| *index);
    groups
}

/// Inserts every attribute of `group` into `target` under `"<index>.<attr>"`.
pub fn flatten_into(target: &mut AttributeMap, index: u32, group: &AttributeMap) {
    for (attr, value) in group {
        target.insert(format!("{}.{}", index, attr), value.clone());
    }
}

/// Formats a float the way the host's XML does: integral values keep a `.0`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.fract() == 0.0 && value.is_finite() && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
