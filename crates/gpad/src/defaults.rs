//! Default styles and required attributes.
//!
//! [`DefaultStyleCache`] memoizes the host's default style per default-type
//! id: populated on first use, never invalidated. [`backfill`] fills the
//! attributes the host's element handler insists on when a sheet omits them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::attrs::{self, AttributeMap, StyleMap};
use crate::host::ObjectInfo;
use crate::xml::parse_style_xml;

static GLOBAL: Lazy<Arc<DefaultStyleCache>> = Lazy::new(|| Arc::new(DefaultStyleCache::new()));

/// Read-through cache of parsed default styles, keyed by default-type id.
///
/// Entries are computed once and shared read-only, so one cache can serve
/// every parser in the process. Tests create their own with
/// [`DefaultStyleCache::new`].
#[derive(Debug, Default)]
pub struct DefaultStyleCache {
    entries: Mutex<HashMap<i32, Arc<StyleMap>>>,
}

impl DefaultStyleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    pub fn global() -> Arc<DefaultStyleCache> {
        Arc::clone(&GLOBAL)
    }

    /// Returns the cached default style for `default_type`, loading its XML
    /// with `load` on a miss.
    ///
    /// A type without XML, or with XML that fails to parse, is cached as
    /// empty and yields `None`.
    pub fn get_or_load(
        &self,
        default_type: i32,
        load: impl FnOnce() -> Option<String>,
    ) -> Option<Arc<StyleMap>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.entry(default_type).or_insert_with(|| {
            let map = match load().map(|xml| parse_style_xml(&xml)) {
                Some(Ok(map)) => map,
                Some(Err(err)) => {
                    warn!(default_type, error = %err, "unreadable default style");
                    StyleMap::new()
                }
                None => StyleMap::new(),
            };
            debug!(default_type, elements = map.len(), "cached default style");
            Arc::new(map)
        });
        (!entry.is_empty()).then(|| Arc::clone(entry))
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Attributes the host's element handler requires, per element.
const REQUIRED: &[(&str, &[(&str, &str)])] = &[
    ("slider", &[("width", "200")]),
    ("absoluteScreenLocation", &[("x", "0"), ("y", "0")]),
    (
        "cropBox",
        &[("x", "0"), ("y", "0"), ("width", "100"), ("height", "100")],
    ),
    ("video", &[("width", "320"), ("height", "240")]),
    (
        "spreadsheetTrace",
        &[
            ("traceColumn1", "0"),
            ("traceColumn2", "0"),
            ("traceRow1", "0"),
            ("traceRow2", "0"),
            ("tracingRow", "0"),
            ("numRows", "0"),
            ("headerOffset", "0"),
        ],
    ),
    ("pointSize", &[("val", "4")]),
    ("pointStyle", &[("val", "0")]),
    ("layer", &[("val", "0")]),
    ("lineStyle", &[("type", "0"), ("thickness", "1")]),
    ("decoration", &[("type", "0")]),
    ("headStyle", &[("val", "0")]),
    ("arcSize", &[("val", "30")]),
    ("angleStyle", &[("val", "0")]),
    ("slopeTriangleSize", &[("val", "1")]),
    ("decimals", &[("val", "10")]),
    ("significantfigures", &[("val", "5")]),
    ("labelOffset", &[("x", "0"), ("y", "0")]),
    ("labelMode", &[("val", "0")]),
    ("tooltipMode", &[("val", "0")]),
    ("ordering", &[("val", "0")]),
    ("selectedIndex", &[("val", "0")]),
    ("borderColor", &[("r", "0"), ("g", "0"), ("b", "0")]),
    ("boundingBox", &[("width", "100"), ("height", "50")]),
    ("embed", &[("id", "0")]),
    ("tag", &[("key", ""), ("value", ""), ("barNumber", "0")]),
    ("length", &[("val", "10")]),
    ("contentSize", &[("width", "100"), ("height", "100")]),
    ("javascript", &[("val", "")]),
];

/// Fills required attributes `attrs` lacks for `element`.
pub fn backfill(element: &str, attrs: &mut AttributeMap, info: &ObjectInfo) {
    match element {
        "value" => {
            if !attrs.contains_key("val") {
                attrs.insert("val".into(), current_value(info));
            }
        }
        "font" => {
            if !attrs.contains_key("sizeM") && !attrs.contains_key("size") {
                attrs.insert("size".into(), "12".into());
            }
        }
        _ => {
            let Some((_, required)) = REQUIRED.iter().find(|(name, _)| *name == element) else {
                return;
            };
            for (key, default) in required.iter() {
                if !attrs.contains_key(*key) {
                    attrs.insert(key.to_string(), default.to_string());
                }
            }
        }
    }
}

/// `val` for a `value` element: the object's current value.
fn current_value(info: &ObjectInfo) -> String {
    if let Some(number) = info.numeric_value {
        attrs::format_float(number)
    } else if let Some(flag) = info.boolean_value {
        flag.to_string()
    } else if info.is_button {
        String::new()
    } else {
        "0".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::from_pairs;
    use std::cell::Cell;

    // =========================================================================
    // Cache
    // =========================================================================

    #[test]
    fn test_cache_loads_once() {
        let cache = DefaultStyleCache::new();
        let calls = Cell::new(0);
        let load = || {
            calls.set(calls.get() + 1);
            Some(r#"<element><pointSize val="5"/></element>"#.to_string())
        };
        let first = cache.get_or_load(10, load).unwrap();
        let second = cache.get_or_load(10, load).unwrap();
        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first["pointSize"]["val"], "5");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_remembers_missing_and_broken() {
        let cache = DefaultStyleCache::new();
        assert!(cache.get_or_load(1, || None).is_none());
        assert!(cache
            .get_or_load(1, || Some("<element><pointSize/>".into()))
            .is_none());
        assert!(cache.get_or_load(2, || Some("<element>".into())).is_none());
        assert_eq!(cache.len(), 2);
    }

    // =========================================================================
    // Backfill
    // =========================================================================

    #[test]
    fn test_backfill_table() {
        let info = ObjectInfo::default();
        let mut attrs = from_pairs(&[("thickness", "7")]);
        backfill("lineStyle", &mut attrs, &info);
        assert_eq!(attrs, from_pairs(&[("thickness", "7"), ("type", "0")]));

        let mut attrs = AttributeMap::new();
        backfill("unknownElement", &mut attrs, &info);
        assert!(attrs.is_empty());
    }

    #[test]
    fn test_backfill_value_from_object() {
        let mut attrs = AttributeMap::new();
        let info = ObjectInfo {
            numeric_value: Some(3.0),
            ..ObjectInfo::default()
        };
        backfill("value", &mut attrs, &info);
        assert_eq!(attrs["val"], "3.0");

        let mut attrs = AttributeMap::new();
        let info = ObjectInfo {
            boolean_value: Some(true),
            ..ObjectInfo::default()
        };
        backfill("value", &mut attrs, &info);
        assert_eq!(attrs["val"], "true");

        let mut attrs = AttributeMap::new();
        let info = ObjectInfo {
            is_button: true,
            ..ObjectInfo::default()
        };
        backfill("value", &mut attrs, &info);
        assert_eq!(attrs["val"], "");

        let mut attrs = AttributeMap::new();
        backfill("value", &mut attrs, &ObjectInfo::default());
        assert_eq!(attrs["val"], "0");
    }

    #[test]
    fn test_backfill_font_size_only_without_size_m() {
        let info = ObjectInfo::default();
        let mut attrs = from_pairs(&[("sizeM", "1.5")]);
        backfill("font", &mut attrs, &info);
        assert!(!attrs.contains_key("size"));

        let mut attrs = from_pairs(&[("serif", "true")]);
        backfill("font", &mut attrs, &info);
        assert_eq!(attrs["size"], "12");
    }
}
