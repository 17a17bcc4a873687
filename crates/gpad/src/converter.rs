//! Style maps back to Gpad text.
//!
//! The input is keyed by XML element name, as read from the host (see
//! [`parse_style_xml`](crate::parse_style_xml)). Each element is mapped to
//! its Gpad property through the registry's element index and encoded by
//! that property's codec. Fully-default properties vanish.
//!
//! ```rust
//! use gpad::{attrs, StyleMap, StyleMapConverter};
//!
//! let mut map = StyleMap::new();
//! map.insert("caption".into(), attrs::from_pairs(&[("val", "Test Caption")]));
//! map.insert("coordStyle".into(), attrs::from_pairs(&[("val", "polar")]));
//! map.insert("lineStyle".into(), attrs::from_pairs(&[("thickness", "5"), ("type", "0")]));
//!
//! let text = StyleMapConverter::new().convert("s", &map).unwrap();
//! assert_eq!(text, r#"@s = { caption: "Test Caption"; coordStyle: polar }"#);
//! ```

use std::sync::Arc;

use tracing::{debug, warn};

use crate::attrs::{self, AttributeMap, StyleMap};
use crate::codec::{CodecRegistry, GenericCodec, PropertyCodec};
use crate::config::GpadConfig;
use crate::stylesheet::StyleSheet;

#[derive(Debug, Clone)]
pub struct StyleMapConverter {
    registry: Arc<CodecRegistry>,
    strict: bool,
}

impl Default for StyleMapConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleMapConverter {
    pub fn new() -> Self {
        Self {
            registry: CodecRegistry::shared(),
            strict: false,
        }
    }

    pub fn with_registry(mut self, registry: Arc<CodecRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Skip elements no codec claims instead of passing them through.
    pub fn strict_properties(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_config(self, config: &GpadConfig) -> Self {
        self.strict_properties(config.strict_properties)
    }

    /// Encodes one element as a sheet entry (`name: value` or `name`).
    ///
    /// Returns `None` when the element encodes to nothing.
    pub fn convert_property(&self, element: &str, attrs: &AttributeMap) -> Option<String> {
        let generic;
        let codec: &dyn PropertyCodec = match self.registry.for_element(element) {
            Some(codec) => codec,
            None if self.strict => {
                warn!(element, "skipping element without a codec");
                return None;
            }
            None => {
                generic = GenericCodec::new(element);
                &generic
            }
        };
        encode_entry(codec, attrs)
    }

    /// Encodes every element of `map` as `p1; p2; ...`.
    ///
    /// `None` when nothing non-default remains.
    pub fn convert_body(&self, map: &StyleMap) -> Option<String> {
        let entries: Vec<String> = map
            .iter()
            .filter_map(|(element, attrs)| self.convert_property(element, attrs))
            .collect();
        (!entries.is_empty()).then(|| entries.join("; "))
    }

    /// Encodes `map` as the sheet definition `@name = { ... }`.
    pub fn convert(&self, name: &str, map: &StyleMap) -> Option<String> {
        let body = self.convert_body(map)?;
        debug!(sheet = name, properties = map.len(), "converted style map");
        Some(format!("@{} = {{ {} }}", name, body))
    }

    /// Encodes a parsed sheet back into its body, keeping reset markers.
    ///
    /// Unlike [`convert_body`](Self::convert_body), entries are keyed by
    /// Gpad property name.
    pub fn convert_sheet(&self, sheet: &StyleSheet) -> Option<String> {
        let mut entries = Vec::new();
        for (name, attrs) in sheet.properties() {
            let generic;
            let codec: &dyn PropertyCodec = match self.registry.get(name) {
                Some(codec) => codec,
                None if self.strict => continue,
                None => {
                    generic = GenericCodec::new(name);
                    &generic
                }
            };
            if attrs::has_reset(attrs) {
                entries.push(format!("~{}", name));
            }
            if let Some(entry) = encode_entry(codec, &attrs::without_reset(attrs)) {
                entries.push(entry);
            }
        }
        (!entries.is_empty()).then(|| entries.join("; "))
    }
}

fn encode_entry(codec: &dyn PropertyCodec, attrs: &AttributeMap) -> Option<String> {
    if attrs.is_empty() {
        return None;
    }
    match codec.encode(attrs)? {
        value if value.is_empty() => Some(codec.name().to_string()),
        value => Some(format!("{}: {}", codec.name(), value)),
    }
}
