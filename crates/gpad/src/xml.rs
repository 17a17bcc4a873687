//! Reads the host's per-object style XML into a [`StyleMap`].
//!
//! The input is an `<element>` fragment, or any document containing one.
//! Each direct child becomes `tag → attributes`. Two families are regrouped
//! into the flattened indexed form the codecs use:
//!
//! - `<startPoint number="i" .../>` → `startPoint` with `i.exp`, `i.x`, ...
//!   Numbering must be contiguous from 0; entries after a gap are dropped.
//! - `<tag barNumber="n" key="barColor" value="rgb(r,g,b)"/>` → `tag` with
//!   `n.r`, `n.g`, `n.b`, `n.fillType`, ... in bar order.
//!
//! Without an `<element>` wrapper, the top-level elements are the children.

use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::warn;

use crate::attrs::{self, AttributeMap, StyleMap};
use crate::codec::BAR_TAG_KEYS;
use crate::error::{ParseError, Result};

const WRAPPER: &str = "element";

/// Parses style XML into element name → attributes.
///
/// # Errors
///
/// Malformed XML or undecodable attributes.
///
/// ```rust
/// let map = gpad::parse_style_xml(
///     r#"<element type="point" label="A"><show object="true" label="false"/><pointSize val="5"/></element>"#,
/// ).unwrap();
/// assert_eq!(map["pointSize"]["val"], "5");
/// assert_eq!(map["show"]["label"], "false");
/// ```
pub fn parse_style_xml(text: &str) -> Result<StyleMap> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut wrapped = Collector::default();
    let mut bare = Collector::default();
    let mut depth = 0usize;
    let mut wrapper_depth: Option<usize> = None;
    let mut seen_wrapper = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            ParseError::new(format!(
                "invalid style XML at byte {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;
        match event {
            Event::Start(start) => {
                let name = tag_name(&start);
                if name == WRAPPER && !seen_wrapper {
                    seen_wrapper = true;
                    wrapper_depth = Some(depth);
                } else if wrapper_depth.is_some_and(|d| depth == d + 1) {
                    wrapped.add(name, attributes(&start)?);
                } else if depth == 0 {
                    bare.add(name, attributes(&start)?);
                }
                depth += 1;
            }
            Event::Empty(start) => {
                let name = tag_name(&start);
                if name == WRAPPER && !seen_wrapper {
                    seen_wrapper = true;
                } else if wrapper_depth.is_some_and(|d| depth == d + 1) {
                    wrapped.add(name, attributes(&start)?);
                } else if depth == 0 {
                    bare.add(name, attributes(&start)?);
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if wrapper_depth == Some(depth) {
                    wrapper_depth = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    if depth > 0 {
        return Err(ParseError::new("invalid style XML: unexpected end of input"));
    }
    Ok(if seen_wrapper {
        wrapped.finish()
    } else {
        bare.finish()
    })
}

fn tag_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn attributes(start: &BytesStart<'_>) -> Result<AttributeMap> {
    let mut out = AttributeMap::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ParseError::new(format!("invalid style XML attribute: {}", e)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| ParseError::new(format!("invalid style XML attribute '{}': {}", key, e)))?;
        out.insert(key, value.into_owned());
    }
    Ok(out)
}

/// Child elements of one wrapper, with the indexed families held back until
/// the end.
#[derive(Default)]
struct Collector {
    map: StyleMap,
    start_points: BTreeMap<u32, AttributeMap>,
    bars: BTreeMap<u32, AttributeMap>,
}

impl Collector {
    fn add(&mut self, name: String, mut attrs: AttributeMap) {
        match name.as_str() {
            "startPoint" => {
                let number = attrs
                    .shift_remove("number")
                    .map_or(Some(0), |n| n.trim().parse::<u32>().ok());
                match number {
                    Some(number) => {
                        self.start_points.insert(number, attrs);
                    }
                    None => warn!("ignoring startPoint with invalid number"),
                }
            }
            "tag" => {
                let (Some(bar), Some(key), Some(value)) = (
                    attrs.get("barNumber").and_then(|n| n.trim().parse::<u32>().ok()),
                    attrs.get("key"),
                    attrs.get("value"),
                ) else {
                    warn!("ignoring incomplete tag element");
                    return;
                };
                self.bars
                    .entry(bar)
                    .or_default()
                    .insert(key.clone(), value.clone());
            }
            _ => {
                self.map.insert(name, attrs);
            }
        }
    }

    fn finish(mut self) -> StyleMap {
        let mut corners = AttributeMap::new();
        for (expected, (number, corner)) in self.start_points.iter().enumerate() {
            if *number as usize != expected {
                warn!(gap = expected, "ignoring startPoint entries after a numbering gap");
                break;
            }
            attrs::flatten_into(&mut corners, *number, corner);
        }
        if !corners.is_empty() {
            self.map.insert("startPoint".into(), corners);
        }

        let mut bars = AttributeMap::new();
        for (bar, tags) in &self.bars {
            attrs::flatten_into(&mut bars, *bar, &bar_attributes(tags));
        }
        if !bars.is_empty() {
            self.map.insert("tag".into(), bars);
        }
        self.map
    }
}

/// Converts one bar's `key → value` tags to color attributes.
fn bar_attributes(tags: &AttributeMap) -> AttributeMap {
    let mut out = AttributeMap::new();
    if let Some(color) = tags.get("barColor") {
        match parse_rgb(color) {
            Some(parts) => {
                for (key, value) in ["r", "g", "b", "alpha"].iter().zip(parts) {
                    out.insert(key.to_string(), value);
                }
            }
            None => warn!(color = %color, "ignoring malformed barColor"),
        }
    }
    for (attr, key) in BAR_TAG_KEYS {
        if let Some(value) = tags.get(key) {
            out.insert(attr.to_string(), value.clone());
        }
    }
    out
}

/// `rgb(r,g,b)` or `rgba(r,g,b,a)` → its 3 or 4 trimmed components.
fn parse_rgb(text: &str) -> Option<Vec<String>> {
    let text = text.trim();
    let inner = text
        .strip_prefix("rgba(")
        .or_else(|| text.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let parts: Vec<String> = inner.split(',').map(|p| p.trim().to_string()).collect();
    let channels_ok = parts
        .iter()
        .take(3)
        .all(|p| p.parse::<u8>().is_ok());
    ((3..=4).contains(&parts.len()) && channels_ok).then_some(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Plain children
    // =========================================================================

    #[test]
    fn test_children_of_element() {
        let map = parse_style_xml(
            r#"<element type="point" label="A">
                 <show object="true" label="true" ev="4"/>
                 <objColor r="0" g="0" b="255" alpha="0.0"/>
                 <caption val="a &amp; b"/>
               </element>"#,
        )
        .unwrap();
        let names: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["show", "objColor", "caption"]);
        assert_eq!(map["show"]["ev"], "4");
        assert_eq!(map["caption"]["val"], "a & b");
    }

    #[test]
    fn test_element_inside_a_root() {
        let map = parse_style_xml(
            r#"<construction><element label="A"><layer val="2"/></element><element label="B"><layer val="3"/></element></construction>"#,
        )
        .unwrap();
        assert_eq!(map["layer"]["val"], "2");
    }

    #[test]
    fn test_bare_fragment() {
        let map = parse_style_xml(r#"<pointSize val="5"/><layer val="1"/>"#).unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_nested_grandchildren_are_ignored() {
        let map = parse_style_xml(r#"<element><slider min="0"><x v="1"/></slider></element>"#).unwrap();
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key("x"));
    }

    #[test]
    fn test_malformed_xml() {
        assert!(parse_style_xml("<element><show></element>").is_err());
        assert!(parse_style_xml("<element><show/>").is_err());
    }

    // =========================================================================
    // Indexed families
    // =========================================================================

    #[test]
    fn test_start_points_stop_at_gap() {
        let map = parse_style_xml(
            r#"<element>
                 <startPoint number="1" x="10" y="20" absolute="true"/>
                 <startPoint exp="A"/>
                 <startPoint number="3" exp="C"/>
               </element>"#,
        )
        .unwrap();
        let sp = &map["startPoint"];
        assert_eq!(sp["0.exp"], "A");
        assert_eq!(sp["1.x"], "10");
        assert_eq!(sp["1.absolute"], "true");
        assert!(!sp.contains_key("3.exp"));
    }

    #[test]
    fn test_bar_tags() {
        let map = parse_style_xml(
            r#"<element>
                 <tag key="barColor" value="rgb(0,255,0)" barNumber="2"/>
                 <tag key="barFillType" value="1" barNumber="2"/>
                 <tag key="barHatchAngle" value="30" barNumber="2"/>
                 <tag key="barColor" value="rgba(255,0,0,0.5)" barNumber="1"/>
                 <tag key="barColor" barNumber="3"/>
               </element>"#,
        )
        .unwrap();
        let tag = &map["tag"];
        let keys: Vec<_> = tag.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["1.r", "1.g", "1.b", "1.alpha", "2.r", "2.g", "2.b", "2.fillType", "2.hatchAngle"]
        );
        assert_eq!(tag["1.alpha"], "0.5");
    }

    #[test]
    fn test_parse_rgb() {
        assert_eq!(
            parse_rgb("rgb(1, 2, 3)"),
            Some(vec!["1".into(), "2".into(), "3".into()])
        );
        assert_eq!(parse_rgb("rgb(1,2)"), None);
        assert_eq!(parse_rgb("rgb(1,2,300)"), None);
        assert_eq!(parse_rgb("#FF0000"), None);
    }
}
