//! `startPoint`: anchor corners of texts, vectors, buttons and images.
//!
//! Corners are separated by `|` and kept in order (index 0 first). Each is
//! either a quoted label reference or explicit coordinates:
//!
//! ```text
//! startPoint: "A" | absolute 10 20 | 0 200 1
//! ```
//!
//! Attributes are flattened per corner: `0.exp`, `1.x`, `1.y`, `1.absolute`.

use super::{tokens, PropertyCodec, Route};
use crate::attrs::{self, AttributeMap};
use crate::error::{ParseError, Result};

const MAX_CORNERS: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct StartPointCodec;

fn decode_corner(text: &str) -> Result<AttributeMap> {
    let parts = tokens::split_tokens(text)?;
    let mut corner = AttributeMap::new();
    if let [single] = parts.as_slice() {
        if single.starts_with('"') {
            corner.insert("exp".into(), tokens::scalar(single)?);
            return Ok(corner);
        }
    }
    let mut coords = parts.as_slice();
    if let Some(first) = coords.first() {
        if let (on, "absolute") = tokens::negation(first) {
            corner.insert("absolute".into(), on.to_string());
            coords = &coords[1..];
        }
    }
    if !(2..=3).contains(&coords.len()) {
        return Err(ParseError::new(format!(
            "startPoint corner needs a quoted label or 2-3 coordinates, got '{}'",
            text
        )));
    }
    for (key, value) in ["x", "y", "z"].iter().zip(coords) {
        tokens::number(value, "startPoint")?;
        corner.insert(key.to_string(), value.clone());
    }
    Ok(corner)
}

fn encode_corner(corner: &AttributeMap) -> Option<String> {
    if let Some(exp) = corner.get("exp") {
        return Some(tokens::quote(exp));
    }
    let (x, y) = (corner.get("x")?, corner.get("y")?);
    let mut parts: Vec<&str> = Vec::new();
    if corner.get("absolute").map(String::as_str) == Some("true") {
        parts.push("absolute");
    }
    parts.push(x.as_str());
    parts.push(y.as_str());
    if let Some(z) = corner.get("z") {
        parts.push(z.as_str());
    }
    Some(parts.join(" "))
}

impl PropertyCodec for StartPointCodec {
    fn name(&self) -> &str {
        "startPoint"
    }

    fn decode(&self, value: &str) -> Result<Option<AttributeMap>> {
        let corners = tokens::split_top_level(value, '|')?;
        if corners.len() > MAX_CORNERS {
            return Err(ParseError::new(format!(
                "startPoint takes at most {} corners, got {}",
                MAX_CORNERS,
                corners.len()
            )));
        }
        let mut out = AttributeMap::new();
        for (index, text) in corners.iter().enumerate() {
            attrs::flatten_into(&mut out, index as u32, &decode_corner(text)?);
        }
        Ok((!out.is_empty()).then_some(out))
    }

    fn encode(&self, attrs: &AttributeMap) -> Option<String> {
        let corners: Vec<String> = attrs::group_indexed(attrs)
            .iter()
            .filter_map(|(_, corner)| encode_corner(corner))
            .collect();
        (!corners.is_empty()).then(|| corners.join(" | "))
    }

    fn complete(&self, attrs: &AttributeMap) -> AttributeMap {
        let mut out = AttributeMap::new();
        for (index, corner) in attrs::group_indexed(attrs) {
            if !corner.contains_key("exp") && !corner.contains_key("absolute") {
                out.insert(format!("{}.absolute", index), "false".to_string());
            }
        }
        out.extend(attrs.iter().map(|(k, v)| (k.clone(), v.clone())));
        out
    }

    /// One `<startPoint number=i ...>` element per corner.
    fn routes(&self, attrs: &AttributeMap) -> Vec<Route> {
        attrs::group_indexed(attrs)
            .into_iter()
            .map(|(index, corner)| {
                let number = index.to_string();
                let mut element = attrs::from_pairs(&[("number", number.as_str())]);
                element.extend(corner);
                Route::element("startPoint", element)
            })
            .collect()
    }
}
