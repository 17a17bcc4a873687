//! Placement, sizing and text-format properties.
//!
//! - `labelOffset: x y`, `@screen: x y`
//! - `eqnStyle: parametric=t`
//! - `font: serif *1.5 bold italic`
//! - `boundingBox`, `contentSize`, `cropBox`, `dimensions` with `key=value`
//!   sizes and one optional flag
//! - `checkbox: fixed`

use super::{get, is_true, join, non_default, tokens, PropertyCodec};
use crate::attrs::{self, AttributeMap};
use crate::error::{ParseError, Result};
use tracing::warn;

fn is_single_letter(text: &str) -> bool {
    let mut chars = text.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
}

/// Equation display forms accepted by `eqnStyle`.
pub const EQN_STYLES: [&str; 8] = [
    "implicit",
    "explicit",
    "parametric",
    "specific",
    "general",
    "vertex",
    "conic",
    "user",
];

// ============================================================================
// Coordinate pairs
// ============================================================================

/// `x y` pair stored as the `x` and `y` attributes.
#[derive(Debug, Clone)]
pub struct PairCodec {
    name: &'static str,
    element: &'static str,
    default: Option<(&'static str, &'static str)>,
}

impl PairCodec {
    pub fn label_offset() -> Self {
        Self {
            name: "labelOffset",
            element: "labelOffset",
            default: Some(("0", "0")),
        }
    }

    /// Object-level absolute screen position.
    pub fn screen() -> Self {
        Self {
            name: "@screen",
            element: "absoluteScreenLocation",
            default: None,
        }
    }
}

impl PropertyCodec for PairCodec {
    fn name(&self) -> &str {
        self.name
    }

    fn element(&self) -> &str {
        self.element
    }

    fn decode(&self, value: &str) -> Result<Option<AttributeMap>> {
        let parts = tokens::split_tokens(value)?;
        let [x, y] = parts.as_slice() else {
            return Err(ParseError::new(format!(
                "{} expects two numbers, got '{}'",
                self.name,
                value.trim()
            )));
        };
        tokens::number(x, self.name)?;
        tokens::number(y, self.name)?;
        Ok(Some(attrs::from_pairs(&[("x", x.as_str()), ("y", y.as_str())])))
    }

    fn encode(&self, attrs: &AttributeMap) -> Option<String> {
        let (x, y) = (get(attrs, "x")?, get(attrs, "y")?);
        if let Some((dx, dy)) = self.default {
            if tokens::same_value(x, dx) && tokens::same_value(y, dy) {
                return None;
            }
        }
        Some(format!("{} {}", x, y))
    }

    fn defaults(&self) -> AttributeMap {
        match self.default {
            Some((x, y)) => attrs::from_pairs(&[("x", x), ("y", y)]),
            None => AttributeMap::new(),
        }
    }
}

// ============================================================================
// Equation style
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct EqnStyleCodec;

impl PropertyCodec for EqnStyleCodec {
    fn name(&self) -> &str {
        "eqnStyle"
    }

    fn decode(&self, value: &str) -> Result<Option<AttributeMap>> {
        let text = value.trim();
        let (style, parameter) = match text.split_once('=') {
            Some((style, parameter)) => (style, Some(tokens::scalar(parameter)?)),
            None => (text, None),
        };
        if !EQN_STYLES.contains(&style) {
            warn!(style, "ignoring unknown eqnStyle");
            return Ok(None);
        }
        let mut out = attrs::from_pairs(&[("style", style)]);
        // Only parametric takes a parameter, and only a single letter.
        match parameter {
            Some(p) if style == "parametric" && is_single_letter(&p) => {
                out.insert("parameter".into(), p);
            }
            Some(p) => warn!(style, parameter = %p, "ignoring eqnStyle parameter"),
            None => {}
        }
        Ok(Some(out))
    }

    fn encode(&self, attrs: &AttributeMap) -> Option<String> {
        let style = get(attrs, "style")?;
        match get(attrs, "parameter").filter(|p| !p.is_empty()) {
            Some(parameter) => Some(format!(
                "{}={}",
                style,
                tokens::quote_if_needed(parameter)
            )),
            None => Some(style.to_string()),
        }
    }
}

// ============================================================================
// Font
// ============================================================================

const BOLD: u32 = 1;
const ITALIC: u32 = 2;

#[derive(Debug, Clone, Copy)]
pub struct FontCodec;

impl PropertyCodec for FontCodec {
    fn name(&self) -> &str {
        "font"
    }

    fn decode(&self, value: &str) -> Result<Option<AttributeMap>> {
        let mut out = AttributeMap::new();
        let mut style: Option<u32> = None;
        for token in tokens::split_tokens(value)? {
            if let Some(size) = token.strip_prefix('*') {
                tokens::number(size, "font size")?;
                out.insert("sizeM".into(), size.to_string());
                continue;
            }
            match tokens::negation(&token) {
                (on, "serif") => {
                    out.insert("serif".into(), on.to_string());
                }
                (true, "plain") => style = Some(0),
                (true, "bold") => *style.get_or_insert(0) |= BOLD,
                (true, "italic") => *style.get_or_insert(0) |= ITALIC,
                _ => {
                    return Err(ParseError::new(format!("unknown font token '{}'", token)))
                }
            }
        }
        if let Some(style) = style {
            out.insert("style".into(), style.to_string());
        }
        Ok((!out.is_empty()).then_some(out))
    }

    fn encode(&self, attrs: &AttributeMap) -> Option<String> {
        let mut parts = Vec::new();
        if is_true(attrs, "serif") {
            parts.push("serif".to_string());
        }
        if let Some(size) = non_default(attrs, "sizeM", "1") {
            parts.push(format!("*{}", size));
        }
        let style = get(attrs, "style")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(0);
        if style & ITALIC != 0 {
            parts.push("italic".to_string());
        }
        if style & BOLD != 0 {
            parts.push("bold".to_string());
        }
        let text = join(parts);
        (!text.is_empty()).then_some(text)
    }

    fn defaults(&self) -> AttributeMap {
        attrs::from_pairs(&[("serif", "false"), ("sizeM", "1"), ("style", "0")])
    }
}

// ============================================================================
// Boxes
// ============================================================================

/// A boolean flag token of a [`BoxCodec`].
#[derive(Debug, Clone, Copy)]
struct BoxFlag {
    token: &'static str,
    attr: &'static str,
    inverted: bool,
}

/// `key=value` sizes plus an optional flag (`cropped`, `scaled`).
#[derive(Debug, Clone)]
pub struct BoxCodec {
    name: &'static str,
    keys: &'static [&'static str],
    integers: bool,
    flag: Option<BoxFlag>,
    defaults: &'static [(&'static str, &'static str)],
}

impl BoxCodec {
    pub fn bounding_box() -> Self {
        Self {
            name: "boundingBox",
            keys: &["width", "height"],
            integers: true,
            flag: None,
            defaults: &[],
        }
    }

    pub fn content_size() -> Self {
        Self {
            name: "contentSize",
            keys: &["width", "height"],
            integers: false,
            flag: None,
            defaults: &[],
        }
    }

    pub fn crop_box() -> Self {
        Self {
            name: "cropBox",
            keys: &["x", "y", "width", "height"],
            integers: false,
            flag: Some(BoxFlag {
                token: "cropped",
                attr: "cropped",
                inverted: false,
            }),
            defaults: &[("cropped", "false")],
        }
    }

    pub fn dimensions() -> Self {
        Self {
            name: "dimensions",
            keys: &["width", "height", "angle"],
            integers: false,
            flag: Some(BoxFlag {
                token: "scaled",
                attr: "unscaled",
                inverted: true,
            }),
            defaults: &[("angle", "0"), ("unscaled", "true")],
        }
    }

    fn default_of(&self, key: &str) -> Option<&'static str> {
        self.defaults.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }
}

impl PropertyCodec for BoxCodec {
    fn name(&self) -> &str {
        self.name
    }

    fn decode(&self, value: &str) -> Result<Option<AttributeMap>> {
        let mut out = AttributeMap::new();
        for token in tokens::split_tokens(value)? {
            if let Some((key, v)) = tokens::key_value(&token) {
                if !self.keys.contains(&key) {
                    return Err(ParseError::new(format!(
                        "unknown {} attribute '{}'",
                        self.name, key
                    )));
                }
                let v = tokens::scalar(v)?;
                let v = if self.integers {
                    tokens::truncated(&v, self.name)?.to_string()
                } else {
                    tokens::number(&v, self.name)?;
                    v
                };
                out.insert(key.to_string(), v);
                continue;
            }
            let (on, name) = tokens::negation(&token);
            match self.flag {
                Some(flag) if flag.token == name => {
                    out.insert(flag.attr.to_string(), (on != flag.inverted).to_string());
                }
                _ => {
                    return Err(ParseError::new(format!(
                        "unknown {} token '{}'",
                        self.name, token
                    )))
                }
            }
        }
        Ok((!out.is_empty()).then_some(out))
    }

    fn encode(&self, attrs: &AttributeMap) -> Option<String> {
        let mut parts = Vec::new();
        for key in self.keys {
            let value = match self.default_of(key) {
                Some(default) => non_default(attrs, key, default),
                None => get(attrs, key),
            };
            if let Some(value) = value {
                let value = if self.integers {
                    tokens::truncate_text(value)
                } else {
                    value.to_string()
                };
                parts.push(format!("{}={}", key, value));
            }
        }
        if let Some(flag) = self.flag {
            if get(attrs, flag.attr) == Some(if flag.inverted { "false" } else { "true" }) {
                parts.push(flag.token.to_string());
            }
        }
        let text = join(parts);
        (!text.is_empty()).then_some(text)
    }

    fn defaults(&self) -> AttributeMap {
        self.defaults
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

// ============================================================================
// Checkbox
// ============================================================================

/// `checkbox`: marks a boolean as drawn with a checkbox.
///
/// Presence is meaningful on its own, so the property is always emitted.
#[derive(Debug, Clone, Copy)]
pub struct CheckboxCodec;

impl PropertyCodec for CheckboxCodec {
    fn name(&self) -> &str {
        "checkbox"
    }

    fn decode(&self, value: &str) -> Result<Option<AttributeMap>> {
        let mut fixed = false;
        for token in tokens::split_tokens(value)? {
            match tokens::negation(&token) {
                (on, "fixed") => fixed = on,
                _ => {
                    return Err(ParseError::new(format!(
                        "unknown checkbox token '{}'",
                        token
                    )))
                }
            }
        }
        Ok(Some(attrs::from_pairs(&[("fixed", if fixed { "true" } else { "false" })])))
    }

    fn encode(&self, attrs: &AttributeMap) -> Option<String> {
        Some(if is_true(attrs, "fixed") { "fixed".to_string() } else { String::new() })
    }

    fn defaults(&self) -> AttributeMap {
        attrs::from_pairs(&[("fixed", "false")])
    }
}
