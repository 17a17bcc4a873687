//! Color and fill properties (`objColor`, `bgColor`, `borderColor`).
//!
//! Supported forms:
//!
//! - Static hex: `#RRGGBB` or `#RRGGBBAA` → `r`, `g`, `b` (0-255) and `alpha`
//!   (byte / 255, only for 8 digits)
//! - Dynamic: `rgb(e1, e2, e3[, e4])`, `hsv(...)`, `hsl(...)` with arbitrary
//!   expression operands → `dynamicr/g/b/[a]` and `colorSpace` 0/1/2
//! - Fill modifiers: `fill=<name>`, `angle=<n>`, `dist=<n>`, `image=<path>`,
//!   `symbol=<char>`, `inverse`/`~inverse`
//!
//! A malformed hex color is not an error: the whole property is dropped
//! with a warning.
//!
//! The token-level helpers are shared with the per-bar `barTag` codec.

use tracing::warn;

use super::{get, join, non_default, tokens, PropertyCodec};
use crate::attrs::{self, AttributeMap};
use crate::error::{ParseError, Result};

/// Fill type names, indexed by their numeric `fillType` code.
pub const FILL_TYPES: [&str; 10] = [
    "standard",
    "hatch",
    "crosshatch",
    "chessboard",
    "dotted",
    "honeycomb",
    "brick",
    "weaving",
    "symbols",
    "image",
];

const COLOR_SPACES: [&str; 3] = ["rgb", "hsv", "hsl"];
const DYNAMIC_KEYS: [&str; 4] = ["dynamicr", "dynamicg", "dynamicb", "dynamica"];

/// Codec for one of the color properties.
#[derive(Debug, Clone)]
pub struct ColorCodec {
    name: &'static str,
}

impl ColorCodec {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl PropertyCodec for ColorCodec {
    fn name(&self) -> &str {
        self.name
    }

    fn decode(&self, value: &str) -> Result<Option<AttributeMap>> {
        let parts = tokens::split_tokens(value)?;
        decode_tokens(self.name, &parts)
    }

    fn encode(&self, attrs: &AttributeMap) -> Option<String> {
        let text = encode_attrs(attrs);
        (!text.is_empty()).then_some(text)
    }

    fn defaults(&self) -> AttributeMap {
        color_defaults()
    }
}

pub(crate) fn color_defaults() -> AttributeMap {
    attrs::from_pairs(&[
        ("alpha", "1.0"),
        ("fillType", "0"),
        ("hatchAngle", "45"),
        ("hatchDistance", "10"),
        ("inverseFill", "false"),
    ])
}

/// Decodes color and fill tokens.
///
/// Returns `Ok(None)` when the input should be silently dropped (malformed
/// hex, unrecognized bare word) or is empty.
pub(crate) fn decode_tokens(property: &str, parts: &[String]) -> Result<Option<AttributeMap>> {
    let mut out = AttributeMap::new();
    for token in parts {
        if let Some(hex) = token.strip_prefix('#') {
            match parse_hex(hex) {
                Some(color) => out.extend(color),
                None => {
                    warn!(property, color = %token, "ignoring malformed hex color");
                    return Ok(None);
                }
            }
        } else if let Some(dynamic) = parse_dynamic(token)? {
            out.extend(dynamic);
        } else if let Some((key, value)) = tokens::key_value(token) {
            let value = tokens::scalar(value)?;
            match key {
                "fill" => {
                    out.insert("fillType".into(), fill_code(&value)?.to_string());
                }
                "angle" => {
                    out.insert("hatchAngle".into(), value);
                }
                "dist" => {
                    out.insert("hatchDistance".into(), value);
                }
                "image" => {
                    out.insert("image".into(), value);
                }
                "symbol" => {
                    out.insert("fillSymbol".into(), value);
                }
                _ => {
                    return Err(ParseError::new(format!(
                        "unknown {} modifier '{}'",
                        property, key
                    )))
                }
            }
        } else {
            match tokens::negation(token) {
                (on, "inverse") => {
                    out.insert("inverseFill".into(), on.to_string());
                }
                _ => {
                    warn!(property, token = %token, "ignoring unrecognized color token");
                    return Ok(None);
                }
            }
        }
    }
    Ok((!out.is_empty()).then_some(out))
}

/// Parses the digits of `#RRGGBB` / `#RRGGBBAA`.
fn parse_hex(hex: &str) -> Option<AttributeMap> {
    if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let mut out = AttributeMap::new();
    out.insert("r".into(), byte(0)?.to_string());
    out.insert("g".into(), byte(2)?.to_string());
    out.insert("b".into(), byte(4)?.to_string());
    if hex.len() == 8 {
        let alpha = f64::from(byte(6)?) / 255.0;
        out.insert("alpha".into(), alpha.to_string());
    }
    Some(out)
}

/// Parses `rgb(...)`, `hsv(...)` or `hsl(...)`; `Ok(None)` for anything else.
fn parse_dynamic(token: &str) -> Result<Option<AttributeMap>> {
    let Some(open) = token.find('(') else {
        return Ok(None);
    };
    let space = token[..open].to_ascii_lowercase();
    let Some(code) = COLOR_SPACES.iter().position(|s| *s == space) else {
        return Ok(None);
    };
    let inner = token[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| ParseError::new(format!("unclosed dynamic color '{}'", token)))?;
    let operands = tokens::split_top_level(inner, ',')?;
    if !(3..=4).contains(&operands.len()) {
        return Err(ParseError::new(format!(
            "dynamic color needs 3 or 4 components, got {} in '{}'",
            operands.len(),
            token
        )));
    }
    let mut out = AttributeMap::new();
    for (key, operand) in DYNAMIC_KEYS.iter().zip(&operands) {
        out.insert((*key).to_string(), tokens::scalar(operand)?);
    }
    out.insert("colorSpace".into(), code.to_string());
    Ok(Some(out))
}

fn fill_code(name: &str) -> Result<usize> {
    if let Some(code) = FILL_TYPES.iter().position(|f| f.eq_ignore_ascii_case(name)) {
        return Ok(code);
    }
    match name.parse::<usize>() {
        Ok(code) if code < FILL_TYPES.len() => Ok(code),
        _ => Err(ParseError::new(format!("unknown fill type '{}'", name))),
    }
}

/// Name for a stored `fillType`, accepting either the code or the name.
fn fill_name(stored: &str) -> Option<&'static str> {
    match stored.parse::<usize>() {
        Ok(code) => FILL_TYPES.get(code).copied(),
        Err(_) => FILL_TYPES
            .iter()
            .find(|f| f.eq_ignore_ascii_case(stored))
            .copied(),
    }
}

fn channel(attrs: &AttributeMap, key: &str) -> Option<u8> {
    let value: f64 = get(attrs, key)?.trim().parse().ok()?;
    Some(value.round().clamp(0.0, 255.0) as u8)
}

fn encode_color(attrs: &AttributeMap) -> Option<String> {
    if let (Some(r), Some(g), Some(b)) = (channel(attrs, "r"), channel(attrs, "g"), channel(attrs, "b")) {
        let mut hex = format!("#{:02X}{:02X}{:02X}", r, g, b);
        let alpha = get(attrs, "alpha").and_then(|a| a.trim().parse::<f64>().ok());
        if let Some(alpha) = alpha.filter(|a| (a - 1.0).abs() > 1e-6) {
            let byte = (alpha * 255.0).round().clamp(0.0, 255.0) as u8;
            hex.push_str(&format!("{:02X}", byte));
        }
        return Some(hex);
    }
    if get(attrs, "dynamicr").is_some() {
        let space = get(attrs, "colorSpace")
            .and_then(|c| c.parse::<usize>().ok())
            .and_then(|c| COLOR_SPACES.get(c))
            .copied()
            .unwrap_or("rgb");
        let operands: Vec<String> = DYNAMIC_KEYS
            .iter()
            .filter_map(|k| get(attrs, k))
            .map(|v| tokens::quote_if_needed(v).into_owned())
            .collect();
        return Some(format!("{}({})", space, operands.join(",")));
    }
    None
}

/// Encodes color and fill attributes, omitting defaults.
pub(crate) fn encode_attrs(attrs: &AttributeMap) -> String {
    let mut parts = Vec::new();
    parts.extend(encode_color(attrs));
    if let Some(fill) = non_default(attrs, "fillType", "0").and_then(fill_name) {
        if fill != FILL_TYPES[0] {
            parts.push(format!("fill={}", fill));
        }
    }
    if let Some(angle) = non_default(attrs, "hatchAngle", "45") {
        parts.push(format!("angle={}", tokens::quote_if_needed(angle)));
    }
    if let Some(dist) = non_default(attrs, "hatchDistance", "10") {
        parts.push(format!("dist={}", tokens::quote_if_needed(dist)));
    }
    if let Some(image) = get(attrs, "image").filter(|i| !i.is_empty()) {
        parts.push(format!("image={}", quote_leaf(image)));
    }
    if let Some(symbol) = get(attrs, "fillSymbol").filter(|s| !s.is_empty()) {
        parts.push(format!("symbol={}", quote_leaf(symbol)));
    }
    if get(attrs, "inverseFill") == Some("true") {
        parts.push("inverse".to_string());
    }
    join(parts)
}

/// Quotes leaves that would otherwise break a `|`-separated block list.
fn quote_leaf(text: &str) -> String {
    if text.contains('|') {
        tokens::quote(text)
    } else {
        tokens::quote_if_needed(text).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(value: &str) -> Option<AttributeMap> {
        ColorCodec::new("objColor").decode(value).unwrap()
    }

    fn encode(attrs: &AttributeMap) -> Option<String> {
        ColorCodec::new("objColor").encode(attrs)
    }

    // =========================================================================
    // Static colors
    // =========================================================================

    #[test]
    fn test_hex_without_alpha() {
        let attrs = decode("#FF0000").unwrap();
        assert_eq!(attrs["r"], "255");
        assert_eq!(attrs["g"], "0");
        assert_eq!(attrs["b"], "0");
        assert!(!attrs.contains_key("alpha"));
    }

    #[test]
    fn test_hex_with_alpha() {
        let attrs = decode("#FF000022").unwrap();
        let alpha: f64 = attrs["alpha"].parse().unwrap();
        assert!((alpha - 34.0 / 255.0).abs() < 0.001);
        assert_eq!(encode(&attrs).as_deref(), Some("#FF000022"));
    }

    #[test]
    fn test_opaque_alpha_is_omitted() {
        let attrs = attrs::from_pairs(&[("r", "1"), ("g", "2"), ("b", "3"), ("alpha", "1.0")]);
        assert_eq!(encode(&attrs).as_deref(), Some("#010203"));
    }

    #[test]
    fn test_malformed_hex_is_silently_dropped() {
        assert_eq!(decode("#12345"), None);
        assert_eq!(decode("#GGHHII"), None);
        assert_eq!(decode("#FF0000 fill=hatch #12"), None);
    }

    #[test]
    fn test_lowercase_hex() {
        let attrs = decode("#ff8000").unwrap();
        assert_eq!(attrs["g"], "128");
        assert_eq!(encode(&attrs).as_deref(), Some("#FF8000"));
    }

    // =========================================================================
    // Dynamic colors
    // =========================================================================

    #[test]
    fn test_dynamic_rgb() {
        let attrs = decode("rgb(sin(x)*255, 0, a)").unwrap();
        assert_eq!(attrs["dynamicr"], "sin(x)*255");
        assert_eq!(attrs["dynamicg"], "0");
        assert_eq!(attrs["dynamicb"], "a");
        assert_eq!(attrs["colorSpace"], "0");
        assert!(!attrs.contains_key("dynamica"));
        assert_eq!(encode(&attrs).as_deref(), Some("rgb(sin(x)*255,0,a)"));
    }

    #[test]
    fn test_dynamic_hsl_with_alpha_and_quoted_operand() {
        let attrs = decode("hsl(\"a, b\", 0.5, 0.5, 0.2)").unwrap();
        assert_eq!(attrs["dynamicr"], "a, b");
        assert_eq!(attrs["dynamica"], "0.2");
        assert_eq!(attrs["colorSpace"], "2");
        let text = encode(&attrs).unwrap();
        assert_eq!(text, "hsl(\"a, b\",0.5,0.5,0.2)");
        assert_eq!(decode(&text).unwrap(), attrs);
    }

    #[test]
    fn test_dynamic_wrong_arity_is_error() {
        assert!(ColorCodec::new("bgColor").decode("rgb(1,2)").is_err());
        assert!(ColorCodec::new("bgColor").decode("rgb(1,2,3,4,5)").is_err());
    }

    // =========================================================================
    // Fill modifiers
    // =========================================================================

    #[test]
    fn test_fill_modifiers() {
        let attrs =
            decode("#00FF00 fill=hatch angle=30 dist=5 image=\"my pic.png\" symbol=x inverse")
                .unwrap();
        assert_eq!(attrs["fillType"], "1");
        assert_eq!(attrs["hatchAngle"], "30");
        assert_eq!(attrs["hatchDistance"], "5");
        assert_eq!(attrs["image"], "my pic.png");
        assert_eq!(attrs["fillSymbol"], "x");
        assert_eq!(attrs["inverseFill"], "true");
        assert_eq!(
            encode(&attrs).as_deref(),
            Some("#00FF00 fill=hatch angle=30 dist=5 image=\"my pic.png\" symbol=x inverse")
        );
    }

    #[test]
    fn test_defaults_are_not_emitted() {
        let attrs = attrs::from_pairs(&[
            ("fillType", "standard"),
            ("hatchAngle", "45"),
            ("hatchDistance", "10"),
            ("inverseFill", "false"),
        ]);
        assert_eq!(encode(&attrs), None);

        let attrs = attrs::from_pairs(&[
            ("r", "0"),
            ("g", "0"),
            ("b", "255"),
            ("fillType", "0"),
            ("hatchAngle", "45.0"),
        ]);
        assert_eq!(encode(&attrs).as_deref(), Some("#0000FF"));
    }

    #[test]
    fn test_unknown_fill_is_error() {
        assert!(ColorCodec::new("objColor").decode("#000000 fill=plaid").is_err());
    }

    #[test]
    fn test_all_fill_names_round_trip() {
        for (code, name) in FILL_TYPES.iter().enumerate() {
            let attrs = decode(&format!("fill={}", name)).unwrap();
            assert_eq!(attrs["fillType"], code.to_string());
            let text = encode(&attrs);
            if code == 0 {
                assert_eq!(text, None);
            } else {
                assert_eq!(text, Some(format!("fill={}", name)));
            }
        }
    }
}
