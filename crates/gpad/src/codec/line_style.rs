//! `lineStyle`: dash pattern, thickness, hidden-part style, opacity, arrow.
//!
//! Tokens are order-independent. Decoding always yields both `type` and
//! `thickness` as soon as either is given; encoding drops them again when
//! they hold their defaults.

use super::{get, join, non_default, tokens, PropertyCodec};
use crate::attrs::{self, AttributeMap};
use crate::error::{ParseError, Result};

/// Dash pattern names and their numeric `type` codes.
pub const LINE_TYPES: [(&str, i32); 6] = [
    ("pointwise", -1),
    ("full", 0),
    ("dashedshort", 10),
    ("dashedlong", 15),
    ("dotted", 20),
    ("dasheddotted", 30),
];

const HIDDEN_STYLES: [&str; 3] = ["", "dashed", "show"];

#[derive(Debug, Clone, Copy)]
pub struct LineStyleCodec;

impl PropertyCodec for LineStyleCodec {
    fn name(&self) -> &str {
        "lineStyle"
    }

    fn decode(&self, value: &str) -> Result<Option<AttributeMap>> {
        let mut line_type = None;
        let mut thickness = None;
        let mut hidden = None;
        let mut opacity = None;
        let mut arrow = None;

        for token in tokens::split_tokens(value)? {
            if let Some((_, code)) = LINE_TYPES.iter().find(|(name, _)| *name == token) {
                line_type = Some(code.to_string());
                continue;
            }
            match tokens::key_value(&token) {
                Some(("thickness", v)) => {
                    thickness = Some(tokens::truncated(v, "lineStyle thickness")?.to_string());
                }
                Some(("opacity", v)) => {
                    opacity = Some(tokens::truncated(v, "lineStyle opacity")?.to_string());
                }
                Some(("hidden", v)) => {
                    let code = HIDDEN_STYLES
                        .iter()
                        .skip(1)
                        .position(|h| *h == v)
                        .ok_or_else(|| {
                            ParseError::new(format!("unknown lineStyle hidden style '{}'", v))
                        })?;
                    hidden = Some((code + 1).to_string());
                }
                Some((key, _)) => {
                    return Err(ParseError::new(format!(
                        "unknown lineStyle attribute '{}'",
                        key
                    )))
                }
                None => match tokens::negation(&token) {
                    (true, "hidden") => hidden = Some("0".to_string()),
                    (on, "arrow") => arrow = Some(on.to_string()),
                    _ => {
                        return Err(ParseError::new(format!(
                            "unknown lineStyle token '{}'",
                            token
                        )))
                    }
                },
            }
        }

        if line_type.is_some() || thickness.is_some() {
            line_type.get_or_insert_with(|| "0".to_string());
            thickness.get_or_insert_with(|| "5".to_string());
        }
        let mut out = AttributeMap::new();
        for (key, value) in [
            ("type", line_type),
            ("thickness", thickness),
            ("typeHidden", hidden),
            ("opacity", opacity),
            ("drawArrow", arrow),
        ] {
            if let Some(value) = value {
                out.insert(key.to_string(), value);
            }
        }
        Ok((!out.is_empty()).then_some(out))
    }

    fn encode(&self, attrs: &AttributeMap) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(code) = non_default(attrs, "type", "0") {
            let code = tokens::truncate_text(code);
            if let Some((name, _)) = LINE_TYPES.iter().find(|(_, c)| c.to_string() == code) {
                parts.push(name.to_string());
            }
        }
        if let Some(thickness) = non_default(attrs, "thickness", "5") {
            parts.push(format!("thickness={}", tokens::truncate_text(thickness)));
        }
        match get(attrs, "typeHidden").map(tokens::truncate_text).as_deref() {
            Some("0") => parts.push("hidden".to_string()),
            Some("1") => parts.push("hidden=dashed".to_string()),
            Some("2") => parts.push("hidden=show".to_string()),
            _ => {}
        }
        if let Some(opacity) = get(attrs, "opacity") {
            parts.push(format!("opacity={}", tokens::truncate_text(opacity)));
        }
        if get(attrs, "drawArrow") == Some("true") {
            parts.push("arrow".to_string());
        }
        let text = join(parts);
        (!text.is_empty()).then_some(text)
    }

    fn defaults(&self) -> AttributeMap {
        attrs::from_pairs(&[("type", "0"), ("thickness", "5"), ("drawArrow", "false")])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(value: &str) -> Option<AttributeMap> {
        LineStyleCodec.decode(value).unwrap()
    }

    #[test]
    fn test_full_example() {
        let attrs = decode("dashedlong thickness=5.3 hidden opacity=128.6 ~arrow").unwrap();
        assert_eq!(attrs["type"], "15");
        assert_eq!(attrs["thickness"], "5");
        assert_eq!(attrs["typeHidden"], "0");
        assert_eq!(attrs["opacity"], "128");
        assert_eq!(attrs["drawArrow"], "false");
    }

    #[test]
    fn test_order_independent() {
        assert_eq!(
            decode("~arrow opacity=128.6 hidden thickness=5.3 dashedlong"),
            decode("dashedlong thickness=5.3 hidden opacity=128.6 ~arrow")
        );
    }

    #[test]
    fn test_missing_partner_is_filled() {
        let attrs = decode("thickness=7").unwrap();
        assert_eq!(attrs["type"], "0");
        assert_eq!(attrs["thickness"], "7");

        let attrs = decode("dotted").unwrap();
        assert_eq!(attrs["type"], "20");
        assert_eq!(attrs["thickness"], "5");
    }

    #[test]
    fn test_hidden_variants() {
        assert_eq!(decode("hidden=dashed").unwrap()["typeHidden"], "1");
        assert_eq!(decode("hidden=show").unwrap()["typeHidden"], "2");
        assert!(LineStyleCodec.decode("hidden=maybe").is_err());
    }

    #[test]
    fn test_empty_value_is_no_property() {
        assert_eq!(decode(""), None);
    }

    #[test]
    fn test_unknown_token_is_error() {
        assert!(LineStyleCodec.decode("wavy").is_err());
        assert!(LineStyleCodec.decode("width=3").is_err());
    }

    #[test]
    fn test_encode_is_minimal() {
        let attrs = attrs::from_pairs(&[("type", "0"), ("thickness", "5"), ("drawArrow", "false")]);
        assert_eq!(LineStyleCodec.encode(&attrs), None);

        let attrs = attrs::from_pairs(&[
            ("type", "-1"),
            ("thickness", "12"),
            ("typeHidden", "2"),
            ("opacity", "40"),
            ("drawArrow", "true"),
        ]);
        assert_eq!(
            LineStyleCodec.encode(&attrs).as_deref(),
            Some("pointwise thickness=12 hidden=show opacity=40 arrow")
        );
    }
}
