//! `slider`: interval, size, placement and slider-only flags.
//!
//! ```text
//! slider: min=<expr> max=<expr> width=<n> [@screen] [x=<n> y=<n>]
//!         [vertical] [algebra] [constant] [fixed]
//! ```
//!
//! `@screen` here only affects the slider's own placement; it is unrelated
//! to the object-level `@screen` property. Every flag takes a `~` negation.

use super::{bool_text, get, is_true, join, non_default, tokens, PropertyCodec};
use crate::attrs::{self, AttributeMap};
use crate::error::{ParseError, Result};

/// `(token, attribute, inverted)` for the boolean flags.
const FLAGS: [(&str, &str, bool); 5] = [
    ("@screen", "absoluteScreenLocation", false),
    ("vertical", "horizontal", true),
    ("algebra", "showAlgebra", false),
    ("constant", "arbitraryConstant", false),
    ("fixed", "fixed", false),
];

const VALUES: [&str; 5] = ["min", "max", "width", "x", "y"];

#[derive(Debug, Clone, Copy)]
pub struct SliderCodec;

impl PropertyCodec for SliderCodec {
    fn name(&self) -> &str {
        "slider"
    }

    fn decode(&self, value: &str) -> Result<Option<AttributeMap>> {
        let mut out = AttributeMap::new();
        for token in tokens::split_tokens(value)? {
            if let Some((key, v)) = tokens::key_value(&token) {
                if !VALUES.contains(&key) {
                    return Err(ParseError::new(format!("unknown slider attribute '{}'", key)));
                }
                out.insert(key.to_string(), tokens::scalar(v)?);
                continue;
            }
            let (on, name) = tokens::negation(&token);
            let (_, attr, inverted) = FLAGS
                .iter()
                .find(|(t, _, _)| *t == name)
                .ok_or_else(|| ParseError::new(format!("unknown slider token '{}'", token)))?;
            out.insert(attr.to_string(), bool_text(on != *inverted));
        }
        Ok((!out.is_empty()).then_some(out))
    }

    fn encode(&self, attrs: &AttributeMap) -> Option<String> {
        let mut parts = Vec::new();
        for key in ["min", "max"] {
            if let Some(v) = get(attrs, key) {
                parts.push(format!("{}={}", key, tokens::quote_if_needed(v)));
            }
        }
        if let Some(width) = non_default(attrs, "width", "200") {
            parts.push(format!("width={}", tokens::quote_if_needed(width)));
        }
        if is_true(attrs, "absoluteScreenLocation") {
            parts.push("@screen".to_string());
        }
        for key in ["x", "y"] {
            if let Some(v) = get(attrs, key) {
                parts.push(format!("{}={}", key, tokens::quote_if_needed(v)));
            }
        }
        for (token, attr, inverted) in FLAGS.iter().skip(1) {
            if get(attrs, attr) == Some(bool_text(!*inverted).as_str()) {
                parts.push(token.to_string());
            }
        }
        let text = join(parts);
        (!text.is_empty()).then_some(text)
    }

    fn defaults(&self) -> AttributeMap {
        attrs::from_pairs(&[
            ("width", "200"),
            ("absoluteScreenLocation", "false"),
            ("horizontal", "true"),
            ("showAlgebra", "false"),
            ("arbitraryConstant", "false"),
            ("fixed", "false"),
        ])
    }
}
