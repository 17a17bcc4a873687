//! `show`: object/label visibility and the packed graphics-view bits.
//!
//! | Token | Effect on `ev` |
//! |-------|----------------|
//! | `ev1` / `~ev1` | clear / set bit 0 |
//! | `ev2` / `~ev2` | set / clear bit 1 |
//! | `3d` / `~3d` | set bit 2 and clear bit 3 / the reverse |
//! | `plane` / `~plane` | set bit 4 and clear bit 5 / the reverse |
//!
//! Bit 0 is stored inverted: an object shown in the first view has it clear.
//! Tokens apply left to right, so a later token wins for the bits it touches.

use super::{get, join, tokens, PropertyCodec};
use crate::attrs::{self, AttributeMap};
use crate::error::{ParseError, Result};

/// `(token, bits set, bits cleared)` for the plain form of each view token.
const VIEW_TOKENS: [(&str, u32, u32); 4] = [
    ("ev1", 0, 1),
    ("ev2", 1 << 1, 0),
    ("3d", 1 << 2, 1 << 3),
    ("plane", 1 << 4, 1 << 5),
];

#[derive(Debug, Clone, Copy)]
pub struct ShowCodec;

impl PropertyCodec for ShowCodec {
    fn name(&self) -> &str {
        "show"
    }

    fn decode(&self, value: &str) -> Result<Option<AttributeMap>> {
        let mut object = None;
        let mut label = None;
        let mut ev: Option<u32> = None;

        for token in tokens::split_tokens(value)? {
            let (on, name) = tokens::negation(&token);
            match name {
                "object" => object = Some(on),
                "label" => label = Some(on),
                _ => {
                    let (_, set, clear) = VIEW_TOKENS
                        .iter()
                        .find(|(t, _, _)| *t == name)
                        .copied()
                        .ok_or_else(|| {
                            ParseError::new(format!("unknown show token '{}'", token))
                        })?;
                    let (set, clear) = if on { (set, clear) } else { (clear, set) };
                    let bits = ev.get_or_insert(0);
                    *bits = (*bits | set) & !clear;
                }
            }
        }

        let mut out = AttributeMap::new();
        if let Some(object) = object {
            out.insert("object".into(), object.to_string());
        }
        if let Some(label) = label {
            out.insert("label".into(), label.to_string());
        }
        if let Some(ev) = ev {
            out.insert("ev".into(), ev.to_string());
        }
        Ok((!out.is_empty()).then_some(out))
    }

    fn encode(&self, attrs: &AttributeMap) -> Option<String> {
        let mut parts = Vec::new();
        if get(attrs, "object") == Some("true") {
            parts.push("object".to_string());
        }
        if get(attrs, "label") == Some("true") {
            parts.push("label".to_string());
        }
        let ev = get(attrs, "ev")
            .and_then(|e| e.trim().parse::<u32>().ok())
            .unwrap_or(0);
        let flags = [
            (1, "~ev1"),
            (1 << 1, "ev2"),
            (1 << 2, "3d"),
            (1 << 3, "~3d"),
            (1 << 4, "plane"),
            (1 << 5, "~plane"),
        ];
        for (bit, token) in flags {
            if ev & bit != 0 {
                parts.push(token.to_string());
            }
        }
        let text = join(parts);
        (!text.is_empty()).then_some(text)
    }

    fn defaults(&self) -> AttributeMap {
        attrs::from_pairs(&[("object", "false"), ("label", "false"), ("ev", "0")])
    }
}
