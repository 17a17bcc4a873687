//! `animation`: playing flag, step with direction, speed.
//!
//! | Token | Attributes |
//! |-------|------------|
//! | `play` / `~play` | `playing` true / false |
//! | `+n` `-n` `=n` `n` | `step` n, `type` 1 / 2 / 3 / 0 |
//! | bare `+` `-` `=` | `type` only |
//! | `speed=n` | `speed` |
//!
//! Steps and speeds may be quoted expressions: `+"a+b"`.

use super::{get, join, non_default, tokens, PropertyCodec};
use crate::attrs::{self, AttributeMap};
use crate::error::{ParseError, Result};

/// Direction prefixes by `type` code; oscillating (0) has none.
const PREFIXES: [(char, &str); 3] = [('+', "1"), ('-', "2"), ('=', "3")];

#[derive(Debug, Clone, Copy)]
pub struct AnimationCodec;

impl PropertyCodec for AnimationCodec {
    fn name(&self) -> &str {
        "animation"
    }

    fn decode(&self, value: &str) -> Result<Option<AttributeMap>> {
        let mut out = AttributeMap::new();
        for token in tokens::split_tokens(value)? {
            if let (on, "play") = tokens::negation(&token) {
                out.insert("playing".into(), on.to_string());
                continue;
            }
            match tokens::key_value(&token) {
                Some(("speed", speed)) => {
                    out.insert("speed".into(), tokens::scalar(speed)?);
                    continue;
                }
                Some((key, _)) => {
                    return Err(ParseError::new(format!(
                        "unknown animation attribute '{}'",
                        key
                    )))
                }
                None => {}
            }
            let (kind, step) = match PREFIXES.iter().find(|(p, _)| token.starts_with(*p)) {
                Some((prefix, kind)) => (*kind, &token[prefix.len_utf8()..]),
                None => ("0", token.as_str()),
            };
            if !step.is_empty() {
                out.insert("step".into(), tokens::scalar(step)?);
            }
            out.insert("type".into(), kind.to_string());
        }
        Ok((!out.is_empty()).then_some(out))
    }

    fn encode(&self, attrs: &AttributeMap) -> Option<String> {
        let mut parts = Vec::new();
        if get(attrs, "playing") == Some("true") {
            parts.push("play".to_string());
        }
        let prefix = get(attrs, "type")
            .and_then(|t| PREFIXES.iter().find(|(_, k)| tokens::same_value(k, t)))
            .map(|(p, _)| p.to_string())
            .unwrap_or_default();
        match non_default(attrs, "step", "0.1") {
            Some(step) => parts.push(format!("{}{}", prefix, number_or_quoted(step))),
            None => parts.push(prefix),
        }
        if let Some(speed) = non_default(attrs, "speed", "1") {
            parts.push(format!("speed={}", number_or_quoted(speed)));
        }
        let text = join(parts);
        (!text.is_empty()).then_some(text)
    }

    fn defaults(&self) -> AttributeMap {
        attrs::from_pairs(&[
            ("playing", "false"),
            ("step", "0.1"),
            ("speed", "1"),
            ("type", "0"),
        ])
    }
}

/// Plain unsigned numbers stay bare; anything else is quoted so a leading
/// sign or operator cannot be mistaken for a direction prefix.
fn number_or_quoted(text: &str) -> String {
    if tokens::is_plain_number(text) {
        text.to_string()
    } else {
        tokens::quote(text)
    }
}
