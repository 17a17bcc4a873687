//! `spreadsheetTrace`: tracing an object's values into spreadsheet cells.
//!
//! | Token | Attributes |
//! |-------|------------|
//! | `trace` | `val` |
//! | `column=n` | `traceColumn1` |
//! | `row=n` | `traceRow1` |
//! | `row=n/m` | `traceRow1`, `numRows` = m, `doRowLimit` = true |
//! | `reset` | `doColumnReset` |
//! | `label` | `showLabel` (defaults to true) |
//! | `list` | `showTraceList` |
//! | `copy` | `doTraceGeoCopy` |
//! | `pause` | `pause` |

use super::{bool_text, get, is_true, join, non_default, tokens, PropertyCodec};
use crate::attrs::{self, AttributeMap};
use crate::error::{ParseError, Result};
use crate::host::Resettable;

/// `(token, attribute, default)` for the boolean flags, in output order.
const FLAGS: [(&str, &str, bool); 6] = [
    ("trace", "val", false),
    ("reset", "doColumnReset", false),
    ("label", "showLabel", true),
    ("list", "showTraceList", false),
    ("copy", "doTraceGeoCopy", false),
    ("pause", "pause", false),
];

#[derive(Debug, Clone, Copy)]
pub struct SpreadsheetTraceCodec;

impl PropertyCodec for SpreadsheetTraceCodec {
    fn name(&self) -> &str {
        "spreadsheetTrace"
    }

    fn decode(&self, value: &str) -> Result<Option<AttributeMap>> {
        let mut out = AttributeMap::new();
        for token in tokens::split_tokens(value)? {
            match tokens::key_value(&token) {
                Some(("column", v)) => {
                    let column = tokens::truncated(v, "spreadsheetTrace column")?;
                    out.insert("traceColumn1".into(), column.to_string());
                }
                Some(("row", v)) => {
                    let (row, limit) = match v.split_once('/') {
                        Some((row, limit)) => (row, Some(limit)),
                        None => (v, None),
                    };
                    let row = tokens::truncated(row, "spreadsheetTrace row")?;
                    out.insert("traceRow1".into(), row.to_string());
                    if let Some(limit) = limit {
                        let limit = tokens::truncated(limit, "spreadsheetTrace row limit")?;
                        out.insert("numRows".into(), limit.to_string());
                        out.insert("doRowLimit".into(), "true".into());
                    }
                }
                Some((key, _)) => {
                    return Err(ParseError::new(format!(
                        "unknown spreadsheetTrace attribute '{}'",
                        key
                    )))
                }
                None => {
                    let (on, name) = tokens::negation(&token);
                    let (_, attr, _) = FLAGS.iter().find(|(t, _, _)| *t == name).ok_or_else(|| {
                        ParseError::new(format!("unknown spreadsheetTrace token '{}'", token))
                    })?;
                    out.insert(attr.to_string(), bool_text(on));
                }
            }
        }
        Ok((!out.is_empty()).then_some(out))
    }

    fn encode(&self, attrs: &AttributeMap) -> Option<String> {
        let mut parts = Vec::new();
        if is_true(attrs, "val") {
            parts.push("trace".to_string());
        }
        if let Some(column) = non_default(attrs, "traceColumn1", "-1") {
            parts.push(format!("column={}", column));
        }
        if let Some(row) = non_default(attrs, "traceRow1", "-1") {
            match get(attrs, "numRows").filter(|_| is_true(attrs, "doRowLimit")) {
                Some(limit) => parts.push(format!("row={}/{}", row, limit)),
                None => parts.push(format!("row={}", row)),
            }
        }
        for (token, attr, default) in FLAGS.iter().skip(1) {
            match get(attrs, attr) {
                Some(v) if v == bool_text(!*default) => {
                    let prefix = if *default { "~" } else { "" };
                    parts.push(format!("{}{}", prefix, token));
                }
                _ => {}
            }
        }
        let text = join(parts);
        (!text.is_empty()).then_some(text)
    }

    fn defaults(&self) -> AttributeMap {
        attrs::from_pairs(&[
            ("val", "false"),
            ("traceColumn1", "-1"),
            ("traceRow1", "-1"),
            ("doRowLimit", "false"),
            ("doColumnReset", "false"),
            ("showLabel", "true"),
            ("showTraceList", "false"),
            ("doTraceGeoCopy", "false"),
            ("pause", "false"),
        ])
    }

    fn resettable(&self) -> Option<Resettable> {
        Some(Resettable::SpreadsheetTrace)
    }
}
