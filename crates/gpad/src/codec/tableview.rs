//! `tableview`: column in the table view and whether points are shown.

use super::{get, join, non_default, tokens, PropertyCodec};
use crate::attrs::{self, AttributeMap};
use crate::error::{ParseError, Result};

#[derive(Debug, Clone, Copy)]
pub struct TableViewCodec;

impl PropertyCodec for TableViewCodec {
    fn name(&self) -> &str {
        "tableview"
    }

    fn decode(&self, value: &str) -> Result<Option<AttributeMap>> {
        let mut out = AttributeMap::new();
        for (i, token) in tokens::split_tokens(value)?.iter().enumerate() {
            match tokens::negation(token) {
                (on, "points") => {
                    out.insert("points".into(), on.to_string());
                }
                _ if i == 0 => {
                    let column: i64 = token.parse().map_err(|_| {
                        ParseError::new(format!("invalid tableview column '{}'", token))
                    })?;
                    out.insert("column".into(), column.to_string());
                }
                _ => {
                    return Err(ParseError::new(format!(
                        "unknown tableview token '{}'",
                        token
                    )))
                }
            }
        }
        Ok((!out.is_empty()).then_some(out))
    }

    fn encode(&self, attrs: &AttributeMap) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(column) = non_default(attrs, "column", "-1") {
            parts.push(tokens::truncate_text(column));
        }
        if get(attrs, "points") == Some("false") {
            parts.push("~points".to_string());
        }
        let text = join(parts);
        (!text.is_empty()).then_some(text)
    }

    fn defaults(&self) -> AttributeMap {
        attrs::from_pairs(&[("column", "-1"), ("points", "true")])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(value: &str) -> AttributeMap {
        TableViewCodec.decode(value).unwrap().unwrap()
    }

    #[test]
    fn test_column_and_points() {
        let attrs = decode("2 points");
        assert_eq!(attrs["column"], "2");
        assert_eq!(attrs["points"], "true");
        assert_eq!(TableViewCodec.encode(&attrs).as_deref(), Some("2"));

        let attrs = decode("1 ~points");
        assert_eq!(attrs["points"], "false");
        assert_eq!(TableViewCodec.encode(&attrs).as_deref(), Some("1 ~points"));
    }

    #[test]
    fn test_points_only() {
        let attrs = decode("~points");
        assert!(!attrs.contains_key("column"));
        assert_eq!(TableViewCodec.encode(&attrs).as_deref(), Some("~points"));
        assert_eq!(TableViewCodec.encode(&decode("points")), None);
    }

    #[test]
    fn test_column_zero_is_kept() {
        assert_eq!(TableViewCodec.encode(&decode("0 points")).as_deref(), Some("0"));
    }

    #[test]
    fn test_column_must_lead() {
        assert!(TableViewCodec.decode("points 2").is_err());
        assert!(TableViewCodec.decode("two").is_err());
    }
}
