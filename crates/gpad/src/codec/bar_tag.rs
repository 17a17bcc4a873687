//! `barTag`: per-bar color and fill overrides for bar charts.
//!
//! ```text
//! barTag: bar=1 #FF0000 | bar=2 #00FF00 fill=hatch angle=30
//! ```
//!
//! Each `|`-separated block names its 1-based bar with `bar=n`; the other
//! tokens use the color grammar. Attributes are flattened per bar (`1.r`,
//! `2.fillType`, ...). A block without `bar=` is skipped with a warning.

use tracing::warn;

use super::color::{self, color_defaults};
use super::{get, tokens, PropertyCodec, Route};
use crate::attrs::{self, AttributeMap};
use crate::error::{ParseError, Result};

/// Bar attribute → `<tag key=...>` name. The color itself travels as
/// `barColor`.
pub(crate) const BAR_TAG_KEYS: [(&str, &str); 6] = [
    ("alpha", "barAlpha"),
    ("fillType", "barFillType"),
    ("hatchAngle", "barHatchAngle"),
    ("hatchDistance", "barHatchDistance"),
    ("image", "barImage"),
    ("fillSymbol", "barSymbol"),
];

#[derive(Debug, Clone, Copy)]
pub struct BarTagCodec;

fn tag_route(bar: u32, key: &str, value: &str) -> Route {
    let number = bar.to_string();
    Route::element(
        "tag",
        attrs::from_pairs(&[("barNumber", number.as_str()), ("key", key), ("value", value)]),
    )
}

impl PropertyCodec for BarTagCodec {
    fn name(&self) -> &str {
        "barTag"
    }

    fn element(&self) -> &str {
        "tag"
    }

    fn decode(&self, value: &str) -> Result<Option<AttributeMap>> {
        let mut out = AttributeMap::new();
        for block in tokens::split_top_level(value, '|')? {
            let mut bar = None;
            let mut rest = Vec::new();
            for token in tokens::split_tokens(&block)? {
                match tokens::key_value(&token) {
                    Some(("bar", n)) => {
                        let n: u32 = n.parse().map_err(|_| {
                            ParseError::new(format!("invalid barTag bar number '{}'", n))
                        })?;
                        bar = Some(n);
                    }
                    _ => rest.push(token),
                }
            }
            let Some(bar) = bar else {
                warn!(block = %block, "skipping barTag block without bar=");
                continue;
            };
            match color::decode_tokens("barTag", &rest)? {
                Some(group) => attrs::flatten_into(&mut out, bar, &group),
                None => warn!(bar, "skipping empty or malformed barTag block"),
            }
        }
        Ok((!out.is_empty()).then_some(out))
    }

    fn encode(&self, attrs: &AttributeMap) -> Option<String> {
        let blocks: Vec<String> = attrs::group_indexed(attrs)
            .into_iter()
            .filter_map(|(bar, group)| {
                let body = color::encode_attrs(&group);
                (!body.is_empty()).then(|| format!("bar={} {}", bar, body))
            })
            .collect();
        (!blocks.is_empty()).then(|| blocks.join(" | "))
    }

    fn complete(&self, attrs: &AttributeMap) -> AttributeMap {
        let mut out = AttributeMap::new();
        for (bar, _) in attrs::group_indexed(attrs) {
            attrs::flatten_into(&mut out, bar, &color_defaults());
        }
        out.extend(attrs.iter().map(|(k, v)| (k.clone(), v.clone())));
        out
    }

    /// One `<tag barNumber key value>` element per bar attribute.
    fn routes(&self, attrs: &AttributeMap) -> Vec<Route> {
        let mut routes = Vec::new();
        for (bar, group) in attrs::group_indexed(attrs) {
            if let (Some(r), Some(g), Some(b)) = (get(&group, "r"), get(&group, "g"), get(&group, "b")) {
                routes.push(tag_route(bar, "barColor", &format!("rgb({},{},{})", r, g, b)));
            }
            for (attr, key) in BAR_TAG_KEYS {
                if let Some(value) = get(&group, attr) {
                    routes.push(tag_route(bar, key, value));
                }
            }
        }
        routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::equivalent;

    fn decode(value: &str) -> AttributeMap {
        BarTagCodec.decode(value).unwrap().unwrap()
    }

    #[test]
    fn test_two_bars() {
        let attrs = decode("bar=1 #FF0000 | bar=2 #00FF00 fill=hatch angle=30 dist=10");
        assert_eq!(attrs["1.r"], "255");
        assert_eq!(attrs["1.g"], "0");
        assert_eq!(attrs["2.g"], "255");
        assert_eq!(attrs["2.fillType"], "1");
        assert_eq!(attrs["2.hatchAngle"], "30");
        assert_eq!(attrs["2.hatchDistance"], "10");
        assert_eq!(
            BarTagCodec.encode(&attrs).as_deref(),
            Some("bar=1 #FF0000 | bar=2 #00FF00 fill=hatch angle=30")
        );
    }

    #[test]
    fn test_order_within_block_is_irrelevant() {
        let a = decode("bar=2 #00FF00 fill=hatch angle=30");
        let b = decode("angle=30 fill=hatch #00FF00 bar=2");
        assert!(equivalent(&BarTagCodec, &a, &b));
        assert_eq!(a["2.hatchAngle"], b["2.hatchAngle"]);
    }

    #[test]
    fn test_block_without_bar_is_skipped() {
        let attrs = decode("#FF0000 | bar=3 #0000FF");
        assert!(!attrs.keys().any(|k| k.starts_with("0.") || k.starts_with("1.")));
        assert_eq!(attrs["3.b"], "255");
    }

    #[test]
    fn test_bars_encode_in_index_order() {
        let attrs = decode("bar=5 #000001 | bar=2 #000002");
        assert_eq!(
            BarTagCodec.encode(&attrs).as_deref(),
            Some("bar=2 #000002 | bar=5 #000001")
        );
    }

    #[test]
    fn test_image_with_pipe_is_quoted() {
        let attrs = decode("bar=1 fill=image image=\"a|b.png\"");
        assert_eq!(attrs["1.image"], "a|b.png");
        let text = BarTagCodec.encode(&attrs).unwrap();
        assert_eq!(text, "bar=1 fill=image image=\"a|b.png\"");
        assert_eq!(decode(&text), attrs);
    }

    #[test]
    fn test_routes_expand_to_tag_elements() {
        let attrs = decode("bar=2 #00FF00 fill=hatch");
        let routes = BarTagCodec.routes(&attrs);
        assert_eq!(
            routes[0],
            Route::element(
                "tag",
                attrs::from_pairs(&[("barNumber", "2"), ("key", "barColor"), ("value", "rgb(0,255,0)")])
            )
        );
        assert!(routes.contains(&Route::element(
            "tag",
            attrs::from_pairs(&[("barNumber", "2"), ("key", "barFillType"), ("value", "1")])
        )));
    }

    #[test]
    fn test_invalid_bar_number() {
        assert!(BarTagCodec.decode("bar=x #FF0000").is_err());
    }
}
