//! Single-valued properties: booleans, integers, floats and strings.
//!
//! Each maps to one attribute of one XML element, `val` unless renamed.
//!
//! | Kind | Syntax | Encoded |
//! |------|--------|---------|
//! | Bool | bare name, or `true`/`1`/`false`/`0` | bare name when true |
//! | Int | integer (decimals truncated) | value when non-default |
//! | Float | number or `NaN` | value when non-default |
//! | Str | enumerated name, or quoted/bare text | name or quoted text |
//!
//! Enumerated strings store the host's code (`labelMode: value` → `2`).

use super::{get, tokens, PropertyCodec};
use crate::attrs::{self, AttributeMap};
use crate::error::{ParseError, Result};
use crate::host::Resettable;

type ValueMap = &'static [(&'static str, &'static str)];

const ANGLE_STYLES: ValueMap = &[("0-360", "0"), ("0-180", "1"), ("180-360", "2"), ("any", "3")];

const COORD_STYLES: ValueMap = &[
    ("cartesian", "cartesian"),
    ("polar", "polar"),
    ("complex", "complex"),
    ("cartesian3d", "cartesian3d"),
    ("spherical", "spherical"),
];

const DECORATIONS: ValueMap = &[
    ("none", "0"),
    ("single_tick", "1"),
    ("double_tick", "2"),
    ("triple_tick", "3"),
    ("simple_arrow", "4"),
    ("double_arrow", "5"),
    ("triple_arrow", "6"),
];

const SEGMENT_ENDS: ValueMap = &[
    ("default", "default"),
    ("line", "line"),
    ("arrow", "arrow"),
    ("crows_foot", "crows_foot"),
    ("arrow_outline", "arrow_outline"),
    ("arrow_filled", "arrow_filled"),
    ("circle_outline", "circle_outline"),
    ("circle", "circle"),
    ("square_outline", "square_outline"),
    ("square", "square"),
    ("diamond_outline", "diamond_outline"),
    ("diamond", "diamond"),
];

const HEAD_STYLES: ValueMap = &[("default", "0"), ("arrow", "1")];

const LABEL_MODES: ValueMap = &[("name", "0"), ("namevalue", "1"), ("value", "2"), ("caption", "3")];

const POINT_STYLES: ValueMap = &[
    ("default", "-1"),
    ("dot", "0"),
    ("cross", "1"),
    ("circle", "2"),
    ("plus", "3"),
    ("diamond", "4"),
    ("empty_diamond", "5"),
    ("triangle_north", "6"),
    ("triangle_south", "7"),
    ("triangle_east", "8"),
    ("triangle_west", "9"),
    ("no_outline", "10"),
];

const TEXT_ALIGNS: ValueMap = &[("left", "left"), ("center", "center"), ("right", "right")];

const TOOLTIP_MODES: ValueMap = &[
    ("algebraview", "0"),
    ("on", "1"),
    ("off", "2"),
    ("caption", "3"),
    ("nextcell", "4"),
];

const VERTICAL_ALIGNS: ValueMap = &[("top", "top"), ("middle", "middle"), ("bottom", "bottom")];

const BOOLEANS: [&str; 21] = [
    "autocolor",
    "auxiliary",
    "breakpoint",
    "centered",
    "comboBox",
    "contentSerif",
    "fixed",
    "hideLabelInAlgebra",
    "inBackground",
    "interpolate",
    "isLaTeX",
    "isMask",
    "keepTypeOnTransform",
    "levelOfDetailQuality",
    "outlyingIntersections",
    "selectionAllowed",
    "showGeneralAngle",
    "showOnAxis",
    "showTrimmed",
    "symbolic",
    "trace",
];

const INTEGERS: [(&str, &str); 7] = [
    ("arcSize", "30"),
    ("decimals", "-1"),
    ("layer", "0"),
    ("length", "20"),
    ("selectedIndex", "0"),
    ("significantfigures", "-1"),
    ("slopeTriangleSize", "1"),
];

const FLOATS: [(&str, &str); 3] = [("fading", "0"), ("ordering", "NaN"), ("pointSize", "5")];

/// Value category of a [`SimpleCodec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleKind {
    Bool,
    Int,
    Float,
    Str,
}

/// Codec for a property stored as one attribute.
#[derive(Debug, Clone)]
pub struct SimpleCodec {
    name: &'static str,
    element: &'static str,
    attr: &'static str,
    kind: SimpleKind,
    default: &'static str,
    values: ValueMap,
    inverted: bool,
    resettable: Option<Resettable>,
}

impl SimpleCodec {
    fn new(name: &'static str, kind: SimpleKind, default: &'static str) -> Self {
        Self {
            name,
            element: name,
            attr: "val",
            kind,
            default,
            values: &[],
            inverted: false,
            resettable: None,
        }
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, SimpleKind::Bool, "false")
    }

    pub fn int(name: &'static str, default: &'static str) -> Self {
        Self::new(name, SimpleKind::Int, default)
    }

    pub fn float(name: &'static str, default: &'static str) -> Self {
        Self::new(name, SimpleKind::Float, default)
    }

    pub fn string(name: &'static str, default: &'static str) -> Self {
        Self::new(name, SimpleKind::Str, default)
    }

    /// Stores the value under a different XML element.
    pub fn with_element(mut self, element: &'static str) -> Self {
        self.element = element;
        self
    }

    /// Stores the value under a different attribute than `val`.
    pub fn with_attr(mut self, attr: &'static str) -> Self {
        self.attr = attr;
        self
    }

    /// Restricts a string property to named values mapped to host codes.
    pub fn with_values(mut self, values: ValueMap) -> Self {
        self.values = values;
        self
    }

    /// Stores a boolean negated.
    pub fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }

    pub fn with_reset(mut self, resettable: Resettable) -> Self {
        self.resettable = Some(resettable);
        self
    }

    pub fn kind(&self) -> SimpleKind {
        self.kind
    }

    /// Stored form of a Gpad boolean.
    fn stored_bool(&self, on: bool) -> String {
        (on != self.inverted).to_string()
    }

    fn decode_value(&self, text: &str) -> Result<String> {
        match self.kind {
            SimpleKind::Bool => {
                let on = match text {
                    "" | "true" | "1" => true,
                    "false" | "0" => false,
                    _ => {
                        return Err(ParseError::new(format!(
                            "{} expects a boolean, got '{}'",
                            self.name, text
                        )))
                    }
                };
                Ok(self.stored_bool(on))
            }
            SimpleKind::Int => Ok(tokens::truncated(text, self.name)?.to_string()),
            SimpleKind::Float => {
                tokens::number(text, self.name)?;
                Ok(text.to_string())
            }
            SimpleKind::Str if self.values.is_empty() => Ok(text.to_string()),
            SimpleKind::Str => {
                if let Some((_, code)) = self.values.iter().find(|(name, _)| *name == text) {
                    return Ok(code.to_string());
                }
                if self.values.iter().any(|(_, code)| *code == text) {
                    return Ok(text.to_string());
                }
                Err(ParseError::new(format!(
                    "unknown {} value '{}'",
                    self.name, text
                )))
            }
        }
    }
}

impl PropertyCodec for SimpleCodec {
    fn name(&self) -> &str {
        self.name
    }

    fn element(&self) -> &str {
        self.element
    }

    fn decode(&self, value: &str) -> Result<Option<AttributeMap>> {
        let text = tokens::scalar(value)?;
        if self.kind != SimpleKind::Bool && self.kind != SimpleKind::Str && text.is_empty() {
            return Err(ParseError::new(format!("{} needs a value", self.name)));
        }
        let stored = self.decode_value(&text)?;
        Ok(Some(attrs::from_pairs(&[(self.attr, stored.as_str())])))
    }

    fn encode(&self, attrs: &AttributeMap) -> Option<String> {
        let value = get(attrs, self.attr)?;
        match self.kind {
            SimpleKind::Bool => (value == self.stored_bool(true)).then(String::new),
            SimpleKind::Int | SimpleKind::Float => {
                (!tokens::same_value(value, self.default)).then(|| value.to_string())
            }
            SimpleKind::Str => {
                if value == self.default {
                    return None;
                }
                match self.values.iter().find(|(_, code)| *code == value) {
                    Some((name, _)) => Some(name.to_string()),
                    None => Some(tokens::quote_if_needed(value).into_owned()),
                }
            }
        }
    }

    fn defaults(&self) -> AttributeMap {
        let default = match self.kind {
            SimpleKind::Bool => self.stored_bool(false),
            _ => self.default.to_string(),
        };
        attrs::from_pairs(&[(self.attr, default.as_str())])
    }

    fn resettable(&self) -> Option<Resettable> {
        self.resettable
    }
}

/// Every built-in single-valued property.
pub(crate) fn all() -> Vec<SimpleCodec> {
    let mut codecs = Vec::new();
    for name in BOOLEANS {
        let codec = SimpleCodec::boolean(name);
        codecs.push(match name {
            "hideLabelInAlgebra" => codec.with_element("algebra").with_attr("labelVisible"),
            "showGeneralAngle" => codec.with_element("emphasizeRightAngle").inverted(),
            "trace" => codec.with_reset(Resettable::Trace),
            _ => codec,
        });
    }
    for (name, default) in INTEGERS {
        codecs.push(SimpleCodec::int(name, default));
    }
    for (name, default) in FLOATS {
        codecs.push(SimpleCodec::float(name, default));
    }
    codecs.extend([
        SimpleCodec::string("angleStyle", "0").with_values(ANGLE_STYLES),
        SimpleCodec::string("caption", ""),
        SimpleCodec::string("content", ""),
        SimpleCodec::string("coordStyle", "cartesian").with_values(COORD_STYLES),
        SimpleCodec::string("decoration", "0")
            .with_attr("type")
            .with_values(DECORATIONS),
        SimpleCodec::string("dynamicCaption", "").with_reset(Resettable::DynamicCaption),
        SimpleCodec::string("endStyle", "default").with_values(SEGMENT_ENDS),
        SimpleCodec::string("filename", "")
            .with_element("file")
            .with_attr("name"),
        SimpleCodec::string("headStyle", "0").with_values(HEAD_STYLES),
        SimpleCodec::string("incrementY", ""),
        SimpleCodec::string("labelMode", "0").with_values(LABEL_MODES),
        SimpleCodec::string("linkedGeo", "").with_attr("exp"),
        SimpleCodec::string("parentLabel", ""),
        SimpleCodec::string("pointStyle", "0").with_values(POINT_STYLES),
        SimpleCodec::string("showIf", "")
            .with_element("condition")
            .with_attr("showObject")
            .with_reset(Resettable::Condition),
        SimpleCodec::string("startStyle", "default").with_values(SEGMENT_ENDS),
        SimpleCodec::string("textAlign", "left").with_values(TEXT_ALIGNS),
        SimpleCodec::string("tooltipMode", "0").with_values(TOOLTIP_MODES),
        SimpleCodec::string("verticalAlign", "top").with_values(VERTICAL_ALIGNS),
    ]);
    codecs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecRegistry;

    fn codec(name: &str) -> &'static dyn PropertyCodec {
        CodecRegistry::global().get(name).unwrap()
    }

    // =========================================================================
    // Booleans
    // =========================================================================

    #[test]
    fn test_bare_boolean() {
        let attrs = codec("fixed").decode("").unwrap().unwrap();
        assert_eq!(attrs["val"], "true");
        assert_eq!(codec("fixed").encode(&attrs).as_deref(), Some(""));
    }

    #[test]
    fn test_false_boolean_is_omitted() {
        let attrs = codec("auxiliary").decode("false").unwrap().unwrap();
        assert_eq!(attrs["val"], "false");
        assert_eq!(codec("auxiliary").encode(&attrs), None);
    }

    #[test]
    fn test_inverted_boolean() {
        let show = codec("showGeneralAngle");
        assert_eq!(show.element(), "emphasizeRightAngle");
        let attrs = show.decode("").unwrap().unwrap();
        assert_eq!(attrs["val"], "false");
        assert_eq!(show.encode(&attrs).as_deref(), Some(""));
        assert_eq!(show.encode(&attrs::from_pairs(&[("val", "true")])), None);
    }

    #[test]
    fn test_renamed_attribute() {
        let hide = codec("hideLabelInAlgebra");
        let attrs = hide.decode("true").unwrap().unwrap();
        assert_eq!(attrs["labelVisible"], "true");
        assert_eq!(hide.element(), "algebra");
    }

    #[test]
    fn test_invalid_boolean() {
        assert!(codec("fixed").decode("yes").is_err());
    }

    // =========================================================================
    // Numbers
    // =========================================================================

    #[test]
    fn test_int_truncates() {
        let attrs = codec("layer").decode("3.7").unwrap().unwrap();
        assert_eq!(attrs["val"], "3");
        assert_eq!(codec("layer").encode(&attrs).as_deref(), Some("3"));
        assert_eq!(codec("layer").encode(&attrs::from_pairs(&[("val", "0")])), None);
    }

    #[test]
    fn test_float_defaults() {
        let size = codec("pointSize");
        assert_eq!(size.encode(&attrs::from_pairs(&[("val", "5.0")])), None);
        assert_eq!(
            size.encode(&attrs::from_pairs(&[("val", "8")])).as_deref(),
            Some("8")
        );
        let ordering = codec("ordering");
        assert_eq!(ordering.encode(&attrs::from_pairs(&[("val", "NaN")])), None);
        assert_eq!(ordering.decode("NaN").unwrap().unwrap()["val"], "NaN");
    }

    #[test]
    fn test_number_needs_value() {
        assert!(codec("pointSize").decode("").is_err());
        assert!(codec("arcSize").decode("big").is_err());
    }

    // =========================================================================
    // Strings
    // =========================================================================

    #[test]
    fn test_enumerated_string() {
        let mode = codec("labelMode");
        let attrs = mode.decode("namevalue").unwrap().unwrap();
        assert_eq!(attrs["val"], "1");
        assert_eq!(mode.encode(&attrs).as_deref(), Some("namevalue"));
        assert!(mode.decode("everything").is_err());
    }

    #[test]
    fn test_enumerated_string_accepts_code() {
        let attrs = codec("pointStyle").decode("3").unwrap().unwrap();
        assert_eq!(attrs["val"], "3");
        assert_eq!(codec("pointStyle").encode(&attrs).as_deref(), Some("plus"));
    }

    #[test]
    fn test_decoration_uses_type_attr() {
        let attrs = codec("decoration").decode("double_tick").unwrap().unwrap();
        assert_eq!(attrs["type"], "2");
    }

    #[test]
    fn test_free_text_quoting() {
        let caption = codec("caption");
        let attrs = caption.decode("\"Test Caption\"").unwrap().unwrap();
        assert_eq!(attrs["val"], "Test Caption");
        assert_eq!(caption.encode(&attrs).as_deref(), Some("\"Test Caption\""));

        let style = codec("coordStyle");
        let attrs = style.decode("polar").unwrap().unwrap();
        assert_eq!(style.encode(&attrs).as_deref(), Some("polar"));
        assert_eq!(style.encode(&attrs::from_pairs(&[("val", "cartesian")])), None);
    }

    #[test]
    fn test_show_if_is_condition() {
        let show_if = codec("showIf");
        let attrs = show_if.decode("\"a > 2\"").unwrap().unwrap();
        assert_eq!(attrs["showObject"], "a > 2");
        assert_eq!(show_if.element(), "condition");
        assert_eq!(show_if.resettable(), Some(Resettable::Condition));
    }
}
