//! Property codecs: compact Gpad syntax ↔ structured attribute maps.
//!
//! Every style property has one codec. A codec decodes the text after
//! `name:` into an [`AttributeMap`], encodes such a map back into the most
//! compact text that decodes to an equivalent map, knows its documented
//! defaults, and says how the applier delivers the map to the host.
//!
//! # Design
//!
//! Codecs are independent and stateless. The [`CodecRegistry`] is a closed
//! table from property name (and XML element name) to codec, so adding a
//! property never touches the parser, the applier or the converter.
//!
//! # Round trips
//!
//! Encoding omits every attribute equal to its documented default, so the
//! inversion contract is stated modulo defaults:
//!
//! ```text
//! complete(decode(encode(a))) == complete(a)     for a in decode's range
//! encode(decode(encode(a)))   == encode(a)
//! ```
//!
//! where [`complete`](PropertyCodec::complete) overlays a map on the codec's
//! [`defaults`](PropertyCodec::defaults).
//!
//! # Example
//!
//! ```rust
//! use gpad::codec::CodecRegistry;
//!
//! let registry = CodecRegistry::global();
//! let line = registry.get("lineStyle").unwrap();
//! let attrs = line.decode("dashedlong thickness=5.3 ~arrow").unwrap().unwrap();
//! assert_eq!(attrs["type"], "15");
//! assert_eq!(attrs["thickness"], "5");
//! assert_eq!(line.encode(&attrs).as_deref(), Some("dashedlong"));
//! ```

mod animation;
mod bar_tag;
mod color;
mod coords;
mod geometry;
mod line_style;
mod script;
mod show;
mod simple;
mod slider;
mod spreadsheet_trace;
mod start_point;
mod tableview;
pub mod tokens;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::attrs::{self, AttributeMap};
use crate::error::Result;
use crate::host::{Resettable, ScriptSlot};

pub use animation::AnimationCodec;
pub use bar_tag::BarTagCodec;
pub(crate) use bar_tag::BAR_TAG_KEYS;
pub use color::{ColorCodec, FILL_TYPES};
pub use coords::CoordsCodec;
pub use geometry::{
    BoxCodec, CheckboxCodec, EqnStyleCodec, FontCodec, PairCodec, EQN_STYLES,
};
pub use line_style::{LineStyleCodec, LINE_TYPES};
pub use script::{RandomCodec, ScriptCodec};
pub use show::ShowCodec;
pub use simple::{SimpleCodec, SimpleKind};
pub use slider::SliderCodec;
pub use spreadsheet_trace::SpreadsheetTraceCodec;
pub use start_point::StartPointCodec;
pub use tableview::TableViewCodec;

/// How the applier hands a decoded property to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// Replayed through `start_element(name, attrs)`.
    Element { name: String, attrs: AttributeMap },
    /// Stored in a script or listener slot.
    Script { slot: ScriptSlot, text: String },
    /// Sets the object's random flag.
    Random(bool),
}

impl Route {
    pub fn element(name: impl Into<String>, attrs: AttributeMap) -> Self {
        Route::Element {
            name: name.into(),
            attrs,
        }
    }
}

/// Decode/encode pair for one property family.
pub trait PropertyCodec: Send + Sync + fmt::Debug {
    /// Gpad property name (`lineStyle`, `@screen`, ...).
    fn name(&self) -> &str;

    /// XML element name used by the host's style protocol.
    fn element(&self) -> &str {
        self.name()
    }

    /// Decodes the text after `name:`.
    ///
    /// Bare properties (`fixed`) decode the empty string. `Ok(None)` means the
    /// input is silently ignored and the property is omitted.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`](crate::ParseError) for out-of-grammar input.
    fn decode(&self, value: &str) -> Result<Option<AttributeMap>>;

    /// Encodes `attrs` minimally.
    ///
    /// `None` omits the property, `Some("")` emits the bare name.
    fn encode(&self, attrs: &AttributeMap) -> Option<String>;

    /// Documented defaults; attributes equal to these are never emitted.
    fn defaults(&self) -> AttributeMap {
        AttributeMap::new()
    }

    /// Overlays `attrs` on the defaults.
    ///
    /// Indexed families override this to fill defaults per present index.
    fn complete(&self, attrs: &AttributeMap) -> AttributeMap {
        attrs::complete(&self.defaults(), attrs)
    }

    /// Delivery plan for the applier.
    fn routes(&self, attrs: &AttributeMap) -> Vec<Route> {
        vec![Route::element(self.element(), attrs.clone())]
    }

    /// The host-side clear operation for reset markers, if any.
    fn resettable(&self) -> Option<Resettable> {
        None
    }
}

/// Whether two maps are the same property value once defaults are filled in.
pub fn equivalent(codec: &dyn PropertyCodec, a: &AttributeMap, b: &AttributeMap) -> bool {
    let a = codec.complete(a);
    let b = codec.complete(b);
    a.len() == b.len()
        && a.iter()
            .all(|(k, v)| b.get(k).is_some_and(|w| tokens::same_value(v, w)))
}

/// Reads an attribute, treating a missing key as absent.
pub(crate) fn get<'a>(attrs: &'a AttributeMap, key: &str) -> Option<&'a str> {
    attrs.get(key).map(String::as_str)
}

/// Reads an attribute unless it equals `default` (numeric-aware).
pub(crate) fn non_default<'a>(
    attrs: &'a AttributeMap,
    key: &str,
    default: &str,
) -> Option<&'a str> {
    get(attrs, key).filter(|v| !tokens::same_value(v, default))
}

pub(crate) fn is_true(attrs: &AttributeMap, key: &str) -> bool {
    get(attrs, key) == Some("true")
}

pub(crate) fn bool_text(value: bool) -> String {
    value.to_string()
}

/// Joins non-empty parts with single spaces.
pub(crate) fn join(parts: Vec<String>) -> String {
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pass-through codec for property names no built-in codec claims.
///
/// The value is stored as `{val: text}`; a bare name stores `val = true`.
#[derive(Debug, Clone)]
pub struct GenericCodec {
    name: String,
}

impl GenericCodec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl PropertyCodec for GenericCodec {
    fn name(&self) -> &str {
        &self.name
    }

    fn decode(&self, value: &str) -> Result<Option<AttributeMap>> {
        let value = if value.trim().is_empty() {
            "true".to_string()
        } else {
            tokens::scalar(value)?
        };
        Ok(Some(attrs::from_pairs(&[("val", value.as_str())])))
    }

    fn encode(&self, attrs: &AttributeMap) -> Option<String> {
        match get(attrs, "val") {
            Some("true") => Some(String::new()),
            Some(v) => Some(tokens::quote_if_needed(v).into_owned()),
            None => None,
        }
    }
}

/// Name-indexed table of property codecs.
///
/// Lookups work by Gpad property name ([`get`](Self::get)) and by XML
/// element name ([`for_element`](Self::for_element)). When several
/// properties share an element, the first one registered is canonical for
/// the reverse direction.
#[derive(Clone, Default)]
pub struct CodecRegistry {
    by_name: HashMap<String, Arc<dyn PropertyCodec>>,
    by_element: HashMap<String, Arc<dyn PropertyCodec>>,
    names: Vec<String>,
}

static GLOBAL: Lazy<Arc<CodecRegistry>> = Lazy::new(|| Arc::new(CodecRegistry::standard()));

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("properties", &self.names)
            .finish()
    }
}

impl CodecRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry holding every built-in codec.
    pub fn global() -> &'static CodecRegistry {
        &GLOBAL
    }

    /// Shared handle to the [`global`](Self::global) registry.
    pub fn shared() -> Arc<CodecRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Builds a registry with every built-in codec.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for name in ["objColor", "bgColor", "borderColor"] {
            registry.register(ColorCodec::new(name));
        }
        registry
            .register(LineStyleCodec)
            .register(ShowCodec)
            .register(AnimationCodec)
            .register(CoordsCodec)
            .register(SliderCodec)
            .register(SpreadsheetTraceCodec)
            .register(TableViewCodec)
            .register(StartPointCodec)
            .register(BarTagCodec)
            .register(ScriptCodec::click("jsClick"))
            .register(ScriptCodec::click("javascript"))
            .register(ScriptCodec::update())
            .register(ScriptCodec::drag())
            .register(ScriptCodec::update_listener())
            .register(ScriptCodec::click_listener())
            .register(RandomCodec)
            .register(PairCodec::label_offset())
            .register(PairCodec::screen())
            .register(EqnStyleCodec)
            .register(FontCodec)
            .register(BoxCodec::bounding_box())
            .register(BoxCodec::content_size())
            .register(BoxCodec::crop_box())
            .register(BoxCodec::dimensions())
            .register(CheckboxCodec);
        for codec in simple::all() {
            registry.register(codec);
        }
        registry
    }

    /// Adds a codec, replacing any codec with the same property name.
    pub fn register(&mut self, codec: impl PropertyCodec + 'static) -> &mut Self {
        let codec: Arc<dyn PropertyCodec> = Arc::new(codec);
        let name = codec.name().to_string();
        let element = codec.element().to_string();
        if !self.by_name.contains_key(&name) {
            self.names.push(name.clone());
        }
        self.by_element
            .entry(element)
            .or_insert_with(|| Arc::clone(&codec));
        self.by_name.insert(name, codec);
        self
    }

    /// Looks up a codec by Gpad property name.
    pub fn get(&self, name: &str) -> Option<&dyn PropertyCodec> {
        self.by_name.get(name).map(|c| c.as_ref())
    }

    /// Looks up the canonical codec for an XML element name.
    pub fn for_element(&self, element: &str) -> Option<&dyn PropertyCodec> {
        self.by_element.get(element).map(|c| c.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Property names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
