//! # Gpad - Construction and Style Scripts
//!
//! Gpad is a compact textual language for describing, in one script, both
//! the objects of a construction and the full visual and behavioral style
//! of each of them. It can also turn an object's current style back into
//! the same language.
//!
//! The crate never evaluates commands or expressions itself. Right-hand
//! sides are handed verbatim to a host engine through the traits in
//! [`host`](crate::ConstructionHost), and styles are replayed through the
//! host's XML-style element protocol.
//!
//! ## Core Concepts
//!
//! - [`GpadParser`]: parses a script and drives a [`GpadHost`]
//! - [`StyleSheet`]: an ordered map from property name to attributes, with
//!   merge and explicit reset
//! - [`codec`]: one [`PropertyCodec`](codec::PropertyCodec) per property,
//!   translating compact syntax to attribute maps and back
//! - [`Applier`]: replays sheets onto live objects
//! - [`StyleMapConverter`] and [`GpadGenerator`]: the reverse path, from
//!   extracted style maps to Gpad text
//! - [`GpadConfig`]: options, loadable from YAML or JSON
//!
//! ## Quick Start
//!
//! ```rust
//! use gpad::GpadParser;
//! use gpad_test::FakeHost;
//!
//! let script = r#"
//! @red = { objColor: #FF0000; lineStyle: dashedlong thickness=7 }
//! A, B @red = Intersect(f, g)
//! s* @red { caption: "Side s" } = Segment(A, B)
//! "#;
//!
//! let mut host = FakeHost::new();
//! let mut parser = GpadParser::new();
//! let created = parser.parse(&mut host, script).unwrap();
//!
//! assert_eq!(created.len(), 3);
//! assert_eq!(host.element("s", "caption").unwrap()["val"], "Side s");
//! assert!(parser.global_style_sheets().contains_key("red"));
//! ```
//!
//! ## Style Sheet Syntax
//!
//! ```text
//! @name = { prop: value; flag; ~reset }      named sheet
//! label[*~] @name { prop: value } = rhs      statement with styles
//! @@macro Name(in1, in2) { ... @@return out } macro definition
//! ```
//!
//! `*` hides the object and `~` hides its label. Several sheets merge left
//! to right; later values win key by key, and a reset entry first discards
//! what earlier sheets set for that property.

pub mod attrs;
pub mod codec;

mod applier;
mod config;
mod converter;
mod defaults;
mod error;
mod generator;
mod grammar;
mod host;
mod lexer;
mod macros;
mod parser;
mod stylesheet;
mod xml;

pub use applier::Applier;
pub use attrs::{AttributeMap, StyleMap, RESET_MARKER};
pub use config::GpadConfig;
pub use converter::StyleMapConverter;
pub use defaults::{backfill, DefaultStyleCache};
pub use error::{HostError, ParseError, Position, RegisterError, Result};
pub use generator::{GeneratorItem, GeneratorMacro, GpadGenerator};
pub use host::{
    ConstructionHost, CreationRequest, GpadHost, LabelSpec, MacroRegistrar, ObjectInfo,
    Resettable, ScriptSlot, ScriptSlots, StyleHost, Visibility,
};
pub use macros::{MacroDefinition, MacroStatement};
pub use parser::GpadParser;
pub use stylesheet::StyleSheet;
pub use xml::parse_style_xml;
