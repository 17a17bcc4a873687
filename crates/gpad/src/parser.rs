//! The Gpad parser: grammar items → host calls.
//!
//! Top-level statements and macro bodies run through the same statement
//! path. What differs is the [`Commit`] strategy (apply now, or buffer for
//! registration) and the active [`Scope`] that `@name` references resolve
//! in.
//!
//! Parsing stops at the first error. Objects created by earlier statements
//! stay created; only the global sheet scope is left untouched.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::applier::Applier;
use crate::codec::{CodecRegistry, GenericCodec, PropertyCodec};
use crate::config::GpadConfig;
use crate::defaults::DefaultStyleCache;
use crate::error::{ParseError, Position, RegisterError, Result};
use crate::grammar::{self, Entry, EntryKind, Item, MacroBlock, SheetDef, Statement, StyleRef};
use crate::host::{CreationRequest, GpadHost};
use crate::macros::{MacroDefinition, MacroStatement};
use crate::stylesheet::StyleSheet;

/// Named sheets visible to `@name` references.
#[derive(Debug, Clone, Default)]
struct Scope {
    sheets: IndexMap<String, StyleSheet>,
}

impl Scope {
    fn define(&mut self, sheet: StyleSheet) {
        if self.sheets.contains_key(sheet.name()) {
            debug!(name = sheet.name(), "redefining style sheet");
        }
        self.sheets.insert(sheet.name().to_string(), sheet);
    }

    fn resolve(&self, name: &str, position: Position) -> Result<&StyleSheet> {
        self.sheets
            .get(name)
            .ok_or_else(|| ParseError::at(format!("Undefined style sheet '@{}'", name), position))
    }
}

/// Where a statement's creation request goes.
enum Commit<'b> {
    /// Create the objects now and style them.
    Apply,
    /// Buffer for a macro definition.
    Buffer(&'b mut Vec<MacroStatement>),
}

/// Parses Gpad text and drives a host.
///
/// ```rust
/// use gpad::GpadParser;
/// use gpad_test::FakeHost;
///
/// let mut host = FakeHost::new();
/// let mut parser = GpadParser::new();
/// let created = parser
///     .parse(&mut host, "@red = { objColor: #FF0000 }\nA @red = (1, 2)")
///     .unwrap();
/// assert_eq!(created.len(), 1);
/// assert!(parser.global_style_sheets().contains_key("red"));
/// ```
#[derive(Debug, Clone)]
pub struct GpadParser {
    registry: Arc<CodecRegistry>,
    applier: Applier,
    strict_properties: bool,
    global: IndexMap<String, StyleSheet>,
    macros: HashSet<String>,
}

impl Default for GpadParser {
    fn default() -> Self {
        Self::new()
    }
}

impl GpadParser {
    pub fn new() -> Self {
        Self {
            registry: CodecRegistry::shared(),
            applier: Applier::new(),
            strict_properties: false,
            global: IndexMap::new(),
            macros: HashSet::new(),
        }
    }

    /// Uses `registry` for decoding and applying.
    pub fn with_registry(mut self, registry: Arc<CodecRegistry>) -> Self {
        self.applier = self.applier.with_registry(Arc::clone(&registry));
        self.registry = registry;
        self
    }

    pub fn with_cache(mut self, cache: Arc<DefaultStyleCache>) -> Self {
        self.applier = self.applier.with_cache(cache);
        self
    }

    /// Rejects unknown property names instead of passing them through.
    pub fn strict_properties(mut self, strict: bool) -> Self {
        self.strict_properties = strict;
        self
    }

    pub fn with_config(self, config: &GpadConfig) -> Self {
        self.strict_properties(config.strict_properties)
    }

    /// Named sheets of the global scope after the last successful parse.
    pub fn global_style_sheets(&self) -> &IndexMap<String, StyleSheet> {
        &self.global
    }

    /// Parses a whole script from an empty global scope.
    ///
    /// Returns the handles created by top-level statements, in order.
    ///
    /// # Errors
    ///
    /// The first syntax, reference, property, macro or host error. The
    /// global scope is then empty; objects created before the error remain.
    pub fn parse<H: GpadHost>(&mut self, host: &mut H, text: &str) -> Result<Vec<H::Handle>> {
        self.global.clear();
        self.macros.clear();
        self.parse_partial(host, text)
    }

    /// Parses more text, continuing from the current global scope.
    ///
    /// On failure the global scope is restored to what it was before the
    /// call.
    pub fn parse_partial<H: GpadHost>(
        &mut self,
        host: &mut H,
        text: &str,
    ) -> Result<Vec<H::Handle>> {
        let items = grammar::parse_document(text)?;
        let mut scope = Scope {
            sheets: self.global.clone(),
        };
        let mut macros = self.macros.clone();
        let mut created = Vec::new();
        for item in &items {
            match item {
                Item::Sheet(def) => scope.define(self.build_named(def)?),
                Item::Statement(st) => {
                    let handles = self.statement(host, &scope, st, Commit::Apply)?;
                    created.extend(handles);
                }
                Item::Macro(block) => {
                    self.define_macro(host, block, &mut macros)?;
                }
            }
        }
        self.global = scope.sheets;
        self.macros = macros;
        Ok(created)
    }

    fn statement<H: GpadHost>(
        &self,
        host: &mut H,
        scope: &Scope,
        st: &Statement,
        commit: Commit<'_>,
    ) -> Result<Vec<H::Handle>> {
        let style = self.merged_style(scope, &st.styles)?;
        let request = CreationRequest {
            labels: st.labels.clone(),
            rhs: st.rhs.clone(),
        };
        match commit {
            Commit::Buffer(buffer) => {
                buffer.push(MacroStatement { request, style });
                Ok(Vec::new())
            }
            Commit::Apply => {
                let handles = host.create(&request).map_err(|e| {
                    ParseError::at(
                        format!("Failed to create '{}': {}", request.label_list(), e),
                        st.position,
                    )
                })?;
                debug!(labels = %request.label_list(), count = handles.len(), "created");
                if let Some(style) = style {
                    self.applier
                        .apply(host, &handles, &style)
                        .map_err(|e| e.or_at(st.position))?;
                }
                Ok(handles)
            }
        }
    }

    /// Merges a statement's style references left to right.
    fn merged_style(&self, scope: &Scope, refs: &[StyleRef]) -> Result<Option<StyleSheet>> {
        if refs.is_empty() {
            return Ok(None);
        }
        let mut merged = StyleSheet::inline();
        for style in refs {
            match style {
                StyleRef::Named { name, position } => {
                    merged.merge_from(scope.resolve(name, *position)?);
                }
                StyleRef::Inline(entries) => {
                    merged.merge_from(&self.build_sheet(StyleSheet::inline(), entries)?);
                }
            }
        }
        Ok(Some(merged))
    }

    fn build_named(&self, def: &SheetDef) -> Result<StyleSheet> {
        let sheet = self.build_sheet(StyleSheet::new(def.name.as_str()), &def.entries)?;
        debug!(name = %def.name, properties = sheet.len(), "defined style sheet");
        Ok(sheet)
    }

    /// Decodes body entries into `sheet`.
    fn build_sheet(&self, mut sheet: StyleSheet, entries: &[Entry]) -> Result<StyleSheet> {
        for entry in entries {
            let generic;
            let codec: &dyn PropertyCodec = match self.registry.get(&entry.name) {
                Some(codec) => codec,
                None if self.strict_properties => {
                    return Err(ParseError::at(
                        format!("Unknown property '{}'", entry.name),
                        entry.position,
                    ))
                }
                None => {
                    warn!(property = %entry.name, "passing unknown property through");
                    generic = GenericCodec::new(entry.name.as_str());
                    &generic
                }
            };
            match &entry.kind {
                EntryKind::Reset => sheet.reset_property(entry.name.as_str()),
                EntryKind::Set(value) => {
                    let decoded = codec.decode(value).map_err(|e| {
                        ParseError::at(
                            format!("Invalid value for '{}': {}", entry.name, e.message()),
                            entry.position,
                        )
                    })?;
                    match decoded {
                        Some(attrs) => sheet.set_property(entry.name.as_str(), attrs),
                        None => debug!(property = %entry.name, "property value ignored"),
                    }
                }
            }
        }
        Ok(sheet)
    }

    fn define_macro<H: GpadHost>(
        &self,
        host: &mut H,
        block: &MacroBlock,
        macros: &mut HashSet<String>,
    ) -> Result<()> {
        let fail = |message: String| ParseError::at(message, block.position);
        if macros.contains(&block.name) {
            return Err(fail(format!("Macro '{}' already exists", block.name)));
        }

        let mut scope = Scope::default();
        let mut statements = Vec::new();
        for item in &block.body {
            match item {
                Item::Sheet(def) => scope.define(self.build_named(def)?),
                Item::Statement(st) => {
                    self.statement(host, &scope, st, Commit::Buffer(&mut statements))?;
                }
                Item::Macro(inner) => {
                    return Err(ParseError::at(
                        format!("nested @@macro '{}' inside macro '{}'", inner.name, block.name),
                        inner.position,
                    ))
                }
            }
        }

        let definition = MacroDefinition {
            name: block.name.clone(),
            inputs: block.inputs.clone(),
            outputs: block.outputs.clone(),
            statements,
            sheets: scope.sheets.into_values().collect(),
            source: block.source.clone(),
        };
        definition.validate().map_err(|e| e.or_at(block.position))?;
        host.register_macro(&definition).map_err(|e| match e {
            RegisterError::AlreadyExists(_) => {
                fail(format!("Macro '{}' already exists", block.name))
            }
            RegisterError::Rejected(message) => fail(format!(
                "Failed to register macro '{}': {}",
                block.name, message
            )),
        })?;
        debug!(name = %block.name, inputs = block.inputs.len(), outputs = block.outputs.len(), "registered macro");
        macros.insert(block.name.clone());
        Ok(())
    }
}
