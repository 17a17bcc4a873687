//! Whole-construction output: style sheets plus creation statements.
//!
//! The host extracts one [`GeneratorItem`] per command or independent
//! object. [`GpadGenerator::generate`] turns the list into a Gpad script:
//!
//! ```text
//! @AStyle = { pointSize: 7 }
//! A @AStyle = (1, 2)
//! B* = (3, 4)
//! s = Segment(A, B)
//! ```
//!
//! Statements are ordered so that every label is created before a later
//! right-hand side references it.
//!
//! [`GpadGenerator::generate_document`] also writes macro definitions ahead
//! of the construction, each body rendered the same way with its own sheet
//! names:
//!
//! ```text
//! @@macro Mid(A, B) {
//!     A* = (0, 0)
//!     B* = (1, 1)
//!     M = Midpoint(A, B)
//!     @@return M
//! }
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, warn};

use crate::attrs::StyleMap;
use crate::config::GpadConfig;
use crate::converter::StyleMapConverter;
use crate::host::Visibility;

/// Elements only meaningful when the object is drawn in the graphics view.
const GRAPHICS_ONLY: [&str; 7] = [
    "angleStyle",
    "animation",
    "bgColor",
    "labelMode",
    "layer",
    "lineStyle",
    "objColor",
];

/// One command or independent object, as extracted by the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratorItem {
    pub labels: Vec<String>,
    /// Host type name (`point`, `numeric`, ...).
    pub element_type: String,
    /// Command text, or the defining expression of an independent object.
    pub rhs: String,
    /// Style keyed by XML element name.
    pub style: StyleMap,
}

impl GeneratorItem {
    pub fn new<L, S>(labels: L, element_type: impl Into<String>, rhs: impl Into<String>) -> Self
    where
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            element_type: element_type.into(),
            rhs: rhs.into(),
            style: StyleMap::new(),
        }
    }

    pub fn with_style(mut self, style: StyleMap) -> Self {
        self.style = style;
        self
    }
}

/// A macro definition, as extracted by the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratorMacro {
    pub name: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    /// The macro's own construction.
    pub items: Vec<GeneratorItem>,
}

impl GeneratorMacro {
    pub fn new<I, O, S, T>(name: impl Into<String>, inputs: I, outputs: O) -> Self
    where
        I: IntoIterator<Item = S>,
        O: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            inputs: inputs.into_iter().map(Into::into).collect(),
            outputs: outputs.into_iter().map(Into::into).collect(),
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<GeneratorItem>) -> Self {
        self.items = items;
        self
    }
}

#[derive(Debug, Clone)]
pub struct GpadGenerator {
    converter: StyleMapConverter,
    merge: bool,
    prefix: String,
    suffix: String,
    topological: bool,
}

impl Default for GpadGenerator {
    fn default() -> Self {
        Self::with_config(&GpadConfig::default())
    }
}

impl GpadGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &GpadConfig) -> Self {
        Self {
            converter: StyleMapConverter::new().with_config(config),
            merge: config.merge_style_sheets,
            prefix: config.sheet_prefix.clone(),
            suffix: config.label_sheet_suffix.clone(),
            topological: config.topological_order,
        }
    }

    pub fn with_converter(mut self, converter: StyleMapConverter) -> Self {
        self.converter = converter;
        self
    }

    pub fn merge_style_sheets(mut self, merge: bool) -> Self {
        self.merge = merge;
        self
    }

    pub fn sheet_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn label_sheet_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn topological_order(mut self, enabled: bool) -> Self {
        self.topological = enabled;
        self
    }

    /// Renders `items` as a Gpad script, one statement per line.
    ///
    /// Items without labels are skipped.
    pub fn generate(&self, items: &[GeneratorItem]) -> String {
        let out = self.render(items, "");
        debug!(items = items.len(), "generated construction");
        out
    }

    /// Renders one `@@macro` block, or `None` when the macro cannot be
    /// written: no name, no outputs or an empty body.
    pub fn generate_macro(&self, definition: &GeneratorMacro) -> Option<String> {
        if definition.name.is_empty() {
            warn!("skipping macro without a name");
            return None;
        }
        if definition.outputs.is_empty() {
            warn!(name = %definition.name, "skipping macro without outputs");
            return None;
        }
        let body = self.render(&definition.items, "    ");
        if body.is_empty() {
            warn!(name = %definition.name, "skipping macro with an empty body");
            return None;
        }
        debug!(name = %definition.name, "generated macro");
        Some(format!(
            "@@macro {}({}) {{\n{}    @@return {}\n}}\n",
            definition.name,
            definition.inputs.join(", "),
            body,
            definition.outputs.join(", ")
        ))
    }

    /// Renders the macros, each followed by a blank line, then the
    /// construction.
    pub fn generate_document(&self, macros: &[GeneratorMacro], items: &[GeneratorItem]) -> String {
        let mut out = String::new();
        for block in macros.iter().filter_map(|m| self.generate_macro(m)) {
            out.push_str(&block);
            out.push('\n');
        }
        out.push_str(&self.generate(items));
        out
    }

    /// Sheets and statements for `items`, each line prefixed by `indent`.
    fn render(&self, items: &[GeneratorItem], indent: &str) -> String {
        let prepared: Vec<Prepared> = items
            .iter()
            .filter(|item| {
                if item.labels.is_empty() {
                    debug!(rhs = %item.rhs, "skipping unlabeled item");
                }
                !item.labels.is_empty()
            })
            .map(|item| self.prepare(item))
            .collect();

        let order = if self.topological {
            dependency_order(&prepared)
        } else {
            (0..prepared.len()).collect()
        };

        let mut shared: HashMap<&str, usize> = HashMap::new();
        if self.merge {
            for body in prepared.iter().filter_map(|p| p.body.as_deref()) {
                *shared.entry(body).or_default() += 1;
            }
        }

        let mut names = SheetNames::new(&self.prefix);
        let mut emitted: HashMap<&str, String> = HashMap::new();
        let mut out = String::new();
        for index in order {
            let item = &prepared[index];
            let sheet = item.body.as_deref().map(|body| {
                if let Some(name) = emitted.get(body).filter(|_| self.merge) {
                    return name.clone();
                }
                let name = if shared.get(body).copied().unwrap_or(0) > 1 {
                    names.next_shared()
                } else {
                    names.claim(&format!("{}{}", item.labels[0], self.suffix))
                };
                out.push_str(&format!("{}@{} = {{ {} }}\n", indent, name, body));
                emitted.insert(body, name.clone());
                name
            });
            out.push_str(indent);
            out.push_str(&statement(item, sheet.as_deref()));
            out.push('\n');
        }
        out
    }

    fn prepare<'a>(&self, item: &'a GeneratorItem) -> Prepared<'a> {
        let mut style = item.style.clone();
        let visibility = take_visibility(&mut style, &item.element_type);
        style.shift_remove("file");
        Prepared {
            item,
            visibility,
            body: self.converter.convert_body(&style),
        }
    }
}

struct Prepared<'a> {
    item: &'a GeneratorItem,
    visibility: Visibility,
    body: Option<String>,
}

impl std::ops::Deref for Prepared<'_> {
    type Target = GeneratorItem;

    fn deref(&self) -> &GeneratorItem {
        self.item
    }
}

/// Moves `show.object`/`show.label` into label flags and drops the
/// graphics-only elements of objects the graphics view does not draw.
///
/// An object without a `show` element is not drawn.
fn take_visibility(style: &mut StyleMap, element_type: &str) -> Visibility {
    let Some(show) = style.get_mut("show") else {
        for element in GRAPHICS_ONLY {
            style.shift_remove(element);
        }
        return Visibility::HIDDEN_OBJECT;
    };
    let visibility = Visibility {
        object: show.shift_remove("object").as_deref() != Some("false"),
        label: show.shift_remove("label").as_deref() != Some("false"),
    };
    if show.is_empty() {
        style.shift_remove("show");
    }
    let drawn = match element_type {
        "numeric" | "angle" => style.contains_key("slider"),
        "boolean" => style.contains_key("checkbox"),
        "list" => style.contains_key("combo"),
        _ => true,
    };
    if !drawn {
        for element in GRAPHICS_ONLY {
            style.shift_remove(element);
        }
    }
    visibility
}

fn statement(item: &Prepared<'_>, sheet: Option<&str>) -> String {
    let flags = item.visibility.flags();
    let labels: Vec<String> = item
        .labels
        .iter()
        .map(|label| format!("{}{}", label, flags))
        .collect();
    match sheet {
        Some(sheet) => format!("{} @{} = {}", labels.join(", "), sheet, item.rhs),
        None => format!("{} = {}", labels.join(", "), item.rhs),
    }
}

/// Sheet names handed out so far.
struct SheetNames<'a> {
    prefix: &'a str,
    counter: usize,
    used: HashSet<String>,
}

impl<'a> SheetNames<'a> {
    fn new(prefix: &'a str) -> Self {
        Self {
            prefix,
            counter: 0,
            used: HashSet::new(),
        }
    }

    /// `preferred`, or the next shared name when it is taken.
    fn claim(&mut self, preferred: &str) -> String {
        if self.used.insert(preferred.to_string()) {
            preferred.to_string()
        } else {
            self.next_shared()
        }
    }

    fn next_shared(&mut self) -> String {
        loop {
            self.counter += 1;
            let name = format!("{}{}", self.prefix, self.counter);
            if self.used.insert(name.clone()) {
                return name;
            }
        }
    }
}

/// Item indices ordered so that referenced labels come first.
///
/// Kahn's algorithm, always taking the lowest ready index, so independent
/// items keep their input order. Items on a cycle follow in input order.
fn dependency_order(items: &[Prepared<'_>]) -> Vec<usize> {
    let mut owner: HashMap<&str, usize> = HashMap::new();
    for (index, item) in items.iter().enumerate() {
        for label in &item.labels {
            owner.entry(label.as_str()).or_insert(index);
        }
    }

    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); items.len()];
    let mut pending = vec![0usize; items.len()];
    for (index, item) in items.iter().enumerate() {
        let deps: BTreeSet<usize> = referenced_labels(&item.rhs)
            .into_iter()
            .filter_map(|label| owner.get(label).copied())
            .filter(|&dep| dep != index)
            .collect();
        pending[index] = deps.len();
        for dep in deps {
            dependents[dep].push(index);
        }
    }

    let mut ready: BTreeSet<usize> = (0..items.len()).filter(|&i| pending[i] == 0).collect();
    let mut order = Vec::with_capacity(items.len());
    while let Some(index) = ready.pop_first() {
        order.push(index);
        for &next in &dependents[index] {
            pending[next] -= 1;
            if pending[next] == 0 {
                ready.insert(next);
            }
        }
    }

    if order.len() < items.len() {
        warn!("circular label references; keeping input order for the rest");
        let placed: HashSet<usize> = order.iter().copied().collect();
        order.extend((0..items.len()).filter(|i| !placed.contains(i)));
    }
    order
}

/// Label-shaped identifiers in `rhs`, outside quoted strings.
fn referenced_labels(rhs: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut chars = rhs.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if c == '"' {
            while let Some((_, q)) = chars.next() {
                match q {
                    '\\' => {
                        chars.next();
                    }
                    '"' => break,
                    _ => {}
                }
            }
            continue;
        }
        if !(c.is_alphabetic() || c == '$') {
            continue;
        }
        let mut end = start + c.len_utf8();
        let mut depth = 0usize;
        while let Some(&(i, next)) = chars.peek() {
            let take = match next {
                '{' if rhs[..i].ends_with('_') => {
                    depth += 1;
                    true
                }
                '}' if depth > 0 => {
                    depth -= 1;
                    true
                }
                _ if depth > 0 => true,
                _ => is_label_char(next),
            };
            if !take {
                break;
            }
            end = i + next.len_utf8();
            chars.next();
        }
        out.push(&rhs[start..end]);
    }
    out
}

fn is_label_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '\'' | '$')
}
