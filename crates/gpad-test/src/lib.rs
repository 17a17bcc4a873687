//! # gpad-test
//!
//! An in-process host for exercising the `gpad` parser and applier without
//! a real geometry engine.
//!
//! [`FakeHost`] implements every collaborator trait and records what it is
//! asked to do, so tests can assert on created objects, replayed elements,
//! script slots, registered macros and the order of host calls.
//!
//! ```rust
//! use gpad::GpadParser;
//! use gpad_test::FakeHost;
//!
//! let mut host = FakeHost::new();
//! GpadParser::new()
//!     .parse(&mut host, "A { pointSize: 7 } = (1, 2)")
//!     .unwrap();
//! assert_eq!(host.element("A", "pointSize").unwrap()["val"], "7");
//! ```

use std::cell::Cell;
use std::collections::HashMap;

use gpad::{
    AttributeMap, ConstructionHost, CreationRequest, HostError, MacroDefinition, MacroRegistrar,
    ObjectInfo, RegisterError, Resettable, ScriptSlot, ScriptSlots, StyleHost, Visibility,
};
use tracing_subscriber::EnvFilter;

/// Installs a `RUST_LOG`-filtered fmt subscriber that writes through the
/// test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One host call, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Created(String),
    Element {
        label: String,
        name: String,
        attrs: AttributeMap,
    },
    Script {
        label: String,
        slot: ScriptSlot,
        text: String,
    },
    Random {
        label: String,
        random: bool,
    },
    Cleared {
        label: String,
        property: Resettable,
    },
    Finished(String),
    Recompute,
    ResyncTrace,
    MacroRegistered(String),
}

/// A live object in the fake construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeObject {
    pub label: Option<String>,
    pub type_name: String,
    pub rhs: String,
    pub visibility: Visibility,
    pub numeric_value: Option<f64>,
    pub boolean_value: Option<bool>,
    /// Every element replayed onto this object, in order.
    pub elements: Vec<(String, AttributeMap)>,
    pub scripts: HashMap<ScriptSlot, String>,
    pub random: bool,
}

impl FakeObject {
    /// The last replayed attributes of element `name`.
    pub fn element(&self, name: &str) -> Option<&AttributeMap> {
        self.elements
            .iter()
            .rev()
            .find(|(element, _)| element == name)
            .map(|(_, attrs)| attrs)
    }
}

/// Recording implementation of every `gpad` host trait.
///
/// Object types are guessed from the right-hand side: a number is
/// `numeric`, `true`/`false` is `boolean`, a parenthesized pair is `point`,
/// anything else is `command`.
#[derive(Debug, Default)]
pub struct FakeHost {
    objects: Vec<FakeObject>,
    events: Vec<HostEvent>,
    macros: Vec<MacroDefinition>,
    default_types: HashMap<String, i32>,
    default_xml: HashMap<i32, String>,
    default_xml_requests: Cell<usize>,
    fail_create: Option<String>,
    fail_element: Option<String>,
    register_error: Option<RegisterError>,
    unlabeled: bool,
    no_clear: bool,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gives objects of `type_name` the default style `xml` under id
    /// `default_type`.
    pub fn with_default_style(
        mut self,
        type_name: impl Into<String>,
        default_type: i32,
        xml: impl Into<String>,
    ) -> Self {
        self.default_types.insert(type_name.into(), default_type);
        self.default_xml.insert(default_type, xml.into());
        self
    }

    /// Fails creation of any statement whose right-hand side contains
    /// `needle`.
    pub fn fail_create_on(mut self, needle: impl Into<String>) -> Self {
        self.fail_create = Some(needle.into());
        self
    }

    /// Rejects every `start_element` call for element `name`.
    pub fn fail_element(mut self, name: impl Into<String>) -> Self {
        self.fail_element = Some(name.into());
        self
    }

    /// Answers every macro registration with `error`.
    pub fn reject_macros(mut self, error: RegisterError) -> Self {
        self.register_error = Some(error);
        self
    }

    /// Creates objects without labels.
    pub fn unlabeled_objects(mut self) -> Self {
        self.unlabeled = true;
        self
    }

    /// Makes `clear_property` report that nothing can be cleared.
    pub fn without_clear(mut self) -> Self {
        self.no_clear = true;
        self
    }

    pub fn objects(&self) -> &[FakeObject] {
        &self.objects
    }

    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    pub fn macros(&self) -> &[MacroDefinition] {
        &self.macros
    }

    /// Labels of all created objects, in creation order.
    pub fn labels(&self) -> Vec<&str> {
        self.objects
            .iter()
            .filter_map(|o| o.label.as_deref())
            .collect()
    }

    pub fn object(&self, label: &str) -> Option<&FakeObject> {
        self.objects
            .iter()
            .find(|o| o.label.as_deref() == Some(label))
    }

    /// The last replayed attributes of element `name` on object `label`.
    pub fn element(&self, label: &str, name: &str) -> Option<&AttributeMap> {
        self.object(label)?.element(name)
    }

    /// Element names replayed onto `label`, in order.
    pub fn element_names(&self, label: &str) -> Vec<&str> {
        self.object(label)
            .map(|o| o.elements.iter().map(|(n, _)| n.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn count(&self, event: &HostEvent) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }

    /// How often the applier asked for default-style XML.
    pub fn default_xml_requests(&self) -> usize {
        self.default_xml_requests.get()
    }

    fn label_of(&self, handle: usize) -> String {
        self.objects
            .get(handle)
            .and_then(|o| o.label.clone())
            .unwrap_or_default()
    }

    fn guess_type(rhs: &str) -> (&'static str, Option<f64>, Option<bool>) {
        let rhs = rhs.trim();
        if let Ok(number) = rhs.parse::<f64>() {
            ("numeric", Some(number), None)
        } else if let Ok(flag) = rhs.parse::<bool>() {
            ("boolean", None, Some(flag))
        } else if rhs.starts_with('(') && rhs.ends_with(')') {
            ("point", None, None)
        } else {
            ("command", None, None)
        }
    }
}

impl ConstructionHost for FakeHost {
    type Handle = usize;

    fn create(&mut self, request: &CreationRequest) -> Result<Vec<usize>, HostError> {
        if let Some(needle) = &self.fail_create {
            if request.rhs.contains(needle.as_str()) {
                return Err(HostError::new(format!("cannot evaluate {}", request.rhs)));
            }
        }
        let (type_name, numeric_value, boolean_value) = Self::guess_type(&request.rhs);
        let mut handles = Vec::new();
        for label in &request.labels {
            handles.push(self.objects.len());
            self.objects.push(FakeObject {
                label: (!self.unlabeled).then(|| label.name.clone()),
                type_name: type_name.to_string(),
                rhs: request.rhs.clone(),
                visibility: label.visibility,
                numeric_value,
                boolean_value,
                elements: Vec::new(),
                scripts: HashMap::new(),
                random: false,
            });
            self.events.push(HostEvent::Created(label.name.clone()));
        }
        Ok(handles)
    }

    fn object_info(&self, handle: &usize) -> ObjectInfo {
        let Some(object) = self.objects.get(*handle) else {
            return ObjectInfo::default();
        };
        ObjectInfo {
            label: object.label.clone(),
            type_name: object.type_name.clone(),
            default_type: self.default_types.get(&object.type_name).copied(),
            numeric_value: object.numeric_value,
            boolean_value: object.boolean_value,
            is_button: false,
        }
    }
}

impl StyleHost for FakeHost {
    fn start_element(
        &mut self,
        handle: &usize,
        name: &str,
        attrs: &AttributeMap,
    ) -> Result<(), HostError> {
        if self.fail_element.as_deref() == Some(name) {
            return Err(HostError::new(format!("unsupported element <{}>", name)));
        }
        let label = self.label_of(*handle);
        if let Some(object) = self.objects.get_mut(*handle) {
            object.elements.push((name.to_string(), attrs.clone()));
        }
        self.events.push(HostEvent::Element {
            label,
            name: name.to_string(),
            attrs: attrs.clone(),
        });
        Ok(())
    }

    fn finish(&mut self, handle: &usize) {
        let label = self.label_of(*handle);
        self.events.push(HostEvent::Finished(label));
    }

    fn default_style_xml(&self, default_type: i32) -> Option<String> {
        self.default_xml_requests.set(self.default_xml_requests.get() + 1);
        self.default_xml.get(&default_type).cloned()
    }

    fn clear_property(&mut self, handle: &usize, property: Resettable) -> bool {
        if self.no_clear {
            return false;
        }
        let label = self.label_of(*handle);
        self.events.push(HostEvent::Cleared { label, property });
        true
    }

    fn recompute(&mut self) {
        self.events.push(HostEvent::Recompute);
    }

    fn resync_trace(&mut self) {
        self.events.push(HostEvent::ResyncTrace);
    }
}

impl ScriptSlots for FakeHost {
    fn set_script(&mut self, handle: &usize, slot: ScriptSlot, text: &str) {
        let label = self.label_of(*handle);
        if let Some(object) = self.objects.get_mut(*handle) {
            object.scripts.insert(slot, text.to_string());
        }
        self.events.push(HostEvent::Script {
            label,
            slot,
            text: text.to_string(),
        });
    }

    fn set_random(&mut self, handle: &usize, random: bool) {
        let label = self.label_of(*handle);
        if let Some(object) = self.objects.get_mut(*handle) {
            object.random = random;
        }
        self.events.push(HostEvent::Random { label, random });
    }
}

impl MacroRegistrar for FakeHost {
    fn register_macro(&mut self, definition: &MacroDefinition) -> Result<(), RegisterError> {
        if let Some(error) = &self.register_error {
            return Err(error.clone());
        }
        if self.macros.iter().any(|m| m.name == definition.name) {
            return Err(RegisterError::AlreadyExists(definition.name.clone()));
        }
        self.macros.push(definition.clone());
        self.events
            .push(HostEvent::MacroRegistered(definition.name.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpad::LabelSpec;

    fn request(labels: &[&str], rhs: &str) -> CreationRequest {
        CreationRequest {
            labels: labels
                .iter()
                .map(|l| LabelSpec::new(*l, Visibility::default()))
                .collect(),
            rhs: rhs.to_string(),
        }
    }

    #[test]
    fn test_type_guessing() {
        let mut host = FakeHost::new();
        host.create(&request(&["n"], "3.5")).unwrap();
        host.create(&request(&["b"], "true")).unwrap();
        host.create(&request(&["A"], "(1, 2)")).unwrap();
        host.create(&request(&["s"], "Segment(A, B)")).unwrap();
        let types: Vec<_> = host.objects().iter().map(|o| o.type_name.as_str()).collect();
        assert_eq!(types, vec!["numeric", "boolean", "point", "command"]);
        assert_eq!(host.object("n").unwrap().numeric_value, Some(3.5));
    }

    #[test]
    fn test_failure_injection() {
        let mut host = FakeHost::new().fail_create_on("Bad").fail_element("slider");
        assert!(host.create(&request(&["x"], "Bad(1)")).is_err());
        let handles = host.create(&request(&["y"], "1")).unwrap();
        assert!(host
            .start_element(&handles[0], "slider", &AttributeMap::new())
            .is_err());
        assert!(host
            .start_element(&handles[0], "layer", &AttributeMap::new())
            .is_ok());
        assert_eq!(host.element_names("y"), vec!["layer"]);
    }

    #[test]
    fn test_default_style_lookup() {
        let mut host = FakeHost::new().with_default_style("point", 10, "<element/>");
        let handles = host.create(&request(&["A"], "(0, 0)")).unwrap();
        let info = host.object_info(&handles[0]);
        assert_eq!(info.default_type, Some(10));
        assert_eq!(host.default_style_xml(10).as_deref(), Some("<element/>"));
    }
}
