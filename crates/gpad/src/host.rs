//! Collaborator traits implemented by the host engine.
//!
//! The crate never evaluates commands or expressions and never owns live
//! objects. It talks to the host through four narrow traits:
//!
//! | Trait | Used by | Purpose |
//! |-------|---------|---------|
//! | [`ConstructionHost`] | parser | turn `labels = rhs` into live objects |
//! | [`StyleHost`] | applier | replay XML-style elements, defaults, resets |
//! | [`ScriptSlots`] | applier | scripts, listeners and the random flag |
//! | [`MacroRegistrar`] | parser | register validated macro definitions |
//!
//! [`GpadHost`] is implemented automatically for any type implementing all
//! four.

use std::fmt;

use crate::attrs::AttributeMap;
use crate::error::{HostError, RegisterError};
use crate::macros::MacroDefinition;

/// Which parts of an object are visible, from the label flags.
///
/// | Flag | Object | Label |
/// |------|--------|-------|
/// | none | shown | shown |
/// | `*` | hidden | shown |
/// | `~` | shown | hidden |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub object: bool,
    pub label: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            object: true,
            label: true,
        }
    }
}

impl Visibility {
    /// Object hidden, label shown (`*`).
    pub const HIDDEN_OBJECT: Self = Self {
        object: false,
        label: true,
    };

    /// Object shown, label hidden (`~`).
    pub const HIDDEN_LABEL: Self = Self {
        object: true,
        label: false,
    };

    /// The flag characters that produce this visibility.
    pub fn flags(&self) -> &'static str {
        match (self.object, self.label) {
            (true, true) => "",
            (false, true) => "*",
            (true, false) => "~",
            (false, false) => "*~",
        }
    }
}

/// One label on the left-hand side of a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSpec {
    pub name: String,
    pub visibility: Visibility,
}

impl LabelSpec {
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            visibility,
        }
    }
}

impl fmt::Display for LabelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.visibility.flags())
    }
}

/// An object-creation request: labels plus the opaque right-hand side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationRequest {
    pub labels: Vec<LabelSpec>,
    pub rhs: String,
}

impl CreationRequest {
    /// Comma-joined label names, as used in error messages.
    pub fn label_list(&self) -> String {
        self.labels
            .iter()
            .map(|l| l.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// What the applier needs to know about a live object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectInfo {
    pub label: Option<String>,
    pub type_name: String,
    /// Key into the host's default-style table, if the type has one.
    pub default_type: Option<i32>,
    pub numeric_value: Option<f64>,
    pub boolean_value: Option<bool>,
    pub is_button: bool,
}

/// Host slot a script-like property is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptSlot {
    Click,
    Update,
    Drag,
    UpdateListener,
    ClickListener,
}

/// Properties the host can clear directly on a reset marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resettable {
    Trace,
    SpreadsheetTrace,
    Condition,
    DynamicCaption,
    ClickScript,
    UpdateScript,
    DragScript,
    UpdateListener,
    ClickListener,
}

/// Creates live objects from command/expression text.
pub trait ConstructionHost {
    type Handle: Clone + fmt::Debug;

    /// Evaluates `request.rhs` and assigns the labels.
    ///
    /// # Errors
    ///
    /// Returns the host's message when the text cannot be evaluated.
    fn create(&mut self, request: &CreationRequest) -> Result<Vec<Self::Handle>, HostError>;

    fn object_info(&self, handle: &Self::Handle) -> ObjectInfo;
}

/// The host's XML-style mutation protocol.
pub trait StyleHost: ConstructionHost {
    /// Applies one element, as if read from the host's style XML.
    fn start_element(
        &mut self,
        handle: &Self::Handle,
        name: &str,
        attrs: &AttributeMap,
    ) -> Result<(), HostError>;

    /// Ends the element sequence for one object.
    fn finish(&mut self, handle: &Self::Handle);

    /// Style XML for a default-style type, if the host has one.
    fn default_style_xml(&self, default_type: i32) -> Option<String>;

    /// Clears a property; returns false when the host cannot.
    fn clear_property(&mut self, handle: &Self::Handle, property: Resettable) -> bool;

    /// Recomputes dependent objects after a batch of style changes.
    fn recompute(&mut self);

    /// Re-synchronizes the spreadsheet trace registry.
    fn resync_trace(&mut self);
}

/// Script, listener and random-flag storage.
pub trait ScriptSlots: ConstructionHost {
    fn set_script(&mut self, handle: &Self::Handle, slot: ScriptSlot, text: &str);

    fn set_random(&mut self, handle: &Self::Handle, random: bool);
}

/// Registers macro definitions.
pub trait MacroRegistrar {
    /// # Errors
    ///
    /// [`RegisterError::AlreadyExists`] when the name is taken.
    fn register_macro(&mut self, definition: &MacroDefinition) -> Result<(), RegisterError>;
}

/// Everything the parser needs from a host.
pub trait GpadHost: StyleHost + ScriptSlots + MacroRegistrar {}

impl<T: StyleHost + ScriptSlots + MacroRegistrar> GpadHost for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_flags() {
        assert_eq!(Visibility::default().flags(), "");
        assert_eq!(Visibility::HIDDEN_OBJECT.flags(), "*");
        assert_eq!(Visibility::HIDDEN_LABEL.flags(), "~");
    }

    #[test]
    fn test_label_display_and_list() {
        let request = CreationRequest {
            labels: vec![
                LabelSpec::new("a", Visibility::HIDDEN_OBJECT),
                LabelSpec::new("b", Visibility::default()),
            ],
            rhs: "Segment(A, B)".into(),
        };
        assert_eq!(request.labels[0].to_string(), "a*");
        assert_eq!(request.label_list(), "a, b");
    }
}
