//! Script and listener slots, and the `random` flag.
//!
//! These properties hold a single scalar and bypass the XML style handler:
//! the applier routes them straight into the host's script slots.

use super::{get, tokens, PropertyCodec, Route};
use crate::attrs::{self, AttributeMap};
use crate::error::{ParseError, Result};
use crate::host::{Resettable, ScriptSlot};

/// Codec for one script or listener property.
#[derive(Debug, Clone)]
pub struct ScriptCodec {
    name: &'static str,
    element: &'static str,
    slot: ScriptSlot,
    resettable: Resettable,
}

impl ScriptCodec {
    /// Click script; `name` is `jsClick` or its alias `javascript`.
    pub fn click(name: &'static str) -> Self {
        Self {
            name,
            element: "javascript",
            slot: ScriptSlot::Click,
            resettable: Resettable::ClickScript,
        }
    }

    pub fn update() -> Self {
        Self {
            name: "jsUpdate",
            element: "jsUpdate",
            slot: ScriptSlot::Update,
            resettable: Resettable::UpdateScript,
        }
    }

    pub fn drag() -> Self {
        Self {
            name: "jsDrag",
            element: "jsDrag",
            slot: ScriptSlot::Drag,
            resettable: Resettable::DragScript,
        }
    }

    pub fn update_listener() -> Self {
        Self {
            name: "jsUpdateFunction",
            element: "jsUpdateFunction",
            slot: ScriptSlot::UpdateListener,
            resettable: Resettable::UpdateListener,
        }
    }

    pub fn click_listener() -> Self {
        Self {
            name: "jsClickFunction",
            element: "jsClickFunction",
            slot: ScriptSlot::ClickListener,
            resettable: Resettable::ClickListener,
        }
    }

    pub fn slot(&self) -> ScriptSlot {
        self.slot
    }
}

impl PropertyCodec for ScriptCodec {
    fn name(&self) -> &str {
        self.name
    }

    fn element(&self) -> &str {
        self.element
    }

    fn decode(&self, value: &str) -> Result<Option<AttributeMap>> {
        let text = tokens::scalar(value)?;
        Ok(Some(attrs::from_pairs(&[("val", text.as_str())])))
    }

    fn encode(&self, attrs: &AttributeMap) -> Option<String> {
        let text = get(attrs, "val").filter(|v| !v.is_empty())?;
        Some(tokens::quote_if_needed(text).into_owned())
    }

    fn defaults(&self) -> AttributeMap {
        attrs::from_pairs(&[("val", "")])
    }

    fn routes(&self, attrs: &AttributeMap) -> Vec<Route> {
        match get(attrs, "val") {
            Some(text) => vec![Route::Script {
                slot: self.slot,
                text: text.to_string(),
            }],
            None => Vec::new(),
        }
    }

    fn resettable(&self) -> Option<Resettable> {
        Some(self.resettable)
    }
}

/// `random`: marks an object as randomly regenerated on recompute.
#[derive(Debug, Clone, Copy)]
pub struct RandomCodec;

impl PropertyCodec for RandomCodec {
    fn name(&self) -> &str {
        "random"
    }

    fn decode(&self, value: &str) -> Result<Option<AttributeMap>> {
        let flag = match tokens::scalar(value)?.as_str() {
            "" | "true" => "true",
            "false" => "false",
            other => {
                return Err(ParseError::new(format!(
                    "random expects true or false, got '{}'",
                    other
                )))
            }
        };
        Ok(Some(attrs::from_pairs(&[("val", flag)])))
    }

    fn encode(&self, attrs: &AttributeMap) -> Option<String> {
        (get(attrs, "val") == Some("true")).then(String::new)
    }

    fn defaults(&self) -> AttributeMap {
        attrs::from_pairs(&[("val", "false")])
    }

    fn routes(&self, attrs: &AttributeMap) -> Vec<Route> {
        vec![Route::Random(get(attrs, "val") == Some("true"))]
    }
}
