//! Macro definitions built from `@@macro` blocks.
//!
//! A macro body is parsed like top-level text but nothing in it is
//! committed: creation requests and local sheets are buffered into a
//! [`MacroDefinition`], validated, and handed to the host's
//! [`MacroRegistrar`](crate::MacroRegistrar).

use std::collections::HashSet;

use crate::error::{ParseError, Result};
use crate::host::CreationRequest;
use crate::stylesheet::StyleSheet;

/// One buffered body statement with its merged style, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroStatement {
    pub request: CreationRequest,
    pub style: Option<StyleSheet>,
}

/// A validated macro, ready for registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDefinition {
    pub name: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub statements: Vec<MacroStatement>,
    /// Sheets defined inside the body, in definition order.
    pub sheets: Vec<StyleSheet>,
    /// Body text as written, without the braces.
    pub source: String,
}

impl MacroDefinition {
    /// Every label assigned by a body statement.
    pub fn assigned_labels(&self) -> HashSet<&str> {
        self.statements
            .iter()
            .flat_map(|st| st.request.labels.iter().map(|l| l.name.as_str()))
            .collect()
    }

    /// Checks that every input is assigned in the body and every output is
    /// defined by it.
    ///
    /// # Errors
    ///
    /// Names the first missing input or output.
    pub fn validate(&self) -> Result<()> {
        let assigned = self.assigned_labels();
        if let Some(input) = self.inputs.iter().find(|l| !assigned.contains(l.as_str())) {
            return Err(ParseError::new(format!(
                "Input object '{}' not found in macro '{}'",
                input, self.name
            )));
        }
        if let Some(output) = self.outputs.iter().find(|l| !assigned.contains(l.as_str())) {
            return Err(ParseError::new(format!(
                "Output object '{}' not found in macro '{}'",
                output, self.name
            )));
        }
        Ok(())
    }
}
