//! Error types for the gpad crate.
//!
//! Every failure surfaced by parsing, decoding, applying or converting is a
//! [`ParseError`]. Collaborator traits report their own failures through
//! [`HostError`] and [`RegisterError`], which the parser wraps with context.

use std::fmt;

use thiserror::Error;

/// A 1-based line/column location in Gpad source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// The single error kind of the crate.
///
/// Covers lexical and structural errors, unresolved references, invalid
/// property grammar, macro validation failures and wrapped collaborator
/// errors (with the original message appended).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render(.message, .position))]
pub struct ParseError {
    message: String,
    position: Option<Position>,
}

fn render(message: &str, position: &Option<Position>) -> String {
    match position {
        Some(pos) => format!("Parse error at {}: {}", pos, message),
        None => format!("Parse error: {}", message),
    }
}

impl ParseError {
    /// Creates an error without location information.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
        }
    }

    /// Creates an error located at `position`.
    pub fn at(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position: Some(position),
        }
    }

    /// Attaches a position unless one is already present.
    pub fn or_at(mut self, position: Position) -> Self {
        if self.position.is_none() {
            self.position = Some(position);
        }
        self
    }

    /// The bare message, without the `Parse error` prefix or location.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }
}

/// Failure reported by a host collaborator (object creation, style handler).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failure reported by a macro registrar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    /// A macro with this name is already known to the host.
    #[error("macro '{0}' already exists")]
    AlreadyExists(String),

    /// The host refused the definition for another reason.
    #[error("{0}")]
    Rejected(String),
}

/// Result type for gpad operations.
pub type Result<T> = std::result::Result<T, ParseError>;
