//! Error types, diagnostics and position tracking for DCL loading
//!
//! Loading is best-effort: malformed constructs degrade to `Void` values and
//! are recorded as [`Diagnostic`]s instead of aborting. [`DclError`] is only
//! produced for I/O failures, strict loads and typed deserialization.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Represents a position in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Byte offset from start of input (0-based)
    pub offset: usize,
}

impl Position {
    /// Creates a new position at the start of input
    pub fn new() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Advances the position by one character
    pub fn advance(&mut self, c: char) {
        match c {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            '\r' => {
                // Handle \r\n and standalone \r
                self.column = 1;
            }
            _ => {
                self.column += 1;
            }
        }
        self.offset += c.len_utf8();
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// What went wrong while decoding a construct
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// String literal runs to the end of input
    #[error("unterminated string literal")]
    UnterminatedString,

    /// Statement matches none of the field, key or copy shapes
    #[error("statement '{text}' is not a field, key or copy declaration")]
    DroppedStatement { text: String },

    /// Number literal that does not parse as a float
    #[error("malformed number '{literal}'")]
    MalformedNumber { literal: String },

    /// Value tokens that form no known value shape
    #[error("unsupported value '{text}'")]
    UnsupportedValue { text: String },

    /// Identifier with no same-named field in any enclosing container
    #[error("identifier '{name}' does not name a field in scope")]
    UnresolvedIdentifier { name: String },

    /// Identifier resolved to a container instead of a leaf field
    #[error("identifier '{name}' names a container, not a value")]
    ContainerAsValue { name: String },

    /// Scoped reference whose container is not in scope
    #[error("container '{name}' is not in scope")]
    UnresolvedContainer { name: String },

    /// Scoped reference whose container lacks the field
    #[error("container '{container}' has no field '{field}'")]
    UnresolvedField { container: String, field: String },

    /// Reference to a field whose own value has not been resolved yet
    #[error("field '{name}' is referenced before it is resolved")]
    PendingTarget { name: String },

    /// `copy` directive naming a container that is not in scope
    #[error("copy source '{name}' is not in scope")]
    MissingCopySource { name: String },
}

/// A recorded degradation, with the position of the construct that caused it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub position: Position,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, position: Position) -> Self {
        Self { kind, position }
    }

    /// Formats the diagnostic with the offending source line and a caret
    pub fn render(&self, source: &str) -> String {
        let mut output = format!("{}\n", self);

        let Some(line) = source.lines().nth(self.position.line.saturating_sub(1)) else {
            return output;
        };

        let number = self.position.line.to_string();
        output.push_str(&format!("{} | {}\n", number, line));
        let spaces = " ".repeat(number.len() + 3 + self.position.column.saturating_sub(1));
        output.push_str(&format!("{}^\n", spaces));
        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.kind)
    }
}

/// Main error type for DCL operations
#[derive(Debug, Error)]
pub enum DclError {
    /// Source file could not be read
    #[error("failed to open '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Strict load found constructs that degraded to Void or were dropped
    #[error("{} unresolved construct(s), first at {}", .diagnostics.len(), first_diagnostic(.diagnostics))]
    Resolve { diagnostics: Vec<Diagnostic> },

    /// Serde deserialization error
    #[error("Serde error: {0}")]
    Serde(#[from] SerdeError),
}

fn first_diagnostic(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// Serde integration errors
#[derive(Debug, Error)]
pub enum SerdeError {
    /// Custom serde error message
    #[error("{0}")]
    Custom(String),

    /// Value kind does not match the requested type
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
}

impl serde::de::Error for DclError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        DclError::Serde(SerdeError::Custom(msg.to_string()))
    }
}

impl serde::de::Error for SerdeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        SerdeError::Custom(msg.to_string())
    }
}
