//! Parse and runtime error types.
//!
//! Every error carries the source [`Position`] it refers to.  Messages render
//! as `line:column[:$function]: message`, the format users see next to the
//! offending script.

use std::fmt;

use thiserror::Error;

use super::registry::Arity;

/// A location in script source.
///
/// `line` and `column` are 1-based; `offset` counts code points from the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 1, offset: 0 };
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors raised while parsing a script.  Any of these aborts the evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{position}: Unexpected end of script")]
    UnexpectedEndOfInput { position: Position },

    #[error("{position}: Unexpected character '{ch}'")]
    UnexpectedCharacter { ch: char, position: Position },

    #[error("{position}: Invalid unicode character '\\u{text}'")]
    InvalidUnicodeEscape { text: String, position: Position },

    #[error("{position}:${name}: Unknown function '${name}'")]
    UnknownFunction { name: String, position: Position },

    #[error("{position}:${name}: Wrong number of arguments for ${name}: Expected {expected}, got {actual}")]
    ArityMismatch {
        name: String,
        expected: Arity,
        actual: usize,
        position: Position,
    },

    #[error("{position}:${name}: Function calls nested more than {limit} deep")]
    NestingTooDeep {
        name: String,
        limit: usize,
        position: Position,
    },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedEndOfInput { position }
            | ParseError::UnexpectedCharacter { position, .. }
            | ParseError::InvalidUnicodeEscape { position, .. }
            | ParseError::UnknownFunction { position, .. }
            | ParseError::ArityMismatch { position, .. }
            | ParseError::NestingTooDeep { position, .. } => *position,
        }
    }
}

/// Errors raised while evaluating a parsed script.
///
/// Most built-ins degrade to an empty result instead of failing; these are the
/// few cases that surface to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("{position}:${function}: Unsupported format code")]
    UnsupportedFormat { function: String, position: Position },

    /// The tree was parsed against a registry that knew `name` but is being
    /// evaluated against one that does not.
    #[error("{position}:${name}: Unknown function '${name}'")]
    UnknownFunction { name: String, position: Position },

    /// Same situation as `UnknownFunction`, for a changed argument count.
    #[error("{position}:${name}: Wrong number of arguments for ${name}: Expected {expected}, got {actual}")]
    ArityMismatch {
        name: String,
        expected: Arity,
        actual: usize,
        position: Position,
    },
}

/// Anything that can go wrong when running a script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
