//! Template syntax error types

use std::fmt;

/// Parse-time failures. Always fatal; the parser never recovers from one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// `<%` opened but the source ended before the matching `%>`
    UnterminatedCodeBlock {
        /// Byte offset of the opening `<%`
        position: usize,
        /// Line of the opening `<%`
        line: usize,
    },

    /// Directive that is not exactly one `key value` pair
    InvalidDirective {
        /// Directive interior, trimmed
        directive: String,
        position: usize,
        line: usize,
    },

    /// Directive with a well-formed shape but an unrecognized key
    UnknownDirective {
        /// The offending key
        key: String,
        /// Directive interior, trimmed
        directive: String,
        position: usize,
        line: usize,
    },

    /// Token the parser has no rule for. Indicates a tokenizer bug.
    UnexpectedToken {
        token: String,
        position: usize,
        line: usize,
    },
}

impl SyntaxError {
    /// Line the error was reported at
    pub fn line(&self) -> usize {
        match self {
            SyntaxError::UnterminatedCodeBlock { line, .. }
            | SyntaxError::InvalidDirective { line, .. }
            | SyntaxError::UnknownDirective { line, .. }
            | SyntaxError::UnexpectedToken { line, .. } => *line,
        }
    }

    /// Byte offset the error was reported at
    pub fn position(&self) -> usize {
        match self {
            SyntaxError::UnterminatedCodeBlock { position, .. }
            | SyntaxError::InvalidDirective { position, .. }
            | SyntaxError::UnknownDirective { position, .. }
            | SyntaxError::UnexpectedToken { position, .. } => *position,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::UnterminatedCodeBlock { position, line } => {
                write!(
                    f,
                    "Code block that starts at position {}, line {}, does not complete",
                    position, line
                )
            }
            SyntaxError::InvalidDirective {
                directive, line, ..
            } => {
                write!(
                    f,
                    "Invalid directive found in template at line {}: {}",
                    line, directive
                )
            }
            SyntaxError::UnknownDirective {
                key,
                directive,
                line,
                ..
            } => {
                write!(
                    f,
                    "Invalid directive found in template at line {}: {} (unknown key '{}')",
                    line, directive, key
                )
            }
            SyntaxError::UnexpectedToken {
                token,
                position,
                line,
            } => {
                write!(
                    f,
                    "Unsupported token from template tokenizer at position {}, line {}: {:?}",
                    position, line, token
                )
            }
        }
    }
}

impl std::error::Error for SyntaxError {}
