//! Error types for parsing, pattern compilation and validation.
use core::fmt;

use thiserror::Error;

/// A single issue reported by a [`Validator`](crate::Validator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Human-readable description of what failed.
    pub message: String,
}

impl ValidationIssue {
    /// Creates an issue from any displayable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.message.fmt(f)
    }
}

fn issues_summary(issues: &[ValidationIssue]) -> String {
    let mut out = String::new();
    for (i, issue) in issues.iter().enumerate() {
        if i > 0 {
            out.push_str("; ");
        }
        out.push_str(&issue.message);
    }
    out
}

/// Location of an error within the input stream.
///
/// `position` is the absolute character offset; `line` and `column` are
/// 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Location {
    pub position: usize,
    pub line: usize,
    pub column: usize,
}

/// Fatal error raised while parsing or emitting.
///
/// Carries the error [`kind`](ErrorKind) together with the absolute character
/// position and the line/column pair at which it was raised. Once a parse has
/// produced a `ParseError` it accepts no further input.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} at {line}:{column} (position {position})")]
pub struct ParseError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Absolute character offset into the stream.
    pub position: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
}

impl ParseError {
    pub(crate) fn at(loc: Location, kind: ErrorKind) -> Self {
        Self {
            kind,
            position: loc.position,
            line: loc.line,
            column: loc.column,
        }
    }
}

/// The kinds of fatal parse errors.
///
/// Lexical kinds are raised by the tokenizer, grammar kinds by the value
/// builder, end-of-input kinds by `finish`, and `Validation` at emission
/// time.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A character the tokenizer cannot accept in its current state.
    #[error("unexpected character {found:?} in state {state}")]
    UnexpectedCharacter {
        /// The offending character.
        found: char,
        /// Tokenizer state name when the character arrived.
        state: &'static str,
    },
    /// A digit immediately following a leading `0`.
    #[error("leading zero in number")]
    LeadingZero,
    /// A backslash escape other than `" \\ / b f n r t u`.
    #[error("invalid escape character {0:?}")]
    InvalidEscapeCharacter(char),
    /// A token that is illegal for the current grammar state.
    #[error("unexpected {token} in state {state}")]
    UnexpectedToken {
        /// Short rendering of the offending token.
        token: String,
        /// Grammar state name when the token arrived.
        state: &'static str,
    },
    /// A number whose text does not convert to a float. Unreachable for
    /// input the tokenizer accepts; kept so acceptance never panics.
    #[error("malformed number {0:?}")]
    MalformedNumber(String),
    /// Input ended in the middle of a token.
    #[error("unexpected end of input in state {state}")]
    UnexpectedEndOfInput {
        /// Tokenizer state name at end of input.
        state: &'static str,
    },
    /// Non-whitespace after a complete top-level value without `multi`.
    #[error("unexpected data after top-level value: {0:?}")]
    TrailingData(char),
    /// Input ended with at least one container still open.
    #[error("unterminated container at end of input")]
    UnterminatedContainer,
    /// Input ended without a single complete top-level value.
    #[error("no data in input")]
    NoData,
    /// A validator rejected an emitted value.
    #[error("validation failed for pattern {pattern}: {}", issues_summary(.issues))]
    Validation {
        /// Text of the pattern whose validator failed.
        pattern: String,
        /// The issues the validator reported.
        issues: Vec<ValidationIssue>,
    },
    /// The parser already failed and cannot accept further input.
    #[error("parser previously failed; no further input accepted")]
    Poisoned,
}

/// Error raised by [`Pattern::compile`](crate::Pattern::compile) for invalid
/// pattern syntax.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PatternError {
    /// The pattern does not start with the `$` root marker.
    #[error("pattern must start with '$'")]
    MissingRoot,
    /// A character with no meaning at this point of the pattern.
    #[error("unexpected character {found:?} at offset {at}")]
    UnexpectedCharacter {
        /// Byte offset of the character within the pattern.
        at: usize,
        /// The offending character.
        found: char,
    },
    /// The pattern ended in the middle of a segment.
    #[error("unexpected end of pattern")]
    UnexpectedEnd,
    /// A `.` shorthand segment with no name.
    #[error("empty name selector at offset {at}")]
    EmptyName {
        /// Byte offset where the name was expected.
        at: usize,
    },
    /// A syntactically valid JSONPath construct this engine does not
    /// evaluate (descendant segments, indices, slices, filters, unions).
    #[error("unsupported selector at offset {at}: {what}")]
    Unsupported {
        /// Byte offset of the construct.
        at: usize,
        /// Name of the unsupported construct.
        what: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display_includes_location() {
        let err = ParseError::at(
            Location { position: 12, line: 2, column: 3 },
            ErrorKind::UnexpectedCharacter { found: 'x', state: "Default" },
        );
        let s = err.to_string();
        assert!(s.contains("'x'"), "{s}");
        assert!(s.contains("2:3"), "{s}");
        assert!(s.contains("position 12"), "{s}");
    }

    #[test]
    fn validation_display_joins_issues() {
        let kind = ErrorKind::Validation {
            pattern: "$.a".into(),
            issues: vec![ValidationIssue::new("too small"), ValidationIssue::new("not blue")],
        };
        assert_eq!(
            kind.to_string(),
            "validation failed for pattern $.a: too small; not blue"
        );
    }
}
