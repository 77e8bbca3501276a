//! Error types for parsing and rendering literals.

use thiserror::Error;

/// Convenience result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// What went wrong while parsing a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A character that cannot start or continue the current construct.
    UnexpectedChar(char),
    /// Input ended in the middle of a value.
    UnexpectedEnd,
    /// A numeric literal that does not fit `serde_json::Number`.
    InvalidNumber(String),
    /// A malformed `\x`, `\u` or `\u{}` escape.
    InvalidEscape,
    /// A string literal missing its closing quote.
    UnterminatedString,
    /// A regular-expression literal missing its closing slash.
    UnterminatedRegExp,
    /// Non-whitespace input after the parsed value.
    TrailingInput,
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorKind::UnexpectedChar(c) => write!(f, "unexpected character {c:?}"),
            ParseErrorKind::UnexpectedEnd => write!(f, "unexpected end of input"),
            ParseErrorKind::InvalidNumber(text) => write!(f, "invalid number {text:?}"),
            ParseErrorKind::InvalidEscape => write!(f, "invalid escape sequence"),
            ParseErrorKind::UnterminatedString => write!(f, "unterminated string literal"),
            ParseErrorKind::UnterminatedRegExp => {
                write!(f, "unterminated regular expression literal")
            }
            ParseErrorKind::TrailingInput => write!(f, "unexpected input after value"),
        }
    }
}

/// A parse failure with a 1-based source position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at line {line}, column {column}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub column: usize,
}

/// Errors produced by this crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("unsupported regular expression flag {flag:?} in /{pattern}/")]
    UnsupportedFlag { pattern: String, flag: char },

    #[error("invalid regular expression /{pattern}/: {source}")]
    InvalidRegExp {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("expected {expected}, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("failed to render literal: {0}")]
    Render(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn shape(expected: &'static str, found: &'static str) -> Self {
        Error::UnexpectedShape { expected, found }
    }
}
