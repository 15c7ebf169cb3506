//! Lexer and parser diagnostics

use madlad_core::ast::SyntaxError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserErrorKind {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("unterminated string")]
    UnterminatedString,

    #[error("unknown escape '\\{0}'")]
    UnknownEscape(char),

    #[error("integer literal '{0}' is out of range")]
    IntegerOverflow(String),

    #[error("expected a symbol name after ':'")]
    EmptySymbol,

    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("expected an expression, found {found}")]
    ExpectedExpression { found: String },

    #[error("limit must be a non-negative integer below 2^32")]
    InvalidLimit,

    #[error("parameter '{0}' is declared more than once")]
    DuplicateParameter(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserError {
    pub kind: ParserErrorKind,
    pub line: usize,
    pub column: usize,
}

pub type ParseResult<T> = Result<T, ParserError>;

impl ParserError {
    pub fn at(kind: ParserErrorKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }
}

impl From<ParserError> for SyntaxError {
    fn from(error: ParserError) -> Self {
        SyntaxError::new(error.line, error.column, error.kind.to_string())
    }
}
