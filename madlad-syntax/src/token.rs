//! Madlad token kinds

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // keywords
    Define,
    If,
    Else,
    While,
    For,
    Converge,
    With,
    Limit,
    Optimize,
    Over,
    Assert,
    Print,
    Fn,
    Return,
    True,
    False,
    Empty,
    State,
    And,
    Or,
    Not,

    // literals
    /// Magnitude only; a leading `-` is a separate token
    Integer(u64),
    Identifier(String),
    /// `:name`
    Symbol(String),
    /// `"text"`
    Str(String),

    // punctuation
    ColonEqual,
    Comma,
    Semicolon,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftCurly,
    RightCurly,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    DoubleEqual,
    ExclamationEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,

    Eof,
}

impl TokenKind {
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "define" => TokenKind::Define,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "converge" => TokenKind::Converge,
            "with" => TokenKind::With,
            "limit" => TokenKind::Limit,
            "optimize" => TokenKind::Optimize,
            "over" => TokenKind::Over,
            "assert" => TokenKind::Assert,
            "print" => TokenKind::Print,
            "fn" => TokenKind::Fn,
            "return" => TokenKind::Return,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "empty" => TokenKind::Empty,
            "state" => TokenKind::State,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            _ => return None,
        };
        Some(kind)
    }

    /// Tokens a statement can start with, used to resynchronize after errors
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Define
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Converge
                | TokenKind::Optimize
                | TokenKind::Assert
                | TokenKind::Print
                | TokenKind::Fn
                | TokenKind::Return
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Define => "define",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::For => "for",
            TokenKind::Converge => "converge",
            TokenKind::With => "with",
            TokenKind::Limit => "limit",
            TokenKind::Optimize => "optimize",
            TokenKind::Over => "over",
            TokenKind::Assert => "assert",
            TokenKind::Print => "print",
            TokenKind::Fn => "fn",
            TokenKind::Return => "return",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Empty => "empty",
            TokenKind::State => "state",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::Not => "not",
            TokenKind::Integer(n) => return write!(f, "'{n}'"),
            TokenKind::Identifier(name) => return write!(f, "identifier '{name}'"),
            TokenKind::Symbol(name) => return write!(f, "symbol ':{name}'"),
            TokenKind::Str(text) => return write!(f, "string {text:?}"),
            TokenKind::ColonEqual => ":=",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBracket => "[",
            TokenKind::RightBracket => "]",
            TokenKind::LeftCurly => "{",
            TokenKind::RightCurly => "}",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::DoubleEqual => "==",
            TokenKind::ExclamationEqual => "!=",
            TokenKind::LessThan => "<",
            TokenKind::LessThanEqual => "<=",
            TokenKind::GreaterThan => ">",
            TokenKind::GreaterThanEqual => ">=",
            TokenKind::Eof => return f.write_str("end of input"),
        };
        write!(f, "'{text}'")
    }
}

/// A token and where it starts (1-based)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}
