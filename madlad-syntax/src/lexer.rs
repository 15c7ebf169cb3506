//! Source text → tokens.
//!
//! Newlines are whitespace. `#` and `//` start comments that run to the end
//! of the line.

use crate::error::{ParserError, ParserErrorKind};
use crate::token::{Token, TokenKind};
use std::iter::Peekable;
use std::str::Chars;

struct Lexer<'s> {
    chars: Peekable<Chars<'s>>,
    line: usize,
    column: usize,
}

/// Tokenize all of `source`. The token list always ends with `Eof`; every
/// lexical error is reported, not just the first.
pub fn tokenize(source: &str) -> Result<Vec<Token>, Vec<ParserError>> {
    let mut lexer = Lexer {
        chars: source.chars().peekable(),
        line: 1,
        column: 1,
    };
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    loop {
        lexer.skip_trivia();
        let (line, column) = (lexer.line, lexer.column);
        let Some(c) = lexer.bump() else {
            tokens.push(Token {
                kind: TokenKind::Eof,
                line,
                column,
            });
            break;
        };
        match lexer.scan(c) {
            Ok(kind) => tokens.push(Token { kind, line, column }),
            Err(kind) => errors.push(ParserError::at(kind, line, column)),
        }
    }

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}

impl Lexer<'_> {
    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == '#' || (c == '/' && self.second_is('/')) {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.bump();
                }
            } else {
                break;
            }
        }
    }

    fn second_is(&self, expected: char) -> bool {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next() == Some(expected)
    }

    fn scan(&mut self, c: char) -> Result<TokenKind, ParserErrorKind> {
        let kind = match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '{' => TokenKind::LeftCurly,
            '}' => TokenKind::RightCurly,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Asterisk,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' if self.eat('=') => TokenKind::DoubleEqual,
            '!' if self.eat('=') => TokenKind::ExclamationEqual,
            '<' if self.eat('=') => TokenKind::LessThanEqual,
            '<' => TokenKind::LessThan,
            '>' if self.eat('=') => TokenKind::GreaterThanEqual,
            '>' => TokenKind::GreaterThan,
            ':' if self.eat('=') => TokenKind::ColonEqual,
            ':' => {
                let name = self.word(None);
                if name.is_empty() {
                    return Err(ParserErrorKind::EmptySymbol);
                }
                TokenKind::Symbol(name)
            }
            '"' => TokenKind::Str(self.string()?),
            c if c.is_ascii_digit() => {
                let mut digits = c.to_string();
                while let Some(d) = self.peek().filter(char::is_ascii_digit) {
                    digits.push(d);
                    self.bump();
                }
                let value = digits
                    .parse::<u64>()
                    .map_err(|_| ParserErrorKind::IntegerOverflow(digits.clone()))?;
                TokenKind::Integer(value)
            }
            c if is_ident_start(c) => {
                let word = self.word(Some(c));
                TokenKind::keyword(&word).unwrap_or(TokenKind::Identifier(word))
            }
            other => return Err(ParserErrorKind::UnexpectedChar(other)),
        };
        Ok(kind)
    }

    /// Consume identifier characters, optionally prefixed by `first`
    fn word(&mut self, first: Option<char>) -> String {
        let mut word: String = first.into_iter().collect();
        while let Some(c) = self.peek().filter(|c| is_ident_continue(*c)) {
            word.push(c);
            self.bump();
        }
        word
    }

    fn string(&mut self) -> Result<String, ParserErrorKind> {
        let mut text = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(ParserErrorKind::UnterminatedString),
                Some('"') => return Ok(text),
                Some('\\') => match self.bump() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('"') => text.push('"'),
                    Some('\\') => text.push('\\'),
                    Some(other) => return Err(ParserErrorKind::UnknownEscape(other)),
                    None => return Err(ParserErrorKind::UnterminatedString),
                },
                Some(c) => text.push(c),
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
