use std::fmt::Display;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Unexpected character '{token}' at index {index}")]
    #[diagnostic(
        code(lex::unexpected_character),
        help("remove or correct the character: `{token}`")
    )]
    UnexpectedCharacter {
        token: char,
        index: usize,
        #[label("this character")]
        bad_bit: SourceSpan,
    },

    #[error("Integer literal `{literal}` is too large")]
    #[diagnostic(
        code(lex::literal_too_large),
        help("integer literals must fit in a signed 64-bit integer")
    )]
    LiteralTooLarge {
        literal: String,
        #[label("this numeric literal")]
        bad_bit: SourceSpan,
    },
}

impl LexError {
    fn unexpected(token: char, index: usize) -> Self {
        LexError::UnexpectedCharacter {
            token,
            index,
            bad_bit: SourceSpan::from(index..index + token.len_utf8()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'de> {
    pub kind: TokenKind,
    pub literal: &'de str,
    /// Byte offset of the literal in the input.
    pub offset: usize,
}

impl Token<'_> {
    pub fn span(&self) -> SourceSpan {
        SourceSpan::from(self.offset..self.offset + self.literal.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Number(i64),
    And,
    Or,
    Bang,
    EqualEqual,
    BangEqual,
    GreaterEqual,
    LessEqual,
    Greater,
    Less,
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
    If,
    Then,
    Else,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Number(_) => "NUMBER",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Bang => "NOT",
            TokenKind::EqualEqual => "EQ",
            TokenKind::BangEqual => "NEQ",
            TokenKind::GreaterEqual => "GTE",
            TokenKind::LessEqual => "LTE",
            TokenKind::Greater => "GT",
            TokenKind::Less => "LT",
            TokenKind::Plus => "ADD",
            TokenKind::Minus => "SUB",
            TokenKind::Star => "MUL",
            TokenKind::Slash => "DIV",
            TokenKind::LeftParen => "LPAREN",
            TokenKind::RightParen => "RPAREN",
            TokenKind::If => "IF",
            TokenKind::Then => "THEN",
            TokenKind::Else => "ELSE",
        }
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.literal;
        let name = self.kind.name();
        match self.kind {
            TokenKind::Number(n) => write!(f, "{name} {lit} {n}"),
            _ => write!(f, "{name} {lit} null"),
        }
    }
}

/// Splits an expression into tokens, one per call to `next`.
///
/// The lexer stops at the first error: after yielding an `Err` it yields
/// nothing further.
pub struct Lexer<'de> {
    whole: &'de str,
    rest: &'de str,
    byte: usize,
}

impl<'de> Lexer<'de> {
    pub fn new(input: &'de str) -> Self {
        Lexer {
            whole: input,
            rest: input,
            byte: 0,
        }
    }

    fn fail(&mut self, error: LexError) -> Option<Result<Token<'de>, LexError>> {
        self.rest = "";
        self.byte = self.whole.len();
        Some(Err(error))
    }
}

impl<'de> Iterator for Lexer<'de> {
    type Item = Result<Token<'de>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut chars = self.rest.chars();
            let c = chars.next()?;
            let offset = self.byte;
            let literal = &self.rest[..c.len_utf8()];
            let cur = self.rest;
            self.rest = chars.as_str();
            self.byte += c.len_utf8();

            enum Start {
                Keyword,
                Number,
                Doubled(char, TokenKind),
                IfEqualElse(TokenKind, TokenKind),
            }

            let process = |kind: TokenKind| {
                Some(Ok(Token {
                    kind,
                    literal,
                    offset,
                }))
            };

            let started = match c {
                '(' => return process(TokenKind::LeftParen),
                ')' => return process(TokenKind::RightParen),
                '+' => return process(TokenKind::Plus),
                '-' => return process(TokenKind::Minus),
                '*' => return process(TokenKind::Star),
                '/' => return process(TokenKind::Slash),
                '&' => Start::Doubled('&', TokenKind::And),
                '|' => Start::Doubled('|', TokenKind::Or),
                '=' => Start::Doubled('=', TokenKind::EqualEqual),
                '!' => Start::IfEqualElse(TokenKind::BangEqual, TokenKind::Bang),
                '>' => Start::IfEqualElse(TokenKind::GreaterEqual, TokenKind::Greater),
                '<' => Start::IfEqualElse(TokenKind::LessEqual, TokenKind::Less),
                'a'..='z' | 'A'..='Z' => Start::Keyword,
                '0'..='9' => Start::Number,
                ' ' | '\t' => continue,
                c => return self.fail(LexError::unexpected(c, offset)),
            };

            match started {
                Start::Doubled(second, kind) => {
                    if self.rest.starts_with(second) {
                        self.rest = &self.rest[second.len_utf8()..];
                        self.byte += second.len_utf8();
                        return Some(Ok(Token {
                            kind,
                            literal: &cur[..c.len_utf8() + second.len_utf8()],
                            offset,
                        }));
                    }
                    // `&`, `|` and `=` are only meaningful doubled
                    return self.fail(LexError::unexpected(c, offset));
                }
                Start::IfEqualElse(yes, no) => {
                    if self.rest.starts_with('=') {
                        self.rest = &self.rest[1..];
                        self.byte += 1;
                        return Some(Ok(Token {
                            kind: yes,
                            literal: &cur[..c.len_utf8() + 1],
                            offset,
                        }));
                    }
                    return process(no);
                }
                Start::Keyword => {
                    // keywords match as prefixes, so `ifthen` is IF THEN and
                    // `iff` fails on its second `f`
                    let Some((literal, kind)) = [
                        ("if", TokenKind::If),
                        ("then", TokenKind::Then),
                        ("else", TokenKind::Else),
                    ]
                    .into_iter()
                    .find(|(keyword, _)| cur.starts_with(*keyword)) else {
                        return self.fail(LexError::unexpected(c, offset));
                    };
                    let literal = &cur[..literal.len()];

                    let extra_bytes = literal.len() - c.len_utf8();
                    self.byte += extra_bytes;
                    self.rest = &self.rest[extra_bytes..];

                    return Some(Ok(Token {
                        kind,
                        literal,
                        offset,
                    }));
                }
                Start::Number => {
                    let end = cur.find(|c: char| !c.is_ascii_digit()).unwrap_or(cur.len());
                    let literal = &cur[..end];

                    let extra_bytes = literal.len() - c.len_utf8();
                    self.byte += extra_bytes;
                    self.rest = &self.rest[extra_bytes..];

                    // only digits were consumed, so overflow is the sole failure
                    let Ok(n) = literal.parse::<i64>() else {
                        return self.fail(LexError::LiteralTooLarge {
                            literal: literal.to_string(),
                            bad_bit: SourceSpan::from(offset..offset + literal.len()),
                        });
                    };

                    return Some(Ok(Token {
                        kind: TokenKind::Number(n),
                        literal,
                        offset,
                    }));
                }
            }
        }
    }
}

/// Tokenizes the whole input, failing on the first unrecognized character.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LexError> {
    Lexer::new(input).collect()
}
