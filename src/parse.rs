use std::{fmt::Display, iter::Peekable};

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::{
    ast::{BinaryOp, Expr, UnaryOp},
    lex::{Token, TokenKind},
};

/// What the parser ran into instead of the construct it expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Found {
    Token { kind: &'static str, literal: String },
    EndOfInput,
}

impl Display for Found {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Found::Token { kind, literal } => write!(f, "`{literal}` ({kind})"),
            Found::EndOfInput => write!(f, "end of input"),
        }
    }
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[error("Expected {expected}, found {found}")]
#[diagnostic(
    code(parse::unexpected_token),
    help("the parser needed {expected} at this point")
)]
pub struct SyntaxError {
    pub expected: &'static str,
    pub found: Found,
    #[label("here")]
    pub span: SourceSpan,
}

/// Deepest tree the parser will build. Parsing and evaluation both recurse
/// once per level, so this bounds their stack use.
pub const MAX_DEPTH: usize = 256;

pub struct Parser<'de> {
    tokens: Peekable<std::vec::IntoIter<Token<'de>>>,
    /// Byte offset just past the last token, used to point at end of input.
    end: usize,
    /// Open `!` and `(` productions on the current path.
    depth: usize,
}

impl<'de> Parser<'de> {
    pub fn new(tokens: Vec<Token<'de>>) -> Self {
        let end = tokens
            .last()
            .map_or(0, |token| token.offset + token.literal.len());
        Parser {
            tokens: tokens.into_iter().peekable(),
            end,
            depth: 0,
        }
    }

    /// Parses a single expression and requires every token to be consumed.
    pub fn parse(mut self) -> Result<Expr<'de>, SyntaxError> {
        let (expr, _) = self.parse_conditional()?;
        match self.tokens.next() {
            None => Ok(expr),
            Some(token) => Err(self.error("end of input", Some(token))),
        }
    }

    fn error(&self, expected: &'static str, found: Option<Token<'de>>) -> SyntaxError {
        match found {
            Some(token) => SyntaxError {
                expected,
                found: Found::Token {
                    kind: token.kind.name(),
                    literal: token.literal.to_string(),
                },
                span: token.span(),
            },
            None => SyntaxError {
                expected,
                found: Found::EndOfInput,
                span: SourceSpan::from(self.end..self.end),
            },
        }
    }

    fn expect(
        &mut self,
        expected: TokenKind,
        error: &'static str,
    ) -> Result<Token<'de>, SyntaxError> {
        match self.tokens.next() {
            Some(token) if token.kind == expected => Ok(token),
            other => Err(self.error(error, other)),
        }
    }

    /// Height of a node whose tallest child is `child`, failing at `token`
    /// once the tree would exceed `MAX_DEPTH`.
    fn grow(&self, child: usize, token: Token<'de>) -> Result<usize, SyntaxError> {
        if child >= MAX_DEPTH {
            return Err(self.error("shallower nesting", Some(token)));
        }
        Ok(child + 1)
    }

    fn enter(&mut self, token: Token<'de>) -> Result<(), SyntaxError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("shallower nesting", Some(token)));
        }
        self.depth += 1;
        Ok(())
    }

    // Branches are parsed at the `||` level, so an `if` directly in a branch
    // must be parenthesized. Parsing the branches with `parse_conditional`
    // instead would lift that restriction.
    fn parse_conditional(&mut self) -> Result<(Expr<'de>, usize), SyntaxError> {
        let Some(if_token) = self.tokens.next_if(|token| token.kind == TokenKind::If) else {
            return self.parse_expression_within(0);
        };

        let (condition, condition_height) = self.parse_expression_within(0)?;
        self.expect(TokenKind::Then, "`then`")?;
        let (then_branch, then_height) = self.parse_expression_within(0)?;
        self.expect(TokenKind::Else, "`else`")?;
        let (else_branch, else_height) = self.parse_expression_within(0)?;

        let tallest = condition_height.max(then_height).max(else_height);
        let height = self.grow(tallest, if_token)?;
        Ok((
            Expr::Conditional {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
            height,
        ))
    }

    fn parse_expression_within(
        &mut self,
        min_bp: u8,
    ) -> Result<(Expr<'de>, usize), SyntaxError> {
        let (mut lhs, mut height) = self.parse_factor()?;

        loop {
            let Some(op) = self
                .tokens
                .peek()
                .and_then(|token| BinaryOp::from_token(token.kind))
            else {
                break;
            };

            let (l_bp, r_bp) = infix_binding_power(op);
            if l_bp < min_bp {
                break;
            }

            let Some(token) = self.tokens.next() else {
                break;
            };
            let (rhs, rhs_height) = self.parse_expression_within(r_bp)?;
            height = self.grow(height.max(rhs_height), token)?;
            lhs = Expr::Binary {
                op,
                literal: token.literal,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        Ok((lhs, height))
    }

    fn parse_factor(&mut self) -> Result<(Expr<'de>, usize), SyntaxError> {
        match self.tokens.next() {
            Some(Token {
                kind: TokenKind::Number(n),
                ..
            }) => Ok((Expr::Number(n), 1)),
            Some(
                token @ Token {
                    kind: TokenKind::Bang,
                    ..
                },
            ) => {
                self.enter(token)?;
                let (operand, operand_height) = self.parse_factor()?;
                self.depth -= 1;
                let height = self.grow(operand_height, token)?;
                Ok((
                    Expr::Unary {
                        op: UnaryOp::Not,
                        literal: token.literal,
                        operand: Box::new(operand),
                    },
                    height,
                ))
            }
            Some(
                token @ Token {
                    kind: TokenKind::LeftParen,
                    ..
                },
            ) => {
                self.enter(token)?;
                let inner = self.parse_conditional()?;
                self.depth -= 1;
                self.expect(TokenKind::RightParen, "`)`")?;
                Ok(inner)
            }
            other => Err(self.error("a number, `!` or `(`", other)),
        }
    }
}

/// Left-associative levels: every left power is one below its right power.
fn infix_binding_power(op: BinaryOp) -> (u8, u8) {
    match op {
        BinaryOp::Or => (1, 2),
        BinaryOp::And => (3, 4),
        BinaryOp::Eq | BinaryOp::Neq => (5, 6),
        BinaryOp::Gt | BinaryOp::Gte | BinaryOp::Lt | BinaryOp::Lte => (7, 8),
        BinaryOp::Add | BinaryOp::Sub => (9, 10),
        BinaryOp::Mul | BinaryOp::Div => (11, 12),
    }
}

pub fn parse(tokens: Vec<Token<'_>>) -> Result<Expr<'_>, SyntaxError> {
    Parser::new(tokens).parse()
}
