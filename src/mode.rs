use std::{fmt::Display, str::FromStr};

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::lex::{Token, TokenKind};

/// Restricts which operator families an expression may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Arithmetic,
    Logical,
    Conditional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Arithmetic,
    Logical,
    Conditional,
}

impl Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Family::Arithmetic => write!(f, "arithmetic"),
            Family::Logical => write!(f, "logical"),
            Family::Conditional => write!(f, "conditional"),
        }
    }
}

impl TokenKind {
    pub fn family(&self) -> Option<Family> {
        match self {
            TokenKind::Plus | TokenKind::Minus | TokenKind::Star | TokenKind::Slash => {
                Some(Family::Arithmetic)
            }
            TokenKind::And
            | TokenKind::Or
            | TokenKind::Bang
            | TokenKind::EqualEqual
            | TokenKind::BangEqual
            | TokenKind::Greater
            | TokenKind::Less
            | TokenKind::GreaterEqual
            | TokenKind::LessEqual => Some(Family::Logical),
            TokenKind::If | TokenKind::Else => Some(Family::Conditional),
            // `then` only ever appears alongside `if`
            TokenKind::Then
            | TokenKind::Number(_)
            | TokenKind::LeftParen
            | TokenKind::RightParen => None,
        }
    }
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum ModeError {
    #[error("{family} operator `{literal}` used in {mode} mode")]
    #[diagnostic(
        code(mode::forbidden_operator),
        help("switch modes or remove the {family} operator")
    )]
    Forbidden {
        mode: Mode,
        family: Family,
        literal: String,
        #[label("not allowed here")]
        span: SourceSpan,
    },

    #[error("no conditional keyword found in conditional mode")]
    #[diagnostic(
        code(mode::missing_conditional),
        help("write the expression as `if … then … else …`")
    )]
    MissingConditional,
}

impl Mode {
    fn allows(self, family: Family) -> bool {
        match self {
            Mode::Arithmetic => family == Family::Arithmetic,
            Mode::Logical => family == Family::Logical,
            Mode::Conditional => true,
        }
    }

    /// Checks a token sequence against this mode, naming the first token
    /// the mode forbids.
    pub fn check(self, tokens: &[Token<'_>]) -> Result<(), ModeError> {
        let mut conditional = false;
        for token in tokens {
            let Some(family) = token.kind.family() else {
                continue;
            };
            if !self.allows(family) {
                return Err(ModeError::Forbidden {
                    mode: self,
                    family,
                    literal: token.literal.to_string(),
                    span: token.span(),
                });
            }
            conditional |= family == Family::Conditional;
        }

        if self == Mode::Conditional && !conditional {
            return Err(ModeError::MissingConditional);
        }
        Ok(())
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Arithmetic => write!(f, "arithmetic"),
            Mode::Logical => write!(f, "logical"),
            Mode::Conditional => write!(f, "conditional"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown mode `{0}`, expected arithmetic, logical or conditional")]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "arithmetic" => Ok(Mode::Arithmetic),
            "logical" => Ok(Mode::Logical),
            "conditional" => Ok(Mode::Conditional),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}
