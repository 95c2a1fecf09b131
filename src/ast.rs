use std::{borrow::Cow, fmt::Display};

use crate::lex::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl BinaryOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::And => BinaryOp::And,
            TokenKind::Or => BinaryOp::Or,
            TokenKind::EqualEqual => BinaryOp::Eq,
            TokenKind::BangEqual => BinaryOp::Neq,
            TokenKind::Greater => BinaryOp::Gt,
            TokenKind::GreaterEqual => BinaryOp::Gte,
            TokenKind::Less => BinaryOp::Lt,
            TokenKind::LessEqual => BinaryOp::Lte,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
}

/// A parsed expression.
///
/// Every child is owned through a `Box`, so the tree can neither share nodes
/// nor contain cycles. The `literal` fields borrow the operator text from the
/// source string.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'de> {
    Number(i64),
    Binary {
        op: BinaryOp,
        literal: &'de str,
        lhs: Box<Expr<'de>>,
        rhs: Box<Expr<'de>>,
    },
    Unary {
        op: UnaryOp,
        literal: &'de str,
        operand: Box<Expr<'de>>,
    },
    Conditional {
        condition: Box<Expr<'de>>,
        then_branch: Box<Expr<'de>>,
        else_branch: Box<Expr<'de>>,
    },
}

impl<'de> Expr<'de> {
    /// Direct children in drawing order: condition, then, else for
    /// conditionals and left before right for binary operators.
    pub fn children(&self) -> Vec<&Expr<'de>> {
        match self {
            Expr::Number(_) => Vec::new(),
            Expr::Binary { lhs, rhs, .. } => vec![lhs.as_ref(), rhs.as_ref()],
            Expr::Unary { operand, .. } => vec![operand.as_ref()],
            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => vec![
                condition.as_ref(),
                then_branch.as_ref(),
                else_branch.as_ref(),
            ],
        }
    }

    /// Text shown for this node when the tree is drawn.
    pub fn label(&self) -> Cow<'de, str> {
        match self {
            Expr::Number(n) => Cow::Owned(n.to_string()),
            Expr::Binary { literal, .. } | Expr::Unary { literal, .. } => Cow::Borrowed(literal),
            Expr::Conditional { .. } => Cow::Borrowed("IF"),
        }
    }

    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(Expr::node_count)
            .sum::<usize>()
    }
}

impl Display for Expr<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{n}"),
            Expr::Binary {
                literal, lhs, rhs, ..
            } => write!(f, "({literal} {lhs} {rhs})"),
            Expr::Unary {
                literal, operand, ..
            } => write!(f, "({literal} {operand})"),
            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => write!(f, "(if {condition} {then_branch} {else_branch})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(n: i64) -> Box<Expr<'static>> {
        Box::new(Expr::Number(n))
    }

    #[test]
    fn conditional_children_keep_branch_order() {
        let expr = Expr::Conditional {
            condition: number(1),
            then_branch: number(2),
            else_branch: number(3),
        };
        let labels: Vec<_> = expr.children().iter().map(|c| c.label()).collect();
        assert_eq!(labels, ["1", "2", "3"]);
        assert_eq!(expr.label(), "IF");
        assert_eq!(expr.node_count(), 4);
    }

    #[test]
    fn display_is_an_s_expression() {
        let expr = Expr::Binary {
            op: BinaryOp::Sub,
            literal: "-",
            lhs: Box::new(Expr::Unary {
                op: UnaryOp::Not,
                literal: "!",
                operand: number(0),
            }),
            rhs: number(7),
        };
        assert_eq!(expr.to_string(), "(- (! 0) 7)");
        assert!(Expr::Number(5).children().is_empty());
    }

    #[test]
    fn only_binary_tokens_map_to_operators() {
        assert_eq!(BinaryOp::from_token(TokenKind::LessEqual), Some(BinaryOp::Lte));
        assert_eq!(BinaryOp::from_token(TokenKind::Bang), None);
        assert_eq!(BinaryOp::from_token(TokenKind::Number(1)), None);
    }
}
