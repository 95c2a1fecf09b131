use std::fmt::Display;

use miette::Diagnostic;
use thiserror::Error;

use crate::ast::{BinaryOp, Expr, UnaryOp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Bool(bool),
}

impl Value {
    pub fn type_name(self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Bool(_) => "boolean",
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("Division by zero")]
    #[diagnostic(
        code(eval::division_by_zero),
        help("the right operand of `/` evaluated to 0")
    )]
    DivisionByZero,

    #[error("Integer overflow in `{operator}`")]
    #[diagnostic(
        code(eval::overflow),
        help("results must fit in a signed 64-bit integer")
    )]
    Overflow { operator: String },

    #[error("`{operator}` expects {expected}, found {found}")]
    #[diagnostic(code(eval::type_mismatch))]
    TypeMismatch {
        operator: String,
        expected: &'static str,
        found: String,
    },
}

impl EvalError {
    fn mismatch(operator: &str, expected: &'static str, found: impl Into<String>) -> Self {
        EvalError::TypeMismatch {
            operator: operator.to_string(),
            expected,
            found: found.into(),
        }
    }
}

/// Evaluates an expression tree.
///
/// `&&` and `||` short-circuit: the right operand is skipped once the left
/// one decides the result. A conditional evaluates only the branch it
/// selects. Division truncates toward zero.
pub fn evaluate(expr: &Expr<'_>) -> Result<Value, EvalError> {
    match expr {
        Expr::Number(n) => Ok(Value::Integer(*n)),
        Expr::Unary {
            op: UnaryOp::Not,
            literal,
            operand,
        } => match evaluate(operand)? {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            other => Err(EvalError::mismatch(literal, "a boolean", other.type_name())),
        },
        Expr::Binary {
            op: op @ (BinaryOp::And | BinaryOp::Or),
            literal,
            lhs,
            rhs,
        } => {
            let Value::Bool(left) = evaluate(lhs)? else {
                return Err(EvalError::mismatch(literal, "booleans", "an integer"));
            };
            // `false && _` and `true || _` are decided by the left operand
            if left == (*op == BinaryOp::Or) {
                return Ok(Value::Bool(left));
            }
            eval_binary(*op, literal, Value::Bool(left), evaluate(rhs)?)
        }
        Expr::Binary {
            op,
            literal,
            lhs,
            rhs,
        } => {
            let left = evaluate(lhs)?;
            let right = evaluate(rhs)?;
            eval_binary(*op, literal, left, right)
        }
        Expr::Conditional {
            condition,
            then_branch,
            else_branch,
        } => match evaluate(condition)? {
            Value::Bool(true) => evaluate(then_branch),
            Value::Bool(false) => evaluate(else_branch),
            Value::Integer(_) => Err(EvalError::mismatch(
                "if",
                "a boolean condition",
                "an integer",
            )),
        },
    }
}

fn eval_binary(op: BinaryOp, literal: &str, left: Value, right: Value) -> Result<Value, EvalError> {
    let overflow = || EvalError::Overflow {
        operator: literal.to_string(),
    };

    Ok(match op {
        BinaryOp::Eq | BinaryOp::Neq => {
            let equal = match (left, right) {
                (Value::Integer(lhs), Value::Integer(rhs)) => lhs == rhs,
                (Value::Bool(lhs), Value::Bool(rhs)) => lhs == rhs,
                (lhs, rhs) => {
                    return Err(EvalError::mismatch(
                        literal,
                        "operands of the same type",
                        format!("{} and {}", lhs.type_name(), rhs.type_name()),
                    ));
                }
            };
            Value::Bool(equal == (op == BinaryOp::Eq))
        }
        BinaryOp::And | BinaryOp::Or => match (left, right) {
            (Value::Bool(lhs), Value::Bool(rhs)) if op == BinaryOp::And => Value::Bool(lhs && rhs),
            (Value::Bool(lhs), Value::Bool(rhs)) => Value::Bool(lhs || rhs),
            (lhs, rhs) => {
                return Err(EvalError::mismatch(
                    literal,
                    "booleans",
                    format!("{} and {}", lhs.type_name(), rhs.type_name()),
                ));
            }
        },
        BinaryOp::Add => {
            let (lhs, rhs) = integers(literal, left, right)?;
            Value::Integer(lhs.checked_add(rhs).ok_or_else(overflow)?)
        }
        BinaryOp::Sub => {
            let (lhs, rhs) = integers(literal, left, right)?;
            Value::Integer(lhs.checked_sub(rhs).ok_or_else(overflow)?)
        }
        BinaryOp::Mul => {
            let (lhs, rhs) = integers(literal, left, right)?;
            Value::Integer(lhs.checked_mul(rhs).ok_or_else(overflow)?)
        }
        BinaryOp::Div => {
            let (lhs, rhs) = integers(literal, left, right)?;
            if rhs == 0 {
                return Err(EvalError::DivisionByZero);
            }
            // i64::MIN / -1 is the only other failure
            Value::Integer(lhs.checked_div(rhs).ok_or_else(overflow)?)
        }
        BinaryOp::Gt => {
            let (lhs, rhs) = integers(literal, left, right)?;
            Value::Bool(lhs > rhs)
        }
        BinaryOp::Gte => {
            let (lhs, rhs) = integers(literal, left, right)?;
            Value::Bool(lhs >= rhs)
        }
        BinaryOp::Lt => {
            let (lhs, rhs) = integers(literal, left, right)?;
            Value::Bool(lhs < rhs)
        }
        BinaryOp::Lte => {
            let (lhs, rhs) = integers(literal, left, right)?;
            Value::Bool(lhs <= rhs)
        }
    })
}

fn integers(literal: &str, left: Value, right: Value) -> Result<(i64, i64), EvalError> {
    match (left, right) {
        (Value::Integer(lhs), Value::Integer(rhs)) => Ok((lhs, rhs)),
        (lhs, rhs) => Err(EvalError::mismatch(
            literal,
            "integers",
            format!("{} and {}", lhs.type_name(), rhs.type_name()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lex::tokenize, parse::parse};

    fn eval(input: &str) -> Result<Value, EvalError> {
        evaluate(&parse(tokenize(input).unwrap()).unwrap())
    }

    #[test]
    fn arithmetic() {
        assert_eq!(eval("10-2-3"), Ok(Value::Integer(5)));
        assert_eq!(eval("2+3*4"), Ok(Value::Integer(14)));
        assert_eq!(eval("(2+3)*4"), Ok(Value::Integer(20)));
        assert_eq!(eval("7/2"), Ok(Value::Integer(3)));
    }

    #[test]
    fn division_truncates_toward_zero() {
        assert_eq!(eval("(0-7)/2"), Ok(Value::Integer(-3)));
        assert_eq!(eval("7/(0-2)"), Ok(Value::Integer(-3)));
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(eval("5/0"), Err(EvalError::DivisionByZero));
        assert_eq!(eval("5/(2-2)"), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(
            eval("9223372036854775807 + 1"),
            Err(EvalError::Overflow {
                operator: "+".to_string()
            })
        );
        assert!(matches!(
            eval("(0 - 9223372036854775807 - 1) / (0 - 1)"),
            Err(EvalError::Overflow { .. })
        ));
    }

    #[test]
    fn comparisons_and_logic() {
        assert_eq!(eval("3 > 2"), Ok(Value::Bool(true)));
        assert_eq!(eval("3 <= 2"), Ok(Value::Bool(false)));
        assert_eq!(eval("1 != 2 && 2 >= 2"), Ok(Value::Bool(true)));
        assert_eq!(eval("1 == 2 || 2 < 1"), Ok(Value::Bool(false)));
        assert_eq!(eval("(1 < 2) == (3 < 4)"), Ok(Value::Bool(true)));
        assert_eq!(eval("!!(1 == 1)"), Ok(Value::Bool(true)));
    }

    #[test]
    fn logic_short_circuits() {
        assert_eq!(eval("1 == 2 && 1/0 == 0"), Ok(Value::Bool(false)));
        assert_eq!(eval("1 == 1 || 1/0 == 0"), Ok(Value::Bool(true)));
        assert_eq!(eval("1 == 1 && 1/0 == 0"), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn conditional_skips_the_rejected_branch() {
        assert_eq!(eval("if 1==1 then 5 else 1/0"), Ok(Value::Integer(5)));
        assert_eq!(eval("if 1==2 then 1/0 else 6"), Ok(Value::Integer(6)));
        assert_eq!(
            eval("if (3>2) && !(1==2) then 1 else 0"),
            Ok(Value::Integer(1))
        );
    }

    #[test]
    fn type_mismatches() {
        assert!(matches!(eval("!1"), Err(EvalError::TypeMismatch { .. })));
        assert!(matches!(eval("1 && 2"), Err(EvalError::TypeMismatch { .. })));
        assert!(matches!(eval("(1 == 1) + 1"), Err(EvalError::TypeMismatch { .. })));
        assert!(matches!(eval("(1 == 1) == 1"), Err(EvalError::TypeMismatch { .. })));
        assert!(matches!(eval("(1 == 1) < (2 == 2)"), Err(EvalError::TypeMismatch { .. })));

        let err = eval("if 1 then 2 else 3").unwrap_err();
        assert_eq!(
            err.to_string(),
            "`if` expects a boolean condition, found an integer"
        );
    }
}
