//! Primitive arithmetic, comparison and logic on runtime values.

use crate::error::{Error, Result};
use crate::omega::Omega;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Not,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem
        )
    }

    /// Checked integer arithmetic; `None` on overflow or division by zero
    pub fn arithmetic(self, left: i64, right: i64) -> Option<i64> {
        match self {
            BinaryOp::Add => left.checked_add(right),
            BinaryOp::Sub => left.checked_sub(right),
            BinaryOp::Mul => left.checked_mul(right),
            BinaryOp::Div => left.checked_div(right),
            BinaryOp::Rem => left.checked_rem(right),
            _ => None,
        }
    }

    pub fn evaluate(self, left: &Omega, right: &Omega) -> Result<Omega> {
        match self {
            BinaryOp::Eq => return Ok(Omega::bool(left == right)),
            BinaryOp::Ne => return Ok(Omega::bool(left != right)),
            BinaryOp::And | BinaryOp::Or => {
                let (l, r) = match (left.as_bool(), right.as_bool()) {
                    (Some(l), Some(r)) => (l, r),
                    _ => return Err(self.mismatch("bool", left, right)),
                };
                return Ok(Omega::bool(if self == BinaryOp::And { l && r } else { l || r }));
            }
            _ => {}
        }

        let (l, r) = match (left.as_int(), right.as_int()) {
            (Some(l), Some(r)) => (l, r),
            _ => return Err(self.mismatch("int", left, right)),
        };
        match self {
            BinaryOp::Lt => Ok(Omega::bool(l < r)),
            BinaryOp::Le => Ok(Omega::bool(l <= r)),
            BinaryOp::Gt => Ok(Omega::bool(l > r)),
            BinaryOp::Ge => Ok(Omega::bool(l >= r)),
            _ => self.arithmetic(l, r).map(Omega::int).ok_or_else(|| {
                let reason = if r == 0 && matches!(self, BinaryOp::Div | BinaryOp::Rem) {
                    "division by zero".to_string()
                } else {
                    format!("{l} {} {r} overflows", self.symbol())
                };
                Error::invalid_operand(self.symbol(), reason)
            }),
        }
    }

    fn mismatch(self, expected: &str, left: &Omega, right: &Omega) -> Error {
        Error::invalid_operand(
            self.symbol(),
            format!("expected {expected} operands, found {} and {}", left.kind(), right.kind()),
        )
    }
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "not",
        }
    }

    pub fn evaluate(self, operand: &Omega) -> Result<Omega> {
        let unsupported = || {
            Error::invalid_operand(self.symbol(), format!("unsupported operand {}", operand.kind()))
        };
        match self {
            UnaryOp::Neg => {
                let n = operand.as_int().ok_or_else(unsupported)?;
                n.checked_neg()
                    .map(Omega::int)
                    .ok_or_else(|| Error::invalid_operand("-", "negation overflows"))
            }
            UnaryOp::Not => operand
                .as_bool()
                .map(|b| Omega::bool(!b))
                .ok_or_else(unsupported),
        }
    }
}

/// Truth value of a branch, loop or assertion condition
pub fn condition(value: &Omega) -> Result<bool> {
    value.as_bool().ok_or_else(|| {
        Error::invalid_operand(
            "condition",
            format!("expected a bool, found {}", value.kind()),
        )
    })
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
