use crate::omega::Omega;
use crate::ops::{BinaryOp, UnaryOp};
use serde::{Deserialize, Serialize};

pub type Expr = Box<ExprKind>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    Literal(Literal),
    /// The current configuration
    State,
    List(ListExpr),
    VarRef(VarRef),
    Binary(Binary),
    Unary(Unary),
    Call(Call),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Int(i64),
    Bool(bool),
    Sym(String),
    Empty,
}

impl Literal {
    pub fn to_omega(&self) -> Omega {
        match self {
            Literal::Int(n) => Omega::int(*n),
            Literal::Bool(b) => Omega::bool(*b),
            Literal::Sym(s) => Omega::sym(s.clone()),
            Literal::Empty => Omega::Empty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListExpr {
    pub items: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binary {
    pub left: Expr,
    pub op: BinaryOp,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unary {
    pub op: UnaryOp,
    pub operand: Expr,
}

/// What a call names: a user function or catalog operator by name, or a
/// catalog operator by numeric id (`o7(...)`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Callee {
    Named(String),
    OperatorId(u32),
}

impl Callee {
    pub fn display_name(&self) -> String {
        match self {
            Callee::Named(name) => name.clone(),
            Callee::OperatorId(id) => format!("#{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub callee: Callee,
    pub args: Vec<Expr>,
}
