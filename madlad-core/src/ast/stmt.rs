use super::expr::{Callee, Expr};
use serde::{Deserialize, Serialize};

pub type Stmt = Box<StmtKind>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StmtKind {
    Bind(BindStmt),
    Expr(ExprStmt),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Converge(ConvergeStmt),
    Optimize(OptimizeStmt),
    Assert(AssertStmt),
    Print(PrintStmt),
    Function(FunctionDecl),
    Return(ReturnStmt),
}

/// `name := value`, or `define name := value` which always declares in the
/// current scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindStmt {
    pub name: String,
    pub value: Expr,
    pub define: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprStmt {
    pub expression: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_body: Vec<Stmt>,
    pub else_body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Vec<Stmt>,
}

/// `for init; condition; update { body }`. `init` is scoped to the loop;
/// `update` runs after every completed pass of the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStmt {
    pub init: Stmt,
    pub condition: Expr,
    pub update: Stmt,
    pub body: Vec<Stmt>,
}

/// `converge target with step limit N`: apply `step(target)` at most `limit`
/// times, stopping early once the value no longer changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergeStmt {
    pub target: String,
    pub step: Callee,
    pub limit: u32,
}

/// `optimize target := selector over a, b, c`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeStmt {
    pub target: String,
    pub selector: String,
    pub candidates: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertStmt {
    pub condition: Expr,
    pub message: Option<String>,
}

impl AssertStmt {
    pub fn failure_message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| "condition evaluated to false".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintStmt {
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
}
