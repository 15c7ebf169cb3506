//! Terse constructors for building trees by hand.

use super::*;
use crate::ops::{BinaryOp, UnaryOp};

pub fn int(value: i64) -> Expr {
    Box::new(ExprKind::Literal(Literal::Int(value)))
}

pub fn boolean(value: bool) -> Expr {
    Box::new(ExprKind::Literal(Literal::Bool(value)))
}

pub fn sym(name: &str) -> Expr {
    Box::new(ExprKind::Literal(Literal::Sym(name.to_string())))
}

pub fn empty() -> Expr {
    Box::new(ExprKind::Literal(Literal::Empty))
}

pub fn state() -> Expr {
    Box::new(ExprKind::State)
}

pub fn var(name: &str) -> Expr {
    Box::new(ExprKind::VarRef(VarRef {
        name: name.to_string(),
    }))
}

pub fn list(items: Vec<Expr>) -> Expr {
    Box::new(ExprKind::List(ListExpr { items }))
}

pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Box::new(ExprKind::Binary(Binary { left, op, right }))
}

pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    Box::new(ExprKind::Unary(Unary { op, operand }))
}

pub fn call(name: &str, args: Vec<Expr>) -> Expr {
    Box::new(ExprKind::Call(Call {
        callee: Callee::Named(name.to_string()),
        args,
    }))
}

pub fn call_id(id: u32, args: Vec<Expr>) -> Expr {
    Box::new(ExprKind::Call(Call {
        callee: Callee::OperatorId(id),
        args,
    }))
}

pub fn bind(name: &str, value: Expr) -> Stmt {
    Box::new(StmtKind::Bind(BindStmt {
        name: name.to_string(),
        value,
        define: false,
    }))
}

pub fn define(name: &str, value: Expr) -> Stmt {
    Box::new(StmtKind::Bind(BindStmt {
        name: name.to_string(),
        value,
        define: true,
    }))
}

pub fn expr(expression: Expr) -> Stmt {
    Box::new(StmtKind::Expr(ExprStmt { expression }))
}

pub fn if_else(condition: Expr, then_body: Vec<Stmt>, else_body: Vec<Stmt>) -> Stmt {
    Box::new(StmtKind::If(IfStmt {
        condition,
        then_body,
        else_body,
    }))
}

pub fn while_loop(condition: Expr, body: Vec<Stmt>) -> Stmt {
    Box::new(StmtKind::While(WhileStmt { condition, body }))
}

pub fn for_loop(init: Stmt, condition: Expr, update: Stmt, body: Vec<Stmt>) -> Stmt {
    Box::new(StmtKind::For(ForStmt {
        init,
        condition,
        update,
        body,
    }))
}

pub fn converge(target: &str, step: &str, limit: u32) -> Stmt {
    Box::new(StmtKind::Converge(ConvergeStmt {
        target: target.to_string(),
        step: Callee::Named(step.to_string()),
        limit,
    }))
}

pub fn optimize(target: &str, selector: &str, candidates: Vec<Expr>) -> Stmt {
    Box::new(StmtKind::Optimize(OptimizeStmt {
        target: target.to_string(),
        selector: selector.to_string(),
        candidates,
    }))
}

pub fn assert(condition: Expr) -> Stmt {
    Box::new(StmtKind::Assert(AssertStmt {
        condition,
        message: None,
    }))
}

pub fn print(value: Expr) -> Stmt {
    Box::new(StmtKind::Print(PrintStmt { value }))
}

pub fn function(name: &str, params: &[&str], body: Vec<Stmt>) -> Stmt {
    Box::new(StmtKind::Function(FunctionDecl {
        name: name.to_string(),
        params: params.iter().map(|p| p.to_string()).collect(),
        body,
    }))
}

pub fn ret(value: Option<Expr>) -> Stmt {
    Box::new(StmtKind::Return(ReturnStmt { value }))
}

pub fn module(statements: Vec<Stmt>) -> Module {
    Module::new(statements)
}
