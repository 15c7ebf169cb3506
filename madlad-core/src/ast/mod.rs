//! Syntax tree consumed by the compiler and the interpreter.
//!
//! Turning text into a tree is the job of an external [`Frontend`]; the
//! engine itself never inspects raw source.

pub mod build;
mod expr;
mod stmt;

pub use expr::{Binary, Call, Callee, Expr, ExprKind, ListExpr, Literal, Unary, VarRef};
pub use stmt::{
    AssertStmt, BindStmt, ConvergeStmt, ExprStmt, ForStmt, FunctionDecl, IfStmt, OptimizeStmt,
    PrintStmt, ReturnStmt, Stmt, StmtKind, WhileStmt,
};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A whole program
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub statements: Vec<Stmt>,
}

impl Module {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }

    /// Top-level function declarations in source order
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.statements.iter().filter_map(|stmt| match stmt.as_ref() {
            StmtKind::Function(decl) => Some(decl),
            _ => None,
        })
    }

    /// Declaration rules both execution paths enforce before running:
    /// functions are unique, live at top level and name each parameter once
    pub fn check_declarations(&self) -> Result<()> {
        let mut names = HashSet::new();
        for decl in self.functions() {
            if !names.insert(decl.name.as_str()) {
                return Err(Error::malformed(format!(
                    "function '{}' is declared twice",
                    decl.name
                )));
            }
            let mut params = HashSet::new();
            for param in &decl.params {
                if !params.insert(param.as_str()) {
                    return Err(Error::DuplicateParameter {
                        function: decl.name.clone(),
                        name: param.clone(),
                    });
                }
            }
        }
        for stmt in &self.statements {
            match stmt.as_ref() {
                StmtKind::Function(decl) => reject_nested(&decl.body)?,
                _ => reject_nested_in(stmt)?,
            }
        }
        Ok(())
    }
}

fn reject_nested(body: &[Stmt]) -> Result<()> {
    for stmt in body {
        if let StmtKind::Function(decl) = stmt.as_ref() {
            return Err(Error::NestedFunction {
                name: decl.name.clone(),
            });
        }
        reject_nested_in(stmt)?;
    }
    Ok(())
}

fn reject_nested_in(stmt: &Stmt) -> Result<()> {
    match stmt.as_ref() {
        StmtKind::If(stmt) => {
            reject_nested(&stmt.then_body)?;
            reject_nested(&stmt.else_body)
        }
        StmtKind::While(stmt) => reject_nested(&stmt.body),
        StmtKind::For(stmt) => {
            reject_nested(std::slice::from_ref(&stmt.init))?;
            reject_nested(std::slice::from_ref(&stmt.update))?;
            reject_nested(&stmt.body)
        }
        _ => Ok(()),
    }
}

/// One diagnostic reported by a frontend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxError {
    /// 1-based
    pub line: usize,
    /// 1-based
    pub column: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// Grammar collaborator: source text to syntax tree
pub trait Frontend: Send + Sync {
    fn parse(&self, source: &str) -> Result<Module, Vec<SyntaxError>>;
}
