//! Expression lowering: operands first, then the operation.

use super::{var, Compiler, FunctionSig};
use crate::ast::{Callee, Expr, ExprKind, Literal};
use crate::bytecode::Instruction;
use crate::error::{Error, Result};
use crate::kernel::Operator;
use crate::omega::Omega;
use crate::ops::UnaryOp;
use madlad_config::CompilerConfig;

/// What a call site resolves to
#[derive(Debug, Clone, Copy)]
pub enum Target {
    Function(FunctionSig),
    Operator(Operator),
}

pub fn compile_expr(compiler: &mut Compiler, expr: &Expr) -> Result<()> {
    match expr.as_ref() {
        ExprKind::Literal(literal) => {
            compiler.emit_constant(literal.to_omega());
        }
        ExprKind::State => {
            compiler.emit(Instruction::LoadState);
        }
        ExprKind::List(list) => {
            for item in &list.items {
                compile_expr(compiler, item)?;
            }
            let n = u32::try_from(list.items.len()).map_err(|_| Error::LimitExceeded {
                what: "list length",
                limit: u32::MAX as usize,
            })?;
            compiler.emit(Instruction::BuildSeq(n));
        }
        ExprKind::VarRef(var_ref) => {
            let slot = var::resolve_local(compiler, &var_ref.name).ok_or_else(|| {
                Error::UnboundVariable {
                    name: var_ref.name.clone(),
                }
            })?;
            compiler.emit(Instruction::Load(slot));
        }
        ExprKind::Binary(binary) => {
            if let Some(value) = fold(compiler.config, expr) {
                compiler.emit_constant(value);
                return Ok(());
            }
            compile_expr(compiler, &binary.left)?;
            compile_expr(compiler, &binary.right)?;
            compiler.emit(Instruction::Binary(binary.op));
        }
        ExprKind::Unary(unary) => {
            if let Some(value) = fold(compiler.config, expr) {
                compiler.emit_constant(value);
                return Ok(());
            }
            compile_expr(compiler, &unary.operand)?;
            compiler.emit(Instruction::Unary(unary.op));
        }
        ExprKind::Call(call) => {
            let target = resolve_callee(compiler, &call.callee, call.args.len())?;
            for arg in &call.args {
                compile_expr(compiler, arg)?;
            }
            emit_call(compiler, target, call.args.len())?;
        }
    }
    Ok(())
}

/// Resolve a callee and check the operand count `argc` against it
pub fn resolve_callee(compiler: &Compiler, callee: &Callee, argc: usize) -> Result<Target> {
    let target = match callee {
        Callee::Named(name) => match compiler.functions.get(name) {
            Some(sig) => Target::Function(*sig),
            None => Target::Operator(Operator::from_name(name).ok_or_else(|| {
                Error::UnknownOperator {
                    operator: name.clone(),
                }
            })?),
        },
        Callee::OperatorId(id) => {
            Target::Operator(Operator::from_id(*id).ok_or_else(|| Error::UnknownOperator {
                operator: callee.display_name(),
            })?)
        }
    };

    match target {
        Target::Function(sig) if sig.arity != argc => Err(Error::ArityMismatch {
            callee: callee.display_name(),
            expected: sig.arity,
            found: argc,
        }),
        // the first operand is the subject, the rest are arguments
        Target::Operator(op) if op.arity() != argc.saturating_sub(1) => Err(Error::ArityMismatch {
            callee: op.name().to_string(),
            expected: op.arity(),
            found: argc.saturating_sub(1),
        }),
        _ => Ok(target),
    }
}

pub fn emit_call(compiler: &mut Compiler, target: Target, argc: usize) -> Result<()> {
    let argc = u8::try_from(argc).map_err(|_| Error::LimitExceeded {
        what: "argument count",
        limit: u8::MAX as usize,
    })?;
    match target {
        Target::Function(sig) => compiler.emit(Instruction::CallFunction {
            function: sig.index,
            argc,
        }),
        Target::Operator(op) => compiler.emit(Instruction::CallOperator {
            operator: op.id(),
            argc,
        }),
    };
    Ok(())
}

fn int_literal(expr: &Expr) -> Option<i64> {
    match expr.as_ref() {
        ExprKind::Literal(Literal::Int(n)) => Some(*n),
        _ => None,
    }
}

/// Value of `expr` when it is arithmetic on integer literals that the
/// compiler folds into one constant. Operations that would fail at run time
/// are left for the VM to report.
pub fn fold(config: &CompilerConfig, expr: &Expr) -> Option<Omega> {
    if !config.fold_constants {
        return None;
    }
    match expr.as_ref() {
        ExprKind::Binary(binary) if binary.op.is_arithmetic() => {
            let left = int_literal(&binary.left)?;
            let right = int_literal(&binary.right)?;
            binary.op.arithmetic(left, right).map(Omega::int)
        }
        ExprKind::Unary(unary) if unary.op == UnaryOp::Neg => {
            int_literal(&unary.operand)?.checked_neg().map(Omega::int)
        }
        _ => None,
    }
}
