//! Statement lowering.

use super::expr::{self, Target};
use super::{var, Compiler};
use crate::ast::{
    ConvergeStmt, Expr, ExprKind, ForStmt, IfStmt, Literal, OptimizeStmt, Stmt, StmtKind,
    WhileStmt,
};
use crate::bytecode::Instruction;
use crate::error::{Error, Result};
use crate::kernel::Operator;
use crate::omega::Omega;
use crate::ops::BinaryOp;
use madlad_config::CompilerConfig;

pub fn compile_stmt(compiler: &mut Compiler, stmt: &Stmt) -> Result<()> {
    match stmt.as_ref() {
        StmtKind::Bind(bind) => {
            // the value cannot see the name it is bound to
            expr::compile_expr(compiler, &bind.value)?;
            let slot = if bind.define {
                var::declare(compiler, &bind.name)?
            } else {
                var::assign_or_declare(compiler, &bind.name)?
            };
            compiler.emit(Instruction::Store(slot));
        }

        StmtKind::Expr(stmt) => {
            expr::compile_expr(compiler, &stmt.expression)?;
            compiler.emit(Instruction::Pop);
        }

        StmtKind::If(stmt) => compile_if(compiler, stmt)?,

        StmtKind::While(stmt) => compile_while(compiler, stmt)?,

        StmtKind::For(stmt) => compile_for(compiler, stmt)?,

        StmtKind::Converge(stmt) => compile_converge(compiler, stmt)?,

        StmtKind::Optimize(stmt) => compile_optimize(compiler, stmt)?,

        StmtKind::Assert(stmt) => {
            compiler.emit(Instruction::BeginObserve);
            expr::compile_expr(compiler, &stmt.condition)?;
            compiler.emit(Instruction::EndObserve);
            let message = compiler.program.add_constant(Omega::sym(stmt.failure_message()));
            compiler.emit(Instruction::Assert { message });
        }

        StmtKind::Print(stmt) => {
            expr::compile_expr(compiler, &stmt.value)?;
            compiler.emit(Instruction::Print);
        }

        StmtKind::Function(decl) => {
            // top-level bodies are emitted after main code
            if compiler.in_function || compiler.scope_depth > 0 {
                return Err(Error::NestedFunction {
                    name: decl.name.clone(),
                });
            }
        }

        StmtKind::Return(ret) => {
            match &ret.value {
                Some(value) => expr::compile_expr(compiler, value)?,
                None => {
                    compiler.emit_constant(Omega::Empty);
                }
            }
            if compiler.in_function {
                compiler.emit(Instruction::Return);
            } else {
                compiler.emit(Instruction::Pop);
                compiler.emit(Instruction::Halt);
            }
        }
    }
    Ok(())
}

fn compile_block(compiler: &mut Compiler, body: &[Stmt]) -> Result<()> {
    var::begin_scope(compiler);
    for stmt in body {
        compile_stmt(compiler, stmt)?;
    }
    var::end_scope(compiler);
    Ok(())
}

/// The value of a boolean literal condition when dead branches are dropped
pub fn constant_condition(config: &CompilerConfig, condition: &Expr) -> Option<bool> {
    if !config.eliminate_dead_code {
        return None;
    }
    match condition.as_ref() {
        ExprKind::Literal(Literal::Bool(value)) => Some(*value),
        _ => None,
    }
}

fn compile_if(compiler: &mut Compiler, stmt: &IfStmt) -> Result<()> {
    match constant_condition(compiler.config, &stmt.condition) {
        Some(true) => return compile_block(compiler, &stmt.then_body),
        Some(false) => return compile_block(compiler, &stmt.else_body),
        None => {}
    }
    expr::compile_expr(compiler, &stmt.condition)?;
    let else_jump = compiler.emit_jump(true);
    compile_block(compiler, &stmt.then_body)?;

    if stmt.else_body.is_empty() {
        compiler.patch_jump(else_jump)?;
        return Ok(());
    }
    let end_jump = compiler.emit_jump(false);
    compiler.patch_jump(else_jump)?;
    compile_block(compiler, &stmt.else_body)?;
    compiler.patch_jump(end_jump)
}

fn compile_while(compiler: &mut Compiler, stmt: &WhileStmt) -> Result<()> {
    if constant_condition(compiler.config, &stmt.condition) == Some(false) {
        return Ok(());
    }
    let loop_start = compiler.here()?;
    expr::compile_expr(compiler, &stmt.condition)?;
    let exit_jump = compiler.emit_jump(true);
    compile_block(compiler, &stmt.body)?;
    compiler.emit(Instruction::Jump(loop_start));
    compiler.patch_jump(exit_jump)
}

/// ```text
///       init
/// loop: if !condition goto exit
///       body
///       update
///       goto loop
/// exit:
/// ```
fn compile_for(compiler: &mut Compiler, stmt: &ForStmt) -> Result<()> {
    var::begin_scope(compiler);
    compile_stmt(compiler, &stmt.init)?;
    let loop_start = compiler.here()?;
    expr::compile_expr(compiler, &stmt.condition)?;
    let exit_jump = compiler.emit_jump(true);
    compile_block(compiler, &stmt.body)?;
    compile_stmt(compiler, &stmt.update)?;
    compiler.emit(Instruction::Jump(loop_start));
    compiler.patch_jump(exit_jump)?;
    var::end_scope(compiler);
    Ok(())
}

/// Caller-driven iteration:
///
/// ```text
///       counter := 0
/// loop: if !(counter < limit) goto exit
///       next := step(x)
///       if next == x goto exit
///       x := next; counter := counter + 1
///       goto loop
/// exit:
/// ```
fn compile_converge(compiler: &mut Compiler, stmt: &ConvergeStmt) -> Result<()> {
    let target_slot = var::resolve_local(compiler, &stmt.target).ok_or_else(|| {
        Error::UnboundVariable {
            name: stmt.target.clone(),
        }
    })?;
    let step = expr::resolve_callee(compiler, &stmt.step, 1)?;

    var::begin_scope(compiler);
    let counter = var::hidden(compiler, "counter")?;
    let next = var::hidden(compiler, "next")?;

    compiler.emit_constant(Omega::int(0));
    compiler.emit(Instruction::Store(counter));

    let loop_start = compiler.here()?;
    compiler.emit(Instruction::Load(counter));
    compiler.emit_constant(Omega::int(i64::from(stmt.limit)));
    compiler.emit(Instruction::Binary(BinaryOp::Lt));
    let exhausted = compiler.emit_jump(true);

    compiler.emit(Instruction::Load(target_slot));
    expr::emit_call(compiler, step, 1)?;
    compiler.emit(Instruction::Store(next));

    compiler.emit(Instruction::Load(next));
    compiler.emit(Instruction::Load(target_slot));
    compiler.emit(Instruction::Binary(BinaryOp::Ne));
    let converged = compiler.emit_jump(true);

    compiler.emit(Instruction::Load(next));
    compiler.emit(Instruction::Store(target_slot));
    compiler.emit(Instruction::Load(counter));
    compiler.emit_constant(Omega::int(1));
    compiler.emit(Instruction::Binary(BinaryOp::Add));
    compiler.emit(Instruction::Store(counter));
    compiler.emit(Instruction::Jump(loop_start));

    compiler.patch_jump(exhausted)?;
    compiler.patch_jump(converged)?;
    var::end_scope(compiler);
    Ok(())
}

fn compile_optimize(compiler: &mut Compiler, stmt: &OptimizeStmt) -> Result<()> {
    let selector = selector_operator(&stmt.selector)?;
    for candidate in &stmt.candidates {
        expr::compile_expr(compiler, candidate)?;
    }
    let n = u32::try_from(stmt.candidates.len()).map_err(|_| Error::LimitExceeded {
        what: "candidate count",
        limit: u32::MAX as usize,
    })?;
    compiler.emit(Instruction::BuildSeq(n));
    expr::emit_call(compiler, Target::Operator(selector), 1)?;
    let slot = var::assign_or_declare(compiler, &stmt.target)?;
    compiler.emit(Instruction::Store(slot));
    Ok(())
}

/// The selection operator named by an `optimize` statement
pub fn selector_operator(name: &str) -> Result<Operator> {
    let operator = Operator::from_name(name).ok_or_else(|| Error::UnknownOperator {
        operator: name.to_string(),
    })?;
    if !operator.is_selector() {
        return Err(Error::invalid_operand(name, "not a selection operator"));
    }
    Ok(operator)
}
