//! Tree-walking interpreter, the reference semantics for compiled runs.
//!
//! Operator calls go through a [`Session`] exactly as in the VM, so both
//! paths produce the same configuration, step count and certificate. The
//! walker also tracks the operand slot every intermediate value would take
//! in a VM frame, so `max_stack_size` fails at the same point on both paths.

mod env;

pub use env::Env;

use crate::ast::{
    Callee, ConvergeStmt, Expr, ExprKind, ForStmt, FunctionDecl, Module, OptimizeStmt, Stmt,
    StmtKind, WhileStmt,
};
use crate::bus::Bus;
use crate::compiler::expr::fold;
use crate::compiler::stmt::{constant_condition, selector_operator};
use crate::error::{Error, Result};
use crate::kernel::Operator;
use crate::omega::Omega;
use crate::ops;
use crate::rings;
use crate::session::{Evaluation, Session};
use madlad_config::{CompilerConfig, LimitConfig};
use std::collections::HashMap;
use tracing::{debug, info, trace};

const TARGET: &str = "madlad::interpreter";

/// Why evaluation of a subtree stopped early
enum Signal {
    Fault(Error),
    /// A duality fixed point ends the whole program
    FixedPoint,
}

impl From<Error> for Signal {
    fn from(error: Error) -> Self {
        Signal::Fault(error)
    }
}

type Eval<T> = std::result::Result<T, Signal>;

/// Statement outcome
enum Flow {
    Normal,
    Return(Omega),
    /// `return` at top level
    Exit,
}

#[derive(Clone, Copy)]
enum Target<'m> {
    Function(&'m FunctionDecl),
    Operator(Operator),
}

pub struct Interpreter<'b> {
    bus: &'b Bus,
    limits: LimitConfig,
    compiler: CompilerConfig,
}

impl<'b> Interpreter<'b> {
    pub fn new(bus: &'b Bus, limits: LimitConfig) -> Self {
        Self {
            bus,
            limits,
            compiler: CompilerConfig::default(),
        }
    }

    /// Account for operand slots the way code compiled with `config` does
    pub fn with_compiler_config(mut self, config: CompilerConfig) -> Self {
        self.compiler = config;
        self
    }

    pub fn evaluate(&self, module: &Module, initial: Omega, certificate: bool) -> Result<Evaluation> {
        module.check_declarations()?;
        initial.check_depth()?;
        let functions = module
            .functions()
            .map(|decl| (decl.name.clone(), decl))
            .collect();
        let session = Session::new(
            self.bus,
            rings::INTERPRETER,
            initial,
            self.limits.max_steps,
            certificate,
        );
        let mut walker = Walker {
            session,
            functions,
            compiler: self.compiler.clone(),
            max_call_depth: self.limits.max_call_depth,
            max_stack_size: self.limits.max_stack_size,
            depth: 1,
        };

        let mut env = Env::new();
        let outcome = walker.exec_all(&mut env, &module.statements);
        let Walker { session, .. } = walker;
        match outcome {
            Ok(_) => {
                debug!(target: TARGET, steps = session.steps(), "program finished");
                Ok(session.finish(false))
            }
            Err(Signal::FixedPoint) => {
                debug!(target: TARGET, steps = session.steps(), "fixed point reached");
                Ok(session.finish(true))
            }
            Err(Signal::Fault(source)) => {
                let error = Error::Step {
                    step: session.steps(),
                    source: Box::new(source),
                };
                debug!(target: TARGET, %error, "program failed");
                Err(session.abort(error))
            }
        }
    }
}

struct Walker<'b, 'm> {
    session: Session<'b>,
    functions: HashMap<String, &'m FunctionDecl>,
    compiler: CompilerConfig,
    max_call_depth: usize,
    max_stack_size: usize,
    depth: usize,
}

impl<'b, 'm> Walker<'b, 'm> {
    /// A value lands in operand slot `height` of the current frame
    fn reserve(&self, height: usize) -> Eval<()> {
        if height >= self.max_stack_size {
            return Err(Error::LimitExceeded {
                what: "operand stack",
                limit: self.max_stack_size,
            }
            .into());
        }
        Ok(())
    }

    fn exec_all(&mut self, env: &mut Env, statements: &'m [Stmt]) -> Eval<Flow> {
        for stmt in statements {
            match self.exec(env, stmt)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_block(&mut self, env: &mut Env, body: &'m [Stmt]) -> Eval<Flow> {
        env.push_scope();
        let flow = self.exec_all(env, body);
        env.pop_scope();
        flow
    }

    fn exec(&mut self, env: &mut Env, stmt: &'m Stmt) -> Eval<Flow> {
        match stmt.as_ref() {
            StmtKind::Bind(bind) => {
                let value = self.eval(env, &bind.value, 0)?;
                if bind.define {
                    env.declare(&bind.name, value);
                } else {
                    env.assign_or_declare(&bind.name, value);
                }
            }
            StmtKind::Expr(stmt) => {
                self.eval(env, &stmt.expression, 0)?;
            }
            StmtKind::If(stmt) => {
                let taken = match constant_condition(&self.compiler, &stmt.condition) {
                    Some(value) => value,
                    None => {
                        let condition = self.eval(env, &stmt.condition, 0)?;
                        ops::condition(&condition)?
                    }
                };
                let body = if taken {
                    &stmt.then_body
                } else {
                    &stmt.else_body
                };
                return self.exec_block(env, body);
            }
            StmtKind::While(stmt) => return self.exec_while(env, stmt),
            StmtKind::For(stmt) => {
                env.push_scope();
                let flow = self.exec_for(env, stmt);
                env.pop_scope();
                return flow;
            }
            StmtKind::Converge(stmt) => self.converge(env, stmt)?,
            StmtKind::Optimize(stmt) => self.optimize(env, stmt)?,
            StmtKind::Assert(stmt) => {
                self.session.begin_observe();
                let condition = self.eval(env, &stmt.condition, 0)?;
                self.session.end_observe()?;
                if !ops::condition(&condition)? {
                    return Err(Error::AssertionFailed {
                        message: stmt.failure_message(),
                    }
                    .into());
                }
            }
            StmtKind::Print(stmt) => {
                let value = self.eval(env, &stmt.value, 0)?;
                info!(target: TARGET, %value, "print");
                self.session.print(value);
            }
            // bodies run only when called
            StmtKind::Function(_) => {}
            StmtKind::Return(ret) => {
                let value = match &ret.value {
                    Some(value) => self.eval(env, value, 0)?,
                    None => {
                        self.reserve(0)?;
                        Omega::Empty
                    }
                };
                return Ok(if self.depth > 1 {
                    Flow::Return(value)
                } else {
                    Flow::Exit
                });
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_while(&mut self, env: &mut Env, stmt: &'m WhileStmt) -> Eval<Flow> {
        if constant_condition(&self.compiler, &stmt.condition) == Some(false) {
            return Ok(Flow::Normal);
        }
        loop {
            let condition = self.eval(env, &stmt.condition, 0)?;
            if !ops::condition(&condition)? {
                return Ok(Flow::Normal);
            }
            match self.exec_block(env, &stmt.body)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
    }

    /// Runs inside the loop's own scope, which holds what `init` declares
    fn exec_for(&mut self, env: &mut Env, stmt: &'m ForStmt) -> Eval<Flow> {
        match self.exec(env, &stmt.init)? {
            Flow::Normal => {}
            flow => return Ok(flow),
        }
        loop {
            let condition = self.eval(env, &stmt.condition, 0)?;
            if !ops::condition(&condition)? {
                return Ok(Flow::Normal);
            }
            match self.exec_block(env, &stmt.body)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
            match self.exec(env, &stmt.update)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
    }

    fn converge(&mut self, env: &mut Env, stmt: &'m ConvergeStmt) -> Eval<()> {
        let unbound = || Error::UnboundVariable {
            name: stmt.target.clone(),
        };
        let mut current = env.get(&stmt.target).cloned().ok_or_else(unbound)?;
        let step = self.resolve(&stmt.step, 1)?;
        // the iteration counter is compared against the limit in two slots
        self.reserve(1)?;

        for iteration in 0..stmt.limit {
            let next = self.call(step, vec![current.clone()], 0)?;
            if next == current {
                trace!(target: TARGET, target = %stmt.target, iteration, "converged");
                break;
            }
            current = next;
            if !env.assign(&stmt.target, current.clone()) {
                return Err(unbound().into());
            }
        }
        Ok(())
    }

    fn optimize(&mut self, env: &mut Env, stmt: &'m OptimizeStmt) -> Eval<()> {
        let selector = selector_operator(&stmt.selector)?;
        let candidates = self.eval_all(env, &stmt.candidates, 0)?;
        let candidates = Omega::Seq(candidates);
        candidates.check_depth()?;
        self.reserve(0)?;
        let chosen = self.call(Target::Operator(selector), vec![candidates], 0)?;
        env.assign_or_declare(&stmt.target, chosen);
        Ok(())
    }

    /// Evaluate `exprs` into consecutive slots starting at `height`
    fn eval_all(&mut self, env: &mut Env, exprs: &'m [Expr], height: usize) -> Eval<Vec<Omega>> {
        let mut values = Vec::with_capacity(exprs.len());
        for (offset, expr) in exprs.iter().enumerate() {
            values.push(self.eval(env, expr, height + offset)?);
        }
        Ok(values)
    }

    /// Evaluate `expr` into operand slot `height`
    fn eval(&mut self, env: &mut Env, expr: &'m Expr, height: usize) -> Eval<Omega> {
        if let Some(value) = fold(&self.compiler, expr) {
            self.reserve(height)?;
            return Ok(value);
        }
        let value = match expr.as_ref() {
            ExprKind::Literal(literal) => {
                self.reserve(height)?;
                literal.to_omega()
            }
            ExprKind::State => {
                self.reserve(height)?;
                self.session.state().clone()
            }
            ExprKind::List(list) => {
                let items = self.eval_all(env, &list.items, height)?;
                let seq = Omega::Seq(items);
                seq.check_depth()?;
                self.reserve(height)?;
                seq
            }
            ExprKind::VarRef(var_ref) => {
                let value = env
                    .get(&var_ref.name)
                    .cloned()
                    .ok_or_else(|| Error::UnboundVariable {
                        name: var_ref.name.clone(),
                    })?;
                self.reserve(height)?;
                value
            }
            ExprKind::Binary(binary) => {
                let left = self.eval(env, &binary.left, height)?;
                let right = self.eval(env, &binary.right, height + 1)?;
                binary.op.evaluate(&left, &right)?
            }
            ExprKind::Unary(unary) => {
                let operand = self.eval(env, &unary.operand, height)?;
                unary.op.evaluate(&operand)?
            }
            ExprKind::Call(call) => {
                let target = self.resolve(&call.callee, call.args.len())?;
                let args = self.eval_all(env, &call.args, height)?;
                self.call(target, args, height)?
            }
        };
        Ok(value)
    }

    /// Same resolution and arity rules as the compiler
    fn resolve(&self, callee: &Callee, argc: usize) -> Result<Target<'m>> {
        let target = match callee {
            Callee::Named(name) => match self.functions.get(name) {
                Some(decl) => Target::Function(*decl),
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
            Target::Function(decl) if decl.params.len() != argc => Err(Error::ArityMismatch {
                callee: decl.name.clone(),
                expected: decl.params.len(),
                found: argc,
            }),
            Target::Operator(op) if op.arity() != argc.saturating_sub(1) => {
                Err(Error::ArityMismatch {
                    callee: op.name().to_string(),
                    expected: op.arity(),
                    found: argc.saturating_sub(1),
                })
            }
            _ => Ok(target),
        }
    }

    /// Apply `target`; its result lands in slot `height` of the caller
    fn call(&mut self, target: Target<'m>, args: Vec<Omega>, height: usize) -> Eval<Omega> {
        match target {
            Target::Operator(op) => {
                let invocation = self.session.invoke(u32::from(op.id()), args)?;
                self.reserve(height)?;
                if invocation.terminal {
                    return Err(Signal::FixedPoint);
                }
                Ok(invocation.output)
            }
            Target::Function(decl) => {
                if self.depth >= self.max_call_depth {
                    return Err(Error::LimitExceeded {
                        what: "call depth",
                        limit: self.max_call_depth,
                    }
                    .into());
                }
                let mut env = Env::with_params(&decl.params, args);
                self.depth += 1;
                let flow = self.exec_all(&mut env, &decl.body);
                // falling off the end returns `empty` from the callee's first slot
                let flow = flow.and_then(|flow| match flow {
                    Flow::Normal => self.reserve(0).map(|()| flow),
                    other => Ok(other),
                });
                self.depth -= 1;
                let value = match flow? {
                    Flow::Return(value) => value,
                    Flow::Normal | Flow::Exit => Omega::Empty,
                };
                self.reserve(height)?;
                Ok(value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::*;
    use crate::ops::BinaryOp;
    use crate::rings::standard_bus;
    use madlad_config::CompilerConfig;

    fn evaluate(module: &Module) -> Result<Evaluation> {
        let bus = standard_bus(CompilerConfig::default(), LimitConfig::default()).unwrap();
        Interpreter::new(&bus, LimitConfig::default()).evaluate(module, Omega::Empty, true)
    }

    #[test]
    fn test_functions_return_values() {
        let m = module(vec![
            function(
                "twice",
                &["x"],
                vec![ret(Some(call("wrap", vec![call("wrap", vec![var("x")])])))],
            ),
            define("r", call("twice", vec![int(1)])),
            assert(binary(var("r"), BinaryOp::Eq, call("nest", vec![int(1), int(2)]))),
        ]);
        let eval = evaluate(&m).unwrap();
        assert_eq!(eval.output, Omega::int(1).wrap().wrap());
        assert_eq!(eval.steps, 2);
    }

    #[test]
    fn test_converge_stops_at_fixed_point() {
        let m = module(vec![
            define("x", int(5)),
            converge("x", "decrement", 100),
            expr(var("x")),
        ]);
        let eval = evaluate(&m).unwrap();
        // five real steps plus the one that proved the fixed point
        assert_eq!(eval.steps, 6);
        assert_eq!(eval.output, Omega::int(0));
    }

    #[test]
    fn test_converge_respects_limit() {
        let m = module(vec![define("x", int(5)), converge("x", "decrement", 2)]);
        let eval = evaluate(&m).unwrap();
        assert_eq!(eval.steps, 2);
        assert_eq!(eval.output, Omega::int(3));
    }

    #[test]
    fn test_duality_fixed_point_halts() {
        let m = module(vec![
            expr(call("wrap", vec![])),
            expr(call("dual", vec![empty()])),
            expr(call("wrap", vec![])),
        ]);
        let eval = evaluate(&m).unwrap();
        assert!(eval.halted_early);
        assert_eq!(eval.steps, 2);
        assert_eq!(eval.output, Omega::Empty);
        assert!(eval.certificate.unwrap().is_complete());
    }

    #[test]
    fn test_top_level_return_ends_program() {
        let m = module(vec![
            expr(call("wrap", vec![])),
            if_else(boolean(true), vec![ret(None)], vec![]),
            expr(call("wrap", vec![])),
        ]);
        let eval = evaluate(&m).unwrap();
        assert_eq!(eval.steps, 1);
        assert!(!eval.halted_early);
    }

    #[test]
    fn test_errors_carry_step_and_partial_certificate() {
        let m = module(vec![
            expr(call("wrap", vec![])),
            expr(call("unwrap", vec![int(3)])),
        ]);
        let err = evaluate(&m).unwrap_err();
        assert_eq!(err.step(), Some(1));
        assert_eq!(err.kind(), "InvalidOperand");
        let partial = err.partial_certificate().unwrap();
        assert_eq!(partial.len(), 1);
        assert!(!partial.is_complete());
    }

    #[test]
    fn test_unknown_operator_id() {
        let m = module(vec![expr(call_id(77, vec![]))]);
        let err = evaluate(&m).unwrap_err();
        assert_eq!(
            err.root(),
            &Error::UnknownOperator {
                operator: "#77".into()
            }
        );
    }

    #[test]
    fn test_nested_function_rejected_before_running() {
        let m = module(vec![
            expr(call("wrap", vec![])),
            while_loop(boolean(false), vec![function("inner", &[], vec![])]),
        ]);
        assert_eq!(
            evaluate(&m).unwrap_err(),
            Error::NestedFunction {
                name: "inner".into()
            }
        );
    }

    #[test]
    fn test_for_loop_scopes_its_counter() {
        let m = module(vec![
            for_loop(
                bind("i", int(0)),
                binary(var("i"), BinaryOp::Lt, int(3)),
                bind("i", binary(var("i"), BinaryOp::Add, int(1))),
                vec![expr(call("wrap", vec![]))],
            ),
            expr(var("i")),
        ]);
        // `i` is gone once the loop ends
        assert_eq!(
            evaluate(&m).unwrap_err().root(),
            &Error::UnboundVariable { name: "i".into() }
        );

        let m = module(vec![for_loop(
            bind("i", int(0)),
            binary(var("i"), BinaryOp::Lt, int(3)),
            bind("i", binary(var("i"), BinaryOp::Add, int(1))),
            vec![expr(call("wrap", vec![]))],
        )]);
        let eval = evaluate(&m).unwrap();
        assert_eq!(eval.steps, 3);
        assert_eq!(eval.output, Omega::Empty.wrap().wrap().wrap());
    }

    #[test]
    fn test_print_collects_values() {
        let m = module(vec![
            print(int(1)),
            expr(call("wrap", vec![])),
            print(state()),
        ]);
        let eval = evaluate(&m).unwrap();
        assert_eq!(eval.printed, vec![Omega::int(1), Omega::Empty.wrap()]);
        assert_eq!(eval.steps, 1);
    }

    #[test]
    fn test_duplicate_parameter_rejected() {
        let m = module(vec![
            function("f", &["a", "a"], vec![ret(Some(var("a")))]),
            expr(call("f", vec![int(1), int(2)])),
        ]);
        assert_eq!(
            evaluate(&m).unwrap_err(),
            Error::DuplicateParameter {
                function: "f".into(),
                name: "a".into()
            }
        );
    }

    #[test]
    fn test_deep_values_fail_with_typed_error() {
        let m = module(vec![
            define("x", empty()),
            while_loop(boolean(true), vec![bind("x", list(vec![var("x")]))]),
        ]);
        assert_eq!(
            evaluate(&m).unwrap_err().root(),
            &Error::LimitExceeded {
                what: "value depth",
                limit: crate::omega::MAX_DEPTH
            }
        );
    }

    #[test]
    fn test_operand_stack_limit() {
        let bus = standard_bus(CompilerConfig::default(), LimitConfig::default()).unwrap();
        let limits = LimitConfig {
            max_stack_size: 4,
            ..LimitConfig::default()
        };
        let interpreter = Interpreter::new(&bus, limits);

        let fits = module(vec![expr(list(vec![int(1), int(2), int(3), int(4)]))]);
        assert!(interpreter.evaluate(&fits, Omega::Empty, false).is_ok());

        let spills = module(vec![expr(list(vec![int(1), int(2), int(3), int(4), int(5)]))]);
        assert_eq!(
            interpreter
                .evaluate(&spills, Omega::Empty, false)
                .unwrap_err()
                .root(),
            &Error::LimitExceeded {
                what: "operand stack",
                limit: 4
            }
        );
    }
}
