//! Syntax tree → bytecode compiler.
//!
//! Top-level function declarations are collected first so calls may refer
//! to functions declared later. Main code is emitted from address 0 and
//! ends with `Halt`; each function body follows it and its entry is patched
//! into the function table once its address is known.

pub mod expr;
pub mod stmt;
pub mod var;

pub use var::Local;

use crate::ast::{FunctionDecl, Module};
use crate::bytecode::{FunctionEntry, Instruction, Program, UNPATCHED};
use crate::error::{Error, Result};
use crate::omega::Omega;
use madlad_config::CompilerConfig;
use std::collections::HashMap;
use tracing::{debug, trace};

const TARGET: &str = "madlad::compiler";

/// Signature of a user function, known before any body is compiled
#[derive(Debug, Clone, Copy)]
pub struct FunctionSig {
    pub index: u16,
    pub arity: usize,
}

pub struct Compiler<'c> {
    pub(crate) config: &'c CompilerConfig,
    pub(crate) program: Program,
    pub(crate) locals: Vec<Local>,
    pub(crate) scope_depth: usize,
    pub(crate) max_slots: usize,
    pub(crate) functions: HashMap<String, FunctionSig>,
    pub(crate) in_function: bool,
}

impl<'c> Compiler<'c> {
    pub fn new(config: &'c CompilerConfig) -> Self {
        Self {
            config,
            program: Program::default(),
            locals: Vec::new(),
            scope_depth: 0,
            max_slots: 0,
            functions: HashMap::new(),
            in_function: false,
        }
    }

    pub fn compile(mut self, module: &Module) -> Result<Program> {
        self.declare_functions(module)?;

        for statement in &module.statements {
            stmt::compile_stmt(&mut self, statement)?;
        }
        self.emit(Instruction::Halt);
        self.program.main_slots = self.max_slots;

        for (index, decl) in module.functions().enumerate() {
            self.compile_function(index, decl)?;
        }

        debug!(
            target: TARGET,
            instructions = self.program.code.len(),
            constants = self.program.constants.len(),
            functions = self.program.functions.len(),
            "compiled"
        );
        if self.config.emit_debug_info {
            debug!(target: TARGET, "\n{}", self.program.disassemble());
        }
        Ok(self.program)
    }

    fn declare_functions(&mut self, module: &Module) -> Result<()> {
        module.check_declarations()?;
        for (index, decl) in module.functions().enumerate() {
            let index = u16::try_from(index).map_err(|_| Error::LimitExceeded {
                what: "function",
                limit: u16::MAX as usize,
            })?;
            self.functions.insert(
                decl.name.clone(),
                FunctionSig {
                    index,
                    arity: decl.params.len(),
                },
            );
            self.program.functions.push(FunctionEntry {
                name: decl.name.clone(),
                entry: UNPATCHED as usize,
                arity: decl.params.len(),
                slots: 0,
            });
        }
        Ok(())
    }

    fn compile_function(&mut self, index: usize, decl: &FunctionDecl) -> Result<()> {
        self.locals.clear();
        self.scope_depth = 0;
        self.max_slots = 0;
        self.in_function = true;

        let entry = self.program.code.len();
        for param in &decl.params {
            var::declare(self, param)?;
        }
        for statement in &decl.body {
            stmt::compile_stmt(self, statement)?;
        }
        // implicit `return empty`
        self.emit_constant(Omega::Empty);
        self.emit(Instruction::Return);

        let function = &mut self.program.functions[index];
        function.entry = entry;
        function.slots = self.max_slots;
        trace!(target: TARGET, function = %decl.name, entry, slots = self.max_slots, "function emitted");
        self.in_function = false;
        Ok(())
    }

    pub(crate) fn emit(&mut self, instruction: Instruction) -> usize {
        self.program.emit(instruction)
    }

    pub(crate) fn emit_constant(&mut self, value: Omega) -> usize {
        let index = self.program.add_constant(value);
        self.emit(Instruction::PushConst(index))
    }

    /// Emit a forward jump whose target is patched later
    pub(crate) fn emit_jump(&mut self, conditional: bool) -> usize {
        if conditional {
            self.emit(Instruction::JumpIfFalse(UNPATCHED))
        } else {
            self.emit(Instruction::Jump(UNPATCHED))
        }
    }

    /// Point the jump at `at` to the next instruction
    pub(crate) fn patch_jump(&mut self, at: usize) -> Result<()> {
        let target = self.here()?;
        match self.program.code.get_mut(at) {
            Some(Instruction::Jump(t)) | Some(Instruction::JumpIfFalse(t)) => {
                *t = target;
                Ok(())
            }
            _ => Err(Error::malformed(format!("no jump to patch at {at}"))),
        }
    }

    /// Address of the next instruction
    pub(crate) fn here(&self) -> Result<u32> {
        u32::try_from(self.program.code.len()).map_err(|_| Error::LimitExceeded {
            what: "code size",
            limit: u32::MAX as usize,
        })
    }
}

pub fn compile(module: &Module, config: &CompilerConfig) -> Result<Program> {
    Compiler::new(config).compile(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::*;
    use crate::kernel::Operator;
    use crate::ops::BinaryOp;

    fn compile_default(module: &Module) -> Result<Program> {
        compile(module, &CompilerConfig::default())
    }

    #[test]
    fn test_operator_call_with_state_subject() {
        let program = compile_default(&module(vec![expr(call("wrap", vec![]))])).unwrap();
        assert_eq!(
            program.code,
            vec![
                Instruction::CallOperator {
                    operator: Operator::Wrap.id(),
                    argc: 0
                },
                Instruction::Pop,
                Instruction::Halt,
            ]
        );
    }

    #[test]
    fn test_constant_folding() {
        let m = module(vec![define("x", binary(int(2), BinaryOp::Mul, int(21)))]);
        let program = compile_default(&m).unwrap();
        assert_eq!(program.constants, vec![Omega::int(42)]);
        assert_eq!(program.code[0], Instruction::PushConst(0));
        assert_eq!(program.code[1], Instruction::Store(0));

        let config = CompilerConfig {
            fold_constants: false,
            ..CompilerConfig::default()
        };
        let unfolded = compile(&m, &config).unwrap();
        assert_eq!(unfolded.code[2], Instruction::Binary(BinaryOp::Mul));
    }

    #[test]
    fn test_division_by_zero_is_not_folded() {
        let m = module(vec![define("x", binary(int(1), BinaryOp::Div, int(0)))]);
        let program = compile_default(&m).unwrap();
        assert!(program.code.contains(&Instruction::Binary(BinaryOp::Div)));
    }

    #[test]
    fn test_unbound_variable() {
        let err = compile_default(&module(vec![expr(var("ghost"))])).unwrap_err();
        assert_eq!(err, Error::UnboundVariable { name: "ghost".into() });
    }

    #[test]
    fn test_unknown_operator_name_and_id() {
        let err = compile_default(&module(vec![expr(call("frobnicate", vec![]))])).unwrap_err();
        assert_eq!(err.kind(), "UnknownOperator");
        let err = compile_default(&module(vec![expr(call_id(41, vec![]))])).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownOperator {
                operator: "#41".into()
            }
        );
    }

    #[test]
    fn test_operator_arity_checked() {
        let err =
            compile_default(&module(vec![expr(call("pair", vec![int(1)]))])).unwrap_err();
        assert_eq!(
            err,
            Error::ArityMismatch {
                callee: "pair".into(),
                expected: 1,
                found: 0
            }
        );
    }

    #[test]
    fn test_function_arity_checked() {
        let m = module(vec![
            function("f", &["a", "b"], vec![ret(Some(var("a")))]),
            expr(call("f", vec![int(1)])),
        ]);
        let err = compile_default(&m).unwrap_err();
        assert_eq!(
            err,
            Error::ArityMismatch {
                callee: "f".into(),
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_forward_call_and_entry_patching() {
        let m = module(vec![
            expr(call("later", vec![])),
            function("later", &[], vec![ret(Some(int(1)))]),
        ]);
        let program = compile_default(&m).unwrap();
        let entry = &program.functions[0];
        assert_eq!(entry.name, "later");
        assert_eq!(entry.entry, 3);
        assert_eq!(program.code[2], Instruction::Halt);
        assert_eq!(
            program.code[0],
            Instruction::CallFunction {
                function: 0,
                argc: 0
            }
        );
    }

    #[test]
    fn test_nested_function_rejected() {
        let m = module(vec![function(
            "outer",
            &[],
            vec![function("inner", &[], vec![])],
        )]);
        assert_eq!(
            compile_default(&m).unwrap_err(),
            Error::NestedFunction {
                name: "inner".into()
            }
        );
    }

    #[test]
    fn test_functions_do_not_see_globals() {
        let m = module(vec![
            define("g", int(1)),
            function("f", &[], vec![ret(Some(var("g")))]),
        ]);
        assert_eq!(
            compile_default(&m).unwrap_err(),
            Error::UnboundVariable { name: "g".into() }
        );
    }

    #[test]
    fn test_optimize_requires_selector() {
        let m = module(vec![optimize("t", "wrap", vec![int(1)])]);
        assert_eq!(compile_default(&m).unwrap_err().kind(), "InvalidOperand");
    }

    #[test]
    fn test_jumps_are_patched() {
        let m = module(vec![
            define("i", int(0)),
            while_loop(
                binary(var("i"), BinaryOp::Lt, int(3)),
                vec![bind("i", binary(var("i"), BinaryOp::Add, int(1)))],
            ),
        ]);
        let program = compile_default(&m).unwrap();
        for instruction in &program.code {
            if let Instruction::Jump(t) | Instruction::JumpIfFalse(t) = instruction {
                assert!((*t as usize) < program.code.len());
            }
        }
    }

    #[test]
    fn test_duplicate_parameter_rejected() {
        let m = module(vec![function("f", &["a", "a"], vec![ret(Some(var("a")))])]);
        assert_eq!(
            compile_default(&m).unwrap_err(),
            Error::DuplicateParameter {
                function: "f".into(),
                name: "a".into()
            }
        );
    }

    #[test]
    fn test_dead_branches_dropped() {
        let m = module(vec![
            if_else(boolean(false), vec![expr(call("wrap", vec![]))], vec![]),
            while_loop(boolean(false), vec![expr(call("wrap", vec![]))]),
        ]);
        let program = compile_default(&m).unwrap();
        assert_eq!(program.code, vec![Instruction::Halt]);

        let config = CompilerConfig {
            eliminate_dead_code: false,
            ..CompilerConfig::default()
        };
        let kept = compile(&m, &config).unwrap();
        assert!(kept.code.iter().any(|i| matches!(i, Instruction::JumpIfFalse(_))));
        assert!(kept.code.len() > 5);
    }

    #[test]
    fn test_for_loop_and_print() {
        let m = module(vec![for_loop(
            bind("i", int(0)),
            binary(var("i"), BinaryOp::Lt, int(2)),
            bind("i", binary(var("i"), BinaryOp::Add, int(1))),
            vec![print(var("i"))],
        )]);
        let program = compile_default(&m).unwrap();
        assert_eq!(program.main_slots, 1);
        assert_eq!(program.code.iter().filter(|i| **i == Instruction::Print).count(), 1);
        let back_edges: Vec<_> = program
            .code
            .iter()
            .filter_map(|i| match i {
                Instruction::Jump(t) => Some(*t),
                _ => None,
            })
            .collect();
        // the loop jumps back to its condition, right after `i := 0`
        assert_eq!(back_edges, vec![2]);
        assert_eq!(program.code.last(), Some(&Instruction::Halt));
    }
}
