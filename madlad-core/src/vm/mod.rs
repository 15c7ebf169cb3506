//! Stack machine executing compiled [`Program`]s.
//!
//! Every frame owns its operand stack and slot array. Operator calls go
//! through the bus to the kernel ring via a [`Session`], the same path the
//! interpreter uses.

mod call;
mod execution;
mod stack;

use crate::bus::Bus;
use crate::bytecode::Program;
use crate::error::{Error, Result};
use crate::kernel::CATALOG_VERSION;
use crate::omega::Omega;
use crate::rings;
use crate::session::{Evaluation, Session};
use madlad_config::LimitConfig;
use tracing::debug;

const TARGET: &str = "madlad::vm";

/// Activation record
#[derive(Debug, Clone)]
pub struct Frame {
    /// Function table index, `None` for main code
    pub function: Option<u16>,
    pub pc: usize,
    pub stack: Vec<Omega>,
    pub slots: Vec<Omega>,
}

impl Frame {
    fn new(function: Option<u16>, pc: usize, slots: usize) -> Self {
        Self {
            function,
            pc,
            stack: Vec::new(),
            slots: vec![Omega::Empty; slots],
        }
    }
}

/// How execution stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Halted,
    /// A duality fixed point ended the program
    FixedPoint,
}

pub struct Vm<'b> {
    bus: &'b Bus,
    limits: LimitConfig,
    frames: Vec<Frame>,
    /// Address of the instruction being executed
    fault_pc: usize,
}

impl<'b> Vm<'b> {
    pub fn new(bus: &'b Bus, limits: LimitConfig) -> Self {
        Self {
            bus,
            limits,
            frames: Vec::new(),
            fault_pc: 0,
        }
    }

    pub fn run(mut self, program: &Program, initial: Omega, certificate: bool) -> Result<Evaluation> {
        if program.catalog_version != CATALOG_VERSION {
            return Err(Error::malformed(format!(
                "program targets catalog v{}, kernel provides v{}",
                program.catalog_version, CATALOG_VERSION
            )));
        }

        initial.check_depth()?;

        let mut session = Session::new(
            self.bus,
            rings::VM,
            initial,
            self.limits.max_steps,
            certificate,
        );
        self.frames.push(Frame::new(None, 0, program.main_slots));

        match execution::run(&mut self, program, &mut session) {
            Ok(outcome) => {
                debug!(
                    target: TARGET,
                    steps = session.steps(),
                    ?outcome,
                    "program finished"
                );
                Ok(session.finish(outcome == Outcome::FixedPoint))
            }
            Err(source) => {
                let error = Error::Vm {
                    pc: self.fault_pc,
                    depth: self.frames.len(),
                    source: Box::new(source),
                };
                debug!(target: TARGET, %error, "program failed");
                Err(session.abort(error))
            }
        }
    }

    pub(crate) fn frame(&self) -> Result<&Frame> {
        self.frames
            .last()
            .ok_or_else(|| Error::malformed("no active frame"))
    }

    pub(crate) fn frame_mut(&mut self) -> Result<&mut Frame> {
        self.frames
            .last_mut()
            .ok_or_else(|| Error::malformed("no active frame"))
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{FunctionEntry, Instruction};
    use crate::kernel::Operator;
    use crate::ops::BinaryOp;
    use crate::rings::standard_bus;
    use madlad_config::CompilerConfig;

    fn bus() -> Bus {
        standard_bus(CompilerConfig::default(), LimitConfig::default()).unwrap()
    }

    fn program(code: Vec<Instruction>, constants: Vec<Omega>) -> Program {
        Program {
            constants,
            code,
            ..Program::default()
        }
    }

    #[test]
    fn test_operator_call_advances_state() {
        let bus = bus();
        let p = program(
            vec![
                Instruction::CallOperator {
                    operator: Operator::Wrap.id(),
                    argc: 0,
                },
                Instruction::Pop,
                Instruction::CallOperator {
                    operator: Operator::Wrap.id(),
                    argc: 0,
                },
                Instruction::Pop,
                Instruction::Halt,
            ],
            vec![],
        );
        let eval = Vm::new(&bus, LimitConfig::default())
            .run(&p, Omega::Empty, false)
            .unwrap();
        assert_eq!(eval.output, Omega::Empty.wrap().wrap());
        assert_eq!(eval.steps, 2);
        assert!(!eval.halted_early);
    }

    #[test]
    fn test_stack_underflow_reports_pc() {
        let bus = bus();
        let p = program(
            vec![
                Instruction::PushConst(0),
                Instruction::Binary(BinaryOp::Add),
                Instruction::Halt,
            ],
            vec![Omega::int(1)],
        );
        let err = Vm::new(&bus, LimitConfig::default())
            .run(&p, Omega::Empty, false)
            .unwrap_err();
        assert_eq!(err.root(), &Error::StackUnderflow);
        assert_eq!(err.pc(), Some(1));
        assert!(matches!(err, Error::Vm { depth: 1, .. }));
    }

    #[test]
    fn test_halt_with_leftover_operand_is_frame_mismatch() {
        let bus = bus();
        let p = program(
            vec![Instruction::PushConst(0), Instruction::Halt],
            vec![Omega::int(1)],
        );
        let err = Vm::new(&bus, LimitConfig::default())
            .run(&p, Omega::Empty, false)
            .unwrap_err();
        assert_eq!(
            err.root(),
            &Error::FrameMismatch {
                expected: 0,
                found: 1
            }
        );
    }

    #[test]
    fn test_return_must_leave_exactly_one_value() {
        let bus = bus();
        let mut p = program(
            vec![
                Instruction::CallFunction {
                    function: 0,
                    argc: 0,
                },
                Instruction::Pop,
                Instruction::Halt,
                Instruction::PushConst(0),
                Instruction::PushConst(0),
                Instruction::Return,
            ],
            vec![Omega::int(1)],
        );
        p.functions.push(FunctionEntry {
            name: "f".into(),
            entry: 3,
            arity: 0,
            slots: 0,
        });
        let err = Vm::new(&bus, LimitConfig::default())
            .run(&p, Omega::Empty, false)
            .unwrap_err();
        assert_eq!(
            err.root(),
            &Error::FrameMismatch {
                expected: 1,
                found: 2
            }
        );
        assert!(matches!(err, Error::Vm { pc: 5, depth: 2, .. }));
    }

    #[test]
    fn test_malformed_programs() {
        let bus = bus();
        let cases = vec![
            program(vec![Instruction::PushConst(3), Instruction::Halt], vec![]),
            program(vec![Instruction::Load(0), Instruction::Halt], vec![]),
            program(vec![Instruction::Jump(99)], vec![]),
            program(vec![], vec![]),
            program(
                vec![Instruction::CallFunction {
                    function: 0,
                    argc: 0,
                }],
                vec![],
            ),
        ];
        for p in cases {
            let err = Vm::new(&bus, LimitConfig::default())
                .run(&p, Omega::Empty, false)
                .unwrap_err();
            assert_eq!(err.kind(), "MalformedProgram", "{err}");
        }
    }

    #[test]
    fn test_catalog_version_mismatch() {
        let bus = bus();
        let p = Program {
            catalog_version: CATALOG_VERSION + 1,
            code: vec![Instruction::Halt],
            ..Program::default()
        };
        let err = Vm::new(&bus, LimitConfig::default())
            .run(&p, Omega::Empty, false)
            .unwrap_err();
        assert_eq!(err.kind(), "MalformedProgram");
    }

    #[test]
    fn test_call_depth_limit() {
        let bus = bus();
        let mut p = program(
            vec![
                Instruction::CallFunction {
                    function: 0,
                    argc: 0,
                },
                Instruction::Pop,
                Instruction::Halt,
                Instruction::CallFunction {
                    function: 0,
                    argc: 0,
                },
                Instruction::Return,
            ],
            vec![],
        );
        p.functions.push(FunctionEntry {
            name: "forever".into(),
            entry: 3,
            arity: 0,
            slots: 0,
        });
        let limits = LimitConfig {
            max_call_depth: 8,
            ..LimitConfig::default()
        };
        let err = Vm::new(&bus, limits).run(&p, Omega::Empty, false).unwrap_err();
        assert_eq!(
            err.root(),
            &Error::LimitExceeded {
                what: "call depth",
                limit: 8
            }
        );
    }

    #[test]
    fn test_stack_size_limit() {
        let bus = bus();
        let p = program(
            vec![
                Instruction::PushConst(0),
                Instruction::PushConst(0),
                Instruction::PushConst(0),
                Instruction::Halt,
            ],
            vec![Omega::int(1)],
        );
        let limits = LimitConfig {
            max_stack_size: 2,
            ..LimitConfig::default()
        };
        let err = Vm::new(&bus, limits).run(&p, Omega::Empty, false).unwrap_err();
        assert_eq!(err.kind(), "LimitExceeded");
        assert_eq!(err.pc(), Some(2));
    }
}
