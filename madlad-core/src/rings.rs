//! The standard rings and typed request helpers on [`Bus`].

use crate::ast::Module;
use crate::bus::{Bus, Message, MessageKind, Payload, Ring, RoutingError};
use crate::bytecode::Program;
use crate::compiler;
use crate::error::Result;
use crate::interpreter::Interpreter;
use crate::kernel::{Effect, Kernel};
use crate::omega::Omega;
use crate::session::Evaluation;
use crate::vm::Vm;
use madlad_config::{CompilerConfig, LimitConfig};
use std::sync::Arc;

pub const KERNEL: &str = "kernel";
pub const COMPILER: &str = "compiler";
pub const VM: &str = "vm";
pub const INTERPRETER: &str = "interpreter";

fn unhandled(ring: &str, payload: &Payload) -> crate::error::Error {
    RoutingError::Unhandled {
        ring: ring.to_string(),
        kind: payload.kind(),
    }
    .into()
}

fn unexpected(ring: &str, expected: MessageKind, reply: &Payload) -> crate::error::Error {
    RoutingError::UnexpectedReply {
        ring: ring.to_string(),
        expected,
        found: reply.kind(),
    }
    .into()
}

#[derive(Debug, Default)]
pub struct KernelRing {
    kernel: Kernel,
}

impl Ring for KernelRing {
    fn name(&self) -> &'static str {
        KERNEL
    }

    fn handle(&self, _bus: &Bus, message: Message) -> Result<Payload> {
        match message.payload {
            Payload::Apply {
                operator,
                input,
                args,
            } => {
                let (output, effect) = self.kernel.apply_id(operator, &input, &args)?;
                Ok(Payload::Applied { output, effect })
            }
            other => Err(unhandled(KERNEL, &other)),
        }
    }
}

#[derive(Debug, Default)]
pub struct CompilerRing {
    config: CompilerConfig,
}

impl CompilerRing {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }
}

impl Ring for CompilerRing {
    fn name(&self) -> &'static str {
        COMPILER
    }

    fn handle(&self, _bus: &Bus, message: Message) -> Result<Payload> {
        match message.payload {
            Payload::Compile { module } => {
                let program = compiler::compile(&module, &self.config)?;
                Ok(Payload::Compiled {
                    program: Arc::new(program),
                })
            }
            other => Err(unhandled(COMPILER, &other)),
        }
    }
}

#[derive(Debug, Default)]
pub struct VmRing {
    limits: LimitConfig,
}

impl VmRing {
    pub fn new(limits: LimitConfig) -> Self {
        Self { limits }
    }
}

impl Ring for VmRing {
    fn name(&self) -> &'static str {
        VM
    }

    fn handle(&self, bus: &Bus, message: Message) -> Result<Payload> {
        match message.payload {
            Payload::Run {
                program,
                initial,
                certificate,
            } => {
                let evaluation = Vm::new(bus, self.limits.clone()).run(&program, initial, certificate)?;
                Ok(Payload::Finished(evaluation))
            }
            other => Err(unhandled(VM, &other)),
        }
    }
}

#[derive(Debug, Default)]
pub struct InterpreterRing {
    compiler: CompilerConfig,
    limits: LimitConfig,
}

impl InterpreterRing {
    /// `compiler` is the configuration compiled runs on the same bus use
    pub fn new(compiler: CompilerConfig, limits: LimitConfig) -> Self {
        Self { compiler, limits }
    }
}

impl Ring for InterpreterRing {
    fn name(&self) -> &'static str {
        INTERPRETER
    }

    fn handle(&self, bus: &Bus, message: Message) -> Result<Payload> {
        match message.payload {
            Payload::Evaluate {
                module,
                initial,
                certificate,
            } => {
                let evaluation = Interpreter::new(bus, self.limits.clone())
                    .with_compiler_config(self.compiler.clone())
                    .evaluate(&module, initial, certificate)?;
                Ok(Payload::Evaluated(evaluation))
            }
            other => Err(unhandled(INTERPRETER, &other)),
        }
    }
}

/// Bus with kernel, compiler, vm and interpreter rings, in that order
pub fn standard_bus(compiler: CompilerConfig, limits: LimitConfig) -> Result<Bus> {
    let bus = Bus::builder()
        .register(Arc::new(KernelRing::default()))?
        .register(Arc::new(CompilerRing::new(compiler.clone())))?
        .register(Arc::new(VmRing::new(limits.clone())))?
        .register(Arc::new(InterpreterRing::new(compiler, limits)))?
        .build();
    Ok(bus)
}

impl Bus {
    pub fn apply(
        &self,
        source: &'static str,
        operator: u32,
        input: Omega,
        args: Vec<Omega>,
    ) -> Result<(Omega, Effect)> {
        let payload = Payload::Apply {
            operator,
            input,
            args,
        };
        match self.request(source, KERNEL, payload, MessageKind::Applied)? {
            Payload::Applied { output, effect } => Ok((output, effect)),
            other => Err(unexpected(KERNEL, MessageKind::Applied, &other)),
        }
    }

    pub fn compile(&self, source: &'static str, module: Arc<Module>) -> Result<Arc<Program>> {
        match self.request(source, COMPILER, Payload::Compile { module }, MessageKind::Compiled)? {
            Payload::Compiled { program } => Ok(program),
            other => Err(unexpected(COMPILER, MessageKind::Compiled, &other)),
        }
    }

    pub fn run(
        &self,
        source: &'static str,
        program: Arc<Program>,
        initial: Omega,
        certificate: bool,
    ) -> Result<Evaluation> {
        let payload = Payload::Run {
            program,
            initial,
            certificate,
        };
        match self.request(source, VM, payload, MessageKind::Finished)? {
            Payload::Finished(evaluation) => Ok(evaluation),
            other => Err(unexpected(VM, MessageKind::Finished, &other)),
        }
    }

    pub fn evaluate(
        &self,
        source: &'static str,
        module: Arc<Module>,
        initial: Omega,
        certificate: bool,
    ) -> Result<Evaluation> {
        let payload = Payload::Evaluate {
            module,
            initial,
            certificate,
        };
        match self.request(source, INTERPRETER, payload, MessageKind::Evaluated)? {
            Payload::Evaluated(evaluation) => Ok(evaluation),
            other => Err(unexpected(INTERPRETER, MessageKind::Evaluated, &other)),
        }
    }
}
