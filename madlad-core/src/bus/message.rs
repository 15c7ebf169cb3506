use crate::ast::Module;
use crate::bytecode::Program;
use crate::kernel::Effect;
use crate::omega::Omega;
use crate::session::Evaluation;
use std::fmt;
use std::sync::Arc;

/// Tag of a payload, used for routing diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Apply,
    Applied,
    Compile,
    Compiled,
    Run,
    Finished,
    Evaluate,
    Evaluated,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageKind::Apply => "apply",
            MessageKind::Applied => "applied",
            MessageKind::Compile => "compile",
            MessageKind::Compiled => "compiled",
            MessageKind::Run => "run",
            MessageKind::Finished => "finished",
            MessageKind::Evaluate => "evaluate",
            MessageKind::Evaluated => "evaluated",
        };
        f.write_str(name)
    }
}

/// Commands and their results
#[derive(Debug, Clone)]
pub enum Payload {
    Apply {
        operator: u32,
        input: Omega,
        args: Vec<Omega>,
    },
    Applied {
        output: Omega,
        effect: Effect,
    },
    Compile {
        module: Arc<Module>,
    },
    Compiled {
        program: Arc<Program>,
    },
    Run {
        program: Arc<Program>,
        initial: Omega,
        certificate: bool,
    },
    Finished(Evaluation),
    Evaluate {
        module: Arc<Module>,
        initial: Omega,
        certificate: bool,
    },
    Evaluated(Evaluation),
}

impl Payload {
    pub fn kind(&self) -> MessageKind {
        match self {
            Payload::Apply { .. } => MessageKind::Apply,
            Payload::Applied { .. } => MessageKind::Applied,
            Payload::Compile { .. } => MessageKind::Compile,
            Payload::Compiled { .. } => MessageKind::Compiled,
            Payload::Run { .. } => MessageKind::Run,
            Payload::Finished(_) => MessageKind::Finished,
            Payload::Evaluate { .. } => MessageKind::Evaluate,
            Payload::Evaluated(_) => MessageKind::Evaluated,
        }
    }
}

/// Envelope routed by the bus
#[derive(Debug, Clone)]
pub struct Message {
    pub source: &'static str,
    pub target: &'static str,
    pub kind: MessageKind,
    pub payload: Payload,
}

impl Message {
    pub fn new(source: &'static str, target: &'static str, payload: Payload) -> Self {
        Self {
            source,
            target,
            kind: payload.kind(),
            payload,
        }
    }
}
