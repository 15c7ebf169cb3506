//! Error taxonomy of the engine.

use crate::ast::SyntaxError;
use crate::bus::RoutingError;
use crate::certificate::Certificate;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{} syntax error(s), first: {}", .0.len(), first_syntax_error(.0))]
    Syntax(Vec<SyntaxError>),

    #[error("unbound variable '{name}'")]
    UnboundVariable { name: String },

    #[error("unknown operator '{operator}'")]
    UnknownOperator { operator: String },

    #[error("'{callee}' expects {expected} argument(s), found {found}")]
    ArityMismatch {
        callee: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid operand for '{operator}': {reason}")]
    InvalidOperand { operator: String, reason: String },

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error("operand stack underflow")]
    StackUnderflow,

    #[error("frame mismatch: expected {expected} operand(s) on exit, found {found}")]
    FrameMismatch { expected: usize, found: usize },

    #[error("duality violation in '{operator}': involution fails for {input}")]
    DualityViolation { operator: String, input: String },

    #[error("assertion failed: {message}")]
    AssertionFailed { message: String },

    #[error("{what} limit of {limit} exceeded")]
    LimitExceeded { what: &'static str, limit: usize },

    #[error("step budget of {limit} operator application(s) exhausted")]
    BudgetExhausted { limit: u64 },

    #[error("function '{function}' names parameter '{name}' more than once")]
    DuplicateParameter { function: String, name: String },

    #[error("function '{name}' must be declared at top level")]
    NestedFunction { name: String },

    #[error("malformed program: {reason}")]
    MalformedProgram { reason: String },

    #[error("at pc {pc} (frame depth {depth}): {source}")]
    Vm {
        pc: usize,
        depth: usize,
        source: Box<Error>,
    },

    #[error("at step {step}: {source}")]
    Step { step: u64, source: Box<Error> },

    #[error("{source} ({} certificate step(s) retained)", .certificate.len())]
    Aborted {
        source: Box<Error>,
        certificate: Box<Certificate>,
    },
}

fn first_syntax_error(errors: &[SyntaxError]) -> String {
    errors
        .first()
        .map(ToString::to_string)
        .unwrap_or_else(|| "<none>".to_string())
}

impl Error {
    pub fn invalid_operand(operator: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidOperand {
            operator: operator.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedProgram {
            reason: reason.into(),
        }
    }

    /// The error with every context wrapper removed
    pub fn root(&self) -> &Error {
        match self {
            Error::Vm { source, .. } | Error::Step { source, .. } | Error::Aborted { source, .. } => {
                source.root()
            }
            other => other,
        }
    }

    /// Stable name of the root error's category
    pub fn kind(&self) -> &'static str {
        match self.root() {
            Error::Syntax(_) => "SyntaxError",
            Error::UnboundVariable { .. } => "UnboundVariable",
            Error::UnknownOperator { .. } => "UnknownOperator",
            Error::ArityMismatch { .. } => "ArityMismatch",
            Error::InvalidOperand { .. } => "InvalidOperand",
            Error::Routing(_) => "RoutingError",
            Error::StackUnderflow => "StackUnderflow",
            Error::FrameMismatch { .. } => "FrameMismatch",
            Error::DualityViolation { .. } => "DualityViolation",
            Error::AssertionFailed { .. } => "AssertionFailed",
            Error::LimitExceeded { .. } => "LimitExceeded",
            Error::BudgetExhausted { .. } => "BudgetExhausted",
            Error::DuplicateParameter { .. } => "DuplicateParameter",
            Error::NestedFunction { .. } => "NestedFunction",
            Error::MalformedProgram { .. } => "MalformedProgram",
            Error::Vm { .. } | Error::Step { .. } | Error::Aborted { .. } => "Internal",
        }
    }

    /// Certificate retained by an aborted run, if any
    pub fn partial_certificate(&self) -> Option<&Certificate> {
        match self {
            Error::Aborted { certificate, .. } => Some(&**certificate),
            Error::Vm { source, .. } | Error::Step { source, .. } => source.partial_certificate(),
            _ => None,
        }
    }

    /// Program counter of a VM failure
    pub fn pc(&self) -> Option<usize> {
        match self {
            Error::Vm { pc, .. } => Some(*pc),
            Error::Step { source, .. } | Error::Aborted { source, .. } => source.pc(),
            _ => None,
        }
    }

    /// Index of the operator application an interpreter failure happened at
    pub fn step(&self) -> Option<u64> {
        match self {
            Error::Step { step, .. } => Some(*step),
            Error::Vm { source, .. } | Error::Aborted { source, .. } => source.step(),
            _ => None,
        }
    }
}
