//! API error types
//!
//! One error type for every phase of a run, plus a structured report for
//! machine consumers.

use madlad_core::ast::SyntaxError;
use madlad_core::certificate::{CertificateError, ReplayError};
use madlad_core::{Certificate, Error};
use serde::Serialize;
use thiserror::Error;

/// Madlad error type
#[derive(Error, Debug, Clone)]
pub enum MadladError {
    #[error("cannot read '{path}': {message}")]
    Io { path: String, message: String },

    /// Every diagnostic the frontend produced, in source order
    #[error("{} syntax error(s), first: {}", .0.len(), first_message(.0))]
    Syntax(Vec<SyntaxError>),

    #[error("compile error: {0}")]
    Compile(Error),

    #[error("runtime error: {0}")]
    Runtime(Error),

    /// The bus or a ring could not be wired
    #[error("setup error: {0}")]
    Setup(Error),

    #[error("certificate error: {0}")]
    Certificate(#[from] CertificateError),

    #[error("verification failed: {0}")]
    Replay(#[from] ReplayError),
}

fn first_message(errors: &[SyntaxError]) -> String {
    errors
        .first()
        .map(ToString::to_string)
        .unwrap_or_else(|| "none".to_string())
}

impl MadladError {
    /// 1-based line of the first diagnostic
    pub fn line(&self) -> Option<usize> {
        match self {
            MadladError::Syntax(errors) => errors.first().map(|e| e.line),
            _ => None,
        }
    }

    /// 1-based column of the first diagnostic
    pub fn column(&self) -> Option<usize> {
        match self {
            MadladError::Syntax(errors) => errors.first().map(|e| e.column),
            _ => None,
        }
    }

    pub fn phase(&self) -> &'static str {
        match self {
            MadladError::Io { .. } => "io",
            MadladError::Syntax(_) => "parser",
            MadladError::Compile(_) => "compiler",
            MadladError::Runtime(_) => "runtime",
            MadladError::Setup(_) => "setup",
            MadladError::Certificate(_) | MadladError::Replay(_) => "certificate",
        }
    }

    /// Stable name of the error category
    pub fn kind(&self) -> &'static str {
        match self {
            MadladError::Io { .. } => "IoError",
            MadladError::Syntax(_) => "SyntaxError",
            MadladError::Compile(e) | MadladError::Runtime(e) | MadladError::Setup(e) => e.kind(),
            MadladError::Certificate(_) => "CertificateError",
            MadladError::Replay(_) => "ReplayError",
        }
    }

    /// Certificate retained by a failed run
    pub fn partial_certificate(&self) -> Option<&Certificate> {
        match self {
            MadladError::Runtime(e) => e.partial_certificate(),
            _ => None,
        }
    }

    pub fn to_report(&self) -> ErrorReport {
        let message = match self {
            MadladError::Compile(e) | MadladError::Runtime(e) | MadladError::Setup(e) => {
                e.root().to_string()
            }
            MadladError::Syntax(errors) => errors
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_default(),
            other => other.to_string(),
        };

        let details = match self {
            MadladError::Syntax(errors) => Some(ErrorDetails::Diagnostics {
                count: errors.len(),
            }),
            MadladError::Runtime(e) | MadladError::Compile(e) => match (e.pc(), e.step()) {
                (Some(pc), _) => Some(ErrorDetails::Instruction {
                    pc,
                    retained_steps: e.partial_certificate().map(Certificate::len),
                }),
                (None, Some(step)) => Some(ErrorDetails::Step {
                    step,
                    retained_steps: e.partial_certificate().map(Certificate::len),
                }),
                (None, None) => None,
            },
            _ => None,
        };

        ErrorReport {
            phase: self.phase(),
            line: self.line(),
            column: self.column(),
            error_kind: self.kind(),
            message,
            details,
        }
    }
}

/// Structured error report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub phase: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    pub error_kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

/// Where inside a run an error surfaced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "at", rename_all = "camelCase")]
pub enum ErrorDetails {
    #[serde(rename_all = "camelCase")]
    Diagnostics { count: usize },
    #[serde(rename_all = "camelCase")]
    Instruction {
        pc: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        retained_steps: Option<usize>,
    },
    #[serde(rename_all = "camelCase")]
    Step {
        step: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        retained_steps: Option<usize>,
    },
}

impl std::fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(col)) => {
                write!(f, "[{}:{}] {} error: {}", line, col, self.phase, self.message)
            }
            (Some(line), None) => write!(f, "[{}] {} error: {}", line, self.phase, self.message),
            _ => write!(f, "[{}] {}: {}", self.phase, self.error_kind, self.message),
        }
    }
}

impl ErrorReport {
    pub fn to_json(&self) -> String {
        // only &str, integers and options: serialization cannot fail
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Single-line form, location first
    pub fn to_short(&self) -> String {
        match (self.line, self.column) {
            (Some(line), Some(col)) => format!("{}:{}: {}", line, col, self.message),
            _ => format!("{}: {}", self.error_kind, self.message),
        }
    }
}
