//! Madlad Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It is the shared configuration vocabulary of the madlad crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which execution path runs a program
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Lower to bytecode and run it on the stack machine
    #[default]
    Compiled,
    /// Walk the syntax tree directly
    Interpreted,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Compiled => "compiled",
            ExecutionMode::Interpreted => "interpreted",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compiled" | "vm" => Ok(ExecutionMode::Compiled),
            "interpreted" | "tree" => Ok(ExecutionMode::Interpreted),
            other => Err(format!("unknown execution mode '{other}'")),
        }
    }
}

/// Options of a single program execution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunOptions {
    pub mode: ExecutionMode,
    /// Record every operator application into a certificate
    pub emit_certificate: bool,
}

impl RunOptions {
    pub fn new(mode: ExecutionMode, emit_certificate: bool) -> Self {
        Self {
            mode,
            emit_certificate,
        }
    }

    pub fn interpreted() -> Self {
        Self::new(ExecutionMode::Interpreted, false)
    }

    pub fn compiled() -> Self {
        Self::new(ExecutionMode::Compiled, false)
    }

    pub fn with_certificate(mut self) -> Self {
        self.emit_certificate = true;
        self
    }
}

/// Configuration for compiler behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerConfig {
    /// Fold arithmetic over integer literals at compile time
    pub fold_constants: bool,
    /// Skip branches whose condition is a boolean literal
    pub eliminate_dead_code: bool,
    /// Log a disassembly of every compiled program
    pub emit_debug_info: bool,
}

/// Configuration for execution limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LimitConfig {
    /// Maximum operand stack depth of one frame
    pub max_stack_size: usize,
    /// Maximum number of nested function frames
    pub max_call_depth: usize,
    /// Maximum number of recorded operator applications, unbounded if absent
    pub max_steps: Option<u64>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            fold_constants: true,
            eliminate_dead_code: true,
            emit_debug_info: false,
        }
    }
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_stack_size: 1024,
            max_call_depth: 256,
            max_steps: None,
        }
    }
}

/// Execution phase enum for phase-specific configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Parser,
    Compiler,
    Vm,
    Interpreter,
    Kernel,
    Bus,
    Certificate,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::Parser,
        Phase::Compiler,
        Phase::Vm,
        Phase::Interpreter,
        Phase::Kernel,
        Phase::Bus,
        Phase::Certificate,
    ];

    /// Get the string name of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Parser => "parser",
            Phase::Compiler => "compiler",
            Phase::Vm => "vm",
            Phase::Interpreter => "interpreter",
            Phase::Kernel => "kernel",
            Phase::Bus => "bus",
            Phase::Certificate => "certificate",
        }
    }

    /// Get the log target name for this phase
    pub fn target(&self) -> String {
        format!("madlad::{}", self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| format!("unknown phase '{s}'"))
    }
}

/// Log verbosity, independent of any logging backend
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "silent" | "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}
