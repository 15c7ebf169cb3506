//! API type definitions

use std::sync::Arc;

use madlad_core::ast::Module;
use madlad_core::{Certificate, Digest, ExecutionMode, Omega, Program};

/// Compilation output
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub module: Arc<Module>,
    pub program: Arc<Program>,
}

/// Execution output
#[derive(Debug, Clone)]
pub struct ExecuteOutput {
    /// Final configuration
    pub output: Omega,
    pub digest: Digest,
    /// Recorded operator applications
    pub steps: u64,
    pub halted_early: bool,
    /// Values of `print` statements, in execution order
    pub printed: Vec<Omega>,
    pub certificate: Option<Certificate>,
    pub mode: ExecutionMode,
    /// Kept when bytecode dumping is requested on the compiled path
    pub program: Option<Arc<Program>>,
}
