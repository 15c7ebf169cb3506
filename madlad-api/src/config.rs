//! API-level configuration
//!
//! `RunConfig` bundles everything one run needs, plus an optional
//! process-wide instance for CLI convenience.

use madlad_config::{CompilerConfig, LimitConfig, RunOptions};
use madlad_core::Omega;
use once_cell::sync::OnceCell;

/// Execution configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Execution path and certificate emission
    pub options: RunOptions,
    /// Keep the compiled program in the output for disassembly
    pub dump_bytecode: bool,
    pub compiler: CompilerConfig,
    pub limits: LimitConfig,
    /// Configuration the program starts from
    pub initial: Omega,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            options: RunOptions::default(),
            dump_bytecode: false,
            compiler: CompilerConfig::default(),
            limits: LimitConfig::default(),
            initial: Omega::Empty,
        }
    }
}

impl RunConfig {
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }
}

static GLOBAL_CONFIG: OnceCell<RunConfig> = OnceCell::new();

/// Install the process-wide configuration. Fails, handing the value back,
/// when one is already installed.
pub fn init(config: RunConfig) -> Result<(), RunConfig> {
    GLOBAL_CONFIG.set(config)
}

/// The process-wide configuration, defaulted on first use
pub fn config() -> &'static RunConfig {
    GLOBAL_CONFIG.get_or_init(RunConfig::default)
}

pub fn is_initialized() -> bool {
    GLOBAL_CONFIG.get().is_some()
}
