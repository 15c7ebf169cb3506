//! Madlad API - execution orchestration
//!
//! Wires the reference frontend to the standard bus and exposes one-call
//! entry points for the CLI and embedders:
//!
//! - [`run`]: source text in, final configuration out
//! - [`compile`]: source text to bytecode
//! - [`execute`]: run a program file
//! - [`verify`]: replay a serialized certificate

pub mod config;
pub mod error;
pub mod types;

pub use config::{config, init as init_config, is_initialized, RunConfig};
pub use error::{ErrorDetails, ErrorReport, MadladError};
pub use types::{CompileOutput, ExecuteOutput};

use std::path::Path;
use std::sync::Arc;

use madlad_core::ast::{Frontend, Module};
use madlad_core::{Bus, Certificate, Digest, ExecutionMode, ReplayReport, RunOptions};
use madlad_syntax::DslFrontend;
use tracing::{debug, info};

const TARGET: &str = "madlad::api";

/// Result type of the API
pub type Result<T> = std::result::Result<T, MadladError>;

/// A frontend bound to a ready bus
pub struct Engine {
    bus: Bus,
    frontend: Box<dyn Frontend>,
    config: RunConfig,
}

impl Engine {
    /// Engine with the reference grammar
    pub fn new(config: RunConfig) -> Result<Self> {
        Self::with_frontend(config, Box::new(DslFrontend))
    }

    pub fn with_frontend(config: RunConfig, frontend: Box<dyn Frontend>) -> Result<Self> {
        let bus = madlad_core::standard_bus(config.compiler.clone(), config.limits.clone())
            .map_err(MadladError::Setup)?;
        Ok(Self {
            bus,
            frontend,
            config,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn parse(&self, source: &str) -> Result<Module> {
        let module = self.frontend.parse(source).map_err(MadladError::Syntax)?;
        debug!(target: TARGET, statements = module.statements.len(), "parsed");
        Ok(module)
    }

    pub fn compile_source(&self, source: &str) -> Result<CompileOutput> {
        let module = Arc::new(self.parse(source)?);
        let program = self
            .bus
            .compile(TARGET, Arc::clone(&module))
            .map_err(MadladError::Compile)?;
        Ok(CompileOutput { module, program })
    }

    /// Parse and execute along the path `options` selects
    pub fn run_source(&self, source: &str, options: &RunOptions) -> Result<ExecuteOutput> {
        let initial = self.config.initial.clone();
        let (evaluation, program) = match options.mode {
            ExecutionMode::Compiled => {
                let CompileOutput { program, .. } = self.compile_source(source)?;
                let evaluation = self
                    .bus
                    .run(TARGET, Arc::clone(&program), initial, options.emit_certificate)
                    .map_err(MadladError::Runtime)?;
                (evaluation, self.config.dump_bytecode.then_some(program))
            }
            ExecutionMode::Interpreted => {
                let module = Arc::new(self.parse(source)?);
                let evaluation = self
                    .bus
                    .evaluate(TARGET, module, initial, options.emit_certificate)
                    .map_err(MadladError::Runtime)?;
                (evaluation, None)
            }
        };

        let digest = Digest::of(&evaluation.output);
        info!(
            target: TARGET,
            mode = %options.mode,
            steps = evaluation.steps,
            halted_early = evaluation.halted_early,
            digest = %digest,
            "run finished"
        );

        Ok(ExecuteOutput {
            output: evaluation.output,
            digest,
            steps: evaluation.steps,
            halted_early: evaluation.halted_early,
            printed: evaluation.printed,
            certificate: evaluation.certificate,
            mode: options.mode,
            program,
        })
    }

    /// Read a program file and run it
    pub fn execute(&self, path: impl AsRef<Path>, options: &RunOptions) -> Result<ExecuteOutput> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| MadladError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        info!(target: TARGET, path = %path.display(), bytes = source.len(), "executing file");
        self.run_source(&source, options)
    }
}

/// Run source text with an explicit configuration
pub fn run(source: &str, config: &RunConfig) -> Result<ExecuteOutput> {
    Engine::new(config.clone())?.run_source(source, &config.options)
}

/// Compile source text with an explicit configuration
pub fn compile(source: &str, config: &RunConfig) -> Result<CompileOutput> {
    Engine::new(config.clone())?.compile_source(source)
}

/// Run source text with the process-wide configuration
pub fn quick_run(source: &str) -> Result<ExecuteOutput> {
    run(source, config::config())
}

/// Run a program file with the process-wide configuration and `options`
pub fn execute(path: impl AsRef<Path>, options: &RunOptions) -> Result<ExecuteOutput> {
    Engine::new(config::config().clone())?.execute(path, options)
}

/// Decode a serialized certificate and replay it against the kernel
pub fn verify(text: &str) -> Result<ReplayReport> {
    let certificate = Certificate::decode(text)?;
    let report = madlad_core::replay(&certificate)?;
    info!(
        target: TARGET,
        steps = report.steps,
        complete = report.complete,
        digest = %report.final_digest,
        "certificate verified"
    );
    Ok(report)
}
