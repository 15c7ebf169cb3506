//! Madlad CLI - command line interface
//!
//! Runs programs on either execution path, checks and dumps bytecode,
//! replays certificates and lists the operator catalog.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use madlad_api::{Engine, ExecuteOutput, RunConfig};
use madlad_config::{ExecutionMode, LogLevel, RunOptions};
use madlad_core::{Certificate, Omega, Operator};
use tracing::{info, warn};

mod config;
mod logging;
mod platform;

use crate::config::ProjectFile;
use crate::logging::LogFormat;
use crate::platform::print_error_with_source;

const TARGET: &str = "madlad::cli";
const DEFAULT_PROJECT_FILE: &str = "madlad.json";

#[derive(Parser)]
#[command(
    name = "madlad",
    about = "Certified configuration programs over a fixed operator kernel",
    version
)]
struct Cli {
    /// error, warn, info, debug or trace (default: RUST_LOG, else warn)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    /// Project file (default: ./madlad.json when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute a program and print its final configuration
    Run {
        file: PathBuf,
        /// compiled or interpreted
        #[arg(long)]
        mode: Option<ExecutionMode>,
        /// Write the certificate to this file
        #[arg(long, value_name = "OUT")]
        certificate: Option<PathBuf>,
        /// Initial configuration as JSON, e.g. '{"wrap":"empty"}'
        #[arg(long, value_name = "JSON")]
        initial: Option<String>,
        #[arg(long, value_name = "N")]
        max_steps: Option<u64>,
        /// Print the disassembled bytecode before running
        #[arg(long)]
        dump_bytecode: bool,
    },
    /// Parse and compile a program, printing its bytecode as JSON
    Check { file: PathBuf },
    /// Replay a certificate file against the kernel
    Verify { certificate: PathBuf },
    /// List the operator catalog
    Catalog,
}

fn main() {
    let cli = Cli::parse();

    let project = match load_project(cli.config.as_deref()) {
        Ok(p) => p,
        Err(e) => fail(&e),
    };
    let log_config = match project.log_config(cli.log_level) {
        Ok(c) => c,
        Err(e) => fail(&e),
    };
    logging::init(log_config.as_ref(), cli.log_format);

    let run_config = build_run_config(&project);
    // the CLI installs the process-wide config once, before any run
    let _ = madlad_api::init_config(run_config.clone());

    match cli.command {
        Command::Run {
            file,
            mode,
            certificate,
            initial,
            max_steps,
            dump_bytecode,
        } => {
            let mut config = run_config;
            if let Some(mode) = mode {
                config.options.mode = mode;
            }
            config.options.emit_certificate = certificate.is_some();
            if let Some(json) = initial {
                config.initial = match serde_json::from_str::<Omega>(&json) {
                    Ok(value) => value,
                    Err(e) => fail(&format!("invalid --initial value: {e}")),
                };
            }
            if max_steps.is_some() {
                config.limits.max_steps = max_steps;
            }
            config.dump_bytecode |= dump_bytecode;
            handle_run(&file, config, certificate.as_deref());
        }
        Command::Check { file } => handle_check(&file, run_config),
        Command::Verify { certificate } => handle_verify(&certificate),
        Command::Catalog => handle_catalog(),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

/// Read the project file. An explicit path must exist; the default one is
/// optional.
fn load_project(path: Option<&Path>) -> Result<ProjectFile, String> {
    match path {
        Some(path) => ProjectFile::read(path),
        None => {
            let default = Path::new(DEFAULT_PROJECT_FILE);
            if default.exists() {
                ProjectFile::read(default)
            } else {
                Ok(ProjectFile::default())
            }
        }
    }
}

fn build_run_config(project: &ProjectFile) -> RunConfig {
    let defaults = RunConfig::default();
    RunConfig {
        options: RunOptions::new(project.mode.unwrap_or_default(), false),
        dump_bytecode: project.dump_bytecode.unwrap_or(false),
        compiler: project.compiler.clone().unwrap_or(defaults.compiler),
        limits: project.limits.clone().unwrap_or(defaults.limits),
        initial: project.initial.clone().unwrap_or(defaults.initial),
    }
}

fn read_source(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => fail(&format!("cannot read '{}': {}", path.display(), e)),
    }
}

fn engine(config: RunConfig) -> Engine {
    match Engine::new(config) {
        Ok(engine) => engine,
        Err(e) => fail(&e.to_report().to_string()),
    }
}

fn write_certificate(path: &Path, certificate: &Certificate) {
    let text = match certificate.encode() {
        Ok(text) => text,
        Err(e) => fail(&format!("cannot encode certificate: {e}")),
    };
    if let Err(e) = std::fs::write(path, text) {
        fail(&format!("cannot write '{}': {}", path.display(), e));
    }
    info!(
        target: TARGET,
        path = %path.display(),
        steps = certificate.len(),
        complete = certificate.is_complete(),
        "certificate written"
    );
}

fn handle_run(file: &Path, config: RunConfig, certificate_path: Option<&Path>) {
    let source = read_source(file);
    let options = config.options.clone();
    let engine = engine(config);

    match engine.run_source(&source, &options) {
        Ok(output) => {
            if let (Some(path), Some(certificate)) = (certificate_path, output.certificate.as_ref()) {
                write_certificate(path, certificate);
            }
            if engine.config().dump_bytecode {
                match output.program.as_ref() {
                    Some(program) => print!("{}", program.disassemble()),
                    None => warn!(target: TARGET, "bytecode dump skipped on the interpreted path"),
                }
            }
            print_output(&output);
        }
        Err(e) => {
            if let (Some(path), Some(partial)) = (certificate_path, e.partial_certificate()) {
                write_certificate(path, partial);
            }
            print_error_with_source(&e, &source);
            process::exit(1);
        }
    }
}

fn print_output(output: &ExecuteOutput) {
    for value in &output.printed {
        println!("print: {value}");
    }
    println!("output: {}", output.output);
    println!("digest: {}", output.digest);
    println!("steps: {}", output.steps);
    if output.halted_early {
        println!("halted early: fixed point reached");
    }
}

fn handle_check(file: &Path, config: RunConfig) {
    let source = read_source(file);
    match engine(config).compile_source(&source) {
        Ok(output) => match serde_json::to_string_pretty(&*output.program) {
            Ok(json) => println!("{json}"),
            Err(e) => fail(&format!("cannot serialize bytecode: {e}")),
        },
        Err(e) => {
            print_error_with_source(&e, &source);
            process::exit(1);
        }
    }
}

fn handle_verify(path: &Path) {
    let text = read_source(path);
    match madlad_api::verify(&text) {
        Ok(report) => {
            println!(
                "verified {} step(s), {}",
                report.steps,
                if report.complete { "complete" } else { "partial" }
            );
            println!("digest: {}", report.final_digest);
        }
        Err(e) => fail(&e.to_report().to_string()),
    }
}

fn handle_catalog() {
    println!("{:>3}  {:<16} {:<12} arity", "id", "name", "family");
    for op in Operator::ALL {
        println!(
            "{:>3}  {:<16} {:<12} {}",
            op.id(),
            op.name(),
            op.family().as_str(),
            op.arity()
        );
    }
}
