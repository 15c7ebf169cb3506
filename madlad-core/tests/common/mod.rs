//! Test helpers
//!
//! Run one syntax tree down both execution paths.

#![allow(dead_code)]

use madlad_core::ast::Module;
use madlad_core::{
    compile, standard_bus, Bus, CompilerConfig, Evaluation, Interpreter, LimitConfig, Omega,
    Result, Vm,
};

pub fn bus() -> Bus {
    standard_bus(CompilerConfig::default(), LimitConfig::default()).expect("standard bus")
}

pub fn run_compiled(module: &Module, initial: Omega, certificate: bool) -> Result<Evaluation> {
    let bus = bus();
    let program = compile(module, &CompilerConfig::default())?;
    Vm::new(&bus, LimitConfig::default()).run(&program, initial, certificate)
}

pub fn run_interpreted(module: &Module, initial: Omega, certificate: bool) -> Result<Evaluation> {
    let bus = bus();
    Interpreter::new(&bus, LimitConfig::default()).evaluate(module, initial, certificate)
}

/// Compiled run under explicit configuration, certificates off
pub fn run_compiled_with(
    module: &Module,
    compiler: &CompilerConfig,
    limits: &LimitConfig,
    initial: Omega,
) -> Result<Evaluation> {
    let bus = bus();
    let program = compile(module, compiler)?;
    Vm::new(&bus, limits.clone()).run(&program, initial, false)
}

pub fn run_interpreted_with(
    module: &Module,
    compiler: &CompilerConfig,
    limits: &LimitConfig,
    initial: Omega,
) -> Result<Evaluation> {
    let bus = bus();
    Interpreter::new(&bus, limits.clone())
        .with_compiler_config(compiler.clone())
        .evaluate(module, initial, false)
}

/// Both paths with certificates on; panics if they disagree
pub fn run_both(module: &Module, initial: Omega) -> Evaluation {
    let compiled = run_compiled(module, initial.clone(), true).expect("compiled run");
    let interpreted = run_interpreted(module, initial, true).expect("interpreted run");
    assert_eq!(compiled, interpreted, "compiled and interpreted runs differ");
    interpreted
}

/// A spread of configurations for property tests
pub fn samples() -> Vec<Omega> {
    vec![
        Omega::Empty,
        Omega::int(0),
        Omega::int(-7),
        Omega::int(42),
        Omega::bool(true),
        Omega::sym("abc"),
        Omega::int(3).wrap(),
        Omega::Empty.wrap().wrap(),
        Omega::seq([]),
        Omega::seq([Omega::int(3), Omega::int(1), Omega::int(3)]),
        Omega::seq([Omega::sym("b"), Omega::Empty, Omega::sym("a")]),
        Omega::seq([
            Omega::seq([Omega::int(1), Omega::int(2)]),
            Omega::seq([Omega::int(3), Omega::int(4)]),
        ]),
        Omega::seq([
            Omega::int(2).wrap(),
            Omega::seq([Omega::bool(false), Omega::int(5)]),
            Omega::Empty,
        ]),
    ]
}
