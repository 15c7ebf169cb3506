//! Madlad Core - operator engine (pure logic, no IO)
//!
//! Contains the operator kernel, dispatch bus, bytecode compiler, virtual
//! machine, tree-walking interpreter and certificate emitter. Only operates
//! on in-memory data structures; source text reaches the engine through a
//! [`Frontend`](ast::Frontend) implementation.
//!
//! Configuration is passed explicitly via parameters, not via global state.

pub mod ast;
pub mod bus;
pub mod bytecode;
pub mod certificate;
pub mod compiler;
pub mod digest;
pub mod error;
pub mod interpreter;
pub mod kernel;
pub mod omega;
pub mod ops;
pub mod rings;
pub mod session;
pub mod vm;

pub use bus::{Bus, BusBuilder, Message, MessageKind, Payload, Ring, RoutingError};
pub use bytecode::{Instruction, Program};
pub use certificate::{replay, Certificate, CertificateStatus, CertificateStep, ReplayReport};
pub use compiler::compile;
pub use digest::Digest;
pub use error::{Error, Result};
pub use interpreter::Interpreter;
pub use kernel::{Effect, Family, Kernel, Operator, CATALOG_VERSION};
pub use omega::{Omega, Scalar};
pub use rings::standard_bus;
pub use session::Evaluation;
pub use vm::Vm;

// Re-export config types from madlad-config
pub use madlad_config::{CompilerConfig, ExecutionMode, LimitConfig, Phase, RunOptions};
