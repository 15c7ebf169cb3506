//! Linear instruction sequence produced by the compiler.

use crate::kernel::{Operator, CATALOG_VERSION};
use crate::omega::Omega;
use crate::ops::{BinaryOp, UnaryOp};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};

/// Placeholder target of a jump that has not been patched yet
pub const UNPATCHED: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
    /// Push a constant-pool value
    PushConst(u32),
    /// Push the current configuration
    LoadState,
    Load(u16),
    Store(u16),
    Pop,
    /// Pop `n` values and push them as one sequence
    BuildSeq(u32),
    Binary(BinaryOp),
    Unary(UnaryOp),
    /// Pop `argc` operands and apply a catalog operator. The first operand is
    /// the subject; with no operands the current configuration is.
    CallOperator { operator: u8, argc: u8 },
    Jump(u32),
    /// Pop a bool and jump when it is false
    JumpIfFalse(u32),
    CallFunction { function: u16, argc: u8 },
    Return,
    /// Operators applied until the matching `EndObserve` neither advance
    /// the configuration nor produce certificate steps
    BeginObserve,
    EndObserve,
    /// Pop a bool and fail with the message constant when it is false
    Assert { message: u32 },
    /// Pop a value and append it to the printed output
    Print,
    Halt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionEntry {
    pub name: String,
    /// Address of the first instruction
    pub entry: usize,
    pub arity: usize,
    /// Slot count including parameters
    pub slots: usize,
}

/// A compiled program: constants, code and a function table. Main code
/// starts at address 0 and ends with `Halt`; function bodies follow it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub catalog_version: u32,
    pub constants: Vec<Omega>,
    pub code: Vec<Instruction>,
    pub functions: Vec<FunctionEntry>,
    pub main_slots: usize,
}

impl Default for Program {
    fn default() -> Self {
        Self {
            catalog_version: CATALOG_VERSION,
            constants: Vec::new(),
            code: Vec::new(),
            functions: Vec::new(),
            main_slots: 0,
        }
    }
}

impl Program {
    /// Index of `value` in the constant pool, adding it if absent
    pub fn add_constant(&mut self, value: Omega) -> u32 {
        if let Some(i) = self.constants.iter().position(|c| *c == value) {
            return i as u32;
        }
        self.constants.push(value);
        (self.constants.len() - 1) as u32
    }

    pub fn emit(&mut self, instruction: Instruction) -> usize {
        self.code.push(instruction);
        self.code.len() - 1
    }

    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "== program (catalog v{}, {} constant(s), {} main slot(s)) ==",
            self.catalog_version,
            self.constants.len(),
            self.main_slots
        );
        for (addr, instruction) in self.code.iter().enumerate() {
            for function in self.functions.iter().filter(|f| f.entry == addr) {
                let _ = writeln!(
                    out,
                    "-- fn {}/{} ({} slot(s)) --",
                    function.name, function.arity, function.slots
                );
            }
            let _ = writeln!(out, "{addr:04} {}", self.describe(instruction));
        }
        out
    }

    fn describe(&self, instruction: &Instruction) -> String {
        match instruction {
            Instruction::PushConst(i) => match self.constants.get(*i as usize) {
                Some(value) => format!("push_const {i} ({value})"),
                None => format!("push_const {i} (?)"),
            },
            Instruction::CallOperator { operator, argc } => {
                let name = Operator::from_id(u32::from(*operator)).map_or("?", Operator::name);
                format!("call_operator {operator} ({name}) argc={argc}")
            }
            Instruction::CallFunction { function, argc } => {
                let name = self
                    .functions
                    .get(*function as usize)
                    .map_or("?", |f| f.name.as_str());
                format!("call_function {function} ({name}) argc={argc}")
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::PushConst(i) => write!(f, "push_const {i}"),
            Instruction::LoadState => f.write_str("load_state"),
            Instruction::Load(slot) => write!(f, "load {slot}"),
            Instruction::Store(slot) => write!(f, "store {slot}"),
            Instruction::Pop => f.write_str("pop"),
            Instruction::BuildSeq(n) => write!(f, "build_seq {n}"),
            Instruction::Binary(op) => write!(f, "binary {op}"),
            Instruction::Unary(op) => write!(f, "unary {op}"),
            Instruction::CallOperator { operator, argc } => {
                write!(f, "call_operator {operator} argc={argc}")
            }
            Instruction::Jump(addr) => write!(f, "jump {addr}"),
            Instruction::JumpIfFalse(addr) => write!(f, "jump_if_false {addr}"),
            Instruction::CallFunction { function, argc } => {
                write!(f, "call_function {function} argc={argc}")
            }
            Instruction::Return => f.write_str("return"),
            Instruction::BeginObserve => f.write_str("begin_observe"),
            Instruction::EndObserve => f.write_str("end_observe"),
            Instruction::Assert { message } => write!(f, "assert {message}"),
            Instruction::Print => f.write_str("print"),
            Instruction::Halt => f.write_str("halt"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_are_deduplicated() {
        let mut program = Program::default();
        let a = program.add_constant(Omega::int(1));
        let b = program.add_constant(Omega::Empty);
        let c = program.add_constant(Omega::int(1));
        assert_eq!((a, b, c), (0, 1, 0));
        assert_eq!(program.constants.len(), 2);
    }

    #[test]
    fn test_disassemble_names_operators() {
        let mut program = Program::default();
        let k = program.add_constant(Omega::int(4));
        program.emit(Instruction::PushConst(k));
        program.emit(Instruction::CallOperator {
            operator: Operator::Wrap.id(),
            argc: 1,
        });
        program.emit(Instruction::Halt);
        let listing = program.disassemble();
        assert!(listing.contains("0000 push_const 0 (4)"));
        assert!(listing.contains("0001 call_operator 2 (wrap) argc=1"));
        assert!(listing.contains("0002 halt"));
    }

    #[test]
    fn test_instruction_json() {
        let json = serde_json::to_string(&Instruction::CallOperator {
            operator: 9,
            argc: 0,
        })
        .unwrap();
        assert_eq!(json, r#"{"call_operator":{"operator":9,"argc":0}}"#);
        assert_eq!(serde_json::to_string(&Instruction::Halt).unwrap(), r#""halt""#);
    }
}
