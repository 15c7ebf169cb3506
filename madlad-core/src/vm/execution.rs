//! Fetch-decode-execute loop.

use super::{call, stack, Outcome, Vm, TARGET};
use crate::bytecode::{Instruction, Program};
use crate::error::{Error, Result};
use crate::omega::Omega;
use crate::ops;
use crate::session::Session;
use tracing::{info, trace};

pub fn run(vm: &mut Vm, program: &Program, session: &mut Session) -> Result<Outcome> {
    loop {
        let instruction = fetch(vm, program)?;
        trace!(target: TARGET, pc = vm.fault_pc, depth = vm.frames.len(), %instruction);

        match instruction {
            Instruction::PushConst(index) => {
                let value = program
                    .constants
                    .get(index as usize)
                    .cloned()
                    .ok_or_else(|| Error::malformed(format!("no constant {index}")))?;
                stack::push(vm, value)?;
            }
            Instruction::LoadState => {
                let state = session.state().clone();
                stack::push(vm, state)?;
            }
            Instruction::Load(slot) => {
                let value = vm
                    .frame()?
                    .slots
                    .get(slot as usize)
                    .cloned()
                    .ok_or_else(|| Error::malformed(format!("no slot {slot}")))?;
                stack::push(vm, value)?;
            }
            Instruction::Store(slot) => {
                let value = stack::pop(vm)?;
                let target = vm
                    .frame_mut()?
                    .slots
                    .get_mut(slot as usize)
                    .ok_or_else(|| Error::malformed(format!("no slot {slot}")))?;
                *target = value;
            }
            Instruction::Pop => {
                stack::pop(vm)?;
            }
            Instruction::BuildSeq(n) => {
                let items = stack::pop_n(vm, n as usize)?;
                let seq = Omega::Seq(items);
                seq.check_depth()?;
                stack::push(vm, seq)?;
            }
            Instruction::Binary(op) => {
                let right = stack::pop(vm)?;
                let left = stack::pop(vm)?;
                stack::push(vm, op.evaluate(&left, &right)?)?;
            }
            Instruction::Unary(op) => {
                let operand = stack::pop(vm)?;
                stack::push(vm, op.evaluate(&operand)?)?;
            }
            Instruction::CallOperator { operator, argc } => {
                let operands = stack::pop_n(vm, argc as usize)?;
                let invocation = session.invoke(u32::from(operator), operands)?;
                stack::push(vm, invocation.output)?;
                if invocation.terminal {
                    return Ok(Outcome::FixedPoint);
                }
            }
            Instruction::Jump(target) => {
                vm.frame_mut()?.pc = target as usize;
            }
            Instruction::JumpIfFalse(target) => {
                let value = stack::pop(vm)?;
                if !ops::condition(&value)? {
                    vm.frame_mut()?.pc = target as usize;
                }
            }
            Instruction::CallFunction { function, argc } => {
                call::call_function(vm, program, function, argc)?;
            }
            Instruction::Return => {
                call::return_from(vm)?;
            }
            Instruction::BeginObserve => session.begin_observe(),
            Instruction::EndObserve => session.end_observe()?,
            Instruction::Assert { message } => {
                let value = stack::pop(vm)?;
                if !ops::condition(&value)? {
                    return Err(Error::AssertionFailed {
                        message: assertion_message(program, message),
                    });
                }
            }
            Instruction::Print => {
                let value = stack::pop(vm)?;
                info!(target: TARGET, %value, "print");
                session.print(value);
            }
            Instruction::Halt => {
                if vm.frames.len() != 1 {
                    return Err(Error::malformed("halt inside a function"));
                }
                let found = vm.frame()?.stack.len();
                if found != 0 {
                    return Err(Error::FrameMismatch { expected: 0, found });
                }
                return Ok(Outcome::Halted);
            }
        }
    }
}

fn fetch(vm: &mut Vm, program: &Program) -> Result<Instruction> {
    let pc = vm.frame()?.pc;
    vm.fault_pc = pc;
    let instruction = *program
        .code
        .get(pc)
        .ok_or_else(|| Error::malformed(format!("pc {pc} is outside the code")))?;
    vm.frame_mut()?.pc = pc + 1;
    Ok(instruction)
}

fn assertion_message(program: &Program, index: u32) -> String {
    match program.constants.get(index as usize) {
        Some(value) => value.as_sym().map_or_else(|| value.to_string(), str::to_string),
        None => format!("assertion {index}"),
    }
}
