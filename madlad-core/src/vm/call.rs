//! Function frames.

use super::{stack, Frame, Vm};
use crate::bytecode::Program;
use crate::error::{Error, Result};

pub fn call_function(vm: &mut Vm, program: &Program, function: u16, argc: u8) -> Result<()> {
    let entry = program
        .functions
        .get(function as usize)
        .ok_or_else(|| Error::malformed(format!("no function {function}")))?;
    if entry.entry >= program.code.len() {
        return Err(Error::malformed(format!(
            "function '{}' has no body",
            entry.name
        )));
    }
    if entry.arity != argc as usize {
        return Err(Error::ArityMismatch {
            callee: entry.name.clone(),
            expected: entry.arity,
            found: argc as usize,
        });
    }
    if vm.frames.len() >= vm.limits.max_call_depth {
        return Err(Error::LimitExceeded {
            what: "call depth",
            limit: vm.limits.max_call_depth,
        });
    }

    let args = stack::pop_n(vm, argc as usize)?;
    let mut frame = Frame::new(Some(function), entry.entry, entry.slots.max(entry.arity));
    for (slot, arg) in frame.slots.iter_mut().zip(args) {
        *slot = arg;
    }
    vm.frames.push(frame);
    Ok(())
}

/// Pop the current frame and hand its single remaining operand to the caller
pub fn return_from(vm: &mut Vm) -> Result<()> {
    let found = vm.frame()?.stack.len();
    if found != 1 {
        return Err(Error::FrameMismatch { expected: 1, found });
    }
    if vm.frames.len() < 2 {
        return Err(Error::malformed("return outside a function"));
    }
    let mut frame = vm
        .frames
        .pop()
        .ok_or_else(|| Error::malformed("no active frame"))?;
    let value = frame.stack.pop().ok_or(Error::StackUnderflow)?;
    stack::push(vm, value)
}
