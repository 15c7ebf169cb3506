//! Operand stack of the current frame.

use super::Vm;
use crate::error::{Error, Result};
use crate::omega::Omega;

pub fn push(vm: &mut Vm, value: Omega) -> Result<()> {
    let limit = vm.limits.max_stack_size;
    let frame = vm.frame_mut()?;
    if frame.stack.len() >= limit {
        return Err(Error::LimitExceeded {
            what: "operand stack",
            limit,
        });
    }
    frame.stack.push(value);
    Ok(())
}

pub fn pop(vm: &mut Vm) -> Result<Omega> {
    vm.frame_mut()?.stack.pop().ok_or(Error::StackUnderflow)
}

/// Pop `n` values, returned in push order
pub fn pop_n(vm: &mut Vm, n: usize) -> Result<Vec<Omega>> {
    let stack = &mut vm.frame_mut()?.stack;
    if stack.len() < n {
        return Err(Error::StackUnderflow);
    }
    let at = stack.len() - n;
    Ok(stack.split_off(at))
}
