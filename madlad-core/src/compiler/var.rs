//! Slot allocation for lexically scoped variables.

use super::Compiler;
use crate::error::{Error, Result};

/// A visible variable and the slot it lives in
#[derive(Debug, Clone)]
pub struct Local {
    pub name: String,
    pub depth: usize,
    pub slot: u16,
}

pub fn begin_scope(compiler: &mut Compiler) {
    compiler.scope_depth += 1;
}

/// Close the innermost scope; returns how many locals went out of view
pub fn end_scope(compiler: &mut Compiler) -> usize {
    compiler.scope_depth -= 1;

    let mut popped = 0;
    while let Some(local) = compiler.locals.last() {
        if local.depth <= compiler.scope_depth {
            break;
        }
        compiler.locals.pop();
        popped += 1;
    }
    popped
}

fn add_local(compiler: &mut Compiler, name: &str) -> Result<u16> {
    let slot = u16::try_from(compiler.locals.len()).map_err(|_| Error::LimitExceeded {
        what: "local slot",
        limit: u16::MAX as usize,
    })?;
    compiler.locals.push(Local {
        name: name.to_string(),
        depth: compiler.scope_depth,
        slot,
    });
    compiler.max_slots = compiler.max_slots.max(compiler.locals.len());
    Ok(slot)
}

/// Declare `name` in the current scope. Redeclaring in the same scope
/// reuses the slot.
pub fn declare(compiler: &mut Compiler, name: &str) -> Result<u16> {
    for local in compiler.locals.iter().rev() {
        if local.depth < compiler.scope_depth {
            break;
        }
        if local.name == name {
            return Ok(local.slot);
        }
    }
    add_local(compiler, name)
}

/// Slot of the innermost visible `name`
pub fn resolve_local(compiler: &Compiler, name: &str) -> Option<u16> {
    compiler
        .locals
        .iter()
        .rev()
        .find(|local| local.name == name)
        .map(|local| local.slot)
}

/// Slot for a bare binding: the visible variable, or a new one in the
/// current scope
pub fn assign_or_declare(compiler: &mut Compiler, name: &str) -> Result<u16> {
    match resolve_local(compiler, name) {
        Some(slot) => Ok(slot),
        None => declare(compiler, name),
    }
}

/// Compiler-internal slot no source name can refer to
pub fn hidden(compiler: &mut Compiler, purpose: &str) -> Result<u16> {
    add_local(compiler, &format!("${purpose}"))
}
