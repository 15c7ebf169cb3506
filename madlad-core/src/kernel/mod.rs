//! Operator kernel: the single source of truth for configuration transitions.
//!
//! `Kernel::apply` resolves a catalog id, checks the declared arity and runs
//! the operator. Operators are pure: the same `(operator, Ω, args)` always
//! yields the same `(Ω', effect)`.

mod catalog;
mod construction;
mod duality;
mod iteration;
mod reduction;
mod scoring;

pub use catalog::{Family, Operator, CATALOG_VERSION};

use crate::error::{Error, Result};
use crate::omega::Omega;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

const TARGET: &str = "madlad::kernel";

/// Description of what one application did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    pub operator: Operator,
    pub family: Family,
    /// The output equals the input (for duality also: the output costs nothing)
    pub fixed_point: bool,
    pub cost_before: u64,
    pub cost_after: u64,
}

impl Effect {
    /// A duality application that reached a fixed point ends the program
    pub fn is_terminal(&self) -> bool {
        self.family == Family::Duality && self.fixed_point
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): cost {} -> {}",
            self.operator, self.family, self.cost_before, self.cost_after
        )?;
        if self.fixed_point {
            f.write_str(", fixed point")?;
        }
        Ok(())
    }
}

/// Stateless operator dispatcher over the closed catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct Kernel;

impl Kernel {
    pub fn new() -> Self {
        Kernel
    }

    pub fn catalog_version(&self) -> u32 {
        CATALOG_VERSION
    }

    /// Apply the operator with catalog id `id`
    pub fn apply_id(&self, id: u32, input: &Omega, args: &[Omega]) -> Result<(Omega, Effect)> {
        let operator = Operator::from_id(id).ok_or_else(|| Error::UnknownOperator {
            operator: format!("#{id}"),
        })?;
        self.apply(operator, input, args)
    }

    pub fn apply(&self, operator: Operator, input: &Omega, args: &[Omega]) -> Result<(Omega, Effect)> {
        if args.len() != operator.arity() {
            return Err(Error::ArityMismatch {
                callee: operator.name().to_string(),
                expected: operator.arity(),
                found: args.len(),
            });
        }

        input.check_depth()?;
        for arg in args {
            arg.check_depth()?;
        }

        let output = match operator.family() {
            Family::Construction => construction::apply(operator, input, args)?,
            Family::Reduction => reduction::apply(operator, input)?,
            Family::Scoring => scoring::apply(operator, input)?,
            Family::Iteration => iteration::apply(operator, input)?,
            Family::Duality => duality::apply(operator, input)?,
        };
        output.check_depth()?;

        let cost_after = output.cost();
        let fixed_point = output == *input
            || (operator.family() == Family::Duality && cost_after == 0);
        let effect = Effect {
            operator,
            family: operator.family(),
            fixed_point,
            cost_before: input.cost(),
            cost_after,
        };
        trace!(target: TARGET, %operator, %effect, "applied");
        Ok((output, effect))
    }
}
