//! Reduction operators. Each maps a configuration to the representative of
//! its equivalence class, so applying one twice changes nothing.

use super::Operator;
use crate::error::{Error, Result};
use crate::omega::Omega;
use std::collections::HashSet;

pub(super) fn apply(op: Operator, input: &Omega) -> Result<Omega> {
    match op {
        Operator::Reduce => Ok(canonical(input)),
        Operator::Dedup => Ok(map_seq(input, |items| {
            let mut seen = HashSet::new();
            items.iter().filter(|item| seen.insert(*item)).cloned().collect()
        })),
        Operator::Sort => Ok(map_seq(input, |items| {
            let mut items = items.to_vec();
            items.sort();
            items
        })),
        Operator::Flatten => Ok(map_seq(input, |items| {
            let mut leaves = Vec::new();
            push_leaves(items, &mut leaves);
            leaves
        })),
        Operator::Collapse => Ok(collapse(input)),
        Operator::Prune => Ok(prune(input)),
        Operator::Magnitude => input.try_map_ints(&mut |n: i64| {
            n.checked_abs()
                .ok_or_else(|| Error::invalid_operand(op.name(), format!("{n} has no magnitude in range")))
        }),
        Operator::Signum => input.try_map_ints(&mut |n: i64| Ok::<_, Error>(n.signum())),
        _ => unreachable!("{op} is not a reduction operator"),
    }
}

/// Sequences become sorted sets, recursively
pub fn canonical(value: &Omega) -> Omega {
    match value {
        Omega::Wrap(inner) => canonical(inner).wrap(),
        Omega::Seq(items) => {
            let mut items: Vec<Omega> = items.iter().map(canonical).collect();
            items.sort();
            items.dedup();
            Omega::Seq(items)
        }
        other => other.clone(),
    }
}

fn map_seq(value: &Omega, f: impl FnOnce(&[Omega]) -> Vec<Omega>) -> Omega {
    match value {
        Omega::Seq(items) => Omega::Seq(f(items)),
        other => other.clone(),
    }
}

fn push_leaves(items: &[Omega], out: &mut Vec<Omega>) {
    for item in items {
        match item {
            Omega::Seq(inner) => push_leaves(inner, out),
            leaf => out.push(leaf.clone()),
        }
    }
}

fn collapse(value: &Omega) -> Omega {
    match value {
        Omega::Wrap(inner) => {
            let mut core: &Omega = inner;
            while let Omega::Wrap(next) = core {
                core = next;
            }
            collapse(core).wrap()
        }
        Omega::Seq(items) => Omega::Seq(items.iter().map(collapse).collect()),
        other => other.clone(),
    }
}

fn prune(value: &Omega) -> Omega {
    match value {
        Omega::Wrap(inner) => prune(inner).wrap(),
        Omega::Seq(items) => Omega::Seq(
            items
                .iter()
                .filter(|item| !item.is_empty())
                .map(prune)
                .collect(),
        ),
        other => other.clone(),
    }
}
