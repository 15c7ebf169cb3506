//! Duality operators. Every one is checked to be an involution on the value
//! it was applied to; a failure is reported, never corrected.

use super::Operator;
use crate::error::{Error, Result};
use crate::omega::{Omega, Scalar};

pub(super) fn apply(op: Operator, input: &Omega) -> Result<Omega> {
    let output = counterpart(op, input)?;
    let back = counterpart(op, &output)?;
    if back != *input {
        return Err(violation(op, input));
    }
    Ok(output)
}

fn violation(op: Operator, input: &Omega) -> Error {
    Error::DualityViolation {
        operator: op.name().to_string(),
        input: input.to_string(),
    }
}

fn counterpart(op: Operator, input: &Omega) -> Result<Omega> {
    match op {
        Operator::Dual => dual(op, input),
        Operator::Negate => input.try_map_ints(&mut |n: i64| n.checked_neg().ok_or_else(|| violation(op, input))),
        Operator::Complement => Ok(map_scalars(input, &|scalar: &Scalar| match scalar {
            Scalar::Bool(b) => Scalar::Bool(!b),
            other => other.clone(),
        })),
        Operator::Mirror => Ok(mirror(input)),
        Operator::Transpose => transpose(op, input),
        Operator::SwapPair => match input {
            Omega::Seq(items) if items.len() == 2 => {
                Ok(Omega::seq([items[1].clone(), items[0].clone()]))
            }
            other => Err(Error::invalid_operand(
                op.name(),
                format!("expected a two-element sequence, found {other}"),
            )),
        },
        Operator::ReverseSymbol => Ok(map_scalars(input, &|scalar: &Scalar| match scalar {
            Scalar::Sym(s) => Scalar::Sym(s.chars().rev().collect()),
            other => other.clone(),
        })),
        Operator::SwapHalves => Ok(match input {
            Omega::Seq(items) => Omega::Seq(swap_halves(items)),
            other => other.clone(),
        }),
        _ => unreachable!("{op} is not a duality operator"),
    }
}

fn dual(op: Operator, value: &Omega) -> Result<Omega> {
    Ok(match value {
        Omega::Empty => Omega::Empty,
        Omega::Wrap(inner) => dual(op, inner)?.wrap(),
        Omega::Seq(items) => Omega::Seq(
            items
                .iter()
                .rev()
                .map(|item| dual(op, item))
                .collect::<Result<_>>()?,
        ),
        Omega::Scalar(Scalar::Int(n)) => {
            Omega::int(n.checked_neg().ok_or_else(|| violation(op, value))?)
        }
        Omega::Scalar(Scalar::Bool(b)) => Omega::bool(!b),
        Omega::Scalar(Scalar::Sym(s)) => Omega::sym(s.chars().rev().collect::<String>()),
    })
}

fn map_scalars(value: &Omega, f: &impl Fn(&Scalar) -> Scalar) -> Omega {
    match value {
        Omega::Scalar(scalar) => Omega::Scalar(f(scalar)),
        Omega::Wrap(inner) => map_scalars(inner, f).wrap(),
        Omega::Seq(items) => Omega::Seq(items.iter().map(|item| map_scalars(item, f)).collect()),
        Omega::Empty => Omega::Empty,
    }
}

fn mirror(value: &Omega) -> Omega {
    match value {
        Omega::Wrap(inner) => mirror(inner).wrap(),
        Omega::Seq(items) => Omega::Seq(items.iter().rev().map(mirror).collect()),
        other => other.clone(),
    }
}

fn transpose(op: Operator, value: &Omega) -> Result<Omega> {
    let rows = value.as_seq().ok_or_else(|| {
        Error::invalid_operand(op.name(), format!("expected a matrix, found {}", value.kind()))
    })?;
    let rows: Vec<&[Omega]> = rows
        .iter()
        .map(|row| {
            row.as_seq()
                .ok_or_else(|| Error::invalid_operand(op.name(), "every row must be a sequence"))
        })
        .collect::<Result<_>>()?;

    let width = rows.first().map_or(0, |row| row.len());
    if rows.iter().any(|row| row.len() != width) {
        return Err(Error::invalid_operand(op.name(), "rows have different lengths"));
    }

    Ok(Omega::Seq(
        (0..width)
            .map(|j| Omega::Seq(rows.iter().map(|row| row[j].clone()).collect()))
            .collect(),
    ))
}

fn swap_halves(items: &[Omega]) -> Vec<Omega> {
    let half = items.len() / 2;
    let right_start = items.len() - half;
    let mut out = Vec::with_capacity(items.len());
    out.extend_from_slice(&items[right_start..]);
    out.extend_from_slice(&items[half..right_start]);
    out.extend_from_slice(&items[..half]);
    out
}
