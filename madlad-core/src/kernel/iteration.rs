//! Single-step iteration operators. Callers drive the loop and decide when
//! a fixed point or a cap has been reached.

use super::Operator;
use crate::error::{Error, Result};
use crate::omega::Omega;

pub(super) fn apply(op: Operator, input: &Omega) -> Result<Omega> {
    match op {
        Operator::Peel => Ok(match input {
            Omega::Wrap(inner) => (**inner).clone(),
            other => other.clone(),
        }),
        Operator::Decrement => input.try_map_ints(&mut |n: i64| Ok::<_, Error>(n - n.signum())),
        Operator::Halve => input.try_map_ints(&mut |n: i64| Ok::<_, Error>(n / 2)),
        Operator::DropLast => Ok(map_items(input, |items| {
            items.pop();
        })),
        Operator::Collatz => input.try_map_ints(&mut |n: i64| collatz_step(op, n)),
        Operator::Smooth => Ok(match input {
            Omega::Seq(items) => Omega::Seq(smooth(items)),
            other => other.clone(),
        }),
        Operator::Rotate => Ok(map_items(input, |items| {
            if items.len() > 1 {
                items.rotate_left(1);
            }
        })),
        Operator::Bubble => Ok(map_items(input, |items| {
            if let Some(i) = items.windows(2).position(|pair| pair[0] > pair[1]) {
                items.swap(i, i + 1);
            }
        })),
        _ => unreachable!("{op} is not an iteration operator"),
    }
}

fn map_items(value: &Omega, f: impl FnOnce(&mut Vec<Omega>)) -> Omega {
    match value {
        Omega::Seq(items) => {
            let mut items = items.clone();
            f(&mut items);
            Omega::Seq(items)
        }
        other => other.clone(),
    }
}

fn collatz_step(op: Operator, n: i64) -> Result<i64> {
    if n <= 1 {
        return Ok(n);
    }
    if n % 2 == 0 {
        return Ok(n / 2);
    }
    n.checked_mul(3)
        .and_then(|m| m.checked_add(1))
        .ok_or_else(|| Error::invalid_operand(op.name(), format!("3 * {n} + 1 overflows")))
}

/// Each integer becomes the floor average of itself and its left neighbour
fn smooth(items: &[Omega]) -> Vec<Omega> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let left = i.checked_sub(1).and_then(|j| items[j].as_int());
            match (left, item.as_int()) {
                (Some(a), Some(b)) => {
                    let avg = (i128::from(a) + i128::from(b)).div_euclid(2);
                    Omega::int(avg as i64)
                }
                _ => item.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::kernel::{Kernel, Operator};
    use crate::omega::Omega;

    fn run(op: Operator, input: Omega) -> Omega {
        Kernel.apply(op, &input, &[]).unwrap().0
    }

    fn ints(values: &[i64]) -> Omega {
        Omega::seq(values.iter().copied().map(Omega::int))
    }

    #[test]
    fn test_numeric_steps() {
        assert_eq!(run(Operator::Decrement, ints(&[3, -2, 0])), ints(&[2, -1, 0]));
        assert_eq!(run(Operator::Halve, ints(&[7, -7])), ints(&[3, -3]));
        assert_eq!(run(Operator::Collatz, ints(&[6, 7, 1])), ints(&[3, 22, 1]));
        assert!(Kernel.apply(Operator::Collatz, &Omega::int(i64::MAX), &[]).is_err());
    }

    #[test]
    fn test_structural_steps() {
        assert_eq!(run(Operator::Peel, Omega::int(1).wrap()), Omega::int(1));
        assert_eq!(run(Operator::Peel, Omega::int(1)), Omega::int(1));
        assert_eq!(run(Operator::DropLast, ints(&[1, 2])), ints(&[1]));
        assert_eq!(run(Operator::DropLast, ints(&[])), ints(&[]));
        assert_eq!(run(Operator::Rotate, ints(&[1, 2, 3])), ints(&[2, 3, 1]));
        assert_eq!(run(Operator::Bubble, ints(&[1, 3, 2, 0])), ints(&[1, 2, 3, 0]));
        assert_eq!(run(Operator::Smooth, ints(&[0, 4, 9])), ints(&[0, 2, 6]));
    }

    #[test]
    fn test_one_step_per_call() {
        let (out, effect) = Kernel.apply(Operator::Decrement, &Omega::int(5), &[]).unwrap();
        assert_eq!(out, Omega::int(4));
        assert!(!effect.fixed_point);

        let (_, effect) = Kernel.apply(Operator::Decrement, &Omega::int(0), &[]).unwrap();
        assert!(effect.fixed_point);
    }
}
