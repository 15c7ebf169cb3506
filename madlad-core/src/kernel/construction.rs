use super::Operator;
use crate::error::{Error, Result};
use crate::omega::Omega;

/// Deepest nesting `nest` will build
const MAX_NEST: i64 = 64;

pub(super) fn apply(op: Operator, input: &Omega, args: &[Omega]) -> Result<Omega> {
    let name = op.name();
    match op {
        Operator::ConstructEmpty => Ok(Omega::Empty),
        Operator::Wrap => Ok(input.clone().wrap()),
        Operator::Unwrap => match input {
            Omega::Wrap(inner) => Ok((**inner).clone()),
            other => Err(Error::invalid_operand(
                name,
                format!("expected a wrapped configuration, found {}", other.kind()),
            )),
        },
        Operator::Singleton => Ok(Omega::seq([input.clone()])),
        Operator::Pair => Ok(Omega::seq([input.clone(), args[0].clone()])),
        Operator::Append => match input {
            Omega::Seq(items) => {
                let mut items = items.clone();
                items.push(args[0].clone());
                Ok(Omega::Seq(items))
            }
            other => Err(Error::invalid_operand(
                name,
                format!("expected a sequence, found {}", other.kind()),
            )),
        },
        Operator::Concat => match (input, &args[0]) {
            (Omega::Seq(left), Omega::Seq(right)) => {
                Ok(Omega::Seq(left.iter().chain(right).cloned().collect()))
            }
            (left, right) => Err(Error::invalid_operand(
                name,
                format!("expected two sequences, found {} and {}", left.kind(), right.kind()),
            )),
        },
        Operator::Nest => {
            let levels = args[0]
                .as_int()
                .filter(|n| (0..=MAX_NEST).contains(n))
                .ok_or_else(|| {
                    Error::invalid_operand(name, format!("nesting level must be an int in 0..={MAX_NEST}"))
                })?;
            Ok((0..levels).fold(input.clone(), |acc, _| acc.wrap()))
        }
        _ => unreachable!("{op} is not a construction operator"),
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::kernel::{Kernel, Operator};
    use crate::omega::Omega;

    fn run(op: Operator, input: Omega, args: &[Omega]) -> Result<Omega, Error> {
        Kernel.apply(op, &input, args).map(|(out, _)| out)
    }

    #[test]
    fn test_construct_and_wrap() {
        assert_eq!(run(Operator::ConstructEmpty, Omega::int(9), &[]), Ok(Omega::Empty));
        assert_eq!(run(Operator::Wrap, Omega::Empty, &[]), Ok(Omega::Empty.wrap()));
        assert_eq!(run(Operator::Unwrap, Omega::int(1).wrap(), &[]), Ok(Omega::int(1)));
        assert!(matches!(
            run(Operator::Unwrap, Omega::int(1), &[]),
            Err(Error::InvalidOperand { .. })
        ));
    }

    #[test]
    fn test_sequences() {
        assert_eq!(
            run(Operator::Pair, Omega::int(1), &[Omega::int(2)]),
            Ok(Omega::seq([Omega::int(1), Omega::int(2)]))
        );
        assert_eq!(
            run(Operator::Append, Omega::seq([Omega::int(1)]), &[Omega::Empty]),
            Ok(Omega::seq([Omega::int(1), Omega::Empty]))
        );
        assert_eq!(
            run(
                Operator::Concat,
                Omega::seq([Omega::int(1)]),
                &[Omega::seq([Omega::int(2)])]
            ),
            Ok(Omega::seq([Omega::int(1), Omega::int(2)]))
        );
        assert!(run(Operator::Append, Omega::int(1), &[Omega::Empty]).is_err());
        assert!(run(Operator::Concat, Omega::seq([]), &[Omega::int(2)]).is_err());
    }

    #[test]
    fn test_nest() {
        assert_eq!(
            run(Operator::Nest, Omega::Empty, &[Omega::int(3)]),
            Ok(Omega::Empty.wrap().wrap().wrap())
        );
        assert_eq!(run(Operator::Nest, Omega::int(4), &[Omega::int(0)]), Ok(Omega::int(4)));
        assert!(run(Operator::Nest, Omega::Empty, &[Omega::int(65)]).is_err());
        assert!(run(Operator::Nest, Omega::Empty, &[Omega::bool(true)]).is_err());
    }
}
