//! Scores and selection. Selectors keep the first candidate on ties.

use super::Operator;
use crate::error::{Error, Result};
use crate::omega::Omega;
use std::cmp::Ordering;

pub(super) fn apply(op: Operator, input: &Omega) -> Result<Omega> {
    match op {
        Operator::Cost => Ok(Omega::int(saturate(input.cost()))),
        Operator::Depth => Ok(Omega::int(saturate(input.depth()))),
        Operator::Weight => Ok(Omega::int(input.weight())),
        Operator::Size => Ok(Omega::int(saturate(input.size()))),
        Operator::SelectMin => select(op, input, |c| c.cost() as i128, Ordering::Less),
        Operator::SelectMax => select(op, input, |c| c.cost() as i128, Ordering::Greater),
        Operator::SelectShallowest => select(op, input, |c| c.depth() as i128, Ordering::Less),
        Operator::SelectHeaviest => select(op, input, |c| c.weight() as i128, Ordering::Greater),
        _ => unreachable!("{op} is not a scoring operator"),
    }
}

fn saturate(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Pick the candidate whose score compares `better` against every earlier one
fn select(
    op: Operator,
    input: &Omega,
    score: impl Fn(&Omega) -> i128,
    better: Ordering,
) -> Result<Omega> {
    let candidates = match input {
        Omega::Seq(items) if !items.is_empty() => items,
        Omega::Seq(_) => {
            return Err(Error::invalid_operand(op.name(), "no candidates to select from"))
        }
        other => {
            return Err(Error::invalid_operand(
                op.name(),
                format!("expected a sequence of candidates, found {}", other.kind()),
            ))
        }
    };

    let mut best = &candidates[0];
    let mut best_score = score(best);
    for candidate in &candidates[1..] {
        let candidate_score = score(candidate);
        if candidate_score.cmp(&best_score) == better {
            best = candidate;
            best_score = candidate_score;
        }
    }
    Ok(best.clone())
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::kernel::{Kernel, Operator};
    use crate::omega::Omega;

    fn run(op: Operator, input: Omega) -> Result<Omega, Error> {
        Kernel.apply(op, &input, &[]).map(|(out, _)| out)
    }

    #[test]
    fn test_scores() {
        let v = Omega::seq([Omega::int(2), Omega::int(5).wrap()]);
        assert_eq!(run(Operator::Cost, v.clone()), Ok(Omega::int(4)));
        assert_eq!(run(Operator::Depth, v.clone()), Ok(Omega::int(3)));
        assert_eq!(run(Operator::Weight, v.clone()), Ok(Omega::int(7)));
        assert_eq!(run(Operator::Size, v), Ok(Omega::int(2)));
        assert_eq!(run(Operator::Cost, Omega::Empty), Ok(Omega::int(0)));
    }

    #[test]
    fn test_select_extremes() {
        let small = Omega::int(1);
        let big = Omega::seq([Omega::int(1), Omega::int(2)]);
        let candidates = Omega::seq([big.clone(), small.clone()]);
        assert_eq!(run(Operator::SelectMin, candidates.clone()), Ok(small.clone()));
        assert_eq!(run(Operator::SelectMax, candidates.clone()), Ok(big.clone()));
        assert_eq!(run(Operator::SelectShallowest, candidates.clone()), Ok(small));
        assert_eq!(run(Operator::SelectHeaviest, candidates), Ok(big));
    }

    #[test]
    fn test_ties_keep_first_seen() {
        let candidates = Omega::seq([Omega::sym("a"), Omega::int(1), Omega::sym("b")]);
        assert_eq!(run(Operator::SelectMin, candidates.clone()), Ok(Omega::sym("a")));
        assert_eq!(run(Operator::SelectMax, candidates), Ok(Omega::sym("a")));
    }

    #[test]
    fn test_select_rejects_empty_and_non_sequences() {
        assert!(matches!(
            run(Operator::SelectMin, Omega::seq([])),
            Err(Error::InvalidOperand { .. })
        ));
        assert!(matches!(
            run(Operator::SelectMax, Omega::int(3)),
            Err(Error::InvalidOperand { .. })
        ));
    }
}
