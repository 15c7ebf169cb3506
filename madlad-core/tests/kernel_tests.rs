//! Catalog-wide properties of the operator kernel

mod common;

use common::samples;
use madlad_core::{Error, Family, Kernel, Omega, Operator};

#[test]
fn test_catalog_is_closed_and_dense() {
    assert_eq!(Operator::ALL.len(), 40);
    for (i, op) in Operator::ALL.iter().enumerate() {
        assert_eq!(op.id() as usize, i + 1);
        assert_eq!(Operator::from_name(op.name()), Some(*op));
        assert_eq!(Operator::from_id(u32::from(op.id())), Some(*op));
    }
    assert_eq!(Operator::from_id(0), None);
    assert_eq!(Operator::from_id(41), None);
}

#[test]
fn test_each_family_has_eight_operators() {
    for family in [
        Family::Construction,
        Family::Reduction,
        Family::Scoring,
        Family::Iteration,
        Family::Duality,
    ] {
        let count = Operator::ALL.iter().filter(|op| op.family() == family).count();
        assert_eq!(count, 8, "{family}");
    }
}

#[test]
fn test_reduction_is_idempotent() {
    let kernel = Kernel::new();
    for op in Operator::ALL.iter().filter(|op| op.family() == Family::Reduction) {
        for input in samples() {
            let Ok((once, _)) = kernel.apply(*op, &input, &[]) else {
                continue;
            };
            let (twice, effect) = kernel.apply(*op, &once, &[]).unwrap();
            assert_eq!(twice, once, "{op} on {input}");
            assert!(effect.fixed_point);
        }
    }
}

#[test]
fn test_duality_is_an_involution() {
    let kernel = Kernel::new();
    for op in Operator::ALL.iter().filter(|op| op.family() == Family::Duality) {
        for input in samples() {
            match kernel.apply(*op, &input, &[]) {
                Ok((once, _)) => {
                    let (back, _) = kernel.apply(*op, &once, &[]).unwrap();
                    assert_eq!(back, input, "{op} on {input}");
                }
                Err(err) => assert!(
                    matches!(
                        err,
                        Error::InvalidOperand { .. } | Error::DualityViolation { .. }
                    ),
                    "{op} on {input}: {err}"
                ),
            }
        }
    }
}

#[test]
fn test_arity_is_enforced_for_every_operator() {
    let kernel = Kernel::new();
    for op in Operator::ALL {
        let wrong = vec![Omega::int(1); op.arity() + 1];
        let err = kernel.apply(op, &Omega::Empty, &wrong).unwrap_err();
        assert_eq!(
            err,
            Error::ArityMismatch {
                callee: op.name().to_string(),
                expected: op.arity(),
                found: op.arity() + 1,
            }
        );
    }
}

#[test]
fn test_application_is_deterministic() {
    let kernel = Kernel::new();
    for op in Operator::ALL {
        let args = vec![Omega::int(1); op.arity()];
        for input in samples() {
            assert_eq!(
                kernel.apply(op, &input, &args),
                kernel.apply(op, &input, &args),
                "{op} on {input}"
            );
        }
    }
}

#[test]
fn test_selection_keeps_first_seen_on_ties() {
    let kernel = Kernel::new();
    let candidates = Omega::seq([Omega::sym("a"), Omega::sym("b"), Omega::int(7)]);
    let (chosen, _) = kernel.apply(Operator::SelectMin, &candidates, &[]).unwrap();
    assert_eq!(chosen, Omega::sym("a"));
    let (chosen, _) = kernel.apply(Operator::SelectMax, &candidates, &[]).unwrap();
    assert_eq!(chosen, Omega::sym("a"));
}

#[test]
fn test_selection_rejects_empty_candidates() {
    let err = Kernel::new()
        .apply(Operator::SelectMin, &Omega::seq([]), &[])
        .unwrap_err();
    assert_eq!(err.kind(), "InvalidOperand");
}
