//! Independent certificate check: re-apply every step on a fresh kernel.

use super::Certificate;
use crate::digest::Digest;
use crate::kernel::{Kernel, Operator, CATALOG_VERSION};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("certificate was produced by catalog v{found}, this kernel provides v{expected}")]
    CatalogVersion { expected: u32, found: u32 },

    #[error("step {position} is numbered {found}")]
    StepOrder { position: usize, found: u64 },

    #[error("step {step}: operator {id} is not '{name}'")]
    OperatorMismatch { step: u64, id: u8, name: String },

    #[error("step {step}: recorded input does not match its digest")]
    InputDigest { step: u64 },

    #[error("step {step}: kernel rejected the application: {message}")]
    Rejected { step: u64, message: String },

    #[error("step {step}: output digest mismatch (recorded {recorded}, replayed {replayed})")]
    OutputDigest {
        step: u64,
        recorded: Digest,
        replayed: Digest,
    },

    #[error("final digest {recorded} does not match the last recorded output {expected}")]
    FinalDigest { recorded: Digest, expected: Digest },
}

/// Summary of a successful replay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    pub steps: usize,
    pub final_digest: Digest,
    pub complete: bool,
}

pub fn replay(certificate: &Certificate) -> Result<ReplayReport, ReplayError> {
    if certificate.catalog_version != CATALOG_VERSION {
        return Err(ReplayError::CatalogVersion {
            expected: CATALOG_VERSION,
            found: certificate.catalog_version,
        });
    }

    let kernel = Kernel::new();
    let mut last_output = certificate.initial_digest;

    for (position, step) in certificate.steps.iter().enumerate() {
        if step.step_index != position as u64 {
            return Err(ReplayError::StepOrder {
                position,
                found: step.step_index,
            });
        }
        let operator = Operator::from_id(u32::from(step.operator_id))
            .filter(|op| op.name() == step.operator_name)
            .ok_or_else(|| ReplayError::OperatorMismatch {
                step: step.step_index,
                id: step.operator_id,
                name: step.operator_name.clone(),
            })?;
        if Digest::of(&step.input) != step.input_digest {
            return Err(ReplayError::InputDigest {
                step: step.step_index,
            });
        }

        let (output, _) = kernel
            .apply(operator, &step.input, &step.args)
            .map_err(|e| ReplayError::Rejected {
                step: step.step_index,
                message: e.to_string(),
            })?;
        let replayed = Digest::of(&output);
        if replayed != step.output_digest {
            return Err(ReplayError::OutputDigest {
                step: step.step_index,
                recorded: step.output_digest,
                replayed,
            });
        }
        last_output = replayed;
    }

    if certificate.final_digest != last_output {
        return Err(ReplayError::FinalDigest {
            recorded: certificate.final_digest,
            expected: last_output,
        });
    }

    debug!(
        target: super::TARGET,
        steps = certificate.len(),
        complete = certificate.is_complete(),
        "certificate replayed"
    );
    Ok(ReplayReport {
        steps: certificate.len(),
        final_digest: last_output,
        complete: certificate.is_complete(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::{CertificateBuilder, CertificateStatus};
    use crate::omega::Omega;

    fn certified_wraps(n: usize) -> Certificate {
        let mut state = Omega::Empty;
        let mut builder = CertificateBuilder::new(&state);
        for _ in 0..n {
            let next = state.clone().wrap();
            builder.record(Operator::Wrap, &state, &[], &next);
            state = next;
        }
        builder.finish(&state, CertificateStatus::Complete)
    }

    #[test]
    fn test_replay_accepts_honest_certificate() {
        let report = replay(&certified_wraps(3)).unwrap();
        assert_eq!(report.steps, 3);
        assert!(report.complete);
    }

    #[test]
    fn test_replay_of_empty_certificate_checks_initial_digest() {
        let cert = certified_wraps(0);
        assert_eq!(replay(&cert).unwrap().final_digest, Digest::of(&Omega::Empty));
    }

    #[test]
    fn test_replay_detects_tampered_output() {
        let mut cert = certified_wraps(2);
        cert.steps[1].output_digest = Digest::of(&Omega::int(9));
        assert!(matches!(
            replay(&cert),
            Err(ReplayError::OutputDigest { step: 1, .. })
        ));
    }

    #[test]
    fn test_replay_detects_swapped_operator() {
        let mut cert = certified_wraps(1);
        cert.steps[0].operator_name = "unwrap".into();
        assert!(matches!(
            replay(&cert),
            Err(ReplayError::OperatorMismatch { step: 0, .. })
        ));
    }

    #[test]
    fn test_replay_detects_reordering_and_version() {
        let mut cert = certified_wraps(2);
        cert.steps.swap(0, 1);
        assert!(matches!(replay(&cert), Err(ReplayError::StepOrder { .. })));

        let mut cert = certified_wraps(1);
        cert.catalog_version = 99;
        assert!(matches!(replay(&cert), Err(ReplayError::CatalogVersion { .. })));
    }
}
