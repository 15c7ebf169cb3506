//! Run state shared by the VM and the interpreter.
//!
//! Both evaluators drive their operator calls through a [`Session`], which
//! is what keeps them step-for-step identical: it owns the current
//! configuration, the step counter and budget, the observe depth and the
//! optional certificate under construction.

use crate::bus::Bus;
use crate::certificate::{Certificate, CertificateBuilder, CertificateStatus};
use crate::error::{Error, Result};
use crate::omega::Omega;
use tracing::debug;

/// Outcome of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Final configuration
    pub output: Omega,
    /// Recorded operator applications
    pub steps: u64,
    /// A duality fixed point ended the program
    pub halted_early: bool,
    pub certificate: Option<Certificate>,
    /// Values of `print` statements, in execution order
    pub printed: Vec<Omega>,
}

impl Evaluation {
    /// An evaluation that applied nothing
    pub fn unrecorded(output: Omega) -> Self {
        Self {
            output,
            steps: 0,
            halted_early: false,
            certificate: None,
            printed: Vec::new(),
        }
    }
}

/// Result of one operator call
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub output: Omega,
    /// The program must stop after this call
    pub terminal: bool,
}

pub struct Session<'b> {
    bus: &'b Bus,
    source: &'static str,
    state: Omega,
    steps: u64,
    max_steps: Option<u64>,
    observing: usize,
    certificate: Option<CertificateBuilder>,
    printed: Vec<Omega>,
}

impl<'b> Session<'b> {
    pub fn new(
        bus: &'b Bus,
        source: &'static str,
        initial: Omega,
        max_steps: Option<u64>,
        certificate: bool,
    ) -> Self {
        let certificate = certificate.then(|| CertificateBuilder::new(&initial));
        Self {
            bus,
            source,
            state: initial,
            steps: 0,
            max_steps,
            observing: 0,
            certificate,
            printed: Vec::new(),
        }
    }

    pub fn state(&self) -> &Omega {
        &self.state
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_observing(&self) -> bool {
        self.observing > 0
    }

    pub fn begin_observe(&mut self) {
        self.observing += 1;
    }

    pub fn end_observe(&mut self) -> Result<()> {
        self.observing = self
            .observing
            .checked_sub(1)
            .ok_or_else(|| Error::malformed("end of observation without a beginning"))?;
        Ok(())
    }

    /// Keep the value of a `print` statement
    pub fn print(&mut self, value: Omega) {
        self.printed.push(value);
    }

    /// Apply a catalog operator through the kernel ring.
    ///
    /// The first operand is the subject and the rest are arguments; with no
    /// operands the current configuration is the subject. Outside observe
    /// mode the application is counted, certified and becomes the new
    /// configuration.
    pub fn invoke(&mut self, operator: u32, mut operands: Vec<Omega>) -> Result<Invocation> {
        let input = if operands.is_empty() {
            self.state.clone()
        } else {
            operands.remove(0)
        };
        let args = operands;

        let recording = !self.is_observing();
        if recording {
            if let Some(limit) = self.max_steps {
                if self.steps >= limit {
                    return Err(Error::BudgetExhausted { limit });
                }
            }
        }

        let (output, effect) = self
            .bus
            .apply(self.source, operator, input.clone(), args.clone())?;

        if !recording {
            return Ok(Invocation {
                output,
                terminal: false,
            });
        }

        if let Some(builder) = self.certificate.as_mut() {
            builder.record(effect.operator, &input, &args, &output);
        }
        self.steps += 1;
        self.state = output.clone();
        let terminal = effect.is_terminal();
        if terminal {
            debug!(target: "madlad::kernel", operator = %effect.operator, step = self.steps, "fixed point reached");
        }
        Ok(Invocation { output, terminal })
    }

    pub fn finish(self, halted_early: bool) -> Evaluation {
        let certificate = self
            .certificate
            .map(|builder| builder.finish(&self.state, CertificateStatus::Complete));
        Evaluation {
            output: self.state,
            steps: self.steps,
            halted_early,
            certificate,
            printed: self.printed,
        }
    }

    /// Attach the partial certificate, if one is being built, to `error`
    pub fn abort(self, error: Error) -> Error {
        match self.certificate {
            Some(builder) => Error::Aborted {
                source: Box::new(error),
                certificate: Box::new(builder.finish(&self.state, CertificateStatus::Partial)),
            },
            None => error,
        }
    }
}
