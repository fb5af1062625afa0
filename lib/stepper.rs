//! The interface shared by every time-stepper.
//!
//! A stepper is built from a params struct (which doubles as its
//! unconfigured state) and is [`Phase::Ready`] until its first call to
//! [`Stepper::step`], after which it is [`Phase::Stepping`] for the rest of its
//! life. A failed step halts the stepper: the field keeps its last good value
//! and every later call returns [`StepError::Halted`].

use ndarray as nd;
use ndarray_linalg::Scalar;
use num_traits::Float;
use crate::error::{ StepError, StepResult };

/// Lifecycle of a stepper.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Configured, no steps taken.
    Ready,
    /// At least one step taken.
    Stepping,
}

/// A fixed-step integrator over a single owned field.
pub trait Stepper {
    /// Type of the evolving field.
    type Field;

    /// Advance the field by one time step.
    fn step(&mut self) -> StepResult<()>;

    /// Get a reference to the current field.
    fn state(&self) -> &Self::Field;

    /// Number of completed steps.
    fn steps(&self) -> usize;

    /// Current time step.
    fn dt(&self) -> f64;

    /// Elapsed simulation time.
    fn time(&self) -> f64;

    fn phase(&self) -> Phase {
        if self.steps() == 0 { Phase::Ready } else { Phase::Stepping }
    }

    /// Take `n` steps, stopping at the first failure.
    fn advance(&mut self, n: usize) -> StepResult<()> {
        (0..n).try_for_each(|_| self.step())
    }
}

/// Return `true` if every element of `a` is finite.
pub fn all_finite<A, D>(a: &nd::Array<A, D>) -> bool
where
    A: Scalar,
    D: nd::Dimension,
{
    a.iter().all(|x| Float::is_finite(x.re()) && Float::is_finite(x.im()))
}

// step count, elapsed time, and the halted flag
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Clock {
    pub(crate) dt: f64,
    pub(crate) steps: usize,
    pub(crate) time: f64,
    halted: bool,
}

impl Clock {
    pub(crate) fn new(dt: f64) -> Self {
        Self { dt, steps: 0, time: 0.0, halted: false }
    }

    pub(crate) fn check(&self) -> StepResult<()> {
        (!self.halted).then_some(()).ok_or(StepError::Halted)
    }

    // accept a freshly computed field if it was computed without error and is
    // finite everywhere; otherwise halt
    pub(crate) fn accept<A, D>(&mut self, next: StepResult<nd::Array<A, D>>)
        -> StepResult<nd::Array<A, D>>
    where
        A: Scalar,
        D: nd::Dimension,
    {
        let step = self.steps + 1;
        let next
            = next.and_then(|a| {
                all_finite(&a).then_some(a)
                    .ok_or(StepError::NonFinite { step })
            });
        match next {
            Ok(a) => {
                self.steps = step;
                self.time += self.dt;
                log::trace!("step {} done, t = {:.6e}", self.steps, self.time);
                Ok(a)
            },
            Err(err) => {
                log::error!("step {step} failed: {err}");
                self.halted = true;
                Err(err)
            },
        }
    }

    pub(crate) fn reset(&mut self) {
        self.steps = 0;
        self.time = 0.0;
        self.halted = false;
    }
}

#[cfg(test)]
mod tests {
    use num_complex::Complex64 as C64;
    use super::*;

    #[test]
    fn finiteness() {
        assert!(all_finite(&nd::array![1.0, -2.0, 0.0]));
        assert!(!all_finite(&nd::array![1.0, f64::NAN]));
        assert!(!all_finite(&nd::array![C64::new(0.0, f64::INFINITY)]));
    }

    #[test]
    fn clock_halts_on_failure() {
        let mut clock = Clock::new(0.5);
        let ok: StepResult<nd::Array1<f64>> = Ok(nd::array![1.0]);
        assert!(clock.accept(ok).is_ok());
        assert_eq!(clock.steps, 1);
        assert_eq!(clock.time, 0.5);
        let bad: StepResult<nd::Array1<f64>> = Ok(nd::array![f64::NAN]);
        assert!(matches!(clock.accept(bad), Err(StepError::NonFinite { step: 2 })));
        assert_eq!(clock.steps, 1);
        assert!(matches!(clock.check(), Err(StepError::Halted)));
        clock.reset();
        assert!(clock.check().is_ok());
    }
}
