//! Collection of all error types.
//!
//! All errors derive [`thiserror::Error`], making them composable when allowed
//! and compatible with application code using [`anyhow`][anyhow].
//!
//! Errors come in two kinds: [`ConfigError`] is returned while a stepper is
//! being set up, before any step is taken, and [`StepError`] is returned from
//! a step. Neither kind is recoverable within a run.
//!
//! [anyhow]: https://crates.io/crates/anyhow

use std::path::PathBuf;
use ndarray as nd;
use ndarray_linalg::error::LinalgError;
use thiserror::Error;
use crate::boundary::Boundary;

/// Returned when an operation requiring equal-length arrays encounters arrays
/// with unequal length.
#[derive(Debug, Error)]
#[error("encountered arrays with incompatible lengths; got {0} and {1}")]
pub struct LengthError(pub usize, pub usize);

impl LengthError {
    pub(crate) fn check<S, A, T, B>(
        a: &nd::ArrayBase<S, nd::Ix1>,
        b: &nd::ArrayBase<T, nd::Ix1>,
    ) -> Result<(), Self>
    where
        S: nd::Data<Elem = A>,
        T: nd::Data<Elem = B>,
    {
        let na = a.len();
        let nb = b.len();
        (na == nb).then_some(()).ok_or(Self(na, nb))
    }
}

/// Returned while building a grid, an initial state, or a stepper.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Returned when a grid axis has fewer than two points.
    #[error("grids need at least 2 points per axis; got {0}")]
    TooFewPoints(usize),

    /// Returned when a multi-channel field is given no channels.
    #[error("at least one channel is required")]
    NoChannels,

    /// Returned when grid bounds are not finite or not increasing.
    #[error("grid bounds must be finite with start < end; got ({0}, {1})")]
    BadBounds(f64, f64),

    /// Returned when a parameter that must be positive and finite is not.
    #[error("parameter `{name}` must be positive and finite; got {value}")]
    BadParameter { name: &'static str, value: f64 },

    /// Returned when a boundary token is not one of the recognized set.
    #[error("unknown boundary condition `{0}`; expected one of d(irichlet), n(eumann), p(eriodic), a(bsorbing)")]
    UnknownBoundary(String),

    /// Returned when a stepper cannot honor a boundary condition.
    #[error("{model} does not support {boundary:?} boundaries")]
    UnsupportedBoundary { model: &'static str, boundary: Boundary },

    /// Returned when an initial mode number is zero or its Bessel zero lies
    /// beyond the range that can be computed accurately.
    #[error("mode (m = {m}, n = {n}) is out of range")]
    ModeOutOfRange { m: usize, n: usize },

    /// Returned when an assembled operator could not be factorized.
    #[error("operator is singular: {0}")]
    Singular(LinalgError),

    /// Returned when a sparse 2D operator could not be assembled or
    /// factorized.
    #[error("sparse factorization failed: {0}")]
    Sparse(String),

    /// [`LengthError`]
    #[error("array length error: {0}")]
    Length(#[from] LengthError),

    /// Returned when a run file could not be read.
    #[error("unable to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },

    /// Returned when a run file could not be parsed.
    #[error("unable to parse run file: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ConfigError {
    pub(crate) fn check_points(n: usize) -> Result<(), Self> {
        (n >= 2).then_some(()).ok_or(Self::TooFewPoints(n))
    }

    pub(crate) fn check_positive(name: &'static str, value: f64)
        -> Result<(), Self>
    {
        (value.is_finite() && value > 0.0).then_some(())
            .ok_or(Self::BadParameter { name, value })
    }

    pub(crate) fn check_finite(name: &'static str, value: f64)
        -> Result<(), Self>
    {
        value.is_finite().then_some(())
            .ok_or(Self::BadParameter { name, value })
    }
}

/// Returned from a time step.
#[derive(Debug, Error)]
pub enum StepError {
    /// [`LinalgError`] raised by the linear solve.
    #[error("linear solve failed: {0}")]
    Linalg(#[from] LinalgError),

    /// Returned when a step produced a NaN or infinite sample.
    #[error("field became non-finite at step {step}")]
    NonFinite { step: usize },

    /// Returned for every step requested after a failed one.
    #[error("stepper halted by an earlier failure")]
    Halted,
}

/// Either kind of error, for callers that handle both at once.
#[derive(Debug, Error)]
pub enum FdError {
    /// [`ConfigError`]
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// [`StepError`]
    #[error("step error: {0}")]
    Step(#[from] StepError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
pub type StepResult<T> = Result<T, StepError>;

