//! Closed sets of initial conditions in one and two dimensions.

use std::f64::consts::PI;
use ndarray as nd;
use num_complex::Complex64 as C64;
use serde::Deserialize;
use crate::{
    error::{ ConfigError, ConfigResult },
    grid::{ Grid1, Grid2 },
    special::{ bessel_j, bessel_zero },
};

fn def_amplitude() -> f64 { 1.0 }

/// Piecewise-constant profiles with values in `[0, 1]`, laid out by index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPattern {
    /// Ones on the lower half, `0.5` at the midpoint, zeros above.
    Half,
    /// Ones on the middle third, `0.5` at both of its edges.
    CenterBand,
    /// Ones on `[1/8, 3/8)` and `[5/8, 7/8)` of the points.
    TwoBands,
    /// Ones everywhere.
    Uniform,
}

impl StepPattern {
    /// Evaluate over `n` points.
    pub fn sample(self, n: usize) -> nd::Array1<f64> {
        match self {
            Self::Half => {
                let h = n / 2;
                (0..n).map(|k| {
                    if k + 1 < h { 1.0 } else if k + 1 == h { 0.5 } else { 0.0 }
                })
                .collect()
            },
            Self::CenterBand => {
                let b = n / 3;
                (0..n).map(|k| {
                    if k < b || k + b + 1 > n {
                        0.0
                    } else if k == b || k + b + 1 == n {
                        0.5
                    } else {
                        1.0
                    }
                })
                .collect()
            },
            Self::TwoBands => {
                let e = n / 8;
                (0..n).map(|k| {
                    let first = (e..3 * e).contains(&k);
                    let second = (n - 3 * e..n - e).contains(&k);
                    if first || second { 1.0 } else { 0.0 }
                })
                .collect()
            },
            Self::Uniform => nd::Array1::ones(n),
        }
    }
}

/// Initial field over a 1D grid.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Initial1D {
    /// `amplitude * exp(-(x - center)^2 / (2 width^2)) * exp(i wavenumber (x - center))`
    Gaussian {
        center: f64,
        width: f64,
        #[serde(default)]
        wavenumber: f64,
        #[serde(default = "def_amplitude")]
        amplitude: f64,
    },
    /// Zero everywhere.
    Zero,
    /// One of the fixed [`StepPattern`]s.
    Step { pattern: StepPattern },
    /// Standing wave `amplitude * sin(number π (x - start) / (end - start))`.
    Mode {
        number: usize,
        #[serde(default = "def_amplitude")]
        amplitude: f64,
    },
}

impl Initial1D {
    fn check(&self) -> ConfigResult<()> {
        match *self {
            Self::Gaussian { center, width, wavenumber, amplitude } => {
                ConfigError::check_finite("center", center)?;
                ConfigError::check_positive("width", width)?;
                ConfigError::check_finite("wavenumber", wavenumber)?;
                ConfigError::check_finite("amplitude", amplitude)?;
            },
            Self::Mode { number, amplitude } => {
                (number > 0).then_some(())
                    .ok_or(ConfigError::ModeOutOfRange { m: 0, n: number })?;
                ConfigError::check_finite("amplitude", amplitude)?;
            },
            Self::Zero | Self::Step { .. } => { },
        }
        Ok(())
    }

    /// Evaluate on a grid as a complex field.
    pub fn sample(&self, grid: &Grid1) -> ConfigResult<nd::Array1<C64>> {
        self.check()?;
        let field: nd::Array1<C64>
            = match *self {
                Self::Gaussian { center, width, wavenumber, amplitude } => {
                    grid.map(|x| {
                        let u = x - center;
                        amplitude
                            * (-u.powi(2) / (2.0 * width.powi(2))).exp()
                            * C64::cis(wavenumber * u)
                    })
                },
                _ => self.sample_real(grid)?.mapv(C64::from),
            };
        Ok(field)
    }

    /// Evaluate on a grid as a real field.
    ///
    /// For a Gaussian with non-zero wavenumber this is the real part of
    /// [`Self::sample`].
    pub fn sample_real(&self, grid: &Grid1) -> ConfigResult<nd::Array1<f64>> {
        self.check()?;
        let field: nd::Array1<f64>
            = match *self {
                Self::Gaussian { .. } => self.sample(grid)?.mapv(|z| z.re),
                Self::Zero => nd::Array1::zeros(grid.len()),
                Self::Step { pattern } => pattern.sample(grid.len()),
                Self::Mode { number, amplitude } => {
                    let k = number as f64 * PI / grid.width();
                    let x0 = grid.start();
                    grid.map(|x| amplitude * (k * (x - x0)).sin())
                },
            };
        Ok(field)
    }
}

/// Initial field over a 2D grid.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Initial2D {
    /// Isotropic Gaussian packet with wavevector `(kx, ky)`.
    Gaussian {
        center: (f64, f64),
        width: f64,
        #[serde(default)]
        wavenumber: (f64, f64),
        #[serde(default = "def_amplitude")]
        amplitude: f64,
    },
    /// Zero everywhere.
    Zero,
    /// Constant everywhere.
    Uniform { value: f64 },
    /// Normal mode `J_m(j_mn r) (sin mθ + cos mθ)` of a unit-radius circular
    /// membrane centered at the origin; zero outside the membrane.
    Drum {
        m: usize,
        n: usize,
        #[serde(default = "def_amplitude")]
        amplitude: f64,
    },
}

impl Initial2D {
    /// Evaluate on a grid as a complex field; shape `(ny, nx)`.
    pub fn sample(&self, grid: &Grid2) -> ConfigResult<nd::Array2<C64>> {
        match *self {
            Self::Gaussian { center: (cx, cy), width, wavenumber: (kx, ky), amplitude } => {
                ConfigError::check_finite("center", cx)?;
                ConfigError::check_finite("center", cy)?;
                ConfigError::check_positive("width", width)?;
                ConfigError::check_finite("wavenumber", kx)?;
                ConfigError::check_finite("wavenumber", ky)?;
                ConfigError::check_finite("amplitude", amplitude)?;
                Ok(grid.map(|x, y| {
                    let (u, v) = (x - cx, y - cy);
                    amplitude
                        * (-(u.powi(2) + v.powi(2)) / (2.0 * width.powi(2))).exp()
                        * C64::cis(kx * u + ky * v)
                }))
            },
            _ => Ok(self.sample_real(grid)?.mapv(C64::from)),
        }
    }

    /// Evaluate on a grid as a real field; shape `(ny, nx)`.
    pub fn sample_real(&self, grid: &Grid2) -> ConfigResult<nd::Array2<f64>> {
        match *self {
            Self::Gaussian { .. } => Ok(self.sample(grid)?.mapv(|z| z.re)),
            Self::Zero => Ok(nd::Array2::zeros(grid.shape())),
            Self::Uniform { value } => {
                ConfigError::check_finite("value", value)?;
                Ok(nd::Array2::from_elem(grid.shape(), value))
            },
            Self::Drum { m, n, amplitude } => {
                ConfigError::check_finite("amplitude", amplitude)?;
                let k = bessel_zero(m, n)?;
                let mf = m as f64;
                Ok(grid.map(|x, y| {
                    let r = x.hypot(y);
                    if r < 1.0 {
                        let th = y.atan2(x);
                        amplitude * bessel_j(m, k * r)
                            * ((mf * th).sin() + (mf * th).cos())
                    } else {
                        0.0
                    }
                }))
            },
        }
    }
}
