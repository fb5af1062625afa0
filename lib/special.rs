//! Bessel functions of the first kind and their zeros, as needed for the
//! normal modes of a circular membrane.
//!
//! ```
//! use fdstep::special::{ bessel_j, bessel_zero };
//!
//! let j01 = bessel_zero(0, 1).unwrap();
//! assert!((j01 - 2.404825557695773).abs() < 1e-9);
//! assert!(bessel_j(0, j01).abs() < 1e-12);
//!
//! let j23 = bessel_zero(2, 3).unwrap();
//! assert!((j23 - 11.61984117).abs() < 1e-7);
//! ```

use std::cmp;
use ndarray as nd;
use num_traits::Num;
use crate::error::{ ConfigError, ConfigResult, LengthError };

/// Largest argument for which the power series is trusted.
pub const BESSEL_XMAX: f64 = 20.0;

// sample spacing for the sign-change scan
const SCAN_STEP: f64 = 0.05;

/// Compute the Bessel function of the first kind `J_m(x)` by its power
/// series.
///
/// Accurate to roughly 1e-9 for `|x| <=` [`BESSEL_XMAX`]; cancellation between
/// terms degrades it quickly beyond that.
pub fn bessel_j(m: usize, x: f64) -> f64 {
    let h = x / 2.0;
    let mut term: f64 = (1..=m).fold(1.0, |acc, k| acc * h / k as f64);
    let mut sum = term;
    let mut k: usize = 0;
    loop {
        k += 1;
        term *= -h * h / (k * (k + m)) as f64;
        sum += term;
        if k as f64 > h && term.abs() <= f64::EPSILON * sum.abs() { break; }
        if k > 200 { break; }
    }
    sum
}

/// Compute the derivative `J_m'(x) = (m / x) J_m(x) - J_{m + 1}(x)`.
pub fn bessel_j_deriv(m: usize, x: f64) -> f64 {
    if x == 0.0 {
        return match m { 1 => 0.5, _ => 0.0 };
    }
    m as f64 / x * bessel_j(m, x) - bessel_j(m + 1, x)
}

/// Compute the value of a sampled function via a Lagrange polynomial.
pub fn lagrange<S, T, A>(
    data_x: &nd::ArrayBase<S, nd::Ix1>,
    data_y: &nd::ArrayBase<T, nd::Ix1>,
    x: A,
) -> Result<A, LengthError>
where
    S: nd::Data<Elem = A>,
    T: nd::Data<Elem = A>,
    A: Num + Copy,
{
    LengthError::check(data_x, data_y)?;
    let res: A
        = data_x.iter().zip(data_y).enumerate()
        .map(|(j, (xj, yj))| {
            let xj = *xj;
            let inner
                = data_x.iter().enumerate()
                .filter(|(m, _)| *m != j)
                .map(|(_, xm)| (x - *xm) / (xj - *xm))
                .fold(A::one(), A::mul);
            *yj * inner
        })
        .fold(A::zero(), A::add);
    Ok(res)
}

/// Find the `n`-th positive zero `j_{m,n}` of `J_m` (`n` counts from 1).
///
/// Zeros are bracketed by scanning for sign changes, located by inverse
/// Lagrange interpolation over the four nearest samples, then polished with a
/// few Newton steps. Fails with [`ConfigError::ModeOutOfRange`] if `n == 0` or
/// the zero lies beyond [`BESSEL_XMAX`].
pub fn bessel_zero(m: usize, n: usize) -> ConfigResult<f64> {
    (n > 0).then_some(()).ok_or(ConfigError::ModeOutOfRange { m, n })?;
    let npts = (BESSEL_XMAX / SCAN_STEP).round() as usize;
    let x: nd::Array1<f64>
        = (1..=npts).map(|k| k as f64 * SCAN_STEP).collect();
    let y: nd::Array1<f64> = x.mapv(|xk| bessel_j(m, xk));
    let i
        = y.iter().zip(y.iter().skip(1)).enumerate()
        .filter(|(_, (yl, yr))| **yl * **yr <= 0.0 && **yl != 0.0)
        .map(|(i, _)| i + 1)
        .nth(n - 1)
        .ok_or(ConfigError::ModeOutOfRange { m, n })?;
    let il = i.saturating_sub(2);
    let ir = cmp::min(npts, i + 2);
    let mut z: f64
        = lagrange(&y.slice(nd::s![il..ir]), &x.slice(nd::s![il..ir]), 0.0)?;
    for _ in 0..4 {
        let d = bessel_j_deriv(m, z);
        if d == 0.0 { break; }
        z -= bessel_j(m, z) / d;
    }
    log::debug!("bessel zero j({m}, {n}) = {z:.12}");
    Ok(z)
}
