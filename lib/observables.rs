//! Scalar and array diagnostics of stepper fields.

use std::f64::consts::TAU;
use ndarray::{ self as nd, Ix1, concatenate };
use ndarray_linalg::Scalar;
use num_complex::Complex64 as C64;
use rustfft as fft;
use crate::{ Arr1, Arr2 };

/// Integrate using the trapezoidal rule.
///
/// *Panics if `y` has length less than 2*.
pub fn trapz<S, A>(y: &nd::ArrayBase<S, Ix1>, dx: A) -> A
where
    S: nd::Data<Elem = A>,
    A: Scalar,
{
    let n: usize = y.len();
    let two = A::one() + A::one();
    (dx / two) * (y[0] + two * y.slice(nd::s![1..n - 1]).sum() + y[n - 1])
}

/// Compute `|ψ|²` pointwise.
pub fn density<S, D>(psi: &nd::ArrayBase<S, D>) -> nd::Array<f64, D>
where
    S: nd::Data<Elem = C64>,
    D: nd::Dimension,
{
    psi.mapv(|z| z.norm_sqr())
}

/// Compute the total probability `Σ |ψ|² dx`.
pub fn probability<S>(psi: &Arr1<S>, dx: f64) -> f64
where S: nd::Data<Elem = C64>
{
    psi.iter().map(|z| z.norm_sqr()).sum::<f64>() * dx
}

/// Compute the total probability `Σ |ψ|² dx dy`.
pub fn probability_2d<S>(psi: &Arr2<S>, dx: f64, dy: f64) -> f64
where S: nd::Data<Elem = C64>
{
    psi.iter().map(|z| z.norm_sqr()).sum::<f64>() * dx * dy
}

/// Compute the total amount `Σ u dx` of a real field.
pub fn mass<S>(u: &Arr1<S>, dx: f64) -> f64
where S: nd::Data<Elem = f64>
{
    u.sum() * dx
}

/// Compute the expectation value of position, `Σ x |ψ|² / Σ |ψ|²`.
///
/// Returns NaN for a vanishing wavefunction.
pub fn mean_position<S, T>(x: &Arr1<S>, psi: &Arr1<T>) -> f64
where
    S: nd::Data<Elem = f64>,
    T: nd::Data<Elem = C64>,
{
    let (num, den)
        = x.iter().zip(psi)
        .fold((0.0, 0.0), |(num, den), (xk, zk)| {
            let rho = zk.norm_sqr();
            (num + xk * rho, den + rho)
        });
    num / den
}

/// Generate an array of frequency-space coordinates to accompany a FFT of `n`
/// points for sampling interval `dt`.
pub fn fft_freq(n: usize, dt: f64) -> nd::Array1<f64> {
    let np = (n + 1) / 2;
    let fp: nd::Array1<f64>
        = (0..np)
        .map(|k| k as f64 / (n as f64 * dt))
        .collect();
    let fm: nd::Array1<f64>
        = (1..n - np + 1).rev()
        .map(|k| -(k as f64) / (n as f64 * dt))
        .collect();
    concatenate!(nd::Axis(0), fp, fm)
}

/// Return a copy of `x` with indices shifted to map super-Nyquist frequency
/// components to negative frequencies.
pub fn fft_shift<S, A>(x: &nd::ArrayBase<S, Ix1>) -> nd::Array1<A>
where
    S: nd::Data<Elem = A>,
    A: Clone,
{
    let n = x.len();
    let (p, m) = x.view().split_at(nd::Axis(0), (n + 1) / 2);
    concatenate!(nd::Axis(0), m.into_owned(), p.into_owned())
}

/// Perform the one-dimensional, complex-valued FFT.
pub fn fft<S>(x: &nd::ArrayBase<S, Ix1>) -> nd::Array1<C64>
where S: nd::Data<Elem = C64>
{
    let n: usize = x.len();
    // standard layout, so the slice below always exists
    let mut f: nd::Array1<C64> = x.iter().copied().collect();
    let mut plan = fft::FftPlanner::new();
    let fft_plan = plan.plan_fft_forward(n);
    if let Some(buf) = f.as_slice_mut() { fft_plan.process(buf); }
    f
}

/// Compute the momentum-space probability density of a wavefunction.
///
/// Returns `(k, ρ(k))` with wavenumbers in increasing order, normalized so
/// that `Σ ρ(k) dk = Σ |ψ|² dx`.
pub fn momentum_density<S>(psi: &Arr1<S>, dx: f64)
    -> (nd::Array1<f64>, nd::Array1<f64>)
where S: nd::Data<Elem = C64>
{
    let k: nd::Array1<f64> = fft_freq(psi.len(), dx).mapv(|f| TAU * f);
    let rho: nd::Array1<f64>
        = fft(psi).mapv(|z| z.norm_sqr() * dx.powi(2) / TAU);
    (fft_shift(&k), fft_shift(&rho))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use super::*;

    #[test]
    fn trapz_quadratic() {
        let x: nd::Array1<f64> = nd::Array1::linspace(0.0, 1.0, 1001);
        let y = x.mapv(|xk| xk.powi(2));
        assert_abs_diff_eq!(trapz(&y, 0.001), 1.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn freq_layout() {
        assert_eq!(fft_freq(4, 1.0).to_vec(), vec![0.0, 0.25, -0.5, -0.25]);
        assert_eq!(fft_freq(5, 0.5).to_vec(), vec![0.0, 0.4, 0.8, -0.8, -0.4]);
        assert_eq!(
            fft_shift(&fft_freq(5, 0.5)).to_vec(),
            vec![-0.8, -0.4, 0.0, 0.4, 0.8],
        );
        assert_eq!(
            fft_shift(&fft_freq(4, 1.0)).to_vec(),
            vec![-0.5, -0.25, 0.0, 0.25],
        );
    }

    #[test]
    fn moments() {
        let x: nd::Array1<f64> = nd::Array1::linspace(-1.0, 1.0, 401);
        let dx = 2.0 / 400.0;
        let psi = x.mapv(|xk| {
            C64::from((-(xk - 0.25).powi(2) / 0.02).exp()) * C64::cis(5.0 * xk)
        });
        assert_abs_diff_eq!(mean_position(&x, &psi), 0.25, epsilon = 1e-9);
        assert_abs_diff_eq!(
            density(&psi).sum() * dx,
            probability(&psi, dx),
            epsilon = 1e-12,
        );
        let u: nd::Array1<f64> = nd::Array1::ones(401);
        assert_abs_diff_eq!(mass(&u, dx), 401.0 * dx, epsilon = 1e-12);
    }

    #[test]
    fn momentum_peak() {
        let n = 500;
        let x: nd::Array1<f64> = nd::Array1::linspace(-1.0, 1.0, n);
        let dx = 2.0 / (n - 1) as f64;
        let psi = x.mapv(|xk| {
            C64::from((-xk.powi(2) / (2.0 * 0.1_f64.powi(2))).exp())
                * C64::cis(20.0 * xk)
        });
        let (k, rho) = momentum_density(&psi, dx);
        let dk = k[1] - k[0];
        let ipeak
            = rho.iter().enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
            .unwrap();
        assert!((k[ipeak] - 20.0).abs() < dk);
        assert_abs_diff_eq!(rho.sum() * dk, probability(&psi, dx), epsilon = 1e-10);
    }
}
