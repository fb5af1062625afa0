//! Banded (tridiagonal plus wraparound) operators and their factorizations.
//!
//! Every stepper in this crate advances its field with a three-point stencil
//! along each axis, so all operators are stored as three bands and, for
//! periodic axes, the two corner entries coupling the first and last points.
//! Both kinds are factorized with LAPACK's tridiagonal LU (`gttrf`), built
//! straight from the bands; cyclic systems are then solved exactly with the
//! Sherman–Morrison formula.

use ndarray as nd;
use ndarray_linalg::{
    error::LinalgError,
    FactorizeTridiagonalInto,
    LUFactorizedTridiagonal,
    Lapack,
    MatrixLayout,
    Scalar,
    SolveTridiagonal,
    Tridiagonal,
};
use crate::{
    Arr1,
    boundary::{ Edge, Sides },
    error::{ ConfigError, ConfigResult, LengthError },
};

/// A square tridiagonal matrix with optional corner entries.
///
/// Row `i` holds `sub[i - 1]`, `diag[i]`, and `sup[i]` at columns `i - 1`,
/// `i`, and `i + 1`. When present, `corners = [a, b]` places `a` at
/// `[0, n - 1]` and `b` at `[n - 1, 0]`. Entries that land on the same
/// position (only possible for `n == 2`) add.
#[derive(Clone, Debug, PartialEq)]
pub struct BandOperator<A> {
    sub: nd::Array1<A>,
    diag: nd::Array1<A>,
    sup: nd::Array1<A>,
    corners: Option<[A; 2]>,
}

impl<A> BandOperator<A>
where A: Scalar
{
    /// Create a new operator from its three bands.
    ///
    /// Fails if `sub` and `sup` are not one element shorter than `diag`.
    pub fn new(
        sub: nd::Array1<A>,
        diag: nd::Array1<A>,
        sup: nd::Array1<A>,
    ) -> ConfigResult<Self>
    {
        ConfigError::check_points(diag.len())?;
        LengthError::check(&sub, &sup)?;
        (sub.len() + 1 == diag.len()).then_some(())
            .ok_or(LengthError(sub.len() + 1, diag.len()))?;
        Ok(Self { sub, diag, sup, corners: None })
    }

    /// Create a new operator row by row, where `f(i)` returns the entries at
    /// columns `(i - 1, i, i + 1)`.
    ///
    /// Entries that would fall outside the matrix are discarded.
    pub fn from_stencil<F>(n: usize, mut f: F) -> Self
    where F: FnMut(usize) -> (A, A, A)
    {
        let mut sub: nd::Array1<A> = nd::Array1::zeros(n.saturating_sub(1));
        let mut diag: nd::Array1<A> = nd::Array1::zeros(n);
        let mut sup: nd::Array1<A> = nd::Array1::zeros(n.saturating_sub(1));
        for i in 0..n {
            let (lo, d, up) = f(i);
            diag[i] = d;
            if i > 0 { sub[i - 1] = lo; }
            if i + 1 < n { sup[i] = up; }
        }
        Self { sub, diag, sup, corners: None }
    }

    /// The `n × n` identity.
    pub fn identity(n: usize) -> Self {
        Self::from_stencil(n, |_| (A::zero(), A::one(), A::zero()))
    }

    /// Get the dimension of the operator.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize { self.diag.len() }

    /// Return `true` if the corner entries are present.
    pub fn is_cyclic(&self) -> bool { self.corners.is_some() }

    /// Get the entry at `[i, j]`.
    ///
    /// *Panics if either index is out of bounds*.
    pub fn get(&self, i: usize, j: usize) -> A {
        let n = self.len();
        assert!(i < n && j < n, "index ({i}, {j}) out of bounds for {n}×{n}");
        let mut a = A::zero();
        if i == j { a += self.diag[i]; }
        if j + 1 == i { a += self.sub[j]; }
        if i + 1 == j { a += self.sup[i]; }
        if let Some([c0, c1]) = self.corners {
            if i == 0 && j == n - 1 { a += c0; }
            if i == n - 1 && j == 0 { a += c1; }
        }
        a
    }

    /// Get a dense copy of the `i`-th row.
    pub fn row(&self, i: usize) -> nd::Array1<A> {
        (0..self.len()).map(|j| self.get(i, j)).collect()
    }

    /// Get a dense copy of the whole operator.
    pub fn to_dense(&self) -> nd::Array2<A> {
        nd::Array2::from_shape_fn((self.len(), self.len()), |(i, j)| self.get(i, j))
    }

    /// Compute the matrix-vector product `M x` in linear time.
    ///
    /// *Panics if `x` has the wrong length*.
    pub fn apply<S>(&self, x: &Arr1<S>) -> nd::Array1<A>
    where S: nd::Data<Elem = A>
    {
        let n = self.len();
        assert_eq!(x.len(), n, "operator/vector length mismatch");
        let mut y: nd::Array1<A>
            = nd::Zip::from(&self.diag).and(x).map_collect(|d, xi| *d * *xi);
        for i in 0..n - 1 {
            y[i] += self.sup[i] * x[i + 1];
            y[i + 1] += self.sub[i] * x[i];
        }
        if let Some([c0, c1]) = self.corners {
            y[0] += c0 * x[n - 1];
            y[n - 1] += c1 * x[0];
        }
        y
    }

    /// Replace the `i`-th row with `value` times the `i`-th unit row.
    pub fn pin(&mut self, i: usize, value: A) {
        let n = self.len();
        self.diag[i] = value;
        if i > 0 { self.sub[i - 1] = A::zero(); }
        if i + 1 < n { self.sup[i] = A::zero(); }
        if let Some(corners) = self.corners.as_mut() {
            if i == 0 { corners[0] = A::zero(); }
            if i == n - 1 { corners[1] = A::zero(); }
        }
    }

    /// Double the inward off-diagonal entry of an edge row, folding in the
    /// mirror point beyond the edge.
    ///
    /// *Panics if `i` is not `0` or `n - 1`*.
    pub fn mirror(&mut self, i: usize) {
        let n = self.len();
        let two = A::one() + A::one();
        if i == 0 {
            self.sup[0] *= two;
        } else if i == n - 1 {
            self.sub[n - 2] *= two;
        } else {
            panic!("row {i} is not an edge row of a {n}×{n} operator");
        }
    }

    /// Set the diagonal and inward off-diagonal entries of an edge row.
    ///
    /// *Panics if `i` is not `0` or `n - 1`*.
    pub fn set_edge(&mut self, i: usize, diag: A, inward: A) {
        let n = self.len();
        self.diag[i] = diag;
        if i == 0 {
            self.sup[0] = inward;
        } else if i == n - 1 {
            self.sub[n - 2] = inward;
        } else {
            panic!("row {i} is not an edge row of a {n}×{n} operator");
        }
    }

    /// Couple the first and last points: `first` is placed at `[0, n - 1]`
    /// and `last` at `[n - 1, 0]`.
    pub fn close_ring(&mut self, first: A, last: A) {
        self.corners = Some([first, last]);
    }

    /// Apply the row edits for a resolved pair of boundary conditions.
    ///
    /// `wrap` gives the off-diagonal weights of the first and last rows, used
    /// as corner entries when the axis is periodic. Absorbing edges are left
    /// untouched here; their damping lives in the on-site term.
    pub fn apply_sides(&mut self, sides: Sides, wrap: (A, A)) {
        let n = self.len();
        match sides {
            Sides::Periodic => { self.close_ring(wrap.0, wrap.1); },
            Sides::Open { lower, upper } => {
                for (i, edge) in [(0, lower), (n - 1, upper)] {
                    match edge {
                        Edge::Dirichlet => { self.pin(i, A::one()); },
                        Edge::Neumann => { self.mirror(i); },
                        Edge::Absorbing => { },
                    }
                }
            },
        }
    }
}

impl<A> BandOperator<A>
where A: Scalar + Lapack
{
    // tridiagonal part as LAPACK bands, with the diagonal replaced by `diag`
    fn tridiagonal(&self, diag: Vec<A>) -> Tridiagonal<A> {
        let n = self.len() as i32;
        Tridiagonal {
            l: MatrixLayout::F { col: n, lda: n },
            dl: self.sub.to_vec(),
            d: diag,
            du: self.sup.to_vec(),
        }
    }

    /// Compute an LU factorization suitable for repeated solves.
    ///
    /// A cyclic operator `M` is split as `M = T + u vᵀ`, with `T` tridiagonal
    /// and `u = (γ, 0, ..., 0, c₁)`, `v = (1, 0, ..., 0, c₀ / γ)`, where
    /// `[c₀, c₁]` are the corner entries and `γ = -M[0, 0]`. Only `T` is
    /// factorized.
    pub fn factorize(&self) -> Result<Factorized<A>, LinalgError> {
        let n = self.len();
        let fact
            = match self.corners {
                None => {
                    let lu
                        = self.tridiagonal(self.diag.to_vec())
                        .factorize_tridiagonal_into()?;
                    Factorized::Tridiagonal(lu)
                },
                Some([c0, c1]) => {
                    let gamma
                        = if self.diag[0] == A::zero() { -A::one() } else { -self.diag[0] };
                    let mut diag = self.diag.to_vec();
                    diag[0] -= gamma;
                    diag[n - 1] -= c0 * c1 / gamma;
                    let lu = self.tridiagonal(diag).factorize_tridiagonal_into()?;
                    let mut u: nd::Array1<A> = nd::Array1::zeros(n);
                    u[0] = gamma;
                    u[n - 1] += c1;
                    let z = lu.solve_tridiagonal(&u)?;
                    let v_last = c0 / gamma;
                    let denom = A::one() + z[0] + v_last * z[n - 1];
                    Factorized::Cyclic { lu, z, v_last, denom }
                },
            };
        log::debug!(
            "factorized {n}×{n} {kind} operator",
            kind = if self.is_cyclic() { "cyclic" } else { "tridiagonal" },
        );
        Ok(fact)
    }
}

/// LU factorization of a [`BandOperator`].
pub enum Factorized<A>
where A: Scalar + Lapack
{
    Tridiagonal(LUFactorizedTridiagonal<A>),
    /// Factorized tridiagonal part `T` of a cyclic operator, with
    /// `z = T⁻¹ u`, the last entry of `v`, and `1 + v·z`.
    Cyclic {
        lu: LUFactorizedTridiagonal<A>,
        z: nd::Array1<A>,
        v_last: A,
        denom: A,
    },
}

impl<A> Factorized<A>
where A: Scalar + Lapack
{
    /// Solve `M x = b` for `x`.
    pub fn solve<S>(&self, b: &Arr1<S>) -> Result<nd::Array1<A>, LinalgError>
    where S: nd::Data<Elem = A>
    {
        match self {
            Self::Tridiagonal(lu) => lu.solve_tridiagonal(b),
            Self::Cyclic { lu, z, v_last, denom } => {
                let mut y = lu.solve_tridiagonal(b)?;
                let n = y.len();
                let k = (y[0] + *v_last * y[n - 1]) / *denom;
                y.zip_mut_with(z, |yk, zk| { *yk -= k * *zk; });
                Ok(y)
            },
        }
    }
}

/// Assemble the implicit and explicit halves of a Crank–Nicolson step along
/// one axis.
///
/// For per-point stencil weights `r` and on-site terms `s`, the implicit
/// operator `L` has diagonal `1 + r[i] + s[i]` and off-diagonals `-r[i] / 2`;
/// the explicit operator `R` has diagonal `1 - r[i] - s[i]` and off-diagonals
/// `r[i] / 2`. Boundary edits are then applied to both.
pub fn crank_nicolson<A, S, T>(r: &Arr1<S>, s: &Arr1<T>, sides: Sides)
    -> ConfigResult<(BandOperator<A>, BandOperator<A>)>
where
    A: Scalar,
    S: nd::Data<Elem = A>,
    T: nd::Data<Elem = A>,
{
    LengthError::check(r, s)?;
    let n = r.len();
    ConfigError::check_points(n)?;
    let two = A::one() + A::one();
    let mut implicit: BandOperator<A>
        = BandOperator::from_stencil(n, |i| {
            let off = -r[i] / two;
            (off, A::one() + r[i] + s[i], off)
        });
    let mut explicit: BandOperator<A>
        = BandOperator::from_stencil(n, |i| {
            let off = r[i] / two;
            (off, A::one() - r[i] - s[i], off)
        });
    implicit.apply_sides(sides, (-r[0] / two, -r[n - 1] / two));
    explicit.apply_sides(sides, (r[0] / two, r[n - 1] / two));
    log::debug!("assembled {n}-point Crank-Nicolson pair with {sides:?}");
    Ok((implicit, explicit))
}

/// A factorized Crank–Nicolson pair along one axis, with the indices of any
/// pinned (Dirichlet) points.
pub struct CrankNicolson<A>
where A: Scalar + Lapack
{
    implicit: BandOperator<A>,
    explicit: BandOperator<A>,
    lu: Factorized<A>,
    pinned: Vec<usize>,
}

impl<A> CrankNicolson<A>
where A: Scalar + Lapack
{
    /// Assemble and factorize; see [`crank_nicolson`].
    pub fn new<S, T>(r: &Arr1<S>, s: &Arr1<T>, sides: Sides)
        -> ConfigResult<Self>
    where
        S: nd::Data<Elem = A>,
        T: nd::Data<Elem = A>,
    {
        let (implicit, explicit) = crank_nicolson(r, s, sides)?;
        let lu = implicit.factorize().map_err(ConfigError::Singular)?;
        let pinned = sides.pinned(r.len());
        Ok(Self { implicit, explicit, lu, pinned })
    }

    /// A pair that leaves every point unchanged.
    pub fn identity(n: usize) -> ConfigResult<Self> {
        ConfigError::check_points(n)?;
        let implicit: BandOperator<A> = BandOperator::identity(n);
        let explicit: BandOperator<A> = BandOperator::identity(n);
        let lu = implicit.factorize().map_err(ConfigError::Singular)?;
        Ok(Self { implicit, explicit, lu, pinned: (0..n).collect() })
    }

    pub fn implicit(&self) -> &BandOperator<A> { &self.implicit }

    pub fn explicit(&self) -> &BandOperator<A> { &self.explicit }

    pub fn pinned(&self) -> &[usize] { &self.pinned }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize { self.implicit.len() }

    /// Compute `R x`.
    pub fn apply_explicit<S>(&self, x: &Arr1<S>) -> nd::Array1<A>
    where S: nd::Data<Elem = A>
    {
        self.explicit.apply(x)
    }

    /// Solve `L y = b`.
    pub fn solve_implicit<S>(&self, b: &Arr1<S>)
        -> Result<nd::Array1<A>, LinalgError>
    where S: nd::Data<Elem = A>
    {
        self.lu.solve(b)
    }

    /// Compute `L⁻¹ R x`, then restore pinned points exactly from `x`.
    pub fn advance<S>(&self, x: &Arr1<S>) -> Result<nd::Array1<A>, LinalgError>
    where S: nd::Data<Elem = A>
    {
        let rhs = self.apply_explicit(x);
        let mut y = self.solve_implicit(&rhs)?;
        self.pinned.iter().for_each(|&i| { y[i] = x[i]; });
        Ok(y)
    }
}

#[cfg(test)]
mod tests {
    use num_complex::Complex64 as C64;
    use crate::boundary::{ Boundary, BoundaryPair };
    use super::*;

    fn sides(lower: Boundary, upper: Boundary) -> Sides {
        BoundaryPair::new(lower, upper).resolve()
    }

    fn cn(n: usize, r: f64, sides: Sides)
        -> (BandOperator<f64>, BandOperator<f64>)
    {
        let r: nd::Array1<f64> = nd::Array1::from_elem(n, r);
        let s: nd::Array1<f64> = nd::Array1::zeros(n);
        crank_nicolson(&r, &s, sides).unwrap()
    }

    #[test]
    fn interior_rows() {
        let (l, rr) = cn(6, 0.4, Sides::DIRICHLET);
        assert_eq!(l.len(), 6);
        assert_eq!(rr.len(), 6);
        assert_eq!(l.row(2).to_vec(), vec![0.0, -0.2, 1.4, -0.2, 0.0, 0.0]);
        assert_eq!(rr.row(3).to_vec(), vec![0.0, 0.0, 0.2, 0.6, 0.2, 0.0]);
    }

    #[test]
    fn dirichlet_rows_are_identity() {
        let (l, rr) = cn(5, 0.4, sides(Boundary::Dirichlet, Boundary::Dirichlet));
        for op in [&l, &rr] {
            assert_eq!(op.row(0).to_vec(), vec![1.0, 0.0, 0.0, 0.0, 0.0]);
            assert_eq!(op.row(4).to_vec(), vec![0.0, 0.0, 0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn neumann_doubles_inward_entry() {
        let (l, rr) = cn(5, 0.4, sides(Boundary::Neumann, Boundary::Neumann));
        assert_eq!(l.row(0).to_vec(), vec![1.4, -0.4, 0.0, 0.0, 0.0]);
        assert_eq!(l.row(4).to_vec(), vec![0.0, 0.0, 0.0, -0.4, 1.4]);
        assert_eq!(rr.row(0).to_vec(), vec![0.6, 0.4, 0.0, 0.0, 0.0]);
        assert!(!l.is_cyclic());
    }

    #[test]
    fn periodic_couples_ends() {
        let (l, rr) = cn(5, 0.4, sides(Boundary::Periodic, Boundary::Periodic));
        assert!(l.is_cyclic() && rr.is_cyclic());
        assert_eq!(l.get(0, 4), -0.2);
        assert_eq!(l.get(4, 0), -0.2);
        assert_eq!(rr.get(0, 4), 0.2);
        assert_eq!(rr.get(4, 0), 0.2);
        // every row of a ring sums to the same value
        let d = l.to_dense();
        d.rows().into_iter().for_each(|row| assert!((row.sum() - 1.0).abs() < 1e-15));
    }

    #[test]
    fn absorbing_leaves_rows_alone() {
        let (l, _) = cn(5, 0.4, sides(Boundary::Absorbing, Boundary::Absorbing));
        assert_eq!(l.row(0).to_vec(), vec![1.4, -0.2, 0.0, 0.0, 0.0]);
        assert_eq!(l.row(4).to_vec(), vec![0.0, 0.0, 0.0, -0.2, 1.4]);
    }

    #[test]
    fn apply_matches_dense() {
        let mut op: BandOperator<f64>
            = BandOperator::from_stencil(4, |i| (i as f64, 10.0 + i as f64, -1.0));
        op.close_ring(3.0, 5.0);
        let x = nd::array![1.0, 2.0, 3.0, 4.0];
        let y = op.apply(&x);
        let yd = op.to_dense().dot(&x);
        assert_eq!(y, yd);
    }

    #[test]
    fn solves_invert_apply() {
        let n = 8;
        let r: nd::Array1<C64> = nd::Array1::from_elem(n, C64::new(0.0, 0.7));
        let s: nd::Array1<C64> = nd::Array1::from_elem(n, C64::new(0.0, 0.1));
        for sides in [Sides::DIRICHLET, Sides::Periodic] {
            let (l, _) = crank_nicolson(&r, &s, sides).unwrap();
            let x: nd::Array1<C64>
                = (0..n).map(|k| C64::new(k as f64, 1.0 - k as f64)).collect();
            let b = l.apply(&x);
            let y = l.factorize().unwrap().solve(&b).unwrap();
            assert!(x.iter().zip(&y).all(|(xk, yk)| (xk - yk).norm() < 1e-12));
        }
    }

    #[test]
    fn cyclic_solve_matches_dense() {
        use ndarray_linalg::Solve;
        for n in [2, 3, 9] {
            let mut op: BandOperator<C64>
                = BandOperator::from_stencil(n, |i| {
                    let t = i as f64;
                    (C64::new(0.3, -t), C64::new(4.0 + t, 0.5), C64::new(-1.0, 0.2 * t))
                });
            op.close_ring(C64::new(0.7, 1.1), C64::new(-0.4, 0.3));
            let b: nd::Array1<C64>
                = (0..n).map(|k| C64::new(1.0 + k as f64, -(k as f64).sqrt())).collect();
            let x = op.factorize().unwrap().solve(&b).unwrap();
            let xd = op.to_dense().solve(&b).unwrap();
            assert!(x.iter().zip(&xd).all(|(a, b)| (a - b).norm() < 1e-12));
        }

        // zero leading diagonal entry
        let mut op: BandOperator<f64>
            = BandOperator::from_stencil(5, |i| (1.0, if i == 0 { 0.0 } else { 3.0 }, 1.0));
        op.close_ring(1.0, 2.0);
        let b = nd::array![1.0, 0.0, -2.0, 0.5, 3.0];
        let x = op.factorize().unwrap().solve(&b).unwrap();
        let back = op.apply(&x);
        assert!(back.iter().zip(&b).all(|(a, b)| (a - b).abs() < 1e-12));
    }

    #[test]
    fn advance_keeps_pinned_points() {
        let n = 10;
        let r: nd::Array1<f64> = nd::Array1::from_elem(n, 0.3);
        let s: nd::Array1<f64> = nd::Array1::zeros(n);
        let step = CrankNicolson::new(&r, &s, Sides::DIRICHLET).unwrap();
        let x: nd::Array1<f64> = nd::Array1::linspace(0.25, 3.5, n);
        let y = step.advance(&x).unwrap();
        assert_eq!(y[0], 0.25);
        assert_eq!(y[n - 1], 3.5);
    }
}
