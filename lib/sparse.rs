//! Five-point operators on rectangular grids.
//!
//! A field on an `ny × nx` grid is flattened row-major, so that point
//! `(j, i)` sits at `k = j nx + i`. A three-point stencil along both axes
//! then gives a sparse operator of dimension `nx ny` with at most five entries
//! per row: the diagonal, the `±1` neighbors along `x`, and the `±nx`
//! neighbors along `y` (plus wraparound blocks for periodic axes). The
//! implicit half of a 2D Crank–Nicolson step is factorized once with `faer`'s
//! sparse LU.

use faer::{
    complex_native::c64,
    prelude::SpSolver,
    sparse::{ linalg::solvers::Lu, SparseColMat },
    Col,
};
use ndarray as nd;
use ndarray_linalg::Scalar;
use num_complex::Complex64 as C64;
use crate::{
    Arr1,
    Arr2,
    boundary::Sides,
    error::{ ConfigError, ConfigResult },
};

/// A square sparse matrix acting on row-major flattened 2D fields.
#[derive(Clone, Debug, PartialEq)]
pub struct GridOperator<A> {
    shape: (usize, usize),
    // (column, value) pairs of each row, sorted by column
    rows: Vec<Vec<(usize, A)>>,
}

impl<A> GridOperator<A>
where A: Scalar
{
    /// Build an operator for a grid of shape `(ny, nx)`, where `f(j, i)`
    /// returns the entries of the row belonging to point `(j, i)` as
    /// `((j', i'), value)` pairs.
    ///
    /// Entries landing on the same position add.
    pub fn from_stencil<F, I>(shape: (usize, usize), mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> I,
        I: IntoIterator<Item = ((usize, usize), A)>,
    {
        let (ny, nx) = shape;
        let mut rows: Vec<Vec<(usize, A)>> = Vec::with_capacity(ny * nx);
        for j in 0..ny {
            for i in 0..nx {
                let mut row: Vec<(usize, A)> = Vec::with_capacity(5);
                for ((jj, ii), a) in f(j, i) {
                    let col = jj * nx + ii;
                    match row.iter_mut().find(|(c, _)| *c == col) {
                        Some((_, b)) => { *b += a; },
                        None => { row.push((col, a)); },
                    }
                }
                row.sort_by_key(|(c, _)| *c);
                rows.push(row);
            }
        }
        Self { shape, rows }
    }

    /// Grid shape `(ny, nx)` the operator acts on.
    pub fn shape(&self) -> (usize, usize) { self.shape }

    /// Get the dimension of the operator, `nx ny`.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize { self.rows.len() }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize { self.rows.iter().map(|row| row.len()).sum() }

    /// Stored `(column, value)` entries of the `k`-th row.
    pub fn row(&self, k: usize) -> &[(usize, A)] { &self.rows[k] }

    /// Get the entry at `[k, l]`.
    ///
    /// *Panics if `k` is out of bounds*.
    pub fn get(&self, k: usize, l: usize) -> A {
        self.rows[k].iter()
            .find(|(c, _)| *c == l)
            .map(|(_, a)| *a)
            .unwrap_or_else(A::zero)
    }

    /// Compute the matrix-vector product `M x`.
    ///
    /// *Panics if `x` has the wrong length*.
    pub fn apply<S>(&self, x: &Arr1<S>) -> nd::Array1<A>
    where S: nd::Data<Elem = A>
    {
        assert_eq!(x.len(), self.len(), "operator/vector length mismatch");
        self.rows.iter()
            .map(|row| row.iter().fold(A::zero(), |acc, &(c, a)| acc + a * x[c]))
            .collect()
    }
}

impl GridOperator<C64> {
    /// Compute a sparse LU factorization suitable for repeated solves.
    pub fn factorize(&self) -> ConfigResult<SparseLu> {
        let n = self.len();
        let triplets: Vec<(usize, usize, c64)>
            = self.rows.iter().enumerate()
            .flat_map(|(k, row)| {
                row.iter().map(move |&(l, a)| (k, l, c64::new(a.re, a.im)))
            })
            .collect();
        let mat
            = SparseColMat::<usize, c64>::try_new_from_triplets(n, n, &triplets)
            .map_err(|err| ConfigError::Sparse(format!("{err:?}")))?;
        let lu
            = mat.sp_lu()
            .map_err(|err| ConfigError::Sparse(format!("{err:?}")))?;
        log::debug!(
            "factorized {n}×{n} grid operator with {} entries", triplets.len());
        Ok(SparseLu { n, lu })
    }
}

/// Sparse LU factorization of a complex [`GridOperator`].
pub struct SparseLu {
    n: usize,
    lu: Lu<usize, c64>,
}

impl SparseLu {
    /// Solve `M x = b` for `x`.
    ///
    /// *Panics if `b` has the wrong length*.
    pub fn solve<S>(&self, b: &Arr1<S>) -> nd::Array1<C64>
    where S: nd::Data<Elem = C64>
    {
        assert_eq!(b.len(), self.n, "operator/vector length mismatch");
        let rhs: Col<c64> = Col::from_fn(self.n, |k| c64::new(b[k].re, b[k].im));
        let x: Col<c64> = self.lu.solve(rhs.as_ref());
        (0..self.n)
            .map(|k| {
                let z = x.read(k);
                C64::new(z.re, z.im)
            })
            .collect()
    }
}

/// Assemble the implicit and explicit halves of a Crank–Nicolson step on a
/// grid of shape `s.dim()`.
///
/// With stencil weights `r = (rx, ry)` and on-site terms `s`, the implicit
/// operator `L` has diagonal `1 + rx + ry + s[j, i]` and off-diagonals
/// `-rx / 2` (along `x`) and `-ry / 2` (along `y`); the explicit operator `R`
/// has diagonal `1 - rx - ry - s[j, i]` and off-diagonals `rx / 2`, `ry / 2`.
/// Neighbors beyond an edge follow [`Sides::neighbors`], and every point on a
/// Dirichlet edge of either axis gets an identity row.
pub fn crank_nicolson_2d<A, S>(r: (A, A), s: &Arr2<S>, sides: (Sides, Sides))
    -> ConfigResult<(GridOperator<A>, GridOperator<A>)>
where
    A: Scalar,
    S: nd::Data<Elem = A>,
{
    let (ny, nx) = s.dim();
    ConfigError::check_points(nx)?;
    ConfigError::check_points(ny)?;
    let (rx, ry) = r;
    let (sides_x, sides_y) = sides;
    let pinned_x = sides_x.pinned(nx);
    let pinned_y = sides_y.pinned(ny);
    let two = A::one() + A::one();
    let build = |sign: A| -> GridOperator<A> {
        GridOperator::from_stencil((ny, nx), |j, i| {
            let mut entries: Vec<((usize, usize), A)> = Vec::with_capacity(5);
            if pinned_x.contains(&i) || pinned_y.contains(&j) {
                entries.push(((j, i), A::one()));
                return entries;
            }
            entries.push(((j, i), A::one() + sign * (rx + ry + s[[j, i]])));
            for w in sides_x.neighbors(i, nx).into_iter().flatten() {
                entries.push(((j, w), -sign * rx / two));
            }
            for w in sides_y.neighbors(j, ny).into_iter().flatten() {
                entries.push(((w, i), -sign * ry / two));
            }
            entries
        })
    };
    let implicit = build(A::one());
    let explicit = build(-A::one());
    log::debug!(
        "assembled {ny}×{nx} Crank-Nicolson pair, x: {sides_x:?}, y: {sides_y:?}");
    Ok((implicit, explicit))
}

/// A factorized 2D Crank–Nicolson pair, with the grid points held fixed by
/// Dirichlet edges.
pub struct CrankNicolson2D {
    implicit: GridOperator<C64>,
    explicit: GridOperator<C64>,
    lu: SparseLu,
    pinned: Vec<(usize, usize)>,
}

impl CrankNicolson2D {
    /// Assemble and factorize; see [`crank_nicolson_2d`].
    pub fn new<S>(r: (C64, C64), s: &Arr2<S>, sides: (Sides, Sides))
        -> ConfigResult<Self>
    where S: nd::Data<Elem = C64>
    {
        let (implicit, explicit) = crank_nicolson_2d(r, s, sides)?;
        let lu = implicit.factorize()?;
        let (ny, nx) = s.dim();
        let pinned_x = sides.0.pinned(nx);
        let pinned_y = sides.1.pinned(ny);
        let pinned: Vec<(usize, usize)>
            = (0..ny).flat_map(|j| (0..nx).map(move |i| (j, i)))
            .filter(|(j, i)| pinned_x.contains(i) || pinned_y.contains(j))
            .collect();
        Ok(Self { implicit, explicit, lu, pinned })
    }

    pub fn implicit(&self) -> &GridOperator<C64> { &self.implicit }

    pub fn explicit(&self) -> &GridOperator<C64> { &self.explicit }

    /// `(j, i)` indices of the points held fixed.
    pub fn pinned(&self) -> &[(usize, usize)] { &self.pinned }

    /// Compute `L⁻¹ R ψ`, then restore pinned points exactly from `ψ`.
    ///
    /// *Panics if `psi` does not have the operator's grid shape*.
    pub fn advance<S>(&self, psi: &Arr2<S>) -> nd::Array2<C64>
    where S: nd::Data<Elem = C64>
    {
        let shape = self.implicit.shape();
        assert_eq!(psi.dim(), shape, "operator/field shape mismatch");
        let flat: nd::Array1<C64> = psi.iter().copied().collect();
        let rhs = self.explicit.apply(&flat);
        let y = self.lu.solve(&rhs);
        let nx = shape.1;
        let mut next: nd::Array2<C64>
            = nd::Array2::from_shape_fn(shape, |(j, i)| y[j * nx + i]);
        self.pinned.iter().for_each(|&(j, i)| { next[[j, i]] = psi[[j, i]]; });
        next
    }
}
