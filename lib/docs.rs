//! Theoretical background.
//!
//! # Contents
//! - [Discretization](#discretization)
//! - [Crank–Nicolson](#cranknicolson)
//! - [Boundaries](#boundaries)
//! - [Two dimensions](#two-dimensions)
//! - [Leapfrog](#leapfrog)
//! - [FTCS](#ftcs)
//! - [Absorbing layers](#absorbing-layers)
//!
//! # Discretization
//! All models live on uniform grids
//! ```text
//! x[i] = x₀ + i δx, i ∊ {0, ..., N - 1}
//! δx = (x_end - x₀) / (N - 1)
//! ```
//! with the second derivative replaced by the three-point stencil
//! ```text
//! ∂²f     f[i + 1] - 2 f[i] + f[i - 1]
//! --- ≈ ----------------------------
//! ∂x²               δx²
//! ```
//! so that every spatial operator on a line is tridiagonal, apart from the two
//! corner entries introduced by periodic boundaries.
//!
//! The Schrödinger equation is taken in natural units (*ħ* = *m* = 1),
//! ```text
//!   ∂ψ       1 ∂²ψ
//! i -- = - - --- + V(x) ψ
//!   ∂t       2 ∂x²
//! ```
//!
//! # Crank–Nicolson
//! For an equation of the form ∂*u*/∂*t* = *A* *u* with a (discretized) linear
//! operator *A*, the Crank–Nicolson scheme averages the explicit and implicit
//! Euler steps,
//! ```text
//! (1 - (δt/2) A) u[n + 1] = (1 + (δt/2) A) u[n]
//! ```
//! which is second-order accurate in *δt* and unconditionally stable. When *A*
//! is anti-Hermitian (as for the Schrödinger equation, where *A* = -*i* *H*)
//! the update is the Cayley form of the propagator and is exactly unitary, so
//! the norm Σ |ψ|² δx is conserved up to round-off.
//!
//! With *r*\[*i*\] the dimensionless stencil weight and *s*\[*i*\] the on-site
//! term, the implicit operator `L` and explicit operator `R` have rows
//! ```text
//! L: [ -r[i]/2,   1 + r[i] + s[i],   -r[i]/2 ]
//! R: [ +r[i]/2,   1 - r[i] - s[i],   +r[i]/2 ]
//! ```
//! where, for the Schrödinger equation,
//! ```text
//! r[i] = i δt / (2 δx²)
//! s[i] = i δt V[i] / 2
//! ```
//! and, for the diffusion equation ∂*u*/∂*t* = *D*(*x*) ∂²*u*/∂*x*²,
//! ```text
//! r[i] = D[i] δt / δx²
//! s[i] = 0
//! ```
//! Each step is then one O(*N*) product with `R` and one tridiagonal solve
//! with `L`, whose LU factorization is computed once per run.
//!
//! # Boundaries
//! Boundary conditions edit only the first and last rows of the operators:
//! - *Dirichlet*: the row becomes the identity row, so the boundary sample is
//!   carried through every step unchanged;
//! - *Neumann*: a ghost point *f*\[-1\] = *f*\[1\] is eliminated, doubling the
//!   inward off-diagonal entry;
//! - *Periodic*: the stencil wraps, placing the off-diagonal weights in the
//!   corners `[0, N - 1]` and `[N - 1, 0]`. The resulting cyclic matrix is
//!   written as a tridiagonal one plus a rank-one correction, and solved with
//!   the Sherman–Morrison formula[^1]. Only the tridiagonal part is
//!   factorized, and each solve needs a single tridiagonal back-substitution;
//! - *Absorbing*: the rows are left untouched and the outgoing wave is instead
//!   damped by a complex potential layer (see
//!   [Absorbing layers](#absorbing-layers)), or, for the wave equation, by a
//!   one-way boundary row (see [Leapfrog](#leapfrog)).
//!
//! Periodicity is a property of an axis rather than a side: requesting it on
//! either side makes both ends periodic.
//!
//! # Two dimensions
//! On an *N*<sub>*x*</sub> × *N*<sub>*y*</sub> grid the field is flattened
//! row-major, *k* = *j* *N*<sub>*x*</sub> + *i*, and the Crank–Nicolson
//! operators gain a second pair of off-diagonals *N*<sub>*x*</sub> away from
//! the main one:
//! ```text
//! L[k, k]      = 1 + rx + ry + s[k]
//! L[k, k ± 1]  = -rx / 2
//! L[k, k ± Nx] = -ry / 2
//! ```
//! with `rx`, `ry` the stencil weights along each axis; `R` flips the signs
//! as in one dimension. The result is block tridiagonal with tridiagonal
//! blocks, of dimension *N*<sub>*x*</sub> *N*<sub>*y*</sub>. Boundary edits act
//! on whole edges: every point on a Dirichlet edge gets an identity row, a
//! Neumann edge doubles the inward entry of each of its rows, and a periodic
//! axis adds the wraparound entries (corner entries of each block along *x*,
//! corner blocks along *y*). `L` is factorized once with a sparse LU, so each
//! step costs one sparse product and one pair of sparse triangular solves.
//!
//! # Leapfrog
//! The wave equation ∂²*u*/∂*t*² = *c*(*x*)² ∂²*u*/∂*x*² is integrated with the
//! centered three-level scheme
//! ```text
//! u[n + 1] = L u[n] - u[n - 1]
//! L: [ λ[i]²,   2 - 2 λ[i]²,   λ[i]² ]
//! ```
//! with Courant numbers *λ*\[*i*\] = *c*\[*i*\] *δt* / *δx*. The scheme is stable
//! for max *λ* ≤ 1. Starting from rest, the first step is taken as
//! `u[1] = L u[0] / 2`.
//!
//! An absorbing end uses Mur's first-order condition[^2], which discretizes the
//! outgoing one-way equation ∂*u*/∂*t* + *c* ∂*u*/∂*x* = 0 about the boundary:
//! ```text
//!            2 - 2λ²             2λ²                1 - λ
//! u[n+1, 0] = ------- u[n, 0] + ----- u[n, 1] - ----- u[n-1, 0]
//!             1 + λ             1 + λ            1 + λ
//! ```
//! A pulse meeting this end at normal incidence is transmitted out of the
//! domain with little reflection.
//!
//! # FTCS
//! The two-dimensional diffusion equation is stepped explicitly,
//! ```text
//! u[n + 1] = u[n] + αx (u_E + u_W - 2 u) + αy (u_N + u_S - 2 u)
//! αx = D δt / δx², αy = D δt / δy²
//! ```
//! which is stable for *α*<sub>*x*</sub> + *α*<sub>*y*</sub> ≤ 1/2. Missing
//! neighbors at Neumann edges are mirrored from the inside; at periodic edges
//! they are taken from the opposite side. Several fields (channels) with
//! different *D* can be stepped together; they share one *δt*, chosen for the
//! largest *D*.
//!
//! # Absorbing layers
//! For the Schrödinger equation, an absorbing side is realized as a layer of
//! thickness *w* next to the boundary carrying a complex potential
//! ```text
//! V_abs(d) = σ (1 - exp(i θ)),   θ = min(d^p, π/2)
//! ```
//! where *d* ∊ \[0, *w*\] is the depth into the layer (in the same units as
//! *x*), *σ* a strength, and *p* a profile power. Its imaginary part
//! -*σ* sin *θ* is negative inside the layer, so the amplitude decays there
//! instead of reflecting off the grid edge[^3]. Without the cap on *θ*, a
//! layer deeper than *π*<sup>1/*p*</sup> would turn the imaginary part
//! positive and amplify the wave.
//! With the layer present the total probability is no longer conserved; its
//! decrease measures the flux that left the domain.
//!
//! [^1]: J. Sherman and W. J. Morrison, "Adjustment of an inverse matrix
//! corresponding to a change in one element of a given matrix." Ann. Math.
//! Stat. **21**, 124 (1950).
//!
//! [^2]: G. Mur, "Absorbing boundary conditions for the finite-difference
//! approximation of the time-domain electromagnetic-field equations." IEEE
//! Trans. Electromagn. Compat. **EMC-23**, 377 (1981).
//!
//! [^3]: J. G. Muga, J. P. Palao, B. Navarro, and I. L. Egusquiza, "Complex
//! absorbing potentials." Phys. Rep. **395**, 357 (2004).
