#![allow(dead_code, non_snake_case)]

//! Provides finite-difference time-steppers for a handful of classical PDEs on
//! uniform grids in one and two dimensions:
//! - Time-dependent Schrödinger equation (*ħ* = *m* = 1)
//!     - 1D: Crank–Nicolson with an exact (tridiagonal) implicit solve
//!     - 2D: Crank–Nicolson with a sparse LU of the full five-point system
//! - Classical wave equation with variable speed
//!     - 1D: three-level leapfrog
//! - Diffusion equation
//!     - 1D: Crank–Nicolson with variable diffusivity
//!     - 2D: forward-time centered-space (FTCS)
//!
//! Each boundary of each axis may independently be Dirichlet, Neumann,
//! periodic, or absorbing, where supported by the model.
//!
//! Every stepper is built once from a params struct and then driven through
//! the [`Stepper`][stepper::Stepper] trait:
//! ```
//! use fdstep::{
//!     grid::Grid1,
//!     initial::Initial1D,
//!     schrodinger::{ Schrodinger1D, Schrodinger1DParams },
//!     stepper::Stepper,
//! };
//!
//! let grid = Grid1::linspace(-1.0, 1.0, 500).unwrap();
//! let init = Initial1D::Gaussian {
//!     center: 0.0, width: 0.1, wavenumber: 20.0, amplitude: 1.0 };
//! let mut sim = Schrodinger1D::new(&Schrodinger1DParams::new(grid, init)).unwrap();
//! let p0 = sim.probability();
//! sim.advance(100).unwrap();
//! assert!((sim.probability() - p0).abs() < 1e-9 * p0);
//! ```
//!
//! Whole runs can also be described by a TOML file; see [`config`].
//!
//! See [`docs`] for theoretical background.

pub mod error;
pub mod grid;
pub mod boundary;
pub mod initial;
pub mod special;
pub mod potential;
pub mod operator;
pub mod sparse;
pub mod stepper;
pub mod schrodinger;
pub mod wave;
pub mod diffusion;
pub mod observables;
pub mod config;
pub mod simulation;

pub mod docs;

pub type Arr1<S> = ndarray::ArrayBase<S, ndarray::Ix1>;
pub type Arr2<S> = ndarray::ArrayBase<S, ndarray::Ix2>;
