//! Crank–Nicolson steppers for the time-dependent Schrödinger equation
//!
//! *i* ∂ψ/∂t = -½ ∇²ψ + *V* ψ
//!
//! in one and two dimensions (units with ħ = *m* = 1). Both steppers solve the
//! full implicit system at every step: a tridiagonal one on a line and a
//! sparse five-point one on a rectangle. See [`docs`][crate::docs] for
//! background.

use ndarray as nd;
use num_complex::Complex64 as C64;
use serde::Deserialize;
use crate::{
    boundary::{ BoundaryPair, BoundarySet, Edge, Sides },
    error::{ ConfigError, ConfigResult, StepError, StepResult },
    grid::{ Grid1, Grid2 },
    initial::{ Initial1D, Initial2D },
    observables,
    operator::CrankNicolson,
    sparse::CrankNicolson2D,
    potential::{ AbsorbingLayer, Disk, Potential1D, Potential2D },
    stepper::{ Clock, Stepper },
};

/// Configuration of a [`Schrodinger1D`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Schrodinger1DParams {
    pub grid: Grid1,
    pub initial: Initial1D,
    #[serde(default)]
    pub boundary: BoundaryPair,
    #[serde(default)]
    pub potential: Potential1D,
    /// Layer placed on absorbing ends.
    #[serde(default)]
    pub absorbing: AbsorbingLayer,
    /// Time step in units of `dx²`.
    #[serde(default = "Schrodinger1DParams::def_dt_factor")]
    pub dt_factor: f64,
}

impl Schrodinger1DParams {
    fn def_dt_factor() -> f64 { 10.0 }

    /// Dirichlet ends, no potential, default time step.
    pub fn new(grid: Grid1, initial: Initial1D) -> Self {
        Self {
            grid,
            initial,
            boundary: BoundaryPair::default(),
            potential: Potential1D::default(),
            absorbing: AbsorbingLayer::default(),
            dt_factor: Self::def_dt_factor(),
        }
    }
}

/// Crank–Nicolson stepper for a complex wavefunction on a line.
pub struct Schrodinger1D {
    grid: Grid1,
    sides: Sides,
    potential: nd::Array1<C64>,
    cn: CrankNicolson<C64>,
    psi: nd::Array1<C64>,
    density: nd::Array1<f64>,
    clock: Clock,
}

impl Schrodinger1D {
    pub fn new(params: &Schrodinger1DParams) -> ConfigResult<Self> {
        ConfigError::check_positive("dt_factor", params.dt_factor)?;
        let grid = params.grid.clone();
        let n = grid.len();
        let dx = grid.dx();
        let dt = params.dt_factor * dx.powi(2);
        let sides = params.boundary.resolve();

        let mut potential: nd::Array1<C64>
            = params.potential.sample(&grid)?.mapv(C64::from);
        if sides.has(Edge::Absorbing) {
            params.absorbing.check()?;
            potential += &params.absorbing.sample(&grid, sides);
        }

        let r: nd::Array1<C64>
            = nd::Array1::from_elem(n, C64::i() * dt / (2.0 * dx.powi(2)));
        let s: nd::Array1<C64> = potential.mapv(|v| C64::i() * dt / 2.0 * v);
        let cn = CrankNicolson::new(&r, &s, sides)?;

        let psi = params.initial.sample(&grid)?;
        let density = observables::density(&psi);
        log::debug!(
            "schrodinger 1D: {n} points, dx = {dx:.3e}, dt = {dt:.3e}, {sides:?}");
        Ok(Self {
            grid,
            sides,
            potential,
            cn,
            psi,
            density,
            clock: Clock::new(dt),
        })
    }

    pub fn grid(&self) -> &Grid1 { &self.grid }

    pub fn sides(&self) -> Sides { self.sides }

    /// Total (real barrier plus absorbing layer) potential.
    pub fn potential(&self) -> &nd::Array1<C64> { &self.potential }

    /// Factorized implicit/explicit operator pair.
    pub fn operators(&self) -> &CrankNicolson<C64> { &self.cn }

    /// `|ψ|²` of the current state.
    pub fn density(&self) -> &nd::Array1<f64> { &self.density }

    /// `Σ |ψ|² dx` of the current state.
    pub fn probability(&self) -> f64 {
        observables::probability(&self.psi, self.grid.dx())
    }
}

impl Stepper for Schrodinger1D {
    type Field = nd::Array1<C64>;

    fn step(&mut self) -> StepResult<()> {
        self.clock.check()?;
        let next = self.cn.advance(&self.psi).map_err(StepError::from);
        self.psi = self.clock.accept(next)?;
        self.density = observables::density(&self.psi);
        Ok(())
    }

    fn state(&self) -> &Self::Field { &self.psi }

    fn steps(&self) -> usize { self.clock.steps }

    fn dt(&self) -> f64 { self.clock.dt }

    fn time(&self) -> f64 { self.clock.time }
}

/// Configuration of a [`Schrodinger2D`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Schrodinger2DParams {
    pub grid: Grid2,
    pub initial: Initial2D,
    #[serde(default)]
    pub boundary: BoundarySet,
    #[serde(default)]
    pub potential: Potential2D,
    /// Layer placed on absorbing edges.
    #[serde(default)]
    pub absorbing: AbsorbingLayer,
    /// Hard walls: the field is zeroed inside these after every step.
    #[serde(default)]
    pub walls: Vec<Disk>,
    /// Time step in units of `min(dx, dy)²`.
    #[serde(default = "Schrodinger2DParams::def_dt_factor")]
    pub dt_factor: f64,
}

impl Schrodinger2DParams {
    fn def_dt_factor() -> f64 { 2.0 }

    /// Dirichlet edges, no potential, no walls, default time step.
    pub fn new(grid: Grid2, initial: Initial2D) -> Self {
        Self {
            grid,
            initial,
            boundary: BoundarySet::default(),
            potential: Potential2D::default(),
            absorbing: AbsorbingLayer::default(),
            walls: Vec::new(),
            dt_factor: Self::def_dt_factor(),
        }
    }
}

/// Crank–Nicolson stepper for a complex wavefunction on a rectangle.
///
/// The implicit and explicit operators act on the whole grid at once (see
/// [`sparse`][crate::sparse]); the implicit one is factorized when the
/// stepper is built. Hard walls are zeroed after every step.
pub struct Schrodinger2D {
    grid: Grid2,
    sides_x: Sides,
    sides_y: Sides,
    potential: nd::Array2<C64>,
    cn: CrankNicolson2D,
    walls: Vec<(usize, usize)>,
    psi: nd::Array2<C64>,
    density: nd::Array2<f64>,
    clock: Clock,
}

impl Schrodinger2D {
    pub fn new(params: &Schrodinger2DParams) -> ConfigResult<Self> {
        ConfigError::check_positive("dt_factor", params.dt_factor)?;
        let grid = params.grid.clone();
        let (ny, nx) = grid.shape();
        let dx = grid.x.dx();
        let dy = grid.y.dx();
        let dt = params.dt_factor * grid.min_spacing().powi(2);
        let sides_x = params.boundary.x().resolve();
        let sides_y = params.boundary.y().resolve();

        let mut potential: nd::Array2<C64>
            = params.potential.sample(&grid)?.mapv(C64::from);
        if sides_x.has(Edge::Absorbing) || sides_y.has(Edge::Absorbing) {
            params.absorbing.check()?;
            potential += &params.absorbing.sample_2d(&grid, sides_x, sides_y);
        }

        let r = (
            C64::i() * dt / (2.0 * dx.powi(2)),
            C64::i() * dt / (2.0 * dy.powi(2)),
        );
        let s: nd::Array2<C64> = potential.mapv(|v| C64::i() * dt / 2.0 * v);
        let cn = CrankNicolson2D::new(r, &s, (sides_x, sides_y))?;

        let walls: Vec<(usize, usize)>
            = params.walls.iter()
            .flat_map(|disk| disk.cells(&grid))
            .collect();
        let mut psi = params.initial.sample(&grid)?;
        walls.iter().for_each(|&(j, i)| { psi[[j, i]] = C64::new(0.0, 0.0); });
        let density = observables::density(&psi);
        log::debug!(
            "schrodinger 2D: {ny}×{nx} points, dx = {dx:.3e}, dy = {dy:.3e}, \
            dt = {dt:.3e}, x: {sides_x:?}, y: {sides_y:?}, {} wall cells",
            walls.len(),
        );
        Ok(Self {
            grid,
            sides_x,
            sides_y,
            potential,
            cn,
            walls,
            psi,
            density,
            clock: Clock::new(dt),
        })
    }

    pub fn grid(&self) -> &Grid2 { &self.grid }

    /// Resolved conditions along `x` and `y`.
    pub fn sides(&self) -> (Sides, Sides) { (self.sides_x, self.sides_y) }

    /// Total (real plus absorbing) potential.
    pub fn potential(&self) -> &nd::Array2<C64> { &self.potential }

    /// Factorized implicit/explicit operator pair over the whole grid.
    pub fn operators(&self) -> &CrankNicolson2D { &self.cn }

    /// `|ψ|²` of the current state.
    pub fn density(&self) -> &nd::Array2<f64> { &self.density }

    /// `Σ |ψ|² dx dy` of the current state.
    pub fn probability(&self) -> f64 {
        observables::probability_2d(&self.psi, self.grid.x.dx(), self.grid.y.dx())
    }

    fn next(&self) -> nd::Array2<C64> {
        let mut next = self.cn.advance(&self.psi);
        self.walls.iter()
            .for_each(|&(j, i)| { next[[j, i]] = C64::new(0.0, 0.0); });
        next
    }
}

impl Stepper for Schrodinger2D {
    type Field = nd::Array2<C64>;

    fn step(&mut self) -> StepResult<()> {
        self.clock.check()?;
        let next = self.next();
        self.psi = self.clock.accept(Ok(next))?;
        self.density = observables::density(&self.psi);
        Ok(())
    }

    fn state(&self) -> &Self::Field { &self.psi }

    fn steps(&self) -> usize { self.clock.steps }

    fn dt(&self) -> f64 { self.clock.dt }

    fn time(&self) -> f64 { self.clock.time }
}
