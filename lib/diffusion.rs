//! Steppers for the diffusion equation
//!
//! ∂*u*/∂*t* = *D* ∇²*u*
//!
//! implicit (Crank–Nicolson) on a line with per-point diffusivity, and explicit
//! (forward-time, centered-space) on a rectangle for several independent
//! channels, each with its own uniform diffusivity.
//!
//! Neither stepper supports absorbing boundaries.

use ndarray as nd;
use serde::Deserialize;
use crate::{
    boundary::{ BoundaryPair, BoundarySet, Sides },
    error::{ ConfigError, ConfigResult, StepError, StepResult },
    grid::{ Grid1, Grid2 },
    initial::{ Initial1D, Initial2D },
    observables,
    operator::CrankNicolson,
    potential::Profile1D,
    stepper::{ Clock, Stepper },
};

/// Configuration of a [`Diffusion1D`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Diffusion1DParams {
    pub grid: Grid1,
    pub initial: Initial1D,
    #[serde(default)]
    pub boundary: BoundaryPair,
    #[serde(default)]
    pub diffusivity: Profile1D,
    /// Time step in units of `dx² / max(D)`.
    #[serde(default = "Diffusion1DParams::def_dt_factor")]
    pub dt_factor: f64,
}

impl Diffusion1DParams {
    fn def_dt_factor() -> f64 { 1e-3 }

    /// Dirichlet ends, unit diffusivity, default time step.
    pub fn new(grid: Grid1, initial: Initial1D) -> Self {
        Self {
            grid,
            initial,
            boundary: BoundaryPair::default(),
            diffusivity: Profile1D::default(),
            dt_factor: Self::def_dt_factor(),
        }
    }
}

/// Crank–Nicolson stepper for a real concentration on a line.
///
/// Unlike the other steppers, its operators can be rebuilt between steps with
/// a new time step ([`Self::scale_time_step`]) or new boundary conditions
/// ([`Self::set_boundaries`]), and its field can be [reset][Self::reset].
pub struct Diffusion1D {
    grid: Grid1,
    sides: Sides,
    diffusivity: nd::Array1<f64>,
    // time step set by the params, before any scaling
    base_dt: f64,
    cn: CrankNicolson<f64>,
    u: nd::Array1<f64>,
    clock: Clock,
}

const DIFFUSION_1D: &str = "diffusion1d";

// assemble and factorize the pair for the current time step and sides
fn diffusion_pair(
    diffusivity: &nd::Array1<f64>,
    dx: f64,
    dt: f64,
    sides: Sides,
) -> ConfigResult<CrankNicolson<f64>>
{
    let r: nd::Array1<f64> = diffusivity.mapv(|d| d * dt / dx.powi(2));
    let s: nd::Array1<f64> = nd::Array1::zeros(r.len());
    CrankNicolson::new(&r, &s, sides)
}

impl Diffusion1D {
    pub fn new(params: &Diffusion1DParams) -> ConfigResult<Self> {
        ConfigError::check_positive("dt_factor", params.dt_factor)?;
        let grid = params.grid.clone();
        let sides = params.boundary.resolve();
        sides.reject_absorbing(DIFFUSION_1D)?;
        let diffusivity = params.diffusivity.sample(&grid)?;
        let dmax = diffusivity.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let dt = params.dt_factor * grid.dx().powi(2) / dmax;
        let cn = diffusion_pair(&diffusivity, grid.dx(), dt, sides)?;
        let u = params.initial.sample_real(&grid)?;
        log::debug!(
            "diffusion 1D: {} points, dx = {:.3e}, dt = {:.3e}, {:?}",
            grid.len(), grid.dx(), dt, sides,
        );
        Ok(Self {
            grid,
            sides,
            diffusivity,
            base_dt: dt,
            cn,
            u,
            clock: Clock::new(dt),
        })
    }

    pub fn grid(&self) -> &Grid1 { &self.grid }

    pub fn sides(&self) -> Sides { self.sides }

    pub fn diffusivity(&self) -> &nd::Array1<f64> { &self.diffusivity }

    pub fn operators(&self) -> &CrankNicolson<f64> { &self.cn }

    /// `Σ u dx` of the current field.
    pub fn mass(&self) -> f64 { observables::mass(&self.u, self.grid.dx()) }

    /// Multiply the time step by `k` and rebuild the operators.
    pub fn scale_time_step(&mut self, k: f64) -> ConfigResult<()> {
        ConfigError::check_positive("time step scale", k)?;
        let dt = self.clock.dt * k;
        self.cn = diffusion_pair(&self.diffusivity, self.grid.dx(), dt, self.sides)?;
        self.clock.dt = dt;
        log::info!("diffusion 1D: time step now {dt:.3e}");
        Ok(())
    }

    /// Replace the boundary conditions and rebuild the operators.
    pub fn set_boundaries(&mut self, boundary: BoundaryPair) -> ConfigResult<()> {
        let sides = boundary.resolve();
        sides.reject_absorbing(DIFFUSION_1D)?;
        self.cn = diffusion_pair(&self.diffusivity, self.grid.dx(), self.clock.dt, sides)?;
        self.sides = sides;
        log::info!("diffusion 1D: boundaries now {sides:?}");
        Ok(())
    }

    /// Replace the field, restart the clock, and undo any earlier
    /// [`Self::scale_time_step`].
    pub fn reset(&mut self, initial: &Initial1D) -> ConfigResult<()> {
        let u = initial.sample_real(&self.grid)?;
        if self.clock.dt != self.base_dt {
            self.cn = diffusion_pair(
                &self.diffusivity, self.grid.dx(), self.base_dt, self.sides)?;
            self.clock.dt = self.base_dt;
            log::info!("diffusion 1D: time step back to {:.3e}", self.base_dt);
        }
        self.u = u;
        self.clock.reset();
        Ok(())
    }
}

impl Stepper for Diffusion1D {
    type Field = nd::Array1<f64>;

    fn step(&mut self) -> StepResult<()> {
        self.clock.check()?;
        let next = self.cn.advance(&self.u).map_err(StepError::from);
        self.u = self.clock.accept(next)?;
        Ok(())
    }

    fn state(&self) -> &Self::Field { &self.u }

    fn steps(&self) -> usize { self.clock.steps }

    fn dt(&self) -> f64 { self.clock.dt }

    fn time(&self) -> f64 { self.clock.time }
}

/// One field of a [`Diffusion2D`] with its own diffusivity.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
pub struct Channel {
    pub initial: Initial2D,
    #[serde(default = "Channel::def_diffusivity")]
    pub diffusivity: f64,
}

impl Channel {
    fn def_diffusivity() -> f64 { 1.0 }

    /// Unit diffusivity.
    pub fn new(initial: Initial2D) -> Self {
        Self { initial, diffusivity: Self::def_diffusivity() }
    }
}

/// Configuration of a [`Diffusion2D`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Diffusion2DParams {
    pub grid: Grid2,
    /// Fields diffusing independently on the same grid (e.g. the color
    /// channels of an image).
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub boundary: BoundarySet,
    /// Time step in units of `min(dx, dy)² / max(D)`.
    #[serde(default = "Diffusion2DParams::def_dt_factor")]
    pub dt_factor: f64,
}

impl Diffusion2DParams {
    fn def_dt_factor() -> f64 { 0.25 }

    /// Dirichlet edges, a single channel with unit diffusivity, default time
    /// step.
    pub fn new(grid: Grid2, initial: Initial2D) -> Self {
        Self {
            grid,
            channels: vec![Channel::new(initial)],
            boundary: BoundarySet::default(),
            dt_factor: Self::def_dt_factor(),
        }
    }
}

/// Explicit (FTCS) stepper for a stack of real concentrations on a
/// rectangle.
///
/// The field has shape `(channels, ny, nx)`. Each step computes, per channel
/// *c*,
/// *u* += α<sub>*x*</sub>\[*c*\] (*u*<sub>E</sub> + *u*<sub>W</sub> - 2*u*)
///      + α<sub>*y*</sub>\[*c*\] (*u*<sub>N</sub> + *u*<sub>S</sub> - 2*u*)
/// with α = *D*\[*c*\] d*t* / d*x*², looking neighbors up per edge condition.
/// All channels share one time step, set by the largest diffusivity.
pub struct Diffusion2D {
    grid: Grid2,
    sides_x: Sides,
    sides_y: Sides,
    diffusivity: Vec<f64>,
    alpha: Vec<(f64, f64)>,
    u: nd::Array3<f64>,
    clock: Clock,
}

const DIFFUSION_2D: &str = "diffusion2d";

impl Diffusion2D {
    pub fn new(params: &Diffusion2DParams) -> ConfigResult<Self> {
        (!params.channels.is_empty()).then_some(())
            .ok_or(ConfigError::NoChannels)?;
        params.channels.iter()
            .try_for_each(|ch| ConfigError::check_positive("diffusivity", ch.diffusivity))?;
        ConfigError::check_positive("dt_factor", params.dt_factor)?;
        let grid = params.grid.clone();
        let (ny, nx) = grid.shape();
        let sides_x = params.boundary.x().resolve();
        let sides_y = params.boundary.y().resolve();
        sides_x.reject_absorbing(DIFFUSION_2D)?;
        sides_y.reject_absorbing(DIFFUSION_2D)?;

        let diffusivity: Vec<f64>
            = params.channels.iter().map(|ch| ch.diffusivity).collect();
        let dmax = diffusivity.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let dt = params.dt_factor * grid.min_spacing().powi(2) / dmax;
        let (dx, dy) = (grid.x.dx(), grid.y.dx());
        let alpha: Vec<(f64, f64)>
            = diffusivity.iter()
            .map(|d| (d * dt / dx.powi(2), d * dt / dy.powi(2)))
            .collect();
        let worst = dmax * dt * (dx.powi(-2) + dy.powi(-2));
        if worst > 0.5 {
            log::warn!(
                "explicit stability limit exceeded: max(D) dt (1/dx² + 1/dy²) = {worst:.3} > 0.5");
        }

        let mut u: nd::Array3<f64> = nd::Array3::zeros((params.channels.len(), ny, nx));
        for (ch, mut field) in params.channels.iter().zip(u.outer_iter_mut()) {
            field.assign(&ch.initial.sample_real(&grid)?);
        }
        log::debug!(
            "diffusion 2D: {} channel(s) on {:?} points, dt = {:.3e}, x: {:?}, y: {:?}",
            diffusivity.len(), grid.shape(), dt, sides_x, sides_y,
        );
        Ok(Self {
            grid,
            sides_x,
            sides_y,
            diffusivity,
            alpha,
            u,
            clock: Clock::new(dt),
        })
    }

    pub fn grid(&self) -> &Grid2 { &self.grid }

    /// Resolved conditions along `x` and `y`.
    pub fn sides(&self) -> (Sides, Sides) { (self.sides_x, self.sides_y) }

    /// Number of channels.
    pub fn channels(&self) -> usize { self.diffusivity.len() }

    /// Diffusivity of each channel.
    pub fn diffusivity(&self) -> &[f64] { &self.diffusivity }

    /// `(D dt / dx², D dt / dy²)` for each channel.
    pub fn alpha(&self) -> &[(f64, f64)] { &self.alpha }

    /// Current field of channel `c`.
    ///
    /// *Panics if `c` is out of bounds*.
    pub fn channel(&self, c: usize) -> nd::ArrayView2<f64> {
        self.u.index_axis(nd::Axis(0), c)
    }

    /// `Σ u dx dy` of channel `c`.
    ///
    /// *Panics if `c` is out of bounds*.
    pub fn mass(&self, c: usize) -> f64 {
        self.channel(c).sum() * self.grid.x.dx() * self.grid.y.dx()
    }

    fn next(&self) -> nd::Array3<f64> {
        let (nc, ny, nx) = self.u.dim();
        let pinned_x = self.sides_x.pinned(nx);
        let pinned_y = self.sides_y.pinned(ny);
        let u = &self.u;
        nd::Array3::from_shape_fn((nc, ny, nx), |(c, j, i)| {
            let uc = u[[c, j, i]];
            if pinned_x.contains(&i) || pinned_y.contains(&j) { return uc; }
            let (ax, ay) = self.alpha[c];
            let [w, e] = self.sides_x.neighbors(i, nx);
            let [s, n] = self.sides_y.neighbors(j, ny);
            let along_x
                = w.map_or(0.0, |w| u[[c, j, w]]) + e.map_or(0.0, |e| u[[c, j, e]]);
            let along_y
                = s.map_or(0.0, |s| u[[c, s, i]]) + n.map_or(0.0, |n| u[[c, n, i]]);
            uc + ax * (along_x - 2.0 * uc) + ay * (along_y - 2.0 * uc)
        })
    }
}

impl Stepper for Diffusion2D {
    type Field = nd::Array3<f64>;

    fn step(&mut self) -> StepResult<()> {
        self.clock.check()?;
        let next = self.next();
        self.u = self.clock.accept(Ok(next))?;
        Ok(())
    }

    fn state(&self) -> &Self::Field { &self.u }

    fn steps(&self) -> usize { self.clock.steps }

    fn dt(&self) -> f64 { self.clock.dt }

    fn time(&self) -> f64 { self.clock.time }
}

#[cfg(test)]
mod tests {
    use approx::{ assert_abs_diff_eq, assert_relative_eq };
    use crate::{ boundary::Boundary, initial::StepPattern, observables::trapz };
    use super::*;

    fn unit(points: usize) -> Grid1 { Grid1::linspace(0.0, 1.0, points).unwrap() }

    #[test]
    fn rejects_absorbing() {
        let mut params = Diffusion1DParams::new(unit(11), Initial1D::Zero);
        params.boundary = BoundaryPair::new(Boundary::Neumann, Boundary::Absorbing);
        assert!(matches!(
            Diffusion1D::new(&params),
            Err(ConfigError::UnsupportedBoundary { boundary: Boundary::Absorbing, .. }),
        ));
        let mut params = Diffusion2DParams::new(
            Grid2::square(0.0, 1.0, 11).unwrap(), Initial2D::Zero);
        params.boundary.top = Boundary::Absorbing;
        assert!(Diffusion2D::new(&params).is_err());
    }

    #[test]
    fn zero_stays_zero() {
        let params = Diffusion1DParams::new(unit(51), Initial1D::Zero);
        let mut sim = Diffusion1D::new(&params).unwrap();
        sim.advance(100).unwrap();
        assert!(sim.state().iter().all(|uk| *uk == 0.0));
    }

    #[test]
    fn lowest_mode_decays() {
        let mut params = Diffusion1DParams::new(
            unit(101), Initial1D::Mode { number: 1, amplitude: 1.0 });
        params.dt_factor = 10.0;
        let mut sim = Diffusion1D::new(&params).unwrap();
        assert_relative_eq!(sim.dt(), 1e-3, max_relative = 1e-9);
        sim.advance(1000).unwrap();
        let expected = (-std::f64::consts::PI.powi(2) * sim.time()).exp();
        assert_relative_eq!(sim.state()[50], expected, max_relative = 1e-2);
        assert_eq!(sim.state()[0], 0.0);
    }

    #[test]
    fn neumann_conserves_mass() {
        let mut params = Diffusion1DParams::new(
            unit(200), Initial1D::Step { pattern: StepPattern::TwoBands });
        params.boundary = BoundaryPair::both(Boundary::Neumann);
        params.dt_factor = 10.0;
        let mut sim = Diffusion1D::new(&params).unwrap();
        let dx = sim.grid().dx();
        let m0 = trapz(sim.state(), dx);
        sim.advance(500).unwrap();
        assert_relative_eq!(trapz(sim.state(), dx), m0, max_relative = 1e-10);
    }

    #[test]
    fn periodic_uniform_stays_uniform() {
        let mut params = Diffusion1DParams::new(
            unit(64), Initial1D::Step { pattern: StepPattern::Uniform });
        params.boundary = BoundaryPair::both(Boundary::Periodic);
        params.dt_factor = 50.0;
        let mut sim = Diffusion1D::new(&params).unwrap();
        sim.advance(50).unwrap();
        sim.state().iter().for_each(|uk| assert_abs_diff_eq!(*uk, 1.0, epsilon = 1e-12));
    }

    #[test]
    fn reconfigure_between_steps() {
        let params = Diffusion1DParams::new(
            unit(50), Initial1D::Step { pattern: StepPattern::Half });
        let mut sim = Diffusion1D::new(&params).unwrap();
        let dt = sim.dt();
        sim.advance(3).unwrap();
        sim.scale_time_step(2.0).unwrap();
        assert_relative_eq!(sim.dt(), 2.0 * dt);
        sim.step().unwrap();
        assert_relative_eq!(sim.time(), 5.0 * dt, max_relative = 1e-12);

        sim.set_boundaries(BoundaryPair::both(Boundary::Periodic)).unwrap();
        assert!(sim.sides().is_periodic());
        assert!(sim.operators().implicit().is_cyclic());
        assert!(sim.set_boundaries(BoundaryPair::both(Boundary::Absorbing)).is_err());
        assert!(sim.sides().is_periodic());

        sim.reset(&Initial1D::Step { pattern: StepPattern::Uniform }).unwrap();
        assert_eq!(sim.steps(), 0);
        assert_eq!(sim.state().sum(), 50.0);
        assert_eq!(sim.dt(), dt);
    }

    #[test]
    fn reset_undoes_time_step_scaling() {
        let mut params = Diffusion1DParams::new(
            unit(101), Initial1D::Mode { number: 1, amplitude: 1.0 });
        params.dt_factor = 10.0;
        let mut fresh = Diffusion1D::new(&params).unwrap();
        let mut sim = Diffusion1D::new(&params).unwrap();
        sim.scale_time_step(4.0).unwrap();
        sim.advance(20).unwrap();
        sim.reset(&params.initial).unwrap();
        assert_eq!(sim.dt(), fresh.dt());
        assert_eq!(sim.time(), 0.0);

        // same operators again
        fresh.advance(10).unwrap();
        sim.advance(10).unwrap();
        assert_relative_eq!(sim.time(), fresh.time(), max_relative = 1e-12);
        sim.state().iter().zip(fresh.state())
            .for_each(|(a, b)| assert_abs_diff_eq!(*a, *b, epsilon = 1e-14));
    }

    #[test]
    fn ftcs_dirichlet_edges_fixed() {
        let grid = Grid2::square(0.0, 1.0, 21).unwrap();
        let mut params = Diffusion2DParams::new(grid, Initial2D::Uniform { value: 1.0 });
        params.boundary.left = Boundary::Neumann;
        let mut sim = Diffusion2D::new(&params).unwrap();
        // start from zero on the bottom edge only
        sim.u.slice_mut(nd::s![0, 0, ..]).fill(0.0);
        sim.advance(50).unwrap();
        let u = sim.channel(0);
        assert!(u.row(0).iter().all(|uk| *uk == 0.0));
        assert!(u.row(20).iter().all(|uk| *uk == 1.0));
        assert!(u.column(20).iter().skip(1).all(|uk| *uk == 1.0));
        assert!(u[[1, 10]] < 1.0);
    }

    fn blob() -> Initial2D {
        Initial2D::Gaussian {
            center: (0.0, 0.0),
            width: 0.2,
            wavenumber: (0.0, 0.0),
            amplitude: 1.0,
        }
    }

    #[test]
    fn channels_diffuse_at_own_rates() {
        let grid = Grid2::square(-1.0, 1.0, 41).unwrap();
        let mut params = Diffusion2DParams::new(grid.clone(), blob());
        params.channels = vec![
            Channel { initial: blob(), diffusivity: 1.0 },
            Channel { initial: blob(), diffusivity: 0.25 },
        ];
        params.boundary = BoundarySet::all(Boundary::Neumann);
        let mut sim = Diffusion2D::new(&params).unwrap();
        assert_eq!(sim.channels(), 2);
        assert_eq!(sim.state().dim(), (2, 41, 41));
        // shared step set by the faster channel
        assert_relative_eq!(sim.dt(), 0.25 * 0.05_f64.powi(2), max_relative = 1e-12);
        let (fast, slow) = (sim.alpha()[0], sim.alpha()[1]);
        assert_relative_eq!(slow.0, 0.25 * fast.0, max_relative = 1e-12);
        assert_relative_eq!(slow.1, 0.25 * fast.1, max_relative = 1e-12);

        assert_eq!(sim.mass(0), sim.mass(1));
        sim.advance(40).unwrap();
        assert!(sim.channel(0)[[20, 20]] < sim.channel(1)[[20, 20]]);
        assert!(sim.channel(1)[[20, 20]] < 1.0);

        // a slow channel on its own, at the same time step, matches
        let mut alone = Diffusion2DParams::new(grid, blob());
        alone.channels[0].diffusivity = 0.25;
        alone.boundary = BoundarySet::all(Boundary::Neumann);
        alone.dt_factor = 0.0625;
        let mut alone = Diffusion2D::new(&alone).unwrap();
        assert_relative_eq!(alone.dt(), sim.dt(), max_relative = 1e-12);
        alone.advance(40).unwrap();
        alone.channel(0).iter().zip(sim.channel(1))
            .for_each(|(a, b)| assert_abs_diff_eq!(*a, *b, epsilon = 1e-12));
    }

    #[test]
    fn rejects_empty_channel_list() {
        let mut params = Diffusion2DParams::new(
            Grid2::square(0.0, 1.0, 11).unwrap(), Initial2D::Zero);
        params.channels.clear();
        assert!(matches!(Diffusion2D::new(&params), Err(ConfigError::NoChannels)));
        params.channels.push(Channel { initial: Initial2D::Zero, diffusivity: -1.0 });
        assert!(Diffusion2D::new(&params).is_err());
    }
}
