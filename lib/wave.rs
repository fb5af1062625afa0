//! Three-level leapfrog stepper for the classical wave equation
//!
//! ∂²*u*/∂*t*² = *c*(*x*)² ∂²*u*/∂*x*²
//!
//! on a line, with per-point wave speed.

use std::f64::consts::FRAC_1_SQRT_2;
use ndarray as nd;
use serde::Deserialize;
use crate::{
    Arr1,
    boundary::{ BoundaryPair, Edge, Sides },
    error::{ ConfigError, ConfigResult, StepResult },
    grid::Grid1,
    initial::Initial1D,
    operator::BandOperator,
    potential::Profile1D,
    stepper::{ Clock, Stepper },
};

/// Assemble the leapfrog operator `L` for which `u' = L u - u_old`.
///
/// With Courant numbers `λ[i] = c[i] dt / dx`, interior rows have diagonal
/// `2 - 2 λ²` and off-diagonals `λ²`. Edges are edited per `sides`:
/// - Dirichlet: the row becomes `2 e_i`, so the edge value never changes;
/// - Neumann: the inward entry is doubled;
/// - Periodic: the first and last points are coupled;
/// - Absorbing: the first-order one-way (Mur) row
///   `[(2 - 2λ²) / (1 + λ), 2λ² / (1 + λ)]`.
///
/// Also returns, for each absorbing edge, the index and the factor
/// `(1 - λ) / (1 + λ)` by which the previous level must be scaled there before
/// every update.
pub fn leapfrog_operator<S>(lambda: &Arr1<S>, sides: Sides)
    -> ConfigResult<(BandOperator<f64>, Vec<(usize, f64)>)>
where S: nd::Data<Elem = f64>
{
    let n = lambda.len();
    ConfigError::check_points(n)?;
    let mut op: BandOperator<f64>
        = BandOperator::from_stencil(n, |i| {
            let l2 = lambda[i].powi(2);
            (l2, 2.0 - 2.0 * l2, l2)
        });
    let mut history: Vec<(usize, f64)> = Vec::new();
    match sides {
        Sides::Periodic => {
            op.close_ring(lambda[0].powi(2), lambda[n - 1].powi(2));
        },
        Sides::Open { lower, upper } => {
            for (i, edge) in [(0, lower), (n - 1, upper)] {
                let l = lambda[i];
                match edge {
                    Edge::Dirichlet => { op.pin(i, 2.0); },
                    Edge::Neumann => { op.mirror(i); },
                    Edge::Absorbing => {
                        op.set_edge(
                            i,
                            (2.0 - 2.0 * l.powi(2)) / (1.0 + l),
                            2.0 * l.powi(2) / (1.0 + l),
                        );
                        history.push((i, (1.0 - l) / (1.0 + l)));
                    },
                }
            }
        },
    }
    log::debug!("assembled {n}-point leapfrog operator with {sides:?}");
    Ok((op, history))
}

/// Configuration of a [`Wave1D`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Wave1DParams {
    pub grid: Grid1,
    /// Initial displacement; the initial velocity is zero.
    pub initial: Initial1D,
    #[serde(default)]
    pub boundary: BoundaryPair,
    /// Wave speed.
    #[serde(default)]
    pub speed: Profile1D,
    /// Courant number `max(c) dt / dx`.
    #[serde(default = "Wave1DParams::def_courant")]
    pub courant: f64,
}

impl Wave1DParams {
    fn def_courant() -> f64 { FRAC_1_SQRT_2 }

    /// Dirichlet ends, unit speed, default Courant number.
    pub fn new(grid: Grid1, initial: Initial1D) -> Self {
        Self {
            grid,
            initial,
            boundary: BoundaryPair::default(),
            speed: Profile1D::default(),
            courant: Self::def_courant(),
        }
    }
}

/// Leapfrog stepper for a real displacement field, starting at rest.
pub struct Wave1D {
    grid: Grid1,
    sides: Sides,
    speed: nd::Array1<f64>,
    op: BandOperator<f64>,
    history: Vec<(usize, f64)>,
    pinned: Vec<usize>,
    u: nd::Array1<f64>,
    u_old: nd::Array1<f64>,
    clock: Clock,
}

impl Wave1D {
    pub fn new(params: &Wave1DParams) -> ConfigResult<Self> {
        ConfigError::check_positive("courant", params.courant)?;
        if params.courant > 1.0 {
            log::warn!(
                "courant number {} exceeds 1; leapfrog will be unstable",
                params.courant,
            );
        }
        let grid = params.grid.clone();
        let sides = params.boundary.resolve();
        let speed = params.speed.sample(&grid)?;
        let cmax = speed.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let dt = params.courant * grid.dx() / cmax;
        let lambda: nd::Array1<f64> = speed.mapv(|c| c * dt / grid.dx());
        let (op, history) = leapfrog_operator(&lambda, sides)?;
        let pinned = sides.pinned(grid.len());
        let u = params.initial.sample_real(&grid)?;
        log::debug!(
            "wave 1D: {} points, dx = {:.3e}, dt = {:.3e}, {:?}",
            grid.len(), grid.dx(), dt, sides,
        );
        Ok(Self {
            grid,
            sides,
            speed,
            op,
            history,
            pinned,
            u_old: u.clone(),
            u,
            clock: Clock::new(dt),
        })
    }

    pub fn grid(&self) -> &Grid1 { &self.grid }

    pub fn sides(&self) -> Sides { self.sides }

    /// Wave speed at each point.
    pub fn speed(&self) -> &nd::Array1<f64> { &self.speed }

    pub fn operator(&self) -> &BandOperator<f64> { &self.op }

    /// Field one step before the current one.
    pub fn previous(&self) -> &nd::Array1<f64> { &self.u_old }

    /// `Σ u² dx` of the current field.
    pub fn square_norm(&self) -> f64 {
        self.u.iter().map(|uk| uk.powi(2)).sum::<f64>() * self.grid.dx()
    }

    fn next(&self) -> nd::Array1<f64> {
        let mut next: nd::Array1<f64>
            = if self.clock.steps == 0 {
                // zero initial velocity
                0.5 * self.op.apply(&self.u)
            } else {
                let mut old = self.u_old.clone();
                self.history.iter().for_each(|&(i, f)| { old[i] *= f; });
                self.op.apply(&self.u) - old
            };
        self.pinned.iter().for_each(|&i| { next[i] = self.u[i]; });
        next
    }
}

impl Stepper for Wave1D {
    type Field = nd::Array1<f64>;

    fn step(&mut self) -> StepResult<()> {
        self.clock.check()?;
        let next = self.next();
        let next = self.clock.accept(Ok(next))?;
        self.u_old = std::mem::replace(&mut self.u, next);
        Ok(())
    }

    fn state(&self) -> &Self::Field { &self.u }

    fn steps(&self) -> usize { self.clock.steps }

    fn dt(&self) -> f64 { self.clock.dt }

    fn time(&self) -> f64 { self.clock.time }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use crate::boundary::Boundary;
    use super::*;

    fn lambda(n: usize, l: f64) -> nd::Array1<f64> { nd::Array1::from_elem(n, l) }

    #[test]
    fn operator_rows() {
        use Boundary::*;
        let l = 0.5;
        let (op, hist)
            = leapfrog_operator(&lambda(5, l), BoundaryPair::new(Dirichlet, Neumann).resolve())
            .unwrap();
        assert_eq!(op.row(0).to_vec(), vec![2.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(op.row(2).to_vec(), vec![0.0, 0.25, 1.5, 0.25, 0.0]);
        assert_eq!(op.row(4).to_vec(), vec![0.0, 0.0, 0.0, 0.5, 1.5]);
        assert!(hist.is_empty());

        let (op, hist)
            = leapfrog_operator(&lambda(5, l), BoundaryPair::new(Absorbing, Periodic).resolve())
            .unwrap();
        assert!(op.is_cyclic());
        assert_eq!(op.get(0, 4), 0.25);
        assert!(hist.is_empty());

        let (op, hist)
            = leapfrog_operator(&lambda(5, l), BoundaryPair::new(Neumann, Absorbing).resolve())
            .unwrap();
        assert_relative_eq!(op.get(4, 4), 1.5 / 1.5);
        assert_relative_eq!(op.get(4, 3), 0.5 / 1.5);
        assert_eq!(hist.len(), 1);
        assert_eq!(hist[0].0, 4);
        assert_relative_eq!(hist[0].1, 0.5 / 1.5);
    }

    #[test]
    fn courant_sets_time_step() {
        let grid = Grid1::linspace(0.0, 199.0, 200).unwrap();
        let init = Initial1D::Gaussian {
            center: 50.0, width: 5.0, wavenumber: 0.0, amplitude: 11.0 };
        let mut params = Wave1DParams::new(grid, init);
        params.speed = Profile1D::Uniform { value: 2.0 };
        let sim = Wave1D::new(&params).unwrap();
        assert_relative_eq!(sim.dt(), FRAC_1_SQRT_2 / 2.0, max_relative = 1e-12);
    }

    #[test]
    fn dirichlet_ends_stay_fixed() {
        let grid = Grid1::linspace(0.0, 1.0, 101).unwrap();
        let params = Wave1DParams::new(grid, Initial1D::Mode { number: 2, amplitude: 1.0 });
        let mut sim = Wave1D::new(&params).unwrap();
        let (u0, un) = (sim.state()[0], sim.state()[100]);
        sim.advance(500).unwrap();
        assert_eq!(sim.state()[0], u0);
        assert_eq!(sim.state()[100], un);
    }

    #[test]
    fn standing_mode_oscillates() {
        // the mode returns to its initial shape after one period 2L / (n c)
        let grid = Grid1::linspace(0.0, 1.0, 201).unwrap();
        let params = Wave1DParams::new(grid, Initial1D::Mode { number: 1, amplitude: 1.0 });
        let mut sim = Wave1D::new(&params).unwrap();
        let u0 = sim.state().clone();
        let period = 2.0;
        let steps = (period / sim.dt()).round() as usize;
        sim.advance(steps / 2).unwrap();
        // half a period later the mode is inverted
        assert!((sim.state()[100] + u0[100]).abs() < 2e-2);
        sim.advance(steps - steps / 2).unwrap();
        assert!((sim.state()[100] - u0[100]).abs() < 2e-2);
    }
}
