//! A single type over every stepper, for drivers that pick the model at run
//! time.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    diffusion::{ Diffusion1D, Diffusion2D },
    error::StepResult,
    schrodinger::{ Schrodinger1D, Schrodinger2D },
    stepper::{ Phase, Stepper },
    wave::Wave1D,
};

/// Snapshot of a field, in a form that does not depend on the model.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Real part (or the field itself, for real-valued models). 2D diffusion
    /// frames carry a leading channel axis.
    pub re: nd::ArrayD<f64>,
    /// Imaginary part, for complex-valued models.
    pub im: Option<nd::ArrayD<f64>>,
    /// `|ψ|²`, for complex-valued models.
    pub density: Option<nd::ArrayD<f64>>,
}

impl Frame {
    fn real<D>(u: &nd::Array<f64, D>) -> Self
    where D: nd::Dimension
    {
        Self { re: u.clone().into_dyn(), im: None, density: None }
    }

    fn complex<D>(psi: &nd::Array<C64, D>, density: &nd::Array<f64, D>) -> Self
    where D: nd::Dimension
    {
        Self {
            re: psi.mapv(|z| z.re).into_dyn(),
            im: Some(psi.mapv(|z| z.im).into_dyn()),
            density: Some(density.clone().into_dyn()),
        }
    }
}

/// Any of the available steppers.
pub enum Simulation {
    Schrodinger1D(Schrodinger1D),
    Schrodinger2D(Schrodinger2D),
    Wave1D(Wave1D),
    Diffusion1D(Diffusion1D),
    Diffusion2D(Diffusion2D),
}

macro_rules! dispatch {
    ( $self:expr, $sim:ident => $body:expr ) => {
        match $self {
            Simulation::Schrodinger1D($sim) => $body,
            Simulation::Schrodinger2D($sim) => $body,
            Simulation::Wave1D($sim) => $body,
            Simulation::Diffusion1D($sim) => $body,
            Simulation::Diffusion2D($sim) => $body,
        }
    }
}

macro_rules! impl_from_stepper {
    ( $( $var:ident ),* $(,)? ) => {
        $(
            impl From<$var> for Simulation {
                fn from(sim: $var) -> Self { Self::$var(sim) }
            }
        )*
    }
}

impl_from_stepper!(Schrodinger1D, Schrodinger2D, Wave1D, Diffusion1D, Diffusion2D);

impl Simulation {
    /// Advance by one time step.
    pub fn step(&mut self) -> StepResult<()> { dispatch!(self, sim => sim.step()) }

    /// Take `n` steps, stopping at the first failure.
    pub fn advance(&mut self, n: usize) -> StepResult<()> {
        dispatch!(self, sim => sim.advance(n))
    }

    pub fn steps(&self) -> usize { dispatch!(self, sim => sim.steps()) }

    pub fn dt(&self) -> f64 { dispatch!(self, sim => sim.dt()) }

    pub fn time(&self) -> f64 { dispatch!(self, sim => sim.time()) }

    pub fn phase(&self) -> Phase { dispatch!(self, sim => sim.phase()) }

    /// Number of spatial dimensions of the field.
    pub fn ndim(&self) -> usize {
        match self {
            Self::Schrodinger1D(_) | Self::Wave1D(_) | Self::Diffusion1D(_) => 1,
            Self::Schrodinger2D(_) | Self::Diffusion2D(_) => 2,
        }
    }

    /// Sample coordinates, one array per axis, in field-axis order (`y`
    /// before `x` for 2D fields).
    pub fn coords(&self) -> Vec<nd::Array1<f64>> {
        match self {
            Self::Schrodinger1D(sim) => vec![sim.grid().x().clone()],
            Self::Wave1D(sim) => vec![sim.grid().x().clone()],
            Self::Diffusion1D(sim) => vec![sim.grid().x().clone()],
            Self::Schrodinger2D(sim) => {
                vec![sim.grid().y.x().clone(), sim.grid().x.x().clone()]
            },
            Self::Diffusion2D(sim) => {
                vec![sim.grid().y.x().clone(), sim.grid().x.x().clone()]
            },
        }
    }

    /// Snapshot the current field.
    pub fn frame(&self) -> Frame {
        match self {
            Self::Schrodinger1D(sim) => Frame::complex(sim.state(), sim.density()),
            Self::Schrodinger2D(sim) => Frame::complex(sim.state(), sim.density()),
            Self::Wave1D(sim) => Frame::real(sim.state()),
            Self::Diffusion1D(sim) => Frame::real(sim.state()),
            Self::Diffusion2D(sim) => Frame::real(sim.state()),
        }
    }
}
