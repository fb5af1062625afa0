//! Per-point coefficient fields: Schrödinger potentials, absorbing layers, and
//! the real-valued wave-speed and diffusivity profiles.

use std::f64::consts::FRAC_PI_2;
use ndarray as nd;
use num_complex::Complex64 as C64;
use serde::Deserialize;
use crate::{
    boundary::{ Edge, Sides },
    error::{ ConfigError, ConfigResult },
    grid::{ Grid1, Grid2 },
};

/// Real potential over a 1D grid.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Potential1D {
    /// Free motion.
    #[default]
    None,
    /// Constant `height` on `[start, end)`, zero elsewhere.
    Barrier { start: f64, end: f64, height: f64 },
}

impl Potential1D {
    /// Evaluate on a grid.
    pub fn sample(&self, grid: &Grid1) -> ConfigResult<nd::Array1<f64>> {
        match self {
            Self::None => Ok(nd::Array1::zeros(grid.len())),
            Self::Barrier { start, end, height } => {
                ConfigError::check_finite("barrier height", *height)?;
                (start < end).then_some(())
                    .ok_or(ConfigError::BadBounds(*start, *end))?;
                Ok(grid.map(|x| {
                    if (*start..*end).contains(&x) { *height } else { 0.0 }
                }))
            },
        }
    }
}

/// A disk in the plane.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
pub struct Disk {
    pub center: (f64, f64),
    pub radius: f64,
}

impl Disk {
    /// Return `true` if `(x, y)` lies strictly inside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (x - self.center.0).hypot(y - self.center.1) < self.radius
    }

    /// Indices `(j, i)` of every point of `grid` inside the disk.
    pub fn cells(&self, grid: &Grid2) -> Vec<(usize, usize)> {
        let x = grid.x.x();
        let y = grid.y.x();
        y.iter().enumerate()
            .flat_map(move |(j, &yj)| {
                x.iter().enumerate()
                    .filter(move |(_, xi)| self.contains(**xi, yj))
                    .map(move |(i, _)| (j, i))
            })
            .collect()
    }
}

/// Real potential over a 2D grid.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Potential2D {
    /// Free motion.
    #[default]
    None,
    /// Constant `height` inside any of a set of disks.
    Disks { disks: Vec<Disk>, height: f64 },
}

impl Potential2D {
    /// Evaluate on a grid; shape `(ny, nx)`.
    pub fn sample(&self, grid: &Grid2) -> ConfigResult<nd::Array2<f64>> {
        match self {
            Self::None => Ok(nd::Array2::zeros(grid.shape())),
            Self::Disks { disks, height } => {
                ConfigError::check_finite("disk height", *height)?;
                disks.iter()
                    .try_for_each(|d| ConfigError::check_positive("disk radius", d.radius))?;
                Ok(grid.map(|x, y| {
                    if disks.iter().any(|d| d.contains(x, y)) { *height } else { 0.0 }
                }))
            },
        }
    }
}

/// Complex absorbing potential placed along absorbing edges.
///
/// At depth `d` into a layer of the given thickness the potential is
/// `strength * (1 - exp(i θ))` with phase `θ = min(d^power, π/2)`, whose
/// negative imaginary part damps anything entering the layer. The phase
/// saturates so that the imaginary part keeps its sign however wide the layer
/// is.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
pub struct AbsorbingLayer {
    #[serde(default = "AbsorbingLayer::def_thickness")]
    pub thickness: f64,
    #[serde(default = "AbsorbingLayer::def_strength")]
    pub strength: f64,
    #[serde(default = "AbsorbingLayer::def_power")]
    pub power: f64,
}

impl Default for AbsorbingLayer {
    fn default() -> Self {
        Self {
            thickness: Self::def_thickness(),
            strength: Self::def_strength(),
            power: Self::def_power(),
        }
    }
}

impl AbsorbingLayer {
    fn def_thickness() -> f64 { 0.1 }

    fn def_strength() -> f64 { 2e5 }

    fn def_power() -> f64 { 2.0 }

    pub(crate) fn check(&self) -> ConfigResult<()> {
        ConfigError::check_positive("absorbing thickness", self.thickness)?;
        ConfigError::check_positive("absorbing strength", self.strength)?;
        ConfigError::check_positive("absorbing power", self.power)?;
        Ok(())
    }

    /// Potential at depth `depth` into the layer.
    pub fn value(&self, depth: f64) -> C64 {
        let phase = depth.powf(self.power).min(FRAC_PI_2);
        self.strength * (1.0 - C64::cis(phase))
    }

    // depth of `x` into the layers on the absorbing ends of an axis, if inside
    // any; the deeper layer wins where two overlap
    fn depth(&self, x: f64, axis: &Grid1, sides: Sides) -> Option<f64> {
        let lower
            = (sides.lower() == Some(Edge::Absorbing))
            .then(|| self.thickness - (x - axis.start()))
            .filter(|d| *d > 0.0);
        let upper
            = (sides.upper() == Some(Edge::Absorbing))
            .then(|| self.thickness - (axis.end() - x))
            .filter(|d| *d > 0.0);
        match (lower, upper) {
            (Some(l), Some(u)) => Some(l.max(u)),
            (l, u) => l.or(u),
        }
    }

    /// Layer potential along a 1D axis; zero away from absorbing ends.
    pub fn sample(&self, grid: &Grid1, sides: Sides) -> nd::Array1<C64> {
        grid.map(|x| {
            self.depth(x, grid, sides)
                .map(|d| self.value(d))
                .unwrap_or(C64::new(0.0, 0.0))
        })
    }

    /// Layer potential over a 2D grid; zero away from absorbing edges.
    pub fn sample_2d(&self, grid: &Grid2, sides_x: Sides, sides_y: Sides)
        -> nd::Array2<C64>
    {
        grid.map(|x, y| {
            let dx = self.depth(x, &grid.x, sides_x);
            let dy = self.depth(y, &grid.y, sides_y);
            let depth
                = match (dx, dy) {
                    (Some(a), Some(b)) => Some(a.max(b)),
                    (a, b) => a.or(b),
                };
            depth.map(|d| self.value(d)).unwrap_or(C64::new(0.0, 0.0))
        })
    }
}

/// Positive real coefficient over a 1D grid (wave speed or diffusivity).
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Profile1D {
    /// The same value everywhere.
    Uniform { value: f64 },
    /// `value` everywhere except `value * factor` on `[start, end)`.
    Layer { value: f64, start: f64, end: f64, factor: f64 },
}

impl Default for Profile1D {
    fn default() -> Self { Self::Uniform { value: 1.0 } }
}

impl Profile1D {
    /// Evaluate on a grid.
    pub fn sample(&self, grid: &Grid1) -> ConfigResult<nd::Array1<f64>> {
        match *self {
            Self::Uniform { value } => {
                ConfigError::check_positive("coefficient", value)?;
                Ok(nd::Array1::from_elem(grid.len(), value))
            },
            Self::Layer { value, start, end, factor } => {
                ConfigError::check_positive("coefficient", value)?;
                ConfigError::check_positive("layer factor", factor)?;
                (start < end).then_some(())
                    .ok_or(ConfigError::BadBounds(start, end))?;
                Ok(grid.map(|x| {
                    if (start..end).contains(&x) { value * factor } else { value }
                }))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::boundary::{ Boundary, BoundaryPair };
    use super::*;

    #[test]
    fn barrier() {
        let grid = Grid1::linspace(0.0, 1.0, 11).unwrap();
        let v = Potential1D::Barrier { start: 0.3, end: 0.5, height: 500.0 }
            .sample(&grid).unwrap();
        let inside: Vec<usize>
            = v.iter().enumerate()
            .filter(|(_, vk)| **vk == 500.0)
            .map(|(k, _)| k)
            .collect();
        assert_eq!(inside, vec![3, 4]);
    }

    #[test]
    fn layer_only_on_absorbing_side() {
        let grid = Grid1::linspace(-1.0, 1.0, 201).unwrap();
        let sides = BoundaryPair::new(Boundary::Dirichlet, Boundary::Absorbing).resolve();
        let layer = AbsorbingLayer::default();
        let v = layer.sample(&grid, sides);
        assert!(v.iter().take(100).all(|vk| *vk == C64::new(0.0, 0.0)));
        assert!(v[200].im < 0.0);
        assert!(v[195].im < 0.0);
        assert!(v[200].im < v[195].im);
        assert_eq!(v[185], C64::new(0.0, 0.0));
    }

    #[test]
    fn deeper_layer_wins() {
        let grid = Grid1::linspace(0.0, 1.0, 11).unwrap();
        let layer = AbsorbingLayer { thickness: 0.8, strength: 1.0, power: 1.0 };
        let v = layer.sample(&grid, BoundaryPair::both(Boundary::Absorbing).resolve());
        // at x = 0.3 the lower layer is 0.5 deep and the upper one 0.1
        assert!((v[3] - layer.value(0.5)).norm() < 1e-12);
    }

    #[test]
    fn wide_layer_keeps_damping() {
        let grid = Grid1::linspace(0.0, 20.0, 500).unwrap();
        let layer = AbsorbingLayer { thickness: 2.0, strength: 2e5, power: 2.0 };
        let v = layer.sample(&grid, BoundaryPair::both(Boundary::Absorbing).resolve());
        assert!(v.iter().all(|vk| vk.im <= 0.0));
        // past d = (π/2)^(1/2) the phase is saturated
        assert_eq!(layer.value(1.5), layer.value(1.9));
        assert!((layer.value(1.9) - C64::new(2e5, -2e5)).norm() < 1e-9);
        assert!(layer.value(1.0).im > layer.value(1.2).im);
    }

    #[test]
    fn dielectric_layer() {
        let grid = Grid1::linspace(0.0, 199.0, 200).unwrap();
        let c = Profile1D::Layer { value: 1.0, start: 100.0, end: 150.0, factor: 0.7 }
            .sample(&grid).unwrap();
        assert_eq!(c[99], 1.0);
        assert_eq!(c[100], 0.7);
        assert_eq!(c[149], 0.7);
        assert_eq!(c[150], 1.0);
    }

    #[test]
    fn disks() {
        let grid = Grid2::square(-1.0, 1.0, 21).unwrap();
        let disk = Disk { center: (0.0, 0.0), radius: 0.15 };
        let v = Potential2D::Disks { disks: vec![disk], height: 500.0 }
            .sample(&grid).unwrap();
        assert_eq!(v[[10, 10]], 500.0);
        assert_eq!(v[[10, 11]], 500.0);
        assert_eq!(v[[11, 11]], 500.0);
        assert_eq!(v[[10, 12]], 0.0);
        assert_eq!(disk.cells(&grid).len(), 9);
    }
}
