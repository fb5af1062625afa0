//! Uniform coordinate grids in one and two dimensions.

use ndarray as nd;
use serde::Deserialize;
use crate::error::{ ConfigError, ConfigResult };

/// "Linspace-style" description of a single axis: start, inclusive end, and a
/// number of points.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
pub struct AxisSpec {
    pub start: f64,
    pub end: f64,
    pub points: usize,
}

/// A single, uniformly spaced coordinate axis.
///
/// Created once and never mutated; every stepper borrows its spacing and
/// length from here.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "AxisSpec")]
pub struct Grid1 {
    // coordinate array
    x: nd::Array1<f64>,
    // grid spacing
    dx: f64,
}

impl Grid1 {
    /// Create a new axis from start, inclusive end, and a number of points.
    ///
    /// Fails if `points < 2` or the bounds are not finite and increasing.
    pub fn linspace(start: f64, end: f64, points: usize) -> ConfigResult<Self> {
        ConfigError::check_points(points)?;
        (start.is_finite() && end.is_finite() && start < end).then_some(())
            .ok_or(ConfigError::BadBounds(start, end))?;
        let x: nd::Array1<f64> = nd::Array1::linspace(start, end, points);
        let dx = (end - start) / (points - 1) as f64;
        Ok(Self { x, dx })
    }

    /// Get a reference to the coordinate array.
    pub fn x(&self) -> &nd::Array1<f64> { &self.x }

    /// Get the grid spacing.
    pub fn dx(&self) -> f64 { self.dx }

    /// Get the number of points.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize { self.x.len() }

    /// First coordinate.
    pub fn start(&self) -> f64 { self.x[0] }

    /// Last coordinate.
    pub fn end(&self) -> f64 { self.x[self.x.len() - 1] }

    /// Distance between the first and last coordinates.
    pub fn width(&self) -> f64 { self.end() - self.start() }

    /// Evaluate a function at every coordinate.
    pub fn map<A, F>(&self, f: F) -> nd::Array1<A>
    where F: FnMut(f64) -> A
    {
        self.x.iter().copied().map(f).collect()
    }
}

impl TryFrom<AxisSpec> for Grid1 {
    type Error = ConfigError;

    fn try_from(spec: AxisSpec) -> ConfigResult<Self> {
        Self::linspace(spec.start, spec.end, spec.points)
    }
}

/// Cartesian product of two axes.
///
/// Fields over this grid have shape `(ny, nx)`: the first axis indexes `y`
/// and the second indexes `x`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Grid2 {
    pub x: Grid1,
    pub y: Grid1,
}

impl Grid2 {
    pub fn new(x: Grid1, y: Grid1) -> Self { Self { x, y } }

    /// Square grid with identical axes.
    pub fn square(start: f64, end: f64, points: usize) -> ConfigResult<Self> {
        let axis = Grid1::linspace(start, end, points)?;
        Ok(Self { x: axis.clone(), y: axis })
    }

    /// Field shape, `(ny, nx)`.
    pub fn shape(&self) -> (usize, usize) { (self.y.len(), self.x.len()) }

    /// Smaller of the two spacings.
    pub fn min_spacing(&self) -> f64 { self.x.dx().min(self.y.dx()) }

    /// Evaluate a function `f(x, y)` at every grid point.
    pub fn map<A, F>(&self, mut f: F) -> nd::Array2<A>
    where F: FnMut(f64, f64) -> A
    {
        let x = self.x.x();
        let y = self.y.x();
        nd::Array2::from_shape_fn(self.shape(), |(j, i)| f(x[i], y[j]))
    }
}
