//! Boundary-condition descriptors and their per-axis resolution.
//!
//! Conditions are chosen per side as a [`Boundary`] and resolved once per axis
//! into [`Sides`], which is all the operator builders ever look at. Periodicity
//! is a property of a whole axis: if either side of an axis asks for it, both
//! ends are wrapped.

use std::{ fmt, str::FromStr };
use serde::Deserialize;
use crate::error::ConfigError;

/// Condition requested for one side of an axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Boundary {
    /// Fixed value.
    Dirichlet,
    /// Zero normal derivative.
    Neumann,
    /// Wraparound to the opposite side.
    Periodic,
    /// Outgoing waves are damped rather than reflected.
    Absorbing,
}

impl FromStr for Boundary {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "d" | "dirichlet" => Ok(Self::Dirichlet),
            "n" | "neumann" => Ok(Self::Neumann),
            "p" | "periodic" => Ok(Self::Periodic),
            "a" | "pab" | "pml" | "absorbing" => Ok(Self::Absorbing),
            _ => Err(ConfigError::UnknownBoundary(s.to_string())),
        }
    }
}

impl TryFrom<String> for Boundary {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dirichlet => write!(f, "dirichlet"),
            Self::Neumann => write!(f, "neumann"),
            Self::Periodic => write!(f, "periodic"),
            Self::Absorbing => write!(f, "absorbing"),
        }
    }
}

/// Condition at one end of a non-periodic axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    Dirichlet,
    Neumann,
    Absorbing,
}

impl From<Edge> for Boundary {
    fn from(edge: Edge) -> Self {
        match edge {
            Edge::Dirichlet => Self::Dirichlet,
            Edge::Neumann => Self::Neumann,
            Edge::Absorbing => Self::Absorbing,
        }
    }
}

/// Conditions requested for the two ends of an axis.
///
/// `lower` applies at the first grid point and `upper` at the last.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct BoundaryPair {
    #[serde(alias = "left", alias = "bottom")]
    pub lower: Boundary,
    #[serde(alias = "right", alias = "top")]
    pub upper: Boundary,
}

impl BoundaryPair {
    pub fn new(lower: Boundary, upper: Boundary) -> Self {
        Self { lower, upper }
    }

    /// The same condition on both ends.
    pub fn both(bc: Boundary) -> Self { Self { lower: bc, upper: bc } }

    /// Resolve into the conditions actually applied to the axis.
    ///
    /// A periodic request on either side makes the whole axis periodic.
    pub fn resolve(self) -> Sides {
        use Boundary::*;
        let edge = |bc: Boundary| match bc {
            Dirichlet => Edge::Dirichlet,
            Neumann => Edge::Neumann,
            Absorbing => Edge::Absorbing,
            Periodic => unreachable!(),
        };
        match (self.lower, self.upper) {
            (Periodic, Periodic) => Sides::Periodic,
            (Periodic, other) | (other, Periodic) => {
                log::warn!(
                    "periodic requested on one side only (other side: {}); \
                    wrapping both ends",
                    other,
                );
                Sides::Periodic
            },
            (lower, upper) => {
                Sides::Open { lower: edge(lower), upper: edge(upper) }
            },
        }
    }
}

impl Default for BoundaryPair {
    fn default() -> Self { Self::both(Boundary::Dirichlet) }
}

/// Conditions for the four edges of a 2D domain.
///
/// `left`/`right` are the first/last points along `x`; `bottom`/`top` the
/// first/last along `y`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(default)]
pub struct BoundarySet {
    pub left: Boundary,
    pub right: Boundary,
    pub bottom: Boundary,
    pub top: Boundary,
}

impl BoundarySet {
    /// The same condition on every edge.
    pub fn all(bc: Boundary) -> Self {
        Self { left: bc, right: bc, bottom: bc, top: bc }
    }

    pub fn x(&self) -> BoundaryPair { BoundaryPair::new(self.left, self.right) }

    pub fn y(&self) -> BoundaryPair { BoundaryPair::new(self.bottom, self.top) }
}

impl Default for BoundarySet {
    fn default() -> Self { Self::all(Boundary::Dirichlet) }
}

/// Resolved conditions for one axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Sides {
    /// Both ends wrap onto each other.
    Periodic,
    /// Independent conditions at each end.
    Open { lower: Edge, upper: Edge },
}

impl Sides {
    /// Both ends fixed.
    pub const DIRICHLET: Self
        = Self::Open { lower: Edge::Dirichlet, upper: Edge::Dirichlet };

    pub fn is_periodic(&self) -> bool { matches!(self, Self::Periodic) }

    /// Condition at the first point, if not periodic.
    pub fn lower(&self) -> Option<Edge> {
        match self {
            Self::Periodic => None,
            Self::Open { lower, .. } => Some(*lower),
        }
    }

    /// Condition at the last point, if not periodic.
    pub fn upper(&self) -> Option<Edge> {
        match self {
            Self::Periodic => None,
            Self::Open { upper, .. } => Some(*upper),
        }
    }

    /// Return `true` if either end has the given condition.
    pub fn has(&self, edge: Edge) -> bool {
        self.lower() == Some(edge) || self.upper() == Some(edge)
    }

    /// Indices of an `n`-point axis whose values are held fixed.
    pub fn pinned(&self, n: usize) -> Vec<usize> {
        let mut idx: Vec<usize> = Vec::with_capacity(2);
        if self.lower() == Some(Edge::Dirichlet) { idx.push(0); }
        if self.upper() == Some(Edge::Dirichlet) { idx.push(n - 1); }
        idx
    }

    /// Indices of the points on either side of `k` on an `n`-point axis.
    ///
    /// Periodic axes wrap around and a Neumann end mirrors the inward
    /// neighbor; beyond any other end there is no neighbor.
    pub fn neighbors(&self, k: usize, n: usize) -> [Option<usize>; 2] {
        let lo
            = if k > 0 {
                Some(k - 1)
            } else {
                match self {
                    Self::Periodic => Some(n - 1),
                    Self::Open { lower: Edge::Neumann, .. } => Some(1),
                    Self::Open { .. } => None,
                }
            };
        let up
            = if k + 1 < n {
                Some(k + 1)
            } else {
                match self {
                    Self::Periodic => Some(0),
                    Self::Open { upper: Edge::Neumann, .. } => Some(n - 2),
                    Self::Open { .. } => None,
                }
            };
        [lo, up]
    }

    /// Fail with [`ConfigError::UnsupportedBoundary`] if either end is
    /// absorbing.
    pub(crate) fn reject_absorbing(&self, model: &'static str)
        -> Result<(), ConfigError>
    {
        (!self.has(Edge::Absorbing)).then_some(())
            .ok_or(ConfigError::UnsupportedBoundary {
                model,
                boundary: Boundary::Absorbing,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tokens() {
        assert_eq!("d".parse::<Boundary>().unwrap(), Boundary::Dirichlet);
        assert_eq!("Neumann".parse::<Boundary>().unwrap(), Boundary::Neumann);
        assert_eq!("P".parse::<Boundary>().unwrap(), Boundary::Periodic);
        assert_eq!("pab".parse::<Boundary>().unwrap(), Boundary::Absorbing);
        assert_eq!("pml".parse::<Boundary>().unwrap(), Boundary::Absorbing);
    }

    #[test]
    fn rejects_unknown_token() {
        match "robin".parse::<Boundary>() {
            Err(ConfigError::UnknownBoundary(tok)) => assert_eq!(tok, "robin"),
            other => panic!("expected UnknownBoundary, got {other:?}"),
        }
    }

    #[test]
    fn neighbors_per_edge() {
        let sides = Sides::Open { lower: Edge::Neumann, upper: Edge::Absorbing };
        assert_eq!(sides.neighbors(0, 6), [Some(1), Some(1)]);
        assert_eq!(sides.neighbors(3, 6), [Some(2), Some(4)]);
        assert_eq!(sides.neighbors(5, 6), [Some(4), None]);
        assert_eq!(Sides::Periodic.neighbors(0, 6), [Some(5), Some(1)]);
        assert_eq!(Sides::Periodic.neighbors(5, 6), [Some(4), Some(0)]);
        assert_eq!(Sides::DIRICHLET.neighbors(0, 6), [None, Some(1)]);
    }

    #[test]
    fn periodic_takes_precedence() {
        use Boundary::*;
        assert_eq!(BoundaryPair::new(Periodic, Neumann).resolve(), Sides::Periodic);
        assert_eq!(BoundaryPair::new(Dirichlet, Periodic).resolve(), Sides::Periodic);
        assert_eq!(
            BoundaryPair::new(Neumann, Absorbing).resolve(),
            Sides::Open { lower: Edge::Neumann, upper: Edge::Absorbing },
        );
    }

    #[test]
    fn pinned_indices() {
        assert_eq!(Sides::DIRICHLET.pinned(10), vec![0, 9]);
        assert!(Sides::Periodic.pinned(10).is_empty());
        let sides = Sides::Open { lower: Edge::Neumann, upper: Edge::Dirichlet };
        assert_eq!(sides.pinned(4), vec![3]);
    }
}
