//! Run files.
//!
//! A run file is a TOML document naming the model under a `model` key, with
//! the remaining keys forwarded to that model's params struct:
//!
//! ```toml
//! model = "schrodinger1d"
//! grid = { start = -1.0, end = 1.0, points = 500 }
//! boundary = { left = "d", right = "pab" }
//!
//! [initial]
//! type = "gaussian"
//! center = 0.0
//! width = 0.1
//! wavenumber = 20.0
//! ```

use std::{ fs, path::Path };
use serde::Deserialize;
use crate::{
    diffusion::{ Diffusion1D, Diffusion1DParams, Diffusion2D, Diffusion2DParams },
    error::{ ConfigError, ConfigResult },
    schrodinger::{
        Schrodinger1D,
        Schrodinger1DParams,
        Schrodinger2D,
        Schrodinger2DParams,
    },
    simulation::Simulation,
    wave::{ Wave1D, Wave1DParams },
};

/// Complete configuration of a single run.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "model")]
pub enum RunConfig {
    #[serde(rename = "schrodinger1d")]
    Schrodinger1D(Schrodinger1DParams),
    #[serde(rename = "schrodinger2d")]
    Schrodinger2D(Schrodinger2DParams),
    #[serde(rename = "wave1d")]
    Wave1D(Wave1DParams),
    #[serde(rename = "diffusion1d")]
    Diffusion1D(Diffusion1DParams),
    #[serde(rename = "diffusion2d")]
    Diffusion2D(Diffusion2DParams),
}

impl RunConfig {
    /// Parse a run file already held in memory.
    pub fn from_toml_str(s: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a run file.
    pub fn read<P>(path: P) -> ConfigResult<Self>
    where P: AsRef<Path>
    {
        let path = path.as_ref();
        let contents: String
            = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        log::info!("read run file {}", path.display());
        Self::from_toml_str(&contents)
    }

    /// Name of the configured model, as written in run files.
    pub fn model(&self) -> &'static str {
        match self {
            Self::Schrodinger1D(_) => "schrodinger1d",
            Self::Schrodinger2D(_) => "schrodinger2d",
            Self::Wave1D(_) => "wave1d",
            Self::Diffusion1D(_) => "diffusion1d",
            Self::Diffusion2D(_) => "diffusion2d",
        }
    }

    /// Construct the configured stepper.
    pub fn build(&self) -> ConfigResult<Simulation> {
        let sim: Simulation = match self {
            Self::Schrodinger1D(p) => Schrodinger1D::new(p)?.into(),
            Self::Schrodinger2D(p) => Schrodinger2D::new(p)?.into(),
            Self::Wave1D(p) => Wave1D::new(p)?.into(),
            Self::Diffusion1D(p) => Diffusion1D::new(p)?.into(),
            Self::Diffusion2D(p) => Diffusion2D::new(p)?.into(),
        };
        Ok(sim)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        boundary::{ Boundary, BoundaryPair },
        diffusion::Channel,
        initial::{ Initial1D, Initial2D },
        potential::Potential1D,
    };
    use super::*;

    #[test]
    fn parses_schrodinger() {
        let toml = r#"
            model = "schrodinger1d"
            grid = { start = -1.0, end = 1.0, points = 500 }
            boundary = { left = "d", right = "pab" }
            potential = { type = "barrier", start = 0.3, end = 0.5, height = 500.0 }

            [initial]
            type = "gaussian"
            center = -0.6
            width = 0.1
            wavenumber = 20.0
        "#;
        let cfg = RunConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.model(), "schrodinger1d");
        let RunConfig::Schrodinger1D(params) = cfg else {
            panic!("wrong model");
        };
        assert_eq!(params.grid.len(), 500);
        assert_eq!(
            params.boundary,
            BoundaryPair::new(Boundary::Dirichlet, Boundary::Absorbing),
        );
        assert_eq!(
            params.potential,
            Potential1D::Barrier { start: 0.3, end: 0.5, height: 500.0 },
        );
        assert_eq!(
            params.initial,
            Initial1D::Gaussian {
                center: -0.6, width: 0.1, wavenumber: 20.0, amplitude: 1.0 },
        );
        assert_eq!(params.dt_factor, 10.0);
    }

    #[test]
    fn parses_diffusion2d_with_defaults() {
        let toml = r#"
            model = "diffusion2d"
            grid = { x = { start = 0.0, end = 1.0, points = 20 }, y = { start = 0.0, end = 2.0, points = 40 } }
            boundary = { left = "p", right = "p" }

            [[channels]]
            initial = { type = "uniform", value = 2.0 }

            [[channels]]
            initial = { type = "zero" }
            diffusivity = 0.5
        "#;
        let RunConfig::Diffusion2D(params) = RunConfig::from_toml_str(toml).unwrap()
        else {
            panic!("wrong model");
        };
        assert_eq!(params.grid.shape(), (40, 20));
        assert_eq!(params.boundary.left, Boundary::Periodic);
        assert_eq!(params.boundary.top, Boundary::Dirichlet);
        assert_eq!(
            params.channels,
            vec![
                Channel::new(Initial2D::Uniform { value: 2.0 }),
                Channel { initial: Initial2D::Zero, diffusivity: 0.5 },
            ],
        );
        assert_eq!(params.dt_factor, 0.25);
    }

    #[test]
    fn rejects_unknown_boundary() {
        let toml = r#"
            model = "wave1d"
            grid = { start = 0.0, end = 1.0, points = 50 }
            boundary = { left = "robin", right = "d" }
            initial = { type = "zero" }
        "#;
        match RunConfig::from_toml_str(toml) {
            Err(ConfigError::Toml(e)) => assert!(e.to_string().contains("robin")),
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_grid() {
        let toml = r#"
            model = "diffusion1d"
            grid = { start = 0.0, end = 1.0, points = 1 }
            initial = { type = "zero" }
        "#;
        assert!(matches!(RunConfig::from_toml_str(toml), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn rejects_unknown_model() {
        let toml = r#"
            model = "heat3d"
            grid = { start = 0.0, end = 1.0, points = 10 }
        "#;
        assert!(RunConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn build_rejects_unsupported_boundary() {
        let toml = r#"
            model = "diffusion1d"
            grid = { start = 0.0, end = 1.0, points = 50 }
            boundary = { lower = "n", upper = "a" }
            initial = { type = "zero" }
        "#;
        let cfg = RunConfig::from_toml_str(toml).unwrap();
        assert!(matches!(
            cfg.build(),
            Err(ConfigError::UnsupportedBoundary { boundary: Boundary::Absorbing, .. }),
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            RunConfig::read("no/such/run.toml"),
            Err(ConfigError::Read { .. }),
        ));
    }
}
