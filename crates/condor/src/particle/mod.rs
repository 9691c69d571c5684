//! Particle models: what a sample species looks like and how it varies from shot to shot.
//!
//! [`ParticleModel`] is a closed set of variants sharing two capabilities:
//! - [`ParticleModel::draw_next`]: draw the per-shot [`ParticleParams`];
//! - [`ParticleModel::representation`]: hand the structure to propagation, as analytic
//!   parameters, a (cached) voxel map, or an atom list.
use rand::Rng as RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod base;
pub mod cache;
pub mod geometry;
pub mod map;
pub mod molecule;
pub mod sphere;
pub mod spheroid;

pub use base::{Alignment, ParticleBase, ParticleBaseConfig, ParticleParams};
pub use cache::{CacheDecision, MapCache, MapView, DIAMETER_TOLERANCE};
pub use geometry::Geometry;
pub use map::{MapRequest, ParticleMap, ParticleMapConfig};
pub use molecule::{Atom, ParticleMolecule, ParticleMoleculeConfig};
pub use sphere::{ParticleSphere, ParticleSphereConfig};
pub use spheroid::{ParticleSpheroid, ParticleSpheroidConfig};

/// Structure of one particle instance as consumed by propagation.
#[derive(Clone, Copy, Debug)]
pub enum Representation<'a> {
    Sphere { diameter: f64 },
    Spheroid { diameter: f64, flattening: f64 },
    Map(MapView<'a>),
    Atoms(&'a [Atom]),
}

/// A particle species model.
#[derive(Clone, Debug)]
pub enum ParticleModel {
    Sphere(ParticleSphere),
    Spheroid(ParticleSpheroid),
    Map(ParticleMap),
    Molecule(ParticleMolecule),
}

impl ParticleModel {
    /// Name of the model kind as used in configurations.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ParticleModel::Sphere(_) => "uniform_sphere",
            ParticleModel::Spheroid(_) => "uniform_spheroid",
            ParticleModel::Map(_) => "map3d",
            ParticleModel::Molecule(_) => "molecule",
        }
    }

    /// Relative abundance within a sample.
    pub fn concentration(&self) -> f64 {
        match self {
            ParticleModel::Sphere(m) => m.concentration(),
            ParticleModel::Spheroid(m) => m.concentration(),
            ParticleModel::Map(m) => m.concentration(),
            ParticleModel::Molecule(m) => m.concentration(),
        }
    }

    /// Draws the parameters of the next particle instance.
    pub fn draw_next(&mut self, rng: &mut dyn RngCore) -> Result<ParticleParams> {
        match self {
            ParticleModel::Sphere(m) => m.draw_next(rng),
            ParticleModel::Spheroid(m) => m.draw_next(rng),
            ParticleModel::Map(m) => m.draw_next(rng),
            ParticleModel::Molecule(m) => m.draw_next(rng),
        }
    }

    /// Structure of the instance described by `params`. Map models serve it from their cache.
    pub fn representation(
        &mut self,
        params: &ParticleParams,
        request: &MapRequest,
    ) -> Result<Representation<'_>> {
        match self {
            ParticleModel::Sphere(_) => Ok(Representation::Sphere {
                diameter: params.diameter,
            }),
            ParticleModel::Spheroid(_) => Ok(Representation::Spheroid {
                diameter: params.diameter,
                flattening: params.flattening,
            }),
            ParticleModel::Map(m) => m.get_map(request, params).map(Representation::Map),
            ParticleModel::Molecule(m) => Ok(Representation::Atoms(m.atoms())),
        }
    }

    /// The effective configuration of this model.
    pub fn config(&self) -> ParticleModelConfig {
        match self {
            ParticleModel::Sphere(m) => ParticleModelConfig::UniformSphere(m.config()),
            ParticleModel::Spheroid(m) => ParticleModelConfig::UniformSpheroid(m.config()),
            ParticleModel::Map(m) => ParticleModelConfig::Map3d(m.config()),
            ParticleModel::Molecule(m) => ParticleModelConfig::Molecule(m.config()),
        }
    }
}

impl From<ParticleSphere> for ParticleModel {
    fn from(value: ParticleSphere) -> Self {
        ParticleModel::Sphere(value)
    }
}

impl From<ParticleSpheroid> for ParticleModel {
    fn from(value: ParticleSpheroid) -> Self {
        ParticleModel::Spheroid(value)
    }
}

impl From<ParticleMap> for ParticleModel {
    fn from(value: ParticleMap) -> Self {
        ParticleModel::Map(value)
    }
}

impl From<ParticleMolecule> for ParticleModel {
    fn from(value: ParticleMolecule) -> Self {
        ParticleModel::Molecule(value)
    }
}

/// Configuration of any particle model, tagged by model kind.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "particle_model", rename_all = "snake_case"))]
#[derive(Clone, Debug, PartialEq)]
pub enum ParticleModelConfig {
    UniformSphere(ParticleSphereConfig),
    UniformSpheroid(ParticleSpheroidConfig),
    Map3d(ParticleMapConfig),
    Molecule(ParticleMoleculeConfig),
}

impl ParticleModelConfig {
    /// Builds the model described by this configuration.
    pub fn build(self) -> Result<ParticleModel> {
        Ok(match self {
            ParticleModelConfig::UniformSphere(c) => ParticleSphere::new(c)?.into(),
            ParticleModelConfig::UniformSpheroid(c) => ParticleSpheroid::new(c)?.into(),
            ParticleModelConfig::Map3d(c) => ParticleMap::new(c)?.into(),
            ParticleModelConfig::Molecule(c) => ParticleMolecule::new(c)?.into(),
        })
    }
}
