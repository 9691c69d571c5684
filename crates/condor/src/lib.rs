#![forbid(unsafe_code)]
//! condor: particle models and sample ensembles for X-ray diffraction simulation.
//!
//! Modules:
//! - grid, bodies: cubic voxel grids and rasterizers for cube, sphere, spheroid and icosahedron
//! - variation: per-shot scalar variation (uniform, normal, Poisson, range sweeps)
//! - particle: particle models, per-shot parameters, the cached voxel map of map particles
//! - sample: species with relative concentrations and the per-shot particle draw
//! - optics: voxel spacing bounds derived from the detector geometry
pub mod bodies;
pub mod error;
pub mod grid;
pub mod optics;
pub mod particle;
pub mod sample;
pub mod variation;

/// Convenient re-exports for common types. Import with `use condor::prelude::*;`.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::grid::VoxelGrid;
    pub use crate::optics::{DetectorGeometry, SamplingBounds};
    pub use crate::particle::{
        Alignment, Atom, CacheDecision, Geometry, MapCache, MapRequest, MapView, ParticleBaseConfig,
        ParticleMap, ParticleMapConfig, ParticleModel, ParticleModelConfig, ParticleMolecule,
        ParticleMoleculeConfig, ParticleParams, ParticleSphere, ParticleSphereConfig,
        ParticleSpheroid, ParticleSpheroidConfig, Representation,
    };
    pub use crate::sample::{Sample, SampleConfig, Shot, ShotParticle, Species, WeightedIndex};
    pub use crate::variation::{Variation, VariationConfig, VariationMode};
}
