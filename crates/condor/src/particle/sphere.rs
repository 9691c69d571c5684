//! Homogeneous spheres described analytically.
use rand::Rng as RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::particle::base::{ParticleBase, ParticleBaseConfig, ParticleParams};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleSphereConfig {
    pub base: ParticleBaseConfig,
}

impl ParticleSphereConfig {
    pub fn new(diameter: f64) -> Self {
        Self {
            base: ParticleBaseConfig::new(diameter),
        }
    }

    pub fn with_base(mut self, base: ParticleBaseConfig) -> Self {
        self.base = base;
        self
    }
}

#[derive(Clone, Debug)]
pub struct ParticleSphere {
    base: ParticleBase,
}

impl ParticleSphere {
    pub fn new(config: ParticleSphereConfig) -> Result<Self> {
        Ok(Self {
            base: ParticleBase::new(config.base)?,
        })
    }

    pub fn concentration(&self) -> f64 {
        self.base.concentration()
    }

    pub fn draw_next(&mut self, rng: &mut dyn RngCore) -> Result<ParticleParams> {
        self.base.draw_next(rng)
    }

    pub fn config(&self) -> ParticleSphereConfig {
        ParticleSphereConfig {
            base: self.base.config(),
        }
    }
}
