//! Homogeneous spheroids described analytically.
use rand::Rng as RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::particle::base::{ParticleBase, ParticleBaseConfig, ParticleParams};
use crate::variation::{sample_positive, Variation, VariationConfig};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSpheroidConfig {
    pub base: ParticleBaseConfig,
    /// Mean flattening `c / a`.
    pub flattening: f64,
    pub flattening_variation: VariationConfig,
}

impl Default for ParticleSpheroidConfig {
    fn default() -> Self {
        Self {
            base: ParticleBaseConfig::default(),
            flattening: 0.75,
            flattening_variation: VariationConfig::none(),
        }
    }
}

impl ParticleSpheroidConfig {
    pub fn new(diameter: f64, flattening: f64) -> Self {
        Self {
            base: ParticleBaseConfig::new(diameter),
            flattening,
            flattening_variation: VariationConfig::none(),
        }
    }

    pub fn with_base(mut self, base: ParticleBaseConfig) -> Self {
        self.base = base;
        self
    }

    pub fn with_flattening_variation(mut self, variation: VariationConfig) -> Self {
        self.flattening_variation = variation;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.base.validate()?;
        if !self.flattening.is_finite() {
            return Err(Error::InvalidConfig("flattening must be finite".into()));
        }
        self.flattening_variation.validate()
    }
}

#[derive(Clone, Debug)]
pub struct ParticleSpheroid {
    base: ParticleBase,
    flattening_mean: f64,
    flattening_variation: Variation,
}

impl ParticleSpheroid {
    pub fn new(config: ParticleSpheroidConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            base: ParticleBase::new(config.base)?,
            flattening_mean: config.flattening,
            flattening_variation: Variation::new(config.flattening_variation)?,
        })
    }

    pub fn concentration(&self) -> f64 {
        self.base.concentration()
    }

    pub fn draw_next(&mut self, rng: &mut dyn RngCore) -> Result<ParticleParams> {
        let mut params = self.base.draw_next(rng)?;
        params.flattening = sample_positive(
            &mut self.flattening_variation,
            self.flattening_mean,
            "spheroid flattening",
            rng,
        )?;
        Ok(params)
    }

    pub fn config(&self) -> ParticleSpheroidConfig {
        ParticleSpheroidConfig {
            base: self.base.config(),
            flattening: self.flattening_mean,
            flattening_variation: self.flattening_variation.config().clone(),
        }
    }
}
