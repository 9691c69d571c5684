//! State shared by every particle model: size, orientation, position and concentration.
use glam::{DQuat, DVec3};
use rand::Rng as RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::particle::Geometry;
use crate::variation::{rand01, sample_positive, Variation, VariationConfig};

/// Per-shot parameters of one particle instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleParams {
    /// Characteristic (volume-equivalent) diameter in meters.
    pub diameter: f64,
    /// Spheroid flattening `c / a`; `1.0` for shapes without flattening.
    pub flattening: f64,
    /// Geometry of voxel-map particles.
    pub geometry: Option<Geometry>,
    /// Rotation from the particle frame into the lab frame.
    pub orientation: mint::Quaternion<f64>,
    /// Position in meters.
    pub position: mint::Vector3<f64>,
}

impl ParticleParams {
    /// Parameters of an unrotated particle at the origin.
    pub fn with_diameter(diameter: f64) -> Self {
        Self {
            diameter,
            flattening: 1.0,
            geometry: None,
            orientation: DQuat::IDENTITY.into(),
            position: DVec3::ZERO.into(),
        }
    }
}

/// How particle orientations are chosen per shot.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Alignment {
    /// Particle frame equals lab frame.
    #[default]
    Identity,
    /// Uniformly distributed random rotations.
    Random,
    /// Cycle through the given unit quaternions `[x, y, z, w]`, one per draw.
    Fixed(Vec<[f64; 4]>),
}

/// Configuration of the shared particle state.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleBaseConfig {
    /// Mean diameter in meters.
    pub diameter: f64,
    pub diameter_variation: VariationConfig,
    pub alignment: Alignment,
    /// Mean position in meters.
    pub position: [f64; 3],
    /// Variation applied independently along each axis.
    pub position_variation: VariationConfig,
    /// Relative abundance within a sample.
    pub concentration: f64,
}

impl Default for ParticleBaseConfig {
    fn default() -> Self {
        Self {
            diameter: 1e-7,
            diameter_variation: VariationConfig::none(),
            alignment: Alignment::Identity,
            position: [0.0; 3],
            position_variation: VariationConfig::none(),
            concentration: 1.0,
        }
    }
}

impl ParticleBaseConfig {
    /// Creates a configuration with the given mean diameter and defaults elsewhere.
    pub fn new(diameter: f64) -> Self {
        Self {
            diameter,
            ..Default::default()
        }
    }

    pub fn with_diameter_variation(mut self, variation: VariationConfig) -> Self {
        self.diameter_variation = variation;
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_position(mut self, position: [f64; 3], variation: VariationConfig) -> Self {
        self.position = position;
        self.position_variation = variation;
        self
    }

    pub fn with_concentration(mut self, concentration: f64) -> Self {
        self.concentration = concentration;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.diameter.is_finite() || self.diameter <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "diameter must be > 0, got {}",
                self.diameter
            )));
        }
        if !self.concentration.is_finite() || self.concentration <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "concentration must be > 0, got {}",
                self.concentration
            )));
        }
        if self.position.iter().any(|p| !p.is_finite()) {
            return Err(Error::InvalidConfig("position must be finite".into()));
        }
        if let Alignment::Fixed(rotations) = &self.alignment {
            if rotations.is_empty() {
                return Err(Error::InvalidConfig(
                    "fixed alignment needs at least one rotation".into(),
                ));
            }
            if rotations
                .iter()
                .any(|q| !(DQuat::from_array(*q).length() > 0.0))
            {
                return Err(Error::InvalidConfig(
                    "fixed alignment rotations must be non-zero quaternions".into(),
                ));
            }
        }
        self.diameter_variation.validate()?;
        self.position_variation.validate()?;
        Ok(())
    }
}

/// Shared per-shot sampling state of a particle model.
#[derive(Clone, Debug)]
pub struct ParticleBase {
    diameter_mean: f64,
    diameter_variation: Variation,
    alignment: Alignment,
    alignment_step: usize,
    position_mean: [f64; 3],
    position_variation: [Variation; 3],
    concentration: f64,
}

impl ParticleBase {
    pub fn new(config: ParticleBaseConfig) -> Result<Self> {
        config.validate()?;
        let position_variation = Variation::new(config.position_variation)?;
        Ok(Self {
            diameter_mean: config.diameter,
            diameter_variation: Variation::new(config.diameter_variation)?,
            alignment: config.alignment,
            alignment_step: 0,
            position_mean: config.position,
            position_variation: [
                position_variation.clone(),
                position_variation.clone(),
                position_variation,
            ],
            concentration: config.concentration,
        })
    }

    pub fn diameter_mean(&self) -> f64 {
        self.diameter_mean
    }

    pub fn concentration(&self) -> f64 {
        self.concentration
    }

    /// Draws diameter, orientation and position for the next shot.
    pub fn draw_next(&mut self, rng: &mut dyn RngCore) -> Result<ParticleParams> {
        let diameter = sample_positive(
            &mut self.diameter_variation,
            self.diameter_mean,
            "particle diameter",
            rng,
        )?;
        let orientation = self.next_orientation(rng);
        let mut position = [0.0; 3];
        for (axis, p) in position.iter_mut().enumerate() {
            *p = self.position_variation[axis].sample(self.position_mean[axis], rng);
        }

        Ok(ParticleParams {
            diameter,
            flattening: 1.0,
            geometry: None,
            orientation: orientation.into(),
            position: DVec3::from_array(position).into(),
        })
    }

    fn next_orientation(&mut self, rng: &mut dyn RngCore) -> DQuat {
        match &self.alignment {
            Alignment::Identity => DQuat::IDENTITY,
            Alignment::Random => random_rotation(rng),
            Alignment::Fixed(rotations) => {
                let q = rotations[self.alignment_step % rotations.len()];
                self.alignment_step = self.alignment_step.wrapping_add(1);
                DQuat::from_array(q).normalize()
            }
        }
    }

    /// The configuration this state was built from.
    pub fn config(&self) -> ParticleBaseConfig {
        ParticleBaseConfig {
            diameter: self.diameter_mean,
            diameter_variation: self.diameter_variation.config().clone(),
            alignment: self.alignment.clone(),
            position: self.position_mean,
            position_variation: self.position_variation[0].config().clone(),
            concentration: self.concentration,
        }
    }
}

/// Uniformly distributed rotation (Shoemake's method).
fn random_rotation(rng: &mut dyn RngCore) -> DQuat {
    let u1 = rand01(rng);
    let u2 = 2.0 * std::f64::consts::PI * rand01(rng);
    let u3 = 2.0 * std::f64::consts::PI * rand01(rng);
    let a = (1.0 - u1).sqrt();
    let b = u1.sqrt();
    DQuat::from_xyzw(a * u2.sin(), a * u2.cos(), b * u3.sin(), b * u3.cos())
}
