//! Particles described by explicit atom positions.
use glam::DVec3;
use rand::Rng as RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::particle::base::{ParticleBase, ParticleBaseConfig, ParticleParams};

/// Heaviest element accepted in an atom list.
pub const MAX_ATOMIC_NUMBER: u8 = 118;

/// One atom of a molecule.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Atom {
    pub atomic_number: u8,
    /// Position in meters, particle frame.
    pub position: [f64; 3],
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleMoleculeConfig {
    pub base: ParticleBaseConfig,
    pub atoms: Vec<Atom>,
}

impl ParticleMoleculeConfig {
    /// Creates a configuration whose nominal diameter is the extent of `atoms`.
    pub fn new(atoms: Vec<Atom>) -> Self {
        let diameter = extent(&atoms);
        Self {
            base: ParticleBaseConfig::new(if diameter > 0.0 { diameter } else { 1e-10 }),
            atoms,
        }
    }

    pub fn with_base(mut self, base: ParticleBaseConfig) -> Self {
        self.base = base;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.base.validate()?;
        if self.atoms.is_empty() {
            return Err(Error::InvalidConfig("molecule has no atoms".into()));
        }
        for atom in &self.atoms {
            if atom.atomic_number == 0 || atom.atomic_number > MAX_ATOMIC_NUMBER {
                return Err(Error::InvalidConfig(format!(
                    "invalid atomic number {}",
                    atom.atomic_number
                )));
            }
            if atom.position.iter().any(|p| !p.is_finite()) {
                return Err(Error::InvalidConfig("atom position must be finite".into()));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct ParticleMolecule {
    base: ParticleBase,
    atoms: Vec<Atom>,
}

impl ParticleMolecule {
    pub fn new(config: ParticleMoleculeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            base: ParticleBase::new(config.base)?,
            atoms: config.atoms,
        })
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn concentration(&self) -> f64 {
        self.base.concentration()
    }

    /// Largest distance (meters) between the centroid and an atom, doubled.
    pub fn extent(&self) -> f64 {
        extent(&self.atoms)
    }

    pub fn draw_next(&mut self, rng: &mut dyn RngCore) -> Result<ParticleParams> {
        self.base.draw_next(rng)
    }

    pub fn config(&self) -> ParticleMoleculeConfig {
        ParticleMoleculeConfig {
            base: self.base.config(),
            atoms: self.atoms.clone(),
        }
    }
}

fn extent(atoms: &[Atom]) -> f64 {
    if atoms.is_empty() {
        return 0.0;
    }
    let centroid = atoms
        .iter()
        .map(|a| DVec3::from_array(a.position))
        .sum::<DVec3>()
        / atoms.len() as f64;
    2.0 * atoms
        .iter()
        .map(|a| DVec3::from_array(a.position).distance(centroid))
        .fold(0.0, f64::max)
}
