//! Sample ensemble: particle species with relative concentrations and the per-shot
//! particle draw.
use rand::Rng as RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::particle::{
    MapRequest, ParticleModel, ParticleModelConfig, ParticleParams, Representation,
};
use crate::variation::{sample_positive_count, Variation, VariationConfig};

pub mod selection;

pub use selection::WeightedIndex;

/// Largest number of particles a single shot may hold.
pub const MAX_PARTICLES_PER_SHOT: usize = 1_000_000;

/// Configuration of a [`Sample`].
#[non_exhaustive]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SampleConfig {
    /// Number of shots produced by [`Sample::shots`].
    pub number_of_images: usize,
    /// Mean number of particles per shot.
    pub number_of_particles: f64,
    pub number_of_particles_variation: VariationConfig,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            number_of_images: 1,
            number_of_particles: 1.0,
            number_of_particles_variation: VariationConfig::none(),
        }
    }
}

impl SampleConfig {
    pub fn new(number_of_particles: f64) -> Self {
        Self {
            number_of_particles,
            ..Default::default()
        }
    }

    /// Sets the number of shots.
    pub fn with_number_of_images(mut self, number_of_images: usize) -> Self {
        self.number_of_images = number_of_images;
        self
    }

    /// Sets the variation of the per-shot particle count.
    pub fn with_particles_variation(mut self, variation: VariationConfig) -> Self {
        self.number_of_particles_variation = variation;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.number_of_particles.is_finite() || self.number_of_particles < 0.0 {
            return Err(Error::InvalidConfig(
                "number_of_particles must be finite and >= 0".into(),
            ));
        }
        self.number_of_particles_variation.validate()
    }
}

/// A named particle species of the sample.
#[derive(Clone, Debug)]
pub struct Species {
    pub name: String,
    pub model: ParticleModel,
}

/// One particle of a shot: which species it belongs to and its drawn parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShotParticle {
    /// Index into [`Sample::species`].
    pub species: usize,
    pub params: ParticleParams,
}

/// The particles illuminated in one shot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Shot {
    pub particles: Vec<ShotParticle>,
}

impl Shot {
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Number of particles per species index.
    pub fn species_counts(&self, species: usize) -> Vec<usize> {
        let mut counts = vec![0; species];
        for p in &self.particles {
            if let Some(c) = counts.get_mut(p.species) {
                *c += 1;
            }
        }
        counts
    }
}

/// An ensemble of particle species.
#[derive(Clone, Debug)]
pub struct Sample {
    number_of_images: usize,
    number_of_particles: f64,
    number_of_particles_variation: Variation,
    species: Vec<Species>,
}

impl Sample {
    pub fn new(config: SampleConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            number_of_images: config.number_of_images,
            number_of_particles: config.number_of_particles,
            number_of_particles_variation: Variation::new(config.number_of_particles_variation)?,
            species: Vec::new(),
        })
    }

    /// Adds a species. Returns its index.
    pub fn append_particle(
        &mut self,
        name: impl Into<String>,
        model: impl Into<ParticleModel>,
    ) -> usize {
        self.species.push(Species {
            name: name.into(),
            model: model.into(),
        });
        self.species.len() - 1
    }

    /// Builds a species from its configuration and adds it.
    pub fn append_particle_config(
        &mut self,
        name: impl Into<String>,
        config: ParticleModelConfig,
    ) -> Result<usize> {
        let name = name.into();
        let model = config.build().map_err(|e| e.in_species(name.clone()))?;
        Ok(self.append_particle(name, model))
    }

    pub fn remove_all_particles(&mut self) {
        self.species.clear();
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn species_mut(&mut self, index: usize) -> Option<&mut Species> {
        self.species.get_mut(index)
    }

    pub fn number_of_images(&self) -> usize {
        self.number_of_images
    }

    /// Draws the particles of the next shot.
    pub fn draw_next_shot(&mut self, rng: &mut dyn RngCore) -> Result<Shot> {
        if self.species.is_empty() {
            return Err(Error::NoSpecies);
        }

        let n = sample_positive_count(
            &mut self.number_of_particles_variation,
            self.number_of_particles,
            "number of particles",
            rng,
        )?;
        if n > MAX_PARTICLES_PER_SHOT {
            return Err(Error::InvalidConfig(format!(
                "shot of {n} particles exceeds the limit of {MAX_PARTICLES_PER_SHOT}"
            )));
        }

        let indices: Vec<usize> = if self.species.len() == 1 {
            vec![0; n]
        } else {
            let weights =
                WeightedIndex::new(self.species.iter().map(|s| s.model.concentration()))?;
            (0..n).map(|_| weights.sample(rng)).collect()
        };

        let mut particles = Vec::with_capacity(n);
        for species in indices {
            let entry = &mut self.species[species];
            let params = entry
                .model
                .draw_next(rng)
                .map_err(|e| e.in_species(entry.name.clone()))?;
            particles.push(ShotParticle { species, params });
        }
        debug!("Drew shot with {} particles.", particles.len());
        Ok(Shot { particles })
    }

    /// Structure of a shot particle. Map species serve it from their cache.
    pub fn representation(
        &mut self,
        particle: &ShotParticle,
        request: &MapRequest,
    ) -> Result<Representation<'_>> {
        let entry = self
            .species
            .get_mut(particle.species)
            .ok_or_else(|| Error::Other(format!("no species at index {}", particle.species)))?;
        let name = &entry.name;
        entry
            .model
            .representation(&particle.params, request)
            .map_err(|e| e.in_species(name.clone()))
    }

    /// Iterator over [`SampleConfig::number_of_images`] shots.
    pub fn shots<'a>(&'a mut self, rng: &'a mut dyn RngCore) -> ShotIter<'a> {
        ShotIter {
            remaining: self.number_of_images,
            sample: self,
            rng,
        }
    }

    pub fn config(&self) -> SampleConfig {
        SampleConfig {
            number_of_images: self.number_of_images,
            number_of_particles: self.number_of_particles,
            number_of_particles_variation: self.number_of_particles_variation.config().clone(),
        }
    }
}

/// Iterator returned by [`Sample::shots`].
pub struct ShotIter<'a> {
    sample: &'a mut Sample,
    rng: &'a mut dyn RngCore,
    remaining: usize,
}

impl Iterator for ShotIter<'_> {
    type Item = Result<Shot>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.sample.draw_next_shot(&mut *self.rng))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::particle::{
        Geometry, ParticleBaseConfig, ParticleMap, ParticleMapConfig, ParticleSphere,
        ParticleSphereConfig,
    };

    fn sphere(concentration: f64) -> ParticleSphere {
        ParticleSphere::new(
            ParticleSphereConfig::new(20e-9)
                .with_base(ParticleBaseConfig::new(20e-9).with_concentration(concentration)),
        )
        .unwrap()
    }

    #[test]
    fn single_species_shot_references_it_n_times() {
        let mut sample = Sample::new(SampleConfig::new(5.0)).unwrap();
        sample.append_particle("only", sphere(1.0));
        let mut rng = StdRng::seed_from_u64(7);
        let shot = sample.draw_next_shot(&mut rng).unwrap();
        assert_eq!(shot.len(), 5);
        assert!(shot.particles.iter().all(|p| p.species == 0));
    }

    #[test]
    fn species_ratio_follows_concentrations() {
        let mut sample = Sample::new(SampleConfig::new(4000.0)).unwrap();
        sample.append_particle("light", sphere(1.0));
        sample.append_particle("heavy", sphere(3.0));
        let mut rng = StdRng::seed_from_u64(0xBEEF);

        let mut counts = [0usize; 2];
        for _ in 0..5 {
            let shot = sample.draw_next_shot(&mut rng).unwrap();
            assert_eq!(shot.len(), 4000);
            let c = shot.species_counts(2);
            counts[0] += c[0];
            counts[1] += c[1];
        }
        let ratio = counts[1] as f64 / counts[0] as f64;
        assert!((ratio - 3.0).abs() < 0.25, "ratio {ratio}");
    }

    #[test]
    fn zero_particles_without_variation_is_fatal() {
        let mut sample = Sample::new(SampleConfig::new(0.0)).unwrap();
        sample.append_particle("only", sphere(1.0));
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            sample.draw_next_shot(&mut rng),
            Err(Error::NonPositive { .. })
        ));
    }

    #[test]
    fn empty_sample_has_no_species() {
        let mut sample = Sample::new(SampleConfig::new(3.0)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            sample.draw_next_shot(&mut rng),
            Err(Error::NoSpecies)
        ));
        sample.append_particle("a", sphere(1.0));
        sample.remove_all_particles();
        assert!(sample.species().is_empty());
    }

    #[test]
    fn species_errors_carry_the_species_name() {
        let mut sample = Sample::new(SampleConfig::new(1.0)).unwrap();
        let map = ParticleMap::new(ParticleMapConfig::new(Geometry::Sphere, 1e-6)).unwrap();
        sample.append_particle("virus", map);
        let mut rng = StdRng::seed_from_u64(1);
        let shot = sample.draw_next_shot(&mut rng).unwrap();
        // Map edge would exceed the size limit.
        let request = MapRequest::new(1e-10, 1e-10);
        match sample.representation(&shot.particles[0], &request) {
            Err(Error::Species { name, .. }) => assert_eq!(name, "virus"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn shots_yields_number_of_images() {
        let mut sample = Sample::new(SampleConfig::new(2.0).with_number_of_images(4)).unwrap();
        sample.append_particle("a", sphere(1.0));
        let mut rng = StdRng::seed_from_u64(9);
        let shots: Vec<Shot> = sample.shots(&mut rng).collect::<Result<_>>().unwrap();
        assert_eq!(shots.len(), 4);
        assert!(shots.iter().all(|s| s.len() == 2));
    }

    #[test]
    fn oversized_shots_are_rejected() {
        let mut sample = Sample::new(SampleConfig::new(1e12)).unwrap();
        sample.append_particle("a", sphere(1.0));
        sample.append_particle("b", sphere(1.0));
        let mut rng = StdRng::seed_from_u64(5);
        assert!(matches!(
            sample.draw_next_shot(&mut rng),
            Err(Error::InvalidConfig(_))
        ));

        let mut sample =
            Sample::new(SampleConfig::new(MAX_PARTICLES_PER_SHOT as f64 + 1.0)).unwrap();
        sample.append_particle("a", sphere(1.0));
        assert!(sample.draw_next_shot(&mut rng).is_err());
    }

    #[test]
    fn poisson_counts_stay_positive() {
        let cfg = SampleConfig::new(1.0).with_particles_variation(VariationConfig::poisson());
        let mut sample = Sample::new(cfg).unwrap();
        sample.append_particle("a", sphere(1.0));
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            assert!(sample.draw_next_shot(&mut rng).unwrap().len() >= 1);
        }
    }
}
