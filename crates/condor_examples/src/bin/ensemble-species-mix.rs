use condor::prelude::*;
use condor_examples::init_tracing;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = SampleConfig::new(20.0)
        .with_number_of_images(5)
        .with_particles_variation(VariationConfig::poisson());
    let mut sample = Sample::new(config)?;

    sample.append_particle_config(
        "ribosome",
        ParticleModelConfig::UniformSphere(ParticleSphereConfig::new(25e-9).with_base(
            ParticleBaseConfig::new(25e-9)
                .with_diameter_variation(VariationConfig::normal(1e-9))
                .with_alignment(Alignment::Random)
                .with_concentration(1.0),
        )),
    )?;
    sample.append_particle_config(
        "virus",
        ParticleModelConfig::Map3d(
            ParticleMapConfig::new(Geometry::Icosahedron, 60e-9).with_concentration(3.0),
        ),
    )?;

    let detector = DetectorGeometry::centered(0.74, 75e-6, 1024, 1024);
    let request = SamplingBounds::from_detector(&detector, 0.1e-9, 1.5)?.request(1.0);
    let species = sample.species().len();
    let mut rng = StdRng::seed_from_u64(7);

    let shots: Vec<Shot> = sample.shots(&mut rng).collect::<Result<_>>()?;
    for (i, shot) in shots.iter().enumerate() {
        let counts = shot.species_counts(species);
        info!("shot {i}: {} particles, per species {counts:?}", shot.len());

        for particle in &shot.particles {
            if let Representation::Map(view) = sample.representation(particle, &request)? {
                info!(
                    "  map particle {}^3 voxels, total density {:.1}",
                    view.grid.size(),
                    view.grid.sum()
                );
                break;
            }
        }
    }

    Ok(())
}
