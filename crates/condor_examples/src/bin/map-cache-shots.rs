use condor::prelude::*;
use condor_examples::init_tracing;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let detector = DetectorGeometry::centered(0.74, 75e-6, 1024, 1024);
    let bounds = SamplingBounds::from_detector(&detector, 0.1e-9, 2.0)?;
    info!(
        "Required spacing {:.3e} m, suggested {:.3e} m.",
        bounds.required_spacing, bounds.suggested_spacing
    );

    // Three diameters swept shot by shot, so every shot changes the map.
    let config = ParticleMapConfig::new(Geometry::Spheroid, 40e-9)
        .with_diameter_variation(VariationConfig::range(6e-9, 3))
        .with_flattening(0.7, VariationConfig::none());
    let mut map = ParticleMap::new(config)?;
    let request = bounds.request(1.0);
    let mut rng = StdRng::seed_from_u64(42);

    for shot in 0..6 {
        let params = map.draw_next(&mut rng)?;
        let decision = map.cache().decide(params.diameter, request.required_spacing);
        let view = map.get_map(&request, &params)?;
        info!(
            "shot {shot}: diameter {:.1} nm -> {decision:?}, {}^3 voxels at {:.3e} m",
            params.diameter * 1e9,
            view.grid.size(),
            view.spacing
        );
    }

    // A finer detector invalidates the cached grid regardless of diameter.
    let finer = MapRequest::new(request.required_spacing / 2.0, request.suggested_spacing / 2.0);
    let params = map.draw_next(&mut rng)?;
    let decision = map.cache().decide(params.diameter, finer.required_spacing);
    let view = map.get_map(&finer, &params)?;
    info!(
        "finer detector: {decision:?}, {}^3 voxels at {:.3e} m",
        view.grid.size(),
        view.spacing
    );

    Ok(())
}
