mod common;

use std::hint::black_box;

use condor::prelude::{
    Geometry, MapRequest, ParticleMap, ParticleMapConfig, ParticleParams, VariationConfig,
};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

const SPACING: f64 = 1e-9;
const DIAMETERS: [f64; 3] = [20e-9, 60e-9, 120e-9];

fn params(geometry: Geometry, diameter: f64) -> ParticleParams {
    let mut p = ParticleParams::with_diameter(diameter);
    p.geometry = Some(geometry);
    if geometry == Geometry::Spheroid {
        p.flattening = 0.7;
    }
    p
}

fn map_build_benches(c: &mut Criterion) {
    let request = MapRequest::new(SPACING, SPACING);

    for geometry in [
        Geometry::Sphere,
        Geometry::Cube,
        Geometry::Spheroid,
        Geometry::Icosahedron,
    ] {
        let mut group = c.benchmark_group(format!("map_cache/build/{geometry}"));

        for &diameter in &DIAMETERS {
            let p = params(geometry, diameter);
            let mut probe = ParticleMap::new(ParticleMapConfig::new(geometry, diameter)).unwrap();
            let edge = probe.get_map(&request, &p).unwrap().grid.size();
            group.throughput(common::voxel_throughput(edge));

            group.bench_with_input(
                BenchmarkId::from_parameter(format!("{:.0}nm", diameter * 1e9)),
                &diameter,
                |b, &d| {
                    b.iter_batched(
                        || ParticleMap::new(ParticleMapConfig::new(geometry, d)).unwrap(),
                        |mut map| {
                            let view = map.get_map(&request, &p).unwrap();
                            black_box(view.grid.size());
                        },
                        BatchSize::LargeInput,
                    );
                },
            );
        }

        group.finish();
    }
}

fn map_reuse_benches(c: &mut Criterion) {
    let request = MapRequest::new(SPACING, SPACING);
    let mut group = c.benchmark_group("map_cache/reuse");

    for &diameter in &DIAMETERS {
        let p = params(Geometry::Icosahedron, diameter);
        let mut map =
            ParticleMap::new(ParticleMapConfig::new(Geometry::Icosahedron, diameter)).unwrap();
        map.get_map(&request, &p).unwrap();
        group.throughput(common::elements_throughput(1));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:.0}nm", diameter * 1e9)),
            &diameter,
            |b, _| {
                b.iter(|| {
                    let view = map.get_map(&request, &p).unwrap();
                    black_box(view.spacing);
                });
            },
        );
    }

    group.finish();
}

fn map_shots_benches(c: &mut Criterion) {
    let request = MapRequest::new(SPACING, SPACING);
    let mut group = c.benchmark_group("map_cache/shots");

    for (label, variation) in [
        ("none", VariationConfig::none()),
        ("range_4", VariationConfig::range(4e-9, 4)),
        ("normal", VariationConfig::normal(2e-9)),
    ] {
        let config =
            ParticleMapConfig::new(Geometry::Sphere, 40e-9).with_diameter_variation(variation);
        let mut map = ParticleMap::new(config).unwrap();
        let mut rng = common::rng(0x5107);
        group.throughput(common::elements_throughput(1));

        group.bench_function(label, |b| {
            b.iter(|| {
                let p = map.draw_next(&mut rng).unwrap();
                let view = map.get_map(&request, &p).unwrap();
                black_box(view.grid.size());
            });
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = map_build_benches, map_reuse_benches, map_shots_benches
}
criterion_main!(benches);
