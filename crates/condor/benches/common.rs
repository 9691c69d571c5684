use std::time::Duration;

use criterion::{Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(3);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

#[allow(dead_code)]
/// Throughput of one cubic grid with `edge` voxels per axis.
pub fn voxel_throughput(edge: usize) -> Throughput {
    elements_throughput(edge.pow(3))
}

#[allow(dead_code)]
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
