//! Spheroid rasterizer.
use glam::DQuat;

use crate::bodies::rasterize;
use crate::grid::VoxelGrid;

/// Rasterize a spheroid into an `n`-voxel grid.
///
/// `a` is the equatorial semi-axis (body x and y), `c` the polar semi-axis (body z), both in
/// voxels. `rotation` maps body coordinates into grid coordinates.
pub fn make_spheroid_map(n: usize, a: f64, c: f64, rotation: DQuat) -> VoxelGrid {
    let to_body = rotation.inverse();
    let a2 = a * a;
    let c2 = c * c;
    let inner = a.min(c);
    rasterize(n, move |p| {
        let q = to_body * p;
        let rho = ((q.x * q.x + q.y * q.y) / a2 + q.z * q.z / c2).sqrt();
        if rho == 0.0 {
            return -inner;
        }
        // Radial distance from the surface crossing along the ray through `q`.
        q.length() * (1.0 - 1.0 / rho)
    })
}
