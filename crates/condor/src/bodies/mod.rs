//! Body rasterizers producing cubic density grids for parametric shapes.
//!
//! Every rasterizer takes the grid edge length `n` (voxels) and shape dimensions in voxel units
//! and returns an `n * n * n` [`VoxelGrid`] with values in `[0, 1]`: `1` fully inside, `0` fully
//! outside and a linear ramp across the one-voxel boundary shell. The body is centered on the
//! grid center, i.e. voxel `i` sits at coordinate `i - (n - 1) / 2` on each axis.
//!
//! Callers pick `n` with enough headroom around the body; see [`crate::particle::map`].
use glam::DVec3;

use crate::grid::VoxelGrid;

pub mod cube;
pub mod icosahedron;
pub mod sphere;
pub mod spheroid;

pub use cube::make_cube_map;
pub use icosahedron::make_icosahedron_map;
pub use sphere::make_sphere_map;
pub use spheroid::make_spheroid_map;

/// Coordinate of voxel index `i` relative to the center of an `n`-voxel axis.
#[inline]
pub(crate) fn voxel_coord(i: usize, n: usize) -> f64 {
    i as f64 - (n as f64 - 1.0) / 2.0
}

/// Occupancy for a voxel whose center lies at signed distance `d` (voxels, negative inside)
/// from the body surface.
#[inline]
pub(crate) fn boundary_ramp(d: f64) -> f64 {
    if d < -0.5 {
        1.0
    } else if d < 0.5 {
        0.5 - d
    } else {
        0.0
    }
}

/// Rasterize a body given its signed distance function over centered voxel coordinates.
pub(crate) fn rasterize(n: usize, signed_distance: impl Fn(DVec3) -> f64) -> VoxelGrid {
    VoxelGrid::from_fn(n, |x, y, z| {
        let p = DVec3::new(voxel_coord(x, n), voxel_coord(y, n), voxel_coord(z, n));
        boundary_ramp(signed_distance(p))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voxel_coord_is_centered() {
        assert_eq!(voxel_coord(0, 3), -1.0);
        assert_eq!(voxel_coord(1, 3), 0.0);
        assert_eq!(voxel_coord(0, 4), -1.5);
        assert_eq!(voxel_coord(3, 4), 1.5);
    }

    #[test]
    fn boundary_ramp_edges() {
        assert_eq!(boundary_ramp(-3.0), 1.0);
        assert_eq!(boundary_ramp(-0.5), 1.0);
        assert_eq!(boundary_ramp(0.0), 0.5);
        assert_eq!(boundary_ramp(0.25), 0.25);
        assert_eq!(boundary_ramp(0.5), 0.0);
        assert_eq!(boundary_ramp(7.0), 0.0);
    }
}
