//! Sphere rasterizer.
use crate::bodies::rasterize;
use crate::grid::VoxelGrid;

/// Rasterize a sphere of radius `radius` (voxels) into an `n`-voxel grid.
pub fn make_sphere_map(n: usize, radius: f64) -> VoxelGrid {
    rasterize(n, |p| p.length() - radius)
}
