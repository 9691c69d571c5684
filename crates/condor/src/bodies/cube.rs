//! Axis-aligned cube rasterizer.
use crate::bodies::{boundary_ramp, voxel_coord};
use crate::grid::VoxelGrid;

/// Rasterize an axis-aligned cube with half-edge `half_edge` (voxels) into an `n`-voxel grid.
///
/// The binding axis is the one with the largest `|coord| - half_edge`.
pub fn make_cube_map(n: usize, half_edge: f64) -> VoxelGrid {
    VoxelGrid::from_fn(n, |x, y, z| {
        let dx = voxel_coord(x, n).abs() - half_edge;
        let dy = voxel_coord(y, n).abs() - half_edge;
        let dz = voxel_coord(z, n).abs() - half_edge;
        boundary_ramp(dx.max(dy).max(dz))
    })
}
