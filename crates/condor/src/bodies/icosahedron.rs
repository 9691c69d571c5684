//! Regular icosahedron rasterizer.
use glam::{DQuat, DVec3};

use crate::bodies::rasterize;
use crate::grid::VoxelGrid;

/// Golden ratio.
const PHI: f64 = 1.618_033_988_749_895;

/// Ratio of inradius to circumradius of a regular icosahedron.
pub fn inradius_ratio() -> f64 {
    let sqrt5 = 5f64.sqrt();
    let inradius_per_edge = 3f64.sqrt() * (3.0 + sqrt5) / 12.0;
    let circumradius_per_edge = (10.0 + 2.0 * sqrt5).sqrt() / 4.0;
    inradius_per_edge / circumradius_per_edge
}

/// Unit normals of the 20 faces of the icosahedron with vertices at the cyclic permutations of
/// `(0, ±1, ±φ)`.
pub fn face_normals() -> Vec<DVec3> {
    let mut normals = Vec::with_capacity(20);
    for sx in [-1.0, 1.0] {
        for sy in [-1.0, 1.0] {
            for sz in [-1.0, 1.0] {
                normals.push(DVec3::new(sx, sy, sz).normalize());
            }
        }
    }
    let inv_phi = 1.0 / PHI;
    for s1 in [-1.0, 1.0] {
        for s2 in [-1.0, 1.0] {
            normals.push(DVec3::new(0.0, s1 * PHI, s2 * inv_phi).normalize());
            normals.push(DVec3::new(s1 * PHI, s2 * inv_phi, 0.0).normalize());
            normals.push(DVec3::new(s2 * inv_phi, 0.0, s1 * PHI).normalize());
        }
    }
    normals
}

/// Rasterize a regular icosahedron with circumradius `circumradius` (voxels) into an `n`-voxel
/// grid. `rotation` maps body coordinates into grid coordinates.
pub fn make_icosahedron_map(n: usize, circumradius: f64, rotation: DQuat) -> VoxelGrid {
    let inradius = circumradius * inradius_ratio();
    let normals: Vec<DVec3> = face_normals().into_iter().map(|f| rotation * f).collect();
    rasterize(n, move |p| {
        normals
            .iter()
            .map(|f| f.dot(p))
            .fold(f64::NEG_INFINITY, f64::max)
            - inradius
    })
}
