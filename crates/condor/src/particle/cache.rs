//! Single-slot cache for a particle's voxel map.
//!
//! The slot is either [`MapCache::Empty`] or holds the last built grid together with the
//! diameter and voxel spacing it was built for. [`MapCache::decide`] is a pure predicate that
//! tells the owner whether a request can reuse the slot:
//! - an empty slot always rebuilds from scratch, before any spacing comparison;
//! - a slot coarser than the required spacing is cleared and rebuilt from scratch;
//! - a diameter change beyond [`DIAMETER_TOLERANCE`] rebuilds while the cached spacing still
//!   satisfies the bound;
//! - anything else reuses the slot.
use std::sync::Arc;

use crate::grid::VoxelGrid;

/// Absolute diameter difference (meters) below which a cached map is reused.
pub const DIAMETER_TOLERANCE: f64 = 1e-10;

/// Outcome of checking a map request against the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheDecision {
    Reuse,
    RebuildKeepingSpacing,
    RebuildFromScratch,
}

/// A borrowed voxel map and its isotropic voxel spacing in meters.
#[derive(Clone, Copy, Debug)]
pub struct MapView<'a> {
    pub grid: &'a VoxelGrid,
    pub spacing: f64,
}

/// Cache slot of a voxel-map particle.
#[derive(Clone, Debug, Default)]
pub enum MapCache {
    #[default]
    Empty,
    Valid {
        /// Diameter (meters) the grid was built for.
        diameter: f64,
        /// Voxel spacing (meters) of the grid.
        spacing: f64,
        /// Material factor the grid values were multiplied by.
        material_scale: f64,
        grid: Arc<VoxelGrid>,
    },
}

impl MapCache {
    /// Decides how a request for `diameter` at `required_spacing` is served.
    pub fn decide(&self, diameter: f64, required_spacing: f64) -> CacheDecision {
        match self {
            MapCache::Empty => CacheDecision::RebuildFromScratch,
            MapCache::Valid {
                diameter: cached_diameter,
                spacing,
                ..
            } => {
                if *spacing > required_spacing {
                    CacheDecision::RebuildFromScratch
                } else if (cached_diameter - diameter).abs() > DIAMETER_TOLERANCE {
                    CacheDecision::RebuildKeepingSpacing
                } else {
                    CacheDecision::Reuse
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, MapCache::Empty)
    }

    pub fn diameter(&self) -> Option<f64> {
        match self {
            MapCache::Empty => None,
            MapCache::Valid { diameter, .. } => Some(*diameter),
        }
    }

    pub fn spacing(&self) -> Option<f64> {
        match self {
            MapCache::Empty => None,
            MapCache::Valid { spacing, .. } => Some(*spacing),
        }
    }

    pub fn material_scale(&self) -> Option<f64> {
        match self {
            MapCache::Empty => None,
            MapCache::Valid { material_scale, .. } => Some(*material_scale),
        }
    }

    /// Borrowed view of the cached map, if any.
    pub fn view(&self) -> Option<MapView<'_>> {
        match self {
            MapCache::Empty => None,
            MapCache::Valid { spacing, grid, .. } => Some(MapView {
                grid: grid.as_ref(),
                spacing: *spacing,
            }),
        }
    }

    /// Shared handle to the cached grid, if any.
    pub fn shared_grid(&self) -> Option<Arc<VoxelGrid>> {
        match self {
            MapCache::Empty => None,
            MapCache::Valid { grid, .. } => Some(Arc::clone(grid)),
        }
    }

    /// Replaces the slot with a freshly built grid.
    pub fn store(
        &mut self,
        diameter: f64,
        spacing: f64,
        material_scale: f64,
        grid: Arc<VoxelGrid>,
    ) {
        *self = MapCache::Valid {
            diameter,
            spacing,
            material_scale,
            grid,
        };
    }

    /// Drops the cached grid.
    pub fn clear(&mut self) {
        *self = MapCache::Empty;
    }
}
