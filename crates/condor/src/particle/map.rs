//! Particles represented by a voxel map.
//!
//! A [`ParticleMap`] rasterizes its geometry on demand and keeps the last map in a
//! [`MapCache`]. Shots reuse the cached map as long as the drawn diameter and the spacing
//! bound allow it, which is the common case.
//!
//! Grid edge lengths leave headroom around the body:
//! - sphere and spheroid: `round(2 * 1.2 * R)` voxels for bounding radius `R`;
//! - icosahedron: `ceil(2.3 * R)` voxels for circumradius `R`;
//! - cube: `ceil(2.3 * L)` voxels for edge length `L`.
//!
//! Rasterized maps are cached together with the material scale they were multiplied by; a
//! request with another scale rebuilds the map.
use std::sync::Arc;

use glam::DQuat;
use rand::Rng as RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::bodies::{make_cube_map, make_icosahedron_map, make_sphere_map, make_spheroid_map};
use crate::error::{Error, Result};
use crate::grid::VoxelGrid;
use crate::particle::base::{ParticleBase, ParticleBaseConfig, ParticleParams};
use crate::particle::cache::{CacheDecision, MapCache, MapView};
use crate::particle::geometry::{icosahedron_circumradius, spheroid_semi_axes, Geometry};
use crate::variation::{sample_positive, Variation, VariationConfig};

/// Largest grid edge (voxels) a rebuild may allocate.
pub const MAX_MAP_EDGE: usize = 1024;

/// Spacing bounds and material scale for one map request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapRequest {
    /// Coarsest voxel spacing (meters) acceptable for this shot.
    pub required_spacing: f64,
    /// Spacing (meters) used when the map has to be rebuilt.
    pub suggested_spacing: f64,
    /// Refractive-index/material factor applied to rasterized maps.
    pub material_scale: f64,
}

impl MapRequest {
    pub fn new(required_spacing: f64, suggested_spacing: f64) -> Self {
        Self {
            required_spacing,
            suggested_spacing,
            material_scale: 1.0,
        }
    }

    /// Sets the material scale factor.
    pub fn with_material_scale(mut self, material_scale: f64) -> Self {
        self.material_scale = material_scale;
        self
    }

    /// Validates the request, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.required_spacing.is_finite() || self.required_spacing <= 0.0 {
            return Err(Error::InvalidConfig(
                "required_spacing must be finite and > 0".into(),
            ));
        }
        if !self.suggested_spacing.is_finite() || self.suggested_spacing <= 0.0 {
            return Err(Error::InvalidConfig(
                "suggested_spacing must be finite and > 0".into(),
            ));
        }
        if self.suggested_spacing > self.required_spacing {
            return Err(Error::InvalidConfig(format!(
                "suggested_spacing {} is coarser than required_spacing {}",
                self.suggested_spacing, self.required_spacing
            )));
        }
        if !self.material_scale.is_finite() {
            return Err(Error::InvalidConfig("material_scale must be finite".into()));
        }
        Ok(())
    }
}

/// Configuration of a [`ParticleMap`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleMapConfig {
    pub geometry: Geometry,
    pub base: ParticleBaseConfig,
    /// Mean spheroid flattening; ignored by other geometries.
    pub flattening: f64,
    pub flattening_variation: VariationConfig,
    /// Voxel map used verbatim by custom geometries.
    pub custom_map: Option<VoxelGrid>,
    /// Voxel spacing (meters) of `custom_map`.
    pub custom_spacing: Option<f64>,
}

impl ParticleMapConfig {
    /// Creates a configuration for `geometry` with mean `diameter` (meters).
    pub fn new(geometry: Geometry, diameter: f64) -> Self {
        Self {
            geometry,
            base: ParticleBaseConfig::new(diameter),
            flattening: 1.0,
            flattening_variation: VariationConfig::none(),
            custom_map: None,
            custom_spacing: None,
        }
    }

    /// Replaces the shared particle configuration, keeping the geometry.
    pub fn with_base(mut self, base: ParticleBaseConfig) -> Self {
        self.base = base;
        self
    }

    /// Sets the diameter variation.
    pub fn with_diameter_variation(mut self, variation: VariationConfig) -> Self {
        self.base.diameter_variation = variation;
        self
    }

    /// Sets the relative concentration.
    pub fn with_concentration(mut self, concentration: f64) -> Self {
        self.base.concentration = concentration;
        self
    }

    /// Sets mean flattening and its variation.
    pub fn with_flattening(mut self, flattening: f64, variation: VariationConfig) -> Self {
        self.flattening = flattening;
        self.flattening_variation = variation;
        self
    }

    /// Sets the custom voxel map and its spacing.
    pub fn with_custom_map(mut self, map: VoxelGrid, spacing: f64) -> Self {
        self.custom_map = Some(map);
        self.custom_spacing = Some(spacing);
        self
    }

    /// Sets the custom voxel map from raw data of shape `dims`; non-cubic shapes are rejected.
    pub fn with_custom_data(self, dims: [usize; 3], data: Vec<f64>, spacing: f64) -> Result<Self> {
        let map = VoxelGrid::from_shape(dims, data)?;
        Ok(self.with_custom_map(map, spacing))
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.base.validate()?;
        if !self.flattening.is_finite() {
            return Err(Error::InvalidConfig("flattening must be finite".into()));
        }
        self.flattening_variation.validate()?;
        if self.geometry == Geometry::Custom {
            let map = self.custom_map.as_ref().ok_or(Error::MissingCustomMap)?;
            let spacing = self.custom_spacing.ok_or(Error::MissingCustomMap)?;
            if !spacing.is_finite() || spacing <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "custom map spacing must be > 0, got {spacing}"
                )));
            }
            check_custom_map(map)?;
        }
        Ok(())
    }
}

fn check_custom_map(map: &VoxelGrid) -> Result<()> {
    if map.size() == 0 {
        return Err(Error::InvalidConfig("custom map is empty".into()));
    }
    if !map.is_consistent() {
        return Err(Error::GridSizeMismatch {
            expected: map.size().saturating_pow(3),
            actual: map.data().len(),
        });
    }
    Ok(())
}

/// Map supplied by the caller for a custom geometry, with the spacing it was given at.
#[derive(Clone, Debug)]
struct CustomMap {
    grid: Arc<VoxelGrid>,
    spacing: f64,
}

/// A particle species whose structure is a voxel map.
#[derive(Clone, Debug)]
pub struct ParticleMap {
    geometry: Geometry,
    base: ParticleBase,
    flattening_mean: f64,
    flattening_variation: Variation,
    custom: Option<CustomMap>,
    cache: MapCache,
}

impl ParticleMap {
    pub fn new(config: ParticleMapConfig) -> Result<Self> {
        config.validate()?;

        if config.geometry != Geometry::Spheroid
            && (config.flattening != 1.0 || config.flattening_variation != VariationConfig::none())
        {
            warn!(
                "Flattening is set although geometry is '{}'; it has no effect.",
                config.geometry
            );
        }

        let mut model = Self {
            geometry: config.geometry,
            base: ParticleBase::new(config.base)?,
            flattening_mean: config.flattening,
            flattening_variation: Variation::new(config.flattening_variation)?,
            custom: None,
            cache: MapCache::Empty,
        };

        match (config.custom_map, config.custom_spacing) {
            (Some(map), Some(spacing)) if model.geometry == Geometry::Custom => {
                model.set_custom_map(map, spacing)?;
            }
            (Some(_), _) => {
                warn!(
                    "Custom map is set although geometry is '{}'; it is ignored.",
                    model.geometry
                );
            }
            _ => {}
        }

        Ok(model)
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn concentration(&self) -> f64 {
        self.base.concentration()
    }

    pub fn cache(&self) -> &MapCache {
        &self.cache
    }

    /// Installs an externally supplied map with voxel spacing `spacing` (meters).
    ///
    /// The cache is primed with the map at its nominal diameter `spacing * edge`. Only
    /// custom geometries accept a map.
    pub fn set_custom_map(&mut self, map: VoxelGrid, spacing: f64) -> Result<()> {
        if self.geometry != Geometry::Custom {
            return Err(Error::InvalidConfig(format!(
                "geometry '{}' does not take a custom map",
                self.geometry
            )));
        }
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "custom map spacing must be > 0, got {spacing}"
            )));
        }
        check_custom_map(&map)?;
        let diameter = spacing * map.size() as f64;
        let grid = Arc::new(map);
        self.cache.store(diameter, spacing, 1.0, Arc::clone(&grid));
        self.custom = Some(CustomMap { grid, spacing });
        Ok(())
    }

    /// Draws the next shot's parameters, including geometry and flattening.
    pub fn draw_next(&mut self, rng: &mut dyn RngCore) -> Result<ParticleParams> {
        let mut params = self.base.draw_next(rng)?;
        params.geometry = Some(self.geometry);
        params.flattening = if self.geometry == Geometry::Spheroid {
            sample_positive(
                &mut self.flattening_variation,
                self.flattening_mean,
                "spheroid flattening",
                rng,
            )?
        } else {
            self.flattening_mean
        };
        Ok(params)
    }

    /// Returns a map for `params` that is at least as fine as `request.required_spacing`,
    /// rebuilding the cached one only when needed.
    pub fn get_map(
        &mut self,
        request: &MapRequest,
        params: &ParticleParams,
    ) -> Result<MapView<'_>> {
        request.validate()?;
        if let Some(geometry) = params.geometry {
            if geometry != self.geometry {
                return Err(Error::InvalidConfig(format!(
                    "per-shot geometry '{}' does not match particle geometry '{}'",
                    geometry, self.geometry
                )));
            }
        }
        if !params.diameter.is_finite() || params.diameter <= 0.0 {
            return Err(Error::NonPositive {
                quantity: "particle diameter".into(),
                value: params.diameter,
            });
        }

        let mut decision = self.cache.decide(params.diameter, request.required_spacing);
        if decision == CacheDecision::Reuse
            && self.geometry != Geometry::Custom
            && self.cache.material_scale() != Some(request.material_scale)
        {
            debug!(
                "Material scale changed to {}; rebuilding {} map.",
                request.material_scale, self.geometry
            );
            decision = CacheDecision::RebuildKeepingSpacing;
        }

        match decision {
            CacheDecision::Reuse => {
                debug!("Reusing cached {} map.", self.geometry);
            }
            CacheDecision::RebuildKeepingSpacing => {
                self.rebuild(request, params)?;
            }
            CacheDecision::RebuildFromScratch => {
                self.cache.clear();
                self.rebuild(request, params)?;
            }
        }

        self.cache
            .view()
            .ok_or_else(|| Error::Other("map cache empty after rebuild".to_string()))
    }

    /// The currently cached map, if any.
    pub fn current_map(&self) -> Option<MapView<'_>> {
        self.cache.view()
    }

    fn rebuild(&mut self, request: &MapRequest, params: &ParticleParams) -> Result<()> {
        if self.geometry == Geometry::Custom {
            let map = self
                .custom
                .as_ref()
                .map(|custom| Arc::clone(&custom.grid))
                .ok_or(Error::MissingCustomMap)?;
            // The supplied voxel count fixes the spacing for this diameter.
            let spacing = params.diameter / map.size() as f64;
            if spacing > request.required_spacing {
                warn!(
                    "Custom map spacing {:e} m is coarser than the required {:e} m.",
                    spacing, request.required_spacing
                );
            }
            self.cache.store(params.diameter, spacing, 1.0, map);
            return Ok(());
        }

        let spacing = request.suggested_spacing;
        let mut grid = rasterize_geometry(self.geometry, params, spacing)?;
        grid.scale(request.material_scale);
        info!(
            "Built {} map for diameter {:e} m: {}^3 voxels at {:e} m.",
            self.geometry,
            params.diameter,
            grid.size(),
            spacing
        );
        self.cache.store(
            params.diameter,
            spacing,
            request.material_scale,
            Arc::new(grid),
        );
        Ok(())
    }

    /// The effective configuration. Only custom geometries carry their map; rasterized
    /// maps are rebuilt by the new model on demand.
    pub fn config(&self) -> ParticleMapConfig {
        let (custom_map, custom_spacing) = match &self.custom {
            Some(custom) => (Some(custom.grid.as_ref().clone()), Some(custom.spacing)),
            None => (None, None),
        };
        ParticleMapConfig {
            geometry: self.geometry,
            base: self.base.config(),
            flattening: self.flattening_mean,
            flattening_variation: self.flattening_variation.config().clone(),
            custom_map,
            custom_spacing,
        }
    }
}

/// Rasterizes a parametric geometry at `spacing` (meters) in the particle frame.
fn rasterize_geometry(
    geometry: Geometry,
    params: &ParticleParams,
    spacing: f64,
) -> Result<VoxelGrid> {
    let diameter = params.diameter;
    match geometry {
        Geometry::Sphere => {
            let radius = diameter / 2.0 / spacing;
            let n = edge_with_headroom(radius, |r| (2.0 * 1.2 * r).round())?;
            Ok(make_sphere_map(n, radius))
        }
        Geometry::Spheroid => {
            if !(params.flattening > 0.0) {
                return Err(Error::NonPositive {
                    quantity: "spheroid flattening".into(),
                    value: params.flattening,
                });
            }
            let (a, c) = spheroid_semi_axes(diameter, params.flattening);
            let (na, nc) = (a / spacing, c / spacing);
            let n = edge_with_headroom(na.max(nc), |r| (2.0 * 1.2 * r).round())?;
            Ok(make_spheroid_map(n, na, nc, DQuat::IDENTITY))
        }
        Geometry::Cube => {
            let edge = diameter / spacing;
            let n = edge_with_headroom(edge, |e| (2.3 * e).ceil())?;
            Ok(make_cube_map(n, edge / 2.0))
        }
        Geometry::Icosahedron => {
            let circumradius = icosahedron_circumradius(diameter) / spacing;
            let n = edge_with_headroom(circumradius, |r| (2.3 * r).ceil())?;
            Ok(make_icosahedron_map(n, circumradius, DQuat::IDENTITY))
        }
        Geometry::Custom => Err(Error::MissingCustomMap),
    }
}

fn edge_with_headroom(extent: f64, edge: impl Fn(f64) -> f64) -> Result<usize> {
    let n = edge(extent);
    if !n.is_finite() || n > MAX_MAP_EDGE as f64 {
        return Err(Error::InvalidConfig(format!(
            "map edge of {n} voxels exceeds the limit of {MAX_MAP_EDGE}"
        )));
    }
    Ok((n as usize).max(1))
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn sphere_model(diameter: f64) -> ParticleMap {
        ParticleMap::new(ParticleMapConfig::new(Geometry::Sphere, diameter)).unwrap()
    }

    fn params(model: &ParticleMap, diameter: f64) -> ParticleParams {
        let mut p = ParticleParams::with_diameter(diameter);
        p.geometry = Some(model.geometry());
        p
    }

    #[test]
    fn identical_requests_return_the_same_map() {
        let mut model = sphere_model(40e-9);
        let request = MapRequest::new(2e-9, 2e-9);
        let p = params(&model, 40e-9);

        let first = model.get_map(&request, &p).unwrap();
        let (first_ptr, first_spacing) = (first.grid as *const VoxelGrid, first.spacing);
        let second = model.get_map(&request, &p).unwrap();
        assert!(std::ptr::eq(first_ptr, second.grid));
        assert_eq!(first_spacing, second.spacing);
        assert_eq!(second.spacing, 2e-9);
    }

    #[test]
    fn diameter_change_rebuilds() {
        let mut model = sphere_model(40e-9);
        let request = MapRequest::new(2e-9, 2e-9);
        let small = model.get_map(&request, &params(&model, 40e-9)).unwrap();
        let small_size = small.grid.size();

        // Within tolerance: reused.
        model
            .get_map(&request, &params(&model, 40e-9 + 5e-11))
            .unwrap();
        assert_eq!(model.cache().diameter(), Some(40e-9));

        let big = model.get_map(&request, &params(&model, 60e-9)).unwrap();
        assert!(big.grid.size() > small_size);
        assert_eq!(model.cache().diameter(), Some(60e-9));
    }

    #[test]
    fn finer_requirement_rebuilds_at_suggested_spacing() {
        let mut model = sphere_model(40e-9);
        let p = params(&model, 40e-9);
        model.get_map(&MapRequest::new(4e-9, 4e-9), &p).unwrap();
        assert_eq!(model.cache().spacing(), Some(4e-9));

        // Coarser bound keeps the finer map.
        let view = model.get_map(&MapRequest::new(8e-9, 8e-9), &p).unwrap();
        assert_eq!(view.spacing, 4e-9);

        let view = model.get_map(&MapRequest::new(2e-9, 1e-9), &p).unwrap();
        assert_eq!(view.spacing, 1e-9);
        assert!(view.spacing <= 2e-9);
    }

    #[test]
    fn grid_edges_follow_headroom_rules() {
        let spacing = 1e-9;
        let request = MapRequest::new(spacing, spacing);

        let mut sphere = sphere_model(20e-9);
        let p = params(&sphere, 20e-9);
        // radius 10 voxels -> round(24)
        assert_eq!(sphere.get_map(&request, &p).unwrap().grid.size(), 24);

        let mut cube = ParticleMap::new(ParticleMapConfig::new(Geometry::Cube, 19.6e-9)).unwrap();
        let p = params(&cube, 19.6e-9);
        // edge 19.6 voxels -> ceil(45.08)
        let view = cube.get_map(&request, &p).unwrap();
        assert_eq!(view.grid.size(), 46);
        // Faces stay clear of the grid border.
        let mid = view.grid.size() / 2;
        assert_eq!(view.grid.get(0, mid, mid), 0.0);
        assert_eq!(view.grid.get(mid, mid, mid), 1.0);
        assert!(view.grid.size() as f64 >= 2.0 * 19.6);

        let mut ico =
            ParticleMap::new(ParticleMapConfig::new(Geometry::Icosahedron, 20e-9)).unwrap();
        let p = params(&ico, 20e-9);
        let expected = (2.3 * icosahedron_circumradius(20e-9) / spacing).ceil() as usize;
        assert_eq!(ico.get_map(&request, &p).unwrap().grid.size(), expected);
    }

    #[test]
    fn spheroid_uses_flattening() {
        let cfg = ParticleMapConfig::new(Geometry::Spheroid, 20e-9)
            .with_flattening(0.5, VariationConfig::none());
        let mut model = ParticleMap::new(cfg).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let p = model.draw_next(&mut rng).unwrap();
        assert_eq!(p.flattening, 0.5);
        assert_eq!(p.geometry, Some(Geometry::Spheroid));

        let view = model.get_map(&MapRequest::new(1e-9, 1e-9), &p).unwrap();
        let (a, c) = spheroid_semi_axes(20e-9, 0.5);
        let expected = (2.0 * 1.2 * (a.max(c) / 1e-9)).round() as usize;
        assert_eq!(view.grid.size(), expected);
        let center = expected / 2;
        assert!(view.grid.get(center, center, center) > 0.9);
    }

    #[test]
    fn material_scale_multiplies_map() {
        let mut model = sphere_model(10e-9);
        let p = params(&model, 10e-9);
        let request = MapRequest::new(1e-9, 1e-9).with_material_scale(0.25);
        let view = model.get_map(&request, &p).unwrap();
        let max = view.grid.data().iter().cloned().fold(0.0, f64::max);
        assert_eq!(max, 0.25);
    }

    #[test]
    fn non_positive_flattening_under_fixed_variation_is_fatal() {
        let cfg = ParticleMapConfig::new(Geometry::Spheroid, 20e-9)
            .with_flattening(-1.0, VariationConfig::none());
        let mut model = ParticleMap::new(cfg).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let err = model.draw_next(&mut rng).unwrap_err();
        assert!(matches!(err, Error::NonPositive { .. }));
    }

    #[test]
    fn random_flattening_is_always_positive() {
        let cfg = ParticleMapConfig::new(Geometry::Spheroid, 20e-9)
            .with_flattening(0.2, VariationConfig::normal(0.3));
        let mut model = ParticleMap::new(cfg).unwrap();
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..200 {
            assert!(model.draw_next(&mut rng).unwrap().flattening > 0.0);
        }
    }

    #[test]
    fn custom_map_rejects_non_cubic_data() {
        let err = ParticleMapConfig::new(Geometry::Custom, 10e-9)
            .with_custom_data([10, 10, 12], vec![1.0; 1200], 1e-9)
            .unwrap_err();
        assert!(matches!(err, Error::NonCubicMap { .. }));
    }

    #[test]
    fn custom_geometry_requires_map_and_spacing() {
        let err = ParticleMap::new(ParticleMapConfig::new(Geometry::Custom, 10e-9)).unwrap_err();
        assert!(matches!(err, Error::MissingCustomMap));

        let mut cfg = ParticleMapConfig::new(Geometry::Custom, 10e-9);
        cfg.custom_map = Some(VoxelGrid::new(4));
        let err = ParticleMap::new(cfg).unwrap_err();
        assert!(matches!(err, Error::MissingCustomMap));
    }

    #[test]
    fn custom_map_is_reused_verbatim_with_derived_spacing() {
        let grid = VoxelGrid::from_fn(10, |x, _, _| x as f64);
        let cfg =
            ParticleMapConfig::new(Geometry::Custom, 10e-9).with_custom_map(grid.clone(), 1e-9);
        let mut model = ParticleMap::new(cfg).unwrap();
        assert_eq!(model.cache().spacing(), Some(1e-9));

        let p = params(&model, 20e-9);
        let request = MapRequest::new(5e-9, 5e-9).with_material_scale(3.0);
        let view = model.get_map(&request, &p).unwrap();
        assert_eq!(view.grid, &grid);
        assert!((view.spacing - 2e-9).abs() < 1e-24);
    }

    #[test]
    fn mismatched_geometry_is_rejected() {
        let mut model = sphere_model(10e-9);
        let mut p = ParticleParams::with_diameter(10e-9);
        p.geometry = Some(Geometry::Cube);
        assert!(model.get_map(&MapRequest::new(1e-9, 1e-9), &p).is_err());
    }

    #[test]
    fn oversized_maps_are_rejected() {
        let mut model = sphere_model(1e-6);
        let p = params(&model, 1e-6);
        let err = model
            .get_map(&MapRequest::new(1e-10, 1e-10), &p)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(model.cache().is_empty());
    }

    #[test]
    fn request_validation() {
        assert!(MapRequest::new(1e-9, 2e-9).validate().is_err());
        assert!(MapRequest::new(0.0, 0.0).validate().is_err());
        assert!(MapRequest::new(2e-9, 1e-9).validate().is_ok());
    }

    #[test]
    fn rebuilt_sphere_model_does_not_serve_the_old_map() {
        let mut model = sphere_model(10e-9);
        let request = MapRequest::new(1e-9, 1e-9);
        let p = params(&model, 10e-9);
        assert_eq!(model.get_map(&request, &p).unwrap().grid.size(), 12);

        let cfg = model.config();
        assert_eq!(cfg.geometry, Geometry::Sphere);
        assert!(cfg.custom_map.is_none());
        assert!(cfg.custom_spacing.is_none());

        let mut copy = ParticleMap::new(cfg).unwrap();
        assert!(copy.cache().is_empty());
        let p = params(&copy, 12e-9);
        // radius 6 voxels -> round(14.4)
        assert_eq!(copy.get_map(&request, &p).unwrap().grid.size(), 14);
        assert_eq!(copy.cache().diameter(), Some(12e-9));
    }

    #[test]
    fn custom_map_on_parametric_geometry_is_ignored() {
        let cfg = ParticleMapConfig::new(Geometry::Sphere, 10e-9)
            .with_custom_map(VoxelGrid::new(12), 1e-9);
        let mut model = ParticleMap::new(cfg).unwrap();
        assert!(model.cache().is_empty());
        assert!(model.config().custom_map.is_none());

        let err = model.set_custom_map(VoxelGrid::new(4), 1e-9).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn custom_config_keeps_the_supplied_map_and_spacing() {
        let grid = VoxelGrid::from_fn(8, |_, y, _| y as f64);
        let cfg =
            ParticleMapConfig::new(Geometry::Custom, 8e-9).with_custom_map(grid.clone(), 1e-9);
        let mut model = ParticleMap::new(cfg).unwrap();
        let p = params(&model, 16e-9);
        model.get_map(&MapRequest::new(4e-9, 4e-9), &p).unwrap();

        let cfg = model.config();
        assert_eq!(cfg.custom_map.as_ref(), Some(&grid));
        assert_eq!(cfg.custom_spacing, Some(1e-9));
        let copy = ParticleMap::new(cfg).unwrap();
        assert_eq!(copy.cache().spacing(), Some(1e-9));
    }

    #[test]
    fn material_scale_change_rebuilds() {
        let mut model = sphere_model(10e-9);
        let p = params(&model, 10e-9);
        let max = |grid: &VoxelGrid| grid.data().iter().cloned().fold(0.0, f64::max);

        let request = MapRequest::new(1e-9, 1e-9).with_material_scale(2.0);
        assert_eq!(max(model.get_map(&request, &p).unwrap().grid), 2.0);
        assert_eq!(model.cache().material_scale(), Some(2.0));

        let request = request.with_material_scale(0.5);
        assert_eq!(max(model.get_map(&request, &p).unwrap().grid), 0.5);
        assert_eq!(model.cache().material_scale(), Some(0.5));
    }
}
