//! Real-space sampling bounds derived from the detector geometry.
//!
//! The finest feature a detector resolves fixes the coarsest voxel spacing a particle map
//! may have ([`SamplingBounds::required_spacing`]); the oversampling factor picks the
//! spacing rebuilt maps are rasterized at ([`SamplingBounds::suggested_spacing`]).
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::particle::MapRequest;

/// Pixel-array detector placed perpendicular to the beam.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectorGeometry {
    /// Sample to detector distance in meters.
    pub distance: f64,
    /// Pixel edge length in meters.
    pub pixel_size: f64,
    pub nx: usize,
    pub ny: usize,
    /// Beam center in pixel coordinates; pixel centers sit at integer coordinates.
    pub cx: f64,
    pub cy: f64,
}

impl DetectorGeometry {
    /// Detector with the beam hitting its center.
    pub fn centered(distance: f64, pixel_size: f64, nx: usize, ny: usize) -> Self {
        Self {
            distance,
            pixel_size,
            nx,
            ny,
            cx: (nx as f64 - 1.0) / 2.0,
            cy: (ny as f64 - 1.0) / 2.0,
        }
    }

    /// Moves the beam center.
    pub fn with_center(mut self, cx: f64, cy: f64) -> Self {
        self.cx = cx;
        self.cy = cy;
        self
    }

    /// Validates the geometry, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !(self.distance.is_finite() && self.distance > 0.0) {
            return Err(Error::InvalidConfig("detector distance must be > 0".into()));
        }
        if !(self.pixel_size.is_finite() && self.pixel_size > 0.0) {
            return Err(Error::InvalidConfig("pixel_size must be > 0".into()));
        }
        if self.nx == 0 || self.ny == 0 {
            return Err(Error::InvalidConfig("detector must have pixels".into()));
        }
        if self.min_center_edge_distance() <= 0.0 {
            return Err(Error::InvalidConfig(
                "beam center must lie on the detector".into(),
            ));
        }
        Ok(())
    }

    /// Shortest distance in meters from the beam center to a detector edge.
    pub fn min_center_edge_distance(&self) -> f64 {
        let x = (self.cx + 0.5).min(self.nx as f64 - 0.5 - self.cx);
        let y = (self.cy + 0.5).min(self.ny as f64 - 0.5 - self.cy);
        x.min(y) * self.pixel_size
    }
}

/// Voxel spacing limits for the particle maps of one run.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplingBounds {
    pub wavelength: f64,
    pub distance: f64,
    pub pixel_size: f64,
    /// Full-period resolution at the detector edge in meters.
    pub edge_resolution: f64,
    pub required_spacing: f64,
    pub suggested_spacing: f64,
}

impl SamplingBounds {
    /// Bounds for `detector` at `wavelength` (meters). `oversampling >= 1` divides the
    /// required spacing into the suggested one.
    pub fn from_detector(
        detector: &DetectorGeometry,
        wavelength: f64,
        oversampling: f64,
    ) -> Result<Self> {
        detector.validate()?;
        if !(wavelength.is_finite() && wavelength > 0.0) {
            return Err(Error::InvalidConfig("wavelength must be > 0".into()));
        }
        if !(oversampling.is_finite() && oversampling >= 1.0) {
            return Err(Error::InvalidConfig("oversampling must be >= 1".into()));
        }

        let edge_resolution = full_period_edge_resolution(
            wavelength,
            detector.min_center_edge_distance(),
            detector.distance,
        );
        let required_spacing = edge_resolution / 2.0;
        Ok(Self {
            wavelength,
            distance: detector.distance,
            pixel_size: detector.pixel_size,
            edge_resolution,
            required_spacing,
            suggested_spacing: required_spacing / oversampling,
        })
    }

    /// Speckle size relative to the pixel size for a particle of `diameter` meters.
    /// Values above 2 satisfy Nyquist sampling of the pattern.
    pub fn linear_sampling_ratio(&self, diameter: f64) -> f64 {
        nyquist_pixel_size(self.wavelength, self.distance, diameter) / self.pixel_size
    }

    pub fn request(&self, material_scale: f64) -> MapRequest {
        MapRequest::new(self.required_spacing, self.suggested_spacing)
            .with_material_scale(material_scale)
    }
}

/// `lambda / sin(atan(y / distance))`.
pub fn full_period_edge_resolution(wavelength: f64, y: f64, distance: f64) -> f64 {
    wavelength / (y / distance).atan().sin()
}

/// Pixel size (meters) at which the speckles of a particle of `diameter` are sampled at
/// exactly the Nyquist rate.
pub fn nyquist_pixel_size(wavelength: f64, distance: f64, diameter: f64) -> f64 {
    wavelength * distance / diameter
}
