//! Geometry kinds for voxel-map particles and their size conversions.
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Shape rasterized into a particle's voxel map.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Geometry {
    Icosahedron,
    Cube,
    Sphere,
    Spheroid,
    /// Externally supplied voxel map.
    Custom,
}

impl Geometry {
    pub fn as_str(self) -> &'static str {
        match self {
            Geometry::Icosahedron => "icosahedron",
            Geometry::Cube => "cube",
            Geometry::Sphere => "sphere",
            Geometry::Spheroid => "spheroid",
            Geometry::Custom => "custom",
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Geometry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "icosahedron" => Ok(Geometry::Icosahedron),
            "cube" => Ok(Geometry::Cube),
            "sphere" => Ok(Geometry::Sphere),
            "spheroid" => Ok(Geometry::Spheroid),
            "custom" => Ok(Geometry::Custom),
            other => Err(Error::UnknownGeometry {
                name: other.to_owned(),
            }),
        }
    }
}

/// Semi-axes `(a, c)` of a spheroid with volume-equivalent `diameter` and `flattening = c / a`.
///
/// `a` is the equatorial semi-axis, `c` the polar one.
pub fn spheroid_semi_axes(diameter: f64, flattening: f64) -> (f64, f64) {
    let a = (diameter.powi(3) / (8.0 * flattening)).cbrt();
    (a, flattening * a)
}

/// Volume-equivalent diameter of a spheroid with semi-axes `a` and `c`.
pub fn spheroid_diameter(a: f64, c: f64) -> f64 {
    2.0 * (a * a * c).cbrt()
}

/// Flattening `c / a` of a spheroid with semi-axes `a` and `c`.
pub fn spheroid_flattening(a: f64, c: f64) -> f64 {
    c / a
}

/// Circumradius of the regular icosahedron whose volume equals that of a sphere of `diameter`.
pub fn icosahedron_circumradius(diameter: f64) -> f64 {
    let sqrt5 = 5f64.sqrt();
    let radius = diameter / 2.0;
    let edge = radius * (16.0 * PI / 5.0 / (3.0 + sqrt5)).cbrt();
    (10.0 + 2.0 * sqrt5).sqrt() * edge / 4.0
}
