//! Cubic voxel storage for particle density maps.
//!
//! A [`VoxelGrid`] holds `n * n * n` real values laid out x-fastest. Grids are produced by the
//! rasterizers in [`crate::bodies`] or supplied by the caller for custom geometries.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A cubic 3D grid of density values.
///
/// Deserialization goes through [`VoxelGrid::from_shape`], so a decoded grid always holds
/// `size^3` values.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "RawVoxelGrid")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelGrid {
    size: usize,
    data: Vec<f64>,
}

/// Unchecked wire form of a [`VoxelGrid`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawVoxelGrid {
    size: usize,
    data: Vec<f64>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawVoxelGrid> for VoxelGrid {
    type Error = Error;

    fn try_from(raw: RawVoxelGrid) -> Result<Self> {
        VoxelGrid::from_shape([raw.size; 3], raw.data)
    }
}

impl VoxelGrid {
    /// Create a new grid with edge length `size`, initializing all values to zero.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            data: vec![0.0; size * size * size],
        }
    }

    /// Create a grid from externally supplied data with shape `dims` (x, y, z).
    ///
    /// Only cubic shapes are accepted; the data length must match the shape.
    pub fn from_shape(dims: [usize; 3], data: Vec<f64>) -> Result<Self> {
        if dims[0] != dims[1] || dims[0] != dims[2] {
            return Err(Error::NonCubicMap { dims });
        }
        let expected = dims[0] * dims[1] * dims[2];
        if data.len() != expected {
            return Err(Error::GridSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            size: dims[0],
            data,
        })
    }

    /// Create a grid by evaluating `f(x, y, z)` at every voxel index.
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(size * size * size);
        for z in 0..size {
            for y in 0..size {
                for x in 0..size {
                    data.push(f(x, y, z));
                }
            }
        }
        Self { size, data }
    }

    /// Edge length in voxels.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Shape as `[x, y, z]`.
    pub fn shape(&self) -> [usize; 3] {
        [self.size; 3]
    }

    /// Raw values, x-fastest.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Get the value at the given voxel, returning `0.0` if out of bounds.
    pub fn get(&self, x: usize, y: usize, z: usize) -> f64 {
        if x >= self.size || y >= self.size || z >= self.size {
            return 0.0;
        }
        self.data[self.index(x, y, z)]
    }

    /// Set the value at the given voxel. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, z: usize, value: f64) {
        if x >= self.size || y >= self.size || z >= self.size {
            return;
        }
        let i = self.index(x, y, z);
        self.data[i] = value;
    }

    /// Sum of all voxel values.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Whether the value count matches `size^3`.
    pub fn is_consistent(&self) -> bool {
        self.size
            .checked_pow(3)
            .is_some_and(|expected| expected == self.data.len())
    }

    /// Multiply every voxel by `factor` in place.
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.data {
            *v *= factor;
        }
    }

    /// Copy of the z-slice at index `z` as `size * size` values, x-fastest.
    pub fn slice_z(&self, z: usize) -> Vec<f64> {
        if z >= self.size {
            return Vec::new();
        }
        let n2 = self.size * self.size;
        self.data[z * n2..(z + 1) * n2].to_vec()
    }

    #[inline]
    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.size + y) * self.size + x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_initializes_with_zeroes() {
        let grid = VoxelGrid::new(4);
        assert_eq!(grid.shape(), [4, 4, 4]);
        assert_eq!(grid.data().len(), 64);
        assert!(grid.data().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn get_returns_zero_outside_bounds() {
        let mut grid = VoxelGrid::new(2);
        grid.set(1, 1, 1, 3.0);
        assert_eq!(grid.get(1, 1, 1), 3.0);
        assert_eq!(grid.get(2, 0, 0), 0.0);
        grid.set(5, 5, 5, 1.0);
        assert_eq!(grid.sum(), 3.0);
    }

    #[test]
    fn from_shape_rejects_non_cubic_maps() {
        let err = VoxelGrid::from_shape([10, 10, 12], vec![0.0; 1200]).unwrap_err();
        assert!(matches!(err, Error::NonCubicMap { dims: [10, 10, 12] }));
    }

    #[test]
    fn from_shape_rejects_length_mismatch() {
        let err = VoxelGrid::from_shape([3, 3, 3], vec![0.0; 26]).unwrap_err();
        assert!(matches!(
            err,
            Error::GridSizeMismatch {
                expected: 27,
                actual: 26
            }
        ));
    }

    #[test]
    fn from_fn_is_x_fastest() {
        let grid = VoxelGrid::from_fn(3, |x, y, z| (x + 10 * y + 100 * z) as f64);
        assert_eq!(grid.data()[1], 1.0);
        assert_eq!(grid.data()[3], 10.0);
        assert_eq!(grid.data()[9], 100.0);
        assert_eq!(grid.get(2, 1, 2), 212.0);
        assert_eq!(grid.slice_z(1)[4], 111.0);
    }

    #[test]
    fn scale_multiplies_all_values() {
        let mut grid = VoxelGrid::from_fn(2, |_, _, _| 0.5);
        grid.scale(4.0);
        assert!(grid.data().iter().all(|v| *v == 2.0));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialization_checks_the_value_count() {
        let err = serde_json::from_str::<VoxelGrid>(r#"{"size":4,"data":[1.0,2.0,3.0]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("64"), "{err}");

        let grid: VoxelGrid = serde_json::from_str(r#"{"size":1,"data":[2.5]}"#).unwrap();
        assert!(grid.is_consistent());
        assert_eq!(grid.get(0, 0, 0), 2.5);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serialized_grid_decodes_to_the_same_grid() {
        let grid = VoxelGrid::from_fn(2, |x, y, z| (x + y + z) as f64);
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(serde_json::from_str::<VoxelGrid>(&json).unwrap(), grid);
    }
}
