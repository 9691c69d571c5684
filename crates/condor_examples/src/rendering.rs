use std::path::Path;

use anyhow::{ensure, Context};
use condor::grid::VoxelGrid;
use image::{GrayImage, Luma};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// How a density slice is mapped to gray values.
#[derive(Clone, Copy, Debug)]
pub struct SliceStyle {
    /// Output pixels per voxel.
    pub scale: u32,
    /// Render dense voxels dark on a white background.
    pub invert: bool,
}

impl Default for SliceStyle {
    fn default() -> Self {
        Self {
            scale: 8,
            invert: false,
        }
    }
}

impl SliceStyle {
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }
}

/// Writes slice `z` of `grid` as a grayscale PNG normalized to the slice maximum.
pub fn render_slice_to_png(
    grid: &VoxelGrid,
    z: usize,
    style: &SliceStyle,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let n = grid.size();
    ensure!(z < n, "slice {z} outside a grid of edge {n}");
    ensure!(style.scale > 0, "slice scale must be > 0");

    let slice = grid.slice_z(z);
    let max = slice.iter().copied().fold(0.0_f64, f64::max);
    let norm = if max > 0.0 { 1.0 / max } else { 0.0 };

    let edge = u32::try_from(n).context("grid too large for an image")? * style.scale;
    let img = GrayImage::from_fn(edge, edge, |px, py| {
        let x = (px / style.scale) as usize;
        let y = (py / style.scale) as usize;
        let v = (slice[y * n + x] * norm).clamp(0.0, 1.0);
        let v = if style.invert { 1.0 - v } else { v };
        Luma([(v * 255.0).round() as u8])
    });

    let path = path.as_ref();
    img.save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("Wrote {}x{} slice to {}.", edge, edge, path.display());
    Ok(())
}
