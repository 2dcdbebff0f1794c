//! Eccentricity-driven acuity model.
//!
//! Eccentricity `θ` maps to a relative resolution `R = α / (θ + α)`, which is
//! 1 at a fixation and falls towards 0 in the periphery. Each pyramid level
//! `j` gets a visibility curve
//!
//! ```text
//! T_j(R) = exp(-(2^(j-2) · R / σ)² · k)      j < levels - 1
//! T_{levels-1} = 0
//! ```
//!
//! and a band edge `ω_j = min(√(ln 2 / k) · σ / 2^(j-2), 1)` (with
//! `ω_{levels-1} = 0`) where `T_j` crosses one half. A pixel belongs to layer
//! `i ≥ 1` when `ω_i ≤ R ≤ ω_{i-1}`; pixels above `ω_0` stay on layer 0.

use image::{ImageBuffer, Luma};
use imageproc::definitions::Image;

use crate::config::FoveationConfig;
use crate::error::FoveationError;

/// Per-pixel outputs of [`AcuityModel::evaluate`].
///
/// Only the model builds these, so every map shares one size and there is
/// one visibility curve and one band edge per level.
#[derive(Debug, Clone, PartialEq)]
pub struct AcuityMaps {
    resolution: Image<Luma<f32>>,
    thresholds: Vec<Image<Luma<f32>>>,
    band_edges: Vec<f32>,
    layer_index: Image<Luma<u8>>,
}

impl AcuityMaps {
    /// Relative resolution `R`.
    #[must_use]
    pub const fn resolution(&self) -> &Image<Luma<f32>> {
        &self.resolution
    }

    /// Visibility curves `T_j`, one per level.
    #[must_use]
    pub fn thresholds(&self) -> &[Image<Luma<f32>>] {
        &self.thresholds
    }

    /// Band edges `ω_j`, non-increasing and ending at 0.
    #[must_use]
    pub fn band_edges(&self) -> &[f32] {
        &self.band_edges
    }

    /// Dominant layer per pixel.
    #[must_use]
    pub const fn layer_index(&self) -> &Image<Luma<u8>> {
        &self.layer_index
    }

    /// Number of pyramid levels the maps were computed for.
    #[must_use]
    pub fn levels(&self) -> usize {
        self.band_edges.len()
    }

    /// Shared (width, height) of every map.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.resolution.dimensions()
    }
}

/// Closed-form contrast-sensitivity model.
#[derive(Debug, Clone, PartialEq)]
pub struct AcuityModel {
    fovea_size: f32,
    sharpness: f32,
    sigma: f32,
    band_edges: Vec<f32>,
}

impl AcuityModel {
    /// Create a model from `fovea_size`, `sharpness`, `sigma` and `levels`.
    ///
    /// # Errors
    ///
    /// Returns [`FoveationError::InvalidParameter`] for an invalid config.
    pub fn new(config: &FoveationConfig) -> Result<Self, FoveationError> {
        config.validate()?;

        let base = (std::f32::consts::LN_2 / config.sharpness).sqrt() * config.sigma;
        let band_edges = (0..config.levels)
            .map(|j| {
                if j + 1 == config.levels {
                    0.0
                } else {
                    (base / level_scale(j)).min(1.0)
                }
            })
            .collect();

        Ok(Self {
            fovea_size: config.fovea_size,
            sharpness: config.sharpness,
            sigma: config.sigma,
            band_edges,
        })
    }

    /// Number of pyramid levels.
    #[must_use]
    pub fn levels(&self) -> usize {
        self.band_edges.len()
    }

    /// Band edges `ω_j`.
    #[must_use]
    pub fn band_edges(&self) -> &[f32] {
        &self.band_edges
    }

    /// Relative resolution at eccentricity `theta`.
    #[inline]
    #[must_use]
    pub fn resolution(&self, theta: f32) -> f32 {
        self.fovea_size / (theta + self.fovea_size)
    }

    /// Visibility curve of `level` at resolution `r`.
    #[inline]
    #[must_use]
    pub fn threshold(&self, level: usize, r: f32) -> f32 {
        if level + 1 >= self.levels() {
            return 0.0;
        }
        let scaled = level_scale(level) * r / self.sigma;
        (-(scaled * scaled) * self.sharpness).exp()
    }

    /// Dominant layer at resolution `r`.
    ///
    /// Bands share their edges; an edge value goes to the blurrier layer.
    #[must_use]
    pub fn classify(&self, r: f32) -> u8 {
        (1..self.levels())
            .rev()
            .find(|&i| self.band_edges[i] <= r && r <= self.band_edges[i - 1])
            .map_or(0, |i| i as u8)
    }

    /// Evaluate the model over an eccentricity field.
    #[must_use]
    pub fn evaluate(&self, theta: &Image<Luma<f32>>) -> AcuityMaps {
        let (width, height) = theta.dimensions();

        let resolution: Image<Luma<f32>> =
            ImageBuffer::from_fn(width, height, |x, y| {
                Luma([self.resolution(theta.get_pixel(x, y)[0])])
            });

        let thresholds = (0..self.levels())
            .map(|level| {
                ImageBuffer::from_fn(width, height, |x, y| {
                    Luma([self.threshold(level, resolution.get_pixel(x, y)[0])])
                })
            })
            .collect();

        let layer_index = ImageBuffer::from_fn(width, height, |x, y| {
            Luma([self.classify(resolution.get_pixel(x, y)[0])])
        });

        AcuityMaps {
            resolution,
            thresholds,
            band_edges: self.band_edges.clone(),
            layer_index,
        }
    }
}

/// `2^(level - 2)`.
#[inline]
fn level_scale(level: usize) -> f32 {
    2.0f32.powi(level as i32 - 2)
}
