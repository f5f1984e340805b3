//! Directional slope bias, band clamping and flattening.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by transform validation.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("clamp band must satisfy 0 <= min < max <= 1, got [{0}, {1}]")]
    InvalidClampBand(f32, f32),
    #[error("flatness must be positive, got {0}")]
    InvalidFlatness(f32),
}

/// Slope bias, clamp and flatten parameters applied to a normalized field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainTransform {
    /// Lower clamp bound after normalization, in [0, 1].
    pub min_height: f32,
    /// Upper clamp bound after normalization, in [0, 1].
    pub max_height: f32,
    /// Divisor applied to the whole field after clamping.
    pub flatness: f32,
    /// Bias at the first column; interpolated linearly to `slope_x_end`.
    pub slope_x_begin: f32,
    /// Bias at the last column.
    pub slope_x_end: f32,
    /// Bias at the first row; interpolated linearly to `slope_y_end`.
    pub slope_y_begin: f32,
    /// Bias at the last row.
    pub slope_y_end: f32,
}

impl Default for TerrainTransform {
    fn default() -> Self {
        Self {
            min_height: 0.0,
            max_height: 1.0,
            flatness: 1.0,
            slope_x_begin: 0.0,
            slope_x_end: 0.0,
            slope_y_begin: 0.0,
            slope_y_end: 0.0,
        }
    }
}

impl TerrainTransform {
    /// Checks all parameter bounds.
    pub fn validate(&self) -> Result<(), TransformError> {
        if !(self.min_height >= 0.0
            && self.max_height <= 1.0
            && self.min_height < self.max_height)
        {
            return Err(TransformError::InvalidClampBand(
                self.min_height,
                self.max_height,
            ));
        }
        if !(self.flatness > 0.0) {
            return Err(TransformError::InvalidFlatness(self.flatness));
        }
        Ok(())
    }

    /// Evaluates the directional bias at a cell.
    ///
    /// The x component interpolates `slope_x_begin -> slope_x_end` across
    /// columns, the y component `slope_y_begin -> slope_y_end` across rows;
    /// both are added.
    pub fn bias_at(&self, x: u32, y: u32, width: u32, height: u32) -> f32 {
        let tx = if width > 1 {
            x as f32 / (width - 1) as f32
        } else {
            0.0
        };
        let ty = if height > 1 {
            y as f32 / (height - 1) as f32
        } else {
            0.0
        };

        let bias_x = self.slope_x_begin + (self.slope_x_end - self.slope_x_begin) * tx;
        let bias_y = self.slope_y_begin + (self.slope_y_end - self.slope_y_begin) * ty;
        bias_x + bias_y
    }

    /// Adds the directional bias field element-wise to an unnormalized
    /// noise field.
    pub fn apply_bias(&self, field: &mut [f32], height: u32, width: u32) {
        let w = width as usize;
        field.par_iter_mut().enumerate().for_each(|(i, value)| {
            let x = (i % w) as u32;
            let y = (i / w) as u32;
            *value += self.bias_at(x, y, width, height);
        });
    }

    /// Clamps every normalized value into `[min_height, max_height]`, then
    /// divides the whole field by `flatness`.
    pub fn clamp_and_flatten(&self, field: &mut [f32]) {
        let min = self.min_height;
        let max = self.max_height;
        let flatness = self.flatness;
        field.par_iter_mut().for_each(|value| {
            *value = value.clamp(min, max) / flatness;
        });
    }
}

/// The two supported synthesis pipelines.
///
/// The variants differ in more than the presence of a transform: the
/// mountain mask is weighted by `flatness` in shaped mode and left
/// unweighted in noise-only mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TerrainMode {
    /// Normalized fractal noise, optionally mountain-modulated.
    NoiseOnly,
    /// Noise with slope bias, band clamp and flattening applied.
    Shaped(TerrainTransform),
}

impl TerrainMode {
    /// Returns the transform when operating in shaped mode.
    pub fn transform(&self) -> Option<&TerrainTransform> {
        match self {
            TerrainMode::NoiseOnly => None,
            TerrainMode::Shaped(t) => Some(t),
        }
    }

    /// Weight applied to the mountain mask when combining with terrain.
    pub fn mask_weight(&self) -> f32 {
        match self {
            TerrainMode::NoiseOnly => 1.0,
            TerrainMode::Shaped(t) => t.flatness,
        }
    }
}
