//! Radial Gaussian mountain-mask composition.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::heightmap::normalize_field;

/// A single radial Gaussian feature composed into the mountain mask.
///
/// Contributions from a collection of mountains are summed, so the
/// collection is order-independent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mountain {
    /// Center column within the grid.
    pub x: u32,
    /// Center row within the grid.
    pub y: u32,
    /// Standard deviation controlling the spread of the feature.
    pub sigma: f32,
    /// Peak strength at the center.
    pub amplitude: f32,
    /// Inverts the contribution to carve a depression instead of a peak.
    pub hole: bool,
}

impl Mountain {
    /// Creates a peak at the given position.
    pub fn peak(x: u32, y: u32, sigma: f32, amplitude: f32) -> Self {
        Self {
            x,
            y,
            sigma,
            amplitude,
            hole: false,
        }
    }

    /// Creates a depression at the given position.
    pub fn hole(x: u32, y: u32, sigma: f32, amplitude: f32) -> Self {
        Self {
            x,
            y,
            sigma,
            amplitude,
            hole: true,
        }
    }

    /// Evaluates this mountain's Gaussian contribution at a cell.
    pub fn contribution(&self, x: u32, y: u32) -> f32 {
        let dx = x as f32 - self.x as f32;
        let dy = y as f32 - self.y as f32;
        let g = self.amplitude * (-(dx * dx + dy * dy) / (2.0 * self.sigma * self.sigma)).exp();
        if self.hole {
            -g
        } else {
            g
        }
    }
}

/// Composes a set of mountains into a normalized overlay mask.
///
/// Each mountain contributes a 2D Gaussian centered at its position,
/// negated when `hole` is set; contributions are summed per cell and the
/// summed field is normalized to [0, 1] independently of the terrain it
/// will modulate.
///
/// # Arguments
/// * `height`, `width` - Grid dimensions
/// * `mountains` - Nonempty list of mountain features
///
/// # Returns
/// Row-major mask of `height * width` values in [0, 1]
pub fn compose_mask(height: u32, width: u32, mountains: &[Mountain]) -> Vec<f32> {
    let w = width as usize;
    let mut mask = vec![0.0f32; (height as usize) * w];

    mask.par_iter_mut().enumerate().for_each(|(i, value)| {
        let x = (i % w) as u32;
        let y = (i / w) as u32;
        *value = mountains.iter().map(|m| m.contribution(x, y)).sum();
    });

    normalize_field(&mut mask);
    mask
}
