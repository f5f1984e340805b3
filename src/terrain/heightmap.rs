//! Heightmap synthesis: fractal noise, slope shaping and mountain
//! modulation.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::noise::{generate_noise_field, NoiseConfig, NoiseError};
use super::mountain::{compose_mask, Mountain};
use super::transform::{TerrainMode, TransformError};

/// Value every cell maps to when a field is degenerate (min == max) and
/// normalization would otherwise divide by zero.
pub const DEGENERATE_FILL: f32 = 0.5;

/// Errors that can occur during heightmap synthesis.
///
/// All variants are configuration errors rejected before any computation;
/// no partial grid is ever produced.
#[derive(Error, Debug)]
pub enum TerrainError {
    #[error(transparent)]
    Noise(#[from] NoiseError),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error("mountain sigma must be positive, got {0}")]
    InvalidSigma(f32),
    #[error("mountain amplitude must be positive, got {0}")]
    InvalidAmplitude(f32),
    #[error("mountain at ({0}, {1}) lies outside the {2}x{3} grid")]
    MountainOutOfBounds(u32, u32, u32, u32),
}

/// A dense 2D grid of height values, stored in row-major order.
///
/// Values lie in [0, 1] immediately after normalization. Mountain
/// modulation multiplies the field by `(amplifier + mask * weight)`, so a
/// mountain-modulated heightmap may exceed 1.0; callers that require a
/// strict bound must re-normalize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heightmap {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl Heightmap {
    /// Wraps a row-major value vector.
    ///
    /// # Panics
    /// Panics if `values.len() != height * width`.
    pub fn from_values(height: u32, width: u32, values: Vec<f32>) -> Self {
        assert_eq!(
            values.len(),
            (height as usize) * (width as usize),
            "value count must match grid dimensions"
        );
        Self {
            width,
            height,
            values,
        }
    }

    /// Grid width (columns).
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height (rows).
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the grid holds no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the height at the given cell.
    ///
    /// # Panics
    /// Panics if x or y is out of bounds.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        debug_assert!(x < self.width && y < self.height);
        self.values[(y * self.width + x) as usize]
    }

    /// The raw row-major values.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Computes the global (min, max) over the grid.
    pub fn value_range(&self) -> (f32, f32) {
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for &v in &self.values {
            min = min.min(v);
            max = max.max(v);
        }
        (min, max)
    }
}

/// Normalizes a field to [0, 1] in place via `(v - min) / (max - min)`.
///
/// A degenerate flat field (min == max) maps every cell to
/// [`DEGENERATE_FILL`] instead of dividing by zero.
pub(crate) fn normalize_field(field: &mut [f32]) {
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for &v in field.iter() {
        min = min.min(v);
        max = max.max(v);
    }

    if min >= max {
        field.fill(DEGENERATE_FILL);
        return;
    }

    let range = max - min;
    field.par_iter_mut().for_each(|v| *v = (*v - min) / range);
}

fn validate_mountains(config: &NoiseConfig, mountains: &[Mountain]) -> Result<(), TerrainError> {
    for m in mountains {
        if !(m.sigma > 0.0) {
            return Err(TerrainError::InvalidSigma(m.sigma));
        }
        if !(m.amplitude > 0.0) {
            return Err(TerrainError::InvalidAmplitude(m.amplitude));
        }
        if m.x >= config.width || m.y >= config.height {
            return Err(TerrainError::MountainOutOfBounds(
                m.x,
                m.y,
                config.width,
                config.height,
            ));
        }
    }
    Ok(())
}

/// Synthesizes a heightmap from noise, optional shaping and optional
/// mountains.
///
/// Pipeline order: fractal noise, directional slope bias (shaped mode),
/// normalization to [0, 1], clamp + flatten (shaped mode), mountain
/// modulation. The mountain mask is normalized independently and
/// multiplies the terrain as `terrain * (terrain_amplifier + mask * w)`
/// with `w = flatness` in shaped mode and `w = 1` otherwise, so mountains
/// amplify existing detail rather than flattening it.
///
/// # Arguments
/// * `config` - Noise parameters and grid dimensions
/// * `mountains` - Gaussian features; empty slice disables modulation
/// * `mode` - Noise-only or shaped pipeline variant
/// * `terrain_amplifier` - Base factor of the mountain modulation
///
/// # Returns
/// The synthesized heightmap, or a configuration error before any
/// computation has started.
pub fn synthesize(
    config: &NoiseConfig,
    mountains: &[Mountain],
    mode: &TerrainMode,
    terrain_amplifier: f32,
) -> Result<Heightmap, TerrainError> {
    config.validate()?;
    if let Some(transform) = mode.transform() {
        transform.validate()?;
    }
    validate_mountains(config, mountains)?;

    let mut field = generate_noise_field(config);

    if let Some(transform) = mode.transform() {
        transform.apply_bias(&mut field, config.height, config.width);
    }

    normalize_field(&mut field);

    if let Some(transform) = mode.transform() {
        transform.clamp_and_flatten(&mut field);
    }

    if !mountains.is_empty() {
        let mask = compose_mask(config.height, config.width, mountains);
        let weight = mode.mask_weight();
        field
            .par_iter_mut()
            .zip(mask.par_iter())
            .for_each(|(v, &m)| *v *= terrain_amplifier + m * weight);
    }

    Ok(Heightmap::from_values(config.height, config.width, field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::transform::TerrainTransform;

    #[test]
    fn test_noise_only_heightmap_is_normalized() {
        let config = NoiseConfig::new(50, 50);
        let map = synthesize(&config, &[], &TerrainMode::NoiseOnly, 0.5).unwrap();

        assert_eq!(map.height(), 50);
        assert_eq!(map.width(), 50);

        let (min, max) = map.value_range();
        assert!(min >= 0.0 && max <= 1.0);
        assert_eq!(min, 0.0);
        assert_eq!(max, 1.0);
    }

    #[test]
    fn test_synthesis_is_reproducible() {
        let config = NoiseConfig::with_base(32, 48, 7);
        let a = synthesize(&config, &[], &TerrainMode::NoiseOnly, 0.5).unwrap();
        let b = synthesize(&config, &[], &TerrainMode::NoiseOnly, 0.5).unwrap();
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn test_invalid_config_rejected_before_compute() {
        let mut config = NoiseConfig::new(32, 32);
        config.scale = -3.0;
        let result = synthesize(&config, &[], &TerrainMode::NoiseOnly, 0.5);
        assert!(matches!(result, Err(TerrainError::Noise(_))));
    }

    #[test]
    fn test_invalid_mountain_rejected() {
        let config = NoiseConfig::new(32, 32);

        let bad_sigma = [Mountain::peak(4, 4, 0.0, 1.0)];
        assert!(matches!(
            synthesize(&config, &bad_sigma, &TerrainMode::NoiseOnly, 0.5),
            Err(TerrainError::InvalidSigma(_))
        ));

        let out_of_bounds = [Mountain::peak(32, 4, 2.0, 1.0)];
        assert!(matches!(
            synthesize(&config, &out_of_bounds, &TerrainMode::NoiseOnly, 0.5),
            Err(TerrainError::MountainOutOfBounds(32, 4, 32, 32))
        ));
    }

    #[test]
    fn test_invalid_transform_rejected() {
        let config = NoiseConfig::new(32, 32);
        let mode = TerrainMode::Shaped(TerrainTransform {
            min_height: 0.9,
            max_height: 0.1,
            ..Default::default()
        });
        assert!(matches!(
            synthesize(&config, &[], &mode, 0.5),
            Err(TerrainError::Transform(_))
        ));
    }

    #[test]
    fn test_shaped_mode_respects_clamp_band() {
        let config = NoiseConfig::new(40, 40);
        let mode = TerrainMode::Shaped(TerrainTransform {
            min_height: 0.3,
            max_height: 0.7,
            flatness: 2.0,
            ..Default::default()
        });

        let map = synthesize(&config, &[], &mode, 0.5).unwrap();
        let (min, max) = map.value_range();
        assert!(min >= 0.3 / 2.0 - 1e-6);
        assert!(max <= 0.7 / 2.0 + 1e-6);
    }

    #[test]
    fn test_slope_bias_tilts_the_field() {
        let config = NoiseConfig::new(64, 64);
        let mode = TerrainMode::Shaped(TerrainTransform {
            slope_y_begin: 0.0,
            slope_y_end: 10.0,
            ..Default::default()
        });

        let map = synthesize(&config, &[], &mode, 0.5).unwrap();

        // A bias that dwarfs the noise forces the top rows below the
        // bottom rows after normalization.
        let top: f32 = (0..64).map(|x| map.get(x, 0)).sum();
        let bottom: f32 = (0..64).map(|x| map.get(x, 63)).sum();
        assert!(top < bottom);
    }

    #[test]
    fn test_mountain_raises_terrain_around_center() {
        let config = NoiseConfig::new(64, 64);
        let plain = synthesize(&config, &[], &TerrainMode::NoiseOnly, 1.0).unwrap();

        let mountains = [Mountain::peak(32, 32, 6.0, 1.0)];
        let peaked = synthesize(&config, &mountains, &TerrainMode::NoiseOnly, 1.0).unwrap();

        // At the center the mask is 1.0, so the multiplier is amplifier + 1.
        let expected = plain.get(32, 32) * 2.0;
        assert!((peaked.get(32, 32) - expected).abs() < 1e-5);
    }

    #[test]
    fn test_mountain_modulation_may_exceed_unit_range() {
        let config = NoiseConfig::new(48, 48);
        let mountains = [Mountain::peak(24, 24, 10.0, 1.0)];
        let map = synthesize(&config, &mountains, &TerrainMode::NoiseOnly, 1.5).unwrap();

        let (_, max) = map.value_range();
        assert!(max > 1.0, "modulated heightmap is not re-normalized");
    }

    #[test]
    fn test_degenerate_field_fallback() {
        let mut field = vec![3.25; 9];
        normalize_field(&mut field);
        assert!(field.iter().all(|&v| v == DEGENERATE_FILL));
    }

    #[test]
    fn test_value_range() {
        let map = Heightmap::from_values(2, 2, vec![0.1, 0.9, 0.4, 0.6]);
        assert_eq!(map.value_range(), (0.1, 0.9));
    }
}
