//! Multi-octave fractal Perlin noise generation.

use noise::{NoiseFn, Perlin};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by noise configuration validation.
#[derive(Error, Debug)]
pub enum NoiseError {
    #[error("grid dimensions must be positive, got {0}x{1}")]
    EmptyGrid(u32, u32),
    #[error("scale must be positive, got {0}")]
    InvalidScale(f32),
    #[error("octaves must be at least 1")]
    ZeroOctaves,
    #[error("persistence must be in (0, 1], got {0}")]
    InvalidPersistence(f32),
    #[error("lacunarity must be positive, got {0}")]
    InvalidLacunarity(f32),
    #[error("repeat period must be non-negative, got {0}")]
    InvalidRepeat(f32),
}

/// Configuration for multi-octave fractal noise generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseConfig {
    /// Grid height (rows).
    pub height: u32,
    /// Grid width (columns).
    pub width: u32,
    /// Feature size; sample coordinates are divided by this (2-500 typical).
    pub scale: f32,
    /// Number of noise octaves (1-10 typical).
    pub octaves: u8,
    /// Amplitude decay per octave (0.4-0.6 typical).
    pub persistence: f32,
    /// Frequency multiplier per octave (typically 2.0).
    pub lacunarity: f32,
    /// Tiling period along x in noise-space units. 0 disables tiling.
    pub repeat_x: f32,
    /// Tiling period along y in noise-space units. 0 disables tiling.
    pub repeat_y: f32,
    /// Noise-space origin selector: reseeds the gradient lattice so the
    /// same repeat interval yields a different texture.
    pub base: i32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            height: 256,
            width: 256,
            scale: 50.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            repeat_x: 1024.0,
            repeat_y: 1024.0,
            base: 0,
        }
    }
}

impl NoiseConfig {
    /// Creates a configuration for the given grid size with default noise
    /// parameters.
    pub fn new(height: u32, width: u32) -> Self {
        Self {
            height,
            width,
            ..Default::default()
        }
    }

    /// Creates a configuration with the given base offset.
    pub fn with_base(height: u32, width: u32, base: i32) -> Self {
        Self {
            height,
            width,
            base,
            ..Default::default()
        }
    }

    /// Checks all parameter bounds, rejecting the configuration before any
    /// field is generated.
    pub fn validate(&self) -> Result<(), NoiseError> {
        if self.height == 0 || self.width == 0 {
            return Err(NoiseError::EmptyGrid(self.height, self.width));
        }
        if !(self.scale > 0.0) {
            return Err(NoiseError::InvalidScale(self.scale));
        }
        if self.octaves == 0 {
            return Err(NoiseError::ZeroOctaves);
        }
        if !(self.persistence > 0.0 && self.persistence <= 1.0) {
            return Err(NoiseError::InvalidPersistence(self.persistence));
        }
        if !(self.lacunarity > 0.0) {
            return Err(NoiseError::InvalidLacunarity(self.lacunarity));
        }
        if self.repeat_x < 0.0 {
            return Err(NoiseError::InvalidRepeat(self.repeat_x));
        }
        if self.repeat_y < 0.0 {
            return Err(NoiseError::InvalidRepeat(self.repeat_y));
        }
        Ok(())
    }

    /// Number of cells in the configured grid.
    pub fn cell_count(&self) -> usize {
        (self.height as usize) * (self.width as usize)
    }
}

/// Samples fractal noise at a 2D position in noise space.
///
/// Sums `octaves` layers whose amplitude shrinks by `persistence` and whose
/// frequency grows by `lacunarity` per layer, normalized by the total
/// amplitude. When a repeat period is set, the input coordinate wraps into
/// the period so the field tiles along that axis.
///
/// # Arguments
/// * `x`, `y` - Position in noise space (grid coordinate / scale)
/// * `perlin` - The seeded noise primitive
/// * `config` - Noise configuration parameters
///
/// # Returns
/// A noise value in approximately [-1, 1] range (normalized by amplitude sum)
pub fn sample_fractal(x: f64, y: f64, perlin: &Perlin, config: &NoiseConfig) -> f32 {
    let x = if config.repeat_x > 0.0 {
        x.rem_euclid(config.repeat_x as f64)
    } else {
        x
    };
    let y = if config.repeat_y > 0.0 {
        y.rem_euclid(config.repeat_y as f64)
    } else {
        y
    };

    let mut total = 0.0f64;
    let mut amplitude = 1.0f64;
    let mut frequency = 1.0f64;
    let mut max_amplitude = 0.0f64;

    for _ in 0..config.octaves {
        total += perlin.get([x * frequency, y * frequency]) * amplitude;
        max_amplitude += amplitude;
        amplitude *= config.persistence as f64;
        frequency *= config.lacunarity as f64;
    }

    (total / max_amplitude) as f32
}

/// Generates the full fractal-noise scalar field for a grid.
///
/// Cells are evaluated independently in parallel; the caller is responsible
/// for normalizing the result, which needs a global min/max reduction.
///
/// # Arguments
/// * `config` - Noise configuration (dimensions, scale, octave parameters)
///
/// # Returns
/// Row-major vector of `height * width` unbounded noise values
pub fn generate_noise_field(config: &NoiseConfig) -> Vec<f32> {
    let perlin = Perlin::new(config.base as u32);
    let width = config.width as usize;
    let scale = config.scale as f64;

    let mut field = vec![0.0f32; config.cell_count()];
    field.par_iter_mut().enumerate().for_each(|(i, value)| {
        let x = (i % width) as f64;
        let y = (i / width) as f64;
        *value = sample_fractal(x / scale, y / scale, &perlin, config);
    });

    field
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NoiseConfig::default();
        assert_eq!(config.octaves, 4);
        assert_eq!(config.scale, 50.0);
        assert_eq!(config.lacunarity, 2.0);
        assert_eq!(config.persistence, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_bounds() {
        let mut config = NoiseConfig::new(0, 64);
        assert!(matches!(config.validate(), Err(NoiseError::EmptyGrid(0, 64))));

        config = NoiseConfig::new(64, 64);
        config.scale = 0.0;
        assert!(matches!(config.validate(), Err(NoiseError::InvalidScale(_))));

        config = NoiseConfig::new(64, 64);
        config.octaves = 0;
        assert!(matches!(config.validate(), Err(NoiseError::ZeroOctaves)));

        config = NoiseConfig::new(64, 64);
        config.persistence = 1.5;
        assert!(matches!(
            config.validate(),
            Err(NoiseError::InvalidPersistence(_))
        ));

        config = NoiseConfig::new(64, 64);
        config.repeat_y = -1.0;
        assert!(matches!(config.validate(), Err(NoiseError::InvalidRepeat(_))));
    }

    #[test]
    fn test_noise_reproducibility() {
        let config = NoiseConfig::with_base(32, 32, 12345);
        let field1 = generate_noise_field(&config);
        let field2 = generate_noise_field(&config);
        assert_eq!(field1, field2, "same configuration should produce same field");
    }

    #[test]
    fn test_different_bases_produce_different_fields() {
        let config1 = NoiseConfig::with_base(32, 32, 1);
        let config2 = NoiseConfig::with_base(32, 32, 2);

        let field1 = generate_noise_field(&config1);
        let field2 = generate_noise_field(&config2);

        assert_ne!(field1, field2, "different bases should produce different fields");
    }

    #[test]
    fn test_noise_range() {
        let config = NoiseConfig::new(48, 48);
        for value in generate_noise_field(&config) {
            assert!(
                value >= -1.5 && value <= 1.5,
                "noise value {} out of expected range",
                value
            );
        }
    }

    #[test]
    fn test_tiling_wraps_at_period() {
        let mut config = NoiseConfig::new(8, 8);
        config.repeat_x = 4.0;
        config.repeat_y = 4.0;

        let perlin = Perlin::new(config.base as u32);
        let a = sample_fractal(0.5, 1.25, &perlin, &config);
        let b = sample_fractal(0.5 + 4.0, 1.25, &perlin, &config);
        let c = sample_fractal(0.5, 1.25 + 8.0, &perlin, &config);

        assert_eq!(a, b, "field should repeat along x with the configured period");
        assert_eq!(a, c, "field should repeat along y with the configured period");
    }

    #[test]
    fn test_field_size() {
        let config = NoiseConfig::new(10, 20);
        let field = generate_noise_field(&config);
        assert_eq!(field.len(), 200);
    }
}
