//! Noise generation module for terrain synthesis.
//!
//! Provides tileable multi-octave Perlin fBm over a dense 2D grid.

mod fractal;

pub use fractal::{generate_noise_field, sample_fractal, NoiseConfig, NoiseError};
