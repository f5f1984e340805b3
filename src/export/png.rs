//! PNG export functionality for heightmaps.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageBuffer, ImageEncoder, Luma};
use thiserror::Error;

use crate::terrain::Heightmap;

/// Errors that can occur during PNG export.
#[derive(Error, Debug)]
pub enum PngExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid height range: min ({0}) >= max ({1})")]
    InvalidHeightRange(f32, f32),
}

/// Options for PNG export.
#[derive(Debug, Clone)]
pub struct PngExportOptions {
    /// Minimum height value for normalization.
    pub min_height: f32,
    /// Maximum height value for normalization.
    pub max_height: f32,
    /// PNG compression type.
    pub compression: CompressionType,
    /// PNG filter type.
    pub filter: FilterType,
}

impl Default for PngExportOptions {
    fn default() -> Self {
        Self {
            min_height: 0.0,
            max_height: 1.0,
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

impl PngExportOptions {
    /// Creates options with auto-detected height range.
    ///
    /// Useful for mountain-modulated heightmaps, which may exceed [0, 1].
    pub fn auto_range(heightmap: &Heightmap) -> Self {
        let (min, max) = heightmap.value_range();
        Self {
            min_height: min,
            max_height: max,
            ..Default::default()
        }
    }
}

/// Exports a heightmap as a 16-bit grayscale PNG.
///
/// # Arguments
/// * `heightmap` - The heightmap to export
/// * `path` - Output file path
/// * `options` - Export options including height range for normalization
///
/// # Returns
/// `Ok(())` on success, or an error if export fails
pub fn export_heightmap_png(
    heightmap: &Heightmap,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    let min = options.min_height;
    let max = options.max_height;

    if min >= max {
        return Err(PngExportError::InvalidHeightRange(min, max));
    }

    let width = heightmap.width();
    let height = heightmap.height();
    let range = max - min;

    // Create 16-bit grayscale image
    let mut img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let value = heightmap.get(x, y);
            // Normalize to [0, 1] then scale to u16
            let normalized = ((value - min) / range).clamp(0.0, 1.0);
            img.put_pixel(x, y, Luma([(normalized * 65535.0) as u16]));
        }
    }

    // Write with specified compression settings
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);

    // Convert u16 slice to bytes for the encoder
    let raw_data = img.as_raw();
    let byte_slice: &[u8] = bytemuck::cast_slice(raw_data);

    encoder.write_image(byte_slice, width, height, image::ExtendedColorType::L16)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_export_png() {
        let values: Vec<f32> = (0..64 * 64).map(|i| i as f32 / (64.0 * 64.0)).collect();
        let map = Heightmap::from_values(64, 64, values);

        let dir = tempdir().unwrap();
        let path = dir.path().join("terrain.png");

        export_heightmap_png(&map, &path, &PngExportOptions::default()).unwrap();
        assert!(path.exists());

        let img = image::open(&path).unwrap().to_luma16();
        assert_eq!(img.dimensions(), (64, 64));
        assert_eq!(img.get_pixel(0, 0), &Luma([0u16]));
    }

    #[test]
    fn test_invalid_range_rejected() {
        let map = Heightmap::from_values(2, 2, vec![0.0; 4]);
        let dir = tempdir().unwrap();
        let path = dir.path().join("terrain.png");

        let options = PngExportOptions {
            min_height: 1.0,
            max_height: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            export_heightmap_png(&map, &path, &options),
            Err(PngExportError::InvalidHeightRange(_, _))
        ));
    }

    #[test]
    fn test_auto_range_covers_modulated_values() {
        let map = Heightmap::from_values(2, 2, vec![0.0, 0.5, 1.0, 1.4]);
        let options = PngExportOptions::auto_range(&map);
        assert_eq!(options.min_height, 0.0);
        assert_eq!(options.max_height, 1.4);

        let dir = tempdir().unwrap();
        let path = dir.path().join("terrain.png");
        export_heightmap_png(&map, &path, &options).unwrap();

        let img = image::open(&path).unwrap().to_luma16();
        assert_eq!(img.get_pixel(1, 1), &Luma([65535u16]));
    }
}
