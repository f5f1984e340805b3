//! Flat terrain bundle export for the downstream engine consumer.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::forest::ForestGrid;
use crate::terrain::Heightmap;

/// Errors that can occur during bundle export.
#[derive(Error, Debug)]
pub enum BundleExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("heightmap is {0}x{1} but vegetation grid is {2}x{3}")]
    GridMismatch(u32, u32, u32, u32),
}

/// Auxiliary scene parameters carried into the bundle unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneParams {
    /// World units per grid cell.
    pub scale: f32,
    /// Elevation multiplier applied by the consumer.
    pub z_multiplier: f32,
    /// Texture coordinate scale.
    pub uv_scale: f32,
    /// Water plane level, if the scene has water.
    pub water_level: Option<f32>,
    /// Fog density, if the scene has fog.
    pub fog_density: Option<f32>,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            scale: 100.0,
            z_multiplier: 100.0,
            uv_scale: 1.0,
            water_level: None,
            fog_density: None,
        }
    }
}

/// The write-once flat record handed to the engine.
///
/// Grids are flattened row-major; vegetation uses the cell codes
/// (-1 unplantable, 0 empty, 1 seed, 2 tree). The record is versionless
/// and has no incremental semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainExport {
    /// Grid width (columns).
    pub x_size: u32,
    /// Grid height (rows).
    pub y_size: u32,
    /// World units per grid cell.
    pub scale: f32,
    /// Elevation multiplier.
    pub z_multiplier: f32,
    /// Texture coordinate scale.
    pub uv_scale: f32,
    /// Row-major height values.
    pub heightmap: Vec<f32>,
    /// Row-major vegetation codes.
    pub vegetation: Vec<i8>,
    /// Water plane level, if any.
    pub water_level: Option<f32>,
    /// Fog density, if any.
    pub fog_density: Option<f32>,
}

impl TerrainExport {
    /// Builds the bundle from a heightmap and a seed-stripped vegetation
    /// grid of matching dimensions.
    pub fn new(
        heightmap: &Heightmap,
        vegetation: &ForestGrid,
        params: &SceneParams,
    ) -> Result<Self, BundleExportError> {
        if heightmap.width() != vegetation.width() || heightmap.height() != vegetation.height() {
            return Err(BundleExportError::GridMismatch(
                heightmap.width(),
                heightmap.height(),
                vegetation.width(),
                vegetation.height(),
            ));
        }

        Ok(Self {
            x_size: heightmap.width(),
            y_size: heightmap.height(),
            scale: params.scale,
            z_multiplier: params.z_multiplier,
            uv_scale: params.uv_scale,
            heightmap: heightmap.as_slice().to_vec(),
            vegetation: vegetation.codes(),
            water_level: params.water_level,
            fog_density: params.fog_density,
        })
    }

    /// Writes the bundle as JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), BundleExportError> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }
}
