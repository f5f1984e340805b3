//! TerrainScene data structure shared by the generation stages.

use serde::{Deserialize, Serialize};

use crate::forest::ForestGrid;
use super::heightmap::Heightmap;

/// The working value passed through the generation pipeline.
///
/// Stages populate it in order: the heightmap stage fills `heightmap`, the
/// vegetation stage fills `vegetation` (seed-stripped) and `slope`. The
/// optional water/fog scalars are carried through to the exporter
/// untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainScene {
    /// Grid height (rows).
    pub height: u32,
    /// Grid width (columns).
    pub width: u32,
    /// Master random seed for generation.
    pub seed: u64,
    /// Synthesized heightmap (populated by the heightmap stage).
    pub heightmap: Option<Heightmap>,
    /// Final vegetation grid, seed-stripped (populated by the vegetation
    /// stage).
    pub vegetation: Option<ForestGrid>,
    /// Normalized slope magnitude field left by the pruning pass.
    #[serde(skip)]
    pub slope: Option<Vec<f32>>,
    /// Water level handed to the exporter, if the scene has water.
    pub water_level: Option<f32>,
    /// Fog density handed to the exporter, if the scene has fog.
    pub fog_density: Option<f32>,
}

impl TerrainScene {
    /// Creates an empty scene with the given grid size and seed.
    pub fn new(height: u32, width: u32, seed: u64) -> Self {
        Self {
            height,
            width,
            seed,
            heightmap: None,
            vegetation: None,
            slope: None,
            water_level: None,
            fog_density: None,
        }
    }

    /// Total number of cells in the grid.
    pub fn cell_count(&self) -> usize {
        (self.height as usize) * (self.width as usize)
    }

    /// Returns true once the heightmap stage has run.
    pub fn has_heightmap(&self) -> bool {
        self.heightmap.is_some()
    }

    /// Returns true once the vegetation stage has run.
    pub fn has_vegetation(&self) -> bool {
        self.vegetation.is_some()
    }

    /// Computes the global min and max height values, or None before the
    /// heightmap stage has run.
    pub fn height_range(&self) -> Option<(f32, f32)> {
        self.heightmap.as_ref().map(|map| map.value_range())
    }
}
