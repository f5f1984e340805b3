//! Procedural terrain and vegetation generator.
//!
//! This crate synthesizes a normalized terrain heightmap from fractal
//! noise, Gaussian mountain masks and slope-based shaping, grows a forest
//! over it with a grid cellular automaton, and exports both grids as a
//! flat bundle for a downstream engine consumer.

pub mod export;
pub mod forest;
pub mod noise;
pub mod pipeline;
pub mod terrain;

pub use export::{SceneParams, TerrainExport};
pub use forest::{ForestAutomaton, ForestConfig, ForestGrid, PruneMode, Termination, VegetationCell};
pub use noise::NoiseConfig;
pub use pipeline::{GenerationStage, HeightmapStage, Pipeline, StageId, VegetationStage};
pub use terrain::{synthesize, Heightmap, Mountain, TerrainMode, TerrainScene, TerrainTransform};
