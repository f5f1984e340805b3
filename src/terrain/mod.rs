//! Terrain synthesis: heightmap, mountain mask and slope transform.

mod heightmap;
mod mountain;
mod scene;
mod transform;

pub use heightmap::{synthesize, Heightmap, TerrainError, DEGENERATE_FILL};
pub use mountain::{compose_mask, Mountain};
pub use scene::TerrainScene;
pub use transform::{TerrainMode, TerrainTransform, TransformError};

pub(crate) use heightmap::normalize_field;
