//! Pipeline module for orchestrating terrain generation stages.
//!
//! Provides a trait-based architecture for modular generation stages
//! that can be composed into a complete scene generation pipeline.

mod stage;

pub use stage::{
    GenerationStage, HeightmapStage, Pipeline, PipelineError, StageId, VegetationStage,
};
