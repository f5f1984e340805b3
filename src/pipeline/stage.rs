//! Generation stage trait and pipeline orchestration.

use thiserror::Error;

use crate::forest::{ForestAutomaton, ForestConfig};
use crate::noise::NoiseConfig;
use crate::terrain::{synthesize, Mountain, TerrainMode, TerrainScene};

/// Unique identifier for generation stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    /// Heightmap synthesis from noise, shaping and mountains.
    Heightmap,
    /// Forest growth and terrain-adaptive pruning.
    Vegetation,
}

impl StageId {
    /// Returns the name of the stage.
    pub fn name(&self) -> &'static str {
        match self {
            StageId::Heightmap => "heightmap",
            StageId::Vegetation => "vegetation",
        }
    }
}

/// Errors that can occur during pipeline execution.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Stage '{0}' failed: {1}")]
    StageFailed(String, String),
    #[error("Missing dependency: stage '{0}' requires '{1}'")]
    MissingDependency(String, String),
}

/// Trait for implementing generation stages.
///
/// Each stage transforms the scene in some way, building upon previous
/// stages. The trait-based design allows for modular composition and easy
/// extension with new generation phases.
pub trait GenerationStage: Send + Sync {
    /// Returns the unique identifier for this stage.
    fn id(&self) -> StageId;

    /// Returns a human-readable name for the stage.
    fn name(&self) -> &str;

    /// Returns the stage IDs that must be executed before this stage.
    fn dependencies(&self) -> &[StageId] {
        &[]
    }

    /// Executes the generation stage, modifying the scene in place.
    ///
    /// # Arguments
    /// * `scene` - The scene to modify
    ///
    /// # Returns
    /// `Ok(())` on success, or an error describing what went wrong
    fn execute(&self, scene: &mut TerrainScene) -> Result<(), PipelineError>;
}

/// Orchestrates multiple generation stages into a complete pipeline.
pub struct Pipeline {
    stages: Vec<Box<dyn GenerationStage>>,
}

impl Pipeline {
    /// Creates a new empty pipeline.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Adds a stage to the pipeline.
    pub fn add_stage<S: GenerationStage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Returns the number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Executes all stages in order on the given scene.
    ///
    /// # Arguments
    /// * `scene` - The scene to generate
    ///
    /// # Returns
    /// `Ok(())` if all stages complete successfully
    pub fn run(&self, scene: &mut TerrainScene) -> Result<(), PipelineError> {
        let mut completed: Vec<StageId> = Vec::new();

        for stage in &self.stages {
            // Check dependencies
            for dep in stage.dependencies() {
                if !completed.contains(dep) {
                    return Err(PipelineError::MissingDependency(
                        stage.name().to_string(),
                        dep.name().to_string(),
                    ));
                }
            }

            // Execute stage
            stage.execute(scene)?;
            completed.push(stage.id());
        }

        Ok(())
    }

    /// Executes all stages with progress callbacks.
    ///
    /// # Arguments
    /// * `scene` - The scene to generate
    /// * `on_stage_start` - Called when each stage begins
    /// * `on_stage_complete` - Called when each stage finishes
    pub fn run_with_callbacks<F1, F2>(
        &self,
        scene: &mut TerrainScene,
        mut on_stage_start: F1,
        mut on_stage_complete: F2,
    ) -> Result<(), PipelineError>
    where
        F1: FnMut(&str, usize, usize),
        F2: FnMut(&str, usize, usize),
    {
        let total = self.stages.len();
        let mut completed: Vec<StageId> = Vec::new();

        for (i, stage) in self.stages.iter().enumerate() {
            on_stage_start(stage.name(), i, total);

            // Check dependencies
            for dep in stage.dependencies() {
                if !completed.contains(dep) {
                    return Err(PipelineError::MissingDependency(
                        stage.name().to_string(),
                        dep.name().to_string(),
                    ));
                }
            }

            // Execute stage
            stage.execute(scene)?;
            completed.push(stage.id());

            on_stage_complete(stage.name(), i, total);
        }

        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Heightmap synthesis stage.
pub struct HeightmapStage {
    /// Noise parameters; dimensions must match the scene.
    pub noise: NoiseConfig,
    /// Gaussian mountain features; empty disables modulation.
    pub mountains: Vec<Mountain>,
    /// Noise-only or shaped pipeline variant.
    pub mode: TerrainMode,
    /// Base factor of the mountain modulation.
    pub terrain_amplifier: f32,
}

impl HeightmapStage {
    /// Creates a noise-only stage without mountains.
    pub fn new(noise: NoiseConfig) -> Self {
        Self {
            noise,
            mountains: Vec::new(),
            mode: TerrainMode::NoiseOnly,
            terrain_amplifier: 0.5,
        }
    }
}

impl GenerationStage for HeightmapStage {
    fn id(&self) -> StageId {
        StageId::Heightmap
    }

    fn name(&self) -> &str {
        "Heightmap Synthesis"
    }

    fn execute(&self, scene: &mut TerrainScene) -> Result<(), PipelineError> {
        if self.noise.height != scene.height || self.noise.width != scene.width {
            return Err(PipelineError::StageFailed(
                self.name().to_string(),
                format!(
                    "noise config is {}x{} but scene is {}x{}",
                    self.noise.height, self.noise.width, scene.height, scene.width
                ),
            ));
        }

        let heightmap = synthesize(&self.noise, &self.mountains, &self.mode, self.terrain_amplifier)
            .map_err(|e| PipelineError::StageFailed(self.name().to_string(), e.to_string()))?;

        scene.heightmap = Some(heightmap);
        Ok(())
    }
}

/// Forest growth and pruning stage.
pub struct VegetationStage {
    pub config: ForestConfig,
}

impl VegetationStage {
    /// Creates a vegetation stage with the given configuration.
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }
}

impl GenerationStage for VegetationStage {
    fn id(&self) -> StageId {
        StageId::Vegetation
    }

    fn name(&self) -> &str {
        "Forest Growth"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Heightmap]
    }

    fn execute(&self, scene: &mut TerrainScene) -> Result<(), PipelineError> {
        let heightmap = scene.heightmap.as_ref().ok_or_else(|| {
            PipelineError::StageFailed(
                self.name().to_string(),
                "Missing heightmap on TerrainScene (run Heightmap stage first)".to_string(),
            )
        })?;

        // An unseeded forest config inherits the scene's master seed so
        // pipeline runs stay reproducible.
        let mut config = self.config.clone();
        if config.seed.is_none() {
            config.seed = Some(scene.seed);
        }

        let mut automaton = ForestAutomaton::new(config)
            .map_err(|e| PipelineError::StageFailed(self.name().to_string(), e.to_string()))?;
        automaton.run();

        let outcome = automaton
            .prune_against(heightmap)
            .map_err(|e| PipelineError::StageFailed(self.name().to_string(), e.to_string()))?;

        scene.slope = Some(outcome.slope);
        scene.vegetation = Some(automaton.stripped_map());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::{Termination, VegetationCell};

    #[test]
    fn test_pipeline_execution() {
        let mut pipeline = Pipeline::new();
        pipeline.add_stage(HeightmapStage::new(NoiseConfig::new(32, 32)));

        let mut scene = TerrainScene::new(32, 32, 42);
        pipeline.run(&mut scene).unwrap();

        let (min, max) = scene.height_range().unwrap();
        assert!(min < max, "heightmap should have variation");
    }

    #[test]
    fn test_vegetation_requires_heightmap() {
        let mut pipeline = Pipeline::new();
        pipeline.add_stage(VegetationStage::new(ForestConfig::new(32, 32)));

        let mut scene = TerrainScene::new(32, 32, 42);
        let result = pipeline.run(&mut scene);
        assert!(matches!(result, Err(PipelineError::MissingDependency(_, _))));
    }

    #[test]
    fn test_dimension_mismatch_fails_stage() {
        let mut pipeline = Pipeline::new();
        pipeline.add_stage(HeightmapStage::new(NoiseConfig::new(16, 16)));

        let mut scene = TerrainScene::new(32, 32, 42);
        let result = pipeline.run(&mut scene);
        assert!(matches!(result, Err(PipelineError::StageFailed(_, _))));
    }

    #[test]
    fn test_pipeline_with_callbacks() {
        let mut pipeline = Pipeline::new();
        pipeline.add_stage(HeightmapStage::new(NoiseConfig::new(16, 16)));

        let mut scene = TerrainScene::new(16, 16, 42);
        let mut started = false;
        let mut completed = false;

        pipeline
            .run_with_callbacks(
                &mut scene,
                |name, _, _| {
                    assert_eq!(name, "Heightmap Synthesis");
                    started = true;
                },
                |name, _, _| {
                    assert_eq!(name, "Heightmap Synthesis");
                    completed = true;
                },
            )
            .unwrap();

        assert!(started);
        assert!(completed);
    }

    #[test]
    fn test_stage_id_name() {
        assert_eq!(StageId::Heightmap.name(), "heightmap");
        assert_eq!(StageId::Vegetation.name(), "vegetation");
    }

    #[test]
    fn test_full_pipeline_populates_scene() {
        let mut forest = ForestConfig::new(50, 50);
        forest.initial_trees = 3;
        forest.seed_radius = 5;
        forest.seed_strength = 0.2;
        forest.seed_decay_rate = 0.3;
        forest.termination = Termination::Iterations(3);
        forest.space_between_trees = 4;
        forest.min_height = 0.2;
        forest.max_height = 0.8;
        forest.max_slope = 0.9;

        let mut noise = NoiseConfig::new(50, 50);
        noise.scale = 25.0;
        noise.octaves = 3;

        let mut pipeline = Pipeline::new();
        pipeline.add_stage(HeightmapStage::new(noise));
        pipeline.add_stage(VegetationStage::new(forest));

        let mut scene = TerrainScene::new(50, 50, 42);
        pipeline.run(&mut scene).unwrap();

        let map = scene.heightmap.as_ref().unwrap();
        assert_eq!((map.height(), map.width()), (50, 50));
        let (min, max) = map.value_range();
        assert_eq!(min, 0.0);
        assert_eq!(max, 1.0);

        let vegetation = scene.vegetation.as_ref().unwrap();
        assert_eq!(vegetation.count(VegetationCell::Seed), 0);

        // Spacing invariant holds for the exported snapshot.
        let trees: Vec<(i64, i64)> = vegetation
            .as_slice()
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == VegetationCell::Tree)
            .map(|(id, _)| ((id % 50) as i64, (id / 50) as i64))
            .collect();
        for (i, &(ax, ay)) in trees.iter().enumerate() {
            for &(bx, by) in &trees[i + 1..] {
                let (dx, dy) = (ax - bx, ay - by);
                assert!(dx * dx + dy * dy >= 16, "4-cell spacing violated");
            }
        }

        assert!(scene.slope.is_some());
        assert_eq!(scene.slope.as_ref().unwrap().len(), 2500);
    }

    #[test]
    fn test_pipeline_is_reproducible() {
        let build = || {
            let mut forest = ForestConfig::new(40, 40);
            forest.initial_trees = 4;
            forest.seed_radius = 6;
            forest.seed_strength = 0.4;

            let mut pipeline = Pipeline::new();
            pipeline.add_stage(HeightmapStage::new(NoiseConfig::new(40, 40)));
            pipeline.add_stage(VegetationStage::new(forest));

            let mut scene = TerrainScene::new(40, 40, 99);
            pipeline.run(&mut scene).unwrap();
            scene
        };

        let a = build();
        let b = build();
        assert_eq!(
            a.heightmap.as_ref().unwrap().as_slice(),
            b.heightmap.as_ref().unwrap().as_slice()
        );
        assert_eq!(
            a.vegetation.as_ref().unwrap().codes(),
            b.vegetation.as_ref().unwrap().codes()
        );
    }
}
