//! Forest automaton configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by forest configuration validation.
#[derive(Error, Debug)]
pub enum ForestError {
    #[error("grid dimensions must be positive, got {0}x{1}")]
    EmptyGrid(u32, u32),
    #[error("{0} must be a probability in [0, 1], got {1}")]
    InvalidProbability(&'static str, f64),
    #[error("iteration count must be at least 1")]
    ZeroIterations,
    #[error("coverage target must be in (0, 1], got {0}")]
    InvalidCoverageTarget(f64),
    #[error("pruning band must satisfy 0 <= min < max <= 1, got [{0}, {1}]")]
    InvalidPruneBand(f32, f32),
    #[error("max slope must be in [0, 1], got {0}")]
    InvalidMaxSlope(f32),
    #[error("forest grid is {0}x{1} but heightmap is {2}x{3}")]
    DimensionMismatch(u32, u32, u32, u32),
}

/// When the automaton stops iterating.
///
/// The two policies are alternative operating modes, never combined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Termination {
    /// Run exactly this many seed-grow-decay cycles.
    Iterations(u32),
    /// Iterate until tree coverage reaches this fraction, stopping early
    /// if the forest can no longer grow.
    Coverage(f64),
}

impl Default for Termination {
    fn default() -> Self {
        Self::Iterations(3)
    }
}

/// What the pruning pass does to a disqualified tree cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PruneMode {
    /// Reset the cell to empty; it may be re-seeded later.
    Clear,
    /// Mark the cell unplantable, permanently excluding it from
    /// re-seeding in subsequent regeneration cycles.
    Exclude,
}

impl Default for PruneMode {
    fn default() -> Self {
        Self::Clear
    }
}

/// Parameters for the forest growth automaton.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Grid height (rows); must match the paired heightmap.
    pub height: u32,
    /// Grid width (columns); must match the paired heightmap.
    pub width: u32,
    /// Number of trees placed at random before iteration starts.
    pub initial_trees: u32,
    /// Maximum cell distance around a tree where seeds may spawn.
    pub seed_radius: u32,
    /// Initial probability of a seed growing into a tree.
    pub seed_strength: f64,
    /// Fraction of seed strength lost per iteration.
    pub seed_decay_rate: f64,
    /// Termination policy (fixed iterations or coverage target).
    pub termination: Termination,
    /// Minimum Euclidean distance between tree centers.
    pub space_between_trees: u32,
    /// Trees below this normalized height are pruned.
    pub min_height: f32,
    /// Trees above this normalized height are pruned.
    pub max_height: f32,
    /// Trees on normalized slope steeper than this are pruned.
    pub max_slope: f32,
    /// Strength threshold below which a decayed seed reverts to empty.
    pub seed_floor: f64,
    /// Whether pruning clears cells or permanently excludes them.
    pub prune_mode: PruneMode,
    /// RNG seed; None draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            height: 256,
            width: 256,
            initial_trees: 5,
            seed_radius: 15,
            seed_strength: 0.05,
            seed_decay_rate: 0.2,
            termination: Termination::default(),
            space_between_trees: 5,
            min_height: 0.0,
            max_height: 1.0,
            max_slope: 1.0,
            seed_floor: 1e-3,
            prune_mode: PruneMode::default(),
            seed: None,
        }
    }
}

impl ForestConfig {
    /// Creates a configuration for the given grid size with default
    /// growth parameters.
    pub fn new(height: u32, width: u32) -> Self {
        Self {
            height,
            width,
            ..Default::default()
        }
    }

    /// Checks all parameter bounds, rejecting the configuration before
    /// the automaton allocates any state.
    pub fn validate(&self) -> Result<(), ForestError> {
        if self.height == 0 || self.width == 0 {
            return Err(ForestError::EmptyGrid(self.height, self.width));
        }
        if !(0.0..=1.0).contains(&self.seed_strength) {
            return Err(ForestError::InvalidProbability(
                "seed_strength",
                self.seed_strength,
            ));
        }
        if !(0.0..=1.0).contains(&self.seed_decay_rate) {
            return Err(ForestError::InvalidProbability(
                "seed_decay_rate",
                self.seed_decay_rate,
            ));
        }
        match self.termination {
            Termination::Iterations(0) => return Err(ForestError::ZeroIterations),
            Termination::Coverage(target) if !(target > 0.0 && target <= 1.0) => {
                return Err(ForestError::InvalidCoverageTarget(target));
            }
            _ => {}
        }
        if !(self.min_height >= 0.0
            && self.max_height <= 1.0
            && self.min_height < self.max_height)
        {
            return Err(ForestError::InvalidPruneBand(
                self.min_height,
                self.max_height,
            ));
        }
        if !(0.0..=1.0).contains(&self.max_slope) {
            return Err(ForestError::InvalidMaxSlope(self.max_slope));
        }
        Ok(())
    }

    /// Total number of cells in the configured grid.
    pub fn cell_count(&self) -> usize {
        (self.height as usize) * (self.width as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ForestConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.termination, Termination::Iterations(3));
        assert_eq!(config.seed_floor, 1e-3);
    }

    #[test]
    fn test_validation_rejects_bad_bounds() {
        let mut config = ForestConfig::new(0, 10);
        assert!(matches!(config.validate(), Err(ForestError::EmptyGrid(0, 10))));

        config = ForestConfig::new(10, 10);
        config.seed_strength = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ForestError::InvalidProbability("seed_strength", _))
        ));

        config = ForestConfig::new(10, 10);
        config.termination = Termination::Iterations(0);
        assert!(matches!(config.validate(), Err(ForestError::ZeroIterations)));

        config = ForestConfig::new(10, 10);
        config.termination = Termination::Coverage(0.0);
        assert!(matches!(
            config.validate(),
            Err(ForestError::InvalidCoverageTarget(_))
        ));

        config = ForestConfig::new(10, 10);
        config.min_height = 0.8;
        config.max_height = 0.2;
        assert!(matches!(
            config.validate(),
            Err(ForestError::InvalidPruneBand(_, _))
        ));

        config = ForestConfig::new(10, 10);
        config.max_slope = 1.2;
        assert!(matches!(config.validate(), Err(ForestError::InvalidMaxSlope(_))));
    }
}
