//! Forest growth automaton and terrain-adaptive pruning.

mod automaton;
mod config;
mod pruning;

pub use automaton::{ForestAutomaton, ForestGrid, VegetationCell};
pub use config::{ForestConfig, ForestError, PruneMode, Termination};
pub use pruning::{slope_field, PruneOutcome};
