//! Forest growth automaton: seed, grow and decay phases over a dense
//! vegetation grid.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::terrain::Heightmap;
use super::config::{ForestConfig, ForestError, PruneMode, Termination};
use super::pruning::{slope_field, PruneOutcome};

/// Random positions tried per tree during initial placement before the
/// tree is reported as unplaced.
const PLACEMENT_ATTEMPTS_PER_TREE: u32 = 100;

/// State of a single vegetation cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VegetationCell {
    /// Permanently excluded from seeding, set only by the pruning pass.
    Unplantable,
    /// No vegetation.
    Empty,
    /// A seed with an associated strength, decaying each iteration.
    Seed,
    /// A grown tree; never removed by the automaton itself.
    Tree,
}

impl VegetationCell {
    /// Export code for the downstream consumer.
    pub fn code(self) -> i8 {
        match self {
            VegetationCell::Unplantable => -1,
            VegetationCell::Empty => 0,
            VegetationCell::Seed => 1,
            VegetationCell::Tree => 2,
        }
    }
}

/// A dense 2D grid of vegetation cells, stored in row-major order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestGrid {
    width: u32,
    height: u32,
    cells: Vec<VegetationCell>,
}

impl ForestGrid {
    /// Creates an all-empty grid.
    pub fn new(height: u32, width: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![VegetationCell::Empty; (height as usize) * (width as usize)],
        }
    }

    /// Grid width (columns).
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height (rows).
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when the grid holds no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the cell state at the given position.
    ///
    /// # Panics
    /// Panics if x or y is out of bounds.
    pub fn get(&self, x: u32, y: u32) -> VegetationCell {
        debug_assert!(x < self.width && y < self.height);
        self.cells[(y * self.width + x) as usize]
    }

    /// Counts cells in the given state.
    pub fn count(&self, state: VegetationCell) -> usize {
        self.cells.iter().filter(|&&c| c == state).count()
    }

    /// Row-major export codes (-1 unplantable, 0 empty, 1 seed, 2 tree).
    pub fn codes(&self) -> Vec<i8> {
        self.cells.iter().map(|c| c.code()).collect()
    }

    /// The raw row-major cells.
    pub fn as_slice(&self) -> &[VegetationCell] {
        &self.cells
    }
}

/// Grid cellular automaton evolving vegetation over discrete iterations.
///
/// The automaton owns its grid, tree list and per-cell seed strengths;
/// each phase is an explicit method, and `run` drives them according to
/// the configured termination policy. Cells transition
/// `Empty -> Seed -> Tree` monotonically within a run; only decay
/// (`Seed -> Empty`) and the separate pruning pass revert cells.
pub struct ForestAutomaton {
    config: ForestConfig,
    grid: ForestGrid,
    /// Seed strength per cell; 0.0 everywhere a cell is not a seed.
    strengths: Vec<f64>,
    trees: Vec<(u32, u32)>,
    unplaced: u32,
    rng: ChaCha8Rng,
}

impl ForestAutomaton {
    /// Creates an automaton and places the initial trees.
    ///
    /// Placement respects the spacing invariant; when no valid position is
    /// found for a tree within the attempt cap, the tree is skipped and
    /// counted in [`unplaced_trees`](Self::unplaced_trees) - a degraded
    /// success rather than an error.
    pub fn new(config: ForestConfig) -> Result<Self, ForestError> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };

        let mut automaton = Self {
            grid: ForestGrid::new(config.height, config.width),
            strengths: vec![0.0; config.cell_count()],
            trees: Vec::new(),
            unplaced: 0,
            rng,
            config,
        };
        automaton.place_initial_trees();
        Ok(automaton)
    }

    /// The automaton's configuration.
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// The current vegetation grid, including transient seeds.
    pub fn grid(&self) -> &ForestGrid {
        &self.grid
    }

    /// Positions of all trees.
    pub fn trees(&self) -> &[(u32, u32)] {
        &self.trees
    }

    /// Positions and strengths of all live seeds.
    pub fn seeds(&self) -> Vec<(u32, u32, f64)> {
        let w = self.grid.width;
        self.grid
            .cells
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == VegetationCell::Seed)
            .map(|(id, _)| {
                let x = (id as u32) % w;
                let y = (id as u32) / w;
                (x, y, self.strengths[id])
            })
            .collect()
    }

    /// Number of initial trees that could not be placed under the spacing
    /// constraint.
    pub fn unplaced_trees(&self) -> u32 {
        self.unplaced
    }

    /// Fraction of cells covered by trees.
    pub fn coverage(&self) -> f64 {
        if self.grid.cells.is_empty() {
            return 0.0;
        }
        self.trees.len() as f64 / self.grid.cells.len() as f64
    }

    /// Number of live seeds on the grid.
    pub fn live_seed_count(&self) -> usize {
        self.grid.count(VegetationCell::Seed)
    }

    /// Seed phase: every empty cell within `seed_radius` of a tree that
    /// does not violate spacing against any existing tree becomes a seed
    /// with the configured initial strength. Existing seeds are not
    /// re-strengthened.
    pub fn seed_phase(&mut self) {
        let r = self.config.seed_radius;
        let r2 = (r as i64) * (r as i64);
        let width = self.config.width;
        let height = self.config.height;

        for i in 0..self.trees.len() {
            let (tx, ty) = self.trees[i];

            for y in ty.saturating_sub(r)..=(ty + r).min(height - 1) {
                for x in tx.saturating_sub(r)..=(tx + r).min(width - 1) {
                    let dx = x as i64 - tx as i64;
                    let dy = y as i64 - ty as i64;
                    if dx * dx + dy * dy > r2 {
                        continue;
                    }

                    let id = (y * width + x) as usize;
                    if self.grid.cells[id] != VegetationCell::Empty {
                        continue;
                    }
                    if self.violates_spacing(x, y) {
                        continue;
                    }

                    self.grid.cells[id] = VegetationCell::Seed;
                    self.strengths[id] = self.config.seed_strength;
                }
            }
        }
    }

    /// Grow phase: each seed promotes to a tree with probability equal to
    /// its current strength, re-checking the spacing invariant at
    /// promotion time. Cells are scanned in row-major order, which is the
    /// tie-break between neighboring seeds competing in the same phase.
    ///
    /// Returns the number of promotions.
    pub fn grow_phase(&mut self) -> usize {
        let width = self.config.width;
        let mut promoted = 0;

        for id in 0..self.grid.cells.len() {
            if self.grid.cells[id] != VegetationCell::Seed {
                continue;
            }

            let roll = self.rng.random::<f64>();
            if roll >= self.strengths[id] {
                continue;
            }

            let x = (id as u32) % width;
            let y = (id as u32) / width;
            // A promotion earlier in this scan may have made the cell
            // ineligible.
            if self.violates_spacing(x, y) {
                continue;
            }

            self.strengths[id] = 0.0;
            self.place_tree(x, y);
            promoted += 1;
        }

        promoted
    }

    /// Decay phase: every surviving seed loses `seed_decay_rate` of its
    /// strength; a seed whose strength falls below `seed_floor` reverts to
    /// empty before the next seed phase.
    pub fn decay_phase(&mut self) {
        let keep = 1.0 - self.config.seed_decay_rate;

        for id in 0..self.grid.cells.len() {
            if self.grid.cells[id] != VegetationCell::Seed {
                continue;
            }

            self.strengths[id] *= keep;
            if self.strengths[id] < self.config.seed_floor {
                self.grid.cells[id] = VegetationCell::Empty;
                self.strengths[id] = 0.0;
            }
        }
    }

    /// Runs one seed-grow-decay cycle and returns the number of
    /// promotions.
    pub fn step(&mut self) -> usize {
        self.seed_phase();
        let promoted = self.grow_phase();
        self.decay_phase();
        promoted
    }

    /// Runs the automaton to completion under the configured termination
    /// policy.
    ///
    /// In coverage mode the loop stops early when an iteration promotes
    /// nothing and no live seed remains, since coverage can no longer
    /// grow.
    pub fn run(&mut self) {
        match self.config.termination {
            Termination::Iterations(n) => {
                for _ in 0..n {
                    self.step();
                }
            }
            Termination::Coverage(target) => {
                while self.coverage() < target {
                    let promoted = self.step();
                    if promoted == 0 && self.live_seed_count() == 0 {
                        break;
                    }
                }
            }
        }
    }

    /// Terrain-adaptive pruning post-pass.
    ///
    /// Computes a normalized slope magnitude field from the heightmap and
    /// removes every tree standing on slope steeper than `max_slope` or at
    /// an elevation outside `[min_height, max_height]`. Removed cells
    /// become empty or unplantable according to `prune_mode`.
    pub fn prune_against(&mut self, heightmap: &Heightmap) -> Result<PruneOutcome, ForestError> {
        if heightmap.height() != self.config.height || heightmap.width() != self.config.width {
            return Err(ForestError::DimensionMismatch(
                self.config.width,
                self.config.height,
                heightmap.width(),
                heightmap.height(),
            ));
        }

        let slope = slope_field(heightmap);
        let width = self.config.width;
        let removed_state = match self.config.prune_mode {
            PruneMode::Clear => VegetationCell::Empty,
            PruneMode::Exclude => VegetationCell::Unplantable,
        };

        let mut removed = 0;
        let mut kept = Vec::with_capacity(self.trees.len());

        for &(x, y) in &self.trees {
            let id = (y * width + x) as usize;
            let h = heightmap.get(x, y);
            let disqualified = slope[id] > self.config.max_slope
                || h < self.config.min_height
                || h > self.config.max_height;

            if disqualified {
                self.grid.cells[id] = removed_state;
                removed += 1;
            } else {
                kept.push((x, y));
            }
        }

        self.trees = kept;
        Ok(PruneOutcome { removed, slope })
    }

    /// A copy of the grid with all transient seeds reset to empty - the
    /// snapshot handed to external consumers.
    pub fn stripped_map(&self) -> ForestGrid {
        let mut grid = self.grid.clone();
        for cell in &mut grid.cells {
            if *cell == VegetationCell::Seed {
                *cell = VegetationCell::Empty;
            }
        }
        grid
    }

    fn place_initial_trees(&mut self) {
        for _ in 0..self.config.initial_trees {
            let mut placed = false;
            for _ in 0..PLACEMENT_ATTEMPTS_PER_TREE {
                let x = self.rng.random_range(0..self.config.width);
                let y = self.rng.random_range(0..self.config.height);

                if self.grid.get(x, y) != VegetationCell::Empty {
                    continue;
                }
                if self.violates_spacing(x, y) {
                    continue;
                }

                self.place_tree(x, y);
                placed = true;
                break;
            }
            if !placed {
                self.unplaced += 1;
            }
        }
    }

    fn place_tree(&mut self, x: u32, y: u32) {
        let id = (y * self.config.width + x) as usize;
        self.grid.cells[id] = VegetationCell::Tree;
        self.trees.push((x, y));
    }

    /// True when a tree at (x, y) would sit closer than
    /// `space_between_trees` to an existing tree.
    fn violates_spacing(&self, x: u32, y: u32) -> bool {
        let s = self.config.space_between_trees;
        if s == 0 {
            return false;
        }
        let s2 = (s as i64) * (s as i64);
        self.trees.iter().any(|&(tx, ty)| {
            let dx = tx as i64 - x as i64;
            let dy = ty as i64 - y as i64;
            dx * dx + dy * dy < s2
        })
    }
}
