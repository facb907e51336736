// Grow a colour volume outward from a handful of random seeds.
//
// A frontier holds coloured voxels that may still border empty ones.
// Each step takes a random frontier entry; if all its neighbours are
// coloured it is retired for good, otherwise one random empty neighbour
// is coloured with the jittered mean of the entry and its coloured
// neighbours. The entry goes back into the frontier, since it may still
// border empty voxels, and the new voxel joins it.
//
// Only empty voxels are ever written, so every growth step removes one
// empty voxel and the loop always ends.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::volume::{Dimensions, Position, VolumeGrid, VoxelColour};

pub const DEFAULT_SEED_COUNT: usize = 40;
pub const DEFAULT_PROGRESS_INTERVAL: usize = 100;

// Seed channels are drawn from 0..SEED_CHANNEL_RANGE.
const SEED_CHANNEL_RANGE: usize = 255;
// Jitter is JITTER_BIAS - below(JITTER_WIDTH), i.e. -9..=10.
const JITTER_BIAS: i32 = 10;
const JITTER_WIDTH: usize = 20;

/// Source of every random choice the engine makes.
///
/// Only `below` is required; the rest are defined in terms of it so a
/// scripted implementation can steer frontier and target selection.
pub trait Randomness {
    /// Uniform draw from `0..n`. Never called with `n == 0`.
    fn below(&mut self, n: usize) -> usize;

    fn position(&mut self, dims: Dimensions) -> Position {
        Position::new(
            self.below(dims.x) as i64,
            self.below(dims.y) as i64,
            self.below(dims.z) as i64,
        )
    }

    fn seed_colour(&mut self) -> VoxelColour {
        VoxelColour::new(
            self.below(SEED_CHANNEL_RANGE) as u32,
            self.below(SEED_CHANNEL_RANGE) as u32,
            self.below(SEED_CHANNEL_RANGE) as u32,
        )
    }

    fn jitter(&mut self) -> i32 {
        JITTER_BIAS - self.below(JITTER_WIDTH) as i32
    }
}

/// Adapts any `rand` generator.
pub struct RngSource<R>(pub R);

impl RngSource<StdRng> {
    pub fn from_entropy() -> Self {
        RngSource(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        RngSource(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Randomness for RngSource<R> {
    fn below(&mut self, n: usize) -> usize {
        self.0.gen_range(0..n)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthParams {
    /// Number of random seed voxels. Collisions are allowed.
    pub seed_count: usize,
    /// Retirements between progress reports; zero disables them.
    pub progress_interval: usize,
}

impl Default for GrowthParams {
    fn default() -> Self {
        GrowthParams {
            seed_count: DEFAULT_SEED_COUNT,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Advisory progress report: retired frontier entries against total voxels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The frontier is empty; nothing more will happen.
    Finished,
    /// The entry had no empty neighbours and left the frontier for good.
    Retired(Position),
    Grew {
        from: Position,
        into: Position,
        colour: VoxelColour,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GrowthStats {
    /// Seeds placed, counting collisions.
    pub seeds: usize,
    pub growth_steps: usize,
    pub retired: usize,
}

pub struct GrowthEngine<R> {
    grid: VolumeGrid,
    frontier: Vec<Position>,
    rng: R,
    params: GrowthParams,
    stats: GrowthStats,
}

impl<R: Randomness> GrowthEngine<R> {
    /// Seeds `params.seed_count` random voxels with random colours.
    pub fn new(mut grid: VolumeGrid, params: GrowthParams, mut rng: R) -> GrowthEngine<R> {
        let dims = grid.dims();
        let mut frontier = Vec::with_capacity(params.seed_count);
        for _ in 0..params.seed_count {
            let pos = rng.position(dims);
            let colour = rng.seed_colour();
            debug!("seed {:?} = {:?}", pos, colour.channels);
            grid.set(pos, colour);
            frontier.push(pos);
        }
        debug!(
            "{} seeds over {} distinct voxels in a {} volume",
            params.seed_count,
            grid.coloured_count(),
            dims
        );
        GrowthEngine {
            grid,
            frontier,
            rng,
            params,
            stats: GrowthStats {
                seeds: params.seed_count,
                ..GrowthStats::default()
            },
        }
    }

    /// Seeds the given voxels in order, later seeds overwriting earlier
    /// ones at the same position. `params.seed_count` is ignored.
    pub fn with_seeds<I>(mut grid: VolumeGrid, params: GrowthParams, seeds: I, rng: R) -> Result<GrowthEngine<R>>
    where
        I: IntoIterator<Item = (Position, VoxelColour)>,
    {
        let mut frontier = Vec::new();
        for (pos, colour) in seeds {
            grid.try_set(pos, colour)?;
            frontier.push(pos);
        }
        let seeds = frontier.len();
        Ok(GrowthEngine {
            grid,
            frontier,
            rng,
            params,
            stats: GrowthStats {
                seeds,
                ..GrowthStats::default()
            },
        })
    }

    pub fn grid(self: &Self) -> &VolumeGrid {
        &self.grid
    }

    pub fn frontier(self: &Self) -> &[Position] {
        &self.frontier
    }

    pub fn stats(self: &Self) -> GrowthStats {
        self.stats
    }

    pub fn progress(self: &Self) -> Progress {
        Progress {
            completed: self.stats.retired,
            total: self.grid.dims().cell_count(),
        }
    }

    /// Runs one iteration of the fill.
    pub fn step(self: &mut Self) -> StepOutcome {
        if self.frontier.is_empty() {
            return StepOutcome::Finished;
        }
        let pick = self.rng.below(self.frontier.len());
        let pos = self.frontier.swap_remove(pick);

        let own = match self.grid.get(pos) {
            Some(colour) => colour,
            None => unreachable!("frontier entry {:?} has no colour", pos),
        };
        let mut colours = vec![own];
        let mut empties = Vec::new();
        for n in self.grid.neighbours(pos) {
            match self.grid.get(n) {
                Some(colour) => colours.push(colour),
                None => empties.push(n),
            }
        }

        if empties.is_empty() {
            self.stats.retired += 1;
            return StepOutcome::Retired(pos);
        }

        let into = empties[self.rng.below(empties.len())];
        let jitter = [self.rng.jitter(), self.rng.jitter(), self.rng.jitter()];
        let colour = VoxelColour::mean_with_jitter(&colours, jitter);
        self.grid.set(into, colour);
        self.frontier.push(pos);
        self.frontier.push(into);
        self.stats.growth_steps += 1;
        StepOutcome::Grew {
            from: pos,
            into,
            colour,
        }
    }

    /// Steps until the frontier is exhausted, calling `on_progress` each
    /// time the retired count reaches a multiple of the progress interval.
    pub fn run_with_progress<F>(self: &mut Self, mut on_progress: F) -> GrowthStats
    where
        F: FnMut(Progress),
    {
        let interval = self.params.progress_interval;
        loop {
            match self.step() {
                StepOutcome::Finished => break,
                StepOutcome::Retired(_) => {
                    if interval != 0 && self.stats.retired % interval == 0 {
                        on_progress(self.progress());
                    }
                }
                StepOutcome::Grew { .. } => {}
            }
        }
        info!(
            "growth finished: {} seeds, {} growth steps, {} retired, {} of {} voxels coloured",
            self.stats.seeds,
            self.stats.growth_steps,
            self.stats.retired,
            self.grid.coloured_count(),
            self.grid.dims().cell_count()
        );
        self.stats
    }

    /// Steps to completion, logging progress.
    pub fn run(self: &mut Self) -> GrowthStats {
        self.run_with_progress(|p| info!("{} / {}", p.completed, p.total))
    }

    pub fn into_grid(self: Self) -> VolumeGrid {
        self.grid
    }
}
