use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngExt, SeedableRng};

use super::*;
use crate::{CellCount, Coord, Coord2};

/// Uniform placement: shuffles the flat cell indices with a seeded rng and
/// mines the prefix, so every cell is equally eligible.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RandomPlacer {
    seed: u64,
}

impl RandomPlacer {
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Placer with a seed drawn from the thread rng.
    pub fn from_entropy() -> Self {
        Self::new(rand::rng().random())
    }
}

impl MinePlacer for RandomPlacer {
    fn place(self, config: BoardConfig) -> MineGrid {
        let total = config.total_cells();
        let mut grid = MineGrid::empty(config);

        if config.mines >= total {
            if config.mines > total {
                log::warn!(
                    "requested {} mines but the board only fits {}",
                    config.mines,
                    total
                );
            }
            for index in 0..total {
                grid.place_mine(coords_at(&config, index));
            }
            return grid;
        }

        let mut indices: Vec<CellCount> = (0..total).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);

        for &index in &indices[..config.mines as usize] {
            grid.place_mine(coords_at(&config, index));
        }
        grid
    }
}

fn coords_at(config: &BoardConfig, index: CellCount) -> Coord2 {
    let width = config.width as CellCount;
    ((index / width) as Coord, (index % width) as Coord)
}
