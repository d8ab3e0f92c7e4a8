use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use error::*;
pub use generator::*;
pub use types::*;

mod board;
mod cell;
mod error;
mod generator;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub height: Coord,
    pub width: Coord,
    pub mines: CellCount,
}

impl BoardConfig {
    pub const fn new_unchecked(height: Coord, width: Coord, mines: CellCount) -> Self {
        Self {
            height,
            width,
            mines,
        }
    }

    /// Validates the dimensions and clamps the mine count to the grid capacity.
    pub fn new(height: Coord, width: Coord, mines: CellCount) -> Result<Self> {
        if height == 0 {
            return Err(GameError::InvalidDimension("height"));
        }
        if width == 0 {
            return Err(GameError::InvalidDimension("width"));
        }
        let mines = mines.min(mult(height, width));
        Ok(Self::new_unchecked(height, width, mines))
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.height, self.width)
    }
}

/// Immutable value layer of a board: the mine placement and the adjacency
/// counts derived from it. Placement is the only mutation the values ever
/// undergo, and it happens before the grid is handed to a [`Board`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineGrid {
    values: Array2<CellValue>,
    mine_count: CellCount,
}

impl MineGrid {
    pub(crate) fn empty(config: BoardConfig) -> Self {
        Self {
            values: Array2::default([config.height as usize, config.width as usize]),
            mine_count: 0,
        }
    }

    /// Builds a grid with mines at the given `(row, column)` positions.
    ///
    /// Out-of-range and duplicate positions are skipped; the resulting
    /// [`mine_count`](Self::mine_count) reflects the mines actually placed.
    pub fn from_mine_positions(height: Coord, width: Coord, mines: &[Coord2]) -> Result<Self> {
        let config = BoardConfig::new(height, width, 0)?;
        let mut grid = Self::empty(config);
        for &coords in mines {
            grid.place_mine(coords);
        }
        Ok(grid)
    }

    /// Marks `coords` as a mine and increments the stored count of every
    /// non-mine neighbor.
    pub(crate) fn place_mine(&mut self, coords: Coord2) {
        let (row, column) = coords;
        if row >= self.height() || column >= self.width() {
            log::warn!("mine position ({row},{column}) out of range, skipped");
            return;
        }
        if self[coords].is_mine() {
            log::warn!("duplicate mine position ({row},{column}), skipped");
            return;
        }

        self.values[coords.to_nd_index()] = CellValue::Mine;
        self.mine_count += 1;

        for pos in self.iter_neighbors(coords) {
            if let CellValue::Count(count) = self.values[pos.to_nd_index()] {
                self.values[pos.to_nd_index()] = CellValue::Count(count + 1);
            }
        }
    }

    pub fn height(&self) -> Coord {
        self.values.dim().0.try_into().unwrap()
    }

    pub fn width(&self) -> Coord {
        self.values.dim().1.try_into().unwrap()
    }

    pub fn size(&self) -> Coord2 {
        (self.height(), self.width())
    }

    pub fn total_cells(&self) -> CellCount {
        self.values.len().try_into().unwrap()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    /// Flat index of `(row, column)`, stored row by row; `None` when either
    /// coordinate is out of range.
    pub fn resolve_index(&self, row: Coord, column: Coord) -> Option<CellCount> {
        if row >= self.height() || column >= self.width() {
            return None;
        }
        Some(row as CellCount * self.width() as CellCount + column as CellCount)
    }

    /// Accepts an already-flat index, returning it unchanged while it stays
    /// within the grid.
    pub fn resolve_flat(&self, index: CellCount) -> Option<CellCount> {
        (index < self.total_cells()).then_some(index)
    }

    pub(crate) fn iter_neighbors(&self, coords: Coord2) -> impl Iterator<Item = Coord2> + use<> {
        neighbors(coords, self.size())
    }
}

impl Index<Coord2> for MineGrid {
    type Output = CellValue;

    fn index(&self, (row, column): Coord2) -> &Self::Output {
        &self.values[(row as usize, column as usize)]
    }
}
