use serde::{Deserialize, Serialize};

/// Value a cell was assigned when the mines were placed: a mine, or the
/// number of mines among its up-to-8 neighbors. Fixed for the life of the
/// board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellValue {
    Mine,
    Count(u8),
}

impl CellValue {
    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }
}

impl Default for CellValue {
    fn default() -> Self {
        Self::Count(0)
    }
}

/// Player-visible state of a cell.
///
/// `Unknown` and `Flagged` toggle into each other; every other transition is
/// one-way. `RevealedMine`, `ExplodedMine`, and `RevealedMismatch` only
/// appear once the game has ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Unknown,
    Revealed,
    RevealedMine,
    ExplodedMine,
    Flagged,
    RevealedMismatch,
}

impl CellState {
    /// A cell still counted by [`Board::cells_to_reveal`](crate::Board::cells_to_reveal).
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Unknown | Self::Flagged)
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Unknown
    }
}
