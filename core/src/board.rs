use core::num::Saturating;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

use crate::*;

/// Record of a single cell-state transition, addressed for the presentation
/// layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellChange {
    pub row: Coord,
    pub column: Coord,
    pub state: CellState,
}

impl CellChange {
    fn new((row, column): Coord2, state: CellState) -> Self {
        Self { row, column, state }
    }
}

/// Outcome of [`Board::toggle_flag`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    Flagged,
    Unflagged,
    NotApplicable,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NotApplicable)
    }
}

/// A single game: the fixed value layer plus the per-cell visibility states
/// the player mutates through [`reveal`](Self::reveal) and
/// [`toggle_flag`](Self::toggle_flag). One instance per game; a reset is a
/// new instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    grid: MineGrid,
    states: Array2<CellState>,
    cells_to_reveal: Saturating<CellCount>,
}

impl Board {
    /// Board with `mines` mines (clamped to the grid capacity) placed
    /// uniformly at random.
    pub fn new(height: Coord, width: Coord, mines: CellCount) -> Result<Self> {
        let config = BoardConfig::new(height, width, mines)?;
        Ok(Self::from_grid(RandomPlacer::from_entropy().place(config)))
    }

    /// Board over a prepared value layer, every cell starting `Unknown`.
    pub fn from_grid(grid: MineGrid) -> Self {
        let size = grid.size();
        let cells_to_reveal = Saturating(grid.total_cells());
        Self {
            grid,
            states: Array2::default(size.to_nd_index()),
            cells_to_reveal,
        }
    }

    pub fn height(&self) -> Coord {
        self.grid.height()
    }

    pub fn width(&self) -> Coord {
        self.grid.width()
    }

    pub fn mine_count(&self) -> CellCount {
        self.grid.mine_count()
    }

    /// Flat index of `(row, column)`; `None` when out of range.
    pub fn resolve_index(&self, row: Coord, column: Coord) -> Option<CellCount> {
        self.grid.resolve_index(row, column)
    }

    /// Validates an already-flat index against the grid.
    pub fn resolve_flat(&self, index: CellCount) -> Option<CellCount> {
        self.grid.resolve_flat(index)
    }

    pub fn cell_value(&self, row: Coord, column: Coord) -> Option<CellValue> {
        self.resolve_index(row, column)?;
        Some(self.grid[(row, column)])
    }

    pub fn state_at(&self, row: Coord, column: Coord) -> Option<CellState> {
        self.resolve_index(row, column)?;
        Some(self.states[(row, column).to_nd_index()])
    }

    /// Cells still `Unknown` or `Flagged`.
    pub fn cells_to_reveal(&self) -> CellCount {
        self.cells_to_reveal.0
    }

    /// Safe cells the player has yet to reveal.
    pub fn left_to_discover(&self) -> CellCount {
        (self.cells_to_reveal - Saturating(self.grid.mine_count())).0
    }

    /// True exactly when every non-mine cell has been revealed.
    pub fn all_revealed(&self) -> bool {
        self.cells_to_reveal.0 == self.grid.mine_count()
    }

    pub fn flags_placed(&self) -> CellCount {
        self.states
            .iter()
            .filter(|&&state| state == CellState::Flagged)
            .count()
            .try_into()
            .unwrap()
    }

    /// Mine counter for the adapter's display; negative when overflagged.
    pub fn mines_unflagged(&self) -> isize {
        self.grid.mine_count() as isize - self.flags_placed() as isize
    }

    /// Toggles the flag on an `Unknown` or `Flagged` cell. Revealed cells in
    /// any form, and out-of-range coordinates, report `NotApplicable`.
    pub fn toggle_flag(&mut self, row: Coord, column: Coord) -> FlagOutcome {
        if self.resolve_index(row, column).is_none() {
            return FlagOutcome::NotApplicable;
        }
        let coords = (row, column);

        match self.states[coords.to_nd_index()] {
            CellState::Flagged => {
                self.states[coords.to_nd_index()] = CellState::Unknown;
                log::debug!("cell ({row},{column}) unflagged");
                FlagOutcome::Unflagged
            }
            CellState::Unknown => {
                self.states[coords.to_nd_index()] = CellState::Flagged;
                log::debug!("cell ({row},{column}) flagged");
                FlagOutcome::Flagged
            }
            _ => FlagOutcome::NotApplicable,
        }
    }

    /// Reveals an `Unknown` cell.
    ///
    /// A mine hit explodes it and returns the end-of-game sweep; a safe cell
    /// flood-fills its zero-valued region, appending the sweep when the last
    /// safe cell of the board comes open. Flagged, already-revealed, and
    /// out-of-range cells return an empty change list.
    pub fn reveal(&mut self, row: Coord, column: Coord) -> Vec<CellChange> {
        if self.resolve_index(row, column).is_none() {
            return Vec::new();
        }
        let coords = (row, column);

        if self.states[coords.to_nd_index()] != CellState::Unknown {
            return Vec::new();
        }

        if self.grid[coords].is_mine() {
            self.states[coords.to_nd_index()] = CellState::ExplodedMine;
            log::debug!("mine exploded at ({row},{column})");
            return self.sweep_remaining();
        }

        let mut changes = Vec::new();
        self.flood_reveal(coords, &mut changes);
        if self.all_revealed() {
            changes.extend(self.sweep_remaining());
        }
        changes
    }

    /// Opens every unflagged neighbor of a revealed numbered cell once its
    /// flag count matches its number. The first covered mine explodes and
    /// ends the operation with the sweep.
    pub fn chord_reveal(&mut self, row: Coord, column: Coord) -> Vec<CellChange> {
        if self.resolve_index(row, column).is_none() {
            return Vec::new();
        }
        let coords = (row, column);

        if self.states[coords.to_nd_index()] != CellState::Revealed {
            return Vec::new();
        }
        let CellValue::Count(count) = self.grid[coords] else {
            return Vec::new();
        };
        if count == 0 || count != self.count_flagged_neighbors(coords) {
            return Vec::new();
        }

        let mut changes = Vec::new();
        for pos in self.grid.iter_neighbors(coords) {
            if self.states[pos.to_nd_index()] != CellState::Unknown {
                continue;
            }
            if self.grid[pos].is_mine() {
                self.states[pos.to_nd_index()] = CellState::ExplodedMine;
                log::debug!("mine exploded at ({},{})", pos.0, pos.1);
                changes.extend(self.sweep_remaining());
                return changes;
            }
            self.flood_reveal(pos, &mut changes);
        }

        if self.all_revealed() {
            changes.extend(self.sweep_remaining());
        }
        changes
    }

    /// Reveals `seed` and, through zero-valued cells, its connected region.
    /// The state check is both the visited guard and the termination
    /// condition, so the fill touches each cell at most once.
    fn flood_reveal(&mut self, seed: Coord2, changes: &mut Vec<CellChange>) {
        let mut to_visit = VecDeque::from([seed]);
        let mut visited = HashSet::new();

        while let Some(coords) = to_visit.pop_front() {
            if !visited.insert(coords) {
                continue;
            }
            if self.states[coords.to_nd_index()] != CellState::Unknown {
                continue;
            }

            self.states[coords.to_nd_index()] = CellState::Revealed;
            self.cells_to_reveal -= 1;
            changes.push(CellChange::new(coords, CellState::Revealed));
            log::trace!("revealed ({},{})", coords.0, coords.1);

            if self.grid[coords] == CellValue::Count(0) {
                to_visit.extend(
                    self.grid
                        .iter_neighbors(coords)
                        .filter(|&pos| self.states[pos.to_nd_index()] == CellState::Unknown)
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }
    }

    /// Reclassifies every cell once the game ends. Correctly flagged mines
    /// are told apart from mistaken flags, and the triggering explosion is
    /// re-emitted for the presentation layer. Runs once per game.
    fn sweep_remaining(&mut self) -> Vec<CellChange> {
        let mut changes = Vec::new();
        for row in 0..self.height() {
            for column in 0..self.width() {
                let coords = (row, column);
                let is_mine = self.grid[coords].is_mine();
                let state = match self.states[coords.to_nd_index()] {
                    CellState::Revealed => continue,
                    CellState::Unknown if is_mine => CellState::RevealedMine,
                    CellState::Unknown => CellState::Revealed,
                    CellState::ExplodedMine => CellState::ExplodedMine,
                    CellState::Flagged if is_mine => CellState::RevealedMine,
                    CellState::Flagged => CellState::RevealedMismatch,
                    CellState::RevealedMine | CellState::RevealedMismatch => continue,
                };
                self.states[coords.to_nd_index()] = state;
                changes.push(CellChange::new(coords, state));
            }
        }
        changes
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.grid
            .iter_neighbors(coords)
            .filter(|&pos| self.states[pos.to_nd_index()] == CellState::Flagged)
            .count()
            .try_into()
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(height: Coord, width: Coord, mines: &[Coord2]) -> Board {
        Board::from_grid(MineGrid::from_mine_positions(height, width, mines).unwrap())
    }

    #[test]
    fn new_board_starts_fully_unknown() {
        let board = Board::new(5, 6, 10).unwrap();

        assert_eq!(board.mine_count(), 10);
        assert_eq!(board.cells_to_reveal(), 30);
        assert_eq!(board.left_to_discover(), 20);
        assert!(!board.all_revealed());
        for row in 0..5 {
            for column in 0..6 {
                assert_eq!(board.state_at(row, column), Some(CellState::Unknown));
            }
        }
    }

    #[test]
    fn new_rejects_zero_dimensions() {
        assert_eq!(
            Board::new(0, 6, 1).unwrap_err(),
            GameError::InvalidDimension("height")
        );
        assert_eq!(
            Board::new(5, 0, 1).unwrap_err(),
            GameError::InvalidDimension("width")
        );
    }

    #[test]
    fn revealing_a_mineless_board_opens_everything_at_once() {
        let mut board = board(5, 6, &[]);

        let changes = board.reveal(2, 2);

        assert_eq!(changes.len(), 30);
        assert!(changes.iter().all(|c| c.state == CellState::Revealed));
        assert!(board.all_revealed());
        assert_eq!(board.left_to_discover(), 0);
    }

    #[test]
    fn flood_fill_stops_at_numbered_cells() {
        let mut board = board(1, 5, &[(0, 2)]);

        let changes = board.reveal(0, 0);

        assert_eq!(
            changes,
            vec![
                CellChange {
                    row: 0,
                    column: 0,
                    state: CellState::Revealed
                },
                CellChange {
                    row: 0,
                    column: 1,
                    state: CellState::Revealed
                },
            ]
        );
        assert_eq!(board.state_at(0, 3), Some(CellState::Unknown));
        assert_eq!(board.left_to_discover(), 2);
        assert!(!board.all_revealed());
    }

    #[test]
    fn revealing_the_last_safe_cell_sweeps_the_mines_open() {
        let mut board = board(5, 6, &[(2, 3)]);

        let changes = board.reveal(0, 0);

        assert_eq!(changes.len(), 30);
        assert_eq!(
            changes
                .iter()
                .filter(|c| c.state == CellState::Revealed)
                .count(),
            29
        );
        assert_eq!(
            *changes.last().unwrap(),
            CellChange {
                row: 2,
                column: 3,
                state: CellState::RevealedMine
            }
        );
        assert_eq!(board.state_at(2, 3), Some(CellState::RevealedMine));
        assert!(board.all_revealed());
    }

    #[test]
    fn hitting_a_mine_sweeps_the_whole_board() {
        let mut board = board(2, 2, &[(0, 0), (0, 1)]);
        board.toggle_flag(0, 0);
        board.toggle_flag(1, 0);

        let changes = board.reveal(0, 1);

        assert_eq!(
            changes,
            vec![
                CellChange {
                    row: 0,
                    column: 0,
                    state: CellState::RevealedMine
                },
                CellChange {
                    row: 0,
                    column: 1,
                    state: CellState::ExplodedMine
                },
                CellChange {
                    row: 1,
                    column: 0,
                    state: CellState::RevealedMismatch
                },
                CellChange {
                    row: 1,
                    column: 1,
                    state: CellState::Revealed
                },
            ]
        );
        assert_eq!(board.state_at(0, 1), Some(CellState::ExplodedMine));
    }

    #[test]
    fn operations_after_the_sweep_are_noops() {
        let mut board = board(2, 2, &[(0, 0)]);

        board.reveal(0, 0);

        assert_eq!(board.reveal(1, 1), vec![]);
        assert_eq!(board.toggle_flag(1, 1), FlagOutcome::NotApplicable);
    }

    #[test]
    fn flagged_cells_cannot_be_revealed() {
        let mut board = board(2, 2, &[(0, 0)]);
        board.toggle_flag(1, 1);

        assert_eq!(board.reveal(1, 1), vec![]);
        assert_eq!(board.state_at(1, 1), Some(CellState::Flagged));
    }

    #[test]
    fn revealing_twice_is_a_noop() {
        let mut board = board(2, 2, &[(0, 0)]);

        assert_eq!(board.reveal(0, 1).len(), 1);
        assert_eq!(board.reveal(0, 1), vec![]);
    }

    #[test]
    fn out_of_range_coordinates_are_ignored() {
        let mut board = board(2, 2, &[(0, 0)]);

        assert_eq!(board.reveal(9, 9), vec![]);
        assert_eq!(board.toggle_flag(9, 9), FlagOutcome::NotApplicable);
        assert_eq!(board.state_at(9, 9), None);
        assert_eq!(board.cell_value(9, 9), None);
    }

    #[test]
    fn toggle_flag_round_trips_to_unknown() {
        let mut board = board(2, 2, &[(0, 0)]);

        assert_eq!(board.toggle_flag(1, 1), FlagOutcome::Flagged);
        assert_eq!(board.state_at(1, 1), Some(CellState::Flagged));
        assert_eq!(board.flags_placed(), 1);

        assert_eq!(board.toggle_flag(1, 1), FlagOutcome::Unflagged);
        assert_eq!(board.state_at(1, 1), Some(CellState::Unknown));
        assert_eq!(board.flags_placed(), 0);
    }

    #[test]
    fn toggle_flag_on_a_revealed_cell_is_not_applicable() {
        let mut board = board(2, 2, &[(0, 0)]);
        board.reveal(1, 1);

        assert_eq!(board.toggle_flag(1, 1), FlagOutcome::NotApplicable);
        assert_eq!(board.state_at(1, 1), Some(CellState::Revealed));
    }

    #[test]
    fn left_to_discover_counts_down_to_the_win() {
        let mut board = board(1, 5, &[(0, 2)]);
        assert_eq!(board.left_to_discover(), 4);

        board.reveal(0, 0);
        assert_eq!(board.left_to_discover(), 2);

        board.reveal(0, 3);
        assert_eq!(board.left_to_discover(), 1);
        assert!(!board.all_revealed());

        let changes = board.reveal(0, 4);
        assert_eq!(board.left_to_discover(), 0);
        assert!(board.all_revealed());
        assert_eq!(
            *changes.last().unwrap(),
            CellChange {
                row: 0,
                column: 2,
                state: CellState::RevealedMine
            }
        );
    }

    #[test]
    fn mines_unflagged_follows_the_flag_count() {
        let mut board = board(2, 2, &[(0, 0)]);
        assert_eq!(board.mines_unflagged(), 1);

        board.toggle_flag(0, 0);
        assert_eq!(board.mines_unflagged(), 0);

        board.toggle_flag(1, 1);
        assert_eq!(board.mines_unflagged(), -1);
    }

    #[test]
    fn chord_reveal_opens_the_unflagged_neighbors() {
        let mut board = board(3, 3, &[(0, 1), (2, 1)]);
        board.reveal(1, 1);
        board.toggle_flag(0, 1);
        board.toggle_flag(2, 1);

        let changes = board.chord_reveal(1, 1);

        assert!(!changes.is_empty());
        assert!(board.all_revealed());
        assert_eq!(board.state_at(1, 0), Some(CellState::Revealed));
        assert_eq!(board.state_at(1, 2), Some(CellState::Revealed));
        assert_eq!(board.state_at(0, 1), Some(CellState::RevealedMine));
        assert_eq!(board.state_at(2, 1), Some(CellState::RevealedMine));
    }

    #[test]
    fn chord_reveal_explodes_a_mine_behind_a_wrong_flag() {
        let mut board = board(3, 3, &[(0, 0)]);
        board.reveal(1, 1);
        board.toggle_flag(0, 1);

        let changes = board.chord_reveal(1, 1);

        assert!(!changes.is_empty());
        assert_eq!(board.state_at(0, 0), Some(CellState::ExplodedMine));
        assert_eq!(board.state_at(0, 1), Some(CellState::RevealedMismatch));
    }

    #[test]
    fn chord_reveal_without_matching_flags_is_a_noop() {
        let mut board = board(3, 3, &[(0, 1), (2, 1)]);
        board.reveal(1, 1);
        board.toggle_flag(0, 1);

        assert_eq!(board.chord_reveal(1, 1), vec![]);
    }

    #[test]
    fn chord_reveal_on_an_unrevealed_cell_is_a_noop() {
        let mut board = board(3, 3, &[(0, 1), (2, 1)]);

        assert_eq!(board.chord_reveal(1, 1), vec![]);
    }

    #[test]
    fn board_round_trips_through_json() {
        let mut board = board(3, 3, &[(0, 1)]);
        board.toggle_flag(0, 1);
        board.reveal(2, 0);

        let encoded = serde_json::to_string(&board).unwrap();
        let decoded: Board = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, board);
    }
}
