use serde::{Deserialize, Serialize};

/// Mutable play state of a cell. `Revealed` and `Flagged` are mutually exclusive by construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Hidden,
    Revealed,
    Flagged,
}

impl Default for CellState {
    fn default() -> Self {
        Self::Hidden
    }
}

/// Plain per-cell data owned by [`crate::Board`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub is_mine: bool,
    /// Mines among the up-to-8 neighbors, fixed once mines are placed.
    pub adjacent_mines: u8,
    pub state: CellState,
}

impl Cell {
    pub const fn is_hidden(self) -> bool {
        matches!(self.state, CellState::Hidden)
    }

    pub const fn is_revealed(self) -> bool {
        matches!(self.state, CellState::Revealed)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self.state, CellState::Flagged)
    }

    /// The part of the cell a player is allowed to see.
    pub const fn view(self) -> CellView {
        match (self.state, self.is_mine) {
            (CellState::Hidden, _) => CellView::Hidden,
            (CellState::Flagged, _) => CellView::Flagged,
            (CellState::Revealed, true) => CellView::Mine,
            (CellState::Revealed, false) => CellView::Revealed(self.adjacent_mines),
        }
    }
}

/// Canonical player-visible state, as consumed by the solver and the tensor encoder.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Flagged,
    Revealed(u8),
    /// A mine disclosed after the game was lost.
    Mine,
}

impl CellView {
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }
}

impl Default for CellView {
    fn default() -> Self {
        Self::Hidden
    }
}
