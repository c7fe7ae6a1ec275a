use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Player-visible snapshot of a board: no mine positions, only what has been revealed or flagged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub size: Coord2,
    pub mine_count: Option<CellCount>,
    pub cells: Array2<CellView>,
}

impl Observation {
    pub fn new(
        size: Coord2,
        mine_count: Option<CellCount>,
        cells: Array2<CellView>,
    ) -> Result<Self> {
        let obs = Self {
            size,
            mine_count,
            cells,
        };
        obs.validate()?;
        Ok(obs)
    }

    pub fn from_board(board: &Board) -> Self {
        Self::from_board_with_mine_count(board, Some(board.mine_count()))
    }

    pub fn from_board_with_mine_count(board: &Board, mine_count: Option<CellCount>) -> Self {
        let size = board.size();
        let mut cells = Array2::from_elem(size.to_nd_index(), CellView::Hidden);

        for (coords, cell) in board.iter_cells() {
            cells[coords.to_nd_index()] = cell.view();
        }

        Self {
            size,
            mine_count,
            cells,
        }
    }

    /// Rebuilds the visible state from an encoded tensor. The mine count is not part of the
    /// encoding.
    pub fn from_tensor(tensor: &FeatureTensor) -> Self {
        let size = tensor.size();
        let mut cells = Array2::from_elem(size.to_nd_index(), CellView::Hidden);

        for coords in iter_coords(size) {
            cells[coords.to_nd_index()] = tensor.view_at(coords);
        }

        Self {
            size,
            mine_count: None,
            cells,
        }
    }

    pub fn view_at(&self, coords: Coord2) -> CellView {
        self.cells[coords.to_nd_index()]
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size)
    }

    pub fn validate(&self) -> Result<()> {
        let expected = (self.size.0 as usize, self.size.1 as usize);
        if self.cells.dim() != expected {
            return Err(GameError::InvalidBoardShape);
        }

        if let Some(mine_count) = self.mine_count {
            let cells = mult(self.size.0, self.size.1);
            if mine_count >= cells {
                return Err(GameError::TooManyMines {
                    mines: mine_count,
                    cells,
                });
            }
        }

        Ok(())
    }
}
