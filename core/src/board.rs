use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// The grid of cells for one game. Mines are absent until [`Board::place_mines`] runs, which
/// happens exactly once, on the first reveal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    config: GameConfig,
    cells: Array2<Cell>,
    mines_placed: bool,
}

impl Board {
    pub fn new(config: GameConfig) -> Result<Self> {
        let config = config.validated()?;
        Ok(Self {
            config,
            cells: Array2::default(config.size.to_nd_index()),
            mines_placed: false,
        })
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn mine_count(&self) -> CellCount {
        self.config.mines
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.cells[coords.to_nd_index()]
    }

    pub fn view_at(&self, coords: Coord2) -> CellView {
        self.cell_at(coords).view()
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size())
    }

    /// Every `(coords, cell)` pair in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        iter_coords(self.size()).map(|coords| (coords, self.cell_at(coords)))
    }

    /// Places mines away from `exclude` and fills in adjacency counts. Returns `Ok(false)`
    /// without touching anything when mines were already placed.
    pub fn place_mines<G: MineGenerator>(
        &mut self,
        exclude: Coord2,
        mut generator: G,
    ) -> Result<bool> {
        if self.mines_placed {
            return Ok(false);
        }
        let exclude = self.validate_coords(exclude)?;

        let layout = generator.generate(self.config, exclude)?;
        if layout.size() != self.size() {
            return Err(GameError::InvalidBoardShape);
        }
        if layout.contains_mine(exclude) {
            return Err(GameError::StartOnMine);
        }
        if layout.mine_count() != self.config.mines {
            log::warn!(
                "Layout carries {} mines, board was configured for {}",
                layout.mine_count(),
                self.config.mines
            );
            self.config.mines = layout.mine_count();
        }

        for coords in iter_coords(self.size()) {
            let cell = &mut self.cells[coords.to_nd_index()];
            cell.is_mine = layout.contains_mine(coords);
            cell.adjacent_mines = if cell.is_mine {
                0
            } else {
                layout.adjacent_mine_count(coords)
            };
        }
        self.mines_placed = true;

        Ok(true)
    }

    pub(crate) fn set_state(&mut self, coords: Coord2, state: CellState) {
        self.cells[coords.to_nd_index()].state = state;
    }

    /// Exhaustive count of revealed non-mine cells.
    pub fn revealed_safe_count(&self) -> CellCount {
        let count = self
            .cells
            .iter()
            .filter(|cell| cell.is_revealed() && !cell.is_mine)
            .count();
        CellCount::try_from(count).unwrap_or(CellCount::MAX)
    }

    pub fn flagged_count(&self) -> CellCount {
        let count = self.cells.iter().filter(|cell| cell.is_flagged()).count();
        CellCount::try_from(count).unwrap_or(CellCount::MAX)
    }

    /// Exhaustive win condition: every non-mine cell is revealed.
    pub fn all_safe_revealed(&self) -> bool {
        self.mines_placed
            && self
                .cells
                .iter()
                .all(|cell| cell.is_mine || cell.is_revealed())
    }
}
