use alloc::collections::{BTreeSet, VecDeque};
use alloc::vec::Vec;
use chrono::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - InProgress -> Won
/// - InProgress -> Lost
///
/// Both terminal states are absorbing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        Self::InProgress
    }
}

/// Represents a game from start to finish
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayEngine {
    board: Board,
    placement: MinePlacement,
    status: GameStatus,
    revealed_count: CellCount,
    flagged_count: CellCount,
    triggered_mine: Option<Coord2>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl PlayEngine {
    /// A game whose mines are drawn from `seed` on the first reveal.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self> {
        Self::with_placement(config, MinePlacement::Random { seed })
    }

    /// A game over a predetermined layout.
    pub fn with_layout(layout: MineLayout) -> Result<Self> {
        Self::with_placement(layout.game_config(), MinePlacement::Fixed(layout))
    }

    pub fn with_placement(config: GameConfig, placement: MinePlacement) -> Result<Self> {
        Ok(Self {
            board: Board::new(config)?,
            placement,
            status: Default::default(),
            revealed_count: 0,
            flagged_count: 0,
            triggered_mine: None,
            started_at: None,
            ended_at: None,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn size(&self) -> Coord2 {
        self.board.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.board.mine_count()
    }

    /// Revealed non-mine cells so far.
    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    /// Mines minus flags. Flags are not capped, so this goes negative when over-flagged.
    pub fn flags_left(&self) -> isize {
        (self.board.mine_count() as isize) - (self.flagged_count as isize)
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.board.cell_at(coords)
    }

    pub fn view_at(&self, coords: Coord2) -> CellView {
        self.board.view_at(coords)
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// How many seconds have passed since the first reveal, 0 if it hasn't happened
    pub fn elapsed_secs(&self) -> u32 {
        if let Some(started_at) = self.started_at {
            (self.ended_at.unwrap_or_else(Utc::now) - started_at)
                .num_seconds()
                .max(0) as u32
        } else {
            0
        }
    }

    pub fn observe(&self) -> Observation {
        Observation::from_board(&self.board)
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<Update<MarkOutcome>> {
        use CellState::*;

        let coords = self.board.validate_coords(coords)?;
        if self.status.is_finished() {
            return Ok(Update::unchanged(MarkOutcome::NoChange));
        }

        let next = match self.board.cell_at(coords).state {
            Hidden => {
                self.flagged_count += 1;
                Flagged
            }
            Flagged => {
                self.flagged_count -= 1;
                Hidden
            }
            Revealed => return Ok(Update::unchanged(MarkOutcome::NoChange)),
        };
        self.board.set_state(coords, next);
        log::trace!("Flag toggled at {:?}, flags left: {}", coords, self.flags_left());

        Ok(Update {
            outcome: MarkOutcome::Changed,
            changes: Vec::from([CellChange {
                coords,
                view: self.board.view_at(coords),
            }]),
        })
    }

    /// Reveals a hidden cell, cascading through zero-count regions. Flagged or revealed cells and
    /// finished games are left untouched.
    pub fn reveal(&mut self, coords: Coord2) -> Result<Update<RevealOutcome>> {
        let coords = self.board.validate_coords(coords)?;

        if self.status.is_finished() || !self.board.cell_at(coords).is_hidden() {
            return Ok(Update::unchanged(RevealOutcome::NoChange));
        }

        if !self.board.mines_placed() {
            self.board.place_mines(coords, &mut self.placement)?;
            self.mark_started();
        }

        Ok(self.reveal_single_cell(coords))
    }

    fn reveal_single_cell(&mut self, coords: Coord2) -> Update<RevealOutcome> {
        let mut changes = Vec::new();
        let cell = self.board.cell_at(coords);

        if cell.is_mine {
            self.board.set_state(coords, CellState::Revealed);
            changes.push(CellChange {
                coords,
                view: CellView::Mine,
            });
            self.triggered_mine = Some(coords);
            self.end_game(false, &mut changes);
            return Update {
                outcome: RevealOutcome::HitMine,
                changes,
            };
        }

        self.open(coords, &mut changes);

        // breadth-first: the work-list is a FIFO queue, so changes come out in ring order
        if cell.adjacent_mines == 0 {
            let mut visited = BTreeSet::from([coords]);
            let mut to_visit: VecDeque<_> = self.hidden_neighbors(coords).collect();
            log::trace!(
                "Starting flood-fill from {:?}, initial neighbors: {:?}",
                coords,
                to_visit
            );

            while let Some(visit_coords) = to_visit.pop_front() {
                if !visited.insert(visit_coords) {
                    continue;
                }

                // skip flagged or already opened cells
                if !self.board.cell_at(visit_coords).is_hidden() {
                    continue;
                }

                let visit_count = self.open(visit_coords, &mut changes);

                // if this is also zero we visit the neighbors
                if visit_count == 0 {
                    to_visit.extend(
                        self.hidden_neighbors(visit_coords)
                            .filter(|pos| !visited.contains(pos)),
                    );
                }
            }
        }

        let won = self.revealed_count == self.board.config().safe_cells();
        debug_assert_eq!(won, self.board.all_safe_revealed());

        if won {
            self.end_game(true, &mut changes);
            Update {
                outcome: RevealOutcome::Won,
                changes,
            }
        } else {
            Update {
                outcome: RevealOutcome::Revealed,
                changes,
            }
        }
    }

    /// Reveals one non-mine cell and returns its count.
    fn open(&mut self, coords: Coord2, changes: &mut Vec<CellChange>) -> u8 {
        let count = self.board.cell_at(coords).adjacent_mines;
        self.board.set_state(coords, CellState::Revealed);
        self.revealed_count += 1;
        changes.push(CellChange {
            coords,
            view: CellView::Revealed(count),
        });
        log::trace!("Opened cell at {:?}, mine count: {}", coords, count);
        count
    }

    fn hidden_neighbors(&self, coords: Coord2) -> impl Iterator<Item = Coord2> + use<'_> {
        self.board
            .iter_neighbors(coords)
            .filter(|&pos| self.board.cell_at(pos).is_hidden())
    }

    fn mark_started(&mut self) {
        if self.started_at.is_none() {
            let now = Utc::now();
            log::debug!("started at {}", now);
            self.started_at = Some(now);
        }
    }

    fn end_game(&mut self, won: bool, changes: &mut Vec<CellChange>) {
        if self.status.is_finished() {
            return;
        }

        self.status = if won {
            GameStatus::Won
        } else {
            GameStatus::Lost
        };
        let now = Utc::now();
        self.ended_at = Some(now);
        log::debug!("ended at {} with {:?}", now, self.status);

        if !won {
            self.disclose_mines(changes);
        }
    }

    /// Reveals every hidden mine. Flagged mines keep their flag.
    fn disclose_mines(&mut self, changes: &mut Vec<CellChange>) {
        let hidden_mines: Vec<_> = self
            .board
            .iter_cells()
            .filter(|(_, cell)| cell.is_mine && cell.is_hidden())
            .map(|(coords, _)| coords)
            .collect();

        for coords in hidden_mines {
            self.board.set_state(coords, CellState::Revealed);
            changes.push(CellChange {
                coords,
                view: CellView::Mine,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(size: Coord2, mines: &[Coord2]) -> PlayEngine {
        PlayEngine::with_layout(MineLayout::from_mine_coords(size, mines).unwrap()).unwrap()
    }

    #[test]
    fn first_reveal_places_mines() {
        let mut engine = PlayEngine::new(GameConfig::new((5, 5), 24).unwrap(), 9).unwrap();

        assert!(!engine.board().mines_placed());
        let update = engine.reveal((2, 2)).unwrap();

        assert!(engine.board().mines_placed());
        assert_eq!(update.outcome, RevealOutcome::Won);
        assert_eq!(engine.view_at((2, 2)), CellView::Revealed(8));
        assert!(engine.started_at().is_some());
    }

    #[test]
    fn reveal_hits_mine_and_discloses_all_mines() {
        let mut engine = engine((3, 3), &[(0, 0), (2, 2), (0, 2)]);

        engine.reveal((1, 1)).unwrap();
        engine.toggle_flag((0, 2)).unwrap();
        let update = engine.reveal((0, 0)).unwrap();

        assert_eq!(update.outcome, RevealOutcome::HitMine);
        assert_eq!(engine.status(), GameStatus::Lost);
        assert_eq!(engine.triggered_mine(), Some((0, 0)));
        assert_eq!(
            update.changes,
            Vec::from([
                CellChange { coords: (0, 0), view: CellView::Mine },
                CellChange { coords: (2, 2), view: CellView::Mine },
            ])
        );
        assert_eq!(engine.view_at((0, 2)), CellView::Flagged);
        assert!(engine.ended_at().is_some());
    }

    #[test]
    fn reveal_flood_fill_opens_zero_region() {
        let mut engine = engine((3, 3), &[(2, 2)]);

        let update = engine.reveal((0, 0)).unwrap();

        assert_eq!(update.outcome, RevealOutcome::Won);
        assert_eq!(engine.view_at((0, 0)), CellView::Revealed(0));
        assert_eq!(engine.view_at((1, 1)), CellView::Revealed(1));
        assert_eq!(engine.view_at((2, 2)), CellView::Hidden);
        assert_eq!(update.changes.len(), 8);
        assert_eq!(update.changes[0].coords, (0, 0));
    }

    #[test]
    fn cascade_is_breadth_first() {
        let mut engine = engine((1, 5), &[(0, 4)]);

        let update = engine.reveal((0, 0)).unwrap();
        let order: Vec<_> = update.changes.iter().map(|change| change.coords).collect();

        assert_eq!(order, Vec::from([(0, 0), (0, 1), (0, 2), (0, 3)]));
        assert_eq!(engine.view_at((0, 3)), CellView::Revealed(1));
    }

    #[test]
    fn cascade_skips_flagged_cells() {
        let mut engine = engine((1, 5), &[(0, 4)]);

        engine.toggle_flag((0, 2)).unwrap();
        let update = engine.reveal((0, 0)).unwrap();

        assert_eq!(update.outcome, RevealOutcome::Revealed);
        assert_eq!(engine.view_at((0, 1)), CellView::Revealed(0));
        assert_eq!(engine.view_at((0, 2)), CellView::Flagged);
        assert_eq!(engine.view_at((0, 3)), CellView::Hidden);
    }

    #[test]
    fn reveal_is_idempotent() {
        let mut engine = engine((4, 4), &[(3, 3), (0, 3)]);

        engine.reveal((1, 2)).unwrap();
        let once = engine.clone();
        let update = engine.reveal((1, 2)).unwrap();

        assert_eq!(update, Update::unchanged(RevealOutcome::NoChange));
        assert_eq!(engine, once);
    }

    #[test]
    fn reveal_ignores_flagged_cell() {
        let mut engine = engine((2, 2), &[(0, 0)]);

        engine.toggle_flag((1, 1)).unwrap();
        let update = engine.reveal((1, 1)).unwrap();

        assert_eq!(update.outcome, RevealOutcome::NoChange);
        assert!(!engine.board().mines_placed());
    }

    #[test]
    fn toggle_flag_tracks_remaining_flags() {
        let mut engine = engine((2, 3), &[(0, 0)]);

        assert_eq!(engine.flags_left(), 1);
        let update = engine.toggle_flag((1, 1)).unwrap();
        assert_eq!(update.outcome, MarkOutcome::Changed);
        assert_eq!(update.changes[0].view, CellView::Flagged);
        engine.toggle_flag((1, 2)).unwrap();
        assert_eq!(engine.flags_left(), -1);

        engine.toggle_flag((1, 2)).unwrap();
        assert_eq!(engine.view_at((1, 2)), CellView::Hidden);
        assert_eq!(engine.flags_left(), 0);
        assert_eq!(engine.flagged_count(), engine.board().flagged_count());
    }

    #[test]
    fn toggle_flag_ignores_revealed_cells() {
        let mut engine = engine((2, 2), &[(0, 0)]);

        engine.reveal((1, 1)).unwrap();
        let update = engine.toggle_flag((1, 1)).unwrap();

        assert_eq!(update.outcome, MarkOutcome::NoChange);
        assert_eq!(engine.view_at((1, 1)), CellView::Revealed(1));
    }

    #[test]
    fn finished_game_accepts_no_mutation() {
        let mut engine = engine((2, 1), &[(0, 0)]);

        assert_eq!(engine.reveal((1, 0)).unwrap().outcome, RevealOutcome::Won);
        let won = engine.clone();

        assert_eq!(engine.reveal((0, 0)).unwrap().outcome, RevealOutcome::NoChange);
        assert_eq!(engine.toggle_flag((0, 0)).unwrap().outcome, MarkOutcome::NoChange);
        assert_eq!(engine, won);
        assert_eq!(engine.status(), GameStatus::Won);
    }

    #[test]
    fn out_of_bounds_coords_are_rejected() {
        let mut engine = engine((2, 2), &[(0, 0)]);

        assert_eq!(engine.reveal((2, 0)), Err(GameError::InvalidCoords));
        assert_eq!(engine.toggle_flag((0, 2)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn elapsed_is_zero_before_start() {
        let engine = engine((2, 2), &[(0, 0)]);

        assert_eq!(engine.elapsed_secs(), 0);
        assert_eq!(engine.started_at(), None);
    }
}
