use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::Observation;
use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HintKind {
    /// The target cannot be a mine.
    Safe,
    /// The target must be a mine.
    Mine,
}

/// A move certified by a single revealed number. Recomputed on demand, never stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    pub target: Coord2,
    pub kind: HintKind,
    /// The numbered cell whose constraint proves the move.
    pub evidence: Coord2,
}

impl Hint {
    /// The environment action that carries out this hint.
    pub const fn action(&self) -> Action {
        let kind = match self.kind {
            HintKind::Safe => ActionKind::Reveal,
            HintKind::Mine => ActionKind::Flag,
        };
        Action {
            coords: self.target,
            kind,
        }
    }
}

/// Local view around one revealed number.
#[derive(Clone, Debug)]
struct Clue {
    coords: Coord2,
    count: u8,
    flagged: u8,
    /// Hidden, unflagged neighbors in offset order.
    hidden: SmallVec<[Coord2; 8]>,
}

impl Clue {
    /// Every remaining neighbor is safe: the flags already account for the number.
    fn all_safe(&self) -> bool {
        self.flagged == self.count && !self.hidden.is_empty()
    }

    /// Every remaining neighbor is a mine: there are exactly as many as the number still needs.
    fn all_mines(&self) -> bool {
        !self.hidden.is_empty()
            && self.count >= self.flagged
            && self.hidden.len() == usize::from(self.count - self.flagged)
    }
}

fn clues(obs: &Observation) -> impl Iterator<Item = Clue> + '_ {
    iter_coords(obs.size).filter_map(move |coords| {
        let CellView::Revealed(count) = obs.view_at(coords) else {
            return None;
        };
        if count == 0 {
            return None;
        }

        let mut flagged = 0;
        let mut hidden = SmallVec::new();
        for neighbor in obs.iter_neighbors(coords) {
            match obs.view_at(neighbor) {
                CellView::Flagged => flagged += 1,
                CellView::Hidden => hidden.push(neighbor),
                CellView::Revealed(_) | CellView::Mine => {}
            }
        }

        Some(Clue {
            coords,
            count,
            flagged,
            hidden,
        })
    })
}

/// Finds at most one certain move from single-number constraints.
///
/// The whole board is scanned for a safe cell before any mine is reported, so a safe move
/// anywhere wins over a mine move anywhere. Within a pass, numbers are visited in row-major
/// order and the first hidden neighbor in offset order is returned.
///
/// Cross-number reasoning is out of scope: a `None` does not mean no certain move exists. Flags
/// are trusted, so the answer is only sound while every flag sits on a mine.
pub fn find_certain_move(obs: &Observation) -> Option<Hint> {
    find_safe(obs).or_else(|| find_mine(obs))
}

pub fn find_safe(obs: &Observation) -> Option<Hint> {
    clues(obs).find(Clue::all_safe).map(|clue| Hint {
        target: clue.hidden[0],
        kind: HintKind::Safe,
        evidence: clue.coords,
    })
}

pub fn find_mine(obs: &Observation) -> Option<Hint> {
    clues(obs).find(Clue::all_mines).map(|clue| Hint {
        target: clue.hidden[0],
        kind: HintKind::Mine,
        evidence: clue.coords,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use ndarray::Array2;

    /// Builds an observation from rows of `.` hidden, `F` flagged, `0`-`8` revealed.
    fn obs(rows: &[&str]) -> Observation {
        let size = (rows.len() as Coord, rows[0].len() as Coord);
        let cells: Vec<_> = rows
            .iter()
            .flat_map(|row| row.chars())
            .map(|ch| match ch {
                '.' => CellView::Hidden,
                'F' => CellView::Flagged,
                '*' => CellView::Mine,
                digit => CellView::Revealed(digit.to_digit(10).unwrap() as u8),
            })
            .collect();
        let cells = Array2::from_shape_vec(size.to_nd_index(), cells).unwrap();
        Observation::new(size, None, cells).unwrap()
    }

    #[test]
    fn satisfied_number_marks_neighbors_safe() {
        let obs = obs(&["F1.", "...", "..."]);

        assert_eq!(
            find_certain_move(&obs),
            Some(Hint {
                target: (0, 2),
                kind: HintKind::Safe,
                evidence: (0, 1),
            })
        );
    }

    #[test]
    fn safe_target_follows_offset_order() {
        let obs = obs(&["...", ".1F", "..."]);

        assert_eq!(find_certain_move(&obs).map(|hint| hint.target), Some((0, 0)));
    }

    #[test]
    fn saturated_number_marks_neighbors_as_mines() {
        let obs = obs(&["2.", "1."]);

        assert_eq!(
            find_certain_move(&obs),
            Some(Hint {
                target: (0, 1),
                kind: HintKind::Mine,
                evidence: (0, 0),
            })
        );
    }

    #[test]
    fn flags_reduce_mines_still_needed() {
        let obs = obs(&["F2."]);

        let hint = find_certain_move(&obs).unwrap();

        assert_eq!(hint.kind, HintKind::Mine);
        assert_eq!(hint.target, (0, 2));
    }

    #[test]
    fn safe_pass_completes_before_mine_pass() {
        // (0,0) proves a mine first in row-major order, (0,4) proves a safe cell later
        let obs = obs(&["1.2F1."]);

        let hint = find_certain_move(&obs).unwrap();

        assert_eq!(hint.kind, HintKind::Safe);
        assert_eq!(hint.target, (0, 5));
        assert_eq!(hint.evidence, (0, 4));
        assert_eq!(find_mine(&obs).map(|hint| hint.evidence), Some((0, 0)));
    }

    #[test]
    fn no_move_without_certainty() {
        let obs = obs(&["1..", "...", "..."]);

        assert_eq!(find_certain_move(&obs), None);
    }

    #[test]
    fn zero_and_hidden_cells_are_not_evidence() {
        let obs = obs(&["...", ".0.", "..."]);

        assert_eq!(find_certain_move(&obs), None);
    }

    #[test]
    fn over_flagged_number_proves_nothing() {
        let obs = obs(&["FF.", "1..", "..."]);

        assert_eq!(find_certain_move(&obs), None);
    }

    #[test]
    fn hint_maps_to_action() {
        let safe = Hint {
            target: (1, 2),
            kind: HintKind::Safe,
            evidence: (0, 0),
        };
        let mine = Hint {
            kind: HintKind::Mine,
            ..safe
        };

        assert_eq!(safe.action().kind, ActionKind::Reveal);
        assert_eq!(mine.action().kind, ActionKind::Flag);
        assert_eq!(mine.action().coords, (1, 2));
    }
}
