use alloc::vec::Vec;
use ndarray::{Array3, s};
use serde::{Deserialize, Serialize};

use crate::*;

/// Number of one-hot planes per cell.
pub const PLANES: usize = 12;

pub const HIDDEN_PLANE: usize = 0;
pub const FLAGGED_PLANE: usize = 1;
/// Plane of a revealed cell with count zero; a count `n` lands on `ZERO_PLANE + n`.
pub const ZERO_PLANE: usize = 2;
/// Disclosed mine, only seen after a loss.
pub const MINE_PLANE: usize = 11;

/// The single plane a visible cell state is encoded on.
pub const fn plane_of(view: CellView) -> usize {
    match view {
        CellView::Hidden => HIDDEN_PLANE,
        CellView::Flagged => FLAGGED_PLANE,
        CellView::Revealed(count) => ZERO_PLANE + count as usize,
        CellView::Mine => MINE_PLANE,
    }
}

const fn view_of(plane: usize) -> CellView {
    match plane {
        HIDDEN_PLANE => CellView::Hidden,
        FLAGGED_PLANE => CellView::Flagged,
        MINE_PLANE => CellView::Mine,
        plane => CellView::Revealed((plane - ZERO_PLANE) as u8),
    }
}

/// `(rows, cols, PLANES)` one-hot encoding of the visible board. Exactly one plane is set per
/// cell. This layout is the input contract of any external policy network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureTensor {
    planes: Array3<u8>,
}

impl FeatureTensor {
    pub fn from_observation(obs: &Observation) -> Self {
        let (rows, cols) = obs.size;
        let mut planes = Array3::zeros((usize::from(rows), usize::from(cols), PLANES));

        for coords in iter_coords(obs.size) {
            let [row, col] = coords.to_nd_index();
            planes[[row, col, plane_of(obs.view_at(coords))]] = 1;
        }

        Self { planes }
    }

    pub fn size(&self) -> Coord2 {
        let (rows, cols, _) = self.planes.dim();
        (
            Coord::try_from(rows).unwrap_or(Coord::MAX),
            Coord::try_from(cols).unwrap_or(Coord::MAX),
        )
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        self.planes.dim()
    }

    pub fn planes(&self) -> &Array3<u8> {
        &self.planes
    }

    pub fn is_set(&self, coords: Coord2, plane: usize) -> bool {
        let [row, col] = coords.to_nd_index();
        self.planes[[row, col, plane]] == 1
    }

    /// Decodes the one-hot plane of a cell.
    pub fn view_at(&self, coords: Coord2) -> CellView {
        let [row, col] = coords.to_nd_index();
        let plane = self
            .planes
            .slice(s![row, col, ..])
            .iter()
            .position(|&bit| bit == 1)
            .unwrap_or(HIDDEN_PLANE);
        view_of(plane)
    }

    /// Network input.
    pub fn to_f32(&self) -> Array3<f32> {
        self.planes.mapv(f32::from)
    }
}

/// Encodes the visible part of `board`. Pure and deterministic.
pub fn encode(board: &Board) -> FeatureTensor {
    FeatureTensor::from_observation(&Observation::from_board(board))
}

/// Legal actions over the flat action space: both the reveal and the flag action of every hidden
/// unflagged cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionMask {
    size: Coord2,
    legal: Vec<bool>,
}

impl ActionMask {
    pub fn from_tensor(tensor: &FeatureTensor) -> Self {
        let size = tensor.size();
        let mut legal = alloc::vec![false; action_space_size(size)];

        for coords in iter_coords(size) {
            if tensor.is_set(coords, HIDDEN_PLANE) {
                for kind in [ActionKind::Reveal, ActionKind::Flag] {
                    legal[Action { coords, kind }.index(size)] = true;
                }
            }
        }

        Self { size, legal }
    }

    pub fn len(&self) -> usize {
        self.legal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legal.is_empty()
    }

    pub fn is_legal(&self, index: usize) -> bool {
        self.legal.get(index).copied().unwrap_or(false)
    }

    pub fn any_legal(&self) -> bool {
        self.legal.iter().any(|&legal| legal)
    }

    pub fn legal_actions(&self) -> impl Iterator<Item = Action> + '_ {
        let size = self.size;
        self.legal
            .iter()
            .enumerate()
            .filter(|&(_, &legal)| legal)
            .filter_map(move |(index, _)| Action::from_index(index, size).ok())
    }

    /// Replaces illegal entries with negative infinity.
    pub fn apply(&self, values: &[f32]) -> Result<Vec<f32>> {
        if values.len() != self.legal.len() {
            log::warn!(
                "Policy output has {} values, action space has {}",
                values.len(),
                self.legal.len()
            );
            return Err(GameError::PolicyShape {
                expected: self.legal.len(),
                actual: values.len(),
            });
        }

        Ok(values
            .iter()
            .zip(&self.legal)
            .map(|(&value, &legal)| if legal { value } else { f32::NEG_INFINITY })
            .collect())
    }

    /// Highest-valued legal action; ties resolve to the lowest index. `None` when nothing is
    /// legal.
    pub fn argmax(&self, values: &[f32]) -> Result<Option<Action>> {
        let masked = self.apply(values)?;

        let best = masked
            .iter()
            .enumerate()
            .filter(|&(index, value)| self.legal[index] && !value.is_nan())
            .fold(None, |best: Option<(usize, f32)>, (index, &value)| match best {
                Some((_, best_value)) if best_value >= value => best,
                _ => Some((index, value)),
            });

        best.map(|(index, _)| Action::from_index(index, self.size))
            .transpose()
    }
}
