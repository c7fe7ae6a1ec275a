use thiserror::Error;

use crate::CellCount;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Too many mines: {mines} requested but the board only has {cells} cells")]
    TooManyMines { mines: CellCount, cells: CellCount },
    #[error("Board must have at least one row and one column")]
    EmptyBoard,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Environment has not been reset yet")]
    NotReset,
    #[error("Action {action} is outside the action space of size {size}")]
    InvalidAction { action: usize, size: usize },
    #[error("Mine layout places a mine under the first revealed cell")]
    StartOnMine,
    #[error("Policy produced {actual} action values, expected {expected}")]
    PolicyShape { expected: usize, actual: usize },
    #[error("All {limit} hints for this game have been used")]
    HintsExhausted { limit: u8 },
}

/// Coarse classification of [`GameError`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The board could not be set up; nothing was created.
    Configuration,
    /// The call is not valid in the current lifecycle state; nothing changed.
    InvalidState,
    /// The call carried an argument outside its domain.
    InvalidInput,
}

impl GameError {
    pub const fn kind(self) -> ErrorKind {
        use GameError::*;
        match self {
            TooManyMines { .. } | EmptyBoard | StartOnMine => ErrorKind::Configuration,
            AlreadyEnded | NotReset | HintsExhausted { .. } => ErrorKind::InvalidState,
            InvalidCoords | InvalidBoardShape | InvalidAction { .. } | PolicyShape { .. } => {
                ErrorKind::InvalidInput
            }
        }
    }
}

pub type Result<T> = core::result::Result<T, GameError>;
