use serde::{Deserialize, Serialize};

use crate::*;
pub use random::*;

mod random;

/// Source of mine layouts. Called once per game, on the first reveal, with the revealed cell
/// as `exclude`; the returned layout must never have a mine there.
pub trait MineGenerator {
    fn generate(&mut self, config: GameConfig, exclude: Coord2) -> Result<MineLayout>;
}

impl<G: MineGenerator + ?Sized> MineGenerator for &mut G {
    fn generate(&mut self, config: GameConfig, exclude: Coord2) -> Result<MineLayout> {
        (**self).generate(config, exclude)
    }
}

/// A predetermined layout, used for replays and tests.
impl MineGenerator for MineLayout {
    fn generate(&mut self, config: GameConfig, exclude: Coord2) -> Result<MineLayout> {
        if self.size() != config.size {
            log::warn!(
                "Fixed layout size {:?} does not match board size {:?}",
                self.size(),
                config.size
            );
            return Err(GameError::InvalidBoardShape);
        }
        if self.contains_mine(exclude) {
            log::warn!("Fixed layout has a mine under the first reveal at {:?}", exclude);
            return Err(GameError::StartOnMine);
        }
        Ok(self.clone())
    }
}

/// Serializable description of how a game gets its mines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MinePlacement {
    Random { seed: u64 },
    Fixed(MineLayout),
}

impl MineGenerator for MinePlacement {
    fn generate(&mut self, config: GameConfig, exclude: Coord2) -> Result<MineLayout> {
        match self {
            Self::Random { seed } => RandomMineGenerator::new(*seed).generate(config, exclude),
            Self::Fixed(layout) => layout.generate(config, exclude),
        }
    }
}
