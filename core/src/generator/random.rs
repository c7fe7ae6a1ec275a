use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::*;

/// Uniform placement: `mines` distinct cells drawn without replacement from every cell except the
/// excluded one.
#[derive(Clone, Debug)]
pub struct RandomMineGenerator {
    rng: SmallRng,
}

impl RandomMineGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl MineGenerator for RandomMineGenerator {
    fn generate(&mut self, config: GameConfig, exclude: Coord2) -> Result<MineLayout> {
        let config = config.validated()?;
        let (rows, cols) = config.size;
        if exclude.0 >= rows || exclude.1 >= cols {
            return Err(GameError::InvalidCoords);
        }

        let cols = usize::from(cols);
        let free_cells = usize::from(config.total_cells()) - 1;
        let excluded = usize::from(exclude.0) * cols + usize::from(exclude.1);

        let mut mine_mask: Array2<bool> = Array2::default(config.size.to_nd_index());
        // indices are drawn over the board with the excluded cell removed, then shifted back
        for index in rand::seq::index::sample(&mut self.rng, free_cells, config.mines.into()) {
            let index = if index >= excluded { index + 1 } else { index };
            mine_mask[[index / cols, index % cols]] = true;
        }

        let layout = MineLayout::from_mine_mask(mine_mask);
        log::debug!(
            "Placed {} mines on {:?} avoiding {:?}",
            layout.mine_count(),
            config.size,
            exclude
        );
        Ok(layout)
    }
}
