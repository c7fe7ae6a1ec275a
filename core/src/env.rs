use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Reveal = 0,
    Flag = 1,
}

/// One move on the board. Flattens to `((row * cols) + col) * 2 + kind`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub coords: Coord2,
    pub kind: ActionKind,
}

impl Action {
    pub const fn reveal(coords: Coord2) -> Self {
        Self {
            coords,
            kind: ActionKind::Reveal,
        }
    }

    pub const fn flag(coords: Coord2) -> Self {
        Self {
            coords,
            kind: ActionKind::Flag,
        }
    }

    pub fn index(self, size: Coord2) -> usize {
        let (row, col) = self.coords;
        let cell = usize::from(row) * usize::from(size.1) + usize::from(col);
        cell * 2 + self.kind as usize
    }

    pub fn from_index(index: usize, size: Coord2) -> Result<Self> {
        let space = action_space_size(size);
        if index >= space {
            return Err(GameError::InvalidAction {
                action: index,
                size: space,
            });
        }

        let cols = usize::from(size.1);
        let cell = index / 2;
        let kind = if index % 2 == 0 {
            ActionKind::Reveal
        } else {
            ActionKind::Flag
        };
        // both fit: cell < rows * cols
        let coords = ((cell / cols) as Coord, (cell % cols) as Coord);
        Ok(Self { coords, kind })
    }
}

pub fn action_space_size(size: Coord2) -> usize {
    usize::from(size.0) * usize::from(size.1) * 2
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub win: f32,
    pub loss: f32,
    /// Penalty for revealing a cell that is already revealed.
    pub already_revealed: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            win: 200.0,
            loss: -100.0,
            already_revealed: -5.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    pub game: GameConfig,
    pub rewards: RewardConfig,
    /// Seeds the per-game seed stream; drawn from the OS when absent.
    pub seed: Option<u64>,
    pub hint_limit: u8,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            rewards: RewardConfig::default(),
            seed: None,
            hint_limit: 5,
        }
    }
}

/// Result of a single [`MinesweeperEnv::step`].
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub observation: FeatureTensor,
    pub reward: f32,
    pub done: bool,
}

/// Reset/step wrapper shared by interactive front ends and autonomous players.
///
/// While a game is running the reward is the number of revealed safe cells so far, not the
/// change since the last step, so consecutive equal rewards are normal.
#[derive(Clone, Debug)]
pub struct MinesweeperEnv {
    config: EnvConfig,
    seeds: SmallRng,
    engine: Option<PlayEngine>,
    game_seed: Option<u64>,
    done: bool,
    hints_used: u8,
}

impl MinesweeperEnv {
    pub fn new(config: EnvConfig) -> Result<Self> {
        config.game.validated()?;
        let seeds = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Ok(Self {
            config,
            seeds,
            engine: None,
            game_seed: None,
            done: false,
            hints_used: 0,
        })
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Size of the board in play, or of the configured board before the first reset.
    pub fn board_size(&self) -> Coord2 {
        self.engine
            .as_ref()
            .map_or(self.config.game.size, PlayEngine::size)
    }

    pub fn action_space_size(&self) -> usize {
        action_space_size(self.board_size())
    }

    /// Discards any running game and starts an empty board with a fresh placement seed.
    pub fn reset(&mut self) -> Result<FeatureTensor> {
        let seed = self.seeds.random();
        self.game_seed = Some(seed);
        log::debug!("reset with game seed {}", seed);
        self.start(PlayEngine::new(self.config.game, seed)?)
    }

    /// Starts a game over a predetermined layout, for replays and tests.
    pub fn reset_with_layout(&mut self, layout: MineLayout) -> Result<FeatureTensor> {
        self.game_seed = None;
        self.start(PlayEngine::with_layout(layout)?)
    }

    fn start(&mut self, engine: PlayEngine) -> Result<FeatureTensor> {
        let observation = encode(engine.board());
        self.engine = Some(engine);
        self.done = false;
        self.hints_used = 0;
        Ok(observation)
    }

    /// Decodes `action` against the board in play. Lifecycle errors win over a bad index.
    pub fn step(&mut self, action: usize) -> Result<Step> {
        self.ensure_playable()?;
        let action = Action::from_index(action, self.board_size())?;
        self.step_action(action)
    }

    fn ensure_playable(&self) -> Result<()> {
        if self.engine.is_none() {
            Err(GameError::NotReset)
        } else if self.done {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }

    pub fn step_action(&mut self, action: Action) -> Result<Step> {
        self.ensure_playable()?;
        let rewards = self.config.rewards;
        let engine = self.engine.as_mut().ok_or(GameError::NotReset)?;
        let coords = engine.board().validate_coords(action.coords)?;

        match action.kind {
            ActionKind::Reveal => {
                if engine.cell_at(coords).is_revealed() {
                    return Ok(Step {
                        observation: encode(engine.board()),
                        reward: rewards.already_revealed,
                        done: false,
                    });
                }
                engine.reveal(coords)?;
            }
            ActionKind::Flag => {
                engine.toggle_flag(coords)?;
            }
        }

        let (reward, done) = match engine.status() {
            GameStatus::Won => (rewards.win, true),
            GameStatus::Lost => (rewards.loss, true),
            GameStatus::InProgress => (f32::from(engine.revealed_count()), false),
        };
        if done {
            log::debug!(
                "game over: {:?} after revealing {} cells",
                engine.status(),
                engine.revealed_count()
            );
        }
        self.done = done;

        Ok(Step {
            observation: encode(engine.board()),
            reward,
            done,
        })
    }

    pub fn engine(&self) -> Result<&PlayEngine> {
        self.engine.as_ref().ok_or(GameError::NotReset)
    }

    pub fn encode(&self) -> Result<FeatureTensor> {
        Ok(encode(self.engine()?.board()))
    }

    pub fn observe(&self) -> Result<Observation> {
        Ok(self.engine()?.observe())
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Placement seed of the current game, `None` for fixed layouts or before the first reset.
    pub fn game_seed(&self) -> Option<u64> {
        self.game_seed
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.engine.as_ref().map_or(0, PlayEngine::elapsed_secs)
    }

    pub fn hints_used(&self) -> u8 {
        self.hints_used
    }

    pub fn hints_left(&self) -> u8 {
        self.config.hint_limit.saturating_sub(self.hints_used)
    }

    /// Asks the deduction solver for a certain move. Only answered hints count against the limit.
    pub fn hint(&mut self) -> Result<Option<Hint>> {
        let engine = self.engine.as_ref().ok_or(GameError::NotReset)?;
        if engine.is_finished() {
            return Err(GameError::AlreadyEnded);
        }
        if self.hints_used >= self.config.hint_limit {
            return Err(GameError::HintsExhausted {
                limit: self.config.hint_limit,
            });
        }

        let hint = find_certain_move(&engine.observe());
        if hint.is_some() {
            self.hints_used += 1;
        }
        Ok(hint)
    }
}
