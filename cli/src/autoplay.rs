use std::fmt;

use sweeper_core::{Agent, GameStatus, MinesweeperEnv, Policy, Result, Source};

/// How a single autonomous game went.
#[derive(Clone, Debug, Default)]
pub struct GameSummary {
    /// `None` when the move limit ran out first.
    pub status: Option<GameStatus>,
    pub steps: u32,
    pub revealed: u16,
    /// Sum of step rewards.
    pub reward: f32,
    pub solver_moves: u32,
    pub policy_moves: u32,
    pub random_moves: u32,
}

pub fn play_game<P: Policy>(
    env: &mut MinesweeperEnv,
    agent: &mut Agent<P>,
    max_steps: u32,
) -> Result<GameSummary> {
    let mut tensor = env.reset()?;
    agent.reset();
    let mut summary = GameSummary::default();

    while summary.steps < max_steps {
        let observation = env.observe()?;
        let Some(decision) = agent.choose(&tensor, &observation)? else {
            log::warn!("no legal move left on an unfinished game");
            break;
        };
        match decision.source {
            Source::Solver => summary.solver_moves += 1,
            Source::Policy => summary.policy_moves += 1,
            Source::Random => summary.random_moves += 1,
        }
        log::trace!("{:?} from {:?}", decision.action, decision.source);

        let step = env.step_action(decision.action)?;
        summary.steps += 1;
        summary.reward += step.reward;
        tensor = step.observation;
        if step.done {
            break;
        }
    }

    let engine = env.engine()?;
    summary.revealed = engine.revealed_count();
    summary.status = engine.is_finished().then(|| engine.status());
    Ok(summary)
}

#[derive(Clone, Debug, Default)]
pub struct Stats {
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub unfinished: u32,
    pub solver_moves: u64,
    pub policy_moves: u64,
    pub random_moves: u64,
    revealed_sum: u64,
    reward_sum: f64,
}

impl Stats {
    pub fn record(&mut self, summary: &GameSummary) {
        self.games += 1;
        match summary.status {
            Some(GameStatus::Won) => self.wins += 1,
            Some(GameStatus::Lost) => self.losses += 1,
            Some(GameStatus::InProgress) | None => self.unfinished += 1,
        }
        self.solver_moves += u64::from(summary.solver_moves);
        self.policy_moves += u64::from(summary.policy_moves);
        self.random_moves += u64::from(summary.random_moves);
        self.revealed_sum += u64::from(summary.revealed);
        self.reward_sum += f64::from(summary.reward);
    }

    pub fn win_rate(&self) -> f64 {
        self.mean(f64::from(self.wins))
    }

    pub fn mean_revealed(&self) -> f64 {
        self.mean(self.revealed_sum as f64)
    }

    pub fn mean_reward(&self) -> f64 {
        self.mean(self.reward_sum)
    }

    fn mean(&self, total: f64) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            total / f64::from(self.games)
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "games          {}", self.games)?;
        writeln!(f, "wins           {}", self.wins)?;
        writeln!(f, "losses         {}", self.losses)?;
        if self.unfinished > 0 {
            writeln!(f, "unfinished     {}", self.unfinished)?;
        }
        writeln!(f, "win rate       {:.1}%", self.win_rate() * 100.0)?;
        writeln!(f, "solver moves   {}", self.solver_moves)?;
        writeln!(f, "policy moves   {}", self.policy_moves)?;
        writeln!(f, "random moves   {}", self.random_moves)?;
        writeln!(f, "mean revealed  {:.2}", self.mean_revealed())?;
        writeln!(f, "mean return    {:.2}", self.mean_reward())
    }
}
