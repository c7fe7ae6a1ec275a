use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sweeper_core::{Agent, Difficulty, EnvConfig, GameConfig, MinesweeperEnv, RandomPolicy};

mod autoplay;

#[derive(ValueEnum, Copy, Clone, Debug)]
enum Preset {
    Beginner,
    Intermediate,
    Expert,
}

impl From<Preset> for Difficulty {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Beginner => Difficulty::Beginner,
            Preset::Intermediate => Difficulty::Intermediate,
            Preset::Expert => Difficulty::Expert,
        }
    }
}

/// Plays Minesweeper games autonomously and reports how they went.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Number of games to play
    #[arg(short, long, default_value_t = 100)]
    games: u32,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Board preset, overridden by explicit dimensions
    #[arg(short, long, value_enum)]
    difficulty: Option<Preset>,

    #[arg(long)]
    rows: Option<u8>,

    #[arg(long)]
    cols: Option<u8>,

    #[arg(long)]
    mines: Option<u16>,

    /// TOML file with an environment configuration, command line flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Give up on a game after this many moves
    #[arg(long, default_value_t = 10_000)]
    max_steps: u32,
}

impl Args {
    fn env_config(&self) -> anyhow::Result<EnvConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
            }
            None => EnvConfig::default(),
        };

        if let Some(preset) = self.difficulty {
            config.game = Difficulty::from(preset).config();
        }
        let (rows, cols) = config.game.size;
        let size = (self.rows.unwrap_or(rows), self.cols.unwrap_or(cols));
        let mines = self.mines.unwrap_or(config.game.mines);
        config.game = GameConfig::new(size, mines).context("invalid board")?;

        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let mut config = args.env_config()?;
    let seed = config
        .seed
        .unwrap_or_else(|| SmallRng::from_os_rng().random());
    config.seed = Some(seed);
    log::info!("seed: {}", seed);
    log::debug!("config: {:?}", config);

    let mut env = MinesweeperEnv::new(config)?;
    let mut agent = Agent::new(RandomPolicy::new(seed), seed.wrapping_add(1));

    let mut stats = autoplay::Stats::default();
    for game in 0..args.games {
        let summary = autoplay::play_game(&mut env, &mut agent, args.max_steps)?;
        log::info!(
            "game {}: {:?} after {} moves, {} cells revealed, return {:.1} (seed {:?})",
            game + 1,
            summary.status,
            summary.steps,
            summary.revealed,
            summary.reward,
            env.game_seed()
        );
        stats.record(&summary);
    }

    print!("{stats}");
    Ok(())
}
