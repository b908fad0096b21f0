#![recursion_limit = "256"]

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use flexi_logger::Logger;

use reversi_dqn::ai::RewardMode;
use reversi_dqn::config::AppConfig;
use reversi_dqn::error::{CheckpointError, TrainingError};
use reversi_dqn::training::trainer::Trainer;

/// Train a Reversi DQN agent via self-play.
#[derive(Parser)]
#[command(name = "train", about = "Train a Reversi DQN agent via self-play")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override number of training steps
    #[arg(long)]
    steps: Option<usize>,

    /// Override learning rate
    #[arg(long)]
    lr: Option<f64>,

    /// Resume training from the latest checkpoint
    #[arg(long)]
    resume: bool,

    /// Share one learner between both seats
    #[arg(long)]
    symmetric: bool,

    /// Reward shaping: every_step or terminal
    #[arg(long)]
    reward_mode: Option<String>,

    /// Seed for all random streams
    #[arg(long)]
    seed: Option<u64>,

    /// Resume from this checkpoint directory
    #[arg(long)]
    model: Option<PathBuf>,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let _logger = Logger::try_with_env_or_str("info")
        .context("configuring logger")?
        .log_to_stderr()
        .start()
        .context("starting logger")?;

    // Load configuration
    let mut app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(steps) = cli.steps {
        app_config.training.steps = steps;
    }
    if let Some(lr) = cli.lr {
        app_config.dqn.learning_rate = lr;
    }
    if cli.symmetric {
        app_config.training.symmetric = true;
    }
    if let Some(mode) = cli.reward_mode.as_deref() {
        app_config.dqn.reward_mode = match mode {
            "every_step" => RewardMode::EveryStep,
            "terminal" => RewardMode::Terminal,
            other => bail!(
                "unknown reward mode '{}' (expected 'every_step' or 'terminal')",
                other
            ),
        };
    }
    if let Some(seed) = cli.seed {
        app_config.training.seed = Some(seed);
    }
    if let Some(model) = cli.model {
        app_config.training.resume_from = Some(model);
    }
    app_config
        .validate()
        .context("validating configuration overrides")?;

    let use_latest = cli.resume && app_config.training.resume_from.is_none();
    let mut trainer = Trainer::new(app_config).context("building trainer")?;

    if use_latest {
        match trainer.resume_latest() {
            Ok(()) => {}
            Err(TrainingError::Checkpoint(
                e @ (CheckpointError::NoLatestSymlink(_) | CheckpointError::DirNotFound(_)),
            )) => {
                log::warn!("no checkpoint found ({}), starting fresh", e);
            }
            Err(e) => return Err(e).context("resuming from latest checkpoint"),
        }
    }

    let summary = trainer.run();
    log::info!(
        "done: {} steps, {} games, final loss {}",
        summary.steps,
        summary.games_played,
        summary
            .final_loss
            .map(|l| format!("{:.4}", l))
            .unwrap_or_else(|| "n/a".to_string())
    );
    if let Some(path) = summary.last_checkpoint {
        log::info!("last checkpoint: {}", path.display());
    }
    Ok(())
}
