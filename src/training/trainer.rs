use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::ai::{Agent, DqnConfig, DqnLearner, SharedLearner};
use crate::checkpoint::{
    CheckpointData, CheckpointHyperparameters, CheckpointManager, CheckpointMetadata,
    CheckpointMetrics, TrainerState,
};
use crate::config::AppConfig;
use crate::error::{CheckpointError, TrainingError};
use crate::game::{GameState, Player};
use crate::training::episode::{derive_seed, evaluate};
use crate::training::metrics::{EpisodeResult, TrainingMetrics};

/// Seed stream offset for evaluation opponents, clear of the seat streams.
const EVAL_SEED_STREAM: usize = 1 << 20;

/// Trainer configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Training-phase steps, each one train step plus one ply.
    pub steps: usize,
    /// Plies of pure play before the first update (default 2 x replay capacity).
    pub warmup_plies: Option<usize>,
    /// One learner shared by both seats instead of one per seat.
    pub symmetric: bool,
    pub log_interval: usize,
    pub checkpoint_interval: usize,
    /// Greedy-vs-random games played for each checkpoint's win rate.
    pub eval_games: usize,
    pub seed: Option<u64>,
    /// Checkpoint directory to load the networks from before warm-up.
    pub resume_from: Option<PathBuf>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            steps: 100_000,
            warmup_plies: None,
            symmetric: false,
            log_interval: 1000,
            checkpoint_interval: 200_000,
            eval_games: 50,
            seed: None,
            resume_from: None,
        }
    }
}

/// What a finished run reports back.
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub steps: usize,
    pub games_played: usize,
    pub final_loss: Option<f32>,
    pub last_checkpoint: Option<PathBuf>,
}

/// Self-play trainer: two seats on one board, optionally sharing a learner.
pub struct Trainer {
    dqn: DqnConfig,
    config: TrainerConfig,
    warmup_plies: usize,
    checkpoint_manager: CheckpointManager,
    game: GameState,
    black: Agent,
    white: Agent,
    /// Distinct learners with the file stem they are checkpointed under.
    learners: Vec<(&'static str, SharedLearner)>,
    metrics: TrainingMetrics,
    base_seed: u64,
    step_offset: usize,
    games_offset: usize,
    game_plies: usize,
}

impl Trainer {
    pub fn new(app: AppConfig) -> Result<Self, TrainingError> {
        app.validate()?;
        let warmup_plies = app.warmup_plies();
        let AppConfig {
            dqn,
            training: config,
            checkpoint,
        } = app;

        let base_seed = config.seed.unwrap_or_else(rand::random);
        let rng = |stream: usize| StdRng::seed_from_u64(derive_seed(base_seed, stream));

        let (black_learner, white_learner, learners) = if config.symmetric {
            let shared = DqnLearner::new(&dqn, rng(0)).into_shared();
            (
                shared.clone(),
                shared.clone(),
                vec![("shared", shared)],
            )
        } else {
            let black = DqnLearner::new(&dqn, rng(0)).into_shared();
            let white = DqnLearner::new(&dqn, rng(1)).into_shared();
            (
                black.clone(),
                white.clone(),
                vec![("black", black), ("white", white)],
            )
        };

        let black = Agent::new(
            Player::Black,
            dqn.epsilon,
            dqn.reward_mode,
            black_learner,
            rng(2),
        );
        let white = Agent::new(
            Player::White,
            dqn.epsilon,
            dqn.reward_mode,
            white_learner,
            rng(3),
        );

        let checkpoint_manager = CheckpointManager::new(checkpoint)?;
        let resume_from = config.resume_from.clone();
        let mut trainer = Trainer {
            dqn,
            config,
            warmup_plies,
            checkpoint_manager,
            game: GameState::initial(),
            black,
            white,
            learners,
            metrics: TrainingMetrics::new(),
            base_seed,
            step_offset: 0,
            games_offset: 0,
            game_plies: 0,
        };

        if let Some(dir) = resume_from {
            trainer.resume_from(&dir)?;
        }
        Ok(trainer)
    }

    /// Load networks and progress from a checkpoint directory.
    pub fn resume_from(&mut self, dir: &Path) -> Result<(), TrainingError> {
        let data = self.checkpoint_manager.load_checkpoint(dir)?;
        self.restore(data)
    }

    /// Load networks and progress from the checkpoint `latest` points at.
    pub fn resume_latest(&mut self) -> Result<(), TrainingError> {
        let data = self.checkpoint_manager.load_latest()?;
        self.restore(data)
    }

    fn restore(&mut self, data: CheckpointData) -> Result<(), TrainingError> {
        let found = data.metadata.hyperparameters.symmetric;
        if found != self.config.symmetric {
            return Err(TrainingError::SeatLayoutMismatch {
                path: data.path,
                expected: self.config.symmetric,
                found,
            });
        }

        for (stem, learner) in &self.learners {
            let mut learner = learner.borrow_mut();
            learner.load_from_dir(&data.path, stem)?;
            learner.sync_target();
        }
        self.step_offset = data.trainer_state.step;
        self.games_offset = data.trainer_state.games_played;

        log::info!(
            "resumed from {} (step {}, {} games)",
            data.path.display(),
            self.step_offset,
            self.games_offset
        );
        Ok(())
    }

    /// Warm up, then train for the configured number of steps.
    pub fn run(&mut self) -> TrainingSummary {
        log::info!(
            "warming up for {} plies ({} self-play)",
            self.warmup_plies,
            if self.config.symmetric {
                "symmetric"
            } else {
                "independent"
            }
        );
        self.warm_up(self.warmup_plies);
        log::info!(
            "checkpoints go to {}",
            self.checkpoint_manager.checkpoint_dir().display()
        );

        let steps = self.config.steps;
        log::info!(
            "training for {} steps (batch {}, lr {}, sync every {}, {} rewards)",
            steps,
            self.dqn.batch_size,
            self.dqn.learning_rate,
            self.dqn.sync_every,
            self.dqn.reward_mode.name()
        );
        let last_checkpoint = self.train(steps);

        let summary = TrainingSummary {
            steps,
            games_played: self.games_played(),
            final_loss: self.metrics.last_loss(),
            last_checkpoint,
        };
        log::info!(
            "training complete: {} steps, {} games",
            summary.steps,
            summary.games_played
        );
        summary
    }

    /// Play `plies` plies without any update, resetting finished games.
    pub fn warm_up(&mut self, plies: usize) {
        for _ in 0..plies {
            self.play_ply(false);
        }
    }

    /// Run the training phase. A checkpoint is written every
    /// `checkpoint_interval` steps and once at the end; returns the last one
    /// written.
    pub fn train(&mut self, steps: usize) -> Option<PathBuf> {
        let sync_every = self.dqn.sync_every;
        let log_interval = self.config.log_interval;
        let checkpoint_interval = self.config.checkpoint_interval;
        let mut last_checkpoint = None;
        let mut saved_last_step = false;

        for i in 0..steps {
            if i % sync_every == 0 {
                self.black.sync_target();
                self.white.sync_target();
            }

            if let Some(loss) = self.play_ply(true) {
                self.metrics.record_update(loss);
            }

            let step = self.step_offset + i + 1;
            if (i + 1) % log_interval == 0 {
                self.log_progress(step);
            }

            saved_last_step = false;
            if i % checkpoint_interval == checkpoint_interval - 1 {
                last_checkpoint = self.try_checkpoint(step).or(last_checkpoint);
                saved_last_step = true;
            }
        }

        self.step_offset += steps;
        if !saved_last_step {
            last_checkpoint = self.try_checkpoint(self.step_offset).or(last_checkpoint);
        }
        last_checkpoint
    }

    /// The learner behind a seat.
    pub fn learner(&self, player: Player) -> &SharedLearner {
        match player {
            Player::Black => self.black.learner(),
            Player::White => self.white.learner(),
        }
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    /// Total steps trained, including those restored from a checkpoint.
    pub fn step(&self) -> usize {
        self.step_offset
    }

    pub fn games_played(&self) -> usize {
        self.games_offset + self.metrics.total_episodes()
    }

    /// Greedy-vs-random win rate at `step`, averaged over the distinct
    /// learners. Each step draws its own random-opponent games.
    pub fn evaluate(&self, step: usize) -> f32 {
        let seed = self.eval_seed(step);
        let total: f32 = self
            .learners
            .iter()
            .map(|(_, learner)| evaluate(learner, self.config.eval_games, seed))
            .sum();
        total / self.learners.len() as f32
    }

    fn eval_seed(&self, step: usize) -> u64 {
        derive_seed(self.base_seed, EVAL_SEED_STREAM + step)
    }

    /// The seat to move optionally trains, then acts. Returns the loss when
    /// a train step ran.
    fn play_ply(&mut self, train: bool) -> Option<f32> {
        let player = self
            .game
            .turn()
            .expect("finished games are reset before the next ply");
        let batch_size = self.dqn.batch_size;
        let agent = match player {
            Player::Black => &mut self.black,
            Player::White => &mut self.white,
        };

        let loss = train.then(|| agent.train_step(batch_size));
        agent.act(&mut self.game);
        self.game_plies += 1;

        if self.game.is_terminal() {
            self.finish_game();
        }
        loss
    }

    fn finish_game(&mut self) {
        self.black.observe_terminal(&self.game);
        self.white.observe_terminal(&self.game);

        let result = EpisodeResult {
            winner: self.game.winner(),
            plies: self.game_plies,
            score: self.game.score(),
        };
        log::debug!(
            "game over after {} plies: {}-{}",
            result.plies,
            result.score.0,
            result.score.1
        );
        self.metrics.record_episode(result);

        self.game.reset();
        self.game_plies = 0;
    }

    fn log_progress(&self, step: usize) {
        let window = self.config.log_interval;
        let replay: usize = self
            .learners
            .iter()
            .map(|(_, learner)| learner.borrow().replay_len())
            .sum();
        log::info!(
            "step {} | games: {} | loss: {:.4} | black wins: {:.1}% | draws: {:.1}% | avg len: {:.1} | margin: {:+.1} | replay: {}",
            step,
            self.games_played(),
            self.metrics.average_loss(window),
            self.metrics.win_rate(Player::Black, window) * 100.0,
            self.metrics.draw_rate(window) * 100.0,
            self.metrics.average_game_length(window),
            self.metrics.average_margin(window),
            replay,
        );
    }

    fn try_checkpoint(&self, step: usize) -> Option<PathBuf> {
        match self.save_checkpoint(step) {
            Ok(path) => {
                log::info!("checkpoint saved: {}", path.display());
                Some(path)
            }
            Err(e) => {
                log::error!("checkpoint at step {} failed: {}", step, e);
                None
            }
        }
    }

    fn save_checkpoint(&self, step: usize) -> Result<PathBuf, CheckpointError> {
        let win_rate = self.evaluate(step);
        log::info!(
            "eval vs random ({} games): {:.1}% win rate",
            self.config.eval_games,
            win_rate * 100.0
        );

        let window = self.config.log_interval;
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let metadata = CheckpointMetadata {
            step,
            timestamp,
            seats: self
                .learners
                .iter()
                .map(|(stem, _)| stem.to_string())
                .collect(),
            metrics: CheckpointMetrics {
                win_rate,
                draw_rate: self.metrics.draw_rate(window),
                average_game_length: self.metrics.average_game_length(window),
                current_loss: self.metrics.average_loss(window),
                training_steps: step,
            },
            hyperparameters: self.hyperparameters(),
        };
        let state = TrainerState {
            step,
            games_played: self.games_played(),
            updates: self
                .learners
                .iter()
                .map(|(_, learner)| learner.borrow().update_count())
                .sum(),
        };

        self.checkpoint_manager
            .save_checkpoint(&self.learners, &state, &metadata)
    }

    fn hyperparameters(&self) -> CheckpointHyperparameters {
        CheckpointHyperparameters {
            learning_rate: self.dqn.learning_rate,
            gamma: self.dqn.gamma,
            epsilon: self.dqn.epsilon,
            batch_size: self.dqn.batch_size,
            sync_every: self.dqn.sync_every,
            replay_capacity: self.dqn.replay_capacity,
            hidden_layers: self.dqn.hidden_layers,
            units: self.dqn.units,
            reward_mode: self.dqn.reward_mode,
            symmetric: self.config.symmetric,
        }
    }
}
