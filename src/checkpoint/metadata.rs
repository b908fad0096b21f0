use serde::{Deserialize, Serialize};

use crate::ai::RewardMode;

/// Metrics snapshot at checkpoint time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetrics {
    /// Greedy play against a uniformly random opponent.
    pub win_rate: f32,
    pub draw_rate: f32,
    pub average_game_length: f32,
    pub current_loss: f32,
    pub training_steps: usize,
}

/// Hyperparameters recorded in checkpoint metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointHyperparameters {
    pub learning_rate: f64,
    pub gamma: f32,
    pub epsilon: f64,
    pub batch_size: usize,
    pub sync_every: usize,
    pub replay_capacity: usize,
    pub hidden_layers: usize,
    pub units: usize,
    pub reward_mode: RewardMode,
    pub symmetric: bool,
}

/// Top-level checkpoint metadata written to metadata.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub step: usize,
    pub timestamp: u64,
    /// File stems of the saved learners ("shared", or "black" and "white").
    pub seats: Vec<String>,
    pub metrics: CheckpointMetrics,
    pub hyperparameters: CheckpointHyperparameters,
}

/// Trainer progress written to training_state.json.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainerState {
    pub step: usize,
    pub games_played: usize,
    #[serde(default)]
    pub updates: usize,
}
