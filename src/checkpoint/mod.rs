//! Checkpoint persistence: network weights, trainer progress, and metadata,
//! with a `latest` symlink and pruning of old checkpoints.

mod manager;
mod metadata;

pub use manager::{CheckpointData, CheckpointManager, CheckpointManagerConfig};
pub use metadata::{
    CheckpointHyperparameters, CheckpointMetadata, CheckpointMetrics, TrainerState,
};
