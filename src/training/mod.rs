//! Training infrastructure: self-play trainer, replay buffer, evaluation
//! games, and metrics collection.

pub mod episode;
pub mod metrics;
pub mod replay_buffer;
pub mod trainer;
