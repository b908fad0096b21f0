//! # Reversi DQN
//!
//! A Reversi engine with deep Q-learning self-play training built on the
//! Burn ML framework.
//!
//! ## Modules
//!
//! - [`game`]: Core game logic: board, player, turn and pass bookkeeping
//! - [`ai`]: Seat agents, DQN learner, Q-network, state encoding
//! - [`training`]: Self-play trainer, replay buffer, evaluation, metrics
//! - [`checkpoint`]: Model persistence and versioning
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

#![recursion_limit = "256"]

pub mod ai;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod game;
pub mod training;
