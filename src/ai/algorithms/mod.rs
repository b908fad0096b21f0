mod dqn;

pub use dqn::{DqnConfig, DqnLearner, GreedyAgent, SharedLearner};
