mod agent;
pub mod algorithms;
pub mod backend;
pub mod networks;
mod random;
pub mod state_encoding;

pub use agent::{Agent, Policy, RewardMode, Transition};
pub use algorithms::{DqnConfig, DqnLearner, GreedyAgent, SharedLearner};
pub use networks::{QNetwork, QNetworkConfig};
pub use random::RandomAgent;
