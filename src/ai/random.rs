use crate::game::GameState;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::agent::Policy;

/// An agent that selects uniformly at random from legal actions.
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new() -> Self {
        RandomAgent {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        RandomAgent {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for RandomAgent {
    fn select_action(&mut self, state: &GameState) -> usize {
        state.random_legal_action(&mut self.rng)
    }

    fn name(&self) -> &str {
        "Random"
    }
}
