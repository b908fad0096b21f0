use rand::rngs::StdRng;
use rand::Rng;

use crate::ai::algorithms::SharedLearner;
use crate::game::{BoardView, GameState, Player};

/// A single step of experience for RL training, stored from the acting
/// side's perspective.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: BoardView,
    pub action: usize,
    pub reward: f32,
    pub next_state: BoardView,
    pub done: bool,
}

/// How an agent turns consecutive snapshots into rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardMode {
    /// Change in own-minus-opponent piece count, every ply.
    EveryStep,
    /// Zero until the game ends, then the final own-minus-opponent count.
    Terminal,
}

impl RewardMode {
    pub fn reward(self, prior: &BoardView, current: &BoardView, done: bool) -> f32 {
        match self {
            RewardMode::EveryStep => (current.sum() - prior.sum()) as f32,
            RewardMode::Terminal => {
                if done {
                    current.sum() as f32
                } else {
                    0.0
                }
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RewardMode::EveryStep => "every_step",
            RewardMode::Terminal => "terminal",
        }
    }
}

/// Anything that can pick a move for the side to move. Used for evaluation
/// games, where nothing is recorded.
pub trait Policy {
    /// Select an action for the side to move in `state`.
    fn select_action(&mut self, state: &GameState) -> usize;

    /// Return the policy's display name.
    fn name(&self) -> &str;
}

/// One seat at the board: an epsilon-greedy player that feeds its
/// transitions into a (possibly shared) learner.
///
/// Rewards are delayed by one ply: a transition is only recorded once the
/// agent sees the position its previous action led to, either on its next
/// turn or through [`Agent::observe_terminal`].
pub struct Agent {
    color: Player,
    epsilon: f64,
    reward_mode: RewardMode,
    learner: SharedLearner,
    prior: Option<(BoardView, usize)>,
    rng: StdRng,
}

impl Agent {
    pub fn new(
        color: Player,
        epsilon: f64,
        reward_mode: RewardMode,
        learner: SharedLearner,
        rng: StdRng,
    ) -> Self {
        Agent {
            color,
            epsilon,
            reward_mode,
            learner,
            prior: None,
            rng,
        }
    }

    pub fn learner(&self) -> &SharedLearner {
        &self.learner
    }

    /// Whether a (state, action) pair is waiting for its outcome.
    #[cfg(test)]
    pub fn has_pending_transition(&self) -> bool {
        self.prior.is_some()
    }

    /// Record the previous transition, choose an epsilon-greedy action, and
    /// play it. Returns the action played.
    ///
    /// # Panics
    ///
    /// If it is not this agent's turn.
    pub fn act(&mut self, game: &mut GameState) -> usize {
        assert_eq!(
            game.turn(),
            Some(self.color),
            "{} asked to act out of turn",
            self.color.name()
        );

        let state = game.state_view(self.color);
        self.record(state, false);

        let action = if self.rng.random::<f64>() < self.epsilon {
            game.random_legal_action(&mut self.rng)
        } else {
            game.greedy_action(&*self.learner.borrow(), &state)
        };
        game.apply_action(action);

        self.prior = Some((state, action));
        action
    }

    /// Close out the game: record the final transition with `done = true` and
    /// forget the pending state so nothing links across games.
    pub fn observe_terminal(&mut self, game: &GameState) {
        debug_assert!(game.is_terminal(), "observe_terminal on a live game");
        let state = game.state_view(self.color);
        self.record(state, true);
    }

    /// Copy the online network into the target network.
    pub fn sync_target(&self) {
        self.learner.borrow_mut().sync_target();
    }

    /// One TD update of the online network from a sampled batch. Returns the
    /// batch loss.
    pub fn train_step(&self, batch_size: usize) -> f32 {
        self.learner.borrow_mut().train_step(batch_size)
    }

    fn record(&mut self, current: BoardView, done: bool) {
        if let Some((state, action)) = self.prior.take() {
            let reward = self.reward_mode.reward(&state, &current, done);
            self.learner.borrow_mut().remember(Transition {
                state,
                action,
                reward,
                next_state: current,
                done,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::algorithms::{DqnConfig, DqnLearner};
    use rand::SeedableRng;

    fn learner() -> SharedLearner {
        DqnLearner::new(&DqnConfig::default(), StdRng::seed_from_u64(0)).into_shared()
    }

    fn agent(color: Player, epsilon: f64, mode: RewardMode, learner: SharedLearner) -> Agent {
        Agent::new(color, epsilon, mode, learner, StdRng::seed_from_u64(17))
    }

    #[test]
    fn test_every_step_reward_is_score_delta() {
        let mut game = GameState::initial();
        let before = game.state_view(Player::Black);
        game.apply_move(2, 3);
        let after = game.state_view(Player::Black);
        assert_eq!(RewardMode::EveryStep.reward(&before, &after, false), 3.0);
    }

    #[test]
    fn test_terminal_reward_only_at_end() {
        let mut game = GameState::initial();
        let before = game.state_view(Player::Black);
        game.apply_move(2, 3);
        let after = game.state_view(Player::Black);
        assert_eq!(RewardMode::Terminal.reward(&before, &after, false), 0.0);
        assert_eq!(RewardMode::Terminal.reward(&before, &after, true), 3.0);
    }

    #[test]
    fn test_first_act_records_nothing() {
        let shared = learner();
        let mut black = agent(Player::Black, 1.0, RewardMode::EveryStep, shared.clone());
        let mut game = GameState::initial();

        let action = black.act(&mut game);
        assert!(GameState::initial().legal_moves()[action]);
        assert_eq!(game.turn(), Some(Player::White));
        assert!(black.has_pending_transition());
        assert_eq!(shared.borrow().replay_len(), 0);
    }

    #[test]
    fn test_second_act_records_delayed_transition() {
        let shared = learner();
        let mut black = agent(Player::Black, 1.0, RewardMode::EveryStep, shared.clone());
        let mut white = agent(Player::White, 1.0, RewardMode::EveryStep, shared.clone());
        let mut game = GameState::initial();

        black.act(&mut game);
        white.act(&mut game);
        assert_eq!(shared.borrow().replay_len(), 0);
        black.act(&mut game);
        assert_eq!(shared.borrow().replay_len(), 1);
        white.act(&mut game);
        assert_eq!(shared.borrow().replay_len(), 2);
    }

    #[test]
    fn test_greedy_agent_plays_legal_moves() {
        let shared = learner();
        let mut black = agent(Player::Black, 0.0, RewardMode::Terminal, shared.clone());
        let mut white = agent(Player::White, 0.0, RewardMode::Terminal, shared);
        let mut game = GameState::initial();

        for _ in 0..10 {
            if game.is_terminal() {
                break;
            }
            let legal = *game.legal_moves();
            let action = match game.turn() {
                Some(Player::Black) => black.act(&mut game),
                Some(Player::White) => white.act(&mut game),
                None => unreachable!(),
            };
            assert!(legal[action]);
        }
    }

    #[test]
    fn test_zero_epsilon_plays_best_online_action() {
        let shared = learner();
        let mut black = agent(Player::Black, 0.0, RewardMode::EveryStep, shared.clone());
        let mut white = agent(Player::White, 0.0, RewardMode::EveryStep, shared.clone());
        let mut game = GameState::initial();

        for _ in 0..6 {
            let player = game.turn().unwrap();
            let view = game.state_view(player);
            let expected = game.greedy_action(&*shared.borrow(), &view);
            let action = match player {
                Player::Black => black.act(&mut game),
                Player::White => white.act(&mut game),
            };
            assert_eq!(action, expected);
        }
    }

    #[test]
    fn test_every_step_transition_stores_score_delta() {
        let shared = learner();
        let mut black = agent(Player::Black, 1.0, RewardMode::EveryStep, shared.clone());
        let mut white = agent(Player::White, 1.0, RewardMode::EveryStep, shared.clone());
        let mut game = GameState::initial();

        let prior = game.state_view(Player::Black);
        let first = black.act(&mut game);
        white.act(&mut game);
        let current = game.state_view(Player::Black);
        black.act(&mut game);

        let learner = shared.borrow();
        let recorded: Vec<&Transition> = learner.transitions().collect();
        assert_eq!(recorded.len(), 1);
        let t = recorded[0];
        assert_eq!(t.state, prior);
        assert_eq!(t.action, first);
        assert_eq!(t.next_state, current);
        assert!(!t.done);
        assert_eq!(t.reward, (current.sum() - prior.sum()) as f32);
    }

    #[test]
    fn test_full_game_records_terminal_transitions() {
        let black_learner = learner();
        let white_learner = learner();
        let mut black = agent(Player::Black, 1.0, RewardMode::Terminal, black_learner.clone());
        let mut white = agent(Player::White, 1.0, RewardMode::Terminal, white_learner.clone());
        let mut game = GameState::initial();
        let mut black_moves = 0;
        let mut white_moves = 0;

        while !game.is_terminal() {
            match game.turn() {
                Some(Player::Black) => {
                    black.act(&mut game);
                    black_moves += 1;
                }
                Some(Player::White) => {
                    white.act(&mut game);
                    white_moves += 1;
                }
                None => unreachable!(),
            }
        }
        black.observe_terminal(&game);
        white.observe_terminal(&game);

        assert!(!black.has_pending_transition());
        assert!(!white.has_pending_transition());
        assert_eq!(black_learner.borrow().replay_len(), black_moves);
        assert_eq!(white_learner.borrow().replay_len(), white_moves);

        let (b, w) = game.score();
        let black_final = b as f32 - w as f32;
        let terminal_rewards: Vec<(f32, bool)> = black_learner
            .borrow()
            .transitions()
            .map(|t| (t.reward, t.done))
            .collect();
        let done: Vec<&(f32, bool)> = terminal_rewards.iter().filter(|(_, d)| *d).collect();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].0, black_final);
        assert!(terminal_rewards
            .iter()
            .filter(|(_, d)| !*d)
            .all(|(r, _)| *r == 0.0));
    }

    #[test]
    #[should_panic(expected = "out of turn")]
    fn test_act_out_of_turn_panics() {
        let mut white = agent(Player::White, 1.0, RewardMode::EveryStep, learner());
        let mut game = GameState::initial();
        white.act(&mut game);
    }
}
