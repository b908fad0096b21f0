use std::collections::VecDeque;

use crate::game::Player;

/// Result of a single finished game.
#[derive(Debug, Clone, Copy)]
pub struct EpisodeResult {
    pub winner: Option<Player>,
    pub plies: usize,
    /// Final (black, white) piece counts.
    pub score: (u32, u32),
}

/// Training metrics tracker with rolling window computations.
pub struct TrainingMetrics {
    episode_results: VecDeque<EpisodeResult>,
    update_losses: VecDeque<f32>,
    capacity: usize,
    total_episodes: usize, // lifetime count, never capped
}

impl TrainingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        TrainingMetrics {
            episode_results: VecDeque::with_capacity(capacity),
            update_losses: VecDeque::with_capacity(capacity),
            capacity,
            total_episodes: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn record_episode(&mut self, result: EpisodeResult) {
        self.total_episodes += 1;
        self.episode_results.push_back(result);
        if self.episode_results.len() > self.capacity {
            self.episode_results.pop_front();
        }
    }

    pub fn record_update(&mut self, loss: f32) {
        self.update_losses.push_back(loss);
        if self.update_losses.len() > self.capacity {
            self.update_losses.pop_front();
        }
    }

    /// Win rate for `player` in the last N episodes.
    pub fn win_rate(&self, player: Player, last_n: usize) -> f32 {
        self.fraction(last_n, |r| r.winner == Some(player))
    }

    /// Draw rate in the last N episodes.
    pub fn draw_rate(&self, last_n: usize) -> f32 {
        self.fraction(last_n, |r| r.winner.is_none())
    }

    /// Average loss over the last N updates.
    pub fn average_loss(&self, last_n: usize) -> f32 {
        let n = self.update_losses.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let sum: f32 = self.update_losses.iter().rev().take(n).sum();
        sum / n as f32
    }

    /// Average game length (plies) over the last N episodes.
    pub fn average_game_length(&self, last_n: usize) -> f32 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: usize = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .map(|r| r.plies)
            .sum();
        total as f32 / n as f32
    }

    /// Average final black-minus-white margin over the last N episodes.
    pub fn average_margin(&self, last_n: usize) -> f32 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: i64 = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .map(|r| r.score.0 as i64 - r.score.1 as i64)
            .sum();
        total as f32 / n as f32
    }

    pub fn last_loss(&self) -> Option<f32> {
        self.update_losses.back().copied()
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    fn fraction(&self, last_n: usize, pred: impl Fn(&EpisodeResult) -> bool) -> f32 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let hits = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .filter(|r| pred(r))
            .count();
        hits as f32 / n as f32
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new()
    }
}
