use rand::Rng;

use super::{Board, Cell, Player, BOARD_SIZE, NUM_CELLS};

/// Convert an action index in `[0, 64)` to board coordinates.
pub fn action_to_cell(action: usize) -> (usize, usize) {
    (action / BOARD_SIZE, action % BOARD_SIZE)
}

/// Convert board coordinates to an action index.
pub fn cell_to_action(x: usize, y: usize) -> usize {
    x * BOARD_SIZE + y
}

/// The board re-signed from one side's perspective: +1 for that side's
/// pieces, -1 for the opponent's, 0 for empty cells.
///
/// This is the exact input layout the value network is trained and queried on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardView {
    cells: [[i8; BOARD_SIZE]; BOARD_SIZE],
}

impl BoardView {
    pub fn get(&self, x: usize, y: usize) -> i8 {
        self.cells[x][y]
    }

    /// Own pieces minus opponent pieces.
    pub fn sum(&self) -> i32 {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .map(|&v| v as i32)
            .sum()
    }

    /// Row-major `f32` copy, `x * 8 + y` ordering.
    pub fn to_flat(&self) -> [f32; NUM_CELLS] {
        let mut flat = [0.0f32; NUM_CELLS];
        for x in 0..BOARD_SIZE {
            for y in 0..BOARD_SIZE {
                flat[cell_to_action(x, y)] = self.cells[x][y] as f32;
            }
        }
        flat
    }
}

/// Something that scores all 64 actions for a perspective-signed board.
pub trait ActionValues {
    fn action_values(&self, view: &BoardView) -> [f32; NUM_CELLS];
}

/// Full game state: board, side to move, terminal flag, and the cached legal
/// move mask for the side to move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameState {
    board: Board,
    turn: Option<Player>,
    terminal: bool,
    legal: [bool; NUM_CELLS],
}

impl GameState {
    /// Create the opening position with Black to move.
    pub fn initial() -> Self {
        let mut state = GameState {
            board: Board::new(),
            turn: Some(Player::Black),
            terminal: false,
            legal: [false; NUM_CELLS],
        };
        state.refresh_legal_moves();
        state
    }

    /// Return to the opening position.
    pub fn reset(&mut self) {
        *self = Self::initial();
    }

    /// Side to move, or `None` once the game is over.
    pub fn turn(&self) -> Option<Player> {
        self.turn
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Legal-move mask for the side to move, indexed by action.
    pub fn legal_moves(&self) -> &[bool; NUM_CELLS] {
        &self.legal
    }

    /// Legal action indices in ascending order.
    pub fn legal_actions(&self) -> Vec<usize> {
        (0..NUM_CELLS).filter(|&a| self.legal[a]).collect()
    }

    /// Play at (x, y) for the side to move and return the flipped cells.
    ///
    /// The opponent moves next unless it has no legal move, in which case the
    /// turn passes back; if neither side can move the game ends.
    ///
    /// # Panics
    ///
    /// If the game is over, or the move is not in [`GameState::legal_moves`].
    pub fn apply_move(&mut self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let player = match self.turn {
            Some(player) => player,
            None => panic!("move ({x}, {y}) applied to a finished game"),
        };
        assert!(
            x < BOARD_SIZE && y < BOARD_SIZE,
            "move ({x}, {y}) is off the board"
        );

        let flipped = self.board.place(x, y, player);
        assert!(
            !flipped.is_empty(),
            "illegal move ({x}, {y}) for {}: cell occupied or nothing to flip",
            player.name()
        );

        self.turn = Some(player.other());
        if !self.refresh_legal_moves() {
            self.turn = Some(player);
            if !self.refresh_legal_moves() {
                self.turn = None;
                self.terminal = true;
            }
        }

        flipped
    }

    /// Play an action index, `action = x * 8 + y`.
    pub fn apply_action(&mut self, action: usize) -> Vec<(usize, usize)> {
        let (x, y) = action_to_cell(action);
        self.apply_move(x, y)
    }

    /// The board signed so that `perspective`'s pieces are positive.
    pub fn state_view(&self, perspective: Player) -> BoardView {
        let sign = perspective.sign();
        let mut cells = [[0i8; BOARD_SIZE]; BOARD_SIZE];
        for (x, row) in cells.iter_mut().enumerate() {
            for (y, cell) in row.iter_mut().enumerate() {
                *cell = self.board.get(x, y).sign() * sign;
            }
        }
        BoardView { cells }
    }

    /// Uniformly sample a legal action.
    ///
    /// # Panics
    ///
    /// If the side to move has no legal action (the game is over).
    pub fn random_legal_action<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let actions = self.legal_actions();
        assert!(!actions.is_empty(), "No legal actions available");
        actions[rng.random_range(0..actions.len())]
    }

    /// Highest-scoring legal action under `scores`. Illegal actions are never
    /// considered; ties (and NaN scores) resolve to the lowest index.
    pub fn best_legal_action(&self, scores: &[f32; NUM_CELLS]) -> usize {
        let mut best: Option<(usize, f32)> = None;
        for action in (0..NUM_CELLS).filter(|&a| self.legal[a]) {
            let score = scores[action];
            match best {
                Some((_, best_score)) if !(score > best_score) => {}
                _ => best = Some((action, score)),
            }
        }
        match best {
            Some((action, _)) => action,
            None => panic!("No legal actions available"),
        }
    }

    /// Query `value_fn` on `view` and pick the best legal action.
    pub fn greedy_action<V: ActionValues + ?Sized>(&self, value_fn: &V, view: &BoardView) -> usize {
        self.best_legal_action(&value_fn.action_values(view))
    }

    /// Piece counts as (black, white).
    pub fn score(&self) -> (u32, u32) {
        (self.board.count(Cell::Black), self.board.count(Cell::White))
    }

    /// Side with more pieces, `None` on a tie.
    pub fn winner(&self) -> Option<Player> {
        let (black, white) = self.score();
        match black.cmp(&white) {
            std::cmp::Ordering::Greater => Some(Player::Black),
            std::cmp::Ordering::Less => Some(Player::White),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// The same position with every color swapped.
    #[cfg(test)]
    pub fn mirrored(&self) -> GameState {
        GameState {
            board: self.board.mirrored(),
            turn: self.turn.map(Player::other),
            terminal: self.terminal,
            legal: self.legal,
        }
    }

    /// Recompute the legal mask for the side to move. Returns whether any
    /// move exists.
    fn refresh_legal_moves(&mut self) -> bool {
        let mut any = false;
        for action in 0..NUM_CELLS {
            let (x, y) = action_to_cell(action);
            let legal = match self.turn {
                Some(player) => self.board.is_legal(x, y, player),
                None => false,
            };
            self.legal[action] = legal;
            any |= legal;
        }
        any
    }

    #[cfg(test)]
    pub(crate) fn from_board(board: Board, turn: Player) -> Self {
        let mut state = GameState {
            board,
            turn: Some(turn),
            terminal: false,
            legal: [false; NUM_CELLS],
        };
        state.refresh_legal_moves();
        state
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::initial()
    }
}
