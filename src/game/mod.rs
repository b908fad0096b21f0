//! Core Reversi game logic: board and capture rule, player types, and the
//! game state machine with automatic passing.

mod board;
mod player;
mod state;

pub use board::{Board, Cell, BOARD_SIZE, NUM_CELLS};
pub use player::Player;
pub use state::{action_to_cell, cell_to_action, ActionValues, BoardView, GameState};
