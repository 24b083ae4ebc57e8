//! Game model for the 4x4x4 cube: bitboard state, players, and the turn
//! state machine that drives the external engine.

mod board;
pub mod controller;
mod player;

pub use board::{BoardState, Cell, Column, CELLS, SIZE};
pub use controller::{GameController, GameMode, TurnError, TurnState, Winner};
pub use player::Player;
