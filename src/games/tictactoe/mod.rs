//! Reference game: tic-tac-toe.

mod agents;
mod game;
pub mod rules;
mod types;

pub use agents::{FirstAvailableAgent, RandomLegalAgent};
pub use game::TicTacToe;
pub use types::{
    Board, Cell, Placement, SIZE, TicTacToeAction, TicTacToeEvent, TicTacToeObservation,
    TicTacToeState,
};
