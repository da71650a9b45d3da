//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`](super::Board), kept apart from the
//! transition function so they can be reused by actors and tests.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::check_winner;
