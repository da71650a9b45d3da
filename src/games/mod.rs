//! Pluggable rule modules.

pub mod tictactoe;
