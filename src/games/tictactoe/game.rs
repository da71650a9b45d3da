//! Tic-tac-toe as a [`GameSpec`].
//!
//! `agentA` plays `X` and moves first; turns alternate. The transition
//! function never mutates its input: every accepted move yields a fresh
//! [`TicTacToeState`].

use tracing::{debug, instrument};

use super::rules::{check_winner, is_full};
use super::types::{
    Cell, Placement, SIZE, TicTacToeAction, TicTacToeEvent, TicTacToeObservation, TicTacToeState,
};
use crate::core::{ActorId, Event, GameSchemas, GameSpec, IllegalAction, Scores, TransitionResult};

/// Tic-tac-toe rule module.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicTacToe;

impl TicTacToe {
    /// Creates the rule module.
    pub fn new() -> Self {
        Self
    }
}

/// Validates a placement, returning in-bounds `(row, col)`.
fn checked_cell(placement: Placement) -> Result<(usize, usize), IllegalAction> {
    let in_range = |v: i32| usize::try_from(v).ok().filter(|v| *v < SIZE);
    match (in_range(placement.row), in_range(placement.col)) {
        (Some(row), Some(col)) => Ok((row, col)),
        _ => Err(IllegalAction::new(format!(
            "Move out of bounds: ({}, {})",
            placement.row, placement.col
        ))),
    }
}

impl GameSpec for TicTacToe {
    type State = TicTacToeState;
    type Action = TicTacToeAction;
    type Observation = TicTacToeObservation;

    const KEY: &'static str = "tictactoe";
    const VERSION: &'static str = "v1";

    #[instrument(skip(self))]
    fn initial_state(&self, _seed: &str) -> TicTacToeState {
        // No randomized setup: the empty board is the same for every seed.
        TicTacToeState::new()
    }

    fn current_actor(&self, state: &TicTacToeState) -> ActorId {
        state.player
    }

    #[instrument(skip(self, state), fields(player = %state.player))]
    fn apply_action(
        &self,
        state: &TicTacToeState,
        action: &TicTacToeAction,
    ) -> Result<TransitionResult<TicTacToeState>, IllegalAction> {
        let TicTacToeAction::Move(placement) = *action;
        let (row, col) = checked_cell(placement)?;
        if state.winner.is_some() || is_full(&state.board) {
            return Err(IllegalAction::new("Game already finished"));
        }
        if !state.board.is_empty(row, col) {
            return Err(IllegalAction::new(format!(
                "Cell occupied: ({}, {})",
                row, col
            )));
        }

        let mark = Cell::mark_of(state.player);
        let mut board = state.board.clone();
        board.set(row, col, mark);

        let mut events: Vec<Event> = vec![TicTacToeEvent::MoveApplied { row, col, mark }.into()];
        let winner = check_winner(&board);
        if let Some(winner) = winner {
            events.push(TicTacToeEvent::Win { winner }.into());
        } else if is_full(&board) {
            events.push(TicTacToeEvent::Draw {}.into());
        }

        debug!(row, col, mark = mark.symbol(), ?winner, "Move applied");
        Ok(TransitionResult::new(
            TicTacToeState {
                board,
                player: state.player.opponent(),
                winner,
            },
            events,
        ))
    }

    fn is_terminal(&self, state: &TicTacToeState) -> bool {
        state.winner.is_some() || is_full(&state.board)
    }

    #[instrument(skip(self, state))]
    fn score(&self, state: &TicTacToeState) -> Scores {
        match state.winner {
            Some(winner) => Scores::win_for(winner),
            None => Scores::draw(),
        }
    }

    fn observation_for(&self, state: &TicTacToeState, actor: ActorId) -> TicTacToeObservation {
        TicTacToeObservation {
            board: state.board.clone(),
            you: actor,
        }
    }

    fn action_type(&self, action: &TicTacToeAction) -> Option<String> {
        match action {
            TicTacToeAction::Move(_) => Some("move".to_string()),
        }
    }

    #[instrument(skip(self))]
    fn schemas(&self) -> GameSchemas {
        GameSchemas::of::<TicTacToeState, TicTacToeAction, TicTacToeObservation, TicTacToeEvent>()
    }
}
