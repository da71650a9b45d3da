//! Re-derives recorded snapshots from recorded turns.

use derive_more::Display;
use tracing::{debug, info, instrument};

use crate::core::game::GameSpec;
use crate::core::persistence::MatchHistory;

/// Ways a recorded history can fail to replay.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum ReplayError {
    /// The history has no initial snapshot.
    #[display("Match has no initial snapshot")]
    MissingInitialSnapshot,
    /// A turn has no snapshot tied to it.
    #[display("Turn {} has no snapshot", _0)]
    MissingSnapshot(u32),
    /// Turn indices are not contiguous from 1.
    #[display("Expected turn index {}, found {}", expected, found)]
    IndexGap {
        /// Index that should come next.
        expected: u32,
        /// Index actually recorded.
        found: u32,
    },
    /// A recorded state or action did not deserialize.
    #[display("Turn {}: cannot decode recorded data: {}", turn, message)]
    Decode {
        /// Turn being replayed (0 for the initial snapshot).
        turn: u32,
        /// Decoder message.
        message: String,
    },
    /// The game rejected a recorded action.
    #[display("Turn {}: recorded action rejected: {}", turn, reason)]
    Rejected {
        /// Turn being replayed.
        turn: u32,
        /// Rejection reason.
        reason: String,
    },
    /// Re-applying the action produced a different state.
    #[display("Turn {}: snapshot diverges from replayed state", _0)]
    Diverged(u32),
}

impl std::error::Error for ReplayError {}

/// Replays every recorded turn through `game` and checks each resulting
/// state against the snapshot recorded for that turn.
///
/// Returns the number of turns verified.
///
/// # Errors
///
/// Returns the first [`ReplayError`] encountered.
#[instrument(skip(game, history), fields(match_id = history.record().id(), game_key = G::KEY))]
pub fn verify_replay<G: GameSpec>(game: &G, history: &MatchHistory) -> Result<usize, ReplayError> {
    let initial = history
        .initial_snapshot()
        .ok_or(ReplayError::MissingInitialSnapshot)?;
    let mut state: G::State =
        serde_json::from_value(initial.state().clone()).map_err(|e| ReplayError::Decode {
            turn: 0,
            message: e.to_string(),
        })?;

    let mut turns: Vec<_> = history.turns().iter().collect();
    turns.sort_by_key(|t| *t.idx());

    for (expected, turn) in (1u32..).zip(turns.iter()) {
        let idx = *turn.idx();
        if idx != expected {
            return Err(ReplayError::IndexGap {
                expected,
                found: idx,
            });
        }

        let action: G::Action =
            serde_json::from_value(turn.action().clone()).map_err(|e| ReplayError::Decode {
                turn: idx,
                message: e.to_string(),
            })?;
        let result = game
            .apply_action(&state, &action)
            .map_err(|e| ReplayError::Rejected {
                turn: idx,
                reason: e.reason,
            })?;
        state = result.state_after;

        let recorded = history
            .snapshot_after(*turn.id())
            .ok_or(ReplayError::MissingSnapshot(idx))?;
        let replayed = serde_json::to_value(&state).map_err(|e| ReplayError::Decode {
            turn: idx,
            message: e.to_string(),
        })?;
        if &replayed != recorded.state() {
            return Err(ReplayError::Diverged(idx));
        }
        debug!(turn = idx, "Turn verified");
    }

    info!(turns = turns.len(), "Replay verified");
    Ok(turns.len())
}
