//! Persistence port: the narrow record-store interface the engine writes to.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::core::types::{ActorId, MatchStatus};

/// Identifier assigned to a match by the store.
pub type MatchId = i32;
/// Identifier assigned to a turn by the store.
pub type TurnId = i32;
/// Identifier assigned to an event by the store.
pub type EventId = i32;
/// Identifier assigned to a snapshot by the store.
pub type SnapshotId = i32;

/// Failure of a persistence call. Fatal to the running match.
#[derive(Debug, Clone, Display, Error)]
#[display("Store error: {} at {}:{}", message, file, line)]
pub struct StoreError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new store error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Append-only record store for match history.
///
/// Every call is expected to be atomic and durable on return. The engine
/// issues calls in a fixed order and never retries.
pub trait MatchStore {
    /// Creates a match record with status `created`.
    fn create_match(
        &mut self,
        seed: &str,
        game_key: &str,
        game_version: &str,
    ) -> Result<MatchId, StoreError>;

    /// Records one accepted action.
    fn record_turn(
        &mut self,
        match_id: MatchId,
        idx: u32,
        actor: ActorId,
        action: &Value,
        action_type: Option<&str>,
    ) -> Result<TurnId, StoreError>;

    /// Appends an event to the match log.
    fn record_event(
        &mut self,
        match_id: MatchId,
        event_type: &str,
        payload: &Value,
        turn_id: Option<TurnId>,
    ) -> Result<EventId, StoreError>;

    /// Records a full state snapshot.
    fn record_snapshot(
        &mut self,
        match_id: MatchId,
        game_key: &str,
        game_version: &str,
        state: &Value,
        turn_id: Option<TurnId>,
    ) -> Result<SnapshotId, StoreError>;

    /// Advances the match status.
    ///
    /// # Errors
    ///
    /// Implementations reject non-monotonic transitions.
    fn mark_match_status(&mut self, match_id: MatchId, status: MatchStatus)
    -> Result<(), StoreError>;
}

impl<T: MatchStore + ?Sized> MatchStore for &mut T {
    fn create_match(
        &mut self,
        seed: &str,
        game_key: &str,
        game_version: &str,
    ) -> Result<MatchId, StoreError> {
        (**self).create_match(seed, game_key, game_version)
    }

    fn record_turn(
        &mut self,
        match_id: MatchId,
        idx: u32,
        actor: ActorId,
        action: &Value,
        action_type: Option<&str>,
    ) -> Result<TurnId, StoreError> {
        (**self).record_turn(match_id, idx, actor, action, action_type)
    }

    fn record_event(
        &mut self,
        match_id: MatchId,
        event_type: &str,
        payload: &Value,
        turn_id: Option<TurnId>,
    ) -> Result<EventId, StoreError> {
        (**self).record_event(match_id, event_type, payload, turn_id)
    }

    fn record_snapshot(
        &mut self,
        match_id: MatchId,
        game_key: &str,
        game_version: &str,
        state: &Value,
        turn_id: Option<TurnId>,
    ) -> Result<SnapshotId, StoreError> {
        (**self).record_snapshot(match_id, game_key, game_version, state, turn_id)
    }

    fn mark_match_status(
        &mut self,
        match_id: MatchId,
        status: MatchStatus,
    ) -> Result<(), StoreError> {
        (**self).mark_match_status(match_id, status)
    }
}

/// Read side of the store, used for inspection and replay.
pub trait HistorySource {
    /// Loads a match with all of its turns, events and snapshots in
    /// insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the match does not exist or cannot be read.
    fn load_history(&self, match_id: MatchId) -> Result<MatchHistory, StoreError>;
}

/// A persisted match row.
#[derive(Debug, Clone, PartialEq, Serialize, Getters, new)]
pub struct MatchRecord {
    id: MatchId,
    seed: String,
    game_key: String,
    game_version: String,
    status: MatchStatus,
}

/// A persisted turn.
#[derive(Debug, Clone, PartialEq, Serialize, Getters, new)]
pub struct TurnRecord {
    id: TurnId,
    idx: u32,
    actor: ActorId,
    action: Value,
    action_type: Option<String>,
}

/// A persisted event.
#[derive(Debug, Clone, PartialEq, Serialize, Getters, new)]
pub struct EventRecord {
    id: EventId,
    turn_id: Option<TurnId>,
    event_type: String,
    payload: Value,
}

/// A persisted state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Getters, new)]
pub struct SnapshotRecord {
    id: SnapshotId,
    turn_id: Option<TurnId>,
    game_key: String,
    game_version: String,
    state: Value,
}

/// Everything recorded for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Getters, new)]
pub struct MatchHistory {
    record: MatchRecord,
    turns: Vec<TurnRecord>,
    events: Vec<EventRecord>,
    snapshots: Vec<SnapshotRecord>,
}

impl MatchHistory {
    /// The snapshot recorded before any turn.
    pub fn initial_snapshot(&self) -> Option<&SnapshotRecord> {
        self.snapshots.iter().find(|s| s.turn_id.is_none())
    }

    /// The snapshot recorded after the given turn.
    pub fn snapshot_after(&self, turn_id: TurnId) -> Option<&SnapshotRecord> {
        self.snapshots.iter().find(|s| s.turn_id == Some(turn_id))
    }

    /// Events of the given type, in log order.
    pub fn events_of_type<'a>(
        &'a self,
        event_type: &'a str,
    ) -> impl Iterator<Item = &'a EventRecord> + 'a {
        self.events.iter().filter(move |e| e.event_type == event_type)
    }
}
