//! In-process record store for dry runs and tests.

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::core::persistence::{
    EventId, EventRecord, HistorySource, MatchHistory, MatchId, MatchRecord, MatchStore,
    SnapshotId, SnapshotRecord, StoreError, TurnId, TurnRecord,
};
use crate::core::types::{ActorId, MatchStatus};

#[derive(Debug, Clone)]
struct StoredMatch {
    record: MatchRecord,
    status: MatchStatus,
    turns: Vec<TurnRecord>,
    events: Vec<EventRecord>,
    snapshots: Vec<SnapshotRecord>,
}

/// [`MatchStore`] keeping every record in memory.
///
/// Identifiers are assigned from a single counter per record kind, starting
/// at 1, like an autoincrement column.
#[derive(Debug, Clone, Default)]
pub struct MemoryMatchStore {
    matches: Vec<StoredMatch>,
    next_turn: TurnId,
    next_event: EventId,
    next_snapshot: SnapshotId,
}

impl MemoryMatchStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of matches created so far.
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Current status of a match, if it exists.
    pub fn status(&self, match_id: MatchId) -> Option<MatchStatus> {
        self.get(match_id).ok().map(|m| m.status)
    }

    fn get(&self, match_id: MatchId) -> Result<&StoredMatch, StoreError> {
        usize::try_from(match_id)
            .ok()
            .and_then(|id| id.checked_sub(1))
            .and_then(|idx| self.matches.get(idx))
            .ok_or_else(|| StoreError::new(format!("Unknown match {}", match_id)))
    }

    fn get_mut(&mut self, match_id: MatchId) -> Result<&mut StoredMatch, StoreError> {
        usize::try_from(match_id)
            .ok()
            .and_then(|id| id.checked_sub(1))
            .and_then(|idx| self.matches.get_mut(idx))
            .ok_or_else(|| StoreError::new(format!("Unknown match {}", match_id)))
    }
}

impl MatchStore for MemoryMatchStore {
    #[instrument(skip(self))]
    fn create_match(
        &mut self,
        seed: &str,
        game_key: &str,
        game_version: &str,
    ) -> Result<MatchId, StoreError> {
        let id = MatchId::try_from(self.matches.len() + 1)
            .map_err(|_| StoreError::new("Match id space exhausted"))?;
        self.matches.push(StoredMatch {
            record: MatchRecord::new(
                id,
                seed.to_string(),
                game_key.to_string(),
                game_version.to_string(),
                MatchStatus::Created,
            ),
            status: MatchStatus::Created,
            turns: Vec::new(),
            events: Vec::new(),
            snapshots: Vec::new(),
        });
        debug!(match_id = id, "Match created");
        Ok(id)
    }

    #[instrument(skip(self, action))]
    fn record_turn(
        &mut self,
        match_id: MatchId,
        idx: u32,
        actor: ActorId,
        action: &Value,
        action_type: Option<&str>,
    ) -> Result<TurnId, StoreError> {
        self.next_turn += 1;
        let id = self.next_turn;
        let stored = self.get_mut(match_id)?;
        if stored.turns.iter().any(|t| *t.idx() == idx) {
            return Err(StoreError::new(format!(
                "Turn {} already recorded for match {}",
                idx, match_id
            )));
        }
        stored.turns.push(TurnRecord::new(
            id,
            idx,
            actor,
            action.clone(),
            action_type.map(str::to_string),
        ));
        Ok(id)
    }

    #[instrument(skip(self, payload))]
    fn record_event(
        &mut self,
        match_id: MatchId,
        event_type: &str,
        payload: &Value,
        turn_id: Option<TurnId>,
    ) -> Result<EventId, StoreError> {
        self.next_event += 1;
        let id = self.next_event;
        self.get_mut(match_id)?.events.push(EventRecord::new(
            id,
            turn_id,
            event_type.to_string(),
            payload.clone(),
        ));
        Ok(id)
    }

    #[instrument(skip(self, state))]
    fn record_snapshot(
        &mut self,
        match_id: MatchId,
        game_key: &str,
        game_version: &str,
        state: &Value,
        turn_id: Option<TurnId>,
    ) -> Result<SnapshotId, StoreError> {
        self.next_snapshot += 1;
        let id = self.next_snapshot;
        self.get_mut(match_id)?.snapshots.push(SnapshotRecord::new(
            id,
            turn_id,
            game_key.to_string(),
            game_version.to_string(),
            state.clone(),
        ));
        Ok(id)
    }

    #[instrument(skip(self))]
    fn mark_match_status(
        &mut self,
        match_id: MatchId,
        status: MatchStatus,
    ) -> Result<(), StoreError> {
        let stored = self.get_mut(match_id)?;
        if !stored.status.can_transition_to(status) {
            warn!(from = %stored.status, to = %status, "Rejected status regression");
            return Err(StoreError::new(format!(
                "Match {} cannot move from {} to {}",
                match_id, stored.status, status
            )));
        }
        stored.status = status;
        Ok(())
    }
}

impl HistorySource for MemoryMatchStore {
    #[instrument(skip(self))]
    fn load_history(&self, match_id: MatchId) -> Result<MatchHistory, StoreError> {
        let stored = self.get(match_id)?;
        let record = MatchRecord::new(
            *stored.record.id(),
            stored.record.seed().clone(),
            stored.record.game_key().clone(),
            stored.record.game_version().clone(),
            stored.status,
        );
        Ok(MatchHistory::new(
            record,
            stored.turns.clone(),
            stored.events.clone(),
            stored.snapshots.clone(),
        ))
    }
}
