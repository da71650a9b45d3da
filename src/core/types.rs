//! Transition model shared by every game implementation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

/// Event types emitted by the engine itself (game events use `game.*`).
pub mod event_types {
    /// Match record created and seed chosen.
    pub const MATCH_STARTED: &str = "engine.match_started";
    /// An actor is about to be asked for an action.
    pub const TURN_STARTED: &str = "engine.turn_started";
    /// The submitted action was rejected by the game; the actor forfeits.
    pub const ILLEGAL_ACTION: &str = "engine.illegal_action";
    /// An accepted action has been applied and persisted.
    pub const TURN_FINISHED: &str = "engine.turn_finished";
    /// The turn limit ran out before the game reached a terminal state.
    pub const MATCH_TRUNCATED: &str = "engine.match_truncated";
    /// Final scores recorded. Exactly once per finished match.
    pub const MATCH_FINISHED: &str = "engine.match_finished";
    /// Unexpected fault; the match is left in `error`.
    pub const ERROR: &str = "engine.error";
}

/// One of the two fixed actor slots in a match.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum ActorId {
    /// First actor; moves first in the reference game.
    #[serde(rename = "agentA")]
    #[strum(serialize = "agentA")]
    AgentA,
    /// Second actor.
    #[serde(rename = "agentB")]
    #[strum(serialize = "agentB")]
    AgentB,
}

impl ActorId {
    /// Returns the other actor.
    pub fn opponent(self) -> Self {
        match self {
            ActorId::AgentA => ActorId::AgentB,
            ActorId::AgentB => ActorId::AgentA,
        }
    }
}

/// An immutable, typed fact appended to a match's audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event type tag, e.g. `game.move_applied`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Structured body. Opaque to the engine.
    #[serde(default)]
    pub payload: Value,
}

impl Event {
    /// Creates an event with the given type and payload.
    pub fn new(event_type: impl Into<String>, payload: Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
        }
    }

    /// Creates an event with an empty object payload.
    pub fn bare(event_type: impl Into<String>) -> Self {
        Self::new(event_type, Value::Object(Map::new()))
    }
}

/// Outcome of applying one action: the new state plus the events it produced,
/// in emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult<S> {
    /// State after the action.
    pub state_after: S,
    /// Events emitted while applying the action.
    pub events: Vec<Event>,
}

impl<S> TransitionResult<S> {
    /// Creates a transition result.
    pub fn new(state_after: S, events: Vec<Event>) -> Self {
        Self {
            state_after,
            events,
        }
    }
}

/// Final score per actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Scores {
    /// Score awarded to `agentA`.
    #[serde(rename = "agentA")]
    pub agent_a: f64,
    /// Score awarded to `agentB`.
    #[serde(rename = "agentB")]
    pub agent_b: f64,
}

impl Scores {
    /// Creates a score pair.
    pub fn new(agent_a: f64, agent_b: f64) -> Self {
        Self { agent_a, agent_b }
    }

    /// Both actors score zero (turn limit exhausted).
    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Half a point each.
    pub fn draw() -> Self {
        Self::new(0.5, 0.5)
    }

    /// `winner` gets 1.0, the other actor 0.0.
    pub fn win_for(winner: ActorId) -> Self {
        match winner {
            ActorId::AgentA => Self::new(1.0, 0.0),
            ActorId::AgentB => Self::new(0.0, 1.0),
        }
    }

    /// Binary forfeiture: the offender gets 0.0 and the opponent 1.0.
    #[instrument]
    pub fn forfeit(offender: ActorId) -> Self {
        Self::win_for(offender.opponent())
    }

    /// Score for the given actor.
    pub fn get(&self, actor: ActorId) -> f64 {
        match actor {
            ActorId::AgentA => self.agent_a,
            ActorId::AgentB => self.agent_b,
        }
    }
}

/// Lifecycle status of a match. Advances monotonically, never reverts.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchStatus {
    /// Record exists, nothing played yet.
    Created,
    /// Initial state recorded, turns in progress.
    Running,
    /// Final scores recorded.
    Finished,
    /// Aborted by an engine fault.
    Error,
}

impl MatchStatus {
    /// Whether no further transition may leave this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchStatus::Finished | MatchStatus::Error)
    }

    /// Whether moving from `self` to `next` keeps the status monotonic.
    #[instrument]
    pub fn can_transition_to(self, next: MatchStatus) -> bool {
        match self {
            MatchStatus::Created => next != MatchStatus::Created,
            MatchStatus::Running => next.is_terminal(),
            MatchStatus::Finished | MatchStatus::Error => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_actor_serializes_as_slot_name() {
        assert_eq!(serde_json::to_value(ActorId::AgentA).unwrap(), "agentA");
        assert_eq!(ActorId::AgentB.to_string(), "agentB");
        assert_eq!(ActorId::from_str("agentB").unwrap(), ActorId::AgentB);
    }

    #[test]
    fn test_forfeit_favors_opponent() {
        let scores = Scores::forfeit(ActorId::AgentA);
        assert_eq!(scores.get(ActorId::AgentA), 0.0);
        assert_eq!(scores.get(ActorId::AgentB), 1.0);
    }

    #[test]
    fn test_scores_serialize_keyed_by_actor() {
        let value = serde_json::to_value(Scores::draw()).unwrap();
        assert_eq!(value, serde_json::json!({"agentA": 0.5, "agentB": 0.5}));
    }

    #[test]
    fn test_status_never_reverts() {
        assert!(MatchStatus::Created.can_transition_to(MatchStatus::Running));
        assert!(MatchStatus::Running.can_transition_to(MatchStatus::Finished));
        assert!(MatchStatus::Running.can_transition_to(MatchStatus::Error));
        assert!(!MatchStatus::Running.can_transition_to(MatchStatus::Created));
        assert!(!MatchStatus::Finished.can_transition_to(MatchStatus::Error));
        assert!(!MatchStatus::Error.can_transition_to(MatchStatus::Finished));
    }

    #[test]
    fn test_status_round_trips_through_text() {
        assert_eq!(MatchStatus::Finished.as_ref(), "finished");
        assert_eq!(MatchStatus::from_str("error").unwrap(), MatchStatus::Error);
    }
}
