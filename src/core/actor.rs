//! Decision-making participants.

use derive_more::{Display, Error};
use tracing::instrument;

use crate::core::types::Event;

/// Failure inside an actor's decision or notification logic.
#[derive(Debug, Clone, Display, Error)]
#[display("Actor error: {} at {}:{}", message, file, line)]
pub struct ActorError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ActorError {
    /// Creates a new actor error with caller location tracking.
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

/// A participant that proposes actions for one game's action type.
///
/// Bound to a game at match construction; the engine hands it only its own
/// observation.
pub trait Actor {
    /// Action type produced.
    type Action;
    /// Observation type consumed.
    type Observation;

    /// Display name used in logs.
    fn name(&self) -> &str;

    /// Proposes an action for turn `turn_index` (1-based).
    ///
    /// # Errors
    ///
    /// Returns [`ActorError`] if the actor cannot produce an action. The
    /// engine treats this as a fatal match fault.
    fn produce_action(
        &mut self,
        turn_index: u32,
        observation: &Self::Observation,
    ) -> Result<Self::Action, ActorError>;

    /// Called once after the match concludes with an `engine.match_finished`
    /// event carrying the final scores.
    ///
    /// # Errors
    ///
    /// Failures are logged by the engine and never affect the result.
    fn receive_outcome(&mut self, _event: &Event) -> Result<(), ActorError> {
        Ok(())
    }
}
