//! Turn-execution state machine.
//!
//! The engine drives one match from creation to a terminal status:
//!
//! ```text
//! created ──► running ──► finished
//!    │           │
//!    └───────────┴──────► error
//! ```
//!
//! Every step is persisted through the [`MatchStore`] before the next one
//! starts, so a match can be reconstructed from its records alone.

use derive_more::{Display, Error, From};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, error, info, instrument, warn};

use crate::core::actor::{Actor, ActorError};
use crate::core::game::GameSpec;
use crate::core::persistence::{MatchId, MatchStore, StoreError, TurnId};
use crate::core::seed::generate_seed;
use crate::core::types::{ActorId, Event, MatchStatus, Scores, event_types};

/// Actor bound to the action and observation types of game `G`.
pub type ActorFor<'a, G> = dyn Actor<
        Action = <G as GameSpec>::Action,
        Observation = <G as GameSpec>::Observation,
    > + 'a;

/// Result of a completed match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchOutcome {
    /// Store-assigned match identifier.
    pub match_id: MatchId,
    /// Seed the match was played with.
    pub seed: String,
    /// Always [`MatchStatus::Finished`] for a returned outcome.
    pub status: MatchStatus,
    /// Final scores.
    pub scores: Scores,
}

/// Specific error conditions for the engine.
#[derive(Debug, Clone, Display, From)]
pub enum EngineErrorKind {
    /// A persistence call failed.
    #[display("{}", _0)]
    Store(StoreError),
    /// An actor failed to produce an action.
    #[display("{}", _0)]
    Actor(ActorError),
    /// State or action could not be serialized for persistence.
    #[display("Serialization failed: {}", _0)]
    #[from(ignore)]
    Serialization(String),
}

/// Fatal engine fault. The match, if created, is left in `error`.
#[derive(Debug, Clone, Display, Error)]
#[display("Engine error: {} at {}:{}", kind, file, line)]
pub struct EngineError {
    /// What went wrong.
    pub kind: EngineErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl EngineError {
    /// Creates a new engine error with caller location tracking.
    #[track_caller]
    pub fn new(kind: EngineErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Short name of the fault kind, recorded in `engine.error` events.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            EngineErrorKind::Store(_) => "StoreError",
            EngineErrorKind::Actor(_) => "ActorError",
            EngineErrorKind::Serialization(_) => "SerializationError",
        }
    }
}

impl From<StoreError> for EngineError {
    #[track_caller]
    fn from(err: StoreError) -> Self {
        Self::new(EngineErrorKind::Store(err))
    }
}

impl From<ActorError> for EngineError {
    #[track_caller]
    fn from(err: ActorError) -> Self {
        Self::new(EngineErrorKind::Actor(err))
    }
}

#[track_caller]
fn to_json<T: Serialize>(value: &T) -> Result<Value, EngineError> {
    serde_json::to_value(value)
        .map_err(|e| EngineError::new(EngineErrorKind::Serialization(e.to_string())))
}

/// Why the turn loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ending {
    /// The game reached a terminal state.
    Terminal,
    /// An actor submitted an illegal action.
    Forfeit(ActorId),
    /// `max_turns` ran out first.
    TurnLimit { turns_played: u32 },
}

impl Ending {
    fn reason(self) -> Option<&'static str> {
        match self {
            Ending::Terminal => None,
            Ending::Forfeit(_) => Some("forfeit"),
            Ending::TurnLimit { .. } => Some("turn_limit"),
        }
    }
}

/// Runs matches against a record store.
#[derive(Debug)]
pub struct Engine<S> {
    store: S,
}

impl<S: MatchStore> Engine<S> {
    /// Creates an engine writing to `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the engine, returning the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Plays a full match with a freshly generated seed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] on any persistence or actor fault. If the match
    /// record exists it is marked `error` and an `engine.error` event is
    /// recorded before returning.
    #[instrument(skip(self, actor_a, actor_b, game), fields(game_key = G::KEY))]
    pub fn run_match<'a, G: GameSpec>(
        &mut self,
        actor_a: &mut ActorFor<'a, G>,
        actor_b: &mut ActorFor<'a, G>,
        game: &G,
        max_turns: u32,
    ) -> Result<MatchOutcome, EngineError> {
        self.run_match_with_seed(generate_seed(), actor_a, actor_b, game, max_turns)
    }

    /// Plays a full match with the given seed.
    ///
    /// # Errors
    ///
    /// See [`Engine::run_match`].
    #[instrument(skip(self, actor_a, actor_b, game), fields(game_key = G::KEY, version = G::VERSION))]
    pub fn run_match_with_seed<'a, G: GameSpec>(
        &mut self,
        seed: String,
        actor_a: &mut ActorFor<'a, G>,
        actor_b: &mut ActorFor<'a, G>,
        game: &G,
        max_turns: u32,
    ) -> Result<MatchOutcome, EngineError> {
        info!(
            seed = %seed,
            agent_a = actor_a.name(),
            agent_b = actor_b.name(),
            max_turns,
            "Starting match"
        );

        let match_id = self.store.create_match(&seed, G::KEY, G::VERSION)?;
        let mut run = MatchRun {
            store: &mut self.store,
            match_id,
            status: MatchStatus::Created,
        };

        match run.play(&seed, actor_a, actor_b, game, max_turns) {
            Ok(scores) => {
                info!(match_id, seed = %seed, ?scores, "Match finished");
                Ok(MatchOutcome {
                    match_id,
                    seed,
                    status: run.status,
                    scores,
                })
            }
            Err(err) => {
                error!(match_id, error = %err, "Match aborted");
                run.record_failure(&err);
                Err(err)
            }
        }
    }
}

/// Per-match write context tracking the current status.
struct MatchRun<'s, S> {
    store: &'s mut S,
    match_id: MatchId,
    status: MatchStatus,
}

impl<S: MatchStore> MatchRun<'_, S> {
    fn advance(&mut self, next: MatchStatus) -> Result<(), EngineError> {
        self.store.mark_match_status(self.match_id, next)?;
        self.status = next;
        Ok(())
    }

    fn event(
        &mut self,
        event_type: &str,
        payload: &Value,
        turn_id: Option<TurnId>,
    ) -> Result<(), EngineError> {
        let event_id = self
            .store
            .record_event(self.match_id, event_type, payload, turn_id)?;
        debug!(event_id, event_type, ?turn_id, "Event recorded");
        Ok(())
    }

    fn snapshot<G: GameSpec>(
        &mut self,
        state: &G::State,
        turn_id: Option<TurnId>,
    ) -> Result<(), EngineError> {
        let state = to_json(state)?;
        self.store
            .record_snapshot(self.match_id, G::KEY, G::VERSION, &state, turn_id)?;
        Ok(())
    }

    fn play<'a, G: GameSpec>(
        &mut self,
        seed: &str,
        actor_a: &mut ActorFor<'a, G>,
        actor_b: &mut ActorFor<'a, G>,
        game: &G,
        max_turns: u32,
    ) -> Result<Scores, EngineError> {
        self.event(
            event_types::MATCH_STARTED,
            &json!({"seed": seed, "game_key": G::KEY, "game_version": G::VERSION}),
            None,
        )?;

        let state = game.initial_state(seed);
        self.snapshot::<G>(&state, None)?;
        self.advance(MatchStatus::Running)?;

        let (state, ending) = self.turn_loop(actor_a, actor_b, game, state, max_turns)?;

        let scores = match ending {
            Ending::Terminal => game.score(&state),
            Ending::Forfeit(offender) => Scores::forfeit(offender),
            Ending::TurnLimit { turns_played } => {
                info!(turns_played, max_turns, "Turn limit reached");
                self.event(
                    event_types::MATCH_TRUNCATED,
                    &json!({"max_turns": max_turns, "turns_played": turns_played}),
                    None,
                )?;
                Scores::zero()
            }
        };

        let mut payload = json!({"scores": scores});
        if let Some(reason) = ending.reason() {
            payload["reason"] = Value::from(reason);
        }
        self.event(event_types::MATCH_FINISHED, &payload, None)?;
        self.advance(MatchStatus::Finished)?;

        let outcome = Event::new(event_types::MATCH_FINISHED, payload);
        notify(actor_a, &outcome);
        notify(actor_b, &outcome);

        Ok(scores)
    }

    fn turn_loop<'a, G: GameSpec>(
        &mut self,
        actor_a: &mut ActorFor<'a, G>,
        actor_b: &mut ActorFor<'a, G>,
        game: &G,
        mut state: G::State,
        max_turns: u32,
    ) -> Result<(G::State, Ending), EngineError> {
        let mut turns_played = 0;

        for turn in 1..=max_turns {
            if game.is_terminal(&state) {
                break;
            }

            let actor = game.current_actor(&state);
            let turn_payload = json!({"turn": turn, "actor": actor});
            self.event(event_types::TURN_STARTED, &turn_payload, None)?;

            let acting = match actor {
                ActorId::AgentA => &mut *actor_a,
                ActorId::AgentB => &mut *actor_b,
            };
            let observation = game.observation_for(&state, actor);
            let action = acting.produce_action(turn, &observation)?;
            let action_json = to_json(&action)?;
            debug!(turn, %actor, action = %action_json, "Action received");

            let result = match game.apply_action(&state, &action) {
                Ok(result) => result,
                Err(illegal) => {
                    warn!(turn, %actor, reason = %illegal.reason, "Illegal action, forfeiting");
                    self.event(
                        event_types::ILLEGAL_ACTION,
                        &json!({
                            "turn": turn,
                            "actor": actor,
                            "message": illegal.to_string(),
                            "action": action_json,
                        }),
                        None,
                    )?;
                    return Ok((state, Ending::Forfeit(actor)));
                }
            };

            let action_type = game.action_type(&action);
            let turn_id = self.store.record_turn(
                self.match_id,
                turn,
                actor,
                &action_json,
                action_type.as_deref(),
            )?;
            for event in &result.events {
                self.event(&event.event_type, &event.payload, Some(turn_id))?;
            }

            state = result.state_after;
            self.snapshot::<G>(&state, Some(turn_id))?;
            self.event(event_types::TURN_FINISHED, &turn_payload, Some(turn_id))?;
            turns_played = turn;

            if game.is_terminal(&state) {
                break;
            }
        }

        let ending = if game.is_terminal(&state) {
            Ending::Terminal
        } else {
            Ending::TurnLimit { turns_played }
        };
        Ok((state, ending))
    }

    /// Best-effort error bookkeeping; failures here are logged and never mask
    /// the original fault.
    fn record_failure(&mut self, err: &EngineError) {
        if self.status.is_terminal() {
            warn!(match_id = self.match_id, status = %self.status, "Fault after terminal status; leaving record as is");
            return;
        }
        if let Err(e) = self.advance(MatchStatus::Error) {
            error!(match_id = self.match_id, error = %e, "Failed to mark match as error");
        }
        let payload = json!({"message": err.kind.to_string(), "type": err.kind_name()});
        if let Err(e) = self.event(event_types::ERROR, &payload, None) {
            error!(match_id = self.match_id, error = %e, "Failed to record engine.error event");
        }
    }
}

/// Delivers the outcome to one actor, isolating its failure.
fn notify<A, O>(actor: &mut (dyn Actor<Action = A, Observation = O> + '_), outcome: &Event) {
    if let Err(e) = actor.receive_outcome(outcome) {
        error!(actor = actor.name(), error = %e, "receive_outcome failed");
    }
}
