//! The contract a rule module must satisfy to be driven by the engine.

use derive_more::{Display, Error};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::instrument;

use crate::core::types::{ActorId, Scores, TransitionResult};

/// The action is not valid in the given state.
///
/// A recoverable validation outcome: the engine turns it into a forfeit.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Illegal action: {}", reason)]
pub struct IllegalAction {
    /// Why the action was rejected.
    pub reason: String,
}

impl IllegalAction {
    /// Creates an illegal-action rejection.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A pluggable rule set.
///
/// State, action and observation are opaque structured data to the engine,
/// which only serializes them for persistence and hands them back to the
/// game and the actors.
pub trait GameSpec {
    /// Full game state. Never mutated in place by the engine.
    type State: Clone + Serialize + DeserializeOwned;
    /// A move proposal submitted by an actor.
    type Action: Serialize + DeserializeOwned;
    /// The per-actor projection of state.
    type Observation;

    /// Game key identifying this rule module in persisted records.
    const KEY: &'static str;
    /// Schema version of state/action/observation/event shapes.
    const VERSION: &'static str;

    /// Builds the initial state. Deterministic given `seed`.
    fn initial_state(&self, seed: &str) -> Self::State;

    /// Which actor moves next. Pure function of state.
    fn current_actor(&self, state: &Self::State) -> ActorId;

    /// Applies an action, returning a fresh state and the emitted events.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalAction`] if the action is not valid in `state`.
    fn apply_action(
        &self,
        state: &Self::State,
        action: &Self::Action,
    ) -> Result<TransitionResult<Self::State>, IllegalAction>;

    /// Whether the game is over.
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Final scores. Only meaningful for terminal states.
    fn score(&self, state: &Self::State) -> Scores;

    /// What `actor` is permitted to see of `state`.
    fn observation_for(&self, state: &Self::State, actor: ActorId) -> Self::Observation;

    /// Optional tag stored alongside a turn for indexing.
    fn action_type(&self, _action: &Self::Action) -> Option<String> {
        None
    }

    /// Structural schemas for external validation and codegen.
    fn schemas(&self) -> GameSchemas;
}

/// Which shape a schema document describes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum SchemaKind {
    /// Game state.
    State,
    /// Actor action.
    Action,
    /// Per-actor observation.
    Observation,
    /// Game-level event.
    Event,
}

/// JSON Schema documents for each shape of one game version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSchemas {
    /// Schema for the state shape.
    pub state: Value,
    /// Schema for the action shape.
    pub action: Value,
    /// Schema for the observation shape.
    pub observation: Value,
    /// Schema for game events.
    pub event: Value,
}

impl GameSchemas {
    /// Derives the four schemas from the game's Rust types.
    #[instrument]
    pub fn of<S, A, O, E>() -> Self
    where
        S: JsonSchema,
        A: JsonSchema,
        O: JsonSchema,
        E: JsonSchema,
    {
        Self {
            state: Value::from(schemars::schema_for!(S)),
            action: Value::from(schemars::schema_for!(A)),
            observation: Value::from(schemars::schema_for!(O)),
            event: Value::from(schemars::schema_for!(E)),
        }
    }

    /// Returns the schema for one shape.
    pub fn get(&self, kind: SchemaKind) -> &Value {
        match kind {
            SchemaKind::State => &self.state,
            SchemaKind::Action => &self.action,
            SchemaKind::Observation => &self.observation,
            SchemaKind::Event => &self.event,
        }
    }

    /// Iterates `(kind, schema)` pairs in a fixed order.
    pub fn iter(&self) -> impl Iterator<Item = (SchemaKind, &Value)> {
        <SchemaKind as strum::IntoEnumIterator>::iter().map(move |kind| (kind, self.get(kind)))
    }
}
