//! Match engine core: transition model, game and actor contracts,
//! persistence port, and the turn-execution state machine.

mod actor;
mod engine;
mod game;
mod memory;
mod persistence;
mod replay;
mod seed;
mod types;

pub use actor::{Actor, ActorError};
pub use engine::{ActorFor, Engine, EngineError, EngineErrorKind, MatchOutcome};
pub use game::{GameSchemas, GameSpec, IllegalAction, SchemaKind};
pub use memory::MemoryMatchStore;
pub use persistence::{
    EventId, EventRecord, HistorySource, MatchHistory, MatchId, MatchRecord, MatchStore,
    SnapshotId, SnapshotRecord, StoreError, TurnId, TurnRecord,
};
pub use replay::{ReplayError, verify_replay};
pub use seed::{SEED_LEN, generate_seed, seeded_rng};
pub use types::{ActorId, Event, MatchStatus, Scores, TransitionResult, event_types};
