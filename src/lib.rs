//! Strictly Arena library - two-actor turn-based matches with an
//! event-sourced history.
//!
//! # Architecture
//!
//! - **Engine**: turn-execution state machine generic over any [`GameSpec`]
//! - **Actors**: anything implementing [`Actor`] for the game's action and
//!   observation types
//! - **Persistence**: [`MatchStore`] port, backed by SQLite ([`MatchRepository`])
//!   or memory ([`MemoryMatchStore`])
//! - **Games**: reference rule sets (currently tic-tac-toe)
//!
//! # Example
//!
//! ```
//! use strictly_arena::games::tictactoe::{FirstAvailableAgent, TicTacToe};
//! use strictly_arena::{Engine, MatchStatus, MemoryMatchStore};
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut engine = Engine::new(MemoryMatchStore::new());
//! let mut agent_a = FirstAvailableAgent::new("a");
//! let mut agent_b = FirstAvailableAgent::new("b");
//!
//! let outcome = engine.run_match(&mut agent_a, &mut agent_b, &TicTacToe, 9)?;
//! assert_eq!(outcome.status, MatchStatus::Finished);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod core;
mod db;

pub mod games;

// Crate-level exports - Configuration
pub use crate::config::{AgentKind, ArenaConfig, ConfigError, DATABASE_URL_ENV};

// Crate-level exports - Match engine
pub use crate::core::{ActorFor, Engine, EngineError, EngineErrorKind, MatchOutcome};

// Crate-level exports - Game and actor contracts
pub use crate::core::{
    Actor, ActorError, ActorId, Event, GameSchemas, GameSpec, IllegalAction, MatchStatus,
    SchemaKind, Scores, TransitionResult, event_types,
};

// Crate-level exports - Persistence port and records
pub use crate::core::{
    EventId, EventRecord, HistorySource, MatchHistory, MatchId, MatchRecord, MatchStore,
    MemoryMatchStore, SnapshotId, SnapshotRecord, StoreError, TurnId, TurnRecord,
};

// Crate-level exports - Seeds and replay
pub use crate::core::{ReplayError, SEED_LEN, generate_seed, seeded_rng, verify_replay};

// Crate-level exports - SQLite persistence
pub use crate::db::{DbError, GameSchemaRow, MIGRATIONS, MatchRepository};
