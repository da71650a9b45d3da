//! SQLite persistence for match history and the schema registry.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub use error::DbError;
pub use models::{
    EventRow, GameSchemaRow, MatchRow, NewEventRow, NewGameSchemaRow, NewMatchRow, NewSnapshotRow,
    NewTurnRow, SnapshotRow, TurnRow,
};
pub use repository::MatchRepository;

/// Migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
