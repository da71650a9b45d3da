//! Database models and their conversion into match records.

use std::str::FromStr;

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use tracing::instrument;

use crate::core::{ActorId, EventRecord, MatchRecord, MatchStatus, SnapshotRecord, TurnRecord};
use crate::db::{DbError, schema};

/// Match database model.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::matches)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MatchRow {
    id: i32,
    seed: String,
    status: String,
    game_key: String,
    game_version: String,
    created_at: NaiveDateTime,
}

impl MatchRow {
    /// Parses the stored status string.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the column holds an unknown status.
    #[instrument(skip(self), fields(status = %self.status))]
    pub fn parse_status(&self) -> Result<MatchStatus, DbError> {
        MatchStatus::from_str(&self.status)
            .map_err(|_| DbError::new(format!("Invalid match status: '{}'", self.status)))
    }

    /// Converts into the engine-facing record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the status column is invalid.
    pub fn into_record(self) -> Result<MatchRecord, DbError> {
        let status = self.parse_status()?;
        Ok(MatchRecord::new(
            self.id,
            self.seed,
            self.game_key,
            self.game_version,
            status,
        ))
    }
}

/// Insertable match model.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::matches)]
pub struct NewMatchRow {
    seed: String,
    status: String,
    game_key: String,
    game_version: String,
}

/// Turn database model.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::turns)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TurnRow {
    id: i32,
    match_id: i32,
    idx: i32,
    actor: String,
    action: String,
    action_type: Option<String>,
    created_at: NaiveDateTime,
}

impl TurnRow {
    /// Converts into the engine-facing record, decoding the JSON action.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on an invalid actor, index or action column.
    pub fn into_record(self) -> Result<TurnRecord, DbError> {
        let actor = ActorId::from_str(&self.actor)
            .map_err(|_| DbError::new(format!("Invalid actor: '{}'", self.actor)))?;
        let idx = u32::try_from(self.idx)
            .map_err(|_| DbError::new(format!("Invalid turn index: {}", self.idx)))?;
        Ok(TurnRecord::new(
            self.id,
            idx,
            actor,
            serde_json::from_str(&self.action)?,
            self.action_type,
        ))
    }
}

/// Insertable turn model.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::turns)]
pub struct NewTurnRow {
    match_id: i32,
    idx: i32,
    actor: String,
    action: String,
    action_type: Option<String>,
}

/// Event database model.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EventRow {
    id: i32,
    match_id: i32,
    turn_id: Option<i32>,
    event_type: String,
    payload: String,
    created_at: NaiveDateTime,
}

impl EventRow {
    /// Converts into the engine-facing record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the payload column is not valid JSON.
    pub fn into_record(self) -> Result<EventRecord, DbError> {
        Ok(EventRecord::new(
            self.id,
            self.turn_id,
            self.event_type,
            serde_json::from_str(&self.payload)?,
        ))
    }
}

/// Insertable event model.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::events)]
pub struct NewEventRow {
    match_id: i32,
    turn_id: Option<i32>,
    event_type: String,
    payload: String,
}

/// State snapshot database model.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::state_snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SnapshotRow {
    id: i32,
    match_id: i32,
    turn_id: Option<i32>,
    game_key: String,
    game_version: String,
    state: String,
    created_at: NaiveDateTime,
}

impl SnapshotRow {
    /// Converts into the engine-facing record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the state column is not valid JSON.
    pub fn into_record(self) -> Result<SnapshotRecord, DbError> {
        Ok(SnapshotRecord::new(
            self.id,
            self.turn_id,
            self.game_key,
            self.game_version,
            serde_json::from_str(&self.state)?,
        ))
    }
}

/// Insertable snapshot model.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::state_snapshots)]
pub struct NewSnapshotRow {
    match_id: i32,
    turn_id: Option<i32>,
    game_key: String,
    game_version: String,
    state: String,
}

/// Schema registry entry.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::game_schemas)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GameSchemaRow {
    id: i32,
    game_key: String,
    game_version: String,
    kind: String,
    document: String,
    created_at: NaiveDateTime,
}

/// Insertable schema registry entry.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::game_schemas)]
pub struct NewGameSchemaRow {
    game_key: String,
    game_version: String,
    kind: String,
    document: String,
}
