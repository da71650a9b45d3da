//! SQLite repository implementing the match persistence port.

use std::str::FromStr;

use diesel::prelude::*;
use diesel_migrations::MigrationHarness;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::core::{
    ActorId, EventId, GameSchemas, HistorySource, MatchHistory, MatchId, MatchRecord, MatchStatus,
    MatchStore, SnapshotId, StoreError, TurnId,
};
use crate::db::{
    DbError, EventRow, GameSchemaRow, MIGRATIONS, MatchRow, NewEventRow, NewGameSchemaRow,
    NewMatchRow, NewSnapshotRow, NewTurnRow, SnapshotRow, TurnRow, schema,
};

/// Database repository for match history.
///
/// Each call opens its own connection and commits before returning.
#[derive(Debug, Clone)]
pub struct MatchRepository {
    db_path: String,
}

impl MatchRepository {
    /// Creates a new repository for the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new("Database path is empty"));
        }
        info!(path = %db_path, "Creating MatchRepository");
        Ok(Self { db_path })
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }

    /// Applies any pending embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migration failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Gets a match by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_match(&self, match_id: MatchId) -> Result<Option<MatchRecord>, DbError> {
        let mut conn = self.connection()?;
        schema::matches::table
            .find(match_id)
            .select(MatchRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(MatchRow::into_record)
            .transpose()
    }

    /// Lists matches, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_matches(&self, limit: i64) -> Result<Vec<MatchRecord>, DbError> {
        debug!("Listing matches");
        let mut conn = self.connection()?;

        let rows = schema::matches::table
            .order(schema::matches::id.desc())
            .limit(limit)
            .select(MatchRow::as_select())
            .load(&mut conn)?;

        info!(count = rows.len(), "Matches loaded");
        rows.into_iter().map(MatchRow::into_record).collect()
    }

    /// Stores the schema documents of one game version, replacing any
    /// previous entry for the same `(game_key, game_version, kind)`.
    ///
    /// Returns the number of documents written.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, schemas))]
    pub fn register_schemas(
        &self,
        game_key: &str,
        game_version: &str,
        schemas: &GameSchemas,
    ) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let written = conn.transaction::<_, DbError, _>(|conn| {
            let mut written = 0;
            for (kind, schema_doc) in schemas.iter() {
                let row = NewGameSchemaRow::new(
                    game_key.to_string(),
                    game_version.to_string(),
                    kind.to_string(),
                    serde_json::to_string(schema_doc)?,
                );
                written += diesel::replace_into(schema::game_schemas::table)
                    .values(&row)
                    .execute(conn)?;
            }
            Ok(written)
        })?;

        info!(game_key, game_version, written, "Schemas registered");
        Ok(written)
    }

    /// Loads the registered schema documents for one game version.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn registered_schemas(
        &self,
        game_key: &str,
        game_version: &str,
    ) -> Result<Vec<GameSchemaRow>, DbError> {
        let mut conn = self.connection()?;
        let rows = schema::game_schemas::table
            .filter(schema::game_schemas::game_key.eq(game_key))
            .filter(schema::game_schemas::game_version.eq(game_version))
            .order(schema::game_schemas::id.asc())
            .select(GameSchemaRow::as_select())
            .load(&mut conn)?;
        Ok(rows)
    }

    #[instrument(skip(self))]
    fn insert_match(
        &self,
        seed: &str,
        game_key: &str,
        game_version: &str,
    ) -> Result<MatchId, DbError> {
        let mut conn = self.connection()?;
        let row = NewMatchRow::new(
            seed.to_string(),
            MatchStatus::Created.to_string(),
            game_key.to_string(),
            game_version.to_string(),
        );

        let id = diesel::insert_into(schema::matches::table)
            .values(&row)
            .returning(schema::matches::id)
            .get_result::<i32>(&mut conn)?;

        info!(match_id = id, "Match created");
        Ok(id)
    }

    #[instrument(skip(self, action))]
    fn insert_turn(
        &self,
        match_id: MatchId,
        idx: u32,
        actor: ActorId,
        action: &Value,
        action_type: Option<&str>,
    ) -> Result<TurnId, DbError> {
        let mut conn = self.connection()?;
        let idx = i32::try_from(idx).map_err(|_| DbError::new("Turn index overflow"))?;
        let row = NewTurnRow::new(
            match_id,
            idx,
            actor.to_string(),
            serde_json::to_string(action)?,
            action_type.map(str::to_string),
        );

        let id = diesel::insert_into(schema::turns::table)
            .values(&row)
            .returning(schema::turns::id)
            .get_result::<i32>(&mut conn)?;

        debug!(turn_id = id, "Turn recorded");
        Ok(id)
    }

    #[instrument(skip(self, payload))]
    fn insert_event(
        &self,
        match_id: MatchId,
        event_type: &str,
        payload: &Value,
        turn_id: Option<TurnId>,
    ) -> Result<EventId, DbError> {
        let mut conn = self.connection()?;
        let row = NewEventRow::new(
            match_id,
            turn_id,
            event_type.to_string(),
            serde_json::to_string(payload)?,
        );

        let id = diesel::insert_into(schema::events::table)
            .values(&row)
            .returning(schema::events::id)
            .get_result::<i32>(&mut conn)?;
        Ok(id)
    }

    #[instrument(skip(self, state))]
    fn insert_snapshot(
        &self,
        match_id: MatchId,
        game_key: &str,
        game_version: &str,
        state: &Value,
        turn_id: Option<TurnId>,
    ) -> Result<SnapshotId, DbError> {
        let mut conn = self.connection()?;
        let row = NewSnapshotRow::new(
            match_id,
            turn_id,
            game_key.to_string(),
            game_version.to_string(),
            serde_json::to_string(state)?,
        );

        let id = diesel::insert_into(schema::state_snapshots::table)
            .values(&row)
            .returning(schema::state_snapshots::id)
            .get_result::<i32>(&mut conn)?;
        Ok(id)
    }

    #[instrument(skip(self))]
    fn update_status(&self, match_id: MatchId, status: MatchStatus) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        conn.immediate_transaction::<_, DbError, _>(|conn| {
            let current: String = schema::matches::table
                .find(match_id)
                .select(schema::matches::status)
                .first(conn)?;
            let current = MatchStatus::from_str(&current)
                .map_err(|_| DbError::new(format!("Invalid match status: '{}'", current)))?;

            if !current.can_transition_to(status) {
                warn!(from = %current, to = %status, "Rejected status regression");
                return Err(DbError::new(format!(
                    "Match {} cannot move from {} to {}",
                    match_id, current, status
                )));
            }

            diesel::update(schema::matches::table.find(match_id))
                .set(schema::matches::status.eq(status.as_ref()))
                .execute(conn)?;
            Ok(())
        })?;

        info!(match_id, %status, "Match status updated");
        Ok(())
    }

    #[instrument(skip(self))]
    fn history(&self, match_id: MatchId) -> Result<MatchHistory, DbError> {
        let record = self
            .get_match(match_id)?
            .ok_or_else(|| DbError::new(format!("Unknown match {}", match_id)))?;
        let mut conn = self.connection()?;

        let turns = schema::turns::table
            .filter(schema::turns::match_id.eq(match_id))
            .order(schema::turns::idx.asc())
            .select(TurnRow::as_select())
            .load(&mut conn)?
            .into_iter()
            .map(TurnRow::into_record)
            .collect::<Result<Vec<_>, _>>()?;

        let events = schema::events::table
            .filter(schema::events::match_id.eq(match_id))
            .order(schema::events::id.asc())
            .select(EventRow::as_select())
            .load(&mut conn)?
            .into_iter()
            .map(EventRow::into_record)
            .collect::<Result<Vec<_>, _>>()?;

        let snapshots = schema::state_snapshots::table
            .filter(schema::state_snapshots::match_id.eq(match_id))
            .order(schema::state_snapshots::id.asc())
            .select(SnapshotRow::as_select())
            .load(&mut conn)?
            .into_iter()
            .map(SnapshotRow::into_record)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            turns = turns.len(),
            events = events.len(),
            snapshots = snapshots.len(),
            "History loaded"
        );
        Ok(MatchHistory::new(record, turns, events, snapshots))
    }
}

impl MatchStore for MatchRepository {
    fn create_match(
        &mut self,
        seed: &str,
        game_key: &str,
        game_version: &str,
    ) -> Result<MatchId, StoreError> {
        Ok(self.insert_match(seed, game_key, game_version)?)
    }

    fn record_turn(
        &mut self,
        match_id: MatchId,
        idx: u32,
        actor: ActorId,
        action: &Value,
        action_type: Option<&str>,
    ) -> Result<TurnId, StoreError> {
        Ok(self.insert_turn(match_id, idx, actor, action, action_type)?)
    }

    fn record_event(
        &mut self,
        match_id: MatchId,
        event_type: &str,
        payload: &Value,
        turn_id: Option<TurnId>,
    ) -> Result<EventId, StoreError> {
        Ok(self.insert_event(match_id, event_type, payload, turn_id)?)
    }

    fn record_snapshot(
        &mut self,
        match_id: MatchId,
        game_key: &str,
        game_version: &str,
        state: &Value,
        turn_id: Option<TurnId>,
    ) -> Result<SnapshotId, StoreError> {
        Ok(self.insert_snapshot(match_id, game_key, game_version, state, turn_id)?)
    }

    fn mark_match_status(
        &mut self,
        match_id: MatchId,
        status: MatchStatus,
    ) -> Result<(), StoreError> {
        Ok(self.update_status(match_id, status)?)
    }
}

impl HistorySource for MatchRepository {
    fn load_history(&self, match_id: MatchId) -> Result<MatchHistory, StoreError> {
        Ok(self.history(match_id)?)
    }
}
