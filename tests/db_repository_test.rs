//! Tests for the SQLite match repository.

use serde_json::json;
use tempfile::NamedTempFile;

use strictly_arena::games::tictactoe::{FirstAvailableAgent, RandomLegalAgent, TicTacToe};
use strictly_arena::{
    ActorId, Engine, GameSpec, HistorySource, MatchRepository, MatchStatus, MatchStore, Scores,
    event_types, verify_replay,
};

/// Creates a temporary database file with schema applied, returns the file
/// handle (must stay in scope to keep the file alive) and a ready repository.
fn setup_test_db() -> (NamedTempFile, MatchRepository) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    let repo = MatchRepository::new(db_path).expect("Failed to create repository");
    repo.run_migrations().expect("Migrations failed");
    (db_file, repo)
}

#[test]
fn test_empty_path_rejected() {
    assert!(MatchRepository::new("  ".to_string()).is_err());
}

#[test]
fn test_migrations_are_idempotent() {
    let (_db, repo) = setup_test_db();
    repo.run_migrations().expect("Second run failed");
}

#[test]
fn test_create_match_starts_created() {
    let (_db, mut repo) = setup_test_db();
    let id = repo
        .create_match("abc123", "tictactoe", "v1")
        .expect("Create failed");
    assert!(id > 0);

    let record = repo.get_match(id).expect("Query failed").expect("Missing");
    assert_eq!(record.seed(), "abc123");
    assert_eq!(record.game_key(), "tictactoe");
    assert_eq!(record.game_version(), "v1");
    assert_eq!(*record.status(), MatchStatus::Created);
}

#[test]
fn test_get_match_not_found() {
    let (_db, repo) = setup_test_db();
    assert!(repo.get_match(999).expect("Query failed").is_none());
    assert!(repo.load_history(999).is_err());
}

#[test]
fn test_status_is_monotonic() {
    let (_db, mut repo) = setup_test_db();
    let id = repo.create_match("s", "tictactoe", "v1").unwrap();

    repo.mark_match_status(id, MatchStatus::Running).unwrap();
    assert!(repo.mark_match_status(id, MatchStatus::Created).is_err());
    repo.mark_match_status(id, MatchStatus::Finished).unwrap();
    assert!(repo.mark_match_status(id, MatchStatus::Running).is_err());
    assert!(repo.mark_match_status(id, MatchStatus::Error).is_err());

    let record = repo.get_match(id).unwrap().unwrap();
    assert_eq!(*record.status(), MatchStatus::Finished);
}

#[test]
fn test_duplicate_turn_index_rejected() {
    let (_db, mut repo) = setup_test_db();
    let id = repo.create_match("s", "tictactoe", "v1").unwrap();
    let action = json!({"type": "move", "payload": {"row": 0, "col": 0}});

    repo.record_turn(id, 1, ActorId::AgentA, &action, Some("move"))
        .unwrap();
    let dup = repo.record_turn(id, 1, ActorId::AgentB, &action, Some("move"));
    assert!(dup.is_err(), "Same index twice should violate the unique key");
}

#[test]
fn test_history_round_trips_records() {
    let (_db, mut repo) = setup_test_db();
    let id = repo.create_match("s", "tictactoe", "v1").unwrap();
    let state = json!({
        "board": [[" ", " ", " "], [" ", " ", " "], [" ", " ", " "]],
        "player": "agentA",
        "winner": null,
    });
    let action = json!({"type": "move", "payload": {"row": 2, "col": 1}});

    repo.record_snapshot(id, "tictactoe", "v1", &state, None)
        .unwrap();
    let turn_id = repo
        .record_turn(id, 1, ActorId::AgentA, &action, None)
        .unwrap();
    repo.record_event(id, "game.move_applied", &json!({"row": 2}), Some(turn_id))
        .unwrap();

    let history = repo.load_history(id).unwrap();
    assert_eq!(history.turns().len(), 1);
    let turn = &history.turns()[0];
    assert_eq!(*turn.id(), turn_id);
    assert_eq!(*turn.idx(), 1);
    assert_eq!(*turn.actor(), ActorId::AgentA);
    assert_eq!(turn.action(), &action);
    assert_eq!(*turn.action_type(), None);

    assert_eq!(history.events()[0].payload(), &json!({"row": 2}));
    assert_eq!(*history.events()[0].turn_id(), Some(turn_id));
    assert_eq!(history.initial_snapshot().unwrap().state(), &state);
}

#[test]
fn test_engine_persists_match_to_sqlite() {
    let (_db, repo) = setup_test_db();
    let mut engine = Engine::new(repo);
    let mut a = FirstAvailableAgent::new("a");
    let mut b = FirstAvailableAgent::new("b");

    let outcome = engine
        .run_match_with_seed("sqliteseed01".to_string(), &mut a, &mut b, &TicTacToe, 9)
        .expect("Match failed");
    assert_eq!(outcome.scores, Scores::new(1.0, 0.0));

    let repo = engine.into_store();
    let history = repo.load_history(outcome.match_id).unwrap();
    assert_eq!(*history.record().status(), MatchStatus::Finished);
    assert_eq!(history.record().seed(), "sqliteseed01");
    assert_eq!(history.turns().len(), 7);
    assert_eq!(history.snapshots().len(), 8);
    assert_eq!(
        history.events().first().unwrap().event_type(),
        event_types::MATCH_STARTED
    );
    assert_eq!(
        history.events().last().unwrap().event_type(),
        event_types::MATCH_FINISHED
    );
    assert_eq!(verify_replay(&TicTacToe, &history), Ok(7));
}

#[test]
fn test_engine_with_borrowed_repository() {
    let (_db, mut repo) = setup_test_db();
    let mut a = RandomLegalAgent::new("a", "one");
    let mut b = RandomLegalAgent::new("b", "two");

    let outcome = Engine::new(&mut repo)
        .run_match(&mut a, &mut b, &TicTacToe, 2)
        .unwrap();
    assert_eq!(outcome.scores, Scores::zero());

    let history = repo.load_history(outcome.match_id).unwrap();
    let truncated = history
        .events_of_type(event_types::MATCH_TRUNCATED)
        .next()
        .unwrap();
    assert_eq!(truncated.payload(), &json!({"max_turns": 2, "turns_played": 2}));
}

#[test]
fn test_list_matches_newest_first() {
    let (_db, mut repo) = setup_test_db();
    let first = repo.create_match("one", "tictactoe", "v1").unwrap();
    let second = repo.create_match("two", "tictactoe", "v1").unwrap();
    let third = repo.create_match("three", "tictactoe", "v1").unwrap();

    let ids: Vec<i32> = repo
        .list_matches(10)
        .unwrap()
        .iter()
        .map(|m| *m.id())
        .collect();
    assert_eq!(ids, vec![third, second, first]);

    assert_eq!(repo.list_matches(2).unwrap().len(), 2);
}

#[test]
fn test_register_schemas_upserts() {
    let (_db, repo) = setup_test_db();
    let schemas = TicTacToe.schemas();

    let written = repo
        .register_schemas(TicTacToe::KEY, TicTacToe::VERSION, &schemas)
        .unwrap();
    assert_eq!(written, 4);
    repo.register_schemas(TicTacToe::KEY, TicTacToe::VERSION, &schemas)
        .unwrap();

    let rows = repo
        .registered_schemas(TicTacToe::KEY, TicTacToe::VERSION)
        .unwrap();
    assert_eq!(rows.len(), 4);
    let mut kinds: Vec<&str> = rows.iter().map(|r| r.kind().as_str()).collect();
    kinds.sort_unstable();
    assert_eq!(kinds, vec!["action", "event", "observation", "state"]);

    let state_row = rows.iter().find(|r| r.kind() == "state").unwrap();
    let stored: serde_json::Value = serde_json::from_str(state_row.document()).unwrap();
    assert_eq!(stored, schemas.state);

    assert!(repo.registered_schemas("chess", "v1").unwrap().is_empty());
}
