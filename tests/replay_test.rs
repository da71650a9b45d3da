//! Tests for replaying recorded matches against their snapshots.

use serde_json::json;

use strictly_arena::games::tictactoe::{FirstAvailableAgent, RandomLegalAgent, TicTacToe};
use strictly_arena::{
    Engine, HistorySource, MatchHistory, MemoryMatchStore, ReplayError, SnapshotRecord,
    TurnRecord, verify_replay,
};

/// Plays a first-available vs first-available match: agentA wins on turn 7.
fn recorded_match() -> MatchHistory {
    let mut engine = Engine::new(MemoryMatchStore::new());
    let mut a = FirstAvailableAgent::new("a");
    let mut b = FirstAvailableAgent::new("b");
    let outcome = engine
        .run_match_with_seed("replay".to_string(), &mut a, &mut b, &TicTacToe, 9)
        .unwrap();
    engine.store().load_history(outcome.match_id).unwrap()
}

fn with_turns(history: &MatchHistory, turns: Vec<TurnRecord>) -> MatchHistory {
    MatchHistory::new(
        history.record().clone(),
        turns,
        history.events().clone(),
        history.snapshots().clone(),
    )
}

fn with_snapshots(history: &MatchHistory, snapshots: Vec<SnapshotRecord>) -> MatchHistory {
    MatchHistory::new(
        history.record().clone(),
        history.turns().clone(),
        history.events().clone(),
        snapshots,
    )
}

fn replace_action(turn: &TurnRecord, action: serde_json::Value) -> TurnRecord {
    TurnRecord::new(
        *turn.id(),
        *turn.idx(),
        *turn.actor(),
        action,
        turn.action_type().clone(),
    )
}

#[test]
fn test_recorded_match_replays() {
    let history = recorded_match();
    assert_eq!(history.turns().len(), 7);
    assert_eq!(verify_replay(&TicTacToe, &history), Ok(7));
}

#[test]
fn test_random_matches_replay() {
    for seed in ["alpha", "beta", "gamma", "delta"] {
        let mut engine = Engine::new(MemoryMatchStore::new());
        let mut a = RandomLegalAgent::new("a", seed);
        let mut b = RandomLegalAgent::new("b", &seed.repeat(2));
        let outcome = engine
            .run_match_with_seed(seed.to_string(), &mut a, &mut b, &TicTacToe, 9)
            .unwrap();
        let history = engine.store().load_history(outcome.match_id).unwrap();
        let verified = verify_replay(&TicTacToe, &history).unwrap();
        assert_eq!(verified, history.turns().len());
    }
}

#[test]
fn test_turn_order_in_history_does_not_matter() {
    let history = recorded_match();
    let mut turns = history.turns().clone();
    turns.reverse();
    assert_eq!(verify_replay(&TicTacToe, &with_turns(&history, turns)), Ok(7));
}

#[test]
fn test_missing_initial_snapshot() {
    let history = recorded_match();
    let snapshots = history
        .snapshots()
        .iter()
        .filter(|s| s.turn_id().is_some())
        .cloned()
        .collect();
    assert_eq!(
        verify_replay(&TicTacToe, &with_snapshots(&history, snapshots)),
        Err(ReplayError::MissingInitialSnapshot)
    );
}

#[test]
fn test_missing_turn_snapshot() {
    let history = recorded_match();
    let third = *history.turns()[2].id();
    let snapshots = history
        .snapshots()
        .iter()
        .filter(|s| *s.turn_id() != Some(third))
        .cloned()
        .collect();
    assert_eq!(
        verify_replay(&TicTacToe, &with_snapshots(&history, snapshots)),
        Err(ReplayError::MissingSnapshot(3))
    );
}

#[test]
fn test_index_gap() {
    let history = recorded_match();
    let mut turns = history.turns().clone();
    turns.remove(1);
    assert_eq!(
        verify_replay(&TicTacToe, &with_turns(&history, turns)),
        Err(ReplayError::IndexGap {
            expected: 2,
            found: 3
        })
    );
}

#[test]
fn test_tampered_action_is_rejected() {
    let history = recorded_match();
    let mut turns = history.turns().clone();
    // Turn 1 took (0, 0); replaying turn 2 onto the same cell must fail.
    turns[1] = replace_action(&turns[1], json!({"type": "move", "payload": {"row": 0, "col": 0}}));
    let err = verify_replay(&TicTacToe, &with_turns(&history, turns)).unwrap_err();
    assert!(matches!(err, ReplayError::Rejected { turn: 2, .. }), "{err}");
}

#[test]
fn test_undecodable_action() {
    let history = recorded_match();
    let mut turns = history.turns().clone();
    turns[0] = replace_action(&turns[0], json!({"type": "jump"}));
    let err = verify_replay(&TicTacToe, &with_turns(&history, turns)).unwrap_err();
    assert!(matches!(err, ReplayError::Decode { turn: 1, .. }), "{err}");
}

#[test]
fn test_divergent_snapshot() {
    let history = recorded_match();
    let mut turns = history.turns().clone();
    // A legal but different move: the recorded snapshot no longer matches.
    turns[0] = replace_action(&turns[0], json!({"type": "move", "payload": {"row": 2, "col": 2}}));
    assert_eq!(
        verify_replay(&TicTacToe, &with_turns(&history, turns)),
        Err(ReplayError::Diverged(1))
    );
}
