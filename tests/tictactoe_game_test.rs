//! Tests for the tic-tac-toe rule module.

use serde_json::json;

use strictly_arena::games::tictactoe::{
    Board, Cell, TicTacToe, TicTacToeAction, TicTacToeState, rules,
};
use strictly_arena::{ActorId, GameSpec, SchemaKind, Scores};

fn play(moves: &[(i32, i32)]) -> TicTacToeState {
    let game = TicTacToe;
    moves.iter().fold(game.initial_state("seed"), |state, &(row, col)| {
        game.apply_action(&state, &TicTacToeAction::place(row, col))
            .expect("Move should be legal")
            .state_after
    })
}

#[test]
fn test_initial_state_is_empty_with_agent_a_to_move() {
    let game = TicTacToe;
    let state = game.initial_state("anything");
    assert_eq!(state.board, Board::new());
    assert_eq!(game.current_actor(&state), ActorId::AgentA);
    assert!(!game.is_terminal(&state));
    assert_eq!(state, game.initial_state("something else"));
}

#[test]
fn test_center_move_emits_move_applied_and_passes_turn() {
    let game = TicTacToe;
    let state = game.initial_state("seed");

    let result = game
        .apply_action(&state, &TicTacToeAction::place(1, 1))
        .unwrap();

    assert_eq!(result.state_after.board.get(1, 1), Some(Cell::X));
    assert_eq!(game.current_actor(&result.state_after), ActorId::AgentB);
    assert_eq!(result.events.len(), 1);
    assert_eq!(result.events[0].event_type, "game.move_applied");
    assert_eq!(result.events[0].payload, json!({"row": 1, "col": 1, "mark": "X"}));

    // The input state is untouched.
    assert_eq!(state.board.get(1, 1), Some(Cell::Empty));
}

#[test]
fn test_occupied_cell_is_illegal() {
    let game = TicTacToe;
    let state = play(&[(1, 1)]);
    let err = game
        .apply_action(&state, &TicTacToeAction::place(1, 1))
        .unwrap_err();
    assert!(err.reason.contains("Cell occupied"));
}

#[test]
fn test_out_of_bounds_is_illegal() {
    let game = TicTacToe;
    let state = game.initial_state("seed");
    for (row, col) in [(-1, 0), (0, -1), (3, 0), (0, 3), (i32::MAX, i32::MIN)] {
        let err = game
            .apply_action(&state, &TicTacToeAction::place(row, col))
            .unwrap_err();
        assert!(err.reason.contains("out of bounds"), "({row}, {col}): {}", err.reason);
    }
}

#[test]
fn test_move_after_win_is_illegal() {
    let game = TicTacToe;
    let state = play(&[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)]);
    assert!(game.is_terminal(&state));
    let err = game
        .apply_action(&state, &TicTacToeAction::place(2, 2))
        .unwrap_err();
    assert_eq!(err.reason, "Game already finished");
}

#[test]
fn test_winning_move_emits_win_event() {
    let game = TicTacToe;
    let state = play(&[(0, 0), (1, 0), (1, 1), (2, 0)]);
    let result = game
        .apply_action(&state, &TicTacToeAction::place(2, 2))
        .unwrap();

    let types: Vec<&str> = result.events.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(types, vec!["game.move_applied", "game.win"]);
    assert_eq!(result.events[1].payload, json!({"winner": "agentA"}));
    assert_eq!(result.state_after.winner, Some(ActorId::AgentA));
    assert_eq!(game.score(&result.state_after), Scores::new(1.0, 0.0));
}

#[test]
fn test_agent_b_can_win() {
    let game = TicTacToe;
    let state = play(&[(0, 0), (0, 2), (1, 0), (1, 1), (2, 2), (2, 0)]);
    assert_eq!(state.winner, Some(ActorId::AgentB));
    assert_eq!(game.score(&state), Scores::new(0.0, 1.0));
}

#[test]
fn test_full_board_draw() {
    let game = TicTacToe;
    let state = play(&[
        (0, 0),
        (0, 1),
        (0, 2),
        (1, 1),
        (1, 0),
        (1, 2),
        (2, 1),
        (2, 0),
    ]);
    let result = game
        .apply_action(&state, &TicTacToeAction::place(2, 2))
        .unwrap();

    assert_eq!(result.events.last().unwrap().event_type, "game.draw");
    assert!(game.is_terminal(&result.state_after));
    assert!(rules::is_draw(&result.state_after.board));
    assert_eq!(game.score(&result.state_after), Scores::draw());
}

#[test]
fn test_observation_is_board_and_slot() {
    let game = TicTacToe;
    let state = play(&[(2, 1)]);
    let observation = game.observation_for(&state, ActorId::AgentB);
    assert_eq!(observation.board, state.board);
    assert_eq!(observation.you, ActorId::AgentB);
}

#[test]
fn test_wire_formats() {
    let action = serde_json::to_value(TicTacToeAction::place(0, 2)).unwrap();
    assert_eq!(action, json!({"type": "move", "payload": {"row": 0, "col": 2}}));

    let state = serde_json::to_value(play(&[(0, 0)])).unwrap();
    assert_eq!(
        state,
        json!({
            "board": [["X", " ", " "], [" ", " ", " "], [" ", " ", " "]],
            "player": "agentB",
            "winner": null,
        })
    );
    let back: TicTacToeState = serde_json::from_value(state).unwrap();
    assert_eq!(back, play(&[(0, 0)]));
}

#[test]
fn test_action_type_and_schemas() {
    let game = TicTacToe;
    assert_eq!(
        game.action_type(&TicTacToeAction::place(0, 0)).as_deref(),
        Some("move")
    );

    let schemas = game.schemas();
    for (kind, schema) in schemas.iter() {
        assert!(schema.is_object(), "{} schema should be an object", kind);
    }
    assert_eq!(schemas.iter().count(), 4);
    assert!(schemas.get(SchemaKind::Action).to_string().contains("move"));
    assert_eq!(TicTacToe::KEY, "tictactoe");
    assert_eq!(TicTacToe::VERSION, "v1");
}
