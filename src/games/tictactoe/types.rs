//! Core domain types for tic-tac-toe.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::core::{ActorId, Event};

/// Board side length.
pub const SIZE: usize = 3;

/// One cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Cell {
    /// Empty cell.
    #[serde(rename = " ")]
    Empty,
    /// Marked by `agentA`.
    X,
    /// Marked by `agentB`.
    O,
}

impl Cell {
    /// The mark placed by the given actor.
    pub fn mark_of(actor: ActorId) -> Self {
        match actor {
            ActorId::AgentA => Cell::X,
            ActorId::AgentB => Cell::O,
        }
    }

    /// The actor owning this mark, if any.
    pub fn owner(self) -> Option<ActorId> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(ActorId::AgentA),
            Cell::O => Some(ActorId::AgentB),
        }
    }

    /// Single-character label.
    pub fn symbol(self) -> &'static str {
        match self {
            Cell::Empty => " ",
            Cell::X => "X",
            Cell::O => "O",
        }
    }
}

/// 3x3 board, serialized as a list of rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Board {
    rows: [[Cell; SIZE]; SIZE],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            rows: [[Cell::Empty; SIZE]; SIZE],
        }
    }

    /// Builds a board from explicit rows.
    pub fn from_rows(rows: [[Cell; SIZE]; SIZE]) -> Self {
        Self { rows }
    }

    /// Gets the cell at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Sets the cell at `(row, col)`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if let Some(slot) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *slot = cell;
        }
    }

    /// Checks if a cell is empty.
    pub fn is_empty(&self, row: usize, col: usize) -> bool {
        matches!(self.get(row, col), Some(Cell::Empty))
    }

    /// Returns the rows.
    pub fn rows(&self) -> &[[Cell; SIZE]; SIZE] {
        &self.rows
    }

    /// Empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        (0..SIZE)
            .flat_map(|row| (0..SIZE).map(move |col| (row, col)))
            .filter(|&(row, col)| self.is_empty(row, col))
            .collect()
    }

    /// Formats the board as a human-readable string.
    pub fn display(&self) -> String {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| c.symbol())
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .collect::<Vec<_>>()
            .join("\n-+-+-\n")
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TicTacToeState {
    /// The board.
    pub board: Board,
    /// Actor to move next.
    pub player: ActorId,
    /// Winner, once three in a row exists.
    pub winner: Option<ActorId>,
}

impl TicTacToeState {
    /// Empty board, `agentA` to move.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            player: ActorId::AgentA,
            winner: None,
        }
    }
}

impl Default for TicTacToeState {
    fn default() -> Self {
        Self::new()
    }
}

/// Target cell of a move. Signed so that out-of-range proposals can be
/// represented and rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Placement {
    /// Row, 0-2.
    pub row: i32,
    /// Column, 0-2.
    pub col: i32,
}

/// An actor's move proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "payload")]
pub enum TicTacToeAction {
    /// Place the actor's mark.
    #[serde(rename = "move")]
    Move(Placement),
}

impl TicTacToeAction {
    /// Move to `(row, col)`.
    pub fn place(row: i32, col: i32) -> Self {
        TicTacToeAction::Move(Placement { row, col })
    }
}

/// What an actor sees. The game has perfect information, so this is the
/// board plus the actor's own slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TicTacToeObservation {
    /// Copy of the board.
    pub board: Board,
    /// The observing actor.
    pub you: ActorId,
}

/// Game-level events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "payload")]
pub enum TicTacToeEvent {
    /// A mark was placed.
    #[serde(rename = "game.move_applied")]
    MoveApplied {
        /// Row of the placed mark.
        row: usize,
        /// Column of the placed mark.
        col: usize,
        /// Mark placed.
        mark: Cell,
    },
    /// Three in a row.
    #[serde(rename = "game.win")]
    Win {
        /// Winning actor.
        winner: ActorId,
    },
    /// Board full without a winner.
    #[serde(rename = "game.draw")]
    Draw {},
}

impl TicTacToeEvent {
    /// Event type tag.
    pub fn event_type(&self) -> &'static str {
        match self {
            TicTacToeEvent::MoveApplied { .. } => "game.move_applied",
            TicTacToeEvent::Win { .. } => "game.win",
            TicTacToeEvent::Draw {} => "game.draw",
        }
    }
}

impl From<TicTacToeEvent> for Event {
    fn from(event: TicTacToeEvent) -> Self {
        let event_type = event.event_type();
        let payload = match event {
            TicTacToeEvent::MoveApplied { row, col, mark } => {
                serde_json::json!({"row": row, "col": col, "mark": mark})
            }
            TicTacToeEvent::Win { winner } => serde_json::json!({"winner": winner}),
            TicTacToeEvent::Draw {} => serde_json::json!({}),
        };
        Event::new(event_type, payload)
    }
}
