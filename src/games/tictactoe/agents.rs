//! Built-in tic-tac-toe actors.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use super::types::{TicTacToeAction, TicTacToeObservation};
use crate::core::{Actor, ActorError, Event, seeded_rng};

fn to_action((row, col): (usize, usize)) -> Result<TicTacToeAction, ActorError> {
    let row = i32::try_from(row).map_err(|e| ActorError::new(e.to_string()))?;
    let col = i32::try_from(col).map_err(|e| ActorError::new(e.to_string()))?;
    Ok(TicTacToeAction::place(row, col))
}

/// Picks uniformly among empty cells using a seeded RNG.
#[derive(Debug, Clone)]
pub struct RandomLegalAgent {
    name: String,
    rng: ChaCha8Rng,
}

impl RandomLegalAgent {
    /// Creates an agent whose choices are reproducible from `seed`.
    #[instrument(skip(name), fields(name = %name.as_ref()))]
    pub fn new(name: impl AsRef<str>, seed: &str) -> Self {
        Self {
            name: name.as_ref().to_string(),
            rng: seeded_rng(seed),
        }
    }
}

impl Actor for RandomLegalAgent {
    type Action = TicTacToeAction;
    type Observation = TicTacToeObservation;

    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, observation), fields(agent = %self.name))]
    fn produce_action(
        &mut self,
        turn_index: u32,
        observation: &TicTacToeObservation,
    ) -> Result<TicTacToeAction, ActorError> {
        let legal = observation.board.empty_cells();
        // Nothing legal left: propose (0, 0) and let the game reject it.
        let cell = legal.choose(&mut self.rng).copied().unwrap_or((0, 0));
        debug!(row = cell.0, col = cell.1, "Random agent chose cell");
        to_action(cell)
    }

    fn receive_outcome(&mut self, event: &Event) -> Result<(), ActorError> {
        debug!(agent = %self.name, payload = %event.payload, "Outcome received");
        Ok(())
    }
}

/// Picks the first empty cell in row-major order.
#[derive(Debug, Clone)]
pub struct FirstAvailableAgent {
    name: String,
}

impl FirstAvailableAgent {
    /// Creates a new first-available agent.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Actor for FirstAvailableAgent {
    type Action = TicTacToeAction;
    type Observation = TicTacToeObservation;

    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, observation), fields(agent = %self.name))]
    fn produce_action(
        &mut self,
        turn_index: u32,
        observation: &TicTacToeObservation,
    ) -> Result<TicTacToeAction, ActorError> {
        let cell = observation
            .board
            .empty_cells()
            .first()
            .copied()
            .ok_or_else(|| ActorError::new("No valid moves available"))?;
        debug!(row = cell.0, col = cell.1, "First-available agent chose cell");
        to_action(cell)
    }
}
