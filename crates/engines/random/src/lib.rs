//! Random Move Chess Engine
//!
//! A simple engine that selects moves uniformly at random from all legal moves.
//! Useful for:
//! - Playing against the console without an external engine binary
//! - Exercising the engine adapter end to end
//! - Stress testing move generation

use chess_core::{Board, Engine, EngineError, SearchLimits};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;


/// A chess engine that plays random legal moves.
///
/// Skill level and thinking time are accepted and ignored.
#[derive(Debug, Clone)]
pub struct RandomEngine {
    rng: StdRng,
    moves_played: u64,
}

impl Default for RandomEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomEngine {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            moves_played: 0,
        }
    }

    /// Reproducible move choices.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            moves_played: 0,
        }
    }

    pub fn moves_played(&self) -> u64 {
        self.moves_played
    }
}

impl Engine for RandomEngine {
    fn best_move(&mut self, fen: &str, _limits: &SearchLimits) -> Result<String, EngineError> {
        let board = Board::from_fen(fen)?;
        let moves = board.legal_moves_for(board.side_to_move());
        let mv = moves.choose(&mut self.rng).ok_or(EngineError::NoLegalMove)?;
        self.moves_played += 1;
        debug!(candidates = moves.len(), chosen = %mv, "random move");
        Ok(mv.to_uci())
    }

    fn name(&self) -> &str {
        "Random v1.0"
    }

    fn new_game(&mut self) -> Result<(), EngineError> {
        self.moves_played = 0;
        Ok(())
    }
}
