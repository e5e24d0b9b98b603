pub mod board;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod fen;
pub mod game;
pub mod moves;
pub mod perft;
pub mod pieces;
pub mod position;
pub mod types;
pub mod uci;

// Rules and game surface
pub use board::Board;
pub use config::{parse_skill_level, parse_time_setting, GameConfig, Opponent};
pub use error::{ConfigError, EngineError, FenError};
pub use events::{DrawReason, GameEvent, Outcome, WinReason};
pub use game::{Command, Game, GameStatus, Player};
pub use moves::Move;
pub use perft::{perft, perft_divide};
pub use position::{Direction, Position};
pub use types::*;

// Engine adapter
pub use engine::{Engine, EngineOpponent, SearchLimits, MAX_SKILL_LEVEL};
pub use uci::{CoordinateMove, UciEngine};
