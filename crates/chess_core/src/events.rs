//! Notifications a game raises for whoever drives it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WinReason {
    Checkmate,
    Resignation,
    Timeout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DrawReason {
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
    Agreement,
}

/// How a finished game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum Outcome {
    Win { reason: WinReason, winner: Color },
    Draw { reason: DrawReason },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// A move was played; `next_to_move` is the side whose turn it now is.
    MoveMade { next_to_move: Color },
    TimeUpdated { color: Color, seconds_left: u32 },
    Win { reason: WinReason, winner: Color },
    Draw { reason: DrawReason },
    /// The external engine failed; the game has been stopped.
    EngineError { message: String },
}

impl From<Outcome> for GameEvent {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win { reason, winner } => GameEvent::Win { reason, winner },
            Outcome::Draw { reason } => GameEvent::Draw { reason },
        }
    }
}

impl fmt::Display for WinReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WinReason::Checkmate => write!(f, "checkmate"),
            WinReason::Resignation => write!(f, "resignation"),
            WinReason::Timeout => write!(f, "timeout"),
        }
    }
}

impl fmt::Display for DrawReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawReason::Stalemate => write!(f, "stalemate"),
            DrawReason::InsufficientMaterial => write!(f, "insufficient material"),
            DrawReason::FiftyMoveRule => write!(f, "fifty-move rule"),
            DrawReason::ThreefoldRepetition => write!(f, "threefold repetition"),
            DrawReason::Agreement => write!(f, "agreement"),
        }
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::MoveMade { next_to_move } => write!(f, "{next_to_move} to move"),
            GameEvent::TimeUpdated {
                color,
                seconds_left,
            } => write!(f, "{color}: {seconds_left}s left"),
            GameEvent::Win { reason, winner } => write!(f, "{winner} wins by {reason}"),
            GameEvent::Draw { reason } => write!(f, "draw by {reason}"),
            GameEvent::EngineError { message } => write!(f, "engine error: {message}"),
        }
    }
}
