//! Commands typed at the prompt.

use anyhow::{anyhow, bail, Result};
use chess_core::{PieceKind, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// `e2e4`, `e2-e4`, `e7e8n`
    Move {
        from: Position,
        to: Position,
        promotion: Option<PieceKind>,
    },
    /// Legal moves of one piece: `moves e2`
    Moves(Position),
    Fen,
    Status,
    Resign,
    Draw,
    Help,
    Quit,
    Empty,
}

pub const HELP: &str = "\
Commands:
  e2e4 | e2-e4 | e7e8q   play a move (promotion letter q, r, b or n)
  moves <square>         list legal moves of the piece on a square
  fen                    print the current position
  status                 side to move, clocks and game state
  resign                 resign the game
  draw                   agree to a draw (two-player games only)
  help                   this text
  quit                   stop the game and exit";

pub fn parse(line: &str) -> Result<Input> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Ok(Input::Empty);
    };
    let input = match first.to_lowercase().as_str() {
        "moves" | "m" => {
            let square = words
                .next()
                .ok_or_else(|| anyhow!("usage: moves <square>"))?;
            Input::Moves(square_at(square)?)
        }
        "fen" => Input::Fen,
        "status" => Input::Status,
        "resign" => Input::Resign,
        "draw" => Input::Draw,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        mv => parse_move(mv)?,
    };
    if let Some(extra) = words.next() {
        bail!("unexpected '{extra}'");
    }
    Ok(input)
}

fn parse_move(text: &str) -> Result<Input> {
    let compact: String = text.chars().filter(|&c| c != '-').collect();
    if !compact.is_ascii() || !(4..=5).contains(&compact.len()) {
        bail!("unknown command '{text}', type help");
    }
    let from = square_at(&compact[0..2])?;
    let to = square_at(&compact[2..4])?;
    let promotion = match compact[4..].chars().next() {
        None => None,
        Some(c) => match PieceKind::from_symbol(c) {
            Some(kind) if kind.is_promotion_choice() => Some(kind),
            _ => bail!("'{c}' is not a promotion piece"),
        },
    };
    Ok(Input::Move {
        from,
        to,
        promotion,
    })
}

fn square_at(text: &str) -> Result<Position> {
    Position::from_algebraic(text).ok_or_else(|| anyhow!("'{text}' is not a square"))
}

#[cfg(test)]
#[path = "input_tests.rs"]
mod input_tests;
