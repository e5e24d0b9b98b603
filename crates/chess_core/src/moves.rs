//! Move variants and their execution on a [`Board`].
//!
//! Every move runs in three phases: shared bookkeeping before the board is
//! touched, the variant-specific mutation, and repetition tracking after.

use std::fmt;

use crate::{
    board::Board,
    pieces::castling_rook_position,
    position::{Direction, Position},
    types::*,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Regular { from: Position, to: Position },
    Castling { from: Position, to: Position },
    EnPassant { from: Position, to: Position },
    /// `piece` defaults to a queen and may be changed before execution.
    Promotion {
        from: Position,
        to: Position,
        piece: PieceKind,
    },
}

impl Move {
    pub fn regular(from: Position, to: Position) -> Self {
        Move::Regular { from, to }
    }

    pub fn castling(from: Position, to: Position) -> Self {
        Move::Castling { from, to }
    }

    pub fn en_passant(from: Position, to: Position) -> Self {
        Move::EnPassant { from, to }
    }

    pub fn promotion(from: Position, to: Position) -> Self {
        Move::Promotion {
            from,
            to,
            piece: PieceKind::Queen,
        }
    }

    pub fn from(&self) -> Position {
        match *self {
            Move::Regular { from, .. }
            | Move::Castling { from, .. }
            | Move::EnPassant { from, .. }
            | Move::Promotion { from, .. } => from,
        }
    }

    pub fn to(&self) -> Position {
        match *self {
            Move::Regular { to, .. }
            | Move::Castling { to, .. }
            | Move::EnPassant { to, .. }
            | Move::Promotion { to, .. } => to,
        }
    }

    pub fn promotion_piece(&self) -> Option<PieceKind> {
        match *self {
            Move::Promotion { piece, .. } => Some(piece),
            _ => None,
        }
    }

    /// Choose the promotion piece. Ignored for non-promotion moves and for
    /// kinds a pawn cannot become; returns whether the choice was applied.
    pub fn set_promotion_piece(&mut self, kind: PieceKind) -> bool {
        match self {
            Move::Promotion { piece, .. } if kind.is_promotion_choice() => {
                *piece = kind;
                true
            }
            _ => false,
        }
    }

    /// Coordinate notation: `e2e4`, `e7e8q`.
    pub fn to_uci(&self) -> String {
        let mut s = String::with_capacity(5);
        s.push_str(&self.from().to_algebraic());
        s.push_str(&self.to().to_algebraic());
        if let Some(p) = self.promotion_piece() {
            s.push(p.symbol());
        }
        s
    }

    /// Apply the move to `board`.
    ///
    /// # Panics
    /// If the origin square is empty. Moves are only ever built by the
    /// generator for pieces that are on the board.
    pub fn execute(&self, board: &mut Board) {
        let captured = self.pre_execute(board);

        match *self {
            Move::Regular { from, to } => relocate(board, from, to),
            Move::Castling { from, to } => {
                let dir = castling_direction(from, to);
                let rook_from = castling_rook_position(from, dir);
                relocate(board, from, to);
                relocate(board, rook_from, from.add(dir));
            }
            Move::EnPassant { from, to } => {
                relocate(board, from, to);
                board.set_piece(Position::new(from.row, to.col), None);
            }
            Move::Promotion { from, to, piece } => {
                let pawn = board
                    .take_piece(from)
                    .expect("promotion from an empty square");
                let mut promoted = Piece::new(pawn.color, piece);
                promoted.has_moved = true;
                board.set_piece(to, Some(promoted));
            }
        }

        self.post_execute(board, captured);
    }

    /// Records the move and updates the counters. Returns whether the
    /// destination held a piece.
    fn pre_execute(&self, board: &mut Board) -> bool {
        let mover = board
            .piece_at(self.from())
            .expect("move from an empty square");
        let captured = board.piece_at(self.to()).is_some();

        board.set_last_move(Some(*self));
        if mover.color == Color::Black {
            board.fullmove_counter = board.fullmove_counter.saturating_add(1);
        }
        if mover.kind == PieceKind::Pawn || captured {
            board.halfmove_clock = 0;
        } else {
            board.halfmove_clock = board.halfmove_clock.saturating_add(1);
        }
        captured
    }

    /// Irreversible moves wipe the repetition history since no earlier
    /// position can recur; anything else records the new position.
    fn post_execute(&self, board: &mut Board, captured: bool) {
        let irreversible = match self {
            Move::Regular { to, .. } => {
                captured
                    || board
                        .piece_at(*to)
                        .map(|p| p.kind == PieceKind::Pawn)
                        .unwrap_or(false)
            }
            _ => true,
        };
        if irreversible {
            board.clear_repetition_history();
        } else {
            let key = board.fen_without_counters();
            board.push_repetition(key);
        }
    }

    /// A move is legal when it does not leave the mover's king in check.
    /// Castling additionally may not start in or pass through check.
    pub fn is_legal(&self, board: &Board) -> bool {
        let color = match board.piece_at(self.from()) {
            Some(p) => p.color,
            None => return false,
        };

        if let Move::Castling { from, to } = *self {
            if board.is_in_check(color) {
                return false;
            }
            let step = Move::regular(from, from.add(castling_direction(from, to)));
            let mut scratch = board.copy();
            step.execute(&mut scratch);
            if scratch.is_in_check(color) {
                return false;
            }
        }

        let mut scratch = board.copy();
        self.execute(&mut scratch);
        !scratch.is_in_check(color)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

fn castling_direction(from: Position, to: Position) -> Direction {
    if to.col > from.col {
        Direction::EAST
    } else {
        Direction::WEST
    }
}

fn relocate(board: &mut Board, from: Position, to: Position) {
    let mut pc = board.take_piece(from).expect("move from an empty square");
    pc.has_moved = true;
    board.set_piece(to, Some(pc));
}

#[cfg(test)]
#[path = "moves_tests.rs"]
mod moves_tests;
