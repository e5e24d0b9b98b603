//! Forsyth-Edwards Notation.
//!
//! Encoding is deterministic and derives everything from the board: side to
//! move from the last mover, castling rights from `has_moved` flags and the
//! en-passant target from the last move. Parsing does the reverse mapping so
//! tests and custom starts can set up arbitrary positions.

use crate::{
    board::Board,
    error::FenError,
    moves::Move,
    pieces::pawn_direction,
    position::Position,
    types::*,
};

/// Full six-field FEN.
pub fn encode(board: &Board) -> String {
    format!(
        "{} {} {}",
        encode_without_counters(board),
        board.halfmove_clock(),
        board.fullmove_counter()
    )
}

/// Placement, side to move, castling rights and en-passant target. This is
/// the repetition key: identical positions compare equal regardless of the
/// move counters.
pub fn encode_without_counters(board: &Board) -> String {
    let side = match board.side_to_move() {
        Color::White => 'w',
        Color::Black => 'b',
    };
    format!(
        "{} {} {} {}",
        piece_placement(board),
        side,
        castling_rights(board),
        en_passant_target(board)
    )
}

fn piece_placement(board: &Board) -> String {
    let mut fen = String::with_capacity(72);
    for row in 0..8 {
        let mut empty = 0;
        for col in 0..8 {
            match board.piece_at(Position::new(row, col)) {
                Some(pc) => {
                    if empty != 0 {
                        fen.push(char::from(b'0' + empty));
                        empty = 0;
                    }
                    fen.push(pc.symbol());
                }
                None => empty += 1,
            }
        }
        if empty != 0 {
            fen.push(char::from(b'0' + empty));
        }
        if row != 7 {
            fen.push('/');
        }
    }
    fen
}

fn castling_rights(board: &Board) -> String {
    let mut rights = String::with_capacity(4);
    for color in [Color::White, Color::Black] {
        let (king_side, queen_side) = side_rights(board, color);
        let (k, q) = match color {
            Color::White => ('K', 'Q'),
            Color::Black => ('k', 'q'),
        };
        if king_side {
            rights.push(k);
        }
        if queen_side {
            rights.push(q);
        }
    }
    if rights.is_empty() {
        rights.push('-');
    }
    rights
}

fn home_row(color: Color) -> i8 {
    match color {
        Color::White => 7,
        Color::Black => 0,
    }
}

/// (king side, queen side) availability: king and the respective rook of
/// the same colour must both be on their original squares, never moved.
fn side_rights(board: &Board, color: Color) -> (bool, bool) {
    let row = home_row(color);
    let unmoved = |col: i8, kind: PieceKind| {
        matches!(
            board.piece_at(Position::new(row, col)),
            Some(p) if p.kind == kind && p.color == color && !p.has_moved
        )
    };
    if !unmoved(4, PieceKind::King) {
        return (false, false);
    }
    (unmoved(7, PieceKind::Rook), unmoved(0, PieceKind::Rook))
}

fn en_passant_target(board: &Board) -> String {
    if let Some(last) = board.last_move() {
        let (from, to) = (last.from(), last.to());
        let is_pawn = board
            .piece_at(to)
            .map(|p| p.kind == PieceKind::Pawn)
            .unwrap_or(false);
        if is_pawn && (to.row - from.row).abs() == 2 {
            return Position::new((from.row + to.row) / 2, to.col).to_algebraic();
        }
    }
    "-".to_string()
}

/// Parse a FEN string into a board. The two counter fields may be omitted
/// and default to `0 1`.
pub fn parse(fen: &str) -> Result<Board, FenError> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.len() < 4 || parts.len() > 6 {
        return Err(FenError::FieldCount(parts.len()));
    }

    let mut board = Board::empty();
    parse_placement(&mut board, parts[0])?;

    let side = match parts[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(FenError::SideToMove(other.to_string())),
    };
    board.set_initial_side(side);

    let rights = parse_castling(parts[2])?;
    mark_moved_pieces(&mut board, &rights);

    if parts[3] != "-" {
        let target = Position::from_algebraic(parts[3])
            .ok_or_else(|| FenError::EnPassant(parts[3].to_string()))?;
        board.set_last_move(Some(double_step_into(&board, target, side)?));
    }

    let halfmove = parts.get(4).copied().unwrap_or("0");
    let fullmove = parts.get(5).copied().unwrap_or("1");
    board.halfmove_clock = halfmove
        .parse()
        .map_err(|_| FenError::Counter(halfmove.to_string()))?;
    board.fullmove_counter = fullmove
        .parse()
        .map_err(|_| FenError::Counter(fullmove.to_string()))?;

    let key = board.fen_without_counters();
    board.push_repetition(key);
    Ok(board)
}

fn parse_placement(board: &mut Board, placement: &str) -> Result<(), FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::RankCount(ranks.len()));
    }
    for (row, rank_str) in ranks.iter().enumerate() {
        let mut col: i8 = 0;
        for ch in rank_str.chars() {
            if let Some(d) = ch.to_digit(10) {
                if !(1..=8).contains(&d) {
                    return Err(FenError::PieceChar(ch));
                }
                col += d as i8;
            } else {
                let pc = Piece::from_symbol(ch).ok_or(FenError::PieceChar(ch))?;
                if col >= 8 {
                    return Err(FenError::RankLength(row + 1));
                }
                board.set_piece(Position::new(row as i8, col), Some(pc));
                col += 1;
            }
            if col > 8 {
                return Err(FenError::RankLength(row + 1));
            }
        }
        if col != 8 {
            return Err(FenError::RankLength(row + 1));
        }
    }
    Ok(())
}

/// Castling flags in `KQkq` order.
fn parse_castling(field: &str) -> Result<[bool; 4], FenError> {
    let mut rights = [false; 4];
    if field == "-" {
        return Ok(rights);
    }
    for c in field.chars() {
        let idx = match c {
            'K' => 0,
            'Q' => 1,
            'k' => 2,
            'q' => 3,
            _ => return Err(FenError::Castling(field.to_string())),
        };
        rights[idx] = true;
    }
    Ok(rights)
}

/// Translate castling rights and pawn ranks into `has_moved` flags, the only
/// state the move generator and encoder consult.
fn mark_moved_pieces(board: &mut Board, rights: &[bool; 4]) {
    for pos in Position::all() {
        let Some(mut pc) = board.piece_at(pos) else {
            continue;
        };
        let (king_side, queen_side) = match pc.color {
            Color::White => (rights[0], rights[1]),
            Color::Black => (rights[2], rights[3]),
        };
        let row = home_row(pc.color);
        pc.has_moved = match pc.kind {
            PieceKind::Pawn => {
                let start_row = match pc.color {
                    Color::White => 6,
                    Color::Black => 1,
                };
                pos.row != start_row
            }
            PieceKind::King => pos != Position::new(row, 4) || !(king_side || queen_side),
            PieceKind::Rook => {
                !((pos == Position::new(row, 7) && king_side)
                    || (pos == Position::new(row, 0) && queen_side))
            }
            _ => false,
        };
        board.set_piece(pos, Some(pc));
    }
}

/// Reconstruct the double step that produced the en-passant `target` for a
/// position where `side` is to move.
fn double_step_into(board: &Board, target: Position, side: Color) -> Result<Move, FenError> {
    let mover = side.other();
    let dir = pawn_direction(mover);
    let to = target.add(dir);
    let from = Position::new(target.row - dir.row_delta, target.col);
    let expected_row = match mover {
        Color::White => 5,
        Color::Black => 2,
    };
    let pawn_there = matches!(
        board.piece_at(to),
        Some(p) if p.kind == PieceKind::Pawn && p.color == mover
    );
    if target.row != expected_row || !pawn_there {
        return Err(FenError::EnPassant(target.to_algebraic()));
    }
    Ok(Move::regular(from, to))
}

#[cfg(test)]
#[path = "fen_tests.rs"]
mod fen_tests;
