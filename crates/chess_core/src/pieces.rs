//! Pseudo-legal move enumeration per piece kind.
//!
//! Moves produced here respect board edges and friendly occupancy but may
//! leave the mover's king in check; [`Move::is_legal`] filters those out.

use crate::{
    board::Board,
    moves::Move,
    position::{Direction, Position},
    types::*,
};

/// All pseudo-legal moves for the piece standing on `from`.
/// Returns an empty list for an empty square.
pub fn moves_from(board: &Board, from: Position) -> Vec<Move> {
    let pc = match board.piece_at(from) {
        Some(p) => p,
        None => return Vec::new(),
    };
    let mut out = Vec::with_capacity(16);
    match pc.kind {
        PieceKind::Pawn => gen_pawn(board, from, pc, &mut out),
        PieceKind::Knight => gen_knight(board, from, pc.color, &mut out),
        PieceKind::Bishop => gen_slider(board, from, pc.color, &mut out, &Direction::DIAGONAL),
        PieceKind::Rook => gen_slider(board, from, pc.color, &mut out, &Direction::ORTHOGONAL),
        PieceKind::Queen => gen_slider(board, from, pc.color, &mut out, &Direction::ALL),
        PieceKind::King => {
            gen_king(board, from, pc.color, &mut out);
            if !pc.has_moved {
                gen_castle(board, from, pc.color, &mut out);
            }
        }
    }
    out
}

/// True if the piece on `from` could move onto the square holding the
/// opposing king.
pub fn threatens(board: &Board, from: Position) -> bool {
    let pc = match board.piece_at(from) {
        Some(p) => p,
        None => return false,
    };
    match board.king_position(pc.color.other()) {
        Some(king) => attacks_square(board, from, pc, king),
        None => false,
    }
}

/// Whether `pc`, standing on `from`, attacks `target`. Castling and pawn
/// pushes never capture, so only capturing geometry is considered.
pub fn attacks_square(board: &Board, from: Position, pc: Piece, target: Position) -> bool {
    match pc.kind {
        PieceKind::Pawn => {
            let ahead = from.add(pawn_direction(pc.color));
            Direction::HORIZONTAL
                .iter()
                .any(|&h| ahead.add(h) == target)
        }
        PieceKind::Knight => knight_targets(from).contains(&target),
        PieceKind::King => Direction::ALL.iter().any(|&d| from.add(d) == target),
        PieceKind::Bishop => ray_hits(board, from, target, &Direction::DIAGONAL),
        PieceKind::Rook => ray_hits(board, from, target, &Direction::ORTHOGONAL),
        PieceKind::Queen => ray_hits(board, from, target, &Direction::ALL),
    }
}

fn ray_hits(board: &Board, from: Position, target: Position, dirs: &[Direction]) -> bool {
    for &dir in dirs {
        let mut to = from.add(dir);
        while to.is_on_board() {
            if to == target {
                return true;
            }
            if board.piece_at(to).is_some() {
                break;
            }
            to = to.add(dir);
        }
    }
    false
}

pub(crate) fn pawn_direction(c: Color) -> Direction {
    match c {
        Color::White => Direction::NORTH,
        Color::Black => Direction::SOUTH,
    }
}

fn gen_pawn(board: &Board, from: Position, pc: Piece, out: &mut Vec<Move>) {
    let c = pc.color;
    let dir = pawn_direction(c);
    let (start_row, pre_promo_row, ep_row) = match c {
        Color::White => (6, 1, 3),
        Color::Black => (1, 6, 4),
    };

    let ahead = from.add(dir);
    let mut targets = Vec::with_capacity(3);

    // forward 1
    if ahead.is_on_board() && board.piece_at(ahead).is_none() {
        targets.push(ahead);
    }
    // diagonal captures
    for h in Direction::HORIZONTAL {
        let to = ahead.add(h);
        if let Some(tpc) = board.piece_at(to) {
            if tpc.color != c {
                targets.push(to);
            }
        }
    }

    if from.row == pre_promo_row {
        out.extend(targets.into_iter().map(|to| Move::promotion(from, to)));
    } else {
        out.extend(targets.into_iter().map(|to| Move::regular(from, to)));
    }

    // forward 2 from start
    if !pc.has_moved && from.row == start_row {
        let ahead2 = ahead.add(dir);
        if board.piece_at(ahead).is_none() && board.piece_at(ahead2).is_none() {
            out.push(Move::regular(from, ahead2));
        }
    }

    if from.row == ep_row {
        if let Some(to) = en_passant_target(board, from, c) {
            out.push(Move::en_passant(from, to));
        }
    }
}

/// Destination of an en passant capture from `from`, if the previous move
/// was an enemy pawn's double step landing beside it.
fn en_passant_target(board: &Board, from: Position, c: Color) -> Option<Position> {
    let last = board.last_move()?;
    if (last.to().row - last.from().row).abs() != 2 {
        return None;
    }
    for h in Direction::HORIZONTAL {
        let side = from.add(h);
        if last.to() != side {
            continue;
        }
        match board.piece_at(side) {
            Some(p) if p.kind == PieceKind::Pawn && p.color != c => {
                return Some(from.add(pawn_direction(c)).add(h));
            }
            _ => {}
        }
    }
    None
}

/// Two steps along one axis and one step along the other, in all eight
/// combinations. Off-board squares are filtered.
fn knight_targets(from: Position) -> Vec<Position> {
    let mut targets = Vec::with_capacity(8);
    for h in Direction::HORIZONTAL {
        for v in Direction::VERTICAL {
            targets.push(from.add(h).add(h).add(v));
            targets.push(from.add(v).add(v).add(h));
        }
    }
    targets.retain(|p| p.is_on_board());
    targets
}

fn gen_knight(board: &Board, from: Position, c: Color, out: &mut Vec<Move>) {
    for to in knight_targets(from) {
        match board.piece_at(to) {
            None => out.push(Move::regular(from, to)),
            Some(pc) if pc.color != c => out.push(Move::regular(from, to)),
            _ => {}
        }
    }
}

fn gen_slider(board: &Board, from: Position, c: Color, out: &mut Vec<Move>, dirs: &[Direction]) {
    for &dir in dirs {
        let mut to = from.add(dir);
        while to.is_on_board() {
            match board.piece_at(to) {
                None => out.push(Move::regular(from, to)),
                Some(pc) if pc.color != c => {
                    out.push(Move::regular(from, to));
                    break;
                }
                _ => break,
            }
            to = to.add(dir);
        }
    }
}

fn gen_king(board: &Board, from: Position, c: Color, out: &mut Vec<Move>) {
    for dir in Direction::ALL {
        let to = from.add(dir);
        if !to.is_on_board() {
            continue;
        }
        match board.piece_at(to) {
            None => out.push(Move::regular(from, to)),
            Some(pc) if pc.color != c => out.push(Move::regular(from, to)),
            _ => {}
        }
    }
}

/// Castling is offered when the corner rook of the king's own colour has
/// never moved and every square between king and rook is empty. Whether
/// the king passes through check is decided by [`Move::is_legal`].
fn gen_castle(board: &Board, from: Position, c: Color, out: &mut Vec<Move>) {
    for dir in Direction::HORIZONTAL {
        let to = from.add(dir).add(dir);
        if to.is_on_board() && can_castle(board, from, c, dir) {
            out.push(Move::castling(from, to));
        }
    }
}

pub(crate) fn castling_rook_position(king: Position, dir: Direction) -> Position {
    let col = if dir == Direction::EAST { 7 } else { 0 };
    Position::new(king.row, col)
}

fn can_castle(board: &Board, from: Position, c: Color, dir: Direction) -> bool {
    let rook_pos = castling_rook_position(from, dir);
    match board.piece_at(rook_pos) {
        Some(rook) if rook.kind == PieceKind::Rook && rook.color == c && !rook.has_moved => {}
        _ => return false,
    }

    let mut pos = from.add(dir);
    while pos != rook_pos {
        if !pos.is_on_board() || board.piece_at(pos).is_some() {
            return false;
        }
        pos = pos.add(dir);
    }
    true
}

#[cfg(test)]
#[path = "pieces_tests.rs"]
mod pieces_tests;
