use crate::{board::Board, moves::Move};

/// Pure perft node count.
/// Counts all legal positions from the current one down to `depth`.
pub fn perft(board: &Board, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = board.legal_moves_for(board.side_to_move());
    if depth == 1 {
        return moves.len() as u64;
    }
    moves
        .iter()
        .map(|mv| perft(&after(board, mv), depth - 1))
        .sum()
}

/// Node count below each root move, in coordinate notation. Handy for
/// locating a move generation bug against a reference engine.
pub fn perft_divide(board: &Board, depth: u8) -> Vec<(String, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    board
        .legal_moves_for(board.side_to_move())
        .iter()
        .map(|mv| (mv.to_uci(), perft(&after(board, mv), depth - 1)))
        .collect()
}

fn after(board: &Board, mv: &Move) -> Board {
    let mut next = board.copy();
    mv.execute(&mut next);
    next
}
