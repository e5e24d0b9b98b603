use std::time::Instant;

use rayon::prelude::*;

use chess_core::{perft, perft_divide, Board};

/// Reference node counts. Depths stay shallow enough that no pawn reaches
/// the last rank, where a single promotion move stands for four.
const CASES: &[(&str, &[(u8, u64)])] = &[
    (
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        &[(1, 20), (2, 400), (3, 8_902)],
    ),
    (
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        &[(1, 48), (2, 2_039)],
    ),
    (
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        &[(1, 14), (2, 191), (3, 2_812)],
    ),
];

#[test]
fn perft_reference_positions() {
    CASES.par_iter().for_each(|(fen, depths)| {
        let board = Board::from_fen(fen).unwrap();
        for &(depth, expected) in depths.iter() {
            let start = Instant::now();
            let got = perft(&board, depth);
            assert!(
                got == expected,
                "Perft mismatch for FEN '{}' at depth {}: expected {}, got {}",
                fen,
                depth,
                expected,
                got
            );
            eprintln!(
                "perft({}) = {} in {:.2?} for {}",
                depth,
                got,
                start.elapsed(),
                fen
            );
        }
    });
}

#[test]
fn perft_divide_sums_to_total() {
    let board = Board::startpos();
    let divided = perft_divide(&board, 2);
    assert_eq!(divided.len(), 20);
    assert!(divided.iter().all(|(_, n)| *n == 20));
    assert_eq!(divided.iter().map(|(_, n)| n).sum::<u64>(), perft(&board, 2));
}

#[test]
fn perft_does_not_mutate_board() {
    let board = Board::startpos();
    let before = board.fen();
    perft(&board, 2);
    assert_eq!(board.fen(), before);
}
