//! Board coordinates and ray directions.
//!
//! Row 0 is the eighth rank (Black's back rank) and row 7 the first rank, so
//! iterating rows in order walks the board the way FEN lists it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A square on the board as (row, col). Values produced by [`Position::add`]
/// may fall off the board; check [`Position::is_on_board`] before indexing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i8,
    pub col: i8,
}

impl Position {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    pub fn add(self, dir: Direction) -> Position {
        Position::new(self.row + dir.row_delta, self.col + dir.col_delta)
    }

    pub fn is_on_board(self) -> bool {
        (0..8).contains(&self.row) && (0..8).contains(&self.col)
    }

    /// Index into a row-major 64-element grid.
    pub fn index(self) -> usize {
        debug_assert!(self.is_on_board(), "position off board: {self:?}");
        (self.row as usize) * 8 + self.col as usize
    }

    /// Square colour parity; two squares share a colour iff parities match.
    pub fn parity(self) -> i8 {
        (self.row + self.col) % 2
    }

    /// Parse coordinate notation such as `e4`.
    pub fn from_algebraic(c: &str) -> Option<Position> {
        let b = c.as_bytes();
        if b.len() != 2 {
            return None;
        }
        let f = b[0];
        let r = b[1];
        if !(b'a'..=b'h').contains(&f) || !(b'1'..=b'8').contains(&r) {
            return None;
        }
        Some(Position::new((b'8' - r) as i8, (f - b'a') as i8))
    }

    pub fn to_algebraic(self) -> String {
        let f = (b'a' + self.col as u8) as char;
        let r = (b'8' - self.row as u8) as char;
        format!("{f}{r}")
    }

    /// Every on-board square, rank 8 first.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..8).flat_map(|row| (0..8).map(move |col| Position::new(row, col)))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_on_board() {
            write!(f, "{}", self.to_algebraic())
        } else {
            write!(f, "({}, {})", self.row, self.col)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Direction {
    pub row_delta: i8,
    pub col_delta: i8,
}

impl Direction {
    pub const NORTH: Direction = Direction::new(-1, 0);
    pub const NORTH_EAST: Direction = Direction::new(-1, 1);
    pub const EAST: Direction = Direction::new(0, 1);
    pub const SOUTH_EAST: Direction = Direction::new(1, 1);
    pub const SOUTH: Direction = Direction::new(1, 0);
    pub const SOUTH_WEST: Direction = Direction::new(1, -1);
    pub const WEST: Direction = Direction::new(0, -1);
    pub const NORTH_WEST: Direction = Direction::new(-1, -1);

    pub const HORIZONTAL: [Direction; 2] = [Direction::EAST, Direction::WEST];
    pub const VERTICAL: [Direction; 2] = [Direction::NORTH, Direction::SOUTH];
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::NORTH,
        Direction::EAST,
        Direction::SOUTH,
        Direction::WEST,
    ];
    pub const DIAGONAL: [Direction; 4] = [
        Direction::NORTH_EAST,
        Direction::SOUTH_EAST,
        Direction::SOUTH_WEST,
        Direction::NORTH_WEST,
    ];
    pub const ALL: [Direction; 8] = [
        Direction::NORTH,
        Direction::NORTH_EAST,
        Direction::EAST,
        Direction::SOUTH_EAST,
        Direction::SOUTH,
        Direction::SOUTH_WEST,
        Direction::WEST,
        Direction::NORTH_WEST,
    ];

    pub const fn new(row_delta: i8, col_delta: i8) -> Self {
        Self {
            row_delta,
            col_delta,
        }
    }
}
