use crate::{
    error::FenError,
    fen,
    moves::Move,
    pieces,
    position::Position,
    types::*,
};

/// An 8x8 grid of pieces plus the history needed for en passant, the move
/// counters and repetition detection.
#[derive(Clone, Debug)]
pub struct Board {
    squares: [Option<Piece>; 64],
    last_move: Option<Move>,
    /// Half-moves since the last pawn move or capture.
    pub(crate) halfmove_clock: u32,
    /// Starts at 1, incremented after each Black move.
    pub(crate) fullmove_counter: u32,
    /// Counter-free FEN keys since the last irreversible move.
    repetition_history: Vec<String>,
    /// Side to move when there is no last move to derive it from.
    initial_side: Color,
}

impl Default for Board {
    fn default() -> Self {
        Self::startpos()
    }
}

impl Board {
    pub fn empty() -> Self {
        Board {
            squares: [None; 64],
            last_move: None,
            halfmove_clock: 0,
            fullmove_counter: 1,
            repetition_history: Vec::new(),
            initial_side: Color::White,
        }
    }

    /// Standard starting position.
    pub fn startpos() -> Self {
        let mut b = Board::empty();
        b.initialize();
        b
    }

    /// Place the standard starting set and seed the repetition history
    /// with the starting position.
    pub fn initialize(&mut self) {
        *self = Board::empty();

        let back = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (col, &kind) in back.iter().enumerate() {
            let col = col as i8;
            self.set_piece(Position::new(0, col), Some(Piece::new(Color::Black, kind)));
            self.set_piece(Position::new(7, col), Some(Piece::new(Color::White, kind)));
            self.set_piece(
                Position::new(1, col),
                Some(Piece::new(Color::Black, PieceKind::Pawn)),
            );
            self.set_piece(
                Position::new(6, col),
                Some(Piece::new(Color::White, PieceKind::Pawn)),
            );
        }

        let key = self.fen_without_counters();
        self.repetition_history.push(key);
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        fen::parse(fen)
    }

    /// Piece on `pos`; `None` for empty or off-board squares.
    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        if pos.is_on_board() {
            self.squares[pos.index()]
        } else {
            None
        }
    }

    /// # Panics
    /// If `pos` is off the board.
    pub fn set_piece(&mut self, pos: Position, pc: Option<Piece>) {
        assert!(pos.is_on_board(), "set_piece off board: {pos:?}");
        self.squares[pos.index()] = pc;
    }

    pub(crate) fn take_piece(&mut self, pos: Position) -> Option<Piece> {
        assert!(pos.is_on_board(), "take_piece off board: {pos:?}");
        self.squares[pos.index()].take()
    }

    pub fn positions_of(&self, color: Color) -> Vec<Position> {
        Position::all()
            .filter(|&p| self.piece_at(p).map(|pc| pc.color == color).unwrap_or(false))
            .collect()
    }

    pub fn piece_count(&self) -> usize {
        self.squares.iter().filter(|s| s.is_some()).count()
    }

    pub fn king_position(&self, c: Color) -> Option<Position> {
        Position::all().find(|&p| {
            matches!(self.piece_at(p), Some(pc) if pc.color == c && pc.kind == PieceKind::King)
        })
    }

    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    pub(crate) fn set_last_move(&mut self, mv: Option<Move>) {
        self.last_move = mv;
    }

    pub(crate) fn set_initial_side(&mut self, side: Color) {
        self.initial_side = side;
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_counter(&self) -> u32 {
        self.fullmove_counter
    }

    pub fn repetition_history(&self) -> &[String] {
        &self.repetition_history
    }

    pub(crate) fn push_repetition(&mut self, key: String) {
        self.repetition_history.push(key);
    }

    pub(crate) fn clear_repetition_history(&mut self) {
        self.repetition_history.clear();
    }

    /// The opponent of whoever made the last move.
    pub fn side_to_move(&self) -> Color {
        self.last_move
            .and_then(|m| self.piece_at(m.to()))
            .map(|pc| pc.color.other())
            .unwrap_or(self.initial_side)
    }

    /// Pseudo-legal moves of the piece on `pos`.
    pub fn moves(&self, pos: Position) -> Vec<Move> {
        pieces::moves_from(self, pos)
    }

    pub fn legal_moves(&self, pos: Position) -> Vec<Move> {
        let mut out = self.moves(pos);
        out.retain(|mv| mv.is_legal(self));
        out
    }

    /// Every legal move of every piece of `color`.
    pub fn legal_moves_for(&self, color: Color) -> Vec<Move> {
        self.positions_of(color)
            .into_iter()
            .flat_map(|p| self.legal_moves(p))
            .collect()
    }

    pub fn has_legal_move(&self, color: Color) -> bool {
        self.positions_of(color)
            .into_iter()
            .any(|p| self.moves(p).iter().any(|mv| mv.is_legal(self)))
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        let king = match self.king_position(color) {
            Some(k) => k,
            None => return false,
        };
        self.positions_of(color.other()).into_iter().any(|p| {
            self.piece_at(p)
                .map(|pc| pieces::attacks_square(self, p, pc, king))
                .unwrap_or(false)
        })
    }

    /// The current position has occurred exactly three times since the last
    /// irreversible move.
    pub fn is_threefold_repetition(&self) -> bool {
        match self.repetition_history.last() {
            Some(current) => {
                self.repetition_history
                    .iter()
                    .filter(|key| *key == current)
                    .count()
                    == 3
            }
            None => false,
        }
    }

    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Bare kings, a lone minor piece, or two bishops on squares of the same
    /// colour.
    pub fn has_insufficient_material(&self) -> bool {
        let pieces: Vec<(Position, Piece)> = Position::all()
            .filter_map(|p| self.piece_at(p).map(|pc| (p, pc)))
            .collect();
        match pieces.len() {
            2 => true,
            3 => pieces
                .iter()
                .any(|(_, pc)| matches!(pc.kind, PieceKind::Bishop | PieceKind::Knight)),
            4 => {
                let bishops: Vec<Position> = pieces
                    .iter()
                    .filter(|(_, pc)| pc.kind == PieceKind::Bishop)
                    .map(|&(p, _)| p)
                    .collect();
                bishops.len() == 2 && bishops[0].parity() == bishops[1].parity()
            }
            _ => false,
        }
    }

    /// Deep copy for speculative execution. The repetition history is left
    /// empty; everything the move generator reads is preserved.
    pub fn copy(&self) -> Board {
        Board {
            squares: self.squares,
            last_move: self.last_move,
            halfmove_clock: self.halfmove_clock,
            fullmove_counter: self.fullmove_counter,
            repetition_history: Vec::new(),
            initial_side: self.initial_side,
        }
    }

    pub fn fen(&self) -> String {
        fen::encode(self)
    }

    pub fn fen_without_counters(&self) -> String {
        fen::encode_without_counters(self)
    }
}

#[cfg(test)]
#[path = "board_tests.rs"]
mod board_tests;
