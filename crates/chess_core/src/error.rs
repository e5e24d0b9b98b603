//! Error types.
//!
//! Rejected move requests are not errors: `Game::make_move` ignores them.
//! These types cover malformed input, configuration and the external engine.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FenError {
    #[error("invalid FEN: expected 4 to 6 fields, found {0}")]
    FieldCount(usize),
    #[error("invalid FEN: expected 8 ranks, found {0}")]
    RankCount(usize),
    #[error("invalid FEN: rank {0} does not describe exactly 8 files")]
    RankLength(usize),
    #[error("invalid FEN: unexpected piece character '{0}'")]
    PieceChar(char),
    #[error("invalid FEN: side to move must be 'w' or 'b', found '{0}'")]
    SideToMove(String),
    #[error("invalid FEN: bad castling field '{0}'")]
    Castling(String),
    #[error("invalid FEN: bad en passant target '{0}'")]
    EnPassant(String),
    #[error("invalid FEN: bad move counter '{0}'")]
    Counter(String),
}

/// Validation failure for user-supplied settings. `Invalid` carries a
/// message meant to be shown to the user as-is.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Invalid(String),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Fen(#[from] FenError),
}

impl ConfigError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ConfigError::Invalid(msg.into())
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine '{path}': {source}")]
    Spawn {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("engine I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("engine closed its output")]
    Closed,
    #[error("engine did not answer within {0} ms")]
    Timeout(u64),
    #[error("malformed engine reply '{0}'")]
    MalformedReply(String),
    #[error("engine reply '{0}' is not a legal move")]
    IllegalReply(String),
    #[error("engine worker is no longer running")]
    WorkerGone,
    #[error("engine rejected position: {0}")]
    Position(#[from] FenError),
    #[error("engine found no legal move")]
    NoLegalMove,
}
