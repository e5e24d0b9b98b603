//! Game state machine.
//!
//! A [`Game`] owns its board and is mutated only by the thread holding it.
//! Asynchronous sources (the clock ticker and the engine worker) post
//! [`Command`]s into the game's channel; the owner applies them with
//! [`Game::pump`], [`Game::pump_timeout`] or [`Game::handle`]. Once the game
//! has left [`GameStatus::InProgress`] every command is dropped, so late
//! ticks or engine replies can never touch a finished game.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::{
    board::Board,
    clock::Clock,
    config::{GameConfig, Opponent},
    engine::{Engine, EngineOpponent, SearchLimits},
    error::{ConfigError, EngineError, FenError},
    events::{DrawReason, GameEvent, Outcome, WinReason},
    moves::Move,
    position::Position,
    types::{Color, PieceKind},
    uci::CoordinateMove,
};

/// Work posted to a game from other threads.
#[derive(Debug)]
pub enum Command {
    /// One second of the current player's clock elapsed.
    Tick,
    EngineReply {
        generation: u64,
        result: Result<CoordinateMove, EngineError>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    NotStarted,
    InProgress,
    Finished(Outcome),
    /// Halted by `stop()` or an engine failure, without a result.
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Player {
    pub color: Color,
    /// Seconds remaining; unused in untimed games.
    pub time_left: u32,
}

pub struct Game {
    board: Board,
    players: [Player; 2],
    current: Color,
    time_in_seconds: u32,
    tick_interval: Duration,
    status: GameStatus,
    clock: Option<Clock>,
    commands_tx: Sender<Command>,
    commands_rx: Receiver<Command>,
    pending_events: VecDeque<GameEvent>,
    subscribers: Vec<Sender<GameEvent>>,
    /// Turn gate for engine mode
    opponent: Option<EngineOpponent>,
    /// Position `start()` sets up.
    start_position: Board,
}

impl Game {
    /// A two-player game. `time_in_seconds == 0` plays without clocks.
    pub fn new(time_in_seconds: u32) -> Self {
        let (commands_tx, commands_rx) = mpsc::channel();
        Self {
            board: Board::startpos(),
            players: [
                Player {
                    color: Color::White,
                    time_left: time_in_seconds,
                },
                Player {
                    color: Color::Black,
                    time_left: time_in_seconds,
                },
            ],
            current: Color::White,
            time_in_seconds,
            tick_interval: Duration::from_secs(1),
            status: GameStatus::NotStarted,
            clock: None,
            commands_tx,
            commands_rx,
            pending_events: VecDeque::new(),
            subscribers: Vec::new(),
            opponent: None,
            start_position: Board::startpos(),
        }
    }

    /// A game where `engine` plays the colour `human` does not.
    pub fn against_engine(
        time_in_seconds: u32,
        human: Color,
        engine: Box<dyn Engine>,
        limits: SearchLimits,
    ) -> Self {
        let mut game = Self::new(time_in_seconds);
        game.opponent = Some(EngineOpponent::new(human, engine, limits));
        game
    }

    /// Build a game from validated settings. Engine mode needs `engine`.
    /// A `start_fen` in the settings becomes the position `start()` uses.
    pub fn from_config(
        config: &GameConfig,
        engine: Option<Box<dyn Engine>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut game = match (&config.opponent, engine) {
            (Opponent::Human, _) => Self::new(config.time_in_seconds),
            (Opponent::Engine { human_color, .. }, Some(engine)) => Self::against_engine(
                config.time_in_seconds,
                *human_color,
                engine,
                config.search_limits().unwrap_or_default(),
            ),
            (Opponent::Engine { .. }, None) => {
                return Err(ConfigError::invalid("Engine mode requires an engine"))
            }
        };
        if let Some(fen) = &config.start_fen {
            game.start_position = Board::from_fen(fen)?;
        }
        Ok(game.with_tick_interval(config.tick_interval()))
    }

    /// Wall-clock period of one clock tick. Each tick still counts as one
    /// second of game time.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Start from the standard position, or the configured one. Ignored
    /// unless the game has not started yet.
    pub fn start(&mut self) {
        if self.status == GameStatus::NotStarted {
            self.begin(self.start_position.clone());
        }
    }

    /// Start from a custom position; the side to move comes from the FEN.
    /// Returns `Ok(false)` without touching the game if it already started.
    pub fn start_from_fen(&mut self, fen: &str) -> Result<bool, FenError> {
        let board = Board::from_fen(fen)?;
        if self.status != GameStatus::NotStarted {
            return Ok(false);
        }
        self.begin(board);
        Ok(true)
    }

    fn begin(&mut self, board: Board) {
        self.board = board;
        self.current = self.board.side_to_move();
        for player in self.players.iter_mut() {
            player.time_left = self.time_in_seconds;
        }
        self.status = GameStatus::InProgress;
        info!(
            fen = %self.board.fen(),
            time_in_seconds = self.time_in_seconds,
            engine = self.opponent.is_some(),
            "game started"
        );

        if self.time_in_seconds > 0 {
            self.clock = Some(Clock::start(self.tick_interval, self.commands_tx.clone()));
        }

        let started = match self.opponent.as_mut() {
            Some(opponent) => opponent.start(self.commands_tx.clone()),
            None => Ok(()),
        };
        match started {
            Ok(()) => self.request_engine_move_if_due(),
            Err(e) => self.engine_failed(e),
        }
    }

    /// Halt an in-progress game without a result.
    pub fn stop(&mut self) {
        if self.status != GameStatus::InProgress {
            return;
        }
        self.status = GameStatus::Stopped;
        self.teardown();
        info!("game stopped");
    }

    /// Legal moves of the piece on `pos`, empty unless that piece belongs to
    /// the side to move and that side is under the caller's control.
    pub fn legal_moves(&self, pos: Position) -> Vec<Move> {
        if !self.accepts_human_move() {
            return Vec::new();
        }
        match self.board.piece_at(pos) {
            Some(pc) if pc.color == self.current => self.board.legal_moves(pos),
            _ => Vec::new(),
        }
    }

    /// Play `from -> to`. Requests that are out of turn, from an empty
    /// square or match no legal move are ignored and return `false`.
    /// `promotion` picks the piece for a pawn reaching the last rank; it
    /// defaults to a queen.
    pub fn make_move(
        &mut self,
        from: Position,
        to: Position,
        promotion: Option<PieceKind>,
    ) -> bool {
        if !self.accepts_human_move() {
            return false;
        }
        self.apply_move(from, to, promotion)
    }

    /// Resign for the side to move, or for the human in engine mode.
    pub fn resign(&mut self) {
        if self.status != GameStatus::InProgress {
            return;
        }
        let loser = match &self.opponent {
            Some(opponent) => opponent.human_color(),
            None => self.current,
        };
        self.finish(Outcome::Win {
            reason: WinReason::Resignation,
            winner: loser.other(),
        });
    }

    /// Agree to a draw. Not available against an engine.
    pub fn draw_by_agreement(&mut self) {
        if self.opponent.is_some() || self.status != GameStatus::InProgress {
            return;
        }
        self.finish(Outcome::Draw {
            reason: DrawReason::Agreement,
        });
    }

    /// Apply one command from the clock or engine.
    pub fn handle(&mut self, command: Command) {
        if self.status != GameStatus::InProgress {
            trace!(?command, "command for inactive game dropped");
            return;
        }
        match command {
            Command::Tick => self.tick(),
            Command::EngineReply { generation, result } => self.engine_reply(generation, result),
        }
    }

    /// Apply every queued command without blocking. Returns how many were
    /// handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let command = match self.commands_rx.try_recv() {
                Ok(command) => command,
                Err(_) => break,
            };
            self.handle(command);
            handled += 1;
        }
        handled
    }

    /// Wait up to `timeout` for a command, then apply everything queued.
    pub fn pump_timeout(&mut self, timeout: Duration) -> usize {
        let first = match self.commands_rx.recv_timeout(timeout) {
            Ok(command) => command,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => return 0,
        };
        self.handle(first);
        1 + self.pump()
    }

    /// Events raised since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.pending_events.drain(..).collect()
    }

    /// Receive every event raised from now on. Dropped receivers are
    /// forgotten on the next event.
    pub fn subscribe(&mut self) -> Receiver<GameEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == GameStatus::InProgress
    }

    pub fn current_player(&self) -> Color {
        self.current
    }

    pub fn player(&self, color: Color) -> Player {
        self.players[color.idx()]
    }

    pub fn time_left(&self, color: Color) -> u32 {
        self.players[color.idx()].time_left
    }

    pub fn time_in_seconds(&self) -> u32 {
        self.time_in_seconds
    }

    /// The human's colour in engine mode.
    pub fn human_color(&self) -> Option<Color> {
        self.opponent.as_ref().map(|o| o.human_color())
    }

    pub fn is_engine_thinking(&self) -> bool {
        self.opponent.as_ref().map(|o| o.is_thinking()).unwrap_or(false)
    }

    fn accepts_human_move(&self) -> bool {
        if self.status != GameStatus::InProgress {
            return false;
        }
        match &self.opponent {
            Some(opponent) => opponent.human_color() == self.current,
            None => true,
        }
    }

    fn apply_move(&mut self, from: Position, to: Position, promotion: Option<PieceKind>) -> bool {
        match self.board.piece_at(from) {
            Some(pc) if pc.color == self.current => {}
            _ => return false,
        }
        let mut mv = match self.board.legal_moves(from).into_iter().find(|m| m.to() == to) {
            Some(mv) => mv,
            None => return false,
        };
        if let Some(kind) = promotion {
            mv.set_promotion_piece(kind);
        }
        mv.execute(&mut self.board);
        debug!(color = %self.current, mv = %mv, fen = %self.board.fen(), "move played");

        let next = self.current.other();
        self.emit(GameEvent::MoveMade { next_to_move: next });

        match self.terminal_outcome(next) {
            Some(outcome) => self.finish(outcome),
            None => {
                self.current = next;
                self.request_engine_move_if_due();
            }
        }
        true
    }

    /// Checked in order after every move; the first match ends the game.
    fn terminal_outcome(&self, next: Color) -> Option<Outcome> {
        if !self.board.has_legal_move(next) {
            return Some(if self.board.is_in_check(next) {
                Outcome::Win {
                    reason: WinReason::Checkmate,
                    winner: next.other(),
                }
            } else {
                Outcome::Draw {
                    reason: DrawReason::Stalemate,
                }
            });
        }
        let reason = if self.board.is_threefold_repetition() {
            DrawReason::ThreefoldRepetition
        } else if self.board.has_insufficient_material() {
            DrawReason::InsufficientMaterial
        } else if self.board.is_fifty_move_draw() {
            DrawReason::FiftyMoveRule
        } else {
            return None;
        };
        Some(Outcome::Draw { reason })
    }

    fn tick(&mut self) {
        if self.time_in_seconds == 0 {
            return;
        }
        let color = self.current;
        let player = &mut self.players[color.idx()];
        player.time_left = player.time_left.saturating_sub(1);
        let seconds_left = player.time_left;
        trace!(%color, seconds_left, "clock tick");

        self.emit(GameEvent::TimeUpdated {
            color,
            seconds_left,
        });
        if seconds_left == 0 {
            self.finish(Outcome::Win {
                reason: WinReason::Timeout,
                winner: color.other(),
            });
        }
    }

    fn engine_reply(&mut self, generation: u64, result: Result<CoordinateMove, EngineError>) {
        if self.opponent.is_none() {
            warn!(generation, "engine reply for a two-player game dropped");
            return;
        }
        let mv = match result {
            Ok(mv) => mv,
            Err(e) => return self.engine_failed(e),
        };
        let expected = self
            .opponent
            .as_mut()
            .map(|o| o.accept(generation))
            .unwrap_or(false);
        if !expected {
            warn!(generation, %mv, "stale engine reply dropped");
            return;
        }
        if !self.apply_move(mv.from, mv.to, mv.promotion) {
            self.engine_failed(EngineError::IllegalReply(mv.to_string()));
        }
    }

    fn request_engine_move_if_due(&mut self) {
        let requested = match self.opponent.as_mut() {
            Some(opponent) if opponent.engine_color() == self.current => {
                opponent.request(self.board.fen())
            }
            _ => return,
        };
        match requested {
            Ok(generation) => debug!(generation, "engine move requested"),
            Err(e) => self.engine_failed(e),
        }
    }

    fn engine_failed(&mut self, error: EngineError) {
        if self.status != GameStatus::InProgress {
            return;
        }
        warn!(error = %error, "engine failed, stopping game");
        self.status = GameStatus::Stopped;
        self.teardown();
        self.emit(GameEvent::EngineError {
            message: error.to_string(),
        });
    }

    fn finish(&mut self, outcome: Outcome) {
        if self.status != GameStatus::InProgress {
            return;
        }
        self.status = GameStatus::Finished(outcome);
        self.teardown();
        info!(?outcome, fen = %self.board.fen(), "game over");
        self.emit(outcome.into());
    }

    fn teardown(&mut self) {
        if let Some(mut clock) = self.clock.take() {
            clock.stop();
        }
        if let Some(opponent) = self.opponent.as_mut() {
            opponent.shutdown();
        }
    }

    fn emit(&mut self, event: GameEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        self.pending_events.push_back(event);
    }
}

impl Drop for Game {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
#[path = "game_tests.rs"]
mod game_tests;
