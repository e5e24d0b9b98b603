//! External engine adapter.
//!
//! An [`EngineOpponent`] is the turn gate a [`Game`](crate::Game) consults in
//! engine mode: it decides which side the human may move and runs the engine
//! on a worker thread. Replies travel back through the game's command channel
//! as [`Command::EngineReply`] and are applied by the thread owning the game.

use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::EngineError, game::Command, types::Color, uci::CoordinateMove};

/// Highest skill level understood by UCI engines that expose one.
pub const MAX_SKILL_LEVEL: u8 = 20;

/// Search budget handed to the engine with every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimits {
    /// Thinking time per move
    pub move_time: Duration,
    /// 0 (weakest) ..= 20 (strongest)
    pub skill_level: u8,
}

impl SearchLimits {
    pub fn new(move_time: Duration, skill_level: u8) -> Self {
        Self {
            move_time,
            skill_level: skill_level.min(MAX_SKILL_LEVEL),
        }
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000), MAX_SKILL_LEVEL)
    }
}

/// Anything that can answer "best move for this FEN".
///
/// Implementations run on the engine worker thread and may block.
pub trait Engine: Send {
    /// Best move for the side to move in `fen`, in coordinate notation
    /// (`e2e4`, `e7e8q`).
    fn best_move(&mut self, fen: &str, limits: &SearchLimits) -> Result<String, EngineError>;

    /// Returns the engine's name for logging
    fn name(&self) -> &str;

    /// Prepare for a new game. Process-backed engines start up here.
    fn new_game(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    /// Release external resources.
    fn quit(&mut self) {}
}

enum Request {
    NewGame,
    BestMove { generation: u64, fen: String },
    Quit,
}

/// Thread that owns the engine and serves requests in order.
struct Worker {
    requests: Sender<Request>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    fn spawn(mut engine: Box<dyn Engine>, limits: SearchLimits, replies: Sender<Command>) -> Self {
        let (requests, inbox) = mpsc::channel::<Request>();
        let handle = thread::spawn(move || {
            for request in inbox {
                match request {
                    Request::NewGame => {
                        if let Err(e) = engine.new_game() {
                            // Errors are honoured regardless of generation.
                            let reply = Command::EngineReply {
                                generation: 0,
                                result: Err(e),
                            };
                            if replies.send(reply).is_err() {
                                break;
                            }
                        }
                    }
                    Request::BestMove { generation, fen } => {
                        debug!(engine = engine.name(), %fen, "requesting engine move");
                        let result = engine
                            .best_move(&fen, &limits)
                            .and_then(|reply| CoordinateMove::parse(&reply));
                        if replies.send(Command::EngineReply { generation, result }).is_err() {
                            break;
                        }
                    }
                    Request::Quit => break,
                }
            }
            engine.quit();
        });
        Self {
            requests,
            handle: Some(handle),
        }
    }

    fn send(&self, request: Request) -> Result<(), EngineError> {
        self.requests
            .send(request)
            .map_err(|_| EngineError::WorkerGone)
    }

    fn shutdown(&mut self) {
        let _ = self.requests.send(Request::Quit);
        // Detach: a blocked engine call must not hold up the game thread.
        self.handle.take();
    }
}

/// Engine-mode policy wrapped around a game: the human moves one colour,
/// the engine the other.
pub struct EngineOpponent {
    human: Color,
    limits: SearchLimits,
    engine: Option<Box<dyn Engine>>,
    worker: Option<Worker>,
    generation: u64,
    pending: Option<u64>,
}

impl EngineOpponent {
    pub fn new(human: Color, engine: Box<dyn Engine>, limits: SearchLimits) -> Self {
        Self {
            human,
            limits,
            engine: Some(engine),
            worker: None,
            generation: 0,
            pending: None,
        }
    }

    pub fn human_color(&self) -> Color {
        self.human
    }

    pub fn engine_color(&self) -> Color {
        self.human.other()
    }

    /// True while a request is outstanding.
    pub fn is_thinking(&self) -> bool {
        self.pending.is_some()
    }

    /// Move the engine onto its worker thread and reset it for a new game.
    pub(crate) fn start(&mut self, replies: Sender<Command>) -> Result<(), EngineError> {
        let engine = self.engine.take().ok_or(EngineError::WorkerGone)?;
        let worker = Worker::spawn(engine, self.limits, replies);
        worker.send(Request::NewGame)?;
        self.worker = Some(worker);
        Ok(())
    }

    /// Ask for a move in `fen`. Returns the request's generation.
    pub(crate) fn request(&mut self, fen: String) -> Result<u64, EngineError> {
        let worker = self.worker.as_ref().ok_or(EngineError::WorkerGone)?;
        self.generation += 1;
        let generation = self.generation;
        worker.send(Request::BestMove { generation, fen })?;
        self.pending = Some(generation);
        Ok(generation)
    }

    /// Consume the outstanding request if `generation` matches it.
    pub(crate) fn accept(&mut self, generation: u64) -> bool {
        if self.pending == Some(generation) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn shutdown(&mut self) {
        self.pending = None;
        if let Some(mut worker) = self.worker.take() {
            worker.shutdown();
        } else if let Some(mut engine) = self.engine.take() {
            engine.quit();
        }
    }
}

impl Drop for EngineOpponent {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
