//! UCI plumbing: coordinate move strings and a client for engine processes.

use std::fmt;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::{
    engine::{Engine, SearchLimits, MAX_SKILL_LEVEL},
    error::EngineError,
    position::Position,
    types::PieceKind,
};

/// A move as engines write it: `e2e4`, or `e7e8q` with a promotion letter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoordinateMove {
    pub from: Position,
    pub to: Position,
    pub promotion: Option<PieceKind>,
}

impl CoordinateMove {
    /// Accepts exactly four or five characters; the fifth must be one of
    /// `q r b n`.
    pub fn parse(txt: &str) -> Result<Self, EngineError> {
        let malformed = || EngineError::MalformedReply(txt.to_string());
        let s = txt.trim();
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(malformed());
        }
        let from = Position::from_algebraic(&s[0..2]).ok_or_else(malformed)?;
        let to = Position::from_algebraic(&s[2..4]).ok_or_else(malformed)?;
        let promotion = match s.as_bytes().get(4) {
            None => None,
            Some(b'q') => Some(PieceKind::Queen),
            Some(b'r') => Some(PieceKind::Rook),
            Some(b'b') => Some(PieceKind::Bishop),
            Some(b'n') => Some(PieceKind::Knight),
            Some(_) => return Err(malformed()),
        };
        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Display for CoordinateMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(p) = self.promotion {
            write!(f, "{}", p.symbol())?;
        }
        Ok(())
    }
}

/// Extra time allowed past `movetime` before a search is considered hung.
const REPLY_GRACE: Duration = Duration::from_secs(5);
/// Handshake (`uciok`, `readyok`) deadline.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

struct Running {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<std::io::Result<String>>,
}

/// An engine binary spoken to over stdin/stdout.
pub struct UciEngine {
    path: PathBuf,
    name: String,
    running: Option<Running>,
    skill_level: Option<u8>,
}

impl UciEngine {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "uci".to_string());
        Self {
            path,
            name,
            running: None,
            skill_level: None,
        }
    }

    fn spawn(&mut self) -> Result<(), EngineError> {
        let mut child = Command::new(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                path: self.path.display().to_string(),
                source,
            })?;
        let stdin = child.stdin.take().ok_or(EngineError::Closed)?;
        let stdout = child.stdout.take().ok_or(EngineError::Closed)?;

        // Reads block, so they happen on their own thread and are waited on
        // with a deadline.
        let (tx, lines) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        info!(path = %self.path.display(), "engine process started");
        self.running = Some(Running {
            child,
            stdin,
            lines,
        });
        self.skill_level = None;
        Ok(())
    }

    fn send(&mut self, command: &str) -> Result<(), EngineError> {
        let running = self.running.as_mut().ok_or(EngineError::Closed)?;
        debug!(command, "-> engine");
        writeln!(running.stdin, "{command}")?;
        running.stdin.flush()?;
        Ok(())
    }

    /// Read lines until one starts with `prefix`; returns that line.
    fn read_until(&mut self, prefix: &str, timeout: Duration) -> Result<String, EngineError> {
        let running = self.running.as_mut().ok_or(EngineError::Closed)?;
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match running.lines.recv_timeout(remaining) {
                Ok(Ok(line)) => {
                    debug!(line = %line, "<- engine");
                    if line.trim_start().starts_with(prefix) {
                        return Ok(line);
                    }
                }
                Ok(Err(e)) => return Err(EngineError::Io(e)),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(EngineError::Timeout(timeout.as_millis() as u64))
                }
                Err(RecvTimeoutError::Disconnected) => return Err(EngineError::Closed),
            }
        }
    }

    fn set_skill_level(&mut self, level: u8) -> Result<(), EngineError> {
        let level = level.min(MAX_SKILL_LEVEL);
        if self.skill_level == Some(level) {
            return Ok(());
        }
        self.send(&format!("setoption name Skill Level value {level}"))?;
        self.skill_level = Some(level);
        Ok(())
    }
}

impl Engine for UciEngine {
    fn best_move(&mut self, fen: &str, limits: &SearchLimits) -> Result<String, EngineError> {
        if self.running.is_none() {
            self.new_game()?;
        }
        self.set_skill_level(limits.skill_level)?;
        self.send(&format!("position fen {fen}"))?;
        self.send(&format!("go movetime {}", limits.move_time.as_millis()))?;

        let line = self.read_until("bestmove", limits.move_time + REPLY_GRACE)?;
        match line.split_whitespace().nth(1) {
            Some(mv) => Ok(mv.to_string()),
            None => Err(EngineError::MalformedReply(line.clone())),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn new_game(&mut self) -> Result<(), EngineError> {
        if self.running.is_none() {
            self.spawn()?;
            self.send("uci")?;
            self.read_until("uciok", HANDSHAKE_TIMEOUT)?;
        }
        self.send("ucinewgame")?;
        self.send("isready")?;
        self.read_until("readyok", HANDSHAKE_TIMEOUT)?;
        Ok(())
    }

    fn quit(&mut self) {
        if self.running.is_none() {
            return;
        }
        if let Err(e) = self.send("quit") {
            warn!(error = %e, "failed to send quit to engine");
        }
        if let Some(mut running) = self.running.take() {
            // Give the process a moment to exit on its own.
            let deadline = Instant::now() + Duration::from_millis(500);
            loop {
                match running.child.try_wait() {
                    Ok(Some(_)) => break,
                    Ok(None) if Instant::now() < deadline => {
                        thread::sleep(Duration::from_millis(20))
                    }
                    _ => {
                        let _ = running.child.kill();
                        let _ = running.child.wait();
                        break;
                    }
                }
            }
            info!(path = %self.path.display(), "engine process stopped");
        }
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        self.quit();
    }
}

#[cfg(test)]
#[path = "uci_tests.rs"]
mod uci_tests;
