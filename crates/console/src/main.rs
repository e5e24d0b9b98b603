//! Chess Console
//!
//! Play a game in the terminal, against another person or an engine. Moves
//! are typed in coordinate notation; game events are printed as they happen,
//! as plain text or one JSON object per line with `--json`.

mod cli;
mod input;

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use chess_core::{Engine, Game, GameConfig, GameEvent, Opponent, UciEngine};
use random_engine::RandomEngine;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use input::Input;

/// How long one loop iteration waits for clock or engine activity.
const POLL: Duration = Duration::from_millis(50);

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(options) = cli::parse_args(&args)? else {
        cli::print_usage();
        return Ok(());
    };
    let config = options.to_config()?;

    let mut game = Game::from_config(&config, create_engine(&config))?;
    game.start();

    let mut out = Printer {
        json: options.json,
        stdout: io::stdout(),
    };
    run(&mut game, &mut out, stdin_lines())?;
    info!(status = ?game.status(), "console exiting");
    Ok(())
}

fn create_engine(config: &GameConfig) -> Option<Box<dyn Engine>> {
    match &config.opponent {
        Opponent::Human => None,
        Opponent::Engine { path, .. } if path == Path::new("random") => {
            Some(Box::new(RandomEngine::new()))
        }
        Opponent::Engine { path, .. } => Some(Box::new(UciEngine::new(path))),
    }
}

/// Stdin blocks, so it is read on its own thread.
fn stdin_lines() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn run(game: &mut Game, out: &mut Printer, lines: Receiver<String>) -> Result<()> {
    out.status(game)?;
    loop {
        game.pump_timeout(POLL);
        for event in game.drain_events() {
            out.event(&event)?;
        }
        if !game.is_in_progress() {
            return Ok(());
        }

        match lines.try_recv() {
            Ok(line) => {
                if !apply(game, out, &line)? {
                    game.stop();
                    return Ok(());
                }
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                game.stop();
                return Ok(());
            }
        }
    }
}

/// Returns `false` when the user asked to quit.
fn apply(game: &mut Game, out: &mut Printer, line: &str) -> Result<bool> {
    let input = match input::parse(line) {
        Ok(input) => input,
        Err(e) => {
            out.error(&e.to_string())?;
            return Ok(true);
        }
    };
    match input {
        Input::Move {
            from,
            to,
            promotion,
        } => {
            if !game.make_move(from, to, promotion) {
                out.error(&format!("move {} not allowed", line.trim()))?;
            }
        }
        Input::Moves(pos) => {
            let moves: Vec<String> = game.legal_moves(pos).iter().map(|m| m.to_uci()).collect();
            out.moves(&moves)?;
        }
        Input::Fen => out.fen(game)?,
        Input::Status => out.status(game)?,
        Input::Resign => game.resign(),
        Input::Draw => {
            if game.human_color().is_some() {
                out.error("draw offers are not available against an engine")?;
            } else {
                game.draw_by_agreement();
            }
        }
        Input::Help => out.line(input::HELP)?,
        Input::Quit => return Ok(false),
        Input::Empty => {}
    }
    Ok(true)
}

struct Printer {
    json: bool,
    stdout: io::Stdout,
}

impl Printer {
    fn line(&mut self, text: &str) -> io::Result<()> {
        let mut lock = self.stdout.lock();
        writeln!(lock, "{text}")?;
        lock.flush()
    }

    fn event(&mut self, event: &GameEvent) -> Result<()> {
        if self.json {
            self.line(&serde_json::to_string(event)?)?;
            return Ok(());
        }
        match event {
            // Plain text only shows every tenth second and the last ten.
            GameEvent::TimeUpdated { seconds_left, .. }
                if *seconds_left > 10 && seconds_left % 10 != 0 => {}
            _ => self.line(&event.to_string())?,
        }
        Ok(())
    }

    fn moves(&mut self, moves: &[String]) -> Result<()> {
        if self.json {
            self.line(&json!({ "legal_moves": moves }).to_string())?;
        } else if moves.is_empty() {
            self.line("no legal moves")?;
        } else {
            self.line(&moves.join(" "))?;
        }
        Ok(())
    }

    fn fen(&mut self, game: &Game) -> Result<()> {
        let fen = game.board().fen();
        if self.json {
            self.line(&json!({ "fen": fen }).to_string())?;
        } else {
            self.line(&fen)?;
        }
        Ok(())
    }

    fn status(&mut self, game: &Game) -> Result<()> {
        let to_move = game.current_player();
        if self.json {
            let status = json!({
                "fen": game.board().fen(),
                "to_move": to_move,
                "in_progress": game.is_in_progress(),
                "human": game.human_color(),
                "time_left": {
                    "white": game.time_left(chess_core::Color::White),
                    "black": game.time_left(chess_core::Color::Black),
                },
            });
            self.line(&status.to_string())?;
            return Ok(());
        }
        self.line(&game.board().fen())?;
        self.line(&format!("{to_move} to move"))?;
        if game.time_in_seconds() > 0 {
            self.line(&format!(
                "White {}s, Black {}s",
                game.time_left(chess_core::Color::White),
                game.time_left(chess_core::Color::Black)
            ))?;
        }
        Ok(())
    }

    fn error(&mut self, message: &str) -> Result<()> {
        if self.json {
            self.line(&json!({ "error": message }).to_string())?;
        } else {
            self.line(message)?;
        }
        Ok(())
    }
}
