//! Command-line options.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chess_core::{
    parse_skill_level, parse_time_setting, Color, GameConfig, Opponent, MAX_SKILL_LEVEL,
};

pub fn print_usage() {
    println!("Chess Console");
    println!();
    println!("Usage:");
    println!("  chess_console [--config FILE] [--time MM:SS] [--engine PATH|random]");
    println!("                [--skill N] [--move-time MS] [--color white|black]");
    println!("                [--fen FEN] [--json]");
    println!();
    println!("Without --engine two players share the terminal.");
    println!();
    println!("Examples:");
    println!("  chess_console --time 5:00");
    println!("  chess_console --engine random --color black");
    println!("  chess_console --engine /usr/games/stockfish --skill 5 --move-time 500");
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Options {
    pub config: Option<PathBuf>,
    /// Minutes and seconds, as typed
    pub time: Option<(String, String)>,
    pub engine: Option<String>,
    pub skill: Option<String>,
    pub move_time_ms: Option<u64>,
    pub color: Option<Color>,
    pub fen: Option<String>,
    pub json: bool,
}

/// `Ok(None)` means help was requested.
pub fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut options = Options::default();

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--help" | "-h" => return Ok(None),
            "--config" | "-c" => {
                options.config = Some(PathBuf::from(take_value(args, &mut i, flag)?))
            }
            "--time" | "-t" => options.time = Some(split_time(take_value(args, &mut i, flag)?)),
            "--engine" | "-e" => options.engine = Some(take_value(args, &mut i, flag)?.to_string()),
            "--skill" | "-s" => options.skill = Some(take_value(args, &mut i, flag)?.to_string()),
            "--move-time" => {
                let v = take_value(args, &mut i, flag)?;
                options.move_time_ms =
                    Some(v.parse().with_context(|| format!("invalid move time '{v}'"))?);
            }
            "--color" => {
                options.color = Some(match take_value(args, &mut i, flag)?.to_lowercase().as_str() {
                    "white" | "w" => Color::White,
                    "black" | "b" => Color::Black,
                    other => bail!("unknown color '{other}'"),
                })
            }
            "--fen" => options.fen = Some(take_value(args, &mut i, flag)?.to_string()),
            "--json" => options.json = true,
            other => bail!("unknown argument '{other}'"),
        }
        i += 1;
    }
    Ok(Some(options))
}

fn take_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .with_context(|| format!("{flag} needs a value"))
}

/// `5:30` is five minutes thirty, a bare `5` is five minutes.
fn split_time(text: &str) -> (String, String) {
    match text.split_once(':') {
        Some((m, s)) => (m.to_string(), s.to_string()),
        None => (text.to_string(), String::new()),
    }
}

impl Options {
    /// Settings from the config file (if any) with command-line overrides
    /// applied on top, validated.
    pub fn to_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => GameConfig::default(),
        };

        if let Some((minutes, seconds)) = &self.time {
            config.time_in_seconds = parse_time_setting(minutes, seconds)?;
        }
        let skill = self.skill.as_deref().map(parse_skill_level).transpose()?;

        if let Some(path) = &self.engine {
            config.opponent = Opponent::Engine {
                human_color: Color::White,
                skill_level: MAX_SKILL_LEVEL,
                move_time_ms: 1000,
                path: PathBuf::from(path),
            };
        }
        match &mut config.opponent {
            Opponent::Engine {
                human_color,
                skill_level,
                move_time_ms,
                ..
            } => {
                if let Some(color) = self.color {
                    *human_color = color;
                }
                if let Some(level) = skill {
                    *skill_level = level;
                }
                if let Some(ms) = self.move_time_ms {
                    *move_time_ms = ms;
                }
            }
            Opponent::Human => {
                if self.color.is_some() || skill.is_some() || self.move_time_ms.is_some() {
                    bail!("--color, --skill and --move-time need an engine opponent");
                }
            }
        }

        if self.fen.is_some() {
            config.start_fen = self.fen.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod cli_tests;
