//! Game configuration and validation of user-supplied settings.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{
    engine::{SearchLimits, MAX_SKILL_LEVEL},
    error::ConfigError,
    types::Color,
};

/// Shortest timed game, in seconds.
pub const MIN_TIME_SECONDS: u32 = 30;
/// Longest timed game, in seconds (10 hours).
pub const MAX_TIME_SECONDS: u32 = 10 * 60 * 60;

/// Who plays against the human at the keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Opponent {
    /// Two humans share the board.
    #[default]
    Human,
    /// An engine plays the colour the human does not.
    Engine {
        human_color: Color,
        #[serde(default = "default_skill_level")]
        skill_level: u8,
        #[serde(default = "default_move_time_ms")]
        move_time_ms: u64,
        /// Engine binary, or `random` for the built-in random mover.
        path: PathBuf,
    },
}

fn default_skill_level() -> u8 {
    MAX_SKILL_LEVEL
}

fn default_move_time_ms() -> u64 {
    1000
}

fn default_tick_interval_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameConfig {
    /// Seconds per side; 0 plays without a clock.
    #[serde(default)]
    pub time_in_seconds: u32,
    /// Clock tick period
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Custom starting position
    #[serde(default)]
    pub start_fen: Option<String>,
    /// Kept last: it serializes as a TOML table.
    #[serde(default)]
    pub opponent: Opponent,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            time_in_seconds: 0,
            tick_interval_ms: default_tick_interval_ms(),
            start_fen: None,
            opponent: Opponent::Human,
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::invalid(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_time(self.time_in_seconds)?;
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::invalid("Tick interval has to be positive"));
        }
        if let Opponent::Engine {
            skill_level,
            move_time_ms,
            path,
            ..
        } = &self.opponent
        {
            if *skill_level > MAX_SKILL_LEVEL {
                return Err(ConfigError::invalid("Difficulty has to be 0 to 20"));
            }
            if *move_time_ms == 0 {
                return Err(ConfigError::invalid("Engine move time has to be positive"));
            }
            if path.as_os_str().is_empty() {
                return Err(ConfigError::invalid("Engine path is required"));
            }
        }
        if let Some(fen) = &self.start_fen {
            crate::board::Board::from_fen(fen)?;
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Search limits for engine mode; `None` for two-player games.
    pub fn search_limits(&self) -> Option<SearchLimits> {
        match &self.opponent {
            Opponent::Human => None,
            Opponent::Engine {
                skill_level,
                move_time_ms,
                ..
            } => Some(SearchLimits::new(
                Duration::from_millis(*move_time_ms),
                *skill_level,
            )),
        }
    }
}

fn validate_time(seconds: u32) -> Result<(), ConfigError> {
    if seconds != 0 && !(MIN_TIME_SECONDS..=MAX_TIME_SECONDS).contains(&seconds) {
        return Err(ConfigError::invalid(
            "Time setting has to be in 30 seconds to 10 hours range",
        ));
    }
    Ok(())
}

/// Combine minute and second fields into a time limit. Both blank means an
/// untimed game.
pub fn parse_time_setting(minutes: &str, seconds: &str) -> Result<u32, ConfigError> {
    let (minutes, seconds) = (minutes.trim(), seconds.trim());
    if minutes.is_empty() && seconds.is_empty() {
        return Ok(0);
    }
    let parse = |s: &str| -> Result<i64, ConfigError> {
        if s.is_empty() {
            return Ok(0);
        }
        s.parse::<i64>()
            .map_err(|_| ConfigError::invalid("Invalid time value"))
    };
    let (m, s) = (parse(minutes)?, parse(seconds)?);
    if m < 0 || s < 0 {
        return Err(ConfigError::invalid(
            "Minutes and seconds have to be non negative values",
        ));
    }
    let total = m
        .checked_mul(60)
        .and_then(|v| v.checked_add(s))
        .filter(|&t| t >= MIN_TIME_SECONDS as i64 && t <= MAX_TIME_SECONDS as i64)
        .ok_or_else(|| {
            ConfigError::invalid("Time setting has to be in 30 seconds to 10 hours range")
        })?;
    Ok(total as u32)
}

pub fn parse_skill_level(text: &str) -> Result<u8, ConfigError> {
    let level: i64 = text
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid("Invalid difficulty value"))?;
    if !(0..=MAX_SKILL_LEVEL as i64).contains(&level) {
        return Err(ConfigError::invalid("Difficulty has to be 0 to 20"));
    }
    Ok(level as u8)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
