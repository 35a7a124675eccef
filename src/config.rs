//! Per-match configuration set through `INFO` commands.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

use log::debug;

use crate::error::ProtocolError;

/// Who the engine is playing against.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum GameType {
    Human,
    #[default]
    Ai,
    Tournament,
    NetworkTournament,
}

impl GameType {
    fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(GameType::Human),
            1 => Some(GameType::Ai),
            2 => Some(GameType::Tournament),
            3 => Some(GameType::NetworkTournament),
            _ => None,
        }
    }
}

/// Win-rule flags from `INFO rule`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rules {
    /// Only exactly five in a row wins.
    pub exact_five: bool,
    /// Play continues after a five; finished lines become winning blocks.
    pub continuous: bool,
    pub renju: bool,
}

impl Rules {
    pub fn from_bits(bits: u32) -> Self {
        Self {
            exact_five: bits & 1 != 0,
            continuous: bits & 2 != 0,
            renju: bits & 4 != 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct MatchConfig {
    /// Time for one turn.
    pub timeout_turn: Duration,
    /// Time for the whole match.
    pub timeout_match: Duration,
    /// Match time remaining, in milliseconds. May go negative.
    pub time_left: i64,
    /// Memory ceiling in bytes; zero means unlimited.
    pub max_memory: u64,
    pub game_type: GameType,
    pub rules: Rules,
    /// Directory for persistent files.
    pub folder: Option<PathBuf>,
    pub match_started: Instant,
    pub turn_started: Instant,
}

impl Default for MatchConfig {
    fn default() -> Self {
        let now = Instant::now();
        Self {
            timeout_turn: Duration::from_millis(30_000),
            timeout_match: Duration::from_millis(1_000_000_000),
            time_left: 1_000_000_000,
            max_memory: 0,
            game_type: GameType::default(),
            rules: Rules::default(),
            folder: None,
            match_started: now,
            turn_started: now,
        }
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ProtocolError> {
    value.trim().parse().map_err(|_| ProtocolError::BadInfoValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

impl MatchConfig {
    /// Restart the match clock. `INFO` values are kept, since managers may
    /// send them before `START`.
    pub fn reset_clock(&mut self) {
        self.match_started = Instant::now();
        self.turn_started = self.match_started;
    }

    pub fn start_turn(&mut self) {
        self.turn_started = Instant::now();
    }

    /// The per-turn budget, if one is set.
    pub fn turn_budget(&self) -> Option<Duration> {
        (!self.timeout_turn.is_zero()).then_some(self.timeout_turn)
    }

    /// Apply `INFO <key> <value>`. Returns `false` for keys this engine does
    /// not know, which are ignored.
    pub fn apply_info(&mut self, key: &str, value: &str) -> Result<bool, ProtocolError> {
        let key = key.to_ascii_lowercase();
        match key.as_str() {
            "timeout_turn" => self.timeout_turn = Duration::from_millis(parse(&key, value)?),
            "timeout_match" => self.timeout_match = Duration::from_millis(parse(&key, value)?),
            "time_left" => self.time_left = parse(&key, value)?,
            "max_memory" => self.max_memory = parse(&key, value)?,
            "game_type" => {
                self.game_type = GameType::from_code(parse(&key, value)?).ok_or_else(|| {
                    ProtocolError::BadInfoValue {
                        key: key.clone(),
                        value: value.to_string(),
                    }
                })?;
            }
            "rule" => self.rules = Rules::from_bits(parse(&key, value)?),
            "folder" => self.folder = Some(PathBuf::from(value.trim())),
            _ => {
                debug!("ignoring INFO {key}");
                return Ok(false);
            }
        }
        Ok(true)
    }
}
