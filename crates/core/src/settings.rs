//! Settings module - level and difficulty tables
//!
//! [`GameSettings::default`] reproduces the classic tables: 16 levels and 5
//! difficulties on a 10x15 board. A JSON file can replace any part of it;
//! missing fields fall back to the defaults.
//!
//! ```
//! use trash_core::GameSettings;
//!
//! let settings = GameSettings::default();
//! assert_eq!(settings.levels.len(), 16);
//! assert_eq!(settings.difficulties[2].name, "Normal");
//! assert!(settings.validate().is_ok());
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{
    PillColor, BASE_FALL_SPEED_PX, BASE_MOVE_INTERVAL_MS, CELL_SIZE, DEFAULT_BOARD_HEIGHT,
    DEFAULT_BOARD_WIDTH, DEFAULT_LINE_LENGTH, MAX_BOARD_EDGE,
};

/// Settings failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("validation error: {0}")]
    Validation(String),
}

/// One row of the level table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelInfo {
    /// Fewest germs seeded per row (inclusive)
    pub min_germs_per_row: u8,
    /// Most germs seeded per row (exclusive)
    pub max_germs_per_row: u8,
    /// Rows from the bottom that receive germs
    pub germ_rows: u8,
    pub pill_speed: f32,
    pub trash_speed: f32,
}

impl LevelInfo {
    const fn new(min: u8, max: u8, rows: u8) -> Self {
        Self {
            min_germs_per_row: min,
            max_germs_per_row: max,
            germ_rows: rows,
            pill_speed: 1.0,
            trash_speed: 1.0,
        }
    }
}

/// One row of the difficulty table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyInfo {
    pub name: String,
    /// Scales the move interval (lower is faster)
    pub pill_speed_modifier: f32,
    /// Scales the freed-cell fall speed (higher is faster)
    pub trash_speed_modifier: f32,
}

impl DifficultyInfo {
    fn new(name: &str, pill: f32, trash: f32) -> Self {
        Self {
            name: name.to_string(),
            pill_speed_modifier: pill,
            trash_speed_modifier: trash,
        }
    }
}

/// Everything a board needs besides the RNG
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub board_width: u8,
    pub board_height: u8,
    /// Run length that forms a line group
    pub line_length: u8,
    pub palette: Vec<PillColor>,
    pub levels: Vec<LevelInfo>,
    pub difficulties: Vec<DifficultyInfo>,
    pub default_difficulty: usize,
}

const DEFAULT_LEVELS: [LevelInfo; 16] = [
    LevelInfo::new(5, 7, 1),
    LevelInfo::new(5, 7, 2),
    LevelInfo::new(5, 7, 3),
    LevelInfo::new(5, 7, 4),
    LevelInfo::new(5, 7, 5),
    LevelInfo::new(6, 8, 5),
    LevelInfo::new(6, 8, 5),
    LevelInfo::new(6, 9, 6),
    LevelInfo::new(6, 9, 7),
    LevelInfo::new(7, 9, 7),
    LevelInfo::new(6, 9, 8),
    LevelInfo::new(7, 9, 8),
    LevelInfo::new(7, 10, 8),
    LevelInfo::new(7, 10, 9),
    LevelInfo::new(8, 10, 10),
    LevelInfo::new(9, 10, 10),
];

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            board_width: DEFAULT_BOARD_WIDTH,
            board_height: DEFAULT_BOARD_HEIGHT,
            line_length: DEFAULT_LINE_LENGTH,
            palette: PillColor::ALL.to_vec(),
            levels: DEFAULT_LEVELS.to_vec(),
            difficulties: vec![
                DifficultyInfo::new("Very Easy", 2.0, 1.0),
                DifficultyInfo::new("Easy", 1.5, 1.0),
                DifficultyInfo::new("Normal", 1.0, 1.0),
                DifficultyInfo::new("Hard", 0.75, 1.0),
                DifficultyInfo::new("Very Hard", 0.5, 1.0),
            ],
            default_difficulty: 2,
        }
    }
}

impl GameSettings {
    /// Load and validate settings from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse and validate settings from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let settings: GameSettings = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject tables the simulation cannot run
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid =
            |msg: String| -> Result<(), ConfigError> { Err(ConfigError::Validation(msg)) };

        if self.board_width == 0 || self.board_height == 0 {
            return invalid("board dimensions must be positive".into());
        }
        if self.board_width > MAX_BOARD_EDGE || self.board_height > MAX_BOARD_EDGE {
            return invalid(format!("board edges are limited to {}", MAX_BOARD_EDGE));
        }
        if self.board_width < 2 {
            return invalid("board must be at least two cells wide".into());
        }
        if self.line_length < 2 {
            return invalid("line length must be at least 2".into());
        }
        if self.board_width < self.line_length && self.board_height < self.line_length {
            return invalid(format!(
                "a {}x{} board cannot hold a line of {}",
                self.board_width, self.board_height, self.line_length
            ));
        }
        if self.palette.is_empty() {
            return invalid("palette is empty".into());
        }
        if self.levels.is_empty() {
            return invalid("level table is empty".into());
        }
        if self.difficulties.is_empty() {
            return invalid("difficulty table is empty".into());
        }
        if self.default_difficulty >= self.difficulties.len() {
            return invalid(format!(
                "default difficulty {} is out of range",
                self.default_difficulty
            ));
        }
        for (i, level) in self.levels.iter().enumerate() {
            if level.min_germs_per_row >= level.max_germs_per_row {
                return invalid(format!("level {}: min germs must be below max", i));
            }
            if level.germ_rows > self.board_height {
                return invalid(format!("level {}: more germ rows than board rows", i));
            }
            if !(level.pill_speed > 0.0 && level.trash_speed > 0.0) {
                return invalid(format!("level {}: speeds must be positive", i));
            }
        }
        for d in &self.difficulties {
            if !(d.pill_speed_modifier > 0.0 && d.trash_speed_modifier > 0.0) {
                return invalid(format!("difficulty {:?}: modifiers must be positive", d.name));
            }
        }
        Ok(())
    }

    /// Clamp a level index into the table
    pub fn clamp_level(&self, level: usize) -> usize {
        level.min(self.levels.len().saturating_sub(1))
    }

    /// Clamp a difficulty index into the table
    pub fn clamp_difficulty(&self, difficulty: usize) -> usize {
        difficulty.min(self.difficulties.len().saturating_sub(1))
    }

    /// Milliseconds between one-cell drops of the active piece
    pub fn move_interval_ms(&self, level: usize, difficulty: usize) -> u32 {
        let (pill, _) = self.speeds(level, difficulty);
        ((BASE_MOVE_INTERVAL_MS as f32) * pill).round().max(1.0) as u32
    }

    /// Freed-cell fall speed in pixels per tick.
    ///
    /// Rounded down to a divisor of the cell size so falling cells always
    /// reach exact slot positions.
    pub fn fall_speed_px(&self, level: usize, difficulty: usize) -> u32 {
        let (_, trash) = self.speeds(level, difficulty);
        let raw = ((BASE_FALL_SPEED_PX as f32) * trash).floor().max(1.0) as u32;
        (1..=raw.min(CELL_SIZE))
            .rev()
            .find(|d| CELL_SIZE % d == 0)
            .unwrap_or(1)
    }

    fn speeds(&self, level: usize, difficulty: usize) -> (f32, f32) {
        let lvl = self.levels.get(self.clamp_level(level));
        let diff = self.difficulties.get(self.clamp_difficulty(difficulty));
        let pill = lvl.map_or(1.0, |l| l.pill_speed) * diff.map_or(1.0, |d| d.pill_speed_modifier);
        let trash =
            lvl.map_or(1.0, |l| l.trash_speed) * diff.map_or(1.0, |d| d.trash_speed_modifier);
        (pill, trash)
    }
}
