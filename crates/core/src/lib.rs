//! Core simulation module - pure, deterministic, and testable
//!
//! This crate contains the rules of the game: cells, pieces, the grid, line and
//! gravity resolution, scoring, trash and the per-board drop state machine.
//! It has **no dependencies** on terminals, input devices or I/O besides the
//! optional JSON settings loader, making it:
//!
//! - **Deterministic**: Same seed and inputs produce identical boards
//! - **Testable**: Every rule is reachable without a terminal
//! - **Portable**: Can run in any environment (terminal, GUI, headless)
//!
//! # Module Structure
//!
//! - [`cell`]: Cells, their animation cursor, and the generational arena
//! - [`piece`]: The falling two-cell piece and its rotation table
//! - [`grid`]: Slot storage for settled cells and the random hole search
//! - [`lines`]: Line resolver with duplicate suppression
//! - [`gravity`]: Fixed-point release sweep and the falling step
//! - [`scoring`]: Per-move score and trash tokens
//! - [`settings`]: Level and difficulty tables, JSON loading
//! - [`board`]: The per-player state machine
//! - [`snapshot`]: Render-ready copies of a board
//!
//! # Example
//!
//! ```
//! use trash_core::{Board, GameSettings, SimpleRng};
//! use trash_core::types::{BoardInput, PlayState};
//!
//! let mut rng = SimpleRng::new(7);
//! let mut board = Board::new(0, GameSettings::default());
//! board.new_game(0, 2, &mut rng);
//!
//! // Run two seconds of game time with the player nudging left.
//! for _ in 0..125 {
//!     board.update(16, &[BoardInput::MoveLeft], &mut rng);
//! }
//! assert_eq!(board.play_state(), PlayState::InPlay);
//! assert!(board.verify().is_ok());
//! ```
//!
//! # Timing
//!
//! The board is driven by a fixed timestep:
//! - **Tick Rate**: 16ms (approximately 60 FPS)
//! - **Neck**: 1px per tick
//! - **Move Interval**: 500ms times the level and difficulty speed factors
//! - **Falling Cells**: 2px per tick times the trash speed factors
//!
//! Call [`Board::update`](board::Board::update) every frame with elapsed time.

pub mod board;
pub mod cell;
pub mod gravity;
pub mod grid;
pub mod lines;
pub mod piece;
pub mod rng;
pub mod scoring;
pub mod settings;
pub mod snapshot;

pub use trash_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, BoardEvent};
pub use cell::{Cell, CellArena, CellId};
pub use gravity::{fall_step, release_unsupported, Release};
pub use grid::Grid;
pub use lines::{find_lines, Line};
pub use piece::{Orientation, Piece};
pub use rng::SimpleRng;
pub use scoring::{score_move, MoveResult};
pub use settings::{ConfigError, DifficultyInfo, GameSettings, LevelInfo};
pub use snapshot::{BoardSnapshot, FloatingSnapshot, Link, SlotSnapshot};
