//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer for terminal play. Boards are painted
//! into a plain framebuffer by a pure view, and a renderer flushes the
//! framebuffer to the terminal, emitting only the runs that changed.
//!
//! Goals:
//! - Keep `core` deterministic and free of terminal concerns
//! - Keep drawing testable without a terminal
//! - Control the aspect ratio (2 columns per cell by default)

pub mod board_view;
pub mod fb;
pub mod renderer;

pub use trash_core as core;
pub use trash_types as types;

pub use board_view::{pill_rgb, AnchorY, BoardView, HudView, Viewport};
pub use fb::{CellStyle, FrameBuffer, Glyph, Rgb};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
