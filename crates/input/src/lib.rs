//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key events to per-player [`crate::types::BoardInput`]s and
//! match commands, and collects them into an [`InputQueue`] that the game loop
//! drains once per tick. Terminals without key-release events are fine: every
//! press is an edge and repeats within one tick collapse.

pub mod map;
pub mod queue;

pub use trash_types as types;

pub use map::{handle_key_event, should_quit, Action};
pub use queue::{InputQueue, MAX_INPUTS_PER_TICK};
