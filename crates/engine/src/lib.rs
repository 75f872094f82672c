//! Match orchestration on top of the board simulation.
//!
//! The board only reports what happened to it. This crate decides what that
//! means for the match: whether a round is over, who gets trash, and when the
//! next level starts.

pub mod session;

pub use trash_core as core;
pub use trash_types as types;

pub use session::{dispatch, GameFlow, Match, MatchMode, MatchStatus};
