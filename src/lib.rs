//! Trash (workspace facade crate).
//!
//! Re-exports the workspace crates under one name so the binary, integration
//! tests and benchmarks can use `trash::{core,engine,input,term,types}`.

pub use trash_core as core;
pub use trash_engine as engine;
pub use trash_input as input;
pub use trash_term as term;
pub use trash_types as types;
