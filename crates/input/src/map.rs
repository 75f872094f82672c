//! Key mapping from terminal events to game actions.

use crate::types::BoardInput;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Board input for a player
    Play { player: usize, input: BoardInput },
    Pause,
    /// Restart the current level
    Restart,
    /// Leave an intermission screen
    Continue,
}

fn play(player: usize, input: BoardInput) -> Option<Action> {
    Some(Action::Play { player, input })
}

/// Map keyboard input to game actions.
///
/// Player 1 uses the arrows and `/`, player 2 uses `a` `d` `w` `q` `s`.
/// Release events map to nothing.
pub fn handle_key_event(key: KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        // Player 1
        KeyCode::Left => play(0, BoardInput::MoveLeft),
        KeyCode::Right => play(0, BoardInput::MoveRight),
        KeyCode::Up => play(0, BoardInput::RotateCw),
        KeyCode::Char('/') => play(0, BoardInput::RotateCcw),
        KeyCode::Down => play(0, BoardInput::SoftDrop),

        // Player 2
        KeyCode::Char('a') | KeyCode::Char('A') => play(1, BoardInput::MoveLeft),
        KeyCode::Char('d') | KeyCode::Char('D') => play(1, BoardInput::MoveRight),
        KeyCode::Char('w') | KeyCode::Char('W') => play(1, BoardInput::RotateCw),
        KeyCode::Char('q') | KeyCode::Char('Q') => play(1, BoardInput::RotateCcw),
        KeyCode::Char('s') | KeyCode::Char('S') => play(1, BoardInput::SoftDrop),

        // Match
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Action::Pause),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::Restart),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Continue),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
