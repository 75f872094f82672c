//! Per-tick input collection.

use arrayvec::ArrayVec;

use crate::types::BoardInput;

/// Inputs kept per player and tick; extra presses are dropped
pub const MAX_INPUTS_PER_TICK: usize = 8;

pub type TickInputs = ArrayVec<BoardInput, MAX_INPUTS_PER_TICK>;

/// Collects board inputs between ticks.
///
/// Each player gets at most one of each [`BoardInput`] per tick, in press order.
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    players: Vec<TickInputs>,
}

impl InputQueue {
    pub fn new(players: usize) -> Self {
        Self {
            players: vec![TickInputs::new(); players],
        }
    }

    /// Record a press; returns false if it was a repeat or out of range
    pub fn push(&mut self, player: usize, input: BoardInput) -> bool {
        let Some(slot) = self.players.get_mut(player) else {
            return false;
        };
        if slot.contains(&input) {
            return false;
        }
        slot.try_push(input).is_ok()
    }

    /// This tick's inputs for `player`, leaving the slot empty
    pub fn take(&mut self, player: usize) -> TickInputs {
        self.players
            .get_mut(player)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Drain every player at once, in player order
    pub fn drain_all(&mut self) -> Vec<TickInputs> {
        self.players.iter_mut().map(std::mem::take).collect()
    }

    pub fn clear(&mut self) {
        self.players.iter_mut().for_each(|p| p.clear());
    }

    pub fn players(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.iter().all(|p| p.is_empty())
    }
}
