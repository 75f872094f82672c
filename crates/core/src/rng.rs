//! RNG module - deterministic random source
//!
//! One [`SimpleRng`] drives germ placement, piece colors, trash holes and idle
//! animation picks. Boards in a match share a single instance, so the order in
//! which boards consume it is part of the match's determinism.

use crate::types::PillColor;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        // Low LCG bits have short periods.
        (self.next_u32() >> 16) % max
    }

    /// Generate random value in range [min, max); returns `min` for an empty range
    pub fn next_between(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        min + self.next_range(max - min)
    }

    /// Pick one color from a palette; None only for an empty palette
    pub fn pick_color(&mut self, palette: &[PillColor]) -> Option<PillColor> {
        if palette.is_empty() {
            return None;
        }
        palette
            .get(self.next_range(palette.len() as u32) as usize)
            .copied()
    }

    /// Current internal state (for reproducing a session)
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}
