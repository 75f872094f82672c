//! Piece module - the player-controlled pair of cells
//!
//! A [`Piece`] holds handles to two partnered cells in the arena. It keeps no
//! geometry of its own: orientation is read off the cells' pixel positions.
//!
//! Rotation swings one cell around the other using a fixed table keyed by
//! orientation, which half comes first, and direction. Clockwise then
//! counter-clockwise (or the reverse) always restores the original offsets.

use crate::cell::{Cell, CellArena, CellId};
use crate::types::{CellKind, PillColor, Rect, Spin, Vec2, CELL_SIZE};

/// Orientation of a two-cell piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Falling two-cell piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    /// First half (spawns on the left)
    pub left: CellId,
    /// Second half (spawns on the right)
    pub right: CellId,
}

impl Piece {
    /// Create two partnered pill cells side by side, `left` at `position`
    pub fn spawn(arena: &mut CellArena, position: Vec2, colors: [PillColor; 2]) -> Self {
        let step = Vec2::new(CELL_SIZE as f32, 0.0);
        let left = arena.insert(Cell::new(CellKind::Pill, colors[0], position));
        let right = arena.insert(Cell::new(CellKind::Pill, colors[1], position + step));
        arena.connect(left, right);
        Self { left, right }
    }

    pub fn cells(&self) -> [CellId; 2] {
        [self.left, self.right]
    }

    /// Translate both halves by the same vector
    pub fn move_by(&self, arena: &mut CellArena, offset: Vec2) {
        for id in self.cells() {
            if let Some(cell) = arena.get_mut(id) {
                cell.move_by(offset);
            }
        }
    }

    /// Union of both halves' boxes
    pub fn collision_box(&self, arena: &CellArena) -> Rect {
        match (arena.get(self.left), arena.get(self.right)) {
            (Some(l), Some(r)) => l.collision_box().union(&r.collision_box()),
            (Some(c), None) | (None, Some(c)) => c.collision_box(),
            (None, None) => Rect::default(),
        }
    }

    pub fn orientation(&self, arena: &CellArena) -> Orientation {
        let (l, r) = self.positions(arena);
        if l.y == r.y {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }

    /// Quarter turn about the pivot half, then turn both facings
    pub fn rotate(&self, arena: &mut CellArena, spin: Spin) {
        let (l, r) = self.positions(arena);
        let w = CELL_SIZE as f32;
        let h = CELL_SIZE as f32;
        let cw = spin == Spin::Clockwise;

        let (left_offset, right_offset) = if l.y == r.y {
            match (l.x < r.x, cw) {
                (true, true) => (Vec2::new(0.0, -h), Vec2::new(-w, 0.0)),
                (true, false) => (Vec2::ZERO, Vec2::new(-w, -h)),
                (false, true) => (Vec2::new(-w, 0.0), Vec2::new(0.0, -h)),
                (false, false) => (Vec2::new(-w, -h), Vec2::ZERO),
            }
        } else {
            match (l.y > r.y, cw) {
                (true, true) => (Vec2::ZERO, Vec2::new(w, h)),
                (true, false) => (Vec2::new(w, 0.0), Vec2::new(0.0, h)),
                (false, true) => (Vec2::new(w, h), Vec2::ZERO),
                (false, false) => (Vec2::new(0.0, h), Vec2::new(w, 0.0)),
            }
        };

        let angle = spin.angle();
        for (id, offset) in [(self.left, left_offset), (self.right, right_offset)] {
            if let Some(cell) = arena.get_mut(id) {
                cell.move_by(offset);
                cell.rotate(angle);
            }
        }
    }

    fn positions(&self, arena: &CellArena) -> (Vec2, Vec2) {
        let l = arena.get(self.left).map(|c| c.position).unwrap_or_default();
        let r = arena.get(self.right).map(|c| c.position).unwrap_or_default();
        (l, r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(arena: &mut CellArena) -> Piece {
        Piece::spawn(arena, Vec2::new(48.0, 48.0), [PillColor::Red, PillColor::Blue])
    }

    fn offsets(piece: &Piece, arena: &CellArena) -> (Vec2, Vec2) {
        piece.positions(arena)
    }

    #[test]
    fn test_spawn_links_halves_side_by_side() {
        let mut arena = CellArena::new();
        let piece = spawn(&mut arena);
        assert_eq!(arena.partner(piece.left), Some(piece.right));
        assert_eq!(piece.orientation(&arena), Orientation::Horizontal);
        assert_eq!(piece.collision_box(&arena), Rect::new(48, 48, 48, 24));
    }

    #[test]
    fn test_clockwise_from_horizontal_stands_left_on_top() {
        let mut arena = CellArena::new();
        let piece = spawn(&mut arena);
        piece.rotate(&mut arena, Spin::Clockwise);
        let (l, r) = offsets(&piece, &arena);
        assert_eq!(l, Vec2::new(48.0, 24.0));
        assert_eq!(r, Vec2::new(48.0, 48.0));
        assert_eq!(piece.orientation(&arena), Orientation::Vertical);
    }

    #[test]
    fn test_four_clockwise_turns_cycle_back() {
        let mut arena = CellArena::new();
        let piece = spawn(&mut arena);
        let start = offsets(&piece, &arena);
        let mut seen = Vec::new();
        for _ in 0..4 {
            piece.rotate(&mut arena, Spin::Clockwise);
            let (l, r) = offsets(&piece, &arena);
            // Halves stay adjacent after every turn.
            let dx = (l.x - r.x).abs();
            let dy = (l.y - r.y).abs();
            assert_eq!(dx + dy, CELL_SIZE as f32);
            seen.push((l, r));
        }
        assert_eq!(seen[3], start);
        // Every quarter turn visits a distinct layout.
        assert_ne!(seen[0], seen[1]);
        assert_ne!(seen[1], seen[2]);
        assert_ne!(seen[0], seen[2]);
    }

    #[test]
    fn test_vertical_rotation_round_trips() {
        let mut arena = CellArena::new();
        let piece = spawn(&mut arena);
        piece.rotate(&mut arena, Spin::Clockwise);
        let vertical = offsets(&piece, &arena);

        piece.rotate(&mut arena, Spin::Clockwise);
        piece.rotate(&mut arena, Spin::CounterClockwise);
        assert_eq!(offsets(&piece, &arena), vertical);

        piece.rotate(&mut arena, Spin::CounterClockwise);
        piece.rotate(&mut arena, Spin::Clockwise);
        assert_eq!(offsets(&piece, &arena), vertical);
    }

    #[test]
    fn test_rotation_turns_facing() {
        let mut arena = CellArena::new();
        let piece = spawn(&mut arena);
        piece.rotate(&mut arena, Spin::Clockwise);
        let facing = arena.get(piece.left).unwrap().facing();
        assert!(facing > 0.0);
        piece.rotate(&mut arena, Spin::CounterClockwise);
        assert_eq!(arena.get(piece.left).unwrap().facing(), 0.0);
    }
}
