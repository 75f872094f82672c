//! Gravity resolver - frees unsupported cells and lets them fall
//!
//! After a line breaks, [`release_unsupported`] sweeps the grid from the broken
//! line's lowest row up to the top and moves every cell that lost its support
//! into the freed set. A cell is supported when it is immobile, rests on the
//! floor, or has a settled cell directly below it. An unsupported cell can still
//! be anchored by its partner: a partner on the same row or below that is itself
//! supported holds it in place.
//!
//! Freeing one cell can unsupport the cell above it, so the sweep repeats until
//! a full pass frees nothing. Every pass except the last frees at least one
//! cell, which bounds the work by the number of grid slots.
//!
//! [`fall_step`] then moves freed cells down by a fixed pixel step per tick and
//! writes them back into the grid once the next step would overlap a settled
//! cell or leave the playfield.

use crate::cell::{CellArena, CellId};
use crate::grid::Grid;
use crate::types::{
    grid_to_pixel, is_grid_aligned, pixel_to_grid, AnimationState, DropState, GridPos, Vec2,
};

/// Result of one release sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Release {
    /// Cells moved into the freed set
    pub freed: usize,
    /// Full passes made before reaching the fixed point
    pub sweeps: usize,
}

/// Move every unsupported, unanchored cell at or above `from_row` into `freed`.
pub fn release_unsupported(
    grid: &mut Grid,
    arena: &mut CellArena,
    freed: &mut Vec<CellId>,
    from_row: i8,
) -> Release {
    let first_new = freed.len();
    let bottom = from_row.min(grid.height() as i8 - 1);
    let mut sweeps = 0;

    loop {
        sweeps += 1;
        let mut changed = false;
        for y in (0..=bottom).rev() {
            for x in 0..grid.width() as i8 {
                let pos = GridPos::new(x, y);
                let Some(id) = grid.get(pos) else {
                    continue;
                };
                if !will_drop(grid, arena, freed, pos, id) {
                    continue;
                }
                grid.take(pos);
                if let Some(cell) = arena.get_mut(id) {
                    cell.drop_state = DropState::ProcessingLines;
                }
                freed.push(id);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    // A freed cell hanging under an anchored partner leaves it behind.
    for i in first_new..freed.len() {
        let id = freed[i];
        if let Some(partner) = arena.partner(id) {
            if !freed.contains(&partner) {
                arena.disconnect(id);
            }
        }
    }

    let release = Release {
        freed: freed.len() - first_new,
        sweeps,
    };
    if release.freed > 0 {
        log::trace!("released {} cells in {} sweeps", release.freed, release.sweeps);
    }
    release
}

/// True if the slot below `pos` is inside the grid and empty
fn unsupported(grid: &Grid, pos: GridPos) -> bool {
    grid.is_vacant(pos.offset(0, 1))
}

/// Could this cell fall ignoring its partner?
fn loose(grid: &Grid, arena: &CellArena, pos: GridPos, id: CellId) -> bool {
    let Some(cell) = arena.get(id) else {
        return false;
    };
    if cell.is_immobile() {
        return false;
    }
    // Cells in a breaking line hold their slot until they are removed.
    if matches!(
        cell.animation_state(),
        AnimationState::Breaking | AnimationState::Gone
    ) {
        return false;
    }
    unsupported(grid, pos)
}

fn will_drop(grid: &Grid, arena: &CellArena, freed: &[CellId], pos: GridPos, id: CellId) -> bool {
    if !loose(grid, arena, pos, id) {
        return false;
    }
    let Some(partner) = arena.partner(id) else {
        return true;
    };
    if freed.contains(&partner) {
        return true;
    }
    let Some(partner_pos) = arena.get(partner).map(|c| pixel_to_grid(c.position)) else {
        return true;
    };
    if grid.get(partner_pos) != Some(partner) {
        return true;
    }
    if partner_pos.y < pos.y {
        return true;
    }
    loose(grid, arena, partner_pos, partner)
}

/// Advance freed cells by `speed` pixels; returns the cells that settled this step.
///
/// Settling is repeated until stable first, since a cell landing can stop the
/// one right above it on the same step. A settling cell brings its freed
/// partner down with it.
pub fn fall_step(
    grid: &mut Grid,
    arena: &mut CellArena,
    freed: &mut Vec<CellId>,
    speed: u32,
) -> Vec<CellId> {
    let bounds = grid.bounds();
    let mut landed = Vec::new();

    loop {
        let mut changed = false;
        let mut i = 0;
        while i < freed.len() {
            let id = freed[i];
            let Some(cell) = arena.get(id) else {
                freed.remove(i);
                continue;
            };
            let next = cell.collision_box().offset(0, speed as i32);
            if !grid.collides(&next) && bounds.contains(&next) {
                i += 1;
                continue;
            }
            freed.remove(i);
            settle(grid, arena, id);
            landed.push(id);
            if let Some(partner) = arena.partner(id) {
                if let Some(at) = freed.iter().position(|p| *p == partner) {
                    freed.remove(at);
                    settle(grid, arena, partner);
                    landed.push(partner);
                }
            }
            changed = true;
        }
        if !changed {
            break;
        }
    }

    let step = Vec2::new(0.0, speed as f32);
    for id in freed.iter() {
        if let Some(cell) = arena.get_mut(*id) {
            cell.move_by(step);
        }
    }
    landed
}

/// Write a falling cell into the slot under its pixel position
fn settle(grid: &mut Grid, arena: &mut CellArena, id: CellId) {
    let Some(cell) = arena.get_mut(id) else {
        return;
    };
    debug_assert!(
        is_grid_aligned(cell.position),
        "cell settled off-grid at {:?}",
        cell.position
    );
    let mut pos = pixel_to_grid(cell.position);
    debug_assert!(!grid.is_occupied(pos), "settle target {:?} occupied", pos);
    while pos.y > 0 && grid.is_occupied(pos) {
        pos = pos.offset(0, -1);
    }
    cell.position = grid_to_pixel(pos);
    cell.drop_state = DropState::Contact;
    grid.set(pos, id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::types::{CellKind, PillColor};

    struct Fixture {
        grid: Grid,
        arena: CellArena,
        freed: Vec<CellId>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                grid: Grid::new(6, 12),
                arena: CellArena::new(),
                freed: Vec::new(),
            }
        }

        fn put(&mut self, x: i8, y: i8, kind: CellKind) -> CellId {
            let pos = GridPos::new(x, y);
            let id = self
                .arena
                .insert(Cell::new(kind, PillColor::Red, grid_to_pixel(pos)));
            self.grid.set(pos, id);
            id
        }

        fn release(&mut self) -> Release {
            release_unsupported(&mut self.grid, &mut self.arena, &mut self.freed, 11)
        }

        fn settle_all(&mut self) {
            for _ in 0..1000 {
                if self.freed.is_empty() {
                    return;
                }
                fall_step(&mut self.grid, &mut self.arena, &mut self.freed, 2);
            }
            panic!("freed cells never settled");
        }
    }

    #[test]
    fn test_floating_single_is_freed() {
        let mut f = Fixture::new();
        let a = f.put(2, 5, CellKind::Pill);
        let r = f.release();
        assert_eq!(r.freed, 1);
        assert_eq!(f.freed, vec![a]);
        assert!(f.grid.get(GridPos::new(2, 5)).is_none());
    }

    #[test]
    fn test_column_frees_in_one_release() {
        let mut f = Fixture::new();
        for y in 5..9 {
            f.put(2, y, CellKind::Pill);
        }
        let r = f.release();
        assert_eq!(r.freed, 4);
        assert!(r.sweeps >= 2);
        assert_eq!(f.grid.occupied_count(), 0);
    }

    #[test]
    fn test_germ_partner_anchors_cell() {
        let mut f = Fixture::new();
        let germ = f.put(1, 5, CellKind::Germ);
        let pill = f.put(2, 5, CellKind::Pill);
        f.arena.connect(germ, pill);
        let r = f.release();
        assert_eq!(r.freed, 0);
        assert_eq!(f.grid.get(GridPos::new(2, 5)), Some(pill));
    }

    #[test]
    fn test_supported_half_anchors_horizontal_pair() {
        let mut f = Fixture::new();
        f.put(1, 11, CellKind::Pill);
        let a = f.put(1, 10, CellKind::Pill);
        let b = f.put(2, 10, CellKind::Pill);
        f.arena.connect(a, b);
        assert_eq!(f.release().freed, 0);
    }

    #[test]
    fn test_unsupported_pair_falls_together() {
        let mut f = Fixture::new();
        let a = f.put(1, 3, CellKind::Pill);
        let b = f.put(2, 3, CellKind::Pill);
        f.arena.connect(a, b);
        assert_eq!(f.release().freed, 2);
        f.settle_all();
        assert_eq!(f.grid.get(GridPos::new(1, 11)), Some(a));
        assert_eq!(f.grid.get(GridPos::new(2, 11)), Some(b));
        assert_eq!(f.arena.partner(a), Some(b));
    }

    #[test]
    fn test_cell_under_germ_is_left_disconnected() {
        let mut f = Fixture::new();
        let germ = f.put(2, 4, CellKind::Germ);
        let pill = f.put(2, 5, CellKind::Pill);
        f.arena.connect(germ, pill);
        assert_eq!(f.release().freed, 1);
        assert_eq!(f.arena.partner(germ), None);
        assert_eq!(f.arena.partner(pill), None);
    }

    #[test]
    fn test_falling_stack_lands_aligned() {
        let mut f = Fixture::new();
        let floor = f.put(0, 11, CellKind::Pill);
        let falling: Vec<CellId> = (2..5).map(|y| f.put(0, y, CellKind::Pill)).collect();
        assert_eq!(f.release().freed, 3);
        f.settle_all();
        for y in 8..12 {
            let id = f.grid.get(GridPos::new(0, y)).unwrap();
            let cell = f.arena.get(id).unwrap();
            assert_eq!(cell.position, grid_to_pixel(GridPos::new(0, y)));
        }
        // Only the cells that fell pass through contact.
        for (y, id) in (8..11).zip(&falling) {
            assert_eq!(f.grid.get(GridPos::new(0, y)), Some(*id));
            assert_eq!(f.arena.get(*id).unwrap().drop_state, DropState::Contact);
        }
        assert_eq!(f.arena.get(floor).unwrap().drop_state, DropState::Ready);
        assert_eq!(f.grid.occupied_count(), 4);
    }
}
