//! Gravity resolver tests

use trash::core::{fall_step, release_unsupported, Cell, CellArena, CellId, Grid};
use trash::types::{grid_to_pixel, CellKind, DropState, GridPos, PillColor};

struct Field {
    grid: Grid,
    arena: CellArena,
    freed: Vec<CellId>,
}

impl Field {
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

    fn release(&mut self) -> usize {
        let bottom = self.grid.height() as i8 - 1;
        release_unsupported(&mut self.grid, &mut self.arena, &mut self.freed, bottom).freed
    }

    /// Run the fall until everything settled; returns the number of steps
    fn settle_all(&mut self, speed: u32) -> usize {
        let mut steps = 0;
        while !self.freed.is_empty() {
            fall_step(&mut self.grid, &mut self.arena, &mut self.freed, speed);
            steps += 1;
            assert!(steps < 1000);
        }
        steps
    }

    fn at(&self, x: i8, y: i8) -> Option<CellId> {
        self.grid.get(GridPos::new(x, y))
    }
}

#[test]
fn test_floating_stack_falls_as_a_block() {
    let mut f = Field::new();
    let ids: Vec<CellId> = (3..6).map(|y| f.put(1, y, CellKind::Pill)).collect();
    assert_eq!(f.release(), 3);
    assert_eq!(f.grid.occupied_count(), 0);

    f.settle_all(2);
    assert_eq!(f.at(1, 9), Some(ids[0]));
    assert_eq!(f.at(1, 10), Some(ids[1]));
    assert_eq!(f.at(1, 11), Some(ids[2]));
    for (pos, id) in f.grid.iter_occupied() {
        let cell = f.arena.get(id).unwrap();
        assert_eq!(cell.position, grid_to_pixel(pos));
        assert_eq!(cell.drop_state, DropState::Contact);
    }
}

#[test]
fn test_vertical_pair_falls_together() {
    let mut f = Field::new();
    let top = f.put(2, 4, CellKind::Pill);
    let bottom = f.put(2, 5, CellKind::Pill);
    f.arena.connect(top, bottom);

    assert_eq!(f.release(), 2);
    f.settle_all(3);
    assert_eq!(f.at(2, 10), Some(top));
    assert_eq!(f.at(2, 11), Some(bottom));
    assert_eq!(f.arena.partner(top), Some(bottom));
}

#[test]
fn test_horizontal_pair_with_one_supported_half_stays() {
    let mut f = Field::new();
    f.put(0, 11, CellKind::Pill);
    let a = f.put(0, 10, CellKind::Pill);
    let b = f.put(1, 10, CellKind::Pill);
    f.arena.connect(a, b);
    assert_eq!(f.release(), 0);
    assert_eq!(f.at(1, 10), Some(b));
}

#[test]
fn test_unsupported_horizontal_pair_falls() {
    let mut f = Field::new();
    let a = f.put(3, 2, CellKind::Pill);
    let b = f.put(4, 2, CellKind::Pill);
    f.arena.connect(a, b);
    assert_eq!(f.release(), 2);
    f.settle_all(4);
    assert_eq!(f.at(3, 11), Some(a));
    assert_eq!(f.at(4, 11), Some(b));
}

#[test]
fn test_germs_and_trash_on_germs_hold() {
    let mut f = Field::new();
    f.put(0, 4, CellKind::Germ);
    let trash = f.put(0, 3, CellKind::Trash);
    let loose = f.put(1, 3, CellKind::Trash);
    assert_eq!(f.release(), 1);
    assert_eq!(f.at(0, 3), Some(trash));
    assert_eq!(f.freed, vec![loose]);
}

#[test]
fn test_pill_hanging_under_germ_partner_is_cut_loose() {
    let mut f = Field::new();
    let germ = f.put(5, 6, CellKind::Germ);
    let pill = f.put(5, 7, CellKind::Pill);
    f.arena.connect(germ, pill);
    assert_eq!(f.release(), 1);
    assert_eq!(f.arena.partner(germ), None);
    assert!(f.arena.get(pill).unwrap().is_disconnected());
    f.settle_all(2);
    assert_eq!(f.at(5, 11), Some(pill));
}

#[test]
fn test_cells_land_on_settled_cells_same_step() {
    let mut f = Field::new();
    let lower = f.put(4, 10, CellKind::Pill);
    let upper = f.put(4, 9, CellKind::Pill);
    // Make the lower one reach the floor first so both stop on one step.
    f.grid.take(GridPos::new(4, 10));
    f.grid.take(GridPos::new(4, 9));
    f.freed.extend([lower, upper]);
    f.arena.get_mut(lower).unwrap().position = grid_to_pixel(GridPos::new(4, 11));
    f.arena.get_mut(upper).unwrap().position = grid_to_pixel(GridPos::new(4, 10));

    let landed = fall_step(&mut f.grid, &mut f.arena, &mut f.freed, 2);
    assert_eq!(landed.len(), 2);
    assert!(f.freed.is_empty());
    assert_eq!(f.at(4, 11), Some(lower));
    assert_eq!(f.at(4, 10), Some(upper));
}
