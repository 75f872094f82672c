//! Property tests for the board invariants.
//!
//! - Every settled cell sits exactly on its slot and is never also freed.
//! - The gravity sweep reaches a fixed point where nothing loose is left hanging.
//! - A landing never yields two lines where one covers the other.

use proptest::prelude::*;
use trash::core::{
    find_lines, release_unsupported, Board, Cell, CellArena, CellId, GameSettings, Grid,
    SimpleRng,
};
use trash::types::{grid_to_pixel, BoardInput, CellKind, GridPos, PillColor, PlayState};

const W: i8 = 6;
const H: i8 = 12;

fn input_strategy() -> impl Strategy<Value = Option<BoardInput>> {
    prop_oneof![
        3 => Just(None),
        1 => Just(Some(BoardInput::MoveLeft)),
        1 => Just(Some(BoardInput::MoveRight)),
        1 => Just(Some(BoardInput::RotateCw)),
        1 => Just(Some(BoardInput::RotateCcw)),
        2 => Just(Some(BoardInput::SoftDrop)),
    ]
}

/// Occupancy layout: (kind index, color index) per slot, None for empty
fn layout_strategy() -> impl Strategy<Value = Vec<Option<(u8, u8)>>> {
    prop::collection::vec(
        prop::option::weighted(0.5, (0u8..3, 0u8..3)),
        (W as usize) * (H as usize),
    )
}

fn fill(layout: &[Option<(u8, u8)>]) -> (Grid, CellArena) {
    let mut grid = Grid::new(W as u8, H as u8);
    let mut arena = CellArena::new();
    for (i, slot) in layout.iter().enumerate() {
        let Some((kind, color)) = slot else {
            continue;
        };
        let pos = GridPos::new(i as i8 % W, i as i8 / W);
        let kind = [CellKind::Germ, CellKind::Pill, CellKind::Trash][*kind as usize];
        let color = PillColor::ALL[*color as usize];
        let id = arena.insert(Cell::new(kind, color, grid_to_pixel(pos)));
        grid.set(pos, id);
    }
    (grid, arena)
}

proptest! {
    #[test]
    fn random_play_keeps_board_consistent(
        seed in any::<u32>(),
        level in 0usize..6,
        inputs in prop::collection::vec(input_strategy(), 200..900),
        trash_at in prop::option::of(0usize..900),
    ) {
        let settings = GameSettings { board_width: W as u8, board_height: H as u8, ..GameSettings::default() };
        let mut rng = SimpleRng::new(seed);
        let mut board = Board::new(0, settings);
        board.new_game(level, 2, &mut rng);

        for (tick, input) in inputs.iter().enumerate() {
            if Some(tick) == trash_at {
                board.queue_trash(&[PillColor::Red, PillColor::Blue, PillColor::Yellow]);
            }
            let batch: Vec<BoardInput> = input.iter().copied().collect();
            board.update(16, &batch, &mut rng);
            prop_assert!(board.verify().is_ok(), "{:?}", board.verify());
            for line in board.pending_lines() {
                prop_assert!(line.len() >= 4);
            }
            if board.play_state() != PlayState::InPlay {
                break;
            }
        }
    }

    #[test]
    fn gravity_sweep_reaches_fixed_point(layout in layout_strategy()) {
        let (mut grid, mut arena) = fill(&layout);
        let mut freed: Vec<CellId> = Vec::new();
        let before = grid.occupied_count();
        let release = release_unsupported(&mut grid, &mut arena, &mut freed, H - 1);

        prop_assert_eq!(grid.occupied_count() + freed.len(), before);
        prop_assert!(release.sweeps <= (W as usize) * (H as usize) + 1);
        for (pos, id) in grid.iter_occupied() {
            prop_assert!(!freed.contains(&id));
            let cell = arena.get(id).unwrap();
            // Without partners, anything still in the grid is supported.
            prop_assert!(
                cell.is_immobile() || !grid.is_vacant(pos.offset(0, 1)),
                "{:?} left hanging", pos
            );
        }

        // A second sweep finds nothing new.
        let again = release_unsupported(&mut grid, &mut arena, &mut freed, H - 1);
        prop_assert_eq!(again.freed, 0);
    }

    #[test]
    fn landing_never_reports_nested_lines(layout in layout_strategy(), x in 0..W, y in 0..H) {
        let (grid, arena) = fill(&layout);
        let pos = GridPos::new(x, y);
        prop_assume!(grid.is_occupied(pos));

        let lines = find_lines(&grid, &arena, pos, 4, &[]);
        for line in &lines {
            prop_assert!(line.len() >= 4);
            prop_assert!(line.contains(grid.get(pos).unwrap()));
        }
        if lines.len() == 2 {
            prop_assert!(!lines[0].covers(&lines[1]));
            prop_assert!(!lines[1].covers(&lines[0]));
        }

        // Rescanning with the found lines pending reports nothing new.
        let pending: Vec<_> = lines.into_iter().collect();
        prop_assert!(find_lines(&grid, &arena, pos, 4, &pending).is_empty());
    }
}
