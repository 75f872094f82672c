use criterion::{black_box, criterion_group, criterion_main, Criterion};
use trash::core::{
    find_lines, release_unsupported, Board, BoardSnapshot, Cell, CellArena, CellId, GameSettings,
    Grid, SimpleRng,
};
use trash::types::{grid_to_pixel, BoardInput, CellKind, GridPos, PillColor};

fn bench_tick(c: &mut Criterion) {
    let mut rng = SimpleRng::new(12345);
    let mut board = Board::new(0, GameSettings::default());
    board.new_game(4, 2, &mut rng);

    c.bench_function("board_tick_16ms", |b| {
        b.iter(|| {
            board.update(black_box(16), &[BoardInput::SoftDrop], &mut rng);
            if board.is_game_over() {
                board.new_game(4, 2, &mut rng);
            }
        })
    });
}

/// Full-height columns of alternating color, so every row scan runs to the wall
fn striped_grid(width: u8, height: u8) -> (Grid, CellArena) {
    let mut grid = Grid::new(width, height);
    let mut arena = CellArena::new();
    for y in 0..height as i8 {
        for x in 0..width as i8 {
            let pos = GridPos::new(x, y);
            let color = PillColor::ALL[(x as usize / 4) % 3];
            let id = arena.insert(Cell::new(CellKind::Pill, color, grid_to_pixel(pos)));
            grid.set(pos, id);
        }
    }
    (grid, arena)
}

fn bench_line_scan(c: &mut Criterion) {
    let (grid, arena) = striped_grid(10, 15);
    c.bench_function("find_lines_row_and_column", |b| {
        b.iter(|| find_lines(&grid, &arena, black_box(GridPos::new(1, 7)), 4, &[]))
    });
}

fn bench_gravity_sweep(c: &mut Criterion) {
    c.bench_function("release_unsupported_full_board", |b| {
        b.iter(|| {
            let (mut grid, mut arena) = striped_grid(10, 15);
            // Knock out the floor row so every column comes loose.
            for x in 0..10 {
                if let Some(id) = grid.take(GridPos::new(x, 14)) {
                    arena.remove(id);
                }
            }
            let mut freed: Vec<CellId> = Vec::new();
            release_unsupported(&mut grid, &mut arena, &mut freed, 14)
        })
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let mut rng = SimpleRng::new(777);
    let mut board = Board::new(0, GameSettings::default());
    board.new_game(10, 2, &mut rng);
    let mut snap = BoardSnapshot::default();

    c.bench_function("snapshot_into", |b| {
        b.iter(|| {
            board.snapshot_into(&mut snap);
            black_box(&snap);
        })
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_line_scan,
    bench_gravity_sweep,
    bench_snapshot
);
criterion_main!(benches);
