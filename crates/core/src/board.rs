//! Board module - one player's playfield and its drop state machine
//!
//! A [`Board`] owns the cell arena, the grid of settled cells, the falling
//! piece, the next piece and the freed set. [`Board::update`] advances the state
//! machine by exactly one step:
//!
//! ```text
//! Ready ──► InNeck ──► InBottle ──► Contact ◄──► ProcessingLines
//!   ▲                                  │
//!   └──────────────────────────────────┘
//! ```
//!
//! - **Ready**: promote the next piece and start sliding it in
//! - **InNeck**: slide down at neck speed until the playfield top is reached
//! - **InBottle**: apply player input; drop one cell per move interval; land
//!   when the cell below is blocked
//! - **Contact**: break pending line groups one tick at a time; once none are
//!   left, score the move, inject queued trash and check for game over
//! - **ProcessingLines**: freed cells fall until they all settle, then the
//!   settled cells are rescanned for new lines (chain clears)
//!
//! Level completion (no germs left) is checked whenever the board is about to
//! handle a piece. Game over (either spawn slot in the top row taken) is checked
//! at the end of every move. Both are reported through [`BoardEvent`]s and
//! stop the board until the game-flow layer restarts it.
//!
//! # Example
//!
//! ```
//! use trash_core::{Board, GameSettings, SimpleRng};
//! use trash_core::types::{DropState, PlayState};
//!
//! let mut rng = SimpleRng::new(12345);
//! let mut board = Board::new(0, GameSettings::default());
//! board.new_game(0, 2, &mut rng);
//! assert_eq!(board.play_state(), PlayState::InPlay);
//! assert!(board.germs_remaining() >= 5);
//!
//! board.update(16, &[], &mut rng);
//! assert_eq!(board.drop_state(), DropState::InNeck);
//! ```

use arrayvec::ArrayVec;
use log::{debug, trace};

use crate::cell::{Cell, CellArena, CellId};
use crate::gravity;
use crate::grid::Grid;
use crate::lines::{self, Line};
use crate::piece::Piece;
use crate::rng::SimpleRng;
use crate::scoring::{self, MoveResult};
use crate::settings::GameSettings;
use crate::snapshot::{BoardSnapshot, FloatingSnapshot};
use crate::types::{
    grid_to_pixel, is_grid_aligned, pixel_to_grid, AnimationState, BoardInput, CellKind,
    DropState, GridPos, PillColor, PlayState, Spin, Vec2, CELL_SIZE, NECK_HEIGHT_PX,
    NECK_SPEED_PX, RANDOM_IDLE_INTERVAL_MS,
};

/// Notification for the game-flow layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// A spawn slot in the top row is taken
    GameOver { player: usize },
    /// No germs are left
    LevelComplete { player: usize },
    /// The player cleared two or more groups in one move
    SendTrash {
        player: usize,
        colors: Vec<PillColor>,
    },
    /// The last level was cleared
    GameComplete { player: usize },
}

/// One player's playfield
#[derive(Debug, Clone)]
pub struct Board {
    player: usize,
    settings: GameSettings,
    grid: Grid,
    arena: CellArena,
    current: Option<Piece>,
    next: Option<Piece>,
    /// Cells out of the grid, falling
    freed: Vec<CellId>,
    /// Cells that landed this cascade, waiting for the rescan
    settled: Vec<CellId>,
    /// Line groups still breaking
    pending_lines: Vec<Line>,
    /// Every group found since the last landing, for scoring
    move_lines: Vec<Line>,
    drop_state: DropState,
    play_state: PlayState,
    level: usize,
    difficulty: usize,
    score: u32,
    move_interval_ms: u32,
    fall_speed_px: u32,
    move_timer_ms: i64,
    idle_timer_ms: u32,
    pending_trash: Vec<PillColor>,
    events: Vec<BoardEvent>,
    last_move: Option<MoveResult>,
}

impl Board {
    /// Create an idle board for `player`; call [`Board::new_game`] to start it.
    ///
    /// `settings` are expected to be validated.
    pub fn new(player: usize, settings: GameSettings) -> Self {
        let grid = Grid::new(settings.board_width, settings.board_height);
        let difficulty = settings.clamp_difficulty(settings.default_difficulty);
        let mut board = Self {
            player,
            settings,
            grid,
            arena: CellArena::new(),
            current: None,
            next: None,
            freed: Vec::new(),
            settled: Vec::new(),
            pending_lines: Vec::new(),
            move_lines: Vec::new(),
            drop_state: DropState::Ready,
            play_state: PlayState::Idle,
            level: 0,
            difficulty,
            score: 0,
            move_interval_ms: 0,
            fall_speed_px: 1,
            move_timer_ms: 0,
            idle_timer_ms: 0,
            pending_trash: Vec::new(),
            events: Vec::new(),
            last_move: None,
        };
        board.apply_speeds();
        board
    }

    // ---- lifecycle ----

    /// Start a playthrough at `level` and `difficulty` (both clamped into the tables).
    pub fn new_game(&mut self, level: usize, difficulty: usize, rng: &mut SimpleRng) {
        self.level = self.settings.clamp_level(level);
        self.difficulty = self.settings.clamp_difficulty(difficulty);
        self.score = 0;
        self.last_move = None;
        self.start_level(rng);
    }

    /// Start a playthrough on an empty board with no germs.
    ///
    /// For scenarios built with [`Board::insert_cell`] and [`Board::place_piece`].
    pub fn new_game_empty(&mut self, level: usize, difficulty: usize) {
        self.level = self.settings.clamp_level(level);
        self.difficulty = self.settings.clamp_difficulty(difficulty);
        self.score = 0;
        self.last_move = None;
        self.reset_board();
        self.play_state = PlayState::InPlay;
    }

    /// Reseed the current level; the score is kept
    pub fn restart_level(&mut self, rng: &mut SimpleRng) {
        self.start_level(rng);
    }

    /// Advance to the next level.
    ///
    /// Past the last level the playthrough ends with [`BoardEvent::GameComplete`]
    /// and false is returned.
    pub fn next_level(&mut self, rng: &mut SimpleRng) -> bool {
        if self.level + 1 >= self.settings.levels.len() {
            debug!("player {} completed every level", self.player);
            self.play_state = PlayState::GameComplete;
            self.events.push(BoardEvent::GameComplete {
                player: self.player,
            });
            return false;
        }
        self.level += 1;
        self.start_level(rng);
        true
    }

    /// Stop the board (used when another board decides the round)
    pub fn halt(&mut self, state: PlayState) {
        self.play_state = state;
    }

    fn start_level(&mut self, rng: &mut SimpleRng) {
        self.reset_board();
        self.seed_germs(rng);
        self.play_state = PlayState::InPlay;
        debug!(
            "player {} starts level {} ({} germs)",
            self.player,
            self.level,
            self.germs_remaining()
        );
    }

    fn reset_board(&mut self) {
        self.arena.clear();
        self.grid.clear();
        self.current = None;
        self.next = None;
        self.freed.clear();
        self.settled.clear();
        self.pending_lines.clear();
        self.move_lines.clear();
        self.pending_trash.clear();
        self.drop_state = DropState::Ready;
        self.idle_timer_ms = 0;
        self.apply_speeds();
        self.move_timer_ms = self.move_interval_ms as i64;
    }

    fn apply_speeds(&mut self) {
        self.move_interval_ms = self.settings.move_interval_ms(self.level, self.difficulty);
        self.fall_speed_px = self.settings.fall_speed_px(self.level, self.difficulty);
    }

    fn seed_germs(&mut self, rng: &mut SimpleRng) {
        let Some(info) = self.settings.levels.get(self.level) else {
            return;
        };
        let (min, max, rows) = (
            info.min_germs_per_row as u32,
            info.max_germs_per_row as u32,
            info.germ_rows.min(self.grid.height()) as i8,
        );
        let height = self.grid.height() as i8;
        for y in ((height - rows)..height).rev() {
            let count = rng.next_between(min, max);
            for _ in 0..count {
                let Some(x) = self.grid.find_random_hole_in_row(y, rng) else {
                    break;
                };
                let color = self.random_color(rng);
                self.insert_cell(GridPos::new(x, y), CellKind::Germ, color);
            }
        }
    }

    // ---- per-tick update ----

    /// Advance the state machine by one step.
    ///
    /// `inputs` are the debounced events for this tick; they only act while a
    /// piece is in the bottle. Does nothing unless the board is in play.
    pub fn update(&mut self, elapsed_ms: u32, inputs: &[BoardInput], rng: &mut SimpleRng) {
        if self.play_state != PlayState::InPlay {
            return;
        }

        match self.drop_state {
            DropState::Contact => self.update_contact(rng),
            DropState::ProcessingLines => self.update_freed(),
            DropState::Ready | DropState::InNeck | DropState::InBottle => {
                if self.germs_remaining() == 0 {
                    self.finish_level();
                } else {
                    self.update_dropping(elapsed_ms, inputs, rng);
                }
            }
        }

        self.pick_random_idle(elapsed_ms, rng);
        for cell in self.arena.iter_mut() {
            cell.update_animation(elapsed_ms);
        }

        debug_assert!(self.verify().is_ok(), "{:?}", self.verify());
    }

    fn update_dropping(&mut self, elapsed_ms: u32, inputs: &[BoardInput], rng: &mut SimpleRng) {
        if self.current.is_none() {
            self.drop_piece(rng);
        }
        match self.drop_state {
            DropState::InNeck => self.slide_neck(rng),
            DropState::InBottle => {
                for input in inputs {
                    self.apply_input(*input);
                }
                self.advance_move_timer(elapsed_ms);
            }
            _ => {}
        }
    }

    /// Promote the next piece to current
    fn drop_piece(&mut self, rng: &mut SimpleRng) {
        let piece = match self.next.take() {
            Some(piece) => piece,
            None => self.spawn_piece(rng),
        };
        self.set_piece_state(&piece, DropState::InNeck);
        self.current = Some(piece);
        self.set_drop_state(DropState::InNeck);
    }

    fn spawn_piece(&mut self, rng: &mut SimpleRng) -> Piece {
        let colors = [self.random_color(rng), self.random_color(rng)];
        let position = self.spawn_position();
        Piece::spawn(&mut self.arena, position, colors)
    }

    /// Top of the neck: left half above column `(width - 1) / 2`
    pub fn spawn_position(&self) -> Vec2 {
        let column = (self.grid.width() as i8 - 1) / 2;
        let x = grid_to_pixel(GridPos::new(column, 0)).x;
        Vec2::new(x, -(NECK_HEIGHT_PX as f32))
    }

    fn slide_neck(&mut self, rng: &mut SimpleRng) {
        let Some(piece) = self.current else {
            return;
        };
        let distance = -piece.collision_box(&self.arena).y;
        if distance < NECK_SPEED_PX as i32 {
            piece.move_by(&mut self.arena, Vec2::new(0.0, distance as f32));
            self.set_piece_state(&piece, DropState::InBottle);
            self.set_drop_state(DropState::InBottle);
            let next = self.spawn_piece(rng);
            self.next = Some(next);
            self.move_timer_ms = self.move_interval_ms as i64;
        } else {
            piece.move_by(&mut self.arena, Vec2::new(0.0, NECK_SPEED_PX as f32));
        }
    }

    fn apply_input(&mut self, input: BoardInput) {
        let step = CELL_SIZE as i32;
        match input {
            BoardInput::MoveLeft => {
                self.try_shift(-step, 0);
            }
            BoardInput::MoveRight => {
                self.try_shift(step, 0);
            }
            BoardInput::SoftDrop => {
                self.try_shift(0, step);
            }
            BoardInput::RotateCw => self.try_rotate(Spin::Clockwise),
            BoardInput::RotateCcw => self.try_rotate(Spin::CounterClockwise),
        }
    }

    /// Would the current piece fit after moving by `(dx, dy)` pixels?
    fn piece_fits(&self, piece: &Piece, dx: i32, dy: i32) -> bool {
        let rect = piece.collision_box(&self.arena).offset(dx, dy);
        !self.grid.collides(&rect) && self.grid.bounds().contains(&rect)
    }

    fn try_shift(&mut self, dx: i32, dy: i32) -> bool {
        let Some(piece) = self.current else {
            return false;
        };
        if !self.piece_fits(&piece, dx, dy) {
            return false;
        }
        piece.move_by(&mut self.arena, Vec2::new(dx as f32, dy as f32));
        true
    }

    /// Rotate; on a clash try one cell to the left, otherwise undo
    fn try_rotate(&mut self, spin: Spin) {
        let Some(piece) = self.current else {
            return;
        };
        piece.rotate(&mut self.arena, spin);
        if self.piece_fits(&piece, 0, 0) {
            return;
        }
        let step = CELL_SIZE as i32;
        if self.piece_fits(&piece, -step, 0) {
            piece.move_by(&mut self.arena, Vec2::new(-(step as f32), 0.0));
        } else {
            piece.rotate(&mut self.arena, spin.reverse());
        }
    }

    fn advance_move_timer(&mut self, elapsed_ms: u32) {
        self.move_timer_ms -= elapsed_ms as i64;
        if self.move_timer_ms >= 0 {
            return;
        }
        self.move_timer_ms = self.move_interval_ms as i64;
        if !self.try_shift(0, CELL_SIZE as i32) {
            self.land_piece();
        }
    }

    /// Write both halves into the grid and scan for lines
    fn land_piece(&mut self) {
        let Some(piece) = self.current.take() else {
            return;
        };
        let mut landed: ArrayVec<GridPos, 2> = ArrayVec::new();
        for id in piece.cells() {
            let Some(cell) = self.arena.get_mut(id) else {
                continue;
            };
            debug_assert!(is_grid_aligned(cell.position), "piece landed off-grid");
            let pos = pixel_to_grid(cell.position);
            cell.drop_state = DropState::Contact;
            debug_assert!(self.grid.is_vacant(pos), "piece landed on {:?}", pos);
            self.grid.set(pos, id);
            landed.push(pos);
        }
        trace!("player {} landed piece at {:?}", self.player, landed);
        self.set_drop_state(DropState::Contact);
        for pos in landed {
            self.check_lines(pos);
        }
    }

    fn check_lines(&mut self, pos: GridPos) {
        let found = lines::find_lines(
            &self.grid,
            &self.arena,
            pos,
            self.settings.line_length,
            &self.pending_lines,
        );
        for line in found {
            self.move_lines.push(line.clone());
            self.pending_lines.push(line);
        }
    }

    fn update_contact(&mut self, rng: &mut SimpleRng) {
        if !self.pending_lines.is_empty() {
            self.update_breaking();
            return;
        }

        if !self.move_lines.is_empty() {
            self.finish_move();
        }

        if self.pending_trash.is_empty() {
            self.set_drop_state(DropState::Ready);
        } else {
            let colors = std::mem::take(&mut self.pending_trash);
            self.create_trash(&colors, rng);
        }

        if self.is_game_over() {
            debug!("player {} game over at score {}", self.player, self.score);
            if let Some(next) = self.next.take() {
                self.discard_piece(next);
            }
            self.play_state = PlayState::GameOver;
            self.events.push(BoardEvent::GameOver {
                player: self.player,
            });
        }
    }

    /// Start breaking pending lines; resolve the ones whose cells are all gone
    fn update_breaking(&mut self) {
        let mut i = 0;
        while i < self.pending_lines.len() {
            for id in self.pending_lines[i].cells.iter() {
                if let Some(cell) = self.arena.get_mut(*id) {
                    if matches!(
                        cell.animation_state(),
                        AnimationState::Stable | AnimationState::RandomIdle
                    ) {
                        cell.change_animation_state(AnimationState::Breaking);
                    }
                }
            }
            let gone = self.pending_lines[i].cells.iter().all(|id| {
                self.arena
                    .get(*id)
                    .map_or(true, |c| c.animation_state() == AnimationState::Gone)
            });
            if !gone {
                i += 1;
                continue;
            }
            let line = self.pending_lines.remove(i);
            self.clear_line(&line);
            self.set_drop_state(DropState::ProcessingLines);
        }
    }

    /// Remove a fully broken line and release what it was holding up
    fn clear_line(&mut self, line: &Line) {
        for id in line.cells.iter() {
            if let Some(partner) = self.arena.partner(*id) {
                if !line.contains(partner) {
                    self.arena.disconnect(*id);
                }
            }
        }

        let mut from_row = 0;
        for id in line.cells.iter() {
            let Some(pos) = self.arena.get(*id).map(|c| pixel_to_grid(c.position)) else {
                continue;
            };
            debug_assert!(!self.freed.contains(id), "breaking cell was freed");
            from_row = from_row.max(pos.y);
            if self.grid.get(pos) == Some(*id) {
                self.grid.take(pos);
            }
            // Shared corner cells stay alive until their last line resolves.
            if !self.pending_lines.iter().any(|l| l.contains(*id)) {
                self.arena.remove(*id);
            }
        }

        gravity::release_unsupported(&mut self.grid, &mut self.arena, &mut self.freed, from_row);
    }

    /// Let freed cells fall; rescan once all of them settled
    fn update_freed(&mut self) {
        let landed = gravity::fall_step(
            &mut self.grid,
            &mut self.arena,
            &mut self.freed,
            self.fall_speed_px,
        );
        self.settled.extend(landed);
        if !self.freed.is_empty() {
            return;
        }

        self.set_drop_state(DropState::Contact);
        let settled = std::mem::take(&mut self.settled);
        for id in settled {
            let Some(pos) = self.arena.get(id).map(|c| pixel_to_grid(c.position)) else {
                continue;
            };
            if self.grid.get(pos) == Some(id) {
                self.check_lines(pos);
            }
        }
    }

    fn finish_move(&mut self) {
        let result = scoring::score_move(&self.move_lines);
        self.move_lines.clear();
        self.score = self.score.saturating_add(result.points);
        debug!(
            "player {} cleared {} groups for {} points",
            self.player, result.lines, result.points
        );
        let trash = result.trash();
        if !trash.is_empty() {
            debug!("player {} sends trash {:?}", self.player, trash);
            self.events.push(BoardEvent::SendTrash {
                player: self.player,
                colors: trash.to_vec(),
            });
        }
        self.last_move = Some(result);
    }

    fn finish_level(&mut self) {
        debug!("player {} cleared level {}", self.player, self.level);
        self.play_state = PlayState::LevelChange;
        self.events.push(BoardEvent::LevelComplete {
            player: self.player,
        });
    }

    /// Either spawn slot in the top row is taken
    pub fn is_game_over(&self) -> bool {
        let column = (self.grid.width() as i8 - 1) / 2;
        self.grid.is_occupied(GridPos::new(column, 0))
            || self.grid.is_occupied(GridPos::new(column + 1, 0))
    }

    fn pick_random_idle(&mut self, elapsed_ms: u32, rng: &mut SimpleRng) {
        self.idle_timer_ms += elapsed_ms;
        if self.idle_timer_ms < RANDOM_IDLE_INTERVAL_MS {
            return;
        }
        self.idle_timer_ms = 0;
        let x = rng.next_range(self.grid.width() as u32) as i8;
        let y = rng.next_range(self.grid.height() as u32) as i8;
        let Some(id) = self.grid.get(GridPos::new(x, y)) else {
            return;
        };
        if let Some(cell) = self.arena.get_mut(id) {
            if cell.kind == CellKind::Germ && cell.animation_state() == AnimationState::Stable {
                cell.change_animation_state(AnimationState::RandomIdle);
            }
        }
    }

    // ---- trash ----

    /// Queue trash for the next contact phase, replacing anything already queued
    pub fn queue_trash(&mut self, colors: &[PillColor]) {
        debug!("player {} receives trash {:?}", self.player, colors);
        self.pending_trash = colors.to_vec();
    }

    /// Drop one trash cell per color into random holes of the top row.
    ///
    /// Tokens that find no hole are dropped. Placed cells go straight into the
    /// freed set and fall like any released cell. While a piece is in flight the
    /// colors are queued instead and 0 is returned.
    pub fn create_trash(&mut self, colors: &[PillColor], rng: &mut SimpleRng) -> usize {
        if self.current.is_some() {
            self.queue_trash(colors);
            return 0;
        }

        let mut placed = Vec::with_capacity(colors.len());
        for &color in colors {
            let Some(x) = self.grid.find_random_hole_in_row(0, rng) else {
                debug!(
                    "player {} top row full, dropping {} trash",
                    self.player,
                    colors.len() - placed.len()
                );
                break;
            };
            let pos = GridPos::new(x, 0);
            if let Some(id) = self.insert_cell(pos, CellKind::Trash, color) {
                placed.push((pos, id));
            }
        }

        for &(pos, id) in &placed {
            self.grid.take(pos);
            if let Some(cell) = self.arena.get_mut(id) {
                cell.drop_state = DropState::ProcessingLines;
            }
            self.freed.push(id);
        }
        self.pending_trash.clear();
        self.set_drop_state(DropState::ProcessingLines);
        placed.len()
    }

    // ---- scenario helpers ----

    /// Put a settled cell into an empty slot
    pub fn insert_cell(&mut self, pos: GridPos, kind: CellKind, color: PillColor) -> Option<CellId> {
        if !self.grid.is_vacant(pos) {
            return None;
        }
        let id = self.arena.insert(Cell::new(kind, color, grid_to_pixel(pos)));
        self.grid.set(pos, id);
        Some(id)
    }

    /// Link two adjacent settled cells as partners
    pub fn connect(&mut self, a: GridPos, b: GridPos) -> bool {
        let adjacent = (a.x - b.x).abs() + (a.y - b.y).abs() == 1;
        match (self.grid.get(a), self.grid.get(b)) {
            (Some(x), Some(y)) if adjacent => self.arena.connect(x, y),
            _ => false,
        }
    }

    /// Replace the current piece with a horizontal one whose left half is at `pos`.
    ///
    /// The piece enters the bottle with a fresh move timer. Returns false (and
    /// leaves no piece) if it would overlap a cell or leave the playfield.
    pub fn place_piece(&mut self, pos: GridPos, colors: [PillColor; 2]) -> bool {
        if let Some(old) = self.current.take() {
            self.discard_piece(old);
        }
        let piece = Piece::spawn(&mut self.arena, grid_to_pixel(pos), colors);
        if !self.piece_fits(&piece, 0, 0) {
            self.discard_piece(piece);
            return false;
        }
        self.set_piece_state(&piece, DropState::InBottle);
        self.current = Some(piece);
        self.set_drop_state(DropState::InBottle);
        self.move_timer_ms = self.move_interval_ms as i64;
        true
    }

    fn discard_piece(&mut self, piece: Piece) {
        for id in piece.cells() {
            self.arena.remove(id);
        }
    }

    fn set_piece_state(&mut self, piece: &Piece, state: DropState) {
        for id in piece.cells() {
            if let Some(cell) = self.arena.get_mut(id) {
                cell.drop_state = state;
            }
        }
    }

    fn set_drop_state(&mut self, state: DropState) {
        if self.drop_state != state {
            trace!("player {} {:?} -> {:?}", self.player, self.drop_state, state);
            self.drop_state = state;
        }
    }

    fn random_color(&self, rng: &mut SimpleRng) -> PillColor {
        rng.pick_color(&self.settings.palette)
            .unwrap_or(PillColor::Red)
    }

    // ---- observers ----

    /// Fill `out` with everything a renderer needs, reusing its buffers
    pub fn snapshot_into(&self, out: &mut BoardSnapshot) {
        out.clear();
        out.player = self.player;
        out.width = self.grid.width();
        out.height = self.grid.height();
        out.slots
            .resize(self.grid.width() as usize * self.grid.height() as usize, None);
        for (pos, id) in self.grid.iter_occupied() {
            let idx = pos.y as usize * self.grid.width() as usize + pos.x as usize;
            out.slots[idx] = FloatingSnapshot::capture(&self.arena, id).map(|f| f.cell);
        }

        let falling = self.current.iter().flat_map(|p| p.cells());
        for id in falling.chain(self.freed.iter().copied()) {
            if let Some(cell) = FloatingSnapshot::capture(&self.arena, id) {
                out.floating.push(cell);
            }
        }

        out.next = self.next.and_then(|p| {
            let left = self.arena.get(p.left)?.color;
            let right = self.arena.get(p.right)?.color;
            Some([left, right])
        });
        out.score = self.score;
        out.level = self.level;
        if let Some(d) = self.settings.difficulties.get(self.difficulty) {
            out.difficulty.push_str(&d.name);
        }
        out.germs_left = self.germs_remaining();
        out.drop_state = self.drop_state;
        out.play_state = self.play_state;
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let mut s = BoardSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    /// Drain outbound events
    pub fn take_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    /// The last move that cleared at least one group
    pub fn last_move(&self) -> Option<&MoveResult> {
        self.last_move.as_ref()
    }

    pub fn player(&self) -> usize {
        self.player
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn arena(&self) -> &CellArena {
        &self.arena
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.arena.get(id)
    }

    /// Cell settled at `pos`
    pub fn cell_at(&self, pos: GridPos) -> Option<&Cell> {
        self.grid.get(pos).and_then(|id| self.arena.get(id))
    }

    pub fn current_piece(&self) -> Option<Piece> {
        self.current
    }

    pub fn next_piece(&self) -> Option<Piece> {
        self.next
    }

    pub fn freed(&self) -> &[CellId] {
        &self.freed
    }

    pub fn pending_lines(&self) -> &[Line] {
        &self.pending_lines
    }

    pub fn move_lines(&self) -> &[Line] {
        &self.move_lines
    }

    pub fn pending_trash(&self) -> &[PillColor] {
        &self.pending_trash
    }

    pub fn drop_state(&self) -> DropState {
        self.drop_state
    }

    pub fn play_state(&self) -> PlayState {
        self.play_state
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn move_interval_ms(&self) -> u32 {
        self.move_interval_ms
    }

    pub fn fall_speed_px(&self) -> u32 {
        self.fall_speed_px
    }

    pub fn germs_remaining(&self) -> usize {
        self.arena
            .iter()
            .filter(|(_, c)| c.kind == CellKind::Germ)
            .count()
    }

    /// Check the ownership invariants.
    ///
    /// Every grid cell sits exactly on its slot, no cell is both settled and
    /// freed, and the falling piece is never in the grid.
    pub fn verify(&self) -> Result<(), String> {
        for (pos, id) in self.grid.iter_occupied() {
            let Some(cell) = self.arena.get(id) else {
                return Err(format!("slot {:?} holds a dead cell", pos));
            };
            if cell.position != grid_to_pixel(pos) {
                return Err(format!(
                    "slot {:?} holds a cell at {:?}",
                    pos, cell.position
                ));
            }
            if self.freed.contains(&id) {
                return Err(format!("slot {:?} cell is also freed", pos));
            }
            if let Some(piece) = self.current {
                if piece.cells().contains(&id) {
                    return Err(format!("slot {:?} holds the falling piece", pos));
                }
            }
        }
        for id in &self.freed {
            if !self.arena.contains(*id) {
                return Err("freed set holds a dead cell".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_settings() -> GameSettings {
        GameSettings {
            board_width: 6,
            board_height: 12,
            ..GameSettings::default()
        }
    }

    fn empty_board() -> Board {
        let mut board = Board::new(0, small_settings());
        board.new_game_empty(0, 2);
        // Keeps the level from completing.
        board.insert_cell(GridPos::new(5, 11), CellKind::Germ, PillColor::Yellow);
        board
    }

    #[test]
    fn test_new_board_is_idle() {
        let board = Board::new(1, GameSettings::default());
        assert_eq!(board.play_state(), PlayState::Idle);
        assert_eq!(board.player(), 1);
        assert_eq!(board.difficulty(), 2);
        assert_eq!(board.move_interval_ms(), 500);
        assert_eq!(board.fall_speed_px(), 2);
    }

    #[test]
    fn test_idle_board_ignores_updates() {
        let mut rng = SimpleRng::new(1);
        let mut board = Board::new(0, GameSettings::default());
        board.update(16, &[BoardInput::MoveLeft], &mut rng);
        assert_eq!(board.drop_state(), DropState::Ready);
        assert!(board.current_piece().is_none());
    }

    #[test]
    fn test_germs_seeded_in_bottom_rows() {
        let mut rng = SimpleRng::new(42);
        let mut board = Board::new(0, GameSettings::default());
        board.new_game(4, 2, &mut rng);
        let germs: Vec<GridPos> = board
            .grid()
            .iter_occupied()
            .filter(|(_, id)| board.cell(*id).unwrap().kind == CellKind::Germ)
            .map(|(pos, _)| pos)
            .collect();
        // Level 5: five rows of 5-6 germs.
        assert!(germs.len() >= 25 && germs.len() <= 30);
        assert!(germs.iter().all(|p| p.y >= 10));
        assert!(board.verify().is_ok());
    }

    #[test]
    fn test_piece_slides_through_neck_into_bottle() {
        let mut rng = SimpleRng::new(5);
        let mut board = empty_board();
        board.update(16, &[], &mut rng);
        assert_eq!(board.drop_state(), DropState::InNeck);
        let piece = board.current_piece().unwrap();
        let start = board.cell(piece.left).unwrap().position;
        assert_eq!(start.x, 48.0);

        let mut ticks = 1;
        while board.drop_state() == DropState::InNeck {
            board.update(16, &[], &mut rng);
            ticks += 1;
            assert!(ticks < 200);
        }
        assert_eq!(board.drop_state(), DropState::InBottle);
        assert_eq!(board.cell(piece.left).unwrap().position, Vec2::new(48.0, 0.0));
        assert!(board.next_piece().is_some());
    }

    #[test]
    fn test_moves_are_bounded_by_walls() {
        let mut rng = SimpleRng::new(5);
        let mut board = empty_board();
        assert!(board.place_piece(GridPos::new(0, 0), [PillColor::Red, PillColor::Blue]));
        board.update(16, &[BoardInput::MoveLeft], &mut rng);
        let piece = board.current_piece().unwrap();
        assert_eq!(board.cell(piece.left).unwrap().position.x, 0.0);

        for _ in 0..10 {
            board.update(1, &[BoardInput::MoveRight], &mut rng);
        }
        assert_eq!(board.cell(piece.right).unwrap().position.x, 120.0);
    }

    #[test]
    fn test_rotation_kicks_left_at_right_wall() {
        let mut rng = SimpleRng::new(5);
        let mut board = empty_board();
        assert!(board.place_piece(GridPos::new(2, 5), [PillColor::Red, PillColor::Blue]));
        let piece = board.current_piece().unwrap();
        // Stand the piece up at the right wall, then turn it flat again.
        board.update(1, &[BoardInput::RotateCw], &mut rng);
        for _ in 0..4 {
            board.update(1, &[BoardInput::MoveRight], &mut rng);
        }
        let x = board.cell(piece.left).unwrap().position.x;
        assert_eq!(x, 120.0);
        board.update(1, &[BoardInput::RotateCw], &mut rng);
        let left = board.cell(piece.left).unwrap().position;
        let right = board.cell(piece.right).unwrap().position;
        assert_eq!(left.y, right.y);
        assert!(left.x.max(right.x) <= 120.0);
        assert!(board.verify().is_ok());
    }

    #[test]
    fn test_rotation_refused_without_room_restores_piece() {
        let mut rng = SimpleRng::new(5);
        let mut board = empty_board();
        assert!(board.place_piece(GridPos::new(2, 0), [PillColor::Red, PillColor::Blue]));
        let piece = board.current_piece().unwrap();
        // Counter-clockwise lifts a half above the top edge and a left kick
        // cannot fix that, so the turn is undone.
        board.update(1, &[BoardInput::RotateCcw], &mut rng);
        assert_eq!(board.cell(piece.left).unwrap().position, Vec2::new(48.0, 0.0));
        assert_eq!(board.cell(piece.right).unwrap().position, Vec2::new(72.0, 0.0));
    }

    #[test]
    fn test_soft_drop_moves_one_cell() {
        let mut rng = SimpleRng::new(5);
        let mut board = empty_board();
        assert!(board.place_piece(GridPos::new(1, 3), [PillColor::Red, PillColor::Blue]));
        let piece = board.current_piece().unwrap();
        board.update(1, &[BoardInput::SoftDrop], &mut rng);
        assert_eq!(board.cell(piece.left).unwrap().position.y, 96.0);

        assert!(board.place_piece(GridPos::new(1, 11), [PillColor::Red, PillColor::Blue]));
        board.update(1, &[BoardInput::SoftDrop], &mut rng);
        let piece = board.current_piece().unwrap();
        assert_eq!(board.cell(piece.left).unwrap().position.y, 264.0);
        assert_eq!(board.drop_state(), DropState::InBottle);
    }

    #[test]
    fn test_piece_lands_on_timer() {
        let mut rng = SimpleRng::new(5);
        let mut board = empty_board();
        assert!(board.place_piece(GridPos::new(0, 11), [PillColor::Red, PillColor::Blue]));
        board.update(499, &[], &mut rng);
        assert_eq!(board.drop_state(), DropState::InBottle);
        board.update(2, &[], &mut rng);
        assert_eq!(board.drop_state(), DropState::Contact);
        assert!(board.current_piece().is_none());
        let left = board.grid().get(GridPos::new(0, 11)).unwrap();
        let right = board.grid().get(GridPos::new(1, 11)).unwrap();
        assert_eq!(board.arena().partner(left), Some(right));
        assert!(board.pending_lines().is_empty());
    }

    #[test]
    fn test_game_over_when_spawn_slot_taken() {
        let mut rng = SimpleRng::new(5);
        let mut board = empty_board();
        for y in 1..12 {
            board.insert_cell(GridPos::new(2, y), CellKind::Trash, PillColor::Blue);
        }
        // Colors differ from the column so no line forms.
        assert!(board.place_piece(GridPos::new(2, 0), [PillColor::Red, PillColor::Yellow]));
        for _ in 0..100 {
            board.update(16, &[], &mut rng);
            if board.play_state() != PlayState::InPlay {
                break;
            }
        }
        assert_eq!(board.play_state(), PlayState::GameOver);
        assert_eq!(board.take_events(), vec![BoardEvent::GameOver { player: 0 }]);
        assert!(board.take_events().is_empty());
    }

    #[test]
    fn test_level_complete_without_germs() {
        let mut rng = SimpleRng::new(5);
        let mut board = Board::new(3, small_settings());
        board.new_game_empty(0, 2);
        board.update(16, &[], &mut rng);
        assert_eq!(board.play_state(), PlayState::LevelChange);
        assert_eq!(
            board.take_events(),
            vec![BoardEvent::LevelComplete { player: 3 }]
        );
    }

    #[test]
    fn test_next_level_past_last_completes_game() {
        let mut rng = SimpleRng::new(5);
        let mut board = Board::new(0, GameSettings::default());
        board.new_game(15, 2, &mut rng);
        assert_eq!(board.level(), 15);
        assert!(!board.next_level(&mut rng));
        assert_eq!(board.play_state(), PlayState::GameComplete);
        assert_eq!(
            board.take_events(),
            vec![BoardEvent::GameComplete { player: 0 }]
        );

        board.new_game(99, 99, &mut rng);
        assert_eq!((board.level(), board.difficulty()), (15, 4));
        board.new_game(0, 2, &mut rng);
        assert!(board.next_level(&mut rng));
        assert_eq!(board.level(), 1);
        assert_eq!(board.play_state(), PlayState::InPlay);
    }

    #[test]
    fn test_create_trash_queues_while_piece_in_flight() {
        let mut rng = SimpleRng::new(5);
        let mut board = empty_board();
        assert!(board.place_piece(GridPos::new(0, 3), [PillColor::Red, PillColor::Blue]));
        assert_eq!(board.create_trash(&[PillColor::Red], &mut rng), 0);
        assert_eq!(board.pending_trash(), &[PillColor::Red]);
        board.queue_trash(&[PillColor::Blue, PillColor::Yellow]);
        assert_eq!(board.pending_trash(), &[PillColor::Blue, PillColor::Yellow]);
    }

    #[test]
    fn test_connect_requires_adjacent_cells() {
        let mut board = empty_board();
        board.insert_cell(GridPos::new(0, 11), CellKind::Pill, PillColor::Red);
        board.insert_cell(GridPos::new(1, 11), CellKind::Pill, PillColor::Red);
        board.insert_cell(GridPos::new(3, 11), CellKind::Pill, PillColor::Red);
        assert!(board.connect(GridPos::new(0, 11), GridPos::new(1, 11)));
        assert!(!board.connect(GridPos::new(1, 11), GridPos::new(3, 11)));
        assert!(!board.connect(GridPos::new(1, 11), GridPos::new(2, 11)));
        assert!(board
            .insert_cell(GridPos::new(0, 11), CellKind::Pill, PillColor::Red)
            .is_none());
    }
}
