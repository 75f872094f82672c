//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! Everything here is plain data: the simulation core, the terminal view and the
//! input layer all speak in these types.
//!
//! # Board Geometry
//!
//! The playfield is a grid of square cells, each [`CELL_SIZE`] pixels wide.
//! Pixel coordinates are relative to the top-left corner of the playfield, so
//! grid slot `(x, y)` sits exactly at pixel `(x * 24, y * 24)`. Pieces enter
//! from the "neck" above the playfield, which has negative pixel `y`.
//!
//! - **Width**: 10 columns by default (indexed 0-9)
//! - **Height**: 15 rows by default (indexed 0-14, top to bottom)
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval (~60 FPS) |
//! | `BASE_MOVE_INTERVAL_MS` | 500 | Time between one-cell drops at speed 1.0 |
//! | `NECK_SPEED_PX` | 1 | Pixels per tick while a piece slides through the neck |
//! | `BASE_FALL_SPEED_PX` | 2 | Pixels per tick for freed cells and trash |
//! | `RANDOM_IDLE_INTERVAL_MS` | 300 | How often a germ may start its idle animation |
//! | `FRAME_MS` | 16 | Animation frame duration |
//!
//! # Examples
//!
//! ```
//! use trash_types::{grid_to_pixel, BoardInput, GridPos, PillColor, Vec2, CELL_SIZE};
//!
//! // Grid slots map onto exact pixel positions.
//! assert_eq!(grid_to_pixel(GridPos::new(2, 3)), Vec2::new(48.0, 72.0));
//! assert_eq!(CELL_SIZE, 24);
//!
//! // Parse colors and inputs (case-insensitive).
//! assert_eq!(PillColor::from_str("RED"), Some(PillColor::Red));
//! assert_eq!(BoardInput::from_str("rotateCw"), Some(BoardInput::RotateCw));
//! ```

use serde::{Deserialize, Serialize};

/// Edge length of one grid cell in pixels
pub const CELL_SIZE: u32 = 24;

/// Default board width in cells (240 px playfield)
pub const DEFAULT_BOARD_WIDTH: u8 = 10;

/// Default board height in cells (360 px playfield)
pub const DEFAULT_BOARD_HEIGHT: u8 = 15;

/// Largest supported board edge, in cells
pub const MAX_BOARD_EDGE: u8 = 32;

/// Height of the neck above the playfield that new pieces slide through
pub const NECK_HEIGHT_PX: u32 = 60;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Time between one-cell drops of the active piece before speed modifiers
pub const BASE_MOVE_INTERVAL_MS: u32 = 500;

/// Neck slide speed in pixels per tick
pub const NECK_SPEED_PX: u32 = 1;

/// Fall speed of freed cells and trash in pixels per tick before modifiers
pub const BASE_FALL_SPEED_PX: u32 = 2;

/// Interval between idle-animation picks
pub const RANDOM_IDLE_INTERVAL_MS: u32 = 300;

/// Animation frame duration
pub const FRAME_MS: u32 = 16;

/// Minimum run length that forms a line group
pub const DEFAULT_LINE_LENGTH: u8 = 4;

/// Points for clearing a germ
pub const GERM_SCORE: u32 = 20;

/// Points for clearing a pill half
pub const PILL_SCORE: u32 = 10;

/// Points for clearing a trash cell
pub const TRASH_SCORE: u32 = 10;

/// Round wins needed to take a link match
pub const LINK_WINS_REQUIRED: u32 = 3;

/// Cell colors.
///
/// The default palette uses all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PillColor {
    Red,
    Blue,
    Yellow,
}

impl PillColor {
    /// Every color, in palette order
    pub const ALL: [PillColor; 3] = [PillColor::Red, PillColor::Blue, PillColor::Yellow];

    /// Parse color from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use trash_types::PillColor;
    ///
    /// assert_eq!(PillColor::from_str("blue"), Some(PillColor::Blue));
    /// assert_eq!(PillColor::from_str("Yellow"), Some(PillColor::Yellow));
    /// assert_eq!(PillColor::from_str("green"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" => Some(PillColor::Red),
            "blue" => Some(PillColor::Blue),
            "yellow" => Some(PillColor::Yellow),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PillColor::Red => "red",
            PillColor::Blue => "blue",
            PillColor::Yellow => "yellow",
        }
    }
}

/// What a cell is, which fixes its immobility and score value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Seeded at level start, never falls, must be cleared to win
    Germ,
    /// One half of a player-dropped piece
    Pill,
    /// Penalty cell received from an opponent
    Trash,
}

impl CellKind {
    /// Germs anchor themselves (and their partner) in place
    pub fn is_immobile(&self) -> bool {
        matches!(self, CellKind::Germ)
    }

    /// Points awarded when a cell of this kind is cleared
    pub fn score(&self) -> u32 {
        match self {
            CellKind::Germ => GERM_SCORE,
            CellKind::Pill => PILL_SCORE,
            CellKind::Trash => TRASH_SCORE,
        }
    }
}

/// Per-tick player input, already debounced by the input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardInput {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Rotate piece a quarter turn clockwise
    RotateCw,
    /// Rotate piece a quarter turn counter-clockwise
    RotateCcw,
    /// Move piece one cell down (does not land it)
    SoftDrop,
}

impl BoardInput {
    /// Parse input from string (camelCase, case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(BoardInput::MoveLeft),
            "moveright" => Some(BoardInput::MoveRight),
            "rotatecw" => Some(BoardInput::RotateCw),
            "rotateccw" => Some(BoardInput::RotateCcw),
            "softdrop" => Some(BoardInput::SoftDrop),
            _ => None,
        }
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardInput::MoveLeft => "moveLeft",
            BoardInput::MoveRight => "moveRight",
            BoardInput::RotateCw => "rotateCw",
            BoardInput::RotateCcw => "rotateCcw",
            BoardInput::SoftDrop => "softDrop",
        }
    }
}

/// Quarter-turn direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spin {
    Clockwise,
    CounterClockwise,
}

impl Spin {
    /// The opposite direction (used to undo a rotation)
    pub fn reverse(&self) -> Self {
        match self {
            Spin::Clockwise => Spin::CounterClockwise,
            Spin::CounterClockwise => Spin::Clockwise,
        }
    }

    /// Signed angle in radians, positive clockwise
    pub fn angle(&self) -> f32 {
        match self {
            Spin::Clockwise => std::f32::consts::FRAC_PI_2,
            Spin::CounterClockwise => -std::f32::consts::FRAC_PI_2,
        }
    }
}

/// Board drop state machine.
///
/// The same value doubles as the per-cell drop sub-state while a cell is falling.
///
/// - **Ready**: nothing in flight, the next piece may be promoted
/// - **InNeck**: piece is sliding in above the playfield
/// - **InBottle**: piece is player-controlled and falls on the move timer
/// - **Contact**: something landed; line groups break and the move is scored
/// - **ProcessingLines**: freed cells fall under gravity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DropState {
    #[default]
    Ready,
    InNeck,
    InBottle,
    Contact,
    ProcessingLines,
}

/// Presentation state of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnimationState {
    #[default]
    Stable,
    RandomIdle,
    Breaking,
    Gone,
}

/// Lifecycle of a board as seen by the game-flow collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlayState {
    /// Created but no game started
    #[default]
    Idle,
    InPlay,
    /// Waiting for the next level (cleared, or a link round ended)
    LevelChange,
    GameOver,
    /// Cleared the last level
    GameComplete,
}

/// Pixel-space vector (playfield relative)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

/// Integer pixel rectangle with half-open edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Same rectangle moved by `(dx, dy)`
    pub fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// True when the interiors overlap (touching edges do not count)
    ///
    /// # Examples
    ///
    /// ```
    /// use trash_types::Rect;
    ///
    /// let a = Rect::new(0, 0, 24, 24);
    /// assert!(a.intersects(&Rect::new(23, 0, 24, 24)));
    /// assert!(!a.intersects(&Rect::new(24, 0, 24, 24)));
    /// ```
    pub fn intersects(&self, other: &Rect) -> bool {
        other.x < self.right()
            && self.x < other.right()
            && other.y < self.bottom()
            && self.y < other.bottom()
    }

    /// True when `other` lies completely inside (edges inclusive)
    pub fn contains(&self, other: &Rect) -> bool {
        self.x <= other.x
            && other.right() <= self.right()
            && self.y <= other.y
            && other.bottom() <= self.bottom()
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }
}

/// Grid coordinate: `x` grows right, `y` grows down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct GridPos {
    pub x: i8,
    pub y: i8,
}

impl GridPos {
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i8, dy: i8) -> GridPos {
        GridPos::new(self.x + dx, self.y + dy)
    }
}

/// Pixel position of a grid slot
pub fn grid_to_pixel(pos: GridPos) -> Vec2 {
    Vec2::new(
        pos.x as f32 * CELL_SIZE as f32,
        pos.y as f32 * CELL_SIZE as f32,
    )
}

/// Grid slot containing a pixel position (floor division)
pub fn pixel_to_grid(pos: Vec2) -> GridPos {
    GridPos::new(
        (pos.x / CELL_SIZE as f32).floor() as i8,
        (pos.y / CELL_SIZE as f32).floor() as i8,
    )
}

/// True when a pixel position sits exactly on a grid slot
pub fn is_grid_aligned(pos: Vec2) -> bool {
    grid_to_pixel(pixel_to_grid(pos)) == pos
}
