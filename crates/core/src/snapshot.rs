use crate::cell::{Cell, CellArena, CellId};
use crate::types::{AnimationState, CellKind, DropState, PillColor, PlayState};

/// Side of a cell its partner sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Link {
    Left,
    Right,
    Up,
    Down,
}

impl Link {
    /// Direction from `cell` towards its live partner
    pub fn of(arena: &CellArena, id: CellId) -> Option<Link> {
        let cell = arena.get(id)?;
        let partner = arena.get(arena.partner(id)?)?;
        let dx = partner.position.x - cell.position.x;
        let dy = partner.position.y - cell.position.y;
        Some(if dx.abs() >= dy.abs() {
            if dx < 0.0 {
                Link::Left
            } else {
                Link::Right
            }
        } else if dy < 0.0 {
            Link::Up
        } else {
            Link::Down
        })
    }
}

/// A settled cell as seen by a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotSnapshot {
    pub color: PillColor,
    pub kind: CellKind,
    pub animation: AnimationState,
    pub frame: u16,
    pub link: Option<Link>,
}

impl SlotSnapshot {
    fn capture(arena: &CellArena, id: CellId, cell: &Cell) -> Self {
        Self {
            color: cell.color,
            kind: cell.kind,
            animation: cell.animation_state(),
            frame: cell.animation().frame(),
            link: Link::of(arena, id),
        }
    }
}

/// A cell between slots (falling piece, next piece or freed cell)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingSnapshot {
    /// Pixel position, playfield relative
    pub x: f32,
    pub y: f32,
    pub cell: SlotSnapshot,
}

impl FloatingSnapshot {
    pub(crate) fn capture(arena: &CellArena, id: CellId) -> Option<Self> {
        let cell = arena.get(id)?;
        Some(Self {
            x: cell.position.x,
            y: cell.position.y,
            cell: SlotSnapshot::capture(arena, id, cell),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoardSnapshot {
    pub player: usize,
    pub width: u8,
    pub height: u8,
    /// Row-major, `width * height` entries
    pub slots: Vec<Option<SlotSnapshot>>,
    /// Current piece halves and freed cells
    pub floating: Vec<FloatingSnapshot>,
    /// Next piece colors, left half first
    pub next: Option<[PillColor; 2]>,
    pub score: u32,
    /// Zero-based level index
    pub level: usize,
    pub difficulty: String,
    pub germs_left: usize,
    pub drop_state: DropState,
    pub play_state: PlayState,
}

impl BoardSnapshot {
    pub fn clear(&mut self) {
        self.slots.clear();
        self.floating.clear();
        self.next = None;
        self.score = 0;
        self.level = 0;
        self.difficulty.clear();
        self.germs_left = 0;
        self.drop_state = DropState::Ready;
        self.play_state = PlayState::Idle;
    }

    pub fn slot(&self, x: u8, y: u8) -> Option<&SlotSnapshot> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.slots
            .get(y as usize * self.width as usize + x as usize)?
            .as_ref()
    }

    /// Nothing is moving and the board accepts input
    pub fn playable(&self) -> bool {
        self.play_state == PlayState::InPlay
    }
}
