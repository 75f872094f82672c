//! Cell module - single grid occupants and the arena that owns them
//!
//! Every germ, pill half and trash unit is a [`Cell`] stored in a [`CellArena`].
//! The grid, the active piece and the freed set only ever hold [`CellId`]
//! handles, so moving a cell between them is a handle move and never a copy.
//!
//! Partner links are handles too. The arena keeps them symmetric: connecting
//! sets both sides, disconnecting or removing a cell clears both sides.

use crate::types::{
    AnimationState, CellKind, DropState, PillColor, Rect, Vec2, CELL_SIZE, FRAME_MS,
};

/// Generational handle into a [`CellArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
    index: u32,
    generation: u32,
}

impl CellId {
    /// Slot index inside the arena
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

/// Sprite-sheet cursor for one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Animation {
    state: AnimationState,
    frame: u16,
    frame_count: u16,
    elapsed_ms: u32,
}

impl Animation {
    fn new(kind: CellKind, state: AnimationState) -> Self {
        Self {
            state,
            frame: 0,
            frame_count: sheet_frames(kind, state),
            elapsed_ms: 0,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn frame(&self) -> u16 {
        self.frame
    }

    pub fn frame_count(&self) -> u16 {
        self.frame_count
    }
}

/// Number of frames in the sheet used for `(kind, state)`.
///
/// Breaking sheets are 7x4 for every kind; the germ idle sheet is 6x8.
pub fn sheet_frames(kind: CellKind, state: AnimationState) -> u16 {
    match (kind, state) {
        (_, AnimationState::Breaking) => 7 * 4,
        (CellKind::Germ, AnimationState::RandomIdle) => 6 * 8,
        _ => 1,
    }
}

/// A single colored occupant of the playfield
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Top-left pixel position, playfield relative
    pub position: Vec2,
    pub color: PillColor,
    pub kind: CellKind,
    /// Drop sub-state while the cell is in flight
    pub drop_state: DropState,
    partner: Option<CellId>,
    facing: f32,
    disconnected: bool,
    animation: Animation,
}

impl Cell {
    pub fn new(kind: CellKind, color: PillColor, position: Vec2) -> Self {
        Self {
            position,
            color,
            kind,
            drop_state: DropState::Ready,
            partner: None,
            facing: 0.0,
            disconnected: false,
            animation: Animation::new(kind, AnimationState::Stable),
        }
    }

    pub fn is_immobile(&self) -> bool {
        self.kind.is_immobile()
    }

    pub fn score(&self) -> u32 {
        self.kind.score()
    }

    pub fn partner(&self) -> Option<CellId> {
        self.partner
    }

    /// Facing angle in radians (presentation only)
    pub fn facing(&self) -> f32 {
        self.facing
    }

    /// True once the cell lost its partner through a disconnect
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn animation_state(&self) -> AnimationState {
        self.animation.state
    }

    /// Translate by a pixel offset
    pub fn move_by(&mut self, offset: Vec2) {
        self.position += offset;
    }

    /// Turn the facing; a lone cell has no geometry to rotate
    pub fn rotate(&mut self, angle: f32) {
        self.facing += angle;
    }

    /// Fixed-size box at the current position
    pub fn collision_box(&self) -> Rect {
        Rect::new(
            self.position.x.round() as i32,
            self.position.y.round() as i32,
            CELL_SIZE as i32,
            CELL_SIZE as i32,
        )
    }

    /// Swap the active sheet and restart its frame cursor
    pub fn change_animation_state(&mut self, state: AnimationState) {
        if state == AnimationState::Breaking {
            self.facing = 0.0;
        }
        self.animation = Animation::new(self.kind, state);
    }

    /// Drop the partner link on this side only.
    ///
    /// Use [`CellArena::disconnect`] to sever both sides.
    pub fn disconnect(&mut self) {
        self.partner = None;
        self.disconnected = true;
        self.facing = 0.0;
        let state = self.animation.state;
        if state != AnimationState::Breaking {
            self.change_animation_state(state);
        }
    }

    /// Advance the frame cursor; returns true when the sheet finished this call
    pub fn update_animation(&mut self, elapsed_ms: u32) -> bool {
        let anim = &mut self.animation;
        if anim.state == AnimationState::Gone {
            return false;
        }
        anim.elapsed_ms += elapsed_ms;
        if anim.elapsed_ms <= FRAME_MS {
            return false;
        }
        anim.elapsed_ms = 0;
        anim.frame += 1;
        if anim.frame < anim.frame_count {
            return false;
        }
        match anim.state {
            AnimationState::Breaking => self.change_animation_state(AnimationState::Gone),
            AnimationState::RandomIdle => self.change_animation_state(AnimationState::Stable),
            _ => self.animation.frame = 0,
        }
        true
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    cell: Option<Cell>,
}

/// Owner of every live cell on one board
#[derive(Debug, Clone, Default)]
pub struct CellArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl CellArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a cell and hand back its handle
    pub fn insert(&mut self, cell: Cell) -> CellId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.cell = Some(cell);
            return CellId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            cell: Some(cell),
        });
        CellId {
            index,
            generation: 0,
        }
    }

    /// Destroy a cell, clearing its partner's back-link
    pub fn remove(&mut self, id: CellId) -> Option<Cell> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        let cell = slot.cell.take()?;
        self.free.push(id.index);
        self.live -= 1;
        if let Some(partner) = cell.partner {
            if let Some(other) = self.get_mut(partner) {
                if other.partner == Some(id) {
                    other.partner = None;
                }
            }
        }
        Some(cell)
    }

    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.cell.as_ref())
    }

    pub fn get_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.cell.as_mut())
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.get(id).is_some()
    }

    /// Link two live cells as partners (replacing older links on both sides)
    pub fn connect(&mut self, a: CellId, b: CellId) -> bool {
        if a == b || !self.contains(a) || !self.contains(b) {
            return false;
        }
        self.disconnect(a);
        self.disconnect(b);
        for (this, other) in [(a, b), (b, a)] {
            if let Some(cell) = self.get_mut(this) {
                cell.partner = Some(other);
                cell.disconnected = false;
            }
        }
        true
    }

    /// Sever the partner link of `id` on both sides
    pub fn disconnect(&mut self, id: CellId) {
        let Some(partner) = self.partner(id) else {
            return;
        };
        for side in [id, partner] {
            if let Some(cell) = self.get_mut(side) {
                cell.disconnect();
            }
        }
    }

    /// Live partner of `id`, if any
    pub fn partner(&self, id: CellId) -> Option<CellId> {
        self.get(id)
            .and_then(|cell| cell.partner)
            .filter(|p| self.contains(*p))
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Destroy everything; outstanding handles become stale
    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.cell.take().is_some() {
                self.free.push(index as u32);
            }
        }
        self.live = 0;
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cell> + '_ {
        self.slots.iter_mut().filter_map(|slot| slot.cell.as_mut())
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellId, &Cell)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.cell.as_ref().map(|cell| {
                (
                    CellId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    cell,
                )
            })
        })
    }
}
