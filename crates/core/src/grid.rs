//! Grid module - slot storage for settled cells
//!
//! The grid is `width x height` slots, each empty or holding one [`CellId`].
//! Uses a flat vector in row-major order (`y * width + x`).
//! Coordinates: `x` grows left to right, `y` grows top to bottom; row 0 is the top.
//!
//! Grid slots map onto pixels one to one: slot `(x, y)` covers
//! `x*24..x*24+24` horizontally and `y*24..y*24+24` vertically.

use crate::cell::CellId;
use crate::rng::SimpleRng;
use crate::types::{GridPos, Rect, CELL_SIZE};

/// Settled-cell storage for one board
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: u8,
    height: u8,
    slots: Vec<Option<CellId>>,
}

impl Grid {
    /// Create an empty grid
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            slots: vec![None; width as usize * height as usize],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= self.width as i8 || y < 0 || y >= self.height as i8 {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Pixel rectangle covered by the playfield
    pub fn bounds(&self) -> Rect {
        Rect::new(
            0,
            0,
            self.width as i32 * CELL_SIZE as i32,
            self.height as i32 * CELL_SIZE as i32,
        )
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        self.index(pos.x, pos.y).is_some()
    }

    /// Cell at `pos`; None if empty or out of bounds
    pub fn get(&self, pos: GridPos) -> Option<CellId> {
        self.index(pos.x, pos.y).and_then(|idx| self.slots[idx])
    }

    /// Put a cell into an in-bounds slot, returning the previous occupant
    pub fn set(&mut self, pos: GridPos, id: CellId) -> Option<CellId> {
        let idx = self.index(pos.x, pos.y)?;
        self.slots[idx].replace(id)
    }

    /// Empty a slot, returning its occupant
    pub fn take(&mut self, pos: GridPos) -> Option<CellId> {
        let idx = self.index(pos.x, pos.y)?;
        self.slots[idx].take()
    }

    /// Within bounds and filled
    pub fn is_occupied(&self, pos: GridPos) -> bool {
        self.get(pos).is_some()
    }

    /// Within bounds and empty
    pub fn is_vacant(&self, pos: GridPos) -> bool {
        matches!(self.index(pos.x, pos.y), Some(idx) if self.slots[idx].is_none())
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// Number of filled slots
    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Every filled slot in row-major order
    pub fn iter_occupied(&self) -> impl Iterator<Item = (GridPos, CellId)> + '_ {
        let width = self.width as usize;
        self.slots.iter().enumerate().filter_map(move |(idx, slot)| {
            slot.map(|id| (GridPos::new((idx % width) as i8, (idx / width) as i8), id))
        })
    }

    /// True if any filled slot overlaps the pixel rectangle.
    ///
    /// Only slots the rectangle touches are inspected. Touching edges do not count.
    pub fn collides(&self, rect: &Rect) -> bool {
        if rect.w <= 0 || rect.h <= 0 {
            return false;
        }
        let size = CELL_SIZE as i32;
        let x0 = rect.x.div_euclid(size).max(0);
        let x1 = (rect.right() - 1).div_euclid(size).min(self.width as i32 - 1);
        let y0 = rect.y.div_euclid(size).max(0);
        let y1 = (rect.bottom() - 1).div_euclid(size).min(self.height as i32 - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                if self.is_occupied(GridPos::new(x as i8, y as i8)) {
                    return true;
                }
            }
        }
        false
    }

    /// Pick a random empty column in `row`.
    ///
    /// Starts at a uniformly random column; if that is taken, searches outward
    /// alternating right then left at growing distance. Returns None when the row
    /// has no hole.
    pub fn find_random_hole_in_row(&self, row: i8, rng: &mut SimpleRng) -> Option<i8> {
        if row < 0 || row >= self.height as i8 {
            return None;
        }
        let width = self.width as i32;
        let start = rng.next_range(self.width as u32) as i32;
        let vacant = |x: i32| self.is_vacant(GridPos::new(x as i8, row));

        if vacant(start) {
            return Some(start as i8);
        }
        let mut offset = 1;
        while start + offset < width || start >= offset {
            if start + offset < width && vacant(start + offset) {
                return Some((start + offset) as i8);
            }
            if start >= offset && vacant(start - offset) {
                return Some((start - offset) as i8);
            }
            offset += 1;
        }
        None
    }
}
