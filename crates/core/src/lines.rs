//! Line resolver - finds same-color runs through a settled cell
//!
//! Given a grid coordinate, the resolver walks left/right and up/down while the
//! neighbouring slots hold a cell of the same color. A run of at least
//! `line_length` cells is a [`Line`].
//!
//! A candidate run is dropped when every one of its cells already belongs to a
//! single line that is still pending. Two landed halves that sit in the same
//! row therefore report that row once, while an L or T intersection still
//! yields two lines sharing a corner cell.

use arrayvec::ArrayVec;

use crate::cell::{CellArena, CellId};
use crate::grid::Grid;
use crate::types::{GridPos, PillColor, MAX_BOARD_EDGE};

/// Longest possible run (one full board edge)
pub const MAX_LINE_CELLS: usize = MAX_BOARD_EDGE as usize;

/// A qualifying run of same-colored cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Member cells, ordered by position along the run
    pub cells: ArrayVec<CellId, MAX_LINE_CELLS>,
    pub color: PillColor,
    /// Sum of member scores, taken when the run was found
    pub points: u32,
}

impl Line {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.cells.contains(&id)
    }

    /// True if every cell of `other` is a member of this line
    pub fn covers(&self, other: &Line) -> bool {
        other.cells.iter().all(|id| self.contains(*id))
    }
}

/// Scan the row and column through `pos`.
///
/// Returns the runs that qualify and are not already covered by a line in
/// `pending`. The horizontal run is checked first; a vertical run is also
/// checked against the horizontal one accepted in the same call.
pub fn find_lines(
    grid: &Grid,
    arena: &CellArena,
    pos: GridPos,
    line_length: u8,
    pending: &[Line],
) -> ArrayVec<Line, 2> {
    let mut found: ArrayVec<Line, 2> = ArrayVec::new();
    let origin = grid.get(pos);
    debug_assert!(origin.is_some(), "line scan from empty slot {:?}", pos);
    let Some(color) = origin.and_then(|id| arena.get(id)).map(|c| c.color) else {
        return found;
    };

    for (dx, dy) in [(1, 0), (0, 1)] {
        let run = scan_run(grid, arena, pos, color, dx, dy);
        if run.len() < line_length as usize {
            continue;
        }
        let points = run
            .iter()
            .filter_map(|id| arena.get(*id))
            .map(|c| c.score())
            .sum();
        let line = Line {
            cells: run,
            color,
            points,
        };
        let duplicate = pending.iter().chain(found.iter()).any(|l| l.covers(&line));
        if duplicate {
            continue;
        }
        log::debug!("line found: {:?} x{} through {:?}", color, line.len(), pos);
        found.push(line);
    }
    found
}

/// Collect the contiguous same-color run through `pos` along `(dx, dy)`.
fn scan_run(
    grid: &Grid,
    arena: &CellArena,
    pos: GridPos,
    color: PillColor,
    dx: i8,
    dy: i8,
) -> ArrayVec<CellId, MAX_LINE_CELLS> {
    let matches = |p: GridPos| {
        grid.get(p)
            .filter(|id| arena.get(*id).is_some_and(|c| c.color == color))
    };

    // Walk back to the start of the run, then forward to its end.
    let mut start = pos;
    while matches(start.offset(-dx, -dy)).is_some() {
        start = start.offset(-dx, -dy);
    }
    let mut run = ArrayVec::new();
    let mut cursor = start;
    while let Some(id) = matches(cursor) {
        if run.try_push(id).is_err() {
            break;
        }
        cursor = cursor.offset(dx, dy);
    }
    run
}
