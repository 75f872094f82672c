//! Scoring module - per-move score and trash
//!
//! Rules:
//! - A move is everything from one landing until the board is ready for the next
//!   piece, chain clears included.
//! - Move score is the sum of every cleared cell's value multiplied by the number
//!   of line groups cleared in that move.
//! - Two or more groups in one move send one trash token per group, colored like
//!   the group.

use crate::lines::Line;
use crate::types::PillColor;

/// Minimum line groups in one move before trash is sent
pub const TRASH_LINE_THRESHOLD: usize = 2;

/// Summary of one finished move
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MoveResult {
    /// Line groups cleared during the move
    pub lines: u32,
    /// Color of each group, in the order they were found
    pub colors: Vec<PillColor>,
    /// Points awarded (sum of cell values times `lines`)
    pub points: u32,
}

impl MoveResult {
    /// Trash tokens this move sends to opponents
    pub fn trash(&self) -> &[PillColor] {
        if self.colors.len() >= TRASH_LINE_THRESHOLD {
            &self.colors
        } else {
            &[]
        }
    }
}

/// Score a finished move from the lines it cleared
pub fn score_move(lines: &[Line]) -> MoveResult {
    let base: u32 = lines.iter().map(|l| l.points).sum();
    let count = lines.len() as u32;
    MoveResult {
        lines: count,
        colors: lines.iter().map(|l| l.color).collect(),
        points: base.saturating_mul(count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrayvec::ArrayVec;

    fn line(color: PillColor, points: u32) -> Line {
        Line {
            cells: ArrayVec::new(),
            color,
            points,
        }
    }

    #[test]
    fn test_empty_move_scores_nothing() {
        let result = score_move(&[]);
        assert_eq!(result, MoveResult::default());
        assert!(result.trash().is_empty());
    }

    #[test]
    fn test_single_line_is_plain_sum() {
        let result = score_move(&[line(PillColor::Red, 40)]);
        assert_eq!(result.points, 40);
        assert_eq!(result.lines, 1);
        assert!(result.trash().is_empty());
    }

    #[test]
    fn test_multi_line_multiplies_and_sends_trash() {
        let result = score_move(&[
            line(PillColor::Red, 40),
            line(PillColor::Blue, 50),
            line(PillColor::Red, 40),
        ]);
        assert_eq!(result.points, 130 * 3);
        assert_eq!(
            result.trash(),
            &[PillColor::Red, PillColor::Blue, PillColor::Red]
        );
    }
}
