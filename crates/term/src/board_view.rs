//! BoardView: paints board snapshots into a terminal framebuffer.
//!
//! This module is pure (no I/O). Each board is drawn as a framed playfield
//! with a side panel to its right; several boards sit next to each other.
//!
//! ```text
//!   ▒▒▒▒            <- neck rows (piece sliding in)
//! ┌────────────┐  P1
//! │· · · · · · │  SCORE
//! │· ██████ · ·│  120
//! │· · ¤¤ · · ·│  ...
//! └────────────┘
//! ```

use crate::core::{BoardSnapshot, FloatingSnapshot, Link, SlotSnapshot};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{AnimationState, CellKind, PillColor, PlayState, CELL_SIZE, NECK_HEIGHT_PX};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// Match-level information drawn over the boards
#[derive(Debug, Clone, Copy, Default)]
pub struct HudView<'a> {
    pub paused: bool,
    /// Round wins per player (link games)
    pub wins: &'a [u32],
    /// Winner of the finished round or match
    pub winner: Option<usize>,
}

/// Columns taken by the side panel, gap included
const PANEL_W: u16 = 14;
/// Rows above the frame for the neck
const NECK_ROWS: u16 = (NECK_HEIGHT_PX as u16).div_ceil(CELL_SIZE as u16);

const PLAYFIELD_BG: Rgb = Rgb::new(24, 24, 34);
const BLACK: Rgb = Rgb::new(0, 0, 0);

pub struct BoardView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for BoardView {
    fn default() -> Self {
        // 2x1 keeps cells roughly square in most terminal fonts.
        Self {
            cell_w: 2,
            cell_h: 1,
            anchor_y: AnchorY::Center,
        }
    }
}

/// Where one board lands in the framebuffer
#[derive(Debug, Clone, Copy)]
struct Frame {
    x: u16,
    y: u16,
    w: u16,
    h: u16,
}

impl BoardView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Outer size of one board: frame, neck rows and side panel
    pub fn board_extent(&self, snap: &BoardSnapshot) -> (u16, u16) {
        let (fw, fh) = self.frame_size(snap);
        (fw + PANEL_W, fh + NECK_ROWS * self.cell_h)
    }

    fn frame_size(&self, snap: &BoardSnapshot) -> (u16, u16) {
        (
            snap.width as u16 * self.cell_w + 2,
            snap.height as u16 * self.cell_h + 2,
        )
    }

    /// Render every board into an existing framebuffer.
    ///
    /// The framebuffer is resized to the viewport and fully repainted.
    pub fn render_into(
        &self,
        boards: &[BoardSnapshot],
        hud: &HudView<'_>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().glyph(' '));

        let total_w: u16 = boards.iter().map(|b| self.board_extent(b).0).sum();
        let total_h = boards
            .iter()
            .map(|b| self.board_extent(b).1)
            .max()
            .unwrap_or(0);
        let mut x = viewport.width.saturating_sub(total_w) / 2;
        let top = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(total_h) / 2,
            AnchorY::Top => 0,
        };

        for snap in boards {
            let (fw, fh) = self.frame_size(snap);
            let frame = Frame {
                x,
                y: top + NECK_ROWS * self.cell_h,
                w: fw,
                h: fh,
            };
            self.draw_board(fb, snap, frame);
            self.draw_panel(fb, snap, hud, frame);
            if let Some(text) = overlay_text(snap, hud) {
                draw_overlay(fb, frame, text);
            }
            x = x.saturating_add(fw + PANEL_W);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(
        &self,
        boards: &[BoardSnapshot],
        hud: &HudView<'_>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(boards, hud, viewport, &mut fb);
        fb
    }

    fn draw_board(&self, fb: &mut FrameBuffer, snap: &BoardSnapshot, frame: Frame) {
        let border = CellStyle::new(Rgb::new(200, 200, 200), BLACK);
        let empty = CellStyle::new(Rgb::new(70, 70, 86), PLAYFIELD_BG).dimmed();
        fb.draw_box(frame.x, frame.y, frame.w, frame.h, border);

        for y in 0..snap.height {
            for x in 0..snap.width {
                let (cx, cy) = (x as i32, y as i32);
                match snap.slot(x, y) {
                    Some(slot) => self.draw_slot(fb, frame, cx, cy, slot),
                    None => self.fill_cell(fb, frame, cx, cy, ['·', ' '], empty),
                }
            }
        }

        for floating in &snap.floating {
            let (cx, cy) = floating_cell(floating);
            // Above the frame only the neck rows are visible.
            if cy >= -(NECK_ROWS as i32) && cy < snap.height as i32 {
                self.draw_slot(fb, frame, cx, cy, &floating.cell);
            }
        }
    }

    fn draw_slot(&self, fb: &mut FrameBuffer, frame: Frame, x: i32, y: i32, slot: &SlotSnapshot) {
        if slot.animation == AnimationState::Gone {
            return;
        }
        let style = CellStyle::new(pill_rgb(slot.color), PLAYFIELD_BG);
        let (chars, style) = match (slot.animation, slot.kind) {
            (AnimationState::Breaking, _) => (['░', '░'], style.dimmed()),
            (AnimationState::RandomIdle, CellKind::Germ) if slot.frame % 8 < 4 => {
                (['*', '*'], style.bold())
            }
            (_, CellKind::Germ) => (['¤', '¤'], style.bold()),
            (_, CellKind::Trash) => (['▓', '▓'], style),
            (_, CellKind::Pill) => (pill_chars(slot.link), style),
        };
        self.fill_cell(fb, frame, x, y, chars, style);
    }

    /// Fill cell `(x, y)` of the playfield; rows above 0 land in the neck
    fn fill_cell(
        &self,
        fb: &mut FrameBuffer,
        frame: Frame,
        x: i32,
        y: i32,
        chars: [char; 2],
        style: CellStyle,
    ) {
        let px = frame.x as i32 + 1 + x * self.cell_w as i32;
        let py = frame.y as i32 + 1 + y * self.cell_h as i32;
        for dy in 0..self.cell_h as i32 {
            for dx in 0..self.cell_w as i32 {
                let (gx, gy) = (px + dx, py + dy);
                if gx < 0 || gy < 0 {
                    continue;
                }
                let ch = if dx == 0 { chars[0] } else { chars[1] };
                fb.put_char(gx as u16, gy as u16, ch, style);
            }
        }
    }

    fn draw_panel(&self, fb: &mut FrameBuffer, snap: &BoardSnapshot, hud: &HudView<'_>, frame: Frame) {
        let x = frame.x + frame.w + 2;
        if x >= fb.width() {
            return;
        }
        let label = CellStyle::default().bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), BLACK);

        let mut y = frame.y;
        let end = fb.put_str(x, y, "P", label);
        fb.put_u32(end, y, snap.player as u32 + 1, label);
        y += 2;

        for (name, number) in [
            ("SCORE", snap.score),
            ("LEVEL", snap.level as u32 + 1),
            ("GERMS", snap.germs_left as u32),
        ] {
            fb.put_str(x, y, name, label);
            fb.put_u32(x, y + 1, number, value);
            y += 3;
        }

        fb.put_str(x, y, "SPEED", label);
        fb.put_str(x, y + 1, &snap.difficulty, value);
        y += 3;

        fb.put_str(x, y, "NEXT", label);
        if let Some([left, right]) = snap.next {
            fb.put_str(x, y + 1, "██", CellStyle::new(pill_rgb(left), BLACK));
            fb.put_str(x + 2, y + 1, "██", CellStyle::new(pill_rgb(right), BLACK));
        }
        y += 3;

        if let Some(wins) = hud.wins.get(snap.player) {
            fb.put_str(x, y, "WINS", label);
            let mut cx = x;
            for _ in 0..*wins {
                cx = fb.put_str(cx, y + 1, "★", CellStyle::new(Rgb::new(240, 220, 80), BLACK));
            }
        }
    }
}

/// Grid cell under a floating cell's pixel position (rounded down)
fn floating_cell(f: &FloatingSnapshot) -> (i32, i32) {
    let size = CELL_SIZE as f32;
    ((f.x / size).floor() as i32, (f.y / size).floor() as i32)
}

/// Two half-glyphs for a pill, rounded on the side away from its partner
fn pill_chars(link: Option<Link>) -> [char; 2] {
    match link {
        Some(Link::Right) => ['(', '█'],
        Some(Link::Left) => ['█', ')'],
        Some(Link::Up) | Some(Link::Down) => ['█', '█'],
        None => ['(', ')'],
    }
}

pub fn pill_rgb(color: PillColor) -> Rgb {
    match color {
        PillColor::Red => Rgb::new(230, 70, 70),
        PillColor::Blue => Rgb::new(80, 130, 240),
        PillColor::Yellow => Rgb::new(240, 210, 60),
    }
}

fn overlay_text(snap: &BoardSnapshot, hud: &HudView<'_>) -> Option<&'static str> {
    match snap.play_state {
        PlayState::GameOver if hud.winner == Some(snap.player) => Some("WINNER"),
        PlayState::GameOver => Some("GAME OVER"),
        PlayState::GameComplete => Some("ALL CLEAR"),
        PlayState::LevelChange if hud.winner == Some(snap.player) => Some("LEVEL CLEAR"),
        PlayState::LevelChange => Some("ROUND OVER"),
        _ if hud.paused => Some("PAUSED"),
        _ => None,
    }
}

fn draw_overlay(fb: &mut FrameBuffer, frame: Frame, text: &str) {
    let width = text.chars().count() as u16;
    let x = frame.x + frame.w.saturating_sub(width) / 2;
    let y = frame.y + frame.h / 2;
    fb.put_str(x, y, text, CellStyle::new(Rgb::new(255, 255, 255), BLACK).bold());
}
