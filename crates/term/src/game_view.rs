//! GameView: maps a board snapshot into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::engine::BoardSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::playback::{AnimFrame, Tween};
use crate::types::{Coord, CoordMapper, MAX_GEM_COUNT};

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
pub struct AdapterStatusView {
    pub enabled: bool,
    pub client_count: u16,
    pub controller_id: Option<usize>,
}

/// Score panel contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HudView {
    pub score: u32,
    pub high_score: u32,
    pub level: u32,
    pub combo: u32,
    /// Remaining display time of the "COMBO xN!" banner.
    pub combo_flash_ms: u32,
    pub debug: bool,
}

/// Where the board frame sits on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLayout {
    pub start_x: u16,
    pub start_y: u16,
    pub frame_w: u16,
    pub frame_h: u16,
}

const BOARD_BG: Rgb = Rgb::new(24, 24, 34);

/// Gem colours, indexed by kind - 1.
const PALETTE: [Rgb; MAX_GEM_COUNT as usize] = [
    Rgb::new(230, 70, 70),
    Rgb::new(80, 200, 100),
    Rgb::new(80, 130, 235),
    Rgb::new(240, 210, 70),
    Rgb::new(200, 110, 220),
    Rgb::new(70, 215, 215),
    Rgb::new(255, 150, 40),
    Rgb::new(235, 235, 235),
];

const GLYPHS: [char; MAX_GEM_COUNT as usize] = ['◆', '●', '▲', '■', '♦', '♥', '♣', '♠'];

fn gem_color(kind: u8) -> Rgb {
    let i = usize::from(kind.max(1) - 1) % PALETTE.len();
    PALETTE[i]
}

fn gem_glyph(kind: u8) -> char {
    let i = usize::from(kind.max(1) - 1) % GLYPHS.len();
    GLYPHS[i]
}

/// A lightweight terminal renderer for the match-3 board.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
        }
    }

    /// Board frame placement for a viewport; the board is centred.
    pub fn layout(&self, viewport: Viewport, board_w: u8, board_h: u8) -> BoardLayout {
        let frame_w = u16::from(board_w) * self.cell_w + 2;
        let frame_h = u16::from(board_h) * self.cell_h + 2;
        BoardLayout {
            start_x: viewport.width.saturating_sub(frame_w) / 2,
            // Leave a row for the combo banner above the board.
            start_y: viewport.height.saturating_sub(frame_h) / 2,
            frame_w,
            frame_h,
        }
    }

    /// Screen-to-board mapper matching what [`GameView::render_into`] draws.
    pub fn mapper(&self, viewport: Viewport, board_w: u8, board_h: u8) -> CoordMapper {
        let l = self.layout(viewport, board_w, board_h);
        CoordMapper::new(l.start_x + 1, l.start_y + 1, self.cell_w, self.cell_h)
    }

    /// Render the current frame into an existing framebuffer.
    #[allow(clippy::too_many_arguments)]
    pub fn render_into(
        &self,
        snap: &BoardSnapshot,
        hud: &HudView,
        cursor: Option<Coord>,
        anim: Option<AnimFrame<'_>>,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().into_cell(' '));

        let l = self.layout(viewport, snap.width, snap.height);
        let border = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        fb.fill_rect(
            l.start_x + 1,
            l.start_y + 1,
            l.frame_w - 2,
            l.frame_h - 2,
            ' ',
            CellStyle::new(BOARD_BG, BOARD_BG),
        );
        self.draw_border(fb, l.start_x, l.start_y, l.frame_w, l.frame_h, border);

        for (row, cells) in snap.cells.iter().enumerate() {
            for (col, &kind) in cells.iter().enumerate() {
                let c = Coord::new(col as i16, row as i16);
                if kind == 0 {
                    self.draw_empty_cell(fb, &l, c);
                } else {
                    self.draw_gem(fb, &l, c, kind, false);
                }
            }
        }

        if let Some(frame) = anim {
            self.draw_animation(fb, &l, snap, frame);
        }

        if let Some(sel) = snap.selected {
            if let Some(kind) = snap.cell(sel) {
                self.draw_gem(fb, &l, sel, kind, true);
            }
        }
        if let Some(c) = cursor {
            self.draw_cursor(fb, &l, c);
        }

        self.draw_side_panel(fb, hud, adapter, viewport, &l);

        if hud.combo > 1 && hud.combo_flash_ms > 0 && l.start_y > 0 {
            let style = CellStyle {
                fg: Rgb::new(255, 170, 0),
                bg: Rgb::new(0, 0, 0),
                bold: true,
                dim: false,
            };
            let text = format!("COMBO x{}!", hud.combo);
            fb.put_str_centered(l.start_x, l.frame_w, l.start_y - 1, &text, style);
        }

        if snap.halted {
            self.draw_overlay_text(fb, &l, "BOARD JAMMED - press R");
        } else if snap.board_id == 0 {
            self.draw_overlay_text(fb, &l, "LOADING");
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &BoardSnapshot, hud: &HudView, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, hud, None, None, None, viewport, &mut fb);
        fb
    }

    fn cell_origin(&self, l: &BoardLayout, c: Coord) -> Option<(u16, u16)> {
        if c.col < 0 || c.row < 0 {
            return None;
        }
        let x = l.start_x + 1 + (c.col as u16) * self.cell_w;
        let y = l.start_y + 1 + (c.row as u16) * self.cell_h;
        if x + self.cell_w > l.start_x + l.frame_w - 1 || y + self.cell_h > l.start_y + l.frame_h - 1
        {
            return None;
        }
        Some((x, y))
    }

    fn fill_cell(&self, fb: &mut FrameBuffer, l: &BoardLayout, c: Coord, ch: char, style: CellStyle) {
        if let Some((x, y)) = self.cell_origin(l, c) {
            fb.fill_rect(x, y, self.cell_w, self.cell_h, ' ', style);
            fb.put_char(x, y, ch, style);
        }
    }

    fn draw_border(&self, fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
        if w < 2 || h < 2 {
            return;
        }

        fb.put_char(x, y, '╭', style);
        fb.put_char(x + w - 1, y, '╮', style);
        fb.put_char(x, y + h - 1, '╰', style);
        fb.put_char(x + w - 1, y + h - 1, '╯', style);

        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    fn draw_empty_cell(&self, fb: &mut FrameBuffer, l: &BoardLayout, c: Coord) {
        let style = CellStyle {
            fg: Rgb::new(70, 70, 85),
            bg: BOARD_BG,
            bold: false,
            dim: true,
        };
        self.fill_cell(fb, l, c, '·', style);
    }

    fn draw_gem(&self, fb: &mut FrameBuffer, l: &BoardLayout, c: Coord, kind: u8, selected: bool) {
        let fg = gem_color(kind);
        let style = if selected {
            CellStyle {
                fg: Rgb::new(0, 0, 0),
                bg: fg,
                bold: true,
                dim: false,
            }
        } else {
            CellStyle {
                fg,
                bg: BOARD_BG,
                bold: true,
                dim: false,
            }
        };
        self.fill_cell(fb, l, c, gem_glyph(kind), style);
    }

    fn draw_cursor(&self, fb: &mut FrameBuffer, l: &BoardLayout, c: Coord) {
        let Some((x, y)) = self.cell_origin(l, c) else {
            return;
        };
        if self.cell_w < 2 {
            return;
        }
        let base = fb.get(x, y).map(|cell| cell.style).unwrap_or_default();
        let style = CellStyle {
            fg: Rgb::new(255, 255, 255),
            bold: true,
            ..base
        };
        fb.put_char(x + self.cell_w - 1, y, '◂', style);
    }

    fn draw_animation(
        &self,
        fb: &mut FrameBuffer,
        l: &BoardLayout,
        snap: &BoardSnapshot,
        frame: AnimFrame<'_>,
    ) {
        match frame {
            AnimFrame::Swap { a, b, tween } => {
                // The grid already holds the swapped gems; show them arriving.
                for c in [a, b] {
                    if let Some(kind) = snap.cell(c) {
                        self.draw_fading(fb, l, c, kind, tween);
                    }
                }
            }
            AnimFrame::Rejected { a, b, tween } => {
                // Blink red while the swap is undone.
                if tween.scaled(4) % 2 == 0 {
                    let style = CellStyle {
                        fg: Rgb::new(255, 255, 255),
                        bg: Rgb::new(150, 30, 30),
                        bold: true,
                        dim: false,
                    };
                    for c in [a, b] {
                        let glyph = snap.cell(c).map(gem_glyph).unwrap_or('x');
                        self.fill_cell(fb, l, c, glyph, style);
                    }
                }
            }
            AnimFrame::Pop { cells, tween } => {
                let burst = ['✦', '✧', '·'];
                let ch = burst[(tween.scaled(3) as usize).min(burst.len() - 1)];
                let style = CellStyle {
                    fg: Rgb::new(255, 240, 180),
                    bg: BOARD_BG,
                    bold: true,
                    dim: false,
                };
                // Nothing has fallen yet on screen; hide the whole column above each pop.
                for &c in cells {
                    for row in 0..c.row {
                        self.draw_empty_cell(fb, l, Coord::new(c.col, row));
                    }
                }
                for &c in cells {
                    self.fill_cell(fb, l, c, ch, style);
                }
            }
            AnimFrame::Fall {
                falls,
                refills,
                tween,
            } => {
                for m in falls {
                    self.draw_fading(fb, l, m.to, m.kind.get(), tween);
                }
                for &(c, kind) in refills {
                    self.draw_fading(fb, l, c, kind.get(), tween);
                }
            }
        }
    }

    fn draw_fading(&self, fb: &mut FrameBuffer, l: &BoardLayout, c: Coord, kind: u8, tween: Tween) {
        let step = tween.scaled(4).max(1);
        let style = CellStyle {
            fg: gem_color(kind).scaled(step, 4),
            bg: BOARD_BG,
            bold: step == 4,
            dim: step < 2,
        };
        self.fill_cell(fb, l, c, gem_glyph(kind), style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        hud: &HudView,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        l: &BoardLayout,
    ) {
        let panel_x = l.start_x.saturating_add(l.frame_w).saturating_add(2);
        if panel_x >= viewport.width {
            return;
        }
        let panel_w = viewport.width - panel_x;
        if panel_w < 10 {
            return;
        }

        let label = CellStyle {
            fg: Rgb::new(220, 220, 220),
            bg: Rgb::new(0, 0, 0),
            bold: true,
            dim: false,
        };
        let value = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));

        let mut y = l.start_y;
        for (name, v) in [
            ("SCORE", hud.score),
            ("HIGH", hud.high_score),
            ("LEVEL", hud.level),
        ] {
            fb.put_str(panel_x, y, name, label);
            y = y.saturating_add(1);
            fb.put_u32(panel_x, y, v, value);
            y = y.saturating_add(2);
        }

        fb.put_str(panel_x, y, "COMBO", label);
        y = y.saturating_add(1);
        fb.put_char(panel_x, y, 'x', value);
        fb.put_u32(panel_x + 1, y, hud.combo, value);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "AI", label);
        y = y.saturating_add(1);
        match adapter {
            Some(st) if st.enabled => {
                fb.put_str(panel_x, y, "ON", value);
                y = y.saturating_add(1);
                fb.put_str(panel_x, y, "C", value);
                fb.put_u32(panel_x + 2, y, u32::from(st.client_count), value);
                y = y.saturating_add(1);
                fb.put_str(panel_x, y, "CTRL", value);
                match st.controller_id {
                    Some(id) => fb.put_u32(panel_x + 5, y, id as u32, value),
                    None => fb.put_str(panel_x + 5, y, "-", value),
                }
            }
            _ => fb.put_str(panel_x, y, "OFF", value),
        }

        if hud.debug {
            y = y.saturating_add(2);
            let warn = CellStyle {
                fg: Rgb::new(255, 120, 120),
                ..value
            };
            fb.put_str(panel_x, y, "DEBUG", warn);
        }
    }

    fn draw_overlay_text(&self, fb: &mut FrameBuffer, l: &BoardLayout, text: &str) {
        let mid_y = l.start_y.saturating_add(l.frame_h / 2);
        let style = CellStyle {
            fg: Rgb::new(255, 255, 255),
            bg: Rgb::new(0, 0, 0),
            bold: true,
            dim: false,
        };
        fb.put_str_centered(l.start_x, l.frame_w, mid_y, text, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EngineState;

    fn snapshot(cells: Vec<Vec<u8>>) -> BoardSnapshot {
        BoardSnapshot {
            width: cells[0].len() as u8,
            height: cells.len() as u8,
            cells,
            state: EngineState::Idle,
            selected: None,
            board_id: 1,
            halted: false,
        }
    }

    #[test]
    fn test_every_gem_kind_looks_distinct() {
        let kinds = 1..=MAX_GEM_COUNT;
        let glyphs: std::collections::HashSet<char> = kinds.clone().map(gem_glyph).collect();
        let colors: Vec<Rgb> = kinds.map(gem_color).collect();
        assert_eq!(glyphs.len(), usize::from(MAX_GEM_COUNT));
        for (i, c) in colors.iter().enumerate() {
            assert!(!colors[i + 1..].contains(c));
        }
    }

    #[test]
    fn test_mapper_matches_drawn_cells() {
        let view = GameView::default();
        let vp = Viewport::new(40, 12);
        let snap = snapshot(vec![vec![1, 2, 3], vec![4, 5, 6]]);
        let fb = view.render(&snap, &HudView::default(), vp);

        let mapper = view.mapper(vp, 3, 2);
        let (x, y) = mapper.board_to_screen(Coord::new(2, 1)).unwrap();
        assert_eq!(fb.get(x, y).unwrap().ch, gem_glyph(6));
        assert_eq!(mapper.screen_to_board(x + 1, y), Coord::new(2, 1));
    }

    #[test]
    fn test_panel_shows_score() {
        let view = GameView::default();
        let vp = Viewport::new(60, 12);
        let snap = snapshot(vec![vec![1, 2, 3], vec![4, 5, 6]]);
        let hud = HudView {
            score: 4321,
            ..HudView::default()
        };
        let fb = view.render(&snap, &hud, vp);
        let text: String = (0..fb.height()).map(|y| fb.row_text(y)).collect();
        assert!(text.contains("SCORE"));
        assert!(text.contains("4321"));
    }

    #[test]
    fn test_halted_overlay() {
        let view = GameView::default();
        let vp = Viewport::new(60, 12);
        let mut snap = snapshot(vec![vec![1; 8]; 4]);
        snap.halted = true;
        let fb = view.render(&snap, &HudView::default(), vp);
        let text: String = (0..fb.height()).map(|y| fb.row_text(y)).collect();
        assert!(text.contains("JAMMED"));
    }

    #[test]
    fn test_tiny_viewport_does_not_panic() {
        let view = GameView::default();
        let snap = snapshot(vec![vec![1; 14]; 20]);
        let _ = view.render(&snap, &HudView::default(), Viewport::new(3, 2));
    }
}
