//! GameView: maps a `core::GameSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.
//!
//! The world is laid out in logical pixels on a 1000x700 canvas. Each
//! terminal column covers 10 px and each row 20 px, so the whole canvas fits
//! a 100x35 terminal. Larger terminals center the canvas; smaller ones clip
//! it.

use unicode_width::UnicodeWidthStr;

use crate::core::{layout, GameSnapshot, Line, Placement};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{
    Focus, Npc, Prop, Rect, TextColor, INSTRUCTIONS, INVENTORY_BOX, INVENTORY_KEY_CENTER,
    LINE_HEIGHT, SCREEN_HEIGHT, SCREEN_WIDTH, SPRITE_PX, STORY_TIP_Y, TEXT_BOX, TEXT_MAX_WIDTH,
    TEXT_START_Y, TEXT_X,
};

const BACKGROUND: Rgb = Rgb::new(191, 180, 214);
const PANEL: Rgb = Rgb::new(214, 201, 240);
const WALL_COLOR: Rgb = Rgb::new(154, 146, 173);

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

/// A lightweight terminal renderer for the bear game.
pub struct GameView {
    /// Logical pixels per terminal column.
    px_per_col: i32,
    /// Logical pixels per terminal row.
    px_per_row: i32,
}

impl Default for GameView {
    fn default() -> Self {
        // Terminal glyphs are roughly twice as tall as they are wide.
        Self::new(10, 20)
    }
}

/// Canvas origin inside the viewport, in cells.
#[derive(Debug, Clone, Copy)]
struct Origin {
    col: i32,
    row: i32,
}

impl GameView {
    pub fn new(px_per_col: i32, px_per_row: i32) -> Self {
        Self {
            px_per_col: px_per_col.max(1),
            px_per_row: px_per_row.max(1),
        }
    }

    /// Canvas size in cells.
    pub fn canvas_cells(&self) -> (u16, u16) {
        let cols = ceil_div(SCREEN_WIDTH, self.px_per_col);
        let rows = ceil_div(SCREEN_HEIGHT, self.px_per_row);
        (cols as u16, rows as u16)
    }

    /// Rendered width of `text` in logical pixels.
    pub fn measure(&self, text: &str) -> u32 {
        text.width() as u32 * self.px_per_col as u32
    }

    /// Render a snapshot into an existing framebuffer.
    ///
    /// This is the hot path. Callers reuse one framebuffer across frames and
    /// it is only resized when the terminal size changes.
    pub fn render_into(&self, snap: &GameSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::new(Rgb::new(0, 0, 0), Rgb::new(0, 0, 0)).cell(' '));

        let (cols, rows) = self.canvas_cells();
        let origin = Origin {
            col: i32::from(viewport.width.saturating_sub(cols) / 2),
            row: i32::from(viewport.height.saturating_sub(rows) / 2),
        };

        let bg = CellStyle::new(Rgb::new(0, 0, 0), BACKGROUND);
        self.fill_px(fb, origin, Rect::new(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT), bg);
        self.text_px(fb, origin, 0, 0, INSTRUCTIONS, bg);

        let wall = CellStyle::new(WALL_COLOR, WALL_COLOR);
        for w in &snap.walls {
            self.fill_px(fb, origin, *w, wall);
        }

        let focus = snap.focus;
        self.draw_block(
            fb,
            origin,
            Prop::Tree.rect(),
            if snap.tree_climbed { "TREE*" } else { "TREE" },
            Rgb::new(46, 110, 52),
            focus == Some(Focus::Prop(Prop::Tree)),
        );
        self.draw_block(
            fb,
            origin,
            Prop::Lock.rect(),
            if snap.lock_open { "OPEN" } else { "LOCK" },
            Rgb::new(120, 110, 100),
            focus == Some(Focus::Prop(Prop::Lock)),
        );
        for npc in Npc::ALL {
            self.draw_block(
                fb,
                origin,
                npc.rect(),
                npc.label(),
                npc_color(npc),
                focus == Some(Focus::Npc(npc)),
            );
        }
        self.draw_block(fb, origin, snap.player, "BEAR", Rgb::new(120, 72, 36), true);

        self.draw_text_box(fb, origin, snap);
        self.draw_inventory(fb, origin, snap);
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    /// Lay out the text box body the way it is drawn.
    ///
    /// Returns only the visible placements: when a block is taller than the
    /// box its newest lines are kept and moved up to the first body row. A
    /// footer takes the rows it wraps to at the bottom of the box.
    pub fn text_box_lines(&self, body: &[Line], footer: Option<&Line>) -> Vec<Placement> {
        let out = layout(
            body,
            (TEXT_X, TEXT_START_Y),
            LINE_HEIGHT,
            TEXT_MAX_WIDTH,
            |s, _| self.measure(s),
        );

        let first_row = self.row_of(TEXT_START_Y);
        let end_row = match footer.and_then(|f| self.footer_lines(f).first().map(|p| p.y)) {
            Some(y) => self.row_of(y),
            None => self.row_of(TEXT_BOX.bottom() - 1) + 1,
        };
        let visible = (end_row - first_row).max(0) as usize;

        let mut placements = out.placements;
        let hidden = placements.len().saturating_sub(visible);
        placements.drain(..hidden);
        let shift = hidden as i32 * LINE_HEIGHT;
        for p in &mut placements {
            p.y -= shift;
        }
        placements
    }

    /// Wrap a footer to the text box width with its last line on the tip row.
    pub fn footer_lines(&self, footer: &Line) -> Vec<Placement> {
        let out = layout(
            std::slice::from_ref(footer),
            (TEXT_X, STORY_TIP_Y),
            LINE_HEIGHT,
            TEXT_MAX_WIDTH,
            |s, _| self.measure(s),
        );
        let mut placements = out.placements;
        let shift = (placements.len() as i32 - 1).max(0) * LINE_HEIGHT;
        for p in &mut placements {
            p.y -= shift;
        }
        placements
    }

    fn draw_text_box(&self, fb: &mut FrameBuffer, origin: Origin, snap: &GameSnapshot) {
        let panel = CellStyle::new(Rgb::new(0, 0, 0), PANEL);
        self.fill_px(fb, origin, TEXT_BOX, panel);
        self.text_px(
            fb,
            origin,
            TEXT_BOX.x,
            TEXT_BOX.y,
            snap.title,
            text_style(TextColor::Red, PANEL),
        );

        let footer = snap.footer.as_ref();
        let footer_lines = footer.map(|f| self.footer_lines(f)).unwrap_or_default();
        for p in self.text_box_lines(&snap.body, footer).iter().chain(&footer_lines) {
            self.text_px(fb, origin, p.x, p.y, &p.text, text_style(p.color, PANEL));
        }
    }

    fn draw_inventory(&self, fb: &mut FrameBuffer, origin: Origin, snap: &GameSnapshot) {
        let panel = CellStyle::new(Rgb::new(0, 0, 0), PANEL);
        self.fill_px(fb, origin, INVENTORY_BOX, panel);
        self.text_px(
            fb,
            origin,
            INVENTORY_BOX.x,
            INVENTORY_BOX.y,
            "INVENTORY:",
            text_style(TextColor::Red, PANEL),
        );
        if snap.key_in_inventory {
            let key = Rect::from_center(INVENTORY_KEY_CENTER, SPRITE_PX, SPRITE_PX);
            self.draw_block(fb, origin, key, "KEY", Rgb::new(212, 175, 55), false);
        }
    }

    /// A filled sprite rect with its label centered.
    fn draw_block(
        &self,
        fb: &mut FrameBuffer,
        origin: Origin,
        rect: Rect,
        label: &str,
        color: Rgb,
        highlight: bool,
    ) {
        let fill = CellStyle::new(Rgb::new(255, 255, 255), color);
        self.fill_px(fb, origin, rect, fill);

        let (c0, r0, c1, r1) = self.cells_of(rect);
        let label_w = label.width() as i32;
        let col = c0 + ((c1 - c0) - label_w).max(0) / 2;
        let row = r0 + (r1 - r0 - 1) / 2;
        let style = if highlight { fill.bold() } else { fill };
        put_str_clipped(fb, origin.col + col, origin.row + row, label, style);
    }

    /// Column/row span `[c0, c1) x [r0, r1)` covering a pixel rect.
    fn cells_of(&self, rect: Rect) -> (i32, i32, i32, i32) {
        (
            rect.left().div_euclid(self.px_per_col),
            self.row_of(rect.top()),
            ceil_div(rect.right(), self.px_per_col),
            ceil_div(rect.bottom(), self.px_per_row),
        )
    }

    fn row_of(&self, y: i32) -> i32 {
        y.div_euclid(self.px_per_row)
    }

    fn fill_px(&self, fb: &mut FrameBuffer, origin: Origin, rect: Rect, style: CellStyle) {
        let (c0, r0, c1, r1) = self.cells_of(rect);
        let clip = |v: i32| u16::try_from(v.max(0)).unwrap_or(u16::MAX);
        fb.fill_rect(
            clip(origin.col + c0),
            clip(origin.row + r0),
            clip(origin.col + c1),
            clip(origin.row + r1),
            style.cell(' '),
        );
    }

    fn text_px(
        &self,
        fb: &mut FrameBuffer,
        origin: Origin,
        x: i32,
        y: i32,
        s: &str,
        style: CellStyle,
    ) {
        let col = origin.col + x.div_euclid(self.px_per_col);
        let row = origin.row + self.row_of(y);
        put_str_clipped(fb, col, row, s, style);
    }
}

fn put_str_clipped(fb: &mut FrameBuffer, col: i32, row: i32, s: &str, style: CellStyle) {
    if col < 0 {
        return;
    }
    if let Some((x, y)) = to_cell(fb, col, row) {
        fb.put_str(x, y, s, style);
    }
}

fn to_cell(fb: &FrameBuffer, col: i32, row: i32) -> Option<(u16, u16)> {
    let x = u16::try_from(col).ok()?;
    let y = u16::try_from(row).ok()?;
    (x < fb.width() && y < fb.height()).then_some((x, y))
}

fn ceil_div(a: i32, b: i32) -> i32 {
    (a + b - 1).div_euclid(b)
}

fn npc_color(npc: Npc) -> Rgb {
    match npc {
        Npc::PolarBear => Rgb::new(150, 170, 190),
        Npc::Robot => Rgb::new(90, 100, 120),
        Npc::Fox => Rgb::new(210, 105, 30),
        Npc::Moose => Rgb::new(110, 75, 45),
    }
}

fn text_style(color: TextColor, bg: Rgb) -> CellStyle {
    let fg = match color {
        TextColor::Black => Rgb::new(0, 0, 0),
        TextColor::Blue => Rgb::new(20, 40, 200),
        TextColor::Red => Rgb::new(200, 20, 20),
    };
    let style = CellStyle::new(fg, bg);
    if color == TextColor::Red {
        style.bold()
    } else {
        style
    }
}
