/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The plane is drawn in canvas coordinates scaled to whatever terminal
/// size is current, so one cell covers `bounds / (cols, rows)` units.

use std::f32::consts::FRAC_PI_4;
use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::ai::Mode;
use crate::domain::entity::{Entity, Obstacle};
use crate::domain::vision::is_within_cone;
use crate::sim::driver::RenderSink;
use crate::sim::world::WorldState;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every "empty" cell. Using the same RGB
    /// for `Clear` and for cells keeps inter-row gaps the same color.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer: differs from any real cell.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Replace the glyph, keep whatever background is already there.
    fn set_glyph(&mut self, x: usize, y: usize, ch: char, fg: Color) {
        let bg = self.get(x, y).bg;
        self.set(x, y, Cell::new(ch, fg, bg));
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width { break; }
            self.set(cx, y, Cell::new(ch, fg, bg));
            cx += 1;
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Layout ──

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 1;
/// HUD above the map, message and help rows below it.
const RESERVED_ROWS: usize = 3;
const GRID_SPACING: f32 = 50.0;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const GRID_FG: Color = Color::Rgb { r: 45, g: 45, b: 62 };
const CONE_SEEN_BG: Color = Color::Rgb { r: 90, g: 30, b: 30 };
const CONE_IDLE_BG: Color = Color::Rgb { r: 60, g: 55, b: 25 };
const HUMAN_FG: Color = Color::Rgb { r: 80, g: 200, b: 255 };
const AI_FG: Color = Color::Rgb { r: 255, g: 80, b: 80 };

/// Mapping between canvas units and map cells.
#[derive(Clone, Copy, Debug)]
struct Viewport {
    cols: usize,
    rows: usize,
    /// Canvas units per column / per row.
    sx: f32,
    sy: f32,
}

impl Viewport {
    fn fit(w: &WorldState, term_w: usize, term_h: usize) -> Option<Self> {
        let rows = term_h.saturating_sub(RESERVED_ROWS);
        if term_w == 0 || rows == 0 {
            return None;
        }
        Some(Viewport {
            cols: term_w,
            rows,
            sx: w.bounds.width.max(1.0) / term_w as f32,
            sy: w.bounds.height.max(1.0) / rows as f32,
        })
    }

    /// Canvas point at the center of a map cell.
    fn to_world(&self, col: usize, row: usize) -> (f32, f32) {
        ((col as f32 + 0.5) * self.sx, (row as f32 + 0.5) * self.sy)
    }

    /// Map cell (col, buffer row) holding a canvas point, if on screen.
    fn to_cell(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        if !(x >= 0.0 && y >= 0.0) {
            return None;
        }
        let col = (x / self.sx) as usize;
        let row = (y / self.sy) as usize;
        if col < self.cols && row < self.rows {
            Some((col, MAP_ROW + row))
        } else {
            None
        }
    }

    /// Does a grid line pass through this column / row?
    fn crosses_grid(lo: f32, hi: f32) -> bool {
        (lo / GRID_SPACING).floor() != (hi / GRID_SPACING).floor()
    }
}

/// `#rrggbb` or a handful of CSS-style names. Anything else draws grey.
fn parse_color(s: &str) -> Color {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() == 6 {
            if let Ok(v) = u32::from_str_radix(hex, 16) {
                return Color::Rgb {
                    r: (v >> 16) as u8,
                    g: (v >> 8) as u8,
                    b: v as u8,
                };
            }
        }
        return Color::DarkGrey;
    }
    match s.to_lowercase().as_str() {
        "red" => Color::Rgb { r: 200, g: 50, b: 50 },
        "green" => Color::Rgb { r: 50, g: 170, b: 70 },
        "blue" => Color::Rgb { r: 60, g: 90, b: 210 },
        "yellow" => Color::Rgb { r: 220, g: 200, b: 60 },
        "orange" => Color::Rgb { r: 230, g: 140, b: 40 },
        "purple" => Color::Rgb { r: 140, g: 70, b: 180 },
        "white" => Color::Rgb { r: 230, g: 230, b: 230 },
        "black" => Color::Rgb { r: 10, g: 10, b: 10 },
        "gray" | "grey" => Color::Rgb { r: 110, g: 110, b: 120 },
        "brown" => Color::Rgb { r: 130, g: 85, b: 45 },
        _ => Color::DarkGrey,
    }
}

/// Scale an RGB color; named colors pass through.
fn shade(c: Color, factor: f32) -> Color {
    match c {
        Color::Rgb { r, g, b } => {
            let f = |v: u8| (v as f32 * factor).clamp(0.0, 255.0) as u8;
            Color::Rgb { r: f(r), g: f(g), b: f(b) }
        }
        other => other,
    }
}

fn obstacle_color(o: &Obstacle) -> Color {
    let base = parse_color(&o.color);
    match o.pulse {
        Some(p) => shade(base, 0.8 + 0.2 * p.sin()),
        None => base,
    }
}

/// Arrow glyph for a facing angle (canvas y grows downward).
fn facing_arrow(angle: f32) -> char {
    const ARROWS: [char; 8] = ['→', '↘', '↓', '↙', '←', '↖', '↑', '↗'];
    let octant = (angle / FRAC_PI_4).round() as i32;
    ARROWS[octant.rem_euclid(8) as usize]
}

// ── Compose: build a frame from world state ──

fn compose_scene(buf: &mut FrameBuffer, w: &WorldState) {
    buf.clear();
    compose_hud(buf, w);

    if let Some(vp) = Viewport::fit(w, buf.width, buf.height) {
        compose_plane(buf, w, &vp);
        for entity in w.entities() {
            compose_entity(buf, &vp, &entity);
        }
        compose_footer(buf, w, &vp);
        if w.paused {
            compose_pause_overlay(buf, &vp);
        }
    }
}

fn compose_hud(buf: &mut FrameBuffer, w: &WorldState) {
    let status = if w.modes.iter().any(|m| *m == Mode::Hold) {
        "CONTACT"
    } else if w.any_sighting() {
        "SPOTTED"
    } else {
        "PATROL"
    };
    let mode = w.modes.first().map(|m| format!("{m:?}")).unwrap_or_default();
    let hud = format!(
        " Tick:{:<7}  AI:{}  Mode:{:<6}  {} ",
        w.tick, w.pursuers.len(), mode, status,
    );
    buf.fill_row(HUD_ROW, HUD_BG);
    let fg = if status == "PATROL" { Color::White } else { AI_FG };
    buf.put_str(0, HUD_ROW, &hud, fg, HUD_BG);
}

/// Grid lines, vision wedges and obstacles, one pass over the map cells.
fn compose_plane(buf: &mut FrameBuffer, w: &WorldState, vp: &Viewport) {
    for row in 0..vp.rows {
        let (top, bottom) = (row as f32 * vp.sy, (row + 1) as f32 * vp.sy);
        let h_line = Viewport::crosses_grid(top, bottom);

        for col in 0..vp.cols {
            let (left, right) = (col as f32 * vp.sx, (col + 1) as f32 * vp.sx);
            let v_line = Viewport::crosses_grid(left, right);
            let (x, y) = vp.to_world(col, row);

            let ch = match (h_line, v_line) {
                (true, true) => '┼',
                (true, false) => '─',
                (false, true) => '│',
                _ => ' ',
            };

            let mut bg = Cell::BASE_BG;
            for (p, v) in w.pursuers.iter().zip(&w.visions) {
                if is_within_cone(p.body.pos(), Some(p.rotation), (x, y), v.cone_angle, v.vision_distance) {
                    bg = if v.can_see_player { CONE_SEEN_BG } else { CONE_IDLE_BG };
                }
            }

            if let Some(o) = w.obstacles.iter().find(|o| o.contains(x, y)) {
                buf.set(col, MAP_ROW + row, Cell::new(' ', Color::White, obstacle_color(o)));
            } else {
                buf.set(col, MAP_ROW + row, Cell::new(ch, GRID_FG, bg));
            }
        }
    }
}

fn compose_entity(buf: &mut FrameBuffer, vp: &Viewport, entity: &Entity<'_>) {
    let body = entity.body();
    let base = match entity {
        Entity::Human(_) => HUMAN_FG,
        Entity::Ai(_) => AI_FG,
    };
    let fg = shade(base, 0.8 + 0.2 * body.pulse.sin());

    // Disc: every cell whose center lies inside the radius, plus the center cell
    let r = body.size;
    let col_lo = ((body.x - r) / vp.sx).floor().max(0.0) as usize;
    let col_hi = ((body.x + r) / vp.sx).ceil() as usize;
    let row_lo = ((body.y - r) / vp.sy).floor().max(0.0) as usize;
    let row_hi = ((body.y + r) / vp.sy).ceil() as usize;
    for row in row_lo..row_hi.min(vp.rows) {
        for col in col_lo..col_hi.min(vp.cols) {
            let (cx, cy) = vp.to_world(col, row);
            if (cx - body.x).powi(2) + (cy - body.y).powi(2) <= r * r {
                buf.set_glyph(col, MAP_ROW + row, '█', fg);
            }
        }
    }
    let center = vp.to_cell(body.x, body.y);
    if let Some((col, row)) = center {
        buf.set_glyph(col, row, '█', fg);
    }

    // Facing indicator just outside the rim
    if let Some(angle) = entity.facing() {
        let reach = r + vp.sx.max(vp.sy);
        let tip = vp.to_cell(body.x + angle.cos() * reach, body.y + angle.sin() * reach);
        if let Some((col, row)) = tip {
            buf.set_glyph(col, row, facing_arrow(angle), Color::White);
        }
    }

    // Label above the disc
    if let Some((col, _)) = center {
        let label = entity.label();
        let top = ((body.y - r) / vp.sy).floor() as isize - 1;
        if top >= 0 && (top as usize) < vp.rows {
            let x = col.saturating_sub(label.len() / 2);
            for (i, ch) in label.chars().enumerate() {
                buf.set_glyph(x + i, MAP_ROW + top as usize, ch, Color::White);
            }
        }
    }
}

fn compose_footer(buf: &mut FrameBuffer, w: &WorldState, vp: &Viewport) {
    let msg_row = MAP_ROW + vp.rows;
    if !w.message.is_empty() {
        let bar = Color::Rgb { r: 200, g: 180, b: 50 };
        buf.fill_row(msg_row, bar);
        buf.put_str(0, msg_row, &format!(" ◈ {} ", w.message), Color::Black, bar);
    }

    let help = " WASD/Arrows:Move  P/F1:Pause  R:Restart  Q/Esc:Quit";
    buf.put_str(0, msg_row + 1, help, Color::DarkGrey, Color::Reset);
}

fn compose_pause_overlay(buf: &mut FrameBuffer, vp: &Viewport) {
    let dim = Color::Rgb { r: 40, g: 40, b: 40 };
    let hdr = Color::Rgb { r: 255, g: 220, b: 50 };
    let key_c = Color::Rgb { r: 100, g: 200, b: 255 };

    let box_w = 24_usize.min(vp.cols);
    let box_h = 7_usize.min(vp.rows);
    let box_x = vp.cols.saturating_sub(box_w) / 2;
    let box_y = MAP_ROW + vp.rows.saturating_sub(box_h) / 2;

    for y in box_y..box_y + box_h {
        for x in box_x..box_x + box_w {
            buf.set(x, y, Cell::new(' ', Color::Reset, dim));
        }
    }

    buf.put_str(box_x + 2, box_y + 1, "══  PAUSED  ══", hdr, dim);
    buf.put_str(box_x + 2, box_y + 3, "P/F1  Resume", key_c, dim);
    buf.put_str(box_x + 2, box_y + 4, "R     Restart", key_c, dim);
    buf.put_str(box_x + 2, box_y + 5, "Q     Quit", key_c, dim);
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        compose_scene(&mut self.front, world);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal default
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

impl RenderSink for Renderer {
    /// A surface exists when the terminal reports a non-zero size.
    fn is_ready(&mut self) -> bool {
        matches!(terminal::size(), Ok((w, h)) if w > 0 && h > 0)
    }

    fn draw(&mut self, world: &WorldState) -> io::Result<()> {
        self.render(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn row_text(buf: &FrameBuffer, y: usize) -> String {
        (0..buf.width).map(|x| buf.get(x, y).ch).collect()
    }

    fn composed(w: &WorldState) -> FrameBuffer {
        let mut buf = FrameBuffer::new(80, 27);
        compose_scene(&mut buf, w);
        buf
    }

    fn default_world() -> WorldState {
        WorldState::new(&GameConfig::default())
    }

    #[test]
    fn hud_shows_tick_and_patrol() {
        let mut w = default_world();
        w.tick = 42;
        let buf = composed(&w);
        let hud = row_text(&buf, HUD_ROW);
        assert!(hud.contains("Tick:42"));
        assert!(hud.contains("PATROL"));
    }

    #[test]
    fn hud_reports_sighting() {
        let mut w = default_world();
        w.visions[0].can_see_player = true;
        assert!(row_text(&composed(&w), HUD_ROW).contains("SPOTTED"));
    }

    #[test]
    fn entities_land_on_their_cells() {
        let w = default_world();
        let buf = composed(&w);
        let vp = Viewport::fit(&w, buf.width, buf.height).unwrap();
        for pos in [w.human.body.pos(), w.pursuers[0].body.pos()] {
            let (col, row) = vp.to_cell(pos.0, pos.1).unwrap();
            assert_eq!(buf.get(col, row).ch, '█');
        }
    }

    #[test]
    fn cone_tints_cells_ahead_of_pursuer() {
        let w = default_world();
        let buf = composed(&w);
        let vp = Viewport::fit(&w, buf.width, buf.height).unwrap();
        // Default pursuer faces left from (700, 300)
        let (col, row) = vp.to_cell(560.0, 300.0).unwrap();
        assert_eq!(buf.get(col, row).bg, CONE_IDLE_BG);
        let (col, row) = vp.to_cell(780.0, 300.0).unwrap();
        assert_ne!(buf.get(col, row).bg, CONE_IDLE_BG);
    }

    #[test]
    fn obstacles_fill_with_their_color() {
        let w = default_world();
        let buf = composed(&w);
        let vp = Viewport::fit(&w, buf.width, buf.height).unwrap();
        let o = &w.obstacles[0];
        let (col, row) = vp.to_cell(o.x, o.y).unwrap();
        assert_eq!(buf.get(col, row).bg, obstacle_color(o));
    }

    #[test]
    fn pause_overlay_drawn_when_paused() {
        let mut w = default_world();
        w.paused = true;
        let buf = composed(&w);
        assert!((0..buf.height).any(|y| row_text(&buf, y).contains("PAUSED")));
    }

    #[test]
    fn tiny_terminal_only_gets_hud() {
        let w = default_world();
        let mut buf = FrameBuffer::new(40, 2);
        compose_scene(&mut buf, &w);
        assert!(row_text(&buf, HUD_ROW).contains("Tick"));
    }

    #[test]
    fn colors_parse() {
        assert_eq!(parse_color("#ff8000"), Color::Rgb { r: 255, g: 128, b: 0 });
        assert_eq!(parse_color("Red"), Color::Rgb { r: 200, g: 50, b: 50 });
        assert_eq!(parse_color("#zzzzzz"), Color::DarkGrey);
        assert_eq!(parse_color("mauve"), Color::DarkGrey);
    }

    #[test]
    fn arrows_follow_canvas_axes() {
        use std::f32::consts::{FRAC_PI_2, PI};
        assert_eq!(facing_arrow(0.0), '→');
        assert_eq!(facing_arrow(FRAC_PI_2), '↓');
        assert_eq!(facing_arrow(-FRAC_PI_2), '↑');
        assert_eq!(facing_arrow(PI), '←');
    }
}
