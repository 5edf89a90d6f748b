use crate::config::Settings;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Colors, Print, ResetColor, SetColors},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use exoplanet_orrery::units::seconds_to_days;
use exoplanet_orrery::{BodyView, MassBody, Point, System};
use std::f64::consts::TAU;
use std::io::{self, Write};
use std::ops::Range;

/// Width of the info panel on the right, in cells.
pub(crate) const HUD_W: u16 = 32;

/// Dots with less alpha than this stay blank.
const INK_ALPHA: u8 = 32;

const STAR_INK: Pixel = Pixel::rgba(255, 214, 90, 255);
const PLANET_INK: Pixel = Pixel::rgba(226, 92, 226, 255);
const SELECTED_INK: Pixel = Pixel::rgba(255, 255, 255, 255);
const ORBIT_INK: Pixel = Pixel::rgba(70, 110, 230, 150);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Cell {
    const fn blank(bg: Color) -> Self {
        Self { ch: ' ', fg: Color::White, bg }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank(Color::Black)
    }
}

/// Row-major grid of terminal cells.
pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self { w, h, cells: vec![Cell::default(); w as usize * h as usize] }
    }

    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        y as usize * self.w as usize + x as usize
    }

    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }

    fn row(&self, y: u16) -> &[Cell] {
        let start = self.idx(0, y);
        &self.cells[start..start + self.w as usize]
    }

    pub(crate) fn clear(&mut self, bg: Color) {
        self.cells.fill(Cell::blank(bg));
    }

    fn fill_rect(&mut self, x0: u16, y0: u16, w: u16, h: u16, bg: Color) {
        for y in y0..y0.saturating_add(h).min(self.h) {
            for x in x0..x0.saturating_add(w).min(self.w) {
                self.set(x, y, Cell::blank(bg));
            }
        }
    }
}

/// Straight-alpha RGBA.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Pixel {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl Pixel {
    pub(crate) const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    fn is_ink(self) -> bool {
        self.a >= INK_ALPHA
    }

    /// `self` composited over `dst`.
    fn over(self, dst: Pixel) -> Pixel {
        let sa = self.a as f64 / 255.0;
        let da = dst.a as f64 / 255.0 * (1.0 - sa);
        let a = sa + da;
        if a <= 0.0 {
            return Pixel::default();
        }
        let mix = |s: u8, d: u8| ((s as f64 * sa + d as f64 * da) / a).round().clamp(0.0, 255.0) as u8;
        Pixel {
            r: mix(self.r, dst.r),
            g: mix(self.g, dst.g),
            b: mix(self.b, dst.b),
            a: (a * 255.0).round().clamp(0.0, 255.0) as u8,
        }
    }
}

/// Braille dot canvas. One dot is one kernel pixel.
pub(crate) struct PixelCanvas {
    pub(crate) w: u32,
    pub(crate) h: u32,
    pub(crate) px: Vec<Pixel>,
}

impl PixelCanvas {
    pub(crate) fn new(w: u32, h: u32) -> Self {
        Self { w, h, px: vec![Pixel::default(); w as usize * h as usize] }
    }

    pub(crate) fn clear(&mut self, p: Pixel) {
        self.px.fill(p);
    }

    fn slot(&self, x: i64, y: i64) -> Option<usize> {
        (x >= 0 && y >= 0 && x < self.w as i64 && y < self.h as i64)
            .then(|| y as usize * self.w as usize + x as usize)
    }

    fn get(&self, x: u32, y: u32) -> Option<Pixel> {
        self.slot(x as i64, y as i64).map(|i| self.px[i])
    }

    fn put(&mut self, x: i64, y: i64, ink: Pixel) {
        if let Some(i) = self.slot(x, y) {
            self.px[i] = ink.over(self.px[i]);
        }
    }

    pub(crate) fn plot(&mut self, p: Point, ink: Pixel) {
        if p.x.is_finite() && p.y.is_finite() {
            self.put(p.x.floor() as i64, p.y.floor() as i64, ink);
        }
    }

    /// Filled disk. Anything smaller than a dot still shows as one.
    pub(crate) fn disk(&mut self, c: Point, r: f64, ink: Pixel) {
        if r < 1.0 {
            self.plot(c, ink);
            return;
        }
        let x0 = (c.x - r).floor().max(0.0);
        let x1 = (c.x + r).ceil().min(self.w as f64);
        let y0 = (c.y - r).floor().max(0.0);
        let y1 = (c.y + r).ceil().min(self.h as f64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let r2 = r * r;
        for y in y0 as i64..y1 as i64 {
            for x in x0 as i64..x1 as i64 {
                let dx = x as f64 + 0.5 - c.x;
                let dy = y as f64 + 0.5 - c.y;
                if dx * dx + dy * dy <= r2 {
                    self.put(x, y, ink);
                }
            }
        }
    }

    /// Circle outline around `c`. Rings that never cross the canvas are
    /// skipped, and the step count is capped for very large radii.
    pub(crate) fn ring(&mut self, c: Point, r: f64, ink: Pixel) {
        if !(r >= 0.5) || !self.ring_visible(c, r) {
            return;
        }
        let steps = (TAU * r).clamp(24.0, 8192.0) as usize;
        let mut last = None;
        for s in 0..steps {
            let a = TAU * s as f64 / steps as f64;
            let x = (c.x + r * a.cos()).floor() as i64;
            let y = (c.y + r * a.sin()).floor() as i64;
            if last == Some((x, y)) {
                continue;
            }
            last = Some((x, y));
            self.put(x, y, ink);
        }
    }

    fn ring_visible(&self, c: Point, r: f64) -> bool {
        let (w, h) = (self.w as f64, self.h as f64);
        // nearest and farthest canvas points from the ring center
        let nx = c.x.clamp(0.0, w) - c.x;
        let ny = c.y.clamp(0.0, h) - c.y;
        let near = (nx * nx + ny * ny).sqrt();
        let fx = c.x.max(w - c.x);
        let fy = c.y.max(h - c.y);
        let far = (fx * fx + fy * fy).sqrt();
        r + 1.0 >= near && r - 1.0 <= far
    }
}

/// Raw-mode alternate screen with mouse capture. `cur` is drawn into each
/// frame; `prev` mirrors what the terminal already shows.
pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
    pub(crate) canvas: PixelCanvas,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            DisableLineWrap,
            Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        let mut term = Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
            canvas: PixelCanvas::new(cols as u32 * 2, rows as u32 * 4),
        };
        term.invalidate();
        Ok(term)
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (cols, rows) = terminal::size()?;
        if (cols, rows) == (self.cols, self.rows) {
            return Ok(false);
        }
        self.cols = cols;
        self.rows = rows;
        self.prev = CellBuffer::new(cols, rows);
        self.cur = CellBuffer::new(cols, rows);
        self.canvas = PixelCanvas::new(cols as u32 * 2, rows as u32 * 4);
        self.invalidate();
        queue!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    /// Force the next `present` to repaint every cell.
    fn invalidate(&mut self) {
        self.prev.cells.fill(Cell { ch: '\0', ..Cell::default() });
    }

    /// Cells to the left of the HUD.
    pub(crate) fn map_cols(&self) -> u16 {
        self.cols.saturating_sub(hud_width(self.cols))
    }

    /// Write the cells that changed since the last frame, one cursor move
    /// per changed run.
    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;
        let mut pen: Option<(Color, Color)> = None;
        for y in 0..self.rows {
            let cur = self.cur.row(y);
            for run in changed_runs(self.prev.row(y), cur) {
                queue!(self.out, cursor::MoveTo(run.start as u16, y))?;
                for c in &cur[run] {
                    if pen != Some((c.fg, c.bg)) {
                        queue!(self.out, SetColors(Colors::new(c.fg, c.bg)))?;
                        pen = Some((c.fg, c.bg));
                    }
                    queue!(self.out, Print(c.ch))?;
                }
            }
        }
        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

fn changed_runs(prev: &[Cell], cur: &[Cell]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, (old, new)) in prev.iter().zip(cur).enumerate() {
        match (old != new, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push(s..i);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(s..cur.len());
    }
    runs
}

pub(crate) fn hud_width(cols: u16) -> u16 {
    HUD_W.min(cols / 2)
}

/// Terminal cell to the braille dot at its middle.
pub(crate) fn cell_to_dot(col: u16, row: u16) -> Point {
    Point::new(col as f64 * 2.0 + 1.0, row as f64 * 4.0 + 2.0)
}

/// Bit for dot `[column][row]` of a braille cell (U+2800 block).
const BRAILLE_BITS: [[u8; 4]; 2] = [[0x01, 0x02, 0x04, 0x40], [0x08, 0x10, 0x20, 0x80]];

/// Pack every 2×4 block of dots into one braille cell, tinted with the
/// mean colour of its inked dots. Blocks with no ink are left untouched.
pub(crate) fn canvas_to_cells(canvas: &PixelCanvas, out: &mut CellBuffer, enable_color: bool, bg: Color) {
    for cy in 0..out.h {
        for cx in 0..out.w {
            let mut mask = 0u8;
            let mut rgb = [0u32; 3];
            let mut inked = 0u32;
            for (dx, column) in BRAILLE_BITS.iter().enumerate() {
                for (dy, bit) in column.iter().enumerate() {
                    let dot = canvas.get(cx as u32 * 2 + dx as u32, cy as u32 * 4 + dy as u32);
                    if let Some(p) = dot.filter(|p| p.is_ink()) {
                        mask |= bit;
                        rgb[0] += p.r as u32;
                        rgb[1] += p.g as u32;
                        rgb[2] += p.b as u32;
                        inked += 1;
                    }
                }
            }
            if inked == 0 {
                continue;
            }
            let ch = char::from_u32(0x2800 + u32::from(mask)).unwrap_or(' ');
            let fg = if enable_color {
                Color::Rgb {
                    r: (rgb[0] / inked) as u8,
                    g: (rgb[1] / inked) as u8,
                    b: (rgb[2] / inked) as u8,
                }
            } else {
                Color::White
            };
            out.set(cx, cy, Cell { ch, fg, bg });
        }
    }
}

/// Orbits first, then bodies on top. The selected body is drawn in white.
pub(crate) fn draw_system(canvas: &mut PixelCanvas, views: &[BodyView<'_>], settings: &Settings, selected: usize) {
    if settings.show_orbits {
        for v in views {
            if let Some((pole, r)) = v.orbit {
                canvas.ring(pole, r, ORBIT_INK);
            }
        }
    }
    for (i, v) in views.iter().enumerate() {
        let ink = if i == selected {
            SELECTED_INK
        } else if v.is_star {
            STAR_INK
        } else {
            PLANET_INK
        };
        canvas.disk(v.center, v.radius_px, ink);
    }
}

pub(crate) fn draw_labels(buf: &mut CellBuffer, views: &[BodyView<'_>], map_cols: u16, selected: usize) {
    let bg = Color::Black;
    for (i, v) in views.iter().enumerate() {
        let col = (v.center.x + v.radius_px) / 2.0 + 1.0;
        let row = v.center.y / 4.0;
        if !(col >= 0.0 && row >= 0.0 && col < map_cols as f64 && row < buf.h as f64) {
            continue;
        }
        let fg = if i == selected { Color::White } else { Color::DarkGrey };
        let room = map_cols.saturating_sub(col as u16) as usize;
        let label: String = v.name.chars().take(room).collect();
        draw_text(buf, col as u16, row as u16, &label, fg, bg);
    }
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(xx, y, Cell { ch, fg, bg });
    }
}

fn box_draw(buf: &mut CellBuffer, x0: u16, y0: u16, bw: u16, bh: u16, fg: Color, bg: Color) {
    if bw < 2 || bh < 2 {
        return;
    }
    let x1 = x0.saturating_add(bw - 1);
    let y1 = y0.saturating_add(bh - 1);
    let edge = |ch| Cell { ch, fg, bg };

    for x in x0 + 1..x1 {
        buf.set(x, y0, edge('─'));
        buf.set(x, y1, edge('─'));
    }
    for y in y0 + 1..y1 {
        buf.set(x0, y, edge('│'));
        buf.set(x1, y, edge('│'));
    }
    buf.set(x0, y0, edge('┌'));
    buf.set(x1, y0, edge('┐'));
    buf.set(x0, y1, edge('└'));
    buf.set(x1, y1, edge('┘'));
}

pub(crate) struct Hud<'a> {
    pub(crate) system: &'a System,
    pub(crate) warp: f64,
    pub(crate) paused: bool,
    pub(crate) sim_seconds: f64,
    pub(crate) inspected: Option<&'a MassBody>,
    pub(crate) hovering: bool,
}

const HELP: [&str; 7] = [
    "wasd/arrows  pan",
    "+ - wheel    zoom",
    "c center  p pause",
    "[ ] warp",
    "o orbits  l labels",
    "tab select",
    "q quit",
];

pub(crate) fn draw_hud(buf: &mut CellBuffer, hud: &Hud<'_>) {
    let bg = Color::Black;
    let fg = Color::White;
    let dim = Color::DarkGrey;
    let accent = Color::Yellow;

    let w = hud_width(buf.w);
    if w < 8 || buf.h < 4 {
        return;
    }
    let x0 = buf.w - w;
    buf.fill_rect(x0, 0, w, buf.h, bg);
    box_draw(buf, x0, 0, w, buf.h, dim, bg);

    let tx = x0 + 2;
    let max = (w - 4) as usize;
    let mut y = 1u16;
    let mut line = |buf: &mut CellBuffer, s: &str, fg: Color| {
        if y + 1 < buf.h {
            let clipped: String = s.chars().take(max).collect();
            draw_text(buf, tx, y, &clipped, fg, bg);
        }
        y += 1;
    };

    let sys = hud.system;
    line(buf, sys.name(), accent);
    line(buf, &format!("planets: {}", sys.planets().len()), fg);
    line(buf, &format!("scale: {:.0} dots/AU", sys.scale().px_per_au()), fg);
    line(buf, &format!("warp: x{}", hud.warp), fg);
    line(buf, &format!("elapsed: {:.2} d", seconds_to_days(hud.sim_seconds)), fg);
    line(buf, if hud.paused { "PAUSED" } else { "running" }, if hud.paused { accent } else { dim });
    line(buf, "", fg);

    if let Some(body) = hud.inspected {
        line(buf, if hud.hovering { "hover" } else { "selected" }, dim);
        for l in body.describe() {
            line(buf, &l, fg);
        }
        line(buf, "", fg);
    }

    let help_top = buf.h.saturating_sub(HELP.len() as u16 + 1);
    if help_top > y {
        for (i, h) in HELP.iter().enumerate() {
            let clipped: String = h.chars().take(max).collect();
            draw_text(buf, tx, help_top + i as u16, &clipped, dim, bg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inked(c: &PixelCanvas) -> usize {
        c.px.iter().filter(|p| p.is_ink()).count()
    }

    #[test]
    fn only_changed_runs_are_rewritten() {
        let blank = Cell::default();
        let dot = Cell { ch: '\u{2801}', ..blank };
        let prev = vec![blank; 8];
        let mut cur = prev.clone();
        assert!(changed_runs(&prev, &cur).is_empty());
        cur[1] = dot;
        cur[2] = dot;
        cur[5] = dot;
        cur[7] = dot;
        assert_eq!(changed_runs(&prev, &cur), vec![1..3, 5..6, 7..8]);
    }

    #[test]
    fn translucent_ink_blends_toward_the_background() {
        let base = Pixel::rgba(0, 0, 0, 255);
        let out = ORBIT_INK.over(base);
        assert_eq!(out.a, 255);
        assert!(out.b < ORBIT_INK.b && out.b > 0);
        assert_eq!(STAR_INK.over(base), STAR_INK);
        assert_eq!(Pixel::default().over(Pixel::default()), Pixel::default());
    }

    #[test]
    fn one_dot_per_braille_bit() {
        let mut canvas = PixelCanvas::new(4, 8);
        canvas.plot(Point::new(1.2, 3.9), STAR_INK);
        canvas.plot(Point::new(2.0, 4.0), STAR_INK);
        let mut buf = CellBuffer::new(2, 2);
        canvas_to_cells(&canvas, &mut buf, false, Color::Black);
        let ch = |x, y| buf.cells[buf.idx(x, y)].ch;
        assert_eq!(ch(0, 0), '\u{2880}');
        assert_eq!(ch(1, 1), '\u{2801}');
        assert_eq!(ch(1, 0), ' ');
    }

    #[test]
    fn tiny_disk_still_shows() {
        let mut canvas = PixelCanvas::new(10, 10);
        canvas.disk(Point::new(5.0, 5.0), 0.01, PLANET_INK);
        assert_eq!(inked(&canvas), 1);
        canvas.disk(Point::new(-50.0, 5.0), 3.0, PLANET_INK);
        assert_eq!(inked(&canvas), 1);
    }

    #[test]
    fn rings_outside_the_canvas_are_skipped() {
        let mut canvas = PixelCanvas::new(40, 40);
        // huge ring whose circumference never enters the canvas
        canvas.ring(Point::new(20.0, 20.0), 5_000.0, ORBIT_INK);
        assert_eq!(inked(&canvas), 0);
        canvas.ring(Point::new(500.0, 20.0), 10.0, ORBIT_INK);
        assert_eq!(inked(&canvas), 0);
        canvas.ring(Point::new(20.0, 20.0), 10.0, ORBIT_INK);
        assert!(inked(&canvas) > 20);
    }

    #[test]
    fn labels_are_clipped_at_the_map_edge() {
        use exoplanet_orrery::Rect;
        let view = |name, x| BodyView {
            name,
            is_star: false,
            center: Point::new(x, 8.0),
            radius_px: 0.5,
            bounds: Rect::centered(Point::new(x, 8.0), 1.0, 1.0),
            orbit: None,
        };
        let views = [view("Kepler-1 b", 10.0), view("hidden", 40.0)];
        let mut buf = CellBuffer::new(30, 4);
        draw_labels(&mut buf, &views, 12, 0);
        let row: String = buf.row(2).iter().map(|c| c.ch).collect();
        assert_eq!(row.trim_end(), "      Kepler");
    }

    #[test]
    fn hud_takes_at_most_half_the_screen() {
        assert_eq!(hud_width(200), HUD_W);
        assert_eq!(hud_width(40), 20);
        assert_eq!(cell_to_dot(3, 2), Point::new(7.0, 10.0));
    }
}
