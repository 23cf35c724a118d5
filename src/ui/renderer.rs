/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Board cell changes are painted into the `front` buffer through the
///      `Canvas` trait (erase / draw by cell tag). `front` persists across
///      frames; only changed cells are touched.
///   2. `present()` compares each terminal cell with `back` (what is on
///      screen) and emits commands only for cells that differ.
///   3. All commands are batched with `queue!`, flushed once at the end.
///   4. `back` becomes a copy of `front`.
///
/// Each board cell is two terminal columns: a light highlight glyph on the
/// left and a dark shadow glyph on the right, both over the base color.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::color::Rgb;
use super::paint::{Canvas, CellPaint, CellTag};

// ── Glyph: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Glyph {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Glyph {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// inter-row gap color matches the cell color exactly.
    const BASE_BG: Color = Color::Rgb { r: 0, g: 0, b: 0 };

    const BLANK: Glyph = Glyph {
        ch: ' ',
        fg: Color::White,
        bg: Glyph::BASE_BG,
    };

    /// Sentinel used to invalidate the back buffer.
    /// Different from any real glyph, so every position will be diff'd.
    const INVALID: Glyph = Glyph {
        ch: '?',
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    const HIGHLIGHT: char = '▔';
    const SHADOW: char = '▗';

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Glyph { ch, fg, bg }
    }
}

fn term_color(c: Rgb) -> Color {
    Color::Rgb { r: c.r, g: c.g, b: c.b }
}

// ── FrameBuffer: a 2D grid of Glyphs ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Glyph>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Glyph::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.width = w;
        self.height = h;
        self.cells = vec![Glyph::BLANK; w * h];
    }

    fn clear(&mut self) {
        self.cells.fill(Glyph::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, g: Glyph) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = g;
        }
    }

    fn get(&self, x: usize, y: usize) -> Glyph {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Glyph::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (cx, ch) in (x..self.width).zip(s.chars()) {
            self.set(cx, y, Glyph::new(ch, fg, bg));
        }
    }

    fn clear_row(&mut self, y: usize) {
        for x in 0..self.width {
            self.set(x, y, Glyph::BLANK);
        }
    }
}

// ── Layout ──

/// Each board cell = 2 terminal columns.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
/// Top border row; board rows start one below.
const FRAME_TOP: usize = 1;
/// Left border column; board columns start one right.
const FRAME_LEFT: usize = 1;

const BORDER_FG: Color = Color::Rgb { r: 110, g: 110, b: 130 };
const HUD_FG: Color = Color::Rgb { r: 200, g: 200, b: 220 };
const STATUS_FG: Color = Color::Rgb { r: 255, g: 90, b: 90 };

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    board_w: usize,
    board_h: usize,
    /// Surface was cleared; the board must be painted from scratch.
    fresh: bool,
}

impl Renderer {
    pub fn new(board_w: usize, board_h: usize) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            board_w,
            board_h,
            fresh: true,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Glyph::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.reset_surface(tw as usize, th as usize);
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

    fn reset_surface(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Glyph::INVALID);
        self.fresh = true;
    }

    /// Start a frame. Returns `true` when the surface was reset (first
    /// frame or terminal resize) and the caller must repaint every
    /// occupied board cell rather than just the latest changes.
    pub fn begin_frame(&mut self) -> io::Result<bool> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.reset_surface(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Glyph::BASE_BG), Clear(ClearType::All))?;
        }

        let reset = std::mem::take(&mut self.fresh);
        if reset {
            self.front.clear();
            self.compose_chrome();
        }
        Ok(reset)
    }

    /// Draw the status line, then flush the diff to the terminal.
    pub fn present(&mut self, status: &str) -> io::Result<()> {
        let row = self.status_row();
        self.front.clear_row(row);
        self.front.put_str(FRAME_LEFT, row, status, STATUS_FG, Glyph::BASE_BG);

        self.flush_diff()?;
        self.back.cells.clone_from(&self.front.cells);
        Ok(())
    }

    fn status_row(&self) -> usize {
        FRAME_TOP + self.board_h + 2
    }

    /// Terminal position of the left half of a board cell.
    fn cell_origin(&self, tag: CellTag) -> io::Result<(usize, usize)> {
        if tag.col >= self.board_w || tag.row >= self.board_h {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{tag} is outside the {}x{} board", self.board_w, self.board_h),
            ));
        }
        Ok((FRAME_LEFT + 1 + tag.col * CELL_W, FRAME_TOP + 1 + tag.row))
    }

    // ── Compose: static frame around the board ──

    fn compose_chrome(&mut self) {
        let hud = " BLOCKFALL   ←/→ Move   Esc Quit ";
        self.front.put_str(0, HUD_ROW, hud, HUD_FG, Glyph::BASE_BG);

        let inner_w = self.board_w * CELL_W;
        let left = FRAME_LEFT;
        let right = FRAME_LEFT + inner_w + 1;
        let top = FRAME_TOP;
        let bottom = FRAME_TOP + self.board_h + 1;

        let border = |ch| Glyph::new(ch, BORDER_FG, Glyph::BASE_BG);
        for x in left + 1..right {
            self.front.set(x, top, border('─'));
            self.front.set(x, bottom, border('─'));
        }
        for y in top + 1..bottom {
            self.front.set(left, y, border('│'));
            self.front.set(right, y, border('│'));
        }
        self.front.set(left, top, border('┌'));
        self.front.set(right, top, border('┐'));
        self.front.set(left, bottom, border('└'));
        self.front.set(right, bottom, border('┘'));
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Glyph::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors at start of frame; ResetColor would fall back
        // to the terminal's own default, which may differ from BASE_BG.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Glyph::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                // Position cursor if needed
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                // Set colors only if changed
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

impl Canvas for Renderer {
    fn erase(&mut self, tag: CellTag) -> io::Result<()> {
        let (x, y) = self.cell_origin(tag)?;
        for dx in 0..CELL_W {
            self.front.set(x + dx, y, Glyph::BLANK);
        }
        Ok(())
    }

    fn draw(&mut self, paint: &CellPaint) -> io::Result<()> {
        let (x, y) = self.cell_origin(paint.tag)?;
        let bg = term_color(paint.fill);
        self.front.set(x, y, Glyph::new(Glyph::HIGHLIGHT, term_color(paint.highlight), bg));
        self.front.set(x + 1, y, Glyph::new(Glyph::SHADOW, term_color(paint.outline), bg));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Renderer with an in-memory surface; never touches the terminal.
    fn offscreen(board_w: usize, board_h: usize) -> Renderer {
        let mut r = Renderer::new(board_w, board_h);
        r.front.resize(40, 30);
        r.back.resize(40, 30);
        r
    }

    fn paint(row: usize, col: usize) -> CellPaint {
        CellPaint::new(
            CellTag { row, col },
            Rgb::new(255, 0, 0),
            Rgb::new(127, 0, 0),
            Rgb::new(255, 127, 127),
        )
    }

    #[test]
    fn draw_fills_two_columns_inside_the_frame() {
        let mut r = offscreen(10, 22);
        r.draw(&paint(0, 0)).unwrap();
        let left = r.front.get(2, 2);
        let right = r.front.get(3, 2);
        assert_eq!(left.ch, Glyph::HIGHLIGHT);
        assert_eq!(left.fg, Color::Rgb { r: 255, g: 127, b: 127 });
        assert_eq!(left.bg, Color::Rgb { r: 255, g: 0, b: 0 });
        assert_eq!(right.ch, Glyph::SHADOW);
        assert_eq!(right.fg, Color::Rgb { r: 127, g: 0, b: 0 });
    }

    #[test]
    fn erase_restores_blank() {
        let mut r = offscreen(10, 22);
        r.draw(&paint(3, 4)).unwrap();
        r.erase(CellTag { row: 3, col: 4 }).unwrap();
        let (x, y) = r.cell_origin(CellTag { row: 3, col: 4 }).unwrap();
        assert_eq!((x, y), (10, 5));
        assert_eq!(r.front.get(x, y), Glyph::BLANK);
        assert_eq!(r.front.get(x + 1, y), Glyph::BLANK);
    }

    #[test]
    fn tags_outside_board_are_errors() {
        let mut r = offscreen(10, 22);
        assert!(r.draw(&paint(22, 0)).is_err());
        assert!(r.erase(CellTag { row: 0, col: 10 }).is_err());
    }

    #[test]
    fn chrome_frames_the_board() {
        let mut r = offscreen(4, 4);
        r.compose_chrome();
        assert_eq!(r.front.get(FRAME_LEFT, FRAME_TOP).ch, '┌');
        assert_eq!(r.front.get(FRAME_LEFT + 4 * CELL_W + 1, FRAME_TOP + 5).ch, '┘');
        assert_eq!(r.front.get(FRAME_LEFT, FRAME_TOP + 2).ch, '│');
    }
}
