/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Board cells are drawn as checkboxes, `[ ]` or `[x]`, three terminal
/// columns each. Snake and food are both just "checked"; colour is the only
/// thing that tells them apart.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::point::Point;
use crate::sim::world::{Phase, WorldState, MAX_NAME_LEN};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Same explicit RGB for `Clear` and every cell background, so VTE
    /// terminals show no seams between rows.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg: Self::norm_bg(bg) }
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
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
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

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect()
    }
}

// ── Layout ──

/// Terminal columns per board cell: `[`, mark, `]`.
pub const CELL_W: usize = 3;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
/// HUD + gap above the board, message + help below.
const RESERVED_ROWS: usize = MAP_ROW + 3;

const HUD_BG: Color = Color::Rgb { r: 255, g: 140, b: 0 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const SNAKE_FG: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const HEAD_FG: Color = Color::Rgb { r: 255, g: 220, b: 50 };
const FOOD_FG: Color = Color::Rgb { r: 255, g: 60, b: 60 };
const EMPTY_FG: Color = Color::Rgb { r: 90, g: 90, b: 110 };

/// Largest board that fits a terminal of `term_w x term_h`, at least 1x1.
/// One cell's width is kept free as a margin.
pub fn grid_size_for(term_w: u16, term_h: u16) -> (i32, i32) {
    let columns = (term_w as usize).saturating_sub(CELL_W) / CELL_W;
    let rows = (term_h as usize).saturating_sub(RESERVED_ROWS);
    (columns.max(1) as i32, rows.max(1) as i32)
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
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
        self.set_size(tw as usize, th as usize);
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

    /// Current terminal size in columns and rows.
    pub fn size(&self) -> (u16, u16) {
        (self.term_w as u16, self.term_h as u16)
    }

    fn set_size(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
    }

    /// Pick up a terminal resize. Returns true if the size changed.
    pub fn poll_resize(&mut self) -> io::Result<bool> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize == self.term_w && th as usize == self.term_h {
            return Ok(false);
        }
        self.set_size(tw as usize, th as usize);
        queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        Ok(true)
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        // Detect phase change → clear for clean transition
        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        self.compose(world);
        self.flush_diff()?;

        // Swap: current front becomes next back
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

        // Explicit base colors; ResetColor would fall back to the
        // terminal's own default and leave line artifacts.
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

    // ── Compose: build front buffer content ──

    fn compose(&mut self, w: &WorldState) {
        self.front.clear();
        match w.phase {
            Phase::Title => self.compose_title(w),
            Phase::Playing => self.compose_game(w),
            Phase::GameOver => {
                self.compose_game(w);
                self.compose_game_over(w);
            }
            Phase::NameEntry => self.compose_name_entry(w),
            Phase::Scores => self.compose_scores(w),
        }
        if w.paused && w.phase == Phase::Playing {
            self.compose_pause_overlay(w);
        }
    }

    /// Left edge of the board, centered in the terminal.
    fn board_x(&self, w: &WorldState) -> usize {
        let board_w = w.columns as usize * CELL_W;
        self.front.width.saturating_sub(board_w) / 2
    }

    fn compose_game(&mut self, w: &WorldState) {
        // ── HUD row ──
        let best = w.board.best().unwrap_or(0).max(w.score);
        let hud = format!(" CHECKBOX SNAKE   SCORE {:<6} BEST {:<6} LENGTH {}", w.score, best, w.snake.len());
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Board ──
        let x0 = self.board_x(w);
        let grid = w.checked_grid();
        let head = w.snake.head();
        for (gy, row) in grid.iter().enumerate() {
            let ty = MAP_ROW + gy;
            if ty >= self.front.height { break; }
            for (gx, &checked) in row.iter().enumerate() {
                let tx = x0 + gx * CELL_W;
                if tx + CELL_W > self.front.width { break; }
                let p = Point::new(gx as i32, gy as i32);
                let fg = if !checked {
                    EMPTY_FG
                } else if w.is_food(p) {
                    FOOD_FG
                } else if p == head {
                    HEAD_FG
                } else {
                    SNAKE_FG
                };
                let mark = if checked { 'x' } else { ' ' };
                self.front.set(tx, ty, Cell::new('[', EMPTY_FG, Color::Reset));
                self.front.set(tx + 1, ty, Cell::new(mark, fg, Color::Reset));
                self.front.set(tx + 2, ty, Cell::new(']', EMPTY_FG, Color::Reset));
            }
        }

        // ── Message bar ──
        let msg_row = MAP_ROW + w.rows as usize + 1;
        if msg_row < self.front.height && !w.message.is_empty() {
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(1, msg_row, &w.message, Color::Black, MSG_BG);
        }

        // ── Help bar ──
        let help_row = MAP_ROW + w.rows as usize + 2;
        if help_row < self.front.height {
            let help = " ←→↑↓/WASD: Steer   P/F1: Pause   ESC: Title";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    fn compose_title(&mut self, w: &WorldState) {
        let title = [
            r"  ___ _           _   _              ___           _       ",
            r" / __| |_  ___ __| |_| |__  _____ __/ __|_ _  __ _| |_____ ",
            r"| (__| ' \/ -_) _| / / '_ \/ _ \ \ /\__ \ ' \/ _` | / / -_)",
            r" \___|_||_\___\__|_\_\_.__/\___/_\_\|___/_||_\__,_|_\_\___|",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 2 + i, line, HUD_BG, Color::Reset);
        }

        let menu_base = 8;
        self.front.put_str(8, menu_base, "ENTER   New Game", SNAKE_FG, Color::Reset);
        self.front.put_str(8, menu_base + 1, "  H     High Scores", Color::White, Color::Reset);
        self.front.put_str(8, menu_base + 2, "  Q     Quit", Color::White, Color::Reset);

        let info = format!("Board {} x {}", w.columns, w.rows);
        self.front.put_str(8, menu_base + 4, &info, Color::DarkGrey, Color::Reset);
        if let Some(best) = w.board.best() {
            let line = format!("Best  {}", best);
            self.front.put_str(8, menu_base + 5, &line, Color::DarkGrey, Color::Reset);
        }

        let help = [
            "Controls",
            "  ←→↑↓ / WASD   Steer",
            "  P / F1        Pause",
            "  ESC           Title",
        ];
        let help_base = menu_base + 7;
        for (i, line) in help.iter().enumerate() {
            let color = if i == 0 { HEAD_FG } else { Color::White };
            self.front.put_str(8, help_base + i, line, color, Color::Reset);
        }

        if !w.message.is_empty() {
            let msg_row = self.front.height.saturating_sub(1);
            if msg_row > help_base + help.len() {
                self.front.fill_row(msg_row, MSG_BG);
                self.front.put_str(1, msg_row, &w.message, Color::Black, MSG_BG);
            }
        }
    }

    fn compose_game_over(&mut self, w: &WorldState) {
        let box_art = [
            "╔══════════════════════════╗",
            "║        GAME  OVER        ║",
            "╚══════════════════════════╝",
        ];
        let bx = self.front.width.saturating_sub(28) / 2;
        let by = MAP_ROW + (w.rows as usize).saturating_sub(6) / 2;
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(bx, by + i, l, FOOD_FG, Color::Reset);
        }
        let score = format!("  Score: {:<18}", w.score);
        self.front.put_str(bx, by + 3, &score, Color::White, Color::Reset);
        self.front.put_str(bx, by + 4, "  ENTER: Continue          ", SNAKE_FG, Color::Reset);
    }

    fn compose_name_entry(&mut self, w: &WorldState) {
        self.front.put_str(6, 3, "NEW HIGH SCORE!", HEAD_FG, Color::Reset);
        let score = format!("Score: {}", w.score);
        self.front.put_str(6, 5, &score, Color::White, Color::Reset);

        let blink = (w.anim_tick / 8) % 2 == 0;
        let cursor = if blink && w.name_input.chars().count() < MAX_NAME_LEN { "_" } else { " " };
        let field = format!("Name: {}{}", w.name_input, cursor);
        self.front.put_str(6, 7, &field, SNAKE_FG, Color::Reset);
        self.front.put_str(6, 9, "ENTER: Save   BACKSPACE: Erase", Color::DarkGrey, Color::Reset);
    }

    fn compose_scores(&mut self, w: &WorldState) {
        self.front.put_str(6, 2, "HIGH SCORES", HEAD_FG, Color::Reset);
        if w.board.is_empty() {
            self.front.put_str(6, 4, "No scores yet.", Color::DarkGrey, Color::Reset);
        }
        for (i, entry) in w.board.entries().iter().enumerate() {
            let line = format!("{}. {:<width$} {:>6}", i + 1, entry.name, entry.score, width = MAX_NAME_LEN);
            let color = if w.last_rank == Some(i) { SNAKE_FG } else { Color::White };
            self.front.put_str(6, 4 + i, &line, color, Color::Reset);
        }
        let base = 5 + w.board.capacity();
        self.front.put_str(6, base, "ENTER: Play again   ESC: Title", Color::DarkGrey, Color::Reset);
        if !w.message.is_empty() {
            self.front.put_str(6, base + 2, &w.message, MSG_BG, Color::Reset);
        }
    }

    fn compose_pause_overlay(&mut self, w: &WorldState) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let blink = (w.anim_tick / 8) % 2 == 0;
        let label = if blink { "║  ▶  PAUSED  ◀  ║" } else { "║     PAUSED     ║" };
        let bx = self.front.width.saturating_sub(18) / 2;
        let by = MAP_ROW + (w.rows as usize).saturating_sub(3) / 2;
        self.front.put_str(bx, by, "╔════════════════╗", HEAD_FG, dim);
        self.front.put_str(bx, by + 1, label, HEAD_FG, dim);
        self.front.put_str(bx, by + 2, "╚════════════════╝", HEAD_FG, dim);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::direction::Direction;
    use crate::domain::snake::Snake;
    use crate::sim::scores::{Score, ScoreBoard};

    fn renderer(w: usize, h: usize) -> Renderer {
        let mut r = Renderer::new();
        r.set_size(w, h);
        r
    }

    fn world(columns: i32, rows: i32) -> WorldState {
        let mut w = WorldState::new(columns, rows, GameConfig::default().rules, ScoreBoard::new(3), Some(5));
        w.start();
        w.snake = Snake::from_cells(&[(2, 0), (1, 0), (0, 0)], Direction::Right);
        w.food = Some(Point::new(3, 1));
        w
    }

    #[test]
    fn grid_size_keeps_a_margin() {
        assert_eq!(grid_size_for(80, 24), (25, 19));
        assert_eq!(grid_size_for(3, 3), (1, 1));
        assert_eq!(grid_size_for(0, 0), (1, 1));
    }

    #[test]
    fn board_draws_checkboxes() {
        let w = world(4, 2);
        let mut r = renderer(12, 8);
        r.compose(&w);
        assert_eq!(r.front.row_text(MAP_ROW), "[x][x][x][ ]");
        assert_eq!(r.front.row_text(MAP_ROW + 1), "[ ][ ][ ][x]");
    }

    #[test]
    fn food_and_head_have_their_own_colours() {
        let w = world(4, 2);
        let mut r = renderer(12, 8);
        r.compose(&w);
        assert_eq!(r.front.get(1 + 2 * CELL_W, MAP_ROW).fg, HEAD_FG);
        assert_eq!(r.front.get(1, MAP_ROW).fg, SNAKE_FG);
        assert_eq!(r.front.get(1 + 3 * CELL_W, MAP_ROW + 1).fg, FOOD_FG);
    }

    #[test]
    fn board_is_centered() {
        let w = world(4, 2);
        let mut r = renderer(20, 8);
        r.compose(&w);
        assert_eq!(r.front.row_text(MAP_ROW), "    [x][x][x][ ]    ");
    }

    #[test]
    fn hud_shows_score() {
        let mut w = world(4, 2);
        w.score = 7;
        let mut r = renderer(60, 8);
        r.compose(&w);
        assert!(r.front.row_text(HUD_ROW).contains("SCORE 7"));
    }

    #[test]
    fn scores_screen_lists_entries() {
        let mut w = world(4, 2);
        w.board.add(Score::new("ada", 9));
        w.phase = Phase::Scores;
        let mut r = renderer(60, 12);
        r.compose(&w);
        assert!(r.front.row_text(4).contains("1. ada"));
    }

    #[test]
    fn small_terminal_clips_without_panicking() {
        let w = world(30, 30);
        let mut r = renderer(5, 3);
        r.compose(&w);
    }
}
