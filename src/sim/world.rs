/// WorldState: the complete snapshot of a running game.
///
/// ## Board
///
/// A toroidal grid of `columns x rows` cells. A cell is "checked" when it
/// holds a snake segment or the food; the renderer draws nothing else.
///
/// The board may be resized mid-game (terminal resize). `resize()` folds
/// the snake and the food back into the new bounds.
///
/// ## Randomness
///
/// Food placement draws from a `StdRng` owned by the world, seeded from
/// entropy or from `--seed`, so a seeded run replays exactly.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::RulesConfig;
use crate::domain::point::Point;
use crate::domain::snake::Snake;
use super::food;
use super::scores::ScoreBoard;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    GameOver,
    NameEntry,
    Scores,
}

/// Longest name accepted for the score board.
pub const MAX_NAME_LEN: usize = 12;
pub const DEFAULT_NAME: &str = "anonymous";

pub struct WorldState {
    // ── Board ──
    pub columns: i32,
    pub rows: i32,

    // ── Entities ──
    pub snake: Snake,
    /// `None` once the snake fills the board.
    pub food: Option<Point>,

    // ── Rules ──
    pub rules: RulesConfig,

    // ── Meta ──
    pub phase: Phase,
    pub score: u32,
    /// Length the snake started this game with. Narrow boards shorten it.
    pub start_len: usize,
    pub tick: u64,
    pub paused: bool,

    // ── Scores ──
    pub board: ScoreBoard,
    pub name_input: String,
    pub last_rank: Option<usize>,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
    pub anim_tick: u32,

    rng: StdRng,
}

// ── Construction ──

impl WorldState {
    pub fn new(columns: i32, rows: i32, rules: RulesConfig, board: ScoreBoard, seed: Option<u64>) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let snake = Snake::new(rules.start_length, columns, rows);
        WorldState {
            columns,
            rows,
            start_len: snake.len(),
            snake,
            food: None,
            rules,
            phase: Phase::Title,
            score: 0,
            tick: 0,
            paused: false,
            board,
            name_input: String::new(),
            last_rank: None,
            message: String::new(),
            message_timer: 0,
            anim_tick: 0,
            rng,
        }
    }

    /// Fresh snake, fresh food, score 0.
    pub fn start(&mut self) {
        self.snake = Snake::new(self.rules.start_length, self.columns, self.rows);
        self.start_len = self.snake.len();
        self.score = 0;
        self.tick = 0;
        self.paused = false;
        self.name_input.clear();
        self.last_rank = None;
        self.message.clear();
        self.message_timer = 0;
        self.respawn_food();
        self.phase = Phase::Playing;
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Count down the transient message; clears it when the timer runs out.
    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 { self.message.clear(); }
        }
    }
}

// ── Cell queries ──

impl WorldState {
    #[inline]
    pub fn is_snake(&self, p: Point) -> bool {
        self.snake.contains(p)
    }

    #[inline]
    pub fn is_food(&self, p: Point) -> bool {
        self.food == Some(p)
    }

    /// Boolean cell state as drawn on the board.
    pub fn cell_checked(&self, p: Point) -> bool {
        self.is_food(p) || self.is_snake(p)
    }

    /// Occupancy grid, `grid[y][x]`. One pass over the snake instead of a
    /// body scan per cell.
    pub fn checked_grid(&self) -> Vec<Vec<bool>> {
        let mut grid = vec![vec![false; self.columns as usize]; self.rows as usize];
        for p in self.snake.iter().chain(self.food.iter()) {
            if p.in_bounds(self.columns, self.rows) {
                grid[p.y as usize][p.x as usize] = true;
            }
        }
        grid
    }
}

// ── Mutation ──

impl WorldState {
    /// Place food on a random free cell. Returns false if the board is full.
    pub fn respawn_food(&mut self) -> bool {
        self.food = food::place_food(&self.snake, self.columns, self.rows, &mut self.rng);
        self.food.is_some()
    }

    /// Change the board size, folding snake and food into the new bounds.
    pub fn resize(&mut self, columns: i32, rows: i32) {
        let columns = columns.max(1);
        let rows = rows.max(1);
        if columns == self.columns && rows == self.rows {
            return;
        }
        self.columns = columns;
        self.rows = rows;
        self.snake.rewrap(columns, rows);
        if let Some(f) = self.food {
            let wrapped = f.wrapped(columns, rows);
            if self.snake.contains(wrapped) {
                self.respawn_food();
            } else {
                self.food = Some(wrapped);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn world(columns: i32, rows: i32) -> WorldState {
        let cfg = GameConfig::default();
        WorldState::new(columns, rows, cfg.rules, ScoreBoard::default(), Some(3))
    }

    #[test]
    fn new_world_waits_on_title() {
        let w = world(10, 8);
        assert_eq!(w.phase, Phase::Title);
        assert_eq!(w.food, None);
    }

    #[test]
    fn start_places_snake_and_food() {
        let mut w = world(10, 8);
        w.start();
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.snake.len(), 3);
        assert_eq!(w.snake.head(), Point::new(2, 0));
        let food = w.food.unwrap();
        assert!(!w.is_snake(food));
        assert!(w.cell_checked(food));
    }

    #[test]
    fn checked_grid_matches_cell_queries() {
        let mut w = world(7, 5);
        w.start();
        let grid = w.checked_grid();
        for y in 0..w.rows {
            for x in 0..w.columns {
                assert_eq!(grid[y as usize][x as usize], w.cell_checked(Point::new(x, y)));
            }
        }
        let checked = grid.iter().flatten().filter(|c| **c).count();
        assert_eq!(checked, 4);
    }

    #[test]
    fn degenerate_size_is_clamped() {
        let w = world(0, -3);
        assert_eq!((w.columns, w.rows), (1, 1));
        assert_eq!(w.snake.len(), 1);
    }

    #[test]
    fn resize_folds_everything_into_bounds() {
        let mut w = world(20, 20);
        w.start();
        for _ in 0..10 {
            w.snake.advance(w.columns, w.rows);
        }
        w.resize(4, 3);
        assert!(w.snake.iter().all(|p| p.in_bounds(4, 3)));
        let food = w.food.unwrap();
        assert!(food.in_bounds(4, 3));
        assert!(!w.is_snake(food));
    }

    #[test]
    fn resize_moves_food_off_the_body() {
        let mut w = world(10, 10);
        w.start();
        w.food = Some(Point::new(5, 0));
        w.resize(5, 3);
        // (5, 0) wraps onto the tail at (0, 0).
        assert!(w.is_snake(Point::new(0, 0)));
        let food = w.food.unwrap();
        assert!(food.in_bounds(5, 3));
        assert!(!w.is_snake(food));
    }

    #[test]
    fn narrow_board_shortens_the_start() {
        let mut w = world(2, 6);
        w.start();
        assert_eq!(w.snake.len(), 2);
        assert_eq!(w.start_len, 2);
    }

    #[test]
    fn message_expires() {
        let mut w = world(5, 5);
        w.set_message("hi", 2);
        w.tick_message();
        assert_eq!(w.message, "hi");
        w.tick_message();
        assert!(w.message.is_empty());
    }
}
