/// The snake: an ordered body of grid cells, head first.
///
/// Movement model per advance:
///   1. apply the queued heading (if any)
///   2. push the wrapped new head to the front
///   3. pop the tail, unless growth is pending
///
/// Collision is a linear scan of the body against the head. The body is
/// a `VecDeque` so both ends are O(1).

use std::collections::VecDeque;

use super::direction::Direction;
use super::point::Point;

#[derive(Clone, Debug)]
pub struct Snake {
    body: VecDeque<Point>,
    direction: Direction,
    queued: Option<Direction>,
    pending_growth: u32,
}

impl Snake {
    /// Lay the snake out on row 0, tail at x = 0, heading right.
    /// The start length is clamped to `[1, columns]` so the body never
    /// overlaps itself on a narrow board.
    pub fn new(start_length: usize, columns: i32, rows: i32) -> Self {
        let len = start_length.clamp(1, columns.max(1) as usize) as i32;
        let body = (0..len)
            .rev()
            .map(|x| Point::new(x, 0).wrapped(columns, rows))
            .collect();
        Snake {
            body,
            direction: Direction::Right,
            queued: None,
            pending_growth: 0,
        }
    }

    #[cfg(test)]
    pub fn from_cells(cells: &[(i32, i32)], direction: Direction) -> Self {
        Snake {
            body: cells.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            direction,
            queued: None,
            pending_growth: 0,
        }
    }

    pub fn head(&self) -> Point {
        self.body.front().copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Length once all pending growth has unfolded.
    pub fn target_len(&self) -> usize {
        self.body.len() + self.pending_growth as usize
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.body.iter()
    }

    pub fn contains(&self, p: Point) -> bool {
        self.body.contains(&p)
    }

    /// Request a heading change for the next advance.
    /// Reversing onto the neck is ignored unless the snake is a single cell.
    /// Returns whether the request was accepted.
    pub fn steer(&mut self, dir: Direction) -> bool {
        if self.body.len() > 1 && dir.is_reversal_of(self.direction) {
            return false;
        }
        self.queued = Some(dir);
        true
    }

    /// Schedule `cells` extra segments; they appear one per advance.
    pub fn grow(&mut self, cells: u32) {
        self.pending_growth = self.pending_growth.saturating_add(cells);
    }

    /// Where the head will be after the next advance.
    pub fn next_head(&self, columns: i32, rows: i32) -> Point {
        let dir = self.queued.unwrap_or(self.direction);
        self.head().offset(dir).wrapped(columns, rows)
    }

    /// Move one cell. Returns the new head.
    pub fn advance(&mut self, columns: i32, rows: i32) -> Point {
        let head = self.next_head(columns, rows);
        if let Some(dir) = self.queued.take() {
            self.direction = dir;
        }
        self.body.push_front(head);
        if self.pending_growth > 0 {
            self.pending_growth -= 1;
        } else {
            self.body.pop_back();
        }
        head
    }

    /// Does the head share a cell with any other segment?
    pub fn head_collides(&self) -> bool {
        let head = self.head();
        self.body.iter().skip(1).any(|p| *p == head)
    }

    /// Fold every segment into a new board size.
    pub fn rewrap(&mut self, columns: i32, rows: i32) {
        for p in self.body.iter_mut() {
            *p = p.wrapped(columns, rows);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(s: &Snake) -> Vec<(i32, i32)> {
        s.iter().map(|p| (p.x, p.y)).collect()
    }

    #[test]
    fn starts_on_top_row_heading_right() {
        let s = Snake::new(3, 10, 10);
        assert_eq!(cells(&s), vec![(2, 0), (1, 0), (0, 0)]);
        assert_eq!(s.head(), Point::new(2, 0));
        assert_eq!(s.direction(), Direction::Right);
    }

    #[test]
    fn start_length_clamped_to_board_width() {
        let s = Snake::new(8, 4, 4);
        assert_eq!(s.len(), 4);
        assert!(!s.head_collides());

        let s = Snake::new(0, 4, 4);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn advance_shifts_body_without_growing() {
        let mut s = Snake::new(3, 10, 10);
        s.advance(10, 10);
        assert_eq!(cells(&s), vec![(3, 0), (2, 0), (1, 0)]);
    }

    #[test]
    fn advance_wraps_the_head() {
        let mut s = Snake::from_cells(&[(9, 4), (8, 4)], Direction::Right);
        assert_eq!(s.advance(10, 10), Point::new(0, 4));

        let mut s = Snake::from_cells(&[(3, 0), (3, 1)], Direction::Up);
        assert_eq!(s.advance(10, 6), Point::new(3, 5));
    }

    #[test]
    fn steering_applies_on_next_advance() {
        let mut s = Snake::new(3, 10, 10);
        assert!(s.steer(Direction::Down));
        assert_eq!(s.direction(), Direction::Right);
        s.advance(10, 10);
        assert_eq!(s.direction(), Direction::Down);
        assert_eq!(s.head(), Point::new(2, 1));
    }

    #[test]
    fn reversal_is_ignored() {
        let mut s = Snake::new(3, 10, 10);
        assert!(!s.steer(Direction::Left));
        s.advance(10, 10);
        assert_eq!(s.head(), Point::new(3, 0));
    }

    #[test]
    fn single_cell_snake_may_reverse() {
        let mut s = Snake::new(1, 10, 10);
        assert!(s.steer(Direction::Left));
        s.advance(10, 10);
        assert_eq!(s.head(), Point::new(9, 0));
    }

    #[test]
    fn last_accepted_steer_wins() {
        let mut s = Snake::new(3, 10, 10);
        s.steer(Direction::Up);
        s.steer(Direction::Down);
        s.advance(10, 10);
        assert_eq!(s.direction(), Direction::Down);
    }

    #[test]
    fn next_head_sees_queued_heading() {
        let mut s = Snake::new(3, 10, 10);
        assert_eq!(s.next_head(10, 10), Point::new(3, 0));
        s.steer(Direction::Up);
        assert_eq!(s.next_head(10, 10), Point::new(2, 9));
        assert_eq!(s.advance(10, 10), Point::new(2, 9));
    }

    #[test]
    fn growth_unfolds_one_cell_per_advance() {
        let mut s = Snake::new(2, 10, 10);
        s.grow(2);
        assert_eq!(s.target_len(), 4);
        s.advance(10, 10);
        assert_eq!(s.len(), 3);
        s.advance(10, 10);
        assert_eq!(s.len(), 4);
        s.advance(10, 10);
        assert_eq!(s.len(), 4);
        assert_eq!(cells(&s), vec![(4, 0), (3, 0), (2, 0), (1, 0)]);
    }

    #[test]
    fn head_into_body_collides() {
        // Head at (1,1) heading up into (1,0), which is still part of the body
        // after the tail moves.
        let mut s = Snake::from_cells(
            &[(1, 1), (2, 1), (2, 0), (1, 0), (0, 0)],
            Direction::Left,
        );
        s.steer(Direction::Up);
        s.advance(5, 5);
        assert!(s.head_collides());
    }

    #[test]
    fn chasing_own_tail_is_safe() {
        // A 2x2 loop: the tail vacates the cell the head moves into.
        let mut s = Snake::from_cells(&[(0, 1), (1, 1), (1, 0), (0, 0)], Direction::Left);
        s.steer(Direction::Up);
        s.advance(5, 5);
        assert_eq!(s.head(), Point::new(0, 0));
        assert!(!s.head_collides());
    }

    #[test]
    fn rewrap_folds_into_smaller_board() {
        let mut s = Snake::from_cells(&[(7, 3), (6, 3)], Direction::Right);
        s.rewrap(5, 2);
        assert_eq!(cells(&s), vec![(2, 1), (1, 1)]);
    }
}
