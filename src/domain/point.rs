/// Grid coordinates on a toroidal board.
///
/// The board has no walls: a coordinate that leaves one edge re-enters
/// from the opposite one. `wrapped()` is the only place that folds a raw
/// coordinate back into `[0, columns) x [0, rows)`.

use super::direction::Direction;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    /// The neighbouring cell in `dir`, not wrapped.
    pub fn offset(self, dir: Direction) -> Point {
        let (dx, dy) = dir.delta();
        Point::new(self.x + dx, self.y + dy)
    }

    /// Fold into the board. Sizes below 1 are treated as 1.
    pub fn wrapped(self, columns: i32, rows: i32) -> Point {
        Point::new(wrap(self.x, columns), wrap(self.y, rows))
    }

    #[inline]
    pub fn in_bounds(self, columns: i32, rows: i32) -> bool {
        self.x >= 0 && self.x < columns && self.y >= 0 && self.y < rows
    }
}

/// Euclidean remainder: -1 -> n-1, n -> 0, any multiple of n -> 0.
#[inline]
pub fn wrap(coord: i32, size: i32) -> i32 {
    coord.rem_euclid(size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_follows_screen_axes() {
        let p = Point::new(4, 4);
        assert_eq!(p.offset(Direction::Up), Point::new(4, 3));
        assert_eq!(p.offset(Direction::Down), Point::new(4, 5));
        assert_eq!(p.offset(Direction::Left), Point::new(3, 4));
        assert_eq!(p.offset(Direction::Right), Point::new(5, 4));
    }

    #[test]
    fn wrap_re_enters_from_opposite_edge() {
        assert_eq!(Point::new(-1, 0).wrapped(10, 5), Point::new(9, 0));
        assert_eq!(Point::new(10, 0).wrapped(10, 5), Point::new(0, 0));
        assert_eq!(Point::new(3, -1).wrapped(10, 5), Point::new(3, 4));
        assert_eq!(Point::new(3, 5).wrapped(10, 5), Point::new(3, 0));
    }

    #[test]
    fn wrap_handles_far_out_and_exact_multiples() {
        assert_eq!(wrap(-10, 10), 0);
        assert_eq!(wrap(-11, 10), 9);
        assert_eq!(wrap(25, 10), 5);
        assert_eq!(wrap(7, 1), 0);
    }

    #[test]
    fn wrap_degenerate_size_collapses_to_zero() {
        assert_eq!(wrap(5, 0), 0);
        assert_eq!(wrap(-3, -4), 0);
    }

    #[test]
    fn in_bounds_edges() {
        assert!(Point::new(0, 0).in_bounds(3, 3));
        assert!(Point::new(2, 2).in_bounds(3, 3));
        assert!(!Point::new(3, 0).in_bounds(3, 3));
        assert!(!Point::new(0, -1).in_bounds(3, 3));
    }
}
