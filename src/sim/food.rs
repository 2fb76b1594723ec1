/// Food placement.
///
/// Sparse board: sample random cells until one is free.
/// Crowded board (snake covers 80 % or more): enumerate the free cells
/// and pick one, so placement never spins on a nearly full grid.

use rand::Rng;

use crate::domain::point::Point;
use crate::domain::snake::Snake;

/// Returns `None` when every cell is covered by the snake.
pub fn place_food<R: Rng + ?Sized>(snake: &Snake, columns: i32, rows: i32, rng: &mut R) -> Option<Point> {
    let columns = columns.max(1);
    let rows = rows.max(1);
    let area = columns as usize * rows as usize;

    if snake.len() * 5 < area * 4 {
        loop {
            let p = Point::new(rng.gen_range(0..columns), rng.gen_range(0..rows));
            if !snake.contains(p) {
                return Some(p);
            }
        }
    }

    let free: Vec<Point> = (0..rows)
        .flat_map(|y| (0..columns).map(move |x| Point::new(x, y)))
        .filter(|p| !snake.contains(*p))
        .collect();
    if free.is_empty() {
        None
    } else {
        Some(free[rng.gen_range(0..free.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::direction::Direction;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn never_lands_on_the_snake() {
        let mut rng = StdRng::seed_from_u64(7);
        let snake = Snake::new(4, 6, 2);
        for _ in 0..200 {
            let p = place_food(&snake, 6, 2, &mut rng).unwrap();
            assert!(p.in_bounds(6, 2));
            assert!(!snake.contains(p));
        }
    }

    #[test]
    fn crowded_board_finds_the_last_free_cell() {
        let mut rng = StdRng::seed_from_u64(1);
        // 3x2 board, five cells taken, (2,1) free.
        let snake = Snake::from_cells(
            &[(0, 1), (1, 1), (0, 0), (1, 0), (2, 0)],
            Direction::Left,
        );
        for _ in 0..20 {
            assert_eq!(place_food(&snake, 3, 2, &mut rng), Some(Point::new(2, 1)));
        }
    }

    #[test]
    fn full_board_has_no_food() {
        let mut rng = StdRng::seed_from_u64(1);
        let snake = Snake::from_cells(&[(1, 0), (0, 0)], Direction::Right);
        assert_eq!(place_food(&snake, 2, 1, &mut rng), None);
    }

    #[test]
    fn same_seed_same_cell() {
        let snake = Snake::new(3, 20, 20);
        let a = place_food(&snake, 20, 20, &mut StdRng::seed_from_u64(42));
        let b = place_food(&snake, 20, 20, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
