//! Local move choice for when no suggestion service is available.

use crate::{BOARD_SIZE, Grid};

/// Validates a suggested coordinate pair: on the board and empty.
pub fn is_playable(grid: &Grid, x: usize, y: usize) -> bool {
    grid.is_empty_at(x, y)
}

/// The empty cell nearest the centre.
///
/// Searches the centre first, then square rings of growing radius around
/// it; inside a ring cells are tried column by column, top to bottom.
/// Deterministic, so two runs over the same board always agree. Returns
/// `None` only when the board is full.
pub fn fallback_move(grid: &Grid) -> Option<(usize, usize)> {
    let center = (BOARD_SIZE / 2) as isize;

    for radius in 0..=center {
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                // Interior cells belong to an earlier ring.
                if dx.abs() != radius && dy.abs() != radius {
                    continue;
                }
                let (x, y) = ((center + dx) as usize, (center + dy) as usize);
                if is_playable(grid, x, y) {
                    return Some((x, y));
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use parlor_protocol::Color;

    use super::*;
    use crate::Move;

    #[test]
    fn test_fallback_move_empty_board_takes_centre() {
        assert_eq!(fallback_move(&Grid::new()), Some((7, 7)));
    }

    #[test]
    fn test_fallback_move_occupied_centre_picks_first_ring() {
        let mut grid = Grid::new();
        grid.set(Move::new(7, 7, Color::Black));
        assert_eq!(fallback_move(&grid), Some((6, 6)));
    }

    #[test]
    fn test_fallback_move_stays_near_centre() {
        let mut grid = Grid::new();
        for x in 6..=8 {
            for y in 6..=8 {
                grid.set(Move::new(x, y, Color::White));
            }
        }
        let (x, y) = fallback_move(&grid).unwrap();
        let distance = x.abs_diff(7).max(y.abs_diff(7));
        assert_eq!(distance, 2);
    }

    #[test]
    fn test_fallback_move_finds_last_corner() {
        let mut grid = Grid::new();
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                if (x, y) != (BOARD_SIZE - 1, 0) {
                    grid.set(Move::new(x, y, Color::Black));
                }
            }
        }
        assert_eq!(fallback_move(&grid), Some((BOARD_SIZE - 1, 0)));
    }

    #[test]
    fn test_fallback_move_full_board_is_none() {
        let mut grid = Grid::new();
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                grid.set(Move::new(x, y, Color::Black));
            }
        }
        assert_eq!(fallback_move(&grid), None);
    }

    #[test]
    fn test_is_playable_rejects_off_board_and_taken() {
        let mut grid = Grid::new();
        grid.set(Move::new(2, 2, Color::Black));
        assert!(!is_playable(&grid, 2, 2));
        assert!(!is_playable(&grid, 15, 2));
        assert!(is_playable(&grid, 3, 2));
    }
}
