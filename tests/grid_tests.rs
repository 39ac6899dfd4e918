//! Grid and match detection tests

use tui_match3::core::{find_matches, has_match, BoardError, Grid};
use tui_match3::types::{Coord, TileKind};

fn kind(v: u8) -> Option<TileKind> {
    TileKind::new(v)
}

#[test]
fn test_every_in_range_cell_is_addressable() {
    let grid = Grid::new(5, 4).unwrap();
    for row in 0..4 {
        for col in 0..5 {
            let c = Coord::new(col, row);
            assert!(grid.is_valid_coord(c), "{} should be valid", c);
            assert_eq!(grid.get(c).unwrap(), None);
        }
    }
    assert_eq!(grid.coords().count(), 20);
}

#[test]
fn test_out_of_range_is_an_error_not_a_panic() {
    let mut grid = Grid::new(3, 3).unwrap();
    for c in [
        Coord::new(-1, 0),
        Coord::new(0, -1),
        Coord::new(3, 0),
        Coord::new(0, 3),
        Coord::new(i16::MAX, i16::MIN),
    ] {
        assert!(!grid.is_valid_coord(c));
        assert!(matches!(grid.get(c), Err(BoardError::OutOfBounds { .. })));
        assert!(matches!(grid.set(c, kind(1)), Err(BoardError::OutOfBounds { .. })));
        assert!(grid.swap(Coord::new(0, 0), c).is_err());
    }
}

#[test]
fn test_zero_sized_grid_rejected() {
    assert!(matches!(
        Grid::new(0, 4),
        Err(BoardError::InvalidConfiguration(_))
    ));
    assert!(Grid::from_rows(&[&[1, 2], &[3]]).is_err());
}

#[test]
fn test_swap_twice_restores() {
    let mut grid = Grid::from_rows(&[&[1, 2, 3], &[3, 1, 2]]).unwrap();
    let before = grid.clone();
    grid.swap(Coord::new(1, 0), Coord::new(1, 1)).unwrap();
    assert_eq!(grid.get(Coord::new(1, 0)).unwrap(), kind(1));
    assert_eq!(grid.get(Coord::new(1, 1)).unwrap(), kind(2));
    grid.swap(Coord::new(1, 0), Coord::new(1, 1)).unwrap();
    assert_eq!(grid, before);
}

#[test]
fn test_gravity_keeps_column_order() {
    // Column 0 top to bottom: 1, empty, 2, empty.
    let mut grid = Grid::from_rows(&[&[1], &[0], &[2], &[0]]).unwrap();
    let empty = grid.column_compact(0).unwrap();
    assert_eq!(empty, 2);
    assert_eq!(grid.to_rows(), vec![vec![0], vec![0], vec![1], vec![2]]);
}

#[test]
fn test_scenario_a_single_horizontal_run() {
    let grid = Grid::from_rows(&[&[1, 1, 1], &[2, 3, 2], &[3, 2, 3]]).unwrap();
    let groups = find_matches(&grid);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].kind, TileKind::new(1).unwrap());
    assert_eq!(
        groups[0].cells,
        vec![Coord::new(0, 0), Coord::new(1, 0), Coord::new(2, 0)]
    );
}

#[test]
fn test_scenario_c_plus_shape_is_one_group() {
    let grid = Grid::from_rows(&[&[2, 1, 3], &[1, 1, 1], &[3, 1, 2]]).unwrap();
    let groups = find_matches(&grid);
    assert_eq!(groups.len(), 1);
    let g = &groups[0];
    // The centre belongs to both runs but is counted once.
    assert_eq!(g.size(), 5);
    assert_eq!(
        g.cells,
        vec![
            Coord::new(1, 0),
            Coord::new(0, 1),
            Coord::new(1, 1),
            Coord::new(2, 1),
            Coord::new(1, 2),
        ]
    );
}

#[test]
fn test_runs_of_two_and_empty_cells_do_not_match() {
    let grid = Grid::from_rows(&[&[1, 1, 2, 2], &[0, 0, 0, 3], &[3, 3, 1, 3]]).unwrap();
    assert!(find_matches(&grid).is_empty());
    assert!(!has_match(&grid));
}

#[test]
fn test_long_run_and_separate_kinds() {
    let grid = Grid::from_rows(&[&[4, 4, 4, 4, 4], &[1, 2, 3, 1, 2], &[2, 2, 2, 3, 1]]).unwrap();
    let groups = find_matches(&grid);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].size(), 5);
    assert_eq!(groups[1].size(), 3);
    assert!(groups[1].contains(Coord::new(2, 2)));
    assert!(has_match(&grid));
}
