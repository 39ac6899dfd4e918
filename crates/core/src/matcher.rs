//! Match detection
//!
//! A run is a maximal horizontal or vertical line of at least [`MIN_RUN`]
//! identical, non-empty tiles. Runs that share a cell (L, T and + shapes) are
//! merged into a single [`MatchGroup`], so a crossing cell is counted once.
//!
//! Horizontal runs are collected with a row-major scan, vertical runs with a
//! column-major scan; groups are reported in the order of the first run that
//! contributed to them.

use crate::grid::Grid;
use crate::types::{Cell, Coord, TileKind, MIN_RUN};

/// A connected set of matched cells of one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    pub kind: TileKind,
    /// Member cells, row-major, without duplicates.
    pub cells: Vec<Coord>,
}

impl MatchGroup {
    /// Number of distinct cells in the group.
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, c: Coord) -> bool {
        self.cells.contains(&c)
    }
}

#[derive(Debug)]
struct Run {
    kind: TileKind,
    cells: Vec<usize>,
}

/// Scan one line of cell indices and push every run of length >= MIN_RUN.
fn scan_line(grid: &Grid, line: impl Iterator<Item = usize>, runs: &mut Vec<Run>) {
    let cells = grid.cells();
    let mut current: Option<Run> = None;
    for idx in line {
        let cell = cells[idx];
        if let (Some(kind), Some(run)) = (cell, current.as_mut()) {
            if run.kind == kind {
                run.cells.push(idx);
                continue;
            }
        }
        if let Some(run) = current.take() {
            if run.cells.len() >= MIN_RUN {
                runs.push(run);
            }
        }
        current = cell.map(|kind| Run {
            kind,
            cells: vec![idx],
        });
    }
    if let Some(run) = current {
        if run.cells.len() >= MIN_RUN {
            runs.push(run);
        }
    }
}

fn collect_runs(grid: &Grid) -> Vec<Run> {
    let w = usize::from(grid.width());
    let h = usize::from(grid.height());
    let mut runs = Vec::new();
    for row in 0..h {
        scan_line(grid, (0..w).map(|col| row * w + col), &mut runs);
    }
    for col in 0..w {
        scan_line(grid, (0..h).map(|row| row * w + col), &mut runs);
    }
    runs
}

/// Disjoint-set forest over run indices.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Keep the earlier run as root so group order follows scan order.
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

/// Find every match group on the grid. Pure; the grid is not modified.
///
/// ```
/// use tui_match3_core::{find_matches, Grid};
/// use tui_match3_core::types::Coord;
///
/// let grid = Grid::from_rows(&[&[1, 1, 1], &[2, 3, 2], &[3, 2, 3]]).unwrap();
/// let groups = find_matches(&grid);
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].cells, vec![Coord::new(0, 0), Coord::new(1, 0), Coord::new(2, 0)]);
/// ```
pub fn find_matches(grid: &Grid) -> Vec<MatchGroup> {
    let runs = collect_runs(grid);
    if runs.is_empty() {
        return Vec::new();
    }

    let mut uf = UnionFind::new(runs.len());
    let mut owner: Vec<Option<usize>> = vec![None; grid.cells().len()];
    for (ri, run) in runs.iter().enumerate() {
        for &idx in &run.cells {
            match owner[idx] {
                Some(other) => uf.union(ri, other),
                None => owner[idx] = Some(ri),
            }
        }
    }

    let w = usize::from(grid.width());
    let mut slot_of_root: Vec<Option<usize>> = vec![None; runs.len()];
    let mut groups: Vec<(TileKind, Vec<usize>)> = Vec::new();
    for (ri, run) in runs.iter().enumerate() {
        let root = uf.find(ri);
        let slot = match slot_of_root[root] {
            Some(s) => s,
            None => {
                groups.push((run.kind, Vec::new()));
                slot_of_root[root] = Some(groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[slot].1.extend_from_slice(&run.cells);
    }

    groups
        .into_iter()
        .map(|(kind, mut cells)| {
            // Flat indices are row-major, so sorting them sorts the coords.
            cells.sort_unstable();
            cells.dedup();
            MatchGroup {
                kind,
                cells: cells
                    .into_iter()
                    .map(|i| Coord::new((i % w) as i16, (i / w) as i16))
                    .collect(),
            }
        })
        .collect()
}

fn line_has_run(cells: &[Cell], line: impl Iterator<Item = usize>) -> bool {
    let mut prev: Cell = None;
    let mut len = 0usize;
    for idx in line {
        let cell = cells[idx];
        if cell.is_some() && cell == prev {
            len += 1;
            if len >= MIN_RUN {
                return true;
            }
        } else {
            prev = cell;
            len = 1;
        }
    }
    false
}

/// Whether any run exists on the grid.
pub fn has_match(grid: &Grid) -> bool {
    let w = usize::from(grid.width());
    let h = usize::from(grid.height());
    let cells = grid.cells();
    (0..h).any(|row| line_has_run(cells, (0..w).map(|col| row * w + col)))
        || (0..w).any(|col| line_has_run(cells, (0..h).map(|row| row * w + col)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(pairs: &[(i16, i16)]) -> Vec<Coord> {
        pairs.iter().map(|&(c, r)| Coord::new(c, r)).collect()
    }

    #[test]
    fn test_no_matches() {
        let grid = Grid::from_rows(&[&[1, 2, 1], &[2, 1, 2], &[1, 2, 1]]).unwrap();
        assert!(find_matches(&grid).is_empty());
        assert!(!has_match(&grid));
    }

    #[test]
    fn test_horizontal_run() {
        let grid = Grid::from_rows(&[&[1, 1, 1], &[2, 3, 2], &[3, 2, 3]]).unwrap();
        let groups = find_matches(&grid);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].kind.get(), 1);
        assert_eq!(groups[0].cells, coords(&[(0, 0), (1, 0), (2, 0)]));
        assert!(has_match(&grid));
    }

    #[test]
    fn test_vertical_run_of_four() {
        let grid = Grid::from_rows(&[&[2, 1], &[2, 3], &[2, 1], &[2, 3]]).unwrap();
        let groups = find_matches(&grid);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].size(), 4);
    }

    #[test]
    fn test_plus_shape_is_one_group() {
        let grid = Grid::from_rows(&[
            &[2, 1, 3],
            &[1, 1, 1],
            &[3, 1, 2],
        ])
        .unwrap();
        let groups = find_matches(&grid);
        assert_eq!(groups.len(), 1);
        // Centre counted once: 3 + 3 - 1
        assert_eq!(groups[0].size(), 5);
        assert_eq!(
            groups[0].cells,
            coords(&[(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)])
        );
    }

    #[test]
    fn test_l_shape_is_one_group() {
        let grid = Grid::from_rows(&[
            &[4, 2, 3],
            &[4, 3, 2],
            &[4, 4, 4],
        ])
        .unwrap();
        let groups = find_matches(&grid);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].size(), 5);
        assert!(groups[0].contains(Coord::new(0, 2)));
    }

    #[test]
    fn test_independent_groups_in_scan_order() {
        let grid = Grid::from_rows(&[
            &[1, 2, 3, 3, 3],
            &[1, 2, 1, 2, 1],
            &[1, 3, 2, 1, 2],
        ])
        .unwrap();
        let groups = find_matches(&grid);
        assert_eq!(groups.len(), 2);
        // Horizontal run in row 0 is scanned before the vertical run in column 0.
        assert_eq!(groups[0].kind.get(), 3);
        assert_eq!(groups[1].kind.get(), 1);
    }

    #[test]
    fn test_empty_cells_never_match() {
        let grid = Grid::from_rows(&[&[0, 0, 0], &[0, 0, 0], &[0, 0, 0]]).unwrap();
        assert!(find_matches(&grid).is_empty());
        assert!(!has_match(&grid));
    }

    #[test]
    fn test_detection_is_pure() {
        let grid = Grid::from_rows(&[&[1, 1, 1], &[2, 3, 2]]).unwrap();
        let before = grid.clone();
        let first = find_matches(&grid);
        let second = find_matches(&grid);
        assert_eq!(first, second);
        assert_eq!(grid, before);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn grid_from(width: usize, cells: &[u8]) -> Grid {
            let rows: Vec<&[u8]> = cells.chunks(width).collect();
            Grid::from_rows(&rows).unwrap()
        }

        proptest! {
            #[test]
            fn groups_are_disjoint_sorted_and_uniform(
                cells in prop::collection::vec(0u8..4, 36),
            ) {
                let grid = grid_from(6, &cells);
                let groups = find_matches(&grid);
                prop_assert_eq!(has_match(&grid), !groups.is_empty());

                let mut seen = std::collections::HashSet::new();
                for g in &groups {
                    prop_assert!(g.size() >= MIN_RUN);
                    prop_assert!(g.cells.windows(2).all(|w| (w[0].row, w[0].col) < (w[1].row, w[1].col)));
                    for &c in &g.cells {
                        prop_assert!(seen.insert(c), "{} in two groups", c);
                        prop_assert_eq!(grid.get(c).unwrap(), Some(g.kind));
                    }
                }
            }
        }
    }
}
