//! Cascade resolution
//!
//! One pass removes every current match group, lets each affected column
//! fall, and refills the emptied cells. Passes repeat until the board has no
//! match. The resolver is stepwise so the caller can play an animation
//! between passes; [`CascadeResolver::resolve_all`] runs the whole loop at
//! once for headless callers.

use crate::error::{BoardError, BoardResult};
use crate::grid::{Grid, TileMove};
use crate::matcher::{find_matches, MatchGroup};
use crate::rng::TileSource;
use crate::types::{Coord, TileKind, DEFAULT_MAX_CASCADE_PASSES};

/// Everything one resolution pass did to the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeStep {
    /// 1-based pass number within the current resolution.
    pub pass: u32,
    pub groups: Vec<MatchGroup>,
    /// Removed cells, row-major, without duplicates.
    pub removed: Vec<Coord>,
    pub falls: Vec<TileMove>,
    pub refills: Vec<(Coord, TileKind)>,
}

impl CascadeStep {
    /// Number of gems removed in this pass.
    pub fn popped(&self) -> usize {
        self.removed.len()
    }
}

/// Summary of a synchronous resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub passes: u32,
    /// Total gems removed across all passes.
    pub popped: usize,
    /// Gems removed per pass, in order.
    pub per_pass: Vec<usize>,
}

/// Pass counter and safety cap for one resolution.
#[derive(Debug, Clone)]
pub struct CascadeResolver {
    pass: u32,
    max_passes: u32,
}

impl Default for CascadeResolver {
    fn default() -> Self {
        Self {
            pass: 0,
            max_passes: DEFAULT_MAX_CASCADE_PASSES,
        }
    }
}

impl CascadeResolver {
    pub fn new(max_passes: u32) -> BoardResult<Self> {
        if max_passes == 0 {
            return Err(BoardError::InvalidConfiguration(
                "cascade pass cap must be positive".to_string(),
            ));
        }
        Ok(Self {
            pass: 0,
            max_passes,
        })
    }

    /// Start a new resolution.
    pub fn begin(&mut self) {
        self.pass = 0;
    }

    /// Passes completed in the current resolution.
    pub fn passes(&self) -> u32 {
        self.pass
    }

    pub fn max_passes(&self) -> u32 {
        self.max_passes
    }

    /// Run one pass with already-detected `groups`.
    ///
    /// Fails with [`BoardError::CascadeOverflow`] before touching the grid
    /// when the cap is reached.
    pub fn step<S: TileSource + ?Sized>(
        &mut self,
        grid: &mut Grid,
        groups: Vec<MatchGroup>,
        source: &mut S,
    ) -> BoardResult<CascadeStep> {
        if self.pass >= self.max_passes {
            tracing::warn!(passes = self.pass, cap = self.max_passes, "cascade overflow");
            return Err(BoardError::CascadeOverflow {
                passes: self.pass,
                cap: self.max_passes,
            });
        }
        self.pass += 1;

        let mut removed: Vec<Coord> = groups.iter().flat_map(|g| g.cells.iter().copied()).collect();
        removed.sort_unstable_by_key(|c| (c.row, c.col));
        removed.dedup();
        for &c in &removed {
            grid.set(c, None)?;
        }

        let mut columns: Vec<i16> = removed.iter().map(|c| c.col).collect();
        columns.sort_unstable();
        columns.dedup();
        let mut falls = Vec::new();
        for col in columns {
            grid.column_compact_tracked(col, &mut falls)?;
        }
        let refills = grid.fill_empty(source);

        tracing::trace!(pass = self.pass, popped = removed.len(), "cascade pass");
        Ok(CascadeStep {
            pass: self.pass,
            groups,
            removed,
            falls,
            refills,
        })
    }

    /// Resolve until the board settles.
    pub fn resolve_all<S: TileSource + ?Sized>(
        &mut self,
        grid: &mut Grid,
        source: &mut S,
    ) -> BoardResult<CascadeReport> {
        self.begin();
        let mut report = CascadeReport::default();
        loop {
            let groups = find_matches(grid);
            if groups.is_empty() {
                return Ok(report);
            }
            let step = self.step(grid, groups, source)?;
            report.passes = step.pass;
            report.popped += step.popped();
            report.per_pass.push(step.popped());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::FixedTiles;

    #[test]
    fn test_single_pass_removes_and_refills() {
        // Row 1 holds a run of 2s.
        let mut grid = Grid::from_rows(&[
            &[1, 3, 1],
            &[2, 2, 2],
            &[3, 1, 3],
        ])
        .unwrap();
        let mut src = FixedTiles::new(&[4], 4).unwrap();
        let mut resolver = CascadeResolver::default();
        let groups = find_matches(&grid);
        let step = resolver.step(&mut grid, groups, &mut src).unwrap();

        assert_eq!(step.pass, 1);
        assert_eq!(step.popped(), 3);
        assert_eq!(step.falls.len(), 3);
        assert_eq!(step.refills.len(), 3);
        assert_eq!(
            grid.to_rows(),
            vec![vec![4, 4, 4], vec![1, 3, 1], vec![3, 1, 3]]
        );
    }

    #[test]
    fn test_resolve_all_chains() {
        // The refill row of 4s forms a second match, then 1s settle it.
        let mut grid = Grid::from_rows(&[
            &[1, 3, 1],
            &[2, 2, 2],
            &[3, 1, 3],
        ])
        .unwrap();
        let mut src = FixedTiles::new(&[4, 4, 4, 1, 2, 1], 4).unwrap();
        let mut resolver = CascadeResolver::default();
        let report = resolver.resolve_all(&mut grid, &mut src).unwrap();

        assert_eq!(report.passes, 2);
        assert_eq!(report.per_pass, vec![3, 3]);
        assert_eq!(report.popped, 6);
        assert!(find_matches(&grid).is_empty());
    }

    #[test]
    fn test_settled_board_needs_no_pass() {
        let mut grid = Grid::from_rows(&[&[1, 2, 1], &[2, 1, 2]]).unwrap();
        let before = grid.clone();
        let mut src = FixedTiles::new(&[3], 3).unwrap();
        let report = CascadeResolver::default()
            .resolve_all(&mut grid, &mut src)
            .unwrap();
        assert_eq!(report.passes, 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_pathological_source_overflows() {
        let mut grid = Grid::from_rows(&[&[1, 1, 1], &[2, 3, 2]]).unwrap();
        let mut src = FixedTiles::new(&[1], 3).unwrap();
        let mut resolver = CascadeResolver::new(5).unwrap();
        let err = resolver.resolve_all(&mut grid, &mut src).unwrap_err();

        assert_eq!(err, BoardError::CascadeOverflow { passes: 5, cap: 5 });
        // Grid is still fully populated.
        assert_eq!(grid.count_empty(), 0);
    }

    #[test]
    fn test_zero_cap_rejected() {
        assert!(CascadeResolver::new(0).is_err());
    }
}
