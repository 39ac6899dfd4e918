//! Initial layout generation
//!
//! Cells are filled row-major. A drawn kind is re-rolled when it would
//! complete a run with the two cells to its left or the two cells above it.
//! At most two kinds can conflict at any cell, so with three or more kinds a
//! legal choice always exists; after a bounded number of re-rolls the lowest
//! legal kind is taken, which keeps generation total even for a source that
//! keeps returning the same gem.

use arrayvec::ArrayVec;

use crate::error::{BoardError, BoardResult};
use crate::grid::Grid;
use crate::rng::TileSource;
use crate::types::{Coord, TileKind, MIN_GEM_COUNT};

/// Draws per cell before falling back to the lowest legal kind.
pub const MAX_REROLLS: usize = 16;

fn conflicts(grid: &Grid, c: Coord) -> ArrayVec<TileKind, 2> {
    let mut out = ArrayVec::new();
    let pair = |a: Coord, b: Coord| match (grid.get(a), grid.get(b)) {
        (Ok(Some(x)), Ok(Some(y))) if x == y => Some(x),
        _ => None,
    };
    if let Some(k) = pair(c.offset(-1, 0), c.offset(-2, 0)) {
        out.push(k);
    }
    if let Some(k) = pair(c.offset(0, -1), c.offset(0, -2)) {
        if !out.contains(&k) {
            out.push(k);
        }
    }
    out
}

/// Overwrite every cell so that the grid contains no match.
///
/// Fails only when the source offers fewer than three kinds.
pub fn populate_match_free<S: TileSource + ?Sized>(
    grid: &mut Grid,
    source: &mut S,
) -> BoardResult<()> {
    let gem_count = source.gem_count();
    if gem_count < MIN_GEM_COUNT {
        return Err(BoardError::InvalidConfiguration(format!(
            "a match-free layout needs at least {MIN_GEM_COUNT} gem kinds, got {gem_count}"
        )));
    }

    grid.clear();
    let coords: Vec<Coord> = grid.coords().collect();
    let mut fallbacks = 0usize;
    for c in coords {
        let banned = conflicts(grid, c);
        let mut chosen = None;
        for _ in 0..MAX_REROLLS {
            let k = source.next_kind();
            if !banned.contains(&k) {
                chosen = Some(k);
                break;
            }
        }
        let kind = match chosen {
            Some(k) => k,
            None => {
                fallbacks += 1;
                (1..=gem_count)
                    .filter_map(TileKind::new)
                    .find(|k| !banned.contains(k))
                    .unwrap_or(TileKind::FIRST)
            }
        };
        grid.set(c, Some(kind))?;
    }

    if fallbacks > 0 {
        tracing::debug!(fallbacks, "layout used deterministic fallback");
    }
    Ok(())
}
