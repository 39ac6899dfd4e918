//! Grid module - owns the tile matrix
//!
//! The grid is a `width x height` matrix stored as a flat row-major vector.
//! Coordinates are `(col, row)` with row 0 at the top; gravity pulls tiles
//! toward larger row indices.
//!
//! Every accessor bounds-checks: an out-of-range coordinate is reported as
//! [`BoardError::OutOfBounds`] and never touches memory.

use crate::error::{BoardError, BoardResult};
use crate::rng::TileSource;
use crate::types::{cell_to_u8, Cell, Coord, TileKind};

/// One tile moved by gravity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileMove {
    pub from: Coord,
    pub to: Coord,
    pub kind: TileKind,
}

/// The board matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u8,
    height: u8,
    /// Flat array of cells, row-major order (row * width + col)
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an all-empty grid.
    pub fn new(width: u8, height: u8) -> BoardResult<Self> {
        if width == 0 || height == 0 {
            return Err(BoardError::InvalidConfiguration(format!(
                "board dimensions must be positive, got {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            cells: vec![None; usize::from(width) * usize::from(height)],
        })
    }

    /// Build a grid from rows of raw values (0 = empty).
    ///
    /// ```
    /// use tui_match3_core::Grid;
    /// use tui_match3_core::types::Coord;
    ///
    /// let grid = Grid::from_rows(&[&[1, 2], &[0, 3]]).unwrap();
    /// assert_eq!(grid.width(), 2);
    /// assert_eq!(grid.get(Coord::new(0, 1)).unwrap(), None);
    /// ```
    pub fn from_rows(rows: &[&[u8]]) -> BoardResult<Self> {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.iter().any(|r| r.len() != width) {
            return Err(BoardError::InvalidConfiguration(
                "rows must all have the same length".to_string(),
            ));
        }
        let (w, h) = match (u8::try_from(width), u8::try_from(height)) {
            (Ok(w), Ok(h)) => (w, h),
            _ => {
                return Err(BoardError::InvalidConfiguration(format!(
                    "board of {width}x{height} is too large"
                )))
            }
        };
        let mut grid = Self::new(w, h)?;
        for (i, &v) in rows.iter().flat_map(|r| r.iter()).enumerate() {
            grid.cells[i] = TileKind::new(v);
        }
        Ok(grid)
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Calculate flat index from a coordinate
    #[inline(always)]
    fn index(&self, c: Coord) -> Option<usize> {
        if c.col < 0 || c.row < 0 || c.col >= i16::from(self.width) || c.row >= i16::from(self.height)
        {
            return None;
        }
        Some(c.row as usize * usize::from(self.width) + c.col as usize)
    }

    fn checked_index(&self, c: Coord) -> BoardResult<usize> {
        self.index(c).ok_or(BoardError::OutOfBounds {
            coord: c,
            width: self.width,
            height: self.height,
        })
    }

    /// Whether `c` lies on the board.
    #[inline]
    pub fn is_valid_coord(&self, c: Coord) -> bool {
        self.index(c).is_some()
    }

    pub fn get(&self, c: Coord) -> BoardResult<Cell> {
        let idx = self.checked_index(c)?;
        Ok(self.cells[idx])
    }

    pub fn set(&mut self, c: Coord, cell: Cell) -> BoardResult<()> {
        let idx = self.checked_index(c)?;
        self.cells[idx] = cell;
        Ok(())
    }

    /// Exchange the contents of two cells. No match awareness.
    pub fn swap(&mut self, a: Coord, b: Coord) -> BoardResult<()> {
        let ia = self.checked_index(a)?;
        let ib = self.checked_index(b)?;
        self.cells.swap(ia, ib);
        Ok(())
    }

    /// Stable gravity in one column.
    ///
    /// Returns the number of empty cells left at the top of the column.
    pub fn column_compact(&mut self, col: i16) -> BoardResult<usize> {
        self.compact_column(col, None)
    }

    /// Like [`Grid::column_compact`], also recording every tile that moved.
    pub fn column_compact_tracked(
        &mut self,
        col: i16,
        moves: &mut Vec<TileMove>,
    ) -> BoardResult<usize> {
        self.compact_column(col, Some(moves))
    }

    fn compact_column(
        &mut self,
        col: i16,
        mut moves: Option<&mut Vec<TileMove>>,
    ) -> BoardResult<usize> {
        self.checked_index(Coord::new(col, 0))?;
        let width = usize::from(self.width);
        let col_u = col as usize;
        let height = usize::from(self.height);

        // Two-pointer scan from the bottom; tiles keep their relative order.
        let mut write = height;
        for read in (0..height).rev() {
            let cell = self.cells[read * width + col_u];
            if let Some(kind) = cell {
                write -= 1;
                if write != read {
                    self.cells[write * width + col_u] = cell;
                    self.cells[read * width + col_u] = None;
                    if let Some(m) = moves.as_deref_mut() {
                        m.push(TileMove {
                            from: Coord::new(col, read as i16),
                            to: Coord::new(col, write as i16),
                            kind,
                        });
                    }
                }
            }
        }
        Ok(write)
    }

    /// Fill every empty cell from `source`, in row-major order.
    pub fn fill_empty<S: TileSource + ?Sized>(&mut self, source: &mut S) -> Vec<(Coord, TileKind)> {
        let width = usize::from(self.width);
        let mut filled = Vec::new();
        for (i, cell) in self.cells.iter_mut().enumerate() {
            if cell.is_none() {
                let kind = source.next_kind();
                *cell = Some(kind);
                filled.push((Coord::new((i % width) as i16, (i / width) as i16), kind));
            }
        }
        filled
    }

    /// Number of empty cells.
    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// Empty every cell.
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// All coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let (w, h) = (i16::from(self.width), i16::from(self.height));
        (0..h).flat_map(move |row| (0..w).map(move |col| Coord::new(col, row)))
    }

    /// Raw cells, row-major.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cells as rows of bytes (0 = empty).
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(usize::from(self.width))
            .map(|row| row.iter().map(|&c| cell_to_u8(c)).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::FixedTiles;

    #[test]
    fn test_new_grid_is_empty() {
        let grid = Grid::new(4, 3).unwrap();
        assert_eq!(grid.count_empty(), 12);
        assert!(Grid::new(0, 3).is_err());
        assert!(Grid::new(3, 0).is_err());
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        assert!(Grid::from_rows(&[&[1, 2], &[1]]).is_err());
        assert!(Grid::from_rows(&[]).is_err());
    }

    #[test]
    fn test_bounds() {
        let grid = Grid::new(3, 2).unwrap();
        assert!(grid.is_valid_coord(Coord::new(0, 0)));
        assert!(grid.is_valid_coord(Coord::new(2, 1)));
        assert!(!grid.is_valid_coord(Coord::new(3, 0)));
        assert!(!grid.is_valid_coord(Coord::new(0, 2)));
        assert!(!grid.is_valid_coord(Coord::new(-1, 0)));

        assert_eq!(
            grid.get(Coord::new(3, 0)),
            Err(BoardError::OutOfBounds {
                coord: Coord::new(3, 0),
                width: 3,
                height: 2
            })
        );
    }

    #[test]
    fn test_swap_twice_restores() {
        let mut grid = Grid::from_rows(&[&[1, 2, 3], &[4, 5, 6]]).unwrap();
        let before = grid.clone();
        grid.swap(Coord::new(0, 0), Coord::new(2, 1)).unwrap();
        assert_eq!(grid.to_rows(), vec![vec![6, 2, 3], vec![4, 5, 1]]);
        grid.swap(Coord::new(0, 0), Coord::new(2, 1)).unwrap();
        assert_eq!(grid, before);
    }

    #[test]
    fn test_swap_out_of_bounds_leaves_grid() {
        let mut grid = Grid::from_rows(&[&[1, 2]]).unwrap();
        let before = grid.clone();
        assert!(grid.swap(Coord::new(0, 0), Coord::new(5, 0)).is_err());
        assert_eq!(grid, before);
    }

    #[test]
    fn test_column_compact_is_stable() {
        // Column 0 top to bottom: 1, _, 2, _
        let mut grid = Grid::from_rows(&[&[1, 9], &[0, 9], &[2, 9], &[0, 9]]).unwrap();
        let mut moves = Vec::new();
        let emptied = grid.column_compact_tracked(0, &mut moves).unwrap();

        assert_eq!(emptied, 2);
        let col: Vec<u8> = grid.to_rows().iter().map(|r| r[0]).collect();
        assert_eq!(col, vec![0, 0, 1, 2]);
        // Other column untouched
        assert!(grid.to_rows().iter().all(|r| r[1] == 9));

        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0].from, Coord::new(0, 2));
        assert_eq!(moves[0].to, Coord::new(0, 3));
        assert_eq!(moves[1].from, Coord::new(0, 0));
        assert_eq!(moves[1].to, Coord::new(0, 2));
    }

    #[test]
    fn test_column_compact_full_column() {
        let mut grid = Grid::from_rows(&[&[1], &[2]]).unwrap();
        assert_eq!(grid.column_compact(0).unwrap(), 0);
        assert!(grid.column_compact(1).is_err());
    }

    #[test]
    fn test_fill_empty_row_major() {
        let mut grid = Grid::from_rows(&[&[0, 1], &[0, 0]]).unwrap();
        let mut src = FixedTiles::new(&[3, 2, 1], 3).unwrap();
        let filled = grid.fill_empty(&mut src);

        assert_eq!(grid.count_empty(), 0);
        assert_eq!(grid.to_rows(), vec![vec![3, 1], vec![2, 1]]);
        let coords: Vec<Coord> = filled.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            coords,
            vec![Coord::new(0, 0), Coord::new(0, 1), Coord::new(1, 1)]
        );
    }

    #[test]
    fn test_coords_row_major() {
        let grid = Grid::new(2, 2).unwrap();
        let coords: Vec<Coord> = grid.coords().collect();
        assert_eq!(
            coords,
            vec![
                Coord::new(0, 0),
                Coord::new(1, 0),
                Coord::new(0, 1),
                Coord::new(1, 1)
            ]
        );
    }
}
