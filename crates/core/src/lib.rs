//! Core board logic - pure, deterministic, and testable
//!
//! This crate holds the match-3 rules: the grid, match detection, initial
//! layout generation, and cascade resolution. It has **no dependencies** on
//! rendering, input, or networking:
//!
//! - **Deterministic**: every new gem comes from an injected [`TileSource`];
//!   the same seed produces the same board and the same cascades
//! - **Testable**: grids are built from literal rows in tests
//! - **Portable**: runs headless (benches, property tests, remote control)
//!
//! # Module Structure
//!
//! - [`grid`]: bounds-checked tile matrix with swap, gravity and refill
//! - [`matcher`]: run detection with merged L/T/+ groups
//! - [`layout`]: match-free initial population
//! - [`cascade`]: stepwise remove/fall/refill passes with a safety cap
//! - [`rng`]: injected gem sources
//! - [`scoring`]: score, combo, level and high score
//! - [`error`]: the shared error taxonomy
//!
//! # Example
//!
//! ```
//! use tui_match3_core::{find_matches, populate_match_free, CascadeResolver, Grid, SeededTiles};
//! use tui_match3_core::types::Coord;
//!
//! let mut grid = Grid::new(8, 8).unwrap();
//! let mut tiles = SeededTiles::new(12345, 6).unwrap();
//! populate_match_free(&mut grid, &mut tiles).unwrap();
//! assert!(find_matches(&grid).is_empty());
//!
//! // Swap two neighbours and settle whatever that produced.
//! grid.swap(Coord::new(0, 0), Coord::new(1, 0)).unwrap();
//! CascadeResolver::default().resolve_all(&mut grid, &mut tiles).unwrap();
//! assert!(find_matches(&grid).is_empty());
//! ```

pub mod cascade;
pub mod error;
pub mod grid;
pub mod layout;
pub mod matcher;
pub mod rng;
pub mod scoring;

pub use tui_match3_types as types;

// Re-export commonly used types for convenience
pub use cascade::{CascadeReport, CascadeResolver, CascadeStep};
pub use error::{BoardError, BoardResult};
pub use grid::{Grid, TileMove};
pub use layout::populate_match_free;
pub use matcher::{find_matches, has_match, MatchGroup};
pub use rng::{FixedTiles, SeededTiles, TileSource};
pub use scoring::{ScoreKeeper, ScoreUpdate, ScoringConfig};
