//! Board error taxonomy.

use thiserror::Error;

use crate::types::Coord;

/// Errors raised by the grid, the resolver, and the engine façade.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// A coordinate outside the grid reached a call boundary.
    #[error("coordinate {coord} is outside the {width}x{height} board")]
    OutOfBounds {
        /// The rejected coordinate.
        coord: Coord,
        /// Board width.
        width: u8,
        /// Board height.
        height: u8,
    },

    /// A swap was attempted between cells that are not 4-neighbours.
    #[error("cells {a} and {b} are not adjacent")]
    NotAdjacent {
        /// First cell.
        a: Coord,
        /// Second cell.
        b: Coord,
    },

    /// Construction parameters make the board ill-posed.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A resolution ran more passes than the safety cap allows.
    #[error("cascade did not settle within {cap} passes")]
    CascadeOverflow {
        /// Passes completed before the resolver gave up.
        passes: u32,
        /// The configured cap.
        cap: u32,
    },
}

impl BoardError {
    /// Whether the error is expected during play and leaves the session usable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BoardError::OutOfBounds { .. } | BoardError::NotAdjacent { .. }
        )
    }
}

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;
