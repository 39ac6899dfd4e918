//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no behaviour beyond small conversions, making
//! them usable in any context (board engine, terminal rendering, AI protocol).
//!
//! # Board Geometry
//!
//! - **Columns** grow left to right, **rows** grow top to bottom.
//! - Gravity pulls tiles toward larger row indices.
//! - Default board: 14 columns x 20 rows with 8 gem kinds.
//!
//! # Scoring Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `POINTS_PER_GEM` | 25 | Base points for each removed gem |
//! | `COMBO_CAP` | 15 | Maximum combo multiplier |
//! | `COMBO_RESET_MS` | 4000 | Idle time after which the combo drops back to x1 |
//! | `LEVEL_SCORE_STEP` | 5000 | Points per level |
//!
//! # Examples
//!
//! ```
//! use tui_match3_types::{Coord, GameAction, TileKind};
//!
//! let a = Coord::new(2, 3);
//! assert!(a.is_adjacent(Coord::new(2, 4)));
//! assert!(!a.is_adjacent(Coord::new(3, 4)));
//!
//! let kind = TileKind::new(8).unwrap();
//! assert_eq!(kind.next(8), TileKind::new(1).unwrap());
//!
//! assert_eq!(GameAction::from_str("select"), Some(GameAction::Select));
//! ```

use serde::{Deserialize, Serialize};

/// Default board width in columns
pub const DEFAULT_BOARD_WIDTH: u8 = 14;

/// Default board height in rows
pub const DEFAULT_BOARD_HEIGHT: u8 = 20;

/// Default number of distinct gem kinds
pub const DEFAULT_GEM_COUNT: u8 = 8;

/// Smallest gem count for which matching is well-posed
pub const MIN_GEM_COUNT: u8 = 3;

/// Largest gem count the board view has distinct colours and glyphs for
pub const MAX_GEM_COUNT: u8 = 8;

/// Minimum run length that counts as a match
pub const MIN_RUN: usize = 3;

/// Default cap on resolution passes for a single swap
pub const DEFAULT_MAX_CASCADE_PASSES: u32 = 64;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Duration of the swap animation
pub const SWAP_ANIM_MS: u32 = 140;

/// Duration of the swap-then-revert animation for a rejected swap
pub const REJECTED_SWAP_ANIM_MS: u32 = 260;

/// Duration of the pop phase of a cascade pass
pub const POP_ANIM_MS: u32 = 180;

/// Duration of the fall/refill phase of a cascade pass
pub const FALL_ANIM_MS: u32 = 220;

/// Base points per removed gem
pub const POINTS_PER_GEM: u32 = 25;

/// Combo multiplier ceiling
pub const COMBO_CAP: u32 = 15;

/// Milliseconds without a match before the combo resets
pub const COMBO_RESET_MS: u32 = 4000;

/// Points per level
pub const LEVEL_SCORE_STEP: u32 = 5000;

/// Board coordinate: `col` left to right, `row` top to bottom.
///
/// Signed so that coordinates coming from a screen mapper can lie outside
/// the board; the engine rejects those instead of clamping them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub col: i16,
    pub row: i16,
}

impl Coord {
    pub const fn new(col: i16, row: i16) -> Self {
        Self { col, row }
    }

    /// Manhattan distance between two coordinates
    pub fn manhattan(&self, other: Coord) -> u32 {
        let dc = (i32::from(self.col) - i32::from(other.col)).unsigned_abs();
        let dr = (i32::from(self.row) - i32::from(other.row)).unsigned_abs();
        dc + dr
    }

    /// 4-neighbourhood test (Manhattan distance exactly 1)
    pub fn is_adjacent(&self, other: Coord) -> bool {
        self.manhattan(other) == 1
    }

    /// Coordinate shifted by `(dc, dr)`
    pub fn offset(&self, dc: i16, dr: i16) -> Coord {
        Coord::new(self.col.saturating_add(dc), self.row.saturating_add(dr))
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Gem type, drawn from `1..=gem_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileKind(u8);

impl TileKind {
    /// The first kind of every enumeration.
    pub const FIRST: TileKind = TileKind(1);

    /// Create a tile kind; zero is reserved for "empty" in flat encodings.
    pub const fn new(value: u8) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(Self(value))
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Next kind in the enumeration, wrapping `gem_count` back to 1.
    pub fn next(self, gem_count: u8) -> Self {
        if self.0 >= gem_count {
            Self::FIRST
        } else {
            Self(self.0 + 1)
        }
    }
}

/// A cell on the board
///
/// - `None`: Empty cell
/// - `Some(TileKind)`: Cell holding a gem
pub type Cell = Option<TileKind>;

/// Encode a cell as a byte (0 = empty).
pub fn cell_to_u8(cell: Cell) -> u8 {
    cell.map(TileKind::get).unwrap_or(0)
}

/// Board engine lifecycle state.
///
/// Player intents are only accepted in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    #[default]
    Idle,
    AwaitingSwapAnimation,
    AwaitingCascadeAnimation,
}

impl EngineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineState::Idle => "idle",
            EngineState::AwaitingSwapAnimation => "awaiting_swap_animation",
            EngineState::AwaitingCascadeAnimation => "awaiting_cascade_animation",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, EngineState::Idle)
    }
}

/// Keyboard-level actions, before they are resolved against a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Move the board cursor one column left
    CursorLeft,
    /// Move the board cursor one column right
    CursorRight,
    /// Move the board cursor one row up
    CursorUp,
    /// Move the board cursor one row down
    CursorDown,
    /// Toggle selection of the cell under the cursor
    Select,
    /// Cycle the gem under the cursor (honoured only in debug mode)
    DebugCycle,
    /// Start a new board
    Restart,
}

impl GameAction {
    /// Parse action from string (for AI protocol)
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_match3_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("cursorLeft"), Some(GameAction::CursorLeft));
    /// assert_eq!(GameAction::from_str("RESTART"), Some(GameAction::Restart));
    /// assert_eq!(GameAction::from_str("hardDrop"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cursorleft" => Some(GameAction::CursorLeft),
            "cursorright" => Some(GameAction::CursorRight),
            "cursorup" => Some(GameAction::CursorUp),
            "cursordown" => Some(GameAction::CursorDown),
            "select" => Some(GameAction::Select),
            "debugcycle" => Some(GameAction::DebugCycle),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    /// Convert to camelCase string for AI protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::CursorLeft => "cursorLeft",
            GameAction::CursorRight => "cursorRight",
            GameAction::CursorUp => "cursorUp",
            GameAction::CursorDown => "cursorDown",
            GameAction::Select => "select",
            GameAction::DebugCycle => "debugCycle",
            GameAction::Restart => "restart",
        }
    }
}

/// Board-level player intents, the unit the engine consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerIntent {
    /// Toggle / route selection at a coordinate
    Select(Coord),
    /// Swap two cells directly (swipe gesture or remote controller)
    Swap(Coord, Coord),
    /// Debug escape hatch: cycle the gem kind at a coordinate
    DebugCycle(Coord),
    /// Start a new board
    Restart,
}

/// Screen-to-board geometry.
///
/// Pure arithmetic, no state; the result may lie outside the board and must
/// be bounds-checked by the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordMapper {
    /// Screen column of the board's top-left cell
    pub origin_x: u16,
    /// Screen row of the board's top-left cell
    pub origin_y: u16,
    /// Screen columns per board cell
    pub cell_w: u16,
    /// Screen rows per board cell
    pub cell_h: u16,
}

impl CoordMapper {
    pub fn new(origin_x: u16, origin_y: u16, cell_w: u16, cell_h: u16) -> Self {
        Self {
            origin_x,
            origin_y,
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
        }
    }

    /// Map a screen position to a board coordinate (possibly out of range).
    pub fn screen_to_board(&self, x: u16, y: u16) -> Coord {
        let dx = i32::from(x) - i32::from(self.origin_x);
        let dy = i32::from(y) - i32::from(self.origin_y);
        let col = dx.div_euclid(i32::from(self.cell_w.max(1)));
        let row = dy.div_euclid(i32::from(self.cell_h.max(1)));
        Coord::new(clamp_i16(col), clamp_i16(row))
    }

    /// Top-left screen position of a board cell, if it is representable.
    pub fn board_to_screen(&self, coord: Coord) -> Option<(u16, u16)> {
        if coord.col < 0 || coord.row < 0 {
            return None;
        }
        let x = u32::from(self.origin_x) + coord.col as u32 * u32::from(self.cell_w);
        let y = u32::from(self.origin_y) + coord.row as u32 * u32::from(self.cell_h);
        Some((u16::try_from(x).ok()?, u16::try_from(y).ok()?))
    }
}

fn clamp_i16(v: i32) -> i16 {
    v.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}
