use serde::Serialize;

use tui_match3_types::{Coord, EngineState};

/// Read-only copy of the engine state, for renderers and remote observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    pub width: u8,
    pub height: u8,
    /// Rows top to bottom, 0 = empty.
    pub cells: Vec<Vec<u8>>,
    pub state: EngineState,
    pub selected: Option<Coord>,
    /// Incremented by every `init_board`.
    pub board_id: u32,
    pub halted: bool,
}

impl BoardSnapshot {
    /// Whether player intents would currently be applied.
    pub fn playable(&self) -> bool {
        self.state.is_idle() && !self.halted && self.board_id > 0
    }

    pub fn cell(&self, c: Coord) -> Option<u8> {
        if c.col < 0 || c.row < 0 {
            return None;
        }
        self.cells
            .get(c.row as usize)
            .and_then(|row| row.get(c.col as usize))
            .copied()
    }
}
