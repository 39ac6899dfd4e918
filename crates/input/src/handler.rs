//! Keyboard cursor controller.
//!
//! Keeps a board cursor and turns key events into [`PlayerIntent`]s:
//! cursor keys move it (clamped to the board), select/debug/restart act at
//! the cursor, and a swap gesture swaps the cursor cell with its neighbour
//! and follows the moved gem.

use crossterm::event::{KeyEvent, KeyEventKind};

use crate::map::{handle_key_event, swap_direction};
use crate::types::{Coord, GameAction, PlayerIntent};

#[derive(Debug, Clone)]
pub struct CursorController {
    cursor: Coord,
    width: u8,
    height: u8,
}

impl CursorController {
    /// Cursor starting at the board centre.
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            cursor: Coord::new(i16::from(width) / 2, i16::from(height) / 2),
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn cursor(&self) -> Coord {
        self.cursor
    }

    /// Move the cursor to `c` if it lies on the board.
    pub fn set_cursor(&mut self, c: Coord) -> bool {
        if self.contains(c) {
            self.cursor = c;
            true
        } else {
            false
        }
    }

    fn contains(&self, c: Coord) -> bool {
        c.col >= 0 && c.row >= 0 && c.col < i16::from(self.width) && c.row < i16::from(self.height)
    }

    fn step(&mut self, dc: i16, dr: i16) {
        let next = self.cursor.offset(dc, dr);
        if self.contains(next) {
            self.cursor = next;
        }
    }

    /// Apply an action; cursor moves produce no intent.
    pub fn apply(&mut self, action: GameAction) -> Option<PlayerIntent> {
        match action {
            GameAction::CursorLeft => {
                self.step(-1, 0);
                None
            }
            GameAction::CursorRight => {
                self.step(1, 0);
                None
            }
            GameAction::CursorUp => {
                self.step(0, -1);
                None
            }
            GameAction::CursorDown => {
                self.step(0, 1);
                None
            }
            GameAction::Select => Some(PlayerIntent::Select(self.cursor)),
            GameAction::DebugCycle => Some(PlayerIntent::DebugCycle(self.cursor)),
            GameAction::Restart => Some(PlayerIntent::Restart),
        }
    }

    /// Swap the cursor cell with its neighbour in `(dc, dr)`.
    ///
    /// Returns `None` at the board edge.
    pub fn swap_toward(&mut self, dc: i16, dr: i16) -> Option<PlayerIntent> {
        let from = self.cursor;
        let to = from.offset(dc, dr);
        if !self.contains(to) {
            return None;
        }
        self.cursor = to;
        Some(PlayerIntent::Swap(from, to))
    }

    /// Full key handling: swap gestures first, then plain actions.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PlayerIntent> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if let Some((dc, dr)) = swap_direction(key) {
            return self.swap_toward(dc, dr);
        }
        handle_key_event(key).and_then(|action| self.apply(action))
    }
}
