//! Selection controller - the single armed cell
//!
//! At most one coordinate is armed at any time. The controller does not know
//! the board; bounds and adjacency are checked by the engine.

use tui_match3_types::Coord;

use crate::config::InteractionMode;

/// What a selection intent turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Armed(Coord),
    Disarmed(Coord),
    /// Toggle mode: the selection moved to another cell.
    Moved { from: Coord, to: Coord },
    /// Swipe mode: a second cell was picked; the engine should try the swap.
    SwapRequested(Coord, Coord),
}

#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    armed: Option<Coord>,
    mode: InteractionMode,
}

impl SelectionController {
    pub fn new(mode: InteractionMode) -> Self {
        Self { armed: None, mode }
    }

    pub fn armed(&self) -> Option<Coord> {
        self.armed
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Route a selection at `coord`.
    ///
    /// A swap request leaves the first cell armed; the engine clears it once
    /// the swap has been validated.
    pub fn invert(&mut self, coord: Coord) -> SelectionChange {
        match self.armed {
            None => {
                self.armed = Some(coord);
                SelectionChange::Armed(coord)
            }
            Some(current) if current == coord => {
                self.armed = None;
                SelectionChange::Disarmed(coord)
            }
            Some(current) => match self.mode {
                InteractionMode::Toggle => {
                    self.armed = Some(coord);
                    SelectionChange::Moved {
                        from: current,
                        to: coord,
                    }
                }
                InteractionMode::Swipe => SelectionChange::SwapRequested(current, coord),
            },
        }
    }

    /// Arm `coord` unconditionally (swipe re-arm after a non-adjacent pick).
    pub fn arm(&mut self, coord: Coord) {
        self.armed = Some(coord);
    }

    pub fn clear(&mut self) {
        self.armed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_same_cell_twice() {
        let mut sel = SelectionController::new(InteractionMode::Toggle);
        let c = Coord::new(2, 2);
        assert_eq!(sel.invert(c), SelectionChange::Armed(c));
        assert_eq!(sel.armed(), Some(c));
        assert_eq!(sel.invert(c), SelectionChange::Disarmed(c));
        assert_eq!(sel.armed(), None);
    }

    #[test]
    fn test_toggle_moves_selection() {
        let mut sel = SelectionController::new(InteractionMode::Toggle);
        let a = Coord::new(0, 0);
        let b = Coord::new(4, 4);
        sel.invert(a);
        assert_eq!(sel.invert(b), SelectionChange::Moved { from: a, to: b });
        assert_eq!(sel.armed(), Some(b));
    }

    #[test]
    fn test_swipe_requests_swap() {
        let mut sel = SelectionController::new(InteractionMode::Swipe);
        let a = Coord::new(1, 1);
        let b = Coord::new(1, 2);
        sel.invert(a);
        assert_eq!(sel.invert(b), SelectionChange::SwapRequested(a, b));
        // Still armed until the engine decides.
        assert_eq!(sel.armed(), Some(a));
        sel.clear();
        assert_eq!(sel.armed(), None);
    }
}
