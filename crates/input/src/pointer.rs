//! Mouse gestures.
//!
//! Press and release on the same cell is a selection. Dragging onto a
//! neighbouring cell is a swap. A press with Ctrl held is the debug key.
//! Screen positions go through the [`CoordMapper`]; positions outside the
//! board still produce intents so the engine can reject them.

use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::types::{Coord, CoordMapper, PlayerIntent};

#[derive(Debug, Clone)]
pub struct PointerGesture {
    mapper: CoordMapper,
    pressed: Option<Coord>,
}

impl PointerGesture {
    pub fn new(mapper: CoordMapper) -> Self {
        Self {
            mapper,
            pressed: None,
        }
    }

    /// Update the geometry (terminal resized).
    pub fn set_mapper(&mut self, mapper: CoordMapper) {
        self.mapper = mapper;
    }

    pub fn pressed(&self) -> Option<Coord> {
        self.pressed
    }

    pub fn handle_mouse(&mut self, ev: MouseEvent) -> Option<PlayerIntent> {
        let at = self.mapper.screen_to_board(ev.column, ev.row);
        match ev.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if ev.modifiers.contains(KeyModifiers::CONTROL) {
                    self.pressed = None;
                    return Some(PlayerIntent::DebugCycle(at));
                }
                self.pressed = Some(at);
                None
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let from = self.pressed.take()?;
                if from == at {
                    Some(PlayerIntent::Select(at))
                } else if from.is_adjacent(at) {
                    Some(PlayerIntent::Swap(from, at))
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}
