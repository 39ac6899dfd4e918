//! Terminal input module (engine-facing).
//!
//! This module is independent of any UI framework. It maps `crossterm` key
//! events into [`crate::types::GameAction`]s, resolves them against a board
//! cursor into [`crate::types::PlayerIntent`]s, and turns mouse clicks and
//! drags into selections and swaps.

pub mod handler;
pub mod map;
pub mod pointer;

pub use tui_match3_types as types;

pub use handler::CursorController;
pub use map::{handle_key_event, should_quit, swap_direction};
pub use pointer::PointerGesture;
