//! Terminal "game renderer" module.
//!
//! This is a small, game-oriented rendering layer for terminal gameplay.
//! It avoids ratatui widgets/layout and instead renders into a simple
//! framebuffer that is flushed to a terminal backend.
//!
//! - [`fb`]: styled character framebuffer
//! - [`game_view`]: board, cursor, selection, score panel and overlays
//! - [`playback`]: plays engine animation requests on the game clock and
//!   reports completions
//! - [`renderer`]: diffing terminal writer (raw mode, alternate screen, mouse)

pub mod fb;
pub mod game_view;
pub mod playback;
pub mod renderer;

pub use tui_match3_core as core;
pub use tui_match3_engine as engine;
pub use tui_match3_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{AdapterStatusView, BoardLayout, GameView, HudView, Viewport};
pub use playback::{AnimFrame, TimedPlayback, Tween};
pub use renderer::{encode_frame_into, ChangedRuns, Run, TerminalRenderer};
