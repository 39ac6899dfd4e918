//! TUI Match-3 (workspace facade crate).
//!
//! Re-exports the member crates as `tui_match3::{types, core, engine, input,
//! term, adapter}` and holds the application parts the binary is built
//! from: configuration, logging, high-score storage and the playing session.

pub use tui_match3_adapter as adapter;
pub use tui_match3_core as core;
pub use tui_match3_engine as engine;
pub use tui_match3_input as input;
pub use tui_match3_term as term;
pub use tui_match3_types as types;

pub mod config;
pub mod highscore;
pub mod logging;
pub mod session;

pub use config::{CliArgs, GameConfig};
pub use highscore::HighScoreStore;
pub use session::GameSession;
