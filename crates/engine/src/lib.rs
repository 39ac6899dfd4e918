//! Board engine - state machine, selection, and the event bus
//!
//! This crate wraps the pure rules of `tui-match3-core` in the façade the
//! game talks to:
//!
//! - [`engine`]: [`BoardEngine`], an explicit `Idle / AwaitingSwapAnimation /
//!   AwaitingCascadeAnimation` state machine advanced only by
//!   [`AnimationDone`] messages
//! - [`selection`]: the single armed cell
//! - [`events`]: signals (`tiles_popped`, `resolution_settled`) and the
//!   animation request/completion channels
//! - [`config`]: serde/TOML configuration
//! - [`playback`]: instant acknowledgement for headless sessions
//!
//! # Example
//!
//! ```
//! use tui_match3_core::SeededTiles;
//! use tui_match3_engine::{run_until_idle, BoardEngine, EngineConfig, InstantPlayback, SignalKind};
//! use tui_match3_types::Coord;
//!
//! let cfg = EngineConfig { width: 8, height: 8, gem_count: 5, ..EngineConfig::default() };
//! let tiles = SeededTiles::new(42, cfg.gem_count).unwrap();
//! let mut engine = BoardEngine::new(cfg, tiles).unwrap();
//! let pops = engine.subscribe(SignalKind::TilesPopped);
//! let mut playback = InstantPlayback::attach(&engine);
//! engine.init_board().unwrap();
//!
//! // Swap a pair; whatever happens, the engine ends idle again.
//! let _ = engine.attempt_swap(Coord::new(0, 0), Coord::new(1, 0));
//! run_until_idle(&mut engine, &mut playback).unwrap();
//! assert!(engine.state().is_idle());
//! let _popped: usize = pops.try_iter().count();
//! ```

pub mod config;
pub mod engine;
pub mod events;
pub mod playback;
pub mod selection;
pub mod snapshot;

pub use config::{EngineConfig, InteractionMode, RejectedSwapPolicy};
pub use engine::{BoardEngine, IgnoreReason, IntentOutcome, Progress};
pub use events::{
    AnimationDone, AnimationId, AnimationKind, AnimationRequest, EventBus, Signal, SignalKind,
    REQUEST_BACKLOG,
};
pub use playback::{run_until_idle, InstantPlayback};
pub use selection::{SelectionChange, SelectionController};
pub use snapshot::BoardSnapshot;
