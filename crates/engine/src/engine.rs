//! Board engine - the façade the game talks to
//!
//! The engine owns the grid and runs an explicit state machine:
//!
//! ```text
//!            attempt_swap (match)            AnimationDone
//!   Idle ──────────────────────> AwaitingSwap ─────────────> step ─┐
//!    ^  \ attempt_swap (no match,                                  v
//!    │   \ Animate policy) ──> AwaitingSwap ──AnimationDone──> Idle
//!    │                                                             │
//!    │        AnimationDone, no match                              │
//!    └──────────────────────── AwaitingCascade <───────────────────┘
//!                                  │   ^
//!                                  └───┘ AnimationDone, matches: step again
//! ```
//!
//! Player intents are applied only in `Idle`; anything arriving while an
//! animation is pending is reported as ignored and never touches the grid.

use tui_match3_core::{
    find_matches, populate_match_free, BoardError, BoardResult, CascadeResolver, Grid,
    MatchGroup, TileSource,
};
use tui_match3_types::{Coord, EngineState, PlayerIntent, TileKind};

use crate::config::{EngineConfig, InteractionMode, RejectedSwapPolicy};
use crate::events::{
    AnimationDone, AnimationId, AnimationKind, AnimationRequest, EventBus, Signal, SignalKind,
};
use crate::selection::{SelectionChange, SelectionController};
use crate::snapshot::BoardSnapshot;

use crossbeam_channel::{Receiver, Sender};

/// Why an intent was dropped without effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// `init_board` has not been called yet.
    NotInitialized,
    /// An animation is pending.
    Busy(EngineState),
    /// The debug key is disabled in the configuration.
    DebugDisabled,
}

/// Result of a player intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentOutcome {
    Armed(Coord),
    Disarmed(Coord),
    /// The selection moved (toggle mode, or a non-adjacent swipe).
    Moved { from: Coord, to: Coord },
    /// The swap formed a match and resolution has started.
    SwapAccepted { a: Coord, b: Coord },
    /// The swap formed no match; the grid is unchanged.
    SwapRejected { a: Coord, b: Coord },
    KindChanged { coord: Coord, kind: TileKind },
    Restarted,
    Ignored(IgnoreReason),
}

/// Result of delivering an animation completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// The id did not match the pending animation.
    Stale,
    /// Back to idle without a resolution (rejected swap).
    Idle,
    /// A resolution pass ran; its animation is now pending.
    Cascading { pass: u32 },
    /// The cascade finished.
    Settled { passes: u32, popped: usize },
}

#[derive(Debug, Clone)]
enum Pending {
    Swap {
        id: AnimationId,
        matches: Vec<MatchGroup>,
    },
    RejectedSwap {
        id: AnimationId,
    },
    Cascade {
        id: AnimationId,
    },
}

impl Pending {
    fn id(&self) -> AnimationId {
        match self {
            Pending::Swap { id, .. } | Pending::RejectedSwap { id } | Pending::Cascade { id } => *id,
        }
    }
}

/// The match-3 board engine.
#[derive(Debug)]
pub struct BoardEngine<R: TileSource> {
    config: EngineConfig,
    grid: Grid,
    source: R,
    selection: SelectionController,
    resolver: CascadeResolver,
    bus: EventBus,
    pending: Option<Pending>,
    /// Gems removed in the current resolution.
    resolution_popped: usize,
    board_id: u32,
    halted: Option<BoardError>,
}

impl<R: TileSource> BoardEngine<R> {
    /// Build an engine; the board stays empty until [`BoardEngine::init_board`].
    pub fn new(config: EngineConfig, source: R) -> BoardResult<Self> {
        config.validate()?;
        if source.gem_count() != config.gem_count {
            return Err(BoardError::InvalidConfiguration(format!(
                "tile source draws {} kinds but the board is configured for {}",
                source.gem_count(),
                config.gem_count
            )));
        }
        let grid = Grid::new(config.width, config.height)?;
        let resolver = CascadeResolver::new(config.max_cascade_passes)?;
        let selection = SelectionController::new(config.interaction);
        Ok(Self {
            config,
            grid,
            source,
            selection,
            resolver,
            bus: EventBus::new(),
            pending: None,
            resolution_popped: 0,
            board_id: 0,
            halted: None,
        })
    }

    // Accessors

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> EngineState {
        match self.pending {
            None => EngineState::Idle,
            Some(Pending::Swap { .. }) | Some(Pending::RejectedSwap { .. }) => {
                EngineState::AwaitingSwapAnimation
            }
            Some(Pending::Cascade { .. }) => EngineState::AwaitingCascadeAnimation,
        }
    }

    pub fn selected(&self) -> Option<Coord> {
        self.selection.armed()
    }

    pub fn board_id(&self) -> u32 {
        self.board_id
    }

    pub fn is_initialized(&self) -> bool {
        self.board_id > 0
    }

    /// Whether a cascade overflow stopped this session.
    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    /// Id of the animation the engine is waiting for, if any.
    pub fn pending_animation(&self) -> Option<AnimationId> {
        self.pending.as_ref().map(Pending::id)
    }

    pub fn is_valid_coord(&self, c: Coord) -> bool {
        self.grid.is_valid_coord(c)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            cells: self.grid.to_rows(),
            state: self.state(),
            selected: self.selection.armed(),
            board_id: self.board_id,
            halted: self.is_halted(),
        }
    }

    // Event bus passthroughs

    pub fn subscribe(&mut self, kind: SignalKind) -> Receiver<Signal> {
        self.bus.subscribe(kind)
    }

    pub fn subscribe_all(&mut self) -> Receiver<Signal> {
        self.bus.subscribe_all()
    }

    pub fn animation_requests(&self) -> Receiver<AnimationRequest> {
        self.bus.animation_requests()
    }

    pub fn completion_sender(&self) -> Sender<AnimationDone> {
        self.bus.completion_sender()
    }

    // Lifecycle

    /// (Re)populate the board with a match-free layout and reset all state.
    pub fn init_board(&mut self) -> BoardResult<()> {
        populate_match_free(&mut self.grid, &mut self.source)?;
        self.selection.clear();
        self.resolver.begin();
        self.pending = None;
        self.resolution_popped = 0;
        self.halted = None;
        self.bus.discard_animations();
        self.board_id = self.board_id.wrapping_add(1).max(1);
        tracing::debug!(board_id = self.board_id, "board initialised");
        Ok(())
    }

    /// Common gate for every player intent.
    fn gate(&self) -> BoardResult<Option<IgnoreReason>> {
        if let Some(err) = &self.halted {
            return Err(err.clone());
        }
        if !self.is_initialized() {
            return Ok(Some(IgnoreReason::NotInitialized));
        }
        let state = self.state();
        if !state.is_idle() {
            tracing::debug!(state = state.as_str(), "intent ignored while busy");
            return Ok(Some(IgnoreReason::Busy(state)));
        }
        Ok(None)
    }

    fn check_bounds(&self, c: Coord) -> BoardResult<()> {
        if self.grid.is_valid_coord(c) {
            Ok(())
        } else {
            Err(BoardError::OutOfBounds {
                coord: c,
                width: self.grid.width(),
                height: self.grid.height(),
            })
        }
    }

    /// Dispatch a board-level intent.
    pub fn apply_intent(&mut self, intent: PlayerIntent) -> BoardResult<IntentOutcome> {
        match intent {
            PlayerIntent::Select(c) => self.invert_tile_selection_state(c),
            PlayerIntent::Swap(a, b) => self.attempt_swap(a, b),
            PlayerIntent::DebugCycle(c) => self.debug_change_key(c),
            PlayerIntent::Restart => {
                self.init_board()?;
                Ok(IntentOutcome::Restarted)
            }
        }
    }

    /// Select, deselect, move the selection, or (swipe mode) swap.
    pub fn invert_tile_selection_state(&mut self, coord: Coord) -> BoardResult<IntentOutcome> {
        if let Some(reason) = self.gate()? {
            return Ok(IntentOutcome::Ignored(reason));
        }
        self.check_bounds(coord)?;

        match self.selection.invert(coord) {
            SelectionChange::Armed(c) => Ok(IntentOutcome::Armed(c)),
            SelectionChange::Disarmed(c) => Ok(IntentOutcome::Disarmed(c)),
            SelectionChange::Moved { from, to } => Ok(IntentOutcome::Moved { from, to }),
            SelectionChange::SwapRequested(a, b) => match self.attempt_swap(a, b) {
                Err(BoardError::NotAdjacent { .. })
                    if self.config.interaction == InteractionMode::Swipe =>
                {
                    self.selection.arm(b);
                    Ok(IntentOutcome::Moved { from: a, to: b })
                }
                other => other,
            },
        }
    }

    /// Swap two 4-adjacent cells if the swap forms a match.
    pub fn attempt_swap(&mut self, a: Coord, b: Coord) -> BoardResult<IntentOutcome> {
        if let Some(reason) = self.gate()? {
            return Ok(IntentOutcome::Ignored(reason));
        }
        self.check_bounds(a)?;
        self.check_bounds(b)?;
        if !a.is_adjacent(b) {
            tracing::debug!(%a, %b, "swap rejected: not adjacent");
            return Err(BoardError::NotAdjacent { a, b });
        }
        self.selection.clear();

        self.grid.swap(a, b)?;
        let matches = find_matches(&self.grid);
        if matches.is_empty() {
            self.grid.swap(a, b)?;
            let awaits = self.config.rejected_swap == RejectedSwapPolicy::Animate;
            let id = self.bus.request(AnimationKind::RejectedSwap { a, b }, awaits);
            if awaits {
                self.pending = Some(Pending::RejectedSwap { id });
            }
            tracing::debug!(%a, %b, "swap rejected: no match");
            return Ok(IntentOutcome::SwapRejected { a, b });
        }

        self.resolver.begin();
        self.resolution_popped = 0;
        let id = self.bus.request(AnimationKind::Swap { a, b }, true);
        self.pending = Some(Pending::Swap { id, matches });
        tracing::debug!(%a, %b, "swap accepted");
        Ok(IntentOutcome::SwapAccepted { a, b })
    }

    /// Cycle the gem at `coord` to the next kind. Debug builds of the
    /// configuration only; no match check, no animation.
    pub fn debug_change_key(&mut self, coord: Coord) -> BoardResult<IntentOutcome> {
        if !self.config.debug {
            return Ok(IntentOutcome::Ignored(IgnoreReason::DebugDisabled));
        }
        if let Some(reason) = self.gate()? {
            return Ok(IntentOutcome::Ignored(reason));
        }
        let kind = match self.grid.get(coord)? {
            Some(k) => k.next(self.config.gem_count),
            None => TileKind::FIRST,
        };
        self.grid.set(coord, Some(kind))?;
        tracing::debug!(%coord, kind = kind.get(), "debug key changed gem");
        Ok(IntentOutcome::KindChanged { coord, kind })
    }

    // Animation coordination

    /// Deliver one completion message.
    pub fn on_animation_complete(&mut self, done: AnimationDone) -> BoardResult<Progress> {
        let pending = match self.pending.take() {
            Some(p) if p.id() == done.id => p,
            other => {
                tracing::warn!(id = done.id.0, "stale animation acknowledgement");
                self.pending = other;
                return Ok(Progress::Stale);
            }
        };

        match pending {
            Pending::RejectedSwap { .. } => Ok(Progress::Idle),
            Pending::Swap { matches, .. } => self.run_pass(matches),
            Pending::Cascade { .. } => {
                let matches = find_matches(&self.grid);
                if matches.is_empty() {
                    Ok(self.settle())
                } else {
                    self.run_pass(matches)
                }
            }
        }
    }

    /// Drain every queued completion. Returns how many were processed.
    pub fn pump(&mut self) -> BoardResult<usize> {
        let mut n = 0;
        while let Some(done) = self.bus.try_recv_done() {
            self.on_animation_complete(done)?;
            n += 1;
        }
        Ok(n)
    }

    fn run_pass(&mut self, matches: Vec<MatchGroup>) -> BoardResult<Progress> {
        let step = match self.resolver.step(&mut self.grid, matches, &mut self.source) {
            Ok(step) => step,
            Err(err) => {
                tracing::warn!(error = %err, "resolution aborted; session halted");
                self.halted = Some(err.clone());
                self.selection.clear();
                return Err(err);
            }
        };

        let pass = step.pass;
        let count = step.popped();
        self.resolution_popped += count;
        self.bus.publish(Signal::TilesPopped {
            pass,
            coords: step.removed.clone(),
            count,
        });
        let id = self.bus.request(AnimationKind::Cascade(step), true);
        self.pending = Some(Pending::Cascade { id });
        tracing::debug!(pass, count, "cascade pass");
        Ok(Progress::Cascading { pass })
    }

    fn settle(&mut self) -> Progress {
        let passes = self.resolver.passes();
        let popped = self.resolution_popped;
        self.bus.publish(Signal::ResolutionSettled { passes, popped });
        self.resolution_popped = 0;
        tracing::debug!(passes, popped, "resolution settled");
        Progress::Settled { passes, popped }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_match3_core::FixedTiles;

    fn engine_with(cfg: EngineConfig, seq: &[u8]) -> BoardEngine<FixedTiles> {
        let src = FixedTiles::new(seq, cfg.gem_count).unwrap();
        let mut engine = BoardEngine::new(cfg, src).unwrap();
        engine.init_board().unwrap();
        engine
    }

    fn small() -> EngineConfig {
        EngineConfig {
            width: 6,
            height: 6,
            gem_count: 4,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_new_rejects_source_mismatch() {
        let src = FixedTiles::new(&[1, 2, 3], 3).unwrap();
        let err = BoardEngine::new(small(), src).unwrap_err();
        assert!(matches!(err, BoardError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_intents_before_init_are_ignored() {
        let src = FixedTiles::new(&[1, 2, 3, 4], 4).unwrap();
        let mut engine = BoardEngine::new(small(), src).unwrap();
        assert_eq!(
            engine.invert_tile_selection_state(Coord::new(0, 0)).unwrap(),
            IntentOutcome::Ignored(IgnoreReason::NotInitialized)
        );
    }

    #[test]
    fn test_out_of_bounds_selection_rejected() {
        let mut engine = engine_with(small(), &[1, 2, 3, 4]);
        let err = engine
            .invert_tile_selection_state(Coord::new(6, 0))
            .unwrap_err();
        assert!(matches!(err, BoardError::OutOfBounds { .. }));
        assert_eq!(engine.selected(), None);
    }

    #[test]
    fn test_stale_ack_is_ignored() {
        let mut engine = engine_with(small(), &[1, 2, 3, 4]);
        let progress = engine
            .on_animation_complete(AnimationDone { id: AnimationId(999) })
            .unwrap();
        assert_eq!(progress, Progress::Stale);
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn test_debug_key_gated() {
        let mut engine = engine_with(small(), &[1, 2, 3, 4]);
        let c = Coord::new(0, 0);
        let before = engine.grid().clone();
        assert_eq!(
            engine.debug_change_key(c).unwrap(),
            IntentOutcome::Ignored(IgnoreReason::DebugDisabled)
        );
        assert_eq!(engine.grid(), &before);

        let cfg = EngineConfig {
            debug: true,
            ..small()
        };
        let mut engine = engine_with(cfg, &[1, 2, 3, 4]);
        let old = engine.grid().get(c).unwrap().unwrap();
        let outcome = engine.debug_change_key(c).unwrap();
        assert_eq!(
            outcome,
            IntentOutcome::KindChanged {
                coord: c,
                kind: old.next(4)
            }
        );
        assert_eq!(engine.state(), EngineState::Idle);
    }
}
