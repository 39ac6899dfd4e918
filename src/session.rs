//! One playing session: the board engine plus the score keeper listening to it.
//!
//! Animation playback stays outside; the terminal drives a timed player and
//! tests drive [`crate::engine::InstantPlayback`].

use crossbeam_channel::Receiver;

use crate::adapter::ScoreView;
use crate::core::{BoardResult, ScoreKeeper, TileSource};
use crate::engine::{BoardEngine, IntentOutcome, Signal, SignalKind};
use crate::term::HudView;
use crate::types::PlayerIntent;
use crate::GameConfig;

/// How long the combo banner stays up.
pub const COMBO_FLASH_MS: u32 = 900;

pub struct GameSession<R: TileSource> {
    engine: BoardEngine<R>,
    scores: ScoreKeeper,
    pops: Receiver<Signal>,
    feed: Receiver<Signal>,
    combo_flash_ms: u32,
}

impl<R: TileSource> GameSession<R> {
    /// Build the engine, hook up scoring and deal the first board.
    pub fn new(config: &GameConfig, source: R, high_score: u32) -> BoardResult<Self> {
        let mut engine = BoardEngine::new(config.engine.clone(), source)?;
        let pops = engine.subscribe(SignalKind::TilesPopped);
        let feed = engine.subscribe_all();
        engine.init_board()?;
        Ok(Self {
            engine,
            scores: ScoreKeeper::new(config.scoring, high_score),
            pops,
            feed,
            combo_flash_ms: 0,
        })
    }

    pub fn engine(&self) -> &BoardEngine<R> {
        &self.engine
    }

    pub fn scores(&self) -> &ScoreKeeper {
        &self.scores
    }

    /// Apply a player intent. A restart also resets the score.
    pub fn apply(&mut self, intent: PlayerIntent) -> BoardResult<IntentOutcome> {
        let outcome = self.engine.apply_intent(intent);
        match &outcome {
            Ok(IntentOutcome::Restarted) => {
                self.scores.reset();
                self.combo_flash_ms = 0;
                // Signals of the abandoned board are stale.
                while self.pops.try_recv().is_ok() {}
            }
            Ok(other) => tracing::debug!(?intent, outcome = ?other, "intent applied"),
            Err(e) => tracing::debug!(?intent, error = %e, "intent rejected"),
        }
        outcome
    }

    /// Deliver finished animations, score pops and advance the combo clock.
    ///
    /// Returns the number of completions the engine processed.
    pub fn update(&mut self, elapsed_ms: u32) -> BoardResult<usize> {
        let pumped = self.engine.pump();
        self.drain_pops();
        if self.scores.tick(elapsed_ms) {
            tracing::debug!("combo expired");
        }
        self.combo_flash_ms = self.combo_flash_ms.saturating_sub(elapsed_ms);
        pumped
    }

    fn drain_pops(&mut self) {
        while let Ok(signal) = self.pops.try_recv() {
            if let Signal::TilesPopped { count, .. } = signal {
                let gems = u32::try_from(count).unwrap_or(u32::MAX);
                let update = self.scores.on_tiles_popped(gems);
                if update.combo > 1 {
                    self.combo_flash_ms = COMBO_FLASH_MS;
                }
            }
        }
    }

    /// Signals published since the last call (for remote observers).
    pub fn take_signals(&mut self) -> Vec<Signal> {
        self.feed.try_iter().collect()
    }

    pub fn hud(&self) -> HudView {
        HudView {
            score: self.scores.score(),
            high_score: self.scores.high_score(),
            level: self.scores.level(),
            combo: self.scores.combo(),
            combo_flash_ms: self.combo_flash_ms,
            debug: self.engine.config().debug,
        }
    }

    pub fn score_view(&self) -> ScoreView {
        ScoreView {
            score: self.scores.score(),
            high_score: self.scores.high_score(),
            level: self.scores.level(),
            combo: self.scores.combo(),
        }
    }
}
