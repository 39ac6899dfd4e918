//! Scoring module - gem points, combo multiplier, levels and high score
//!
//! Rules:
//! - A pop of `n` gems is worth `n * points_per_gem * combo`.
//! - The combo starts at x1 and grows by one after every pop, up to `combo_cap`.
//! - More than `combo_reset_ms` without a pop drops the combo back to x1.
//! - Level is `score / level_step + 1`.
//!
//! The keeper only consumes pop counts; it never sees the grid. Persisting the
//! high score is left to the application.

use serde::{Deserialize, Serialize};

use crate::types::{COMBO_CAP, COMBO_RESET_MS, LEVEL_SCORE_STEP, POINTS_PER_GEM};

/// Tunable scoring rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub points_per_gem: u32,
    pub combo_cap: u32,
    pub combo_reset_ms: u32,
    pub level_step: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            points_per_gem: POINTS_PER_GEM,
            combo_cap: COMBO_CAP,
            combo_reset_ms: COMBO_RESET_MS,
            level_step: LEVEL_SCORE_STEP,
        }
    }
}

/// Points for one pop at the given combo multiplier.
pub fn calculate_pop_score(gems: u32, points_per_gem: u32, combo: u32) -> u32 {
    gems.saturating_mul(points_per_gem).saturating_mul(combo)
}

/// Combo multiplier after a pop.
pub fn next_combo(combo: u32, cap: u32) -> u32 {
    combo.saturating_add(1).min(cap.max(1))
}

/// Level reached at `score` (1-based).
pub fn calculate_level(score: u32, level_step: u32) -> u32 {
    if level_step == 0 {
        return 1;
    }
    score / level_step + 1
}

/// Result of scoring one pop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreUpdate {
    pub points: u32,
    /// Multiplier the points were awarded at.
    pub combo: u32,
    pub level: u32,
    pub new_high_score: bool,
}

/// Running score state fed by tiles-popped counts.
#[derive(Debug, Clone)]
pub struct ScoreKeeper {
    config: ScoringConfig,
    score: u32,
    high_score: u32,
    combo: u32,
    level: u32,
    idle_ms: u32,
}

impl ScoreKeeper {
    pub fn new(config: ScoringConfig, high_score: u32) -> Self {
        Self {
            config,
            score: 0,
            high_score,
            combo: 1,
            level: 1,
            idle_ms: 0,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score a pop of `gems` tiles. Zero gems is a no-op.
    pub fn on_tiles_popped(&mut self, gems: u32) -> ScoreUpdate {
        if gems == 0 {
            return ScoreUpdate {
                points: 0,
                combo: self.combo,
                level: self.level,
                new_high_score: false,
            };
        }

        let combo = self.combo;
        let points = calculate_pop_score(gems, self.config.points_per_gem, combo);
        self.score = self.score.saturating_add(points);

        let new_high_score = self.score > self.high_score;
        if new_high_score {
            self.high_score = self.score;
        }

        self.level = calculate_level(self.score, self.config.level_step);
        self.idle_ms = 0;
        self.combo = next_combo(self.combo, self.config.combo_cap);

        ScoreUpdate {
            points,
            combo,
            level: self.level,
            new_high_score,
        }
    }

    /// Advance the idle clock. Returns true when the combo was reset.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        self.idle_ms = self.idle_ms.saturating_add(elapsed_ms);
        if self.combo > 1 && self.idle_ms > self.config.combo_reset_ms {
            self.combo = 1;
            return true;
        }
        false
    }

    /// Start a new game, keeping the high score.
    pub fn reset(&mut self) {
        self.score = 0;
        self.combo = 1;
        self.level = 1;
        self.idle_ms = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_scores() {
        // gems, combo, expected
        let cases = [(3, 1, 75), (4, 1, 100), (3, 2, 150), (5, 15, 1875), (0, 3, 0)];
        for (gems, combo, expected) in cases {
            assert_eq!(calculate_pop_score(gems, POINTS_PER_GEM, combo), expected);
        }
    }

    #[test]
    fn test_combo_caps() {
        assert_eq!(next_combo(1, 15), 2);
        assert_eq!(next_combo(14, 15), 15);
        assert_eq!(next_combo(15, 15), 15);
    }

    #[test]
    fn test_level_calculation() {
        assert_eq!(calculate_level(0, 5000), 1);
        assert_eq!(calculate_level(4999, 5000), 1);
        assert_eq!(calculate_level(5000, 5000), 2);
        assert_eq!(calculate_level(12500, 5000), 3);
    }

    #[test]
    fn test_keeper_applies_combo_before_increment() {
        let mut keeper = ScoreKeeper::new(ScoringConfig::default(), 0);
        let first = keeper.on_tiles_popped(3);
        assert_eq!(first.points, 75);
        assert_eq!(first.combo, 1);
        assert!(first.new_high_score);

        let second = keeper.on_tiles_popped(3);
        assert_eq!(second.points, 150);
        assert_eq!(keeper.score(), 225);
        assert_eq!(keeper.combo(), 3);
    }

    #[test]
    fn test_combo_resets_after_idle() {
        let mut keeper = ScoreKeeper::new(ScoringConfig::default(), 0);
        keeper.on_tiles_popped(3);
        assert_eq!(keeper.combo(), 2);

        assert!(!keeper.tick(4000));
        assert_eq!(keeper.combo(), 2);
        assert!(keeper.tick(1));
        assert_eq!(keeper.combo(), 1);
    }

    #[test]
    fn test_high_score_kept_across_reset() {
        let mut keeper = ScoreKeeper::new(ScoringConfig::default(), 100);
        let update = keeper.on_tiles_popped(3);
        assert!(!update.new_high_score);
        assert_eq!(keeper.high_score(), 100);

        keeper.on_tiles_popped(3);
        assert_eq!(keeper.high_score(), 225);

        keeper.reset();
        assert_eq!(keeper.score(), 0);
        assert_eq!(keeper.high_score(), 225);
    }

    #[test]
    fn test_config_defaults_from_partial() {
        let cfg: ScoringConfig = serde_json::from_str(r#"{"points_per_gem": 10}"#).unwrap();
        assert_eq!(cfg.points_per_gem, 10);
        assert_eq!(cfg.combo_cap, COMBO_CAP);
    }
}
