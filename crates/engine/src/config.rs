//! Engine configuration
//!
//! All fields have defaults matching the classic game, so a TOML file only
//! needs to name what it changes:
//!
//! ```
//! use tui_match3_engine::{EngineConfig, InteractionMode};
//!
//! let cfg = EngineConfig::from_toml_str("width = 8\nheight = 8\ninteraction = \"toggle\"").unwrap();
//! assert_eq!(cfg.width, 8);
//! assert_eq!(cfg.gem_count, 8);
//! assert_eq!(cfg.interaction, InteractionMode::Toggle);
//! ```

use serde::{Deserialize, Serialize};

use tui_match3_core::{BoardError, BoardResult};
use tui_match3_types::{
    DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH, DEFAULT_GEM_COUNT, DEFAULT_MAX_CASCADE_PASSES,
    MAX_GEM_COUNT, MIN_GEM_COUNT,
};

/// How a second selected cell is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    /// Selecting a different cell moves the selection; swaps are explicit.
    Toggle,
    /// Selecting a different cell attempts a swap with the armed one.
    #[default]
    Swipe,
}

/// What a swap that forms no match looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectedSwapPolicy {
    /// Play swap-then-revert and wait for it before accepting input.
    #[default]
    Animate,
    /// Emit feedback without blocking input.
    Silent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub width: u8,
    pub height: u8,
    pub gem_count: u8,
    pub max_cascade_passes: u32,
    pub interaction: InteractionMode,
    pub rejected_swap: RejectedSwapPolicy,
    /// Enables the debug key that cycles a gem in place.
    pub debug: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            gem_count: DEFAULT_GEM_COUNT,
            max_cascade_passes: DEFAULT_MAX_CASCADE_PASSES,
            interaction: InteractionMode::default(),
            rejected_swap: RejectedSwapPolicy::default(),
            debug: false,
        }
    }
}

impl EngineConfig {
    /// Reject parameters that make the board ill-posed.
    pub fn validate(&self) -> BoardResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(BoardError::InvalidConfiguration(format!(
                "board dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if !(MIN_GEM_COUNT..=MAX_GEM_COUNT).contains(&self.gem_count) {
            return Err(BoardError::InvalidConfiguration(format!(
                "gem count must be between {MIN_GEM_COUNT} and {MAX_GEM_COUNT}, got {}",
                self.gem_count
            )));
        }
        if self.max_cascade_passes == 0 {
            return Err(BoardError::InvalidConfiguration(
                "cascade pass cap must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> BoardResult<Self> {
        let cfg: EngineConfig =
            toml::from_str(s).map_err(|e| BoardError::InvalidConfiguration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
