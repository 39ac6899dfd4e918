//! Game configuration: an optional TOML file plus environment overrides.
//!
//! ```toml
//! seed = 42
//!
//! [engine]
//! width = 10
//! height = 12
//! interaction = "toggle"
//!
//! [scoring]
//! combo_cap = 10
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::core::ScoringConfig;
use crate::engine::EngineConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub engine: EngineConfig,
    pub scoring: ScoringConfig,
    /// Fixed RNG seed; a time-based seed is used when absent.
    pub seed: Option<u64>,
    pub high_score_path: Option<PathBuf>,
}

impl GameConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: GameConfig = toml::from_str(s).context("invalid config file")?;
        cfg.engine.validate()?;
        Ok(cfg)
    }

    /// Load `path` if given, otherwise start from defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                let text = std::fs::read_to_string(p)
                    .with_context(|| format!("failed to read {}", p.display()))?;
                Self::from_toml_str(&text)
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply `MATCH3_SEED` and `MATCH3_DEBUG`.
    pub fn apply_env(&mut self) -> Result<()> {
        let seed = std::env::var("MATCH3_SEED").ok();
        let debug = std::env::var("MATCH3_DEBUG").ok();
        self.apply_overrides(seed.as_deref(), debug.as_deref())
    }

    pub fn apply_overrides(&mut self, seed: Option<&str>, debug: Option<&str>) -> Result<()> {
        if let Some(s) = seed {
            let seed = s
                .trim()
                .parse()
                .with_context(|| format!("MATCH3_SEED must be an integer, got {s:?}"))?;
            self.seed = Some(seed);
        }
        if let Some(d) = debug {
            self.engine.debug = d == "1" || d.eq_ignore_ascii_case("true");
        }
        Ok(())
    }

    pub fn resolved_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(1)
        })
    }
}

const ENV_HELP: &str = "\
Environment:
  MATCH3_SEED, MATCH3_DEBUG, MATCH3_LOG, MATCH3_LOG_PATH,
  MATCH3_AI_HOST, MATCH3_AI_PORT, MATCH3_AI_MAX_PENDING, MATCH3_AI_DISABLED";

/// Command line options.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "tui-match3", version, about = "Terminal match-3", after_help = ENV_HELP)]
pub struct CliArgs {
    /// TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Do not capture the mouse
    #[arg(long)]
    pub no_mouse: bool,
}
