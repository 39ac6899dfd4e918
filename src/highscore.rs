//! High-score persistence (a small JSON file).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    pub high_score: u32,
}

#[derive(Debug, Clone)]
pub struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$HOME/.tui-match3-highscore.json`, or the working directory without `HOME`.
    pub fn default_path() -> PathBuf {
        let name = ".tui-match3-highscore.json";
        match std::env::var_os("HOME") {
            Some(home) => Path::new(&home).join(name),
            None => PathBuf::from(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is a score of zero; a corrupt one is an error.
    pub fn load(&self) -> Result<u32> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", self.path.display()))
            }
        };
        let record: HighScoreRecord = serde_json::from_str(&text)
            .with_context(|| format!("corrupt high score file {}", self.path.display()))?;
        Ok(record.high_score)
    }

    /// Write `score` if it beats what is stored. Returns whether it did.
    ///
    /// A corrupt file is reported, never overwritten.
    pub fn save_if_higher(&self, score: u32) -> Result<bool> {
        let current = self.load()?;
        if score <= current {
            return Ok(false);
        }
        let json = serde_json::to_string_pretty(&HighScoreRecord { high_score: score })?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        tracing::info!(score, path = %self.path.display(), "high score saved");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tui-match3-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_missing_file_is_zero() {
        let store = HighScoreStore::new(temp_path("missing"));
        let _ = std::fs::remove_file(store.path());
        assert_eq!(store.load().unwrap(), 0);
    }

    #[test]
    fn test_only_higher_scores_are_written() {
        let store = HighScoreStore::new(temp_path("save"));
        let _ = std::fs::remove_file(store.path());

        assert!(store.save_if_higher(300).unwrap());
        assert!(!store.save_if_higher(200).unwrap());
        assert_eq!(store.load().unwrap(), 300);
        assert!(store.save_if_higher(301).unwrap());
        assert_eq!(store.load().unwrap(), 301);

        let _ = std::fs::remove_file(store.path());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let store = HighScoreStore::new(temp_path("corrupt"));
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(store.load().is_err());
        let _ = std::fs::remove_file(store.path());
    }

    #[test]
    fn test_corrupt_file_is_not_overwritten() {
        let store = HighScoreStore::new(temp_path("keep-corrupt"));
        std::fs::write(store.path(), "{not json").unwrap();

        let err = store.save_if_higher(500).unwrap_err();
        assert!(format!("{err:#}").contains("corrupt high score file"));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "{not json");

        let _ = std::fs::remove_file(store.path());
    }
}
