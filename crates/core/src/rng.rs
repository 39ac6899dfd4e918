//! RNG module - injected gem sources for layout and refill
//!
//! The engine never draws randomness on its own; every new gem comes from a
//! [`TileSource`]. Two sources ship with the crate:
//!
//! - [`SeededTiles`]: ChaCha8 stream seeded from a `u64`, reproducible across
//!   platforms (same seed, same board).
//! - [`FixedTiles`]: replays a fixed, cycling sequence; used by tests and to
//!   model a pathological random source.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{BoardError, BoardResult};
use crate::types::{TileKind, MIN_GEM_COUNT};

/// Supplier of new gems.
pub trait TileSource {
    /// Number of distinct kinds this source draws from (`1..=gem_count`).
    fn gem_count(&self) -> u8;

    /// Draw the next gem.
    fn next_kind(&mut self) -> TileKind;
}

impl<T: TileSource + ?Sized> TileSource for &mut T {
    fn gem_count(&self) -> u8 {
        (**self).gem_count()
    }

    fn next_kind(&mut self) -> TileKind {
        (**self).next_kind()
    }
}

impl<T: TileSource + ?Sized> TileSource for Box<T> {
    fn gem_count(&self) -> u8 {
        (**self).gem_count()
    }

    fn next_kind(&mut self) -> TileKind {
        (**self).next_kind()
    }
}

fn check_gem_count(gem_count: u8) -> BoardResult<()> {
    if gem_count < MIN_GEM_COUNT {
        return Err(BoardError::InvalidConfiguration(format!(
            "gem count must be at least {MIN_GEM_COUNT}, got {gem_count}"
        )));
    }
    Ok(())
}

/// Seeded uniform gem source.
#[derive(Debug, Clone)]
pub struct SeededTiles {
    rng: ChaCha8Rng,
    seed: u64,
    gem_count: u8,
}

impl SeededTiles {
    /// Create a source drawing uniformly from `1..=gem_count`.
    pub fn new(seed: u64, gem_count: u8) -> BoardResult<Self> {
        check_gem_count(gem_count)?;
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            gem_count,
        })
    }

    /// The seed this source was created with (for restarting a session).
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl TileSource for SeededTiles {
    fn gem_count(&self) -> u8 {
        self.gem_count
    }

    fn next_kind(&mut self) -> TileKind {
        let v = self.rng.gen_range(1..=self.gem_count);
        TileKind::new(v).unwrap_or(TileKind::FIRST)
    }
}

/// Cycling fixed sequence of gems.
#[derive(Debug, Clone)]
pub struct FixedTiles {
    sequence: Vec<TileKind>,
    cursor: usize,
    gem_count: u8,
}

impl FixedTiles {
    /// Create a source replaying `sequence` forever.
    ///
    /// Every value must lie in `1..=gem_count`.
    pub fn new(sequence: &[u8], gem_count: u8) -> BoardResult<Self> {
        check_gem_count(gem_count)?;
        if sequence.is_empty() {
            return Err(BoardError::InvalidConfiguration(
                "fixed tile sequence must not be empty".to_string(),
            ));
        }
        let mut kinds = Vec::with_capacity(sequence.len());
        for &v in sequence {
            match TileKind::new(v) {
                Some(k) if v <= gem_count => kinds.push(k),
                _ => {
                    return Err(BoardError::InvalidConfiguration(format!(
                        "tile {v} is outside 1..={gem_count}"
                    )))
                }
            }
        }
        Ok(Self {
            sequence: kinds,
            cursor: 0,
            gem_count,
        })
    }

    /// Number of gems drawn so far.
    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

impl TileSource for FixedTiles {
    fn gem_count(&self) -> u8 {
        self.gem_count
    }

    fn next_kind(&mut self) -> TileKind {
        let kind = self.sequence[self.cursor % self.sequence.len()];
        self.cursor += 1;
        kind
    }
}
