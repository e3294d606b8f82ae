//! Puzzle parameters supplied once at session start.
//!
//! Every field is optional: each puzzle picks the fields it understands and
//! falls back to its own defaults. Values are range-checked when the puzzle
//! is built, so a bad configuration fails before the session exists.

use std::fmt::Display;
use std::ops::RangeInclusive;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::grid::Pos;

/// Immutable parameters for one puzzle session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleConfig {
    /// Board edge length for square-board puzzles.
    pub grid_size: Option<usize>,
    /// Number of flashes to memorize (pattern memory).
    pub sequence_length: Option<usize>,
    /// Number of symbol pairs (tile matching).
    pub pairs: Option<usize>,
    /// Pair attempts allowed before the board fails (tile matching).
    pub move_budget: Option<u32>,
    /// Fixed board layout, one string per row (maze, flow link).
    pub layout: Option<Vec<String>>,
    /// Lock elements in unlock order (mechanical lock).
    pub bolts: Option<Vec<String>>,
    /// Mirror positions (laser redirect).
    pub mirrors: Option<Vec<Pos>>,
    /// Lines to clear before the gate opens (block blast).
    pub line_target: Option<u32>,
    /// Size of the symbol alphabet (final encryption).
    pub symbols: Option<u8>,
    /// Tiles per side (jigsaw).
    pub complexity: Option<usize>,
    /// Image subject used by the renderer (jigsaw).
    #[serde(alias = "animal")]
    pub subject: Option<String>,
    /// Seed for every random choice made by the puzzle.
    pub seed: Option<u64>,
    /// Disk count (tower of hanoi).
    pub disks: Option<usize>,
    /// Number of distinct cell colors (match-3).
    pub colors: Option<u8>,
    /// Score needed to win (match-3).
    pub target_score: Option<u32>,
}

impl PuzzleConfig {
    /// Parses a JSON configuration document.
    pub fn from_json(text: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Builds the random generator for a session.
    ///
    /// With a seed the puzzle is fully reproducible; without one the seed
    /// comes from the thread generator.
    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }
}

/// Resolves an optional value against a default and an allowed range.
pub(crate) fn checked<T>(
    field: &'static str,
    value: Option<T>,
    default: T,
    range: RangeInclusive<T>,
) -> ConfigResult<T>
where
    T: PartialOrd + Copy + Display,
{
    let value = value.unwrap_or(default);
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::invalid(
            field,
            format!(
                "{} is outside the allowed range {}..={}",
                value,
                range.start(),
                range.end()
            ),
        ))
    }
}
