//! Pattern memory: watch a sequence of flashing cells, then repeat it.
//!
//! Playback is a chain of timed phases. A wrong click pauses, clears the
//! entered prefix and replays the whole sequence; the sequence itself never
//! changes.

use std::fmt;
use std::time::Duration;

use log::debug;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::{checked, PuzzleConfig};
use crate::error::{ConfigError, ConfigResult, Rejection};
use crate::variant::{Progress, Variant};

pub const DEFAULT_SIZE: usize = 3;
pub const DEFAULT_LENGTH: usize = 5;

pub const INTRO_DELAY: Duration = Duration::from_millis(1000);
pub const FLASH_TIME: Duration = Duration::from_millis(600);
pub const GAP_TIME: Duration = Duration::from_millis(400);
pub const MISTAKE_PAUSE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "step", rename_all = "kebab-case")]
pub enum Phase {
    /// Short pause before the first flash.
    Intro,
    /// Sequence cell `i` is lit.
    Flash(usize),
    /// Dark pause after flash `i`.
    Gap(usize),
    /// Waiting for the player.
    Input,
    /// Pause after a wrong click, before the replay.
    Mistake,
    Solved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternMove {
    /// Click the cell with this row-major index.
    Click(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternMemory {
    size: usize,
    #[serde(skip)]
    sequence: Vec<usize>,
    entered: usize,
    phase: Phase,
    /// Cell shown during a flash; the rest of the sequence stays hidden.
    lit: Option<usize>,
}

impl PatternMemory {
    /// Starts playback of `sequence` on a `size` x `size` board.
    pub fn new(size: usize, sequence: Vec<usize>) -> ConfigResult<Self> {
        if sequence.is_empty() {
            return Err(ConfigError::invalid("sequence_length", "sequence is empty"));
        }
        if sequence.iter().any(|&cell| cell >= size * size) {
            return Err(ConfigError::invalid("sequence_length", "sequence leaves the board"));
        }
        Ok(Self {
            size,
            sequence,
            entered: 0,
            phase: Phase::Intro,
            lit: None,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Correct clicks so far in the current attempt.
    pub fn entered(&self) -> usize {
        self.entered
    }

    /// The cell lit right now, if any.
    pub fn lit(&self) -> Option<usize> {
        self.lit
    }
}

impl Variant for PatternMemory {
    type Move = PatternMove;

    fn init(config: &PuzzleConfig, rng: &mut ChaCha8Rng) -> ConfigResult<Self> {
        let size = checked("grid_size", config.grid_size, DEFAULT_SIZE, 2..=8)?;
        let length = checked("sequence_length", config.sequence_length, DEFAULT_LENGTH, 1..=32)?;
        let sequence = (0..length).map(|_| rng.random_range(0..size * size)).collect();
        Self::new(size, sequence)
    }

    fn apply(&mut self, mv: PatternMove) -> Result<(), Rejection> {
        if self.is_solved() {
            return Err(Rejection::AlreadySolved);
        }
        if self.is_busy() {
            return Err(Rejection::OutOfTurn);
        }
        let PatternMove::Click(cell) = mv;
        if cell >= self.size * self.size {
            return Err(Rejection::OutOfBounds);
        }

        if self.sequence[self.entered] == cell {
            self.entered += 1;
            if self.entered == self.sequence.len() {
                self.phase = Phase::Solved;
            }
        } else {
            debug!("pattern: wrong cell {} at step {}", cell, self.entered);
            self.entered = 0;
            self.phase = Phase::Mistake;
        }
        Ok(())
    }

    fn is_solved(&self) -> bool {
        self.phase == Phase::Solved
    }

    fn progress(&self) -> Progress {
        Progress::Pattern {
            entered: self.entered,
            length: self.sequence.len(),
        }
    }

    fn is_busy(&self) -> bool {
        self.pending().is_some()
    }

    fn pending(&self) -> Option<Duration> {
        match self.phase {
            Phase::Intro => Some(INTRO_DELAY),
            Phase::Flash(_) => Some(FLASH_TIME),
            Phase::Gap(_) => Some(GAP_TIME),
            Phase::Mistake => Some(MISTAKE_PAUSE),
            Phase::Input | Phase::Solved => None,
        }
    }

    fn advance(&mut self) -> bool {
        let last = self.sequence.len() - 1;
        self.phase = match self.phase {
            Phase::Intro | Phase::Mistake => Phase::Flash(0),
            Phase::Flash(i) if i < last => Phase::Gap(i),
            Phase::Flash(_) => Phase::Input,
            Phase::Gap(i) => Phase::Flash(i + 1),
            Phase::Input | Phase::Solved => return false,
        };
        self.lit = match self.phase {
            Phase::Flash(i) => self.sequence.get(i).copied(),
            _ => None,
        };
        true
    }
}

impl fmt::Display for PatternMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lit = self.lit();
        for row in 0..self.size {
            for col in 0..self.size {
                let cell = row * self.size + col;
                write!(f, "{}", if lit == Some(cell) { '#' } else { '.' })?;
            }
            writeln!(f)?;
        }
        writeln!(f, "{}/{}", self.entered, self.sequence.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn puzzle() -> PatternMemory {
        PatternMemory::new(3, vec![4, 0, 8]).unwrap()
    }

    /// Advances until input is accepted, collecting lit cells.
    fn play_back(puzzle: &mut PatternMemory) -> Vec<usize> {
        let mut flashes = Vec::new();
        while puzzle.phase() != Phase::Input {
            assert!(puzzle.advance(), "Playback stalled in {:?}", puzzle.phase());
            flashes.extend(puzzle.lit());
        }
        flashes
    }

    #[test]
    fn test_playback_flashes_sequence_in_order() {
        let mut puzzle = puzzle();
        assert_eq!(puzzle.pending(), Some(INTRO_DELAY));
        assert_eq!(play_back(&mut puzzle), vec![4, 0, 8]);
        assert!(!puzzle.is_busy());
        assert!(!puzzle.advance());
    }

    #[test]
    fn test_phase_durations() {
        let mut puzzle = puzzle();
        let mut delays = Vec::new();
        while let Some(delay) = puzzle.pending() {
            delays.push(delay.as_millis());
            puzzle.advance();
        }
        assert_eq!(delays, vec![1000, 600, 400, 600, 400, 600]);
    }

    #[test]
    fn test_clicks_refused_during_playback() {
        let mut puzzle = puzzle();
        assert_eq!(puzzle.apply(PatternMove::Click(4)), Err(Rejection::OutOfTurn));
        puzzle.advance();
        assert_eq!(puzzle.apply(PatternMove::Click(4)), Err(Rejection::OutOfTurn));
        assert_eq!(puzzle.entered(), 0);
    }

    #[test]
    fn test_correct_sequence_solves() {
        let mut puzzle = puzzle();
        play_back(&mut puzzle);
        assert_eq!(puzzle.apply(PatternMove::Click(9)), Err(Rejection::OutOfBounds));
        for cell in [4, 0, 8] {
            puzzle.apply(PatternMove::Click(cell)).unwrap();
        }
        assert!(puzzle.is_solved());
        assert_eq!(puzzle.pending(), None);
        assert_eq!(puzzle.apply(PatternMove::Click(4)), Err(Rejection::AlreadySolved));
    }

    #[test]
    fn test_mistake_replays_same_sequence() {
        let mut puzzle = puzzle();
        play_back(&mut puzzle);
        puzzle.apply(PatternMove::Click(4)).unwrap();
        puzzle.apply(PatternMove::Click(1)).unwrap();
        assert_eq!(puzzle.phase(), Phase::Mistake);
        assert_eq!(puzzle.entered(), 0);
        assert_eq!(puzzle.pending(), Some(MISTAKE_PAUSE));
        assert_eq!(play_back(&mut puzzle), vec![4, 0, 8], "Replay keeps the sequence");

        for cell in [4, 0, 8] {
            puzzle.apply(PatternMove::Click(cell)).unwrap();
        }
        assert!(puzzle.is_solved());
    }

    #[test]
    fn test_serialized_state_shows_lit_cell() {
        let mut puzzle = puzzle();
        let json = serde_json::to_value(&puzzle).unwrap();
        assert_eq!(json["lit"], serde_json::Value::Null);
        assert!(json.get("sequence").is_none(), "Sequence stays hidden");

        puzzle.advance();
        let json = serde_json::to_value(&puzzle).unwrap();
        assert_eq!(json["phase"]["phase"], "flash");
        assert_eq!(json["lit"], 4);

        puzzle.advance();
        let json = serde_json::to_value(&puzzle).unwrap();
        assert_eq!(json["lit"], serde_json::Value::Null, "Nothing lit during a gap");
    }

    #[test]
    fn test_init_respects_config() {
        let config = PuzzleConfig {
            seed: Some(5),
            grid_size: Some(4),
            sequence_length: Some(7),
            ..Default::default()
        };
        let mut puzzle = PatternMemory::init(&config, &mut config.rng()).unwrap();
        let flashes = play_back(&mut puzzle);
        assert_eq!(flashes.len(), 7);
        assert!(flashes.iter().all(|&cell| cell < 16));
    }
}
