//! Final encryption: break a hidden four-symbol code.
//!
//! Each guess is scored per position with the classic two-pass rule: exact
//! matches first, then symbols present elsewhere in what is left of the
//! target. A target symbol is never credited twice.

use std::fmt;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::{checked, PuzzleConfig};
use crate::error::{ConfigResult, Rejection};
use crate::variant::{Progress, Variant};

/// Symbols per code.
pub const CODE_LENGTH: usize = 4;

/// Default alphabet is `1..=6`.
pub const DEFAULT_SYMBOLS: u8 = 6;

pub type Code = [u8; CODE_LENGTH];

/// Feedback for one guessed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mark {
    /// Right symbol, right position.
    Correct,
    /// Symbol occurs at another unmatched target position.
    Present,
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EncryptionMove {
    Submit(Code),
}

/// A scored guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub guess: Code,
    pub feedback: [Mark; CODE_LENGTH],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalEncryption {
    #[serde(skip)]
    target: Code,
    symbols: u8,
    attempts: Vec<Attempt>,
}

/// Scores `guess` against `target`.
pub fn feedback(guess: &Code, target: &Code) -> [Mark; CODE_LENGTH] {
    let mut marks = [Mark::Absent; CODE_LENGTH];
    let mut remaining: [Option<u8>; CODE_LENGTH] = target.map(Some);
    let mut unmatched: [Option<u8>; CODE_LENGTH] = guess.map(Some);

    // first pass: exact positions, consumed from both sides
    for i in 0..CODE_LENGTH {
        if guess[i] == target[i] {
            marks[i] = Mark::Correct;
            remaining[i] = None;
            unmatched[i] = None;
        }
    }

    // second pass: each leftover guess symbol claims one leftover target symbol
    for i in 0..CODE_LENGTH {
        let Some(symbol) = unmatched[i] else {
            continue;
        };
        if let Some(slot) = remaining.iter_mut().find(|slot| **slot == Some(symbol)) {
            marks[i] = Mark::Present;
            *slot = None;
        }
    }

    marks
}

impl FinalEncryption {
    /// Creates a puzzle with a known target, for hosts that pick their own code.
    pub fn with_target(target: Code, symbols: u8) -> Self {
        Self {
            target,
            symbols,
            attempts: Vec::new(),
        }
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn symbols(&self) -> u8 {
        self.symbols
    }
}

impl Variant for FinalEncryption {
    type Move = EncryptionMove;

    fn init(config: &PuzzleConfig, rng: &mut ChaCha8Rng) -> ConfigResult<Self> {
        let symbols = checked("symbols", config.symbols, DEFAULT_SYMBOLS, 2..=9)?;
        let target = std::array::from_fn(|_| rng.random_range(1..=symbols));
        Ok(Self::with_target(target, symbols))
    }

    fn apply(&mut self, mv: EncryptionMove) -> Result<(), Rejection> {
        if self.is_solved() {
            return Err(Rejection::AlreadySolved);
        }
        let EncryptionMove::Submit(guess) = mv;
        if guess.iter().any(|&symbol| symbol == 0 || symbol > self.symbols) {
            return Err(Rejection::InvalidGuess);
        }
        self.attempts.push(Attempt {
            guess,
            feedback: feedback(&guess, &self.target),
        });
        Ok(())
    }

    fn is_solved(&self) -> bool {
        self.attempts
            .last()
            .is_some_and(|attempt| attempt.feedback.iter().all(|&m| m == Mark::Correct))
    }

    fn progress(&self) -> Progress {
        Progress::Encryption {
            attempts: self.attempts.len(),
            last: self.attempts.last().map(|attempt| attempt.feedback),
        }
    }
}

impl fmt::Display for FinalEncryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for attempt in &self.attempts {
            for symbol in attempt.guess {
                write!(f, "{}", symbol)?;
            }
            write!(f, " ")?;
            for mark in attempt.feedback {
                let c = match mark {
                    Mark::Correct => '+',
                    Mark::Present => '~',
                    Mark::Absent => '.',
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "symbols 1-{}, {} attempts", self.symbols, self.attempts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Mark::*;

    #[test]
    fn test_exact_guess_is_all_correct() {
        assert_eq!(feedback(&[1, 2, 3, 4], &[1, 2, 3, 4]), [Correct; 4]);
        assert_eq!(feedback(&[6, 6, 6, 6], &[6, 6, 6, 6]), [Correct; 4]);
    }

    #[test]
    fn test_duplicates_are_not_double_counted() {
        // one 1 in the target: only one guess position may claim it
        assert_eq!(feedback(&[1, 1, 2, 2], &[3, 1, 4, 4]), [Absent, Correct, Absent, Absent]);
        assert_eq!(feedback(&[1, 1, 5, 5], &[2, 3, 1, 4]), [Present, Absent, Absent, Absent]);
        assert_eq!(feedback(&[2, 1, 1, 3], &[1, 2, 3, 1]), [Present; 4]);
    }

    #[test]
    fn test_marks_never_exceed_code_length() {
        // every guess against a few targets with repeated symbols
        let targets = [[1, 1, 2, 3], [4, 4, 4, 4], [1, 2, 3, 4], [6, 5, 6, 5]];
        for target in targets {
            for n in 0..6u32.pow(4) {
                let guess: Code = std::array::from_fn(|i| (n / 6u32.pow(i as u32) % 6) as u8 + 1);
                let marks = feedback(&guess, &target);
                let correct = marks.iter().filter(|&&m| m == Correct).count();
                let present = marks.iter().filter(|&&m| m == Present).count();
                assert!(correct + present <= CODE_LENGTH);

                // never more credits for a symbol than the target holds
                for symbol in 1..=6u8 {
                    let credited = (0..CODE_LENGTH)
                        .filter(|&i| guess[i] == symbol && marks[i] != Absent)
                        .count();
                    let held = target.iter().filter(|&&t| t == symbol).count();
                    assert!(credited <= held, "{guess:?} vs {target:?} over-credits {symbol}");
                }
            }
        }
    }

    #[test]
    fn test_guess_validation_and_win() {
        let mut puzzle = FinalEncryption::with_target([3, 1, 4, 1], 6);
        assert_eq!(
            puzzle.apply(EncryptionMove::Submit([0, 1, 2, 3])),
            Err(Rejection::InvalidGuess)
        );
        assert_eq!(
            puzzle.apply(EncryptionMove::Submit([7, 1, 2, 3])),
            Err(Rejection::InvalidGuess)
        );
        assert!(puzzle.attempts().is_empty());

        puzzle.apply(EncryptionMove::Submit([1, 1, 1, 1])).unwrap();
        assert!(!puzzle.is_solved());
        assert_eq!(puzzle.attempts()[0].feedback, [Absent, Correct, Absent, Correct]);

        puzzle.apply(EncryptionMove::Submit([3, 1, 4, 1])).unwrap();
        assert!(puzzle.is_solved());
        assert_eq!(
            puzzle.apply(EncryptionMove::Submit([3, 1, 4, 1])),
            Err(Rejection::AlreadySolved)
        );
    }

    #[test]
    fn test_generated_code_uses_alphabet() {
        let config = PuzzleConfig {
            seed: Some(3),
            symbols: Some(4),
            ..Default::default()
        };
        let puzzle = FinalEncryption::init(&config, &mut config.rng()).unwrap();
        assert!(puzzle.target.iter().all(|&s| (1..=4).contains(&s)));
    }
}
