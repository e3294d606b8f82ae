//! The contract every puzzle type implements.
//!
//! A variant is a small state machine: it is built from a [`PuzzleConfig`],
//! consumes moves one at a time, and can always answer whether it is solved.
//! Variants with animated sequences (replays, cascades, delayed re-hides)
//! expose them as timed transitions: [`Variant::pending`] announces the delay
//! before the next one and [`Variant::advance`] performs it. The host owns the
//! clock; the engine never waits.

use std::time::Duration;

use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::PuzzleConfig;
use crate::error::{ConfigResult, Rejection};
use crate::variants::encryption::Mark;

/// Variant-specific progress counters, for the host's status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Progress {
    Circuit { powered: usize, cells: usize },
    Pattern { entered: usize, length: usize },
    Tiles { matched: usize, pairs: usize, moves_left: u32 },
    Maze { moves: usize },
    Lock { unlocked: usize, total: usize },
    Laser { beam: usize },
    Blast { lines_cleared: u32, target: u32 },
    Encryption { attempts: usize, last: Option<[Mark; 4]> },
    Jigsaw { in_place: usize, total: usize },
    Flow { connected: usize, colors: usize },
    Hanoi { moves: usize, min_moves: u64 },
    Match3 { score: u32, target: u32 },
}

/// What the host gets back after every move or transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolveResult {
    pub solved: bool,
    /// The puzzle reached a state it cannot be solved from.
    pub failed: bool,
    /// Input is currently refused; see `pending`.
    pub busy: bool,
    pub progress: Progress,
    /// Set when the move was ignored.
    pub rejection: Option<Rejection>,
    /// Delay before the host should call `advance`.
    pub pending: Option<Duration>,
}

impl SolveResult {
    #[inline]
    pub fn accepted(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Answer to a hint request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HintResult<M> {
    /// First move of a shortest solution.
    Move(M),
    /// Nothing to do: the goal is already met.
    AlreadySolved,
    /// No path found, either unreachable or the search cap was hit.
    NoSolution,
}

/// One puzzle type's state machine.
pub trait Variant: Sized {
    type Move;

    /// Builds the initial state.
    ///
    /// Random choices draw from `rng`, which the session seeds from the
    /// configuration when a seed is given.
    fn init(config: &PuzzleConfig, rng: &mut ChaCha8Rng) -> ConfigResult<Self>;

    /// Validates and applies a move. On `Err` the state is untouched.
    fn apply(&mut self, mv: Self::Move) -> Result<(), Rejection>;

    /// Win predicate. Depends only on the current state.
    fn is_solved(&self) -> bool;

    fn progress(&self) -> Progress;

    /// Whether a timed sequence is running and input must be refused.
    fn is_busy(&self) -> bool {
        false
    }

    /// Delay before the next timed transition, if one is scheduled.
    fn pending(&self) -> Option<Duration> {
        None
    }

    /// Performs the scheduled transition. Returns `false` if none was pending.
    fn advance(&mut self) -> bool {
        false
    }

    /// Terminal failure, e.g. a spent move budget.
    fn is_failed(&self) -> bool {
        false
    }

    /// Snapshot of the current state as a [`SolveResult`].
    fn result(&self, rejection: Option<Rejection>) -> SolveResult {
        SolveResult {
            solved: self.is_solved(),
            failed: self.is_failed(),
            busy: self.is_busy(),
            progress: self.progress(),
            rejection,
            pending: self.pending(),
        }
    }
}

/// Variants that can suggest the next optimal move.
pub trait Hint: Variant {
    fn hint(&self) -> HintResult<Self::Move>;
}

/// Pure reducer form of [`Variant::apply`]: the input state is left as is.
pub fn reduce<V: Variant + Clone>(state: &V, mv: V::Move) -> (V, SolveResult) {
    let mut next = state.clone();
    let rejection = next.apply(mv).err();
    let result = next.result(rejection);
    (next, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::hanoi::{HanoiMove, TowerOfHanoi};
    use crate::variants::tiles::{TileMatching, TileMove, PEEK_TIME};

    #[test]
    fn test_reduce_leaves_input_untouched() {
        let start = TowerOfHanoi::new(1);
        let (next, result) = reduce(&start, HanoiMove::Transfer { from: 0, to: 2 });
        assert!(result.solved && result.accepted());
        assert!(next.is_solved());
        assert!(!start.is_solved(), "Reducer must not mutate its input");
    }

    #[test]
    fn test_reduce_reports_rejection() {
        let start = TowerOfHanoi::new(2);
        let (next, result) = reduce(&start, HanoiMove::Undo);
        assert_eq!(result.rejection, Some(Rejection::NothingToUndo));
        assert_eq!(next, start);
        assert_eq!(
            result.progress,
            Progress::Hanoi {
                moves: 0,
                min_moves: 3
            }
        );
    }

    #[test]
    fn test_result_carries_timing() {
        let board = TileMatching::new(vec![0, 0], 1).unwrap();
        let (_, result) = reduce(&board, TileMove::Reveal(0));
        assert_eq!(result.rejection, Some(Rejection::OutOfTurn));
        assert!(result.busy);
        assert_eq!(result.pending, Some(PEEK_TIME));
    }
}
