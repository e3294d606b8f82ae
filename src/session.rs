//! A running puzzle and its host-facing API.
//!
//! The session owns the puzzle state, counts state generations so that hints
//! can be recognized as stale, and calls the success callback exactly once.

use log::{debug, info};

use crate::config::PuzzleConfig;
use crate::error::{ConfigError, ConfigResult, Rejection};
use crate::variant::{HintResult, SolveResult};
use crate::variants::{Move, Puzzle, PuzzleKind};

/// A hint, stamped with the state generation it was computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    generation: u64,
    pub result: HintResult<Move>,
}

impl Hint {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

pub struct PuzzleSession {
    config: PuzzleConfig,
    puzzle: Puzzle,
    /// Bumped on every accepted move and every timed transition.
    generation: u64,
    solved: bool,
    /// Set once the callback has fired; survives resets.
    notified: bool,
    on_solved: Option<Box<dyn FnMut()>>,
}

impl PuzzleSession {
    pub fn start(kind: PuzzleKind, config: PuzzleConfig) -> ConfigResult<Self> {
        let puzzle = Puzzle::init(kind, &config, &mut config.rng())?;
        info!("Started {} puzzle", kind);
        Ok(Self {
            config,
            puzzle,
            generation: 0,
            solved: false,
            notified: false,
            on_solved: None,
        })
    }

    /// Starts a session from a type tag such as `tower-of-hanoi`.
    pub fn from_tag(tag: &str, config: PuzzleConfig) -> ConfigResult<Self> {
        let kind = tag
            .parse::<PuzzleKind>()
            .map_err(|_| ConfigError::UnsupportedPuzzleType(tag.to_string()))?;
        Self::start(kind, config)
    }

    /// Registers the callback fired when the puzzle is solved.
    pub fn with_on_solved(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_solved = Some(Box::new(callback));
        self
    }

    pub fn apply_move(&mut self, mv: Move) -> SolveResult {
        if self.solved {
            return self.puzzle.result(Some(Rejection::AlreadySolved));
        }
        match self.puzzle.apply(mv) {
            Ok(()) => {
                self.generation += 1;
                self.check_solved();
                self.puzzle.result(None)
            }
            Err(rejection) => {
                debug!("{} rejected {:?}: {}", self.puzzle.kind(), mv, rejection);
                self.puzzle.result(Some(rejection))
            }
        }
    }

    /// Runs the pending timed transition, if any.
    pub fn advance(&mut self) -> SolveResult {
        if self.puzzle.advance() {
            self.generation += 1;
            self.check_solved();
        }
        self.puzzle.result(None)
    }

    fn check_solved(&mut self) {
        if self.solved || !self.puzzle.is_solved() {
            return;
        }
        self.solved = true;
        info!(
            "Solved {} puzzle after {} state changes",
            self.puzzle.kind(),
            self.generation
        );
        if self.notified {
            return;
        }
        self.notified = true;
        if let Some(callback) = self.on_solved.as_mut() {
            callback();
        }
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Computes a hint for the current state. `None` if this puzzle type has
    /// no hints.
    pub fn request_hint(&self) -> Option<Hint> {
        let result = self.puzzle.hint()?;
        debug!("Hint at generation {}: {:?}", self.generation, result);
        Some(Hint {
            generation: self.generation,
            result,
        })
    }

    /// Whether `hint` still describes the current state.
    pub fn is_current(&self, hint: &Hint) -> bool {
        hint.generation == self.generation
    }

    pub fn state(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn kind(&self) -> PuzzleKind {
        self.puzzle.kind()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Rebuilds the puzzle from the session configuration.
    ///
    /// With a configured seed the puzzle is identical to the first one. The
    /// fresh puzzle is playable again, but the success callback still fires
    /// at most once per session.
    pub fn reset(&mut self) -> ConfigResult<()> {
        let kind = self.puzzle.kind();
        self.puzzle = Puzzle::init(kind, &self.config, &mut self.config.rng())?;
        self.solved = false;
        self.generation += 1;
        debug!("Reset {} puzzle", kind);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::hanoi::HanoiMove;
    use crate::variants::maze::MazeMove;
    use std::cell::Cell;
    use std::rc::Rc;

    fn hanoi(disks: usize) -> PuzzleSession {
        let config = PuzzleConfig {
            disks: Some(disks),
            ..Default::default()
        };
        PuzzleSession::start(PuzzleKind::TowerOfHanoi, config).unwrap()
    }

    fn transfer(from: usize, to: usize) -> Move {
        Move::TowerOfHanoi(HanoiMove::Transfer { from, to })
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let err = PuzzleSession::from_tag("sokoban", PuzzleConfig::default())
            .err()
            .unwrap();
        assert_eq!(err, ConfigError::UnsupportedPuzzleType("sokoban".to_string()));

        let session = PuzzleSession::from_tag("match-3", PuzzleConfig::default()).unwrap();
        assert_eq!(session.kind(), PuzzleKind::Match3);
    }

    #[test]
    fn test_invalid_config_fails_at_start() {
        let config = PuzzleConfig {
            disks: Some(0),
            ..Default::default()
        };
        let err = PuzzleSession::start(PuzzleKind::TowerOfHanoi, config).err().unwrap();
        assert!(matches!(err, ConfigError::Invalid { field: "disks", .. }));
    }

    #[test]
    fn test_callback_fires_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut session = hanoi(1).with_on_solved(move || counter.set(counter.get() + 1));

        let result = session.apply_move(transfer(0, 2));
        assert!(result.solved && result.accepted());
        assert_eq!(calls.get(), 1);

        let result = session.apply_move(transfer(2, 0));
        assert_eq!(result.rejection, Some(Rejection::AlreadySolved));
        session.advance();
        assert_eq!(calls.get(), 1, "Callback must not fire twice");
    }

    #[test]
    fn test_rejections_leave_state_alone() {
        let mut session = hanoi(3);
        let before = session.state().clone();

        let result = session.apply_move(Move::PathFinder(MazeMove::Reset));
        assert_eq!(result.rejection, Some(Rejection::WrongPuzzle));
        let result = session.apply_move(transfer(1, 2));
        assert_eq!(result.rejection, Some(Rejection::EmptyRod));

        assert_eq!(session.state(), &before);
        assert_eq!(session.generation(), 0);
    }

    #[test]
    fn test_hint_goes_stale_after_move() {
        let mut session = hanoi(3);
        let hint = session.request_hint().unwrap();
        assert_eq!(hint.result, HintResult::Move(transfer(0, 2)));
        assert!(session.is_current(&hint));

        session.apply_move(transfer(0, 1));
        assert!(!session.is_current(&hint));
        let fresh = session.request_hint().unwrap();
        assert_eq!(fresh.generation(), 1);
    }

    #[test]
    fn test_hints_only_for_searchable_puzzles() {
        let session = PuzzleSession::start(PuzzleKind::MechanicalLock, PuzzleConfig::default()).unwrap();
        assert!(session.request_hint().is_none());
    }

    #[test]
    fn test_timed_transitions_bump_generation() {
        let config = PuzzleConfig {
            seed: Some(3),
            ..Default::default()
        };
        let mut session = PuzzleSession::start(PuzzleKind::PatternMemory, config).unwrap();
        assert!(session.state().is_busy());
        let result = session.advance();
        assert_eq!(session.generation(), 1);
        assert!(result.pending.is_some());
    }

    #[test]
    fn test_reset_after_solve_is_playable() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut session = hanoi(1).with_on_solved(move || counter.set(counter.get() + 1));

        session.apply_move(transfer(0, 2));
        assert!(session.is_solved());
        session.reset().unwrap();
        assert!(!session.is_solved(), "A fresh board is not solved");

        let result = session.apply_move(transfer(0, 2));
        assert_eq!(result.rejection, None, "Moves are accepted after a reset");
        assert!(result.solved && session.is_solved());
        assert_eq!(calls.get(), 1, "Callback fires once per session");
    }

    #[test]
    fn test_reset_with_seed_restores_puzzle() {
        let config = PuzzleConfig {
            seed: Some(8),
            ..Default::default()
        };
        let mut session = PuzzleSession::start(PuzzleKind::JigsawReconstitution, config).unwrap();
        let initial = session.state().clone();
        session.apply_move(Move::JigsawReconstitution(
            crate::variants::jigsaw::JigsawMove::Swap((0, 0), (0, 1)),
        ));
        assert_ne!(session.state(), &initial);
        session.reset().unwrap();
        assert_eq!(session.state(), &initial);
    }
}
