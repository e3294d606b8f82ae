//! Tower of Hanoi: move the whole stack from the first rod to the last.
//!
//! Disks are numbered by size, `1` being the smallest. Each rod is stored
//! bottom to top, so the top disk is the last element.

use std::fmt;

use log::debug;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::{checked, PuzzleConfig};
use crate::error::{ConfigResult, Rejection};
use crate::search::{shortest_solution_path, SearchOutcome, MAX_EXPANSIONS};
use crate::variant::{Hint, HintResult, Progress, Variant};

pub const ROD_COUNT: usize = 3;

/// Rod that must hold every disk at the end.
pub const TARGET_ROD: usize = 2;

pub const DEFAULT_DISKS: usize = 3;

/// Upper bound on disk count; the canonical key packs two bits per disk.
pub const MAX_DISKS: usize = 16;

/// Disk stacks, bottom to top.
pub type Rods = [Vec<u8>; ROD_COUNT];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HanoiMove {
    /// Click a rod: the first click picks the source, the second the
    /// destination. Clicking the selected rod again cancels.
    Select(usize),
    /// Move the top disk of `from` onto `to` directly.
    Transfer { from: usize, to: usize },
    /// Revert the last transfer.
    Undo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TowerOfHanoi {
    rods: Rods,
    disks: usize,
    selection: Option<usize>,
    /// Every executed transfer as `(from, to)`, oldest first.
    history: Vec<(usize, usize)>,
}

impl TowerOfHanoi {
    /// Creates a fresh puzzle with every disk on rod 0.
    pub fn new(disks: usize) -> Self {
        let first: Vec<u8> = (1..=disks as u8).rev().collect();
        Self {
            rods: [first, Vec::new(), Vec::new()],
            disks,
            selection: None,
            history: Vec::new(),
        }
    }

    pub fn rods(&self) -> &Rods {
        &self.rods
    }

    pub fn disks(&self) -> usize {
        self.disks
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    /// Transfers made so far (undone transfers do not count).
    pub fn moves(&self) -> usize {
        self.history.len()
    }

    /// Length of the optimal solution from the initial position, `2^N - 1`.
    pub fn min_moves(&self) -> u64 {
        (1u64 << self.disks) - 1
    }

    /// Shortest sequence of transfers from the current position.
    pub fn solution(&self) -> SearchOutcome<HanoiMove> {
        let disks = self.disks;
        shortest_solution_path(
            self.rods.clone(),
            legal_transfers,
            |rods| rods[TARGET_ROD].len() == disks,
            canonical_key,
            MAX_EXPANSIONS,
        )
    }

    fn transfer(&mut self, from: usize, to: usize) -> Result<(), Rejection> {
        if from >= ROD_COUNT || to >= ROD_COUNT {
            return Err(Rejection::OutOfBounds);
        }
        if from == to {
            return Err(Rejection::Blocked);
        }
        let Some(&disk) = self.rods[from].last() else {
            return Err(Rejection::EmptyRod);
        };
        if !fits_on(disk, &self.rods[to]) {
            return Err(Rejection::Blocked);
        }

        self.rods[from].pop();
        self.rods[to].push(disk);
        self.history.push((from, to));
        self.selection = None;
        debug!("hanoi: disk {disk} rod {from} -> rod {to}");
        Ok(())
    }

    fn undo(&mut self) -> Result<(), Rejection> {
        let (from, to) = self.history.pop().ok_or(Rejection::NothingToUndo)?;
        // history only records legal transfers, so the disk is on top of `to`
        if let Some(disk) = self.rods[to].pop() {
            self.rods[from].push(disk);
        }
        self.selection = None;
        Ok(())
    }
}

/// Whether `disk` may be placed on top of `rod`.
#[inline]
fn fits_on(disk: u8, rod: &[u8]) -> bool {
    rod.last().map_or(true, |&top| disk < top)
}

/// Every legal transfer from `rods`, source rod major, destination minor.
fn legal_transfers(rods: &Rods) -> Vec<(HanoiMove, Rods)> {
    let mut moves = Vec::new();
    for from in 0..ROD_COUNT {
        let Some(&disk) = rods[from].last() else {
            continue;
        };
        for to in 0..ROD_COUNT {
            if from == to || !fits_on(disk, &rods[to]) {
                continue;
            }
            let mut next = rods.clone();
            next[from].pop();
            next[to].push(disk);
            moves.push((HanoiMove::Transfer { from, to }, next));
        }
    }
    moves
}

/// Packs the rod of every disk into two bits.
///
/// Stacks are always sorted, so knowing which rod holds each disk fixes the
/// whole position: the key is collision-free over legal positions.
fn canonical_key(rods: &Rods) -> u64 {
    let mut key = 0u64;
    for (rod, stack) in rods.iter().enumerate() {
        for &disk in stack {
            key |= (rod as u64) << (2 * (disk as u64 - 1));
        }
    }
    key
}

impl Variant for TowerOfHanoi {
    type Move = HanoiMove;

    fn init(config: &PuzzleConfig, _rng: &mut ChaCha8Rng) -> ConfigResult<Self> {
        let disks = checked("disks", config.disks, DEFAULT_DISKS, 1..=MAX_DISKS)?;
        Ok(Self::new(disks))
    }

    fn apply(&mut self, mv: HanoiMove) -> Result<(), Rejection> {
        if self.is_solved() {
            return Err(Rejection::AlreadySolved);
        }
        match mv {
            HanoiMove::Select(rod) => {
                if rod >= ROD_COUNT {
                    return Err(Rejection::OutOfBounds);
                }
                match self.selection {
                    Some(selected) if selected == rod => {
                        self.selection = None;
                        Ok(())
                    }
                    Some(selected) => self.transfer(selected, rod),
                    None if self.rods[rod].is_empty() => Err(Rejection::EmptyRod),
                    None => {
                        self.selection = Some(rod);
                        Ok(())
                    }
                }
            }
            HanoiMove::Transfer { from, to } => self.transfer(from, to),
            HanoiMove::Undo => self.undo(),
        }
    }

    fn is_solved(&self) -> bool {
        self.rods[TARGET_ROD].len() == self.disks
    }

    fn progress(&self) -> Progress {
        Progress::Hanoi {
            moves: self.moves(),
            min_moves: self.min_moves(),
        }
    }
}

impl Hint for TowerOfHanoi {
    fn hint(&self) -> HintResult<HanoiMove> {
        match self.solution() {
            SearchOutcome::AlreadyAtGoal => HintResult::AlreadySolved,
            outcome => outcome
                .first_move()
                .map_or(HintResult::NoSolution, HintResult::Move),
        }
    }
}

impl fmt::Display for TowerOfHanoi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, rod) in self.rods.iter().enumerate() {
            let marker = if self.selection == Some(index) { '*' } else { ' ' };
            write!(f, "{}{}|", index + 1, marker)?;
            for disk in rod {
                write!(f, " {}", disk)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "moves {} / min {}", self.moves(), self.min_moves())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer(from: usize, to: usize) -> HanoiMove {
        HanoiMove::Transfer { from, to }
    }

    #[test]
    fn test_optimal_solution_length_is_two_pow_n_minus_one() {
        for disks in 1..=7 {
            let puzzle = TowerOfHanoi::new(disks);
            let SearchOutcome::Found(path) = puzzle.solution() else {
                panic!("No solution found for {disks} disks");
            };
            assert_eq!(
                path.len() as u64,
                (1u64 << disks) - 1,
                "Wrong optimal length for {disks} disks"
            );

            // replaying the path must solve the puzzle on the last move only
            let mut replay = puzzle.clone();
            for (step, &mv) in path.iter().enumerate() {
                assert!(!replay.is_solved(), "Solved early at step {step}");
                replay.apply(mv).unwrap();
            }
            assert!(replay.is_solved());
        }
    }

    #[test]
    fn test_first_hint_matches_parity() {
        for disks in 1..=7 {
            let expected = if disks % 2 == 1 {
                transfer(0, 2)
            } else {
                transfer(0, 1)
            };
            assert_eq!(
                TowerOfHanoi::new(disks).hint(),
                HintResult::Move(expected),
                "Wrong first move for {disks} disks"
            );
        }
    }

    #[test]
    fn test_larger_disk_cannot_cover_smaller() {
        let mut puzzle = TowerOfHanoi::new(3);
        puzzle.apply(transfer(0, 1)).unwrap();
        let before = puzzle.clone();
        assert_eq!(puzzle.apply(transfer(0, 1)), Err(Rejection::Blocked));
        assert_eq!(puzzle, before, "Rejected move must not change state");
        assert_eq!(puzzle.apply(transfer(2, 0)), Err(Rejection::EmptyRod));
        assert_eq!(puzzle.apply(transfer(0, 3)), Err(Rejection::OutOfBounds));
    }

    #[test]
    fn test_select_protocol() {
        let mut puzzle = TowerOfHanoi::new(2);
        assert_eq!(puzzle.apply(HanoiMove::Select(1)), Err(Rejection::EmptyRod));

        puzzle.apply(HanoiMove::Select(0)).unwrap();
        assert_eq!(puzzle.selection(), Some(0));
        puzzle.apply(HanoiMove::Select(0)).unwrap();
        assert_eq!(puzzle.selection(), None, "Reselecting cancels");

        puzzle.apply(HanoiMove::Select(0)).unwrap();
        puzzle.apply(HanoiMove::Select(1)).unwrap();
        assert_eq!(puzzle.rods()[1], vec![1]);
        assert_eq!(puzzle.selection(), None);

        // disk 2 onto disk 1 is illegal; the selection survives the rejection
        puzzle.apply(HanoiMove::Select(0)).unwrap();
        assert_eq!(puzzle.apply(HanoiMove::Select(1)), Err(Rejection::Blocked));
        assert_eq!(puzzle.selection(), Some(0));
    }

    #[test]
    fn test_undo_restores_previous_position() {
        let mut puzzle = TowerOfHanoi::new(3);
        assert_eq!(puzzle.apply(HanoiMove::Undo), Err(Rejection::NothingToUndo));
        let start = puzzle.clone();
        puzzle.apply(transfer(0, 2)).unwrap();
        puzzle.apply(transfer(0, 1)).unwrap();
        assert_eq!(puzzle.moves(), 2);
        puzzle.apply(HanoiMove::Undo).unwrap();
        puzzle.apply(HanoiMove::Undo).unwrap();
        assert_eq!(puzzle, start);
    }

    #[test]
    fn test_hint_from_mid_game_and_after_solve() {
        let mut puzzle = TowerOfHanoi::new(2);
        // a detour: small disk to the middle rod and back
        puzzle.apply(transfer(0, 1)).unwrap();
        puzzle.apply(transfer(1, 0)).unwrap();
        assert_eq!(puzzle.hint(), HintResult::Move(transfer(0, 1)));

        for mv in [transfer(0, 1), transfer(0, 2), transfer(1, 2)] {
            puzzle.apply(mv).unwrap();
        }
        assert!(puzzle.is_solved());
        assert_eq!(puzzle.hint(), HintResult::AlreadySolved);
        assert_eq!(puzzle.apply(transfer(2, 0)), Err(Rejection::AlreadySolved));
    }

    #[test]
    fn test_canonical_key_distinguishes_positions() {
        let mut keys = rustc_hash::FxHashSet::default();
        let mut frontier = vec![TowerOfHanoi::new(4).rods];
        let mut visited = 0;
        while let Some(rods) = frontier.pop() {
            if !keys.insert(canonical_key(&rods)) {
                continue;
            }
            visited += 1;
            frontier.extend(legal_transfers(&rods).into_iter().map(|(_, next)| next));
        }
        assert_eq!(visited, 81, "4 disks have 3^4 reachable positions");
    }

    #[test]
    fn test_board_rendering() {
        let mut puzzle = TowerOfHanoi::new(3);
        puzzle.apply(transfer(0, 2)).unwrap();
        puzzle.apply(HanoiMove::Select(0)).unwrap();
        insta::assert_snapshot!(puzzle.to_string(), @r"
        1*| 3 2
        2 |
        3 | 1
        moves 1 / min 7
        ");
    }
}
