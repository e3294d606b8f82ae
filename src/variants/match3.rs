//! Match-3: swap neighboring gems to line up three or more of a color.
//!
//! A swap that makes no line is shown briefly and then undone. A swap that
//! does runs a cascade of timed steps: matched gems are cleared and scored,
//! the rest fall, the holes are refilled, and the board is checked again.

use std::fmt;
use std::time::Duration;

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::config::{checked, PuzzleConfig};
use crate::error::{ConfigError, ConfigResult, Rejection};
use crate::grid::{idx_to_pos, is_adjacent, Grid, Pos};
use crate::variant::{Progress, SolveResult, Variant};

pub const DEFAULT_SIZE: usize = 6;
pub const DEFAULT_COLORS: u8 = 5;
pub const DEFAULT_TARGET: u32 = 150;
pub const POINTS_PER_GEM: u32 = 10;
pub const STEP_TIME: Duration = Duration::from_millis(300);

/// Minimum run length that clears.
const MIN_RUN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "kebab-case")]
pub enum Match3Phase {
    Idle,
    /// A swap made no line and will be swapped back.
    Reverting { a: Pos, b: Pos },
    /// Matched gems are about to be removed.
    Clearing,
    /// Gems are about to fall into the holes.
    Falling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Match3Move {
    /// Swap two adjacent gems.
    Swap(Pos, Pos),
    /// Click protocol: select a gem, then click a neighbor to swap with it.
    Select(Pos),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match3 {
    board: Grid<Option<u8>>,
    colors: u8,
    score: u32,
    target: u32,
    selected: Option<Pos>,
    phase: Match3Phase,
    #[serde(skip)]
    rng: ChaCha8Rng,
}

/// Cells on a horizontal or vertical run of at least three equal gems.
///
/// Cells where runs cross are listed once. The result is sorted.
pub fn find_matches(board: &Grid<Option<u8>>) -> Vec<Pos> {
    let n = board.size() as i32;
    let mut matched: FxHashSet<Pos> = FxHashSet::default();

    let mut scan = |line: &[Pos]| {
        let mut start = 0;
        while start < line.len() {
            let gem = board.get(line[start]).copied().flatten();
            let mut end = start + 1;
            while end < line.len() && board.get(line[end]).copied().flatten() == gem {
                end += 1;
            }
            if gem.is_some() && end - start >= MIN_RUN {
                matched.extend(&line[start..end]);
            }
            start = end;
        }
    };

    for r in 0..n {
        let row: Vec<Pos> = (0..n).map(|c| (r, c)).collect();
        scan(&row);
    }
    for c in 0..n {
        let col: Vec<Pos> = (0..n).map(|r| (r, c)).collect();
        scan(&col);
    }

    let mut cells: Vec<Pos> = matched.into_iter().collect();
    cells.sort_unstable();
    cells
}

impl Match3 {
    /// Builds a game from rows of gem colors in `0..colors`.
    pub fn from_rows(
        rows: Vec<Vec<u8>>,
        colors: u8,
        target: u32,
        rng: ChaCha8Rng,
    ) -> ConfigResult<Self> {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Some).collect())
            .collect();
        let board = Grid::from_rows(rows)
            .filter(|board| board.size() > 0)
            .ok_or_else(|| ConfigError::invalid("grid_size", "board must be a non-empty square"))?;
        if colors == 0 {
            return Err(ConfigError::invalid("colors", "at least one color is needed"));
        }
        if board.cells().iter().flatten().any(|&gem| gem >= colors) {
            return Err(ConfigError::invalid("colors", "gem color out of range"));
        }
        Ok(Self {
            board,
            colors,
            score: 0,
            target,
            selected: None,
            phase: Match3Phase::Idle,
            rng,
        })
    }

    /// Fills a board so that no run of three exists yet.
    fn generate(size: usize, colors: u8, rng: &mut ChaCha8Rng) -> Grid<Option<u8>> {
        let mut board = Grid::filled(size, None);
        for idx in 0..size * size {
            let (r, c) = idx_to_pos(idx, size);
            let gem_at = |pos: Pos| board.get(pos).copied().flatten();

            // a color already doubled to the left or above would make a run
            let mut banned = Vec::with_capacity(2);
            for (near, far) in [((r, c - 1), (r, c - 2)), ((r - 1, c), (r - 2, c))] {
                if let Some(gem) = gem_at(near) {
                    if gem_at(far) == Some(gem) {
                        banned.push(gem);
                    }
                }
            }
            let allowed: Vec<u8> = (0..colors).filter(|gem| !banned.contains(gem)).collect();
            let gem = allowed[rng.random_range(0..allowed.len())];
            board.set((r, c), Some(gem));
        }
        board
    }

    pub fn board(&self) -> &Grid<Option<u8>> {
        &self.board
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> Match3Phase {
        self.phase
    }

    pub fn selected(&self) -> Option<Pos> {
        self.selected
    }

    fn swap(&mut self, a: Pos, b: Pos) -> Result<(), Rejection> {
        if !self.board.contains(a) || !self.board.contains(b) {
            return Err(Rejection::OutOfBounds);
        }
        if a == b {
            return Err(Rejection::SameTile);
        }
        if !is_adjacent(a, b) {
            return Err(Rejection::NotAdjacent);
        }
        self.board.swap(a, b);
        self.selected = None;
        self.phase = if find_matches(&self.board).is_empty() {
            debug!("match3: swap {:?} <-> {:?} makes no line", a, b);
            Match3Phase::Reverting { a, b }
        } else {
            Match3Phase::Clearing
        };
        Ok(())
    }

    fn select(&mut self, pos: Pos) -> Result<(), Rejection> {
        if !self.board.contains(pos) {
            return Err(Rejection::OutOfBounds);
        }
        match self.selected {
            Some(prev) if prev == pos => self.selected = None,
            Some(prev) if is_adjacent(prev, pos) => self.swap(prev, pos)?,
            _ => self.selected = Some(pos),
        }
        Ok(())
    }

    fn clear_matches(&mut self) {
        let cells = find_matches(&self.board);
        self.score += POINTS_PER_GEM * cells.len() as u32;
        debug!("match3: cleared {} gems, score {}", cells.len(), self.score);
        for pos in cells {
            self.board.set(pos, None);
        }
    }

    /// Drops gems to the bottom of each column and refills from the top.
    fn settle(&mut self) {
        let n = self.board.size() as i32;
        for c in 0..n {
            let gems: Vec<u8> = (0..n)
                .rev()
                .filter_map(|r| self.board.get((r, c)).copied().flatten())
                .collect();
            for (i, r) in (0..n).rev().enumerate() {
                let gem = match gems.get(i) {
                    Some(&gem) => gem,
                    None => self.rng.random_range(0..self.colors),
                };
                self.board.set((r, c), Some(gem));
            }
        }
    }
}

impl Variant for Match3 {
    type Move = Match3Move;

    fn init(config: &PuzzleConfig, rng: &mut ChaCha8Rng) -> ConfigResult<Self> {
        let size = checked("grid_size", config.grid_size, DEFAULT_SIZE, 3..=12)?;
        let colors = checked("colors", config.colors, DEFAULT_COLORS, 3..=8)?;
        let target = checked("target_score", config.target_score, DEFAULT_TARGET, 1..=100_000)?;
        let board = Self::generate(size, colors, rng);
        Ok(Self {
            board,
            colors,
            score: 0,
            target,
            selected: None,
            phase: Match3Phase::Idle,
            rng: ChaCha8Rng::from_rng(rng),
        })
    }

    fn apply(&mut self, mv: Match3Move) -> Result<(), Rejection> {
        if self.is_solved() {
            return Err(Rejection::AlreadySolved);
        }
        if self.is_busy() {
            return Err(Rejection::OutOfTurn);
        }
        match mv {
            Match3Move::Swap(a, b) => self.swap(a, b),
            Match3Move::Select(pos) => self.select(pos),
        }
    }

    /// Target score reached and the board has settled.
    fn is_solved(&self) -> bool {
        self.score >= self.target && self.phase == Match3Phase::Idle
    }

    fn progress(&self) -> Progress {
        Progress::Match3 {
            score: self.score,
            target: self.target,
        }
    }

    fn is_busy(&self) -> bool {
        self.phase != Match3Phase::Idle
    }

    fn pending(&self) -> Option<Duration> {
        self.is_busy().then_some(STEP_TIME)
    }

    /// A swap that makes no line is shown, then swapped back. Until it is
    /// reverted the result carries `no-match`.
    fn result(&self, rejection: Option<Rejection>) -> SolveResult {
        let rejection = match self.phase {
            Match3Phase::Reverting { .. } => rejection.or(Some(Rejection::NoMatch)),
            _ => rejection,
        };
        SolveResult {
            solved: self.is_solved(),
            failed: self.is_failed(),
            busy: self.is_busy(),
            progress: self.progress(),
            rejection,
            pending: self.pending(),
        }
    }

    fn advance(&mut self) -> bool {
        self.phase = match self.phase {
            Match3Phase::Idle => return false,
            Match3Phase::Reverting { a, b } => {
                self.board.swap(a, b);
                Match3Phase::Idle
            }
            Match3Phase::Clearing => {
                self.clear_matches();
                Match3Phase::Falling
            }
            Match3Phase::Falling => {
                self.settle();
                if find_matches(&self.board).is_empty() {
                    Match3Phase::Idle
                } else {
                    Match3Phase::Clearing
                }
            }
        };
        true
    }
}

impl fmt::Display for Match3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pos, gem) in self.board.iter() {
            match gem {
                Some(gem) => write!(f, "{}", gem)?,
                None => write!(f, ".")?,
            }
            let mark = if self.selected == Some(pos) { '<' } else { ' ' };
            write!(f, "{}", mark)?;
            if pos.1 as usize == self.board.size() - 1 {
                writeln!(f)?;
            }
        }
        writeln!(f, "score {}/{}", self.score, self.target)
    }
}
