//! Block blast: place tray shapes on a board and clear full lines.
//!
//! Full rows and full columns are found together before anything is cleared,
//! so a cell on a crossing row and column is removed once and each line is
//! credited once.

use std::fmt;

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::{checked, PuzzleConfig};
use crate::error::{ConfigError, ConfigResult, Rejection};
use crate::grid::{Grid, Pos};
use crate::variant::{Progress, Variant};

pub const DEFAULT_SIZE: usize = 6;
pub const DEFAULT_LINE_TARGET: u32 = 3;
pub const TRAY_SIZE: usize = 3;

/// Cell offsets of a shape, relative to its placement origin.
pub type Shape = &'static [Pos];

/// The shape catalogue.
pub const SHAPES: [Shape; 8] = [
    // single
    &[(0, 0)],
    // domino, both orientations
    &[(0, 0), (0, 1)],
    &[(0, 0), (1, 0)],
    // tromino bars
    &[(0, 0), (0, 1), (0, 2)],
    &[(0, 0), (1, 0), (2, 0)],
    // square
    &[(0, 0), (0, 1), (1, 0), (1, 1)],
    // corners
    &[(0, 0), (1, 0), (1, 1)],
    &[(0, 1), (1, 0), (1, 1)],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlastMove {
    /// Pick up the shape in this tray slot.
    Select(usize),
    /// Drop the selected shape with its origin on this cell.
    Place(Pos),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockBlast {
    board: Grid<bool>,
    /// Shape index per tray slot; `None` once placed.
    tray: Vec<Option<usize>>,
    selected: Option<usize>,
    lines_cleared: u32,
    target: u32,
    #[serde(skip)]
    rng: ChaCha8Rng,
}

impl BlockBlast {
    /// Builds a game from an existing board and tray.
    pub fn with_board(
        board: Grid<bool>,
        tray: Vec<usize>,
        target: u32,
        rng: ChaCha8Rng,
    ) -> ConfigResult<Self> {
        if tray.is_empty() || tray.iter().any(|&shape| shape >= SHAPES.len()) {
            return Err(ConfigError::invalid("tray", "unknown shape in tray"));
        }
        Ok(Self {
            board,
            tray: tray.into_iter().map(Some).collect(),
            selected: None,
            lines_cleared: 0,
            target,
            rng,
        })
    }

    pub fn board(&self) -> &Grid<bool> {
        &self.board
    }

    pub fn tray(&self) -> &[Option<usize>] {
        &self.tray
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    /// Board cells covered by `shape` placed at `origin`, if all are free.
    pub fn placement(&self, shape: Shape, origin: Pos) -> Result<Vec<Pos>, Rejection> {
        let cells = shape
            .iter()
            .map(|&(dr, dc)| Some((origin.0.checked_add(dr)?, origin.1.checked_add(dc)?)))
            .collect::<Option<Vec<Pos>>>()
            .ok_or(Rejection::OutOfBounds)?;
        for &pos in &cells {
            match self.board.get(pos) {
                None => return Err(Rejection::OutOfBounds),
                Some(true) => return Err(Rejection::Occupied),
                Some(false) => {}
            }
        }
        Ok(cells)
    }

    /// Whether `shape` fits anywhere on the board.
    pub fn fits_anywhere(&self, shape: Shape) -> bool {
        self.board
            .positions()
            .any(|origin| self.placement(shape, origin).is_ok())
    }

    /// Clears every full row and column. Returns the number of lines cleared.
    fn clear_lines(&mut self) -> u32 {
        let n = self.board.size() as i32;
        let full_rows: Vec<i32> = (0..n)
            .filter(|&r| (0..n).all(|c| self.board.get((r, c)) == Some(&true)))
            .collect();
        let full_cols: Vec<i32> = (0..n)
            .filter(|&c| (0..n).all(|r| self.board.get((r, c)) == Some(&true)))
            .collect();

        for &r in &full_rows {
            for c in 0..n {
                self.board.set((r, c), false);
            }
        }
        for &c in &full_cols {
            for r in 0..n {
                self.board.set((r, c), false);
            }
        }
        (full_rows.len() + full_cols.len()) as u32
    }

    fn refill_tray(&mut self) {
        let rng = &mut self.rng;
        self.tray = (0..TRAY_SIZE)
            .map(|_| Some(rng.random_range(0..SHAPES.len())))
            .collect();
    }
}

impl Variant for BlockBlast {
    type Move = BlastMove;

    fn init(config: &PuzzleConfig, rng: &mut ChaCha8Rng) -> ConfigResult<Self> {
        let size = checked("grid_size", config.grid_size, DEFAULT_SIZE, 3..=12)?;
        let target = checked("line_target", config.line_target, DEFAULT_LINE_TARGET, 1..=100)?;
        let tray = (0..TRAY_SIZE).map(|_| rng.random_range(0..SHAPES.len())).collect();
        Self::with_board(Grid::filled(size, false), tray, target, ChaCha8Rng::from_rng(rng))
    }

    fn apply(&mut self, mv: BlastMove) -> Result<(), Rejection> {
        if self.is_solved() {
            return Err(Rejection::AlreadySolved);
        }
        if self.is_failed() {
            return Err(Rejection::OutOfMoves);
        }
        match mv {
            BlastMove::Select(slot) => {
                match self.tray.get(slot) {
                    None => return Err(Rejection::OutOfBounds),
                    Some(None) => return Err(Rejection::NoSelection),
                    Some(Some(_)) => {}
                }
                self.selected = Some(slot);
            }
            BlastMove::Place(origin) => {
                let slot = self.selected.ok_or(Rejection::NoSelection)?;
                let shape = self.tray[slot].ok_or(Rejection::NoSelection)?;
                let cells = self.placement(SHAPES[shape], origin)?;
                for pos in cells {
                    self.board.set(pos, true);
                }
                self.tray[slot] = None;
                self.selected = None;

                let cleared = self.clear_lines();
                if cleared > 0 {
                    self.lines_cleared += cleared;
                    debug!("blast: cleared {} lines, total {}", cleared, self.lines_cleared);
                }
                if self.tray.iter().all(Option::is_none) {
                    self.refill_tray();
                }
            }
        }
        Ok(())
    }

    fn is_solved(&self) -> bool {
        self.lines_cleared >= self.target
    }

    /// No piece left in the tray fits on the board.
    fn is_failed(&self) -> bool {
        !self.is_solved()
            && !self
                .tray
                .iter()
                .flatten()
                .any(|&shape| self.fits_anywhere(SHAPES[shape]))
    }

    fn progress(&self) -> Progress {
        Progress::Blast {
            lines_cleared: self.lines_cleared,
            target: self.target,
        }
    }
}

impl fmt::Display for BlockBlast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.board.rows() {
            for &filled in row {
                write!(f, "{}", if filled { '#' } else { '.' })?;
            }
            writeln!(f)?;
        }
        write!(f, "tray:")?;
        for (slot, shape) in self.tray.iter().enumerate() {
            let mark = if self.selected == Some(slot) { "*" } else { "" };
            match shape {
                Some(shape) => write!(f, " {}{}", shape, mark)?,
                None => write!(f, " -")?,
            }
        }
        writeln!(f)?;
        writeln!(f, "lines {}/{}", self.lines_cleared, self.target)
    }
}
