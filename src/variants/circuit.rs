//! Circuit path: rotate pipe segments until power flows from the source in the
//! top-left corner to the target in the bottom-right corner.
//!
//! Power crosses between two neighbors only when both segments open toward
//! each other.

use std::fmt;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::{checked, PuzzleConfig};
use crate::error::{ConfigResult, Rejection};
use crate::grid::{Direction, Grid, Pos};
use crate::search::{connected_region, Region};
use crate::variant::{Progress, Variant};

pub const DEFAULT_SIZE: usize = 4;

/// Chance that a generated segment is a corner.
const CORNER_PROBABILITY: f64 = 0.6;

/// Boards that generate already solved are rolled again, up to this many times.
const MAX_REROLLS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    /// `I`: a straight pipe.
    Straight,
    /// `L`: a corner pipe.
    Corner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Clockwise quarter turns, `0..4`.
    pub rotation: u8,
}

impl Segment {
    pub const fn new(kind: SegmentKind, rotation: u8) -> Self {
        Self {
            kind,
            rotation: rotation % 4,
        }
    }

    /// The two sides this segment opens toward.
    pub fn openings(self) -> [Direction; 2] {
        // unrotated: a straight runs left-right, a corner joins right and down
        let base = match self.kind {
            SegmentKind::Straight => [Direction::Left, Direction::Right],
            SegmentKind::Corner => [Direction::Right, Direction::Down],
        };
        base.map(|mut dir| {
            for _ in 0..self.rotation {
                dir = dir.rotate_cw();
            }
            dir
        })
    }

    #[inline]
    pub fn opens(self, dir: Direction) -> bool {
        self.openings().contains(&dir)
    }

    #[inline]
    pub fn rotated(self) -> Self {
        Self::new(self.kind, self.rotation + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CircuitMove {
    /// Turn the segment at this cell 90 degrees clockwise.
    Rotate(Pos),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitPath {
    grid: Grid<Segment>,
}

impl CircuitPath {
    pub fn from_grid(grid: Grid<Segment>) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &Grid<Segment> {
        &self.grid
    }

    pub fn source(&self) -> Pos {
        (0, 0)
    }

    pub fn target(&self) -> Pos {
        let last = self.grid.size() as i32 - 1;
        (last, last)
    }

    /// Cells reached by power from the source.
    pub fn powered(&self) -> Region {
        let grid = &self.grid;
        let target = self.target();
        connected_region(
            self.source(),
            grid.size(),
            |from, dir, to| match (grid.get(from), grid.get(to)) {
                (Some(a), Some(b)) => a.opens(dir) && b.opens(dir.opposite()),
                _ => false,
            },
            |pos| pos == target,
        )
    }

    fn random(size: usize, rng: &mut ChaCha8Rng) -> Self {
        Self::from_grid(Grid::from_fn(size, |_| {
            let kind = if rng.random_bool(CORNER_PROBABILITY) {
                SegmentKind::Corner
            } else {
                SegmentKind::Straight
            };
            Segment::new(kind, rng.random_range(0..4))
        }))
    }
}

impl Variant for CircuitPath {
    type Move = CircuitMove;

    fn init(config: &PuzzleConfig, rng: &mut ChaCha8Rng) -> ConfigResult<Self> {
        let size = checked("grid_size", config.grid_size, DEFAULT_SIZE, 2..=12)?;
        let mut circuit = Self::random(size, rng);
        for _ in 0..MAX_REROLLS {
            if !circuit.is_solved() {
                break;
            }
            circuit = Self::random(size, rng);
        }
        Ok(circuit)
    }

    fn apply(&mut self, mv: CircuitMove) -> Result<(), Rejection> {
        if self.is_solved() {
            return Err(Rejection::AlreadySolved);
        }
        let CircuitMove::Rotate(pos) = mv;
        let segment = self.grid.get_mut(pos).ok_or(Rejection::OutOfBounds)?;
        *segment = segment.rotated();
        Ok(())
    }

    fn is_solved(&self) -> bool {
        self.powered().reached_goal
    }

    fn progress(&self) -> Progress {
        Progress::Circuit {
            powered: self.powered().len(),
            cells: self.grid.cells().len(),
        }
    }
}

impl fmt::Display for CircuitPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let powered = self.powered();
        for (pos, segment) in self.grid.iter() {
            let glyph = match (segment.kind, segment.rotation % 2, segment.rotation) {
                (SegmentKind::Straight, 0, _) => '─',
                (SegmentKind::Straight, _, _) => '│',
                (SegmentKind::Corner, _, 0) => '┌',
                (SegmentKind::Corner, _, 1) => '┐',
                (SegmentKind::Corner, _, 2) => '┘',
                (SegmentKind::Corner, _, _) => '└',
            };
            write!(f, "{}", glyph)?;
            write!(f, "{}", if powered.contains(pos) { '+' } else { ' ' })?;
            if pos.1 as usize == self.grid.size() - 1 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
