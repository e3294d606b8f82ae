//! Laser redirect: flip mirrors until the beam reaches the target.
//!
//! The beam leaves the source in a fixed heading and is traced cell by cell.
//! It stops when it reaches the target, leaves the board, or enters a cell in
//! a direction it already travelled (a loop).

use std::fmt;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::config::{checked, PuzzleConfig};
use crate::error::{ConfigError, ConfigResult, Rejection};
use crate::grid::{Direction, Grid, Pos};
use crate::variant::{Progress, Variant};

pub const DEFAULT_SIZE: usize = 5;
pub const DEFAULT_MIRRORS: [Pos; 5] = [(0, 4), (4, 4), (4, 0), (2, 0), (2, 2)];

const MAX_REROLLS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mirror {
    /// `/`
    Slash,
    /// `\`
    Backslash,
}

impl Mirror {
    pub fn reflect(self, heading: Direction) -> Direction {
        use Direction::*;
        match (self, heading) {
            (Mirror::Slash, Right) => Up,
            (Mirror::Slash, Left) => Down,
            (Mirror::Slash, Up) => Right,
            (Mirror::Slash, Down) => Left,
            (Mirror::Backslash, Right) => Down,
            (Mirror::Backslash, Left) => Up,
            (Mirror::Backslash, Up) => Left,
            (Mirror::Backslash, Down) => Right,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Mirror::Slash => Mirror::Backslash,
            Mirror::Backslash => Mirror::Slash,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LaserMove {
    /// Flip the mirror at this cell between `/` and `\`.
    Toggle(Pos),
}

/// A traced beam.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Beam {
    /// Cells the beam passes through, in order, without repeats.
    pub cells: Vec<Pos>,
    pub hits_target: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaserRedirect {
    mirrors: Grid<Option<Mirror>>,
    source: Pos,
    heading: Direction,
    target: Pos,
}

impl LaserRedirect {
    /// Source in the top-left corner heading right, target in the opposite
    /// corner.
    pub fn new(mirrors: Grid<Option<Mirror>>) -> Self {
        let last = mirrors.size() as i32 - 1;
        Self {
            mirrors,
            source: (0, 0),
            heading: Direction::Right,
            target: (last, last),
        }
    }

    pub fn mirrors(&self) -> &Grid<Option<Mirror>> {
        &self.mirrors
    }

    pub fn source(&self) -> Pos {
        self.source
    }

    pub fn target(&self) -> Pos {
        self.target
    }

    pub fn trace(&self) -> Beam {
        let mut beam = Beam::default();
        let mut seen: FxHashSet<(Pos, Direction)> = FxHashSet::default();
        let mut pos = self.source;
        let mut heading = self.heading;

        while let Some(cell) = self.mirrors.get(pos) {
            if !seen.insert((pos, heading)) {
                break;
            }
            if !beam.cells.contains(&pos) {
                beam.cells.push(pos);
            }
            if pos == self.target {
                beam.hits_target = true;
                break;
            }
            if let Some(mirror) = cell {
                heading = mirror.reflect(heading);
            }
            pos = heading.step(pos);
        }
        beam
    }

    fn random(size: usize, positions: &[Pos], rng: &mut ChaCha8Rng) -> Self {
        let mut mirrors = Grid::filled(size, None);
        for &pos in positions {
            let mirror = if rng.random_bool(0.5) {
                Mirror::Slash
            } else {
                Mirror::Backslash
            };
            mirrors.set(pos, Some(mirror));
        }
        Self::new(mirrors)
    }
}

impl Variant for LaserRedirect {
    type Move = LaserMove;

    fn init(config: &PuzzleConfig, rng: &mut ChaCha8Rng) -> ConfigResult<Self> {
        let size = checked("grid_size", config.grid_size, DEFAULT_SIZE, 2..=16)?;
        let positions = config.mirrors.clone().unwrap_or_else(|| DEFAULT_MIRRORS.to_vec());
        let grid: Grid<()> = Grid::filled(size, ());
        if let Some(pos) = positions.iter().find(|&&pos| !grid.contains(pos)) {
            return Err(ConfigError::invalid(
                "mirrors",
                format!("{:?} is off a {}x{} board", pos, size, size),
            ));
        }

        let mut laser = Self::random(size, &positions, rng);
        for _ in 0..MAX_REROLLS {
            if !laser.is_solved() {
                break;
            }
            laser = Self::random(size, &positions, rng);
        }
        Ok(laser)
    }

    fn apply(&mut self, mv: LaserMove) -> Result<(), Rejection> {
        if self.is_solved() {
            return Err(Rejection::AlreadySolved);
        }
        let LaserMove::Toggle(pos) = mv;
        let cell = self.mirrors.get_mut(pos).ok_or(Rejection::OutOfBounds)?;
        let mirror = cell.as_mut().ok_or(Rejection::NoMirror)?;
        *mirror = mirror.toggled();
        Ok(())
    }

    fn is_solved(&self) -> bool {
        self.trace().hits_target
    }

    fn progress(&self) -> Progress {
        Progress::Laser {
            beam: self.trace().cells.len(),
        }
    }
}

impl fmt::Display for LaserRedirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let beam = self.trace();
        for (pos, cell) in self.mirrors.iter() {
            let c = match cell {
                Some(Mirror::Slash) => '/',
                Some(Mirror::Backslash) => '\\',
                None if pos == self.source => 'S',
                None if pos == self.target => 'T',
                None if beam.cells.contains(&pos) => '*',
                None => '.',
            };
            write!(f, "{}", c)?;
            if pos.1 as usize == self.mirrors.size() - 1 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(mirrors: &[(Pos, Mirror)]) -> LaserRedirect {
        let mut grid = Grid::filled(DEFAULT_SIZE, None);
        for &(pos, mirror) in mirrors {
            grid.set(pos, Some(mirror));
        }
        LaserRedirect::new(grid)
    }

    #[test]
    fn test_reflection_table() {
        use Direction::*;
        let slash: Vec<_> = Direction::ALL.map(|d| Mirror::Slash.reflect(d)).to_vec();
        let back: Vec<_> = Direction::ALL.map(|d| Mirror::Backslash.reflect(d)).to_vec();
        assert_eq!(slash, vec![Up, Down, Right, Left]);
        assert_eq!(back, vec![Down, Up, Left, Right]);
    }

    #[test]
    fn test_corner_mirror_routes_beam_to_target() {
        let laser = board(&[((0, 4), Mirror::Backslash), ((4, 4), Mirror::Slash)]);
        let beam = laser.trace();
        assert!(beam.hits_target, "Target is checked before its own mirror reflects");
        assert_eq!(beam.cells.len(), 9);
        assert_eq!(beam.cells.last(), Some(&(4, 4)));
    }

    #[test]
    fn test_beam_leaving_board() {
        let laser = board(&[((0, 4), Mirror::Slash)]);
        let beam = laser.trace();
        assert!(!beam.hits_target);
        assert_eq!(beam.cells, vec![(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)]);
    }

    #[test]
    fn test_crossing_cell_is_listed_once() {
        // the beam turns back through the source cell and exits upward
        let laser = board(&[
            ((0, 2), Mirror::Backslash),
            ((2, 2), Mirror::Slash),
            ((2, 0), Mirror::Backslash),
        ]);
        let beam = laser.trace();
        assert!(!beam.hits_target);
        assert_eq!(beam.cells.len(), 8);
        assert_eq!(beam.cells.iter().filter(|&&c| c == (0, 0)).count(), 1);
    }

    #[test]
    fn test_toggle() {
        let mut laser = board(&[((0, 4), Mirror::Slash)]);
        assert_eq!(laser.apply(LaserMove::Toggle((1, 1))), Err(Rejection::NoMirror));
        assert_eq!(laser.apply(LaserMove::Toggle((5, 0))), Err(Rejection::OutOfBounds));
        laser.apply(LaserMove::Toggle((0, 4))).unwrap();
        assert!(laser.is_solved());
        assert_eq!(laser.apply(LaserMove::Toggle((0, 4))), Err(Rejection::AlreadySolved));
    }

    #[test]
    fn test_default_board_starts_unsolved() {
        for seed in 0..16 {
            let config = PuzzleConfig {
                seed: Some(seed),
                ..Default::default()
            };
            let laser = LaserRedirect::init(&config, &mut config.rng()).unwrap();
            assert!(!laser.is_solved(), "Seed {seed} generated a solved board");
            let mirrors = laser.mirrors().cells().iter().flatten().count();
            assert_eq!(mirrors, DEFAULT_MIRRORS.len());
        }
    }

    #[test]
    fn test_mirror_off_board_is_rejected() {
        let config = PuzzleConfig {
            mirrors: Some(vec![(0, 9)]),
            ..Default::default()
        };
        assert!(LaserRedirect::init(&config, &mut config.rng()).is_err());
    }
}
