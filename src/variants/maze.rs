//! Path finder: walk a maze from `S` to `E` one orthogonal step at a time.
//!
//! The traced path never repeats a cell. Stepping back onto the previous cell
//! pops the head; stepping onto any earlier cell cuts the path back to it.

use std::fmt;

use rand::seq::IndexedRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::{checked, PuzzleConfig};
use crate::error::{ConfigError, ConfigResult, Rejection};
use crate::grid::{is_adjacent, Direction, Grid, Pos};
use crate::search::{shortest_solution_path, SearchOutcome, MAX_EXPANSIONS};
use crate::variant::{Hint, HintResult, Progress, Variant};

pub const DEFAULT_SIZE: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Open,
    Wall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MazeMove {
    /// Click a cell next to the head of the path.
    Step(Pos),
    /// Return to the start with an empty path.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathFinder {
    grid: Grid<Cell>,
    start: Pos,
    end: Pos,
    /// Cells walked so far; the first is always `start`.
    path: Vec<Pos>,
}

impl PathFinder {
    /// Parses a layout: `#` or `1` wall, `.` or `0` open, `S` start, `E` end.
    pub fn from_layout<S: AsRef<str>>(rows: &[S]) -> ConfigResult<Self> {
        let mut start = None;
        let mut end = None;
        let mut cells = Vec::with_capacity(rows.len());

        for (r, row) in rows.iter().enumerate() {
            let mut parsed = Vec::new();
            for (c, ch) in row.as_ref().chars().enumerate() {
                let pos = (r as i32, c as i32);
                let cell = match ch {
                    '#' | '1' => Cell::Wall,
                    '.' | '0' => Cell::Open,
                    'S' if start.is_none() => {
                        start = Some(pos);
                        Cell::Open
                    }
                    'E' if end.is_none() => {
                        end = Some(pos);
                        Cell::Open
                    }
                    other => {
                        return Err(ConfigError::invalid(
                            "layout",
                            format!("unexpected {other:?} at row {r}, column {c}"),
                        ))
                    }
                };
                parsed.push(cell);
            }
            cells.push(parsed);
        }

        if cells.is_empty() {
            return Err(ConfigError::invalid("layout", "layout has no rows"));
        }
        let grid = Grid::from_rows(cells)
            .ok_or_else(|| ConfigError::invalid("layout", "layout must be square"))?;
        let start = start.ok_or_else(|| ConfigError::invalid("layout", "missing start cell S"))?;
        let end = end.ok_or_else(|| ConfigError::invalid("layout", "missing end cell E"))?;
        Ok(Self::new(grid, start, end))
    }

    fn new(grid: Grid<Cell>, start: Pos, end: Pos) -> Self {
        Self {
            grid,
            start,
            end,
            path: vec![start],
        }
    }

    /// Generates a perfect maze on an odd-sized board.
    ///
    /// Rooms sit on even coordinates and are carved with an iterative
    /// randomized depth-first walk, so every room is reachable. The start is
    /// the top-left corner and the end the bottom-right.
    pub fn generate(size: usize, rng: &mut ChaCha8Rng) -> Self {
        let mut grid = Grid::filled(size, Cell::Wall);
        let origin = (0, 0);
        grid.set(origin, Cell::Open);
        let mut stack = vec![origin];

        while let Some(&current) = stack.last() {
            let candidates: Vec<(Pos, Pos)> = Direction::ALL
                .into_iter()
                .filter_map(|dir| {
                    let between = dir.step(current);
                    let room = dir.step(between);
                    (grid.get(room) == Some(&Cell::Wall)).then_some((between, room))
                })
                .collect();

            match candidates.choose(rng) {
                Some(&(between, room)) => {
                    grid.set(between, Cell::Open);
                    grid.set(room, Cell::Open);
                    stack.push(room);
                }
                // dead end: backtrack
                None => {
                    stack.pop();
                }
            }
        }

        let last = size as i32 - 1;
        Self::new(grid, origin, (last, last))
    }

    pub fn grid(&self) -> &Grid<Cell> {
        &self.grid
    }

    pub fn path(&self) -> &[Pos] {
        &self.path
    }

    pub fn start(&self) -> Pos {
        self.start
    }

    pub fn end(&self) -> Pos {
        self.end
    }

    /// Head of the path.
    pub fn current(&self) -> Pos {
        self.path.last().copied().unwrap_or(self.start)
    }

    /// Steps taken, i.e. path length minus the start cell.
    pub fn moves(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    fn is_open(&self, pos: Pos) -> bool {
        self.grid.get(pos) == Some(&Cell::Open)
    }

    /// Shortest route from the head of the path to the end.
    pub fn solution(&self) -> SearchOutcome<MazeMove> {
        let end = self.end;
        shortest_solution_path(
            self.current(),
            |&pos| {
                Direction::ALL
                    .into_iter()
                    .map(|dir| dir.step(pos))
                    .filter(|&next| self.is_open(next))
                    .map(|next| (MazeMove::Step(next), next))
                    .collect()
            },
            |&pos| pos == end,
            |&pos| pos,
            MAX_EXPANSIONS,
        )
    }

    fn step(&mut self, pos: Pos) -> Result<(), Rejection> {
        if !self.grid.contains(pos) {
            return Err(Rejection::OutOfBounds);
        }
        if !is_adjacent(self.current(), pos) {
            return Err(Rejection::NotAdjacent);
        }
        if !self.is_open(pos) {
            return Err(Rejection::Blocked);
        }

        match self.path.iter().position(|&p| p == pos) {
            // previous cell pops the head, older cells cut the loop out
            Some(index) => self.path.truncate(index + 1),
            None => self.path.push(pos),
        }
        Ok(())
    }
}

impl Variant for PathFinder {
    type Move = MazeMove;

    fn init(config: &PuzzleConfig, rng: &mut ChaCha8Rng) -> ConfigResult<Self> {
        if let Some(layout) = &config.layout {
            return Self::from_layout(layout.as_slice());
        }
        let size = checked("grid_size", config.grid_size, DEFAULT_SIZE, 3..=31)?;
        if size % 2 == 0 {
            return Err(ConfigError::invalid(
                "grid_size",
                "generated mazes need an odd size",
            ));
        }
        Ok(Self::generate(size, rng))
    }

    fn apply(&mut self, mv: MazeMove) -> Result<(), Rejection> {
        if self.is_solved() {
            return Err(Rejection::AlreadySolved);
        }
        match mv {
            MazeMove::Step(pos) => self.step(pos),
            MazeMove::Reset => {
                self.path = vec![self.start];
                Ok(())
            }
        }
    }

    fn is_solved(&self) -> bool {
        self.current() == self.end
    }

    fn progress(&self) -> Progress {
        Progress::Maze {
            moves: self.moves(),
        }
    }
}

impl Hint for PathFinder {
    fn hint(&self) -> HintResult<MazeMove> {
        match self.solution() {
            SearchOutcome::AlreadyAtGoal => HintResult::AlreadySolved,
            outcome => outcome
                .first_move()
                .map_or(HintResult::NoSolution, HintResult::Move),
        }
    }
}

impl fmt::Display for PathFinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = self.current();
        for (pos, cell) in self.grid.iter() {
            let c = if pos == head {
                '@'
            } else if pos == self.start {
                'S'
            } else if pos == self.end {
                'E'
            } else if self.path.contains(&pos) {
                '*'
            } else if *cell == Cell::Wall {
                '#'
            } else {
                '.'
            };
            write!(f, "{}", c)?;
            if pos.1 as usize == self.grid.size() - 1 {
                writeln!(f)?;
            }
        }
        writeln!(f, "moves {}", self.moves())
    }
}
