//! Grid primitives shared by every board-based puzzle.
//!
//! Positions are `(row, col)` pairs of signed integers so that neighbor
//! arithmetic can step off the board and be rejected by [`in_bounds`]
//! instead of wrapping. Boards are square and stored as a flat row-major
//! vector.

use serde::{Deserialize, Serialize};

/// A board position as `(row, col)`.
pub type Pos = (i32, i32);

/// One of the four orthogonal directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Right,
    Left,
    Up,
    Down,
}

impl Direction {
    /// All directions in generation order.
    ///
    /// Searches expand neighbors in exactly this order, so it also decides
    /// which of several equally short paths is reported.
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Left,
        Direction::Up,
        Direction::Down,
    ];

    /// Row and column delta for a single step.
    #[inline]
    pub const fn delta(self) -> Pos {
        match self {
            Direction::Right => (0, 1),
            Direction::Left => (0, -1),
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
        }
    }

    #[inline]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Right => Direction::Left,
            Direction::Left => Direction::Right,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// The direction after a 90 degree clockwise turn.
    #[inline]
    pub const fn rotate_cw(self) -> Direction {
        match self {
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
            Direction::Up => Direction::Right,
        }
    }

    /// Moves `pos` one cell in this direction. The result may be off the board.
    #[inline]
    pub const fn step(self, pos: Pos) -> Pos {
        let (dr, dc) = self.delta();
        (pos.0 + dr, pos.1 + dc)
    }

    /// Returns the direction leading from `from` to the 4-adjacent `to`.
    pub fn between(from: Pos, to: Pos) -> Option<Direction> {
        Direction::ALL.into_iter().find(|dir| dir.step(from) == to)
    }
}

/// Whether `pos` lies on a `size` x `size` board.
#[inline]
pub const fn in_bounds(pos: Pos, size: usize) -> bool {
    pos.0 >= 0 && pos.1 >= 0 && (pos.0 as usize) < size && (pos.1 as usize) < size
}

/// The four orthogonal neighbors of `pos`, in [`Direction::ALL`] order.
///
/// Neighbors are not bounds-checked.
#[inline]
pub fn neighbors4(pos: Pos) -> [(Direction, Pos); 4] {
    Direction::ALL.map(|dir| (dir, dir.step(pos)))
}

/// Whether two positions are orthogonally adjacent (Manhattan distance 1).
#[inline]
pub const fn is_adjacent(a: Pos, b: Pos) -> bool {
    (a.0 - b.0).abs() + (a.1 - b.1).abs() == 1
}

/// Converts a position to a row-major index. Caller guarantees bounds.
#[inline(always)]
pub const fn pos_to_idx(pos: Pos, size: usize) -> usize {
    (pos.0 as usize) * size + (pos.1 as usize)
}

/// Converts a row-major index back to a position.
#[inline(always)]
pub const fn idx_to_pos(idx: usize, size: usize) -> Pos {
    ((idx / size) as i32, (idx % size) as i32)
}

/// A square board stored as a flat row-major vector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid<T> {
    size: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Creates a `size` x `size` board with every cell set to `fill`.
    pub fn filled(size: usize, fill: T) -> Self {
        Self {
            size,
            cells: vec![fill; size * size],
        }
    }
}

impl<T> Grid<T> {
    /// Builds a board by calling `f` for each position in row-major order.
    pub fn from_fn(size: usize, mut f: impl FnMut(Pos) -> T) -> Self {
        let cells = (0..size * size).map(|idx| f(idx_to_pos(idx, size))).collect();
        Self { size, cells }
    }

    /// Builds a board from nested rows. Returns `None` unless every row has
    /// exactly as many cells as there are rows.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|row| row.len() != size) {
            return None;
        }
        Some(Self {
            size,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        in_bounds(pos, self.size)
    }

    #[inline]
    pub fn get(&self, pos: Pos) -> Option<&T> {
        if self.contains(pos) {
            self.cells.get(pos_to_idx(pos, self.size))
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, pos: Pos) -> Option<&mut T> {
        if self.contains(pos) {
            self.cells.get_mut(pos_to_idx(pos, self.size))
        } else {
            None
        }
    }

    /// Overwrites the cell at `pos`. Returns `false` if `pos` is off the board.
    pub fn set(&mut self, pos: Pos, value: T) -> bool {
        match self.get_mut(pos) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    /// Swaps two cells. Returns `false` if either is off the board.
    pub fn swap(&mut self, a: Pos, b: Pos) -> bool {
        if !self.contains(a) || !self.contains(b) {
            return false;
        }
        self.cells
            .swap(pos_to_idx(a, self.size), pos_to_idx(b, self.size));
        true
    }

    /// Iterates rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        // chunks(0) panics; an empty board simply has no rows
        self.cells.chunks(self.size.max(1))
    }

    /// Iterates every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        let size = self.size;
        (0..size * size).map(move |idx| idx_to_pos(idx, size))
    }

    /// Iterates `(pos, cell)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Pos, &T)> {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, cell)| (idx_to_pos(idx, size), cell))
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }
}
