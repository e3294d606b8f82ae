//! Flow link: connect each pair of same-colored nodes with a path.
//!
//! Paths are drawn one drag at a time. A path may not cross a path of
//! another color or run over a foreign node. Dragging back over the current
//! path cuts it at that cell.

use std::fmt;

use log::debug;
use rand_chacha::ChaCha8Rng;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::config::PuzzleConfig;
use crate::error::{ConfigError, ConfigResult, Rejection};
use crate::grid::{is_adjacent, Grid, Pos};
use crate::search::connected_region;
use crate::variant::{Progress, Variant};

pub const DEFAULT_LAYOUT: [&str; 5] = ["1...1", "2...2", "3...3", "4...4", "....."];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlowMove {
    /// Begin a drag on a node. Any existing path of that color is discarded.
    Start(Pos),
    /// Drag into a neighboring cell.
    Extend(Pos),
    /// Release the drag.
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowLink {
    /// Color index of the node on each cell.
    nodes: Grid<Option<usize>>,
    /// Display label per color.
    labels: Vec<char>,
    /// Drawn path per color, starting at the node the drag began on.
    paths: Vec<Vec<Pos>>,
    drawing: Option<usize>,
}

impl FlowLink {
    /// Parses a square layout. `.` is an empty cell; any other character is
    /// a node, and each must occur exactly twice.
    pub fn from_layout<S: AsRef<str>>(rows: &[S]) -> ConfigResult<Self> {
        let mut labels: Vec<char> = Vec::new();
        let mut counts: FxHashMap<char, usize> = FxHashMap::default();
        let mut cells: Vec<Vec<Option<usize>>> = Vec::with_capacity(rows.len());
        for row in rows {
            let mut line = Vec::new();
            for c in row.as_ref().chars() {
                if c == '.' {
                    line.push(None);
                    continue;
                }
                *counts.entry(c).or_default() += 1;
                let color = match labels.iter().position(|&l| l == c) {
                    Some(color) => color,
                    None => {
                        labels.push(c);
                        labels.len() - 1
                    }
                };
                line.push(Some(color));
            }
            cells.push(line);
        }

        let nodes = Grid::from_rows(cells)
            .ok_or_else(|| ConfigError::invalid("layout", "layout must be a non-empty square"))?;
        if labels.is_empty() {
            return Err(ConfigError::invalid("layout", "layout has no nodes"));
        }
        if let Some((label, n)) = counts.iter().find(|&(_, &n)| n != 2) {
            return Err(ConfigError::invalid(
                "layout",
                format!("node {} appears {} times, expected 2", label, n),
            ));
        }

        Ok(Self {
            nodes,
            paths: vec![Vec::new(); labels.len()],
            labels,
            drawing: None,
        })
    }

    pub fn nodes(&self) -> &Grid<Option<usize>> {
        &self.nodes
    }

    pub fn paths(&self) -> &[Vec<Pos>] {
        &self.paths
    }

    pub fn drawing(&self) -> Option<usize> {
        self.drawing
    }

    pub fn colors(&self) -> usize {
        self.labels.len()
    }

    fn path_owner(&self, pos: Pos) -> Option<usize> {
        self.paths.iter().position(|path| path.contains(&pos))
    }

    /// Whether the path of `color` joins both of its nodes.
    pub fn is_connected(&self, color: usize) -> bool {
        let path = &self.paths[color];
        let (Some(&first), Some(&last)) = (path.first(), path.last()) else {
            return false;
        };
        if path.len() < 2
            || self.nodes.get(first) != Some(&Some(color))
            || self.nodes.get(last) != Some(&Some(color))
        {
            return false;
        }
        let cells: FxHashSet<Pos> = path.iter().copied().collect();
        connected_region(
            first,
            self.nodes.size(),
            |_, _, to| cells.contains(&to),
            |pos| pos == last,
        )
        .reached_goal
    }

    fn start(&mut self, pos: Pos) -> Result<(), Rejection> {
        let node = self.nodes.get(pos).ok_or(Rejection::OutOfBounds)?;
        let color = node.ok_or(Rejection::NotANode)?;
        self.paths[color] = vec![pos];
        self.drawing = Some(color);
        Ok(())
    }

    fn extend(&mut self, pos: Pos) -> Result<(), Rejection> {
        let color = self.drawing.ok_or(Rejection::OutOfTurn)?;
        let node = *self.nodes.get(pos).ok_or(Rejection::OutOfBounds)?;
        let head = self.paths[color].last().copied().ok_or(Rejection::OutOfTurn)?;
        if !is_adjacent(head, pos) {
            return Err(Rejection::NotAdjacent);
        }
        if node.is_some_and(|other| other != color) {
            return Err(Rejection::WrongNode);
        }

        match self.path_owner(pos) {
            Some(owner) if owner == color => {
                if let Some(i) = self.paths[color].iter().position(|&p| p == pos) {
                    self.paths[color].truncate(i + 1);
                }
            }
            Some(_) => return Err(Rejection::Occupied),
            None => {
                self.paths[color].push(pos);
                if node == Some(color) {
                    debug!("flow: color {} connected", self.labels[color]);
                    self.drawing = None;
                }
            }
        }
        Ok(())
    }
}

impl Variant for FlowLink {
    type Move = FlowMove;

    fn init(config: &PuzzleConfig, _rng: &mut ChaCha8Rng) -> ConfigResult<Self> {
        match &config.layout {
            Some(layout) => Self::from_layout(layout.as_slice()),
            None => Self::from_layout(&DEFAULT_LAYOUT),
        }
    }

    fn apply(&mut self, mv: FlowMove) -> Result<(), Rejection> {
        if self.is_solved() {
            return Err(Rejection::AlreadySolved);
        }
        match mv {
            FlowMove::Start(pos) => self.start(pos),
            FlowMove::Extend(pos) => self.extend(pos),
            FlowMove::End => {
                self.drawing.take().ok_or(Rejection::OutOfTurn)?;
                Ok(())
            }
        }
    }

    fn is_solved(&self) -> bool {
        (0..self.colors()).all(|color| self.is_connected(color))
    }

    fn progress(&self) -> Progress {
        Progress::Flow {
            connected: (0..self.colors()).filter(|&c| self.is_connected(c)).count(),
            colors: self.colors(),
        }
    }
}

impl fmt::Display for FlowLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pos, node) in self.nodes.iter() {
            let c = match (node, self.path_owner(pos)) {
                (Some(color), _) => self.labels[*color],
                (None, Some(_)) => '+',
                (None, None) => '.',
            };
            write!(f, "{}", c)?;
            if pos.1 as usize == self.nodes.size() - 1 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn default_board() -> FlowLink {
        FlowLink::from_layout(&DEFAULT_LAYOUT).unwrap()
    }

    fn draw(board: &mut FlowLink, cells: &[Pos]) {
        board.apply(FlowMove::Start(cells[0])).unwrap();
        for &pos in &cells[1..] {
            board.apply(FlowMove::Extend(pos)).unwrap();
        }
    }

    fn row(r: i32) -> Vec<Pos> {
        (0..5).map(|c| (r, c)).collect()
    }

    #[test]
    fn test_four_rows_solve() {
        let mut board = default_board();
        for r in 0..4 {
            assert!(!board.is_solved(), "Row {r} still missing");
            draw(&mut board, &row(r));
            assert!(board.is_connected(r as usize));
            assert_eq!(board.drawing(), None, "Reaching the partner node ends the drag");
        }
        assert!(board.is_solved());
        assert_eq!(board.apply(FlowMove::Start((0, 0))), Err(Rejection::AlreadySolved));
    }

    #[test]
    fn test_crossing_other_path_is_rejected() {
        let mut board = default_board();
        draw(&mut board, &[(0, 0), (0, 1), (1, 1)]);
        board.apply(FlowMove::End).unwrap();
        board.apply(FlowMove::Start((1, 0))).unwrap();
        assert_eq!(board.apply(FlowMove::Extend((1, 1))), Err(Rejection::Occupied));
        assert_eq!(board.paths()[1], vec![(1, 0)]);
    }

    #[test]
    fn test_wrong_node_and_adjacency() {
        let mut board = default_board();
        board.apply(FlowMove::Start((0, 0))).unwrap();
        assert_eq!(board.apply(FlowMove::Extend((1, 0))), Err(Rejection::WrongNode));
        assert_eq!(board.apply(FlowMove::Extend((0, 2))), Err(Rejection::NotAdjacent));
        assert_eq!(board.apply(FlowMove::Start((4, 4))), Err(Rejection::NotANode));
        assert_eq!(board.apply(FlowMove::Extend((0, 5))), Err(Rejection::OutOfBounds));
    }

    #[test]
    fn test_backtracking_truncates() {
        let mut board = default_board();
        draw(&mut board, &[(0, 0), (0, 1), (1, 1), (2, 1)]);
        board.apply(FlowMove::Extend((1, 1))).unwrap();
        assert_eq!(board.paths()[0], vec![(0, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn test_restart_discards_path() {
        let mut board = default_board();
        draw(&mut board, &row(0));
        board.apply(FlowMove::Start((0, 4))).unwrap();
        assert_eq!(board.paths()[0], vec![(0, 4)]);
        assert!(!board.is_connected(0));
    }

    #[test]
    fn test_extend_without_drag() {
        let mut board = default_board();
        assert_eq!(board.apply(FlowMove::Extend((0, 1))), Err(Rejection::OutOfTurn));
        assert_eq!(board.apply(FlowMove::End), Err(Rejection::OutOfTurn));
    }

    #[test]
    fn test_layout_validation() {
        assert!(FlowLink::from_layout(&["1.", ".."]).is_err());
        assert!(FlowLink::from_layout(&["11", "1."]).is_err());
        assert!(FlowLink::from_layout(&["1.1", "..."]).is_err());
        assert!(FlowLink::from_layout(&["..", ".."]).is_err());
        assert!(FlowLink::from_layout(&["1.", ".1"]).is_ok());
    }

    #[test]
    fn test_display() {
        let mut board = default_board();
        draw(&mut board, &[(0, 0), (0, 1), (0, 2)]);
        assert_snapshot!(board.to_string(), @r"
        1++.1
        2...2
        3...3
        4...4
        .....
        ");
    }
}
