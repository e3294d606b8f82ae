//! Breadth-first searches used by the puzzles.
//!
//! Two flavors:
//! - [`connected_region`] floods a square board from a start cell, following a
//!   caller-supplied traversal predicate.
//! - [`shortest_solution_path`] runs BFS over an arbitrary puzzle-state graph
//!   and reports the shortest move sequence reaching a goal state.
//!
//! Both use `FxHashSet` for the visited set. State search deduplicates by a
//! caller-provided canonical key and stops after a fixed number of expansions
//! so that pathological inputs degrade to "no solution" instead of hanging.

use std::collections::VecDeque;
use std::hash::Hash;

use log::{debug, warn};
use rustc_hash::FxHashSet;

use crate::grid::{in_bounds, neighbors4, Direction, Pos};

/// Default cap on dequeued states for [`shortest_solution_path`].
pub const MAX_EXPANSIONS: usize = 5000;

/// Cells reached by a flood fill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    /// Every cell reached from the start, the start included.
    pub visited: FxHashSet<Pos>,
    /// Whether any visited cell satisfied the goal predicate.
    pub reached_goal: bool,
}

impl Region {
    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        self.visited.contains(&pos)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.visited.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}

/// Flood-fills a `size` x `size` board from `start`.
///
/// `can_traverse(from, dir, to)` is asked for every in-bounds neighbor and
/// decides whether the fill may cross from `from` to `to`. Each cell is
/// expanded at most once, so work is bounded by the board area.
///
/// An out-of-bounds start yields an empty region.
pub fn connected_region(
    start: Pos,
    size: usize,
    mut can_traverse: impl FnMut(Pos, Direction, Pos) -> bool,
    mut is_goal: impl FnMut(Pos) -> bool,
) -> Region {
    let mut region = Region::default();
    if !in_bounds(start, size) {
        return region;
    }

    let mut queue = VecDeque::from([start]);
    region.visited.insert(start);

    while let Some(current) = queue.pop_front() {
        if is_goal(current) {
            region.reached_goal = true;
        }

        for (dir, next) in neighbors4(current) {
            if !in_bounds(next, size) || region.visited.contains(&next) {
                continue;
            }
            if can_traverse(current, dir, next) {
                region.visited.insert(next);
                queue.push_back(next);
            }
        }
    }

    region
}

/// Result of a state-graph search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome<M> {
    /// The initial state already satisfies the goal.
    AlreadyAtGoal,
    /// Shortest move sequence from the initial state to a goal state.
    Found(Vec<M>),
    /// The reachable state space was exhausted without meeting a goal.
    Unreachable,
    /// The expansion cap was hit before a goal was found.
    Exhausted,
}

impl<M> SearchOutcome<M> {
    /// First move of the shortest path, if one was found.
    pub fn first_move(self) -> Option<M> {
        match self {
            SearchOutcome::Found(moves) => moves.into_iter().next(),
            _ => None,
        }
    }

    /// Number of moves in the found path.
    pub fn path_len(&self) -> Option<usize> {
        match self {
            SearchOutcome::AlreadyAtGoal => Some(0),
            SearchOutcome::Found(moves) => Some(moves.len()),
            _ => None,
        }
    }
}

/// A discovered state with a back-pointer for path reconstruction.
struct Node<S, M> {
    state: S,
    /// Index of the parent node and the move that led here.
    parent: Option<(usize, M)>,
}

/// Breadth-first search over a puzzle-state graph.
///
/// - `expand(state)` lists `(move, next_state)` pairs in generation order.
///   BFS keeps that order, so ties between equally short paths go to the
///   earliest generated move.
/// - `is_goal(state)` is checked as states are dequeued.
/// - `key(state)` must be a canonical, collision-free identity of the state;
///   two states with equal keys are treated as the same vertex.
/// - at most `max_expansions` states are dequeued.
pub fn shortest_solution_path<S, M, K>(
    initial: S,
    mut expand: impl FnMut(&S) -> Vec<(M, S)>,
    mut is_goal: impl FnMut(&S) -> bool,
    mut key: impl FnMut(&S) -> K,
    max_expansions: usize,
) -> SearchOutcome<M>
where
    M: Clone,
    K: Hash + Eq,
{
    if is_goal(&initial) {
        return SearchOutcome::AlreadyAtGoal;
    }

    let mut seen: FxHashSet<K> = FxHashSet::default();
    seen.insert(key(&initial));

    // nodes are never removed, so queue entries can refer to them by index
    let mut nodes: Vec<Node<S, M>> = vec![Node {
        state: initial,
        parent: None,
    }];
    let mut queue = VecDeque::from([0usize]);
    let mut expansions = 0usize;

    while let Some(current) = queue.pop_front() {
        if expansions >= max_expansions {
            warn!("state search hit the expansion cap of {max_expansions}");
            return SearchOutcome::Exhausted;
        }
        expansions += 1;

        if is_goal(&nodes[current].state) {
            debug!(
                "state search reached a goal after {expansions} expansions, {} states seen",
                seen.len()
            );
            return SearchOutcome::Found(reconstruct(&nodes, current));
        }

        for (mv, next) in expand(&nodes[current].state) {
            if seen.insert(key(&next)) {
                nodes.push(Node {
                    state: next,
                    parent: Some((current, mv)),
                });
                queue.push_back(nodes.len() - 1);
            }
        }
    }

    debug!("state search exhausted the reachable graph after {expansions} expansions");
    SearchOutcome::Unreachable
}

/// Walks parent pointers from `end` back to the root and returns the moves in
/// forward order.
fn reconstruct<S, M: Clone>(nodes: &[Node<S, M>], end: usize) -> Vec<M> {
    let mut moves = Vec::new();
    let mut cursor = end;
    while let Some((parent, mv)) = &nodes[cursor].parent {
        moves.push(mv.clone());
        cursor = *parent;
    }
    moves.reverse();
    moves
}
