//! Tile matching: find every pair of hidden symbols within a move budget.
//!
//! The board opens with every tile face up for a short peek. After that at
//! most two tiles are revealed at once; a mismatched pair stays visible for a
//! moment and is then hidden again.

use std::fmt;
use std::time::Duration;

use log::debug;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::{checked, PuzzleConfig};
use crate::error::{ConfigError, ConfigResult, Rejection};
use crate::variant::{Progress, Variant};

/// Tiles per row.
pub const COLUMNS: usize = 4;
pub const DEFAULT_PAIRS: usize = 8;
pub const DEFAULT_BUDGET: u32 = 12;

pub const PEEK_TIME: Duration = Duration::from_millis(2500);
pub const MISMATCH_TIME: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Face {
    Hidden,
    Revealed,
    Matched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tile {
    pub symbol: u8,
    pub face: Face,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TilePhase {
    /// Opening preview; every symbol is visible and input is refused.
    Peek,
    Open,
    /// Two different symbols are showing and will be hidden.
    Mismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TileMove {
    /// Turn over the tile at this index.
    Reveal(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileMatching {
    tiles: Vec<Tile>,
    phase: TilePhase,
    /// First tile of the pair being revealed.
    first: Option<usize>,
    moves_left: u32,
}

impl TileMatching {
    /// Builds a board from symbols in board order. Each symbol must occur twice.
    pub fn new(symbols: Vec<u8>, budget: u32) -> ConfigResult<Self> {
        if symbols.is_empty() {
            return Err(ConfigError::invalid("pairs", "board is empty"));
        }
        let mut sorted = symbols.clone();
        sorted.sort_unstable();
        let paired = sorted.chunks(2).all(|pair| pair.len() == 2 && pair[0] == pair[1]);
        let distinct = sorted.chunks(2).zip(sorted.chunks(2).skip(1)).all(|(a, b)| a[0] != b[0]);
        if !paired || !distinct {
            return Err(ConfigError::invalid("pairs", "every symbol must appear exactly twice"));
        }
        Ok(Self {
            tiles: symbols
                .into_iter()
                .map(|symbol| Tile {
                    symbol,
                    face: Face::Hidden,
                })
                .collect(),
            phase: TilePhase::Peek,
            first: None,
            moves_left: budget,
        })
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn phase(&self) -> TilePhase {
        self.phase
    }

    pub fn moves_left(&self) -> u32 {
        self.moves_left
    }

    pub fn pairs(&self) -> usize {
        self.tiles.len() / 2
    }

    pub fn matched_pairs(&self) -> usize {
        self.tiles.iter().filter(|t| t.face == Face::Matched).count() / 2
    }

    /// Whether the symbol of tile `idx` is visible to the player.
    pub fn is_visible(&self, idx: usize) -> bool {
        self.phase == TilePhase::Peek || self.tiles.get(idx).is_some_and(|t| t.face != Face::Hidden)
    }

    fn hide_revealed(&mut self) {
        for tile in &mut self.tiles {
            if tile.face == Face::Revealed {
                tile.face = Face::Hidden;
            }
        }
    }
}

impl Variant for TileMatching {
    type Move = TileMove;

    fn init(config: &PuzzleConfig, rng: &mut ChaCha8Rng) -> ConfigResult<Self> {
        let pairs = checked("pairs", config.pairs, DEFAULT_PAIRS, 1..=32)?;
        let budget = checked("move_budget", config.move_budget, DEFAULT_BUDGET, 1..=999)?;
        let mut symbols: Vec<u8> = (0..pairs as u8).flat_map(|s| [s, s]).collect();
        symbols.shuffle(rng);
        Self::new(symbols, budget)
    }

    fn apply(&mut self, mv: TileMove) -> Result<(), Rejection> {
        if self.is_solved() {
            return Err(Rejection::AlreadySolved);
        }
        if self.is_busy() {
            return Err(Rejection::OutOfTurn);
        }
        if self.moves_left == 0 {
            return Err(Rejection::OutOfMoves);
        }
        let TileMove::Reveal(idx) = mv;
        let tile = self.tiles.get(idx).ok_or(Rejection::OutOfBounds)?;
        if tile.face != Face::Hidden {
            return Err(Rejection::AlreadyRevealed);
        }
        let symbol = tile.symbol;
        self.tiles[idx].face = Face::Revealed;

        let Some(first) = self.first.take() else {
            self.first = Some(idx);
            return Ok(());
        };
        self.moves_left -= 1;
        if self.tiles[first].symbol == symbol {
            self.tiles[first].face = Face::Matched;
            self.tiles[idx].face = Face::Matched;
        } else {
            debug!("tiles: mismatch {} / {}, {} moves left", first, idx, self.moves_left);
            self.phase = TilePhase::Mismatch;
        }
        Ok(())
    }

    fn is_solved(&self) -> bool {
        self.tiles.iter().all(|t| t.face == Face::Matched)
    }

    fn is_failed(&self) -> bool {
        self.moves_left == 0 && !self.is_solved()
    }

    fn progress(&self) -> Progress {
        Progress::Tiles {
            matched: self.matched_pairs(),
            pairs: self.pairs(),
            moves_left: self.moves_left,
        }
    }

    fn is_busy(&self) -> bool {
        self.phase != TilePhase::Open
    }

    fn pending(&self) -> Option<Duration> {
        match self.phase {
            TilePhase::Peek => Some(PEEK_TIME),
            TilePhase::Mismatch => Some(MISMATCH_TIME),
            TilePhase::Open => None,
        }
    }

    fn advance(&mut self) -> bool {
        match self.phase {
            TilePhase::Open => return false,
            TilePhase::Mismatch => self.hide_revealed(),
            TilePhase::Peek => {}
        }
        self.phase = TilePhase::Open;
        true
    }
}

impl fmt::Display for TileMatching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, tile) in self.tiles.iter().enumerate() {
            if self.is_visible(idx) {
                write!(f, "{}", (b'A' + tile.symbol % 26) as char)?;
            } else {
                write!(f, "?")?;
            }
            if idx % COLUMNS == COLUMNS - 1 {
                writeln!(f)?;
            }
        }
        if self.tiles.len() % COLUMNS != 0 {
            writeln!(f)?;
        }
        writeln!(
            f,
            "{}/{} pairs, {} moves left",
            self.matched_pairs(),
            self.pairs(),
            self.moves_left
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A B / A B on a single row of four, past the peek.
    fn open_board(budget: u32) -> TileMatching {
        let mut board = TileMatching::new(vec![0, 1, 0, 1], budget).unwrap();
        assert!(board.advance(), "Peek should end on advance");
        board
    }

    #[test]
    fn test_peek_refuses_input() {
        let mut board = TileMatching::new(vec![0, 1, 0, 1], 4).unwrap();
        assert_eq!(board.pending(), Some(PEEK_TIME));
        assert!((0..4).all(|i| board.is_visible(i)));
        assert_eq!(board.apply(TileMove::Reveal(0)), Err(Rejection::OutOfTurn));
        board.advance();
        assert!(!board.is_busy());
        assert!(!board.is_visible(0));
    }

    #[test]
    fn test_match_and_mismatch() {
        let mut board = open_board(4);
        board.apply(TileMove::Reveal(0)).unwrap();
        assert_eq!(board.apply(TileMove::Reveal(0)), Err(Rejection::AlreadyRevealed));
        board.apply(TileMove::Reveal(1)).unwrap();
        assert_eq!(board.phase(), TilePhase::Mismatch);
        assert_eq!(board.moves_left(), 3);
        assert_eq!(board.pending(), Some(MISMATCH_TIME));
        assert_eq!(board.apply(TileMove::Reveal(2)), Err(Rejection::OutOfTurn));

        board.advance();
        assert!(!board.is_visible(0) && !board.is_visible(1), "Mismatch re-hides both");

        board.apply(TileMove::Reveal(0)).unwrap();
        board.apply(TileMove::Reveal(2)).unwrap();
        assert_eq!(board.matched_pairs(), 1);
        assert_eq!(board.phase(), TilePhase::Open);
        assert_eq!(board.apply(TileMove::Reveal(2)), Err(Rejection::AlreadyRevealed));

        board.apply(TileMove::Reveal(1)).unwrap();
        board.apply(TileMove::Reveal(3)).unwrap();
        assert!(board.is_solved());
        assert!(!board.is_failed());
        assert_eq!(board.moves_left(), 1);
    }

    #[test]
    fn test_budget_runs_out() {
        let mut board = open_board(1);
        board.apply(TileMove::Reveal(0)).unwrap();
        board.apply(TileMove::Reveal(1)).unwrap();
        assert!(board.is_failed(), "Spent budget with pairs left fails the board");
        board.advance();
        assert_eq!(board.apply(TileMove::Reveal(0)), Err(Rejection::OutOfMoves));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut board = open_board(3);
        assert_eq!(board.apply(TileMove::Reveal(4)), Err(Rejection::OutOfBounds));
    }

    #[test]
    fn test_layout_validation() {
        assert!(TileMatching::new(vec![0, 0, 1], 3).is_err());
        assert!(TileMatching::new(vec![0, 0, 0, 0], 3).is_err());
        assert!(TileMatching::new(vec![2, 1, 1, 2], 3).is_ok());
    }

    #[test]
    fn test_default_board() {
        let config = PuzzleConfig {
            seed: Some(9),
            ..Default::default()
        };
        let board = TileMatching::init(&config, &mut config.rng()).unwrap();
        assert_eq!(board.tiles().len(), 16);
        assert_eq!(board.pairs(), DEFAULT_PAIRS);
        assert_eq!(board.moves_left(), DEFAULT_BUDGET);
        assert_eq!(board.phase(), TilePhase::Peek);
    }
}
