//! Jigsaw reconstitution: swap scrambled image tiles back into place.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::{checked, PuzzleConfig};
use crate::error::{ConfigError, ConfigResult, Rejection};
use crate::grid::{idx_to_pos, pos_to_idx, Grid, Pos};
use crate::variant::{Progress, Variant};

pub const DEFAULT_COMPLEXITY: usize = 3;
pub const DEFAULT_SUBJECT: &str = "animal";

const MAX_RESHUFFLES: usize = 32;

/// Image selection handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    pub subject: String,
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JigsawMove {
    Swap(Pos, Pos),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JigsawReconstitution {
    /// Home index of the tile sitting at each position.
    tiles: Grid<usize>,
    asset: Asset,
}

impl JigsawReconstitution {
    pub fn new(tiles: Grid<usize>, asset: Asset) -> ConfigResult<Self> {
        if tiles.size() == 0 {
            return Err(ConfigError::invalid("complexity", "board has no tiles"));
        }
        let mut sorted = tiles.cells().to_vec();
        sorted.sort_unstable();
        if !sorted.iter().copied().eq(0..tiles.cells().len()) {
            return Err(ConfigError::invalid("complexity", "tiles are not a permutation"));
        }
        Ok(Self { tiles, asset })
    }

    pub fn tiles(&self) -> &Grid<usize> {
        &self.tiles
    }

    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    /// Number of tiles sitting at their home position.
    pub fn in_place(&self) -> usize {
        let size = self.tiles.size();
        self.tiles
            .iter()
            .filter(|&(pos, &home)| pos_to_idx(pos, size) == home)
            .count()
    }

    /// Where tile `home` belongs.
    pub fn home_of(&self, home: usize) -> Pos {
        idx_to_pos(home, self.tiles.size())
    }
}

impl Variant for JigsawReconstitution {
    type Move = JigsawMove;

    fn init(config: &PuzzleConfig, rng: &mut ChaCha8Rng) -> ConfigResult<Self> {
        let size = checked("complexity", config.complexity, DEFAULT_COMPLEXITY, 2..=10)?;
        let asset = Asset {
            subject: config
                .subject
                .clone()
                .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            seed: config.seed.unwrap_or_else(|| rng.random()),
        };

        let mut order: Vec<usize> = (0..size * size).collect();
        for _ in 0..MAX_RESHUFFLES {
            order.shuffle(rng);
            if order.iter().enumerate().any(|(i, &home)| i != home) {
                break;
            }
        }
        let tiles = Grid::from_fn(size, |pos| order[pos_to_idx(pos, size)]);
        Self::new(tiles, asset)
    }

    fn apply(&mut self, mv: JigsawMove) -> Result<(), Rejection> {
        if self.is_solved() {
            return Err(Rejection::AlreadySolved);
        }
        let JigsawMove::Swap(a, b) = mv;
        if !self.tiles.contains(a) || !self.tiles.contains(b) {
            return Err(Rejection::OutOfBounds);
        }
        if a == b {
            return Err(Rejection::SameTile);
        }
        self.tiles.swap(a, b);
        Ok(())
    }

    fn is_solved(&self) -> bool {
        self.in_place() == self.tiles.cells().len()
    }

    fn progress(&self) -> Progress {
        Progress::Jigsaw {
            in_place: self.in_place(),
            total: self.tiles.cells().len(),
        }
    }
}

impl fmt::Display for JigsawReconstitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = (self.tiles.cells().len() - 1).to_string().len();
        for row in self.tiles.rows() {
            let line: Vec<String> = row.iter().map(|home| format!("{:>width$}", home)).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        writeln!(f, "{} (seed {})", self.asset.subject, self.asset.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn puzzle(rows: Vec<Vec<usize>>) -> JigsawReconstitution {
        let asset = Asset {
            subject: "fox".to_string(),
            seed: 1,
        };
        JigsawReconstitution::new(Grid::from_rows(rows).unwrap(), asset).unwrap()
    }

    #[test]
    fn test_swaps_restore_image() {
        let mut puzzle = puzzle(vec![vec![1, 0], vec![3, 2]]);
        assert_eq!(puzzle.in_place(), 0);
        puzzle.apply(JigsawMove::Swap((0, 0), (0, 1))).unwrap();
        assert_eq!(puzzle.in_place(), 2);
        assert!(!puzzle.is_solved());
        puzzle.apply(JigsawMove::Swap((1, 1), (1, 0))).unwrap();
        assert!(puzzle.is_solved());
        assert_eq!(
            puzzle.apply(JigsawMove::Swap((0, 0), (1, 1))),
            Err(Rejection::AlreadySolved)
        );
    }

    #[test]
    fn test_invalid_swaps() {
        let mut puzzle = puzzle(vec![vec![1, 0], vec![2, 3]]);
        assert_eq!(puzzle.apply(JigsawMove::Swap((0, 0), (0, 0))), Err(Rejection::SameTile));
        assert_eq!(puzzle.apply(JigsawMove::Swap((0, 0), (2, 0))), Err(Rejection::OutOfBounds));
        assert_eq!(puzzle.in_place(), 2);
    }

    #[test]
    fn test_rejects_non_permutation() {
        let asset = Asset {
            subject: "fox".to_string(),
            seed: 1,
        };
        let tiles = Grid::from_rows(vec![vec![0, 0], vec![1, 2]]).unwrap();
        assert!(JigsawReconstitution::new(tiles, asset.clone()).is_err());

        let empty = Grid::from_rows(Vec::new()).unwrap();
        let err = JigsawReconstitution::new(empty, asset).err();
        assert!(matches!(err, Some(ConfigError::Invalid { field: "complexity", .. })));
    }

    #[test]
    fn test_seeded_init_is_scrambled_and_reproducible() {
        let config = PuzzleConfig {
            seed: Some(21),
            complexity: Some(4),
            ..Default::default()
        };
        let a = JigsawReconstitution::init(&config, &mut config.rng()).unwrap();
        let b = JigsawReconstitution::init(&config, &mut config.rng()).unwrap();
        assert_eq!(a, b);
        assert!(!a.is_solved());
        assert_eq!(a.asset().subject, DEFAULT_SUBJECT);
        assert_eq!(a.asset().seed, 21);
    }

    #[test]
    fn test_display() {
        let puzzle = puzzle(vec![vec![3, 1], vec![2, 0]]);
        assert_snapshot!(puzzle.to_string(), @r"
        3 1
        2 0
        fox (seed 1)
        ");
    }
}
