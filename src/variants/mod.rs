//! The twelve puzzle types and the tagged unions that carry them.
//!
//! [`Puzzle`] holds the state of whichever variant a session runs and
//! [`Move`] holds a move for one of them. A move only applies to the variant
//! it was built for; anything else is rejected as `wrong-puzzle`.

pub mod blast;
pub mod circuit;
pub mod encryption;
pub mod flow;
pub mod hanoi;
pub mod jigsaw;
pub mod laser;
pub mod lock;
pub mod match3;
pub mod maze;
pub mod pattern;
pub mod tiles;

use std::fmt;
use std::time::Duration;

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::config::PuzzleConfig;
use crate::error::{ConfigResult, Rejection};
use crate::variant::{Hint, HintResult, Progress, SolveResult, Variant};

use blast::{BlastMove, BlockBlast};
use circuit::{CircuitMove, CircuitPath};
use encryption::{EncryptionMove, FinalEncryption};
use flow::{FlowLink, FlowMove};
use hanoi::{HanoiMove, TowerOfHanoi};
use jigsaw::{JigsawMove, JigsawReconstitution};
use laser::{LaserMove, LaserRedirect};
use lock::{LockMove, MechanicalLock};
use match3::{Match3, Match3Move};
use maze::{MazeMove, PathFinder};
use pattern::{PatternMemory, PatternMove};
use tiles::{TileMatching, TileMove};

/// Puzzle type tags as used by the host.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PuzzleKind {
    CircuitPath,
    PatternMemory,
    TileMatching,
    PathFinder,
    MechanicalLock,
    LaserRedirect,
    BlockBlast,
    FinalEncryption,
    JigsawReconstitution,
    FlowLink,
    TowerOfHanoi,
    #[serde(rename = "match-3")]
    #[strum(serialize = "match-3")]
    Match3,
}

impl PuzzleKind {
    /// Whether this puzzle type can compute hints.
    pub fn has_hints(self) -> bool {
        matches!(self, PuzzleKind::PathFinder | PuzzleKind::TowerOfHanoi)
    }
}

/// State of one running puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "state", rename_all = "kebab-case")]
pub enum Puzzle {
    CircuitPath(CircuitPath),
    PatternMemory(PatternMemory),
    TileMatching(TileMatching),
    PathFinder(PathFinder),
    MechanicalLock(MechanicalLock),
    LaserRedirect(LaserRedirect),
    BlockBlast(BlockBlast),
    FinalEncryption(FinalEncryption),
    JigsawReconstitution(JigsawReconstitution),
    FlowLink(FlowLink),
    TowerOfHanoi(TowerOfHanoi),
    #[serde(rename = "match-3")]
    Match3(Match3),
}

/// A move for one puzzle type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Move {
    CircuitPath(CircuitMove),
    PatternMemory(PatternMove),
    TileMatching(TileMove),
    PathFinder(MazeMove),
    MechanicalLock(LockMove),
    LaserRedirect(LaserMove),
    BlockBlast(BlastMove),
    FinalEncryption(EncryptionMove),
    JigsawReconstitution(JigsawMove),
    FlowLink(FlowMove),
    TowerOfHanoi(HanoiMove),
    #[serde(rename = "match-3")]
    Match3(Match3Move),
}

/// Forwards a method call to whichever variant `$puzzle` holds.
macro_rules! dispatch {
    ($puzzle:expr, $state:ident => $body:expr) => {
        match $puzzle {
            Puzzle::CircuitPath($state) => $body,
            Puzzle::PatternMemory($state) => $body,
            Puzzle::TileMatching($state) => $body,
            Puzzle::PathFinder($state) => $body,
            Puzzle::MechanicalLock($state) => $body,
            Puzzle::LaserRedirect($state) => $body,
            Puzzle::BlockBlast($state) => $body,
            Puzzle::FinalEncryption($state) => $body,
            Puzzle::JigsawReconstitution($state) => $body,
            Puzzle::FlowLink($state) => $body,
            Puzzle::TowerOfHanoi($state) => $body,
            Puzzle::Match3($state) => $body,
        }
    };
}

impl Puzzle {
    /// Builds the initial state for `kind`.
    pub fn init(kind: PuzzleKind, config: &PuzzleConfig, rng: &mut ChaCha8Rng) -> ConfigResult<Self> {
        Ok(match kind {
            PuzzleKind::CircuitPath => Puzzle::CircuitPath(CircuitPath::init(config, rng)?),
            PuzzleKind::PatternMemory => Puzzle::PatternMemory(PatternMemory::init(config, rng)?),
            PuzzleKind::TileMatching => Puzzle::TileMatching(TileMatching::init(config, rng)?),
            PuzzleKind::PathFinder => Puzzle::PathFinder(PathFinder::init(config, rng)?),
            PuzzleKind::MechanicalLock => Puzzle::MechanicalLock(MechanicalLock::init(config, rng)?),
            PuzzleKind::LaserRedirect => Puzzle::LaserRedirect(LaserRedirect::init(config, rng)?),
            PuzzleKind::BlockBlast => Puzzle::BlockBlast(BlockBlast::init(config, rng)?),
            PuzzleKind::FinalEncryption => {
                Puzzle::FinalEncryption(FinalEncryption::init(config, rng)?)
            }
            PuzzleKind::JigsawReconstitution => {
                Puzzle::JigsawReconstitution(JigsawReconstitution::init(config, rng)?)
            }
            PuzzleKind::FlowLink => Puzzle::FlowLink(FlowLink::init(config, rng)?),
            PuzzleKind::TowerOfHanoi => Puzzle::TowerOfHanoi(TowerOfHanoi::init(config, rng)?),
            PuzzleKind::Match3 => Puzzle::Match3(Match3::init(config, rng)?),
        })
    }

    pub fn kind(&self) -> PuzzleKind {
        match self {
            Puzzle::CircuitPath(_) => PuzzleKind::CircuitPath,
            Puzzle::PatternMemory(_) => PuzzleKind::PatternMemory,
            Puzzle::TileMatching(_) => PuzzleKind::TileMatching,
            Puzzle::PathFinder(_) => PuzzleKind::PathFinder,
            Puzzle::MechanicalLock(_) => PuzzleKind::MechanicalLock,
            Puzzle::LaserRedirect(_) => PuzzleKind::LaserRedirect,
            Puzzle::BlockBlast(_) => PuzzleKind::BlockBlast,
            Puzzle::FinalEncryption(_) => PuzzleKind::FinalEncryption,
            Puzzle::JigsawReconstitution(_) => PuzzleKind::JigsawReconstitution,
            Puzzle::FlowLink(_) => PuzzleKind::FlowLink,
            Puzzle::TowerOfHanoi(_) => PuzzleKind::TowerOfHanoi,
            Puzzle::Match3(_) => PuzzleKind::Match3,
        }
    }

    /// Applies `mv` if it belongs to this puzzle type.
    pub fn apply(&mut self, mv: Move) -> Result<(), Rejection> {
        match (self, mv) {
            (Puzzle::CircuitPath(p), Move::CircuitPath(m)) => p.apply(m),
            (Puzzle::PatternMemory(p), Move::PatternMemory(m)) => p.apply(m),
            (Puzzle::TileMatching(p), Move::TileMatching(m)) => p.apply(m),
            (Puzzle::PathFinder(p), Move::PathFinder(m)) => p.apply(m),
            (Puzzle::MechanicalLock(p), Move::MechanicalLock(m)) => p.apply(m),
            (Puzzle::LaserRedirect(p), Move::LaserRedirect(m)) => p.apply(m),
            (Puzzle::BlockBlast(p), Move::BlockBlast(m)) => p.apply(m),
            (Puzzle::FinalEncryption(p), Move::FinalEncryption(m)) => p.apply(m),
            (Puzzle::JigsawReconstitution(p), Move::JigsawReconstitution(m)) => p.apply(m),
            (Puzzle::FlowLink(p), Move::FlowLink(m)) => p.apply(m),
            (Puzzle::TowerOfHanoi(p), Move::TowerOfHanoi(m)) => p.apply(m),
            (Puzzle::Match3(p), Move::Match3(m)) => p.apply(m),
            _ => Err(Rejection::WrongPuzzle),
        }
    }

    pub fn is_solved(&self) -> bool {
        dispatch!(self, p => p.is_solved())
    }

    pub fn is_failed(&self) -> bool {
        dispatch!(self, p => p.is_failed())
    }

    pub fn is_busy(&self) -> bool {
        dispatch!(self, p => p.is_busy())
    }

    pub fn pending(&self) -> Option<Duration> {
        dispatch!(self, p => p.pending())
    }

    pub fn advance(&mut self) -> bool {
        dispatch!(self, p => p.advance())
    }

    pub fn progress(&self) -> Progress {
        dispatch!(self, p => p.progress())
    }

    pub fn result(&self, rejection: Option<Rejection>) -> SolveResult {
        dispatch!(self, p => p.result(rejection))
    }

    /// Next move of a shortest solution, for puzzle types that support hints.
    pub fn hint(&self) -> Option<HintResult<Move>> {
        match self {
            Puzzle::PathFinder(p) => Some(map_hint(p.hint(), Move::PathFinder)),
            Puzzle::TowerOfHanoi(p) => Some(map_hint(p.hint(), Move::TowerOfHanoi)),
            _ => None,
        }
    }
}

fn map_hint<M>(result: HintResult<M>, wrap: impl FnOnce(M) -> Move) -> HintResult<Move> {
    match result {
        HintResult::Move(mv) => HintResult::Move(wrap(mv)),
        HintResult::AlreadySolved => HintResult::AlreadySolved,
        HintResult::NoSolution => HintResult::NoSolution,
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(self, p => fmt::Display::fmt(p, f))
    }
}

impl Move {
    pub fn kind(&self) -> PuzzleKind {
        match self {
            Move::CircuitPath(_) => PuzzleKind::CircuitPath,
            Move::PatternMemory(_) => PuzzleKind::PatternMemory,
            Move::TileMatching(_) => PuzzleKind::TileMatching,
            Move::PathFinder(_) => PuzzleKind::PathFinder,
            Move::MechanicalLock(_) => PuzzleKind::MechanicalLock,
            Move::LaserRedirect(_) => PuzzleKind::LaserRedirect,
            Move::BlockBlast(_) => PuzzleKind::BlockBlast,
            Move::FinalEncryption(_) => PuzzleKind::FinalEncryption,
            Move::JigsawReconstitution(_) => PuzzleKind::JigsawReconstitution,
            Move::FlowLink(_) => PuzzleKind::FlowLink,
            Move::TowerOfHanoi(_) => PuzzleKind::TowerOfHanoi,
            Move::Match3(_) => PuzzleKind::Match3,
        }
    }

    /// Parses the JSON of a variant move, e.g. `{"rotate": [0, 1]}` for a
    /// circuit, into a move for `kind`.
    pub fn from_json(kind: PuzzleKind, text: &str) -> serde_json::Result<Self> {
        Ok(match kind {
            PuzzleKind::CircuitPath => Move::CircuitPath(serde_json::from_str(text)?),
            PuzzleKind::PatternMemory => Move::PatternMemory(serde_json::from_str(text)?),
            PuzzleKind::TileMatching => Move::TileMatching(serde_json::from_str(text)?),
            PuzzleKind::PathFinder => Move::PathFinder(serde_json::from_str(text)?),
            PuzzleKind::MechanicalLock => Move::MechanicalLock(serde_json::from_str(text)?),
            PuzzleKind::LaserRedirect => Move::LaserRedirect(serde_json::from_str(text)?),
            PuzzleKind::BlockBlast => Move::BlockBlast(serde_json::from_str(text)?),
            PuzzleKind::FinalEncryption => Move::FinalEncryption(serde_json::from_str(text)?),
            PuzzleKind::JigsawReconstitution => {
                Move::JigsawReconstitution(serde_json::from_str(text)?)
            }
            PuzzleKind::FlowLink => Move::FlowLink(serde_json::from_str(text)?),
            PuzzleKind::TowerOfHanoi => Move::TowerOfHanoi(serde_json::from_str(text)?),
            PuzzleKind::Match3 => Move::Match3(serde_json::from_str(text)?),
        })
    }
}
