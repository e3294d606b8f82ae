//! Configuration errors and move rejection codes.

use serde::Serialize;
use strum_macros::{Display, IntoStaticStr};

/// Result type for session and variant construction.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that prevent a puzzle from starting.
///
/// These are the only fatal errors in the engine; everything that goes wrong
/// while playing is reported as a [`Rejection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The type tag does not name any known puzzle.
    UnsupportedPuzzleType(String),
    /// A configuration value violates an invariant.
    Invalid {
        field: &'static str,
        reason: String,
    },
    /// The configuration document could not be parsed.
    Parse(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedPuzzleType(tag) => write!(f, "Unsupported puzzle type: {}", tag),
            Self::Invalid { field, reason } => {
                write!(f, "Invalid configuration for {}: {}", field, reason)
            }
            Self::Parse(e) => write!(f, "Configuration parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Why a move was ignored.
///
/// A rejected move never changes puzzle state, except that a match-3 swap
/// making no line is shown before it is swapped back. The kebab-case rendering
/// (`not-adjacent`, `out-of-turn`, ...) is the reason code shown to players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Rejection {
    /// Target cell is not orthogonally adjacent to the current one.
    NotAdjacent,
    /// Target is a wall, or the move would break a placement rule.
    Blocked,
    /// The puzzle is replaying or animating and cannot take input.
    OutOfTurn,
    /// The puzzle is already solved.
    AlreadySolved,
    /// Coordinates or index outside the board.
    OutOfBounds,
    /// Tile or element is already revealed or unlocked.
    AlreadyRevealed,
    /// A placement was attempted with nothing selected.
    NoSelection,
    /// Guess has the wrong symbols.
    InvalidGuess,
    /// Path ran into a node of another color.
    WrongNode,
    /// Cell belongs to another color's path.
    Occupied,
    /// A path must start on a node.
    NotANode,
    /// Only mirror cells can be toggled.
    NoMirror,
    /// Source rod has no disk.
    EmptyRod,
    /// No history to undo.
    NothingToUndo,
    /// A tile cannot be swapped with itself.
    SameTile,
    /// The move budget is spent.
    OutOfMoves,
    /// The move belongs to a different puzzle type.
    WrongPuzzle,
    /// A swap made no line and is being swapped back.
    NoMatch,
}
