//! Progression Gate Puzzle Library
//!
//! State engine for the small logic puzzles that gate progress in a game.
//! Each puzzle type is a pure state machine behind the [`variant::Variant`]
//! trait; [`PuzzleSession`] runs one of them for a host, validates moves,
//! serves hints and reports success exactly once.

pub mod config;
pub mod error;
pub mod grid;
pub mod search;
pub mod session;
pub mod variant;
pub mod variants;

pub use config::PuzzleConfig;
pub use error::{ConfigError, ConfigResult, Rejection};
pub use session::{Hint, PuzzleSession};
pub use variant::{reduce, HintResult, Progress, SolveResult, Variant};
pub use variants::{Move, Puzzle, PuzzleKind};
