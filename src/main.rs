//! Progression Gate Puzzles
//!
//! Text host for the puzzle engine: starts a session for any puzzle type and
//! plays it from JSON moves on stdin, or prints the optimal solution of the
//! searchable puzzles.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use log::info;
use strum::IntoEnumIterator;

use gates::search::SearchOutcome;
use gates::{ConfigResult, Move, Puzzle, PuzzleConfig, PuzzleKind, PuzzleSession};

/// Plays the progression gate puzzles in a terminal.
#[derive(Parser)]
#[command(name = "gates")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List the puzzle type tags.
    List,
    /// Play a puzzle, reading one move per line from stdin.
    Play {
        /// Puzzle type tag, e.g. `tower-of-hanoi`.
        tag: String,
        /// JSON configuration file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Seed for every random choice, overriding the configuration.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the shortest solution of a maze or tower of hanoi.
    Solve {
        tag: String,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Some(Command::List) | None => {
            run_list();
            Ok(())
        }
        Some(Command::Play { tag, config, seed }) => {
            load_config(config, seed).and_then(|config| run_play(&tag, config))
        }
        Some(Command::Solve { tag, config, seed }) => {
            load_config(config, seed).and_then(|config| run_solve(&tag, config))
        }
    };

    if let Err(e) = outcome {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<PathBuf>, seed: Option<u64>) -> ConfigResult<PuzzleConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(&path).map_err(|e| {
                gates::ConfigError::Parse(format!("{}: {}", path.display(), e))
            })?;
            PuzzleConfig::from_json(&text)?
        }
        None => PuzzleConfig::default(),
    };
    if seed.is_some() {
        config.seed = seed;
    }
    Ok(config)
}

/// Prints every puzzle tag, marking the ones with hints.
fn run_list() {
    for kind in PuzzleKind::iter() {
        let hints = if kind.has_hints() { " (hints)" } else { "" };
        println!("{}{}", kind, hints);
    }
}

/// Runs a session over stdin.
///
/// Each line is a variant move in JSON, e.g. `{"rotate": [0, 1]}`, or one of
/// the commands `advance`, `hint`, `reset` and `show`.
fn run_play(tag: &str, config: PuzzleConfig) -> ConfigResult<()> {
    let mut session = PuzzleSession::from_tag(tag, config)?
        .with_on_solved(|| println!("Gate open!"));
    let kind = session.kind();
    println!("{}", session.state());

    for line in io::stdin().lock().lines() {
        let Ok(line) = line else {
            break;
        };
        let line = line.trim();
        match line {
            "" => continue,
            "advance" => print_json(&session.advance()),
            "hint" => match session.request_hint() {
                Some(hint) => print_json(&hint.result),
                None => println!("No hints for {}", kind),
            },
            "reset" => session.reset()?,
            "show" => {}
            _ => match Move::from_json(kind, line) {
                Ok(mv) => print_json(&session.apply_move(mv)),
                Err(e) => {
                    eprintln!("Unreadable move: {}", e);
                    continue;
                }
            },
        }
        println!("{}", session.state());
    }

    info!("Session ended, solved: {}", session.is_solved());
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode result: {}", e),
    }
}

fn run_solve(tag: &str, config: PuzzleConfig) -> ConfigResult<()> {
    let session = PuzzleSession::from_tag(tag, config)?;
    match format_solution(session.state()) {
        Some(text) => print!("{}", text),
        None => eprintln!("{} has no solver", session.kind()),
    }
    Ok(())
}

/// Renders the puzzle followed by its shortest move list.
fn format_solution(puzzle: &Puzzle) -> Option<String> {
    let moves: SearchOutcome<String> = match puzzle {
        Puzzle::TowerOfHanoi(hanoi) => map_outcome(hanoi.solution()),
        Puzzle::PathFinder(maze) => map_outcome(maze.solution()),
        _ => return None,
    };

    let mut output = format!("{}\n", puzzle);
    match moves {
        SearchOutcome::AlreadyAtGoal => output.push_str("Already solved\n"),
        SearchOutcome::Found(moves) => {
            output.push_str(&format!("{} moves:\n", moves.len()));
            for (i, mv) in moves.iter().enumerate() {
                output.push_str(&format!("{:>3}. {}\n", i + 1, mv));
            }
        }
        SearchOutcome::Unreachable => output.push_str("No solution\n"),
        SearchOutcome::Exhausted => output.push_str("Search limit reached\n"),
    }
    Some(output)
}

fn map_outcome<M: serde::Serialize>(outcome: SearchOutcome<M>) -> SearchOutcome<String> {
    let encode = |mv: &M| serde_json::to_string(mv).unwrap_or_default();
    match outcome {
        SearchOutcome::AlreadyAtGoal => SearchOutcome::AlreadyAtGoal,
        SearchOutcome::Found(moves) => SearchOutcome::Found(moves.iter().map(encode).collect()),
        SearchOutcome::Unreachable => SearchOutcome::Unreachable,
        SearchOutcome::Exhausted => SearchOutcome::Exhausted,
    }
}
