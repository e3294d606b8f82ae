//! Benchmarks for the puzzle searches.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gates::grid::Grid;
use gates::search::connected_region;
use gates::variant::Hint;
use gates::variants::hanoi::TowerOfHanoi;
use gates::variants::match3::{find_matches, Match3};
use gates::variants::maze::PathFinder;
use gates::{PuzzleConfig, Variant};

/// Benchmark the full BFS solve of a seven-disk tower.
fn bench_hanoi_solution(c: &mut Criterion) {
    let hanoi = TowerOfHanoi::new(7);

    c.bench_function("hanoi_solution_7", |b| {
        b.iter(|| black_box(&hanoi).solution())
    });
}

/// Benchmark a hint on the largest generated maze.
fn bench_maze_hint(c: &mut Criterion) {
    let config = PuzzleConfig {
        grid_size: Some(31),
        seed: Some(1),
        ..Default::default()
    };
    let Ok(maze) = PathFinder::init(&config, &mut config.rng()) else {
        return;
    };

    c.bench_function("maze_hint_31", |b| b.iter(|| black_box(&maze).hint()));
}

/// Benchmark flooding an open board.
fn bench_connected_region(c: &mut Criterion) {
    c.bench_function("connected_region_12", |b| {
        b.iter(|| {
            connected_region(
                black_box((0, 0)),
                12,
                |_, _, _| true,
                |pos| pos == (11, 11),
            )
        })
    });
}

/// Benchmark scanning a generated match-3 board.
fn bench_find_matches(c: &mut Criterion) {
    let config = PuzzleConfig {
        grid_size: Some(12),
        seed: Some(1),
        ..Default::default()
    };
    let Ok(game) = Match3::init(&config, &mut config.rng()) else {
        return;
    };
    let board: &Grid<Option<u8>> = game.board();

    c.bench_function("find_matches_12", |b| {
        b.iter(|| find_matches(black_box(board)))
    });
}

criterion_group!(
    benches,
    bench_hanoi_solution,
    bench_maze_hint,
    bench_connected_region,
    bench_find_matches
);
criterion_main!(benches);
