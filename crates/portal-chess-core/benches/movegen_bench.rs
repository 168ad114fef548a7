use criterion::{black_box, criterion_group, criterion_main, Criterion};

use portal_chess_core::{all_legal_moves, game_result, legal_moves_from, Position, Square};

fn bench_all_legal_moves(c: &mut Criterion) {
    let position = Position::new();
    c.bench_function("all_legal_moves_initial", |b| {
        b.iter(|| all_legal_moves(black_box(&position)))
    });
}

fn bench_legal_moves_from_portal(c: &mut Criterion) {
    let position = Position::new();
    let next = position
        .apply(&legal_moves_from(&position, Square::parse("E2").unwrap())[0])
        .unwrap();
    c.bench_function("legal_moves_after_one_ply", |b| {
        b.iter(|| all_legal_moves(black_box(&next)))
    });
}

fn bench_game_result(c: &mut Criterion) {
    let position = Position::new();
    c.bench_function("game_result_initial", |b| {
        b.iter(|| game_result(black_box(&position)))
    });
}

criterion_group!(
    benches,
    bench_all_legal_moves,
    bench_legal_moves_from_portal,
    bench_game_result
);
criterion_main!(benches);
