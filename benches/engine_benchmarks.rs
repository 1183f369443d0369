//! Criterion benchmarks: perft throughput and fixed-depth search.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use castellan::board::Board;
use castellan::engine::TimeControl;
use castellan::search::{Pool, SearchLimits};

fn bench_perft(c: &mut Criterion) {
    c.bench_function("perft_startpos_4", |b| {
        let mut board = Board::new();
        b.iter(|| black_box(board.perft(4)));
    });

    c.bench_function("perft_kiwipete_3", |b| {
        let mut board: Board =
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
                .parse()
                .unwrap();
        b.iter(|| black_box(board.perft(3)));
    });
}

fn bench_movegen(c: &mut Criterion) {
    c.bench_function("generate_legal_kiwipete", |b| {
        let mut board: Board =
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
                .parse()
                .unwrap();
        b.iter(|| black_box(board.generate_legal().len()));
    });
}

fn bench_search(c: &mut Criterion) {
    c.bench_function("search_startpos_depth_6", |b| {
        let board = Board::new();
        b.iter(|| {
            let mut pool = Pool::new(1, 16);
            let limits = SearchLimits {
                time: TimeControl::Infinite,
                depth: Some(6),
                ..SearchLimits::default()
            };
            black_box(pool.go(&board, limits, 1, None).best_move)
        });
    });
}

criterion_group!(benches, bench_perft, bench_movegen, bench_search);
criterion_main!(benches);
