use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use petrel_core::nnue::network::{Network, HIDDEN, INPUTS};
use petrel_core::position::{generate_moves, make_move, parse_fen, Position};
use petrel_core::search::{search_root, SearchLimits, SearchState};

fn test_network() -> Network {
    Network {
        input_weights: Box::new([[0i16; HIDDEN]; INPUTS]),
        input_bias: [0i16; HIDDEN],
        output_weights: [0i16; HIDDEN * 2],
        output_bias: 0,
    }
}

fn perft(pos: &Position, net: &Network, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    generate_moves(pos, net)
        .into_iter()
        .map(|mv| perft(&make_move(pos, net, mv), net, depth - 1))
        .sum()
}

fn bench_perft(c: &mut Criterion) {
    let net = test_network();
    let mut group = c.benchmark_group("perft");

    let startpos = parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", &net).unwrap();
    for depth in 1..=4 {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            b.iter(|| perft(&startpos, &net, black_box(depth)))
        });
    }

    let kiwipete = parse_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1", &net).unwrap();
    for depth in 1..=3 {
        group.bench_with_input(BenchmarkId::new("kiwipete", depth), &depth, |b, &depth| {
            b.iter(|| perft(&kiwipete, &net, black_box(depth)))
        });
    }

    group.finish();
}

fn bench_movegen(c: &mut Criterion) {
    let net = test_network();
    let mut group = c.benchmark_group("movegen");

    let startpos = parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", &net).unwrap();
    group.bench_function("startpos", |b| b.iter(|| black_box(generate_moves(&startpos, &net))));

    let middlegame = parse_fen("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4", &net).unwrap();
    group.bench_function("middlegame", |b| b.iter(|| black_box(generate_moves(&middlegame, &net))));

    let kiwipete = parse_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1", &net).unwrap();
    group.bench_function("kiwipete", |b| b.iter(|| black_box(generate_moves(&kiwipete, &net))));

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let net = test_network();
    let mut group = c.benchmark_group("search");
    group.sample_size(10);

    let startpos = parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", &net).unwrap();
    for depth in [3, 4, 5] {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            b.iter(|| {
                let mut state = SearchState::new(16);
                let stop = Arc::new(AtomicBool::new(false));
                let limits = SearchLimits { max_depth: depth, ..SearchLimits::default() };
                search_root(&startpos, &net, &mut state, limits, stop, |_| {})
            })
        });
    }

    let tactical = parse_fen("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4", &net).unwrap();
    for depth in [3, 4] {
        group.bench_with_input(BenchmarkId::new("tactical", depth), &depth, |b, &depth| {
            b.iter(|| {
                let mut state = SearchState::new(16);
                let stop = Arc::new(AtomicBool::new(false));
                let limits = SearchLimits { max_depth: depth, ..SearchLimits::default() };
                search_root(&tactical, &net, &mut state, limits, stop, |_| {})
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_perft, bench_movegen, bench_search);
criterion_main!(benches);
