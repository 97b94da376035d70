//! Cascade Benchmarks
//!
//! Benchmarks for the hot paths of a spin: detection, gravity, full spins.

use std::sync::Arc;

use av_engine::{
    AvalancheSystem, ClusterDetector, GameConfig, Grid, SpinParams, SpinRng, WeightTable,
};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

fn random_grids(count: usize, seed: u64) -> Vec<Grid> {
    let weights = WeightTable::base_game();
    let mut rng = SpinRng::new(seed);
    (0..count)
        .map(|_| {
            let mut grid = Grid::new();
            grid.fill_all(&weights, &mut rng).unwrap();
            grid
        })
        .collect()
}

/// Benchmark cluster detection on random base game grids
fn bench_cluster_detection(c: &mut Criterion) {
    let grids = random_grids(256, 42);
    let mut detector = ClusterDetector::default();

    let mut group = c.benchmark_group("cluster_detection");
    group.throughput(Throughput::Elements(grids.len() as u64));
    group.bench_function("random_grids", |b| {
        b.iter(|| {
            for grid in &grids {
                black_box(detector.find_clusters(grid));
            }
        })
    });

    let full = Grid::from_rows([[av_engine::Symbol::PinkSkull; 5]; 5]);
    group.bench_function("full_grid", |b| {
        b.iter(|| black_box(detector.find_clusters(&full)))
    });
    group.finish();
}

/// Benchmark gravity on grids with holes punched in them
fn bench_gravity(c: &mut Criterion) {
    let mut grids = random_grids(256, 7);
    for (i, grid) in grids.iter_mut().enumerate() {
        for pos in av_engine::Position::all().filter(|p| (p.index() + i) % 3 == 0) {
            grid.put(pos, av_engine::Symbol::Empty);
        }
    }

    c.bench_function("apply_gravity", |b| {
        b.iter(|| {
            for grid in &grids {
                let mut g = grid.clone();
                black_box(g.apply_gravity());
            }
        })
    });
}

/// Benchmark complete spins in both modes
fn bench_full_spin(c: &mut Criterion) {
    let config = Arc::new(GameConfig::standard());
    let mut group = c.benchmark_group("full_spin");

    for (name, params) in [
        ("base", SpinParams::base(1.0)),
        ("free_spins", SpinParams::free_spins(1.0)),
        ("forced_ew", SpinParams::base(1.0).with_forced_explosive_wild()),
    ] {
        let mut system = AvalancheSystem::new(config.clone()).unwrap();
        let mut rng = SpinRng::new(1234);
        group.bench_with_input(BenchmarkId::new("spin", name), &params, |b, &params| {
            b.iter(|| black_box(system.play(params, &mut rng).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_cluster_detection,
    bench_gravity,
    bench_full_spin
);
criterion_main!(benches);
