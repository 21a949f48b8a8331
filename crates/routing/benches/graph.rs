//! Benchmarks for road graph construction and A* search.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use grvlfinder_geo::Coordinate;
use grvlfinder_routing::{EdgeWeighting, RoadGraph, SmartRouter};
use grvlfinder_scoring::{Road, Tags};

/// Square street grid of `size` x `size` vertices, ~70 m apart.
fn grid(size: usize) -> Vec<Road> {
    let coord = |row: usize, col: usize| {
        Coordinate::new(50.80 + row as f64 * 0.0006, 4.60 + col as f64 * 0.001)
    };
    let mut roads = Vec::with_capacity(size * 2);
    for i in 0..size {
        let mut east_west = Road::new((0..size).map(|j| coord(i, j)).collect(), Tags::new());
        east_west.score = (i % 7) as i32 * 10;
        let mut north_south = Road::new((0..size).map(|j| coord(j, i)).collect(), Tags::new());
        north_south.score = (i % 5) as i32 * 10;
        roads.push(east_west);
        roads.push(north_south);
    }
    roads
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_build");
    for size in [10, 30, 60].iter() {
        let roads = grid(*size);
        group.bench_with_input(BenchmarkId::new("score_weighted", size), size, |b, _| {
            b.iter(|| RoadGraph::build(black_box(&roads), EdgeWeighting::ScoreWeighted))
        });
    }
    group.finish();
}

fn bench_astar(c: &mut Criterion) {
    let mut group = c.benchmark_group("astar");
    for size in [10, 30, 60].iter() {
        let roads = grid(*size);
        let graph = RoadGraph::build(&roads, EdgeWeighting::ScoreWeighted);
        let from = graph.nearest_node(&roads[0].points[0], 10.0).unwrap();
        let last = *roads[roads.len() - 2].points.last().unwrap();
        let to = graph.nearest_node(&last, 10.0).unwrap();

        group.bench_with_input(BenchmarkId::new("corner_to_corner", size), size, |b, _| {
            b.iter(|| graph.astar(black_box(from), black_box(to), 10_000))
        });
    }
    group.finish();
}

fn bench_smart_route(c: &mut Criterion) {
    let roads = grid(30);
    let start = roads[0].points[0];
    let end = *roads[roads.len() - 2].points.last().unwrap();
    let router = SmartRouter::new();

    c.bench_function("smart_route_30x30", |b| {
        b.iter(|| router.route(black_box(&start), black_box(&end), black_box(&roads)))
    });
}

criterion_group!(benches, bench_build, bench_astar, bench_smart_route);
criterion_main!(benches);
