//! Benchmarks for road scoring.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use grvlfinder_geo::Coordinate;
use grvlfinder_scoring::{BikeType, ScoreCalculator, ScoreFilter, Road, Tags, WeatherCondition, Weights};

const SURFACES: [&str; 6] = ["gravel", "asphalt", "dirt", "compacted", "concrete", "ground"];

fn create_roads(count: usize) -> Vec<Road> {
    (0..count)
        .map(|i| {
            let mut tags = Tags::new();
            tags.insert("surface".into(), SURFACES[i % SURFACES.len()].into());
            tags.insert("width".into(), format!("{} m", i % 5));
            if i % 3 == 0 {
                tags.insert("incline".into(), format!("{}%", i % 25));
            }
            let lat = 50.80 + (i as f64 * 0.0007) % 0.2;
            let lon = 4.60 + (i as f64 * 0.0011) % 0.2;
            let points = (0..8)
                .map(|k| Coordinate::new(lat + k as f64 * 0.0004, lon))
                .collect();
            Road::new(points, tags)
        })
        .collect()
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_roads");
    let weather = WeatherCondition::from_daily_precipitation(&[Some(8.0), Some(6.0), None, Some(1.0)]);

    for size in [100, 1_000, 10_000].iter() {
        let roads = create_roads(*size);
        let calculator = ScoreCalculator::new(Weights::for_bike_type(BikeType::GravelBikepacking))
            .with_weather(weather.clone());

        group.bench_with_input(BenchmarkId::new("score", size), size, |b, _| {
            b.iter(|| {
                roads
                    .iter()
                    .map(|r| calculator.score(black_box(&r.tags), black_box(&r.points)))
                    .sum::<i32>()
            })
        });
        group.bench_with_input(BenchmarkId::new("score_with_slope", size), size, |b, _| {
            b.iter(|| {
                roads
                    .iter()
                    .map(|r| calculator.score_with_slope(black_box(&r.tags), black_box(&r.points), Some(9.5)))
                    .sum::<i32>()
            })
        });
    }

    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let calculator = ScoreCalculator::new(Weights::for_bike_type(BikeType::Gravel));
    let roads: Vec<Road> = create_roads(10_000)
        .into_iter()
        .map(|mut r| {
            r.score = calculator.score(&r.tags, &r.points);
            r
        })
        .collect();
    let filter = ScoreFilter::default();

    c.bench_function("filter_10000", |b| b.iter(|| filter.apply(black_box(&roads)).len()));
}

criterion_group!(benches, bench_score, bench_filter);
criterion_main!(benches);
