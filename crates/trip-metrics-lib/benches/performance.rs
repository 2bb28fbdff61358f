//! Performance benchmarks for trip-metrics-lib
//!
//! Run with: cargo bench --package trip-metrics-lib

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use trip_metrics_lib::{Config, Track, TrackCollection, parse_line};

/// Generate a realistic GPS log with the specified number of lines.
/// Every 50th line is corrupted to exercise the skip path.
fn generate_log(num_lines: usize, base_lat: f64, base_lon: f64) -> Vec<String> {
    (0..num_lines)
        .map(|i| {
            if i % 50 == 49 {
                return "2024-01-01T??:??:??,corrupted".to_string();
            }
            let t = i as f64 / num_lines as f64;
            let lat = base_lat + t * 0.1 + (t * 50.0).sin() * 0.001;
            let lon = base_lon + t * 0.1 + (t * 30.0).cos() * 0.001;
            let seconds = (i % 86_400) as u32;
            format!(
                "2024-01-01T{:02}:{:02}:{:02}.000Z,{{\"lat\":{lat:.6},\"lon\":{lon:.6}}}",
                seconds / 3600,
                (seconds % 3600) / 60,
                seconds % 60
            )
        })
        .collect()
}

// ============================================================================
// Core Benchmarks - Key performance indicators
// ============================================================================

fn bench_parse_line(c: &mut Criterion) {
    let line = r#"2024-01-01T10:00:00.000Z,{"lat":51.507400,"lon":0.127800}"#;
    c.bench_function("parse_line", |b| b.iter(|| parse_line(black_box(line))));
}

fn bench_single_track(c: &mut Criterion) {
    let mut group = c.benchmark_group("track");

    for &size in &[1_000usize, 10_000, 50_000] {
        let lines = generate_log(size, 51.5, 0.1);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("from_lines", size), &lines, |b, lines| {
            b.iter(|| Track::from_lines(black_box(lines), &Config::default()))
        });
    }

    group.finish();
}

fn bench_multi_track(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection");

    let sources: Vec<Vec<String>> = (0..16)
        .map(|i| generate_log(10_000, 51.5 + i as f64 * 0.1, 0.1))
        .collect();
    group.throughput(Throughput::Elements(16 * 10_000));

    for parallel in [false, true] {
        let config = Config {
            parallel,
            ..Config::default()
        };
        let name = if parallel { "parallel" } else { "sequential" };
        group.bench_function(name, |b| {
            b.iter(|| TrackCollection::process_sources(black_box(sources.clone()), &config))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_line, bench_single_track, bench_multi_track);
criterion_main!(benches);
