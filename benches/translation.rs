//! Benchmarks for index translation and cache settlement.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use axismap::IndexMapper;

/// Mapper with every third index skipped and a scattered order.
fn populated_mapper(count: usize) -> IndexMapper {
    let mut mapper = IndexMapper::new();
    mapper.init_to_length(count);
    mapper.register_skip_map("filters").expect("fresh mapper");
    mapper
        .update_skip_map("filters", |map| {
            for physical in (0..count).step_by(3) {
                map.set(physical, true);
            }
        })
        .expect("map just registered");
    mapper.move_indexes(&[count / 2, count / 4], 0);
    mapper
}

/// The render-path lookups: visual -> physical is cache-backed.
fn bench_physical_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("physical_index");

    for count in [1_000usize, 50_000] {
        let mapper = populated_mapper(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &mapper, |b, mapper| {
            b.iter(|| {
                let visible = mapper.not_skipped_count();
                for visual in (0..visible).step_by(7) {
                    black_box(mapper.physical_index(black_box(visual)));
                }
            })
        });
    }

    group.finish();
}

/// Reverse lookup scans the not-skipped cache.
fn bench_visual_index(c: &mut Criterion) {
    let mapper = populated_mapper(10_000);

    c.bench_function("visual_index_10000", |b| {
        b.iter(|| black_box(mapper.visual_index(black_box(9_999))))
    });
}

/// Cache settlement after a structural change, batched vs not.
fn bench_cache_settlement(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_settlement");

    group.bench_function("moves_unbatched", |b| {
        let mut mapper = populated_mapper(10_000);
        b.iter(|| {
            for step in 0..8 {
                mapper.move_indexes(&[step], step + 1);
            }
        })
    });

    group.bench_function("moves_batched", |b| {
        let mut mapper = populated_mapper(10_000);
        b.iter(|| {
            mapper.batch(|mapper| {
                for step in 0..8 {
                    mapper.move_indexes(&[step], step + 1);
                }
            })
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_physical_index,
    bench_visual_index,
    bench_cache_settlement,
);

criterion_main!(benches);
