//! Criterion micro-benchmarks for region algebra.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use tessera_bench::comb_region;
use tessera_core::Coord;
use tessera_space::{CoordBox, Region, Streak};

/// Benchmark: Build a 256x256 comb region one streak at a time.
fn bench_insert_comb_256(c: &mut Criterion) {
    c.bench_function("insert_comb_256", |b| {
        b.iter(|| {
            let region = comb_region(256, 256, 2);
            black_box(region.size());
        });
    });
}

/// Benchmark: Remove every other row of a solid 256x256 block.
fn bench_remove_rows_256(c: &mut Criterion) {
    let solid = Region::from(CoordBox::new(Coord([0, 0]), Coord([256, 256])));

    c.bench_function("remove_rows_256", |b| {
        b.iter(|| {
            let mut region = solid.clone();
            for y in (0..256).step_by(2) {
                region.remove(Streak::new(Coord([0, y]), 256));
            }
            black_box(region.cell_count());
        });
    });
}

/// Benchmark: Union, difference and intersection of two interleaved combs.
fn bench_set_algebra_combs(c: &mut Criterion) {
    let even = comb_region(256, 128, 2);
    // Shifting by one row flips the comb phase.
    let odd: Region<2> = comb_region(256, 129, 2)
        .iter()
        .filter(|s| s.origin[1] > 0)
        .map(|s| Streak::new(Coord([s.origin[0], s.origin[1] - 1]), s.end_x))
        .collect();

    let mut group = c.benchmark_group("set_algebra_combs");
    group.bench_function("union", |b| b.iter(|| black_box(even.union(&odd))));
    group.bench_function("difference", |b| {
        b.iter(|| black_box(even.difference(&odd)))
    });
    group.bench_function("intersection", |b| {
        b.iter(|| black_box(even.intersection(&odd)))
    });
    group.finish();
}

/// Benchmark: Walk every coordinate of a 64x64x16 block.
fn bench_coords_box_3d(c: &mut Criterion) {
    let region = Region::from(CoordBox::new(Coord([0, 0, 0]), Coord([64, 64, 16])));

    c.bench_function("coords_box_3d", |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for coord in region.coords() {
                sum += i64::from(coord[0] + coord[1] + coord[2]);
            }
            black_box(sum);
        });
    });
}

/// Benchmark: Point membership on a fragmented region.
fn bench_contains_comb(c: &mut Criterion) {
    let region = comb_region(256, 256, 3);

    c.bench_function("contains_comb", |b| {
        b.iter(|| {
            let mut hits = 0u32;
            for y in (0..256).step_by(7) {
                for x in 0..256 {
                    if region.contains(&Coord([x, y])) {
                        hits += 1;
                    }
                }
            }
            black_box(hits);
        });
    });
}

criterion_group!(
    benches,
    bench_insert_comb_256,
    bench_remove_rows_256,
    bench_set_algebra_combs,
    bench_coords_box_3d,
    bench_contains_comb
);
criterion_main!(benches);
