//! Benchmarks for layout harmonization and viewport geometry.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use panegrid::{AlignmentEngine, Cell, ContentBounds, Pane, PaneKind, Panes, Row, Viewport};

fn build_panes(rows: usize, cols: usize) -> Panes<Pane> {
    let pane = |r: usize, c: usize, w: f32, h: f32| {
        Pane::new(
            (0..r)
                .map(|i| {
                    Row::new(
                        (0..c)
                            .map(|j| Cell::new(w + ((i + j) % 7) as f32, h))
                            .collect(),
                    )
                })
                .collect(),
        )
    };
    Panes {
        main: pane(rows, cols, 64.0, 20.0),
        column_header: pane(1, cols, 48.0, 24.0),
        row_header: pane(rows, 1, 80.0, 20.0),
        corner: pane(1, 1, 56.0, 24.0),
    }
}

/// Benchmark the full harmonization pass at several grid sizes.
fn bench_harmonize(c: &mut Criterion) {
    let mut group = c.benchmark_group("harmonize");
    for &(rows, cols) in &[(100usize, 20usize), (1000, 50), (5000, 100)] {
        let panes = build_panes(rows, cols);
        let engine = AlignmentEngine::default();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{rows}x{cols}")),
            &panes,
            |b, panes| {
                b.iter(|| {
                    engine
                        .harmonize(black_box(panes), &HashMap::new())
                        .expect("harmonize")
                })
            },
        );
    }
    group.finish();
}

/// Benchmark offset lookups used by sticky selection and hit testing.
fn bench_index_at(c: &mut Criterion) {
    let panes = build_panes(5000, 100);
    let layout = AlignmentEngine::default()
        .harmonize(&panes, &HashMap::new())
        .expect("harmonize");

    c.bench_function("index_at_5000_rows", |b| {
        b.iter(|| {
            for y in [0.0f32, 500.0, 5_000.0, 50_000.0, 99_000.0] {
                black_box(layout.main_rows.index_at(black_box(y)));
            }
        })
    });
}

/// Benchmark transform recomputation and point mapping under pan/zoom.
fn bench_transforms(c: &mut Criterion) {
    let mut vp = Viewport::new(0.5, 2.0);
    vp.set_frame(1280.0, 800.0);
    vp.set_content_bounds(ContentBounds {
        width: 100_000.0,
        height: 50_000.0,
    });

    c.bench_function("pan_zoom_transform_cycle", |b| {
        let mut i = 0u32;
        b.iter(|| {
            i = i.wrapping_add(1);
            vp.pan_by(-1.0, -0.5);
            if i % 16 == 0 {
                vp.zoom_at(640.0, 400.0, if i % 32 == 0 { 1.01 } else { 0.99 });
            }
            let t = vp.transform_for(PaneKind::Main);
            black_box(t.map(123.0, 456.0));
        })
    });
}

criterion_group!(benches, bench_harmonize, bench_index_at, bench_transforms);
criterion_main!(benches);
