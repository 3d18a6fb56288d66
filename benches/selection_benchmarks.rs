//! Benchmarks for selection planning and sidecar parsing.
//!
//! Run with: cargo bench

use std::{hint::black_box, path::Path};

use criterion::Criterion;
use framesift::{MetadataRecord, SelectionRules, Sidecar};

fn benchmark_planning(criterion: &mut Criterion) {
    let rules = SelectionRules::default();

    criterion.bench_function("plan (two windows)", |bencher| {
        bencher.iter(|| rules.plan(black_box(300), black_box(300)));
    });

    criterion.bench_function("plan (five windows)", |bencher| {
        bencher.iter(|| rules.plan(black_box(86_400), black_box(86_400)));
    });

    let mut group = criterion.benchmark_group("plan sweep");
    group.bench_function("nominal 0..2000", |bencher| {
        bencher.iter(|| {
            (0..2000)
                .map(|nominal| rules.plan(nominal, nominal.max(0) as usize).kept_frames())
                .sum::<usize>()
        });
    });
    group.finish();
}

fn benchmark_sidecar(criterion: &mut Criterion) {
    let sidecar = Sidecar::new(
        "/media/card/A001_C002.mov",
        MetadataRecord::from_pairs([
            ("codec_name", "prores"),
            ("duration", "12.512500"),
            ("nb_frames", "300"),
            ("r_frame_rate", "24000/1001"),
        ]),
    );
    let text = sidecar.render();

    criterion.bench_function("sidecar parse", |bencher| {
        bencher.iter(|| {
            Sidecar::parse(Path::new("source.txt"), black_box(&text))
                .and_then(|parsed| parsed.nominal_frame_count())
        });
    });
}

criterion::criterion_group!(benches, benchmark_planning, benchmark_sidecar);
criterion::criterion_main!(benches);
