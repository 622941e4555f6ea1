//! Paragraph clustering benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use reflow_pdf::{cluster, LineBox};

/// Build a plausible book page: runs of tightly spaced lines with a
/// paragraph break every eighth line.
fn synthetic_page(line_count: usize) -> Vec<LineBox> {
    let mut lines = Vec::with_capacity(line_count);
    let mut top = 0.0f32;
    for i in 0..line_count {
        if i > 0 && i % 8 == 0 {
            top += 30.0;
        }
        lines.push(LineBox::new(40.0, top, 560.0, top + 12.0));
        top += 16.0;
    }
    lines
}

fn bench_cluster(c: &mut Criterion) {
    let small = synthetic_page(40);
    let large = synthetic_page(400);

    c.bench_function("cluster_40_lines", |b| {
        b.iter(|| cluster(black_box(&small)))
    });
    c.bench_function("cluster_400_lines", |b| {
        b.iter(|| cluster(black_box(&large)))
    });
}

criterion_group!(benches, bench_cluster);
criterion_main!(benches);
