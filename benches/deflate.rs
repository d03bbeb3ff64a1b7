//! Criterion benchmarks for the DEFLATE/gzip encoder.
//!
//! Run with:
//!   cargo bench --bench deflate

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

mod corpus {
    include!("corpus.rs");
}

fn bench_gzip(c: &mut Criterion) {
    let mut group = c.benchmark_group("gzip_compress");

    for &size in &[16_384usize, 131_072] {
        let data = corpus::synthetic_data(size);
        let mut dst = vec![0u8; size + size / 2 + 64];

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("gzip", size), &data, |b, data| {
            b.iter(|| tinycodecs::deflate::gzip(data, &mut dst).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_gzip);
criterion_main!(benches);
