//! Criterion benchmarks for the LZ4 frame encoder/decoder.
//!
//! Run with:
//!   cargo bench --bench lz4

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

mod corpus {
    include!("corpus.rs");
}

fn bench_lz4(c: &mut Criterion) {
    let mut group = c.benchmark_group("lz4_compress_decompress");

    for &size in &[16_384usize, 131_072] {
        let data = corpus::synthetic_data(size);
        let mut compressed = vec![0u8; size + size / 8 + 256];

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("encode", size), &data, |b, data| {
            b.iter(|| tinycodecs::lz4::encode(data, &mut compressed).unwrap())
        });

        let n = tinycodecs::lz4::encode(&data, &mut compressed).unwrap();
        let compressed = compressed[..n].to_vec();
        let mut decompressed = vec![0u8; size];

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::new("decode", size),
            &compressed,
            |b, compressed| b.iter(|| tinycodecs::lz4::decode(compressed, &mut decompressed).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_lz4);
criterion_main!(benches);
