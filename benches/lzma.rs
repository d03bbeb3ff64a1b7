//! Criterion benchmarks for the LZMA encoder/decoder.
//!
//! Run with:
//!   cargo bench --bench lzma

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

mod corpus {
    include!("corpus.rs");
}

fn bench_lzma(c: &mut Criterion) {
    let mut group = c.benchmark_group("lzma_compress_decompress");
    group.sample_size(20);

    for &size in &[16_384usize, 65_536] {
        let data = corpus::synthetic_data(size);
        let mut compressed = vec![0u8; size + size / 8 + 256];

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("encode", size), &data, |b, data| {
            b.iter(|| tinycodecs::lzma::encode(data, &mut compressed).unwrap())
        });

        let n = tinycodecs::lzma::encode(&data, &mut compressed).unwrap();
        let compressed = compressed[..n].to_vec();
        let mut decompressed = vec![0u8; size];

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::new("decode", size),
            &compressed,
            |b, compressed| b.iter(|| tinycodecs::lzma::decode(compressed, &mut decompressed).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_lzma);
criterion_main!(benches);
