//! Criterion benchmarks for byte-stream sanitization.
//!
//! A 480x800 PNG is roughly 300-700 KiB; the repair pass runs once per
//! captured frame on the capture worker, so it must stay well under the
//! default 500 ms inter-frame delay.
//!
//! Run with:
//! ```bash
//! cargo bench --package ars-core --bench sanitize_bench
//! ```

use ars_core::protocol::sanitize::{sanitize, sanitize_in_place};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Builds a stream of `len` bytes where roughly one in `every` positions
/// holds a corrupted `0D 0D 0A` triplet.
fn corrupted_stream(len: usize, every: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    let mut i = 0usize;
    while out.len() < len {
        if i % every == 0 {
            out.extend_from_slice(&[0x0D, 0x0D, 0x0A]);
        } else {
            out.push((i * 31 % 251) as u8);
        }
        i += 1;
    }
    out
}

fn bench_sanitize(c: &mut Criterion) {
    let mut group = c.benchmark_group("sanitize");
    for &size in &[64 * 1024, 512 * 1024, 2 * 1024 * 1024] {
        let input = corrupted_stream(size, 97);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("copy", size), &input, |b, input| {
            b.iter(|| sanitize(black_box(input)))
        });

        group.bench_with_input(BenchmarkId::new("in_place", size), &input, |b, input| {
            b.iter_batched(
                || input.clone(),
                |mut buf| sanitize_in_place(black_box(&mut buf)),
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sanitize);
criterion_main!(benches);
