//! Benchmarks for tiered-simd kernels on the selected tier.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;
use tiered_simd::prelude::*;

fn generate_values(n: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0.001f32..1000.0)).collect()
}

fn scalar_sum(data: &[f32]) -> f32 {
    data.iter().sum()
}

fn vector_sum<V: VectorOps<f32>>(data: &[f32]) -> f32 {
    let end = V::next_boundary(data.len(), 0);
    let mut acc = V::zero();
    for chunk in data[..end].chunks_exact(V::LANES) {
        acc = acc.add(V::load(chunk));
    }
    acc.to_vec().iter().sum::<f32>() + data[end..].iter().sum::<f32>()
}

fn vector_max_masked<V: VectorOps<f32>>(data: &[f32]) -> f32 {
    let end = V::next_boundary(data.len(), 0);
    let mut acc = V::set1(f32::NEG_MAX);
    for chunk in data[..end].chunks_exact(V::LANES) {
        acc = acc.max(V::load(chunk));
    }
    let tail = V::Mask::first_n(data.len() - end);
    let rest = V::load_partial(&data[end..]);
    acc = acc.max(rest.masked_max(rest, tail));
    acc.to_vec().into_iter().fold(f32::NEG_MAX, f32::max)
}

fn benchmark_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("sum");

    for &n in &[1023usize, 16_384, 262_147] {
        let data = generate_values(n, 42);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("scalar_loop", n), &data, |b, data| {
            b.iter(|| black_box(scalar_sum(black_box(data))))
        });
        group.bench_with_input(BenchmarkId::new("selected_tier", n), &data, |b, data| {
            b.iter(|| black_box(vector_sum::<F32Vec>(black_box(data))))
        });
        group.bench_with_input(BenchmarkId::new("sse2", n), &data, |b, data| {
            b.iter(|| black_box(vector_sum::<Sse2F32>(black_box(data))))
        });
    }

    group.finish();
}

fn benchmark_masked_max(c: &mut Criterion) {
    let mut group = c.benchmark_group("masked_max");

    for &n in &[1023usize, 65_539] {
        let data = generate_values(n, 7);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("selected_tier", n), &data, |b, data| {
            b.iter(|| black_box(vector_max_masked::<F32Vec>(black_box(data))))
        });
        group.bench_with_input(BenchmarkId::new("scalar_tier", n), &data, |b, data| {
            b.iter(|| black_box(vector_max_masked::<ScalarVec<f32>>(black_box(data))))
        });
    }

    group.finish();
}

fn benchmark_streaming_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");
    let n = 1 << 20;
    group.throughput(Throughput::Bytes((n * 4) as u64));

    let mut buf = AlignedBuffer::<f32>::allocate(n).unwrap();
    group.bench_function("store_aligned", |b| {
        b.iter(|| {
            let v = F32Vec::set1(black_box(1.5));
            let base = buf.as_mut_ptr();
            let mut i = 0;
            while i + F32Vec::LANES <= n {
                // SAFETY: the buffer is aligned and `i + LANES <= n`.
                unsafe { v.store_aligned(base.add(i)) };
                i += F32Vec::LANES;
            }
            store_fence();
        })
    });
    group.bench_function("store_unaligned", |b| {
        b.iter(|| {
            let v = F32Vec::set1(black_box(1.5));
            for chunk in buf.chunks_exact_mut(F32Vec::LANES) {
                v.store(chunk);
            }
        })
    });

    group.finish();
}

fn benchmark_approximations(c: &mut Criterion) {
    let mut group = c.benchmark_group("approximations");
    let data = generate_values(4096, 99);

    group.bench_function("div", |b| {
        let divisor = F32Vec::set1(3.0);
        b.iter(|| {
            let mut acc = F32Vec::zero();
            for chunk in data.chunks_exact(F32Vec::LANES) {
                acc = acc.add(F32Vec::load(chunk).div(divisor));
            }
            black_box(acc.index(0))
        })
    });
    group.bench_function("reciprocal_sqrt", |b| {
        b.iter(|| {
            let mut acc = F32Vec::zero();
            for chunk in data.chunks_exact(F32Vec::LANES) {
                acc = acc.add(F32Vec::load(chunk).reciprocal_sqrt());
            }
            black_box(acc.index(0))
        })
    });
    group.bench_function("sqrt", |b| {
        b.iter(|| {
            let mut acc = F32Vec::zero();
            for chunk in data.chunks_exact(F32Vec::LANES) {
                acc = acc.add(F32Vec::load(chunk).sqrt());
            }
            black_box(acc.index(0))
        })
    });

    group.finish();
}

fn benchmark_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocation");

    for &n in &[64usize, 4096, 1 << 20] {
        group.bench_with_input(BenchmarkId::new("aligned_buffer", n), &n, |b, &n| {
            b.iter(|| black_box(AlignedBuffer::<f32>::allocate(n).unwrap()))
        });
        let zeros = vec![0.0f32; n];
        group.bench_with_input(BenchmarkId::new("aligned_vec", n), &zeros, |b, zeros| {
            b.iter(|| black_box(aligned_vec_from(zeros)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_sum,
    benchmark_masked_max,
    benchmark_streaming_store,
    benchmark_approximations,
    benchmark_allocation,
);

criterion_main!(benches);
