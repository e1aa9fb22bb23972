use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use u8arena::Arena;

fn bench_alloc(c: &mut Criterion) {
    let mut group = c.benchmark_group("alloc");

    for count in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("u64_values", count), count, |b, &count| {
            let mut backing = vec![0u8; count * 16];
            b.iter(|| {
                let arena = Arena::new(&mut backing, "bench");
                for i in 0..count {
                    black_box(arena.alloc_value(i as u64).unwrap());
                }
                black_box(arena.len())
            });
        });
    }
    group.finish();
}

fn bench_checkout(c: &mut Criterion) {
    let mut group = c.benchmark_group("checkout");

    for size in [16, 256, 4096].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::new("write_commit", size), size, |b, &size| {
            let mut backing = vec![0u8; size + 64];
            let chunk = vec![0xabu8; size];
            b.iter(|| {
                let arena = Arena::new(&mut backing, "bench");
                let mut out = arena.checkout().unwrap();
                out.write(&chunk).unwrap();
                black_box(out.commit().len())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_alloc, bench_checkout);
criterion_main!(benches);
