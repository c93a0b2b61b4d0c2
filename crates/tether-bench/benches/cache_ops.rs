//! Criterion micro-benchmarks for cache lookup and wrapper churn.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tether_arena::{ArenaConfig, Arenas};
use tether_bench::{addr_for, populated_runtime};
use tether_core::WrapperKind;

fn bench_cache_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_hit");
    for n in [16usize, 1024, 16384] {
        let (rt, wrappers) = populated_runtime(n).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let mut i = 0;
            b.iter(|| {
                let w = rt.cache_get(black_box(addr_for(i % n)));
                i += 1;
                black_box(w)
            });
        });
        drop(wrappers);
        rt.on_unload();
    }
    group.finish();
}

fn bench_wrap_release(c: &mut Criterion) {
    let (rt, _keep) = populated_runtime(1024).unwrap();
    c.bench_function("wrap_release_churn", |b| {
        let addr = addr_for(1_000_000);
        b.iter(|| {
            let w = rt.wrap_addr(black_box(addr), WrapperKind::Message).unwrap();
            black_box(&w);
        });
    });
}

fn bench_descriptor_in_pool(c: &mut Criterion) {
    let (rt, _keep) = populated_runtime(0).unwrap();
    let pool = rt.construct(WrapperKind::DescriptorPool).unwrap();
    c.bench_function("wrap_pool_object", |b| {
        let obj = pool.alloc(16, 8).unwrap();
        b.iter(|| {
            let w = rt
                .wrap(black_box(obj), WrapperKind::Descriptor, Some(&pool))
                .unwrap();
            black_box(&w);
        });
    });
}

fn bench_arena_create_free(c: &mut Criterion) {
    let arenas = Arenas::new();
    let config = ArenaConfig::new(4096, 4);
    c.bench_function("arena_create_alloc_free", |b| {
        b.iter(|| {
            let arena = arenas.create_owned(&config).unwrap();
            black_box(arena.alloc(64, 8).unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_cache_hit,
    bench_wrap_release,
    bench_descriptor_in_pool,
    bench_arena_create_free
);
criterion_main!(benches);
