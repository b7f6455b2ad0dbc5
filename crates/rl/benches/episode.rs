use criterion::{criterion_group, criterion_main, Criterion};
use rl::{Env, FastMergeEnv, StockMergeEnv};

fn bench_fast_merge_reset(c: &mut Criterion) {
    let mut env = FastMergeEnv::new();
    let mut seed = 0;
    c.bench_function("fast_merge_reset", |b| {
        b.iter(|| {
            seed += 1;
            env.reset(Some(seed)).unwrap()
        });
    });
}

fn bench_merge_step(c: &mut Criterion) {
    let mut env = StockMergeEnv::new();
    env.reset(Some(0)).unwrap();
    c.bench_function("merge_step", |b| {
        b.iter(|| {
            let step = env.step(1).unwrap();
            if step.done() {
                env.reset(Some(0)).unwrap();
            }
        });
    });
}

criterion_group!(benches, bench_fast_merge_reset, bench_merge_step);
criterion_main!(benches);
