//! Solver benchmark on seeded generated instances.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use matchrp::driver::{self, GenConfig};
use matchrp::MatchOptions;

fn bench_solve(c: &mut Criterion) {
    let cfg = GenConfig {
        residents: 400,
        programs: 50,
        couple_rate: 0.05,
        list_len: 10,
        dispersion: 0.3,
    };
    let prob = driver::generate_instance(&cfg, 7, false);
    let opts = MatchOptions::default();

    c.bench_function("rp_solve_400x50", |b| {
        b.iter_batched(
            || prob.clone(),
            |mut p| black_box(driver::solve(&mut p, &opts)),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_solve);
criterion_main!(benches);
