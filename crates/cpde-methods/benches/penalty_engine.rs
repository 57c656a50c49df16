use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use cpde_methods::{thomas_solve, ConvertibleBondPde, CrankNicolsonPenaltyEngine};
use std::hint::black_box;

fn bench_reference_npv(c: &mut Criterion) {
    let engine = CrankNicolsonPenaltyEngine::new(ConvertibleBondPde::default())
        .expect("reference problem should be valid");

    c.bench_function("penalty_engine_reference_npv", |b| {
        b.iter(|| black_box(engine.npv().expect("reference problem should converge")))
    });
}

fn bench_grid_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("penalty_engine_grid");
    for steps in [50usize, 100, 200, 400] {
        let mut problem = ConvertibleBondPde::default();
        problem.grid.time_steps = steps;
        problem.grid.space_steps = steps;
        let engine = CrankNicolsonPenaltyEngine::new(problem).expect("problem should be valid");
        group.bench_with_input(BenchmarkId::from_parameter(steps), &engine, |b, engine| {
            b.iter(|| black_box(engine.npv().expect("problem should converge")))
        });
    }
    group.finish();
}

fn bench_thomas(c: &mut Criterion) {
    let mut group = c.benchmark_group("thomas_solve");
    for n in [101usize, 1_001, 10_001] {
        let a = vec![-1.0; n];
        let b = vec![4.0; n];
        let cc = vec![-1.0; n];
        let d: Vec<f64> = (0..n).map(|j| j as f64).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, _| {
            bench.iter(|| {
                black_box(
                    thomas_solve(black_box(&a), black_box(&b), black_box(&cc), black_box(&d))
                        .expect("system should be regular"),
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_reference_npv, bench_grid_resolution, bench_thomas);
criterion_main!(benches);
