//! Criterion benchmarks for the tour solvers.
//!
//! Uses seeded synthetic distance matrices so runs are comparable
//! across machines and revisions.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;

use tsp_engine::problem::DistanceMatrix;
use tsp_engine::rng::create_rng;
use tsp_engine::runner::RunContext;
use tsp_engine::solver::Solver;
use tsp_engine::solvers::{
    BranchAndBoundSolver, GeneticAlgorithmSolver, GreedySolver, SimulatedAnnealingSolver,
    TabuSearchSolver,
};

fn random_matrix(n: usize, seed: u64) -> DistanceMatrix {
    let mut rng = create_rng(Some(seed));
    let rows: Vec<Vec<u64>> = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| if i == j { 0 } else { rng.random_range(1..1000) })
                .collect()
        })
        .collect();
    DistanceMatrix::from_rows(rows).expect("square rows")
}

fn bench_greedy(c: &mut Criterion) {
    let mut group = c.benchmark_group("greedy");
    for n in [50, 200, 500] {
        let matrix = random_matrix(n, 1);
        group.bench_with_input(BenchmarkId::from_parameter(n), &matrix, |b, matrix| {
            b.iter(|| {
                let mut ctx = RunContext::detached();
                black_box(GreedySolver::new().solve(matrix, &mut ctx).unwrap())
            })
        });
    }
    group.finish();
}

fn bench_branch_and_bound(c: &mut Criterion) {
    let mut group = c.benchmark_group("branch_and_bound");
    for n in [8, 10, 12] {
        let matrix = random_matrix(n, 2);
        group.bench_with_input(BenchmarkId::from_parameter(n), &matrix, |b, matrix| {
            b.iter(|| {
                let mut ctx = RunContext::detached();
                black_box(BranchAndBoundSolver::new().solve(matrix, &mut ctx).unwrap())
            })
        });
    }
    group.finish();
}

fn bench_annealing(c: &mut Criterion) {
    let matrix = random_matrix(100, 3);
    c.bench_function("annealing/100", |b| {
        b.iter(|| {
            let mut ctx = RunContext::detached();
            let mut solver = SimulatedAnnealingSolver::new().with_seed(7);
            black_box(solver.solve(&matrix, &mut ctx).unwrap())
        })
    });
}

fn bench_tabu(c: &mut Criterion) {
    let matrix = random_matrix(50, 4);
    c.bench_function("tabu/50x100iter", |b| {
        b.iter(|| {
            let mut ctx = RunContext::detached();
            let mut solver = TabuSearchSolver::new().with_iterations(100);
            black_box(solver.solve(&matrix, &mut ctx).unwrap())
        })
    });
}

fn bench_genetic(c: &mut Criterion) {
    let matrix = random_matrix(50, 5);
    c.bench_function("genetic/50x50gen", |b| {
        b.iter(|| {
            let mut ctx = RunContext::detached();
            let mut solver = GeneticAlgorithmSolver::new()
                .with_population_size(40)
                .with_elite_size(10)
                .with_generations(50)
                .with_seed(7);
            black_box(solver.solve(&matrix, &mut ctx).unwrap())
        })
    });
}

criterion_group!(
    benches,
    bench_greedy,
    bench_branch_and_bound,
    bench_annealing,
    bench_tabu,
    bench_genetic
);
criterion_main!(benches);
