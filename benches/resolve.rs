//! Full solve against re-solve from a known strategy.
//!
//! Run: cargo bench --bench resolve

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mlopt::*;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Transportation-like LP with `n` sources and `n` sinks, integer shipments
// on the first source.
fn instance(n: usize, mip: bool) -> ProblemData {
    let mut rng = StdRng::seed_from_u64(7);
    let n_var = n * n;
    let mut rows = Vec::new();
    let mut l = Vec::new();
    let mut u = Vec::new();
    // Supplies
    for i in 0..n {
        let mut row = vec![0.; n_var];
        for j in 0..n {
            row[i * n + j] = 1.;
        }
        rows.push(row);
        l.push(f64::NEG_INFINITY);
        u.push(rng.random_range(10.0..20.0));
    }
    // Demands
    for j in 0..n {
        let mut row = vec![0.; n_var];
        for i in 0..n {
            row[i * n + j] = 1.;
        }
        rows.push(row);
        l.push(rng.random_range(1.0..8.0));
        u.push(f64::INFINITY);
    }
    for k in 0..n_var {
        let mut row = vec![0.; n_var];
        row[k] = 1.;
        rows.push(row);
        l.push(0.);
        u.push(f64::INFINITY);
    }
    let c: Array1<f64> = (0..n_var).map(|_| rng.random_range(1.0..10.0)).collect();
    let int_idx = if mip {
        IndexSet::new((0..n).collect(), n_var).unwrap()
    } else {
        IndexSet::empty(n_var)
    };
    ProblemData::new(c, Array1::from(l), csr_from_rows(&rows, n_var), Array1::from(u), int_idx)
        .unwrap()
}

fn bench_resolve(c: &mut Criterion) {
    let settings = SolverSettings::default();
    let mut group = c.benchmark_group("resolve");
    for &(n, mip) in &[(3, false), (5, false), (3, true), (5, true)] {
        let problem = OptimizationProblem::with_default_solvers(instance(n, mip));
        let (_, _, strategy) = problem.solve(SolverId::Simplex, &settings).unwrap();
        let label = format!("{}{}", n, if mip { "-mip" } else { "" });

        group.bench_with_input(BenchmarkId::new("solve", &label), &problem, |b, p| {
            b.iter(|| p.solve(SolverId::Simplex, black_box(&settings)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("strategy", &label), &problem, |b, p| {
            b.iter(|| {
                p.solve_with_strategy(black_box(&strategy), SolverId::Simplex, &settings)
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
