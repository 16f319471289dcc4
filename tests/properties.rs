//! Randomized checks of the invariants of instances, metrics and strategies.

use approx::assert_abs_diff_eq;
use mlopt::*;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const INF: f64 = f64::INFINITY;

fn random_vec<R: Rng>(rng: &mut R, len: usize, scale: f64) -> Array1<f64> {
    (0..len).map(|_| rng.random_range(-scale..scale)).collect()
}

// A bounded feasible LP: random rows around a random interior point, with a
// box on every variable. Some rows are one-sided.
fn random_lp<R: Rng>(rng: &mut R, n: usize, m: usize) -> ProblemData {
    let x0 = random_vec(rng, n, 1.);
    let mut rows = Vec::new();
    let mut l = Vec::new();
    let mut u = Vec::new();
    for _ in 0..m {
        let row: Vec<f64> = (0..n).map(|_| rng.random_range(-1.0..1.0)).collect();
        let v: f64 = row.iter().zip(x0.iter()).map(|(a, x)| a * x).sum();
        let (lo, hi) = (v - rng.random_range(0.1..1.), v + rng.random_range(0.1..1.));
        let (lo, hi) = match rng.random_range(0..3) {
            0 => (lo, INF),
            1 => (-INF, hi),
            _ => (lo, hi),
        };
        rows.push(row);
        l.push(lo);
        u.push(hi);
    }
    for j in 0..n {
        let mut row = vec![0.; n];
        row[j] = 1.;
        rows.push(row);
        l.push(-5.);
        u.push(5.);
    }
    ProblemData::continuous(
        random_vec(rng, n, 1.),
        Array1::from(l),
        csr_from_rows(&rows, n),
        Array1::from(u),
    )
    .unwrap()
}

#[test]
pub fn is_mip_iff_integer_indices() {
    let mut rng = StdRng::seed_from_u64(0);
    for _ in 0..20 {
        let n = rng.random_range(1..6);
        let indices: Vec<usize> = (0..n).filter(|_| rng.random_bool(0.4)).collect();
        let k = indices.len();
        let data = ProblemData::new(
            random_vec(&mut rng, n, 1.),
            Array1::from(vec![-1.]),
            csr_from_rows(&[vec![1.; n]], n),
            Array1::from(vec![1.]),
            IndexSet::new(indices, n).unwrap(),
        )
        .unwrap();
        assert_eq!(data.is_mip(), k > 0);
    }
}

#[test]
pub fn equality_partition() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..20 {
        let m = rng.random_range(1..10);
        let l = random_vec(&mut rng, m, 3.);
        let width: Array1<f64> = (0..m)
            .map(|_| match rng.random_range(0..3) {
                0 => 0.,
                1 => TOL / 2.,
                _ => rng.random_range(0.1..2.),
            })
            .collect();
        let u = &l + &width;
        let data = ProblemData::continuous(
            Array1::zeros(2),
            l.clone(),
            csr_from_rows(&vec![vec![1., -1.]; m], 2),
            u.clone(),
        )
        .unwrap();
        let (eq, ineq) = data.eq_ineq();
        assert_eq!(eq.len() + ineq.len(), m);
        let mut all: Vec<usize> = eq.iter().chain(&ineq).cloned().collect();
        all.sort_unstable();
        assert_eq!(all, (0..m).collect::<Vec<_>>());
        for &i in &eq {
            assert!(u[i] - l[i] <= TOL);
        }
        for &i in &ineq {
            assert!(u[i] - l[i] > TOL);
        }
    }
}

#[test]
pub fn infeasibility_sign() {
    let mut rng = StdRng::seed_from_u64(2);
    for _ in 0..20 {
        let data = random_lp(&mut rng, 3, 4);
        for _ in 0..10 {
            let x = random_vec(&mut rng, 3, 6.);
            let ax = data.row_products(&x);
            let violated = (0..data.n_con())
                .any(|i| ax[i] - data.u()[i] > TOL || data.l()[i] - ax[i] > TOL);
            let v = infeasibility(&data, &x);
            assert!(v >= 0.);
            assert_eq!(v > 0., violated);
        }
    }
}

#[test]
pub fn feasible_points() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..20 {
        let data = random_lp(&mut rng, 3, 4);
        let problem = OptimizationProblem::with_default_solvers(data);
        let (x, _, _) = problem
            .solve(SolverId::Simplex, &SolverSettings::default())
            .unwrap();
        assert_eq!(problem.infeasibility(&x), 0.);
    }
}

#[test]
pub fn strategy_round_trip() {
    let mut rng = StdRng::seed_from_u64(4);
    let settings = SolverSettings::default();
    for _ in 0..30 {
        let n = rng.random_range(2..5);
        let m = rng.random_range(1..6);
        let problem = OptimizationProblem::with_default_solvers(random_lp(&mut rng, n, m));
        let (x_opt, _, strategy) = problem.solve(SolverId::Simplex, &settings).unwrap();
        assert_eq!(strategy.active_constraints.len(), m + n);
        let (x, _) = problem
            .solve_with_strategy(&strategy, SolverId::Simplex, &settings)
            .unwrap();
        assert_abs_diff_eq!(x, x_opt, epsilon = 1e-6);
        assert_abs_diff_eq!(problem.suboptimality(&x, &x_opt), 0., epsilon = 1e-6);
    }
}

#[test]
pub fn strategy_equality() {
    let mut rng = StdRng::seed_from_u64(5);
    let random_strategy = |rng: &mut StdRng| {
        let trits: Vec<i8> = (0..3).map(|_| rng.random_range(-1..=1)).collect();
        Strategy::from_trits(vec![rng.random_range(0..2)], &trits).unwrap()
    };
    for _ in 0..50 {
        let (a, b, c) = (
            random_strategy(&mut rng),
            random_strategy(&mut rng),
            random_strategy(&mut rng),
        );
        assert_eq!(a, a.clone());
        assert_eq!(a == b, b == a);
        if a == b && b == c {
            assert_eq!(a, c);
        }
        assert_eq!(
            a == b,
            a.int_vars == b.int_vars && a.trits() == b.trits()
        );
    }
}
