extern crate mlopt;

use mlopt::*;
use ndarray::{Array1, Array2, ArrayView1};
use rand::Rng;
use std::path::Path;

const HORIZON: usize = 4;
const CAPACITY: f64 = 10.;
const ORDER_COST: f64 = 2.;
const HOLDING_COST: f64 = 0.5;

// Inventory control over a few periods.
// Variables: orders o_t (integer), stocks s_t.
// s_t = s_{t-1} + o_t - d_t, with s_{-1} = theta_0 and d_t = theta_{t+1},
// 0 <= s_t <= CAPACITY, 0 <= o_t <= CAPACITY.
struct Inventory;

impl Inventory {
    fn order(t: usize) -> usize {
        t
    }
    fn stock(t: usize) -> usize {
        HORIZON + t
    }
}

impl ParametricFamily for Inventory {
    fn build_instance(&self, theta: ArrayView1<'_, f64>) -> Result<ProblemData> {
        let n = 2 * HORIZON;
        let mut rows = Vec::new();
        let mut l = Vec::new();
        let mut u = Vec::new();
        // Stock balance
        for t in 0..HORIZON {
            let mut row = vec![0.; n];
            row[Inventory::stock(t)] = 1.;
            row[Inventory::order(t)] = -1.;
            let rhs = if t == 0 {
                theta[0] - theta[1]
            } else {
                row[Inventory::stock(t - 1)] = -1.;
                -theta[t + 1]
            };
            rows.push(row);
            l.push(rhs);
            u.push(rhs);
        }
        // Bounds on orders and stocks
        for j in 0..n {
            let mut row = vec![0.; n];
            row[j] = 1.;
            rows.push(row);
            l.push(0.);
            u.push(CAPACITY);
        }
        let c: Array1<f64> = (0..n)
            .map(|j| if j < HORIZON { ORDER_COST } else { HOLDING_COST })
            .collect();
        ProblemData::new(
            c,
            Array1::from(l),
            csr_from_rows(&rows, n),
            Array1::from(u),
            IndexSet::new((0..HORIZON).collect(), n)?,
        )
    }
}

pub fn main() -> Result<()> {
    init_default_log();

    // Initial stock, then one demand per period.
    let mut rng = rand::rng();
    let theta = Array2::from_shape_fn((100, HORIZON + 1), |(_, k)| {
        if k == 0 {
            rng.random_range(0.0..5.0)
        } else {
            rng.random_range(0.0..6.0)
        }
    });

    let settings = SolverSettings::default();
    let nominal = Inventory.build_instance(theta.row(0))?;
    let problem = OptimizationProblem::with_default_solvers(nominal);

    // Solve the training samples and keep what a learner would need.
    let samples = problem.solve_parametric_par(&Inventory, &theta, SolverId::Simplex, &settings)?;
    println!(
        "{} samples, {} distinct strategies",
        samples.len(),
        samples.unique_strategies().len()
    );
    samples.save(Path::new("inventory.samples"))?;

    // Reuse the most frequent strategy on new instances.
    let strategies = samples.unique_strategies();
    let most_frequent = strategies
        .iter()
        .max_by_key(|s| samples.strategy.iter().filter(|t| t == s).count())
        .ok_or_else(|| Error::Validation("no sample".into()))?;
    println!("Most frequent strategy: {}", most_frequent);

    for _ in 0..5 {
        let theta: Array1<f64> = (0..=HORIZON)
            .map(|k| if k == 0 { rng.random_range(0.0..5.0) } else { rng.random_range(0.0..6.0) })
            .collect();
        let instance = problem.instance(&Inventory, theta.view())?;
        let (x_opt, time, _) = instance.solve(SolverId::Simplex, &settings)?;
        match instance.solve_with_strategy(most_frequent, SolverId::Simplex, &settings) {
            Ok((x, time_strategy)) => println!(
                "infeasibility {:.2e}, suboptimality {:.2e}, time {:.2e}s instead of {:.2e}s",
                instance.infeasibility(&x),
                instance.suboptimality(&x, &x_opt),
                time_strategy,
                time
            ),
            Err(e) if e.is_solver_failure() => println!("strategy does not apply: {}", e),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
