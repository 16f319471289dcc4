//! Solve an instance, extract its strategy, and re-solve from a strategy.

use crate::data::{ProblemData, RowStack};
use crate::error::{Error, Result};
use crate::metrics;
use crate::solvers::{SolverId, SolverRegistry, SolverResult, SolverSettings};
use crate::strategy::Strategy;
use log::*;
use ndarray::Array1;
use std::sync::Arc;

/// An optimization instance together with the solvers available to it.
#[derive(Debug, Clone)]
pub struct OptimizationProblem {
    data: ProblemData,
    solvers: Arc<SolverRegistry>,
}

impl OptimizationProblem {
    pub fn new(data: ProblemData, solvers: Arc<SolverRegistry>) -> Self {
        Self { data, solvers }
    }
    /// Use the built-in solvers only.
    pub fn with_default_solvers(data: ProblemData) -> Self {
        Self::new(data, Arc::new(SolverRegistry::default()))
    }
    /// A problem sharing the same solvers on other data.
    pub fn with_data(&self, data: ProblemData) -> Self {
        Self::new(data, Arc::clone(&self.solvers))
    }
    pub fn data(&self) -> &ProblemData {
        &self.data
    }
    pub fn solvers(&self) -> &SolverRegistry {
        &self.solvers
    }
    pub fn is_mip(&self) -> bool {
        self.data.is_mip()
    }
    pub fn cost(&self, x: &Array1<f64>) -> f64 {
        self.data.cost(x)
    }
    /// See [`metrics::infeasibility`].
    pub fn infeasibility(&self, x: &Array1<f64>) -> f64 {
        metrics::infeasibility(&self.data, x)
    }
    /// See [`metrics::suboptimality`].
    pub fn suboptimality(&self, x: &Array1<f64>, x_opt: &Array1<f64>) -> f64 {
        metrics::suboptimality(&self.data, x, x_opt)
    }

    /// Run `solver` on `data` and fail unless a solution is present.
    fn run(
        &self,
        data: &ProblemData,
        solver: SolverId,
        settings: &SolverSettings,
    ) -> Result<SolverResult> {
        let adapter = self.solvers.get(solver)?;
        let results = adapter.solve(data, settings)?;
        if !results.status.solution_present() {
            if let Some(other) = settings.verify_with {
                self.cross_check(other, data, settings, &results);
            }
            return Err(Error::Solver {
                status: results.status,
                data: Box::new(data.clone()),
            });
        }
        if results.x.len() != data.n_var() {
            return Err(Error::mismatch("solution", data.n_var(), results.x.len()));
        }
        if results.active_constraints.len() != data.n_con() {
            return Err(Error::mismatch(
                "reported active constraints",
                data.n_con(),
                results.active_constraints.len(),
            ));
        }
        Ok(results)
    }

    /// Solve again with another solver and report. Never changes the outcome.
    fn cross_check(
        &self,
        other: SolverId,
        data: &ProblemData,
        settings: &SolverSettings,
        failed: &SolverResult,
    ) {
        let settings = SolverSettings {
            verify_with: None,
            ..settings.clone()
        };
        match self
            .solvers
            .get(other)
            .and_then(|adapter| adapter.solve(data, &settings))
        {
            Ok(res) => warn!(
                "Primary solver returned {}, {:?} returned {}",
                failed.status, other, res.status
            ),
            Err(e) => warn!("Cannot cross-check with {:?}: {}", other, e),
        }
    }

    /// Solve the problem.
    ///
    /// Returns the solution, the solve time and the strategy. For a
    /// mixed-integer problem the activity of the constraints is taken from
    /// the continuous restriction with the integer variables fixed at their
    /// optimal values; the returned solution is always the one of the
    /// original solve.
    pub fn solve(
        &self,
        solver: SolverId,
        settings: &SolverSettings,
    ) -> Result<(Array1<f64>, f64, Strategy)> {
        let results = self.run(&self.data, solver, settings)?;
        let m = self.data.n_con();

        let (x_int, active_constraints) = if self.is_mip() {
            let x_int: Vec<i64> = self
                .data
                .int_idx()
                .iter()
                .map(|j| results.x[j].round() as i64)
                .collect();
            let data_cont = self.data.fix_integers(&x_int)?;
            let results_cont = self.run(&data_cont, solver, settings)?;
            let mut active = results_cont.active_constraints;
            active.truncate(m);
            (x_int, active)
        } else {
            (Vec::new(), results.active_constraints)
        };

        let strategy = Strategy::new(x_int, active_constraints);
        debug!("Strategy {}", strategy);
        Ok((results.x, results.run_time, strategy))
    }

    /// The equality-only problem described by `strategy`.
    ///
    /// Rows are, in order: integer fixings, rows tight at their lower bound,
    /// rows tight at their upper bound. Inactive rows are dropped.
    pub fn reduced_problem(&self, strategy: &Strategy) -> Result<ProblemData> {
        let data = &self.data;
        let m = data.n_con();
        if strategy.active_constraints.len() != m {
            return Err(Error::mismatch(
                "strategy active constraints",
                m,
                strategy.active_constraints.len(),
            ));
        }
        if strategy.int_vars.len() != data.int_idx().len() {
            return Err(Error::Validation(format!(
                "strategy fixes {} integer variables, problem has {}",
                strategy.int_vars.len(),
                data.int_idx().len()
            )));
        }

        let mut rows = RowStack::new(data.n_var());
        for (j, &v) in data.int_idx().iter().zip(&strategy.int_vars) {
            rows.push_unit(j, v as f64)
        }
        for i in strategy.lower_rows() {
            let bound = data.l()[i];
            if !bound.is_finite() {
                return Err(Error::Validation(format!("row {i} has no lower bound")));
            }
            rows.push_row(data, i, bound, bound)
        }
        for i in strategy.upper_rows() {
            let bound = data.u()[i];
            if !bound.is_finite() {
                return Err(Error::Validation(format!("row {i} has no upper bound")));
            }
            rows.push_row(data, i, bound, bound)
        }
        trace!("Reduced problem with {} rows out of {}", rows.len(), m);
        rows.build(data.c().clone())
    }

    /// Solve the reduced problem given by `strategy`.
    ///
    /// If `strategy` was produced by [`solve`](Self::solve) on this instance,
    /// the solution is the optimum of the instance. A wrong strategy may lead
    /// to an `Error::Solver` or to an infeasible or suboptimal point.
    pub fn solve_with_strategy(
        &self,
        strategy: &Strategy,
        solver: SolverId,
        settings: &SolverSettings,
    ) -> Result<(Array1<f64>, f64)> {
        let reduced = self.reduced_problem(strategy)?;
        let results = self.run(&reduced, solver, settings)?;
        Ok((results.x, results.run_time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::csr_from_rows;
    use crate::index::IndexSet;
    use crate::solvers::{SolverAdapter, Status};
    use crate::strategy::Activity;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const INF: f64 = f64::INFINITY;

    // min x1 + x2  s.t.  x1 + x2 >= 1,  0 <= x1 <= 2,  0 <= x2 <= 2
    fn two_var_lp() -> OptimizationProblem {
        let data = ProblemData::continuous(
            array![1., 1.],
            array![1., 0., 0.],
            csr_from_rows(&[vec![1., 1.], vec![1., 0.], vec![0., 1.]], 2),
            array![INF, 2., 2.],
        )
        .unwrap();
        OptimizationProblem::with_default_solvers(data)
    }

    #[test]
    fn lp_strategy() {
        let problem = two_var_lp();
        let settings = SolverSettings::default();
        let (x, _, strategy) = problem.solve(SolverId::Simplex, &settings).unwrap();
        assert_abs_diff_eq!(problem.cost(&x), 1., epsilon = 1e-9);
        assert!(strategy.int_vars.is_empty());
        assert_eq!(strategy.active_constraints[0], Activity::Lower);
        // Exactly the tight rows are marked
        let ax = problem.data().row_products(&x);
        for i in 1..3 {
            let tight = ax[i].abs() < 1e-9 || (ax[i] - 2.).abs() < 1e-9;
            assert_eq!(strategy.active_constraints[i].is_active(), tight);
        }
        let (x_red, _) = problem
            .solve_with_strategy(&strategy, SolverId::Simplex, &settings)
            .unwrap();
        assert_abs_diff_eq!(problem.cost(&x_red), 1., epsilon = 1e-9);
        assert_abs_diff_eq!(x_red, x, epsilon = 1e-7);
    }

    #[test]
    fn reduced_rows() {
        let problem = two_var_lp();
        let strategy = Strategy::from_trits(vec![], &[-1, 0, 1]).unwrap();
        let reduced = problem.reduced_problem(&strategy).unwrap();
        assert_eq!(reduced.n_con(), 2);
        assert_eq!(reduced.l(), &array![1., 2.]);
        assert_eq!(reduced.u(), &array![1., 2.]);
        assert_eq!(reduced.a().get(1, 1), Some(&1.));
        assert_eq!(reduced.a().get(1, 0), None);
        assert_eq!(reduced.c(), problem.data().c());
        let (eq, ineq) = reduced.eq_ineq();
        assert_eq!(eq.len(), 2);
        assert!(ineq.is_empty());
    }

    #[test]
    fn invalid_strategies() {
        let problem = two_var_lp();
        let settings = SolverSettings::default();
        let short = Strategy::from_trits(vec![], &[-1, 0]).unwrap();
        assert!(matches!(
            problem.solve_with_strategy(&short, SolverId::Simplex, &settings),
            Err(Error::DimensionMismatch { .. })
        ));
        let with_ints = Strategy::from_trits(vec![1], &[-1, 0, 0]).unwrap();
        assert!(matches!(
            problem.solve_with_strategy(&with_ints, SolverId::Simplex, &settings),
            Err(Error::Validation(_))
        ));
        // Row 0 has no upper bound
        let unbounded_row = Strategy::from_trits(vec![], &[1, 0, 0]).unwrap();
        assert!(matches!(
            problem.reduced_problem(&unbounded_row),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn wrong_prediction() {
        let problem = two_var_lp();
        let settings = SolverSettings::default();
        // Nothing tight: the reduced problem is unbounded
        let slack = Strategy::from_trits(vec![], &[0, 0, 0]).unwrap();
        let err = problem
            .solve_with_strategy(&slack, SolverId::Simplex, &settings)
            .unwrap_err();
        assert!(err.is_solver_failure());
        // Inconsistent: x1 = 2, x2 = 2, x1 + x2 = 1
        let inconsistent = Strategy::from_trits(vec![], &[-1, 1, 1]).unwrap();
        assert!(matches!(
            problem.solve_with_strategy(&inconsistent, SolverId::Simplex, &settings),
            Err(Error::Solver {
                status: Status::Infeasible,
                ..
            })
        ));
        // Feasible but suboptimal
        let suboptimal = Strategy::from_trits(vec![], &[0, 1, -1]).unwrap();
        let (x, _) = problem
            .solve_with_strategy(&suboptimal, SolverId::Simplex, &settings)
            .unwrap();
        assert_eq!(problem.infeasibility(&x), 0.);
        assert_abs_diff_eq!(problem.suboptimality(&x, &array![1., 0.]), 1., epsilon = 1e-9);
    }

    // min -x1 + x2  s.t.  0 <= x1 <= 1,  x2 >= 0.5 x1,  x1 integer
    fn one_int_mip() -> OptimizationProblem {
        let data = ProblemData::new(
            array![-1., 0.25],
            array![0., 0.],
            csr_from_rows(&[vec![1., 0.], vec![-0.5, 1.]], 2),
            array![1., INF],
            IndexSet::new(vec![0], 2).unwrap(),
        )
        .unwrap();
        OptimizationProblem::with_default_solvers(data)
    }

    #[test]
    fn mip_strategy() {
        let problem = one_int_mip();
        let settings = SolverSettings::default();
        let (x, _, strategy) = problem.solve(SolverId::Simplex, &settings).unwrap();
        assert_eq!(strategy.int_vars, vec![1]);
        assert_eq!(
            strategy.active_constraints,
            vec![Activity::Upper, Activity::Lower]
        );
        assert_abs_diff_eq!(x, array![1., 0.5], epsilon = 1e-9);
        let (x_red, _) = problem
            .solve_with_strategy(&strategy, SolverId::Simplex, &settings)
            .unwrap();
        assert_abs_diff_eq!(problem.cost(&x_red), problem.cost(&x), epsilon = 1e-12);
    }

    #[test]
    fn infeasible_instance() {
        let a = csr_from_rows(&[vec![1.]], 1);
        assert!(matches!(
            ProblemData::continuous(array![1.], array![5.], a.clone(), array![1.]),
            Err(Error::Validation(_))
        ));
        // x >= 5 and x <= 1 on two rows
        let data = ProblemData::continuous(
            array![1.],
            array![5., -INF],
            csr_from_rows(&[vec![1.], vec![1.]], 1),
            array![INF, 1.],
        )
        .unwrap();
        let problem = OptimizationProblem::with_default_solvers(data.clone());
        match problem.solve(SolverId::Simplex, &SolverSettings::default()) {
            Err(Error::Solver { status, data: d }) => {
                assert_eq!(status, Status::Infeasible);
                assert_eq!(*d, data);
            }
            other => panic!("expected a solver error, got {other:?}"),
        }
    }

    /// Always fails, counts its calls.
    struct Failing(AtomicUsize);

    impl SolverAdapter for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        fn solve(&self, data: &ProblemData, _: &SolverSettings) -> Result<SolverResult> {
            let _ = self.0.fetch_add(1, Ordering::SeqCst);
            Ok(SolverResult::failed(Status::Error, data, 0.))
        }
    }

    #[test]
    fn verification_path() {
        let data = two_var_lp().data().clone();
        let registry = Arc::new(
            SolverRegistry::default().with(SolverId::External, Failing(AtomicUsize::new(0))),
        );
        let problem = OptimizationProblem::new(data, registry);
        let settings = SolverSettings::default().verify_with(SolverId::Simplex);
        // The secondary solver succeeds but the error is still returned
        let err = problem.solve(SolverId::External, &settings).unwrap_err();
        assert!(matches!(
            err,
            Error::Solver {
                status: Status::Error,
                ..
            }
        ));
        // Unknown solver
        let lonely = OptimizationProblem::new(problem.data().clone(), Arc::new(SolverRegistry::new()));
        assert!(matches!(
            lonely.solve(SolverId::Simplex, &SolverSettings::default()),
            Err(Error::UnknownSolver(SolverId::Simplex))
        ));
    }
}
