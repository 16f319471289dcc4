//! Interface to the numerical solvers and the built-in backend.
//!
//! The core only relies on the [`SolverAdapter`] contract. Adapters are
//! looked up in a [`SolverRegistry`] injected in each
//! [`OptimizationProblem`](crate::OptimizationProblem), keyed by the closed
//! set of identifiers [`SolverId`].

mod branch_and_bound;
mod settings;
mod simplex;
mod status;

pub use settings::SolverSettings;
pub use status::{Status, SOLUTION_PRESENT};

use crate::data::ProblemData;
use crate::error::{Error, Result};
use crate::strategy::Activity;
use log::*;
use ndarray::Array1;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// What a solver reports for one instance.
#[derive(Debug, Clone)]
pub struct SolverResult {
    pub status: Status,
    /// Meaningful only if `status.solution_present()`.
    pub x: Array1<f64>,
    /// Wall-clock time in seconds.
    pub run_time: f64,
    /// Activity of each row of the solved instance.
    /// Meaningful only if `status.solution_present()`.
    pub active_constraints: Vec<Activity>,
}

impl SolverResult {
    /// A result without solution.
    pub fn failed(status: Status, data: &ProblemData, run_time: f64) -> Self {
        Self {
            status,
            x: Array1::zeros(data.n_var()),
            run_time,
            active_constraints: vec![Activity::Inactive; data.n_con()],
        }
    }
}

/// A backend able to solve `ProblemData` instances.
///
/// Failures of the solve itself (infeasibility, limits) are reported in
/// `SolverResult::status`. `Err` is kept for defects of the adapter.
pub trait SolverAdapter: Send + Sync {
    fn name(&self) -> &str;
    fn solve(&self, data: &ProblemData, settings: &SolverSettings) -> Result<SolverResult>;
}

/// Identifiers of the registered backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolverId {
    /// The built-in dense simplex with branch and bound.
    #[default]
    Simplex,
    /// Slot for a backend provided by the caller.
    External,
}

/// Available backends.
#[derive(Clone)]
pub struct SolverRegistry {
    adapters: HashMap<SolverId, Arc<dyn SolverAdapter>>,
}

impl SolverRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }
    pub fn register<S: SolverAdapter + 'static>(&mut self, id: SolverId, adapter: S) {
        let _ = self.adapters.insert(id, Arc::new(adapter));
    }
    pub fn with<S: SolverAdapter + 'static>(mut self, id: SolverId, adapter: S) -> Self {
        self.register(id, adapter);
        self
    }
    pub fn get(&self, id: SolverId) -> Result<&dyn SolverAdapter> {
        self.adapters
            .get(&id)
            .map(|a| a.as_ref())
            .ok_or(Error::UnknownSolver(id))
    }
    pub fn contains(&self, id: SolverId) -> bool {
        self.adapters.contains_key(&id)
    }
}

impl Default for SolverRegistry {
    /// Registry containing the built-in backend.
    fn default() -> Self {
        Self::new().with(SolverId::Simplex, SimplexSolver)
    }
}

impl fmt::Debug for SolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map()
            .entries(self.adapters.iter().map(|(id, a)| (id, a.name())))
            .finish()
    }
}

/// Activity of every row of `data` at the point `x`.
///
/// A row is `Upper` if its slack to `u` is within `active_tol` (relative to
/// the bound magnitude), `Lower` if its slack to `l` is, `Inactive` otherwise.
/// Equality rows are reported `Upper`.
pub fn active_constraints(data: &ProblemData, x: &Array1<f64>, active_tol: f64) -> Vec<Activity> {
    let ax = data.row_products(x);
    let tight = |slack: f64, bound: f64| {
        bound.is_finite() && slack.abs() <= active_tol * bound.abs().max(1.)
    };
    ax.iter()
        .zip(data.l().iter().zip(data.u().iter()))
        .map(|(&v, (&l, &u))| {
            if tight(u - v, u) {
                Activity::Upper
            } else if tight(v - l, l) {
                Activity::Lower
            } else {
                Activity::Inactive
            }
        })
        .collect()
}

/// The built-in backend: dense two-phase simplex for continuous problems,
/// depth-first branch and bound for mixed-integer ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimplexSolver;

impl SolverAdapter for SimplexSolver {
    fn name(&self) -> &str {
        "simplex"
    }
    fn solve(&self, data: &ProblemData, settings: &SolverSettings) -> Result<SolverResult> {
        let start = Instant::now();
        let deadline = settings.time_budget().and_then(|t| start.checked_add(t));
        let lp = simplex::DenseLp::from_data(data);
        let outcome = if data.is_mip() {
            branch_and_bound::solve(
                &lp,
                data.int_idx(),
                branch_and_bound::Limits {
                    tol: settings.tol,
                    int_tol: settings.int_tol,
                    max_iter: settings.max_iter,
                    max_nodes: settings.max_nodes,
                    deadline,
                },
            )
        } else {
            let n = data.n_var();
            simplex::solve(
                &lp,
                &vec![f64::NEG_INFINITY; n],
                &vec![f64::INFINITY; n],
                settings.tol,
                settings.max_iter,
                deadline,
            )
        };
        let run_time = start.elapsed().as_secs_f64();
        log!(
            settings.log_level(),
            "{}: {} in {:.2e}s ({} pivots)",
            self.name(),
            outcome.status,
            run_time,
            outcome.iterations
        );
        if !outcome.status.solution_present() {
            return Ok(SolverResult::failed(outcome.status, data, run_time));
        }
        Ok(SolverResult {
            active_constraints: active_constraints(data, &outcome.x, settings.active_tol),
            status: outcome.status,
            x: outcome.x,
            run_time,
        })
    }
}
