//!Learning the optimal strategies of parametric linear and mixed-integer programs.
//!
//!A strategy records the values of the integer variables and the set of
//!tight constraints at an optimum. Once known, it turns the instance into a
//!linear system that is much cheaper to solve.
//!
//!# Example
//!
//!```rust
//!use mlopt::*;
//!use ndarray::{array, Array2, ArrayView1};
//!
//!// minimize x0 + x1  subject to  x0 + x1 >= theta,  x0, x1 >= 0
//!fn family(theta: ArrayView1<'_, f64>) -> Result<ProblemData> {
//!    ProblemData::continuous(
//!        array![1., 1.],
//!        array![theta[0], 0., 0.],
//!        csr_from_rows(&[vec![1., 1.], vec![1., 0.], vec![0., 1.]], 2),
//!        array![f64::INFINITY, f64::INFINITY, f64::INFINITY],
//!    )
//!}
//!
//!fn main() -> Result<()> {
//!    let problem = OptimizationProblem::with_default_solvers(family(array![1.].view())?);
//!    let settings = SolverSettings::default();
//!
//!    // Solve a batch of instances and collect their strategies.
//!    let theta = Array2::from_shape_vec((3, 1), vec![1., 2., 3.]).unwrap();
//!    let batch = problem.solve_parametric(&family, &theta, SolverId::Simplex, &settings)?;
//!
//!    // Solve a new instance from a known strategy.
//!    let instance = problem.instance(&family, array![2.5].view())?;
//!    let (x, _time) =
//!        instance.solve_with_strategy(&batch.strategy[0], SolverId::Simplex, &settings)?;
//!    assert!((instance.cost(&x) - 2.5).abs() < 1e-9);
//!    Ok(())
//!}
//!```
//!

#![warn(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    //unused_qualifications,
    unused_labels,
    //unused_results
)]

#[macro_use]
extern crate serde_derive;

mod data;
pub use crate::data::{csr_from_rows, ProblemData, TOL};

mod error;
pub use crate::error::{Error, Result};

mod index;
pub use crate::index::IndexSet;

mod strategy;
pub use crate::strategy::{Activity, Strategy};

pub mod metrics;
pub use crate::metrics::{infeasibility, suboptimality};

pub mod solvers;
pub use crate::solvers::{SolverAdapter, SolverId, SolverRegistry, SolverSettings, Status};

mod format;
mod parametric;
mod problem;
pub use crate::parametric::{ParametricFamily, ParametricSolution};
pub use crate::problem::OptimizationProblem;

use env_logger::{Builder, Env};

/// Log at `info` level unless `RUST_LOG` says otherwise.
pub fn init_default_log() {
    let _ = Builder::from_env(Env::default().default_filter_or("info")).try_init();
}
/// Log everything unless `RUST_LOG` says otherwise.
pub fn init_debug_log() {
    let _ = Builder::from_env(Env::default().default_filter_or("trace")).try_init();
}
