//! Scale-independent measures of the quality of a candidate point.

use crate::data::{ProblemData, TOL};
use ndarray::Array1;

/// Euclidean norm of the normalized constraint violations of `x`.
///
/// The violation of row `i` is `max(A_i x - u_i, 0) + max(l_i - A_i x, 0)`.
/// Violations below `TOL` are ignored, the others are divided by
/// `max(‖A_i‖, |bound_i|)`. The result is zero iff `x` is feasible within `TOL`.
pub fn infeasibility(data: &ProblemData, x: &Array1<f64>) -> f64 {
    let ax = data.row_products(x);
    let norms = data.row_norms();
    let normalize = |violation: f64, norm: f64, bound: f64| {
        if violation <= TOL {
            0.
        } else {
            let scale = norm.max(bound.abs());
            if scale > 0. {
                violation / scale
            } else {
                violation
            }
        }
    };
    let mut sum = 0.;
    for i in 0..data.n_con() {
        let (l, u) = (data.l()[i], data.u()[i]);
        let upper = normalize((ax[i] - u).max(0.), norms[i], u);
        let lower = normalize((l - ax[i]).max(0.), norms[i], l);
        let v = upper + lower;
        sum += v * v;
    }
    sum.sqrt()
}

/// Gap `(cᵗx - cᵗx_opt) / ‖c‖_∞`, signed.
///
/// `x_opt` is assumed optimal. If `c = 0` the raw difference is returned.
pub fn suboptimality(data: &ProblemData, x: &Array1<f64>, x_opt: &Array1<f64>) -> f64 {
    let diff = data.cost(x) - data.cost(x_opt);
    let norm = data.c().iter().fold(0., |acc: f64, v| acc.max(v.abs()));
    if norm > 0. { diff / norm } else { diff }
}
