//! Dense two-phase simplex method.
//!
//! The problem `min cᵗx  s.t.  l ≤ Ax ≤ u,  lb ≤ x ≤ ub` is brought to the
//! standard form `min c̃ᵗz  s.t.  Ãz = b, z ≥ 0` by
//! - splitting every free variable as `x = p - q` with `p, q ≥ 0`,
//! - turning every finite bound into a row with a slack of the right sign,
//! - adding one artificial variable per row for phase 1.
//!
//! Columns of the tableau are `[p | q | slacks | artificials | rhs]`.

// Indexed loops are clearer for tableau operations
#![allow(clippy::needless_range_loop)]

use super::status::Status;
use crate::data::ProblemData;
use log::*;
use ndarray::{Array1, Array2};
use std::time::Instant;

/// Consecutive degenerate pivots after which Bland's rule replaces Dantzig's.
const BLAND_AFTER: usize = 50;
/// Relative threshold on the phase 1 objective to declare infeasibility.
const FEAS_TOL: f64 = 1e-7;

/// Dense copy of the data of an instance, as needed by the tableau.
#[derive(Debug, Clone)]
pub(crate) struct DenseLp {
    pub c: Array1<f64>,
    pub a: Array2<f64>,
    pub l: Array1<f64>,
    pub u: Array1<f64>,
}

impl DenseLp {
    pub fn from_data(data: &ProblemData) -> Self {
        let (m, n) = data.a().shape();
        let mut a = Array2::zeros((m, n));
        for (i, row) in data.a().outer_iterator().enumerate() {
            for (j, &v) in row.iter() {
                a[(i, j)] += v
            }
        }
        Self {
            c: data.c().clone(),
            a,
            l: data.l().clone(),
            u: data.u().clone(),
        }
    }
    pub fn n_var(&self) -> usize {
        self.c.len()
    }
}

/// Outcome of one LP solve.
#[derive(Debug, Clone)]
pub(crate) struct LpOutcome {
    pub status: Status,
    pub x: Array1<f64>,
    pub objective: f64,
    pub iterations: usize,
}

impl LpOutcome {
    pub fn failed(status: Status, n: usize, iterations: usize) -> Self {
        Self {
            status,
            x: Array1::zeros(n),
            objective: f64::NAN,
            iterations,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Sense {
    Le,
    Ge,
    Eq,
}

/// One row `coeffs · x (sense) rhs` before conversion to standard form.
struct Row<'a> {
    coeffs: RowCoeffs<'a>,
    sense: Sense,
    rhs: f64,
}

enum RowCoeffs<'a> {
    Dense(ndarray::ArrayView1<'a, f64>),
    Unit(usize),
}

fn collect_rows<'a>(lp: &'a DenseLp, lb: &[f64], ub: &[f64], tol: f64) -> Vec<Row<'a>> {
    let mut rows = Vec::new();
    let mut push_bounds = |coeffs: &dyn Fn() -> RowCoeffs<'a>, lo: f64, hi: f64| {
        if (hi - lo).abs() <= tol {
            rows.push(Row {
                coeffs: coeffs(),
                sense: Sense::Eq,
                rhs: lo,
            })
        } else {
            if hi.is_finite() {
                rows.push(Row {
                    coeffs: coeffs(),
                    sense: Sense::Le,
                    rhs: hi,
                })
            }
            if lo.is_finite() {
                rows.push(Row {
                    coeffs: coeffs(),
                    sense: Sense::Ge,
                    rhs: lo,
                })
            }
        }
    };
    for i in 0..lp.a.nrows() {
        push_bounds(&|| RowCoeffs::Dense(lp.a.row(i)), lp.l[i], lp.u[i]);
    }
    for j in 0..lp.n_var() {
        push_bounds(&|| RowCoeffs::Unit(j), lb[j], ub[j]);
    }
    rows
}

struct Tableau {
    t: Array2<f64>,
    basis: Vec<usize>,
    /// Number of original variables.
    n: usize,
    /// Index of the first artificial column.
    first_art: usize,
    tol: f64,
    iterations: usize,
    max_iter: usize,
    deadline: Option<Instant>,
}

enum Pivoting {
    Optimal,
    Unbounded,
    Stopped(Status),
}

impl Tableau {
    fn new(rows: &[Row], n: usize, tol: f64) -> Self {
        let m = rows.len();
        let n_slack = rows.iter().filter(|r| r.sense != Sense::Eq).count();
        let first_art = 2 * n + n_slack;
        let n_cols = first_art + m;
        let mut t = Array2::zeros((m + 1, n_cols + 1));
        let mut basis = Vec::with_capacity(m);
        let mut slack = 2 * n;
        for (k, row) in rows.iter().enumerate() {
            let sign = if row.rhs < 0. { -1. } else { 1. };
            match &row.coeffs {
                RowCoeffs::Dense(coeffs) => {
                    for (j, &v) in coeffs.iter().enumerate() {
                        t[(k, j)] = sign * v;
                        t[(k, n + j)] = -sign * v;
                    }
                }
                RowCoeffs::Unit(j) => {
                    t[(k, *j)] = sign;
                    t[(k, n + j)] = -sign;
                }
            }
            match row.sense {
                Sense::Le => {
                    t[(k, slack)] = sign;
                    slack += 1
                }
                Sense::Ge => {
                    t[(k, slack)] = -sign;
                    slack += 1
                }
                Sense::Eq => (),
            }
            t[(k, first_art + k)] = 1.;
            t[(k, n_cols)] = sign * row.rhs;
            basis.push(first_art + k);
        }
        Self {
            t,
            basis,
            n,
            first_art,
            tol,
            iterations: 0,
            max_iter: usize::MAX,
            deadline: None,
        }
    }
    fn n_rows(&self) -> usize {
        self.basis.len()
    }
    fn rhs_col(&self) -> usize {
        self.t.ncols() - 1
    }
    /// Current objective value.
    fn objective(&self) -> f64 {
        -self.t[(self.n_rows(), self.rhs_col())]
    }
    /// Rewrite the objective row as the reduced costs of `cost`.
    fn price_out(&mut self, cost: &[f64]) {
        let m = self.n_rows();
        let rhs = self.rhs_col();
        for j in 0..=rhs {
            let mut v = if j < rhs { cost[j] } else { 0. };
            for k in 0..m {
                let cb = cost[self.basis[k]];
                if cb != 0. {
                    v -= cb * self.t[(k, j)]
                }
            }
            self.t[(m, j)] = v;
        }
    }
    fn pivot(&mut self, r: usize, j: usize) {
        let p = self.t[(r, j)];
        self.t.row_mut(r).mapv_inplace(|v| v / p);
        let pivot_row = self.t.row(r).to_owned();
        for k in 0..self.t.nrows() {
            if k != r {
                let f = self.t[(k, j)];
                if f != 0. {
                    self.t
                        .row_mut(k)
                        .zip_mut_with(&pivot_row, |v, &w| *v -= f * w);
                }
            }
        }
        self.basis[r] = j;
    }
    /// Select the entering column among the first `limit` ones.
    fn entering(&self, limit: usize, bland: bool) -> Option<usize> {
        let m = self.n_rows();
        let candidates = (0..limit).filter(|&j| self.t[(m, j)] < -self.tol);
        if bland {
            candidates.into_iter().next()
        } else {
            candidates.min_by(|&i, &j| self.t[(m, i)].total_cmp(&self.t[(m, j)]))
        }
    }
    /// Ratio test, ties broken by the smallest basic index.
    fn leaving(&self, j: usize) -> Option<usize> {
        let rhs = self.rhs_col();
        let mut best: Option<(usize, f64)> = None;
        for k in 0..self.n_rows() {
            let a = self.t[(k, j)];
            if a > self.tol {
                let ratio = self.t[(k, rhs)].max(0.) / a;
                best = match best {
                    None => Some((k, ratio)),
                    Some((r, best_ratio)) => {
                        if ratio < best_ratio - self.tol
                            || (ratio <= best_ratio + self.tol && self.basis[k] < self.basis[r])
                        {
                            Some((k, ratio))
                        } else {
                            Some((r, best_ratio))
                        }
                    }
                }
            }
        }
        best.map(|(k, _)| k)
    }
    fn run(&mut self, limit: usize) -> Pivoting {
        let mut degenerate = 0;
        loop {
            if self.iterations >= self.max_iter {
                return Pivoting::Stopped(Status::MaxIterReached);
            }
            if let Some(deadline) = self.deadline {
                if Instant::now() > deadline {
                    return Pivoting::Stopped(Status::TimeLimit);
                }
            }
            let Some(j) = self.entering(limit, degenerate > BLAND_AFTER) else {
                return Pivoting::Optimal;
            };
            let Some(r) = self.leaving(j) else {
                return Pivoting::Unbounded;
            };
            if self.t[(r, self.rhs_col())] <= self.tol {
                degenerate += 1
            } else if degenerate <= BLAND_AFTER {
                degenerate = 0
            }
            self.pivot(r, j);
            self.iterations += 1;
        }
    }
    /// Pivot basic artificial variables out of the basis when possible.
    fn drive_out_artificials(&mut self) {
        for k in 0..self.n_rows() {
            if self.basis[k] >= self.first_art {
                let pivot = (0..self.first_art)
                    .filter(|&j| self.t[(k, j)].abs() > self.tol)
                    .max_by(|&i, &j| self.t[(k, i)].abs().total_cmp(&self.t[(k, j)].abs()));
                match pivot {
                    Some(j) => self.pivot(k, j),
                    None => trace!("Row {} is redundant", k),
                }
            }
        }
    }
    fn primal(&self) -> Array1<f64> {
        let rhs = self.rhs_col();
        let mut z = vec![0.; self.first_art];
        for (k, &b) in self.basis.iter().enumerate() {
            if b < self.first_art {
                z[b] = self.t[(k, rhs)]
            }
        }
        (0..self.n).map(|j| z[j] - z[self.n + j]).collect()
    }
}

/// Solve `lp` with the additional variable bounds `lb ≤ x ≤ ub`.
pub(crate) fn solve(
    lp: &DenseLp,
    lb: &[f64],
    ub: &[f64],
    tol: f64,
    max_iter: usize,
    deadline: Option<Instant>,
) -> LpOutcome {
    let n = lp.n_var();
    debug_assert_eq!(lb.len(), n);
    debug_assert_eq!(ub.len(), n);
    let rows = collect_rows(lp, lb, ub, tol);
    let mut tableau = Tableau::new(&rows, n, tol);
    tableau.max_iter = max_iter;
    tableau.deadline = deadline;
    let n_cols = tableau.rhs_col();
    let rhs_scale = 1. + rows.iter().map(|r| r.rhs.abs()).fold(0., f64::max);

    // Phase 1: minimize the sum of the artificial variables
    let phase1: Vec<f64> = (0..n_cols)
        .map(|j| if j >= tableau.first_art { 1. } else { 0. })
        .collect();
    tableau.price_out(&phase1);
    match tableau.run(n_cols) {
        Pivoting::Optimal => (),
        Pivoting::Unbounded => return LpOutcome::failed(Status::Error, n, tableau.iterations),
        Pivoting::Stopped(status) => return LpOutcome::failed(status, n, tableau.iterations),
    }
    if tableau.objective() > FEAS_TOL * rhs_scale {
        debug!(
            "Phase 1 ended with infeasibility {:.3e}",
            tableau.objective()
        );
        return LpOutcome::failed(Status::Infeasible, n, tableau.iterations);
    }
    tableau.drive_out_artificials();

    // Phase 2: minimize c(p - q), artificial columns never enter
    let mut phase2 = vec![0.; n_cols];
    for j in 0..n {
        phase2[j] = lp.c[j];
        phase2[n + j] = -lp.c[j];
    }
    tableau.price_out(&phase2);
    let first_art = tableau.first_art;
    let status = match tableau.run(first_art) {
        Pivoting::Optimal => Status::Optimal,
        Pivoting::Unbounded => Status::Unbounded,
        Pivoting::Stopped(status) => status,
    };
    if status != Status::Optimal {
        return LpOutcome::failed(status, n, tableau.iterations);
    }
    let x = tableau.primal();
    trace!("Simplex done in {} pivots", tableau.iterations);
    LpOutcome {
        objective: lp.c.dot(&x),
        x,
        status,
        iterations: tableau.iterations,
    }
}
